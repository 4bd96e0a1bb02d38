//! Bone hierarchy stored as an arena of bones addressed by index
//!
//! Parents and children are plain indices into the skeleton's bone array.
//! Skeletons are built once when a model loads and are shared read-only
//! between every animator that plays clips on that model.

use std::collections::HashMap;

use glam::Mat4;

use crate::error::{AnimationError, Result};

#[cfg(feature = "serde-support")]
use serde::{Deserialize, Serialize};

/// A single node of the skeleton
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct Bone {
    /// Position of this bone in the skeleton's bone array
    pub index: usize,
    pub name: String,
    /// `None` only for the root
    pub parent: Option<usize>,
    /// Rest pose relative to the parent bone
    pub local_bind_transform: Mat4,
    /// Maps bind-pose model space into this bone's space
    pub inverse_bind_pose: Mat4,
}

impl Bone {
    pub fn new(
        index: usize,
        name: impl Into<String>,
        parent: Option<usize>,
        local_bind_transform: Mat4,
        inverse_bind_pose: Mat4,
    ) -> Self {
        Self {
            index,
            name: name.into(),
            parent,
            local_bind_transform,
            inverse_bind_pose,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// Dense bone array with its hierarchy
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde-support",
    derive(Serialize, Deserialize),
    serde(try_from = "Vec<Bone>", into = "Vec<Bone>")
)]
pub struct Skeleton {
    bones: Vec<Bone>,
    children: Vec<Vec<usize>>,
    root: usize,
    names: HashMap<String, usize>,
    /// Parent-first bone order, or why the hierarchy is not a tree
    order: Result<Vec<usize>>,
}

impl Skeleton {
    /// Build a skeleton from a loader-provided bone array
    ///
    /// Bone `i` must carry `index == i` and exactly one bone must be
    /// parentless. Parent indices must be in range. The array does not need
    /// to be sorted parent-first, so cycles are not rejected here; they are
    /// reported by [`validate`](Self::validate) and by pose composition.
    pub fn from_bones(bones: Vec<Bone>) -> Result<Self> {
        if bones.is_empty() {
            return Err(AnimationError::CorruptSkeleton(
                "skeleton has no bones".into(),
            ));
        }

        let count = bones.len();
        let mut children = vec![Vec::new(); count];
        let mut root = None;
        let mut names = HashMap::with_capacity(count);

        for (i, bone) in bones.iter().enumerate() {
            if bone.index != i {
                return Err(AnimationError::CorruptSkeleton(format!(
                    "bone '{}' at position {} claims index {}",
                    bone.name, i, bone.index
                )));
            }

            match bone.parent {
                None => {
                    if let Some(existing) = root {
                        return Err(AnimationError::CorruptSkeleton(format!(
                            "bones {} and {} are both roots",
                            existing, i
                        )));
                    }
                    root = Some(i);
                }
                Some(parent) if parent >= count => {
                    return Err(AnimationError::CorruptSkeleton(format!(
                        "bone {} has dangling parent {} (skeleton has {} bones)",
                        i, parent, count
                    )));
                }
                Some(parent) => children[parent].push(i),
            }

            // First definition wins for duplicate names
            names.entry(bone.name.clone()).or_insert(i);
        }

        let Some(root) = root else {
            return Err(AnimationError::CorruptSkeleton(
                "skeleton has no root bone".into(),
            ));
        };

        let order = traverse(&bones, &children, root);
        if let Err(e) = &order {
            log::warn!("Skeleton hierarchy is not a tree: {}", e);
        }

        Ok(Self {
            bones,
            children,
            root,
            names,
            order,
        })
    }

    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    pub fn bone(&self, index: usize) -> Option<&Bone> {
        self.bones.get(index)
    }

    pub fn bone_by_name(&self, name: &str) -> Option<&Bone> {
        self.names.get(name).map(|&i| &self.bones[i])
    }

    pub fn root_index(&self) -> usize {
        self.root
    }

    pub fn root(&self) -> &Bone {
        &self.bones[self.root]
    }

    /// Direct children of a bone, empty for unknown indices
    pub fn children(&self, index: usize) -> &[usize] {
        self.children
            .get(index)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Bone indices ordered so every parent precedes its children
    ///
    /// The order is a depth-first walk from the root, computed once when the
    /// skeleton is built. Fails with `CorruptSkeleton` if the parent links
    /// form a cycle.
    pub fn traversal_order(&self) -> Result<&[usize]> {
        self.order.as_deref().map_err(Clone::clone)
    }

    /// Check the hierarchy is a single acyclic tree
    ///
    /// Loaders should call this once so corrupt assets are rejected before
    /// the first frame.
    pub fn validate(&self) -> Result<()> {
        self.traversal_order().map(|_| ())
    }
}

/// Depth-first walk from `root`
///
/// A bone reached twice or never reached means the parent links contain a
/// cycle.
fn traverse(bones: &[Bone], children: &[Vec<usize>], root: usize) -> Result<Vec<usize>> {
    let count = bones.len();
    let mut order = Vec::with_capacity(count);
    let mut visited = vec![false; count];
    let mut stack = vec![root];

    while let Some(index) = stack.pop() {
        if std::mem::replace(&mut visited[index], true) {
            return Err(AnimationError::CorruptSkeleton(format!(
                "bone {} is reachable twice from the root",
                index
            )));
        }
        order.push(index);

        // Reverse so children are visited in declaration order
        stack.extend(children[index].iter().rev().copied());
    }

    if order.len() != count {
        let orphan = visited.iter().position(|v| !v).unwrap_or_default();
        return Err(AnimationError::CorruptSkeleton(format!(
            "bone {} ('{}') is part of a parent cycle",
            orphan, bones[orphan].name
        )));
    }

    Ok(order)
}

impl TryFrom<Vec<Bone>> for Skeleton {
    type Error = AnimationError;

    fn try_from(bones: Vec<Bone>) -> Result<Self> {
        Self::from_bones(bones)
    }
}

impl From<Skeleton> for Vec<Bone> {
    fn from(skeleton: Skeleton) -> Self {
        skeleton.bones
    }
}

/// Incremental skeleton construction
///
/// Each bone's parent must already have been added, so skeletons built this
/// way are acyclic by construction.
#[derive(Debug, Default)]
pub struct SkeletonBuilder {
    bones: Vec<Bone>,
}

impl SkeletonBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a bone and return its index
    pub fn add_bone(
        &mut self,
        name: impl Into<String>,
        parent: Option<usize>,
        local_bind_transform: Mat4,
        inverse_bind_pose: Mat4,
    ) -> Result<usize> {
        let index = self.bones.len();
        let name = name.into();

        if let Some(parent) = parent {
            if parent >= index {
                return Err(AnimationError::InvalidArgument(format!(
                    "bone '{}' references parent {} which has not been added",
                    name, parent
                )));
            }
        }

        self.bones.push(Bone::new(
            index,
            name,
            parent,
            local_bind_transform,
            inverse_bind_pose,
        ));
        Ok(index)
    }

    /// Add a bone whose inverse bind pose is derived from the bind pose
    /// accumulated along its parent chain
    pub fn add_bone_with_bind_pose(
        &mut self,
        name: impl Into<String>,
        parent: Option<usize>,
        local_bind_transform: Mat4,
    ) -> Result<usize> {
        let model_bind = match parent {
            Some(p) => self.model_bind_transform(p).map(|pm| pm * local_bind_transform),
            None => Some(local_bind_transform),
        };
        let inverse = model_bind.map_or(Mat4::IDENTITY, |m| m.inverse());
        self.add_bone(name, parent, local_bind_transform, inverse)
    }

    fn model_bind_transform(&self, index: usize) -> Option<Mat4> {
        let bone = self.bones.get(index)?;
        match bone.parent {
            Some(parent) => Some(self.model_bind_transform(parent)? * bone.local_bind_transform),
            None => Some(bone.local_bind_transform),
        }
    }

    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    pub fn build(self) -> Result<Skeleton> {
        let skeleton = Skeleton::from_bones(self.bones)?;
        log::debug!(
            "Built skeleton with {} bones, root '{}'",
            skeleton.bone_count(),
            skeleton.root().name
        );
        Ok(skeleton)
    }
}
