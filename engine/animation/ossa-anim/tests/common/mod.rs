//! Common test utilities and fixtures

#![allow(dead_code)]

use std::sync::Arc;

use glam::{Mat4, Quat, Vec3};
use ossa_anim::animation::AnimationClipBuilder;
use ossa_anim::{AnimationClip, Skeleton, SkeletonBuilder};

/// Route `log` output through the test harness
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A straight chain of `len` bones, each offset from its parent by `offset`
pub fn chain_skeleton(len: usize, offset: Vec3) -> Skeleton {
    let mut builder = SkeletonBuilder::new();
    let mut parent = None;
    for i in 0..len {
        let index = builder
            .add_bone_with_bind_pose(format!("bone_{i}"), parent, Mat4::from_translation(offset))
            .expect("chain parent is always defined");
        parent = Some(index);
    }
    builder.build().expect("chain is a valid skeleton")
}

/// Small biped: pelvis with a spine and two legs
///
/// ```text
/// 0 pelvis
/// ├── 1 spine ── 2 head
/// ├── 3 thigh_l ── 4 shin_l
/// └── 5 thigh_r ── 6 shin_r
/// ```
pub fn biped() -> Arc<Skeleton> {
    let mut b = SkeletonBuilder::new();
    let pelvis = b
        .add_bone_with_bind_pose("pelvis", None, Mat4::from_translation(Vec3::new(0.0, 1.0, 0.0)))
        .unwrap();
    let spine = b
        .add_bone_with_bind_pose("spine", Some(pelvis), Mat4::from_translation(Vec3::new(0.0, 0.5, 0.0)))
        .unwrap();
    b.add_bone_with_bind_pose("head", Some(spine), Mat4::from_translation(Vec3::new(0.0, 0.4, 0.0)))
        .unwrap();
    for side in [-1.0f32, 1.0] {
        let thigh = b
            .add_bone_with_bind_pose(
                if side < 0.0 { "thigh_l" } else { "thigh_r" },
                Some(pelvis),
                Mat4::from_translation(Vec3::new(0.15 * side, -0.1, 0.0)),
            )
            .unwrap();
        b.add_bone_with_bind_pose(
            if side < 0.0 { "shin_l" } else { "shin_r" },
            Some(thigh),
            Mat4::from_translation(Vec3::new(0.0, -0.45, 0.0)),
        )
        .unwrap();
    }
    Arc::new(b.build().unwrap())
}

/// Pelvis bob and a swinging left leg over one second
pub fn walk_clip() -> Arc<AnimationClip> {
    Arc::new(
        AnimationClipBuilder::new("walk")
            .bone(0)
            .translation_key(Vec3::new(0.0, 1.0, 0.0), 0.0)
            .translation_key(Vec3::new(0.0, 1.1, 0.0), 0.5)
            .translation_key(Vec3::new(0.0, 1.0, 0.0), 1.0)
            .bone(3)
            .translation_key(Vec3::new(-0.15, -0.1, 0.0), 0.0)
            .rotation_key(Quat::from_rotation_x(0.4), 0.0)
            .rotation_key(Quat::from_rotation_x(-0.4), 0.5)
            .rotation_key(Quat::from_rotation_x(0.4), 1.0)
            .build()
            .unwrap(),
    )
}

/// Head nod over a quarter second
pub fn nod_clip() -> Arc<AnimationClip> {
    Arc::new(
        AnimationClipBuilder::new("nod")
            .bone(2)
            .translation_key(Vec3::new(0.0, 0.4, 0.0), 0.0)
            .rotation_key(Quat::IDENTITY, 0.0)
            .rotation_key(Quat::from_rotation_x(0.3), 0.25)
            .build()
            .unwrap(),
    )
}
