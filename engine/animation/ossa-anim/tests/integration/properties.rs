//! Behavioral properties of sampling, playback and composition

use std::f32::consts::FRAC_PI_4;
use std::sync::Arc;

use glam::{Mat4, Quat, Vec3};
use ossa_anim::animation::{
    AnimationClipBuilder, Keyframe, KeyframeTrack, LocalPose, advance_time, bind_pose_transforms,
    bone_position, compute_bone_transforms,
};
use ossa_anim::skinning::apply_bone_offsets;
use ossa_anim::{AnimationError, Animator, Bone, Skeleton, SkeletonBuilder};
use proptest::prelude::*;
use proptest::sample::Index;

use crate::common::{biped, chain_skeleton, nod_clip};

#[test]
fn test_midpoint_translation() {
    let track = KeyframeTrack::new(vec![
        Keyframe::new(0.0, Vec3::ZERO),
        Keyframe::new(2.0, Vec3::new(10.0, 0.0, 0.0)),
    ])
    .unwrap();

    assert!(track.sample(1.0, Vec3::ZERO).abs_diff_eq(Vec3::new(5.0, 0.0, 0.0), 1e-6));
    assert_eq!(track.sample(-3.0, Vec3::ZERO), Vec3::ZERO);
    assert_eq!(track.sample(9.0, Vec3::ZERO), Vec3::new(10.0, 0.0, 0.0));
}

#[test]
fn test_rotation_takes_short_arc() {
    let track = KeyframeTrack::new(vec![
        Keyframe::new(0.0, Quat::IDENTITY),
        Keyframe::new(1.0, Quat::from_rotation_y(270f32.to_radians())),
    ])
    .unwrap();

    let halfway = track.sample(0.5, Quat::IDENTITY);
    // 270 degrees one way is 90 the other; half of that is 45
    assert!((halfway.angle_between(Quat::IDENTITY) - FRAC_PI_4).abs() < 1e-4);
    assert!(halfway.mul_vec3(Vec3::X).abs_diff_eq(Vec3::new(FRAC_PI_4.cos(), 0.0, FRAC_PI_4.sin()), 1e-4));
}

#[test]
fn test_large_step_wraps() {
    let clip = AnimationClipBuilder::new("five")
        .translation_key(Vec3::ZERO, 0.0)
        .translation_key(Vec3::X, 5.0)
        .build()
        .unwrap();
    let mut animator = Animator::with_clips(Arc::new(chain_skeleton(1, Vec3::ZERO)), [Arc::new(clip)]).unwrap();

    animator.play_animation(Some(0), true).unwrap();
    animator.update(17.0);
    assert!((animator.playback_time() - 2.0).abs() < 1e-5);

    animator.play_animation(Some(0), false).unwrap();
    animator.update(17.0);
    assert_eq!(animator.playback_time(), 5.0);
    assert!(animator.is_playing());
}

#[test]
fn test_untracked_bones_match_never_playing() {
    let skeleton = biped();
    let idle = Animator::new(Arc::clone(&skeleton));
    let mut nodding = Animator::with_clips(skeleton, [nod_clip()]).unwrap();
    nodding.play_animation(Some(0), true).unwrap();
    nodding.update(0.1);

    let still = idle.bone_transforms().unwrap();
    let moving = nodding.bone_transforms().unwrap();

    // Only the head is animated
    for bone in [0, 1, 3, 4, 5, 6] {
        assert_eq!(still[bone], moving[bone], "bone {bone}");
    }
    assert_ne!(still[2], moving[2]);
    assert_eq!(still, bind_pose_transforms(idle.skeleton()).unwrap());
}

#[test]
fn test_self_parent_reports_corruption() {
    let skeleton = Skeleton::from_bones(vec![
        Bone::new(0, "root", None, Mat4::IDENTITY, Mat4::IDENTITY),
        Bone::new(1, "self", Some(1), Mat4::IDENTITY, Mat4::IDENTITY),
    ])
    .unwrap();

    assert!(matches!(
        compute_bone_transforms(&skeleton, &LocalPose::new()),
        Err(AnimationError::CorruptSkeleton(_))
    ));
}

fn ascending_keys() -> impl Strategy<Value = Vec<Keyframe<f32>>> {
    prop::collection::vec((0.01f32..2.0, -100.0f32..100.0), 1..12).prop_map(|steps| {
        let mut time = 0.0;
        steps
            .into_iter()
            .map(|(gap, value)| {
                let key = Keyframe::new(time, value);
                time += gap;
                key
            })
            .collect()
    })
}

fn offset() -> impl Strategy<Value = Vec3> {
    (-5.0f32..5.0, -5.0f32..5.0, -5.0f32..5.0).prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

/// Parent of bone `i + 1` for every non-root bone; bone 0 is the root
fn tree_parents(max_bones: usize) -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(any::<Index>(), 0..max_bones).prop_map(|picks| {
        picks
            .iter()
            .enumerate()
            .map(|(i, pick)| pick.index(i + 1))
            .collect()
    })
}

fn tree_bones(parents: &[usize], offsets: &[Vec3]) -> Vec<Bone> {
    (0..=parents.len())
        .map(|i| {
            let parent = i.checked_sub(1).map(|p| parents[p]);
            Bone::new(i, format!("b{i}"), parent, Mat4::from_translation(offsets[i]), Mat4::IDENTITY)
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn sample_stays_within_key_range(keys in ascending_keys(), time in -5.0f32..30.0) {
        let min = keys.iter().map(|k| k.value).fold(f32::INFINITY, f32::min);
        let max = keys.iter().map(|k| k.value).fold(f32::NEG_INFINITY, f32::max);
        let first = keys[0];
        let last = keys[keys.len() - 1];
        let track = KeyframeTrack::new(keys).unwrap();

        let value = track.sample(time, 0.0);
        prop_assert!(value >= min - 1e-3 && value <= max + 1e-3);
        if time <= first.time {
            prop_assert_eq!(value, first.value);
        }
        if time >= last.time {
            prop_assert_eq!(value, last.value);
        }
    }

    #[test]
    fn hinted_sampling_matches_search(
        keys in ascending_keys(),
        times in prop::collection::vec(-1.0f32..25.0, 1..20),
    ) {
        let track = KeyframeTrack::new(keys).unwrap();
        let mut hint = 0;
        for time in times {
            prop_assert_eq!(track.sample_with_hint(time, 0.0, &mut hint), track.sample(time, 0.0));
        }
    }

    #[test]
    fn looping_time_stays_in_clip(
        duration in 0.01f32..10.0,
        start in 0.0f32..1.0,
        advance in prop_oneof![0.0f64..1000.0, 0.0f64..1e45],
    ) {
        let time = advance_time(start * duration, advance, duration, true);
        prop_assert!((0.0..=duration).contains(&time));

        let held = advance_time(start * duration, advance, duration, false);
        prop_assert!(held <= duration);
    }

    #[test]
    fn bone_order_does_not_change_pose(
        (parents, offsets, permutation) in tree_parents(12).prop_flat_map(|parents| {
            let count = parents.len() + 1;
            (
                Just(parents),
                prop::collection::vec(offset(), count),
                Just((0..count).collect::<Vec<_>>()).prop_shuffle(),
            )
        })
    ) {
        let natural = Skeleton::from_bones(tree_bones(&parents, &offsets)).unwrap();
        let expected = bind_pose_transforms(&natural).unwrap();

        // Store bone `i` at position `permutation[i]`
        let mut shuffled: Vec<Bone> = natural
            .bones()
            .iter()
            .map(|bone| Bone {
                index: permutation[bone.index],
                parent: bone.parent.map(|p| permutation[p]),
                ..bone.clone()
            })
            .collect();
        shuffled.sort_by_key(|bone| bone.index);
        let shuffled = Skeleton::from_bones(shuffled).unwrap();
        let actual = bind_pose_transforms(&shuffled).unwrap();

        for (i, matrix) in expected.iter().enumerate() {
            prop_assert!(bone_position(matrix).abs_diff_eq(bone_position(&actual[permutation[i]]), 1e-3));
        }
    }

    #[test]
    fn any_cycle_is_corruption(tree in 0usize..6, cycle in 1usize..6) {
        // Bones 1..=tree hang off the root, the rest form a closed loop
        let mut bones = vec![Bone::new(0, "root", None, Mat4::IDENTITY, Mat4::IDENTITY)];
        for i in 1..=tree {
            bones.push(Bone::new(i, "limb", Some(i - 1), Mat4::IDENTITY, Mat4::IDENTITY));
        }
        let first = tree + 1;
        for k in 0..cycle {
            let index = first + k;
            let parent = if k == 0 { first + cycle - 1 } else { index - 1 };
            bones.push(Bone::new(index, "loop", Some(parent), Mat4::IDENTITY, Mat4::IDENTITY));
        }

        let skeleton = Skeleton::from_bones(bones).unwrap();
        prop_assert!(matches!(skeleton.validate(), Err(AnimationError::CorruptSkeleton(_))));
        prop_assert!(matches!(
            compute_bone_transforms(&skeleton, &LocalPose::new()),
            Err(AnimationError::CorruptSkeleton(_))
        ));
    }

    #[test]
    fn exact_inverse_bind_gives_identity_palette(
        parents in tree_parents(10),
        offsets in prop::collection::vec(offset(), 10),
        angles in prop::collection::vec(-3.0f32..3.0, 10),
    ) {
        let mut builder = SkeletonBuilder::new();
        for i in 0..=parents.len() {
            let parent = i.checked_sub(1).map(|p| parents[p]);
            let local = Mat4::from_rotation_translation(Quat::from_rotation_y(angles[i]), offsets[i]);
            builder.add_bone_with_bind_pose(format!("b{i}"), parent, local).unwrap();
        }
        let skeleton = builder.build().unwrap();

        let palette = apply_bone_offsets(&skeleton, &bind_pose_transforms(&skeleton).unwrap()).unwrap();
        for m in palette.iter() {
            prop_assert!(m.abs_diff_eq(Mat4::IDENTITY, 5e-3));
        }
    }
}
