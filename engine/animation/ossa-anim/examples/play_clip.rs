//! Example: Playing a clip on a small skeleton
//!
//! Builds a three-bone arm, plays a looping wave on it and prints the
//! model-space joint positions and the wrist's skin matrix for a few frames.
//!
//! Usage: RUST_LOG=trace cargo run --example play_clip

use std::sync::Arc;

use glam::{Mat4, Quat, Vec3};
use ossa_anim::animation::{AnimationClipBuilder, bone_position};
use ossa_anim::debug_draw::skeleton_segments;
use ossa_anim::{Animator, SkeletonBuilder};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();

    let mut builder = SkeletonBuilder::new();
    let shoulder = builder.add_bone_with_bind_pose("shoulder", None, Mat4::IDENTITY)?;
    let elbow = builder.add_bone_with_bind_pose("elbow", Some(shoulder), Mat4::from_translation(Vec3::X))?;
    builder.add_bone_with_bind_pose("wrist", Some(elbow), Mat4::from_translation(Vec3::X))?;
    let skeleton = Arc::new(builder.build()?);

    let wave = AnimationClipBuilder::new("wave")
        .bone(shoulder)
        .rotation_key(Quat::IDENTITY, 0.0)
        .rotation_key(Quat::from_rotation_z(0.8), 0.5)
        .rotation_key(Quat::IDENTITY, 1.0)
        .bone(elbow)
        .translation_key(Vec3::X, 0.0)
        .rotation_key(Quat::IDENTITY, 0.0)
        .rotation_key(Quat::from_rotation_z(1.2), 0.5)
        .rotation_key(Quat::IDENTITY, 1.0)
        .build()?;

    let mut animator = Animator::with_clips(Arc::clone(&skeleton), [Arc::new(wave)])?;
    println!("Skeleton: {} bones, {} clip(s)", skeleton.bone_count(), animator.clip_count());

    animator.play_by_name("wave", true)?;

    for frame in 0..=8 {
        if frame > 0 {
            animator.update(0.125);
        }

        let transforms = animator.bone_transforms()?;
        println!("\n=== t = {:.3}s ===", animator.playback_time());
        for bone in skeleton.bones() {
            println!(
                "  {:<8} {:?}",
                bone.name,
                bone_position(&transforms[bone.index])
            );
        }
        println!("  segments: {}", skeleton_segments(&skeleton, &transforms)?.len());

        let palette = animator.skin_matrices()?;
        println!("  wrist skin matrix: {:?}", palette[2].to_cols_array());
    }

    Ok(())
}
