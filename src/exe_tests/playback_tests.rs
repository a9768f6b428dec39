#[cfg(test)]
mod end_to_end
{
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};
    use std::sync::Arc;
    use std::thread;
    use approx::assert_abs_diff_eq;
    use glam::{Mat4, Quat, Vec3};
    use anim_ossa::{AnimationClip, ChannelSample, ClipCache, JointDesc, JointIndex, LoopBehavior, SkeletonBuilder, SkinnedRig, MAX_JOINTS};
    use math_ossa::Transform;
    use nab_ossa::timing::FSeconds;

    // root -> mid -> tip, each one unit up from its parent
    fn three_bone_rig() -> SkinnedRig
    {
        let skeleton = SkeletonBuilder::new()
            .with_joint(JointDesc::new(0, "root", None, Transform::IDENTITY))
            .with_joint(JointDesc::new(1, "mid", Some(0), Transform::from_translation(Vec3::Y)))
            .with_joint(JointDesc::new(2, "tip", Some(1), Transform::from_translation(Vec3::Y)))
            .build()
            .unwrap();
        SkinnedRig::new(skeleton, LoopBehavior::Loop)
    }

    // bind pose at 0, tip rotated 90 degrees about z at 1
    fn tip_swing_clip() -> AnimationClip
    {
        let sample = |time: f32, rotation: Quat| ChannelSample
        {
            joint: "tip".to_string(),
            timestamp: FSeconds(time),
            pose: Transform::from_rotation_translation(rotation, Vec3::Y),
        };
        AnimationClip::from_channels([sample(0.0, Quat::IDENTITY), sample(1.0, Quat::from_rotation_z(FRAC_PI_2))], Some(FSeconds(1.0))).unwrap()
    }

    fn assert_bind_pose(rig: &SkinnedRig)
    {
        for matrix in rig.skin_matrices().matrices()
        {
            assert_abs_diff_eq!(*matrix, Mat4::IDENTITY, epsilon = 1e-5);
        }
    }

    #[test]
    fn tip_swing()
    {
        let clips = ClipCache::new();
        let clip = clips.get_or_load("tip_swing", |_| Ok::<_, ()>(tip_swing_clip())).unwrap();
        assert_eq!(clip.length(), FSeconds(1.0));

        let mut rig = three_bone_rig();
        rig.assign_clip(clip);
        assert_bind_pose(&rig);

        rig.tick(FSeconds(0.5));
        assert_eq!(rig.animator().current_time(), FSeconds(0.5));

        let tip_skin = rig.skin_matrices()[JointIndex(2)];
        let (scale, rotation, _) = tip_skin.to_scale_rotation_translation();
        assert_abs_diff_eq!(scale, Vec3::ONE, epsilon = 1e-5);
        assert!(rotation.dot(Quat::from_rotation_z(FRAC_PI_4)).abs() > 1.0 - 1e-5);
        // the tip pivots about its own bind position
        let tip_pivot = Vec3::new(0.0, 2.0, 0.0);
        assert_abs_diff_eq!(tip_skin.transform_point3(tip_pivot), tip_pivot, epsilon = 1e-5);
        // a vertex one unit above the tip swings 45 degrees towards -x
        let swung = tip_skin.transform_point3(Vec3::new(0.0, 3.0, 0.0));
        assert_abs_diff_eq!(swung, Vec3::new(-FRAC_PI_4.sin(), 2.0 + FRAC_PI_4.cos(), 0.0), epsilon = 1e-5);

        // parents are untouched
        assert_abs_diff_eq!(rig.skin_matrices()[JointIndex(0)], Mat4::IDENTITY, epsilon = 1e-6);
        assert_abs_diff_eq!(rig.skin_matrices()[JointIndex(1)], Mat4::IDENTITY, epsilon = 1e-6);

        rig.tick(FSeconds(0.5));
        assert_eq!(rig.animator().current_time(), FSeconds(0.0));
        assert_bind_pose(&rig);
    }

    #[test]
    fn loop_period()
    {
        let clip = Arc::new(tip_swing_clip());
        let mut a = three_bone_rig();
        let mut b = three_bone_rig();
        a.assign_clip(clip.clone());
        b.assign_clip(clip);

        a.tick(FSeconds(0.3));
        b.tick(FSeconds(0.8));
        b.tick(FSeconds(0.5)); // 1.3

        for (ma, mb) in a.skin_matrices().matrices().iter().zip(b.skin_matrices().matrices())
        {
            assert_abs_diff_eq!(*ma, *mb, epsilon = 1e-4);
        }
    }

    #[test]
    fn unused_slots_are_identity()
    {
        let mut rig = three_bone_rig();
        rig.assign_clip(Arc::new(tip_swing_clip()));
        rig.tick(FSeconds(0.25));
        for slot in 3..MAX_JOINTS
        {
            assert_eq!(rig.skin_matrices()[JointIndex(slot as u32)], Mat4::IDENTITY);
        }
    }

    #[test]
    fn rigs_on_threads_share_a_clip()
    {
        let clips = ClipCache::new();
        let clip = clips.get_or_load("tip_swing", |_| Ok::<_, ()>(tip_swing_clip())).unwrap();

        let results: Vec<Mat4> = thread::scope(|scope|
        {
            let handles: Vec<_> = [0.25f32, 0.5, 0.75].into_iter().map(|time|
            {
                let clip = clip.clone();
                scope.spawn(move ||
                {
                    let mut rig = three_bone_rig();
                    rig.assign_clip(clip);
                    rig.tick(FSeconds(time));
                    rig.skin_matrices()[JointIndex(2)]
                })
            }).collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        for (matrix, angle) in results.iter().zip([FRAC_PI_2 * 0.25, FRAC_PI_2 * 0.5, FRAC_PI_2 * 0.75])
        {
            let (_, rotation, _) = matrix.to_scale_rotation_translation();
            assert!(rotation.dot(Quat::from_rotation_z(angle)).abs() > 1.0 - 1e-5);
        }

        drop(clip);
        assert_eq!(clips.purge_unused(), 1);
    }
}
