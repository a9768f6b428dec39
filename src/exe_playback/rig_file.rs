use std::error::Error;
use std::path::Path;
use serde::Deserialize;
use anim_ossa::{AnimationClip, ChannelSample, ClipError, JointDesc, JointIndex, Skeleton, SkeletonBuilder, SkeletonError};
use math_ossa::Transform;
use nab_ossa::timing::FSeconds;

// A skeleton plus one clip, described by hand for playback testing
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RigFile
{
    pub duration: Option<f32>, // declared clip length, informational
    pub allow_truncation: bool,
    pub joints: Vec<RigJoint>,
    pub samples: Vec<RigSample>,
}

#[derive(Debug, Deserialize)]
pub struct RigJoint
{
    pub index: u32,
    pub name: String,
    pub parent: Option<u32>,
    #[serde(default)]
    pub bind: Transform,
}

#[derive(Debug, Deserialize)]
pub struct RigSample
{
    pub joint: String,
    pub time: f32,
    #[serde(default)]
    pub pose: Transform,
}

impl RigFile
{
    pub fn load(path: &Path) -> Result<Self, Box<dyn Error>>
    {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read rig file {path:?}: {e}"))?;
        Ok(Self::parse(&text)?)
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error>
    {
        toml::from_str(text)
    }

    pub fn build_skeleton(&self) -> Result<Skeleton, SkeletonError>
    {
        let mut builder = SkeletonBuilder::new().allow_truncation(self.allow_truncation);
        for joint in &self.joints
        {
            builder.add_joint(JointDesc
            {
                index: JointIndex(joint.index),
                name: joint.name.clone(),
                parent: joint.parent.map(JointIndex),
                local_bind: unit_rotation(joint.bind),
            });
        }
        builder.build()
    }

    pub fn build_clip(&self) -> Result<AnimationClip, ClipError>
    {
        let samples = self.samples.iter().map(|s| ChannelSample
        {
            joint: s.joint.clone(),
            timestamp: FSeconds(s.time),
            pose: unit_rotation(s.pose),
        });
        AnimationClip::from_channels(samples, self.duration.map(FSeconds))
    }
}

// hand-typed quaternions are rarely unit length, and a non-unit rotation scales the bind matrix
fn unit_rotation(transform: Transform) -> Transform
{
    Transform { rotation: transform.rotation.normalize(), ..transform }
}

#[cfg(test)]
mod tests
{
    use std::f32::consts::{FRAC_PI_2, PI};
    use approx::assert_abs_diff_eq;
    use glam::{Mat4, Quat, Vec3};
    use super::*;

    const THREE_BONE: &str = include_str!("../../assets/rigs/three_bone.toml");

    #[test]
    fn parse_three_bone()
    {
        let rig = RigFile::parse(THREE_BONE).unwrap();
        assert_eq!(rig.joints.len(), 3);
        assert_eq!(rig.joints[1].parent, Some(0));
        assert_eq!(rig.joints[1].bind.position, Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(rig.joints[1].bind.rotation, Quat::IDENTITY);
        assert_eq!(rig.joints[1].bind.scale, Vec3::ONE);

        let skeleton = rig.build_skeleton().unwrap();
        assert_eq!(skeleton.len(), 3);

        let clip = rig.build_clip().unwrap();
        assert_eq!(clip.keyframe_count(), 2);
        assert_eq!(clip.length(), FSeconds(1.0));
    }

    #[test]
    fn structural_errors_surface()
    {
        let rig = RigFile::parse(r#"
            [[joints]]
            index = 0
            name = "a"

            [[joints]]
            index = 1
            name = "b"
        "#).unwrap();
        assert!(matches!(rig.build_skeleton(), Err(SkeletonError::MultipleRoots { .. })));
    }

    #[test]
    fn rotations_are_normalized()
    {
        let rig = RigFile::parse(r#"
            [[joints]]
            index = 0
            name = "root"
            bind = { rotation = [0.0, 0.0, 1.0, 1.0] }

            [[samples]]
            joint = "root"
            time = 0.0
            pose = { rotation = [0.0, 2.0, 0.0, 0.0] }
        "#).unwrap();

        let skeleton = rig.build_skeleton().unwrap();
        let root = skeleton.root();
        let bind_rotation = root.local_bind_transform().rotation;
        assert!(bind_rotation.dot(Quat::from_rotation_z(FRAC_PI_2)).abs() > 1.0 - 1e-5);
        assert_abs_diff_eq!(root.animated_transform().x_axis.length(), 1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(root.skin_transform(), Mat4::IDENTITY, epsilon = 1e-5);

        let clip = rig.build_clip().unwrap();
        let pose = clip.keyframes()[0].pose("root").unwrap();
        assert_abs_diff_eq!(pose.rotation, Quat::from_rotation_y(PI), epsilon = 1e-5);
    }

    #[test]
    fn bad_toml()
    {
        assert!(RigFile::parse("joints = 5").is_err());
    }
}
