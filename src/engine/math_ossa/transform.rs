use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

// A rigid transform with (non-uniform) scale. Composes as scale, then rotation, then translation
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct Transform
{
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}
impl Default for Transform
{
    fn default() -> Self { Self::IDENTITY }
}
impl Transform
{
    pub const IDENTITY: Self = Self
    {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    #[inline] #[must_use]
    pub fn from_rotation_translation(rotation: Quat, position: Vec3) -> Self
    {
        Self { position, rotation, scale: Vec3::ONE }
    }
    #[inline] #[must_use]
    pub fn from_translation(position: Vec3) -> Self
    {
        Self { position, ..Self::IDENTITY }
    }
    #[inline] #[must_use]
    pub fn from_rotation(rotation: Quat) -> Self
    {
        Self { rotation, ..Self::IDENTITY }
    }

    // Blend towards `other`. Position and scale are linear, rotation takes the shortest arc
    #[inline] #[must_use]
    pub fn interpolate(&self, other: &Transform, rel: f32) -> Transform
    {
        Self
        {
            position: self.position.lerp(other.position, rel),
            rotation: self.rotation.slerp(other.rotation, rel),
            scale: self.scale.lerp(other.scale, rel),
        }
    }

    #[inline] #[must_use]
    pub fn to_world_mtx(&self) -> Mat4 { Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position) }
}

impl From<Transform> for Mat4
{
    fn from(t: Transform) -> Self { t.to_world_mtx() }
}
impl From<Mat4> for Transform
{
    fn from(m: Mat4) -> Self
    {
        let (scale, rotation, position) = m.to_scale_rotation_translation();
        Transform { position, rotation, scale }
    }
}
