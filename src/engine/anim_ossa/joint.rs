use std::fmt::{Display, Formatter};
use glam::Mat4;
use math_ossa::Transform;

// Size of the skinning matrix buffer handed to the GPU, joints at or beyond this are never skinned
pub const MAX_JOINTS: usize = 50;

// The authored index of a joint, which is also its slot in the skinning matrix buffer
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JointIndex(pub u32);
impl JointIndex
{
    #[inline] #[must_use]
    pub const fn is_skinnable(self) -> bool { (self.0 as usize) < MAX_JOINTS }
}
impl Display for JointIndex
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result
    {
        write!(f, "#{}", self.0)
    }
}

// Position of a joint inside a skeleton's joint arena (not the authored index)
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct JointSlot(pub usize);
impl JointSlot
{
    const NONE: usize = usize::MAX;

    #[inline] #[must_use] pub const fn none() -> Self { Self(Self::NONE) }
    #[inline] #[must_use] pub const fn some(n: usize) -> Self { Self(n) }

    #[inline] #[must_use] pub const fn is_none(self) -> bool { self.0 == Self::NONE }
    #[inline] #[must_use] pub const fn is_some(self) -> bool { self.0 != Self::NONE }

    #[inline] #[must_use]
    pub const fn get(self) -> Option<usize>
    {
        match self.is_some()
        {
            true => Some(self.0),
            false => None,
        }
    }
}
impl Default for JointSlot
{
    fn default() -> Self { Self::none() }
}

/// A joint as supplied by an asset loader, before it is placed in a skeleton.
#[derive(Debug, Clone, PartialEq)]
pub struct JointDesc
{
    pub index: JointIndex,
    pub name: String,
    pub parent: Option<JointIndex>, // None for the root
    pub local_bind: Transform, // relative to the parent
}
impl JointDesc
{
    pub fn new(index: u32, name: impl Into<String>, parent: Option<u32>, local_bind: Transform) -> Self
    {
        Self
        {
            index: JointIndex(index),
            name: name.into(),
            parent: parent.map(JointIndex),
            local_bind,
        }
    }
}

/// A node in a built [`crate::Skeleton`].
///
/// The bind transforms are fixed once the skeleton is built, only the animated transform
/// changes afterwards (once per animation tick).
#[derive(Debug, Clone)]
pub struct Joint
{
    pub(crate) index: JointIndex,
    pub(crate) name: String,
    pub(crate) parent: JointSlot,
    pub(crate) children: Vec<JointSlot>,

    pub(crate) local_bind: Transform,
    pub(crate) inverse_bind: Mat4, // inverse of the model-space bind transform
    pub(crate) animated: Mat4, // model-space, current frame
}
impl Joint
{
    #[inline] #[must_use] pub fn index(&self) -> JointIndex { self.index }
    #[inline] #[must_use] pub fn name(&self) -> &str { &self.name }
    #[inline] #[must_use] pub fn parent(&self) -> JointSlot { self.parent }
    #[inline] #[must_use] pub fn children(&self) -> &[JointSlot] { &self.children }
    #[inline] #[must_use] pub fn is_root(&self) -> bool { self.parent.is_none() }

    #[inline] #[must_use] pub fn local_bind_transform(&self) -> &Transform { &self.local_bind }
    #[inline] #[must_use] pub fn inverse_bind_transform(&self) -> Mat4 { self.inverse_bind }
    #[inline] #[must_use] pub fn animated_transform(&self) -> Mat4 { self.animated }

    // The matrix that moves a bind-pose vertex to its animated position
    #[inline] #[must_use] pub fn skin_transform(&self) -> Mat4 { self.animated * self.inverse_bind }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn slots()
    {
        assert!(JointSlot::none().is_none());
        assert!(JointSlot::default().is_none());
        assert!(JointSlot::some(0).is_some());
        assert_eq!(JointSlot::some(3).get(), Some(3));
        assert_eq!(JointSlot::none().get(), None);
    }

    #[test]
    fn skinnable()
    {
        assert!(JointIndex(0).is_skinnable());
        assert!(JointIndex(MAX_JOINTS as u32 - 1).is_skinnable());
        assert!(!JointIndex(MAX_JOINTS as u32).is_skinnable());
    }
}
