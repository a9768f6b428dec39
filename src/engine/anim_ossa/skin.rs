use std::ops::Index;
use glam::Mat4;
use crate::{JointIndex, Skeleton, MAX_JOINTS};

/// The per-joint skinning matrices for one frame, laid out for a GPU uniform buffer.
///
/// Slot `i` holds `animated × inverse_bind` for the joint with index `i`; slots without a
/// joint hold identity.
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(C, align(16))]
pub struct SkinMatrices
{
    matrices: [Mat4; MAX_JOINTS],
}
impl Default for SkinMatrices
{
    fn default() -> Self { Self { matrices: [Mat4::IDENTITY; MAX_JOINTS] } }
}
impl SkinMatrices
{
    pub const SIZE_BYTES: usize = size_of::<Self>();

    pub fn reset(&mut self)
    {
        self.matrices.fill(Mat4::IDENTITY);
    }

    /// Refill from the skeleton's current animated transforms.
    ///
    /// Joints indexed at or beyond [`MAX_JOINTS`] are skipped. Returns the number of matrices written.
    pub fn write_from(&mut self, skeleton: &Skeleton) -> usize
    {
        self.reset();

        let mut written = 0;
        for joint in skeleton.joints()
        {
            let Some(slot) = self.matrices.get_mut(joint.index().0 as usize) else { continue; };
            *slot = joint.skin_transform();
            written += 1;
        }
        written
    }

    #[inline] #[must_use] pub fn matrices(&self) -> &[Mat4; MAX_JOINTS] { &self.matrices }

    #[inline] #[must_use]
    pub fn get(&self, index: JointIndex) -> Option<&Mat4>
    {
        self.matrices.get(index.0 as usize)
    }

    // Raw bytes for upload
    #[inline] #[must_use]
    pub fn as_bytes(&self) -> &[u8]
    {
        // Mat4 is plain f32s with no padding
        unsafe { std::slice::from_raw_parts((self as *const Self).cast::<u8>(), Self::SIZE_BYTES) }
    }
}
impl Index<JointIndex> for SkinMatrices
{
    type Output = Mat4;
    fn index(&self, index: JointIndex) -> &Self::Output { &self.matrices[index.0 as usize] }
}
