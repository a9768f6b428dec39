use std::sync::Arc;
use nab_ossa::timing::FSeconds;
use crate::{AnimationClip, Animator, LoopBehavior, Skeleton, SkinMatrices};

/// Everything one animated mesh instance needs: its skeleton, playback state, and the
/// skinning matrices produced each tick.
#[derive(Debug, Clone)]
pub struct SkinnedRig
{
    skeleton: Skeleton,
    animator: Animator,
    skin: SkinMatrices,
}
impl SkinnedRig
{
    pub fn new(skeleton: Skeleton, loop_behavior: LoopBehavior) -> Self
    {
        let mut rig = Self
        {
            skeleton,
            animator: Animator::new(loop_behavior),
            skin: SkinMatrices::default(),
        };
        rig.skeleton.reset_to_bind_pose();
        rig.skin.write_from(&rig.skeleton);
        rig
    }

    /// Start playing `clip` from the beginning and pose the skeleton at time zero.
    ///
    /// Channels that name joints this skeleton doesn't have are reported here, once, and
    /// ignored during playback.
    pub fn assign_clip(&mut self, clip: Arc<AnimationClip>)
    {
        let unmatched = self.skeleton.unmatched_channels(&clip);
        if !unmatched.is_empty()
        {
            log::warn!("Clip animates {} joint(s) missing from the skeleton, ignoring: {}", unmatched.len(), unmatched.join(", "));
        }

        self.animator.assign_clip(clip);
        self.animator.pose(&mut self.skeleton);
        self.skin.write_from(&self.skeleton);
    }

    // Stop animating and return to the bind pose
    pub fn clear_clip(&mut self)
    {
        self.animator.clear_clip();
        self.skeleton.reset_to_bind_pose();
        self.skin.write_from(&self.skeleton);
    }

    // Advance playback and refresh the skinning matrices
    pub fn tick(&mut self, delta: FSeconds) -> &SkinMatrices
    {
        self.animator.tick(delta, &mut self.skeleton);
        self.skin.write_from(&self.skeleton);
        &self.skin
    }

    #[inline] #[must_use] pub fn skin_matrices(&self) -> &SkinMatrices { &self.skin }
    #[inline] #[must_use] pub fn skeleton(&self) -> &Skeleton { &self.skeleton }
    #[inline] #[must_use] pub fn animator(&self) -> &Animator { &self.animator }
    // for pausing, seeking, etc. Changes take effect on the next tick
    #[inline] #[must_use] pub fn animator_mut(&mut self) -> &mut Animator { &mut self.animator }
}
