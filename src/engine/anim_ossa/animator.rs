use std::sync::Arc;
use math_ossa::{inv_lerp, Transform};
use nab_ossa::debug_panic;
use nab_ossa::timing::FSeconds;
use crate::{AnimationClip, Joint, Keyframe, Skeleton};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum LoopBehavior
{
    #[default]
    Loop,
    StopAtLastFrame, // clamp playback time to the clip length
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimatorState
{
    Idle, // no clip
    Playing,
    Paused, // time frozen, joints keep their last pose
}

/// Which keyframes to blend for a point in time.
#[derive(Debug, Clone, Copy)]
pub enum KeyframeBlend<'c>
{
    BindPose, // clip has no keyframes
    Hold(&'c Keyframe),
    Blend { prev: &'c Keyframe, next: &'c Keyframe, factor: f32 },
}
impl<'c> KeyframeBlend<'c>
{
    /// Find the keyframes bracketing `time`, which must already be inside `[0, length]`.
    ///
    /// When looping, times past the last keyframe blend towards the first keyframe and
    /// times before the first keyframe blend from the last one, treating the clip as cyclic.
    /// Without looping those times hold the nearest keyframe.
    #[must_use]
    pub fn at(clip: &'c AnimationClip, time: FSeconds, loop_behavior: LoopBehavior) -> Self
    {
        let keyframes = clip.keyframes();
        let (Some(first), Some(last)) = (keyframes.first(), keyframes.last()) else { return Self::BindPose; };
        if clip.is_static()
        {
            return Self::Hold(first);
        }

        // # of keyframes at or before `time`
        let after = keyframes.partition_point(|k| k.timestamp() <= time);
        match (after, loop_behavior)
        {
            (0, LoopBehavior::StopAtLastFrame) => Self::Hold(first),
            (n, LoopBehavior::StopAtLastFrame) if n == keyframes.len() => Self::Hold(last),
            (0, LoopBehavior::Loop) =>
            {
                // wrapped around the end of the clip, measure from the last keyframe
                let span = first.timestamp() + clip.length() - last.timestamp();
                let elapsed = time + clip.length() - last.timestamp();
                Self::cyclic(last, first, elapsed, span)
            }
            (n, LoopBehavior::Loop) if n == keyframes.len() =>
            {
                let span = first.timestamp() + clip.length() - last.timestamp();
                let elapsed = time - last.timestamp();
                Self::cyclic(last, first, elapsed, span)
            }
            (n, _) =>
            {
                let prev = &keyframes[n - 1];
                let next = &keyframes[n];
                let factor = inv_lerp(prev.timestamp().0, next.timestamp().0, time.0);
                Self::Blend { prev, next, factor: factor.clamp(0.0, 1.0) }
            }
        }
    }

    fn cyclic(prev: &'c Keyframe, next: &'c Keyframe, elapsed: FSeconds, span: FSeconds) -> Self
    {
        match span.0 > 0.0
        {
            true => Self::Blend { prev, next, factor: (elapsed.0 / span.0).clamp(0.0, 1.0) },
            false => Self::Hold(prev),
        }
    }

    // The local transform for a joint; joints a keyframe doesn't mention sit in their bind pose
    #[must_use]
    pub fn local_pose(&self, joint: &Joint) -> Transform
    {
        let bind = joint.local_bind_transform();
        match *self
        {
            Self::BindPose => *bind,
            Self::Hold(keyframe) => *keyframe.pose(joint.name()).unwrap_or(bind),
            Self::Blend { prev, next, factor } =>
            {
                let from = prev.pose(joint.name());
                let to = next.pose(joint.name());
                match (from, to)
                {
                    (None, None) => *bind,
                    // land exactly on the keyframes at the ends
                    _ if factor <= 0.0 => *from.unwrap_or(bind),
                    _ if factor >= 1.0 => *to.unwrap_or(bind),
                    _ => from.unwrap_or(bind).interpolate(to.unwrap_or(bind), factor),
                }
            }
        }
    }
}

/// Playback state for one animated instance.
///
/// The clip is shared; each animator keeps its own playback time.
#[derive(Debug, Default, Clone)]
pub struct Animator
{
    clip: Option<Arc<AnimationClip>>,
    time: FSeconds,
    loop_behavior: LoopBehavior,
    is_paused: bool,
}
impl Animator
{
    pub fn new(loop_behavior: LoopBehavior) -> Self
    {
        Self
        {
            loop_behavior,
            ..Default::default()
        }
    }

    // Start playing a clip from the beginning
    pub fn assign_clip(&mut self, clip: Arc<AnimationClip>)
    {
        log::debug!("Playing clip ({} keyframes, {})", clip.keyframe_count(), clip.length());
        self.clip = Some(clip);
        self.time = FSeconds::ZERO;
        self.is_paused = false;
    }

    pub fn clear_clip(&mut self)
    {
        self.clip = None;
        self.time = FSeconds::ZERO;
        self.is_paused = false;
    }

    #[must_use]
    pub fn state(&self) -> AnimatorState
    {
        match (&self.clip, self.is_paused)
        {
            (None, _) => AnimatorState::Idle,
            (Some(_), false) => AnimatorState::Playing,
            (Some(_), true) => AnimatorState::Paused,
        }
    }

    pub fn pause(&mut self)
    {
        if self.clip.is_some()
        {
            self.is_paused = true;
        }
    }
    pub fn resume(&mut self) { self.is_paused = false; }

    #[inline] #[must_use] pub fn clip(&self) -> Option<&Arc<AnimationClip>> { self.clip.as_ref() }
    #[inline] #[must_use] pub fn current_time(&self) -> FSeconds { self.time }
    #[inline] #[must_use] pub fn loop_behavior(&self) -> LoopBehavior { self.loop_behavior }
    pub fn set_loop_behavior(&mut self, loop_behavior: LoopBehavior) { self.loop_behavior = loop_behavior; }

    // Jump to a point in the clip, wrapped or clamped per the loop behavior.
    // Works while paused; the skeleton is not re-posed until the next pose/tick
    pub fn seek(&mut self, time: FSeconds)
    {
        self.time = FSeconds::ZERO;
        self.step(time);
    }

    /// Move playback time forward. Returns false if nothing changed (idle or paused) and
    /// the current pose is still valid.
    pub fn advance(&mut self, delta: FSeconds) -> bool
    {
        if self.state() != AnimatorState::Playing
        {
            return false;
        }
        if !delta.is_finite()
        {
            debug_panic!("Animator advanced by a non-finite delta {delta:?}");
            return false;
        }

        self.step(delta);
        true
    }

    fn step(&mut self, delta: FSeconds)
    {
        let Some(clip) = &self.clip else { return; };
        let length = clip.length();
        if length.0 <= 0.0
        {
            self.time = FSeconds::ZERO;
            return;
        }

        self.time = match self.loop_behavior
        {
            LoopBehavior::Loop => (self.time + delta).wrap(length),
            LoopBehavior::StopAtLastFrame => (self.time + delta).clamp(FSeconds::ZERO, length),
        };
    }

    // Sample the clip at the current time and write model-space transforms into the skeleton
    pub fn pose(&self, skeleton: &mut Skeleton)
    {
        let Some(clip) = &self.clip else { return; };
        let blend = KeyframeBlend::at(clip, self.time, self.loop_behavior);
        skeleton.apply_local_poses(|joint| blend.local_pose(joint));
    }

    // advance + pose
    pub fn tick(&mut self, delta: FSeconds, skeleton: &mut Skeleton)
    {
        if self.advance(delta)
        {
            self.pose(skeleton);
        }
    }
}
