use std::collections::{BTreeSet, HashMap};
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use math_ossa::Transform;
use nab_ossa::timing::FSeconds;

// Timestamps closer than this are treated as the same instant
pub const TIMESTAMP_EPSILON: f32 = 1e-6;

#[derive(Debug, Clone, PartialEq)]
pub enum ClipError
{
    InvalidTimestamp(FSeconds), // negative, NaN, or infinite
    DuplicateTimestamp(FSeconds),
    DuplicateSample { joint: String, timestamp: FSeconds },
}
impl Display for ClipError
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result { Debug::fmt(self, f) }
}
impl Error for ClipError { }

fn validate_timestamp(timestamp: FSeconds) -> Result<FSeconds, ClipError>
{
    match timestamp.is_finite() && timestamp.0 >= 0.0
    {
        true => Ok(timestamp),
        false => Err(ClipError::InvalidTimestamp(timestamp)),
    }
}

/// Local joint poses at one point in time. Joints without a pose here use their bind pose.
#[derive(Debug, Clone, PartialEq)]
pub struct Keyframe
{
    timestamp: FSeconds,
    poses: HashMap<String, Transform>,
}
impl Keyframe
{
    pub fn new(timestamp: FSeconds) -> Self
    {
        Self { timestamp, poses: HashMap::new() }
    }

    #[must_use]
    pub fn with_pose(mut self, joint: impl Into<String>, pose: Transform) -> Self
    {
        self.poses.insert(joint.into(), pose);
        self
    }

    #[inline] #[must_use] pub fn timestamp(&self) -> FSeconds { self.timestamp }
    #[inline] #[must_use] pub fn pose(&self, joint: &str) -> Option<&Transform> { self.poses.get(joint) }
    #[inline] #[must_use] pub fn len(&self) -> usize { self.poses.len() }
    #[inline] #[must_use] pub fn is_empty(&self) -> bool { self.poses.is_empty() }

    pub fn poses(&self) -> impl Iterator<Item = (&str, &Transform)>
    {
        self.poses.iter().map(|(name, pose)| (name.as_str(), pose))
    }
}

// One sample of one joint's channel, as read from an asset
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelSample
{
    pub joint: String,
    pub timestamp: FSeconds,
    pub pose: Transform,
}

/// An immutable, time-ordered sequence of keyframes.
///
/// Keyframe timestamps are strictly increasing and the clip's length is the timestamp of
/// the last keyframe. Clips are never modified after construction and are meant to be
/// shared between animators behind an `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationClip
{
    keyframes: Box<[Keyframe]>,
    length: FSeconds,
}
impl AnimationClip
{
    pub fn new(mut keyframes: Vec<Keyframe>) -> Result<Self, ClipError>
    {
        for keyframe in &keyframes
        {
            validate_timestamp(keyframe.timestamp)?;
        }

        keyframes.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        for pair in keyframes.windows(2)
        {
            if (pair[1].timestamp - pair[0].timestamp).0 <= TIMESTAMP_EPSILON
            {
                return Err(ClipError::DuplicateTimestamp(pair[1].timestamp));
            }
        }

        Ok(Self::from_sorted(keyframes))
    }

    /// Merge sparsely sampled per-joint channels into one keyframe sequence.
    ///
    /// Samples that share a timestamp end up in the same keyframe. `declared_length` is the
    /// duration reported by the asset; the clip's length always comes from the samples, a
    /// mismatch is only logged.
    pub fn from_channels(samples: impl IntoIterator<Item = ChannelSample>, declared_length: Option<FSeconds>) -> Result<Self, ClipError>
    {
        let mut samples: Vec<ChannelSample> = samples.into_iter().collect();
        for sample in &samples
        {
            validate_timestamp(sample.timestamp)?;
        }
        samples.sort_by(|a, b| a.timestamp.cmp(&b.timestamp)); // stable, keeps channel order within a timestamp

        let mut keyframes: Vec<Keyframe> = Vec::new();
        for sample in samples
        {
            let starts_keyframe = keyframes.last()
                .is_none_or(|last| (sample.timestamp - last.timestamp).0 > TIMESTAMP_EPSILON);
            if starts_keyframe
            {
                keyframes.push(Keyframe::new(sample.timestamp));
            }
            let last = keyframes.len() - 1;
            let keyframe = &mut keyframes[last];

            if keyframe.poses.contains_key(&sample.joint)
            {
                return Err(ClipError::DuplicateSample { joint: sample.joint, timestamp: sample.timestamp });
            }
            keyframe.poses.insert(sample.joint, sample.pose);
        }

        let clip = Self::from_sorted(keyframes);
        if let Some(declared) = declared_length
        {
            if (declared - clip.length).0.abs() > TIMESTAMP_EPSILON
            {
                log::warn!("Clip declares a length of {declared} but its last keyframe is at {}, using the keyframes", clip.length);
            }
        }
        Ok(clip)
    }

    fn from_sorted(keyframes: Vec<Keyframe>) -> Self
    {
        let length = keyframes.last().map_or(FSeconds::ZERO, |k| k.timestamp);
        Self
        {
            keyframes: keyframes.into_boxed_slice(),
            length,
        }
    }

    #[inline] #[must_use] pub fn length(&self) -> FSeconds { self.length }
    #[inline] #[must_use] pub fn keyframes(&self) -> &[Keyframe] { &self.keyframes }
    #[inline] #[must_use] pub fn keyframe_count(&self) -> usize { self.keyframes.len() }

    // Nothing to interpolate, the clip is a single fixed pose (or no pose at all)
    #[inline] #[must_use]
    pub fn is_static(&self) -> bool
    {
        self.keyframes.len() < 2 || self.length.0 <= 0.0
    }

    // Every joint name referenced by any keyframe, sorted
    pub fn channel_names(&self) -> impl Iterator<Item = &str>
    {
        let names: BTreeSet<&str> = self.keyframes.iter()
            .flat_map(|k| k.poses.keys().map(|n| n.as_str()))
            .collect();
        names.into_iter()
    }
}
