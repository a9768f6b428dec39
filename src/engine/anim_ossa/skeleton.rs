use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use glam::Mat4;
use math_ossa::Transform;
use crate::{AnimationClip, Joint, JointDesc, JointIndex, JointSlot, MAX_JOINTS};

// Bind transforms with a smaller determinant than this can't be meaningfully inverted
const MIN_BIND_DETERMINANT: f32 = 1e-8;

#[derive(Debug, Clone, PartialEq)]
pub enum SkeletonError
{
    Empty,
    MissingRoot,
    MultipleRoots { first: JointIndex, second: JointIndex },
    DuplicateIndex(JointIndex),
    DuplicateName(String),
    UnknownParent { joint: JointIndex, parent: JointIndex },
    Cycle(JointIndex), // a joint whose parent chain never reaches the root
    IndexOutOfRange(JointIndex), // index >= MAX_JOINTS and truncation is not allowed
    NonInvertibleBind(JointIndex),
}
impl Display for SkeletonError
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result { Debug::fmt(self, f) }
}
impl Error for SkeletonError { }

/// Collects joint descriptors and builds them into a [`Skeleton`].
///
/// Descriptors may be added in any order; parents are referenced by their joint index.
/// By default a joint index at or beyond [`MAX_JOINTS`] fails the build. With
/// [`SkeletonBuilder::allow_truncation`] such joints are kept (they still animate and
/// propagate to their children) but are left out of the skinning matrices.
#[derive(Debug, Default)]
pub struct SkeletonBuilder
{
    joints: Vec<JointDesc>,
    allow_truncation: bool,
}
impl SkeletonBuilder
{
    pub fn new() -> Self { Self::default() }

    #[must_use]
    pub fn allow_truncation(mut self, allow: bool) -> Self
    {
        self.allow_truncation = allow;
        self
    }

    pub fn add_joint(&mut self, joint: JointDesc) -> &mut Self
    {
        self.joints.push(joint);
        self
    }

    #[must_use]
    pub fn with_joint(mut self, joint: JointDesc) -> Self
    {
        self.joints.push(joint);
        self
    }

    pub fn build(self) -> Result<Skeleton, SkeletonError>
    {
        let descs = self.joints;
        if descs.is_empty()
        {
            return Err(SkeletonError::Empty);
        }

        let mut positions = HashMap::with_capacity(descs.len());
        let mut names = HashSet::with_capacity(descs.len());
        let mut root = None;
        for (i, desc) in descs.iter().enumerate()
        {
            if positions.insert(desc.index, i).is_some()
            {
                return Err(SkeletonError::DuplicateIndex(desc.index));
            }
            if !names.insert(desc.name.as_str())
            {
                return Err(SkeletonError::DuplicateName(desc.name.clone()));
            }
            if !desc.index.is_skinnable()
            {
                match self.allow_truncation
                {
                    true => log::warn!("Joint '{}' {} is beyond the skinning limit of {MAX_JOINTS} joints and will not be skinned", desc.name, desc.index),
                    false => return Err(SkeletonError::IndexOutOfRange(desc.index)),
                }
            }
            if desc.parent.is_none()
            {
                match root
                {
                    None => root = Some(i),
                    Some(first) => return Err(SkeletonError::MultipleRoots { first: descs[first].index, second: desc.index }),
                }
            }
        }
        let root = root.ok_or(SkeletonError::MissingRoot)?;

        // children in descriptor order
        let mut children = vec![Vec::new(); descs.len()];
        for (i, desc) in descs.iter().enumerate()
        {
            let Some(parent) = desc.parent else { continue; };
            if parent == desc.index
            {
                return Err(SkeletonError::Cycle(desc.index));
            }
            let parent_pos = *positions.get(&parent)
                .ok_or(SkeletonError::UnknownParent { joint: desc.index, parent })?;
            children[parent_pos].push(i);
        }

        // pre-order walk from the root, every joint's parent lands in an earlier slot
        let mut order = Vec::with_capacity(descs.len());
        let mut slot_of = vec![JointSlot::none(); descs.len()];
        let mut stack = vec![root];
        while let Some(pos) = stack.pop()
        {
            slot_of[pos] = JointSlot::some(order.len());
            order.push(pos);
            stack.extend(children[pos].iter().rev());
        }

        // each joint has exactly one known parent, so anything the walk missed loops back on itself
        if order.len() != descs.len()
        {
            let stranded = slot_of.iter().position(|s| s.is_none()).unwrap_or(0);
            return Err(SkeletonError::Cycle(descs[stranded].index));
        }

        let mut joints: Vec<Joint> = order.iter().map(|&pos|
        {
            let desc = &descs[pos];
            Joint
            {
                index: desc.index,
                name: desc.name.clone(),
                parent: desc.parent
                    .and_then(|p| positions.get(&p))
                    .map_or(JointSlot::none(), |&p| slot_of[p]),
                children: children[pos].iter().map(|&c| slot_of[c]).collect(),
                local_bind: desc.local_bind,
                inverse_bind: Mat4::IDENTITY,
                animated: Mat4::IDENTITY,
            }
        }).collect();

        compute_inverse_binds(&mut joints)?;

        let by_name = joints.iter().enumerate()
            .map(|(slot, joint)| (joint.name.clone(), JointSlot::some(slot)))
            .collect();

        log::debug!("Built skeleton with {} joints, root '{}'", joints.len(), joints[0].name);

        Ok(Skeleton
        {
            joints: joints.into_boxed_slice(),
            by_name,
        })
    }
}

// Single top-down pass, starting from identity. Only ever run while building
fn compute_inverse_binds(joints: &mut [Joint]) -> Result<(), SkeletonError>
{
    for slot in 0..joints.len()
    {
        let parent_global = match joints[slot].parent.get()
        {
            Some(parent) => joints[parent].animated,
            None => Mat4::IDENTITY,
        };
        let joint = &mut joints[slot];
        let global_bind = parent_global * joint.local_bind.to_world_mtx();

        let determinant = global_bind.determinant();
        if !determinant.is_finite() || determinant.abs() < MIN_BIND_DETERMINANT
        {
            return Err(SkeletonError::NonInvertibleBind(joint.index));
        }

        joint.inverse_bind = global_bind.inverse();
        joint.animated = global_bind; // start out in bind pose
    }
    Ok(())
}

/// A built joint hierarchy.
///
/// Joints live in a flat arena in pre-order: the root is slot 0 and every joint's
/// parent occupies an earlier slot, so a single forward pass visits parents before children.
#[derive(Debug, Clone)]
pub struct Skeleton
{
    joints: Box<[Joint]>,
    by_name: HashMap<String, JointSlot>,
}
impl Skeleton
{
    #[inline] #[must_use] pub fn root(&self) -> &Joint { &self.joints[0] }
    #[inline] #[must_use] pub fn joints(&self) -> &[Joint] { &self.joints }
    #[inline] #[must_use] pub fn len(&self) -> usize { self.joints.len() }
    #[inline] #[must_use] pub fn is_empty(&self) -> bool { self.joints.is_empty() }

    #[inline] #[must_use]
    pub fn joint(&self, slot: JointSlot) -> Option<&Joint>
    {
        slot.get().and_then(|s| self.joints.get(s))
    }

    #[inline] #[must_use]
    pub fn find_slot(&self, name: &str) -> Option<JointSlot>
    {
        self.by_name.get(name).copied()
    }

    #[inline] #[must_use]
    pub fn find(&self, name: &str) -> Option<&Joint>
    {
        self.find_slot(name).and_then(|s| self.joint(s))
    }

    #[must_use]
    pub fn find_by_index(&self, index: JointIndex) -> Option<&Joint>
    {
        self.joints.iter().find(|j| j.index == index)
    }

    // Model-space bind transform, rebuilt from the local bind chain
    #[must_use]
    pub fn model_bind_transform(&self, slot: JointSlot) -> Option<Mat4>
    {
        let mut joint = self.joint(slot)?;
        let mut transform = joint.local_bind.to_world_mtx();
        while let Some(parent) = self.joint(joint.parent)
        {
            transform = parent.local_bind.to_world_mtx() * transform;
            joint = parent;
        }
        Some(transform)
    }

    // Channel names in the clip that don't match any joint here. These are ignored during playback
    #[must_use]
    pub fn unmatched_channels<'c>(&self, clip: &'c AnimationClip) -> Vec<&'c str>
    {
        clip.channel_names().filter(|name| !self.by_name.contains_key(*name)).collect()
    }

    /// Recompute every animated transform from per-joint local poses, parents first.
    pub fn apply_local_poses(&mut self, mut local_pose: impl FnMut(&Joint) -> Transform)
    {
        for slot in 0..self.joints.len()
        {
            let local = local_pose(&self.joints[slot]).to_world_mtx();
            let parent_animated = match self.joints[slot].parent.get()
            {
                Some(parent) => self.joints[parent].animated,
                None => Mat4::IDENTITY,
            };
            self.joints[slot].animated = parent_animated * local;
        }
    }

    pub fn reset_to_bind_pose(&mut self)
    {
        self.apply_local_poses(|joint| joint.local_bind);
    }
}
