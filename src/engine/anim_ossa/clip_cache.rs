use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use parking_lot::Mutex;
use crate::AnimationClip;

/// Shares loaded clips between rigs, keyed by asset path.
///
/// There is no global instance; whoever owns asset loading owns the cache and passes it
/// around. Clips stay alive as long as anything (including the cache) references them,
/// call [`ClipCache::purge_unused`] periodically to drop clips only the cache still holds.
#[derive(Debug, Default)]
pub struct ClipCache
{
    clips: Mutex<HashMap<PathBuf, Arc<AnimationClip>>>,
}
impl ClipCache
{
    pub fn new() -> Self { Self::default() }

    #[must_use]
    pub fn get(&self, path: impl AsRef<Path>) -> Option<Arc<AnimationClip>>
    {
        self.clips.lock().get(path.as_ref()).cloned()
    }

    // Add or replace a clip. Rigs already playing a replaced clip keep their copy
    pub fn insert(&self, path: impl Into<PathBuf>, clip: AnimationClip) -> Arc<AnimationClip>
    {
        let clip = Arc::new(clip);
        self.clips.lock().insert(path.into(), clip.clone());
        clip
    }

    /// Return the cached clip for `path`, or load it with `loader` and cache the result.
    ///
    /// The lock is not held while loading. If two callers race to load the same path the
    /// first clip to finish wins and both get it. Load errors are returned and nothing is cached.
    pub fn get_or_load<E>(&self, path: impl AsRef<Path>, loader: impl FnOnce(&Path) -> Result<AnimationClip, E>) -> Result<Arc<AnimationClip>, E>
    {
        let path = path.as_ref();
        if let Some(clip) = self.get(path)
        {
            return Ok(clip);
        }

        let loaded = Arc::new(loader(path)?);
        log::debug!("Loaded clip {path:?} ({} keyframes, {})", loaded.keyframe_count(), loaded.length());

        let mut clips = self.clips.lock();
        Ok(clips.entry(path.to_path_buf()).or_insert(loaded).clone())
    }

    pub fn remove(&self, path: impl AsRef<Path>) -> bool
    {
        self.clips.lock().remove(path.as_ref()).is_some()
    }

    // Drop every clip that nothing outside the cache references. Returns how many were dropped
    pub fn purge_unused(&self) -> usize
    {
        let mut clips = self.clips.lock();
        let before = clips.len();
        clips.retain(|path, clip|
        {
            let in_use = Arc::strong_count(clip) > 1;
            if !in_use
            {
                log::debug!("Clip {path:?} erased");
            }
            in_use
        });
        before - clips.len()
    }

    #[inline] #[must_use] pub fn len(&self) -> usize { self.clips.lock().len() }
    #[inline] #[must_use] pub fn is_empty(&self) -> bool { self.clips.lock().is_empty() }
}

#[cfg(test)]
mod tests
{
    use std::thread;
    use nab_ossa::timing::FSeconds;
    use crate::Keyframe;
    use super::*;

    fn make_clip(length: f32) -> AnimationClip
    {
        AnimationClip::new(vec![Keyframe::new(FSeconds(0.0)), Keyframe::new(FSeconds(length))]).unwrap()
    }

    #[test]
    fn loads_once()
    {
        let cache = ClipCache::new();
        let mut loads = 0;

        let a = cache.get_or_load("walk.anim", |_| { loads += 1; Ok::<_, ()>(make_clip(1.0)) }).unwrap();
        let b = cache.get_or_load("walk.anim", |_| { loads += 1; Ok::<_, ()>(make_clip(2.0)) }).unwrap();

        assert_eq!(loads, 1);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(b.length(), FSeconds(1.0));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn load_errors_not_cached()
    {
        let cache = ClipCache::new();
        let failed = cache.get_or_load("bad.anim", |path| Err(format!("can't read {}", path.display())));
        assert_eq!(failed.unwrap_err(), "can't read bad.anim");
        assert!(cache.is_empty());
        assert!(cache.get("bad.anim").is_none());
    }

    #[test]
    fn purge_unused()
    {
        let cache = ClipCache::new();
        let kept = cache.insert("run.anim", make_clip(1.0));
        let _ = cache.insert("idle.anim", make_clip(3.0));

        assert_eq!(cache.purge_unused(), 1);
        assert!(cache.get("idle.anim").is_none());
        assert!(Arc::ptr_eq(&cache.get("run.anim").unwrap(), &kept));

        drop(kept);
        assert_eq!(cache.purge_unused(), 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn remove()
    {
        let cache = ClipCache::new();
        let clip = cache.insert("jump.anim", make_clip(0.5));
        assert!(cache.remove("jump.anim"));
        assert!(!cache.remove("jump.anim"));
        // outstanding references are unaffected
        assert_eq!(clip.length(), FSeconds(0.5));
    }

    #[test]
    fn shared_across_threads()
    {
        let cache = ClipCache::new();
        let clips: Vec<_> = thread::scope(|scope|
        {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| cache.get_or_load("shared.anim", |_| Ok::<_, ()>(make_clip(1.0))).unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(cache.len(), 1);
        let cached = cache.get("shared.anim").unwrap();
        assert!(clips.iter().all(|c| Arc::ptr_eq(c, &cached)));
    }
}
