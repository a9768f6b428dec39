mod joint;
pub use joint::*;

mod skeleton;
pub use skeleton::*;

mod clip;
pub use clip::*;

mod animator;
pub use animator::*;

mod skin;
pub use skin::*;

mod rig;
pub use rig::*;

mod clip_cache;
pub use clip_cache::*;
