// Panic in debug builds, no-op in release. For states that are bugs but are survivable at runtime
#[macro_export]
macro_rules! debug_panic
{
    ($($arg:tt)*) =>
    {
        if cfg!(debug_assertions)
        {
            panic!($($arg)*)
        }
    }
}
