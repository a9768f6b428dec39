// Where `value` sits between `from` and `to`, 0 at `from`, 1 at `to`. Unclamped
#[inline] #[must_use]
pub fn inv_lerp(from: f32, to: f32, value: f32) -> f32
{
    (value - from) / (to - from)
}
