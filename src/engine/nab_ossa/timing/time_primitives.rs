use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::ops::{Add, AddAssign, Div, Mul, Sub};
use std::time::Duration;

macro_rules! generate_time_primitive
{
    ($name:ident, $type:ty, $suffix:literal) =>
    {
        #[derive(Debug, Default, Clone, Copy, PartialEq, PartialOrd)]
        pub struct $name(pub $type);
        impl $name
        {
            pub const ZERO: Self = Self(0.0);

            #[inline] #[must_use] pub fn is_finite(self) -> bool { self.0.is_finite() }
            #[inline] #[must_use] pub fn clamp(self, low: Self, high: Self) -> Self { Self(self.0.clamp(low.0, high.0)) }
            // wraps into [0, period), negative values wrap from the end
            #[inline] #[must_use]
            pub fn wrap(self, period: Self) -> Self
            {
                // rem_euclid rounds tiny negatives up to exactly `period`
                let wrapped = self.0.rem_euclid(period.0);
                match wrapped < period.0
                {
                    true => Self(wrapped),
                    false => Self::ZERO,
                }
            }
        }
        // total_cmp keeps this well defined for NaN
        impl Ord for $name
        {
            fn cmp(&self, other: &Self) -> Ordering { self.0.total_cmp(&other.0) }
        }
        impl Eq for $name { }
        impl Add for $name
        {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output { Self(self.0 + rhs.0) }
        }
        impl AddAssign for $name
        {
            fn add_assign(&mut self, rhs: Self) { self.0 += rhs.0; }
        }
        impl Sub for $name
        {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output { Self(self.0 - rhs.0) }
        }
        impl Mul for $name
        {
            type Output = Self;
            fn mul(self, rhs: Self) -> Self::Output { Self(self.0 * rhs.0) }
        }
        impl Div for $name
        {
            type Output = Self;
            fn div(self, rhs: Self) -> Self::Output { Self(self.0 / rhs.0) }
        }
        impl Display for $name
        {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result
            {
                write!(f, "{:.3}{}", self.0, $suffix)
            }
        }
    };
}

generate_time_primitive!(FSeconds, f32, "s");
generate_time_primitive!(FMilliseconds, f32, "ms");

impl From<FSeconds> for FMilliseconds { fn from(sec: FSeconds) -> Self { Self(sec.0 * 1_000.0) } }
impl From<FMilliseconds> for FSeconds { fn from(ms: FMilliseconds) -> Self { Self(ms.0 / 1_000.0) } }

impl From<FMilliseconds> for Duration { fn from(ms: FMilliseconds) -> Self { Self::from_secs_f32(ms.0 / 1_000.0) } }
impl From<FSeconds> for Duration { fn from(sec: FSeconds) -> Self { Self::from_secs_f32(sec.0) } }
impl From<Duration> for FSeconds { fn from(duration: Duration) -> Self { Self(duration.as_secs_f32()) } }
