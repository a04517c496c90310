//! Uniform sampling of [`U256`] values within a range.
//!
//! Address counts of IPv6 blocks routinely exceed the 64-bit (and for `::/0` even the 128-bit)
//! range, so picking a random index requires sampling over big integers. Samples are drawn
//! by rejection: random bytes covering the bit length of the range are masked so the draw
//! never exceeds the next power of two, and draws outside the range are discarded. This keeps
//! the result free of modulo bias, at the cost of (on average less than two) extra draws.

use crate::U256;
use rand::Rng;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Error returned when sampling from a range where `min > max`.
pub struct InvalidRangeError {
    min: U256,
    max: U256,
}

impl InvalidRangeError {
    /// The (inclusive) lower bound that was requested.
    #[must_use]
    pub fn min(&self) -> U256 {
        self.min
    }

    /// The (exclusive) upper bound that was requested.
    #[must_use]
    pub fn max(&self) -> U256 {
        self.max
    }
}

impl fmt::Display for InvalidRangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid range: min ({}) is greater than max ({})",
            self.min, self.max
        )
    }
}

impl std::error::Error for InvalidRangeError {}

/// Sample a uniformly distributed value `v` with `min <= v < max`.
///
/// Returns `min` when `min == max`.
///
/// # Errors
///
/// Returns [`InvalidRangeError`] when `min > max`.
pub fn sample_u256_range<R>(rng: &mut R, min: U256, max: U256) -> Result<U256, InvalidRangeError>
where
    R: Rng + ?Sized,
{
    if min > max {
        return Err(InvalidRangeError { min, max });
    }
    if min == max {
        return Ok(min);
    }

    let upper = max - min - U256::one();
    if upper.is_zero() {
        return Ok(min);
    }

    let bits = upper.bits();
    let len = bits.div_ceil(8);
    let mask = match bits % 8 {
        0 => u8::MAX,
        rem => (1u8 << rem) - 1,
    };

    let mut buf = [0u8; 32];
    loop {
        rng.fill_bytes(&mut buf[..len]);
        buf[len - 1] &= mask;

        let candidate = U256::from_little_endian(&buf[..len]);
        if candidate <= upper {
            return Ok(min + candidate);
        }
    }
}

/// Sample a uniformly distributed value `v` with `min <= v < max`
/// using the thread-local random number generator.
///
/// See [`sample_u256_range`] for more information.
///
/// # Errors
///
/// Returns [`InvalidRangeError`] when `min > max`.
pub fn random_u256_range(min: U256, max: U256) -> Result<U256, InvalidRangeError> {
    sample_u256_range(&mut rand::rng(), min, max)
}

/// Extends any [`Rng`] with uniform [`U256`] range sampling.
pub trait RngU256Ext: Rng {
    /// Sample a uniformly distributed value `v` with `min <= v < max`.
    ///
    /// See [`sample_u256_range`] for more information.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidRangeError`] when `min > max`.
    fn random_u256_range(&mut self, min: U256, max: U256) -> Result<U256, InvalidRangeError> {
        sample_u256_range(self, min, max)
    }
}

impl<R: Rng + ?Sized> RngU256Ext for R {}
