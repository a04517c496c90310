//! time utilities.
//!
//! Expiry bookkeeping in `iprot` is expressed in unix milliseconds,
//! these helpers produce such timestamps cheaply.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

const RESYNC_EVERY_MS: u64 = 60 * 60 * 1000;

struct State {
    start_instant: Instant,

    // Cached base unix ms and the monotonic elapsed ms at which that base was captured.
    //
    // Updated independently and best effort: a reader racing a resync can observe
    // a small jump, which the next resync corrects.
    base_unix_ms: AtomicI64,
    base_elapsed_ms: AtomicU64,

    last_resync_elapsed_ms: AtomicU64,
}

impl State {
    fn init() -> Self {
        let start_instant = Instant::now();
        let unix_ms = unix_timestamp_millis();

        Self {
            start_instant,
            base_unix_ms: AtomicI64::new(unix_ms),
            base_elapsed_ms: AtomicU64::new(0),
            last_resync_elapsed_ms: AtomicU64::new(0),
        }
    }

    fn elapsed_ms_now(&self) -> u64 {
        duration_as_millis_u64(self.start_instant.elapsed())
    }

    fn maybe_resync(&self, elapsed_now_ms: u64) {
        let last = self.last_resync_elapsed_ms.load(Ordering::Relaxed);
        if elapsed_now_ms.saturating_sub(last) < RESYNC_EVERY_MS {
            return;
        }

        // first thread to move the marker performs the resync
        if self
            .last_resync_elapsed_ms
            .compare_exchange(last, elapsed_now_ms, Ordering::Relaxed, Ordering::Relaxed)
            .is_err()
        {
            return;
        }

        let unix_now_ms = unix_timestamp_millis();
        self.base_unix_ms.store(unix_now_ms, Ordering::Relaxed);
        self.base_elapsed_ms.store(elapsed_now_ms, Ordering::Relaxed);
    }

    fn now_unix_ms(&self) -> i64 {
        let elapsed_now_ms = self.elapsed_ms_now();
        self.maybe_resync(elapsed_now_ms);

        let base_unix = self.base_unix_ms.load(Ordering::Relaxed);
        let base_elapsed = self.base_elapsed_ms.load(Ordering::Relaxed);

        let delta = elapsed_now_ms.saturating_sub(base_elapsed);
        base_unix.saturating_add(i64::try_from(delta).unwrap_or(i64::MAX))
    }
}

/// Converts a [`Duration`] to milliseconds as i64 with saturation.
///
/// Large durations saturate at `i64::MAX`.
#[must_use]
pub fn duration_as_millis_i64(d: Duration) -> i64 {
    i64::try_from(d.as_millis()).unwrap_or(i64::MAX)
}

fn duration_as_millis_u64(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

/// Returns the current unix timestamp in milliseconds as i64.
///
/// This reads the system clock each call.
/// The value is negative only if the system clock is before the unix epoch.
#[must_use]
pub fn unix_timestamp_millis() -> i64 {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(d) => duration_as_millis_i64(d),
        Err(e) => -duration_as_millis_i64(e.duration()),
    }
}

/// Returns an approximate unix timestamp in milliseconds.
///
/// Derived from a monotonic clock, so it never goes backwards between resyncs.
/// The wall clock is resynced about once per hour, meaning system clock
/// adjustments are not reflected immediately.
#[must_use]
pub fn now_unix_ms() -> i64 {
    static STATE: OnceLock<State> = OnceLock::new();
    let state = STATE.get_or_init(State::init);
    state.now_unix_ms()
}

/// Returns the approximate unix timestamp in milliseconds
/// at which the given `ttl` will have passed, counting from now.
#[must_use]
pub fn unix_ms_after(ttl: Duration) -> i64 {
    now_unix_ms().saturating_add(duration_as_millis_i64(ttl))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn unix_timestamp_millis_is_non_decreasing() {
        let a = unix_timestamp_millis();
        let b = unix_timestamp_millis();
        assert!(b >= a);
    }

    #[test]
    fn now_unix_ms_is_non_decreasing() {
        let a = now_unix_ms();
        thread::sleep(Duration::from_millis(2));
        let b = now_unix_ms();
        assert!(b >= a);
    }

    #[test]
    fn now_unix_ms_is_close_to_system_clock() {
        let sys = unix_timestamp_millis();
        let approx = now_unix_ms();
        let diff = (sys - approx).abs();
        assert!(diff <= 1_000);
    }

    #[test]
    fn unix_ms_after_is_in_the_future() {
        let now = now_unix_ms();
        let later = unix_ms_after(Duration::from_secs(60));
        assert!(later >= now + 60_000);
    }

    #[test]
    fn huge_durations_saturate() {
        assert_eq!(duration_as_millis_i64(Duration::MAX), i64::MAX);
        assert_eq!(unix_ms_after(Duration::MAX), i64::MAX);
    }
}
