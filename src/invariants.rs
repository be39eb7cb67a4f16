//! Debug assertion macros for the ring/buffer invariants documented in
//! `SPEC_FULL.md` §3. Only active in debug builds, zero overhead in release.

// =============================================================================
// INV-RING-01: Bounded Size
// =============================================================================

/// Assert that `size` never exceeds `capacity`.
///
/// Used in: `Ring::push`
macro_rules! debug_assert_bounded_size {
    ($size:expr, $capacity:expr) => {
        debug_assert!(
            $size <= $capacity,
            "INV-RING-01 violated: size {} exceeds capacity {}",
            $size,
            $capacity
        )
    };
}

// =============================================================================
// INV-RING-02: Sentinel Consistency
// =============================================================================

/// Assert that `start`/`end` are both `None` iff `size == 0`.
///
/// Used in: `Ring::push`, `Ring::reset`
macro_rules! debug_assert_sentinel_consistent {
    ($start:expr, $end:expr, $size:expr) => {
        debug_assert!(
            ($size == 0) == ($start.is_none() && $end.is_none()),
            "INV-RING-02 violated: start={:?} end={:?} size={}",
            $start,
            $end,
            $size
        )
    };
}

// =============================================================================
// INV-BUF-01: No Delivery After Close
// =============================================================================

/// Assert that a watcher removed from the list was actually closed first.
///
/// Used in: `Dispatcher::evict`
macro_rules! debug_assert_closed_before_removed {
    ($is_cancelled:expr) => {
        debug_assert!(
            $is_cancelled,
            "INV-BUF-01 violated: watcher removed from list while not closed"
        )
    };
}

pub(crate) use debug_assert_bounded_size;
pub(crate) use debug_assert_closed_before_removed;
pub(crate) use debug_assert_sentinel_consistent;
