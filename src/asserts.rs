//! Tiered debug assertions.
//!
//! Internal invariants (tableau shape, contraction monotonicity, conflict-analysis bookkeeping)
//! are checked at a level selectable at compile time, so that the cheaper invariants stay on in
//! release builds while the expensive ones (full tableau re-derivation, full interval-subset
//! checks) only run under test or the `debug-checks` feature.

#[cfg(all(not(test), not(feature = "debug-checks")))]
pub const ASSERT_LEVEL: u8 = ASSERT_SIMPLE;

#[cfg(any(test, feature = "debug-checks"))]
pub const ASSERT_LEVEL: u8 = ASSERT_EXTREME;

pub const ASSERT_SIMPLE: u8 = 1;
pub const ASSERT_MODERATE: u8 = 2;
pub const ASSERT_ADVANCED: u8 = 3;
pub const ASSERT_EXTREME: u8 = 4;

#[macro_export]
#[doc(hidden)]
macro_rules! solver_assert_simple {
    ($($arg:tt)*) => {
        if $crate::asserts::ASSERT_LEVEL >= $crate::asserts::ASSERT_SIMPLE {
            assert!($($arg)*);
        }
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! solver_assert_moderate {
    ($($arg:tt)*) => {
        if $crate::asserts::ASSERT_LEVEL >= $crate::asserts::ASSERT_MODERATE {
            assert!($($arg)*);
        }
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! solver_assert_advanced {
    ($($arg:tt)*) => {
        if $crate::asserts::ASSERT_LEVEL >= $crate::asserts::ASSERT_ADVANCED {
            assert!($($arg)*);
        }
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! solver_assert_extreme {
    ($($arg:tt)*) => {
        if $crate::asserts::ASSERT_LEVEL >= $crate::asserts::ASSERT_EXTREME {
            assert!($($arg)*);
        }
    };
}
