//! Process-wide configuration and the lazily-built 16-bit power table.
//!
//! These are the only two pieces of ambient state in the crate. The maximum
//! power sum threshold may be written during process setup; the power table
//! sizes itself from that value the first time anything touches it and is
//! immutable from then on.

use crate::arithmetic::{ModularArithmetic, ModularInteger};
use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicUsize, Ordering};

/// The maximum power sum threshold assumed when
/// [`set_max_power_sum_threshold`] is never called.
pub const DEFAULT_MAX_POWER_SUM_THRESHOLD: usize = 20;

static MAX_POWER_SUM_THRESHOLD: AtomicUsize = AtomicUsize::new(DEFAULT_MAX_POWER_SUM_THRESHOLD);

/// Sets the maximum threshold used to size the 16-bit power table.
///
/// Call this during process setup, before constructing the first
/// [`PowerTableQuack`](crate::PowerTableQuack). The table is built on first
/// demand and sized from this value at that moment; later writes still
/// update the configuration but have no effect on an already-built table,
/// and fast-path constructors validate against the table as built.
pub fn set_max_power_sum_threshold(threshold: usize) {
    MAX_POWER_SUM_THRESHOLD.store(threshold, Ordering::SeqCst);
}

/// The configured maximum power sum threshold.
pub fn max_power_sum_threshold() -> usize {
    MAX_POWER_SUM_THRESHOLD.load(Ordering::SeqCst)
}

/// Powers of every 16-bit value in the field modulo the largest 16-bit
/// prime: row `x` holds `x^1, x^2, ..., x^max` in canonical form.
///
/// Replaces the multiplications in 16-bit insertion and evaluation with
/// table reads. The table is a few megabytes at practical thresholds and is
/// built exactly once.
pub(crate) static POWER_TABLE: Lazy<Vec<Vec<ModularInteger<u16>>>> = Lazy::new(|| {
    const NUM_U16S: usize = 1 << 16;
    let width = max_power_sum_threshold();
    let mut table = vec![vec![ModularInteger::zero(); width]; NUM_U16S];
    for (x, row) in table.iter_mut().enumerate() {
        let x = ModularInteger::new(x as u16);
        let mut xpow = x;
        for cell in row.iter_mut() {
            *cell = xpow;
            xpow.mul_assign(x);
        }
    }
    table
});

/// The number of powers per value in the table as actually built.
pub(crate) fn power_table_width() -> usize {
    POWER_TABLE[0].len()
}
