use thiserror::Error;

/// Errors returned by quACK constructors and the decoder.
///
/// The arithmetic internals are total on valid inputs; everything that can go
/// wrong surfaces either when building a sketch or when decoding one.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum QuackError {
    /// The requested threshold cannot index a single power sum.
    #[error("invalid threshold {0}: a quACK holds at least one power sum")]
    InvalidThreshold(usize),
    /// The requested threshold does not fit the precomputed power table.
    ///
    /// The table is sized by [`set_max_power_sum_threshold`](crate::set_max_power_sum_threshold)
    /// at the time of its first use and cannot grow afterwards.
    #[error("threshold {threshold} exceeds the maximum power sum threshold {max}")]
    ThresholdExceedsMax {
        /// The threshold passed to the constructor.
        threshold: usize,
        /// The number of powers per value in the already-built table.
        max: usize,
    },
    /// More identifiers are missing than the sketch can represent.
    ///
    /// The coefficient polynomial predicted `expected` missing identifiers
    /// but only `found` of the logged identifiers were roots, which proves
    /// the set difference exceeded the threshold. The only recovery is to
    /// retransmit the entire log.
    #[error("sketch saturated: expected {expected} missing identifiers, found {found}")]
    SketchSaturated {
        /// Missing identifiers predicted by the polynomial degree.
        expected: usize,
        /// Logged identifiers that were actually roots.
        found: usize,
    },
}
