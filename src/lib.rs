//! The _quACK_ (quick ACKnowledgement) is a compact sketch with which a data
//! sender can learn exactly which of its transmitted packets a receiver has
//! not seen. The recommended implementation is the 32-bit power sum quACK,
//! [`PowerSumQuackU32`].
//!
//! A sender transmits a multiset of identifiers `S` (the same identifier may
//! be sent more than once) and keeps a log of them. A receiver holds some
//! subset `R` of `S`. Each endpoint folds the identifiers it has seen into
//! an accumulator of `threshold` running power sums over a prime field.
//! Subtracting the receiver's accumulator from the sender's yields the
//! accumulator of the set difference `S \ R`, and as long as no more than
//! `threshold` identifiers are missing, the sender recovers them exactly:
//! Newton's identities turn the difference's power sums into the
//! coefficients of the monic polynomial whose roots are the missing
//! identifiers, and each logged identifier is tested for membership by
//! evaluating that polynomial. See [`DecodedQuack`] for the full
//! reconciliation step, including the detection of sketches holding more
//! than `threshold` identifiers.
//!
//! Every accumulator operation is constant-stack and `O(threshold)` or
//! `O(threshold^2)`; nothing blocks. The only process-wide state is the
//! maximum-threshold configuration and the 16-bit power table it sizes,
//! both behind a one-time initialization gate; see
//! [`set_max_power_sum_threshold`].
//!
//! Identifiers are assumed non-adversarial: any logged identifier that was
//! never lost still evaluates to a root with probability about
//! `threshold / p` per lookup, so callers that require set (not multiset)
//! semantics or certainty deduplicate and re-check downstream.

pub mod arithmetic;

mod decode;
mod error;
mod ffi;
mod power_sum;
mod power_table;
mod precompute;

pub use decode::DecodedQuack;
pub use error::QuackError;
pub use power_sum::{PowerSumQuack, PowerSumQuackU16, PowerSumQuackU32, PowerSumQuackU64};
pub use power_table::PowerTableQuack;
pub use precompute::{
    max_power_sum_threshold, set_max_power_sum_threshold, DEFAULT_MAX_POWER_SUM_THRESHOLD,
};
