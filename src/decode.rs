use crate::arithmetic::count_trailing_zeros;
use crate::arithmetic::ModularArithmetic;
use crate::error::QuackError;
use crate::power_sum::PowerSumQuack;
use log::{debug, info, trace};
use std::fmt;

/// The result of reconciling a sender and receiver sketch against the
/// sender's transmission log.
///
/// Decoding subtracts the receiver's sketch from the sender's, converts the
/// difference to its coefficient polynomial and tests every logged
/// identifier for membership. The polynomial itself reveals how many
/// identifiers are missing, so a log scan that comes up short proves the
/// difference exceeded the threshold and decoding fails with
/// [`QuackError::SketchSaturated`].
///
/// # Examples
///
/// ```
/// use quack::{DecodedQuack, PowerSumQuack, PowerSumQuackU32};
///
/// let mut sender = PowerSumQuackU32::new(10).unwrap();
/// let mut receiver = PowerSumQuackU32::new(10).unwrap();
/// for id in [1, 2, 3, 4, 5] {
///     sender.insert(id);
/// }
/// receiver.insert(2);
/// receiver.insert(5);
///
/// let decoded = DecodedQuack::decode(sender, &receiver, vec![1, 2, 3, 4, 5]).unwrap();
/// assert_eq!(decoded.missing_ids(), vec![1, 3, 4]);
/// ```
pub struct DecodedQuack<Q: PowerSumQuack> {
    quack: Q,
    log: Vec<Q::Element>,
    // Indexes into the log of the identifiers that are missing.
    indexes: Vec<usize>,
    expected: usize,
}

impl<Q: PowerSumQuack> DecodedQuack<Q>
where
    Q::ModularElement: fmt::Debug,
{
    /// Decodes the identifiers in `log` that the receiver has not seen.
    ///
    /// The sender's sketch is consumed; it becomes the difference sketch,
    /// which the result retains. Both sketches must have the same threshold.
    /// Identifiers missing beyond the sketch's false-positive rate are
    /// reported in log order, duplicates included.
    ///
    /// # Errors
    ///
    /// [`QuackError::SketchSaturated`] when more than `threshold`
    /// identifiers are missing. The sketch cannot name them; the caller's
    /// recovery is to retransmit the entire log.
    pub fn decode(sender: Q, receiver: &Q, log: Vec<Q::Element>) -> Result<Self, QuackError> {
        let quack = sender.sub(receiver);
        let coeffs = quack.to_coeffs();
        let expected = quack.threshold() - count_trailing_zeros(&coeffs);
        info!(
            "decoding quACK: num_packets={}, num_missing={}",
            log.len(),
            expected
        );
        trace!("coeffs = {:?}", coeffs);
        let indexes: Vec<usize> = (0..log.len())
            .filter(|&i| Q::eval(&coeffs, log[i]).is_zero())
            .collect();
        debug!("indexes = {:?}", indexes);
        if indexes.len() < expected {
            return Err(QuackError::SketchSaturated {
                expected,
                found: indexes.len(),
            });
        }
        info!("found {}/{} missing packets", indexes.len(), expected);
        Ok(Self {
            quack,
            log,
            indexes,
            expected,
        })
    }
}

impl<Q: PowerSumQuack> DecodedQuack<Q> {
    /// The missing identifiers, in log order.
    pub fn missing_ids(&self) -> Vec<Q::Element> {
        self.indexes.iter().map(|&i| self.log[i]).collect()
    }

    /// The number of missing identifiers predicted by the polynomial degree,
    /// before consulting the log.
    pub fn expected(&self) -> usize {
        self.expected
    }

    /// Indexes into the log of the missing identifiers.
    pub fn indexes(&self) -> &[usize] {
        &self.indexes
    }

    /// The difference sketch the decoding was derived from.
    pub fn quack(&self) -> &Q {
        &self.quack
    }

    /// The sender log the sketch was decoded against.
    pub fn log(&self) -> &[Q::Element] {
        &self.log
    }

    /// The number of consecutive missing identifiers at the end of the log.
    /// These were likely still in transit when the receiver's sketch was
    /// sent, rather than dropped.
    pub fn num_suffix(&self) -> usize {
        let mut next = self.log.len();
        let mut count = 0;
        for &index in self.indexes.iter().rev() {
            if index + 1 != next {
                break;
            }
            next = index;
            count += 1;
        }
        count
    }

    /// The number of missing identifiers outside the in-transit suffix.
    /// It is more likely that these were dropped.
    pub fn num_missing(&self) -> usize {
        self.total_num_missing() - self.num_suffix()
    }

    /// The total number of missing identifiers, `num_missing() + num_suffix()`.
    pub fn total_num_missing(&self) -> usize {
        self.indexes.len()
    }

    /// The log indexes of the missing identifiers outside the in-transit
    /// suffix. May exceed the expected count due to false positives.
    pub fn missing(&self) -> &[usize] {
        &self.indexes[..(self.total_num_missing() - self.num_suffix())]
    }
}

impl<Q: PowerSumQuack> fmt::Display for DecodedQuack<Q> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self.indexes)
    }
}

impl<Q: PowerSumQuack> fmt::Debug for DecodedQuack<Q> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("DecodedQuack")
            .field("quack_count", &self.quack.count())
            .field("log_length", &self.log.len())
            .field("indexes", &self.indexes)
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::power_sum::{PowerSumQuack, PowerSumQuackU32};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const THRESHOLD: usize = 10;

    fn quack_pair(
        sender_values: &[u32],
        receiver_values: &[u32],
    ) -> (PowerSumQuackU32, PowerSumQuackU32) {
        let mut sender = PowerSumQuackU32::new(THRESHOLD).unwrap();
        let mut receiver = PowerSumQuackU32::new(THRESHOLD).unwrap();
        for &value in sender_values {
            sender.insert(value);
        }
        for &value in receiver_values {
            receiver.insert(value);
        }
        (sender, receiver)
    }

    #[test]
    fn test_decode_missing_identifiers() {
        let (sender, receiver) = quack_pair(&[1, 2, 3, 4, 5], &[2, 5]);
        let decoded = DecodedQuack::decode(sender, &receiver, vec![1, 2, 3, 4, 5]).unwrap();
        assert_eq!(decoded.expected(), 3);
        assert_eq!(decoded.missing_ids(), vec![1, 3, 4]);
        assert_eq!(decoded.indexes(), &[0, 2, 3]);
        assert_eq!(decoded.total_num_missing(), 3);
    }

    #[test]
    fn test_decode_empty_difference() {
        let (sender, receiver) = quack_pair(&[1, 2, 3, 4, 5], &[1, 2, 3, 4, 5]);
        let decoded = DecodedQuack::decode(sender, &receiver, vec![1, 2, 3, 4, 5]).unwrap();
        assert_eq!(decoded.expected(), 0);
        assert_eq!(decoded.missing_ids(), Vec::<u32>::new());
        assert_eq!(decoded.num_suffix(), 0);
        assert_eq!(decoded.num_missing(), 0);
    }

    #[test]
    fn test_decode_saturated_sketch() {
        let mut sender = PowerSumQuackU32::new(3).unwrap();
        let receiver = PowerSumQuackU32::new(3).unwrap();
        for value in [10, 20, 30, 40] {
            sender.insert(value);
        }
        let result = DecodedQuack::decode(sender, &receiver, vec![10, 20, 30, 40]);
        assert_eq!(
            result.unwrap_err(),
            QuackError::SketchSaturated {
                expected: 3,
                found: 0,
            }
        );
    }

    #[test]
    fn test_decode_duplicate_identifiers() {
        let (sender, receiver) = quack_pair(&[7, 7, 8], &[8]);
        let decoded = DecodedQuack::decode(sender, &receiver, vec![7, 7, 8]).unwrap();
        assert_eq!(decoded.expected(), 2);
        // 7 is a double root and matches both log occurrences.
        assert_eq!(decoded.missing_ids(), vec![7, 7]);
    }

    #[test]
    fn test_suffix_analysis() {
        let log = vec![1, 2, 3, 4, 5, 6];
        let (sender, receiver) = quack_pair(&[1, 2, 3, 4, 5, 6], &[1, 3, 4]);
        let decoded = DecodedQuack::decode(sender, &receiver, log).unwrap();
        // 2 was dropped mid-stream; 5 and 6 are the in-transit suffix.
        assert_eq!(decoded.total_num_missing(), 3);
        assert_eq!(decoded.num_suffix(), 2);
        assert_eq!(decoded.num_missing(), 1);
        assert_eq!(decoded.missing(), &[1]);
    }

    #[test]
    fn test_decode_empty_log() {
        let (sender, receiver) = quack_pair(&[], &[]);
        let decoded = DecodedQuack::decode(sender, &receiver, vec![]).unwrap();
        assert_eq!(decoded.missing_ids(), Vec::<u32>::new());
        assert_eq!(decoded.num_suffix(), 0);
    }

    #[test]
    fn test_decode_random_stream() {
        let mut rng = StdRng::seed_from_u64(1_581_349);
        let log: Vec<u32> = (0..1_000).map(|_| rng.gen()).collect();
        let dropped: Vec<usize> = vec![3, 141, 592, 653, 589, 793, 238, 462];

        let mut sender = PowerSumQuackU32::new(THRESHOLD).unwrap();
        let mut receiver = PowerSumQuackU32::new(THRESHOLD).unwrap();
        for (i, &value) in log.iter().enumerate() {
            sender.insert(value);
            if !dropped.contains(&i) {
                receiver.insert(value);
            }
        }

        let decoded = DecodedQuack::decode(sender, &receiver, log.clone()).unwrap();
        assert_eq!(decoded.expected(), dropped.len());
        let mut expected_ids: Vec<u32> = dropped.iter().map(|&i| log[i]).collect();
        expected_ids.sort_unstable();
        let mut missing_ids = decoded.missing_ids();
        missing_ids.sort_unstable();
        assert_eq!(missing_ids, expected_ids);
    }

    #[test]
    fn test_false_positives_are_rare() {
        let mut rng = StdRng::seed_from_u64(271_828);
        let lost: Vec<u32> = (0..THRESHOLD).map(|_| rng.gen()).collect();
        let mut sender = PowerSumQuackU32::new(THRESHOLD).unwrap();
        let receiver = PowerSumQuackU32::new(THRESHOLD).unwrap();
        for &value in &lost {
            sender.insert(value);
        }
        let quack = sender.sub(&receiver);

        // Identifiers that were never lost land on a root with probability
        // about threshold / p each; at these sizes, none should.
        let never_lost: Vec<u32> = (0..10_000)
            .map(|_| rng.gen())
            .filter(|value| !lost.contains(value))
            .collect();
        let matched = quack.decode_with_log(&never_lost);
        assert!(matched.is_empty(), "false positives: {:?}", matched);
    }

    #[test]
    fn test_display_and_debug() {
        let (sender, receiver) = quack_pair(&[1, 2], &[1]);
        let decoded = DecodedQuack::decode(sender, &receiver, vec![1, 2]).unwrap();
        assert_eq!(format!("{}", decoded), "[1]");
        let debug = format!("{:?}", decoded);
        assert!(debug.contains("quack_count"));
        assert!(debug.contains("indexes: [1]"));
    }
}
