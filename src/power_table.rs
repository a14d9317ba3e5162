use crate::arithmetic::{
    self, CoefficientVector, InverseTable, ModularArithmetic, ModularInteger,
};
use crate::error::QuackError;
use crate::power_sum::PowerSumQuack;
use crate::precompute::{power_table_width, POWER_TABLE};
use serde::{Deserialize, Serialize};

/// 16-bit power sum quACK backed by the precomputed power table.
///
/// Precomputing `x^1..x^max` for every 16-bit value replaces the
/// multiplications in insertion, removal and evaluation with table reads,
/// which is cache-friendly at small thresholds. The table is shared
/// process-wide and sized by
/// [`set_max_power_sum_threshold`](crate::set_max_power_sum_threshold) at
/// its first use, so this constructor is the one place a threshold can be
/// rejected for being too large. Precomputed powers stop paying for
/// themselves at wider identifier widths, where the table would be
/// gigabytes; those widths only get the generic path.
///
/// Decodes identically to [`PowerSumQuackU16`](crate::PowerSumQuackU16).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerTableQuack {
    power_sums: Vec<ModularInteger<u16>>,
    inverses: InverseTable<u16>,
    last_value: Option<ModularInteger<u16>>,
    count: u32,
}

impl PowerSumQuack for PowerTableQuack {
    type Element = u16;
    type ModularElement = ModularInteger<u16>;

    fn new(threshold: usize) -> Result<Self, QuackError> {
        if threshold == 0 {
            return Err(QuackError::InvalidThreshold(threshold));
        }
        // Forces the table build on first use.
        let max = power_table_width();
        if threshold > max {
            return Err(QuackError::ThresholdExceedsMax { threshold, max });
        }
        Ok(Self {
            power_sums: vec![ModularInteger::zero(); threshold],
            inverses: InverseTable::new(threshold),
            last_value: None,
            count: 0,
        })
    }

    fn threshold(&self) -> usize {
        self.power_sums.len()
    }

    fn count(&self) -> u32 {
        self.count
    }

    fn last_value(&self) -> Option<Self::Element> {
        self.last_value.map(|value| value.value())
    }

    fn insert(&mut self, value: Self::Element) {
        let x = ModularInteger::new(value);
        let row = &POWER_TABLE[x.value() as usize];
        for (sum, power) in self.power_sums.iter_mut().zip(row.iter()) {
            sum.add_assign(*power);
        }
        self.count = self.count.wrapping_add(1);
        self.last_value = Some(x);
    }

    fn remove(&mut self, value: Self::Element) {
        let x = ModularInteger::new(value);
        let row = &POWER_TABLE[x.value() as usize];
        for (sum, power) in self.power_sums.iter_mut().zip(row.iter()) {
            sum.sub_assign(*power);
        }
        self.count = self.count.wrapping_sub(1);
        if let Some(last_value) = self.last_value {
            if last_value.value() == value {
                self.last_value = None;
            }
        }
    }

    fn clear(&mut self) {
        for sum in self.power_sums.iter_mut() {
            *sum = ModularInteger::zero();
        }
        self.count = 0;
        self.last_value = None;
    }

    fn sub_assign(&mut self, rhs: &Self) {
        assert_eq!(
            self.threshold(),
            rhs.threshold(),
            "expected subtracted quacks to have the same threshold"
        );
        for (sum, other) in self.power_sums.iter_mut().zip(rhs.power_sums.iter()) {
            sum.sub_assign(*other);
        }
        self.count = self.count.wrapping_sub(rhs.count);
        self.last_value = None;
    }

    fn to_coeffs_preallocated(&self, coeffs: &mut CoefficientVector<Self::ModularElement>) {
        arithmetic::to_monic_coefficients(&self.power_sums, &self.inverses, coeffs);
    }

    fn eval(coeffs: &CoefficientVector<Self::ModularElement>, x: u16) -> Self::ModularElement {
        arithmetic::eval_precompute(coeffs, x)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::power_sum::PowerSumQuackU16;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const THRESHOLD: usize = 16;

    #[test]
    fn test_threshold_bounds() {
        assert_eq!(
            PowerTableQuack::new(0).unwrap_err(),
            QuackError::InvalidThreshold(0)
        );
        let max = power_table_width();
        assert_eq!(
            PowerTableQuack::new(1_000).unwrap_err(),
            QuackError::ThresholdExceedsMax {
                threshold: 1_000,
                max,
            }
        );
        assert!(PowerTableQuack::new(max).is_ok());
    }

    #[test]
    fn test_insert_and_remove_match_generic_sums() {
        let mut table_quack = PowerTableQuack::new(THRESHOLD).unwrap();
        let mut generic_quack = PowerSumQuackU16::new(THRESHOLD).unwrap();
        for value in [0u16, 1, 9_187, 44_875, 65_520, 65_535] {
            table_quack.insert(value);
            generic_quack.insert(value);
        }
        table_quack.remove(9_187);
        generic_quack.remove(9_187);
        assert_eq!(table_quack.to_coeffs(), generic_quack.to_coeffs());
        assert_eq!(table_quack.count(), generic_quack.count());
    }

    #[test]
    fn test_subtract_and_decode() {
        let mut q1 = PowerTableQuack::new(THRESHOLD).unwrap();
        let mut q2 = PowerTableQuack::new(THRESHOLD).unwrap();
        for value in [1, 2, 3, 4, 5] {
            q1.insert(value);
        }
        q2.insert(1);
        q2.insert(2);
        let quack = q1.sub(&q2);
        assert_eq!(quack.count(), 3);
        assert_eq!(quack.last_value(), None);
        assert_eq!(quack.decode_with_log(&[1, 2, 3, 4, 5]), vec![3, 4, 5]);
    }

    #[test]
    fn test_decode_with_multiplicity() {
        let mut quack = PowerTableQuack::new(THRESHOLD).unwrap();
        quack.insert(10);
        quack.insert(10);
        assert_eq!(quack.decode_with_log(&[10, 10, 20]), vec![10, 10]);
    }

    #[test]
    fn test_fast_path_decodes_like_generic_path() {
        let mut rng = StdRng::seed_from_u64(928_473);
        let log: Vec<u16> = (0..1_000).map(|_| rng.gen()).collect();

        let mut table_sender = PowerTableQuack::new(THRESHOLD).unwrap();
        let mut table_receiver = PowerTableQuack::new(THRESHOLD).unwrap();
        let mut generic_sender = PowerSumQuackU16::new(THRESHOLD).unwrap();
        let mut generic_receiver = PowerSumQuackU16::new(THRESHOLD).unwrap();

        // The receiver misses 12 identifiers scattered through the stream.
        let dropped: Vec<usize> = (0..12).map(|i| i * 83 + 7).collect();
        for (i, &value) in log.iter().enumerate() {
            table_sender.insert(value);
            generic_sender.insert(value);
            if !dropped.contains(&i) {
                table_receiver.insert(value);
                generic_receiver.insert(value);
            }
        }

        let table_diff = table_sender.sub(&table_receiver);
        let generic_diff = generic_sender.sub(&generic_receiver);
        let table_missing = table_diff.decode_with_log(&log);
        let generic_missing = generic_diff.decode_with_log(&log);
        assert_eq!(table_missing, generic_missing);
        for &i in &dropped {
            assert!(table_missing.contains(&log[i]));
        }
    }
}
