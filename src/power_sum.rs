use crate::arithmetic::{
    self, CoefficientVector, InverseTable, ModularArithmetic, ModularInteger,
};
use crate::error::QuackError;
use serde::{Deserialize, Serialize};

/// A quACK represented by a threshold number of power sums.
///
/// A sender and a receiver each accumulate the identifiers they have seen.
/// Subtracting the receiver's sketch from the sender's yields a sketch of
/// the set difference, and as long as that difference holds no more than
/// `threshold` identifiers it can be decoded exactly against the sender's
/// transmission log. The wire size of the sketch is proportional to the
/// threshold, not to the number of identifiers inserted.
///
/// If `X` is the multiset of elements in the sketch, the `k`-th power sum is
/// the sum of `x^k` over all `x` in `X`, taken in a prime field sized to the
/// identifier width. Inserting or removing an element costs `O(threshold)`
/// field operations and never fails.
pub trait PowerSumQuack {
    /// The identifier type that can be inserted in the quACK.
    type Element: Copy;

    /// The field image of the identifiers.
    type ModularElement: ModularArithmetic<Self::Element>;

    /// Creates a quACK that can decode at most `threshold` elements.
    ///
    /// Errors on a zero threshold, and for the power-table fast path when
    /// the threshold exceeds the precomputed table.
    fn new(threshold: usize) -> Result<Self, QuackError>
    where
        Self: Sized;

    /// The maximum number of elements that can be decoded from the quACK.
    fn threshold(&self) -> usize;

    /// The number of elements represented by the quACK.
    ///
    /// Updated with wrapping arithmetic so that subtracting sketches whose
    /// counts cross is well-defined; the value is only meaningful while the
    /// subtracted sketch holds a subset of this one.
    fn count(&self) -> u32;

    /// The last element inserted, if known.
    ///
    /// `None` on a fresh or subtracted sketch, or after the most recent
    /// insert was removed.
    fn last_value(&self) -> Option<Self::Element>;

    /// Adds an element to the sketch.
    fn insert(&mut self, value: Self::Element);

    /// Removes an element from the sketch. Does not validate that the
    /// element had actually been inserted.
    fn remove(&mut self, value: Self::Element);

    /// Resets the sketch to its freshly-constructed state.
    fn clear(&mut self);

    /// Subtracts another sketch with the same threshold, leaving a sketch of
    /// the multiset difference.
    ///
    /// # Panics
    ///
    /// Panics if the thresholds differ.
    fn sub_assign(&mut self, rhs: &Self);

    /// Like [`sub_assign`](Self::sub_assign), returning the difference.
    fn sub(mut self, rhs: &Self) -> Self
    where
        Self: Sized,
    {
        self.sub_assign(rhs);
        self
    }

    /// Writes the coefficients of the monic polynomial whose roots are the
    /// sketched elements into `coeffs`, which must be no longer than the
    /// threshold. See [`to_coeffs`](Self::to_coeffs).
    fn to_coeffs_preallocated(&self, coeffs: &mut CoefficientVector<Self::ModularElement>);

    /// The coefficients of the degree-`threshold` monic polynomial whose
    /// roots are the sketched elements, computed from the power sums with
    /// Newton's identities in `O(threshold^2)`.
    ///
    /// The vector always has `threshold` entries; when the sketch holds
    /// `n < threshold` elements the high-degree tail is zero and the
    /// polynomial factors as `x^(threshold - n)` times the polynomial over
    /// the elements. When it holds more than `threshold` elements the
    /// result no longer describes them. The result is meaningful only under
    /// that bound.
    ///
    /// # Examples
    ///
    /// ```
    /// use quack::{PowerSumQuack, PowerSumQuackU32};
    /// use quack::arithmetic::{ModularArithmetic, ModularInteger};
    ///
    /// let mut quack = PowerSumQuackU32::new(3).unwrap();
    /// quack.insert(10);
    /// quack.insert(12);
    ///
    /// // x^3 - 22x^2 + 120x = x(x - 10)(x - 12)
    /// assert_eq!(quack.to_coeffs(), vec![
    ///     ModularInteger::new(22).neg(),
    ///     ModularInteger::new(120),
    ///     ModularInteger::zero(),
    /// ]);
    /// ```
    fn to_coeffs(&self) -> CoefficientVector<Self::ModularElement> {
        let zero = <Self::ModularElement as ModularArithmetic<Self::Element>>::zero();
        let mut coeffs = vec![zero; self.threshold()];
        self.to_coeffs_preallocated(&mut coeffs);
        coeffs
    }

    /// Evaluates a coefficient vector produced by this kind of sketch at the
    /// identifier `x`.
    ///
    /// This is the membership test the decoder applies to every logged
    /// identifier; implementations with a precomputed power table override
    /// the generic Horner path. Both paths agree exactly.
    fn eval(coeffs: &CoefficientVector<Self::ModularElement>, x: Self::Element)
        -> Self::ModularElement;

    /// The logged identifiers that are roots of the sketch polynomial, in
    /// log order.
    ///
    /// With the sketch of a set difference and the sender's log, this is the
    /// list of missing identifiers. A repeated root matches every occurrence
    /// in the log, so duplicates come back as often as they are logged. Any
    /// identifier has a false-positive chance of roughly `threshold / p` of
    /// landing on a root; callers that need certainty re-check upstream.
    ///
    /// # Examples
    ///
    /// ```
    /// use quack::{PowerSumQuack, PowerSumQuackU32};
    ///
    /// let mut sender = PowerSumQuackU32::new(10).unwrap();
    /// let mut receiver = PowerSumQuackU32::new(10).unwrap();
    /// for id in [1, 2, 3, 4, 5] {
    ///     sender.insert(id);
    /// }
    /// receiver.insert(2);
    /// receiver.insert(5);
    ///
    /// let difference = sender.sub(&receiver);
    /// assert_eq!(difference.decode_with_log(&[1, 2, 3, 4, 5]), vec![1, 3, 4]);
    /// ```
    fn decode_with_log(&self, log: &[Self::Element]) -> Vec<Self::Element> {
        let coeffs = self.to_coeffs();
        log.iter()
            .filter(|&&x| Self::eval(&coeffs, x).is_zero())
            .copied()
            .collect()
    }
}

/// 32-bit power sum quACK over the largest 32-bit prime.
///
/// This is the recommended variant: identifiers are 32-bit and the field
/// operations stay in native integer widths.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerSumQuackU32 {
    power_sums: Vec<ModularInteger<u32>>,
    inverses: InverseTable<u32>,
    last_value: Option<ModularInteger<u32>>,
    count: u32,
}

impl PowerSumQuack for PowerSumQuackU32 {
    type Element = u32;
    type ModularElement = ModularInteger<u32>;

    fn new(threshold: usize) -> Result<Self, QuackError> {
        if threshold == 0 {
            return Err(QuackError::InvalidThreshold(threshold));
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
        let size = self.power_sums.len();
        let x = ModularInteger::new(value);
        let mut y = x;
        for i in 0..(size - 1) {
            self.power_sums[i].add_assign(y);
            y.mul_assign(x);
        }
        self.power_sums[size - 1].add_assign(y);
        self.count = self.count.wrapping_add(1);
        self.last_value = Some(x);
    }

    fn remove(&mut self, value: Self::Element) {
        let size = self.power_sums.len();
        let x = ModularInteger::new(value);
        let mut y = x;
        for i in 0..(size - 1) {
            self.power_sums[i].sub_assign(y);
            y.mul_assign(x);
        }
        self.power_sums[size - 1].sub_assign(y);
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

    fn eval(coeffs: &CoefficientVector<Self::ModularElement>, x: u32) -> Self::ModularElement {
        arithmetic::eval(coeffs, x)
    }
}

impl PowerSumQuackU32 {
    /// Writes the compact wire encoding into `buf` and returns the number of
    /// bytes written: the count, the last value (0 when unknown) and every
    /// power sum, all little-endian u32.
    pub fn serialize(&self, buf: &mut [u8]) -> usize {
        self.serialize_with_hint(buf, self.threshold())
    }

    /// Like [`serialize`](Self::serialize) but writes only the first
    /// `num_missing` power sums, when the caller knows the decoder will not
    /// need a higher degree.
    pub fn serialize_with_hint(&self, buf: &mut [u8], num_missing: usize) -> usize {
        buf[0..4].copy_from_slice(&self.count.to_le_bytes());
        let last_value = self.last_value.map_or(0, |value| value.value());
        buf[4..8].copy_from_slice(&last_value.to_le_bytes());
        let num_sums = std::cmp::min(self.threshold(), num_missing);
        let mut offset = 8;
        for sum in &self.power_sums[..num_sums] {
            buf[offset..offset + 4].copy_from_slice(&sum.value().to_le_bytes());
            offset += 4;
        }
        offset
    }

    /// Reconstructs a sketch from its wire encoding. The threshold is
    /// inferred from the buffer length.
    pub fn deserialize(buf: &[u8]) -> Self {
        let count = u32::from_le_bytes(buf[0..4].try_into().unwrap());
        let last_value = u32::from_le_bytes(buf[4..8].try_into().unwrap());
        let power_sums: Vec<ModularInteger<u32>> = buf[8..]
            .chunks_exact(4)
            .map(|chunk| ModularInteger::new(u32::from_le_bytes(chunk.try_into().unwrap())))
            .collect();
        let inverses = InverseTable::new(power_sums.len());
        Self {
            power_sums,
            inverses,
            last_value: Some(ModularInteger::new(last_value)),
            count,
        }
    }

    /// Like [`deserialize`](Self::deserialize) but reuses this sketch's
    /// allocations when the encoded threshold matches.
    pub fn deserialize_prealloc(&mut self, buf: &[u8]) {
        let num_sums = (buf.len() - 8) / 4;
        if self.power_sums.len() != num_sums {
            *self = Self::deserialize(buf);
            return;
        }
        for (sum, chunk) in self.power_sums.iter_mut().zip(buf[8..].chunks_exact(4)) {
            *sum = ModularInteger::new(u32::from_le_bytes(chunk.try_into().unwrap()));
        }
        self.count = u32::from_le_bytes(buf[0..4].try_into().unwrap());
        self.last_value = Some(ModularInteger::new(u32::from_le_bytes(
            buf[4..8].try_into().unwrap(),
        )));
    }
}

/// 16-bit power sum quACK over the largest 16-bit prime, using the generic
/// multiplication path.
///
/// [`PowerTableQuack`](crate::PowerTableQuack) sketches the same field
/// through the precomputed power table; the two decode identically.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerSumQuackU16 {
    power_sums: Vec<ModularInteger<u16>>,
    inverses: InverseTable<u16>,
    last_value: Option<ModularInteger<u16>>,
    count: u32,
}

impl PowerSumQuack for PowerSumQuackU16 {
    type Element = u16;
    type ModularElement = ModularInteger<u16>;

    fn new(threshold: usize) -> Result<Self, QuackError> {
        if threshold == 0 {
            return Err(QuackError::InvalidThreshold(threshold));
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
        let size = self.power_sums.len();
        let x = ModularInteger::new(value);
        let mut y = x;
        for i in 0..(size - 1) {
            self.power_sums[i].add_assign(y);
            y.mul_assign(x);
        }
        self.power_sums[size - 1].add_assign(y);
        self.count = self.count.wrapping_add(1);
        self.last_value = Some(x);
    }

    fn remove(&mut self, value: Self::Element) {
        let size = self.power_sums.len();
        let x = ModularInteger::new(value);
        let mut y = x;
        for i in 0..(size - 1) {
            self.power_sums[i].sub_assign(y);
            y.mul_assign(x);
        }
        self.power_sums[size - 1].sub_assign(y);
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
        arithmetic::eval(coeffs, x)
    }
}

/// 64-bit power sum quACK over the largest 64-bit prime. Field products are
/// widened to 128 bits before reduction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerSumQuackU64 {
    power_sums: Vec<ModularInteger<u64>>,
    inverses: InverseTable<u64>,
    last_value: Option<ModularInteger<u64>>,
    count: u32,
}

impl PowerSumQuack for PowerSumQuackU64 {
    type Element = u64;
    type ModularElement = ModularInteger<u64>;

    fn new(threshold: usize) -> Result<Self, QuackError> {
        if threshold == 0 {
            return Err(QuackError::InvalidThreshold(threshold));
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
        let size = self.power_sums.len();
        let x = ModularInteger::new(value);
        let mut y = x;
        for i in 0..(size - 1) {
            self.power_sums[i].add_assign(y);
            y.mul_assign(x);
        }
        self.power_sums[size - 1].add_assign(y);
        self.count = self.count.wrapping_add(1);
        self.last_value = Some(x);
    }

    fn remove(&mut self, value: Self::Element) {
        let size = self.power_sums.len();
        let x = ModularInteger::new(value);
        let mut y = x;
        for i in 0..(size - 1) {
            self.power_sums[i].sub_assign(y);
            y.mul_assign(x);
        }
        self.power_sums[size - 1].sub_assign(y);
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

    fn eval(coeffs: &CoefficientVector<Self::ModularElement>, x: u64) -> Self::ModularElement {
        arithmetic::eval(coeffs, x)
    }
}
