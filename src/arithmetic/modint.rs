use serde::{Deserialize, Serialize};
use std::fmt;

/// An element of the prime field used by a quACK, stored in canonical form.
///
/// The narrow type `T` covers `[0, p)` and a wider type holds unreduced
/// products, so no operation can overflow. Three parameterizations are
/// provided, one per supported identifier width:
///
/// | `T`   | modulus                          | wide type |
/// |-------|----------------------------------|-----------|
/// | `u16` | 65_521 (largest 16-bit prime)    | `u32`     |
/// | `u32` | 4_294_967_291 (largest 32-bit)   | `u64`     |
/// | `u64` | 18_446_744_073_709_551_557       | `u128`    |
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModularInteger<T> {
    value: T,
}

/// Arithmetic in the prime field fixed by the narrow type `T`.
///
/// Every operation keeps values canonical (strictly below the modulus) and
/// none of them can fail. Addition and subtraction reduce by conditional
/// subtraction rather than division, which keeps the sketch insertion loop
/// branch-predictable.
pub trait ModularArithmetic<T>: Copy + Sized {
    /// Unsigned type wide enough for a full product of two field elements.
    type Wide;

    /// The field element congruent to `n`, reducing once if `n >= p`.
    fn new(n: T) -> Self;

    /// The additive identity.
    fn zero() -> Self;

    /// The multiplicative identity.
    fn one() -> Self;

    /// The canonical value in `[0, p)`.
    fn value(&self) -> T;

    /// The prime modulus `p`.
    fn modulus() -> T;

    /// The prime modulus as the wide type, for unreduced host arithmetic.
    fn modulus_big() -> Self::Wide;

    /// Whether this is the additive identity.
    fn is_zero(&self) -> bool;

    /// The additive inverse.
    fn neg(self) -> Self;

    /// Field addition.
    fn add(self, rhs: Self) -> Self;

    /// In-place field addition.
    fn add_assign(&mut self, rhs: Self);

    /// Field subtraction.
    fn sub(self, rhs: Self) -> Self;

    /// In-place field subtraction.
    fn sub_assign(&mut self, rhs: Self);

    /// Field multiplication.
    fn mul(self, rhs: Self) -> Self;

    /// In-place field multiplication.
    fn mul_assign(&mut self, rhs: Self);

    /// Exponentiation by square-and-multiply.
    fn pow(self, exp: T) -> Self;

    /// The multiplicative inverse, by Fermat's little theorem.
    ///
    /// Defined only for nonzero elements. The library only ever inverts the
    /// integers `1..=threshold`, which are nonzero for every supported prime.
    fn inv(self) -> Self;
}

impl<T: fmt::Display> fmt::Display for ModularInteger<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

macro_rules! modular_arithmetic_impl {
    ($narrow:ty, $wide:ty, $modulus:literal) => {
        impl ModularArithmetic<$narrow> for ModularInteger<$narrow> {
            type Wide = $wide;

            fn new(n: $narrow) -> Self {
                // The modulus exceeds half the narrow range, so one
                // subtraction reduces any raw value.
                if n >= $modulus {
                    Self { value: n - $modulus }
                } else {
                    Self { value: n }
                }
            }

            fn zero() -> Self {
                Self { value: 0 }
            }

            fn one() -> Self {
                Self { value: 1 }
            }

            fn value(&self) -> $narrow {
                self.value
            }

            fn modulus() -> $narrow {
                $modulus
            }

            fn modulus_big() -> $wide {
                $modulus as $wide
            }

            fn is_zero(&self) -> bool {
                self.value == 0
            }

            fn neg(self) -> Self {
                if self.value == 0 {
                    self
                } else {
                    Self { value: $modulus - self.value }
                }
            }

            fn add(self, rhs: Self) -> Self {
                let mut result = self;
                result.add_assign(rhs);
                result
            }

            fn add_assign(&mut self, rhs: Self) {
                let sum = (self.value as $wide) + (rhs.value as $wide);
                self.value = if sum >= ($modulus as $wide) {
                    (sum - ($modulus as $wide)) as $narrow
                } else {
                    sum as $narrow
                };
            }

            fn sub(self, rhs: Self) -> Self {
                let mut result = self;
                result.sub_assign(rhs);
                result
            }

            fn sub_assign(&mut self, rhs: Self) {
                let diff = (self.value as $wide) + (($modulus - rhs.value) as $wide);
                self.value = if diff >= ($modulus as $wide) {
                    (diff - ($modulus as $wide)) as $narrow
                } else {
                    diff as $narrow
                };
            }

            fn mul(self, rhs: Self) -> Self {
                let mut result = self;
                result.mul_assign(rhs);
                result
            }

            fn mul_assign(&mut self, rhs: Self) {
                let prod = (self.value as $wide) * (rhs.value as $wide);
                self.value = (prod % ($modulus as $wide)) as $narrow;
            }

            fn pow(self, exp: $narrow) -> Self {
                let mut base = self;
                let mut exp = exp;
                let mut result = Self::one();
                while exp > 0 {
                    if exp & 1 == 1 {
                        result.mul_assign(base);
                    }
                    base.mul_assign(base);
                    exp >>= 1;
                }
                result
            }

            fn inv(self) -> Self {
                self.pow($modulus - 2)
            }
        }

        impl fmt::Debug for ModularInteger<$narrow> {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.debug_struct("ModularInteger")
                    .field("value", &self.value)
                    .field("modulus", &($modulus as $narrow))
                    .finish()
            }
        }

        impl PartialEq<$narrow> for ModularInteger<$narrow> {
            fn eq(&self, other: &$narrow) -> bool {
                self.value == *other
            }
        }

        impl PartialEq<ModularInteger<$narrow>> for $narrow {
            fn eq(&self, other: &ModularInteger<$narrow>) -> bool {
                self == &other.value
            }
        }
    };
}

modular_arithmetic_impl!(u16, u32, 65_521);
modular_arithmetic_impl!(u32, u64, 4_294_967_291);
modular_arithmetic_impl!(u64, u128, 18_446_744_073_709_551_557);
