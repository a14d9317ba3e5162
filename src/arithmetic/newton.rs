use super::inverse::InverseTable;
use super::modint::{ModularArithmetic, ModularInteger};
use super::CoefficientVector;

/// Converts power sums to the coefficients of the monic polynomial whose
/// roots are the summed multiset, using Newton's identities.
///
/// Writes `coeffs.len()` coefficients; callers pass a vector as long as the
/// power sum vector, so that when the sketch holds `n <= threshold` elements
/// the high-degree tail of the output is zero and the polynomial factors as
/// `x^(threshold - n)` times the degree-`n` polynomial over the elements.
///
/// Each coefficient comes out of a single running convolution over the
/// previous ones:
///
/// ```text
/// c[0] = -s[1]
/// c[i] = -(s[1]*c[i-1] + s[2]*c[i-2] + ... + s[i]*c[0] + s[i+1]) / (i+1)
/// ```
///
/// Runs in `O(coeffs.len()^2)` field operations.
pub(crate) fn to_monic_coefficients<T>(
    power_sums: &[ModularInteger<T>],
    inverses: &InverseTable<T>,
    coeffs: &mut CoefficientVector<ModularInteger<T>>,
) where
    ModularInteger<T>: ModularArithmetic<T>,
{
    if coeffs.is_empty() {
        return;
    }
    debug_assert!(coeffs.len() <= power_sums.len());
    debug_assert!(coeffs.len() <= inverses.len());
    coeffs[0] = power_sums[0].neg();
    for i in 1..coeffs.len() {
        let mut c = ModularInteger::zero();
        for j in 0..i {
            c.sub_assign(power_sums[j].mul(coeffs[i - j - 1]));
        }
        c.sub_assign(power_sums[i]);
        c.mul_assign(inverses[i]);
        coeffs[i] = c;
    }
}
