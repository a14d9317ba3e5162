//! C bindings for the 32-bit power sum quACK.
//!
//! Handles returned by these functions own their Rust allocations; callers
//! release them with [`quack_free`] and [`quack_coeffs_free`]. Numeric
//! results are bit-exact with the Rust API.

use crate::arithmetic::{self, CoefficientVector, ModularArithmetic, ModularInteger};
use crate::power_sum::{PowerSumQuack, PowerSumQuackU32};
use crate::precompute;

/// Coefficient vector handle exposed over the C ABI.
pub type CoefficientVectorU32 = CoefficientVector<ModularInteger<u32>>;

/// Sets the maximum threshold used to size the 16-bit power table. See
/// [`set_max_power_sum_threshold`](crate::set_max_power_sum_threshold).
#[no_mangle]
pub extern "C" fn set_max_power_sum_threshold(threshold: usize) {
    precompute::set_max_power_sum_threshold(threshold);
}

/// Allocates a new quACK with the given threshold, or null if the threshold
/// is invalid.
#[no_mangle]
pub extern "C" fn quack_new(threshold: usize) -> *mut PowerSumQuackU32 {
    match PowerSumQuackU32::new(threshold) {
        Ok(quack) => Box::into_raw(Box::new(quack)),
        Err(_) => std::ptr::null_mut(),
    }
}

/// The maximum number of elements that can be decoded from the quACK.
#[no_mangle]
pub extern "C" fn quack_threshold(quack: *const PowerSumQuackU32) -> usize {
    debug_assert!(!quack.is_null());
    unsafe { (*quack).threshold() }
}

/// The number of elements represented by the quACK.
#[no_mangle]
pub extern "C" fn quack_count(quack: *const PowerSumQuackU32) -> u32 {
    debug_assert!(!quack.is_null());
    unsafe { (*quack).count() }
}

/// The last element inserted in the quACK, or 0 if unknown.
#[no_mangle]
pub extern "C" fn quack_last_value(quack: *const PowerSumQuackU32) -> u32 {
    debug_assert!(!quack.is_null());
    unsafe { (*quack).last_value() }.unwrap_or(0)
}

/// Inserts an element in the quACK.
#[no_mangle]
pub extern "C" fn quack_insert(quack: *mut PowerSumQuackU32, value: u32) {
    debug_assert!(!quack.is_null());
    unsafe { (*quack).insert(value) };
}

/// Removes an element from the quACK.
#[no_mangle]
pub extern "C" fn quack_remove(quack: *mut PowerSumQuackU32, value: u32) {
    debug_assert!(!quack.is_null());
    unsafe { (*quack).remove(value) };
}

/// Returns the difference of two quACKs with the same threshold, consuming
/// both.
#[no_mangle]
pub extern "C" fn quack_sub(
    lhs: *mut PowerSumQuackU32,
    rhs: *mut PowerSumQuackU32,
) -> *mut PowerSumQuackU32 {
    debug_assert!(!lhs.is_null());
    debug_assert!(!rhs.is_null());
    let lhs = unsafe { Box::from_raw(lhs) };
    let rhs = unsafe { Box::from_raw(rhs) };
    Box::into_raw(Box::new(lhs.sub(&rhs)))
}

/// Allocates the coefficient vector of the quACK's monic polynomial.
#[no_mangle]
pub extern "C" fn quack_to_coeffs(quack: *const PowerSumQuackU32) -> *mut CoefficientVectorU32 {
    debug_assert!(!quack.is_null());
    let coeffs = unsafe { (*quack).to_coeffs() };
    Box::into_raw(Box::new(coeffs))
}

/// Evaluates a coefficient vector at `x`, returning the canonical field
/// value. A zero result means `x` is a root.
#[no_mangle]
pub extern "C" fn quack_coeffs_eval(coeffs: *const CoefficientVectorU32, x: u32) -> u32 {
    debug_assert!(!coeffs.is_null());
    arithmetic::eval(unsafe { &*coeffs }, x).value()
}

/// Decodes the logged elements that are in the quACK, writing up to
/// `out_buffer_size` of them to `out_buffer` in log order. Returns the
/// number of elements written.
#[no_mangle]
pub extern "C" fn quack_decode_with_log(
    quack: *const PowerSumQuackU32,
    log: *const u32,
    len: usize,
    out_buffer: *mut u32,
    out_buffer_size: usize,
) -> usize {
    debug_assert!(!quack.is_null());
    debug_assert!(!log.is_null());
    debug_assert!(!out_buffer.is_null());
    let log = unsafe { std::slice::from_raw_parts(log, len) };
    let result = unsafe { (*quack).decode_with_log(log) };
    let num_written = std::cmp::min(result.len(), out_buffer_size);
    unsafe {
        std::ptr::copy_nonoverlapping(result.as_ptr(), out_buffer, num_written);
    }
    num_written
}

/// Releases a quACK handle.
#[no_mangle]
pub extern "C" fn quack_free(quack: *mut PowerSumQuackU32) {
    debug_assert!(!quack.is_null());
    unsafe { drop(Box::from_raw(quack)) };
}

/// Releases a coefficient vector handle.
#[no_mangle]
pub extern "C" fn quack_coeffs_free(coeffs: *mut CoefficientVectorU32) {
    debug_assert!(!coeffs.is_null());
    unsafe { drop(Box::from_raw(coeffs)) };
}
