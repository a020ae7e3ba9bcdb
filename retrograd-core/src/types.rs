use num_traits::{Float, NumAssignOps};
use std::fmt::Debug;
use std::iter::Sum;

use crate::error::RetroGradError;

/// A trait representing the numeric element types usable in RetroGrad values.
///
/// This trait bounds the types (`f32`, `f64`) that can flow through the
/// generic kernels of the engine. `Float` already brings `Num`, `Copy`,
/// `PartialOrd` and the usual transcendental functions; the remaining bounds
/// are what the forward kernels, gradient rules and the backward engine need.
pub trait RetroNumeric:
    Float // Includes Num + Copy + Signed + powf/sqrt/exp/...
    + NumAssignOps // AddAssign etc. for gradient accumulation
    + Sum // For the sum/mean reduction kernels
    + Debug
    + Send
    + Sync
    + 'static
{
}

impl RetroNumeric for f32 {}
impl RetroNumeric for f64 {}

/// Converts a `usize` count into the element type.
///
/// Element counts in this crate are tiny (tensor sizes), so the conversion
/// cannot fail for `f32`/`f64` in practice, but the error is propagated
/// rather than unwrapped.
pub(crate) fn count_to_element<T: RetroNumeric>(count: usize) -> Result<T, RetroGradError> {
    T::from(count).ok_or_else(|| {
        RetroGradError::InternalError(format!(
            "count {} is not representable in the element type",
            count
        ))
    })
}
