//! Overflow-checked decimal arithmetic.
//!
//! Amounts arrive from clients and the backend unbounded, so every product
//! and sum on them goes through these helpers instead of `*` and `+`.

use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};

/// Multiplies two amounts, failing with `CalculationError` on overflow.
pub(crate) fn checked_product(lhs: Decimal, rhs: Decimal, what: &str) -> EngineResult<Decimal> {
    lhs.checked_mul(rhs).ok_or_else(|| overflow(what))
}

/// Sums amounts, failing with `CalculationError` on overflow.
pub(crate) fn checked_sum<I>(amounts: I, what: &str) -> EngineResult<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    amounts.into_iter().try_fold(Decimal::ZERO, |total, amount| {
        total.checked_add(amount).ok_or_else(|| overflow(what))
    })
}

fn overflow(what: &str) -> EngineError {
    EngineError::CalculationError {
        message: format!("{} exceeds the supported decimal range", what),
    }
}
