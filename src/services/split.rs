//! Split engine: resolves split requests into exact per-participant
//! amounts in cents.
//!
//! Everything here is pure integer arithmetic. The one invariant that
//! matters: on success the returned amounts sum exactly to the expense
//! total, for every split type and every adversarial remainder.

use crate::models::{SplitRequest, SplitType};
use std::cmp::Reverse;
use std::collections::HashSet;
use thiserror::Error;
use uuid::Uuid;

/// Basis-point scale for percent splits (10000 = 100%)
pub const PERCENT_SCALE: i64 = 10_000;

/// Errors produced while resolving splits
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SplitError {
    #[error("an expense needs at least one participant")]
    NoParticipants,

    #[error("participant {0} appears more than once")]
    DuplicateParticipant(Uuid),

    #[error("expense total must be positive, got {0}")]
    NonPositiveTotal(i64),

    #[error("all splits of one expense must share a split type")]
    MixedSplitTypes,

    #[error("split value required for {0} splits")]
    MissingValue(&'static str),

    #[error("split value must be non-negative, got {0}")]
    NegativeValue(i64),

    #[error("percent values must sum to 10000 basis points, got {0}")]
    PercentSumMismatch(i64),

    #[error("explicit amounts sum to {actual}, expense total is {expected}")]
    AmountSumMismatch { expected: i64, actual: i64 },

    #[error("share weights must sum to a positive value")]
    ZeroTotalShares,
}

/// One participant's resolved share
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitShare {
    pub user_id: Uuid,
    pub amount_cents: i64,
}

/// Resolve split requests against an expense total.
///
/// All requests must carry the same `split_type`; `value` is interpreted
/// per type (ignored for `equal`, basis points for `percent`, cents for
/// `amount`, a weight for `share`).
pub fn compute_splits(
    total_cents: i64,
    requests: &[SplitRequest],
) -> Result<Vec<SplitShare>, SplitError> {
    if requests.is_empty() {
        return Err(SplitError::NoParticipants);
    }
    if total_cents <= 0 {
        return Err(SplitError::NonPositiveTotal(total_cents));
    }

    let mut seen = HashSet::with_capacity(requests.len());
    for request in requests {
        if !seen.insert(request.user_id) {
            return Err(SplitError::DuplicateParticipant(request.user_id));
        }
    }

    let split_type = requests[0].split_type;
    if requests.iter().any(|r| r.split_type != split_type) {
        return Err(SplitError::MixedSplitTypes);
    }

    let amounts = match split_type {
        SplitType::Equal => equal_amounts(total_cents, requests.len()),
        SplitType::Percent => {
            let values = required_values(requests, "percent")?;
            let sum: i64 = values.iter().sum();
            if sum != PERCENT_SCALE {
                return Err(SplitError::PercentSumMismatch(sum));
            }
            largest_remainder(total_cents, &values, PERCENT_SCALE)
        }
        SplitType::Amount => {
            let values = required_values(requests, "amount")?;
            let sum: i64 = values.iter().sum();
            if sum != total_cents {
                return Err(SplitError::AmountSumMismatch {
                    expected: total_cents,
                    actual: sum,
                });
            }
            values
        }
        SplitType::Share => {
            let values = required_values(requests, "share")?;
            let sum: i64 = values.iter().sum();
            if sum <= 0 {
                return Err(SplitError::ZeroTotalShares);
            }
            largest_remainder(total_cents, &values, sum)
        }
    };

    Ok(requests
        .iter()
        .zip(amounts)
        .map(|(request, amount_cents)| SplitShare {
            user_id: request.user_id,
            amount_cents,
        })
        .collect())
}

/// Even division; the `total % n` leftover cents go one each to the
/// earliest participants.
fn equal_amounts(total_cents: i64, participants: usize) -> Vec<i64> {
    let n = participants as i64;
    let base = total_cents / n;
    let leftover = (total_cents % n) as usize;
    (0..participants)
        .map(|i| base + i64::from(i < leftover))
        .collect()
}

/// Extract the explicit `value` each request must carry for this type
fn required_values(
    requests: &[SplitRequest],
    type_name: &'static str,
) -> Result<Vec<i64>, SplitError> {
    requests
        .iter()
        .map(|r| {
            let value = r.value.ok_or(SplitError::MissingValue(type_name))?;
            if value < 0 {
                return Err(SplitError::NegativeValue(value));
            }
            Ok(value)
        })
        .collect()
}

/// Weighted division by the largest-remainder method.
///
/// Floor shares are `total * weight / weight_sum`; the cents left over are
/// handed out one each, largest fractional remainder first, request order
/// breaking ties. Guarantees the result sums to `total_cents`.
fn largest_remainder(total_cents: i64, weights: &[i64], weight_sum: i64) -> Vec<i64> {
    let total = total_cents as i128;
    let sum = weight_sum as i128;

    let mut amounts: Vec<i64> = weights
        .iter()
        .map(|&w| ((total * w as i128) / sum) as i64)
        .collect();

    let assigned: i64 = amounts.iter().sum();
    let mut leftover = total_cents - assigned;

    let mut order: Vec<usize> = (0..weights.len()).collect();
    order.sort_by_key(|&i| (Reverse((total * weights[i] as i128) % sum), i));

    for &i in &order {
        if leftover == 0 {
            break;
        }
        amounts[i] += 1;
        leftover -= 1;
    }

    amounts
}
