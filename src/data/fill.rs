//! Forward fill of gaps
//!
//! Only records that reached this stage with a blank value are filled.
//! Rows removed earlier (bad date, malformed value) are gone for good.

use super::cleaning::DatedValue;
use crate::config::FillPolicy;
use crate::types::{DropCause, DropTally, NormalizedRecord};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct FillOutcome {
    pub records: Vec<NormalizedRecord>,
    /// Gaps repaired with an earlier value
    pub filled: usize,
    pub dropped: DropTally,
}

/// Resolve gaps in a date-ascending series.
///
/// With `ForwardFill` a gap takes the most recent earlier value; a gap with
/// no earlier value is dropped as `LeadingGap`. With `Drop` every gap is
/// dropped as `MissingValue`.
pub fn forward_fill(series: &[DatedValue], policy: FillPolicy) -> FillOutcome {
    debug_assert!(series.windows(2).all(|w| w[0].date < w[1].date));

    let mut records = Vec::with_capacity(series.len());
    let mut dropped = DropTally::new();
    let mut filled = 0;
    let mut last_value: Option<f64> = None;

    for item in series {
        let value = match (item.value, policy) {
            (Some(v), _) => v,
            (None, FillPolicy::Drop) => {
                dropped.add(DropCause::MissingValue);
                continue;
            }
            (None, FillPolicy::ForwardFill) => match last_value {
                Some(prev) => {
                    debug!("line {}: filled {} with {}", item.line, item.date, prev);
                    filled += 1;
                    prev
                }
                None => {
                    debug!("line {}: leading gap on {} dropped", item.line, item.date);
                    dropped.add(DropCause::LeadingGap);
                    continue;
                }
            },
        };

        last_value = Some(value);
        records.push(NormalizedRecord::new(item.date, value));
    }

    FillOutcome {
        records,
        filled,
        dropped,
    }
}
