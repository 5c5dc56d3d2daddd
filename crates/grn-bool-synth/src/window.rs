//! Activation windows of source nodes.
//!
//! A window is the first run of consecutive timepoints at which a gene's
//! observation in one region satisfies the activation predicate. Rules only
//! have strict time comparisons, so the run `[first, last]` is expressed as
//! `time > first AND time < last + 1`. A run starting at timepoint 0 therefore
//! only becomes active at timepoint 1.

use grn_bool_core::ExpressionEntry;
use serde::{Deserialize, Serialize};

use crate::config::ActivationPredicate;
use crate::equation::EquationNode;

/// A region and an open time interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub region: String,
    pub start_exclusive: i64,
    pub end_exclusive: i64,
}

impl TimeWindow {
    pub fn new(region: impl Into<String>, start_exclusive: i64, end_exclusive: i64) -> Self {
        Self {
            region: region.into(),
            start_exclusive,
            end_exclusive,
        }
    }

    /// `IN D:<region> AND ><start> AND <<end>`.
    pub fn to_equation(&self) -> EquationNode {
        EquationNode::and(
            EquationNode::in_region(self.region.clone()),
            EquationNode::and(
                EquationNode::greater_than_time(self.start_exclusive),
                EquationNode::less_than_time(self.end_exclusive),
            ),
        )
    }
}

/// Find the first matching run in a series sorted by ascending time.
///
/// Returns `None` when no timepoint matches.
pub fn find_window(
    region: &str,
    series: &[(i64, ExpressionEntry)],
    predicate: &ActivationPredicate,
) -> Option<TimeWindow> {
    let start = series
        .iter()
        .position(|(_, entry)| predicate.matches(entry))?;
    let first = series[start].0;
    let last = series[start..]
        .iter()
        .take_while(|(_, entry)| predicate.matches(entry))
        .last()
        .map_or(first, |(time, _)| *time);
    Some(TimeWindow::new(region, first, last + 1))
}
