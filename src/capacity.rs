//! Allocation arithmetic for the daily-hours capacity rule.
//!
//! A user may not be committed to more hours per day than their capacity
//! across all ACTIVE assignments whose date ranges overlap the requested one.

use chrono::NaiveDate;
use serde::Serialize;

/// Capacity assumed for users with no usable stored value.
pub const DEFAULT_CAPACITY: i32 = 8;

/// Upper bound accepted for `allocatedHours` on a single assignment.
pub const MAX_ALLOCATED_HOURS: i32 = 16;

/// Upper bound accepted for a user's `hourlyCapacity`.
pub const MAX_CAPACITY: i32 = 24;

/// Outcome of a rejected capacity check, returned to the client verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapacityReport {
    pub current_allocation: i32,
    pub requested_hours: i32,
    pub total_capacity: i32,
    pub available_hours: i32,
}

/// An inclusive date range; `end == None` means open-ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: Option<NaiveDate>,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    /// Window a requested allocation is checked over. An open-ended request
    /// only covers its start day; existing open-ended assignments still
    /// extend indefinitely.
    pub fn requested(start: NaiveDate, end: Option<NaiveDate>) -> Self {
        Self {
            start,
            end: Some(end.unwrap_or(start)),
        }
    }

    pub fn overlaps(&self, other: &DateWindow) -> bool {
        let starts_before_other_ends = other.end.is_none_or(|end| self.start <= end);
        let ends_after_other_starts = self.end.is_none_or(|end| end >= other.start);
        starts_before_other_ends && ends_after_other_starts
    }
}

pub fn effective_capacity(stored: i32) -> i32 {
    if stored > 0 { stored } else { DEFAULT_CAPACITY }
}

/// Sum of hours across the given allocations.
pub fn total_allocated<I>(hours: I) -> i32
where
    I: IntoIterator<Item = i32>,
{
    hours.into_iter().sum()
}

/// Reject when `current + requested` would exceed `capacity`.
pub fn check(capacity: i32, current_allocation: i32, requested_hours: i32) -> Result<(), CapacityReport> {
    let capacity = effective_capacity(capacity);
    if current_allocation + requested_hours > capacity {
        return Err(CapacityReport {
            current_allocation,
            requested_hours,
            total_capacity: capacity,
            available_hours: capacity - current_allocation,
        });
    }
    Ok(())
}

/// Allocated hours as a rounded percentage of capacity.
pub fn utilization_percent(allocated: i32, capacity: i32) -> i32 {
    let capacity = effective_capacity(capacity);
    (f64::from(allocated) / f64::from(capacity) * 100.0).round() as i32
}

/// Mean of the given utilization percentages, 0 for an empty set.
pub fn average_utilization(values: &[i32]) -> i32 {
    if values.is_empty() {
        return 0;
    }
    let sum: i64 = values.iter().map(|&v| i64::from(v)).sum();
    (sum as f64 / values.len() as f64).round() as i32
}

/// Utilization strictly above this is over-allocated.
pub const OVER_ALLOCATED_ABOVE: i32 = 100;

/// Utilization strictly below this is under-utilized.
pub const UNDER_UTILIZED_BELOW: i32 = 70;
