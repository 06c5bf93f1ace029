//! Structured output returned by the generative backend

use serde::{Deserialize, Serialize};

use super::brief::SHOT_COUNT;

/// Tolerance when comparing summed shot durations against the request
const DURATION_EPSILON: f64 = 0.01;

/// One shot of the generated shot list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shot {
    /// 1-based position in the list
    pub shot_number: u32,
    pub description: String,
    pub camera_angle: String,
    pub duration_seconds: f64,
}

/// A complete shot-by-shot video prompt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedResult {
    pub title: String,
    /// The single synthesizing paragraph
    pub overall_prompt: String,
    pub total_duration_seconds: f64,
    /// Ratio token as echoed by the backend, e.g. "9:16"
    pub aspect_ratio: String,
    pub shots: Vec<Shot>,
}

/// Discrepancies between a result and the brief that requested it
#[derive(Debug, Clone, PartialEq)]
pub struct TimingCheck {
    pub shot_count: usize,
    pub shot_sum_seconds: f64,
    pub requested_seconds: u32,
}

impl TimingCheck {
    /// Shot count matches the fixed count
    pub fn shot_count_ok(&self) -> bool {
        self.shot_count == SHOT_COUNT
    }

    /// Shot durations add up to the requested total
    pub fn duration_ok(&self) -> bool {
        (self.shot_sum_seconds - f64::from(self.requested_seconds)).abs() < DURATION_EPSILON
    }

    pub fn is_consistent(&self) -> bool {
        self.shot_count_ok() && self.duration_ok()
    }
}

impl GeneratedResult {
    /// Sum of all shot durations
    pub fn shot_duration_sum(&self) -> f64 {
        self.shots.iter().map(|s| s.duration_seconds).sum()
    }

    /// Compare against the requested duration; reports only, never repairs
    pub fn timing_check(&self, requested_seconds: u32) -> TimingCheck {
        TimingCheck {
            shot_count: self.shots.len(),
            shot_sum_seconds: self.shot_duration_sum(),
            requested_seconds,
        }
    }

    /// Pretty JSON rendering used by the JSON output view
    pub fn to_pretty_json(&self) -> String {
        // Serializing plain strings and finite numbers cannot fail
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}
