//! Geometry for the activity bar chart and the today donut.

use crate::activity::DayBucket;
use crate::model::TaskStatus;
use std::f64::consts::PI;

pub const PIE_CENTER: f64 = 100.0;
pub const PIE_RADIUS: f64 = 80.0;

/// Stacking order of the segments, bottom to top, and of the pie slices.
pub const STATUS_ORDER: [TaskStatus; 3] = [
    TaskStatus::Completed,
    TaskStatus::InProgress,
    TaskStatus::NotStarted,
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarGeometry {
    pub height_percent: f64,
    pub completed_percent: f64,
    pub in_progress_percent: f64,
    pub not_started_percent: f64,
}

impl BarGeometry {
    /// Bar height relative to the busiest day, split by status.
    pub fn for_bucket(bucket: &DayBucket, max_total: usize) -> Self {
        if bucket.total == 0 {
            return Self {
                height_percent: 0.0,
                completed_percent: 0.0,
                in_progress_percent: 0.0,
                not_started_percent: 0.0,
            };
        }

        let total = bucket.total as f64;
        let height = total / max_total.max(1) as f64 * 100.0;
        let segment = |count: usize| count as f64 / total * height;
        Self {
            height_percent: height,
            completed_percent: segment(bucket.completed),
            in_progress_percent: segment(bucket.in_progress),
            not_started_percent: segment(bucket.not_started),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub status: TaskStatus,
    pub count: usize,
    pub percent: f64,
    pub start_angle: f64,
    pub end_angle: f64,
    pub start: (f64, f64),
    pub end: (f64, f64),
    pub large_arc: bool,
}

impl PieSlice {
    pub fn svg_path(&self) -> String {
        format!(
            "M {c} {c} L {} {} A {r} {r} 0 {} 1 {} {} Z",
            self.start.0,
            self.start.1,
            u8::from(self.large_arc),
            self.end.0,
            self.end.1,
            c = PIE_CENTER,
            r = PIE_RADIUS,
        )
    }
}

/// Slices of the today chart, clockwise from twelve o'clock. Statuses with no
/// tasks get no slice; an empty day gets no slices at all.
pub fn pie_slices(summary: &DayBucket) -> Vec<PieSlice> {
    if summary.total == 0 {
        return Vec::new();
    }

    let total = summary.total as f64;
    let mut current = 0.0;
    let mut slices = Vec::new();
    for status in STATUS_ORDER {
        let count = summary.count(status);
        if count == 0 {
            continue;
        }
        let percent = count as f64 / total * 100.0;
        let sweep = percent / 100.0 * 360.0;
        let start_angle = current;
        let end_angle = current + sweep;
        slices.push(PieSlice {
            status,
            count,
            percent,
            start_angle,
            end_angle,
            start: point_on_circle(start_angle),
            end: point_on_circle(end_angle),
            large_arc: sweep > 180.0,
        });
        current = end_angle;
    }
    slices
}

fn point_on_circle(angle: f64) -> (f64, f64) {
    let radians = (angle - 90.0) * (PI / 180.0);
    (
        PIE_CENTER + PIE_RADIUS * radians.cos(),
        PIE_CENTER + PIE_RADIUS * radians.sin(),
    )
}
