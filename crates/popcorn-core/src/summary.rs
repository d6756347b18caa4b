use popcorn_models::WatchedEntry;
use serde::Serialize;

/// Aggregate numbers shown above the watched list.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Default)]
pub struct WatchedSummary {
    pub count: usize,
    pub avg_external_rating: f64,
    pub avg_user_rating: f64,
    pub avg_runtime: f64,
}

impl WatchedSummary {
    pub fn from_entries(entries: &[WatchedEntry]) -> Self {
        Self {
            count: entries.len(),
            avg_external_rating: average(entries.iter().filter_map(|e| e.external_rating)),
            avg_user_rating: average(entries.iter().map(|e| f64::from(e.user_rating.value()))),
            avg_runtime: average(entries.iter().filter_map(|e| e.runtime_minutes.map(f64::from))),
        }
    }

    pub fn external_rating_label(&self) -> String {
        fixed(self.avg_external_rating, 2)
    }

    pub fn user_rating_label(&self) -> String {
        fixed(self.avg_user_rating, 2)
    }

    pub fn runtime_label(&self) -> String {
        format!("{} min", fixed(self.avg_runtime, 0))
    }
}

/// Arithmetic mean; 0 for no values. Unknown values are filtered out by the caller.
fn average(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Fixed-point label, rounding half away from zero (2.5 -> "3").
pub fn fixed(value: f64, decimals: u32) -> String {
    let scale = 10f64.powi(decimals as i32);
    let rounded = (value * scale).round() / scale;
    format!("{:.*}", decimals as usize, rounded)
}
