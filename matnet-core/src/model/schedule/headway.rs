use serde::{Deserialize, Serialize};

/// summary of the minutes between consecutive trip departures of a route.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeadwayStats {
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

impl HeadwayStats {
    /// None when there are no headways, i.e. the route has fewer than two trips.
    /// `std` is the sample standard deviation, 0 for a single headway.
    pub fn from_headways(headways: &[f64]) -> Option<HeadwayStats> {
        if headways.is_empty() {
            return None;
        }
        let n = headways.len() as f64;
        let mean = headways.iter().sum::<f64>() / n;
        let std = if headways.len() > 1 {
            let ss = headways.iter().map(|h| (h - mean).powi(2)).sum::<f64>();
            (ss / (n - 1.0)).sqrt()
        } else {
            0.0
        };
        let min = headways.iter().copied().fold(f64::INFINITY, f64::min);
        let max = headways.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some(HeadwayStats {
            mean,
            std,
            min,
            max,
        })
    }

    pub fn has_zero_headway(&self) -> bool {
        self.min == 0.0
    }
}
