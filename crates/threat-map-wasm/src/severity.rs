//! Severity Buckets
//!
//! Three fixed tiers derived from a risk score, evaluated high-to-low
//! with `>=` at each threshold. Anything that fails both thresholds
//! (including NaN and negative scores) lands in `Low`.

use serde::{Deserialize, Serialize};

/// Lower bound (inclusive) of the high-severity tier
pub const HIGH_RISK_THRESHOLD: f64 = 80.0;
/// Lower bound (inclusive) of the mid-severity tier
pub const MID_RISK_THRESHOLD: f64 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Mid,
    High,
}

impl Severity {
    pub fn from_risk(risk: f64) -> Self {
        if risk >= HIGH_RISK_THRESHOLD {
            Severity::High
        } else if risk >= MID_RISK_THRESHOLD {
            Severity::Mid
        } else {
            Severity::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Severity::High => "high",
            Severity::Mid => "mid",
            Severity::Low => "low",
        }
    }
}

/// Marker colors per severity tier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub high: String,
    pub mid: String,
    pub low: String,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            high: "#FF0080".to_string(),
            mid: "#FF5FB0".to_string(),
            low: "#00B4FF".to_string(),
        }
    }
}

impl Palette {
    pub fn color(&self, severity: Severity) -> &str {
        match severity {
            Severity::High => &self.high,
            Severity::Mid => &self.mid,
            Severity::Low => &self.low,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thresholds_are_inclusive() {
        assert_eq!(Severity::from_risk(80.0), Severity::High);
        assert_eq!(Severity::from_risk(79.999), Severity::Mid);
        assert_eq!(Severity::from_risk(60.0), Severity::Mid);
        assert_eq!(Severity::from_risk(59.999), Severity::Low);
    }

    #[test]
    fn test_out_of_range_scores_still_bucket() {
        assert_eq!(Severity::from_risk(250.0), Severity::High);
        assert_eq!(Severity::from_risk(-10.0), Severity::Low);
        assert_eq!(Severity::from_risk(f64::NAN), Severity::Low);
        assert_eq!(Severity::from_risk(f64::INFINITY), Severity::High);
    }

    #[test]
    fn test_default_palette() {
        let palette = Palette::default();
        assert_eq!(palette.color(Severity::High), "#FF0080");
        assert_eq!(palette.color(Severity::Mid), "#FF5FB0");
        assert_eq!(palette.color(Severity::Low), "#00B4FF");
    }

}
