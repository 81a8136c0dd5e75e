//! Threat Dataset Model
//!
//! Root payload sent by the host on every render:
//! - `countries`: ordered per-country risk entries (order = draw order)
//!
//! Input is lenient about field names (`country`/`name`, `lng`/`lon`),
//! output always uses the canonical `name`/`lat`/`lon`.

use serde::{Deserialize, Serialize};

use crate::severity::Severity;
use crate::Result;

/// Root payload decoded from the host's `threatData` argument
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThreatDataset {
    #[serde(default)]
    pub countries: Vec<CountryRisk>,
}

/// One country's risk entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCountryRisk")]
pub struct CountryRisk {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    /// Risk score, nominally 0-100 (never clamped)
    pub risk: f64,
    /// Active known vulnerabilities
    pub cves: u32,
}

/// Entry as it arrives on the wire. Both spellings may be present;
/// the canonical key wins.
#[derive(Deserialize)]
struct RawCountryRisk {
    name: Option<String>,
    country: Option<String>,
    lat: f64,
    lon: Option<f64>,
    lng: Option<f64>,
    risk: f64,
    cves: u32,
}

impl TryFrom<RawCountryRisk> for CountryRisk {
    type Error = String;

    fn try_from(raw: RawCountryRisk) -> std::result::Result<Self, String> {
        let name = raw
            .name
            .or(raw.country)
            .ok_or_else(|| "missing field `name`".to_string())?;
        let lon = raw
            .lon
            .or(raw.lng)
            .ok_or_else(|| "missing field `lon`".to_string())?;

        Ok(Self {
            name,
            lat: raw.lat,
            lon,
            risk: raw.risk,
            cves: raw.cves,
        })
    }
}

impl CountryRisk {
    pub fn new(name: impl Into<String>, lat: f64, lon: f64, risk: f64, cves: u32) -> Self {
        Self {
            name: name.into(),
            lat,
            lon,
            risk,
            cves,
        }
    }

    pub fn severity(&self) -> Severity {
        Severity::from_risk(self.risk)
    }
}

impl ThreatDataset {
    /// Decode from the JSON string carried in `threatData`
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Decode from an already-parsed JSON value (the `data` argument form)
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn len(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }

    /// Non-fatal data quality checks. Rendering never consults this.
    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::default();

        for (index, c) in self.countries.iter().enumerate() {
            match c.severity() {
                Severity::High => report.high += 1,
                Severity::Mid => report.mid += 1,
                Severity::Low => report.low += 1,
            }

            if c.name.trim().is_empty() {
                report.issues.push(DatasetIssue::EmptyName { index });
            }
            if !c.lat.is_finite() || !c.lon.is_finite() {
                report.issues.push(DatasetIssue::NonFiniteCoordinate {
                    index,
                    name: c.name.clone(),
                });
            } else {
                if !(-90.0..=90.0).contains(&c.lat) {
                    report.issues.push(DatasetIssue::LatitudeOutOfRange {
                        index,
                        name: c.name.clone(),
                        lat: c.lat,
                    });
                }
                if !(-180.0..=180.0).contains(&c.lon) {
                    report.issues.push(DatasetIssue::LongitudeOutOfRange {
                        index,
                        name: c.name.clone(),
                        lon: c.lon,
                    });
                }
            }
            if !c.risk.is_finite() || !(0.0..=100.0).contains(&c.risk) {
                report.issues.push(DatasetIssue::RiskOutOfRange {
                    index,
                    name: c.name.clone(),
                    risk: c.risk,
                });
            }
        }

        report.total = self.countries.len();
        report
    }
}

/// Data quality problem found by [`ThreatDataset::validate`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DatasetIssue {
    EmptyName { index: usize },
    NonFiniteCoordinate { index: usize, name: String },
    LatitudeOutOfRange { index: usize, name: String, lat: f64 },
    LongitudeOutOfRange { index: usize, name: String, lon: f64 },
    RiskOutOfRange { index: usize, name: String, risk: f64 },
}

impl std::fmt::Display for DatasetIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName { index } => write!(f, "#{}: empty country name", index),
            Self::NonFiniteCoordinate { index, name } => {
                write!(f, "#{} {}: non-finite coordinate", index, name)
            }
            Self::LatitudeOutOfRange { index, name, lat } => {
                write!(f, "#{} {}: latitude {} outside [-90, 90]", index, name, lat)
            }
            Self::LongitudeOutOfRange { index, name, lon } => {
                write!(f, "#{} {}: longitude {} outside [-180, 180]", index, name, lon)
            }
            Self::RiskOutOfRange { index, name, risk } => {
                write!(f, "#{} {}: risk {} outside [0, 100]", index, name, risk)
            }
        }
    }
}

/// Summary of a dataset: bucket counts plus issues
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    pub total: usize,
    pub high: usize,
    pub mid: usize,
    pub low: usize,
    pub issues: Vec<DatasetIssue>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_field_names() {
        let ds = ThreatDataset::from_json(
            r#"{"countries":[{"name":"Spain","lat":40.4,"lon":-3.7,"risk":72,"cves":12}]}"#,
        )
        .unwrap();
        assert_eq!(ds.countries[0], CountryRisk::new("Spain", 40.4, -3.7, 72.0, 12));
    }

    #[test]
    fn test_legacy_field_aliases() {
        let ds = ThreatDataset::from_json(
            r#"{"countries":[{"country":"Chile","lat":-33.4,"lng":-70.6,"risk":55.5,"cves":3}]}"#,
        )
        .unwrap();
        let c = &ds.countries[0];
        assert_eq!(c.name, "Chile");
        assert_eq!(c.lon, -70.6);
        assert_eq!(c.risk, 55.5);
    }

    #[test]
    fn test_canonical_key_wins_over_alias() {
        let ds = ThreatDataset::from_json(
            r#"{"countries":[{"name":"Spain","country":"ES","lat":40.4,"lon":-3.7,"risk":72,"cves":12}]}"#,
        )
        .unwrap();
        assert_eq!(ds.countries[0].name, "Spain");

        let ds = ThreatDataset::from_json(
            r#"{"countries":[{"name":"Spain","lat":40.4,"lon":-3.7,"lng":-3.0,"risk":72,"cves":12}]}"#,
        )
        .unwrap();
        assert_eq!(ds.countries[0].lon, -3.7);
    }

    #[test]
    fn test_missing_name_and_lon_rejected() {
        let err = ThreatDataset::from_json(
            r#"{"countries":[{"lat":40.4,"lon":-3.7,"risk":72,"cves":12}]}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("missing field `name`"));

        let err = ThreatDataset::from_json(
            r#"{"countries":[{"name":"Spain","lat":40.4,"risk":72,"cves":12}]}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("missing field `lon`"));
    }

    #[test]
    fn test_serializes_canonical_names() {
        let ds = ThreatDataset {
            countries: vec![CountryRisk::new("Peru", -12.0, -77.0, 10.0, 0)],
        };
        let json: serde_json::Value = serde_json::from_str(&ds.to_json().unwrap()).unwrap();
        let entry = &json["countries"][0];
        assert_eq!(entry["name"], "Peru");
        assert!(entry.get("lon").is_some());
        assert!(entry.get("lng").is_none());
        assert!(entry.get("country").is_none());
    }

    #[test]
    fn test_missing_countries_is_empty() {
        let ds = ThreatDataset::from_json("{}").unwrap();
        assert!(ds.is_empty());
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let err = ThreatDataset::from_json("{\"countries\": [").unwrap_err();
        assert!(matches!(err, crate::RenderError::Parse(_)));
    }

    #[test]
    fn test_negative_cves_rejected() {
        let err = ThreatDataset::from_json(
            r#"{"countries":[{"name":"X","lat":0,"lon":0,"risk":1,"cves":-2}]}"#,
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_from_value() {
        let ds = ThreatDataset::from_value(serde_json::json!({
            "countries": [{"country": "Mexico", "lat": 19.4, "lng": -99.1, "risk": 81, "cves": 7}]
        }))
        .unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.countries[0].severity(), Severity::High);
    }

    #[test]
    fn test_validate_reports_issues_and_buckets() {
        let ds = ThreatDataset {
            countries: vec![
                CountryRisk::new("Ok", 10.0, 10.0, 90.0, 1),
                CountryRisk::new("North", 95.0, 0.0, 65.0, 0),
                CountryRisk::new("", 0.0, 200.0, 140.0, 0),
                CountryRisk::new("Nan", f64::NAN, 0.0, 5.0, 0),
            ],
        };
        let report = ds.validate();
        assert_eq!(report.total, 4);
        assert_eq!((report.high, report.mid, report.low), (2, 1, 1));
        assert!(!report.is_clean());
        assert!(report
            .issues
            .contains(&DatasetIssue::EmptyName { index: 2 }));
        assert!(report.issues.iter().any(|i| matches!(
            i,
            DatasetIssue::LatitudeOutOfRange { index: 1, .. }
        )));
        assert!(report.issues.iter().any(|i| matches!(
            i,
            DatasetIssue::LongitudeOutOfRange { index: 2, .. }
        )));
        assert!(report.issues.iter().any(|i| matches!(
            i,
            DatasetIssue::RiskOutOfRange { index: 2, .. }
        )));
        assert!(report.issues.iter().any(|i| matches!(
            i,
            DatasetIssue::NonFiniteCoordinate { index: 3, .. }
        )));
    }

    #[test]
    fn test_validate_clean_dataset() {
        let ds = ThreatDataset {
            countries: vec![CountryRisk::new("Brazil", -15.8, -47.9, 60.0, 9)],
        };
        assert!(ds.validate().is_clean());
    }
}
