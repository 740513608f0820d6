use serde::{Deserialize, Serialize};

/// Decorative suffix the predictor appends to the severe congestion label.
pub const SEVERE_MARKER: &str = "🚨";

const SEVERE_SUBSTRINGS: [&str; 2] = ["Severe-congestion", "Tắc nghẽn nặng"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CongestionLevel {
    Low,
    Moderate,
    High,
    SevereCongestion,
    Unknown,
}

impl CongestionLevel {
    /// Maps a raw label to a level. Exact labels are checked first, then the
    /// severe marker substring; anything else is `Unknown`.
    pub fn from_label(label: &str) -> Self {
        match label {
            "Low" | "Thấp" => Self::Low,
            "Moderate" | "Vừa phải" => Self::Moderate,
            "High" | "Cao" => Self::High,
            other if SEVERE_SUBSTRINGS.iter().any(|s| other.contains(s)) => {
                Self::SevereCongestion
            }
            _ => Self::Unknown,
        }
    }

    /// Buckets a predicted weighted flow the same way the predictor labels it.
    pub fn from_flow(flow: f64) -> Self {
        if flow.is_nan() {
            Self::Unknown
        } else if flow < 400.0 {
            Self::Low
        } else if flow < 650.0 {
            Self::Moderate
        } else if flow < 900.0 {
            Self::High
        } else {
            Self::SevereCongestion
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Self::Low => "🟢",
            Self::Moderate => "🟡",
            Self::High => "🟠",
            Self::SevereCongestion => "🔴",
            Self::Unknown => "❓",
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_and_legacy_labels_map_to_levels() {
        assert_eq!(CongestionLevel::from_label("Low"), CongestionLevel::Low);
        assert_eq!(CongestionLevel::from_label("Vừa phải"), CongestionLevel::Moderate);
        assert_eq!(CongestionLevel::from_label("Cao"), CongestionLevel::High);
        assert_eq!(
            CongestionLevel::from_label("Severe-congestion 🚨"),
            CongestionLevel::SevereCongestion
        );
        assert_eq!(
            CongestionLevel::from_label("Tắc nghẽn nặng 🚨"),
            CongestionLevel::SevereCongestion
        );
        assert_eq!(CongestionLevel::from_label("low"), CongestionLevel::Unknown);
        assert_eq!(CongestionLevel::from_label(""), CongestionLevel::Unknown);
    }

    #[test]
    fn flow_thresholds_are_half_open() {
        assert_eq!(CongestionLevel::from_flow(399.99), CongestionLevel::Low);
        assert_eq!(CongestionLevel::from_flow(400.0), CongestionLevel::Moderate);
        assert_eq!(CongestionLevel::from_flow(650.0), CongestionLevel::High);
        assert_eq!(CongestionLevel::from_flow(900.0), CongestionLevel::SevereCongestion);
        assert_eq!(CongestionLevel::from_flow(f64::NAN), CongestionLevel::Unknown);
    }

    #[test]
    fn every_level_has_an_emoji() {
        assert_eq!(CongestionLevel::Low.emoji(), "🟢");
        assert_eq!(CongestionLevel::SevereCongestion.emoji(), "🔴");
        assert_eq!(CongestionLevel::Unknown.emoji(), "❓");
    }
}
