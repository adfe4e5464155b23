use serde::Serialize;

pub const NO_PREDICTION_LABEL: &str = "No prediction available";

pub const LOW_RISK_ADVICE: &str =
    "Maintain a healthy lifestyle with regular exercise, a balanced diet, and routine check-ups.";
pub const HIGH_RISK_ADVICE: &str =
    "We strongly recommend visiting a cardiologist as soon as possible for clinical evaluation.";
pub const MODERATE_RISK_ADVICE: &str =
    "Please consult a cardiologist for a detailed evaluation and follow-up tests.";

const LOW_MARKERS: [&str; 2] = ["no", "low"];
const HIGH_MARKERS: [&str; 3] = ["high", "severe", "yes"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RiskTier {
    Low,
    Moderate,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RiskAssessment {
    pub risk_level: RiskTier,
    pub advice: &'static str,
}

/// Coarse tier for a decoded model label, by case-insensitive substring.
/// The low markers are checked first, so a label carrying both kinds is Low.
pub fn assess(label: &str) -> RiskAssessment {
    let label = label.to_lowercase();

    if LOW_MARKERS.iter().any(|marker| label.contains(marker)) {
        RiskAssessment {
            risk_level: RiskTier::Low,
            advice: LOW_RISK_ADVICE,
        }
    } else if HIGH_MARKERS.iter().any(|marker| label.contains(marker)) {
        RiskAssessment {
            risk_level: RiskTier::High,
            advice: HIGH_RISK_ADVICE,
        }
    } else {
        RiskAssessment {
            risk_level: RiskTier::Moderate,
            advice: MODERATE_RISK_ADVICE,
        }
    }
}
