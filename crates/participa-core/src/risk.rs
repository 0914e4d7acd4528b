//! Risk levels and confidence formatting.
//!
//! The detection service reports risk with Portuguese labels (`SEGURO`,
//! `BAIXO`, `MODERADO`, `ALTO`, `CRÍTICO`). [`RiskLevel`] is the ordered
//! form used everywhere else.

use serde::{Deserialize, Serialize};

/// Ordinal severity of exposure, from safe to critical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Safe,
    Low,
    Moderate,
    High,
    Critical,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 5] = [
        Self::Critical,
        Self::High,
        Self::Moderate,
        Self::Low,
        Self::Safe,
    ];

    /// Canonical service label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Safe => "SEGURO",
            Self::Low => "BAIXO",
            Self::Moderate => "MODERADO",
            Self::High => "ALTO",
            Self::Critical => "CRÍTICO",
        }
    }

    /// Strict, case-insensitive match against the known labels.
    ///
    /// Accepts both `CRÍTICO` and `CRITICO`. Returns `None` for anything else.
    pub fn parse(label: &str) -> Option<Self> {
        match label.to_uppercase().as_str() {
            "CRÍTICO" | "CRITICO" => Some(Self::Critical),
            "ALTO" => Some(Self::High),
            "MODERADO" => Some(Self::Moderate),
            "BAIXO" => Some(Self::Low),
            "SEGURO" => Some(Self::Safe),
            _ => None,
        }
    }

    /// Derive a level from a model probability.
    ///
    /// Public texts are always safe; otherwise the thresholds are
    /// 0.95 (critical), 0.85 (high) and 0.60 (moderate).
    pub fn from_probability(probability: f64, public: bool) -> Self {
        if public {
            return Self::Safe;
        }
        if probability >= 0.95 {
            Self::Critical
        } else if probability >= 0.85 {
            Self::High
        } else if probability >= 0.60 {
            Self::Moderate
        } else {
            Self::Safe
        }
    }

    /// Headline shown next to the risk thermometer.
    pub fn headline(&self) -> &'static str {
        match self {
            Self::Critical => "Risco Crítico: Dados Sensíveis Expostos",
            Self::High => "Risco Alto: Identificadores Pessoais",
            Self::Moderate => "Atenção: Verifique o Contexto",
            Self::Low => "Risco Baixo: Verificação Sugerida",
            Self::Safe => "Documento Seguro para Publicação",
        }
    }

    /// Position on a 1..=5 scale, safe first.
    pub fn rank(&self) -> usize {
        *self as usize + 1
    }
}

/// Format `0.85` as `"85.0%"`.
pub fn format_confidence(value: f64) -> String {
    if value.is_nan() {
        return "0.0%".to_string();
    }
    format!("{:.1}%", value * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_labels_case_insensitive() {
        assert_eq!(RiskLevel::parse("alto"), Some(RiskLevel::High));
        assert_eq!(RiskLevel::parse("crítico"), Some(RiskLevel::Critical));
        assert_eq!(RiskLevel::parse("CRITICO"), Some(RiskLevel::Critical));
        assert_eq!(RiskLevel::parse("Moderado"), Some(RiskLevel::Moderate));
        assert_eq!(RiskLevel::parse("EXTREMO"), None);
    }

    #[test]
    fn probability_thresholds() {
        assert_eq!(RiskLevel::from_probability(0.99, true), RiskLevel::Safe);
        assert_eq!(RiskLevel::from_probability(0.95, false), RiskLevel::Critical);
        assert_eq!(RiskLevel::from_probability(0.90, false), RiskLevel::High);
        assert_eq!(RiskLevel::from_probability(0.60, false), RiskLevel::Moderate);
        assert_eq!(RiskLevel::from_probability(0.59, false), RiskLevel::Safe);
    }

    #[test]
    fn levels_are_ordered() {
        assert!(RiskLevel::Critical > RiskLevel::High);
        assert!(RiskLevel::Low > RiskLevel::Safe);
        assert_eq!(RiskLevel::Safe.rank(), 1);
        assert_eq!(RiskLevel::Critical.rank(), 5);
    }

    #[test]
    fn confidence_formatting() {
        assert_eq!(format_confidence(0.85), "85.0%");
        assert_eq!(format_confidence(1.0), "100.0%");
        assert_eq!(format_confidence(f64::NAN), "0.0%");
    }
}
