//! Analysis types shared between the client and its front ends.
//!
//! Two layers live here: the raw wire shapes returned by the detection
//! service (`/analyze`), which keep the service's Portuguese field names and
//! treat every field as optional, and the normalized domain types callers
//! work with.

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

use crate::risk::RiskLevel;

/// Body of a `POST /analyze` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub text: String,
}

impl AnalysisRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: None,
            text: text.into(),
        }
    }

    pub fn with_id(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            text: text.into(),
        }
    }
}

/// Raw `/analyze` reply. Every field may be absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    #[serde(default)]
    pub classificacao: Option<String>,
    #[serde(default)]
    pub risco: Option<String>,
    #[serde(default)]
    pub confianca: Option<f64>,
    #[serde(default)]
    pub detalhes: Option<Vec<WireFinding>>,
}

/// One entry of `detalhes` as sent by the service. Any field may be null.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WireFinding {
    #[serde(default)]
    pub tipo: Option<String>,
    #[serde(default)]
    pub valor: Option<String>,
    #[serde(default)]
    pub confianca: Option<f64>,
}

/// Binary releasability verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Classification {
    Public,
    NotPublic,
}

impl Classification {
    /// Portuguese label used by the service and shown to staff.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Public => "PÚBLICO",
            Self::NotPublic => "NÃO PÚBLICO",
        }
    }

    pub fn is_public(&self) -> bool {
        matches!(self, Self::Public)
    }
}

/// Failure classes a request can end in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Deadline exceeded after the retry budget.
    Timeout,
    /// Network-level failure after the retry budget.
    Offline,
    /// 502/503 after the retry budget (cold start).
    WakingUp,
    /// Cross-origin or permission rejection. Never retried.
    Cors,
    Unknown,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Timeout => "TIMEOUT",
            Self::Offline => "OFFLINE",
            Self::WakingUp => "WAKING_UP",
            Self::Cors => "CORS",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// The fixed message shown to staff for this failure class.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::WakingUp => "O motor de IA está acordando, por favor aguarde uns instantes...",
            Self::Timeout => {
                "A API demorou muito para responder. O modelo pode estar processando. Tente novamente."
            }
            Self::Offline => {
                "Não foi possível conectar à API. Verifique sua conexão ou tente mais tarde."
            }
            Self::Cors => "Erro de permissão ao acessar a API. Contate o administrador.",
            Self::Unknown => "Ocorreu um erro inesperado. Tente novamente.",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Risk as reported for one analysis.
///
/// Upstream labels outside the known set are kept verbatim, and batch items
/// that failed carry a synthetic `ERROR_<KIND>` value. Serializes as a plain
/// string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Risk {
    Level(RiskLevel),
    Unrecognized(String),
    Failed(ErrorKind),
}

impl Risk {
    pub fn level(&self) -> Option<RiskLevel> {
        match self {
            Self::Level(level) => Some(*level),
            _ => None,
        }
    }
}

impl fmt::Display for Risk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Level(level) => f.write_str(level.label()),
            Self::Unrecognized(raw) => f.write_str(raw),
            Self::Failed(kind) => write!(f, "ERROR_{kind}"),
        }
    }
}

impl Serialize for Risk {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One detected personal-data occurrence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
    pub confidence: f64,
}

/// Normalized result of a single analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub classification: Classification,
    pub confidence: f64,
    pub risk: Risk,
    pub findings: Vec<Finding>,
}

/// Releasability of a batch item; failed items are forced to `Restricted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchClassification {
    Public,
    Restricted,
}

impl From<Classification> for BatchClassification {
    fn from(value: Classification) -> Self {
        match value {
            Classification::Public => Self::Public,
            Classification::NotPublic => Self::Restricted,
        }
    }
}

/// Outcome for one item of a batch, successful or not.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchItemResult {
    pub id: String,
    pub text_preview: String,
    pub full_text: String,
    pub classification: BatchClassification,
    pub probability: f64,
    pub risk: Risk,
    pub entities: Vec<Finding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorKind>,
}

impl BatchItemResult {
    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_omits_missing_id() {
        let json = serde_json::to_string(&AnalysisRequest::new("texto")).unwrap();
        assert_eq!(json, r#"{"text":"texto"}"#);

        let json = serde_json::to_string(&AnalysisRequest::with_id("7", "texto")).unwrap();
        assert_eq!(json, r#"{"id":"7","text":"texto"}"#);
    }

    #[test]
    fn analyze_response_tolerates_missing_fields() {
        let parsed: AnalyzeResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.classificacao.is_none());
        assert!(parsed.detalhes.is_none());

        let parsed: AnalyzeResponse = serde_json::from_str(
            r#"{"classificacao":"PÚBLICO","detalhes":[{"tipo":"EMAIL","valor":"a@b.c"}]}"#,
        )
        .unwrap();
        let detalhes = parsed.detalhes.unwrap();
        assert_eq!(detalhes[0].tipo.as_deref(), Some("EMAIL"));
        assert!(detalhes[0].confianca.is_none());
    }

    #[test]
    fn risk_serializes_as_string() {
        assert_eq!(
            serde_json::to_string(&Risk::Level(RiskLevel::Critical)).unwrap(),
            r#""CRÍTICO""#
        );
        assert_eq!(
            serde_json::to_string(&Risk::Unrecognized("EXTREMO".into())).unwrap(),
            r#""EXTREMO""#
        );
        assert_eq!(
            serde_json::to_string(&Risk::Failed(ErrorKind::WakingUp)).unwrap(),
            r#""ERROR_WAKING_UP""#
        );
    }

    #[test]
    fn every_error_kind_has_a_message() {
        for kind in [
            ErrorKind::Timeout,
            ErrorKind::Offline,
            ErrorKind::WakingUp,
            ErrorKind::Cors,
            ErrorKind::Unknown,
        ] {
            assert!(!kind.user_message().is_empty());
        }
        assert_eq!(ErrorKind::WakingUp.to_string(), "WAKING_UP");
    }

    #[test]
    fn batch_item_skips_absent_error() {
        let item = BatchItemResult {
            id: "1".into(),
            text_preview: "x".into(),
            full_text: "x".into(),
            classification: BatchClassification::Public,
            probability: 0.5,
            risk: Risk::Level(RiskLevel::Safe),
            entities: vec![],
            error: None,
        };
        let value = serde_json::to_value(&item).unwrap();
        assert!(value.get("error").is_none());
        assert_eq!(value["classification"], "public");
        assert_eq!(value["risk"], "SEGURO");
    }
}
