//! Normalization of raw `/analyze` replies.
//!
//! The detection service is inconsistent about which fields it fills in.
//! These rules turn whatever it sent into an [`AnalysisResult`]:
//!
//! - classification is `NOT_PUBLIC` when the label contains `NÃO` or `NAO`,
//!   otherwise (including when missing) `PUBLIC`
//! - missing confidence is `0`
//! - risk is matched case-insensitively against the known labels; unknown
//!   labels pass through verbatim and a missing label means `BAIXO`
//! - findings without a confidence get [`DEFAULT_FINDING_CONFIDENCE`]

use tracing::debug;

use crate::analysis::{
    AnalysisResult, AnalyzeResponse, BatchClassification, BatchItemResult, Classification,
    ErrorKind, Finding, Risk, WireFinding,
};
use crate::risk::RiskLevel;

/// Confidence assigned to findings the service reports without one.
///
/// Not derived from any model signal. Kept until product decides on a
/// calibrated value.
pub const DEFAULT_FINDING_CONFIDENCE: f64 = 0.95;

/// Number of characters kept in a batch preview.
pub const PREVIEW_CHARS: usize = 100;

const PREVIEW_ELLIPSIS: &str = "...";

pub fn classification(label: Option<&str>) -> Classification {
    match label {
        Some(l) if l.contains("NÃO") || l.contains("NAO") => Classification::NotPublic,
        _ => Classification::Public,
    }
}

pub fn risk(label: Option<&str>) -> Risk {
    match label {
        None => Risk::Level(RiskLevel::Low),
        Some(raw) => match RiskLevel::parse(raw) {
            Some(level) => Risk::Level(level),
            None => {
                debug!(label = raw, "keeping unrecognized risk label");
                Risk::Unrecognized(raw.to_string())
            }
        },
    }
}

pub fn finding(wire: &WireFinding) -> Finding {
    Finding {
        kind: wire.tipo.clone().unwrap_or_default(),
        value: wire.valor.clone().unwrap_or_default(),
        confidence: wire.confianca.unwrap_or(DEFAULT_FINDING_CONFIDENCE),
    }
}

/// Apply every normalization rule to a raw reply.
pub fn analysis(response: &AnalyzeResponse) -> AnalysisResult {
    AnalysisResult {
        classification: classification(response.classificacao.as_deref()),
        confidence: response.confianca.unwrap_or(0.0),
        risk: risk(response.risco.as_deref()),
        findings: response
            .detalhes
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(finding)
            .collect(),
    }
}

/// First [`PREVIEW_CHARS`] characters plus `...`, or the whole text if it is short enough.
pub fn text_preview(text: &str) -> String {
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}{PREVIEW_ELLIPSIS}", &text[..cut]),
        None => text.to_string(),
    }
}

/// Batch entry for an item the service answered.
pub fn batch_success(id: &str, text: &str, result: AnalysisResult) -> BatchItemResult {
    BatchItemResult {
        id: id.to_string(),
        text_preview: text_preview(text),
        full_text: text.to_string(),
        classification: result.classification.into(),
        probability: result.confidence,
        risk: result.risk,
        entities: result.findings,
        error: None,
    }
}

/// Degraded batch entry for an item whose request failed.
pub fn batch_failure(id: &str, text: &str, kind: ErrorKind) -> BatchItemResult {
    BatchItemResult {
        id: id.to_string(),
        text_preview: text_preview(text),
        full_text: text.to_string(),
        classification: BatchClassification::Restricted,
        probability: 0.0,
        risk: Risk::Failed(kind),
        entities: Vec::new(),
        error: Some(kind),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> AnalyzeResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn restricted_reply_is_normalized() {
        let raw = parse(
            r#"{
                "classificacao": "NÃO PÚBLICO",
                "risco": "alto",
                "confianca": 0.8,
                "detalhes": [{"tipo": "CPF", "valor": "111.111.111-11"}]
            }"#,
        );
        let result = analysis(&raw);
        assert_eq!(result.classification, Classification::NotPublic);
        assert_eq!(result.risk, Risk::Level(RiskLevel::High));
        assert_eq!(result.confidence, 0.8);
        assert_eq!(result.findings.len(), 1);
        assert_eq!(result.findings[0].kind, "CPF");
        assert_eq!(result.findings[0].value, "111.111.111-11");
        assert_eq!(result.findings[0].confidence, 0.95);
    }

    #[test]
    fn classification_markers() {
        assert_eq!(classification(Some("NÃO PÚBLICO")), Classification::NotPublic);
        assert_eq!(classification(Some("NAO PUBLICO")), Classification::NotPublic);
        assert_eq!(classification(Some("PÚBLICO")), Classification::Public);
        assert_eq!(classification(Some("restrito")), Classification::Public);
        assert_eq!(classification(None), Classification::Public);
    }

    #[test]
    fn risk_defaults_and_passthrough() {
        assert_eq!(risk(None), Risk::Level(RiskLevel::Low));
        assert_eq!(risk(Some("Crítico")), Risk::Level(RiskLevel::Critical));
        assert_eq!(risk(Some("critico")), Risk::Level(RiskLevel::Critical));
        assert_eq!(risk(Some("Extremo")), Risk::Unrecognized("Extremo".into()));
    }

    #[test]
    fn empty_reply_uses_defaults() {
        let result = analysis(&parse("{}"));
        assert_eq!(result.classification, Classification::Public);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.risk, Risk::Level(RiskLevel::Low));
        assert!(result.findings.is_empty());
    }

    #[test]
    fn explicit_finding_confidence_is_kept() {
        let raw = parse(r#"{"detalhes": [{"tipo": "EMAIL", "valor": "x@y.z", "confianca": 0.42}]}"#);
        assert_eq!(analysis(&raw).findings[0].confidence, 0.42);
    }

    #[test]
    fn null_finding_fields_become_empty() {
        let raw = parse(
            r#"{
                "classificacao": "NÃO PÚBLICO",
                "detalhes": [
                    {"tipo": null, "valor": "111.111.111-11", "confianca": null},
                    {"tipo": "CPF", "valor": null}
                ]
            }"#,
        );
        let findings = analysis(&raw).findings;
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].kind, "");
        assert_eq!(findings[0].value, "111.111.111-11");
        assert_eq!(findings[0].confidence, DEFAULT_FINDING_CONFIDENCE);
        assert_eq!(findings[1].kind, "CPF");
        assert_eq!(findings[1].value, "");
    }

    #[test]
    fn preview_truncates_long_text() {
        let text = "a".repeat(150);
        let preview = text_preview(&text);
        assert_eq!(preview, format!("{}...", "a".repeat(100)));

        let item = batch_failure("1", &text, ErrorKind::Timeout);
        assert_eq!(item.full_text.chars().count(), 150);
        assert_eq!(item.text_preview, preview);
    }

    #[test]
    fn preview_keeps_short_text() {
        let exact = "b".repeat(100);
        assert_eq!(text_preview(&exact), exact);
        assert_eq!(text_preview(""), "");
    }

    #[test]
    fn preview_counts_characters_not_bytes() {
        let text = "ç".repeat(101);
        let preview = text_preview(&text);
        assert_eq!(preview.chars().count(), 103);
        assert!(preview.starts_with(&"ç".repeat(100)));
    }

    #[test]
    fn failure_item_is_degraded() {
        let item = batch_failure("42", "texto", ErrorKind::WakingUp);
        assert_eq!(item.id, "42");
        assert_eq!(item.classification, BatchClassification::Restricted);
        assert_eq!(item.probability, 0.0);
        assert_eq!(item.risk.to_string(), "ERROR_WAKING_UP");
        assert!(item.entities.is_empty());
        assert!(item.is_failed());
    }

    #[test]
    fn success_item_maps_fields() {
        let raw = parse(r#"{"classificacao": "PÚBLICO", "risco": "SEGURO", "confianca": 0.99}"#);
        let item = batch_success("7", "bom dia", analysis(&raw));
        assert_eq!(item.classification, BatchClassification::Public);
        assert_eq!(item.probability, 0.99);
        assert_eq!(item.risk, Risk::Level(RiskLevel::Safe));
        assert!(!item.is_failed());
    }
}
