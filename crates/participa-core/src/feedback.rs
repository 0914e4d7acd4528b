//! Human-feedback loop types.
//!
//! Staff validate each finding of an analysis (`CORRETO`, `INCORRETO`,
//! `PARCIAL`) and the service uses the submissions to recalibrate. Field
//! names follow the service's JSON contract.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FeedbackError {
    #[error("feedback must validate at least one entity")]
    Empty,
    #[error("original text is empty")]
    MissingText,
}

/// Human verdict on a single finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Validation {
    Correto,
    Incorreto,
    Parcial,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityFeedback {
    pub tipo: String,
    pub valor: String,
    #[serde(default)]
    pub confianca_modelo: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fonte: Option<String>,
    pub validacao_humana: Validation,
    /// Corrected type, only meaningful for `PARCIAL`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tipo_corrigido: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comentario: Option<String>,
}

/// Body of `POST /feedback`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_id: Option<String>,
    pub original_text: String,
    pub entity_feedbacks: Vec<EntityFeedback>,
    pub classificacao_modelo: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classificacao_corrigida: Option<String>,
}

impl FeedbackRequest {
    pub fn validate(&self) -> Result<(), FeedbackError> {
        if self.original_text.trim().is_empty() {
            return Err(FeedbackError::MissingText);
        }
        if self.entity_feedbacks.is_empty() {
            return Err(FeedbackError::Empty);
        }
        Ok(())
    }

    /// Record a verdict, replacing any earlier one for the same value.
    pub fn record(&mut self, feedback: EntityFeedback) {
        self.entity_feedbacks.retain(|f| f.valor != feedback.valor);
        self.entity_feedbacks.push(feedback);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedbackStats {
    #[serde(default)]
    pub accuracy: f64,
    #[serde(default)]
    pub total_feedbacks: u64,
}

/// Reply to `POST /feedback`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedbackResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub feedback_id: Option<String>,
    #[serde(default)]
    pub stats: FeedbackStats,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationBreakdown {
    #[serde(default)]
    pub correct: u64,
    #[serde(default)]
    pub incorrect: u64,
    #[serde(default)]
    pub partial: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceStats {
    #[serde(default)]
    pub correct: u64,
    #[serde(default)]
    pub incorrect: u64,
    #[serde(default)]
    pub partial: u64,
    #[serde(default)]
    pub total: u64,
}

impl SourceStats {
    /// Share of correct verdicts, `None` when nothing was validated.
    pub fn accuracy(&self) -> Option<f64> {
        (self.total > 0).then(|| self.correct as f64 / self.total as f64)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub action: String,
}

/// Reply to `GET /training/status`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingStatus {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub last_calibration: Option<String>,
    #[serde(default)]
    pub total_samples_used: u64,
    #[serde(default)]
    pub total_feedbacks: u64,
    #[serde(default)]
    pub accuracy_before: f64,
    #[serde(default)]
    pub accuracy_after: f64,
    #[serde(default)]
    pub improvement_percentage: f64,
    #[serde(default)]
    pub time_since_last: String,
    #[serde(default)]
    pub by_source: BTreeMap<String, SourceStats>,
    #[serde(default)]
    pub validation_breakdown: Option<ValidationBreakdown>,
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
}

/// Calibration phase reported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainingState {
    Ready,
    Improving,
    Learning,
    NeedsAttention,
    NeverTrained,
    Other,
}

impl TrainingState {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Ready => "Modelo Calibrado",
            Self::Improving => "Aprendendo...",
            Self::Learning => "Coletando Dados",
            Self::NeedsAttention => "Precisa Atenção",
            Self::NeverTrained => "Aguardando Feedbacks",
            Self::Other => "Status Desconhecido",
        }
    }
}

impl TrainingStatus {
    /// A model with no samples behaves as never trained, whatever `status` says.
    pub fn state(&self) -> TrainingState {
        if self.total_samples_used == 0 {
            return TrainingState::NeverTrained;
        }
        match self.status.as_str() {
            "ready" => TrainingState::Ready,
            "improving" => TrainingState::Improving,
            "learning" => TrainingState::Learning,
            "needs_attention" => TrainingState::NeedsAttention,
            "never_trained" => TrainingState::NeverTrained,
            _ => TrainingState::Other,
        }
    }

    pub fn breakdown(&self) -> ValidationBreakdown {
        self.validation_breakdown.unwrap_or_default()
    }
}
