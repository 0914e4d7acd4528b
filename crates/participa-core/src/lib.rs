pub mod analysis;
pub mod feedback;
pub mod normalize;
pub mod risk;
pub mod summary;

pub use analysis::{
    AnalysisRequest, AnalysisResult, AnalyzeResponse, BatchClassification, BatchItemResult,
    Classification, ErrorKind, Finding, Risk, WireFinding,
};
pub use feedback::{
    EntityFeedback, FeedbackError, FeedbackRequest, FeedbackResponse, TrainingState,
    TrainingStatus, Validation,
};
pub use risk::{RiskLevel, format_confidence};
pub use summary::BatchSummary;
