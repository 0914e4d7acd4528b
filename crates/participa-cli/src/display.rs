//! Terminal rendering for analyses, batches, and the feedback loop.

use participa_client::{ConnectionStatus, ResolvedEndpoint};
use participa_core::{
    AnalysisResult, BatchClassification, BatchItemResult, BatchSummary, Risk, RiskLevel,
    TrainingState, TrainingStatus, format_confidence,
};

const MAX_LIST_ITEMS: usize = 10;
const PREVIEW_WIDTH: usize = 48;

// ── Single analysis ──

/// Print one analysis as a card: verdict, risk thermometer, findings.
pub fn print_analysis_card(result: &AnalysisResult) {
    println!("=== {} ===", result.classification.label());
    println!();
    let level = gauge_level(
        &result.risk,
        result.confidence,
        result.classification.is_public(),
    );
    println!("  {:<18} {}", "Risco", thermometer(level));
    if let Some(level) = result.risk.level() {
        println!("  {:<18} {}", "", level.headline());
    } else {
        println!("  {:<18} {}", "", result.risk);
    }
    println!(
        "  {:<18} {}",
        "Confiança",
        format_confidence(result.confidence)
    );
    println!();

    if result.findings.is_empty() {
        println!("  Nenhum dado pessoal identificado.");
        return;
    }

    println!("  Dados identificados ({}):", result.findings.len());
    for finding in result.findings.iter().take(MAX_LIST_ITEMS) {
        println!(
            "    {:<22} {:<32} {}",
            finding.kind,
            finding.value,
            format_confidence(finding.confidence)
        );
    }
    if result.findings.len() > MAX_LIST_ITEMS {
        println!("    ... e mais {}", result.findings.len() - MAX_LIST_ITEMS);
    }
}

/// Level to draw on the gauge. Labels the service invented are placed by
/// probability; failed analyses have no level.
fn gauge_level(risk: &Risk, probability: f64, public: bool) -> Option<RiskLevel> {
    match risk {
        Risk::Level(level) => Some(*level),
        Risk::Unrecognized(_) => Some(RiskLevel::from_probability(probability, public)),
        Risk::Failed(_) => None,
    }
}

/// Five-step gauge, safe to critical. Unknown risk renders empty.
pub fn thermometer(level: Option<RiskLevel>) -> String {
    let filled = level.map(|l| l.rank()).unwrap_or(0);
    let bar: String = (1..=5)
        .map(|i| if i <= filled { '■' } else { '□' })
        .collect();
    match level {
        Some(l) => format!("[{bar}] {}", l.label()),
        None => format!("[{bar}]"),
    }
}

// ── Batch ──

pub fn print_batch_table(results: &[BatchItemResult]) {
    println!(
        "  {:<12} {:<11} {:<18} {:>7}  {:<4} {}",
        "ID", "Status", "Risco", "Conf.", "PII", "Texto"
    );
    for item in results {
        let status = if item.is_failed() {
            "erro"
        } else if item.classification == BatchClassification::Public {
            "público"
        } else {
            "restrito"
        };
        println!(
            "  {:<12} {:<11} {:<18} {:>7}  {:<4} {}",
            truncate(&single_line(&item.id), 12),
            status,
            risk_cell(item),
            format_confidence(item.probability),
            item.entities.len(),
            truncate(&single_line(&item.text_preview), PREVIEW_WIDTH)
        );
    }
    println!();
}

/// Risk label, with the probability-derived level for labels outside the known set.
fn risk_cell(item: &BatchItemResult) -> String {
    match &item.risk {
        Risk::Unrecognized(raw) => {
            let public = item.classification == BatchClassification::Public;
            let derived = RiskLevel::from_probability(item.probability, public);
            format!("{raw} (~{})", derived.label())
        }
        other => other.to_string(),
    }
}

pub fn print_batch_summary(summary: &BatchSummary) {
    println!("Resumo");
    println!("  {:<26} {}", "Total de pedidos", summary.total);
    println!("  {:<26} {}", "Públicos", summary.public);
    println!("  {:<26} {}", "Restritos", summary.restricted);
    if summary.failed > 0 {
        println!("  {:<26} {}", "Falhas", summary.failed);
    }
    println!(
        "  {:<26} {}",
        "Taxa de restrição",
        format_confidence(summary.restricted_ratio())
    );
    println!("  {:<26} {}", "Dados pessoais", summary.total_entities);
    println!();

    if !summary.by_risk.is_empty() {
        println!("Distribuição de risco");
        for level in RiskLevel::ALL {
            if let Some(n) = summary.by_risk.get(level.label()) {
                println!("  {:<26} {}", level.label(), n);
            }
        }
        for (label, n) in &summary.by_risk {
            if RiskLevel::parse(label).is_none() {
                println!("  {:<26} {}", label, n);
            }
        }
        println!();
    }

    if !summary.by_entity_type.is_empty() {
        println!("Tipos de dado pessoal");
        for (kind, n) in summary.by_entity_type.iter().take(MAX_LIST_ITEMS) {
            println!("  {:<26} {}", kind, n);
        }
        if summary.by_entity_type.len() > MAX_LIST_ITEMS {
            println!(
                "  ... e mais {}",
                summary.by_entity_type.len() - MAX_LIST_ITEMS
            );
        }
        println!();
    }
}

// ── Connection / training ──

pub fn print_connection(endpoint: &ResolvedEndpoint, status: ConnectionStatus) {
    println!("  {:<18} {}", "Status", status.label());
    println!(
        "  {:<18} {} ({})",
        "Endpoint",
        endpoint.base_url,
        endpoint.target.as_str()
    );
}

pub fn print_training_status(status: &TrainingStatus) {
    let state = status.state();
    println!("=== {} ===", state.label());
    if state == TrainingState::NeverTrained {
        println!("  O modelo melhora automaticamente com base nos seus feedbacks.");
        println!("  Valide os dados identificados com `participa feedback` para calibrá-lo.");
        return;
    }
    if !status.time_since_last.is_empty() {
        println!("  {}", status.time_since_last);
    }
    println!();
    println!("  {:<26} {}", "Amostras usadas", status.total_samples_used);
    println!("  {:<26} {}", "Feedbacks", status.total_feedbacks);
    println!(
        "  {:<26} {} → {}",
        "Acurácia",
        format_confidence(status.accuracy_before),
        format_confidence(status.accuracy_after)
    );
    println!(
        "  {:<26} {:+.1}%",
        "Melhoria", status.improvement_percentage
    );

    let breakdown = status.breakdown();
    println!(
        "  {:<26} {} corretos / {} incorretos / {} parciais",
        "Validações", breakdown.correct, breakdown.incorrect, breakdown.partial
    );
    println!();

    if !status.by_source.is_empty() {
        println!("Por tipo");
        for (kind, stats) in &status.by_source {
            let accuracy = stats
                .accuracy()
                .map(format_confidence)
                .unwrap_or_else(|| "-".to_string());
            println!("  {:<26} {:>4}  {}", kind, stats.total, accuracy);
        }
        println!();
    }

    for rec in &status.recommendations {
        println!("  • {}", rec.message);
        if !rec.action.is_empty() {
            println!("    {}", rec.action);
        }
    }
}

// ── Helpers ──

/// Collapse every run of whitespace, newlines included, into one space.
fn single_line(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cut to `max` characters, marking the cut with `…`.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let kept: String = s.chars().take(max.saturating_sub(1)).collect();
    format!("{kept}…")
}
