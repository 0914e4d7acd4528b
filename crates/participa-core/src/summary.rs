//! Batch KPIs.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::analysis::{BatchClassification, BatchItemResult};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub public: usize,
    /// Restricted items the service actually classified.
    pub restricted: usize,
    pub failed: usize,
    /// Risk label → count, failed items excluded.
    pub by_risk: BTreeMap<String, usize>,
    /// Entity type → count, most frequent first.
    pub by_entity_type: Vec<(String, usize)>,
    pub total_entities: usize,
}

impl BatchSummary {
    pub fn from_results(results: &[BatchItemResult]) -> Self {
        let mut summary = Self {
            total: results.len(),
            ..Self::default()
        };
        let mut types: HashMap<&str, usize> = HashMap::new();

        for item in results {
            if item.is_failed() {
                summary.failed += 1;
                continue;
            }
            match item.classification {
                BatchClassification::Public => summary.public += 1,
                BatchClassification::Restricted => summary.restricted += 1,
            }
            *summary.by_risk.entry(item.risk.to_string()).or_default() += 1;
            for entity in &item.entities {
                *types.entry(entity.kind.as_str()).or_default() += 1;
                summary.total_entities += 1;
            }
        }

        let mut by_type: Vec<(String, usize)> = types
            .into_iter()
            .map(|(kind, n)| (kind.to_string(), n))
            .collect();
        by_type.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        summary.by_entity_type = by_type;
        summary
    }

    /// Share of successfully analyzed items that are restricted.
    pub fn restricted_ratio(&self) -> f64 {
        let analyzed = self.public + self.restricted;
        if analyzed == 0 {
            0.0
        } else {
            self.restricted as f64 / analyzed as f64
        }
    }
}
