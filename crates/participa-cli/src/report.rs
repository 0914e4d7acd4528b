//! JSON report written by `participa batch --output`.

use std::path::Path;

use anyhow::Context;
use chrono::Utc;
use participa_client::ResolvedEndpoint;
use participa_core::{BatchItemResult, BatchSummary};
use serde::Serialize;

#[derive(Serialize)]
pub struct BatchReport<'a> {
    /// RFC 3339 timestamp.
    pub generated_at: String,
    pub endpoint: &'a str,
    pub target: &'static str,
    pub summary: &'a BatchSummary,
    pub results: &'a [BatchItemResult],
}

impl<'a> BatchReport<'a> {
    pub fn new(
        endpoint: &'a ResolvedEndpoint,
        summary: &'a BatchSummary,
        results: &'a [BatchItemResult],
    ) -> Self {
        Self {
            generated_at: Utc::now().to_rfc3339(),
            endpoint: &endpoint.base_url,
            target: endpoint.target.as_str(),
            summary,
            results,
        }
    }

    pub fn write(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self).context("serializing batch report")?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use participa_client::EndpointTarget;
    use participa_core::ErrorKind;
    use participa_core::normalize::batch_failure;

    #[test]
    fn report_shape() {
        let endpoint = ResolvedEndpoint {
            target: EndpointTarget::Remote,
            base_url: "https://example.org".into(),
        };
        let results = vec![batch_failure("1", "texto", ErrorKind::Offline)];
        let summary = BatchSummary::from_results(&results);
        let report = BatchReport::new(&endpoint, &summary, &results);

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["target"], "remote");
        assert_eq!(value["summary"]["failed"], 1);
        assert_eq!(value["results"][0]["risk"], "ERROR_OFFLINE");
        assert_eq!(value["results"][0]["error"], "OFFLINE");
        assert!(chrono::DateTime::parse_from_rfc3339(value["generated_at"].as_str().unwrap()).is_ok());
    }
}
