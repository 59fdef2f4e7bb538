//! Dual-extraction pipeline: AMSTAR 2 assessment plus study data.
//!
//! Runs two independent completion calls against the same article,
//! parses each response as a JSON field array, and merges both sets
//! against the master schema. Calls are sequential with fixed waits to
//! stay under the service's request-rate ceiling.

pub mod aggregator;
pub mod prompt;
pub mod schema;
pub mod scoring;

use crate::client::{strip_code_fences, CompletionRequest, CompletionService};
use crate::config::Config;
use crate::loader::Companions;
use crate::models::{FieldRecord, ResolvedField};
use schema::MasterSchema;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Drives the dual extraction against an injected completion service.
pub struct Extractor {
    service: Box<dyn CompletionService>,
    max_tokens: u32,
    temperature: f32,
    inter_call_wait: Duration,
    post_call_wait: Duration,
}

impl Extractor {
    pub fn new(service: Box<dyn CompletionService>, config: &Config) -> Self {
        Self {
            service,
            max_tokens: config.model.extraction_max_tokens,
            temperature: config.model.temperature,
            inter_call_wait: Duration::from_secs(config.extract.inter_call_wait_secs),
            post_call_wait: Duration::from_secs(config.extract.post_call_wait_secs),
        }
    }

    /// Run both extraction calls and combine the results against the
    /// schema. Call failures degrade to empty record sets; the resolved
    /// output always matches the schema shape.
    pub async fn process_article(
        &self,
        article_text: &str,
        companions: &Companions,
        schema: &MasterSchema,
    ) -> Vec<ResolvedField> {
        info!("Running AMSTAR assessment...");
        let assessment_prompt = prompt::amstar_assessment(article_text, companions);
        let assessment = self.call_and_parse(assessment_prompt).await;
        info!("Parsed {} assessment fields", assessment.len());

        info!(
            "Waiting {}s between extraction calls to avoid rate limits...",
            self.inter_call_wait.as_secs()
        );
        tokio::time::sleep(self.inter_call_wait).await;

        info!("Running study data extraction...");
        let study_prompt = prompt::study_data(article_text, &schema.study_fields());
        let study = self.call_and_parse(study_prompt).await;
        info!("Parsed {} study data fields", study.len());

        tokio::time::sleep(self.post_call_wait).await;

        info!("Combining extractions...");
        aggregator::combine(&assessment, &study, schema)
    }

    async fn call_and_parse(&self, prompt: String) -> Vec<FieldRecord> {
        let request = CompletionRequest {
            prompt,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        match self.service.complete(request).await {
            Ok(text) => parse_field_records(&text),
            Err(e) => {
                warn!("Extraction call failed: {}", e);
                Vec::new()
            }
        }
    }
}

/// Parse a completion response as a JSON array of field records.
///
/// Fenced wrappers are stripped first. An empty or malformed payload is
/// logged and degrades to an empty list, never an error.
pub fn parse_field_records(response: &str) -> Vec<FieldRecord> {
    let cleaned = strip_code_fences(response);

    if cleaned.is_empty() {
        warn!("Extraction response was empty");
        return Vec::new();
    }

    match serde_json::from_str::<Vec<FieldRecord>>(cleaned) {
        Ok(records) => records,
        Err(e) => {
            warn!("Extraction response was not valid JSON: {}", e);
            debug!(
                "Response content: {}...",
                cleaned.chars().take(200).collect::<String>()
            );
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::CompletionError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct ScriptedService {
        outcomes: Mutex<Vec<Result<String, CompletionError>>>,
    }

    #[async_trait]
    impl CompletionService for ScriptedService {
        async fn complete(&self, _request: CompletionRequest) -> Result<String, CompletionError> {
            self.outcomes.lock().unwrap().remove(0)
        }
    }

    fn extractor(outcomes: Vec<Result<String, CompletionError>>) -> Extractor {
        let mut config = Config::default();
        // No real waits in tests.
        config.extract.inter_call_wait_secs = 0;
        config.extract.post_call_wait_secs = 0;
        Extractor::new(
            Box::new(ScriptedService {
                outcomes: Mutex::new(outcomes),
            }),
            &config,
        )
    }

    fn schema() -> MasterSchema {
        MasterSchema::from_reader(
            "Section,Field\nAMSTAR2_Items,PICO components\nStudy_Info,Country\n".as_bytes(),
        )
        .unwrap()
    }

    #[test]
    fn test_parse_plain_json_array() {
        let records = parse_field_records(
            r#"[{"Section": "AMSTAR_Items", "Field": "Item_1", "Value": "Yes. Met"}]"#,
        );
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].field, "Item_1");
    }

    #[test]
    fn test_parse_fenced_json_array() {
        let response = "```json\n[{\"Section\": \"s\", \"Field\": \"f\", \"Value\": \"v\"}]\n```";
        let records = parse_field_records(response);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].value, "v");
    }

    #[test]
    fn test_malformed_response_degrades_to_empty() {
        assert!(parse_field_records("The review scored well overall.").is_empty());
        assert!(parse_field_records("").is_empty());
        assert!(parse_field_records("```json\nnot json\n```").is_empty());
    }

    #[tokio::test]
    async fn test_process_article_combines_both_calls() {
        let assessment = r#"[{"Section": "AMSTAR_Items", "Field": "Item_1", "Value": "Yes. PICO given"}]"#;
        let study = r#"[{"Section": "Study_Info", "Field": "Country", "Value": "Canada"}]"#;
        let e = extractor(vec![Ok(assessment.to_string()), Ok(study.to_string())]);

        let resolved = e
            .process_article("article", &Companions::default(), &schema())
            .await;

        // Two schema fields plus three rating summary rows.
        assert_eq!(resolved.len(), 5);
        assert_eq!(resolved[0].value, "Yes. PICO given");
        assert_eq!(resolved[1].value, "Canada");
        assert_eq!(resolved[2].field, "Overall_Confidence_Rating");
    }

    #[tokio::test]
    async fn test_failed_assessment_still_yields_full_schema() {
        let study = r#"[{"Section": "Study_Info", "Field": "Country", "Value": "Canada"}]"#;
        let e = extractor(vec![
            Err(CompletionError::RetriesExhausted { attempts: 3 }),
            Ok(study.to_string()),
        ]);

        let resolved = e
            .process_article("article", &Companions::default(), &schema())
            .await;

        // No summary rows without assessment records, but every schema
        // field is still present.
        assert_eq!(resolved.len(), 2);
        assert!(resolved[0].value.starts_with("AMSTAR assessment needed for:"));
        assert_eq!(resolved[1].value, "Canada");
    }
}
