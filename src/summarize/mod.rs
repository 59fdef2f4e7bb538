//! Cluster summarization pipeline.
//!
//! Analyzes a cluster of articles with the completion service, fanning
//! out over size-bounded batches when the combined content exceeds the
//! character budget and reconciling the per-batch results with a
//! second-pass synthesis call.

pub mod prompt;

use crate::batch::create_batches;
use crate::client::{CompletionRequest, CompletionService};
use crate::config::Config;
use crate::models::{Batch, BatchResult, Document};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

/// Drives cluster analysis against an injected completion service.
pub struct Summarizer {
    service: Box<dyn CompletionService>,
    max_tokens: u32,
    temperature: f32,
    max_chars: usize,
    show_progress: bool,
}

impl Summarizer {
    pub fn new(service: Box<dyn CompletionService>, config: &Config) -> Self {
        Self {
            service,
            max_tokens: config.model.summary_max_tokens,
            temperature: config.model.temperature,
            max_chars: config.batch.max_chars,
            show_progress: true,
        }
    }

    /// Disable the progress bar (tests, quiet mode).
    pub fn without_progress(mut self) -> Self {
        self.show_progress = false;
        self
    }

    /// Analyze a cluster of articles, batching when the content is too
    /// large for one request.
    ///
    /// Completion failures are contained: the result is always a
    /// string, with failed calls degraded to inline error markers.
    pub async fn analyze_cluster(&self, documents: Vec<Document>) -> String {
        if documents.is_empty() {
            return "No articles to analyze.".to_string();
        }

        let total_chars: usize = documents.iter().map(|d| d.chars).sum();
        if total_chars > self.max_chars {
            info!(
                "Content exceeds {} characters. Using batching approach",
                self.max_chars
            );
            self.analyze_batched(documents).await
        } else {
            info!("Content size acceptable. Processing all articles together");
            self.analyze_whole(&documents).await
        }
    }

    async fn analyze_whole(&self, documents: &[Document]) -> String {
        match self.complete(prompt::whole_cluster(documents)).await {
            Ok(text) => text,
            Err(e) => format!("Error in API call: {e}"),
        }
    }

    async fn analyze_batched(&self, documents: Vec<Document>) -> String {
        let batches = create_batches(documents, self.max_chars);
        let total = batches.len();
        info!("Created {} batches", total);

        let results = self.analyze_batches(&batches).await;

        // A single batch has nothing to reconcile.
        if results.len() == 1 {
            return results
                .into_iter()
                .next()
                .map(|r| r.result)
                .unwrap_or_default();
        }

        self.synthesize(&batches, &results).await
    }

    /// Run one analysis call per batch, strictly in order. A failed
    /// batch degrades to an error marker and later batches still run.
    async fn analyze_batches(&self, batches: &[Batch]) -> Vec<BatchResult> {
        let total = batches.len();
        let progress = self.progress_bar(total as u64);
        let mut results = Vec::with_capacity(total);

        for (i, batch) in batches.iter().enumerate() {
            let batch_num = i + 1;
            progress.set_message(format!("batch {batch_num}/{total} ({} articles)", batch.len()));

            let outcome = match self
                .complete(prompt::batch_analysis(batch, batch_num, total))
                .await
            {
                Ok(text) => {
                    info!("Batch {} complete", batch_num);
                    text
                }
                Err(e) => {
                    warn!("Batch {} failed: {}", batch_num, e);
                    format!("Error: {e}")
                }
            };

            results.push(BatchResult {
                batch_num,
                articles: batch.document_names(),
                result: outcome,
            });
            progress.inc(1);
        }

        progress.finish_and_clear();
        results
    }

    /// Reconcile all batch results with a second-pass call. On failure,
    /// the raw per-batch results are returned annotated with the error
    /// so nothing is silently dropped.
    async fn synthesize(&self, batches: &[Batch], results: &[BatchResult]) -> String {
        info!("Synthesizing results from {} batches", results.len());

        let total_articles: usize = batches.iter().map(Batch::len).sum();
        let combined = prompt::combined_batch_results(batches, results);

        match self
            .complete(prompt::synthesis(results.len(), total_articles, &combined))
            .await
        {
            Ok(text) => text,
            Err(e) => format!("Error in synthesis: {e}\n\n=== RAW BATCH RESULTS ===\n{combined}"),
        }
    }

    async fn complete(&self, prompt: String) -> Result<String, crate::client::CompletionError> {
        self.service
            .complete(CompletionRequest {
                prompt,
                max_tokens: self.max_tokens,
                temperature: self.temperature,
            })
            .await
    }

    fn progress_bar(&self, total: u64) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new(total);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        bar
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::CompletionError;
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::Mutex;

    /// Stub service that replays scripted outcomes and records prompts.
    struct ScriptedService {
        outcomes: Mutex<Vec<Result<String, CompletionError>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedService {
        fn new(outcomes: Vec<Result<String, CompletionError>>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl CompletionService for ScriptedService {
        async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError> {
            self.prompts.lock().unwrap().push(request.prompt);
            let mut outcomes = self.outcomes.lock().unwrap();
            assert!(!outcomes.is_empty(), "unexpected extra completion call");
            outcomes.remove(0)
        }
    }

    fn doc(number: usize, chars: usize) -> Document {
        Document::new(
            number,
            Path::new(&format!("article_{number}.txt")),
            "x".repeat(chars),
        )
    }

    fn summarizer(service: ScriptedService, max_chars: usize) -> Summarizer {
        let mut config = Config::default();
        config.batch.max_chars = max_chars;
        Summarizer::new(Box::new(service), &config).without_progress()
    }

    #[tokio::test]
    async fn test_small_cluster_uses_single_call() {
        let service = ScriptedService::new(vec![Ok("whole-cluster analysis".to_string())]);
        let s = summarizer(service, 100_000);

        let result = s.analyze_cluster(vec![doc(1, 500), doc(2, 500)]).await;
        assert_eq!(result, "whole-cluster analysis");
    }

    #[tokio::test]
    async fn test_single_document_never_synthesizes() {
        // One scripted outcome only: a second call would panic the stub.
        let service = ScriptedService::new(vec![Ok("only batch".to_string())]);
        let s = summarizer(service, 100_000);

        // Oversized single document forces the batched path with one batch.
        let result = s.analyze_cluster(vec![doc(1, 150_000)]).await;
        assert_eq!(result, "only batch");
    }

    #[tokio::test]
    async fn test_multi_batch_runs_synthesis() {
        let service = ScriptedService::new(vec![
            Ok("batch one result".to_string()),
            Ok("batch two result".to_string()),
            Ok("final synthesis".to_string()),
        ]);
        let s = summarizer(service, 100_000);

        let result = s
            .analyze_cluster(vec![doc(1, 60_000), doc(2, 60_000)])
            .await;
        assert_eq!(result, "final synthesis");
    }

    #[tokio::test]
    async fn test_failed_batch_is_contained() {
        let service = ScriptedService::new(vec![
            Err(CompletionError::RetriesExhausted { attempts: 3 }),
            Ok("batch two result".to_string()),
            Ok("synthesis over partial results".to_string()),
        ]);
        let s = summarizer(service, 100_000);

        let result = s
            .analyze_cluster(vec![doc(1, 60_000), doc(2, 60_000)])
            .await;
        // The run completed despite the first batch failing.
        assert_eq!(result, "synthesis over partial results");
    }

    #[tokio::test]
    async fn test_failed_synthesis_returns_raw_results() {
        let service = ScriptedService::new(vec![
            Ok("batch one result".to_string()),
            Ok("batch two result".to_string()),
            Err(CompletionError::EmptyResponse),
        ]);
        let s = summarizer(service, 100_000);

        let result = s
            .analyze_cluster(vec![doc(1, 60_000), doc(2, 60_000)])
            .await;
        assert!(result.starts_with("Error in synthesis:"));
        assert!(result.contains("batch one result"));
        assert!(result.contains("batch two result"));
    }

    #[tokio::test]
    async fn test_single_call_failure_degrades_to_marker() {
        let service = ScriptedService::new(vec![Err(CompletionError::EmptyResponse)]);
        let s = summarizer(service, 100_000);

        let result = s.analyze_cluster(vec![doc(1, 100)]).await;
        assert!(result.starts_with("Error in API call:"));
    }

    #[tokio::test]
    async fn test_empty_cluster_short_circuits() {
        let service = ScriptedService::new(vec![]);
        let s = summarizer(service, 100_000);

        let result = s.analyze_cluster(Vec::new()).await;
        assert_eq!(result, "No articles to analyze.");
    }
}
