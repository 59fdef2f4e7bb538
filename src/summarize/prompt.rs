//! Prompt construction for cluster analysis and synthesis.

use crate::models::{Batch, BatchResult, Document};

/// One article body wrapped in its header line and separator rule.
fn article_block(document: &Document) -> String {
    format!(
        "=== ARTICLE {}: {} ===\n{}\n{}\n",
        document.number,
        document.name,
        document.content,
        "=".repeat(80)
    )
}

/// Bullet list of article identifiers.
fn article_list(documents: &[Document]) -> String {
    documents
        .iter()
        .map(|d| format!("- Article {}: {}", d.number, d.name))
        .collect::<Vec<_>>()
        .join("\n")
}

fn combined_content(documents: &[Document]) -> String {
    documents
        .iter()
        .map(article_block)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Analysis prompt for a whole cluster that fits in one request.
pub fn whole_cluster(documents: &[Document]) -> String {
    let count = documents.len();
    let parts = [
        format!("I have {count} articles from a systematic umbrella review that clustered together using topic modeling."),
        String::new(),
        format!("IMPORTANT: You must analyze ALL {count} articles listed below."),
        String::new(),
        "Articles to analyze:".to_string(),
        article_list(documents),
        String::new(),
        "Please provide:".to_string(),
        "1. **Cluster Label**: Descriptive label (max 6 words)".to_string(),
        "2. **Overall Findings Summary**: Describe the main conclusion for each of the articles in this set. What are the main conclusions and themes across all studies? Please provide effect sizes and confidence intervals for the primary, sub-group and moderation analyses and describe which study they came from. You should describe the most scientifically important and clinically relevant findings in the set of articles".to_string(),
        "3. **Exact Population Data Per Article**: Gender, SES, Race/Ethnicity for each article (or 'Not reported')".to_string(),
        "4. **Subcategory Analysis**: Identify distinct subcategories that might warrant separate labels".to_string(),
        "5. **Study Comparison**: What are the similarities and differences between each article in this set. Be specific when referring to findings from a specific article (provide the author name)".to_string(),
        "6. **Article-Specific Information**: Brief summary of each article (provide its name). Give details of the statistical findings (i.e., effect size and confidence interval for the main meta-analysis as well as sub-group and moderation analyses)".to_string(),
        "7. **Synthesis**: How do these articles collectively further our understanding of the topic".to_string(),
        String::new(),
        format!("Here are the {count} articles:"),
        String::new(),
        combined_content(documents),
    ];
    parts.join("\n")
}

/// Analysis prompt for one batch out of several.
pub fn batch_analysis(batch: &Batch, batch_num: usize, total_batches: usize) -> String {
    let count = batch.len();
    let parts = [
        format!("This is BATCH {batch_num} of {total_batches} from a systematic umbrella review cluster."),
        format!("Analyze these {count} articles and provide:"),
        String::new(),
        "Articles in this batch:".to_string(),
        article_list(&batch.documents),
        String::new(),
        "For this batch, provide:".to_string(),
        "1. **Batch Summary**: Give an overview of the main themes for the articles in this batch. In particular, describe the study focus and aims".to_string(),
        "2. **Population Data**: Exact Gender, SES, Race/Ethnicity for each article in this batch (or 'Not reported')".to_string(),
        "3. **Study Details**: For each article, provide design, methodology, findings, and a brief 2-3 sentence summary (give the article name). Provide the effect size and confidence interval estimates for the primary analyses as well as subgroup and moderation analyses. You should describe the main findings and conclusions and the most clinically relevant findings".to_string(),
        "4. **Batch Patterns**: Describe the common and discrepant features of the different articles in this batch".to_string(),
        String::new(),
        "Articles:".to_string(),
        String::new(),
        combined_content(&batch.documents),
    ];
    parts.join("\n")
}

/// Concatenated per-batch results, labeled by batch number and article
/// list, preceded by a summary of every article in the cluster.
pub fn combined_batch_results(batches: &[Batch], results: &[BatchResult]) -> String {
    let documents: Vec<&Document> = batches.iter().flat_map(|b| b.documents.iter()).collect();

    let mut article_summary = format!("Total articles: {}\nArticle list:\n", documents.len());
    for document in &documents {
        article_summary.push_str(&format!(
            "- Article {}: {} ({} chars)\n",
            document.number, document.name, document.chars
        ));
    }

    let mut parts = vec![
        "=== SYNTHESIZED ANALYSIS FROM MULTIPLE BATCHES ===".to_string(),
        String::new(),
        article_summary,
        String::new(),
    ];

    for result in results {
        parts.push(format!("--- BATCH {} RESULTS ---", result.batch_num));
        parts.push(format!("Articles: {}", result.articles.join(", ")));
        parts.push(String::new());
        parts.push(result.result.clone());
        parts.push(String::new());
    }

    parts.join("\n")
}

/// Second-pass prompt reconciling all batch results into one analysis.
pub fn synthesis(batch_count: usize, total_articles: usize, combined_results: &str) -> String {
    format!(
        r#"I have batch analysis results from {batch_count} batches covering {total_articles} total articles from a systematic umbrella review cluster. Please synthesize these into a final analysis.

Please provide:
1. **Overall Cluster Label**: Descriptive label for all articles (max 6 words)
Indicate whether there are subcategories of studies within this collection of articles.

2. **Overall Findings Summary**:
What are the main conclusions and themes across all studies?
Please provide effect sizes and confidence intervals for the main analyses, and indicate the findings of subgroup or moderation analyses (again using effect size and confidence interval statistics).
Please provide information about the study or studies being referred to for each point.
You should describe the most scientifically relevant as well as the most clinically relevant findings.

3. **Population Analysis**:
   For each demographic category, specify which articles (by number/name) include this information:
   - Gender distribution and representation (specify which articles report gender data)
   - Socioeconomic status of participants (specify which articles include SES data)
   - Race and ethnicity breakdown (specify which articles report race/ethnicity data)
   - Any notable demographic gaps or biases across the studies

4. **Study Comparison**:
   - Similarities in study designs, methodologies, and approaches (specify which articles share these features)
   - Differences in populations, settings, and methods (specify which articles differ and how)
   - Convergent vs. divergent findings across the collection of studies (specify which articles support or contradict each finding)
   - Describe differences in the conclusions of the studies, and similarities in the conclusions.

5. **Article-Specific Information**:
   For each article, provide a brief summary including:
   - Main research question/objective
   - Study design and methodology
   - Key population characteristics
   - Primary findings (give effect size and confidence intervals)
   - Outcomes of subgroup or moderator analyses (give effect size and confidence intervals)
   - Notable limitations

Here are the batch results to synthesize:

{combined_results}

Please create a coherent synthesis that treats this as a single cluster analysis."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn doc(number: usize, name: &str, content: &str) -> Document {
        Document::new(number, Path::new(&format!("{name}.txt")), content.to_string())
    }

    fn batch(documents: Vec<Document>) -> Batch {
        Batch { documents }
    }

    #[test]
    fn test_whole_cluster_lists_every_article() {
        let prompt = whole_cluster(&[doc(1, "alpha", "body a"), doc(2, "beta", "body b")]);

        assert!(prompt.contains("I have 2 articles"));
        assert!(prompt.contains("- Article 1: alpha"));
        assert!(prompt.contains("- Article 2: beta"));
        assert!(prompt.contains("=== ARTICLE 1: alpha ===\nbody a"));
        assert!(prompt.contains("**Cluster Label**"));
    }

    #[test]
    fn test_batch_analysis_carries_index_and_total() {
        let b = batch(vec![doc(3, "gamma", "body")]);
        let prompt = batch_analysis(&b, 2, 5);

        assert!(prompt.contains("BATCH 2 of 5"));
        assert!(prompt.contains("- Article 3: gamma"));
        assert!(prompt.contains("**Batch Summary**"));
        assert!(prompt.contains("=== ARTICLE 3: gamma ==="));
    }

    #[test]
    fn test_article_blocks_separated_by_rule() {
        let b = batch(vec![doc(1, "a", "one"), doc(2, "b", "two")]);
        let prompt = batch_analysis(&b, 1, 2);
        assert!(prompt.contains(&"=".repeat(80)));
    }

    #[test]
    fn test_combined_results_labels_batches() {
        let batches = vec![
            batch(vec![doc(1, "a", "xx")]),
            batch(vec![doc(2, "b", "yyyy")]),
        ];
        let results = vec![
            BatchResult {
                batch_num: 1,
                articles: vec!["a".to_string()],
                result: "first analysis".to_string(),
            },
            BatchResult {
                batch_num: 2,
                articles: vec!["b".to_string()],
                result: "second analysis".to_string(),
            },
        ];

        let combined = combined_batch_results(&batches, &results);
        assert!(combined.contains("Total articles: 2"));
        assert!(combined.contains("--- BATCH 1 RESULTS ---"));
        assert!(combined.contains("Articles: b"));
        assert!(combined.contains("second analysis"));
    }

    #[test]
    fn test_synthesis_embeds_combined_results() {
        let prompt = synthesis(3, 12, "RAW RESULTS HERE");
        assert!(prompt.contains("from 3 batches covering 12 total articles"));
        assert!(prompt.contains("RAW RESULTS HERE"));
        assert!(prompt.contains("**Overall Cluster Label**"));
    }
}
