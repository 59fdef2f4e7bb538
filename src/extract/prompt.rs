//! Prompt construction for the dual extraction calls.

use crate::loader::Companions;

/// Combined article text with any companion material appended under
/// labeled headings.
fn combined_text(article_text: &str, companions: &Companions) -> String {
    let mut combined = format!("MAIN ARTICLE:\n{article_text}");
    if let Some(ref supplement) = companions.supplement {
        combined.push_str(&format!("\n\nSUPPLEMENT MATERIAL:\n{supplement}"));
    }
    if let Some(ref protocol) = companions.protocol {
        combined.push_str(&format!("\n\nPROTOCOL:\n{protocol}"));
    }
    combined
}

/// AMSTAR 2 quality-assessment prompt covering all sixteen items.
pub fn amstar_assessment(article_text: &str, companions: &Companions) -> String {
    let combined = combined_text(article_text, companions);

    format!(
        r#"You are conducting an AMSTAR 2 quality assessment of a systematic review/meta-analysis.

IMPORTANT: Check ALL provided documents (main article, supplements, and protocol) for information.

AMSTAR 2 has 16 items. For each item below, provide a response in this EXACT JSON format:
[
  {{
    "Section": "AMSTAR_Items",
    "Field": "Item_1",
    "Value": "Yes/No/Partial Yes. [Provide a detailed explanation with evidence from the paper/supplement/protocol]"
  }}
]
Note that not all items can have a "Partial" response; this is limited to questions: 2,4,7,8,9. For information about how to differentiate "Partial Yes" from "Yes" see the SPECIAL ATTENTION section below.

AMSTAR 2 ITEMS TO ASSESS:
1. Did the research questions and inclusion criteria include components of PICO? Did this include: Population, Intervention, Comparator and Outcome?
2. Did the report contain an explicit statement that methods were established prior to conduct? Did the report justify any significant deviations from the protocol? (CHECK SUPPLEMENTS/PROTOCOL)
3. Did the authors explain their selection of study designs for inclusion? This should include reasons for including randomized controlled trials or non-randomized studies or both
4. Did the authors use a comprehensive literature search strategy? (CHECK SUPPLEMENTS)
5. Did the authors perform study selection in duplicate?
6. Did the authors perform data extraction in duplicate? This should involve either 1) at least two reviewers achieved consensus on which data to extract from included studies; or 2) two reviewers extracted data from a sample of eligible studies and achieved good agreement (at least 80 percent), with the remainder extracted by one reviewer.
7. Did the authors provide a list of excluded studies and justify exclusions? (CHECK SUPPLEMENTS)
8. Did the authors describe included studies in adequate detail? This includes a description of populations, interventions, comparator interventions, outcomes, and research designs.
9. Did the authors use satisfactory technique for assessing risk of bias? (CHECK SUPPLEMENTS)
10. Did the authors report on sources of funding for included studies? Must have reported on the sources of funding for individual studies included in the review.
11. If meta-analysis performed, did authors use appropriate statistical methods? This involves:
justifying combining the data in a meta-analysis; using an appropriate weighted technique to combine study results and adjusted for heterogeneity if present; and investigating causes of heterogeneity (randomized controlled study only).
For a non-randomized study authors must justify combining raw estimates or only combine estimates adjusted for confounding, and report separate estimates from randomized controlled studies and non-randomized studies if applicable.
12. If meta-analysis performed, did authors assess impact of risk of bias? This should include sub-analyses that examine whether findings are different when only low risk of bias studies are included, or examine the moderating effect of risk of bias on findings.
13. Did the authors account for risk of bias when interpreting results?
14. Did the authors provide satisfactory explanation for heterogeneity observed? If heterogeneity was present the authors performed an investigation of sources of any heterogeneity in the results and discussed the impact of this on the results of the review
15. If quantitative synthesis performed, did authors investigate publication bias? Performed graphical or statistical tests for publication bias and discussed the likelihood and magnitude of impact of publication bias
16. Did the authors report potential sources of conflict of interest? The authors reported no competing interests OR The authors described their funding sources and how they managed potential conflicts of interest

ASSESSMENT CRITERIA:
- "Yes" = Criterion clearly met
- "No" = Criterion clearly not met
- "Partial Yes" = Criterion partially met or with limitations
- "Not applicable" = Does not apply to this study type
- Note that only items 2,4,7,8,9 can have the response "Partial Yes"; for other items only "Yes" or "No" is possible

SPECIAL ATTENTION:

- Items 2, 4, 7, 9 often have details in supplements or protocols
- For Item 2, for the rating to be "Partial Yes" the authors must have stated that they had a written protocol or guide that included ALL the following: review question(s); a search strategy; inclusion/exclusion criteria; a risk of bias assessment
- For Item 2, for the rating to be "Yes" criteria for partial yes should be fulfilled and the protocol should be registered and should also have specified: a meta-analysis/synthesis plan; plan for investigating causes of heterogeneity
- For Item 4, for the rating to be "Partial Yes" the authors must have searched at least 2 databases (relevant to research question); provided key word and/or search strategy; and justified publication restrictions (e.g. language)
- For Item 4, for the rating to be "Yes" criteria for partial yes should be fulfilled and the authors should have: searched the reference lists / bibliographies of included studies; searched trial/study registries; included/consulted content experts in the field; where relevant, searched for grey literature; conducted search within 24 months of completion of the review
- For Item 7; for the rating to be "Partial Yes" authors must have provided a list of all potentially relevant studies that were read in full-text form but excluded from the review
- For Item 7; for the rating to be "Yes" criteria for partial should be fulfilled, and the authors must have justified the exclusion from the review of each potentially relevant study
- For Item 8; to move from a "Partial Yes" to a "Yes" the article should give a detailed description of population, intervention, comparator and describe each study's setting and the timeframe for follow-up
- For Item 9; for the rating to be "Partial Yes", the following should be satisfied:
FOR RCT: risk of bias from unconcealed allocation, and lack of blinding of patients and assessors when assessing outcomes (unnecessary for objective outcomes such as all-cause mortality) should have been assessed
FOR non-randomized study: risk of bias from confounding and selection bias should have been assessed
For the rating to be "Yes", in addition to the criteria for "Partial Yes", the article should have assessed risk of bias from:
RCT: allocation sequence that was not truly random, and selection of the reported result from among multiple measurements or analyses of a specified outcome
non-randomized study: methods used to ascertain exposures and outcomes, and selection of the reported result from among multiple measurements or analyses of a specified outcome
- Search supplement/protocol text carefully for registration info, search strategies, excluded study lists, and bias assessment details
- Cite which document (main/supplement/protocol) contains the evidence


COMBINED TEXT (Main Article + Supplements + Protocol):
{combined}

Return ONLY the JSON array with assessments for all 16 items."#
    )
}

/// Study-data extraction prompt embedding the exact schema field names.
pub fn study_data(article_text: &str, study_fields: &[&str]) -> String {
    let field_list =
        serde_json::to_string_pretty(study_fields).unwrap_or_else(|_| "[]".to_string());

    format!(
        r#"Extract specific data from this research study and format as JSON array.
Each object must have exactly these keys: "Section", "Field", and "Value".

CRITICAL: Use these EXACT field names in your response:
{field_list}

For each field above, provide:
- "Section": The appropriate section name
- "Field": The EXACT field name from the list above
- "Value": The extracted data from the article

EXTRACTION GUIDELINES:
- For country of article, report the country in which the corresponding author is based
- Report what the findings of the statistical analyses were for primary and second/third outcomes, the "Focus and main finding for outcome" field.
- For statistical results, provide EXACT numbers (OR, CI, p-values). You need to identify the primary outcome and the second and third outcomes of focus. For each one, provide the effect size along with the confidence interval and p-value. Be as comprehensive as you can.
- You do not need to report the statistical results of any meta-regression; only all meta-analytic findings.
- Provide information about the disorder or disorders of focus
- Describe the included population of the study, and specifically their sex, gender, race, ethnicity, age and socioeconomic status
- Report the number of studies in each separate meta-analysis
- For sample sizes, provide exact participant counts
- For missing data, write "Not reported" or "Not available"
- For yes/no questions, write "Yes", "No", or "Unclear"


ARTICLE TEXT:
{article_text}

Return ONLY a valid JSON array with one object for each field listed above."#
    )
}
