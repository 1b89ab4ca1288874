//! Instruction text shared by the model-backed providers.
//!
//! Providers decide how to frame these (one combined prompt for Ollama,
//! system/user messages for chat completions).

use reqcheck_core::{CriteriaSet, FeedbackCollection, Grade};

pub const CRITERIA_SYSTEM: &str = "You are responsible for the quality assurance of requirements for software projects. \
Your task is to generate a checklist from unstructured text that describes which criteria a singular requirements \
artifact should fulfil. The checklist is later used to check the quality of a requirement, so each item on the \
checklist should be independent and as narrow as possible.\n\
Example guideline: \"Title should identify the desired feature quickly, should be meaningful and unique, should be \
written from a user's point of view where applicable, context should be indicated by prefix, for example, \
Simulink: ..., SAP: ..., UI: ..., C++ Check: ...\"\n\
Expected checklist:\n\
1. The issue title should identify the desired feature quickly.\n\
2. The issue title should be meaningful and unique.\n\
3. The issue title should be written from a user's point of view where applicable.\n\
4. The issue title should have its context indicated by prefix, e.g., Simulink: ...\n\
Answer using JSON format: {\"criteria\": [{\"title\": string, \"explanation\": string}]}";

pub const ANALYSIS_SYSTEM: &str = "You are responsible for the quality assurance of requirements for software projects. \
You will be given a software requirement and a list of checks. For every check you determine how well the \
requirement fulfils it. You can assign grades from A to F (A being the best, F the worst, everything below D is \
considered a failing grade). Furthermore, you should provide feedback that a human can use to increase the quality \
of the requirement if possible; use null when nothing needs to improve.\n\
Example: Requirement: \"As a user, I should be able to click a button to purchase my order\".\n\
Check: \"The user story should clearly articulate the benefit to the user, presenting the functionality from the \
user's viewpoint.\"\n\
Expected grade: \"E\", suggestion: \"The benefit the user gains from the functionality is missing and should be present\"\n\
Answer using JSON format, one entry per check in the order given: \
{\"feedback_collection\": [{\"criterion\": {\"title\": string, \"explanation\": string}, \
\"feedback\": {\"grade\": \"A\"|\"B\"|\"C\"|\"D\"|\"E\"|\"F\", \"suggestion\": string|null}}]}";

pub const REFINEMENT_SYSTEM: &str = "You are responsible for the quality assurance of requirements for software projects. \
You will be given a software requirement together with graded feedback from a quality review. Rewrite the \
requirement so that it addresses every failing grade and as many suggestions as possible while keeping its intent. \
Do not invent functionality that is not implied by the original text.\n\
Answer using JSON format: {\"improved_requirement\": string}";

/// User prompt for criteria generation.
pub fn criteria_request(guideline: &str) -> String {
    format!("Generate a checklist for the following guideline: \"{guideline}\"")
}

/// User prompt for grading one requirement against all checks.
pub fn analysis_request(criteria: &CriteriaSet, requirement: &str) -> String {
    let mut out = format!(
        "Determine how well the requirement fulfils each check and provide feedback if possible.\n\
         Requirement: \"{requirement}\"\n\
         Checks:\n"
    );
    for (i, c) in criteria.criteria.iter().enumerate() {
        out.push_str(&format!("{}. {}: {}\n", i + 1, c.title, c.explanation));
    }
    out
}

/// User prompt for refinement; failing entries are listed first.
pub fn refinement_request(
    feedback: &FeedbackCollection,
    requirement: &str,
    threshold: Grade,
) -> String {
    let (failing, passing): (Vec<_>, Vec<_>) = feedback
        .feedback_collection
        .iter()
        .partition(|f| f.feedback.grade.is_failing(threshold));

    let mut out = format!("Requirement: \"{requirement}\"\n");
    for (heading, entries) in [("Failing checks", failing), ("Other checks", passing)] {
        if entries.is_empty() {
            continue;
        }
        out.push_str(heading);
        out.push_str(":\n");
        for f in entries {
            out.push_str(&format!(
                "- [{}] {}: {}",
                f.feedback.grade, f.criterion.title, f.criterion.explanation
            ));
            if let Some(s) = f.feedback.suggestion() {
                out.push_str(&format!(" Suggestion: {s}"));
            }
            out.push('\n');
        }
    }
    out
}
