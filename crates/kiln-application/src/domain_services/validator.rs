//! Artifact Validator (§4.3).
//!
//! Stateless scoring: start at 100, subtract for violations, add bonuses
//! only through type-specific rules. Grounded on the validator family
//! dispatch already encoded in [`kiln_domain::value_objects::ArtifactType`]
//! and on `backend/services/` validator outlines in the original system.

use kiln_domain::value_objects::ArtifactType;
use serde::{Deserialize, Serialize};

/// Result of validating a single artifact body (§4.3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// `errors.is_empty() && score >= 60`.
    pub is_valid: bool,
    /// Score in `[0, 100]`.
    pub score: u8,
    /// Hard violations.
    pub errors: Vec<String>,
    /// Soft violations that reduced score but didn't invalidate.
    pub warnings: Vec<String>,
    /// Non-scoring advice (e.g. "add tests", "document auth").
    pub suggestions: Vec<String>,
}

struct Scorer {
    score: i32,
    errors: Vec<String>,
    warnings: Vec<String>,
    suggestions: Vec<String>,
}

impl Scorer {
    fn new() -> Self {
        Self {
            score: 100,
            errors: Vec::new(),
            warnings: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    fn error(&mut self, penalty: i32, msg: impl Into<String>) {
        self.score -= penalty;
        self.errors.push(msg.into());
    }

    fn warn(&mut self, penalty: i32, msg: impl Into<String>) {
        self.score -= penalty;
        self.warnings.push(msg.into());
    }

    fn suggest(&mut self, msg: impl Into<String>) {
        self.suggestions.push(msg.into());
    }

    fn finish(self) -> ValidationResult {
        let score = self.score.clamp(0, 100) as u8;
        ValidationResult {
            is_valid: self.errors.is_empty() && score >= 60,
            score,
            errors: self.errors,
            warnings: self.warnings,
            suggestions: self.suggestions,
        }
    }
}

/// Validate a single artifact body against its type's dialect rules.
///
/// `context_notes`, if present, is scanned for entity/technology/UI-element
/// names whose absence from `content` downgrades the score (§4.3
/// "Context-aware adjustments").
#[must_use]
pub fn validate(
    artifact_type: &ArtifactType,
    content: &str,
    context_notes: Option<&str>,
) -> ValidationResult {
    let mut scorer = Scorer::new();
    let trimmed = content.trim();

    if trimmed.is_empty() {
        scorer.error(100, "content is empty");
        return scorer.finish();
    }

    match artifact_type.validator_family() {
        "erd" => validate_erd(trimmed, &mut scorer),
        "flowchart" => validate_flowchart(trimmed, &mut scorer),
        "sequence" => validate_sequence(trimmed, &mut scorer),
        "api_docs" => validate_api_docs(trimmed, &mut scorer),
        "jira" => validate_jira(trimmed, &mut scorer),
        "code_prototype" => validate_code_prototype(trimmed, &mut scorer),
        "html_prototype" => validate_html_prototype(trimmed, &mut scorer),
        _ => validate_generic(trimmed, &mut scorer),
    }

    if let Some(notes) = context_notes {
        apply_context_adjustment(notes, trimmed, &mut scorer);
    }

    scorer.finish()
}

/// `Validate` applied to each item, capped at 50 per call per §4.3.
#[must_use]
pub fn validate_batch(
    items: &[(ArtifactType, String, Option<String>)],
) -> Vec<ValidationResult> {
    items
        .iter()
        .take(50)
        .map(|(ty, content, notes)| validate(ty, content, notes.as_deref()))
        .collect()
}

fn has_balanced(content: &str, open: char, close: char) -> bool {
    let mut depth = 0i32;
    for c in content.chars() {
        if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth < 0 {
                return false;
            }
        }
    }
    depth == 0
}

const ERD_KEYWORDS: &[&str] = &["erDiagram"];
const FLOWCHART_KEYWORDS: &[&str] = &["flowchart", "graph"];

fn validate_erd(content: &str, scorer: &mut Scorer) {
    if !ERD_KEYWORDS.iter().any(|k| content.contains(k)) {
        scorer.error(40, "missing erDiagram dialect keyword");
    }
    if !has_balanced(content, '{', '}') {
        scorer.error(20, "unbalanced braces");
    }
    if !has_balanced(content, '"', '"') && content.matches('"').count() % 2 != 0 {
        scorer.error(10, "unbalanced quotes");
    }

    let entity_count = content
        .lines()
        .filter(|l| l.trim_end().ends_with('{'))
        .count();
    if entity_count < 2 {
        scorer.warn(15, "fewer than 2 entities declared");
    }

    let relationship_count = content
        .lines()
        .filter(|l| l.contains("||") || l.contains("--") || l.contains("}o") || l.contains("o{"))
        .count();
    if relationship_count < 1 {
        scorer.warn(15, "no relationships declared");
    }

    if content.contains("class ") && content.contains('{') {
        scorer.warn(10, "class-diagram syntax found inside an ERD");
    }
}

fn validate_flowchart(content: &str, scorer: &mut Scorer) {
    if !FLOWCHART_KEYWORDS.iter().any(|k| content.contains(k)) {
        scorer.error(40, "missing flowchart/graph dialect keyword");
    }
    if content.starts_with("flowchart") && !["TD", "TB", "BT", "RL", "LR"].iter().any(|d| content.contains(d)) {
        scorer.warn(10, "flowchart missing a direction (TD/LR/...)");
    }

    let node_count = content.matches('[').count().max(content.matches('(').count());
    if node_count == 0 {
        scorer.warn(20, "no nodes detected");
    }

    let arrow_count = content.matches("-->").count() + content.matches("---").count();
    if arrow_count == 0 {
        scorer.warn(15, "no arrows detected");
    }

    let dangling = content
        .lines()
        .filter(|l| l.trim_end().ends_with("-->") || l.trim_end().ends_with("---"))
        .count();
    if dangling > 0 {
        scorer.warn(10 * dangling.min(3) as i32, "dangling arrow with no target");
    }
}

fn validate_sequence(content: &str, scorer: &mut Scorer) {
    if !content.contains("sequenceDiagram") {
        scorer.error(40, "missing sequenceDiagram dialect keyword");
    }
    let participants = content.matches("participant").count() + content.matches("actor ").count();
    if participants < 1 {
        scorer.error(20, "no participant declarations");
    }
    let messages = content.matches("->>").count() + content.matches("-->>").count() + content.matches("->").count();
    if messages == 0 {
        scorer.warn(20, "no messages detected");
    }
}

fn validate_api_docs(content: &str, scorer: &mut Scorer) {
    const METHODS: &[&str] = &["GET", "POST", "PUT", "PATCH", "DELETE"];
    let method_hits = METHODS.iter().filter(|m| content.contains(**m)).count();
    if method_hits == 0 {
        scorer.error(30, "no HTTP methods documented");
    }

    let endpoint_count = content.matches('/').count();
    if endpoint_count < 2 {
        scorer.warn(20, "fewer than 2 endpoints documented");
    }

    let has_examples = content.contains("```") || content.contains("request") || content.contains("response");
    if !has_examples {
        scorer.warn(15, "no request/response examples");
    }

    let has_status_codes = ["200", "201", "400", "401", "404", "500"].iter().any(|c| content.contains(c));
    if !has_status_codes {
        scorer.warn(10, "no status codes documented");
    }

    if !content.to_ascii_lowercase().contains("auth") {
        scorer.suggest("document authentication requirements");
    }
}

fn validate_jira(content: &str, scorer: &mut Scorer) {
    let has_structure = ["Epic", "Story", "Task"].iter().any(|k| content.contains(k));
    if !has_structure {
        scorer.error(30, "missing Epic/Story/Task structure");
    }

    let has_acceptance = content.to_ascii_lowercase().contains("acceptance criteria");
    if !has_acceptance {
        scorer.warn(20, "missing acceptance criteria");
    }

    let enumerated = content
        .lines()
        .filter(|l| {
            let t = l.trim_start();
            t.starts_with("- ") || t.starts_with("* ") || t.chars().next().is_some_and(|c| c.is_ascii_digit())
        })
        .count();
    if enumerated == 0 {
        scorer.warn(15, "no enumerated items found");
    }
}

fn validate_code_prototype(content: &str, scorer: &mut Scorer) {
    let has_def = ["fn ", "def ", "function ", "class "].iter().any(|k| content.contains(k));
    if !has_def {
        scorer.error(30, "no functions or classes detected");
    }

    let line_count = content.lines().count().max(1);
    let comment_lines = content
        .lines()
        .filter(|l| {
            let t = l.trim_start();
            t.starts_with("//") || t.starts_with('#') || t.starts_with("/*")
        })
        .count();
    if (comment_lines as f64 / line_count as f64) < 0.05 {
        scorer.warn(10, "low comment density");
    }

    let has_error_handling = ["try", "catch", "except", "Result", "Err", "raise"].iter().any(|k| content.contains(k));
    if !has_error_handling {
        scorer.warn(15, "no error-handling constructs detected");
    }

    scorer.suggest("add tests for the generated code");
}

fn validate_html_prototype(content: &str, scorer: &mut Scorer) {
    let lower = content.to_ascii_lowercase();
    if !lower.contains("<!doctype") && !lower.contains("<html") {
        scorer.error(30, "missing DOCTYPE or <html>");
    }
    if !lower.contains("<head") {
        scorer.error(15, "missing <head>");
    }
    if !lower.contains("<body") {
        scorer.error(15, "missing <body>");
    }

    let open_tags = content.matches('<').count();
    let close_tags = content.matches("</").count();
    if open_tags > 0 && (close_tags as f64 / open_tags as f64) < 0.3 {
        scorer.warn(15, "open/close tag ratio far below tolerance");
    }

    if let (Some(start), Some(end)) = (lower.find("<body"), lower.find("</body>")) {
        if end.saturating_sub(start) < 20 {
            scorer.warn(20, "body is effectively empty");
        }
    }

    if !lower.contains("<style") && !lower.contains("class=") {
        scorer.warn(10, "no styling detected");
    }
}

fn validate_generic(content: &str, scorer: &mut Scorer) {
    if content.len() < 20 {
        scorer.warn(30, "content is unusually short");
    }
}

fn apply_context_adjustment(notes: &str, content: &str, scorer: &mut Scorer) {
    let content_lower = content.to_ascii_lowercase();
    let mentioned: Vec<&str> = notes
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() > 3)
        .collect();

    let missing = mentioned
        .iter()
        .filter(|w| !content_lower.contains(&w.to_ascii_lowercase()))
        .count();
    let total = mentioned.len().max(1);

    let miss_ratio = missing as f64 / total as f64;
    if miss_ratio > 0.5 {
        scorer.warn(10, "several notes-referenced terms are absent from the artifact");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ty(s: &str) -> ArtifactType {
        ArtifactType::new(s)
    }

    #[test]
    fn empty_content_is_invalid() {
        let result = validate(&ty("mermaid_erd"), "", None);
        assert!(!result.is_valid);
        assert_eq!(result.score, 0);
    }

    #[test]
    fn well_formed_erd_passes() {
        let content = "erDiagram\nUser {\nint id PK\n}\nOrder {\nint id PK\n}\nUser ||--o{ Order : places";
        let result = validate(&ty("mermaid_erd"), content, None);
        assert!(result.is_valid);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn erd_missing_keyword_is_invalid() {
        let content = "User { int id PK }\nOrder { int id PK }";
        let result = validate(&ty("mermaid_erd"), content, None);
        assert!(!result.is_valid);
        assert!(!result.errors.is_empty());
    }

    #[test]
    fn class_syntax_in_erd_is_warning_only() {
        let content = "erDiagram\nUser {\nint id PK\n}\nOrder {\nint id PK\n}\nUser ||--o{ Order : places\nclass Foo {\nbar\n}";
        let result = validate(&ty("mermaid_erd"), content, None);
        assert!(result.warnings.iter().any(|w| w.contains("class-diagram")));
    }

    #[test]
    fn api_docs_without_auth_suggests_documenting_it() {
        let content = "GET /users\nPOST /users\n```json\n{}\n```\n200 OK";
        let result = validate(&ty("api_docs"), content, None);
        assert!(result.suggestions.iter().any(|s| s.contains("auth")));
    }

    #[test]
    fn context_mismatch_lowers_score() {
        let notes = "We need a dashboard with a revenue chart and customer table";
        let content_matching = "dashboard revenue chart customer table overview";
        let content_mismatched = "a completely unrelated todo list application";

        let matching = validate(&ty("html_prototype"), content_matching, Some(notes));
        let mismatched = validate(&ty("html_prototype"), content_mismatched, Some(notes));
        assert!(mismatched.score <= matching.score);
    }

    #[test]
    fn batch_caps_at_fifty() {
        let items: Vec<_> = (0..60)
            .map(|_| (ty("mermaid_erd"), "erDiagram".to_owned(), None))
            .collect();
        assert_eq!(validate_batch(&items).len(), 50);
    }
}
