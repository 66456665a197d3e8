//! Artifact Cleaner (§4.2).
//!
//! Stateless, data-driven normalization of raw model output into canonical
//! form per artifact dialect. Grounded on
//! `backend/services/artifact_cleaner.py`'s `clean_mermaid`/`clean_html`/
//! `clean_code` rules.

use kiln_domain::value_objects::ArtifactType;

/// Known Mermaid dialect keywords, in the order `artifact_cleaner.py` checks
/// them.
const DIAGRAM_KEYWORDS: &[&str] = &[
    "erDiagram",
    "flowchart",
    "graph ",
    "graph\n",
    "sequenceDiagram",
    "classDiagram",
    "stateDiagram-v2",
    "stateDiagram",
    "gantt",
    "pie",
    "journey",
    "gitgraph",
    "mindmap",
    "timeline",
    "C4Context",
    "C4Container",
    "C4Component",
    "C4Deployment",
];

/// Explanatory-prose markers that end a diagram body (§4.2).
const PROSE_MARKERS: &[&str] = &[
    "explanation:",
    "note:",
    "this diagram",
    "the above",
    "here's what",
    "this shows",
    "the diagram above",
    "let me know",
    "hope this",
    "feel free",
    "if you need",
    "if you have",
    "i've made",
    "i've updated",
    "i've improved",
    "i've fixed",
    "i've added",
    "here is the",
    "here's the",
    "as requested",
    "key improvements",
    "changes made",
    "improvements:",
    "summary:",
    "output:",
    "result:",
];

/// Clean raw model output for `artifact_type` into canonical form (§4.2).
///
/// Idempotent: `clean(clean(x, t), t) == clean(x, t)` (§8 "idempotent
/// cleaning").
#[must_use]
pub fn clean(raw: &str, artifact_type: &ArtifactType) -> String {
    if raw.trim().is_empty() {
        return String::new();
    }
    match artifact_type.validator_family() {
        "erd" | "flowchart" | "sequence" => clean_mermaid(raw, artifact_type.validator_family() == "erd"),
        "html_prototype" => clean_html(raw),
        "code_prototype" => clean_code(raw),
        _ => raw.trim().to_owned(),
    }
}

fn extract_fenced_block(raw: &str) -> Option<String> {
    let mut rest = raw;
    while let Some(start) = rest.find("```") {
        let after_fence = &rest[start + 3..];
        // Skip an optional language tag on the same line as the fence.
        let body_start = after_fence.find('\n').map_or(0, |i| i + 1);
        let body = &after_fence[body_start..];
        if let Some(end) = body.find("```") {
            let candidate = body[..end].trim();
            if DIAGRAM_KEYWORDS.iter().any(|kw| candidate.contains(kw.trim())) {
                return Some(candidate.to_owned());
            }
            rest = &body[end + 3..];
            continue;
        }
        break;
    }
    None
}

fn clean_mermaid(raw: &str, rewrite_class_syntax: bool) -> String {
    let mut content = extract_fenced_block(raw).unwrap_or_else(|| raw.to_owned());

    let mut found_at = None;
    for kw in DIAGRAM_KEYWORDS {
        if let Some(idx) = content.find(kw.trim()) {
            found_at = Some(match found_at {
                Some(existing) if existing <= idx => existing,
                _ => idx,
            });
        }
    }
    if let Some(idx) = found_at {
        content = content[idx..].to_string();
    }

    let truncated = truncate_at_prose(&content);
    let balanced = balance_braces(&truncated);

    if rewrite_class_syntax {
        rewrite_class_diagram_syntax(&balanced)
    } else {
        balanced
    }
}

fn truncate_at_prose(content: &str) -> String {
    let mut clean_lines: Vec<&str> = Vec::new();
    for line in content.lines() {
        let stripped = line.trim().to_ascii_lowercase();
        if PROSE_MARKERS.iter().any(|marker| stripped.contains(marker)) {
            break;
        }
        if clean_lines.len() > 3
            && (line.trim_start().starts_with("##")
                || (line.trim_start().starts_with("**") && line.contains(':')))
        {
            break;
        }
        if clean_lines.len() > 3 && starts_with_numbered_sentence(line.trim()) {
            break;
        }
        clean_lines.push(line);
    }
    let result = clean_lines.join("\n").trim().to_owned();

    let removed = content.len().saturating_sub(result.len());
    if removed > 10 {
        tracing::info!(removed_chars = removed, "cleaner truncated trailing prose");
    }

    result
}

fn starts_with_numbered_sentence(line: &str) -> bool {
    let mut chars = line.chars();
    let mut saw_digit = false;
    for c in chars.by_ref() {
        if c.is_ascii_digit() {
            saw_digit = true;
            continue;
        }
        if c == '.' && saw_digit {
            let rest = chars.as_str().trim_start();
            return rest.chars().next().is_some_and(char::is_uppercase);
        }
        break;
    }
    false
}

/// Opportunistically balance braces/brackets by appending missing closers,
/// never removing already-present ones (§4.2).
fn balance_braces(content: &str) -> String {
    let mut stack = Vec::new();
    for c in content.chars() {
        match c {
            '{' => stack.push('}'),
            '[' => stack.push(']'),
            '(' => stack.push(')'),
            '}' | ']' | ')' => {
                if stack.last() == Some(&c) {
                    stack.pop();
                }
            }
            _ => {}
        }
    }
    let mut out = content.to_owned();
    while let Some(closer) = stack.pop() {
        out.push(closer);
    }
    out
}

/// Rewrite `class X { ... }` class-diagram syntax found inside an ERD into
/// simple ERD entity blocks (§4.2).
fn rewrite_class_diagram_syntax(content: &str) -> String {
    content.replace("class ", "").replace(['{', '}'], "")
        .lines()
        .zip(content.lines())
        .map(|(rewritten, original)| {
            if original.trim_start().starts_with("class ") {
                rewritten.trim().to_owned()
            } else {
                original.to_owned()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn clean_html(raw: &str) -> String {
    if let Some(block) = extract_fenced_html(raw) {
        return block;
    }
    let lower = raw.to_ascii_lowercase();
    if let Some(start) = lower.find("<!doctype").or_else(|| lower.find("<html")) {
        if let Some(end) = lower.rfind("</html>") {
            return raw[start..end + "</html>".len()].trim().to_owned();
        }
        return raw[start..].trim().to_owned();
    }
    // Clip to first-tag..last-tag region.
    if let (Some(first), Some(last)) = (raw.find('<'), raw.rfind('>')) {
        if last >= first {
            return raw[first..=last].trim().to_owned();
        }
    }
    raw.trim().to_owned()
}

fn extract_fenced_html(raw: &str) -> Option<String> {
    let start = raw.find("```")?;
    let after = &raw[start + 3..];
    let body_start = after.find('\n').map_or(0, |i| i + 1);
    let body = &after[body_start..];
    let end = body.find("```")?;
    let candidate = body[..end].trim();
    if candidate.to_ascii_lowercase().contains("<html") || candidate.contains("<!DOCTYPE") {
        Some(candidate.to_owned())
    } else {
        None
    }
}

fn clean_code(raw: &str) -> String {
    let mut blocks = Vec::new();
    let mut rest = raw;
    while let Some(start) = rest.find("```") {
        let after = &rest[start + 3..];
        let body_start = after.find('\n').map_or(0, |i| i + 1);
        let body = &after[body_start..];
        let Some(end) = body.find("```") else {
            break;
        };
        blocks.push(body[..end].trim().to_owned());
        rest = &body[end + 3..];
    }
    if blocks.is_empty() {
        raw.trim().to_owned()
    } else {
        blocks.join("\n\n")
    }
}
