//! In-memory [`HtmlGenerator`]: wraps mermaid source in a minimal
//! self-contained HTML page via the mermaid.js CDN script. Rendering
//! never fails here — the port's contract treats it as best-effort.

use kiln_domain::ports::HtmlGenerator;
use kiln_domain::Result;

const TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{artifact_type}</title>
<script src="https://cdn.jsdelivr.net/npm/mermaid/dist/mermaid.min.js"></script>
</head>
<body>
<pre class="mermaid">
{content}
</pre>
<!-- notes: {notes} -->
<script>mermaid.initialize({{ startOnLoad: true }});</script>
</body>
</html>
"#;

/// Minimal mermaid-to-HTML wrapper.
#[derive(Default)]
pub struct MermaidHtmlGenerator;

impl MermaidHtmlGenerator {
    /// Create a new generator. Stateless — every call is independent.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl HtmlGenerator for MermaidHtmlGenerator {
    async fn from_mermaid(&self, content: &str, artifact_type: &str, notes: &str) -> Result<String> {
        let notes_comment = notes.replace("-->", "").replace('\n', " ");
        Ok(TEMPLATE
            .replace("{artifact_type}", artifact_type)
            .replace("{content}", content)
            .replace("{notes}", &notes_comment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn wraps_mermaid_source_in_html() {
        let generator = MermaidHtmlGenerator::new();
        let html = generator
            .from_mermaid("erDiagram\n    A ||--o{ B : has", "mermaid_erd", "meeting notes")
            .await
            .unwrap();

        assert!(html.contains("mermaid.initialize"));
        assert!(html.contains("erDiagram"));
        assert!(html.contains("mermaid_erd"));
    }

    #[tokio::test]
    async fn strips_comment_terminators_from_embedded_notes() {
        let generator = MermaidHtmlGenerator::new();
        let html = generator.from_mermaid("erDiagram", "mermaid_erd", "end --> of comment").await.unwrap();
        assert!(!html.contains("end --> of comment"));
    }
}
