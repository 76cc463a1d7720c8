use std::path::Path;

use scholar_core::types::Neighbor;

/// Grounded-answer prompt with one `"<file>:\n<text>"` block per retrieved chunk.
pub fn format_prompt(neighbors: &[Neighbor], question: &str) -> String {
    let docs = neighbors
        .iter()
        .map(|n| format!("{}:\n{}", source_label(&n.chunk.source_path), n.chunk.text))
        .collect::<Vec<_>>()
        .join("\n\n");
    format!(
        "
You are a scholarship and financial assistance guide. Use ONLY the documents provided to answer the user's question.

Documents:
{docs}

User question: {question}

Answer concisely, mention eligibility if relevant, and list sources as URLs or titles at the end.
If the question is outside these documents, say you don't have verified info and direct to official portals.
"
    )
}

fn source_label(path: &str) -> &str {
    Path::new(path).file_name().and_then(|n| n.to_str()).filter(|n| !n.is_empty()).unwrap_or("Document")
}
