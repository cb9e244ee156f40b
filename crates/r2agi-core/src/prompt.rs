//! Prompt templates for manual claim extraction.
//!
//! The digest tooling turns a pending artifact into a claim-extraction
//! prompt, and a claim into a gate-design prompt. Both are plain text meant
//! to be pasted into an LLM by hand; nothing here calls a model.

use crate::models::Artifact;

/// Characters shown by [`preview`] before the ellipsis.
pub const PREVIEW_CHARS: usize = 500;

/// Gate kinds a claim can be tested against, with the question each asks.
pub const GATE_KINDS: [(&str, &str); 5] = [
    (
        "operationalization",
        "Can the claim be reduced to constructible steps?",
    ),
    ("prediction", "Does the claim make testable predictions?"),
    ("cost-accounting", "What are the costs/externalities?"),
    ("warranty", "What guarantees does the claim make?"),
    ("liability", "What happens if the claim fails?"),
];

/// Renders the claim-extraction prompt for an artifact.
pub fn claim_prompt(artifact: &Artifact) -> String {
    let record = &artifact.record;
    let source = record.source_url.as_deref().unwrap_or("N/A");
    let tags = if record.tags.is_empty() {
        "none".to_string()
    } else {
        record.tags.join(", ")
    };
    let note = record.note.as_deref().unwrap_or("none");

    format!(
        r#"You are processing raw material for the Roads to AGI project.

ARTIFACT:
Type: {kind}
Source: {source}
Tags: {tags}
Note: {note}

CONTENT:
{content}

---

Extract operational claims from this content. Each claim must be:
1. Atomic - one testable assertion
2. Operational - constructible, with clear pre/post conditions
3. Falsifiable - can be tested or challenged

For each claim, output YAML in this format:

```yaml
id: C-XXXX  # Will be assigned
version: "1.0.0"
text: "The claim in operational language"
dependencies: []  # Other claim IDs this depends on
evidence: ["artifact:{id}"]
gates: []  # Gate IDs for testing this claim
status: proposed
changelog:
  - "1.0.0: Extracted from {kind}"
```

Extract 1-5 claims. Focus on quality over quantity. If the content doesn't contain clear operational claims, output NONE."#,
        kind = record.kind,
        content = record.content,
        id = artifact.id,
    )
}

/// Renders the gate-design prompt for a claim's text.
pub fn gate_prompt(claim_text: &str) -> String {
    let kinds: Vec<String> = GATE_KINDS
        .iter()
        .map(|(name, question)| format!("- {}: {}", name, question))
        .collect();
    let kind_names: Vec<&str> = GATE_KINDS.iter().map(|(name, _)| *name).collect();

    format!(
        r#"Design gates (tests) for this claim:

CLAIM: {claim_text}

Create 2-3 gates. Each gate should be one of:
{kinds}

Output YAML:

```yaml
id: T-XXXX  # Will be assigned
version: "1.0.0"
kind: "{kind_names}"
prompt: "The test question"
pass_if:
  - "Criterion 1"
  - "Criterion 2"
```"#,
        kinds = kinds.join("\n"),
        kind_names = kind_names.join("|"),
    )
}

/// First `max_chars` characters of `prompt` followed by `...`.
pub fn preview(prompt: &str, max_chars: usize) -> String {
    let mut out: String = prompt.chars().take(max_chars).collect();
    out.push_str("...");
    out
}
