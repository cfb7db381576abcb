//! Refinement prompt rendering.

use handlebars::Handlebars;
use once_cell::sync::Lazy;
use serde_json::json;
use staffdesk_core::{AppError, AppResult};

const REFINEMENT_TEMPLATE: &str = "\
You are an assistant answering questions about an institution's staffing data.
Rewrite the draft answer below as one or two fluent sentences. Use only the
facts provided; do not add names, numbers, or rules that are not in the facts.

Question: {{query}}

Facts:
{{facts}}

Draft answer: {{draft}}

Rewritten answer:";

static REGISTRY: Lazy<Handlebars<'static>> = Lazy::new(|| {
    let mut handlebars = Handlebars::new();
    handlebars.set_strict_mode(true);
    handlebars
        .register_template_string("refinement", REFINEMENT_TEMPLATE)
        .expect("refinement template is valid");
    handlebars
});

/// Render the generation refinement prompt.
pub fn render_refinement(query: &str, facts_json: &str, draft: &str) -> AppResult<String> {
    REGISTRY
        .render(
            "refinement",
            &json!({ "query": query, "facts": facts_json, "draft": draft }),
        )
        .map_err(|e| AppError::Generation(format!("Failed to render prompt: {}", e)))
}
