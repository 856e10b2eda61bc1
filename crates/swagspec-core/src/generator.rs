//! HTTP file generator - converts failed examples to .http format

use crate::report::ExampleOutcome;
use crate::request::ResolvedRequest;

/// Generate .http file content from the examples that did not pass
pub fn to_http_file<'a, I>(outcomes: I, base_url_var: &str) -> String
where
    I: IntoIterator<Item = &'a ExampleOutcome>,
{
    let reproducible: Vec<(&ExampleOutcome, &ResolvedRequest)> = outcomes
        .into_iter()
        .filter(|o| !o.is_passed())
        .filter_map(|o| o.request.as_ref().map(|r| (o, r)))
        .collect();

    let mut lines = Vec::new();
    lines.push(format!(
        "# Auto-generated reproduction cases ({} failures)",
        reproducible.len()
    ));
    lines.push(format!("# Base URL variable: {{{{{base_url_var}}}}}"));
    lines.push(String::new());

    for (idx, (outcome, request)) in reproducible.iter().enumerate() {
        lines.push(format!("### [{idx}] {} -> {}", outcome.label, outcome.code));
        if let Some(message) = outcome.outcome.message() {
            lines.push(format!("# {message}"));
        }
        lines.push(request_to_http(request, base_url_var));
        lines.push(String::new());
        lines.push("###".to_string());
        lines.push(String::new());
    }

    lines.join("\n")
}

/// Generate a single request as .http format
pub fn request_to_http(request: &ResolvedRequest, base_url_var: &str) -> String {
    let mut lines = Vec::new();

    let url = if request.path.starts_with("http") {
        request.path.clone()
    } else {
        format!("{{{{{base_url_var}}}}}{}", request.path)
    };
    lines.push(format!("{} {url}", request.verb));

    for (key, value) in request.canonical_headers() {
        if !matches!(key.to_lowercase().as_str(), "host" | "content-length") {
            lines.push(format!("{key}: {value}"));
        }
    }

    if let Some(payload) = &request.payload {
        lines.push(String::new());
        lines.push(payload.to_text());
    }

    lines.join("\n")
}
