//! Dry run plan types and config validation
//!
//! Builds every example's request without sending it. Used for
//! pre-flight validation and CI previews.

use serde::Serialize;

use crate::Config;
use crate::contract::ContractExample;
use crate::document::{DocumentStore, server_path};
use crate::params;
use crate::request::{HeaderCasing, RequestError, RequestFactory, ResolvedRequest};

// ── Plan types ──

/// Complete dry run plan: built requests and config warnings.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DryRunPlan {
    pub examples: Vec<PlannedExample>,
    pub validations: Vec<Validation>,
}

/// The request one example would send.
#[derive(Debug, Clone, Serialize)]
pub struct PlannedExample {
    /// e.g. "POST /widgets"
    pub label: String,
    /// Expected status code
    pub code: String,
    /// Resolved parameter names, in resolution order
    pub parameters: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<ResolvedRequest>,
    /// Why the request could not be built
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A validation check result.
#[derive(Debug, Clone, Serialize)]
pub struct Validation {
    pub check: String,
    pub status: ValidationStatus,
    pub message: String,
}

/// Status of a validation check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    Ok,
    Warning,
    Error,
}

impl std::fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ok => write!(f, "OK"),
            Self::Warning => write!(f, "WARNING"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

impl Validation {
    fn new(check: &str, status: ValidationStatus, message: String) -> Self {
        Self {
            check: check.to_string(),
            status,
            message,
        }
    }
}

// ── Planning ──

/// Build each example's request against the store.
#[must_use]
pub fn plan_examples(
    store: &DocumentStore,
    casing: HeaderCasing,
    examples: &[ContractExample],
) -> Vec<PlannedExample> {
    let factory = RequestFactory::new(store).with_casing(casing);
    examples
        .iter()
        .map(|example| {
            let metadata = &example.metadata;
            let parameters = store
                .get(metadata.document.as_deref())
                .map_err(RequestError::from)
                .and_then(|doc| params::resolve(metadata, doc, &example.values))
                .map(|list| list.into_iter().map(|p| p.name).collect())
                .unwrap_or_default();
            let (request, error) = match factory.build_request(metadata, &example.values) {
                Ok(request) => (Some(request), None),
                Err(e) => (None, Some(e.to_string())),
            };
            PlannedExample {
                label: metadata.label(),
                code: metadata.response.code.clone(),
                parameters,
                request,
                error,
            }
        })
        .collect()
}

// ── Config validation ──

/// Patterns that suggest a placeholder value rather than a real credential.
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-token",
    "your_token",
    "YOUR_TOKEN",
    "your-api-key",
    "YOUR_API_KEY",
    "CHANGEME",
    "changeme",
    "placeholder",
    "REPLACE_ME",
];

/// Validate config and produce validation results.
#[must_use]
pub fn validate_config(config: &Config) -> Vec<Validation> {
    let mut checks = Vec::new();

    if config.documents.is_empty() {
        checks.push(Validation::new(
            "documents",
            ValidationStatus::Error,
            "documents: none configured".into(),
        ));
    }
    for (key, path) in &config.documents {
        let (status, note) = if path.exists() {
            (ValidationStatus::Ok, "exists")
        } else {
            (ValidationStatus::Error, "not found")
        };
        checks.push(Validation::new(
            "documents",
            status,
            format!("document {key}: {} ({note})", path.display()),
        ));
    }

    if config.contracts.is_empty() {
        checks.push(Validation::new(
            "contracts",
            ValidationStatus::Warning,
            "contracts: none configured".into(),
        ));
    }
    for path in &config.contracts {
        let (status, note) = if path.exists() {
            (ValidationStatus::Ok, "exists")
        } else {
            (ValidationStatus::Error, "not found")
        };
        checks.push(Validation::new(
            "contracts",
            status,
            format!("contract: {} ({note})", path.display()),
        ));
    }

    if config.base_url.starts_with("http://") || config.base_url.starts_with("https://") {
        checks.push(Validation::new(
            "base_url",
            ValidationStatus::Ok,
            format!("base_url: {}", config.base_url),
        ));
    } else {
        checks.push(Validation::new(
            "base_url",
            ValidationStatus::Warning,
            format!("base_url: {} (missing http:// or https:// prefix)", config.base_url),
        ));
    }

    let mut header_issues = Vec::new();
    for (key, value) in &config.headers {
        if value.contains('<') && value.contains('>') {
            header_issues.push(format!("{key}: contains '<...>' placeholder"));
        } else if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| value.contains(*p)) {
            header_issues.push(format!("{key}: contains '{pattern}', may be placeholder"));
        }
    }
    if header_issues.is_empty() {
        checks.push(Validation::new(
            "headers",
            ValidationStatus::Ok,
            format!("headers: {} configured", config.headers.len()),
        ));
    } else {
        checks.extend(
            header_issues
                .into_iter()
                .map(|issue| Validation::new("headers", ValidationStatus::Warning, issue)),
        );
    }

    checks
}

/// Warn when `base_url` already ends with a document's base path.
#[must_use]
pub fn validate_base_paths(config: &Config, store: &DocumentStore) -> Vec<Validation> {
    let url_path = server_path(&config.base_url);
    store
        .iter()
        .filter_map(|(key, document)| {
            let base_path = document.base_path();
            let doubled = !base_path.is_empty() && url_path.ends_with(&base_path);
            doubled.then(|| {
                Validation::new(
                    "base_url",
                    ValidationStatus::Warning,
                    format!(
                        "base_url: path '{url_path}' repeats the base path of document {key}; \
                         requests would go to {url_path}{base_path}/..."
                    ),
                )
            })
        })
        .collect()
}

// ── Display helpers ──

impl DryRunPlan {
    /// Format as human-readable terminal output.
    #[must_use]
    pub fn to_terminal(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Dry run: {} examples planned\n", self.examples.len()));

        for example in &self.examples {
            lines.push(format!("{} -> {}:", example.label, example.code));
            if !example.parameters.is_empty() {
                lines.push(format!("  Parameters: {}", example.parameters.join(", ")));
            }
            match (&example.request, &example.error) {
                (Some(request), _) => {
                    lines.push(format!("  {} {}", request.verb, request.path));
                    for (name, value) in request.canonical_headers() {
                        lines.push(format!("  {name}: {value}"));
                    }
                    if let Some(payload) = &request.payload {
                        lines.push(format!("  Body: {}", payload.to_text()));
                    }
                }
                (None, Some(error)) => lines.push(format!("  [ERROR] {error}")),
                (None, None) => {}
            }
            lines.push(String::new());
        }

        lines.push("Config validation:".into());
        for v in &self.validations {
            lines.push(format!("  [{}] {}", v.status, v.message));
        }

        lines.join("\n")
    }

    /// Returns true if any validation failed or any request could not be built.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.validations.iter().any(|v| v.status == ValidationStatus::Error)
            || self.examples.iter().any(|e| e.error.is_some())
    }

    /// Returns true if any validation has Warning status.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        self.validations
            .iter()
            .any(|v| v.status == ValidationStatus::Warning)
    }
}
