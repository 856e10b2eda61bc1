//! Run report: per-example outcomes and the overall verdict

use serde::Serialize;

use crate::request::ResolvedRequest;
use crate::validate::ResponseSnapshot;

/// Result of one example
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Passed,
    /// Response did not match the expectation
    Failed { message: String },
    /// Contract, configuration or transport problem; nothing was judged
    Errored { message: String },
}

impl Outcome {
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Passed => None,
            Self::Failed { message } | Self::Errored { message } => Some(message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExampleOutcome {
    /// `VERB /template`
    pub label: String,
    /// Expected status code
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<ResolvedRequest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<ResponseSnapshot>,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl ExampleOutcome {
    #[must_use]
    pub fn is_passed(&self) -> bool {
        self.outcome == Outcome::Passed
    }
}

/// Pass or fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictStatus {
    Pass,
    Fail,
}

impl std::fmt::Display for VerdictStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pass => write!(f, "PASS"),
            Self::Fail => write!(f, "FAIL"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunReport {
    pub outcomes: Vec<ExampleOutcome>,
}

impl RunReport {
    pub fn push(&mut self, outcome: ExampleOutcome) {
        self.outcomes.push(outcome);
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    #[must_use]
    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_passed()).count()
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Failed { .. }))
    }

    #[must_use]
    pub fn errored(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Errored { .. }))
    }

    fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.outcome)).count()
    }

    /// Outcomes that did not pass, in run order
    pub fn problems(&self) -> impl Iterator<Item = &ExampleOutcome> {
        self.outcomes.iter().filter(|o| !o.is_passed())
    }

    /// PASS iff at least one example ran and every example passed.
    #[must_use]
    pub fn status(&self) -> VerdictStatus {
        if self.total() > 0 && self.passed() == self.total() {
            VerdictStatus::Pass
        } else {
            VerdictStatus::Fail
        }
    }

    /// 0 = pass, 1 = expectation failures, 3 = only tool/contract errors
    /// (or nothing ran).
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        if self.failed() > 0 {
            1
        } else if self.errored() > 0 || self.total() == 0 {
            3
        } else {
            0
        }
    }

    #[must_use]
    pub fn reason(&self) -> String {
        if self.status() == VerdictStatus::Pass {
            return format!("All {} examples passed", self.total());
        }
        if self.total() == 0 {
            return "No examples were run".to_string();
        }
        let mut parts = Vec::new();
        if self.failed() > 0 {
            parts.push(format!("{} failed", self.failed()));
        }
        if self.errored() > 0 {
            parts.push(format!("{} errors (contract/transport)", self.errored()));
        }
        format!("{} of {} examples: {}", self.total() - self.passed(), self.total(), parts.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(outcome: Outcome) -> ExampleOutcome {
        ExampleOutcome {
            label: "GET /widgets".to_string(),
            code: "200".to_string(),
            document: None,
            request: None,
            response: None,
            outcome,
        }
    }

    #[test]
    fn all_passed() {
        let report = RunReport {
            outcomes: vec![outcome(Outcome::Passed), outcome(Outcome::Passed)],
        };
        assert_eq!(report.status(), VerdictStatus::Pass);
        assert_eq!(report.exit_code(), 0);
        assert_eq!(report.reason(), "All 2 examples passed");
    }

    #[test]
    fn failures_exit_one() {
        let report = RunReport {
            outcomes: vec![
                outcome(Outcome::Passed),
                outcome(Outcome::Failed {
                    message: "Expected response code '500' to match '200'".into(),
                }),
                outcome(Outcome::Errored {
                    message: "connection refused".into(),
                }),
            ],
        };
        assert_eq!(report.status(), VerdictStatus::Fail);
        assert_eq!(report.exit_code(), 1);
        assert_eq!(report.problems().count(), 2);
        assert_eq!(report.reason(), "2 of 3 examples: 1 failed; 1 errors (contract/transport)");
    }

    #[test]
    fn errors_only_exit_three() {
        let report = RunReport {
            outcomes: vec![outcome(Outcome::Errored {
                message: "Referenced parameter '#/parameters/x' must be defined".into(),
            })],
        };
        assert_eq!(report.exit_code(), 3);
    }

    #[test]
    fn empty_run_fails() {
        let report = RunReport::default();
        assert_eq!(report.status(), VerdictStatus::Fail);
        assert_eq!(report.exit_code(), 3);
        assert_eq!(report.reason(), "No examples were run");
    }

    #[test]
    fn outcome_serializes_flat() {
        let json = serde_json::to_value(outcome(Outcome::Failed { message: "boom".into() })).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["message"], "boom");
        assert_eq!(json["label"], "GET /widgets");
        assert!(json.get("request").is_none());
    }
}
