// ABOUTME: Invocation result model for synchronous endpoint responses
// ABOUTME: Parses the wire status vocabulary and retains the raw body for diagnostics

use serde_json::Value;
use std::fmt;

/// Job lifecycle status reported by the endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Queued,
    Running,
    Completed,
    Failed,
    /// Any status string the harness does not recognize, kept verbatim.
    Other(String),
}

impl JobStatus {
    pub fn parse(status: &str) -> Self {
        match status {
            "IN_QUEUE" => JobStatus::Queued,
            "IN_PROGRESS" => JobStatus::Running,
            "COMPLETED" => JobStatus::Completed,
            "FAILED" => JobStatus::Failed,
            other => JobStatus::Other(other.to_string()),
        }
    }

    /// True while the job sits in the queue or on a worker.
    pub fn is_pending(&self) -> bool {
        matches!(self, JobStatus::Queued | JobStatus::Running)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobStatus::Queued => "IN_QUEUE",
            JobStatus::Running => "IN_PROGRESS",
            JobStatus::Completed => "COMPLETED",
            JobStatus::Failed => "FAILED",
            JobStatus::Other(s) if s.is_empty() => "<missing>",
            JobStatus::Other(s) => s,
        };
        f.write_str(s)
    }
}

/// The result of one synchronous invocation. Created by the client,
/// consumed once by the classifier.
#[derive(Debug, Clone)]
pub struct InvocationResult {
    pub status: JobStatus,
    /// The handler output, when present and non-empty.
    pub output: Option<Value>,
    /// The full response body, for diagnostics when `output` is absent.
    pub raw: Value,
}

impl InvocationResult {
    pub fn from_raw(raw: Value) -> Self {
        let status = raw
            .get("status")
            .and_then(Value::as_str)
            .map(JobStatus::parse)
            .unwrap_or_else(|| JobStatus::Other(String::new()));

        let output = raw.get("output").filter(|v| !is_empty_value(v)).cloned();

        Self { status, output, raw }
    }

    /// The job id assigned by the endpoint, when present.
    pub fn job_id(&self) -> Option<&str> {
        self.raw.get("id").and_then(Value::as_str)
    }
}

// An empty output carries no usable result; callers fall back to the raw body.
fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        _ => false,
    }
}
