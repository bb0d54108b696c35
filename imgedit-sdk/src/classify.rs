// ABOUTME: Classification of synchronous invocation results into success, pending, or failure
// ABOUTME: Optionally persists a decoded result image as the only side effect

use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::constants::{preview, previews};
use crate::encode::decode_image;
use crate::error::HarnessError;
use crate::response::{InvocationResult, JobStatus};

/// The classified outcome of one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success {
        /// Diagnostic note for unstructured or absent output.
        note: Option<String>,
        /// Where the decoded result image was written, if requested.
        saved: Option<PathBuf>,
    },
    Pending {
        status: JobStatus,
        /// Bounded preview of any unrecognized output that came back early.
        note: Option<String>,
    },
    Failure {
        message: String,
    },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    /// Operator guidance for non-final outcomes.
    pub fn advice(&self) -> Option<&'static str> {
        match self {
            Outcome::Pending { .. } => Some(
                "The job has not completed within the hold window. The worker may still be cold-starting; retry shortly or switch to an asynchronous run/status flow.",
            ),
            _ => None,
        }
    }
}

/// Classify an invocation result. When `output_path` is given and the
/// output carries inline image data, the decoded bytes are written there,
/// overwriting any existing file.
pub fn classify(
    result: &InvocationResult,
    output_path: Option<&Path>,
) -> Result<Outcome, HarnessError> {
    if let Some(output) = &result.output {
        // An explicit error field wins over everything else in the output.
        if let Some(error) = output.get("error") {
            let message = error
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| error.to_string());
            return Ok(Outcome::Failure { message });
        }

        if let Some(image) = output.get("image") {
            let saved = match (output_path, image.as_str()) {
                (Some(path), Some(data)) if !data.is_empty() => {
                    let bytes = decode_image(data)?;
                    std::fs::write(path, bytes)?;
                    Some(path.to_path_buf())
                }
                _ => None,
            };
            let note = image
                .as_str()
                .map(|data| format!("image field present, {} chars", data.len()));
            return Ok(Outcome::Success { note, saved });
        }

        // Output matches neither known shape; keep a bounded preview.
        let note = preview(&output.to_string(), previews::OUTPUT);
        return Ok(match &result.status {
            JobStatus::Completed => Outcome::Success {
                note: Some(format!("unstructured output: {note}")),
                saved: None,
            },
            status if status.is_pending() => Outcome::Pending {
                status: status.clone(),
                note: Some(note),
            },
            status => Outcome::Failure {
                message: format!("status {status}, unstructured output: {note}"),
            },
        });
    }

    // No usable output; decide on status alone.
    match &result.status {
        status if status.is_pending() => Ok(Outcome::Pending {
            status: status.clone(),
            note: None,
        }),
        JobStatus::Completed => Ok(Outcome::Success {
            note: Some(format!(
                "no output field, response: {}",
                preview(&result.raw.to_string(), previews::RAW_RESPONSE)
            )),
            saved: None,
        }),
        status => Ok(Outcome::Failure {
            message: format!(
                "status {status}, response: {}",
                preview(&result.raw.to_string(), previews::RAW_RESPONSE)
            ),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn result_of(raw: Value) -> InvocationResult {
        InvocationResult::from_raw(raw)
    }

    #[test]
    fn test_error_field_is_failure_with_message() {
        let result = result_of(json!({
            "status": "COMPLETED",
            "output": {"error": "x", "image": "aGVsbG8="},
        }));

        // error wins regardless of any other fields present
        let outcome = classify(&result, None).unwrap();
        assert_eq!(
            outcome,
            Outcome::Failure {
                message: "x".to_string()
            }
        );
    }

    #[test]
    fn test_non_string_error_field_still_fails() {
        let result = result_of(json!({
            "status": "COMPLETED",
            "output": {"error": {"code": 42}},
        }));

        match classify(&result, None).unwrap() {
            Outcome::Failure { message } => assert!(message.contains("42")),
            other => panic!("Expected failure, got {other:?}"),
        }
    }

    #[test]
    fn test_image_output_is_success() {
        let result = result_of(json!({
            "status": "COMPLETED",
            "output": {"image": "aGVsbG8="},
        }));

        let outcome = classify(&result, None).unwrap();
        assert!(outcome.is_success());
        match outcome {
            Outcome::Success { saved, .. } => assert!(saved.is_none()),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_image_output_persists_decoded_bytes() {
        let dir = tempfile::TempDir::new().expect("Should create temp dir");
        let out_path = dir.path().join("result.png");

        let result = result_of(json!({
            "status": "COMPLETED",
            "output": {"image": "aGVsbG8="},
        }));

        let outcome = classify(&result, Some(&out_path)).unwrap();
        match outcome {
            Outcome::Success { saved, .. } => assert_eq!(saved, Some(out_path.clone())),
            other => panic!("Expected success, got {other:?}"),
        }
        assert_eq!(std::fs::read(&out_path).unwrap(), b"hello");
    }

    #[test]
    fn test_image_output_overwrites_existing_file() {
        let dir = tempfile::TempDir::new().expect("Should create temp dir");
        let out_path = dir.path().join("result.png");
        std::fs::write(&out_path, b"stale").unwrap();

        let result = result_of(json!({
            "status": "COMPLETED",
            "output": {"image": "aGVsbG8="},
        }));

        classify(&result, Some(&out_path)).unwrap();
        assert_eq!(std::fs::read(&out_path).unwrap(), b"hello");
    }

    #[test]
    fn test_invalid_image_data_is_decode_error() {
        let dir = tempfile::TempDir::new().expect("Should create temp dir");
        let out_path = dir.path().join("result.png");

        let result = result_of(json!({
            "status": "COMPLETED",
            "output": {"image": "!!! not base64 !!!"},
        }));

        let classified = classify(&result, Some(&out_path));
        assert!(matches!(classified, Err(HarnessError::Decode(_))));
        assert!(!out_path.exists());
    }

    #[test]
    fn test_unstructured_output_completed_is_success() {
        let result = result_of(json!({
            "status": "COMPLETED",
            "output": {"frames": [1, 2, 3]},
        }));

        match classify(&result, None).unwrap() {
            Outcome::Success { note, .. } => {
                assert!(note.unwrap().contains("unstructured"));
            }
            other => panic!("Expected success, got {other:?}"),
        }
    }

    #[test]
    fn test_unstructured_output_failed_status_is_failure() {
        let result = result_of(json!({
            "status": "FAILED",
            "output": {"frames": [1, 2, 3]},
        }));

        match classify(&result, None).unwrap() {
            Outcome::Failure { message } => {
                assert!(message.contains("FAILED"));
                assert!(message.contains("frames"));
            }
            other => panic!("Expected failure, got {other:?}"),
        }
    }

    #[test]
    fn test_queued_and_running_are_pending() {
        for status in ["IN_QUEUE", "IN_PROGRESS"] {
            let result = result_of(json!({"status": status}));
            let outcome = classify(&result, None).unwrap();
            assert!(matches!(outcome, Outcome::Pending { .. }));
            assert!(outcome.advice().unwrap().contains("cold-starting"));
        }
    }

    #[test]
    fn test_pending_even_with_unrecognized_output() {
        let result = result_of(json!({
            "status": "IN_PROGRESS",
            "output": {"progress": 0.4},
        }));

        match classify(&result, None).unwrap() {
            Outcome::Pending { status, note } => {
                assert_eq!(status, JobStatus::Running);
                assert!(note.unwrap().contains("progress"));
            }
            other => panic!("Expected pending, got {other:?}"),
        }
    }

    #[test]
    fn test_completed_without_output_is_success_with_raw_preview() {
        let result = result_of(json!({"status": "COMPLETED", "delayTime": 12}));

        match classify(&result, None).unwrap() {
            Outcome::Success { note, saved } => {
                assert!(note.unwrap().contains("delayTime"));
                assert!(saved.is_none());
            }
            other => panic!("Expected success, got {other:?}"),
        }
    }

    #[test]
    fn test_failed_without_output_is_failure() {
        let result = result_of(json!({"status": "FAILED"}));
        assert!(matches!(
            classify(&result, None).unwrap(),
            Outcome::Failure { .. }
        ));
    }

    #[test]
    fn test_missing_status_is_failure() {
        let result = result_of(json!({"workerId": "w-1"}));
        match classify(&result, None).unwrap() {
            Outcome::Failure { message } => assert!(message.contains("<missing>")),
            other => panic!("Expected failure, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_terminal_status_is_failure() {
        let result = result_of(json!({"status": "CANCELLED"}));
        match classify(&result, None).unwrap() {
            Outcome::Failure { message } => assert!(message.contains("CANCELLED")),
            other => panic!("Expected failure, got {other:?}"),
        }
    }

    #[test]
    fn test_success_has_no_advice() {
        let result = result_of(json!({
            "status": "COMPLETED",
            "output": {"image": "aGVsbG8="},
        }));
        assert_eq!(classify(&result, None).unwrap().advice(), None);
    }
}
