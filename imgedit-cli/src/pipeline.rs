// ABOUTME: Per-mode invocation pipelines: encode or upload, build, invoke, classify, report
// ABOUTME: Each pipeline is one independent result-producing call; --all composes two of them

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use imgedit_sdk::constants::storage;
use imgedit_sdk::{
    EditParams, EditRequest, EndpointClient, ImageSource, Outcome, StorageUploader, classify,
    encode_file, hold_duration_ms, upload_image,
};

use crate::cli_output::CliOutput;
use crate::config::HarnessConfig;

/// One complete encode/build/invoke/classify sequence for a single
/// image-delivery mode.
pub struct Pipeline<'a> {
    client: &'a EndpointClient,
    out: &'a CliOutput,
    show_progress: bool,
}

impl<'a> Pipeline<'a> {
    pub fn new(client: &'a EndpointClient, out: &'a CliOutput) -> Self {
        let show_progress = {
            use std::io::IsTerminal;
            std::io::stderr().is_terminal()
        };
        Self {
            client,
            out,
            show_progress,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// url mode: pass a remote image URL through to the handler.
    pub async fn run_url(
        &self,
        params: EditParams,
        image_url: &str,
        out_path: Option<&Path>,
    ) -> Result<Outcome> {
        Url::parse(image_url).with_context(|| format!("Invalid image URL: {image_url}"))?;

        let request = EditRequest::new(params, ImageSource::url(image_url));
        self.call_once(&request.to_value(), out_path).await
    }

    /// inline mode: embed the local file as base64 in the request body.
    pub async fn run_inline(
        &self,
        params: EditParams,
        image_file: &Path,
        out_path: Option<&Path>,
    ) -> Result<Outcome> {
        let encoded = encode_file(image_file)?;
        log::debug!(
            "encoded {} ({} base64 chars)",
            image_file.display(),
            encoded.len()
        );

        let request = EditRequest::new(params, ImageSource::inline(encoded));
        self.call_once(&request.to_value(), out_path).await
    }

    /// storage mode: upload to the shared network volume, then reference
    /// the worker-visible path.
    pub async fn run_storage(
        &self,
        config: &HarnessConfig,
        params: EditParams,
        image_file: &Path,
        out_path: Option<&Path>,
    ) -> Result<Outcome> {
        let storage_config = config.storage()?;
        let uploader = StorageUploader::new(&storage_config);

        let reference = upload_image(&uploader, image_file, storage::DEFAULT_KEY_PREFIX).await?;
        self.out
            .info(&format!("uploaded as {}", reference.remote_path));

        let request = EditRequest::new(params, ImageSource::storage(reference));
        self.call_once(&request.to_value(), out_path).await
    }

    /// File mode: send a pre-built request document, unwrapping an
    /// optional {"input": {...}} envelope.
    pub async fn run_document(
        &self,
        document_path: &Path,
        out_path: Option<&Path>,
    ) -> Result<Outcome> {
        let content = std::fs::read_to_string(document_path)
            .with_context(|| format!("Failed to read request document: {}", document_path.display()))?;
        let document: Value = serde_json::from_str(&content).with_context(|| {
            format!(
                "Failed to parse request document: {}",
                document_path.display()
            )
        })?;

        let input = match document.get("input") {
            Some(inner) => inner.clone(),
            None => document,
        };
        self.call_once(&input, out_path).await
    }

    /// Issue exactly one synchronous invocation and classify its result.
    async fn call_once(&self, input: &Value, out_path: Option<&Path>) -> Result<Outcome> {
        println!(
            "Input: {}",
            serde_json::to_string_pretty(&abbreviate_inline_data(input))?
        );

        let held_secs = hold_duration_ms(self.client.timeout().as_secs()) / 1000;
        let spinner = self.wait_spinner(held_secs);
        let result = self.client.run_sync(input).await;
        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }
        let result = result?;

        if let Some(job_id) = result.job_id() {
            log::debug!("job id: {job_id}");
        }
        self.out.info(&format!("Status: {}", result.status));

        let outcome = classify(&result, out_path)?;
        self.report(&outcome);
        Ok(outcome)
    }

    fn wait_spinner(&self, held_secs: u64) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg} {elapsed}")
                .unwrap(),
        );
        pb.set_message(format!(
            "Invoking endpoint (server holds the result up to {held_secs}s)"
        ));
        pb.enable_steady_tick(Duration::from_millis(120));
        Some(pb)
    }

    fn report(&self, outcome: &Outcome) {
        match outcome {
            Outcome::Success { note, saved } => {
                if let Some(note) = note {
                    self.out.info(note);
                }
                match saved {
                    Some(path) => self
                        .out
                        .success(&format!("result image saved to {}", path.display())),
                    None => self.out.success("result returned"),
                }
            }
            Outcome::Pending { status, note } => {
                if let Some(note) = note {
                    self.out.info(note);
                }
                self.out.warning(&format!("job still {status}"));
                if let Some(advice) = outcome.advice() {
                    self.out.info(advice);
                }
            }
            Outcome::Failure { message } => {
                self.out.error(message);
            }
        }
    }
}

/// Replace inline image data with a short placeholder so echoed request
/// bodies stay readable.
pub fn abbreviate_inline_data(input: &Value) -> Value {
    let mut printable = input.clone();
    if let Some(object) = printable.as_object_mut() {
        for (key, value) in object.iter_mut() {
            if key.starts_with("image_base64") {
                if let Some(data) = value.as_str() {
                    *value = Value::String(format!("<base64:{} chars>", data.len()));
                }
            }
        }
    }
    printable
}

/// Derive the output path for the storage pipeline in --all mode, so the
/// two results never overwrite each other.
pub fn storage_out_path(out: &Path) -> PathBuf {
    let stem = out
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("result");
    let ext = out.extension().and_then(|e| e.to_str());
    let file_name = match ext {
        Some(ext) => format!("{stem}_storage.{ext}"),
        None => format!("{stem}_storage"),
    };
    out.with_file_name(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use imgedit_sdk::HarnessError;
    use secrecy::SecretString;
    use serde_json::json;
    use std::io::Write;

    fn test_client(base_url: &str) -> EndpointClient {
        EndpointClient::builder()
            .api_key(SecretString::new("test-key".to_string().into_boxed_str()))
            .endpoint_id("test-endpoint".to_string())
            .base_url(Some(base_url.to_string()))
            .timeout(Duration::from_secs(120))
            .build()
            .expect("Should build test client")
    }

    #[test]
    fn test_abbreviate_inline_data() {
        let input = json!({
            "prompt": "p",
            "image_base64": "aGVsbG8=",
        });

        let printable = abbreviate_inline_data(&input);
        assert_eq!(printable["image_base64"], "<base64:8 chars>");
        assert_eq!(printable["prompt"], "p");
        // The original input is untouched
        assert_eq!(input["image_base64"], "aGVsbG8=");
    }

    #[test]
    fn test_abbreviate_leaves_other_fields() {
        let input = json!({"image_url": "https://example.com/a.png"});
        let printable = abbreviate_inline_data(&input);
        assert_eq!(printable, input);
    }

    #[test]
    fn test_storage_out_path() {
        assert_eq!(
            storage_out_path(Path::new("out/result.png")),
            PathBuf::from("out/result_storage.png")
        );
        assert_eq!(
            storage_out_path(Path::new("result")),
            PathBuf::from("result_storage")
        );
    }

    #[tokio::test]
    async fn test_inline_pipeline_end_to_end() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v2/test-endpoint/runsync")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"status":"COMPLETED","output":{"image":"aGVsbG8="}}"#)
            .create_async()
            .await;

        let mut image = tempfile::NamedTempFile::with_suffix(".png").unwrap();
        image.write_all(b"fake png bytes").unwrap();
        let out_dir = tempfile::TempDir::new().unwrap();
        let out_path = out_dir.path().join("edited.png");

        let client = test_client(&server.url());
        let output = CliOutput::with_color(false);
        let pipeline = Pipeline::new(&client, &output).with_progress(false);

        let params = EditParams {
            prompt: "p".to_string(),
            seed: 1,
            width: 8,
            height: 8,
        };
        let outcome = pipeline
            .run_inline(params, image.path(), Some(&out_path))
            .await
            .expect("Pipeline should complete");

        mock.assert_async().await;
        assert!(outcome.is_success());
        assert_eq!(std::fs::read(&out_path).unwrap(), b"hello");
    }

    #[tokio::test]
    async fn test_inline_pipeline_missing_file_skips_network() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v2/test-endpoint/runsync")
            .match_query(mockito::Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let output = CliOutput::with_color(false);
        let pipeline = Pipeline::new(&client, &output).with_progress(false);

        let params = EditParams {
            prompt: "p".to_string(),
            seed: 1,
            width: 8,
            height: 8,
        };
        let result = pipeline
            .run_inline(params, Path::new("/nonexistent/input.png"), None)
            .await;

        mock.assert_async().await;
        let err = result.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<HarnessError>(),
            Some(HarnessError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_document_pipeline_unwraps_input_envelope() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v2/test-endpoint/runsync")
            .match_query(mockito::Matcher::Any)
            .match_body(mockito::Matcher::Json(
                json!({"input": {"prompt": "from file", "image_url": "https://example.com/a.png"}}),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"status":"IN_QUEUE"}"#)
            .create_async()
            .await;

        let mut document = tempfile::NamedTempFile::with_suffix(".json").unwrap();
        document
            .write_all(
                br#"{"input": {"prompt": "from file", "image_url": "https://example.com/a.png"}}"#,
            )
            .unwrap();

        let client = test_client(&server.url());
        let output = CliOutput::with_color(false);
        let pipeline = Pipeline::new(&client, &output).with_progress(false);

        let outcome = pipeline
            .run_document(document.path(), None)
            .await
            .expect("Pipeline should complete");

        mock.assert_async().await;
        assert!(matches!(outcome, Outcome::Pending { .. }));
    }

    #[tokio::test]
    async fn test_url_pipeline_rejects_invalid_url() {
        let server = mockito::Server::new_async().await;
        let client = test_client(&server.url());
        let output = CliOutput::with_color(false);
        let pipeline = Pipeline::new(&client, &output).with_progress(false);

        let params = EditParams {
            prompt: "p".to_string(),
            seed: 1,
            width: 8,
            height: 8,
        };
        let result = pipeline.run_url(params, "not a url", None).await;
        assert!(result.is_err());
    }
}
