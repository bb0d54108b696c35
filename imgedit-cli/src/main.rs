// ABOUTME: Main entry point for the imgedit test harness
// ABOUTME: Resolves configuration, dispatches the selected pipeline(s), and sets the exit code

use anyhow::{Context, Result};
use clap::Parser;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use imgedit_cli::cli::{Cli, Mode};
use imgedit_cli::cli_output::CliOutput;
use imgedit_cli::config::{Config, HarnessConfig};
use imgedit_cli::pipeline::{Pipeline, storage_out_path};
use imgedit_sdk::{EditParams, EndpointClient, HarnessError};

#[tokio::main]
async fn main() {
    env_logger::init();

    let cli = Cli::parse();

    // Determine if color should be used
    let use_color = !cli.no_color
        && env::var("NO_COLOR").is_err()
        && env::var("TERM").unwrap_or_default() != "dumb";
    let out = CliOutput::with_color(use_color);

    match run(&cli, &out).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(err) => {
            report_error(&out, &err);
            std::process::exit(1);
        }
    }
}

async fn run(cli: &Cli, out: &CliOutput) -> Result<bool> {
    let config = Config::load()?.resolve()?;
    let client = build_client(&config, cli.timeout)?;
    let pipeline = Pipeline::new(&client, out);

    if let Some(document) = &cli.json {
        let outcome = pipeline.run_document(document, cli.out.as_deref()).await?;
        return Ok(outcome.is_success());
    }

    if cli.all {
        return run_both(cli, out, &config, &pipeline).await;
    }

    let outcome = match cli.mode {
        Mode::Url => {
            let image_url = cli
                .image_url
                .clone()
                .or_else(|| env::var("TEST_IMAGE_URL").ok())
                .context("--image-url or TEST_IMAGE_URL is required for url mode")?;
            pipeline
                .run_url(edit_params(cli), &image_url, cli.out.as_deref())
                .await?
        }
        Mode::Inline => {
            let image_file = require_image_file(cli)?;
            pipeline
                .run_inline(edit_params(cli), &image_file, cli.out.as_deref())
                .await?
        }
        Mode::Storage => {
            let image_file = require_image_file(cli)?;
            pipeline
                .run_storage(&config, edit_params(cli), &image_file, cli.out.as_deref())
                .await?
        }
    };

    Ok(outcome.is_success())
}

/// Run the inline and storage pipelines back-to-back on one source file.
/// The two runs are independent: a failure in the first never aborts the
/// second, and each gets its own outcome.
async fn run_both(
    cli: &Cli,
    out: &CliOutput,
    config: &HarnessConfig,
    pipeline: &Pipeline<'_>,
) -> Result<bool> {
    let image_file = require_image_file(cli)?;

    out.headline("Test 1/2: inline input");
    let inline_ok = match pipeline
        .run_inline(edit_params(cli), &image_file, cli.out.as_deref())
        .await
    {
        Ok(outcome) => outcome.is_success(),
        Err(err) => {
            report_error(out, &err);
            false
        }
    };

    out.headline("Test 2/2: storage upload input");
    let storage_out = cli.out.as_deref().map(storage_out_path);
    let storage_ok = match pipeline
        .run_storage(config, edit_params(cli), &image_file, storage_out.as_deref())
        .await
    {
        Ok(outcome) => outcome.is_success(),
        Err(err) => {
            report_error(out, &err);
            false
        }
    };

    Ok(inline_ok && storage_ok)
}

fn build_client(config: &HarnessConfig, timeout_secs: u64) -> Result<EndpointClient, HarnessError> {
    EndpointClient::builder()
        .api_key(config.api_key.clone())
        .endpoint_id(config.endpoint_id.clone())
        .base_url(config.api_url.clone())
        .timeout(Duration::from_secs(timeout_secs))
        .build()
}

fn edit_params(cli: &Cli) -> EditParams {
    EditParams {
        prompt: cli.prompt.clone(),
        seed: cli.seed,
        width: cli.width,
        height: cli.height,
    }
}

fn require_image_file(cli: &Cli) -> Result<PathBuf> {
    cli.image_file
        .clone()
        .context("--image-file is required for this mode")
}

fn report_error(out: &CliOutput, err: &anyhow::Error) {
    out.error(&format!("{err:#}"));
    if let Some(harness_err) = err.downcast_ref::<HarnessError>() {
        if let Some(body) = harness_err.body_preview() {
            out.info(&format!("Response body: {body}"));
        }
        if let Some(help) = harness_err.help_text() {
            out.info(help);
        }
    }
}
