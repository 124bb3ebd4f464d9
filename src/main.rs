//! CLI entry point for the paper summarizer.

use std::io::{self, IsTerminal};
use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use summarize_core::{
    HttpTimeouts, PipelineOutcome, PipelineSettings, build_default_pipeline, render_json,
    render_readable,
};
use tracing::{debug, info};

mod app_config;
mod cli;

use app_config::{FileConfig, VerbositySetting, load_config};
use cli::Args;

/// Environment variable consulted when the config has no `hf_token`.
const HF_TOKEN_ENV: &str = "HF_TOKEN";

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let loaded = load_config(args.config.as_deref())?;
    let file_config = loaded.config_or_default();

    init_tracing(&args, file_config.verbosity);
    debug!(
        ?args,
        config_path = ?loaded.path,
        loaded = loaded.config.is_some(),
        verbosity = ?file_config.verbosity.map(VerbositySetting::as_str),
        "configuration resolved"
    );

    let settings = pipeline_settings(&args, &file_config);
    let document = tokio::fs::read(&args.pdf)
        .await
        .with_context(|| format!("Failed to read PDF '{}'", args.pdf.display()))?;
    let filename = display_filename(&args.pdf);
    info!(file = %filename, bytes = document.len(), "Summarizing paper");

    let spinner = progress_spinner(&args);
    let mut pipeline = build_default_pipeline(&settings).context("Failed to set up service clients")?;
    if let Some(spinner) = &spinner {
        let spinner = spinner.clone();
        pipeline = pipeline.with_stage_observer(move |stage| spinner.set_message(stage.label()));
    }

    let result = pipeline.run(&document, &filename).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let outcome = result?;

    print_outcome(&args, &outcome)
}

fn init_tracing(args: &Args, configured: Option<VerbositySetting>) {
    // Priority: RUST_LOG env var > CLI flags > config verbosity > default (info)
    let default_level = if args.quiet {
        "error"
    } else if args.debug {
        "debug"
    } else {
        match (args.verbose, configured) {
            (0, Some(VerbositySetting::Quiet)) => "error",
            (0, Some(VerbositySetting::Verbose | VerbositySetting::Debug)) | (1, _) => "debug",
            (0, _) => "info",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Built-in defaults, then config file, then CLI flags.
fn pipeline_settings(args: &Args, file: &FileConfig) -> PipelineSettings {
    let mut settings = PipelineSettings::default();

    if let Some(url) = args.grobid_url.clone().or_else(|| file.grobid_url.clone()) {
        settings.grobid_url = url;
    }
    if let Some(url) = args.crossref_url.clone().or_else(|| file.crossref_url.clone()) {
        settings.crossref_url = url;
    }
    if let Some(mailto) = args.mailto.clone().or_else(|| file.crossref_mailto.clone()) {
        settings.crossref_mailto = mailto;
    }
    if let Some(url) = file.translate_url.clone() {
        settings.translate_url = url;
    }
    if let Some(url) = file.summarize_url.clone() {
        settings.summarize_url = url;
    }
    if let Some(lang) = file.target_lang.clone() {
        settings.target_lang = lang;
    }
    settings.hf_token = file
        .hf_token
        .clone()
        .or_else(|| std::env::var(HF_TOKEN_ENV).ok())
        .filter(|token| !token.trim().is_empty());

    settings.http = HttpTimeouts {
        connect_timeout_secs: file
            .connect_timeout_secs
            .unwrap_or(settings.http.connect_timeout_secs),
        read_timeout_secs: file
            .read_timeout_secs
            .unwrap_or(settings.http.read_timeout_secs),
    };
    if let Some(secs) = file.call_timeout_secs {
        settings.call_timeout = Duration::from_secs(secs);
    }
    if let Some(pages) = file.text_scan_pages.and_then(|n| usize::try_from(n).ok()) {
        settings.text_scan_pages = pages;
    }
    if let Some(chars) = file.translate_max_chars.and_then(|n| usize::try_from(n).ok()) {
        settings.translate_max_chars = chars;
    }
    settings
}

fn display_filename(path: &Path) -> String {
    path.file_name().map_or_else(
        || "document.pdf".to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}

/// Spinner on stderr for interactive runs; none when quiet, debugging or piped.
fn progress_spinner(args: &Args) -> Option<ProgressBar> {
    if args.quiet || args.debug || args.verbose > 0 || !io::stderr().is_terminal() {
        return None;
    }
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    Some(spinner)
}

fn print_outcome(args: &Args, outcome: &PipelineOutcome) -> Result<()> {
    debug!(stages = ?outcome.stages, doi_source = ?outcome.doi_source, "pipeline outcome");
    if args.debug {
        let json = render_json(&outcome.digest).context("Failed to serialize result")?;
        println!("{json}");
    } else {
        println!("{}", render_readable(&outcome.digest));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["summarize-papers", "--pdf", "dir/paper.pdf"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_cli_flags_override_config_values() {
        let file = FileConfig {
            grobid_url: Some("http://from-config".to_string()),
            crossref_mailto: Some("config@example.org".to_string()),
            ..FileConfig::default()
        };
        let settings = pipeline_settings(&args(&["--grobid-url", "http://from-cli"]), &file);
        assert_eq!(settings.grobid_url, "http://from-cli");
        assert_eq!(settings.crossref_mailto, "config@example.org");
    }

    #[test]
    fn test_config_values_override_defaults() {
        let file = FileConfig {
            call_timeout_secs: Some(30),
            text_scan_pages: Some(4),
            read_timeout_secs: Some(15),
            hf_token: Some("hf_config".to_string()),
            ..FileConfig::default()
        };
        let settings = pipeline_settings(&args(&[]), &file);
        assert_eq!(settings.call_timeout, Duration::from_secs(30));
        assert_eq!(settings.text_scan_pages, 4);
        assert_eq!(settings.http.read_timeout_secs, 15);
        assert_eq!(settings.http.connect_timeout_secs, HttpTimeouts::default().connect_timeout_secs);
        assert_eq!(settings.hf_token.as_deref(), Some("hf_config"));
    }

    #[test]
    fn test_display_filename_uses_last_component() {
        assert_eq!(display_filename(Path::new("dir/paper.pdf")), "paper.pdf");
        assert_eq!(display_filename(Path::new("/")), "document.pdf");
    }
}
