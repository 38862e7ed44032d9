// Entrypoint for the CLI application.
// - Builds the configuration (file, then environment and flags on top).
// - Creates the HTTP transport and runs the upload workflow.
// - Exits non-zero unless the model was uploaded and processed.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::ProgressBar;
use sketchfab_uploader::config::{AuthScheme, Config, LogFormat, LoggingConfig};
use sketchfab_uploader::{ui, workflow, HttpTransport, ThreadSleeper};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "sketchfab-upload")]
#[command(version)]
#[command(about = "Upload a 3D model to Sketchfab, wait for processing, then update it", long_about = None)]
struct Cli {
    /// Model file or archive to upload (overrides `model.file`)
    file: Option<PathBuf>,

    /// Path to a TOML configuration file
    #[arg(short, long, env = "SKETCHFAB_CONFIG")]
    config: Option<PathBuf>,

    /// API token
    #[arg(long, env = "SKETCHFAB_API_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// API base URL
    #[arg(long, env = "SKETCHFAB_API_URL")]
    api_url: Option<String>,

    /// Authorization header scheme
    #[arg(long, value_enum)]
    auth_scheme: Option<AuthScheme>,

    /// Model name
    #[arg(long)]
    name: Option<String>,

    /// Model description
    #[arg(long)]
    description: Option<String>,

    /// Tag, may be repeated
    #[arg(long = "tag")]
    tags: Vec<String>,

    /// Category slug, may be repeated
    #[arg(long = "category")]
    categories: Vec<String>,

    /// License label
    #[arg(long)]
    license: Option<String>,

    /// Publish instead of keeping a draft
    #[arg(long)]
    publish: bool,

    /// Make the model private (pro account)
    #[arg(long)]
    private: bool,

    /// Password-protect the model (pro account)
    #[arg(long)]
    password: Option<String>,

    /// Disable the 2D view in the model inspector
    #[arg(long)]
    no_inspect: bool,

    /// New name to set once processing succeeded
    #[arg(long)]
    rename: Option<String>,

    /// Stop after polling
    #[arg(long)]
    skip_patch: bool,

    /// Polling attempts before giving up
    #[arg(long)]
    max_retries: Option<u32>,

    /// Failed polling attempts before giving up
    #[arg(long)]
    max_errors: Option<u32>,

    /// Seconds between polling attempts
    #[arg(long)]
    retry_interval: Option<u64>,

    /// Save the token to ~/.sketchfab_token for later runs
    #[arg(long)]
    save_token: bool,

    /// Do not show the progress spinner
    #[arg(long)]
    no_progress: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Log output format
    #[arg(long, value_enum)]
    log_format: Option<LogFormat>,
}

impl Cli {
    /// Flags and environment win over the config file.
    fn apply(&self, config: &mut Config) {
        if let Some(file) = &self.file {
            config.model.file = Some(file.clone());
        }
        if let Some(token) = &self.token {
            config.api.token = Some(token.clone());
        }
        if let Some(url) = &self.api_url {
            config.api.url = url.clone();
        }
        if let Some(scheme) = self.auth_scheme {
            config.api.auth_scheme = scheme;
        }

        let metadata = &mut config.model.metadata;
        if let Some(name) = &self.name {
            metadata.name = Some(name.clone());
        }
        if let Some(description) = &self.description {
            metadata.description = Some(description.clone());
        }
        if !self.tags.is_empty() {
            metadata.tags = self.tags.clone();
        }
        if !self.categories.is_empty() {
            metadata.categories = self.categories.clone();
        }
        if let Some(license) = &self.license {
            metadata.license = Some(license.clone());
        }
        if self.publish {
            metadata.is_published = true;
        }
        if self.private {
            metadata.private = Some(true);
        }
        if let Some(password) = &self.password {
            metadata.password = Some(password.clone());
        }
        if self.no_inspect {
            metadata.is_inspectable = false;
        }

        if let Some(name) = &self.rename {
            config.patch.metadata.name = Some(name.clone());
        }
        if self.skip_patch {
            config.patch.enabled = false;
        }

        if let Some(max_retries) = self.max_retries {
            config.polling.max_retries = max_retries;
        }
        if let Some(max_errors) = self.max_errors {
            config.polling.max_errors = max_errors;
        }
        if let Some(interval) = self.retry_interval {
            config.polling.retry_interval_secs = interval;
        }

        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if let Some(format) = self.log_format {
            config.logging.format = format;
        }
    }
}

fn init_logging(logging: &LoggingConfig, spinner: ProgressBar) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(ui::log_writer(spinner));
    match logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.with_target(false).init(),
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut config =
        Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    cli.apply(&mut config);

    let spinner = ui::progress(!cli.no_progress && std::io::stderr().is_terminal());
    init_logging(&config.logging, spinner.clone());
    config.validate().context("Invalid configuration")?;

    let interactive = std::io::stdin().is_terminal();
    config.api.token = ui::resolve_token(config.api.token.take(), interactive)?;
    let token = config
        .api
        .token
        .clone()
        .context("Missing API token. Pass --token or set SKETCHFAB_API_TOKEN")?;
    if cli.save_token {
        let path = ui::token_path();
        ui::persist_token(&path, &token)?;
        tracing::info!(path = %path.display(), "Token saved");
    }

    let transport = HttpTransport::from_config(&config.api).context("Failed to build HTTP client")?;

    ui::start_spinner(&spinner, "Uploading and processing...");
    let report = workflow::run(&config, &transport, &ThreadSleeper);
    spinner.finish_and_clear();

    ui::print_summary(&report);
    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
