mod formatter;
mod mpris;
mod pool;
mod sanitize;
mod state;
mod text_utils;
mod ui;

use crate::formatter::{DEFAULT_SERVICE, MetadataFormatter};
use crate::sanitize::{DEFAULT_SANITIZE_WORDS, SanitizeError, Sanitizer};
use crate::state::{Response, Theme};
use clap::Parser;
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing_subscriber::EnvFilter;

/// Status bar module for MellowPlayer and other MPRIS players
#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Config {
    /// Seconds between polls
    #[arg(long, default_value_t = 5)]
    pub cache_timeout: u64,
    /// Template for the playing/paused state. Placeholders: {album} {artist} {time} {title}
    #[arg(long, default_value = "{artist} : {title}")]
    pub format: String,
    /// Text shown when the player is not running
    #[arg(long, default_value = "MellowPlayer not running")]
    pub format_down: String,
    /// Text shown when the player is running but has no track
    #[arg(long, default_value = "MellowPlayer stopped")]
    pub format_stopped: String,
    /// Keep album and title exactly as the player reports them
    #[arg(long = "no-sanitize")]
    pub no_sanitize: bool,
    /// Comma-separated words whose brackets/trailing segments are stripped from titles.
    /// If empty, the MELLOWSTATUS_SANITIZE_WORDS env var is used, then the built-in list.
    #[arg(long, value_delimiter = ',')]
    pub sanitize_words: Vec<String>,
    /// MPRIS bus name of the player
    #[arg(long, default_value = DEFAULT_SERVICE)]
    pub service: String,
    /// Color while playing (defaults to --color-good)
    #[arg(long)]
    pub color_playing: Option<String>,
    /// Color while paused or stopped (defaults to --color-degraded)
    #[arg(long)]
    pub color_paused: Option<String>,
    /// Color while the player is not running (defaults to --color-bad)
    #[arg(long)]
    pub color_offline: Option<String>,
    #[arg(long, default_value = "#00FF00")]
    pub color_good: String,
    #[arg(long, default_value = "#FFFF00")]
    pub color_degraded: String,
    #[arg(long, default_value = "#FF0000")]
    pub color_bad: String,
    /// Upper bound for each D-Bus call, in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub call_timeout_ms: u64,
    /// Print a single status line and exit
    #[arg(long)]
    pub once: bool,
    /// Enable backend debug logging to stderr
    #[arg(long)]
    pub debug_log: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_timeout: 5,
            format: "{artist} : {title}".to_string(),
            format_down: "MellowPlayer not running".to_string(),
            format_stopped: "MellowPlayer stopped".to_string(),
            no_sanitize: false,
            sanitize_words: DEFAULT_SANITIZE_WORDS.iter().map(|w| w.to_string()).collect(),
            service: DEFAULT_SERVICE.to_string(),
            color_playing: None,
            color_paused: None,
            color_offline: None,
            color_good: "#00FF00".to_string(),
            color_degraded: "#FFFF00".to_string(),
            color_bad: "#FF0000".to_string(),
            call_timeout_ms: 1000,
            once: false,
            debug_log: false,
        }
    }
}

/// Errors that make the configuration unusable
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Invalid sanitize words: {0}")]
    Sanitize(#[from] SanitizeError),
    #[error("--cache-timeout must be at least 1 second")]
    ZeroInterval,
    #[error("--call-timeout-ms must be at least 1")]
    ZeroCallTimeout,
}

impl Config {
    /// Validate the configuration and compile the sanitize patterns.
    pub fn build_formatter(&self) -> Result<MetadataFormatter, ConfigError> {
        if self.cache_timeout == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        if self.call_timeout_ms == 0 {
            return Err(ConfigError::ZeroCallTimeout);
        }
        let sanitizer = if self.no_sanitize {
            None
        } else {
            Some(Sanitizer::new(self.sanitize_words.as_slice())?)
        };
        Ok(MetadataFormatter {
            service: self.service.clone(),
            format: self.format.clone(),
            format_down: self.format_down.clone(),
            format_stopped: self.format_stopped.clone(),
            sanitizer,
            theme: Theme {
                playing: self.color_playing.clone(),
                paused: self.color_paused.clone(),
                offline: self.color_offline.clone(),
                good: self.color_good.clone(),
                degraded: self.color_degraded.clone(),
                bad: self.color_bad.clone(),
            },
            cache_timeout: Duration::from_secs(self.cache_timeout),
        })
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }
}

fn parse_word_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(|p| p.trim().to_lowercase())
        .filter(|p| !p.is_empty())
        .collect()
}

fn sanitize_words_from_env_if_empty(cli: &mut Config, env_value: Option<String>) {
    if !cli.sanitize_words.is_empty() {
        return;
    }
    let parts = env_value.map(|s| parse_word_list(&s)).unwrap_or_default();
    cli.sanitize_words = if parts.is_empty() {
        DEFAULT_SANITIZE_WORDS.iter().map(|w| w.to_string()).collect()
    } else {
        parts
    };
}

fn init_tracing(debug_log: bool) {
    let default_level = if debug_log { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // stdout carries the status stream; logs go to stderr
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Forward an interrupt to the poll loop.
///
/// If the signal cannot be awaited the sender is held forever, so the loop
/// keeps running until the pipe closes.
async fn forward_shutdown<F>(signal: F, shutdown_tx: mpsc::Sender<()>)
where
    F: Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => {
            tracing::info!("Interrupted, shutting down");
            let _ = shutdown_tx.send(()).await;
        }
        Err(e) => {
            tracing::warn!(error = %e, "Cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    }
}

/// Write responses until the poller stops, then wait for it.
///
/// A write failure stops the poller right away instead of after its sleep.
async fn drain_to_pipe<W: std::io::Write>(
    rx: mpsc::Receiver<Response>,
    out: &mut W,
    poller: JoinHandle<()>,
    shutdown_tx: &mpsc::Sender<()>,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let result = ui::pipe::display_status_pipe(rx, out).await;
    if result.is_err() {
        let _ = shutdown_tx.try_send(());
    }
    if let Err(e) = poller.await {
        tracing::warn!(error = %e, "Poll task failed");
    }
    result
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut cfg = Config::parse();
    sanitize_words_from_env_if_empty(&mut cfg, std::env::var("MELLOWSTATUS_SANITIZE_WORDS").ok());
    init_tracing(cfg.debug_log);

    let formatter = match cfg.build_formatter() {
        Ok(f) => Arc::new(f),
        Err(e) => {
            eprintln!("Error: {}", e);
            return Err(e.into());
        }
    };
    tracing::info!(
        service = %formatter.service,
        interval_secs = cfg.cache_timeout,
        sanitize = formatter.sanitizer.is_some(),
        "Starting status module"
    );

    let bus = mpris::SessionBus::new(cfg.call_timeout());
    let mut stdout = std::io::stdout();

    if cfg.once {
        let resp = formatter.response(&bus).await;
        return ui::pipe::write_response(&mut stdout, &resp);
    }

    let (tx, rx) = mpsc::channel(8);
    let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
    let poller = tokio::spawn(pool::listen(tx, formatter, bus, shutdown_rx));

    tokio::spawn(forward_shutdown(tokio::signal::ctrl_c(), shutdown_tx.clone()));

    let result = drain_to_pipe(rx, &mut stdout, poller, &shutdown_tx).await;

    // Print error if any, for better diagnostics
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        return Err(e);
    }
    Ok(())
}
