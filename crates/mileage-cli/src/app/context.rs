//! Application context for the Mileage CLI.
//!
//! Provides a unified context that combines CLI arguments with
//! lazily-loaded configuration and the async runtime.

use once_cell::unsync::OnceCell;
use tokio::runtime::Runtime;

use mileage_core::distance::DistanceEstimator;
use mileage_core::receipt::ReceiptCapture;
use mileage_core::LedgerSession;

use crate::capture::FileImageSource;
use crate::cli::Cli;
use crate::config::MileageConfig;
use crate::ui::UiContext;

use super::resolver::load_config;

/// Application context that bundles CLI args with configuration.
///
/// This avoids repeatedly loading config and threading multiple parameters
/// through handler functions.
pub struct AppContext<'a> {
    cli: &'a Cli,
    config: OnceCell<MileageConfig>,
    runtime: OnceCell<Runtime>,
}

impl<'a> AppContext<'a> {
    /// Create a new application context from CLI arguments.
    pub fn new(cli: &'a Cli) -> Self {
        Self {
            cli,
            config: OnceCell::new(),
            runtime: OnceCell::new(),
        }
    }

    /// Get the CLI arguments.
    pub fn cli(&self) -> &Cli {
        self.cli
    }

    /// Check if quiet mode is enabled.
    pub fn quiet(&self) -> bool {
        self.cli.quiet
    }

    /// UI context for the given `--json` flag.
    pub fn ui(&self, json: bool) -> UiContext {
        UiContext::from_env(json, self.cli.no_color, self.cli.ascii)
    }

    /// Get the configuration, loading it lazily if needed.
    pub fn config(&self) -> anyhow::Result<&MileageConfig> {
        self.config.get_or_try_init(|| load_config(self.cli))
    }

    /// Get the async runtime, starting it on first use.
    pub fn runtime(&self) -> anyhow::Result<&Runtime> {
        self.runtime.get_or_try_init(|| {
            tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .map_err(|e| anyhow::anyhow!("Failed to start async runtime: {}", e))
        })
    }

    /// Build a distance estimator if an API key is configured.
    pub fn estimator(&self) -> anyhow::Result<Option<DistanceEstimator>> {
        match self.config()?.directions_config() {
            Some(config) => Ok(Some(DistanceEstimator::new(config)?)),
            None => Ok(None),
        }
    }

    /// Build a ledger session wired to the configured capabilities.
    ///
    /// Receipt capture is offered only when prompts are possible.
    pub fn session(&self, interactive: bool) -> anyhow::Result<LedgerSession> {
        let capture = if interactive {
            ReceiptCapture::new(Some(Box::new(FileImageSource)))
        } else {
            ReceiptCapture::unavailable()
        };

        Ok(LedgerSession::in_memory()
            .with_estimator(self.estimator()?)
            .with_capture(capture))
    }
}
