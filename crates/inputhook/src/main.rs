//! inputhook-monitor: logs every global keyboard and mouse event.
//!
//! Usage: `inputhook-monitor [--config PATH] [--no-debugger-guard] [--epoch-timestamps]`
//!
//! Without `--config` the platform config file is used (see
//! `infrastructure::storage::config`).  Press Ctrl-C to remove the hooks and
//! exit.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load config, init tracing
//!  └─ spawn_blocking ─► HookRunner::run()   (pump thread, owns the hooks)
//!  └─ ctrl_c ─────────► StopHandle::stop()
//! ```

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Context;
use clap::Parser;
use tracing::{info, trace};
use tracing_subscriber::EnvFilter;

use inputhook::infrastructure::storage::config::{self, AppConfig, ConfigError};
use inputhook::{Dispatcher, KeyboardRecord, MouseRecord, TimestampSource, WheelDirection};

/// Logs every global keyboard and mouse event until Ctrl-C.
#[derive(Debug, Parser)]
#[command(
    name = "inputhook-monitor",
    about = "Logs system-wide keyboard and mouse events",
    version
)]
struct Cli {
    /// Config file to load instead of the platform default.
    #[arg(long, env = "INPUTHOOK_CONFIG")]
    config: Option<PathBuf>,

    /// Keep the hooks installed while a debugger is attached.
    #[arg(long)]
    no_debugger_guard: bool,

    /// Stamp events with wall-clock time instead of the OS event time.
    #[arg(long)]
    epoch_timestamps: bool,
}

impl Cli {
    /// Loads the selected config file and applies the command-line overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or parsed.
    fn into_app_config(self) -> anyhow::Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => config::load_config_from(path)
                .with_context(|| format!("cannot load config from {}", path.display()))?,
            None => match config::load_config() {
                Err(ConfigError::NoPlatformConfigDir) => AppConfig::default(),
                other => other.context("cannot load the platform config file")?,
            },
        };

        if self.no_debugger_guard {
            config.hook.debugger_guard = false;
        }
        if self.epoch_timestamps {
            config.hook.timestamp_source = TimestampSource::Epoch;
        }
        Ok(config)
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Cli::parse().into_app_config()?;

    // Level is overridden by `RUST_LOG`.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .init();

    info!(?config, "inputhook-monitor starting");
    monitor(config).await
}

#[cfg(target_os = "windows")]
async fn monitor(config: AppConfig) -> anyhow::Result<()> {
    use std::sync::Arc;
    use std::time::Duration;

    use inputhook::infrastructure::input_helper::NoopInputHelper;
    use inputhook::infrastructure::platform::windows::WindowsPlatform;
    use inputhook::HookRunner;
    use tracing::warn;

    let dispatcher = Arc::new(LoggingDispatcher::default());
    let runner = HookRunner::new(
        Arc::new(WindowsPlatform::new()),
        Arc::new(NoopInputHelper),
        Arc::clone(&dispatcher) as Arc<dyn Dispatcher>,
        config.hook.run_options(),
    );
    let stop = runner.stop_handle();
    let mut session = tokio::task::spawn_blocking(move || runner.run());

    info!("hooks starting.  Press Ctrl-C to exit.");

    tokio::select! {
        joined = &mut session => joined??,
        signal = tokio::signal::ctrl_c() => {
            signal?;
            info!("shutdown signal received");
            // The pump thread may not have published its id yet.
            while let Err(e) = stop.stop() {
                if session.is_finished() {
                    break;
                }
                warn!("stop not delivered yet: {e}");
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
            session.await??;
        }
    }

    info!(events = dispatcher.count(), "inputhook-monitor stopped");
    Ok(())
}

#[cfg(not(target_os = "windows"))]
async fn monitor(_config: AppConfig) -> anyhow::Result<()> {
    anyhow::bail!("inputhook-monitor needs Windows low-level hooks; this host is not supported")
}

/// Logs every event and lets all of them through.
#[derive(Debug, Default)]
#[cfg_attr(not(target_os = "windows"), allow(dead_code))]
struct LoggingDispatcher {
    events: AtomicU64,
}

#[cfg_attr(not(target_os = "windows"), allow(dead_code))]
impl LoggingDispatcher {
    fn count(&self) -> u64 {
        self.events.load(Ordering::Relaxed)
    }

    fn seen(&self) -> bool {
        self.events.fetch_add(1, Ordering::Relaxed);
        false
    }
}

impl Dispatcher for LoggingDispatcher {
    fn hook_enabled(&self, timestamp: u64) {
        info!(timestamp, "hooks enabled");
    }

    fn hook_disabled(&self, timestamp: u64) {
        info!(timestamp, "hooks disabled");
    }

    fn key_pressed(&self, timestamp: u64, key: &KeyboardRecord) -> bool {
        info!(
            timestamp,
            vk = format_args!("{:#04X}", key.vk_code),
            scan = key.scan_code,
            injected = key.is_injected(),
            "key pressed"
        );
        self.seen()
    }

    fn key_released(&self, timestamp: u64, key: &KeyboardRecord) -> bool {
        info!(
            timestamp,
            vk = format_args!("{:#04X}", key.vk_code),
            scan = key.scan_code,
            "key released"
        );
        self.seen()
    }

    fn button_pressed(&self, timestamp: u64, mouse: &MouseRecord, button: u16) -> bool {
        info!(timestamp, button, x = mouse.x, y = mouse.y, "button pressed");
        self.seen()
    }

    fn button_released(&self, timestamp: u64, mouse: &MouseRecord, button: u16) -> bool {
        info!(timestamp, button, x = mouse.x, y = mouse.y, "button released");
        self.seen()
    }

    fn mouse_moved(&self, timestamp: u64, mouse: &MouseRecord) -> bool {
        trace!(timestamp, x = mouse.x, y = mouse.y, "mouse moved");
        self.seen()
    }

    fn mouse_wheel(&self, timestamp: u64, mouse: &MouseRecord, direction: WheelDirection) -> bool {
        info!(
            timestamp,
            ?direction,
            delta = mouse.wheel_delta(),
            "mouse wheel"
        );
        self.seen()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
