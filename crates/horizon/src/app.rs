//! Main application logic and lifecycle management.
//!
//! The `Application` owns the router and drives it at the configured tick
//! rate: bots move, deferred work is reconciled, then every connection is
//! gathered. Statistics are logged periodically and admin console lines
//! are read from stdin.

use crate::{
    bots::BotSwarm,
    cli::CliArgs,
    config::AppConfig,
    logging::display_banner,
    signals::{wait_for_shutdown_signal, wait_for_shutdown_signal_silent},
};
use horizon_relevancy::RoutingContext;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

/// Result of handling one console line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleOutcome {
    Continue,
    Quit,
}

/// Per-tick gather summary
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickReport {
    pub connections: usize,
    pub relevant_total: usize,
    pub max_per_connection: usize,
    pub elapsed: Duration,
}

/// Host application: router, bots and loop bookkeeping.
pub struct Application {
    config: AppConfig,
    router: RoutingContext,
    bots: BotSwarm,
    ticks: u64,
    last_report: TickReport,
    slowest_tick: Duration,
}

impl Application {
    /// Loads configuration, applies CLI overrides and builds the router.
    ///
    /// # Process
    ///
    /// 1. Load configuration from file (creating default if missing)
    /// 2. Apply command-line argument overrides
    /// 3. Validate merged configuration and build the router
    pub async fn new(args: CliArgs) -> Result<Self, Box<dyn std::error::Error>> {
        info!("🔧 Loading configuration from: {}", args.config_path.display());
        let mut config = AppConfig::load_from_file(&args.config_path).await?;
        apply_overrides(&mut config, &args);

        let app = Self::from_config(config)?;
        display_banner();
        info!("📂 Config: {}", args.config_path.display());
        Ok(app)
    }

    /// Builds the application from an already loaded configuration.
    pub fn from_config(config: AppConfig) -> Result<Self, Box<dyn std::error::Error>> {
        if let Err(e) = config.validate() {
            return Err(format!("Configuration validation failed: {e}").into());
        }
        info!("✅ Configuration loaded and validated successfully");

        let hierarchy = config.build_hierarchy()?;
        let mut router = RoutingContext::new(&hierarchy, config.relevancy.clone())?;
        let bots = BotSwarm::spawn(
            &mut router,
            &hierarchy,
            config.server.bots,
            config.server.world_extent,
            config.server.bot_speed,
        )?;

        Ok(Self {
            config,
            router,
            bots,
            ticks: 0,
            last_report: TickReport::default(),
            slowest_tick: Duration::ZERO,
        })
    }

    /// Runs the tick loop until a shutdown signal or a `quit` console line.
    pub async fn run(mut self) -> Result<(), Box<dyn std::error::Error>> {
        info!("🌟 Starting Horizon relevancy host");
        self.log_configuration_summary();

        let tick_period = Duration::from_secs_f64(1.0 / f64::from(self.config.relevancy.server_tick_rate));
        let mut ticker = tokio::time::interval(tick_period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let stats_period = Duration::from_secs(self.config.server.stats_interval_secs);
        let mut stats_timer = tokio::time::interval_at(tokio::time::Instant::now() + stats_period, stats_period);

        let mut console = Some(spawn_console_reader());
        let shutdown = wait_for_shutdown_signal();
        tokio::pin!(shutdown);

        info!("✅ Router is now running at {} Hz", self.config.relevancy.server_tick_rate);
        info!("⌨️ Console ready: Relevancy.PrintRouting, Relevancy.FrequencyBuckets [n], stats, quit");
        info!("🛑 Press Ctrl+C to gracefully shutdown");

        let mut last_tick = Instant::now();
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let now = Instant::now();
                    let dt = now.duration_since(last_tick).as_secs_f64();
                    last_tick = now;
                    self.tick(dt);
                }
                _ = stats_timer.tick() => self.log_statistics(),
                line = next_console_line(&mut console) => {
                    match line {
                        Some(line) => {
                            if self.handle_console_line(&line) == ConsoleOutcome::Quit {
                                info!("👋 Quit requested from console");
                                break;
                            }
                        }
                        None => {
                            info!("⌨️ Console input closed");
                            console = None;
                        }
                    }
                }
                result = &mut shutdown => {
                    if let Err(e) = result {
                        error!("❌ Signal handling failed: {}", e);
                    }
                    break;
                }
            }
        }

        tokio::spawn(async move {
            if let Err(e) = wait_for_shutdown_signal_silent().await {
                error!("Failed to set up merciless shutdown signal handler: {e}");
                return;
            }
            warn!("Shutdown handler received again! I'll make this quick.");
            std::process::exit(1);
        });

        self.shutdown();
        Ok(())
    }

    /// One server tick: move bots, reconcile, gather every connection.
    pub fn tick(&mut self, dt: f64) -> TickReport {
        let started = Instant::now();

        self.bots.step(&mut self.router, dt);
        self.router.prepare_for_replication();
        let gathered = self.router.gather_all();

        let report = TickReport {
            connections: gathered.len(),
            relevant_total: gathered.values().map(|result| result.len()).sum(),
            max_per_connection: gathered.values().map(|result| result.len()).max().unwrap_or(0),
            elapsed: started.elapsed(),
        };

        self.ticks += 1;
        self.slowest_tick = self.slowest_tick.max(report.elapsed);
        self.last_report = report;
        report
    }

    /// Handles one admin console line.
    pub fn handle_console_line(&mut self, line: &str) -> ConsoleOutcome {
        match line.trim() {
            "" => ConsoleOutcome::Continue,
            "quit" | "exit" => ConsoleOutcome::Quit,
            "stats" => {
                self.log_statistics();
                ConsoleOutcome::Continue
            }
            command => {
                if let Err(e) = self.router.execute_console_command(command) {
                    warn!("⚠️ {}", e);
                }
                ConsoleOutcome::Continue
            }
        }
    }

    pub fn router(&self) -> &RoutingContext {
        &self.router
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    fn log_configuration_summary(&self) {
        let relevancy = &self.config.relevancy;
        info!("📋 Configuration Summary:");
        info!("  ⏱️ Tick rate: {} Hz", relevancy.server_tick_rate);
        info!(
            "  🗺️ Grid: cell {:.0}, bias ({:.0}, {:.0}), rebuilds {}",
            relevancy.spatial.clamped_cell_size(),
            relevancy.spatial.spatial_bias.0,
            relevancy.spatial.spatial_bias.1,
            if relevancy.spatial.enable_spatial_rebuilds { "on" } else { "off" }
        );
        info!("  🧱 Game classes: {}", self.config.classes.len());
        info!(
            "  📜 Presets: {} policy, {} replication",
            relevancy.policy_presets.len(),
            relevancy.replication_presets.len()
        );
        info!("  🤖 Bots: {}", self.bots.len());
    }

    fn log_statistics(&self) {
        let stats = self.router.stats();
        info!(
            "📊 Routing - {} ticks | {} objects | {} connections | {} teams | slowest tick {:?}",
            self.ticks,
            self.router.object_count(),
            self.router.connection_count(),
            self.router.teams().team_count(),
            self.slowest_tick
        );
        info!(
            "  - Routed: {} global, {} spatial, {} owner, {} team",
            stats.routed_global, stats.routed_spatial, stats.routed_owner, stats.routed_team
        );
        info!(
            "  - Pending: {} queued, {} resolved, {} dropped",
            stats.pending_enqueued, stats.pending_resolved, stats.pending_dropped
        );
        info!(
            "  - Last gather: {} relevant across {} connections (max {})",
            self.last_report.relevant_total,
            self.last_report.connections,
            self.last_report.max_per_connection
        );
    }

    fn shutdown(mut self) {
        info!("🛑 Shutting down relevancy host...");
        self.bots.despawn(&mut self.router);
        self.router.reset_world();
        self.log_statistics();
        info!("✅ Horizon relevancy host shutdown complete");
    }
}

/// Applies command-line overrides on top of the file configuration.
pub fn apply_overrides(config: &mut AppConfig, args: &CliArgs) {
    if let Some(tick_rate) = args.tick_rate {
        config.relevancy.server_tick_rate = tick_rate;
    }
    if let Some(bots) = args.bots {
        config.server.bots = bots;
    }
    if let Some(log_level) = &args.log_level {
        config.logging.level = log_level.clone();
    }
    if args.json_logs {
        config.logging.json_format = true;
    }
}

/// Reads trimmed, non-empty stdin lines on a background task.
fn spawn_console_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    if tx.send(line.to_string()).is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    warn!("⚠️ Console read failed: {}", e);
                    break;
                }
            }
        }
    });
    rx
}

/// Next console line; pends forever once the console is closed.
async fn next_console_line(console: &mut Option<mpsc::UnboundedReceiver<String>>) -> Option<String> {
    match console {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
