use al_engine::app::{self, AppConfig};
use al_engine::config::load_settings;
use al_engine::module::ModuleRegistry;
use al_engine::orchestrator::{OrchestrationResolver, Orchestrator};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Run a named pipeline of modules
#[derive(Parser)]
#[command(name = "al-engine")]
#[command(about = "Aluminium price forecasting pipeline runner", long_about = None)]
struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to the settings file (default: $AL_ENGINE_CONFIG or ./config.yaml)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Orchestration to run: a file name in the orchestration folder or a built-in
    orchestration: String,
}

fn main() {
    let cli = Cli::parse();
    let config = AppConfig::new(cli.verbose, cli.config);

    let _console = app::init_console_logging(config.verbose);

    if let Err(e) = run(&config, &cli.orchestration) {
        app::handle_fatal_error(e, config.verbose);
    }
}

fn run(config: &AppConfig, orchestration: &str) -> anyhow::Result<()> {
    let settings = Arc::new(load_settings(&config.settings_path)?);

    let registry = ModuleRegistry::with_defaults();
    let resolver = OrchestrationResolver::with_defaults(&settings.orchestration.folder_path);
    let resolved = resolver.resolve(orchestration, &registry)?;

    let bootstrapped = app::bootstrap(settings, config.verbose)?;
    let report = Orchestrator::new(&bootstrapped.context).execute(&resolved)?;
    debug!(
        "{} of {} modules completed",
        report.completed_count(),
        report.modules.len()
    );
    Ok(())
}
