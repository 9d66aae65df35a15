use clap::{CommandFactory, Parser, Subcommand};
use studytrack_core::Config;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "studytrack-cli", version, about = "StudyTrack CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Timer control
    Timer {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Study time totals for a day, week, month or year
    Stats(commands::stats::StatsArgs),
    /// Sessions of one day in start order
    Timeline(commands::timeline::TimelineArgs),
    /// Recorded session management
    Session {
        #[command(subcommand)]
        action: commands::session::SessionAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Print shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

fn init_tracing(default_directive: &str) {
    let filter = EnvFilter::try_from_env("STUDYTRACK_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let (config, load_error) = match Config::load() {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };
    init_tracing(&config.log_level);
    if let Some(e) = load_error {
        tracing::warn!(error = %e, "using default configuration");
    }

    let result = match cli.command {
        Commands::Timer { action } => commands::timer::run(action, &config).await,
        Commands::Stats(args) => commands::stats::run(args, &config),
        Commands::Timeline(args) => commands::timeline::run(args, &config),
        Commands::Session { action } => commands::session::run(action, &config),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "studytrack-cli",
                &mut std::io::stdout(),
            );
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
