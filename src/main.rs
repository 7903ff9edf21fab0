mod cli;

use clap::Parser;
use cli::{Args, Command};
use picam_control::config::Config;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    // An explicit --config must exist; the default path falls back to defaults
    let config = match Config::load(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let result = match args.command {
        Command::Still(still) => cli::run_still(&config, still).await,
        Command::Video(video) => cli::run_video(&config, video).await,
        Command::Config { action } => {
            cli::handle_config_action(action, args.config.as_deref(), &config)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
