use clap::Parser;
use form_detection::cli::commands::{cmd_analyze, cmd_diagnose, cmd_score};
use form_detection::cli::config::{Cli, Commands, load_config};
use form_detection::settings::store::load_settings;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref());
    let settings = load_settings(cli.settings.as_deref());

    match cli.command {
        Commands::Analyze {
            snapshot,
            strict,
            format,
        } => cmd_analyze(&snapshot, strict, &format, &config, &settings, cli.verbose),
        Commands::Score { snapshot, index } => {
            cmd_score(&snapshot, index, &config, &settings, cli.verbose)
        }
        Commands::Diagnose { snapshot } => {
            cmd_diagnose(&snapshot, &config, &settings, cli.verbose)
        }
    }
}
