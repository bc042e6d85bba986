use anyhow::Result;
use clap::Parser;
use gasnet_algo::OptimizationEngine;
use tracing_subscriber::FmtSubscriber;

mod cli;
mod commands;

use cli::{Cli, Commands, ScenariosCommands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("setting default tracing subscriber");

    match &cli.command {
        Commands::Optimize {
            config,
            algorithm,
            out,
            pressure,
            compressors,
            solver,
            time_limit,
        } => commands::optimize::handle(
            config,
            algorithm,
            out.as_deref(),
            *pressure,
            *compressors,
            solver,
            *time_limit,
        ),
        Commands::Validate { config } => commands::validate::handle(config),
        Commands::Trace { config } => commands::trace::handle(config),
        Commands::Compare {
            config,
            algorithms,
            pressure,
            compressors,
        } => commands::compare::handle(config, algorithms, *pressure, *compressors),
        Commands::Algorithms => {
            let engine = OptimizationEngine::with_defaults();
            for name in engine.algorithm_names() {
                let algorithm = engine.algorithm(name).expect("registered");
                println!("{:<18} {}", name, algorithm.description());
                for (parameter, description) in algorithm.parameters() {
                    println!("    {:<22} {}", parameter, description);
                }
            }
            Ok(())
        }
        Commands::Scenarios { command } => match command {
            ScenariosCommands::Validate { spec } => commands::scenarios::validate(spec),
            ScenariosCommands::Run {
                config,
                spec,
                out,
                algorithms,
                threads,
            } => commands::scenarios::run(config, spec, out, algorithms, *threads),
        },
    }
}
