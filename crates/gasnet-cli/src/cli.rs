use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about = "Gas pipeline capacity planning and flow optimization", long_about = None)]
pub struct Cli {
    /// Set the logging level
    #[arg(long, default_value = "info")]
    pub log_level: tracing::Level,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one optimization on a network configuration
    Optimize {
        /// Path to the network configuration JSON
        config: String,
        /// Algorithm name (see `algorithms`)
        #[arg(long, default_value = "cost-lp")]
        algorithm: String,
        /// Write the result JSON here
        #[arg(short, long)]
        out: Option<String>,
        /// Include pressure constraints
        #[arg(long)]
        pressure: bool,
        /// Include compressor station constraints
        #[arg(long)]
        compressors: bool,
        /// Solver back-end identifier
        #[arg(long, default_value = "simplex")]
        solver: String,
        /// Solver wall-clock cap in seconds
        #[arg(long, default_value_t = 300)]
        time_limit: u64,
    },
    /// Validate a network configuration and report every issue found
    Validate {
        /// Path to the network configuration JSON
        config: String,
    },
    /// Upstream flow trace: per-segment required flows and feasibility
    Trace {
        /// Path to the network configuration JSON
        config: String,
    },
    /// Run several algorithms on one network and print a comparison table
    Compare {
        /// Path to the network configuration JSON
        config: String,
        /// Comma-separated algorithm names; default compares all six
        #[arg(long, value_delimiter = ',')]
        algorithms: Vec<String>,
        /// Include pressure constraints
        #[arg(long)]
        pressure: bool,
        /// Include compressor station constraints
        #[arg(long)]
        compressors: bool,
    },
    /// List registered algorithms and their parameters
    Algorithms,
    /// Scenario utilities
    Scenarios {
        #[command(subcommand)]
        command: ScenariosCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum ScenariosCommands {
    /// Validate a scenario spec file
    Validate {
        /// Path to the scenario spec (YAML or JSON)
        spec: String,
    },
    /// Run a batch over scenarios × algorithms
    Run {
        /// Path to the network configuration JSON
        config: String,
        /// Path to the scenario spec (YAML or JSON)
        #[arg(long)]
        spec: String,
        /// Output directory for per-job results and the manifest
        #[arg(short, long, default_value = "batch-out")]
        out: String,
        /// Comma-separated algorithm names
        #[arg(long, value_delimiter = ',', default_value = "cost-lp")]
        algorithms: Vec<String>,
        /// Worker threads (0 = auto)
        #[arg(long, default_value_t = 0)]
        threads: usize,
    },
}
