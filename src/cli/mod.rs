use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::transmutation::Complexity;

pub mod commands;

#[derive(Parser)]
#[command(name = "amestris")]
#[command(about = "Simulate and perform alchemical transmutations against the Amestris backend")]
#[command(long_about = "Amestris checks a transmutation for feasibility before it is recorded. \
                       Every transmutation is simulated first; only a simulated transmutation can be \
                       performed. Get started with 'amestris session' for the interactive panel.")]
pub struct Cli {
    /// Explicit configuration file
    #[arg(long, global = true, help = "Path to a TOML configuration file (defaults to amestris.toml)")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ask the backend whether a transmutation is feasible, without recording it
    Simulate {
        /// Input material (repeat for several)
        #[arg(short = 'i', long = "input", required = true, help = "Input material, repeatable")]
        inputs: Vec<String>,
        /// Desired output material
        #[arg(short, long, help = "Material to create")]
        output: String,
        /// Complexity level
        #[arg(short, long, default_value = "simple", help = "simple, moderate or complex")]
        complexity: Complexity,
    },
    /// Simulate, then record the transmutation
    Transmute {
        /// Input material (repeat for several)
        #[arg(short = 'i', long = "input", required = true, help = "Input material, repeatable")]
        inputs: Vec<String>,
        /// Desired output material
        #[arg(short, long, help = "Material to create")]
        output: String,
        /// Complexity level
        #[arg(short, long, default_value = "simple", help = "simple, moderate or complex")]
        complexity: Complexity,
        /// Alchemist id recorded on the transmutation
        #[arg(long, help = "Override the session actor id from configuration")]
        actor: Option<u64>,
    },
    /// Preview the materials catalog
    Materials {
        /// List every material instead of the preview
        #[arg(long, help = "Show the full catalog")]
        all: bool,
    },
    /// Interactive transmutation panel
    Session,
}
