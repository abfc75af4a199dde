// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod detect;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::{ClassTable, Settings};

/// ThermalEye Detection CLI
#[derive(Parser, Debug)]
#[command(name = "thermaleye-cli")]
#[command(version = "1.0.0")]
#[command(about = "Run the ThermalEye detector against local images", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Detect objects in an image file and print the result as JSON
    Detect(detect::DetectArgs),

    /// Print the effective class table
    Classes {
        /// Print as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

/// Execute CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    let settings = Settings::from_env();
    settings
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;

    match cli.command {
        Commands::Detect(args) => detect::run_detect(args, settings).await,
        Commands::Classes { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(&settings.classes)?);
            } else {
                print!("{}", format_class_table(&settings.classes));
            }
            Ok(())
        }
    }
}

/// One line per class: id, name, type, colour
pub fn format_class_table(classes: &ClassTable) -> String {
    let mut out = format!("{:<4} {:<12} {:<8} {}\n", "ID", "NAME", "TYPE", "COLOR");
    for (id, info) in classes.iter() {
        out.push_str(&format!(
            "{:<4} {:<12} {:<8} {}\n",
            id, info.name, info.class_type, info.color
        ));
    }
    out
}
