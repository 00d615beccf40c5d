use clap::{Args, Subcommand};
use std::fs;
use std::io::Write;

use super::OutputFormat;
use crate::config::Config;

#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show current configuration values
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Print the config file path
    Path,

    /// Initialize configuration file
    Init,
}

fn show_secret(value: &Option<String>) -> &str {
    match value {
        Some(_) => "(set)",
        None => "(not set)",
    }
}

fn show_value(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("(not set)")
}

impl ConfigCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ConfigSubcommand::Show { format } => {
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(config)?);
                    }
                    OutputFormat::Text => {
                        println!("Configuration");
                        println!("=============\n");

                        if let Some(path) = &config.config_file {
                            println!("Config file: {}", path.display());
                        } else {
                            println!(
                                "Config file: {} (not found)",
                                Config::default_config_path().display()
                            );
                        }
                        println!();

                        println!("data_dir: {}", config.data_dir.value.display());
                        println!("  source: {}", config.data_dir.source);
                        println!();

                        let firebase = &config.firebase;
                        println!("firebase:");
                        println!("  api_key: {}", show_secret(&firebase.api_key));
                        println!("  project_id: {}", show_value(&firebase.project_id));
                        println!("  database_url: {}", show_value(&firebase.database_url));
                        println!("  storage_bucket: {}", show_value(&firebase.storage_bucket));
                        println!();

                        println!("catalog:");
                        println!("  base_url: {}", config.catalog.base_url());
                        println!("  api_key: {}", show_secret(&config.catalog.api_key));
                    }
                }
                Ok(())
            }

            ConfigSubcommand::Path => {
                let path = config
                    .config_file
                    .clone()
                    .unwrap_or_else(Config::default_config_path);
                println!("{}", path.display());
                Ok(())
            }

            ConfigSubcommand::Init => {
                let config_path = Config::default_config_path();

                if config_path.exists() {
                    println!("Config file already exists: {}", config_path.display());
                    println!("Use 'recipes config show' to view current configuration.");
                    return Ok(());
                }

                if let Some(parent) = config_path.parent() {
                    fs::create_dir_all(parent)?;
                }

                let default_config = r#"# recipebox configuration

# Directory for the local session store (default: platform data dir)
# data_dir: ~/.local/share/recipebox

# Hosted backend project
firebase:
  api_key:
  project_id:
  database_url:
  storage_bucket:

# Recipe search API
catalog:
  # base_url: https://api.spoonacular.com/
  api_key:
"#;

                let mut file = fs::File::create(&config_path)?;
                file.write_all(default_config.as_bytes())?;

                println!("Created config file: {}", config_path.display());
                println!("\nEdit this file to customize your settings.");
                Ok(())
            }
        }
    }
}
