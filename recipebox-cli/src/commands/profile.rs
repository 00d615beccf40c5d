use clap::{Args, Subcommand};
use recipebox_core::ProfileView;
use std::path::PathBuf;

use super::OutputFormat;
use crate::app::App;

#[derive(Args)]
pub struct ProfileCommand {
    #[command(subcommand)]
    command: ProfileSubcommand,
}

#[derive(Subcommand)]
enum ProfileSubcommand {
    /// Show your profile (created on first use)
    Show {
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Upload a new profile image
    Avatar {
        /// Image file (jpg, png, gif, webp)
        path: PathBuf,
    },

    /// Change display name and/or password
    Update {
        #[arg(long, short)]
        name: Option<String>,

        #[arg(long, short)]
        password: Option<String>,
    },
}

impl ProfileCommand {
    pub async fn run(&self, app: &App) -> Result<(), Box<dyn std::error::Error>> {
        let user = app.require_user()?;
        let profiles = app.profiles();
        let mut view = ProfileView::load(&profiles, &user).await?;

        match &self.command {
            ProfileSubcommand::Show { format } => match format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(view.profile())?)
                }
                OutputFormat::Text => print!("{}", view.profile()),
            },

            ProfileSubcommand::Avatar { path } => {
                let bytes = std::fs::read(path)?;
                let extension = path
                    .extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or("jpg")
                    .to_lowercase();

                let url = view.change_avatar(bytes, &extension).await?;
                println!("Profile image updated successfully");
                println!("{}", url);
            }

            ProfileSubcommand::Update { name, password } => {
                let name = name.clone().unwrap_or_else(|| view.profile().name.clone());
                view.save_changes(&name, password.as_deref()).await?;
                println!("Profile updated successfully");
            }
        }

        Ok(())
    }
}
