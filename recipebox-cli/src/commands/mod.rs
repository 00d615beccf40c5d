use clap::ValueEnum;
use std::io::{self, Write};

mod auth;
mod catalog;
mod config_cmd;
mod convert;
mod favorite;
mod prefs;
mod profile;
mod recipe;

pub use auth::AuthCommand;
pub use catalog::{RandomCommand, SearchCommand, ShowCommand};
pub use config_cmd::ConfigCommand;
pub use convert::ConvertCommand;
pub use favorite::FavoriteCommand;
pub use prefs::PrefsCommand;
pub use profile::ProfileCommand;
pub use recipe::RecipeCommand;

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Returns `value` if given, otherwise asks for it on stdin.
pub(crate) fn prompt(label: &str, value: Option<String>) -> io::Result<String> {
    if let Some(value) = value {
        return Ok(value);
    }

    print!("{}: ", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
