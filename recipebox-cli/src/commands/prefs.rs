use clap::Args;
use recipebox_core::preferences::parse_font_size;
use recipebox_core::{AppContext, Typeface};

use super::OutputFormat;

/// Preferences last for one invocation; nothing here is saved.
#[derive(Args)]
pub struct PrefsCommand {
    /// Flip dark mode
    #[arg(long)]
    toggle_dark_mode: bool,

    /// small, medium, large, or points
    #[arg(long = "set-font-size", value_name = "SIZE", value_parser = parse_font_size)]
    set_font_size: Option<u8>,

    #[arg(long = "set-typeface", value_name = "TYPEFACE")]
    set_typeface: Option<Typeface>,

    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

impl PrefsCommand {
    pub fn run(&self, context: &mut AppContext) -> Result<(), Box<dyn std::error::Error>> {
        if self.toggle_dark_mode {
            context.toggle_dark_mode();
        }
        if let Some(points) = self.set_font_size {
            context.set_font_size(points);
        }
        if let Some(typeface) = self.set_typeface {
            context.set_typeface(typeface);
        }

        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(context.preferences())?)
            }
            OutputFormat::Text => print!("{}", context),
        }
        Ok(())
    }
}
