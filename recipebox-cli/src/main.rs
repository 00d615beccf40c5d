use clap::{Parser, Subcommand};
use recipebox_core::preferences::parse_font_size;
use recipebox_core::{AppContext, Typeface};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod app;
mod commands;
mod config;

use app::App;
use commands::{
    AuthCommand, ConfigCommand, ConvertCommand, FavoriteCommand, PrefsCommand, ProfileCommand,
    RandomCommand, RecipeCommand, SearchCommand, ShowCommand,
};
use config::Config;

#[derive(Parser)]
#[command(name = "recipes")]
#[command(version)]
#[command(about = "Search recipes, keep favorites and manage your recipe box", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Start with dark mode on
    #[arg(long, global = true)]
    dark_mode: bool,

    /// Font size: small, medium, large, or points
    #[arg(long, global = true, value_parser = parse_font_size)]
    font_size: Option<u8>,

    /// Typeface: system, serif, monospace
    #[arg(long, global = true)]
    typeface: Option<Typeface>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in, sign out, register
    Auth(AuthCommand),

    /// Search the recipe catalog
    Search(SearchCommand),

    /// Show a catalog recipe
    Show(ShowCommand),

    /// Random catalog recipes
    Random(RandomCommand),

    /// Manage favorites
    Favorite(FavoriteCommand),

    /// View and edit your profile
    Profile(ProfileCommand),

    /// Manage your own recipes
    Recipe(RecipeCommand),

    /// Convert between grams, ounces and pounds
    Convert(ConvertCommand),

    /// Show or change display preferences
    Prefs(PrefsCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing();

    let config = Config::load(cli.config.clone())?;
    let mut context = AppContext::default();
    if cli.dark_mode {
        context.toggle_dark_mode();
    }
    if let Some(points) = cli.font_size {
        context.set_font_size(points);
    }
    if let Some(typeface) = cli.typeface {
        context.set_typeface(typeface);
    }

    match cli.command {
        // Local-only commands
        Some(Commands::Convert(cmd)) => cmd.run(),
        Some(Commands::Prefs(cmd)) => cmd.run(&mut context),
        Some(Commands::Config(cmd)) => cmd.run(&config),
        Some(command) => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(execute_command(command, &config))
        }
        None => {
            println!("Use --help to see available commands");
            Ok(())
        }
    }
}

async fn execute_command(
    command: Commands,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Search(cmd) => cmd.run(&app::catalog_client(config)).await,
        Commands::Show(cmd) => cmd.run(&app::catalog_client(config)).await,
        Commands::Random(cmd) => cmd.run(&app::catalog_client(config)).await,
        Commands::Auth(cmd) => cmd.run(&App::new(config)?).await,
        Commands::Favorite(cmd) => cmd.run(&App::new(config)?).await,
        Commands::Profile(cmd) => cmd.run(&App::new(config)?).await,
        Commands::Recipe(cmd) => cmd.run(&App::new(config)?).await,
        Commands::Convert(_) | Commands::Prefs(_) | Commands::Config(_) => Ok(()),
    }
}
