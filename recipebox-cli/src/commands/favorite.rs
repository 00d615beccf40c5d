use clap::{Args, Subcommand};
use futures::StreamExt;
use recipebox_core::{Favorite, FavoriteTarget, RecipeId};

use super::OutputFormat;
use crate::app::App;

#[derive(Args)]
pub struct FavoriteCommand {
    #[command(subcommand)]
    command: FavoriteSubcommand,
}

#[derive(Subcommand)]
enum FavoriteSubcommand {
    /// Add a recipe to favorites, or remove it if already there
    Toggle {
        /// Catalog id or your own recipe's id
        id: RecipeId,

        /// Title to store with the favorite (looked up if omitted)
        #[arg(long)]
        title: Option<String>,

        /// Image URL to store with the favorite
        #[arg(long)]
        image: Option<String>,
    },

    /// Remove a recipe from favorites
    Remove { id: RecipeId },

    /// Check whether a recipe is a favorite
    Status { id: RecipeId },

    /// List favorites
    List {
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Print favorites now and after every change (Ctrl-C to stop)
    Watch,
}

impl FavoriteCommand {
    pub async fn run(&self, app: &App) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            FavoriteSubcommand::Toggle { id, title, image } => {
                let target = match title {
                    Some(title) => {
                        let mut target = FavoriteTarget::new(id.clone()).with_title(title);
                        if let Some(image) = image {
                            target = target.with_image(image);
                        }
                        target
                    }
                    None => lookup_target(app, id).await,
                };

                let state = app.favorites().toggle_favorite(&target).await?;
                println!("{}", state);
                Ok(())
            }

            FavoriteSubcommand::Remove { id } => {
                app.favorites().remove_favorite(id).await?;
                println!("Removed from favorites");
                Ok(())
            }

            FavoriteSubcommand::Status { id } => {
                let user = app.require_user()?;
                if app.favorites().is_favorite(&user.uid, id).await? {
                    println!("{} is a favorite", id);
                } else {
                    println!("{} is not a favorite", id);
                }
                Ok(())
            }

            FavoriteSubcommand::List { format } => {
                let user = app.require_user()?;
                let favorites = app.recipes().list_favorite_recipes(&user.uid).await?;
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&favorites)?)
                    }
                    OutputFormat::Text => print_favorites(favorites.iter()),
                }
                Ok(())
            }

            FavoriteSubcommand::Watch => {
                let user = app.require_user()?;
                let mut favorites = app.favorites().subscribe_favorites(&user.uid);

                loop {
                    tokio::select! {
                        _ = tokio::signal::ctrl_c() => break,
                        next = favorites.next() => match next {
                            Some(set) => {
                                println!("--- {} favorite(s)", set.len());
                                print_favorites(set.iter());
                            }
                            None => break,
                        },
                    }
                }

                favorites.cancel();
                Ok(())
            }
        }
    }
}

/// Builds the favorite snapshot from the recipe's source. Lookup failures
/// fall back to an id-only favorite.
async fn lookup_target(app: &App, id: &RecipeId) -> FavoriteTarget {
    match id {
        RecipeId::Number(n) => match app.catalog().information(*n).await {
            Ok(detail) => FavoriteTarget::from(&detail),
            Err(e) => {
                tracing::warn!("Could not look up recipe {}: {}", n, e);
                FavoriteTarget::new(id.clone())
            }
        },
        RecipeId::Text(key) => match app.recipes().get_recipe(key).await {
            Ok(Some(recipe)) => FavoriteTarget::from(&recipe),
            Ok(None) => FavoriteTarget::new(id.clone()),
            Err(e) => {
                tracing::warn!("Could not look up recipe {}: {}", key, e);
                FavoriteTarget::new(id.clone())
            }
        },
    }
}

fn print_favorites<'a>(favorites: impl Iterator<Item = &'a Favorite>) {
    let mut empty = true;
    for favorite in favorites {
        empty = false;
        println!(
            "{:>8}  {}",
            favorite.id.to_string(),
            favorite.title.as_deref().unwrap_or("(untitled)")
        );
    }
    if empty {
        println!("No favorites yet");
    }
}
