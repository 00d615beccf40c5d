use clap::{Args, Subcommand};
use recipebox_core::{Difficulty, NewRecipe, RecipeImage};
use std::path::PathBuf;

use super::OutputFormat;
use crate::app::App;

#[derive(Args)]
pub struct RecipeCommand {
    #[command(subcommand)]
    command: RecipeSubcommand,
}

#[derive(Subcommand)]
enum RecipeSubcommand {
    /// Add a recipe
    Add {
        title: String,

        /// Ingredient line (can be repeated)
        #[arg(long = "ingredient", short = 'i', value_name = "LINE")]
        ingredients: Vec<String>,

        #[arg(long)]
        instructions: Option<String>,

        /// Cooking time in minutes
        #[arg(long, short)]
        time: Option<u32>,

        /// easy, medium, hard
        #[arg(long, short, default_value = "easy")]
        difficulty: Difficulty,

        /// Image file to upload with the recipe
        #[arg(long)]
        image: Option<PathBuf>,
    },

    /// List your recipes
    List {
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show one of your recipes
    Show {
        id: String,

        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl RecipeCommand {
    pub async fn run(&self, app: &App) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            RecipeSubcommand::Add {
                title,
                ingredients,
                instructions,
                time,
                difficulty,
                image,
            } => {
                let user = app.require_user()?;

                let mut recipe = NewRecipe::new(title)
                    .with_ingredients(ingredients.clone())
                    .with_difficulty(*difficulty);
                if let Some(instructions) = instructions {
                    recipe = recipe.with_instructions(instructions);
                }
                if let Some(minutes) = time {
                    recipe = recipe.with_cooking_time(*minutes);
                }
                if let Some(path) = image {
                    let extension = path
                        .extension()
                        .and_then(|e| e.to_str())
                        .unwrap_or("jpg")
                        .to_lowercase();
                    recipe = recipe.with_image(RecipeImage::from_extension(
                        std::fs::read(path)?,
                        &extension,
                    ));
                }

                let id = app.recipes().create_recipe(&user.uid, recipe).await?;
                println!("Recipe added successfully!");
                println!("ID: {}", id);
                Ok(())
            }

            RecipeSubcommand::List { format } => {
                let user = app.require_user()?;
                let recipes = app.recipes().list_user_recipes(&user.uid).await?;

                match format {
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&recipes)?),
                    OutputFormat::Text => {
                        if recipes.is_empty() {
                            println!("No recipes yet. Add one with 'recipes recipe add'.");
                        }
                        for recipe in &recipes {
                            println!("{}  {} ({})", recipe.id, recipe.title, recipe.difficulty);
                        }
                    }
                }
                Ok(())
            }

            RecipeSubcommand::Show { id, format } => {
                let recipe = app
                    .recipes()
                    .get_recipe(id)
                    .await?
                    .ok_or_else(|| format!("Recipe not found: {}", id))?;

                match format {
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&recipe)?),
                    OutputFormat::Text => print!("{}", recipe),
                }
                Ok(())
            }
        }
    }
}
