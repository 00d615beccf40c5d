//! Commands backed by the recipe API.

use clap::Args;
use recipebox_core::catalog::{DEFAULT_QUERY, DEFAULT_RESULTS};
use recipebox_core::CatalogClient;

use super::OutputFormat;

#[derive(Args)]
pub struct SearchCommand {
    /// Search terms (defaults to "Pastry")
    query: Vec<String>,

    /// Number of results
    #[arg(long, short, default_value_t = DEFAULT_RESULTS)]
    number: u32,

    #[arg(long, short, value_enum, default_value = "text")]
    format: OutputFormat,
}

impl SearchCommand {
    pub async fn run(&self, catalog: &CatalogClient) -> Result<(), Box<dyn std::error::Error>> {
        let query = self.query.join(" ");
        let results = catalog.search(&query, self.number).await?;

        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&results)?),
            OutputFormat::Text => {
                if results.is_empty() {
                    let shown = if query.trim().is_empty() { DEFAULT_QUERY } else { query.trim() };
                    println!("No recipes found for '{}'", shown);
                }
                for summary in &results {
                    println!("{}", summary);
                }
            }
        }
        Ok(())
    }
}

#[derive(Args)]
pub struct ShowCommand {
    /// Recipe id from search results
    id: u64,

    #[arg(long, short, value_enum, default_value = "text")]
    format: OutputFormat,
}

impl ShowCommand {
    pub async fn run(&self, catalog: &CatalogClient) -> Result<(), Box<dyn std::error::Error>> {
        let detail = catalog.information(self.id).await?;
        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&detail)?),
            OutputFormat::Text => print!("{}", detail),
        }
        Ok(())
    }
}

#[derive(Args)]
pub struct RandomCommand {
    #[arg(long, short, default_value_t = 1)]
    number: u32,

    #[arg(long, short, value_enum, default_value = "text")]
    format: OutputFormat,
}

impl RandomCommand {
    pub async fn run(&self, catalog: &CatalogClient) -> Result<(), Box<dyn std::error::Error>> {
        let recipes = catalog.random(self.number).await?;
        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&recipes)?),
            OutputFormat::Text => {
                for (i, detail) in recipes.iter().enumerate() {
                    if i > 0 {
                        println!();
                    }
                    println!("#{}", detail.id);
                    print!("{}", detail);
                }
            }
        }
        Ok(())
    }
}
