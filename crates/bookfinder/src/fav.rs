use crate::prelude::{println, *};
use crate::render;
use crate::session::Session;
use bookfinder_core::favorites::Toggled;
use bookfinder_core::query::normalize_key;
use colored::Colorize;

#[derive(Debug, clap::Parser)]
#[command(name = "fav")]
#[command(about = "Manage the favorites list")]
pub struct App {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// List saved favorites
    #[clap(name = "list")]
    List(ListOptions),

    /// Add a book by catalog key, or remove it if already saved
    #[clap(name = "toggle")]
    Toggle(KeyOptions),

    /// Remove a book from the favorites
    #[clap(name = "remove")]
    Remove(KeyOptions),
}

#[derive(Debug, clap::Args, Clone)]
pub struct ListOptions {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, clap::Args, Clone)]
pub struct KeyOptions {
    /// Catalog key or URL (e.g. "OL45804W", "/works/OL45804W" or "https://openlibrary.org/works/OL45804W")
    pub key: String,
}

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    let mut session = Session::new(
        crate::client::new_client()?,
        global.api_base.clone(),
        global.store()?,
    );

    match app.command {
        Commands::List(options) => {
            let favorites = session.favorites.items();
            if options.json {
                println!("{}", serde_json::to_string_pretty(favorites)?);
            } else {
                anstream::print!("{}", render::format_favorites(favorites));
            }
        }
        Commands::Toggle(options) => {
            let key = normalize_key(&options.key)?;

            if session.favorites.contains(&key) {
                session.favorites.remove(&key);
                println!("{} {}", "Removed".yellow().bold(), key);
                return Ok(());
            }

            let spinner = render::spinner(format!("Looking up {key}..."))?;
            let book = session.lookup(&key).await;
            spinner.finish_and_clear();

            let book = book?.ok_or_else(|| Error::BookNotFound(key.clone()))?;
            if session.favorites.toggle(&book) == Toggled::Added {
                println!(
                    "{} {} ({})",
                    "Added".green().bold(),
                    book.display_title(),
                    key
                );
            }
        }
        Commands::Remove(options) => {
            let key = normalize_key(&options.key)?;
            if session.favorites.remove(&key) {
                println!("{} {}", "Removed".yellow().bold(), key);
            } else {
                println!("{} is not a favorite", key);
            }
        }
    }

    Ok(())
}
