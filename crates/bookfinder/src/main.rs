use crate::prelude::{println, *};
use bookfinder_core::query::DEFAULT_API_BASE;
use bookfinder_core::storage::FileStore;
use clap::Parser;
use std::path::PathBuf;

mod client;
mod error;
mod fav;
mod prelude;
mod render;
mod search;
mod session;
mod shell;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Search the Open Library catalog, browse results and keep a list of favorites"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Base URL of the Open Library API
    #[clap(long, env = "BOOKFINDER_API_BASE", global = true, default_value = DEFAULT_API_BASE)]
    api_base: String,

    /// Directory holding persisted data such as favorites
    #[clap(long, env = "BOOKFINDER_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Whether to display additional information.
    #[clap(long, env = "BOOKFINDER_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

impl Global {
    /// Resolve the data directory, defaulting to the platform data dir.
    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(dirs_next::data_dir()
                .ok_or_eyre("Unable to determine data directory")?
                .join("bookfinder")),
        }
    }

    pub fn store(&self) -> Result<FileStore> {
        let dir = self.data_dir()?;
        if self.verbose {
            println!("Data directory: {}", dir.display());
        }
        Ok(FileStore::new(dir))
    }
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Search the catalog and print one page of results
    Search(crate::search::SearchOptions),

    /// Manage the favorites list
    Fav(crate::fav::App),

    /// Interactive search session
    Shell(crate::shell::ShellOptions),
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();

    if app.global.verbose {
        println!("API Base: {}", app.global.api_base);
        println!();
    }

    match app.command {
        SubCommands::Search(options) => crate::search::run(options, app.global).await,
        SubCommands::Fav(sub_app) => crate::fav::run(sub_app, app.global).await,
        SubCommands::Shell(options) => crate::shell::run(options, app.global).await,
    }
}
