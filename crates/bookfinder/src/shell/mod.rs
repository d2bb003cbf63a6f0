use crate::prelude::{eprintln, println, *};
use crate::render;
use crate::session::Session;
use bookfinder_core::error::SearchError;
use bookfinder_core::favorites::Toggled;
use bookfinder_core::pipeline::available_languages;
use bookfinder_core::storage::KeyValueStore;
use colored::Colorize;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

pub mod command;

pub use command::{Command, HELP};

#[derive(Debug, clap::Args, Clone)]
pub struct ShellOptions {
    /// Initial free-text query
    #[arg(value_name = "QUERY")]
    pub query: Vec<String>,
}

/// What to print after a command ran.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Re-render the current view
    Render,
    Print(String),
    Silent,
    Quit,
}

pub async fn run(options: ShellOptions, global: crate::Global) -> Result<()> {
    let mut session = Session::new(
        crate::client::new_client()?,
        global.api_base.clone(),
        global.store()?,
    );

    println!(
        "{} {}",
        "bookfinder".bright_cyan().bold(),
        "- type `help` for commands, `quit` to exit".bright_black()
    );

    if !options.query.is_empty() {
        let initial = Command::Search {
            mode: Default::default(),
            query: options.query.join(" "),
        };
        let outcome = execute(&mut session, initial).await;
        report(&session, outcome);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        anstream::print!("{} ", "bookfinder>".cyan().bold());
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        let outcome = match Command::parse(&line) {
            Ok(Some(command)) => execute(&mut session, command).await,
            Ok(None) => continue,
            Err(err) => Err(err),
        };

        if report(&session, outcome) == Outcome::Quit {
            break;
        }
    }

    Ok(())
}

/// Print the result of a command and hand the outcome back to the loop.
fn report<S: KeyValueStore>(
    session: &Session<S>,
    outcome: std::result::Result<Outcome, Error>,
) -> Outcome {
    match outcome {
        Ok(Outcome::Render) => {
            anstream::print!("{}", render_view(session));
            Outcome::Render
        }
        Ok(Outcome::Print(text)) => {
            anstream::print!("{}", text);
            Outcome::Silent
        }
        Ok(other) => other,
        Err(err) => {
            eprintln!("{} {}", "Error:".red().bold(), err);
            Outcome::Silent
        }
    }
}

/// Apply one command to the session.
pub async fn execute<S: KeyValueStore>(
    session: &mut Session<S>,
    command: Command,
) -> std::result::Result<Outcome, Error> {
    match command {
        Command::Search { mode, query } => {
            let spinner = spinner(format!("Searching {mode} \"{}\"...", query.trim()));
            let result = session.submit(mode, &query).await;
            if let Some(spinner) = spinner {
                spinner.finish_and_clear();
            }

            match result {
                Ok(_) => Ok(Outcome::Render),
                Err(SearchError::EmptyQuery) => Ok(Outcome::Silent),
                // The failure is recorded on the session and shown with the page.
                Err(_) => Ok(Outcome::Render),
            }
        }
        Command::More => {
            if session.search.loading {
                return Err(SearchError::Busy.into());
            }
            if session.search.next_page().is_none() {
                return Ok(Outcome::Print(format!(
                    "{}\n",
                    "Nothing more to load.".yellow()
                )));
            }

            let spinner = spinner("Loading more results...".to_string());
            let result = session.load_more().await;
            if let Some(spinner) = spinner {
                spinner.finish_and_clear();
            }

            match result {
                Ok(added) => {
                    log::debug!("load more added {added} books");
                    Ok(Outcome::Render)
                }
                Err(_) => Ok(Outcome::Render),
            }
        }
        Command::Language(language) => {
            session.view.set_language(language);
            Ok(Outcome::Render)
        }
        Command::Languages => Ok(Outcome::Print(render::format_languages(
            &available_languages(&session.search.books),
            session.view.language.as_deref(),
        ))),
        Command::Years { from, to } => {
            session.view.set_years(from, to);
            Ok(Outcome::Render)
        }
        Command::Sort(order) => {
            session.view.set_sort(order);
            Ok(Outcome::Render)
        }
        Command::Page(page) => {
            session.go_to_page(page);
            Ok(Outcome::Render)
        }
        Command::Next => {
            session.next_page();
            Ok(Outcome::Render)
        }
        Command::Prev => {
            session.prev_page();
            Ok(Outcome::Render)
        }
        Command::Show(target) => {
            session.show(&target)?;
            Ok(Outcome::Render)
        }
        Command::Close => {
            session.close();
            Ok(Outcome::Render)
        }
        Command::Favorite(target) => {
            let (toggled, book) = session.toggle_favorite(&target)?;
            let verb = match toggled {
                Toggled::Added => "Added to favorites:".green().bold(),
                Toggled::Removed => "Removed from favorites:".yellow().bold(),
            };
            Ok(Outcome::Print(format!("{verb} {}\n", book.display_title())))
        }
        Command::Unfavorite(target) => {
            let message = if session.unfavorite(&target)? {
                format!("{}\n", "Removed from favorites.".yellow())
            } else {
                format!("{}\n", "Not a favorite.".bright_black())
            };
            Ok(Outcome::Print(message))
        }
        Command::Favorites => {
            session.view.show_favorites = !session.view.show_favorites;
            Ok(Outcome::Render)
        }
        Command::Help => Ok(Outcome::Print(format!("{HELP}\n"))),
        Command::Quit => Ok(Outcome::Quit),
    }
}

fn spinner(msg: String) -> Option<indicatif::ProgressBar> {
    match render::spinner(msg) {
        Ok(spinner) => Some(spinner),
        Err(err) => {
            log::debug!("spinner unavailable: {err}");
            None
        }
    }
}

/// The detail view when a book is open, otherwise the current page, followed
/// by the favorites panel when it is visible.
pub fn render_view<S: KeyValueStore>(session: &Session<S>) -> String {
    let mut result = String::new();

    if let Some(book) = session.detail() {
        result.push_str(&render::format_detail(book, session.favorites.contains(&book.id)));
    } else if session.search.is_active() {
        let page = session.visible();
        result.push_str(&render::format_page(
            &session.search,
            &session.view,
            &page,
            |id| session.favorites.contains(id),
        ));
    }

    if session.view.show_favorites {
        result.push_str(&render::format_favorites(session.favorites.items()));
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{new_client, tests::serve};
    use axum::routing::get;
    use axum::Router;
    use bookfinder_core::storage::MemoryStore;

    async fn session() -> Session<MemoryStore> {
        let app = Router::new().route(
            "/search.json",
            get(|| async {
                axum::Json(serde_json::json!({
                    "numFound": 2,
                    "docs": [
                        { "key": "/works/OL1W", "title": "Dune", "first_publish_year": 1965, "language": ["eng"] },
                        { "key": "/works/OL2W", "title": "Solaris", "first_publish_year": 1961, "language": ["pol"] }
                    ]
                }))
            }),
        );
        let base = serve(app).await;
        Session::new(new_client().unwrap(), base, MemoryStore::new())
    }

    async fn run(session: &mut Session<MemoryStore>, line: &str) -> Outcome {
        let command = Command::parse(line).unwrap().unwrap();
        execute(session, command).await.unwrap()
    }

    #[tokio::test]
    async fn test_blank_search_is_silent() {
        let mut session = session().await;
        assert_eq!(run(&mut session, "search title").await, Outcome::Silent);
        assert!(!session.search.is_active());
    }

    #[tokio::test]
    async fn test_search_then_filter() {
        colored::control::set_override(false);
        let mut session = session().await;

        assert_eq!(run(&mut session, "/ classics").await, Outcome::Render);
        assert_eq!(session.search.books.len(), 2);

        run(&mut session, "lang pol").await;
        let view = render_view(&session);
        assert!(view.contains("Solaris"));
        assert!(!view.contains("Dune"));

        run(&mut session, "lang off").await;
        run(&mut session, "sort year-asc").await;
        assert_eq!(session.visible().items[0].id, "/works/OL2W");
    }

    #[tokio::test]
    async fn test_more_when_exhausted() {
        colored::control::set_override(false);
        let mut session = session().await;
        run(&mut session, "/ classics").await;

        match run(&mut session, "more").await {
            Outcome::Print(text) => assert!(text.contains("Nothing more to load.")),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_favorites_panel() {
        colored::control::set_override(false);
        let mut session = session().await;
        run(&mut session, "/ classics").await;

        match run(&mut session, "fav 1").await {
            Outcome::Print(text) => assert!(text.contains("Added to favorites: Dune")),
            other => panic!("unexpected outcome: {other:?}"),
        }

        run(&mut session, "favs").await;
        assert!(session.view.show_favorites);
        assert!(render_view(&session).contains("FAVORITES (1)"));

        run(&mut session, "unfav /works/OL1W").await;
        assert!(session.favorites.is_empty());
    }

    #[tokio::test]
    async fn test_detail_view() {
        colored::control::set_override(false);
        let mut session = session().await;
        run(&mut session, "/ classics").await;

        run(&mut session, "show 2").await;
        assert!(render_view(&session).contains("https://openlibrary.org/works/OL2W"));

        run(&mut session, "close").await;
        assert!(render_view(&session).contains("[1]"));
    }

    #[tokio::test]
    async fn test_show_unknown_position_is_an_error() {
        let mut session = session().await;
        run(&mut session, "/ classics").await;

        let command = Command::parse("show 9").unwrap().unwrap();
        assert!(execute(&mut session, command).await.is_err());
    }
}
