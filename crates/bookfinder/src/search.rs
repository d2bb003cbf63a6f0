use crate::prelude::*;
use crate::render;
use crate::session::Session;
use bookfinder_core::book::Book;
use bookfinder_core::error::SearchError;
use bookfinder_core::pipeline::{available_languages, SortOrder};
use bookfinder_core::query::SearchMode;
use bookfinder_core::storage::KeyValueStore;
use serde::Serialize;

#[derive(Debug, clap::Args, Clone)]
pub struct SearchOptions {
    /// Query text
    #[arg(value_name = "QUERY", required = true, num_args = 1..)]
    pub query: Vec<String>,

    /// Search mode: title, author, isbn, subject or all
    #[arg(short, long, env = "BOOKFINDER_MODE", default_value = "all")]
    pub mode: SearchMode,

    /// Number of API pages to accumulate before filtering
    #[arg(long, default_value = "1")]
    pub pages: u32,

    /// Only show books available in this language (e.g. eng, fre)
    #[arg(short, long)]
    pub lang: Option<String>,

    /// Earliest first-publish year
    #[arg(long)]
    pub from: Option<i32>,

    /// Latest first-publish year
    #[arg(long)]
    pub to: Option<i32>,

    /// Sort order: relevance, title, year-asc, year-desc
    #[arg(short, long, default_value = "relevance")]
    pub sort: SortOrder,

    /// Local page number (1-indexed)
    #[arg(short, long, default_value = "1")]
    pub page: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
pub struct SearchOutput<'a> {
    pub mode: SearchMode,
    pub query: &'a str,
    pub num_found: u64,
    pub loaded: usize,
    pub has_more: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'a str>,
    pub languages: Vec<String>,
    pub page: usize,
    pub total_pages: usize,
    pub total_filtered: usize,
    pub items: Vec<&'a Book>,
}

pub async fn run(options: SearchOptions, global: crate::Global) -> Result<()> {
    let mut session = Session::new(
        crate::client::new_client()?,
        global.api_base.clone(),
        global.store()?,
    );

    let spinner = render::spinner(format!(
        "Searching {} \"{}\"...",
        options.mode,
        options.query.join(" ")
    ))?;
    let output = search(&options, &mut session).await;
    spinner.finish_and_clear();

    if let Some(output) = output? {
        anstream::print!("{}", output);
    }

    Ok(())
}

/// Run the search described by `options` and format the selected page.
///
/// Returns `None` for a blank query. Only a failure on the first API page is
/// an error; later failures keep what was loaded and are reported in the
/// output.
async fn search<S: KeyValueStore>(
    options: &SearchOptions,
    session: &mut Session<S>,
) -> Result<Option<String>> {
    session.view.set_language(options.lang.clone());
    session.view.set_years(options.from, options.to);
    session.view.set_sort(options.sort);

    match fetch_pages(session, options.mode, &options.query.join(" "), options.pages).await {
        Ok(()) => {}
        Err(SearchError::EmptyQuery) => {
            log::debug!("Ignoring blank query");
            return Ok(None);
        }
        Err(err) => return Err(err.into()),
    }

    session.go_to_page(options.page);
    let page = session.visible();

    if options.json {
        let output = SearchOutput {
            mode: session.search.mode,
            query: &session.search.query,
            num_found: session.search.num_found,
            loaded: session.search.books.len(),
            has_more: session.search.has_more(),
            error: session.search.error.as_deref(),
            languages: available_languages(&session.search.books),
            page: page.page,
            total_pages: page.total_pages,
            total_filtered: page.total_filtered,
            items: page.items.clone(),
        };
        return Ok(Some(format!("{}\n", serde_json::to_string_pretty(&output)?)));
    }

    let favorites = &session.favorites;
    Ok(Some(render::format_page(
        &session.search,
        &session.view,
        &page,
        |id| favorites.contains(id),
    )))
}

/// Fetch the first page, then keep loading until `pages` API pages are merged
/// or nothing is left.
///
/// A failed later page stops loading; the failure stays recorded on the
/// search state next to the results already merged.
async fn fetch_pages<S: KeyValueStore>(
    session: &mut Session<S>,
    mode: SearchMode,
    query: &str,
    pages: u32,
) -> std::result::Result<(), SearchError> {
    session.submit(mode, query).await?;

    for _ in 1..pages {
        if !session.search.has_more() {
            break;
        }
        if let Err(err) = session.load_more().await {
            log::warn!("Stopped loading more results: {err}");
            break;
        }
    }

    Ok(())
}
