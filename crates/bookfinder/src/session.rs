use crate::client::fetch_search;
use crate::prelude::*;
use bookfinder_core::accumulator::SearchState;
use bookfinder_core::book::{books_from_response, Book};
use bookfinder_core::error::SearchError;
use bookfinder_core::favorites::{Favorites, Toggled};
use bookfinder_core::pipeline::{self, PageView, ViewState, PAGE_SIZE};
use bookfinder_core::query::{build_key_lookup_url, build_search_url, normalize_key, SearchMode};
use bookfinder_core::storage::KeyValueStore;

/// One search session: what has been fetched, how it is viewed, and the
/// favorites list.
pub struct Session<S: KeyValueStore> {
    client: reqwest::Client,
    api_base: String,
    pub search: SearchState,
    pub view: ViewState,
    pub favorites: Favorites<S>,
}

impl<S: KeyValueStore> Session<S> {
    pub fn new(client: reqwest::Client, api_base: String, store: S) -> Self {
        Session {
            client,
            api_base,
            search: SearchState::default(),
            view: ViewState::default(),
            favorites: Favorites::load(store),
        }
    }

    /// Start a new search and fetch its first page.
    ///
    /// Blank queries fail with [`SearchError::EmptyQuery`] before anything is
    /// reset or fetched.
    pub async fn submit(
        &mut self,
        mode: SearchMode,
        query: &str,
    ) -> std::result::Result<usize, SearchError> {
        let page = self.search.begin(mode, query)?;
        self.view.reset_page();
        self.fetch(page).await
    }

    /// Fetch the next API page of the current search, if there is one.
    pub async fn load_more(&mut self) -> std::result::Result<usize, SearchError> {
        match self.search.next_page() {
            Some(page) => self.fetch(page).await,
            None => Ok(0),
        }
    }

    async fn fetch(&mut self, page: u32) -> std::result::Result<usize, SearchError> {
        self.search.start_loading()?;

        let url = build_search_url(&self.api_base, self.search.mode, &self.search.query, page);
        match fetch_search(&self.client, &url).await {
            Ok(response) => {
                let added = self.search.apply(page, response);
                let filtered = self.filtered_count();
                self.view.set_page(self.view.page, filtered, PAGE_SIZE);
                Ok(added)
            }
            Err(err) => {
                self.search.fail(&err);
                Err(err)
            }
        }
    }

    /// Look a single book up by catalog key, outside of the current search.
    pub async fn lookup(&self, key: &str) -> std::result::Result<Option<Book>, SearchError> {
        let url = build_key_lookup_url(&self.api_base, key);
        let response = fetch_search(&self.client, &url).await?;
        Ok(books_from_response(response)
            .into_iter()
            .find(|book| book.id == key))
    }

    pub fn visible(&self) -> PageView<'_> {
        pipeline::visible(&self.search.books, &self.view, PAGE_SIZE)
    }

    pub fn filtered_count(&self) -> usize {
        pipeline::filter_books(&self.search.books, &self.view).len()
    }

    pub fn go_to_page(&mut self, page: usize) {
        let filtered = self.filtered_count();
        self.view.set_page(page, filtered, PAGE_SIZE);
    }

    pub fn next_page(&mut self) {
        let filtered = self.filtered_count();
        self.view.next_page(filtered, PAGE_SIZE);
    }

    pub fn prev_page(&mut self) {
        let filtered = self.filtered_count();
        self.view.prev_page(filtered, PAGE_SIZE);
    }

    /// Resolve a 1-based position on the current page or a catalog key to a
    /// fetched book.
    pub fn resolve(&self, target: &str) -> std::result::Result<&Book, Error> {
        if let Ok(position) = target.parse::<usize>() {
            return position
                .checked_sub(1)
                .and_then(|idx| self.visible().items.get(idx).copied())
                .ok_or(Error::NoSuchPosition(position));
        }

        let key = normalize_key(target)?;
        self.search
            .find(&key)
            .ok_or_else(|| Error::BookNotFound(key))
    }

    pub fn show(&mut self, target: &str) -> std::result::Result<(), Error> {
        let id = self.resolve(target)?.id.clone();
        self.view.detail = Some(id);
        Ok(())
    }

    pub fn close(&mut self) {
        self.view.detail = None;
    }

    pub fn detail(&self) -> Option<&Book> {
        self.view
            .detail
            .as_deref()
            .and_then(|id| self.search.find(id))
    }

    pub fn toggle_favorite(&mut self, target: &str) -> std::result::Result<(Toggled, Book), Error> {
        let book = self.resolve(target)?.clone();
        let toggled = self.favorites.toggle(&book);
        Ok((toggled, book))
    }

    /// Remove a favorite by catalog key. Absent keys are not an error.
    pub fn unfavorite(&mut self, target: &str) -> std::result::Result<bool, Error> {
        let key = normalize_key(target)?;
        Ok(self.favorites.remove(&key))
    }
}
