//! Accumulation of paginated search results
//!
//! [`SearchState`] tracks one search session: the active mode and query, the
//! last API page applied, and every book fetched so far. It performs no I/O;
//! the shell asks it for the next page number, performs the request, and hands
//! the response back through [`SearchState::apply`] or [`SearchState::fail`].

use std::collections::HashSet;

use serde::Serialize;

use crate::book::{books_from_response, Book, SearchResponse};
use crate::error::SearchError;
use crate::query::SearchMode;

/// Merge `incoming` into `existing`, skipping books whose id is already known.
///
/// The first occurrence of an id wins and relative order is preserved, so
/// duplicates inside `incoming` are dropped as well.
pub fn merge_books(mut existing: Vec<Book>, incoming: Vec<Book>) -> Vec<Book> {
    let mut seen: HashSet<String> = existing.iter().map(|b| b.id.clone()).collect();

    for book in incoming {
        if seen.insert(book.id.clone()) {
            existing.push(book);
        }
    }

    existing
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchState {
    pub mode: SearchMode,
    pub query: String,
    /// Last API page merged into `books`; 0 before the first response.
    pub page: u32,
    pub books: Vec<Book>,
    pub num_found: u64,
    pub loading: bool,
    pub error: Option<String>,
}

impl SearchState {
    /// Start a new search session and return the first API page to request.
    ///
    /// Blank queries are rejected and leave the current session untouched.
    pub fn begin(&mut self, mode: SearchMode, query: &str) -> Result<u32, SearchError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SearchError::EmptyQuery);
        }

        self.mode = mode;
        self.query = query.to_string();
        self.page = 0;
        self.books.clear();
        self.num_found = 0;
        self.error = None;

        Ok(1)
    }

    pub fn is_active(&self) -> bool {
        !self.query.is_empty()
    }

    pub fn has_more(&self) -> bool {
        self.is_active() && (self.page == 0 || (self.books.len() as u64) < self.num_found)
    }

    /// API page to request for "load more", if any.
    pub fn next_page(&self) -> Option<u32> {
        self.has_more().then_some(self.page + 1)
    }

    /// Raise the loading flag.
    ///
    /// This is the only guard against overlapping fetches; there is no queue.
    pub fn start_loading(&mut self) -> Result<(), SearchError> {
        if self.loading {
            return Err(SearchError::Busy);
        }
        self.loading = true;
        Ok(())
    }

    /// Merge a successful response for `page` and return how many books were new.
    pub fn apply(&mut self, page: u32, response: SearchResponse) -> usize {
        let num_found = response.num_found;
        let before = self.books.len();

        self.books = merge_books(std::mem::take(&mut self.books), books_from_response(response));
        self.page = page;
        self.num_found = num_found.unwrap_or(self.books.len() as u64);
        self.loading = false;
        self.error = None;

        log::debug!(
            "merged page {page}: {} new, {} total, {} found",
            self.books.len() - before,
            self.books.len(),
            self.num_found
        );

        self.books.len() - before
    }

    /// Record a failed fetch. Previously accumulated books are kept.
    pub fn fail(&mut self, error: &SearchError) {
        self.loading = false;
        self.error = Some(error.to_string());
    }

    pub fn find(&self, id: &str) -> Option<&Book> {
        self.books.iter().find(|b| b.id == id)
    }
}
