//! Filter, sort and paginate the accumulated result set
//!
//! Pure functions deriving the visible subset of books from the accumulated
//! list and the current [`ViewState`]. The pipeline is recomputed from scratch
//! on every input change; nothing here mutates the accumulated list.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::book::Book;

/// Number of books shown per local page.
pub const PAGE_SIZE: usize = 12;

/// Upper bound used when no "year to" filter is set.
pub const MAX_YEAR: i32 = 9999;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    /// Keep accumulation order, i.e. the order returned by the API.
    #[default]
    Relevance,
    Title,
    YearAsc,
    YearDesc,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown sort order: {0}. Valid orders: relevance, title, year-asc, year-desc")]
pub struct UnknownSortOrder(pub String);

impl FromStr for SortOrder {
    type Err = UnknownSortOrder;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "relevance" | "" => Ok(SortOrder::Relevance),
            "title" => Ok(SortOrder::Title),
            "year-asc" | "year" => Ok(SortOrder::YearAsc),
            "year-desc" => Ok(SortOrder::YearDesc),
            other => Err(UnknownSortOrder(other.to_string())),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortOrder::Relevance => "relevance",
            SortOrder::Title => "title",
            SortOrder::YearAsc => "year-asc",
            SortOrder::YearDesc => "year-desc",
        })
    }
}

/// Client-side view settings layered over the accumulated list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewState {
    pub language: Option<String>,
    pub year_from: Option<i32>,
    pub year_to: Option<i32>,
    pub sort: SortOrder,
    /// 1-indexed local page
    pub page: usize,
    /// Id of the book shown in the detail view
    pub detail: Option<String>,
    pub show_favorites: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState {
            language: None,
            year_from: None,
            year_to: None,
            sort: SortOrder::Relevance,
            page: 1,
            detail: None,
            show_favorites: false,
        }
    }
}

impl ViewState {
    pub fn set_language(&mut self, language: Option<String>) {
        self.language = language.map(|l| l.trim().to_string()).filter(|l| !l.is_empty());
        self.page = 1;
    }

    pub fn set_years(&mut self, from: Option<i32>, to: Option<i32>) {
        self.year_from = from;
        self.year_to = to;
        self.page = 1;
    }

    pub fn set_sort(&mut self, sort: SortOrder) {
        self.sort = sort;
        self.page = 1;
    }

    /// Move to `page`, clamped to the pages available for `filtered` books.
    pub fn set_page(&mut self, page: usize, filtered: usize, page_size: usize) {
        self.page = clamp_page(page, filtered, page_size);
    }

    pub fn next_page(&mut self, filtered: usize, page_size: usize) {
        self.set_page(self.page + 1, filtered, page_size);
    }

    pub fn prev_page(&mut self, filtered: usize, page_size: usize) {
        self.set_page(self.page.saturating_sub(1), filtered, page_size);
    }

    /// Called when a new search starts.
    pub fn reset_page(&mut self) {
        self.page = 1;
        self.detail = None;
    }
}

/// The slice of books to render plus navigation metadata.
#[derive(Debug, Clone, Serialize)]
pub struct PageView<'a> {
    pub items: Vec<&'a Book>,
    pub page: usize,
    pub total_pages: usize,
    pub total_filtered: usize,
    pub page_size: usize,
}

pub fn matches_language(book: &Book, language: Option<&str>) -> bool {
    match language {
        None => true,
        Some(code) => book.languages.iter().any(|l| l == code),
    }
}

/// Missing years count as 0; missing bounds as `[0, 9999]`.
pub fn matches_years(book: &Book, from: Option<i32>, to: Option<i32>) -> bool {
    let year = book.year.unwrap_or(0);
    year >= from.unwrap_or(0) && year <= to.unwrap_or(MAX_YEAR)
}

pub fn filter_books<'a>(books: &'a [Book], view: &ViewState) -> Vec<&'a Book> {
    books
        .iter()
        .filter(|b| matches_language(b, view.language.as_deref()))
        .filter(|b| matches_years(b, view.year_from, view.year_to))
        .collect()
}

/// Accent- and case-insensitive sort key.
fn collation_key(s: &str) -> String {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Locale-aware title comparison: accents and case only break ties.
pub fn compare_titles(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.cmp(b))
}

fn as_book<B: Borrow<Book>>(b: &B) -> &Book {
    b.borrow()
}

/// Stable in-place sort. `Relevance` leaves the order untouched.
pub fn sort_books<B: Borrow<Book>>(books: &mut [B], order: SortOrder) {
    match order {
        SortOrder::Relevance => {}
        SortOrder::Title => books.sort_by(|a, b| {
            compare_titles(
                as_book(a).title.as_deref().unwrap_or(""),
                as_book(b).title.as_deref().unwrap_or(""),
            )
        }),
        SortOrder::YearAsc => books.sort_by_key(|b| as_book(b).year.unwrap_or(0)),
        SortOrder::YearDesc => {
            books.sort_by_key(|b| std::cmp::Reverse(as_book(b).year.unwrap_or(0)))
        }
    }
}

pub fn page_count(total: usize, page_size: usize) -> usize {
    total.div_ceil(page_size.max(1))
}

/// Clamp a page number into `[1, max(1, page_count)]`.
pub fn clamp_page(page: usize, total: usize, page_size: usize) -> usize {
    page.clamp(1, page_count(total, page_size).max(1))
}

/// Slice of `items` for a 1-indexed page. Out-of-range pages are empty.
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    let start = page.saturating_sub(1) * page_size;
    if start >= items.len() {
        return &[];
    }
    let end = (start + page_size).min(items.len());
    &items[start..end]
}

/// Run the full filter → sort → paginate pipeline.
pub fn visible<'a>(books: &'a [Book], view: &ViewState, page_size: usize) -> PageView<'a> {
    let mut filtered = filter_books(books, view);
    sort_books(&mut filtered, view.sort);

    let total_filtered = filtered.len();
    let page = clamp_page(view.page, total_filtered, page_size);
    let items = paginate(&filtered, page, page_size).to_vec();

    PageView {
        items,
        page,
        total_pages: page_count(total_filtered, page_size),
        total_filtered,
        page_size,
    }
}

/// Distinct language codes present in the accumulated list, sorted.
pub fn available_languages(books: &[Book]) -> Vec<String> {
    books
        .iter()
        .flat_map(|b| b.languages.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
