//! Core library for bookfinder
//!
//! This crate implements the **Functional Core** of the bookfinder application,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! - **`bookfinder_core`** (this crate): search construction, result shaping and
//!   view transformations, with no network I/O
//! - **`bookfinder`**: HTTP requests, terminal rendering and the interactive shell
//!
//! Data flows one way: user input → [`query`] → remote fetch (shell) →
//! [`accumulator`] → [`pipeline`] → rendered list. [`favorites`] is a side list
//! fed by user action and persisted through [`storage`].
//!
//! # Module Organization
//!
//! - [`query`]: Search modes and request URL construction
//! - [`book`]: API response models, the [`book::Book`] record, cover and catalog links
//! - [`accumulator`]: Deduplicating merge of paginated results and search session state
//! - [`pipeline`]: Language/year filters, sort orders and local pagination
//! - [`favorites`]: The persisted favorites list
//! - [`storage`]: Key-value store abstraction and implementations
//! - [`error`]: Error types
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use bookfinder_core::accumulator::SearchState;
//! use bookfinder_core::pipeline::{visible, ViewState, PAGE_SIZE};
//! use bookfinder_core::query::{build_search_url, SearchMode, DEFAULT_API_BASE};
//!
//! let mut state = SearchState::default();
//! let page = state.begin(SearchMode::Title, "Dune")?;
//! let url = build_search_url(DEFAULT_API_BASE, state.mode, &state.query, page);
//!
//! // ... fetch `url` and parse the body into a `SearchResponse` ...
//! state.apply(page, response);
//!
//! let view = ViewState::default();
//! let current = visible(&state.books, &view, PAGE_SIZE);
//! ```

pub mod accumulator;
pub mod book;
pub mod error;
pub mod favorites;
pub mod pipeline;
pub mod query;
pub mod storage;
