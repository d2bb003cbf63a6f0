use crate::prelude::*;
use bookfinder_core::accumulator::SearchState;
use bookfinder_core::book::{catalog_url, cover_url, Book, CoverSize};
use bookfinder_core::favorites::Favorite;
use bookfinder_core::pipeline::{PageView, ViewState};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

const WIDTH: usize = 80;

/// Subjects shown in the detail view.
const MAX_SUBJECTS: usize = 12;

/// Spinner shown while a request is in flight.
pub fn spinner(msg: impl Into<String>) -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));
    spinner.set_message(msg.into());
    Ok(spinner)
}

fn rule(title: &str) -> String {
    format!(
        "\n{}\n{}\n{}\n",
        "=".repeat(WIDTH).bright_cyan(),
        title.bright_cyan().bold(),
        "=".repeat(WIDTH).bright_cyan()
    )
}

fn authors(authors: &[String]) -> String {
    if authors.is_empty() {
        "Unknown author".to_string()
    } else {
        authors.join(", ")
    }
}

fn year(year: Option<i32>) -> String {
    year.map(|y| y.to_string()).unwrap_or_else(|| "n/a".to_string())
}

/// One result card. `position` is the 1-based index on the current page.
pub fn format_card(position: usize, book: &Book, favorite: bool) -> String {
    let mut result = String::new();

    let star = if favorite { "★".yellow().bold() } else { " ".normal() };
    result.push_str(&format!(
        "\n{} {} {}\n",
        format!("[{position}]").yellow().bold(),
        star,
        book.display_title().white().bold()
    ));

    result.push_str(&format!(
        "    {}: {} | {}: {}\n",
        "By".green(),
        authors(&book.authors).bright_white(),
        "First published".green(),
        year(book.year).bright_yellow()
    ));

    if !book.languages.is_empty() {
        result.push_str(&format!(
            "    {}: {}\n",
            "Languages".green(),
            book.languages.join(", ").bright_magenta()
        ));
    }

    result.push_str(&format!("    {}: {}\n", "Key".green(), book.id.bright_black()));

    result
}

/// Header, cards and navigation hints for the current local page.
pub fn format_page(
    search: &SearchState,
    view: &ViewState,
    page: &PageView<'_>,
    is_favorite: impl Fn(&str) -> bool,
) -> String {
    let mut result = String::new();

    result.push_str(&rule(&format!(
        "{} \"{}\" ({} found, {} loaded) - Page {} of {}",
        search.mode.as_str().to_uppercase(),
        search.query,
        search.num_found,
        search.books.len(),
        page.page,
        page.total_pages.max(1)
    )));

    let mut filters = Vec::new();
    if let Some(language) = &view.language {
        filters.push(format!("language={language}"));
    }
    if view.year_from.is_some() || view.year_to.is_some() {
        filters.push(format!(
            "years={}..{}",
            view.year_from.map(|y| y.to_string()).unwrap_or_default(),
            view.year_to.map(|y| y.to_string()).unwrap_or_default()
        ));
    }
    filters.push(format!("sort={}", view.sort));
    result.push_str(&format!(
        "{}: {} ({} matching)\n",
        "View".green(),
        filters.join(" ").bright_white(),
        page.total_filtered
    ));

    if let Some(error) = &search.error {
        result.push_str(&format!("\n{} {}\n", "Error:".red().bold(), error.red()));
    }

    if page.items.is_empty() {
        result.push_str(&format!("\n{}\n", "No books on this page.".yellow()));
    } else {
        for (idx, book) in page.items.iter().enumerate() {
            result.push_str(&format_card(idx + 1, book, is_favorite(book.id.as_str())));
        }
    }

    result.push_str(&format!("\n{}\n", "=".repeat(WIDTH).bright_yellow()));
    let mut hints = Vec::new();
    if page.page < page.total_pages {
        hints.push("next");
    }
    if page.page > 1 {
        hints.push("prev");
    }
    if search.has_more() {
        hints.push("more");
    }
    hints.extend(["show <n>", "fav <n>", "help"]);
    result.push_str(&format!("{}: {}\n", "Commands".green(), hints.join(" | ").cyan()));

    result
}

pub fn format_detail(book: &Book, favorite: bool) -> String {
    let mut result = rule(book.display_title());

    let mut table = new_table();
    table.add_row(prettytable::row!["Authors", authors(&book.authors)]);
    table.add_row(prettytable::row!["First published", year(book.year)]);
    let favorite = if favorite { "yes" } else { "no" };
    table.add_row(prettytable::row!["Favorite", favorite]);

    if !book.languages.is_empty() {
        table.add_row(prettytable::row!["Languages", book.languages.join(", ")]);
    }

    if !book.isbns.is_empty() {
        let shown: Vec<&str> = book.isbns.iter().take(5).map(String::as_str).collect();
        table.add_row(prettytable::row!["ISBN", shown.join(", ")]);
    }

    if let Some(url) = book.cover_url(CoverSize::Large) {
        table.add_row(prettytable::row!["Cover", url]);
    }

    table.add_row(prettytable::row!["Catalog", book.catalog_url()]);
    result.push_str(&table.to_string());

    if !book.subjects.is_empty() {
        let subjects: Vec<&str> = book
            .subjects
            .iter()
            .take(MAX_SUBJECTS)
            .map(String::as_str)
            .collect();
        result.push_str(&format!("\n{}: {}\n", "Subjects".green(), subjects.join(", ")));
    }

    result.push_str(&format!(
        "\n{}: {}\n",
        "Commands".green(),
        "close | fav <key> | help".cyan()
    ));

    result
}

pub fn favorites_table(favorites: &[Favorite]) -> prettytable::Table {
    let mut table = new_table();
    table.set_titles(prettytable::row!["Key", "Title", "Authors", "Year", "Cover"]);

    for favorite in favorites {
        let title = favorite.title.as_deref().unwrap_or("(Untitled)");
        let cover = cover_url(favorite.cover_id, &favorite.isbns, CoverSize::Small).unwrap_or_default();
        table.add_row(prettytable::row![
            favorite.id,
            title,
            authors(&favorite.authors),
            year(favorite.year),
            cover
        ]);
    }

    table
}

pub fn format_favorites(favorites: &[Favorite]) -> String {
    let mut result = rule(&format!("FAVORITES ({})", favorites.len()));

    if favorites.is_empty() {
        result.push_str(&format!("\n{}\n", "No favorites yet.".yellow()));
    } else {
        result.push_str(&favorites_table(favorites).to_string());
        for favorite in favorites {
            result.push_str(&format!(
                "  {}\n",
                catalog_url(&favorite.id).cyan().underline()
            ));
        }
    }

    result
}

pub fn format_languages(languages: &[String], selected: Option<&str>) -> String {
    if languages.is_empty() {
        return format!("{}\n", "No languages in the current results.".yellow());
    }

    let codes: Vec<String> = languages
        .iter()
        .map(|code| {
            if Some(code.as_str()) == selected {
                format!("[{code}]").bold().to_string()
            } else {
                code.clone()
            }
        })
        .collect();

    format!("{}: {}\n", "Languages".green(), codes.join(" "))
}
