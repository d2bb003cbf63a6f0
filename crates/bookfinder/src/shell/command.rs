use crate::error::Error;
use bookfinder_core::pipeline::SortOrder;
use bookfinder_core::query::SearchMode;

/// A parsed line of interactive input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Search { mode: SearchMode, query: String },
    More,
    Language(Option<String>),
    Languages,
    Years { from: Option<i32>, to: Option<i32> },
    Sort(SortOrder),
    Page(usize),
    Next,
    Prev,
    Show(String),
    Close,
    Favorite(String),
    Unfavorite(String),
    Favorites,
    Help,
    Quit,
}

pub const HELP: &str = "\
search [title|author|isbn|subject|all] <query>   start a new search
/ <query>                                        free-text search
more                                             load the next page of results
lang <code|off>                                  filter by language
langs                                            list languages in the results
years <from|-> <to|->                            filter by first-publish year
sort <relevance|title|year-asc|year-desc>        change the sort order
page <n> | next (n) | prev (p)                   move between pages
show <n|key> | close                             open or close the detail view
fav <n|key> | unfav <key>                        toggle or remove a favorite
favs                                             show or hide the favorites panel
help (?) | quit (q)";

impl Command {
    /// Parse one input line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Result<Option<Command>, Error> {
        let words = shlex::split(line)
            .ok_or_else(|| Error::InvalidCommand(format!("unbalanced quotes in: {line}")))?;

        let Some((name, args)) = words.split_first() else {
            return Ok(None);
        };

        let command = match name.to_ascii_lowercase().as_str() {
            "search" | "s" => parse_search(args),
            "/" => Command::Search {
                mode: SearchMode::All,
                query: args.join(" "),
            },
            "more" | "m" => Command::More,
            "lang" => match single(name, args)?.as_str() {
                "off" | "-" | "any" => Command::Language(None),
                code => Command::Language(Some(code.to_string())),
            },
            "langs" => Command::Languages,
            "years" => {
                let [from, to] = args else {
                    return Err(Error::InvalidCommand("usage: years <from|-> <to|->".to_string()));
                };
                Command::Years {
                    from: parse_year(from)?,
                    to: parse_year(to)?,
                }
            }
            "sort" => Command::Sort(
                single(name, args)?
                    .parse()
                    .map_err(|e: bookfinder_core::pipeline::UnknownSortOrder| {
                        Error::InvalidCommand(e.to_string())
                    })?,
            ),
            "page" => {
                let raw = single(name, args)?;
                Command::Page(
                    raw.parse()
                        .map_err(|_| Error::InvalidCommand(format!("not a page number: {raw}")))?,
                )
            }
            "next" | "n" => Command::Next,
            "prev" | "p" => Command::Prev,
            "show" => Command::Show(single(name, args)?),
            "close" => Command::Close,
            "fav" | "f" => Command::Favorite(single(name, args)?),
            "unfav" => Command::Unfavorite(single(name, args)?),
            "favs" => Command::Favorites,
            "help" | "?" => Command::Help,
            "quit" | "q" | "exit" => Command::Quit,
            other => return Err(Error::InvalidCommand(format!("unknown command: {other}"))),
        };

        Ok(Some(command))
    }
}

/// A leading mode word selects the mode; otherwise the whole input is free text.
fn parse_search(args: &[String]) -> Command {
    match args.split_first() {
        Some((first, rest))
            if ["title", "author", "isbn", "subject", "all"]
                .contains(&first.to_ascii_lowercase().as_str()) =>
        {
            Command::Search {
                mode: first.parse().unwrap_or_default(),
                query: rest.join(" "),
            }
        }
        _ => Command::Search {
            mode: SearchMode::All,
            query: args.join(" "),
        },
    }
}

fn single(name: &str, args: &[String]) -> Result<String, Error> {
    match args {
        [value] => Ok(value.clone()),
        _ => Err(Error::InvalidCommand(format!("{name} takes exactly one argument"))),
    }
}

fn parse_year(raw: &str) -> Result<Option<i32>, Error> {
    match raw {
        "-" | "any" => Ok(None),
        _ => raw
            .parse()
            .map(Some)
            .map_err(|_| Error::InvalidCommand(format!("not a year: {raw}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Command {
        Command::parse(line).unwrap().unwrap()
    }

    #[test]
    fn test_blank_line() {
        assert_eq!(Command::parse("").unwrap(), None);
        assert_eq!(Command::parse("   ").unwrap(), None);
    }

    #[test]
    fn test_search_with_mode() {
        assert_eq!(
            parse("search title Dune Messiah"),
            Command::Search {
                mode: SearchMode::Title,
                query: "Dune Messiah".to_string()
            }
        );
        assert_eq!(
            parse("search Author \"Ursula K. Le Guin\""),
            Command::Search {
                mode: SearchMode::Author,
                query: "Ursula K. Le Guin".to_string()
            }
        );
    }

    #[test]
    fn test_search_without_mode_is_free_text() {
        assert_eq!(
            parse("search the left hand of darkness"),
            Command::Search {
                mode: SearchMode::All,
                query: "the left hand of darkness".to_string()
            }
        );
        assert_eq!(
            parse("/ dune"),
            Command::Search {
                mode: SearchMode::All,
                query: "dune".to_string()
            }
        );
    }

    #[test]
    fn test_search_with_blank_query() {
        assert_eq!(
            parse("search isbn"),
            Command::Search {
                mode: SearchMode::Isbn,
                query: String::new()
            }
        );
    }

    #[test]
    fn test_filters() {
        assert_eq!(parse("lang eng"), Command::Language(Some("eng".to_string())));
        assert_eq!(parse("lang off"), Command::Language(None));
        assert_eq!(
            parse("years 1950 1960"),
            Command::Years {
                from: Some(1950),
                to: Some(1960)
            }
        );
        assert_eq!(
            parse("years - 1900"),
            Command::Years {
                from: None,
                to: Some(1900)
            }
        );
        assert_eq!(parse("sort year-desc"), Command::Sort(SortOrder::YearDesc));
    }

    #[test]
    fn test_navigation() {
        assert_eq!(parse("page 3"), Command::Page(3));
        assert_eq!(parse("n"), Command::Next);
        assert_eq!(parse("prev"), Command::Prev);
        assert_eq!(parse("more"), Command::More);
        assert_eq!(parse("show 2"), Command::Show("2".to_string()));
        assert_eq!(parse("fav /works/OL1W"), Command::Favorite("/works/OL1W".to_string()));
        assert_eq!(parse("q"), Command::Quit);
    }

    #[test]
    fn test_invalid_input() {
        assert!(Command::parse("frobnicate").is_err());
        assert!(Command::parse("years 1950").is_err());
        assert!(Command::parse("years abc 1960").is_err());
        assert!(Command::parse("sort popularity").is_err());
        assert!(Command::parse("page two").is_err());
        assert!(Command::parse("show").is_err());
        assert!(Command::parse("search \"unterminated").is_err());
    }
}
