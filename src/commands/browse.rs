//! Line-driven list browser.
//!
//! Reads one command per line from stdin and re-renders the page once the
//! view has settled. Each line is applied and awaited before the next is
//! read, so every `/` line issues its own fetch after the quiet period.

use std::io::Write;
use std::sync::Arc;

use owo_colors::OwoColorize;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::connect;
use super::ls::{LsOptions, render_page};
use crate::client::QueryClient;
use crate::crm::{Contact, CrmRecord, EntityKind, Run, Student, Tag};
use crate::display::format_filters;
use crate::error::{Result, RosterError};
use crate::listview::{FilterValue, ListView, ListViewConfig, parse_filter_arg};

const HELP: &str = "\
  n            next page
  p            previous page
  0            back to the starting page
  /text        search (a lone / clears it)
  f key=value  set a filter
  f key        clear a filter
  fc           clear all filters
  s N          rows per page
  r            refetch from the server
  q            quit";

#[derive(Debug, Clone, PartialEq)]
pub enum BrowseCommand {
    Next,
    Previous,
    FirstPage,
    Search(String),
    SetFilter(String, Option<FilterValue>),
    ClearFilter(String),
    ClearFilters,
    PageSize(u32),
    Refetch,
    Help,
    Quit,
}

impl BrowseCommand {
    /// Parse one input line. Blank lines are `None`.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        if let Some(text) = line.strip_prefix('/') {
            return Ok(Some(BrowseCommand::Search(text.to_string())));
        }

        let (head, rest) = match line.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (line, ""),
        };

        let command = match (head, rest) {
            ("n", "") => BrowseCommand::Next,
            ("p", "") => BrowseCommand::Previous,
            ("0", "") => BrowseCommand::FirstPage,
            ("fc", "") => BrowseCommand::ClearFilters,
            ("r", "") => BrowseCommand::Refetch,
            ("q", "") | ("quit", "") => BrowseCommand::Quit,
            ("?", "") | ("h", "") | ("help", "") => BrowseCommand::Help,
            ("f", arg) if !arg.is_empty() => {
                let (key, value) = parse_filter_arg(arg)?;
                if arg.contains('=') {
                    BrowseCommand::SetFilter(key, value)
                } else {
                    BrowseCommand::ClearFilter(key)
                }
            }
            ("s", n) => match n.parse::<u32>() {
                Ok(size) if size >= 1 => BrowseCommand::PageSize(size),
                _ => {
                    return Err(RosterError::Validation(format!(
                        "page size must be a whole number of at least 1, got '{n}'"
                    )));
                }
            },
            _ => {
                return Err(RosterError::Validation(format!(
                    "unknown command '{line}' (? for help)"
                )));
            }
        };
        Ok(Some(command))
    }
}

enum Step {
    Render,
    Stay,
    Quit,
}

/// Apply a command to the view. Returns what the loop should do next.
fn apply<T: CrmRecord>(view: &ListView<T>, command: BrowseCommand) -> Result<Step> {
    let step = match command {
        BrowseCommand::Next => {
            if !view.go_to_next_page() {
                println!("{}", "Already on the last page.".dimmed());
                return Ok(Step::Stay);
            }
            Step::Render
        }
        BrowseCommand::Previous => {
            if !view.go_to_previous_page() {
                println!("{}", "Already on the first page.".dimmed());
                return Ok(Step::Stay);
            }
            Step::Render
        }
        BrowseCommand::FirstPage => {
            view.reset_page();
            Step::Render
        }
        BrowseCommand::Search(text) => {
            view.set_search(text);
            Step::Render
        }
        BrowseCommand::SetFilter(key, value) => {
            view.set_filter(key, value)?;
            Step::Render
        }
        BrowseCommand::ClearFilter(key) => {
            view.clear_filter(&key);
            Step::Render
        }
        BrowseCommand::ClearFilters => {
            view.clear_all_filters();
            Step::Render
        }
        BrowseCommand::PageSize(size) => {
            view.set_page_size(size);
            Step::Render
        }
        BrowseCommand::Refetch => {
            view.refetch();
            Step::Render
        }
        BrowseCommand::Help => {
            println!("{HELP}");
            Step::Stay
        }
        BrowseCommand::Quit => Step::Quit,
    };
    Ok(step)
}

fn prompt() {
    print!("{} ", ">".cyan());
    let _ = std::io::stdout().flush();
}

async fn browse_list<T: CrmRecord>(
    client: Arc<QueryClient>,
    view_config: ListViewConfig,
    title: &str,
) -> Result<()> {
    let view: ListView<T> = ListView::new(client, view_config);
    let operation = view.descriptor().operation_name().to_string();
    view.on_filters_change(move |filters| {
        tracing::debug!(operation = %operation, filters = %format_filters(filters), "filters changed");
    });

    view.settled().await;
    println!("{}", render_page(title, &view, &view.snapshot()));
    println!("{}", "? for help, q to quit".dimmed());
    prompt();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let step = BrowseCommand::parse(&line).and_then(|command| match command {
            Some(command) => apply(&view, command),
            None => Ok(Step::Stay),
        });

        match step {
            Ok(Step::Quit) => break,
            Ok(Step::Render) => {
                view.settled().await;
                println!("{}", render_page(title, &view, &view.snapshot()));
            }
            Ok(Step::Stay) => {}
            Err(e) => eprintln!("{e}"),
        }
        prompt();
    }
    println!();
    Ok(())
}

/// Page through a list interactively
pub async fn cmd_browse(options: LsOptions) -> Result<()> {
    let (config, client) = connect()?;
    let view_config = options.view_config(&config)?;
    let title = options.entity.title();

    match options.entity {
        EntityKind::Students => browse_list::<Student>(client, view_config, title).await,
        EntityKind::Contacts => browse_list::<Contact>(client, view_config, title).await,
        EntityKind::Tags => browse_list::<Tag>(client, view_config, title).await,
        EntityKind::Runs => browse_list::<Run>(client, view_config, title).await,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::client::mock::{MockReply, MockTransport, list_data};

    #[test]
    fn test_parse_navigation() {
        assert_eq!(BrowseCommand::parse("n").unwrap(), Some(BrowseCommand::Next));
        assert_eq!(BrowseCommand::parse(" p ").unwrap(), Some(BrowseCommand::Previous));
        assert_eq!(BrowseCommand::parse("0").unwrap(), Some(BrowseCommand::FirstPage));
        assert_eq!(BrowseCommand::parse("s 25").unwrap(), Some(BrowseCommand::PageSize(25)));
        assert_eq!(BrowseCommand::parse("").unwrap(), None);
        assert!(BrowseCommand::parse("s 0").is_err());
        assert!(BrowseCommand::parse("next please").is_err());
    }

    #[test]
    fn test_parse_search_keeps_text_verbatim() {
        assert_eq!(
            BrowseCommand::parse("/ana lima").unwrap(),
            Some(BrowseCommand::Search("ana lima".to_string()))
        );
        assert_eq!(
            BrowseCommand::parse("/").unwrap(),
            Some(BrowseCommand::Search(String::new()))
        );
    }

    #[test]
    fn test_parse_filters() {
        assert_eq!(
            BrowseCommand::parse("f status=active").unwrap(),
            Some(BrowseCommand::SetFilter(
                "status".to_string(),
                Some(FilterValue::from("active"))
            ))
        );
        assert_eq!(
            BrowseCommand::parse("f status").unwrap(),
            Some(BrowseCommand::ClearFilter("status".to_string()))
        );
        assert_eq!(
            BrowseCommand::parse("f status=").unwrap(),
            Some(BrowseCommand::SetFilter("status".to_string(), None))
        );
        assert_eq!(BrowseCommand::parse("fc").unwrap(), Some(BrowseCommand::ClearFilters));
        assert!(BrowseCommand::parse("f").is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_apply_drives_the_view() {
        let transport = MockTransport::new(|request| {
            let page = request.variables["page"].as_u64().unwrap_or(1) as u32;
            let ids: Vec<String> = (0..10)
                .map(|i| format!("t{}", (page - 1) * 10 + i))
                .collect();
            let mut data = list_data("tags", &ids, page, 10, 25);
            for item in data["tags"]["data"].as_array_mut().unwrap() {
                item["name"] = item["id"].clone();
            }
            MockReply::ok(data)
        });
        let client = Arc::new(QueryClient::new(transport.clone()));
        let view: ListView<Tag> = ListView::new(
            client,
            ListViewConfig::new(EntityKind::Tags.descriptor())
                .search_debounce(Duration::from_millis(300)),
        );
        view.settled().await;

        assert!(matches!(apply(&view, BrowseCommand::Next), Ok(Step::Render)));
        view.settled().await;
        assert_eq!(view.current_page(), 2);

        assert!(matches!(apply(&view, BrowseCommand::Next), Ok(Step::Render)));
        view.settled().await;
        assert!(matches!(apply(&view, BrowseCommand::Next), Ok(Step::Stay)));
        assert_eq!(view.current_page(), 3);

        // tags take no filters
        let err = apply(
            &view,
            BrowseCommand::SetFilter("status".to_string(), Some(FilterValue::from("x"))),
        );
        assert!(matches!(err, Err(RosterError::InvalidFilter(..))));

        assert!(matches!(
            apply(&view, BrowseCommand::Search("vip".to_string())),
            Ok(Step::Render)
        ));
        view.settled().await;
        assert_eq!(view.current_page(), 1);
        assert_eq!(transport.last_variables().unwrap()["search"], "vip");

        assert!(matches!(apply(&view, BrowseCommand::Quit), Ok(Step::Quit)));
    }
}
