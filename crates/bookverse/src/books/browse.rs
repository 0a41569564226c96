use crate::prelude::{eprintln, println, *};
use bookverse_core::books::{
    host_allowed, transform_volume_list, DetailState, SearchOutput, VolumeList, PLACEHOLDER_COVER,
};
use bookverse_core::session::{Category, FetchPlan, SearchState};
use colored::Colorize;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::{read, search};

/// One parsed browse-mode command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseCommand {
    Search(String),
    SetCategory(String),
    Categories,
    Next,
    Prev,
    Open(usize),
    List,
    Help,
    Quit,
    Unknown(String),
}

pub fn parse_command(line: &str) -> BrowseCommand {
    let trimmed = line.trim();
    let (head, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (trimmed, ""),
    };

    match (head.to_ascii_lowercase().as_str(), rest) {
        ("search" | "s", text) => BrowseCommand::Search(text.to_string()),
        ("category" | "c", label) => BrowseCommand::SetCategory(label.to_string()),
        ("categories", _) => BrowseCommand::Categories,
        ("next" | "n", _) => BrowseCommand::Next,
        ("prev" | "p", _) => BrowseCommand::Prev,
        ("open" | "o", arg) => match arg.parse::<usize>() {
            Ok(position) => BrowseCommand::Open(position),
            Err(_) => BrowseCommand::Unknown(trimmed.to_string()),
        },
        ("list" | "l", _) => BrowseCommand::List,
        ("help" | "h" | "?", _) => BrowseCommand::Help,
        ("quit" | "q" | "exit", _) => BrowseCommand::Quit,
        _ => BrowseCommand::Unknown(trimmed.to_string()),
    }
}

pub async fn run(global: crate::Global) -> Result<()> {
    println!(
        "{}",
        "Welcome to bookverse. Type 'help' for commands, 'quit' to leave."
            .bright_cyan()
            .bold()
    );

    let hosts = global.allowed_image_hosts();
    let mut session = SearchState::new();

    // Initial load: the default feed at offset 0.
    let mut current = refresh(&session, session.current_plan(), &hosts, &global).await;

    let stdin = tokio::io::stdin();
    let mut reader = BufReader::new(stdin);
    let mut line = String::new();

    loop {
        prompt();
        line.clear();
        let bytes_read = reader.read_line(&mut line).await?;
        if bytes_read == 0 {
            break; // EOF
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match parse_command(trimmed) {
            BrowseCommand::Search(text) => match session.submit_query(&text) {
                Some(plan) => current = refresh(&session, plan, &hosts, &global).await,
                None => println!("{}", "Nothing to search for.".yellow()),
            },
            BrowseCommand::SetCategory(label) => match label.parse::<Category>() {
                Ok(category) => {
                    let plan = session.set_category(category);
                    current = refresh(&session, plan, &hosts, &global).await;
                }
                Err(err) => println!("{}", err.to_string().yellow()),
            },
            BrowseCommand::Categories => print_categories(&session),
            BrowseCommand::Next => {
                let plan = session.next_page();
                current = refresh(&session, plan, &hosts, &global).await;
            }
            BrowseCommand::Prev => match session.prev_page() {
                Some(plan) => current = refresh(&session, plan, &hosts, &global).await,
                None => println!("{}", "Already on the first page.".yellow()),
            },
            BrowseCommand::Open(position) => open_book(&current, position, &hosts, &global).await,
            BrowseCommand::List => print!("{}", search::format_search_text(&current)),
            BrowseCommand::Help => print_help(),
            BrowseCommand::Quit => break,
            BrowseCommand::Unknown(input) => {
                println!(
                    "{}",
                    format!("Unknown command: {input}. Type 'help' for commands.").yellow()
                );
            }
        }
    }

    Ok(())
}

/// Issue one fetch for the given plan and render the result. Failures
/// degrade to the empty-results view; the session state is already updated
/// by the caller and is not rolled back.
async fn refresh(
    session: &SearchState,
    plan: FetchPlan,
    hosts: &[String],
    global: &crate::Global,
) -> SearchOutput {
    let spinner = super::loading_spinner("Finding amazing books...");
    let result = search::search_volumes_data(&plan).await;
    spinner.finish_and_clear();

    let list = match result {
        Ok(list) => list,
        Err(err) => {
            if global.verbose {
                eprintln!("Search request failed: {err}");
            }
            VolumeList::default()
        }
    };

    let mut output = transform_volume_list(
        list,
        session.effective_term(),
        session.category(),
        session.page_index(),
    );
    search::apply_image_host_policy(&mut output, hosts);
    print!("{}", search::format_search_text(&output));
    output
}

/// Open the book at a displayed list position (positions are global across
/// pages, matching the rendered `[n]` markers).
async fn open_book(current: &SearchOutput, position: usize, hosts: &[String], global: &crate::Global) {
    let idx = match position.checked_sub(current.pagination.start_index + 1) {
        Some(idx) if idx < current.items.len() => idx,
        _ => {
            println!(
                "{}",
                format!("No book at position {position} on this page.").yellow()
            );
            return;
        }
    };
    let volume_id = current.items[idx].id.clone();

    if global.verbose {
        println!("Fetching volume ID: {volume_id}");
    }

    let spinner = super::loading_spinner("Loading book details...");
    let state = read::read_volume_data(&volume_id).await;
    spinner.finish_and_clear();

    match state {
        DetailState::Loaded(mut detail) => {
            if !host_allowed(&detail.cover_url, hosts) {
                detail.cover_url = PLACEHOLDER_COVER.to_string();
            }
            print!("{}", read::format_detail_text(&detail));
        }
        _ => print!("{}", read::format_not_found_text(&volume_id)),
    }
}

fn prompt() {
    use std::io::Write;
    anstream::print!("{} ", "bookverse>".bold());
    let _ = std::io::stdout().flush();
}

fn print_categories(session: &SearchState) {
    println!("{}", "Categories:".bright_white().bold());
    for category in Category::ALL {
        let marker = if category == session.category() {
            "*"
        } else {
            " "
        };
        println!(
            "  {marker} {} {}",
            category.label().to_ascii_lowercase().cyan(),
            if category == Category::All {
                "(no filter)".bright_black().to_string()
            } else {
                format!("({})", category.token()).bright_black().to_string()
            }
        );
    }
}

fn print_help() {
    println!("{}", "Commands:".bright_white().bold());
    println!("  {}  search the catalog", "search <text>".cyan());
    println!("  {}  filter by category", "category <label>".cyan());
    println!("  {}  list the category labels", "categories".cyan());
    println!("  {}  go to the next page", "next".cyan());
    println!("  {}  go to the previous page", "prev".cyan());
    println!("  {}  open the book at a list position", "open <n>".cyan());
    println!("  {}  show the current page again", "list".cyan());
    println!("  {}  leave", "quit".cyan());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command_search() {
        assert_eq!(
            parse_command("search dune messiah"),
            BrowseCommand::Search("dune messiah".to_string())
        );
        assert_eq!(
            parse_command("s dune"),
            BrowseCommand::Search("dune".to_string())
        );
    }

    #[test]
    fn test_parse_command_search_without_text_is_blank_submission() {
        assert_eq!(parse_command("search"), BrowseCommand::Search(String::new()));
        assert_eq!(parse_command("search    "), BrowseCommand::Search(String::new()));
    }

    #[test]
    fn test_parse_command_category() {
        assert_eq!(
            parse_command("category science"),
            BrowseCommand::SetCategory("science".to_string())
        );
        assert_eq!(
            parse_command("c Fiction"),
            BrowseCommand::SetCategory("Fiction".to_string())
        );
        assert_eq!(parse_command("categories"), BrowseCommand::Categories);
    }

    #[test]
    fn test_parse_command_paging() {
        assert_eq!(parse_command("next"), BrowseCommand::Next);
        assert_eq!(parse_command("n"), BrowseCommand::Next);
        assert_eq!(parse_command("prev"), BrowseCommand::Prev);
        assert_eq!(parse_command("p"), BrowseCommand::Prev);
    }

    #[test]
    fn test_parse_command_open() {
        assert_eq!(parse_command("open 3"), BrowseCommand::Open(3));
        assert_eq!(parse_command("o 12"), BrowseCommand::Open(12));
    }

    #[test]
    fn test_parse_command_open_requires_a_number() {
        assert_eq!(
            parse_command("open dune"),
            BrowseCommand::Unknown("open dune".to_string())
        );
    }

    #[test]
    fn test_parse_command_misc() {
        assert_eq!(parse_command("list"), BrowseCommand::List);
        assert_eq!(parse_command("help"), BrowseCommand::Help);
        assert_eq!(parse_command("?"), BrowseCommand::Help);
        assert_eq!(parse_command("quit"), BrowseCommand::Quit);
        assert_eq!(parse_command("q"), BrowseCommand::Quit);
        assert_eq!(parse_command(" QUIT "), BrowseCommand::Quit);
    }

    #[test]
    fn test_parse_command_unknown() {
        assert_eq!(
            parse_command("dance"),
            BrowseCommand::Unknown("dance".to_string())
        );
    }
}
