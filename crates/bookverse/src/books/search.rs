use crate::prelude::{eprintln, println, *};
use bookverse_core::books::{
    host_allowed, transform_volume_list, SearchOutput, VolumeList, PLACEHOLDER_COVER,
};
use bookverse_core::session::{Category, FetchPlan, SearchState};
use colored::Colorize;

#[derive(Debug, clap::Args, serde::Serialize, serde::Deserialize, Clone)]
pub struct SearchOptions {
    /// Search text (the bestseller feed is used when omitted)
    #[clap(env = "BOOKVERSE_QUERY")]
    pub query: Option<String>,

    /// Category filter: all, fiction, science, history, biography,
    /// technology, romance, mystery, poetry
    #[arg(short, long, default_value = "all")]
    pub category: String,

    /// Page number (1-indexed)
    #[arg(short, long, default_value = "1")]
    pub page: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(options: SearchOptions, global: crate::Global) -> Result<()> {
    let category: Category = options.category.parse()?;
    if options.page == 0 {
        return Err(eyre!("Page numbers are 1-indexed"));
    }

    let mut session = SearchState::new();
    session.set_category(category);
    if let Some(raw) = &options.query {
        session
            .submit_query(raw)
            .ok_or_eyre("Search text is empty")?;
    }
    // Walk the page cursor forward so the offset comes out of the same
    // transitions the interactive session uses.
    let mut plan = session.current_plan();
    for _ in 1..options.page {
        plan = session.next_page();
    }

    if global.verbose {
        println!("Query: {} (startIndex {})", plan.query, plan.start_index);
        println!();
    }

    let spinner = super::loading_spinner("Finding amazing books...");
    let result = search_volumes_data(&plan).await;
    spinner.finish_and_clear();

    // A failed or malformed response degrades to an empty result list; the
    // loading indicator is already cleared either way.
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
    apply_image_host_policy(&mut output, &global.allowed_image_hosts());

    if options.json {
        output_json(&output)?;
    } else {
        output_formatted(&output)?;
    }

    Ok(())
}

/// Fetches one page of catalog search results
pub async fn search_volumes_data(plan: &FetchPlan) -> Result<VolumeList> {
    let client = reqwest::Client::new();
    let url = format!(
        "{}/volumes?q={}&startIndex={}&maxResults={}",
        super::get_api_base(),
        urlencoding::encode(&plan.query),
        plan.start_index,
        plan.max_results
    );

    let response = client
        .get(&url)
        .send()
        .await
        .map_err(|e| eyre!(Error::Network(format!("Failed to reach the catalog: {e}"))))?;

    if !response.status().is_success() {
        return Err(eyre!(Error::ApiStatus(response.status().as_u16())));
    }

    let list: VolumeList = response
        .json()
        .await
        .map_err(|e| eyre!(Error::Generic(format!("Failed to parse search response: {e}"))))?;

    Ok(list)
}

/// Replace covers pointing outside the allow-listed hosts with the
/// placeholder.
pub(crate) fn apply_image_host_policy(output: &mut SearchOutput, hosts: &[String]) {
    for card in &mut output.items {
        if !host_allowed(&card.cover_url, hosts) {
            card.cover_url = PLACEHOLDER_COVER.to_string();
        }
    }
}

/// Convert search output to JSON string
fn format_search_json(output: &SearchOutput) -> Result<String> {
    serde_json::to_string_pretty(output).map_err(|e| eyre!("JSON serialization failed: {}", e))
}

/// Convert search output to formatted text with colors
pub(crate) fn format_search_text(output: &SearchOutput) -> String {
    let mut result = String::new();
    let total_pages = output.pagination.total_pages.max(1);

    // Header
    result.push_str(&format!("\n{}\n", "=".repeat(80).bright_cyan()));
    result.push_str(&format!(
        "{}\n",
        format!(
            "BOOKVERSE: \"{}\" [{}] (Page {} of {})",
            output.query, output.category, output.pagination.current_page, total_pages
        )
        .bright_cyan()
        .bold()
    ));
    result.push_str(&format!("{}\n", "=".repeat(80).bright_cyan()));

    if output.items.is_empty() {
        result.push_str(&format!("\n{}\n", "No books found.".yellow()));
        result.push_str(&format!(
            "{}\n",
            "Try searching with different keywords.".bright_black()
        ));
    } else {
        for (idx, book) in output.items.iter().enumerate() {
            let position = output.pagination.start_index + idx + 1;
            let title = if book.title.is_empty() {
                "(Untitled)"
            } else {
                book.title.as_str()
            };
            result.push_str(&format!(
                "\n{} {}\n",
                format!("[{position}]").yellow().bold(),
                title.white().bold()
            ));

            result.push_str(&format!(
                "    {}: {} | {}: {}\n",
                "By".green(),
                book.authors.bright_white(),
                "Year".green(),
                book.year.bright_black()
            ));

            if let Some(teaser) = &book.teaser {
                result.push_str(&format!(
                    "    {}\n",
                    super::truncate_text(teaser, 200).bright_black()
                ));
            }

            result.push_str(&format!(
                "    {}: {}\n",
                "Cover".green(),
                book.cover_url.cyan().underline()
            ));

            result.push_str(&format!(
                "    {}: {} | {}: {}\n",
                "ID".green(),
                book.id.bright_white(),
                "Read".green(),
                format!("bookverse read {}", book.id).cyan()
            ));
        }
    }

    // Navigation section
    result.push_str(&format!("\n{}\n", "=".repeat(80).bright_yellow()));
    result.push_str(&format!("{}\n", "NAVIGATION".bright_yellow().bold()));
    result.push_str(&format!("{}\n", "=".repeat(80).bright_yellow()));

    result.push_str(&format!(
        "\n{} {} {} {} ({} {})\n",
        "Showing page".bright_white(),
        output
            .pagination
            .current_page
            .to_string()
            .bright_cyan()
            .bold(),
        "of".bright_white(),
        total_pages.to_string().bright_cyan().bold(),
        output.pagination.total_items.to_string().bright_cyan().bold(),
        "matching books".bright_white()
    ));

    if output.pagination.next_page_command.is_some()
        || output.pagination.prev_page_command.is_some()
    {
        result.push_str(&format!("\n{}:\n", "To navigate".bright_white().bold()));
        if let Some(next) = &output.pagination.next_page_command {
            result.push_str(&format!("  {}: {}\n", "Next page".green(), next.cyan()));
        }
        if let Some(prev) = &output.pagination.prev_page_command {
            result.push_str(&format!("  {}: {}\n", "Previous page".green(), prev.cyan()));
        }
    }

    result.push_str(&format!(
        "\n{}:\n",
        "To filter by category".bright_white().bold()
    ));
    result.push_str(&format!(
        "  {}\n",
        "bookverse search <query> --category <label>  (all, fiction, science, history, biography, technology, romance, mystery, poetry)"
            .cyan()
    ));

    result.push_str(&format!("\n{}:\n", "To read a book".bright_white().bold()));
    result.push_str(&format!("  {}\n", "bookverse read <id>".cyan()));
    if let Some(first) = output.items.first() {
        result.push_str(&format!(
            "  {}: {}\n",
            "Example".green(),
            format!("bookverse read {}", first.id).cyan()
        ));
    }

    result.push_str(&format!(
        "\n{}:\n",
        "To get JSON output".bright_white().bold()
    ));
    result.push_str(&format!(
        "  {}\n",
        format!("bookverse search \"{}\" --json", output.query).cyan()
    ));

    result.push('\n');
    result
}

fn output_json(output: &SearchOutput) -> Result<()> {
    let json = format_search_json(output)?;
    println!("{}", json);
    Ok(())
}

fn output_formatted(output: &SearchOutput) -> Result<()> {
    let formatted = format_search_text(output);
    print!("{}", formatted);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookverse_core::books::{BookCard, SearchPagination};

    fn create_test_card(id: &str, title: &str) -> BookCard {
        BookCard {
            id: id.to_string(),
            title: title.to_string(),
            authors: "Frank Herbert".to_string(),
            year: "1965".to_string(),
            cover_url: "https://books.google.com/thumb.jpg".to_string(),
            teaser: Some("A desert planet and its spice.".to_string()),
        }
    }

    fn create_test_output(items: Vec<BookCard>) -> SearchOutput {
        let total_items = items.len() as u64;
        SearchOutput {
            query: "dune".to_string(),
            category: "All".to_string(),
            items,
            pagination: SearchPagination {
                current_page: 1,
                total_pages: 1,
                total_items,
                start_index: 0,
                max_results: 12,
                next_page_command: None,
                prev_page_command: None,
            },
        }
    }

    #[test]
    fn test_format_search_json_basic() {
        let output = create_test_output(vec![create_test_card("abc123", "Dune")]);

        let json = format_search_json(&output).unwrap();

        assert!(json.contains("\"id\": \"abc123\""));
        assert!(json.contains("\"title\": \"Dune\""));
        assert!(json.contains("\"pagination\""));
        assert!(json.contains("\"query\": \"dune\""));
    }

    #[test]
    fn test_format_search_json_structure() {
        let output = create_test_output(vec![create_test_card("abc123", "Dune")]);

        let json = format_search_json(&output).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert!(parsed.get("items").is_some());
        assert!(parsed.get("pagination").is_some());
        assert_eq!(parsed["items"].as_array().unwrap().len(), 1);
        assert_eq!(parsed["pagination"]["max_results"], 12);
    }

    #[test]
    fn test_format_search_json_empty() {
        let output = create_test_output(vec![]);

        let json = format_search_json(&output).unwrap();

        assert!(json.contains("\"items\": []"));
        assert!(json.contains("\"pagination\""));
    }

    #[test]
    fn test_format_search_text_basic() {
        let output = create_test_output(vec![create_test_card("abc123", "Dune")]);

        let formatted = format_search_text(&output);

        assert!(formatted.contains("BOOKVERSE: \"dune\" [All] (Page 1 of 1)"));
        assert!(formatted.contains("Dune"));
        assert!(formatted.contains("[1]"));
        assert!(formatted.contains("Frank Herbert"));
        assert!(formatted.contains("1965"));
    }

    #[test]
    fn test_format_search_text_empty_shows_no_books_found() {
        let output = create_test_output(vec![]);

        let formatted = format_search_text(&output);

        assert!(formatted.contains("No books found."));
        assert!(formatted.contains("Try searching with different keywords."));
    }

    #[test]
    fn test_format_search_text_positions_follow_offset() {
        let mut output = create_test_output(vec![
            create_test_card("a", "First"),
            create_test_card("b", "Second"),
        ]);
        output.pagination.current_page = 3;
        output.pagination.start_index = 24;
        output.pagination.total_pages = 5;
        output.pagination.total_items = 55;

        let formatted = format_search_text(&output);

        assert!(formatted.contains("[25]"));
        assert!(formatted.contains("[26]"));
        assert!(formatted.contains("Page 3 of 5"));
    }

    #[test]
    fn test_format_search_text_untitled_fallback() {
        let mut card = create_test_card("abc123", "");
        card.teaser = None;

        let formatted = format_search_text(&create_test_output(vec![card]));

        assert!(formatted.contains("(Untitled)"));
    }

    #[test]
    fn test_format_search_text_includes_navigation_commands() {
        let mut output = create_test_output(vec![create_test_card("abc123", "Dune")]);
        output.pagination.next_page_command = Some("bookverse search \"dune\" --page 2".to_string());
        output.pagination.prev_page_command = None;

        let formatted = format_search_text(&output);

        assert!(formatted.contains("NAVIGATION"));
        assert!(formatted.contains("Next page"));
        assert!(formatted.contains("bookverse search \"dune\" --page 2"));
        assert!(!formatted.contains("Previous page"));
    }

    #[test]
    fn test_format_search_text_includes_read_command() {
        let output = create_test_output(vec![create_test_card("zyTCAlFPjgYC", "Dune")]);

        let formatted = format_search_text(&output);

        assert!(formatted.contains("bookverse read zyTCAlFPjgYC"));
        assert!(formatted.contains("Example"));
    }

    #[test]
    fn test_format_search_text_includes_usage_hints() {
        let output = create_test_output(vec![create_test_card("abc123", "Dune")]);

        let formatted = format_search_text(&output);

        assert!(formatted.contains("To filter by category"));
        assert!(formatted.contains("To read a book"));
        assert!(formatted.contains("To get JSON output"));
    }

    #[test]
    fn test_format_search_text_truncates_long_teasers() {
        let mut card = create_test_card("abc123", "Dune");
        card.teaser = Some("x".repeat(500));

        let formatted = format_search_text(&create_test_output(vec![card]));

        assert!(formatted.contains(&format!("{}...", "x".repeat(200))));
        assert!(!formatted.contains(&"x".repeat(300)));
    }

    #[test]
    fn test_apply_image_host_policy_replaces_foreign_hosts() {
        let mut output = create_test_output(vec![create_test_card("abc123", "Dune")]);
        output.items[0].cover_url = "https://evil.example.com/x.jpg".to_string();

        apply_image_host_policy(&mut output, &["books.google.com".to_string()]);

        assert_eq!(output.items[0].cover_url, PLACEHOLDER_COVER);
    }

    #[test]
    fn test_apply_image_host_policy_keeps_allowed_hosts() {
        let mut output = create_test_output(vec![create_test_card("abc123", "Dune")]);

        apply_image_host_policy(&mut output, &["books.google.com".to_string()]);

        assert_eq!(
            output.items[0].cover_url,
            "https://books.google.com/thumb.jpg"
        );
    }
}
