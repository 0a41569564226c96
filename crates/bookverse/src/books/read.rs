use crate::prelude::{println, *};
use bookverse_core::books::{host_allowed, BookDetail, DetailState, PLACEHOLDER_COVER};
use colored::Colorize;

#[derive(Debug, clap::Args, serde::Serialize, serde::Deserialize, Clone)]
pub struct ReadOptions {
    /// Volume ID or catalog URL (e.g., "zyTCAlFPjgYC" or
    /// "https://books.google.com/books?id=zyTCAlFPjgYC")
    #[clap(env = "BOOKVERSE_VOLUME")]
    pub volume: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(options: ReadOptions, global: crate::Global) -> Result<()> {
    let volume_id = super::extract_volume_id(&options.volume)?;

    if global.verbose {
        println!("Fetching volume ID: {volume_id}");
    }

    // The spinner is the Loading state; the fetch settles into NotFound or
    // Loaded and never returns to Loading for the same identifier.
    let spinner = super::loading_spinner("Loading book details...");
    let state = read_volume_data(&volume_id).await;
    spinner.finish_and_clear();

    match state {
        DetailState::Loaded(mut detail) => {
            if !host_allowed(&detail.cover_url, &global.allowed_image_hosts()) {
                detail.cover_url = PLACEHOLDER_COVER.to_string();
            }
            if options.json {
                output_json(&detail)?;
            } else {
                output_formatted(&detail)?;
            }
        }
        _ => {
            if options.json {
                let json = serde_json::to_string_pretty(
                    &serde_json::json!({ "id": volume_id, "found": false }),
                )?;
                println!("{}", json);
            } else {
                print!("{}", format_not_found_text(&volume_id));
            }
        }
    }

    Ok(())
}

/// Fetches one volume and settles the detail state. Any transport, status,
/// or parse failure lands in `NotFound`; nothing is retried.
pub async fn read_volume_data(volume_id: &str) -> DetailState {
    let client = reqwest::Client::new();
    match super::fetch_volume(&client, volume_id).await {
        Ok(volume) => DetailState::settle(Some(volume)),
        Err(_) => DetailState::settle(None),
    }
}

/// Convert detail output to JSON string
fn format_detail_json(detail: &BookDetail) -> Result<String> {
    serde_json::to_string_pretty(detail).map_err(|e| eyre!("JSON serialization failed: {}", e))
}

/// Convert detail output to formatted text with colors
pub(crate) fn format_detail_text(detail: &BookDetail) -> String {
    let mut result = String::new();
    let title = if detail.title.is_empty() {
        "(Untitled)"
    } else {
        detail.title.as_str()
    };

    // Title block
    result.push_str(&format!("\n{}\n", "=".repeat(80).bright_cyan()));
    result.push_str(&format!("{}\n", title.bright_cyan().bold()));
    if let Some(subtitle) = &detail.subtitle {
        result.push_str(&format!("{}\n", subtitle.bright_white()));
    }
    result.push_str(&format!("{}\n", "=".repeat(80).bright_cyan()));

    result.push_str(&format!(
        "\n{}: {}\n",
        "By".green(),
        detail.authors.bright_white().bold()
    ));

    if let Some(stars) = &detail.stars {
        let rating = detail.average_rating.unwrap_or(0.0);
        let reviews = detail.ratings_count.unwrap_or(0);
        result.push_str(&format!(
            "{} {}\n",
            stars.bright_yellow(),
            format!("{rating}/5 ({reviews} reviews)").bright_black()
        ));
    }

    // Quick info, one row per present field
    let mut facts: Vec<(&str, String)> = Vec::new();
    if let Some(published) = &detail.published_date {
        facts.push(("Published", published.clone()));
    }
    if let Some(publisher) = &detail.publisher {
        facts.push(("Publisher", publisher.clone()));
    }
    if let Some(pages) = detail.page_count {
        facts.push(("Pages", pages.to_string()));
    }
    if let Some(language) = &detail.language {
        facts.push(("Language", language.clone()));
    }
    if let Some(price) = &detail.price {
        facts.push(("Price", format!("{} {}", price.amount, price.currency_code)));
    }
    if let Some(print_type) = &detail.print_type {
        facts.push(("Print type", print_type.clone()));
    }
    if !facts.is_empty() {
        let mut table = crate::prelude::new_table();
        for (label, value) in facts {
            table.add_row(prettytable::row![label.green(), value]);
        }
        result.push('\n');
        result.push_str(&table.to_string());
    }

    if !detail.categories.is_empty() {
        result.push_str(&format!(
            "\n{}: {}\n",
            "Categories".green(),
            detail.categories.join(", ").bright_white()
        ));
    }

    result.push_str(&format!(
        "\n{}: {}\n",
        "Cover".green(),
        detail.cover_url.cyan().underline()
    ));

    if let Some(text) = &detail.description_text {
        result.push_str(&format!("\n{}\n", "DESCRIPTION".bright_yellow().bold()));
        result.push_str(&format!("{}\n", "-".repeat(80).bright_yellow()));
        result.push_str(&format!("{text}\n"));
    }

    // Action links, each only when the record carries the URL
    if detail.preview_link.is_some() || detail.buy_link.is_some() || detail.info_link.is_some() {
        result.push_str(&format!("\n{}\n", "LINKS".bright_yellow().bold()));
        result.push_str(&format!("{}\n", "-".repeat(80).bright_yellow()));
        if let Some(preview) = &detail.preview_link {
            result.push_str(&format!(
                "  {}: {}\n",
                "Preview".green(),
                preview.cyan().underline()
            ));
        }
        if let Some(buy) = &detail.buy_link {
            result.push_str(&format!("  {}: {}\n", "Buy".green(), buy.cyan().underline()));
        }
        if let Some(info) = &detail.info_link {
            result.push_str(&format!(
                "  {}: {}\n",
                "More info".green(),
                info.cyan().underline()
            ));
        }
    }

    result.push_str(&format!(
        "\n{}: {}\n",
        "Back to search".green(),
        "bookverse search <query>".cyan()
    ));
    result.push('\n');
    result
}

pub(crate) fn format_not_found_text(volume_id: &str) -> String {
    let mut result = String::new();
    result.push_str(&format!("\n{}\n", "BOOK NOT FOUND".bright_yellow().bold()));
    result.push_str(&format!(
        "{}\n",
        format!("The book \"{volume_id}\" doesn't exist in the catalog.").bright_black()
    ));
    result.push_str(&format!(
        "\n{}: {}\n",
        "Back to search".green(),
        "bookverse search <query>".cyan()
    ));
    result
}

fn output_json(detail: &BookDetail) -> Result<()> {
    let json = format_detail_json(detail)?;
    println!("{}", json);
    Ok(())
}

fn output_formatted(detail: &BookDetail) -> Result<()> {
    let formatted = format_detail_text(detail);
    print!("{}", formatted);
    Ok(())
}
