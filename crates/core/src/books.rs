//! Catalog record models and record-to-view projections
//!
//! The catalog API guarantees nothing beyond the record identifier, so every
//! field is modeled as `Option` and each projection substitutes a defined
//! fallback: placeholder cover, "Unknown Author", "N/A" year. Projections are
//! pure and idempotent; the shell only decides where their output goes.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::session::{Category, MAX_RESULTS_PER_PAGE};

/// Cover shown when a record carries no usable image link.
pub const PLACEHOLDER_COVER: &str =
    "https://images.unsplash.com/photo-1543002588-bfa74002ed7e?w=300&h=400&fit=crop";

/// Search response from the catalog API.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct VolumeList {
    pub total_items: Option<u64>,
    pub items: Option<Vec<Volume>>,
}

/// One catalog record. Only the identifier is guaranteed.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Volume {
    pub id: String,
    pub volume_info: Option<VolumeInfo>,
    pub sale_info: Option<SaleInfo>,
}

/// Core info block of a record. Every field optional.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct VolumeInfo {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub authors: Option<Vec<String>>,
    pub publisher: Option<String>,
    /// Free-form date string; only the leading 4 characters are a year.
    pub published_date: Option<String>,
    /// HTML fragment.
    pub description: Option<String>,
    pub image_links: Option<ImageLinks>,
    pub categories: Option<Vec<String>>,
    pub average_rating: Option<f64>,
    pub ratings_count: Option<u64>,
    pub page_count: Option<u32>,
    pub language: Option<String>,
    pub print_type: Option<String>,
    pub preview_link: Option<String>,
    pub info_link: Option<String>,
}

/// Image link set, multiple resolutions.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ImageLinks {
    pub small_thumbnail: Option<String>,
    pub thumbnail: Option<String>,
    pub small: Option<String>,
    pub medium: Option<String>,
    pub large: Option<String>,
    pub extra_large: Option<String>,
}

/// Sale block of a record.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct SaleInfo {
    pub list_price: Option<ListPrice>,
    pub buy_link: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListPrice {
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub currency_code: String,
}

/// Projected list entry.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct BookCard {
    pub id: String,
    pub title: String,
    pub authors: String,
    pub year: String,
    pub cover_url: String,
    pub teaser: Option<String>,
}

/// Pagination metadata for search output.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct SearchPagination {
    pub current_page: usize,
    pub total_pages: u64,
    pub total_items: u64,
    pub start_index: usize,
    pub max_results: usize,
    pub next_page_command: Option<String>,
    pub prev_page_command: Option<String>,
}

/// Complete search output with items and pagination.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct SearchOutput {
    pub query: String,
    pub category: String,
    pub items: Vec<BookCard>,
    pub pagination: SearchPagination,
}

/// Price shown on the detail view, present only when the record carries
/// list-price data.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct PriceTag {
    pub amount: f64,
    pub currency_code: String,
}

/// Projected detail view record.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct BookDetail {
    pub id: String,
    pub title: String,
    pub subtitle: Option<String>,
    pub authors: String,
    pub published_date: Option<String>,
    pub year: String,
    pub publisher: Option<String>,
    pub page_count: Option<u32>,
    pub language: Option<String>,
    pub print_type: Option<String>,
    pub categories: Vec<String>,
    pub average_rating: Option<f64>,
    pub ratings_count: Option<u64>,
    /// Five star slots, filled up to the floor of the average rating.
    /// Absent when the record has no rating.
    pub stars: Option<String>,
    pub price: Option<PriceTag>,
    pub cover_url: String,
    /// Description with HTML stripped and entities decoded.
    pub description_text: Option<String>,
    /// Original description fragment with self-closing break tags normalized.
    pub description_html: Option<String>,
    pub preview_link: Option<String>,
    pub buy_link: Option<String>,
    pub info_link: Option<String>,
}

/// Detail view state machine. `Loading` on mount or identifier change;
/// terminal per identifier once settled.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailState {
    Loading,
    NotFound,
    Loaded(Box<BookDetail>),
}

impl DetailState {
    /// Settle from a fetch result. A failed fetch (`None`) or a record
    /// lacking its info block lands in `NotFound`.
    pub fn settle(volume: Option<Volume>) -> DetailState {
        match volume.as_ref().and_then(project_detail) {
            Some(detail) => DetailState::Loaded(Box::new(detail)),
            None => DetailState::NotFound,
        }
    }
}

/// Join an author list with ", ", falling back to "Unknown Author".
pub fn format_authors(authors: Option<&[String]>) -> String {
    match authors {
        Some(list) if !list.is_empty() => list.join(", "),
        _ => "Unknown Author".to_string(),
    }
}

/// First 4 characters of the published date, or "N/A".
pub fn published_year(date: Option<&str>) -> String {
    match date {
        Some(d) if !d.is_empty() => d.chars().take(4).collect(),
        _ => "N/A".to_string(),
    }
}

/// Upgrade a non-secure image URL to https.
pub fn secure_image_url(url: &str) -> String {
    match url.strip_prefix("http://") {
        Some(rest) => format!("https://{rest}"),
        None => url.to_string(),
    }
}

/// List-view cover: thumbnail (protocol-upgraded) or the placeholder.
pub fn list_cover(links: Option<&ImageLinks>) -> String {
    links
        .and_then(|l| l.thumbnail.as_deref())
        .map(secure_image_url)
        .unwrap_or_else(|| PLACEHOLDER_COVER.to_string())
}

/// Detail-view cover: large, then medium, then thumbnail
/// (protocol-upgraded), then the placeholder.
pub fn detail_cover(links: Option<&ImageLinks>) -> String {
    if let Some(links) = links {
        if let Some(large) = &links.large {
            return large.clone();
        }
        if let Some(medium) = &links.medium {
            return medium.clone();
        }
        if let Some(thumbnail) = &links.thumbnail {
            return secure_image_url(thumbnail);
        }
    }
    PLACEHOLDER_COVER.to_string()
}

/// Whether a URL's host is on the configured image-host allow-list.
pub fn host_allowed(url: &str, allowed_hosts: &[String]) -> bool {
    let rest = match url.split_once("://") {
        Some((_, rest)) => rest,
        None => return false,
    };
    let host = rest
        .split(['/', '?', '#'])
        .next()
        .unwrap_or("")
        .split(':')
        .next()
        .unwrap_or("");
    allowed_hosts.iter().any(|allowed| allowed == host)
}

/// Strip HTML tags and decode HTML entities from a description fragment.
///
/// Break and paragraph-close tags become newlines so the plain text keeps
/// its line structure; everything else is removed.
pub fn strip_html(text: &str) -> String {
    let breaks = Regex::new(r"(?i)<br\s*/?>|</p\s*>").unwrap();
    let tags = Regex::new(r"<[^>]*>").unwrap();
    let with_breaks = breaks.replace_all(text, "\n");
    let stripped = tags.replace_all(&with_breaks, "");
    html_escape::decode_html_entities(stripped.as_ref())
        .trim()
        .to_string()
}

/// Normalize every `<br>` variant to `<br />`, leaving the rest of the
/// fragment untouched.
pub fn normalize_breaks(html: &str) -> String {
    let re = Regex::new(r"(?i)<br\s*/?>").unwrap();
    re.replace_all(html, "<br />").into_owned()
}

/// Five star slots; a slot is filled when its index is less than the floor
/// of the average rating.
pub fn star_bar(average_rating: f64) -> String {
    let filled = (average_rating.floor().max(0.0) as usize).min(5);
    (0..5).map(|i| if i < filled { '★' } else { '☆' }).collect()
}

/// Project one raw record into a list entry.
pub fn project_card(volume: &Volume) -> BookCard {
    let info = volume.volume_info.as_ref();
    BookCard {
        id: volume.id.clone(),
        title: info.and_then(|i| i.title.clone()).unwrap_or_default(),
        authors: format_authors(info.and_then(|i| i.authors.as_deref())),
        year: published_year(info.and_then(|i| i.published_date.as_deref())),
        cover_url: list_cover(info.and_then(|i| i.image_links.as_ref())),
        teaser: info.and_then(|i| i.description.as_deref()).map(strip_html),
    }
}

/// Project one raw record into the detail view record. Returns `None` when
/// the record lacks its info block.
pub fn project_detail(volume: &Volume) -> Option<BookDetail> {
    let info = volume.volume_info.as_ref()?;
    let sale = volume.sale_info.as_ref();
    Some(BookDetail {
        id: volume.id.clone(),
        title: info.title.clone().unwrap_or_default(),
        subtitle: info.subtitle.clone(),
        authors: format_authors(info.authors.as_deref()),
        published_date: info.published_date.clone(),
        year: published_year(info.published_date.as_deref()),
        publisher: info.publisher.clone(),
        page_count: info.page_count,
        language: info.language.as_deref().map(|l| l.to_ascii_uppercase()),
        print_type: info.print_type.clone(),
        categories: info.categories.clone().unwrap_or_default(),
        average_rating: info.average_rating,
        ratings_count: info.ratings_count,
        stars: info.average_rating.map(star_bar),
        price: sale.and_then(|s| s.list_price.as_ref()).map(|p| PriceTag {
            amount: p.amount,
            currency_code: p.currency_code.clone(),
        }),
        cover_url: detail_cover(info.image_links.as_ref()),
        description_text: info.description.as_deref().map(strip_html),
        description_html: info.description.as_deref().map(normalize_breaks),
        preview_link: info.preview_link.clone(),
        buy_link: sale.and_then(|s| s.buy_link.clone()),
        info_link: info.info_link.clone(),
    })
}

/// Build the copyable CLI command for a given search, used in navigation
/// hints. `page` is 1-indexed; page 1 and the `All` category are implied.
pub fn search_command(term: &str, category: Category, page: usize) -> String {
    let mut command = format!("bookverse search \"{term}\"");
    if category != Category::All {
        command.push_str(&format!(
            " --category {}",
            category.label().to_ascii_lowercase()
        ));
    }
    if page > 1 {
        command.push_str(&format!(" --page {page}"));
    }
    command
}

/// Transform a raw search response into the complete search output:
/// projected cards plus pagination metadata with navigation commands.
pub fn transform_volume_list(
    list: VolumeList,
    term: &str,
    category: Category,
    page_index: usize,
) -> SearchOutput {
    let items: Vec<BookCard> = list
        .items
        .unwrap_or_default()
        .iter()
        .map(project_card)
        .collect();

    let start_index = page_index * MAX_RESULTS_PER_PAGE;
    let total_items = list.total_items.unwrap_or(items.len() as u64);
    let total_pages = total_items.div_ceil(MAX_RESULTS_PER_PAGE as u64);

    let has_more = !items.is_empty() && ((start_index + items.len()) as u64) < total_items;
    let next_page_command = if has_more {
        Some(search_command(term, category, page_index + 2))
    } else {
        None
    };
    let prev_page_command = if page_index > 0 {
        Some(search_command(term, category, page_index))
    } else {
        None
    };

    SearchOutput {
        query: term.to_string(),
        category: category.label().to_string(),
        items,
        pagination: SearchPagination {
            current_page: page_index + 1,
            total_pages,
            total_items,
            start_index,
            max_results: MAX_RESULTS_PER_PAGE,
            next_page_command,
            prev_page_command,
        },
    }
}
