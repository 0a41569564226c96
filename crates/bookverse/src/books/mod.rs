use crate::prelude::*;
use bookverse_core::books::Volume;
use indicatif::{ProgressBar, ProgressStyle};
use regex::Regex;

pub mod browse;
pub mod read;
pub mod search;

const BOOKS_API_BASE: &str = "https://www.googleapis.com/books/v1";

pub fn get_api_base() -> &'static str {
    BOOKS_API_BASE
}

/// Accepts a raw volume ID or a catalog URL carrying an `id=` parameter
/// (e.g., "zyTCAlFPjgYC" or "https://books.google.com/books?id=zyTCAlFPjgYC").
pub fn extract_volume_id(input: &str) -> Result<String> {
    let trimmed = input.trim();

    let id_re = Regex::new(r"^[A-Za-z0-9_-]+$").unwrap();
    if id_re.is_match(trimmed) {
        return Ok(trimmed.to_string());
    }

    let url_re = Regex::new(r"[?&]id=([A-Za-z0-9_-]+)").unwrap();
    if let Some(caps) = url_re.captures(trimmed) {
        if let Some(id_match) = caps.get(1) {
            return Ok(id_match.as_str().to_string());
        }
    }

    Err(eyre!(Error::InvalidVolumeId(input.to_string())))
}

pub async fn fetch_volume(client: &reqwest::Client, id: &str) -> Result<Volume> {
    let url = format!("{}/volumes/{id}", get_api_base());
    let response = client
        .get(&url)
        .send()
        .await
        .map_err(|e| eyre!(Error::Network(format!("Failed to fetch volume {id}: {e}"))))?;

    if !response.status().is_success() {
        return Err(eyre!(Error::ApiStatus(response.status().as_u16())));
    }

    let volume: Volume = response
        .json()
        .await
        .map_err(|e| eyre!(Error::Generic(format!("Failed to parse volume {id}: {e}"))))?;

    Ok(volume)
}

/// Spinner shown while a catalog call is in flight. This is the loading
/// indicator; callers clear it once the call settles, success or failure.
pub fn loading_spinner(msg: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));
    spinner.set_message(msg.to_string());
    spinner
}

pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_len).collect();
        format!("{truncated}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_volume_id_raw() {
        assert_eq!(extract_volume_id("zyTCAlFPjgYC").unwrap(), "zyTCAlFPjgYC");
        assert_eq!(extract_volume_id("  zyTCAlFPjgYC ").unwrap(), "zyTCAlFPjgYC");
    }

    #[test]
    fn test_extract_volume_id_from_url() {
        assert_eq!(
            extract_volume_id("https://books.google.com/books?id=zyTCAlFPjgYC&hl=en").unwrap(),
            "zyTCAlFPjgYC"
        );
        assert_eq!(
            extract_volume_id("https://books.google.com/books?hl=en&id=zyTCAlFPjgYC").unwrap(),
            "zyTCAlFPjgYC"
        );
    }

    #[test]
    fn test_extract_volume_id_invalid() {
        assert!(extract_volume_id("not a volume id").is_err());
        assert!(extract_volume_id("https://books.google.com/books").is_err());
    }

    #[test]
    fn test_truncate_text_short_input_unchanged() {
        assert_eq!(truncate_text("short", 200), "short");
    }

    #[test]
    fn test_truncate_text_long_input_gets_ellipsis() {
        let long = "a".repeat(250);
        let truncated = truncate_text(&long, 200);
        assert_eq!(truncated.len(), 203);
        assert!(truncated.ends_with("..."));
    }

    #[test]
    fn test_truncate_text_multibyte_safe() {
        let text = "é".repeat(10);
        assert_eq!(truncate_text(&text, 4), "éééé...");
    }
}
