//! Input validation for phrase text, image tags and candidate paging.

use crate::ports::image_service::{is_valid_locator, Page};

/// Longest phrase accepted, in characters.
pub const MAX_PHRASE_CHARS: usize = 280;

/// Candidates per page when the client does not ask for a size.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Smallest page size accepted.
pub const MIN_PAGE_SIZE: u32 = 3;

/// Largest page size accepted.
pub const MAX_PAGE_SIZE: u32 = 50;

/// Validate phrase text and return it trimmed.
///
/// # Errors
///
/// Returns an error if the text is blank or longer than [`MAX_PHRASE_CHARS`].
pub fn validate_text(text: &str) -> Result<String, String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err("Phrase text must not be empty".to_string());
    }
    let len = trimmed.chars().count();
    if len > MAX_PHRASE_CHARS {
        return Err(format!(
            "Phrase text is {len} characters. Maximum: {MAX_PHRASE_CHARS}"
        ));
    }
    Ok(trimmed.to_string())
}

/// Validate an image locator chosen by a client and return it trimmed.
///
/// # Errors
///
/// Returns an error unless the locator is an absolute `http`, `https` or
/// `data` URL.
pub fn validate_image_url(url: &str) -> Result<String, String> {
    let trimmed = url.trim();
    if !is_valid_locator(trimmed) {
        return Err(format!(
            "Image URL '{trimmed}' must be an absolute http, https or data URL"
        ));
    }
    Ok(trimmed.to_string())
}

/// Resolve optional paging parameters.
///
/// # Errors
///
/// Returns an error if `page` is 0 or `per` is outside
/// [`MIN_PAGE_SIZE`]..=[`MAX_PAGE_SIZE`].
pub fn validate_page(page: Option<u32>, per: Option<u32>) -> Result<Page, String> {
    let number = page.unwrap_or(1);
    if number == 0 {
        return Err("Page numbers start at 1".to_string());
    }
    let size = per.unwrap_or(DEFAULT_PAGE_SIZE);
    if !(MIN_PAGE_SIZE..=MAX_PAGE_SIZE).contains(&size) {
        return Err(format!(
            "Page size {size} is out of range. Expected {MIN_PAGE_SIZE} to {MAX_PAGE_SIZE}"
        ));
    }
    Ok(Page { number, size })
}

/// Trim tags, drop blanks and duplicates, keep first-seen order.
#[must_use]
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.as_ref().trim();
        if !tag.is_empty() && !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    out
}
