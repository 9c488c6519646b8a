//! Input rules for codes, destination URLs and account fields.

use url::Url;

pub const MAX_CODE_LEN: usize = 64;

/// Serialized form of an absolute `http`/`https` URL with a non-empty host.
/// Tabs and newlines are stripped and non-ASCII or spaces are percent-encoded,
/// so the result is always a legal `Location` header value.
#[must_use]
pub fn normalize_destination(value: &str) -> Option<String> {
    if value.is_empty() {
        return None;
    }

    let url = Url::parse(value).ok()?;
    let has_host = url.host_str().is_some_and(|h| !h.is_empty());
    (matches!(url.scheme(), "http" | "https") && has_host).then(|| url.to_string())
}

/// Parses a submitted destination. Blank input means "no destination set".
pub fn parse_destination(value: &str) -> Result<Option<String>, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    normalize_destination(trimmed)
        .map(Some)
        .ok_or_else(|| "Invalid URL. Use http:// or https:// with a domain.".to_string())
}

/// Codes end up as a path segment of the public link.
pub fn parse_code(value: &str) -> Result<String, String> {
    let code = value.trim();

    if code.is_empty() {
        return Err("Enter a code (e.g. QR-001).".to_string());
    }

    if code.chars().count() > MAX_CODE_LEN {
        return Err(format!("Code must be {MAX_CODE_LEN} characters or less"));
    }

    if code
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '/' | '?' | '#'))
    {
        return Err("Code cannot contain spaces, '/', '?' or '#'".to_string());
    }

    Ok(code.to_string())
}

#[must_use]
pub fn normalize_email(value: &str) -> String {
    value.trim().to_lowercase()
}
