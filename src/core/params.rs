use crate::domain::model::{PageRequest, State};
use crate::utils::error::{AppError, Result};
use regex::Regex;
use std::sync::LazyLock;

pub const DEFAULT_LIMIT: usize = 10;

static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+$").expect("unsigned integer pattern compiles"));

/// Turns the raw `state`, `page` and `limit` query values into a `PageRequest`.
///
/// Empty `page` means 1, empty or `"0"` `limit` means `default_limit`. Anything
/// that is not a plain unsigned integer is rejected rather than coerced.
pub fn normalize(state: &str, page: &str, limit: &str, default_limit: usize) -> Result<PageRequest> {
    let page_token = if page.is_empty() { "1" } else { page };

    let page = parse_count("page", page_token)?;
    if page == 0 {
        return Err(AppError::bad_request("page must be at least 1"));
    }

    let limit = match limit {
        "" | "0" => default_limit,
        text => parse_count("limit", text)?,
    };

    let state = match state {
        "" => None,
        text => Some(
            text.parse::<State>()
                .map_err(|_| AppError::bad_request(format!("unsupported state '{}'", text)))?,
        ),
    };

    Ok(PageRequest {
        page,
        limit,
        state,
        page_token: page_token.to_string(),
    })
}

fn parse_count(field: &str, text: &str) -> Result<usize> {
    if !NUMBER_RE.is_match(text) {
        return Err(AppError::bad_request(format!(
            "{} must be an unsigned integer, got '{}'",
            field, text
        )));
    }

    // offsets derived from these saturate rather than wrap on narrow targets
    text.parse::<u32>()
        .map(|n| n as usize)
        .map_err(|_| AppError::bad_request(format!("{} is out of range: '{}'", field, text)))
}
