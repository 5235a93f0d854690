//! Best-effort parsers for operator-typed spreadsheet cells.
//!
//! Cells are free text written by people, not machines. Each cell is split
//! into tokens (one per line, then on `;` or `,`), and every token is parsed
//! independently. A token that yields nothing usable is skipped, never
//! reported: there is no validation step between the sheet and ingestion, so
//! the parsers extract whatever they can.

use std::sync::LazyLock;

use igdraw_core::{RecentEntry, Winner};
use regex::Regex;
use url::Url;

static LINE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r?\n").expect("valid line regex"));

static SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*[;,]\s*").expect("valid separator regex"));

static PROFILE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://\S+").expect("valid url regex"));

static HANDLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@([A-Za-z0-9_.\-]+)").expect("valid handle regex"));

static QUOTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]*)""#).expect("valid quote regex"));

/// Splits a cell into trimmed, non-empty tokens.
fn tokenize(raw: &str) -> impl Iterator<Item = &str> {
    LINE_BREAK
        .split(raw)
        .flat_map(|line| SEPARATOR.split(line))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Normalizes a URL through a real parser; anything unparseable becomes `""`.
fn sanitize_url(value: &str) -> String {
    Url::parse(value.trim()).map_or_else(|_| String::new(), |u| u.to_string())
}

fn last_path_segment(profile_url: &str) -> Option<String> {
    let url = Url::parse(profile_url).ok()?;
    url.path_segments()?
        .rev()
        .find(|segment| !segment.is_empty())
        .map(ToOwned::to_owned)
}

fn sanitize_username(candidate: &str) -> String {
    candidate
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect()
}

/// Removes the first occurrence of `needle` from `haystack`.
fn remove_first(haystack: &str, needle: &str) -> String {
    if needle.is_empty() {
        return haystack.to_owned();
    }
    haystack.replacen(needle, "", 1)
}

/// Parses a winners cell into rotation entrants.
///
/// Each token may carry a profile URL, an `@handle`, and free comment text in
/// any order, for example `@anna https://instagram.com/anna` or
/// `https://instagram.com/bob: great prize!`. The username comes from the
/// handle, else the URL's last path segment, else the token's first word.
#[must_use]
pub fn parse_winners(raw: &str) -> Vec<Winner> {
    tokenize(raw).filter_map(parse_winner_token).collect()
}

fn parse_winner_token(token: &str) -> Option<Winner> {
    let url_match = PROFILE_URL.find(token).map(|m| m.as_str());
    let profile_url = url_match.map(sanitize_url).unwrap_or_default();

    let handle_match = HANDLE.captures(token);
    let handle_text = handle_match
        .as_ref()
        .and_then(|c| c.get(0))
        .map_or("", |m| m.as_str());

    let candidate = match handle_match.as_ref().and_then(|c| c.get(1)) {
        Some(handle) => handle.as_str().to_owned(),
        None => last_path_segment(&profile_url)
            .filter(|segment| !sanitize_username(segment).is_empty())
            .unwrap_or_else(|| {
                token
                    .split_whitespace()
                    .next()
                    .unwrap_or_default()
                    .replacen('@', "", 1)
            }),
    };

    let username = sanitize_username(&candidate);
    if username.is_empty() {
        return None;
    }

    let without_url = remove_first(token, url_match.unwrap_or_default());
    let comment = remove_first(&without_url, handle_text).trim().to_owned();

    Some(Winner {
        username,
        profile_url,
        comment,
    })
}

/// Parses a recent-commenters cell.
///
/// Tokens without an `@handle` are skipped. The comment is the first quoted
/// substring, or else whatever remains after removing the handle and quotes.
#[must_use]
pub fn parse_recent_entries(raw: &str) -> Vec<RecentEntry> {
    tokenize(raw).filter_map(parse_recent_token).collect()
}

fn parse_recent_token(token: &str) -> Option<RecentEntry> {
    let captures = HANDLE.captures(token)?;
    let handle_text = captures.get(0)?.as_str();
    let username = captures.get(1)?.as_str().to_owned();

    let comment = match QUOTED.captures(token).and_then(|c| c.get(1)) {
        Some(quoted) => quoted.as_str().to_owned(),
        None => remove_first(token, handle_text)
            .replace('"', "")
            .trim()
            .to_owned(),
    };

    Some(RecentEntry { username, comment })
}

/// Reads a count cell such as `"1,234 comments"` as `1234`.
///
/// Non-digit characters are dropped; an empty result is `0` and values too
/// large for `u64` saturate.
#[must_use]
pub fn parse_number(value: &str) -> u64 {
    let digits: String = value.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return 0;
    }
    digits.parse::<u64>().unwrap_or(u64::MAX)
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;
