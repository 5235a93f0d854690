//! Canonicalization of Instagram post references.
//!
//! Operators paste post links in many shapes: full URLs with tracking query
//! strings, scheme-less `instagram.com/p/...` fragments, or a bare shortcode.
//! Everything downstream keys campaigns by [`PostReference::shortcode`], never
//! by the raw or canonical URL string.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

const INSTAGRAM_ORIGIN: &str = "https://www.instagram.com";

static BARE_SHORTCODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.\-]+$").expect("valid shortcode regex"));

static HAS_HTTP_SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^https?://").expect("valid scheme regex"));

static POST_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)/(p|photo|reel|tv|video)/([^/?#]+)").expect("valid post path regex")
});

/// Kind of Instagram post a link points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostType {
    Photo,
    Reel,
    Video,
}

impl PostType {
    /// Path segment Instagram itself uses for this post type.
    #[must_use]
    pub fn path_segment(self) -> &'static str {
        match self {
            PostType::Photo => "p",
            PostType::Reel => "reel",
            PostType::Video => "tv",
        }
    }

    fn from_segment(segment: &str) -> Option<Self> {
        match segment.to_ascii_lowercase().as_str() {
            "p" | "photo" => Some(PostType::Photo),
            "reel" => Some(PostType::Reel),
            "tv" | "video" => Some(PostType::Video),
            _ => None,
        }
    }
}

impl fmt::Display for PostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostType::Photo => write!(f, "photo"),
            PostType::Reel => write!(f, "reel"),
            PostType::Video => write!(f, "video"),
        }
    }
}

/// Canonical identity of an Instagram post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostReference {
    #[serde(rename = "type")]
    pub post_type: PostType,
    pub shortcode: String,
    pub canonical_url: String,
    pub embed_url: String,
}

impl PostReference {
    #[must_use]
    pub fn new(post_type: PostType, shortcode: &str) -> Self {
        let segment = post_type.path_segment();
        Self {
            post_type,
            shortcode: shortcode.to_owned(),
            canonical_url: format!("{INSTAGRAM_ORIGIN}/{segment}/{shortcode}/"),
            embed_url: format!("{INSTAGRAM_ORIGIN}/{segment}/{shortcode}/embed"),
        }
    }
}

/// Turns a loosely written post reference into an absolute URL.
///
/// - `""` stays empty.
/// - A bare token such as `ABC123` is treated as a reel shortcode.
/// - Anything without an `http(s)://` scheme gets `https://` prepended.
#[must_use]
pub fn to_absolute_url(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    if BARE_SHORTCODE.is_match(raw) {
        return format!("{INSTAGRAM_ORIGIN}/reel/{raw}/");
    }
    if !HAS_HTTP_SCHEME.is_match(raw) {
        return format!("https://{raw}");
    }
    raw.to_owned()
}

/// Extracts the post identity from an arbitrary post reference.
///
/// Returns `None` when the input cannot be parsed as a URL or its path does
/// not contain a `/<type>/<shortcode>` pair. Callers treat `None` as an
/// unrecognized link.
#[must_use]
pub fn extract_post_info(raw: &str) -> Option<PostReference> {
    let absolute = to_absolute_url(raw.trim());
    let url = Url::parse(&absolute).ok()?;
    let captures = POST_PATH.captures(url.path())?;
    let post_type = PostType::from_segment(captures.get(1)?.as_str())?;
    let shortcode = captures.get(2)?.as_str();
    Some(PostReference::new(post_type, shortcode))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_shortcode_becomes_reel_url() {
        assert_eq!(
            to_absolute_url("ABC123"),
            "https://www.instagram.com/reel/ABC123/"
        );
    }

    #[test]
    fn scheme_less_link_gets_https() {
        assert_eq!(
            to_absolute_url("instagram.com/p/XYZ/"),
            "https://instagram.com/p/XYZ/"
        );
    }

    #[test]
    fn absolute_link_passes_through() {
        assert_eq!(
            to_absolute_url("HTTP://www.instagram.com/p/XYZ/"),
            "HTTP://www.instagram.com/p/XYZ/"
        );
        assert_eq!(to_absolute_url(""), "");
    }

    #[test]
    fn shortcode_round_trips_through_extract() {
        let info = extract_post_info(&to_absolute_url("ABC123")).expect("recognized");
        assert_eq!(info.post_type, PostType::Reel);
        assert_eq!(info.shortcode, "ABC123");
        assert_eq!(info.canonical_url, "https://www.instagram.com/reel/ABC123/");
        assert_eq!(info.embed_url, "https://www.instagram.com/reel/ABC123/embed");
    }

    #[test]
    fn photo_link_with_query_string_is_canonicalized() {
        let info = extract_post_info("  https://www.instagram.com/p/Cx9_aB-1/?igsh=abc&utm=x  ")
            .expect("recognized");
        assert_eq!(info.post_type, PostType::Photo);
        assert_eq!(info.shortcode, "Cx9_aB-1");
        assert_eq!(info.canonical_url, "https://www.instagram.com/p/Cx9_aB-1/");
    }

    #[test]
    fn tv_and_spelled_out_segments_map_to_types() {
        let tv = extract_post_info("instagram.com/tv/VID1").expect("tv");
        assert_eq!(tv.post_type, PostType::Video);
        assert_eq!(tv.canonical_url, "https://www.instagram.com/tv/VID1/");

        let video = extract_post_info("https://instagram.com/video/VID1/").expect("video");
        assert_eq!(video.post_type, PostType::Video);
        assert_eq!(video.shortcode, tv.shortcode);

        let photo = extract_post_info("https://instagram.com/PHOTO/P1").expect("photo");
        assert_eq!(photo.post_type, PostType::Photo);
    }

    #[test]
    fn trailing_slash_and_query_do_not_change_identity() {
        let a = extract_post_info("https://www.instagram.com/reel/Q1").expect("a");
        let b = extract_post_info("https://instagram.com/reel/Q1/?hl=uk").expect("b");
        assert_eq!(a, b);
    }

    #[test]
    fn profile_links_and_garbage_are_unrecognized() {
        assert!(extract_post_info("https://www.instagram.com/someone/").is_none());
        assert!(extract_post_info("https://").is_none());
        assert!(extract_post_info("").is_none());
        assert!(extract_post_info("not a link at all").is_none());
    }

    #[test]
    fn post_type_serializes_lowercase() {
        let json = serde_json::to_string(&PostReference::new(PostType::Video, "V")).unwrap();
        assert!(json.contains("\"type\":\"video\""));
        assert!(json.contains("\"canonicalUrl\":\"https://www.instagram.com/tv/V/\""));
    }
}
