//! Fetch a web page and reduce it to plain text for quiz generation.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::names;
use crate::utils;

static SCRIPT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b[^>]*>.*?</script>").expect("static regex"));
static STYLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<style\b[^>]*>.*?</style>").expect("static regex"));
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("static regex"));
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("static regex"));

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("invalid URL")]
    InvalidUrl,
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("page returned status {0}")]
    Status(reqwest::StatusCode),
}

pub async fn page_text(client: &reqwest::Client, url: &str) -> Result<String, ScrapeError> {
    let url = reqwest::Url::parse(url).map_err(|_| ScrapeError::InvalidUrl)?;

    let response = client
        .get(url)
        .header(reqwest::header::USER_AGENT, utils::user_agent())
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(ScrapeError::Status(response.status()));
    }

    let html = response.text().await?;
    Ok(clean_html(&html))
}

/// Strip scripts, styles and tags, decode the handful of entities that
/// matter in running text, collapse whitespace, and cap the length.
pub fn clean_html(html: &str) -> String {
    let text = SCRIPT_RE.replace_all(html, "");
    let text = STYLE_RE.replace_all(&text, "");
    let text = TAG_RE.replace_all(&text, " ");

    let text = text
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&mdash;", "\u{2014}")
        .replace("&ndash;", "\u{2013}");

    let text = WHITESPACE_RE.replace_all(&text, " ");
    let text = text.trim();

    if text.chars().count() > names::SCRAPE_MAX_CHARS {
        let truncated: String = text.chars().take(names::SCRAPE_MAX_CHARS).collect();
        format!("{truncated}...")
    } else {
        text.to_string()
    }
}
