use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::fmt::{Display, Formatter};
use std::sync::LazyLock;
use tracing::warn;
use url::Url;

use crate::sitemap::SitemapError;

static CDATA_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!\[CDATA\[(.*?)\]\]>").unwrap());

// Prefixed protocol tags lose their prefix, `image:loc` included. Extension
// elements such as `image:image` keep theirs, so anything nested in them is
// never a direct child of `<url>` and is ignored by `child_text`.
static PREFIXED_TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(/?)[A-Za-z_][\w.-]*:(urlset|sitemapindex|sitemap|url|loc|lastmod)\b").unwrap()
});

// HTML5 treats `<foo/>` on unknown elements as an open tag.
static SELF_CLOSING_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<([A-Za-z_][\w.:-]*)(\s[^<>]*?)?\s*/>").unwrap());

static URLSET: LazyLock<Selector> = LazyLock::new(|| Selector::parse("urlset").unwrap());
static SITEMAPINDEX: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("sitemapindex").unwrap());
static URL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("urlset > url").unwrap());
static SITEMAP: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("sitemapindex > sitemap").unwrap());

/// One page listed in a `<urlset>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapEntry {
    pub loc: Url,
    pub lastmod: Option<String>,
}

impl Display for SitemapEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.loc)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sitemap {
    UrlSet(Vec<SitemapEntry>),
    Index(Vec<Url>),
}

/// Parse a sitemap document. Entries keep document order; `<url>` elements
/// without a usable `<loc>` are skipped.
pub fn parse_sitemap(xml: &str) -> Result<Sitemap, SitemapError> {
    let normalized = normalize(xml);
    let document = Html::parse_document(&normalized);

    if document.select(&SITEMAPINDEX).next().is_some() {
        let children = document
            .select(&SITEMAP)
            .filter_map(|sitemap| child_text(&sitemap, "loc"))
            .filter_map(|loc| parse_loc(&loc))
            .collect();
        return Ok(Sitemap::Index(children));
    }

    if document.select(&URLSET).next().is_some() {
        let entries = document
            .select(&URL)
            .filter_map(|url| {
                let loc = parse_loc(&child_text(&url, "loc")?)?;
                let lastmod = child_text(&url, "lastmod");
                Some(SitemapEntry { loc, lastmod })
            })
            .collect();
        return Ok(Sitemap::UrlSet(entries));
    }

    Err(SitemapError::UnknownFormat)
}

/// Rewrite the XML into something the HTML5 tree builder keeps intact:
/// CDATA sections become escaped text, self-closing elements get an explicit
/// end tag and namespaced protocol tags lose their prefix.
fn normalize(xml: &str) -> String {
    let without_cdata = CDATA_REGEX.replace_all(xml, |caps: &regex::Captures| {
        caps[1]
            .replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
    });
    let expanded = SELF_CLOSING_REGEX.replace_all(&without_cdata, "<${1}${2}></${1}>");
    PREFIXED_TAG_REGEX
        .replace_all(&expanded, "<$1$2")
        .into_owned()
}

/// Trimmed text of the first direct child element called `name`.
fn child_text(element: &ElementRef<'_>, name: &str) -> Option<String> {
    let child = element
        .children()
        .filter_map(ElementRef::wrap)
        .find(|child| child.value().name() == name)?;
    let text = child.text().collect::<String>();
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn parse_loc(loc: &str) -> Option<Url> {
    match Url::parse(loc) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Some(url),
        Ok(url) => {
            warn!("Skipping sitemap entry with unsupported scheme: {}", url);
            None
        }
        Err(e) => {
            warn!("Skipping sitemap entry {:?}: {}", loc, e);
            None
        }
    }
}
