use std::collections::HashSet;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::config::RetryPolicy;
use crate::fetcher::{FetchError, fetch};
use crate::jobs::retry;
use crate::sitemap::{Sitemap, SitemapEntry, SitemapError, parse_sitemap};

/// How deep sitemap indexes are followed when no limit is given.
pub const DEFAULT_MAX_DEPTH: usize = 2;

/// Fetch a sitemap and return every page it lists.
///
/// Sitemap indexes are followed depth-first up to `max_depth` levels below
/// the root, so page order matches the order a reader would see walking the
/// documents top to bottom. Duplicate pages keep their first position. Only
/// the root document failing is an error; broken nested sitemaps are logged
/// and skipped. Transient fetch failures are retried under `retry_policy`.
#[instrument(skip_all, fields(sitemap = %sitemap_url))]
pub async fn load_sitemap(
    sitemap_url: &str,
    max_depth: usize,
    retry_policy: RetryPolicy,
) -> Result<Vec<SitemapEntry>, SitemapError> {
    let root = Url::parse(sitemap_url).map_err(FetchError::from)?;

    let mut entries = Vec::new();
    let mut seen_pages = HashSet::new();
    let mut seen_sitemaps = HashSet::from([root.clone()]);
    // (sitemap url, depth) in reverse visiting order
    let mut stack = vec![(root, 0usize)];
    let mut is_root = true;

    while let Some((url, depth)) = stack.pop() {
        let sitemap = match fetch_and_parse(&url, retry_policy).await {
            Ok(sitemap) => sitemap,
            Err(e) if is_root => return Err(e),
            Err(e) => {
                warn!("Skipping nested sitemap {}: {}", url, e);
                continue;
            }
        };
        is_root = false;

        match sitemap {
            Sitemap::UrlSet(pages) => {
                debug!("{} lists {} pages", url, pages.len());
                for entry in pages {
                    if seen_pages.insert(entry.loc.clone()) {
                        entries.push(entry);
                    }
                }
            }
            Sitemap::Index(children) => {
                if depth >= max_depth {
                    warn!(
                        "Not following {} nested sitemaps of {}: depth limit {} reached",
                        children.len(),
                        url,
                        max_depth
                    );
                    continue;
                }
                info!("{} is a sitemap index with {} sitemaps", url, children.len());
                for child in children.into_iter().rev() {
                    if seen_sitemaps.insert(child.clone()) {
                        stack.push((child, depth + 1));
                    }
                }
            }
        }
    }

    Ok(entries)
}

async fn fetch_and_parse(
    url: &Url,
    retry_policy: RetryPolicy,
) -> Result<Sitemap, SitemapError> {
    let response = retry(
        retry_policy,
        "sitemap fetch",
        || fetch(url.as_str()),
        FetchError::should_retry,
    )
    .await?;
    parse_sitemap(&response.body_utf8)
}
