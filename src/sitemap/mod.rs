//! Sitemap parsing and loading.
//!
//! Both flavours of the sitemaps.org protocol are understood: a `<urlset>`
//! listing pages and a `<sitemapindex>` pointing at further sitemaps.

pub mod loader;
pub mod parser;

pub use loader::load_sitemap;
pub use parser::{Sitemap, SitemapEntry, parse_sitemap};

use crate::fetcher::FetchError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SitemapError {
    #[error("failed to fetch sitemap: {0}")]
    Fetch(#[from] FetchError),

    #[error("document is neither a <urlset> nor a <sitemapindex>")]
    UnknownFormat,
}
