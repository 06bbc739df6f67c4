//! Client for the RapidAPI article extraction service and rendering of
//! its responses as markdown.

pub mod client;
pub mod errors;
pub mod markdown;
pub mod model;

pub use client::{ArticleClient, ArticleSource};
pub use errors::ArticleError;
pub use markdown::render_article;
pub use model::ArticleResponse;
