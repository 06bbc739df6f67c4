use crate::article::{ArticleError, ArticleResponse};

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|value| !value.is_empty())
}

/// Render an extracted article as markdown.
///
/// Title, author and publication date each become their own paragraph ahead
/// of the content body; fields the service left out are omitted.
pub fn render_article(article: &ArticleResponse) -> Result<String, ArticleError> {
    if !article.success {
        return Err(ArticleError::Extraction(article.error_message()));
    }

    let mut parts = Vec::new();

    if let Some(title) = present(&article.title) {
        parts.push(format!("# {title}\n"));
    }
    if let Some(author) = present(&article.author) {
        parts.push(format!("Author: {author}\n"));
    }
    if let Some(published) = present(&article.published_date) {
        parts.push(format!("Published: {published}\n"));
    }
    if let Some(content) = present(&article.content) {
        parts.push(content.to_string());
    }

    if parts.is_empty() {
        return Err(ArticleError::Empty);
    }
    Ok(parts.join("\n"))
}
