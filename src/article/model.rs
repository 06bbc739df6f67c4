use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body returned by the article extraction endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleResponse {
    #[serde(default)]
    pub success: bool,
    /// Free-form error; the service has returned both strings and objects.
    #[serde(default)]
    pub error: Option<Value>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub published_date: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl ArticleResponse {
    pub fn error_message(&self) -> String {
        match &self.error {
            None | Some(Value::Null) => "Unknown error".to_string(),
            Some(Value::String(message)) if !message.is_empty() => message.clone(),
            Some(Value::String(_)) => "Unknown error".to_string(),
            Some(other) => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_fields_default() {
        let article: ArticleResponse = serde_json::from_value(json!({})).unwrap();
        assert!(!article.success);
        assert_eq!(article.error_message(), "Unknown error");
    }

    #[test]
    fn error_message_accepts_any_shape() {
        let article: ArticleResponse =
            serde_json::from_value(json!({"success": false, "error": "Blocked"})).unwrap();
        assert_eq!(article.error_message(), "Blocked");

        let article: ArticleResponse =
            serde_json::from_value(json!({"success": false, "error": {"code": 7}})).unwrap();
        assert_eq!(article.error_message(), r#"{"code":7}"#);
    }
}
