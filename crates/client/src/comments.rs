//! Comment service client (product reviews with server-side sentiment).

use serde::{Deserialize, Serialize};

use shopfront_core::{Category, ProductId};

use crate::error::GatewayError;

/// A stored comment. `sentiment` and `confidence` are computed by the
/// service when the comment is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(default)]
    pub id: Option<u64>,
    pub product_id: ProductId,
    pub category: Category,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(rename = "comment")]
    pub text: String,
    #[serde(default)]
    pub sentiment: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
}

/// A comment to submit.
#[derive(Debug, Clone, Serialize)]
pub struct NewComment {
    pub product_id: ProductId,
    pub category: Category,
    #[serde(rename = "comment")]
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

/// Client for the comment service.
pub struct CommentGateway {
    client: reqwest::Client,
    base_url: String,
}

impl CommentGateway {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn comments_url(&self) -> String {
        format!("{}/comment/api/comments/", self.base_url)
    }

    /// Comments for one product; empty on any read failure.
    pub async fn list(&self, category: Category, product_id: ProductId) -> Vec<Comment> {
        let resp = match self
            .client
            .get(self.comments_url())
            .query(&[
                ("category", category.as_str()),
                ("product_id", &product_id.to_string()),
            ])
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(err) => {
                tracing::warn!(%category, %product_id, error = %err, "comment read failed; substituting an empty list");
                return Vec::new();
            }
        };
        if !resp.status().is_success() {
            tracing::warn!(
                %category,
                %product_id,
                status = resp.status().as_u16(),
                "comment read returned an error status; substituting an empty list"
            );
            return Vec::new();
        }
        match resp.json::<Vec<Comment>>().await {
            Ok(comments) => comments,
            Err(err) => {
                tracing::warn!(%category, %product_id, error = %err, "comment list was unreadable; substituting an empty list");
                Vec::new()
            }
        }
    }

    /// Submit a comment; returns the stored record, sentiment included.
    pub async fn post(&self, comment: &NewComment) -> Result<Comment, GatewayError> {
        let resp = self
            .client
            .post(self.comments_url())
            .json(comment)
            .send()
            .await
            .map_err(GatewayError::network)?;

        if !resp.status().is_success() {
            return Err(GatewayError::api(resp).await);
        }
        resp.json::<Comment>().await.map_err(GatewayError::parse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submission_uses_the_wire_field_name() {
        let new_comment = NewComment {
            product_id: ProductId::new(12),
            category: Category::Books,
            text: "Loved it".to_string(),
            author: Some("ada".to_string()),
        };

        assert_eq!(
            serde_json::to_value(&new_comment).unwrap(),
            serde_json::json!({
                "product_id": 12,
                "category": "books",
                "comment": "Loved it",
                "author": "ada"
            })
        );
    }

    #[test]
    fn anonymous_submissions_omit_the_author() {
        let new_comment = NewComment {
            product_id: ProductId::new(12),
            category: Category::Books,
            text: "fine".to_string(),
            author: None,
        };

        let json = serde_json::to_value(&new_comment).unwrap();
        assert!(json.get("author").is_none());
    }

    #[test]
    fn stored_comments_parse_with_sentiment() {
        let raw = serde_json::json!({
            "id": 9,
            "product_id": 12,
            "category": "books",
            "author": "ada",
            "comment": "Loved it",
            "sentiment": "positive",
            "confidence": 0.97
        });

        let comment: Comment = serde_json::from_value(raw).unwrap();
        assert_eq!(comment.sentiment.as_deref(), Some("positive"));
        assert_eq!(comment.text, "Loved it");
    }
}
