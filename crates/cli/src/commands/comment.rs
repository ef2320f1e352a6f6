//! Comment commands.

use shopfront_client::NewComment;
use shopfront_core::{Category, ProductId};

use crate::app::App;

/// `shopfront comment <category> <id> <text..>`
///
/// The author is the signed-in username when there is one; the service
/// attaches sentiment scoring on its side.
pub async fn post(
    app: &App,
    category: Category,
    id: ProductId,
    text: String,
) -> anyhow::Result<()> {
    let author = app
        .session
        .current()
        .map(|session| session.profile.username);

    let stored = app
        .comments
        .post(&NewComment {
            product_id: id,
            category,
            text,
            author,
        })
        .await?;

    match (stored.sentiment.as_deref(), stored.confidence) {
        (Some(sentiment), Some(confidence)) => {
            println!("comment posted (sentiment {sentiment}, confidence {confidence:.2})");
        }
        (Some(sentiment), None) => println!("comment posted (sentiment {sentiment})"),
        _ => println!("comment posted"),
    }
    Ok(())
}
