//! Catalog commands.

use shopfront_core::{Category, ProductId};

use crate::app::App;

/// `shopfront browse <category>`
pub async fn list(app: &App, category: Category) -> anyhow::Result<()> {
    let products = app.catalog.list(category).await;
    if products.is_empty() {
        println!("no {category} right now");
        return Ok(());
    }

    println!("{:>6}  {:<40}  {:>10}  {:>6}", "id", "name", "price", "stock");
    for product in &products {
        println!(
            "{:>6}  {:<40}  {:>10.2}  {:>6}",
            product.id.to_string(),
            clipped(&product.name, 40),
            product.price,
            product.stock
        );
    }
    Ok(())
}

/// `shopfront show <category> <id>`
pub async fn show(app: &App, category: Category, id: ProductId) -> anyhow::Result<()> {
    let Some(product) = app.catalog.detail(category, id).await else {
        anyhow::bail!("{category}/{id} was not found");
    };

    println!("{} ({category}/{})", product.name, product.id);
    println!("price {:.2}, {} in stock", product.price, product.stock);
    let attributes = &product.attributes;
    for (label, value) in [
        ("author", &attributes.author),
        ("isbn", &attributes.isbn),
        ("size", &attributes.size),
        ("color", &attributes.color),
        ("material", &attributes.material),
        ("brand", &attributes.brand),
        ("model", &attributes.model),
        ("os", &attributes.os),
    ] {
        if let Some(value) = value {
            println!("{label}: {value}");
        }
    }
    if !product.description.is_empty() {
        println!("\n{}", product.description);
    }

    let comments = app.comments.list(category, id).await;
    if !comments.is_empty() {
        println!("\ncomments:");
        for comment in &comments {
            let author = comment.author.as_deref().unwrap_or("anonymous");
            match comment.sentiment.as_deref() {
                Some(sentiment) => println!("  [{sentiment}] {author}: {}", comment.text),
                None => println!("  {author}: {}", comment.text),
            }
        }
    }
    Ok(())
}

/// Trim long names so table columns stay aligned.
pub(crate) fn clipped(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(3)).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_names_pass_through_unclipped() {
        assert_eq!(clipped("Dune", 40), "Dune");
    }

    #[test]
    fn long_names_are_clipped_to_the_column_width() {
        let clipped = clipped("a very long product name indeed", 10);
        assert_eq!(clipped, "a very ...");
        assert_eq!(clipped.chars().count(), 10);
    }
}
