//! Cart commands.
//!
//! Mutations go through the synchronizer and nothing else; the badge line
//! printed after each one is driven by the change notification, re-reading
//! the canonical cart the way the storefront header badge does.

use std::sync::Arc;

use anyhow::Context;

use shopfront_core::{Cart, CartLineItem, Category, CheckoutTotals, LineKey, ProductId};
use shopfront_events::Subscription;
use shopfront_sync::{AddItem, RemoveItem, UpdateQuantity};

use crate::app::App;
use crate::commands::CartCommand;
use crate::commands::browse::clipped;

pub async fn run(app: &App, command: CartCommand) -> anyhow::Result<()> {
    match command {
        CartCommand::Show => show(app),
        CartCommand::Add {
            category,
            id,
            quantity,
        } => add(app, category, id, quantity).await,
        CartCommand::Update {
            category,
            id,
            quantity,
        } => update(app, category, id, quantity).await,
        CartCommand::Remove { category, id } => remove(app, category, id).await,
        CartCommand::Clear => clear(app).await,
    }
}

fn show(app: &App) -> anyhow::Result<()> {
    print_cart(&app.cart.cart(), app.cart.totals());
    Ok(())
}

async fn add(app: &App, category: Category, id: ProductId, quantity: u32) -> anyhow::Result<()> {
    let draft = resolve_draft(app, category, id, quantity).await?;
    let _badge = badge_printer(app);
    let cart = app.cart.add_item(AddItem::new(draft)).await?;
    print_cart(&cart, CheckoutTotals::from_cart(&cart));
    Ok(())
}

async fn update(app: &App, category: Category, id: ProductId, quantity: i64) -> anyhow::Result<()> {
    let key = LineKey::new(id, category);
    let _badge = badge_printer(app);
    let cart = app
        .cart
        .update_quantity(UpdateQuantity::new(key, quantity))
        .await?;
    print_cart(&cart, CheckoutTotals::from_cart(&cart));
    Ok(())
}

async fn remove(app: &App, category: Category, id: ProductId) -> anyhow::Result<()> {
    let key = LineKey::new(id, category);
    let _badge = badge_printer(app);
    let cart = app.cart.remove_item(RemoveItem::new(key)).await?;
    print_cart(&cart, CheckoutTotals::from_cart(&cart));
    Ok(())
}

async fn clear(app: &App) -> anyhow::Result<()> {
    let _badge = badge_printer(app);
    app.cart.clear().await;
    println!("cart cleared");
    Ok(())
}

/// Cart drafts carry display data; the catalog is where it comes from.
async fn resolve_draft(
    app: &App,
    category: Category,
    id: ProductId,
    quantity: u32,
) -> anyhow::Result<CartLineItem> {
    let product = app
        .catalog
        .detail(category, id)
        .await
        .with_context(|| format!("{category}/{id} was not found in the catalog"))?;
    Ok(product.to_line_item(category, quantity))
}

/// Print the badge count on every committed mutation, from a re-read of
/// the canonical cart rather than from the notification.
fn badge_printer(app: &App) -> Subscription {
    let cart = Arc::clone(&app.cart);
    app.cart.subscribe(Box::new(move |change| {
        tracing::debug!(event = %change.event_id(), "cart change notification received");
        println!("cart badge: {} item(s)", cart.cart().item_count());
    }))
}

pub(crate) fn print_cart(cart: &Cart, totals: CheckoutTotals) {
    if cart.is_empty() {
        println!("the cart is empty");
        return;
    }
    for line in cart.items() {
        println!(
            "  {:<14}  {:<32}  {:>4} x {:>8.2}  = {:>9.2}",
            line.key().to_string(),
            clipped(&line.name, 32),
            line.quantity,
            line.unit_price.amount(),
            line.line_total()
        );
    }
    println!(
        "  subtotal {:.2}   shipping {:.2}   tax {:.2}   total {:.2}",
        totals.subtotal, totals.shipping, totals.tax, totals.total
    );
}
