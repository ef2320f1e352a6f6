//! Checkout: order placement, payment, then emptying the cart.

use anyhow::Context;

use shopfront_client::PaymentMethod;

use crate::app::App;

/// `shopfront checkout [--method <method>]`
///
/// The order is placed for the canonical cart as it stands. Payment
/// failure after a placed order is surfaced as an error with the order id
/// so it can be retried out of band; the cart is only emptied once both
/// steps succeeded.
pub async fn run(app: &App, method: PaymentMethod) -> anyhow::Result<()> {
    let cart = app.cart.cart();
    if cart.is_empty() {
        anyhow::bail!("the cart is empty; add something before checking out");
    }
    let totals = app.cart.totals();
    let owner = app.session.owner();

    let order_id = app
        .orders
        .place_order(owner, &cart)
        .await
        .context("order placement failed")?;
    app.payments
        .submit_payment(owner, order_id, method)
        .await
        .with_context(|| format!("payment for order {order_id} failed"))?;

    app.cart.clear().await;

    println!("order {order_id} placed and paid by {method}");
    println!(
        "subtotal {:.2}   shipping {:.2}   tax {:.2}   total {:.2}",
        totals.subtotal, totals.shipping, totals.tax, totals.total
    );
    Ok(())
}
