use anyhow::Result;

use marketplace_core::models::{Cart, Product};
use marketplace_core::utils::format_price;
use marketplace_core::CartService;

use super::Context;

pub async fn show(ctx: &Context) -> Result<()> {
    let (cart, products) = tokio::try_join!(ctx.api.cart(), ctx.api.products())?;
    print_cart(&cart, &products);
    Ok(())
}

pub async fn set_quantity(ctx: &Context, product: i64, quantity: u32) -> Result<()> {
    let mut service = loaded_service(ctx).await?;
    service.set_quantity(product, quantity).await?;
    print_updated(ctx, service.cart(), product).await
}

pub async fn increment(ctx: &Context, product: i64) -> Result<()> {
    let mut service = loaded_service(ctx).await?;
    service.increment(product).await?;
    print_updated(ctx, service.cart(), product).await
}

pub async fn decrement(ctx: &Context, product: i64) -> Result<()> {
    let mut service = loaded_service(ctx).await?;
    service.decrement(product).await?;
    print_updated(ctx, service.cart(), product).await
}

pub async fn orders(ctx: &Context) -> Result<()> {
    let orders = ctx.api.orders().await?;
    if orders.is_empty() {
        println!("No orders yet.");
    }
    for order in orders {
        let placed = order
            .created_at
            .map(|at| at.format("%b %d, %Y").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "#{:<6} {:<14} {:<10} {:>10}  ({} line(s))",
            order.id,
            placed,
            order.status.as_deref().unwrap_or("-"),
            order.total.as_deref().map(format_price).unwrap_or_default(),
            order.items.len()
        );
    }
    Ok(())
}

async fn loaded_service(ctx: &Context) -> Result<CartService> {
    let mut service = CartService::new(ctx.api.clone());
    service.reload().await?;
    Ok(service)
}

async fn print_updated(ctx: &Context, cart: &Cart, product: i64) -> Result<()> {
    println!("Product {} quantity is now {}.", product, cart.quantity_of(product));
    let products = ctx.api.products().await?;
    print_cart(cart, &products);
    Ok(())
}

fn print_cart(cart: &Cart, products: &[Product]) {
    if cart.is_empty() {
        println!("Your cart is empty.");
        return;
    }

    let mut total = 0.0;
    for item in &cart.cart_items {
        let product = products.iter().find(|p| p.id == item.product);
        let name = product.map(|p| p.name.as_str()).unwrap_or("Unknown product");
        let line = product
            .and_then(|p| p.price_value())
            .map(|price| price * f64::from(item.quantity));
        total += line.unwrap_or(0.0);
        println!(
            "{:>5}  {:<32}  x{:<3} {:>10}",
            item.product,
            name,
            item.quantity,
            line.map(|l| format!("${:.2}", l)).unwrap_or_default()
        );
    }
    println!("{:>56}", format!("Total: ${:.2}", total));
}
