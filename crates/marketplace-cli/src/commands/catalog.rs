use anyhow::Result;

use marketplace_core::catalog::{ProductQuery, RecipeQuery};
use marketplace_core::utils::truncate_string;

use super::{or_dash, Context};

/// Width of the name column in listings
const NAME_WIDTH: usize = 32;

pub async fn products(ctx: &Context, query: &ProductQuery) -> Result<()> {
    let products = ctx.api.products().await?;
    let selected = query.apply(&products);

    if selected.is_empty() {
        println!("No products found.");
        return Ok(());
    }
    for product in selected {
        println!(
            "{:>5}  {:<width$}  {:>14}{}",
            product.id,
            truncate_string(&product.name, NAME_WIDTH),
            product.display_price(),
            if product.in_stock() { "" } else { "  (out of stock)" },
            width = NAME_WIDTH
        );
    }
    Ok(())
}

pub async fn categories(ctx: &Context) -> Result<()> {
    for category in ctx.api.categories().await? {
        println!("{:>5}  {}", category.id, category.name);
    }
    Ok(())
}

pub async fn recipes(ctx: &Context, query: &RecipeQuery) -> Result<()> {
    let (recipes, categories) = tokio::try_join!(ctx.api.recipes(), ctx.api.recipe_categories())?;

    for recipe in query.apply(&recipes) {
        let category = recipe
            .category
            .and_then(|id| categories.iter().find(|c| c.id == id))
            .map(|c| c.name.as_str());
        println!(
            "{:>5}  {:<width$}  {}",
            recipe.id,
            truncate_string(&recipe.name, NAME_WIDTH),
            or_dash(category),
            width = NAME_WIDTH
        );
    }
    Ok(())
}

pub async fn overview(ctx: &Context) -> Result<()> {
    let storefront = ctx.api.load_storefront().await?;

    println!("Signed in as {}", storefront.profile.display_name());
    println!(
        "{} products in {} categories, {} recipes",
        storefront.products.len(),
        storefront.categories.len(),
        storefront.recipes.len()
    );
    println!("Cart: {} item(s)", storefront.cart.total_quantity());
    for item in &storefront.cart.cart_items {
        let name = storefront
            .product(item.product)
            .map(|p| p.name.as_str())
            .unwrap_or("Unknown product");
        let category = storefront.category_name(storefront.product(item.product).and_then(|p| p.category));
        println!("  {} x {} [{}]", item.quantity, name, or_dash(category));
    }
    Ok(())
}
