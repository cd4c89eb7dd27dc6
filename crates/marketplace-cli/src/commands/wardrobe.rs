use anyhow::Result;

use marketplace_core::models::{NewClosetItem, NewEvent, NewRecommendation};

use super::{or_dash, Context};

pub async fn closet(ctx: &Context) -> Result<()> {
    let items = ctx.api.closet().await?;
    if items.is_empty() {
        println!("Your closet is empty.");
    }
    for item in items {
        println!(
            "{:>5}  {:<28}  {:<12}  {:<10}  {}",
            item.id,
            item.name,
            or_dash(item.category.as_deref()),
            or_dash(item.color.as_deref()),
            or_dash(item.season.as_deref())
        );
    }
    Ok(())
}

pub async fn add_closet_item(ctx: &Context, item: &NewClosetItem) -> Result<()> {
    let created = ctx.api.add_closet_item(item).await?;
    println!("Added {} (#{}).", created.name, created.id);
    Ok(())
}

pub async fn remove_closet_items(ctx: &Context, ids: &[i64]) -> Result<()> {
    ctx.api.delete_closet_items(ids).await?;
    println!("Removed {} item(s).", ids.len());
    Ok(())
}

pub async fn events(ctx: &Context) -> Result<()> {
    let mut events = ctx.api.events().await?;
    // YYYY-MM-DD sorts chronologically as text; undated events last
    events.sort_by(|a, b| match (&a.date, &b.date) {
        (Some(x), Some(y)) => x.cmp(y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    for event in events {
        println!(
            "{:>5}  {:<10}  {:<28}  {:<20}  {}",
            event.id,
            or_dash(event.date.as_deref()),
            event.title,
            or_dash(event.location.as_deref()),
            or_dash(event.dress_code.as_deref())
        );
    }
    Ok(())
}

pub async fn add_event(ctx: &Context, event: &NewEvent) -> Result<()> {
    let created = ctx.api.create_event(event).await?;
    println!("Planned {} (#{}).", created.title, created.id);
    Ok(())
}

pub async fn remove_event(ctx: &Context, id: i64) -> Result<()> {
    ctx.api.delete_event(id).await?;
    println!("Removed event #{}.", id);
    Ok(())
}

pub async fn recommendations(ctx: &Context) -> Result<()> {
    let (recommendations, closet) =
        tokio::try_join!(ctx.api.recommendations(), ctx.api.closet())?;

    for recommendation in recommendations {
        let names: Vec<&str> = recommendation
            .items
            .iter()
            .map(|id| {
                closet
                    .iter()
                    .find(|item| item.id == *id)
                    .map(|item| item.name.as_str())
                    .unwrap_or("?")
            })
            .collect();
        let event = recommendation
            .event
            .map(|id| format!("event #{}", id))
            .unwrap_or_else(|| "no event".to_string());
        println!("{:>5}  [{}]  {}", recommendation.id, event, names.join(", "));
        if let Some(note) = recommendation.note.as_deref().filter(|n| !n.is_empty()) {
            println!("       {}", note);
        }
    }
    Ok(())
}

pub async fn create_recommendation(ctx: &Context, recommendation: &NewRecommendation) -> Result<()> {
    let created = ctx.api.create_recommendation(recommendation).await?;
    println!("Saved outfit #{} with {} item(s).", created.id, created.items.len());
    Ok(())
}

pub async fn remove_recommendation(ctx: &Context, id: i64) -> Result<()> {
    ctx.api.delete_recommendation(id).await?;
    println!("Removed outfit #{}.", id);
    Ok(())
}
