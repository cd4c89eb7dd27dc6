use std::io::{self, Write};

use anyhow::Result;
use tracing::warn;

use marketplace_core::models::ProfileUpdate;
use marketplace_core::validation::SignupForm;

use super::Context;

pub async fn login(ctx: &Context, username: Option<String>) -> Result<()> {
    let username = match username {
        Some(username) => username,
        None => prompt_username(ctx.config.last_username.as_deref())?,
    };
    if username.is_empty() {
        anyhow::bail!("Username is required");
    }
    let password = rpassword::prompt_password("Password: ")?;

    ctx.api.login(&username, &password).await?;
    remember_username(ctx, &username);

    println!("Signed in as {}.", username);
    Ok(())
}

pub async fn google_login(ctx: &Context, id_token: &str) -> Result<()> {
    ctx.api.google_login(id_token.trim()).await?;
    println!("Signed in with Google.");
    Ok(())
}

pub async fn signup(ctx: &Context, username: String, email: String) -> Result<()> {
    let password = rpassword::prompt_password("Password: ")?;
    let password_confirmation = rpassword::prompt_password("Confirm password: ")?;
    let form = SignupForm {
        username,
        email,
        password,
        password_confirmation,
    };

    // Field errors come back as ApiError::Validation before anything is sent
    ctx.api.register(&form).await?;
    remember_username(ctx, form.username.trim());

    println!("Account created. Signed in as {}.", form.username.trim());
    Ok(())
}

pub fn logout(ctx: &Context) -> Result<()> {
    ctx.api.logout()?;
    println!("Signed out.");
    Ok(())
}

pub async fn whoami(ctx: &Context) -> Result<()> {
    let profile = ctx.api.me().await?;
    println!("{} ({})", profile.display_name(), profile.username);
    if !profile.email.is_empty() {
        println!("{}", profile.email);
    }

    // The wardrobe profile is optional; accounts without one still print
    match ctx.api.wardrobe_profile().await {
        Ok(wardrobe) => {
            if let Some(style) = wardrobe.style_preferences.filter(|s| !s.trim().is_empty()) {
                println!("Style: {}", style);
            }
            if let Some(bio) = wardrobe.bio.filter(|b| !b.trim().is_empty()) {
                println!("{}", bio);
            }
        }
        Err(e) => warn!(error = %e, "Could not load wardrobe profile"),
    }
    Ok(())
}

pub async fn update_profile(
    ctx: &Context,
    email: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
) -> Result<()> {
    let update = ProfileUpdate {
        email,
        first_name,
        last_name,
    };
    if update.is_empty() {
        anyhow::bail!("Nothing to update - pass --email, --first-name or --last-name");
    }

    let profile = ctx.api.update_me(&update).await?;
    println!("Updated profile for {}.", profile.display_name());
    Ok(())
}

fn prompt_username(last_username: Option<&str>) -> Result<String> {
    match last_username {
        Some(last) => print!("Username [{}]: ", last),
        None => print!("Username: "),
    }
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim();

    Ok(match (input.is_empty(), last_username) {
        (true, Some(last)) => last.to_string(),
        _ => input.to_string(),
    })
}

fn remember_username(ctx: &Context, username: &str) {
    let mut config = ctx.config.clone();
    config.last_username = Some(username.to_string());
    if let Err(e) = config.save() {
        warn!(error = %e, "Failed to save config");
    }
}
