//! Signin / signout commands

use anyhow::{anyhow, bail, Context, Result};
use colored::Colorize;
use dialoguer::Input;
use fintrack_core::config::Config;
use fintrack_core::domain::navigation::{split_location, REDIRECT_PARAM};
use fintrack_core::NavigationIntent;
use serde_json::json;

use super::{get_context, get_fintrack_dir};
use crate::output;

pub async fn run(cookie: Option<String>, redirect: Option<String>, json: bool) -> Result<()> {
    let fintrack_dir = get_fintrack_dir()?;
    std::fs::create_dir_all(&fintrack_dir)
        .with_context(|| format!("Failed to create fintrack directory: {:?}", fintrack_dir))?;

    let mut ctx = get_context()?;
    let intent = redirect
        .as_deref()
        .map(|r| parse_redirect(r, &ctx.config.sign_in_path))
        .transpose()?
        .flatten();

    if !ctx.config.demo_mode {
        let cookie = match cookie {
            Some(cookie) => Some(cookie),
            None if ctx.config.session_cookie.is_some() => None,
            None => {
                output::info("Sign in with Google in your browser:");
                println!("  {}", ctx.sign_in.authorization_url().bold());
                println!();
                Some(
                    Input::<String>::new()
                        .with_prompt("Paste the session cookie (name=value)")
                        .interact_text()?,
                )
            }
        };

        if let Some(cookie) = cookie {
            // Persist only what is on disk so env overrides are not written back
            let mut settings = Config::load_file(&fintrack_dir)?;
            settings.set_session_cookie(cookie.trim());
            settings.save(&fintrack_dir)?;
            ctx = get_context()?;
        }
    }

    let pb = output::spinner("Confirming session...", json);
    let result = ctx.sign_in.complete(intent).await;
    pb.finish_and_clear();

    let signed_in = match result {
        Ok(signed_in) => signed_in,
        Err(e) if e.is_unauthorized() => bail!(
            "The server did not accept the session. Sign in again at {}",
            ctx.sign_in.authorization_url()
        ),
        Err(e) => return Err(e).context("Could not confirm the session"),
    };

    if json {
        let value = json!({
            "identity": signed_in.identity,
            "destination": signed_in.destination,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    output::success(&format!("Signed in as {}", signed_in.identity.display_name()));
    println!("  Email: {}", signed_in.identity.email);
    println!("  Continue at: {}", signed_in.destination.bold());
    Ok(())
}

pub fn run_signout() -> Result<()> {
    let fintrack_dir = get_fintrack_dir()?;
    let mut settings = Config::load_file(&fintrack_dir)?;

    if settings.session_cookie.is_none() {
        output::warning("No stored session");
        return Ok(());
    }

    settings.clear_session_cookie();
    settings.save(&fintrack_dir)?;
    output::success("Signed out");
    Ok(())
}

/// Accept either a plain path or a full sign-in location
///
/// A sign-in location without a `redirect` parameter carries no intent, so
/// sign-in falls back to the dashboard.
fn parse_redirect(value: &str, sign_in_path: &str) -> Result<Option<NavigationIntent>> {
    let (path, query) = split_location(value);
    if path == sign_in_path {
        let query = query.unwrap_or_default();
        let has_redirect = query
            .trim_start_matches('?')
            .split('&')
            .any(|pair| pair.split('=').next() == Some(REDIRECT_PARAM));
        if !has_redirect {
            return Ok(None);
        }
        return NavigationIntent::from_search_query(query)
            .map(Some)
            .ok_or_else(|| anyhow!("No usable redirect in '{}'", value));
    }
    if value.starts_with('/') && !value.starts_with("//") {
        return Ok(Some(NavigationIntent::new(value)));
    }
    bail!("Redirect must be a path on this site, like /dashboard")
}
