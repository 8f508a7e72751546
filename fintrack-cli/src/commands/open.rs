//! Open command - navigate to a client location through the guard

use anyhow::Result;
use colored::Colorize;
use fintrack_core::NavigationOutcome;

use super::get_context;
use crate::output;

pub async fn run(location: &str, json: bool) -> Result<()> {
    let ctx = get_context()?;

    let pb = output::spinner(&format!("Opening {}...", location), json);
    let outcome = ctx.navigator.navigate(location).await;
    pb.finish_and_clear();

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    match outcome {
        NavigationOutcome::Rendered { path } => {
            output::success(&format!("Showing {}", path));
        }
        NavigationOutcome::Redirected { location } => {
            output::warning("Sign-in required");
            println!("  Continue at: {}", location.bold());
            println!("  Or run: ft signin --redirect '{}'", location);
        }
        NavigationOutcome::NotFound { path } => {
            anyhow::bail!("No page at {}", path);
        }
    }

    Ok(())
}
