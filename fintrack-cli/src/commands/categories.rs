//! Categories command - search categories by name

use anyhow::Result;
use colored::Colorize;
use dialoguer::Input;

use super::{get_context, require_session};
use crate::output;

pub async fn run(name: Option<String>, json: bool) -> Result<()> {
    let ctx = get_context()?;
    require_session(&ctx).await?;

    let name = match name {
        Some(name) => name,
        None if json => String::new(),
        None => Input::new()
            .with_prompt("Category name")
            .allow_empty(true)
            .interact_text()?,
    };

    let pb = output::spinner("Searching categories...", json);
    let result = ctx.categories.search(&name).await;
    pb.finish_and_clear();
    let categories = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&categories)?);
        return Ok(());
    }

    if categories.is_empty() {
        output::warning(&format!("No categories match '{}'", name.trim()));
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["ID", "Name", "Description", "Color"]);
    for category in &categories {
        table.add_row(vec![
            category.id.dimmed().to_string(),
            category.name.clone(),
            category.description.clone(),
            category.color.clone(),
        ]);
    }
    println!("{}", table);
    Ok(())
}
