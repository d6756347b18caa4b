use super::prompts;
use super::show::load_detail;
use crate::context::AppContext;
use crate::output::Output;
use crate::render;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use popcorn_core::WatchedSummary;
use popcorn_models::{UserRating, WatchedEntry};
use serde_json::json;

pub async fn run_add(id: String, rating: Option<u8>, output: &Output) -> Result<()> {
    let ctx = AppContext::load()?;
    let mut store = ctx.watched_store()?;

    if let Some(existing) = store.user_rating(&id) {
        output.warn(format!("{} is already in your list, rated {}", id, existing));
        return Ok(());
    }

    // Validate a rating given on the command line before touching the network
    let rating = rating
        .map(|value| UserRating::try_from(value).map_err(|e| eyre!(e)))
        .transpose()?;

    let detail = load_detail(ctx.provider()?, &id, output).await?;
    output.block(render::detail_pane(&detail, None));

    let rating = match rating {
        Some(rating) => rating,
        None => prompts::prompt_rating("Your rating (1-10)")?,
    };

    let entry = WatchedEntry::from_detail(&detail, rating);
    if store
        .add(entry.clone())
        .map_err(|e| eyre!("Failed to save watched list: {}", e))?
    {
        output.success(format!("Added {} to your list with rating {}", detail.title, rating));
        output.json(&json!({ "added": entry }));
    } else {
        output.warn(format!("{} is already in your list", detail.title));
    }
    Ok(())
}

pub async fn run_remove(id: String, output: &Output) -> Result<()> {
    let ctx = AppContext::load()?;
    let mut store = ctx.watched_store()?;

    let title = store.get(&id).map(|entry| entry.title.clone());
    let removed = store
        .remove(&id)
        .map_err(|e| eyre!("Failed to save watched list: {}", e))?;

    match title {
        Some(title) if removed => output.success(format!("Removed {} from your list", title)),
        _ => output.warn(format!("{} is not in your list", id)),
    }
    output.json(&json!({ "id": id, "removed": removed }));
    Ok(())
}

pub async fn run_list(output: &Output) -> Result<()> {
    let ctx = AppContext::load()?;
    let store = ctx.watched_store()?;
    let summary = WatchedSummary::from_entries(store.entries());

    output.block(render::summary_table(&summary));
    if store.is_empty() {
        output.info("Your watched list is empty. Add a movie with `popcorn add <id>`.");
    } else {
        output.block(render::watched_table(store.entries()));
    }
    output.json(&json!({ "summary": summary, "watched": store.entries() }));
    Ok(())
}

pub async fn run_summary(output: &Output) -> Result<()> {
    let ctx = AppContext::load()?;
    let store = ctx.watched_store()?;
    let summary = WatchedSummary::from_entries(store.entries());

    output.block(render::summary_table(&summary));
    output.json(&json!({
        "count": summary.count,
        "avg_imdb_rating": summary.external_rating_label(),
        "avg_user_rating": summary.user_rating_label(),
        "avg_runtime": summary.runtime_label(),
    }));
    Ok(())
}
