use super::Spinner;
use crate::context::AppContext;
use crate::output::Output;
use crate::render;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use popcorn_core::DetailSession;
use popcorn_models::{MovieDetail, SessionState};
use popcorn_sources::MovieProvider;
use serde_json::json;
use std::sync::Arc;

/// Fetch one movie, with a spinner while it loads.
pub async fn load_detail(provider: Arc<dyn MovieProvider>, id: &str, output: &Output) -> Result<MovieDetail> {
    let session = DetailSession::new(provider);
    let state = {
        let _spinner = Spinner::start(output, "Loading...");
        let mut handle = session.fetch_detail(id);
        tracing::debug!(id, generation = handle.generation(), "Waiting for details");
        handle.wait().await
    };

    match state {
        SessionState::Success(detail) => Ok(detail),
        SessionState::Error(message) => Err(eyre!(message)),
        SessionState::Idle | SessionState::Loading => Err(eyre!("Detail request for {} did not complete", id)),
    }
}

pub async fn run_show(id: String, output: &Output) -> Result<()> {
    let ctx = AppContext::load()?;
    let store = ctx.watched_store()?;
    let detail = load_detail(ctx.provider()?, &id, output).await?;
    let rated = store.user_rating(&detail.id);

    output.block(render::detail_pane(&detail, rated));
    output.json(&json!({
        "movie": detail,
        "user_rating": rated.map(|r| r.value()),
    }));
    Ok(())
}
