use super::Spinner;
use crate::context::AppContext;
use crate::output::Output;
use crate::render;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use popcorn_core::SearchSession;
use popcorn_models::SessionState;
use serde_json::json;

pub async fn run_search(query: String, output: &Output) -> Result<()> {
    tracing::debug!(query = %query, "Search command started");

    let ctx = AppContext::load()?;
    let session = SearchSession::with_min_query_len(ctx.provider()?, ctx.config.search.min_query_len);

    if !session.is_searchable(&query) {
        output.warn(format!(
            "Type at least {} characters to search",
            session.min_query_len()
        ));
    }

    let state = {
        let _spinner = Spinner::start(output, format!("Searching for \"{}\"...", query));
        let mut handle = session.start_search(&query);
        tracing::debug!(generation = handle.generation(), "Waiting for search");
        handle.wait().await
    };

    match state {
        SessionState::Success(items) => {
            output.block(render::num_results(items.len()));
            if !items.is_empty() {
                output.block(render::results_table(&items));
            }
            output.json(&json!({ "query": query, "count": items.len(), "results": items }));
            Ok(())
        }
        SessionState::Error(message) => Err(eyre!(message)),
        SessionState::Idle | SessionState::Loading => Ok(()),
    }
}
