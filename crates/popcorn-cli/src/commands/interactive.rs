use crate::context::AppContext;
use crate::output::Output;
use crate::render;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use popcorn_core::{Key, KeyValueStore, Popcorn, Snapshot};
use popcorn_models::{MovieDetail, SearchResultItem, SessionState, UserRating};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

const HELP: &str = "\
Type a movie title to search. Commands:
  :open N | :open ID   open result N (or a movie by IMDb id); again to close
  :rate N              rate the open movie 1-10 and add it to your list
  :esc                 close the open movie
  :rm ID               remove a movie from your list
  :list                show your watched list
  :help                show this help
  :quit                leave";

#[derive(Debug, Clone, PartialEq, Eq)]
enum OpenTarget {
    Index(usize),
    Id(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Input {
    Query(String),
    Open(OpenTarget),
    Rate(u8),
    Escape,
    Remove(String),
    List,
    Help,
    Quit,
    Empty,
    Invalid(String),
}

fn parse_input(line: &str) -> Input {
    let Some(command) = line.trim_start().strip_prefix(':') else {
        if line.trim().is_empty() {
            return Input::Empty;
        }
        return Input::Query(line.to_string());
    };

    let mut parts = command.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let arg = parts.next();

    match (name, arg) {
        ("open" | "o", Some(arg)) => match arg.parse::<usize>() {
            Ok(index) => Input::Open(OpenTarget::Index(index)),
            Err(_) => Input::Open(OpenTarget::Id(arg.to_string())),
        },
        ("rate" | "r", Some(arg)) => match arg.parse::<u8>() {
            Ok(value) => Input::Rate(value),
            Err(_) => Input::Invalid(format!("Not a rating: {}", arg)),
        },
        ("rm" | "remove", Some(id)) => Input::Remove(id.to_string()),
        ("esc" | "escape" | "close", None) => Input::Escape,
        ("list" | "ls", None) => Input::List,
        ("help" | "h" | "?", None) => Input::Help,
        ("quit" | "q" | "exit", None) => Input::Quit,
        ("open" | "o" | "rate" | "r" | "rm" | "remove", None) => {
            Input::Invalid(format!(":{} needs an argument", name))
        }
        _ => Input::Invalid(format!("Unknown command :{}", command.trim())),
    }
}

pub async fn run_interactive(output: &Output) -> Result<()> {
    let ctx = AppContext::load()?;
    let mut app = ctx.app()?;

    let mut search_rx = app.search().subscribe();
    let mut detail_rx = app.detail().subscribe();
    let mut title_rx = app.title_bar().subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut results: Vec<SearchResultItem> = Vec::new();

    output.info(format!("🍿 {}", app.title_bar().current()));
    output.info(HELP);
    output.block(render::summary_table(&app.summary()));
    output.prompt("> ")?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                let input = parse_input(&line);
                debug!(?input, "Interactive input");
                if input == Input::Quit {
                    break;
                }
                handle_input(&mut app, input, &results, output)?;
            }
            Ok(()) = search_rx.changed() => {
                let snapshot = search_rx.borrow_and_update().clone();
                results = listed_results(&snapshot.state);
                render_search(&snapshot, output);
            }
            Ok(()) = detail_rx.changed() => {
                let snapshot = detail_rx.borrow_and_update().clone();
                if app.refresh_view() {
                    render_detail(&app, &snapshot, output);
                }
            }
            Ok(()) = title_rx.changed() => {
                let title = title_rx.borrow_and_update().clone();
                output.info(format!("🍿 {}", title));
            }
        }
        output.prompt("> ")?;
    }

    app.search().reset();
    app.close_movie();
    Ok(())
}

fn handle_input<S: KeyValueStore>(
    app: &mut Popcorn<S>,
    input: Input,
    results: &[SearchResultItem],
    output: &Output,
) -> Result<()> {
    match input {
        Input::Query(query) => {
            if !app.search().is_searchable(&query) {
                output.warn(format!(
                    "Type at least {} characters to search",
                    app.search().min_query_len()
                ));
            }
            app.set_query(&query);
        }
        Input::Open(target) => {
            let id = match target {
                OpenTarget::Id(id) => id,
                OpenTarget::Index(index) => match index.checked_sub(1).and_then(|i| results.get(i)) {
                    Some(item) => item.id.clone(),
                    None => {
                        output.warn(format!("No result #{}", index));
                        return Ok(());
                    }
                },
            };
            if app.select_movie(&id).is_none() {
                output.info(format!("Closed {}", id));
            }
        }
        Input::Rate(value) => rate_open_movie(app, value, output)?,
        Input::Escape => {
            if app.selected_id().is_none() {
                output.info("No movie open");
                return Ok(());
            }
            app.keys().press(Key::Escape);
            if !app.refresh_view() {
                output.info("Closed movie");
            }
        }
        Input::Remove(id) => {
            let removed = app
                .remove_watched(&id)
                .map_err(|e| eyre!("Failed to save watched list: {}", e))?;
            if removed {
                output.success(format!("Removed {} from your list", id));
                output.block(render::summary_table(&app.summary()));
            } else {
                output.warn(format!("{} is not in your list", id));
            }
        }
        Input::List => {
            output.block(render::summary_table(&app.summary()));
            if !app.watched().is_empty() {
                output.block(render::watched_table(app.watched()));
            }
        }
        Input::Help => output.info(HELP),
        Input::Invalid(message) => output.warn(message),
        Input::Empty | Input::Quit => {}
    }
    Ok(())
}

fn rate_open_movie<S: KeyValueStore>(app: &mut Popcorn<S>, value: u8, output: &Output) -> Result<()> {
    let Some(detail) = app.selected_detail() else {
        output.warn("Open a movie and wait for its details first");
        return Ok(());
    };

    if let Some(existing) = app.watched_rating(&detail.id) {
        output.warn(format!("You already rated {} with {}", detail.title, existing));
        return Ok(());
    }

    let rating = match UserRating::try_from(value) {
        Ok(rating) => rating,
        Err(message) => {
            output.warn(message);
            return Ok(());
        }
    };

    let added = app
        .add_watched(&detail, rating)
        .map_err(|e| eyre!("Failed to save watched list: {}", e))?;
    if added {
        output.success(format!("Added {} to your list with rating {}", detail.title, rating));
        output.block(render::summary_table(&app.summary()));
    }
    Ok(())
}

/// Results `:open N` can pick from. Only a successful search lists any.
fn listed_results(state: &SessionState<Vec<SearchResultItem>>) -> Vec<SearchResultItem> {
    state.value().cloned().unwrap_or_default()
}

fn render_search(snapshot: &Snapshot<Vec<SearchResultItem>>, output: &Output) {
    match &snapshot.state {
        SessionState::Loading => output.info("Loading..."),
        SessionState::Success(items) => {
            output.block(render::num_results(items.len()));
            if !items.is_empty() {
                output.block(render::results_table(items));
            }
        }
        SessionState::Error(message) => output.error(message),
        SessionState::Idle => {}
    }
}

fn render_detail<S: KeyValueStore>(app: &Popcorn<S>, snapshot: &Snapshot<MovieDetail>, output: &Output) {
    match &snapshot.state {
        SessionState::Loading => output.info("Loading..."),
        SessionState::Success(detail) => {
            let rated = app.watched_rating(&detail.id);
            output.block(render::detail_pane(detail, rated));
            if rated.is_none() {
                output.info("Rate it with :rate N, close with :esc");
            }
        }
        SessionState::Error(message) => output.error(message),
        SessionState::Idle => {}
    }
}
