use popcorn_models::{MovieDetail, SearchResultItem};
use serde::Deserialize;
use tracing::debug;
use crate::error::SourceError;

#[derive(Debug, Deserialize)]
struct OmdbSearchResponse {
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Search", default)]
    search: Vec<OmdbSearchItem>,
    #[serde(rename = "Error")]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OmdbSearchItem {
    #[serde(rename = "imdbID")]
    imdb_id: String,
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "Year", default)]
    year: String,
    #[serde(rename = "Poster", default)]
    poster: String,
}

#[derive(Debug, Deserialize)]
struct OmdbDetail {
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Error")]
    error: Option<String>,
    #[serde(rename = "imdbID", default)]
    imdb_id: String,
    #[serde(rename = "Title", default)]
    title: String,
    #[serde(rename = "Year", default)]
    year: String,
    #[serde(rename = "Poster", default)]
    poster: String,
    #[serde(rename = "Runtime", default)]
    runtime: String,
    #[serde(rename = "imdbRating", default)]
    imdb_rating: String,
    #[serde(rename = "Plot", default)]
    plot: String,
    #[serde(rename = "Released", default)]
    released: String,
    #[serde(rename = "Actors", default)]
    actors: String,
    #[serde(rename = "Director", default)]
    director: String,
    #[serde(rename = "Genre", default)]
    genre: String,
}

fn is_success(response: &str) -> bool {
    response.eq_ignore_ascii_case("true")
}

/// "148 min" -> 148. "N/A" and anything else unparsable -> None.
pub fn parse_runtime(runtime: &str) -> Option<u32> {
    runtime.split_whitespace().next()?.parse().ok()
}

/// "8.2" -> 8.2. "N/A" -> None.
pub fn parse_rating(rating: &str) -> Option<f64> {
    rating.trim().parse::<f64>().ok().filter(|r| r.is_finite())
}

pub fn parse_search(body: &str) -> Result<Vec<SearchResultItem>, SourceError> {
    let parsed: OmdbSearchResponse = serde_json::from_str(body).map_err(SourceError::Decode)?;

    if !is_success(&parsed.response) {
        debug!(
            provider_error = parsed.error.as_deref().unwrap_or_default(),
            "OMDb search returned no results"
        );
        return Err(SourceError::NotFound);
    }

    Ok(parsed
        .search
        .into_iter()
        .map(|item| SearchResultItem {
            id: item.imdb_id,
            title: item.title,
            year: item.year,
            poster_url: item.poster,
        })
        .collect())
}

pub fn parse_detail(body: &str) -> Result<MovieDetail, SourceError> {
    let parsed: OmdbDetail = serde_json::from_str(body).map_err(SourceError::Decode)?;

    if !is_success(&parsed.response) {
        debug!(
            provider_error = parsed.error.as_deref().unwrap_or_default(),
            "OMDb detail lookup failed"
        );
        return Err(SourceError::NotFound);
    }

    Ok(MovieDetail {
        runtime_minutes: parse_runtime(&parsed.runtime),
        external_rating: parse_rating(&parsed.imdb_rating),
        id: parsed.imdb_id,
        title: parsed.title,
        year: parsed.year,
        poster_url: parsed.poster,
        plot: parsed.plot,
        release_date: parsed.released,
        actors: parsed.actors,
        director: parsed.director,
        genre: parsed.genre,
    })
}
