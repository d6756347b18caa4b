use serde::{Deserialize, Serialize};

/// One row of a title search. Replaced wholesale on every new query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResultItem {
    pub id: String, // IMDb id, e.g. "tt0372784"
    pub title: String,
    pub year: String, // Kept as text: series report ranges like "2008–2013"
    pub poster_url: String,
}

/// Full record for a single selected movie.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieDetail {
    pub id: String,
    pub title: String,
    pub year: String,
    pub poster_url: String,
    pub runtime_minutes: Option<u32>,
    pub external_rating: Option<f64>,
    pub plot: String,
    pub release_date: String,
    pub actors: String,
    pub director: String,
    pub genre: String,
}

impl MovieDetail {
    /// Runtime as the provider displays it ("148 min"), or "N/A".
    pub fn runtime_label(&self) -> String {
        match self.runtime_minutes {
            Some(minutes) => format!("{} min", minutes),
            None => "N/A".to_string(),
        }
    }
}
