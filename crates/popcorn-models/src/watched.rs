use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::movie::MovieDetail;
use crate::rating::UserRating;

/// A rated movie in the watched list.
///
/// Field names on disk follow the layout the web app wrote to local storage,
/// so an exported `watchedMovies` value loads unchanged. Unknown runtimes and
/// ratings are stored as `null`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchedEntry {
    #[serde(rename = "imdbID")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub year: String,
    #[serde(rename = "poster", default)]
    pub poster_url: String,
    #[serde(rename = "runtime", default)]
    pub runtime_minutes: Option<u32>,
    #[serde(rename = "imdbRating", default)]
    pub external_rating: Option<f64>,
    #[serde(rename = "userRating")]
    pub user_rating: UserRating,
    #[serde(rename = "addedAt", default, skip_serializing_if = "Option::is_none")]
    pub added_at: Option<DateTime<Utc>>,
}

impl WatchedEntry {
    pub fn from_detail(detail: &MovieDetail, user_rating: UserRating) -> Self {
        Self {
            id: detail.id.clone(),
            title: detail.title.clone(),
            year: detail.year.clone(),
            poster_url: detail.poster_url.clone(),
            runtime_minutes: detail.runtime_minutes,
            external_rating: detail.external_rating,
            user_rating,
            added_at: Some(Utc::now()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_web_app_layout() {
        let json = r#"[{"imdbID":"tt0372784","year":"2005","title":"Batman Begins",
            "poster":"https://example.com/p.jpg","runtime":140,"imdbRating":8.2,"userRating":9}]"#;
        let entries: Vec<WatchedEntry> = serde_json::from_str(json).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, "tt0372784");
        assert_eq!(entries[0].runtime_minutes, Some(140));
        assert_eq!(entries[0].external_rating, Some(8.2));
        assert_eq!(entries[0].user_rating.value(), 9);
        assert!(entries[0].added_at.is_none());
    }

    #[test]
    fn test_unknown_numbers_are_null() {
        // The web app stored NaN for "N/A", which JSON.stringify turns into null
        let json = r#"{"imdbID":"tt1","title":"Obscure","runtime":null,"imdbRating":null,"userRating":3}"#;
        let entry: WatchedEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.runtime_minutes, None);
        assert_eq!(entry.external_rating, None);

        let written = serde_json::to_value(&entry).unwrap();
        assert!(written["runtime"].is_null());
        assert!(written.get("addedAt").is_none());
    }
}
