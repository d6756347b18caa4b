use comfy_table::{presets, modifiers, Attribute, Cell, Color, Table};
use popcorn_core::WatchedSummary;
use popcorn_models::{MovieDetail, SearchResultItem, UserRating, WatchedEntry};
use owo_colors::OwoColorize;

fn styled_table(header: Vec<Cell>) -> Table {
    let mut table = Table::new();
    table.set_header(header);
    table.load_preset(presets::UTF8_FULL);
    table.apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table
}

fn bold(text: &str) -> Cell {
    Cell::new(text).add_attribute(Attribute::Bold)
}

pub fn num_results(count: usize) -> String {
    format!("Found {} results", count.to_string().bold())
}

pub fn results_table(items: &[SearchResultItem]) -> String {
    let mut table = styled_table(vec![bold("#"), bold("Title"), bold("🗓 Year"), bold("IMDb id")]);
    for (index, item) in items.iter().enumerate() {
        table.add_row(vec![
            Cell::new(index + 1),
            Cell::new(&item.title).fg(Color::Cyan),
            Cell::new(&item.year),
            Cell::new(&item.id).fg(Color::DarkGrey),
        ]);
    }
    table.to_string()
}

pub fn detail_pane(detail: &MovieDetail, rated: Option<UserRating>) -> String {
    let rating = detail
        .external_rating
        .map(|r| format!("{:.1}", r))
        .unwrap_or_else(|| "N/A".to_string());

    let mut lines = vec![
        format!("{}", detail.title.bright_cyan().bold()),
        format!("{} • {}", detail.release_date, detail.runtime_label()),
        detail.genre.clone(),
        format!("⭐️ {} IMDb rating", rating),
        String::new(),
    ];

    match rated {
        Some(user_rating) => lines.push(format!("You rated this movie {} ⭐️", user_rating.to_string().yellow())),
        None => lines.push(format!("{}", "Not rated yet".bright_black())),
    }

    lines.push(String::new());
    lines.push(format!("{}", detail.plot.italic()));
    lines.push(format!("Starring {}", detail.actors));
    lines.push(format!("Directed by {}", detail.director));
    lines.join("\n")
}

pub fn watched_table(entries: &[WatchedEntry]) -> String {
    let mut table = styled_table(vec![
        bold("Title"),
        bold("IMDb id"),
        bold("⭐️ IMDb"),
        bold("🌟 Yours"),
        bold("⏳ Runtime"),
    ]);
    for entry in entries {
        table.add_row(vec![
            Cell::new(&entry.title).fg(Color::Cyan),
            Cell::new(&entry.id).fg(Color::DarkGrey),
            Cell::new(entry.external_rating.map_or("N/A".to_string(), |r| format!("{:.1}", r))),
            Cell::new(entry.user_rating).fg(Color::Yellow),
            Cell::new(entry.runtime_minutes.map_or("N/A".to_string(), |m| format!("{} min", m))),
        ]);
    }
    table.to_string()
}

pub fn summary_table(summary: &WatchedSummary) -> String {
    let mut table = styled_table(vec![
        Cell::new("Movies you watched").fg(Color::Cyan).add_attribute(Attribute::Bold),
    ]);
    table.add_row(vec![Cell::new("#️⃣ Movies"), Cell::new(summary.count)]);
    table.add_row(vec![Cell::new("⭐️ Avg IMDb rating"), Cell::new(summary.external_rating_label())]);
    table.add_row(vec![Cell::new("🌟 Avg your rating"), Cell::new(summary.user_rating_label())]);
    table.add_row(vec![Cell::new("⏳ Avg runtime"), Cell::new(summary.runtime_label())]);
    table.to_string()
}

/// "abcdef12" -> "ab***12"
pub fn mask_secret(s: &str) -> String {
    if s.is_empty() {
        return "<not set>".to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{}***{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret(""), "<not set>");
        assert_eq!(mask_secret("abc"), "***");
        assert_eq!(mask_secret("abcdef12"), "ab***12");
    }

    #[test]
    fn test_results_table_numbers_rows() {
        let items = vec![
            SearchResultItem {
                id: "tt1".to_string(),
                title: "First".to_string(),
                year: "2001".to_string(),
                poster_url: "N/A".to_string(),
            },
            SearchResultItem {
                id: "tt2".to_string(),
                title: "Second".to_string(),
                year: "2002".to_string(),
                poster_url: "N/A".to_string(),
            },
        ];
        let rendered = results_table(&items);
        assert!(rendered.contains("First"));
        assert!(rendered.contains("tt2"));
        assert!(rendered.contains("2002"));
    }
}
