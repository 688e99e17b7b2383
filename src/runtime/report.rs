use std::time::Duration;

use crate::item::VideoItem;

const MISSING: &str = "-";

/// One tab-separated listing line: title, duration, size, director, genre, actors.
pub fn item_line(item: &VideoItem) -> String {
    let duration = item
        .duration()
        .map(format_duration)
        .unwrap_or_else(|| MISSING.to_string());
    let size = match (item.width(), item.height()) {
        (Some(w), Some(h)) if w > 0 && h > 0 => format!("{w}x{h}"),
        _ => MISSING.to_string(),
    };
    let director = item.director().unwrap_or(MISSING);
    let genre = item.genre().unwrap_or(MISSING);
    let actors = match item.actors() {
        Some(actors) if !actors.is_empty() => actors.join(", "),
        _ => MISSING.to_string(),
    };

    [
        item.display_title(),
        duration,
        size,
        director.to_string(),
        genre.to_string(),
        actors,
    ]
    .join("\t")
}

/// `h:mm:ss`, or `m:ss` under an hour.
fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m}:{s:02}")
    }
}
