/// Lowercases, folds whitespace runs into `-` and strips everything
/// outside `[a-z0-9-_]`. An empty result becomes `item` so slugs keep
/// their two-segment shape.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;

    for ch in text.trim().chars() {
        if ch.is_whitespace() {
            pending_hyphen = !slug.is_empty();
            continue;
        }

        for lower in ch.to_lowercase() {
            if lower.is_ascii_alphanumeric() || lower == '-' || lower == '_' {
                if pending_hyphen {
                    slug.push('-');
                    pending_hyphen = false;
                }
                slug.push(lower);
            }
        }
    }

    let trimmed = slug.trim_matches(['-', '_']);
    if trimmed.is_empty() {
        "item".to_string()
    } else {
        trimmed.to_string()
    }
}

pub fn acronym(organizer: &str, event: &str) -> String {
    format!("{organizer}_{event}").to_lowercase()
}

/// Schedule slug for one sub-event. Normalized titles shorter than four
/// characters get the sub-event id appended to stay unique.
pub fn event_slug(organizer: &str, event: &str, title: &str, subevent_id: i64) -> String {
    let base = acronym(organizer, event);
    let mut second = slugify(title);
    if second.chars().count() < 4 {
        second = format!("{second}-{subevent_id}");
    }
    format!("{base}-{second}")
}

pub fn track_name(room: &str) -> String {
    let track = slugify(room);
    if track == "item" {
        "general".to_string()
    } else {
        track
    }
}
