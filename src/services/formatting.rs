//! Text helpers for article content: slugs, read time, excerpts and dates.

use chrono::{DateTime, Utc};

/// Longest slug produced by [`slugify`].
pub const MAX_SLUG_LEN: usize = 80;

/// Reading speed used by [`estimate_read_time`].
pub const WORDS_PER_MINUTE: usize = 200;

/// Derives a URL slug from a title.
///
/// Lowercase ASCII alphanumerics are kept; every other run of characters
/// becomes a single `-`. Never returns an empty string.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    if slug.len() > MAX_SLUG_LEN {
        slug.truncate(MAX_SLUG_LEN);
        while slug.ends_with('-') {
            slug.pop();
        }
    }

    if slug.is_empty() {
        "untitled".to_string()
    } else {
        slug
    }
}

/// Removes HTML tags, decodes common entities and collapses whitespace.
pub fn strip_html(content: &str) -> String {
    let mut text = String::with_capacity(content.len());
    let mut in_tag = false;

    for c in content.chars() {
        match c {
            '<' => {
                in_tag = true;
                text.push(' ');
            }
            '>' if in_tag => in_tag = false,
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }

    let decoded = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");

    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Minutes needed to read `content` (HTML allowed). At least 1.
pub fn estimate_read_time(content: &str) -> u32 {
    let words = strip_html(content).split_whitespace().count();
    let minutes = words.div_ceil(WORDS_PER_MINUTE);
    minutes.max(1) as u32
}

/// Plain-text excerpt of at most `max_chars` characters, cut at a word boundary.
pub fn make_excerpt(content: &str, max_chars: usize) -> String {
    let text = strip_html(content);
    if text.chars().count() <= max_chars {
        return text;
    }

    let mut out = String::new();
    for word in text.split(' ') {
        let extra = if out.is_empty() { 0 } else { 1 };
        if out.chars().count() + extra + word.chars().count() > max_chars {
            break;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }

    if out.is_empty() {
        // A single word longer than the limit.
        out = text.chars().take(max_chars).collect();
    }
    out.push('…');
    out
}

/// `October 19, 2026`.
pub fn format_date(dt: &DateTime<Utc>) -> String {
    dt.format("%B %-d, %Y").to_string()
}

/// Relative time for comment and list timestamps.
///
/// Falls back to [`format_date`] after 30 days and for future times.
pub fn format_relative(dt: &DateTime<Utc>, now: &DateTime<Utc>) -> String {
    let elapsed = *now - *dt;
    let secs = elapsed.num_seconds();

    if secs < 0 || elapsed.num_days() > 30 {
        return format_date(dt);
    }
    if secs < 60 {
        return "just now".to_string();
    }

    let (n, unit) = if elapsed.num_minutes() < 60 {
        (elapsed.num_minutes(), "minute")
    } else if elapsed.num_hours() < 24 {
        (elapsed.num_hours(), "hour")
    } else {
        (elapsed.num_days(), "day")
    };

    if n == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", n, unit)
    }
}
