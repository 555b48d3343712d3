//! Signal detectors
//!
//! Each detector reads the shared [`Homepage`](crate::page::Homepage) snapshot
//! and returns its finding as a value. Follow-up requests go through the
//! [`ProbeClient`](crate::probe::ProbeClient); a failed probe means the signal
//! is absent and is never propagated as an error.

pub mod metadata;
pub mod plugins;
pub mod presence;
pub mod security;
pub mod server;
pub mod theme;
pub mod verify;
pub mod version;

use std::collections::HashMap;

/// Most frequent item; ties go to the one seen first
pub(crate) fn most_frequent<I, S>(items: I) -> Option<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut order: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for item in items {
        let item = item.as_ref();
        match index.get(item) {
            Some(&i) => order[i].1 += 1,
            None => {
                index.insert(item.to_string(), order.len());
                order.push((item.to_string(), 1));
            }
        }
    }

    let mut best: Option<(String, usize)> = None;
    for (item, count) in order {
        if best.as_ref().is_none_or(|(_, c)| count > *c) {
            best = Some((item, count));
        }
    }
    best.map(|(item, _)| item)
}

/// Display name for a slug: `-` becomes a space, words are title-cased
pub(crate) fn display_name(slug: &str) -> String {
    let mut name = String::with_capacity(slug.len());
    let mut prev_alpha = false;
    for c in slug.chars() {
        let c = if c == '-' { ' ' } else { c };
        if c.is_alphabetic() {
            if prev_alpha {
                name.extend(c.to_lowercase());
            } else {
                name.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            name.push(c);
            prev_alpha = false;
        }
    }
    name
}

/// Cut `text` to at most `max` characters
pub(crate) fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
