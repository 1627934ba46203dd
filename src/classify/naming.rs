//! Display-name derivation for units.
//!
//! Names come from the file name alone. Index files get a fixed sentinel
//! instead of borrowing the parent directory's name.

use std::path::Path;

/// Display name given to every implicit-index file.
pub const INDEX_DISPLAY_NAME: &str = "Index";

/// Derives the PascalCase display name for a file name.
///
/// ```
/// use prunescope::classify::derive_name;
///
/// assert_eq!(derive_name("user-profile.jsx"), "UserProfile");
/// assert_eq!(derive_name("userProfile.tsx"), "UserProfile");
/// assert_eq!(derive_name("user_profile.js"), "UserProfile");
/// assert_eq!(derive_name("index.tsx"), "Index");
/// ```
pub fn derive_name(file_name: &str) -> String {
    let stem = file_stem(file_name);
    if stem.eq_ignore_ascii_case("index") {
        return INDEX_DISPLAY_NAME.to_string();
    }

    let name: String = split_words(stem).iter().map(|w| capitalize(w)).collect();
    if name.is_empty() {
        stem.to_string()
    } else {
        name
    }
}

/// Returns the file name without its final extension.
pub fn file_stem(file_name: &str) -> &str {
    Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name)
}

/// `UserProfile` -> `userProfile`.
pub fn to_camel_case(name: &str) -> String {
    let words = split_words(name);
    let mut out = String::with_capacity(name.len());
    for (i, word) in words.iter().enumerate() {
        if i == 0 {
            out.push_str(&word.to_lowercase());
        } else {
            out.push_str(&capitalize(word));
        }
    }
    out
}

/// `UserProfile` -> `user-profile`.
pub fn to_kebab_case(name: &str) -> String {
    split_words(name)
        .iter()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}

/// Splits on `-`, `_`, whitespace and capital-letter boundaries.
///
/// An uppercase run followed by a lowercase letter starts a new word at its
/// last capital, so `HTMLButton` yields `HTML` and `Button`.
pub fn split_words(text: &str) -> Vec<String> {
    let mut words = Vec::new();

    for part in text.split(|c: char| c == '-' || c == '_' || c.is_whitespace()) {
        let chars: Vec<char> = part.chars().collect();
        let mut current = String::new();

        for (i, &c) in chars.iter().enumerate() {
            if i > 0 && c.is_uppercase() && !current.is_empty() {
                let prev = chars[i - 1];
                let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
                if prev.is_lowercase()
                    || prev.is_ascii_digit()
                    || (prev.is_uppercase() && next_is_lower)
                {
                    words.push(std::mem::take(&mut current));
                }
            }
            current.push(c);
        }

        if !current.is_empty() {
            words.push(current);
        }
    }

    words
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
