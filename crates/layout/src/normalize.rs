//! String normalization applied to tag values before they become paths.

use tagshelf_core::{AudioMetadata, TagField};

/// Function words, in the capitalized form they are matched in
pub const FUNCTION_WORDS: &[&str] = &[
    "The", "A", "Of", "And", "In", "Is", "With", "As", "At", "For", "From", "To", "Or", "On",
];

/// Characters that cannot appear in a single path segment
const UNSAFE_CHARS: [char; 3] = ['/', '\\', '?'];

/// Lowercase capitalized function words that have a single space on both
/// sides ("Live In The Studio" -> "Live in the Studio").
///
/// The first and last word are never touched. Returns whether anything
/// changed. Only ASCII case changes, so the byte length is preserved.
pub fn lower_function_words(text: &mut String) -> bool {
    let words: Vec<&str> = text.split(' ').collect();
    if words.len() < 3 {
        return false;
    }

    let last = words.len() - 1;
    let mut changed = false;
    let lowered: Vec<String> = words
        .iter()
        .enumerate()
        .map(|(i, word)| {
            if i > 0 && i < last && FUNCTION_WORDS.contains(word) {
                changed = true;
                word.to_ascii_lowercase()
            } else {
                (*word).to_string()
            }
        })
        .collect();

    if changed {
        *text = lowered.join(" ");
    }
    changed
}

/// Replace `/`, `\` and `?` with `-`
pub fn sanitize_title(title: &str) -> String {
    if title.contains(UNSAFE_CHARS) {
        title.replace(UNSAFE_CHARS, "-")
    } else {
        title.to_string()
    }
}

/// Move a leading "The " to the end: "The Beatles" -> "Beatles, The"
pub fn invert_artist(artist: &str) -> String {
    match artist.strip_prefix("The ") {
        Some(rest) if !rest.trim().is_empty() => format!("{}, The", rest),
        _ => artist.to_string(),
    }
}

/// Apply function-word lowering to artist, album and title.
///
/// Returns the fields that changed, in that order.
pub fn lower_record(meta: &mut AudioMetadata) -> Vec<TagField> {
    [TagField::Artist, TagField::Album, TagField::Title]
        .into_iter()
        .filter(|&field| {
            meta.text_mut(field)
                .map(lower_function_words)
                .unwrap_or(false)
        })
        .collect()
}

/// Invert the record's artist in place; returns whether it changed
pub fn invert_record_artist(meta: &mut AudioMetadata) -> bool {
    let inverted = invert_artist(&meta.artist);
    if inverted == meta.artist {
        return false;
    }
    meta.artist = inverted;
    true
}
