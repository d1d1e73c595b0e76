//! Case-conversion helpers shared with downstream emitters.
//!
//! These implement the generator's camel-case policy: identifiers are split
//! on `_`, `-`, and spaces, short all-caps words are preserved as acronyms,
//! and already well-formed names pass through untouched.

/// Capitalize an identifier, camel-casing it first if it contains
/// separators.
///
/// # Examples
/// ```
/// use darbind_core::naming::capitalize;
/// assert_eq!(capitalize("archive"), "Archive");
/// assert_eq!(capitalize("Archive"), "Archive");
/// assert_eq!(capitalize("set_limit"), "SetLimit");
/// assert_eq!(capitalize("SET"), "SET");
/// ```
pub fn capitalize(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }

    let has_separators = input.contains(['_', '-', ' ']);
    if !has_separators && input.starts_with(|c: char| c.is_ascii_uppercase()) {
        return input.to_string();
    }

    upper_first(&to_camel_case(input))
}

/// Decapitalize an identifier, camel-casing it first if it contains
/// separators. All-caps inputs are lowered wholesale.
///
/// # Examples
/// ```
/// use darbind_core::naming::decapitalize;
/// assert_eq!(decapitalize("Archive"), "archive");
/// assert_eq!(decapitalize("SET"), "set");
/// assert_eq!(decapitalize("already_lower"), "alreadyLower");
/// assert_eq!(decapitalize("plain"), "plain");
/// ```
pub fn decapitalize(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }

    if is_all_caps(input) {
        return input.to_lowercase();
    }

    let has_separators = input.contains(['_', '-', ' ']);
    if !has_separators && input.starts_with(|c: char| c.is_ascii_lowercase()) {
        return input.to_string();
    }

    lower_first(&to_camel_case(input))
}

/// Join `_`/`-`/space-separated words into camelCase. Inputs without
/// separators are returned as-is. All-caps words of up to three characters
/// are treated as acronyms and kept verbatim.
pub fn to_camel_case(input: &str) -> String {
    if input.is_empty() || !input.contains(['_', '-', ' ']) {
        return input.to_string();
    }

    let words: Vec<&str> = input
        .split(['_', '-', ' '])
        .filter(|w| !w.is_empty())
        .collect();
    if words.is_empty() {
        return input.to_string();
    }

    let mut result = String::new();
    for (i, word) in words.iter().enumerate() {
        if is_all_caps(word) {
            if word.len() <= 3 {
                result.push_str(word);
            } else if i == 0 {
                result.push_str(&word.to_lowercase());
            } else {
                result.push_str(&upper_first(&word.to_lowercase()));
            }
        } else if i == 0 {
            result.push_str(&lower_first(word));
        } else {
            result.push_str(&upper_first(word));
        }
    }
    result
}

/// True when the input has at least one ASCII uppercase letter and no ASCII
/// lowercase ones.
pub fn is_all_caps(input: &str) -> bool {
    !input.is_empty()
        && !input.chars().any(|c| c.is_ascii_lowercase())
        && input.chars().any(|c| c.is_ascii_uppercase())
}

fn upper_first(input: &str) -> String {
    let mut chars = input.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
    }
}

fn lower_first(input: &str) -> String {
    let mut chars = input.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
    }
}
