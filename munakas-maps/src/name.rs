//! Display names for map identifiers

/// Game-mode prefixes stripped from map ids, checked in order
const MODE_PREFIXES: [&str; 3] = ["de_", "cs_", "ar_"];

/// Human readable label for a map id.
///
/// Strips the first matching game-mode prefix, then title-cases what is
/// left. Ids without a known prefix are title-cased whole.
///
/// ```
/// use munakas_maps::display_name;
///
/// assert_eq!(display_name("de_dust2"), "Dust2");
/// assert_eq!(display_name("workshop_map"), "Workshop_map");
/// ```
pub fn display_name(id: &str) -> String {
    let stem = MODE_PREFIXES
        .iter()
        .find_map(|prefix| id.strip_prefix(prefix))
        .unwrap_or(id);

    title_case(stem)
}

/// Uppercase the first letter of each word and lowercase the rest.
///
/// Underscores and apostrophes stay inside a word; any other
/// non-alphanumeric character starts a new one.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;

    for c in s.chars() {
        if at_word_start {
            out.extend(c.to_uppercase());
        } else {
            out.extend(c.to_lowercase());
        }

        at_word_start = !(c.is_alphanumeric() || c == '_' || c == '\'');
    }

    out
}
