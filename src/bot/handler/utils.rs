/* Common utilities for handlers. */

// Splits off the first word. The rest has leading whitespace removed.
pub fn partition(text: &str) -> (&str, &str) {
    let text = text.trim();
    match text.split_once(char::is_whitespace) {
        Some((first, rest)) => (first, rest.trim_start()),
        None => (text, ""),
    }
}

// Parse a whole number of seconds, allowing a leading sign.
pub fn parse_seconds(text: &str) -> Option<i64> {
    text.trim().parse::<i64>().ok()
}

// Formats nicks or names as a comma separated list, or a placeholder if empty.
pub fn join_or_none<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let items: Vec<String> = items
        .into_iter()
        .map(|item| item.as_ref().to_string())
        .collect();
    if items.is_empty() {
        "nobody".to_string()
    } else {
        items.join(", ")
    }
}
