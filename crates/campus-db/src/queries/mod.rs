pub mod follows;
pub mod forum;
pub mod messages;
pub mod notifications;
pub mod posts;
pub mod users;

/// Wrap a search term for `LIKE ... ESCAPE '\'` so wildcards in the
/// term match literally.
pub(crate) fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}
