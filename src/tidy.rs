//! Column-name sanitization for daxtab.
//!
//! DAX result columns come back with names like `Sales[Sales Amount]`; the
//! default rule rewrites them into identifier-friendly labels.

/// An alternative column-name mapping function, injectable per session.
pub type TidyFn = Box<dyn Fn(&str) -> String>;

/// Default column-name sanitization rule.
///
/// Replaces `[`, `]`, and spaces with underscores, then strips leading and
/// trailing underscores. Capitalization is left alone.
pub fn tidy_column_name(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| match c {
            '[' | ']' | ' ' => '_',
            other => other,
        })
        .collect();
    replaced.trim_matches('_').to_string()
}
