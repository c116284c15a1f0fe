//! Class-list merging for components that accept a caller `class`.

#[cfg(test)]
#[path = "classes_test.rs"]
mod classes_test;

/// Append a caller-supplied class list to a fixed base list.
///
/// Blank extras are ignored and whitespace is collapsed; the base keeps its
/// order and the extra follows it.
pub fn merge_classes(base: &str, extra: Option<&str>) -> String {
    base.split_whitespace()
        .chain(extra.unwrap_or_default().split_whitespace())
        .collect::<Vec<_>>()
        .join(" ")
}
