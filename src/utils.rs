//! Utility functions for Cypher text generation

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref IDENTIFIER: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
}

/// Returns true if `name` can be spliced into Cypher without quoting
///
/// # Examples
/// ```
/// use cypher_filter::utils::is_identifier;
///
/// assert!(is_identifier("created_at"));
/// assert!(!is_identifier("first name"));
/// ```
pub fn is_identifier(name: &str) -> bool {
    IDENTIFIER.is_match(name)
}

/// Quotes a property name, label, type or variable for safe splicing.
///
/// Plain identifiers are returned unchanged. Everything else is wrapped in
/// backticks with embedded backticks doubled.
///
/// Example output: `` `first name` ``
pub fn quote_identifier(name: &str) -> String {
    if is_identifier(name) {
        name.to_string()
    } else {
        format!("`{}`", name.replace('`', "``"))
    }
}

/// Formats `reference.property`, quoting the property when needed
pub fn property_path(reference: &str, property: &str) -> String {
    format!("{}.{}", reference, quote_identifier(property))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("age"));
        assert!(is_identifier("_private"));
        assert!(is_identifier("n0"));
        assert!(!is_identifier("0n"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("a-b"));
        assert!(!is_identifier("x) DETACH DELETE (y"));
    }

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("name"), "name");
        assert_eq!(quote_identifier("first name"), "`first name`");
        assert_eq!(quote_identifier("we`ird"), "`we``ird`");
    }

    #[test]
    fn test_property_path() {
        assert_eq!(property_path("e", "age"), "e.age");
        assert_eq!(property_path("n", "address.city"), "n.`address.city`");
    }
}
