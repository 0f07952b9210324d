use crate::parser::direction::PatternDirection;
use crate::utils::quote_identifier;

/// Node pattern such as `(n:Person:Admin)`.
///
/// With `or_labels` the labels are joined as a label disjunction, `(n:Person|Admin)`.
pub fn node_pattern(reference: &str, labels: &[&str], or_labels: bool) -> String {
    let reference = if reference.is_empty() {
        String::new()
    } else {
        quote_identifier(reference)
    };
    if labels.is_empty() {
        return format!("({})", reference);
    }

    let quoted: Vec<String> = labels.iter().map(|label| quote_identifier(label)).collect();
    let separator = if or_labels { "|" } else { ":" };
    format!("({}:{})", reference, quoted.join(separator))
}

/// Relationship pattern such as `(a)-[r:KNOWS]->(b)`
pub fn relationship_pattern(
    reference: &str,
    relationship_type: Option<&str>,
    start: Option<&str>,
    end: Option<&str>,
    direction: PatternDirection,
) -> String {
    let mut inner = if reference.is_empty() {
        String::new()
    } else {
        quote_identifier(reference)
    };
    if let Some(relationship_type) = relationship_type {
        inner.push(':');
        inner.push_str(&quote_identifier(relationship_type));
    }

    let (left, right) = direction.arrow_parts();
    format!(
        "({}){}[{}]{}({})",
        start.map(quote_identifier).unwrap_or_default(),
        left,
        inner,
        right,
        end.map(quote_identifier).unwrap_or_default()
    )
}
