/// Relationship direction of a pattern, seen from the filtered node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PatternDirection {
    Incoming,
    Outgoing,
    #[default]
    Both,
}

impl PatternDirection {
    /// Unknown or missing directions fall back to `Both`.
    pub fn from_str(s: &str) -> PatternDirection {
        match s.to_uppercase().as_str() {
            "INCOMING" => PatternDirection::Incoming,
            "OUTGOING" => PatternDirection::Outgoing,
            _ => PatternDirection::Both,
        }
    }

    /// Opening and closing halves of the relationship arrow, e.g. `("-", "->")`
    pub fn arrow_parts(&self) -> (&'static str, &'static str) {
        match self {
            PatternDirection::Incoming => ("<-", "-"),
            PatternDirection::Outgoing => ("-", "->"),
            PatternDirection::Both => ("-", "-"),
        }
    }
}
