use crate::backend::filter::LoweredFilter;
use crate::parser::entity_kind::EntityKind;
use chrono::Utc;
use std::time::Duration;
use tracing::{debug, info};

/// Install the default `tracing` subscriber.
///
/// Safe to call more than once; later calls leave the first subscriber in place.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .try_init();
}

/// Emit one `query_log` line for a lowered filter
pub fn log_translation(kind: EntityKind, filter: &LoweredFilter, duration: Duration) {
    let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");

    info!(
        target: "query_log",
        "{} {} len={} params={} {}us",
        timestamp,
        kind,
        filter.fragment.len(),
        filter.parameters.len(),
        duration.as_micros()
    );
    debug!(target: "query_log", "{}", format_fragment(&filter.fragment));
}

/// Collapse a fragment onto one log line
fn format_fragment(fragment: &str) -> String {
    fragment.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};

    #[test]
    fn test_format_fragment() {
        assert_eq!(format_fragment("e.name = $param_0"), "e.name = $param_0");
        assert_eq!(format_fragment("e.`a\nb`  = $p"), "e.`a b` = $p");
    }

    #[test]
    fn test_log_translation() {
        init_logging();
        init_logging();

        let mut parameters = Map::new();
        parameters.insert("param_0".to_string(), json!(30));
        let filter = LoweredFilter {
            fragment: "e.age > $param_0".to_string(),
            parameters,
        };
        log_translation(EntityKind::Node, &filter, Duration::from_micros(12));
    }
}
