use super::{Partial, Strategy};
use regex::Regex;

/// The repeating stat-box fragment the DEX page renders once per metric.
/// The page shows FDV, liquidity and 24h volume in that document order.
const MARKER: &str = r#"</svg></span></div><dd class="static-box-value"><span class="sc-65e7f566-0 bxaIIt base-text"><span>([^<]+)</span></span>"#;

/// Strategy 1: collect every marker occurrence across the whole body and
/// commit only when there are exactly three. Any other count means the page
/// layout changed and positional assignment would pair values with the wrong
/// metric, so the strategy rejects the page outright instead of guessing.
pub struct ExactTriple {
    marker: Regex,
}

impl ExactTriple {
    pub fn new() -> Self {
        Self {
            marker: Regex::new(MARKER).expect("static marker pattern"),
        }
    }
}

impl Default for ExactTriple {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategy for ExactTriple {
    fn name(&self) -> &'static str {
        "exact-triple"
    }

    fn extract(&self, body: &str) -> Partial {
        let values: Vec<String> = self
            .marker
            .captures_iter(body)
            .filter_map(|caps| caps.get(1).map(|m| m.as_str().trim().to_string()))
            .collect();

        if values.len() == 3 {
            let mut values = values.into_iter();
            Partial {
                fdv: values.next(),
                liquidity: values.next(),
                volume_24h: values.next(),
            }
        } else {
            if !values.is_empty() {
                log::debug!("marker matched {} times, not 3; rejecting page", values.len());
            }
            Partial::default()
        }
    }
}

/// Renders one stat-box fragment around `value`, for tests.
#[cfg(test)]
pub fn test_marker(value: &str) -> String {
    format!(
        r#"</svg></span></div><dd class="static-box-value"><span class="sc-65e7f566-0 bxaIIt base-text"><span>{value}</span></span>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(values: &[&str]) -> String {
        values.iter().map(|v| test_marker(v)).collect()
    }

    #[test]
    fn exactly_three_matches_resolve_in_document_order() {
        let partial = ExactTriple::new().extract(&page(&["$1.2M", "$500K", "$45.3K"]));
        assert_eq!(partial.fdv.as_deref(), Some("$1.2M"));
        assert_eq!(partial.liquidity.as_deref(), Some("$500K"));
        assert_eq!(partial.volume_24h.as_deref(), Some("$45.3K"));
    }

    #[test]
    fn any_other_count_is_a_full_rejection() {
        let strategy = ExactTriple::new();
        for values in [
            vec![],
            vec!["$1.2M"],
            vec!["$1.2M", "$500K"],
            vec!["$1.2M", "$500K", "$45.3K", "$9.9B"],
        ] {
            let partial = strategy.extract(&page(&values));
            assert_eq!(partial, Partial::default(), "count {}", values.len());
        }
    }

    #[test]
    fn captured_values_are_trimmed() {
        let partial = ExactTriple::new().extract(&page(&[" $1.2M ", "2", "3"]));
        assert_eq!(partial.fdv.as_deref(), Some("$1.2M"));
    }
}
