use super::{Partial, Strategy};
use regex::{Regex, RegexBuilder};

const MARKER_TAIL: &str = r#"</svg></span></div><dd class="static-box-value"><span class="sc-65e7f566-0 bxaIIt base-text"><span>([^<]+)</span></span>"#;

/// Strategy 2: per-label search. For each metric label, try the stat-box
/// marker anchored after the label text, then progressively looser backup
/// patterns (attribute-adjacent, quoted-key-adjacent, class-name-adjacent).
/// Unlike strategy 1 this resolves fields independently.
pub struct LabeledPatterns {
    fdv: Vec<Regex>,
    liquidity: Vec<Regex>,
    volume_24h: Vec<Regex>,
}

fn patterns_for(label: &str) -> Vec<Regex> {
    let escaped = regex::escape(label);
    let lowered = regex::escape(&label.to_lowercase());
    let sources = [
        format!("{escaped}.*?{MARKER_TAIL}"),
        format!("{escaped}[^>]*>([^<]+)<"),
        format!("\"{escaped}\"[^>]*>([^<]+)<"),
        format!("class=\"[^\"]*{lowered}[^\"]*\"[^>]*>([^<]+)<"),
    ];
    sources
        .iter()
        .map(|source| {
            RegexBuilder::new(source)
                .case_insensitive(true)
                .dot_matches_new_line(true)
                .build()
                .expect("static label pattern")
        })
        .collect()
}

fn first_capture(patterns: &[Regex], body: &str) -> Option<String> {
    patterns.iter().find_map(|pattern| {
        pattern
            .captures(body)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|v| !v.is_empty())
    })
}

impl LabeledPatterns {
    pub fn new() -> Self {
        Self {
            fdv: patterns_for("FDV"),
            liquidity: patterns_for("liq"),
            volume_24h: patterns_for("24h VOL"),
        }
    }
}

impl Default for LabeledPatterns {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategy for LabeledPatterns {
    fn name(&self) -> &'static str {
        "labeled-patterns"
    }

    fn extract(&self, body: &str) -> Partial {
        Partial {
            fdv: first_capture(&self.fdv, body),
            liquidity: first_capture(&self.liquidity, body),
            volume_24h: first_capture(&self.volume_24h, body),
        }
    }
}
