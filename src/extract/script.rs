use super::{Partial, Strategy};
use regex::{Regex, RegexBuilder};

/// Strategy 4, last resort: pull quoted key/value pairs out of embedded
/// script data (`"fdv":"..."` and friends). Serialized app-state blobs are
/// only detected, not deserialized; the quoted keys are enough here.
pub struct ScriptState {
    state_markers: Vec<Regex>,
    fdv: Regex,
    liquidity: Regex,
    volume_24h: Regex,
}

fn key_pattern(key: &str) -> Regex {
    RegexBuilder::new(&format!(r#""{key}"\s*:\s*"([^"]+)""#))
        .case_insensitive(true)
        .build()
        .expect("static key pattern")
}

impl ScriptState {
    pub fn new() -> Self {
        let state_markers = [
            r"window\.__NEXT_DATA__\s*=\s*\{",
            r"window\.__INITIAL_STATE__\s*=\s*\{",
        ]
        .iter()
        .map(|source| Regex::new(source).expect("static state marker"))
        .collect();

        Self {
            state_markers,
            fdv: key_pattern("fdv"),
            liquidity: key_pattern("liquidity"),
            volume_24h: key_pattern("volume24h"),
        }
    }

    fn capture(pattern: &Regex, body: &str) -> Option<String> {
        pattern
            .captures(body)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|v| !v.is_empty())
    }
}

impl Default for ScriptState {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategy for ScriptState {
    fn name(&self) -> &'static str {
        "script-state"
    }

    fn extract(&self, body: &str) -> Partial {
        if self.state_markers.iter().any(|m| m.is_match(body)) {
            log::debug!("serialized app state present in page");
        }

        Partial {
            fdv: Self::capture(&self.fdv, body),
            liquidity: Self::capture(&self.liquidity, body),
            volume_24h: Self::capture(&self.volume_24h, body),
        }
    }
}
