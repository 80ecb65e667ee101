use super::{Partial, Strategy};
use regex::{Regex, RegexBuilder};
use select::document::Document;
use select::node::Node;
use select::predicate::Predicate;

const FDV_KEYWORDS: &[&str] = &["fdv", "market-cap", "fully-diluted"];
const LIQUIDITY_KEYWORDS: &[&str] = &["liquidity", "liq"];
const VOLUME_KEYWORDS: &[&str] = &["volume", "24h-volume", "vol"];

/// Where a keyword is looked for on an element.
#[derive(Debug, Clone, Copy)]
enum KeywordAt {
    Class,
    DataKey,
}

/// Matches elements whose class list or data-key attribute contains the
/// keyword as a case-insensitive substring.
struct KeywordPredicate<'k> {
    keyword: &'k str,
    at: KeywordAt,
}

impl<'a, 'k> Predicate for &'a KeywordPredicate<'k> {
    fn matches(&self, node: &Node) -> bool {
        let attr = match self.at {
            KeywordAt::Class => node.attr("class"),
            KeywordAt::DataKey => node.attr("data-key"),
        };
        attr.map(|value| value.to_lowercase().contains(self.keyword))
            .unwrap_or(false)
    }
}

/// Accepts plain numbers, K/M/B-suffixed numbers and scientific notation,
/// after stripping currency symbols, thousands separators, percent signs
/// and whitespace.
pub struct NumericShape {
    shapes: Vec<Regex>,
}

impl NumericShape {
    pub fn new() -> Self {
        let sources = [r"^\d+\.?\d*$", r"^\d+\.?\d*[KMB]$", r"^\d+\.?\d*e[+-]?\d+$"];
        Self {
            shapes: sources
                .iter()
                .map(|source| {
                    RegexBuilder::new(source)
                        .case_insensitive(true)
                        .build()
                        .expect("static numeric shape")
                })
                .collect(),
        }
    }

    pub fn matches(&self, text: &str) -> bool {
        let cleaned: String = text
            .chars()
            .filter(|c| !matches!(c, '$' | ',' | '%') && !c.is_whitespace())
            .collect();
        !cleaned.is_empty() && self.shapes.iter().any(|shape| shape.is_match(&cleaned))
    }
}

impl Default for NumericShape {
    fn default() -> Self {
        Self::new()
    }
}

/// Strategy 3: walk the parsed document looking for elements whose class or
/// data-key names a metric synonym, and accept the first one whose text
/// looks like a number.
pub struct ClassHeuristic {
    numeric: NumericShape,
}

impl ClassHeuristic {
    pub fn new() -> Self {
        Self {
            numeric: NumericShape::new(),
        }
    }

    fn search(&self, doc: &Document, keywords: &[&str]) -> Option<String> {
        for &keyword in keywords {
            for at in [KeywordAt::Class, KeywordAt::DataKey] {
                let predicate = KeywordPredicate { keyword, at };
                for node in doc.find(&predicate) {
                    let text = node.text().trim().to_string();
                    if !text.is_empty() && self.numeric.matches(&text) {
                        return Some(text);
                    }
                }
            }
        }
        None
    }
}

impl Default for ClassHeuristic {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategy for ClassHeuristic {
    fn name(&self) -> &'static str {
        "class-heuristic"
    }

    fn extract(&self, body: &str) -> Partial {
        let doc = Document::from(body);
        Partial {
            fdv: self.search(&doc, FDV_KEYWORDS),
            liquidity: self.search(&doc, LIQUIDITY_KEYWORDS),
            volume_24h: self.search(&doc, VOLUME_KEYWORDS),
        }
    }
}
