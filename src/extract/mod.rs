pub mod dom;
pub mod labeled;
pub mod script;
pub mod triple;

/// The three market metrics as opaque display strings ("$1.2M", "500K", ...).
/// No currency math happens anywhere; values are captured text, nothing more.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolMetrics {
    pub fdv: String,
    pub liquidity: String,
    pub volume_24h: String,
}

impl PoolMetrics {
    /// The default written for failed or ambiguous rows.
    pub fn zero() -> Self {
        Self {
            fdv: "0".to_string(),
            liquidity: "0".to_string(),
            volume_24h: "0".to_string(),
        }
    }
}

/// What a single strategy managed to resolve. Strategies never overwrite
/// values found by a higher-priority strategy; the pipeline merges.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partial {
    pub fdv: Option<String>,
    pub liquidity: Option<String>,
    pub volume_24h: Option<String>,
}

impl Partial {
    pub fn is_complete(&self) -> bool {
        self.fdv.is_some() && self.liquidity.is_some() && self.volume_24h.is_some()
    }

    fn fill_from(&mut self, other: Partial) {
        if self.fdv.is_none() {
            self.fdv = other.fdv;
        }
        if self.liquidity.is_none() {
            self.liquidity = other.liquidity;
        }
        if self.volume_24h.is_none() {
            self.volume_24h = other.volume_24h;
        }
    }

    fn into_metrics(self) -> PoolMetrics {
        PoolMetrics {
            fdv: self.fdv.unwrap_or_else(|| "0".to_string()),
            liquidity: self.liquidity.unwrap_or_else(|| "0".to_string()),
            volume_24h: self.volume_24h.unwrap_or_else(|| "0".to_string()),
        }
    }
}

pub trait Strategy: Send + Sync {
    fn name(&self) -> &'static str;
    fn extract(&self, body: &str) -> Partial;
}

/// Fixed-priority chain over the raw response body. The first strategy that
/// completes the triple wins; later strategies only fill fields still open.
/// Pure function of the body, safe to share across workers.
pub struct Pipeline {
    strategies: Vec<Box<dyn Strategy>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self {
            strategies: vec![
                Box::new(triple::ExactTriple::new()),
                Box::new(labeled::LabeledPatterns::new()),
                Box::new(dom::ClassHeuristic::new()),
                Box::new(script::ScriptState::new()),
            ],
        }
    }

    pub fn run(&self, body: &str) -> PoolMetrics {
        let mut resolved = Partial::default();
        for strategy in &self.strategies {
            resolved.fill_from(strategy.extract(body));
            if resolved.is_complete() {
                log::debug!("extraction settled by strategy '{}'", strategy.name());
                break;
            }
        }
        resolved.into_metrics()
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}
