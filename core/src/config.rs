/// Construction-time options for [`crate::TfidfRanker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankerConfig {
    /// Fail on queries with no valid n-gram instead of returning an empty result.
    pub strict: bool,
    /// Default worker count for batch calls that do not pass one.
    pub workers: Option<usize>,
}

impl Default for RankerConfig {
    fn default() -> Self {
        Self { strict: true, workers: None }
    }
}

impl RankerConfig {
    /// Defaults overridden by `HASHRANK_STRICT` and `HASHRANK_WORKERS` when set and parseable.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(val) = std::env::var("HASHRANK_STRICT") {
            match parse_bool(&val) {
                Some(strict) => cfg.strict = strict,
                None => tracing::warn!(value = %val, "ignoring invalid HASHRANK_STRICT"),
            }
        }
        if let Ok(val) = std::env::var("HASHRANK_WORKERS") {
            match val.trim().parse::<usize>() {
                Ok(n) => cfg.workers = (n > 0).then_some(n),
                Err(_) => tracing::warn!(value = %val, "ignoring invalid HASHRANK_WORKERS"),
            }
        }
        cfg
    }
}

fn parse_bool(val: &str) -> Option<bool> {
    match val.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
