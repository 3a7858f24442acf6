use thiserror::Error;

pub const DEFAULT_LEVELS: usize = 15;
pub const DEFAULT_PRECISION: u32 = 5;

/// Per-book settings. `symbol` is bookkeeping only; the aggregation
/// algorithm never reads it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookConfig {
    pub symbol: String,
    /// Rows retained per side after truncation.
    pub levels: usize,
    /// Decimal digits for displayed prices. Raw keys keep full precision.
    pub precision: u32,
}

impl BookConfig {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            levels: DEFAULT_LEVELS,
            precision: DEFAULT_PRECISION,
        }
    }

    // Rejected, never clamped: a zero-row ladder is a caller bug.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.levels == 0 {
            return Err(ConfigError::InvalidLevels { levels: self.levels });
        }
        Ok(())
    }
}

impl Default for BookConfig {
    fn default() -> Self {
        Self::new("BTC/USD")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("levels must be a positive integer, got {levels}")]
    InvalidLevels { levels: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BookConfig::new("EUR/USD");
        assert_eq!(config.levels, 15);
        assert_eq!(config.precision, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_levels_rejected() {
        let config = BookConfig {
            levels: 0,
            ..BookConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidLevels { levels: 0 })
        );
    }
}
