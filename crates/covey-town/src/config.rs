//! Town configuration.

/// Settings applied to every town a registry creates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TownConfig {
    /// Maximum players allowed in a town at once.
    pub capacity: usize,
}

impl Default for TownConfig {
    fn default() -> Self {
        Self { capacity: 50 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_town_config_default_capacity() {
        assert_eq!(TownConfig::default().capacity, 50);
    }
}
