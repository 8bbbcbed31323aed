//! Store configuration.

use feature_types::Envelope;
use serde::de::Error;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Store configuration
///
/// Designed to be loaded from JSON or TOML with every field optional.
///
/// # Example
///
/// ```rust
/// use feature_store::Config;
///
/// let config = Config::default();
/// assert_eq!(config.quadtree_node_capacity, 100);
///
/// let json = r#"{ "quadtree_node_capacity": 32, "lock_timeout_ms": 250 }"#;
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.quadtree_node_capacity, 32);
/// assert_eq!(config.quadtree_max_depth, 19);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Objects held locally by a quadtree node before it subdivides
    #[serde(default = "Config::default_node_capacity")]
    pub quadtree_node_capacity: usize,

    /// Hard depth cap for quadtree subdivision (1-19)
    #[serde(default = "Config::default_max_depth")]
    pub quadtree_max_depth: usize,

    /// How long to wait for the store lock (None blocks indefinitely)
    #[serde(default)]
    pub lock_timeout_ms: Option<u64>,

    /// Region covered by the quadtree root
    #[serde(default = "Config::default_world_bounds")]
    pub world_bounds: Envelope,
}

impl Config {
    pub const MAX_QUADTREE_DEPTH: usize = 19;

    const fn default_node_capacity() -> usize {
        100
    }

    const fn default_max_depth() -> usize {
        Self::MAX_QUADTREE_DEPTH
    }

    fn default_world_bounds() -> Envelope {
        Envelope::new(-180.0, -90.0, 180.0, 90.0)
    }

    pub fn with_node_capacity(mut self, capacity: usize) -> Self {
        self.quadtree_node_capacity = capacity;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.quadtree_max_depth = depth;
        self
    }

    pub fn with_world_bounds(mut self, bounds: Envelope) -> Self {
        self.world_bounds = bounds;
        self
    }

    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout_ms = Some(timeout.as_millis().min(u64::MAX as u128) as u64);
        self
    }

    pub fn lock_timeout(&self) -> Option<Duration> {
        self.lock_timeout_ms.map(Duration::from_millis)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.quadtree_node_capacity == 0 {
            return Err("Quadtree node capacity must be greater than zero".to_string());
        }

        if self.quadtree_max_depth == 0 || self.quadtree_max_depth > Self::MAX_QUADTREE_DEPTH {
            return Err(format!(
                "Quadtree max depth must be between 1 and {}",
                Self::MAX_QUADTREE_DEPTH
            ));
        }

        let bounds = &self.world_bounds;
        if !bounds.is_finite() {
            return Err("World bounds must be finite".to_string());
        }
        if bounds.width() <= 0.0 || bounds.height() <= 0.0 {
            return Err("World bounds must have a positive area".to_string());
        }

        Ok(())
    }

    /// Load configuration from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let config: Config = serde_json::from_str(json)?;
        if let Err(e) = config.validate() {
            return Err(Error::custom(e));
        }
        Ok(config)
    }

    /// Save configuration as JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load configuration from TOML string (requires toml feature)
    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        let config: Config = toml::from_str(toml_str)?;
        if let Err(e) = config.validate() {
            return Err(toml::de::Error::custom(e));
        }
        Ok(config)
    }

    /// Save configuration as TOML string (requires toml feature)
    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            quadtree_node_capacity: Self::default_node_capacity(),
            quadtree_max_depth: Self::default_max_depth(),
            world_bounds: Self::default_world_bounds(),
            lock_timeout_ms: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.quadtree_node_capacity, 100);
        assert_eq!(config.quadtree_max_depth, 19);
        assert_eq!(config.world_bounds, Envelope::new(-180.0, -90.0, 180.0, 90.0));
        assert!(config.lock_timeout().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default()
            .with_node_capacity(16)
            .with_max_depth(8)
            .with_lock_timeout(Duration::from_millis(500));

        let json = config.to_json().unwrap();
        let deserialized = Config::from_json(&json).unwrap();

        assert_eq!(deserialized, config);
        assert_eq!(deserialized.lock_timeout(), Some(Duration::from_millis(500)));
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.quadtree_node_capacity = 0;
        assert!(config.validate().is_err());

        config.quadtree_node_capacity = 10;
        config.quadtree_max_depth = 20;
        assert!(config.validate().is_err());

        config.quadtree_max_depth = 4;
        config.world_bounds = Envelope::new(0.0, 0.0, 0.0, 10.0);
        assert!(config.validate().is_err());

        config.world_bounds = Envelope::new(0.0, 0.0, f64::INFINITY, 10.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_json_rejects_invalid() {
        assert!(Config::from_json(r#"{ "quadtree_node_capacity": 0 }"#).is_err());
        assert!(Config::from_json("{}").is_ok());
    }

    #[cfg(feature = "toml")]
    #[test]
    fn test_config_toml_round_trip() {
        let config = Config::default().with_node_capacity(64);
        let text = config.to_toml().unwrap();
        let back = Config::from_toml(&text).unwrap();
        assert_eq!(back, config);
    }
}
