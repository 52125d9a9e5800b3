// src/config.rs

use crate::types::Config;
use anyhow::{bail, Context, Result};
use std::fs;

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;
        let config: Config =
            serde_yaml::from_str(&contents).context("Failed to parse config")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.pipeline.sample_interval_ms == 0 {
            bail!("pipeline.sample_interval_ms must be greater than 0");
        }
        if self.pipeline.buffer_capacity < 2 {
            bail!("pipeline.buffer_capacity must be at least 2");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let yaml = "\
pipeline:
  sample_interval_ms: 100
  buffer_capacity: 16
logging:
  level: debug
";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.pipeline.sample_interval_ms, 100);
        assert_eq!(config.pipeline.buffer_capacity, 16);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_validate_rejects_tiny_buffer() {
        let mut config = Config::default();
        config.pipeline.buffer_capacity = 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let mut config = Config::default();
        config.pipeline.sample_interval_ms = 0;
        assert!(config.validate().is_err());
    }
}
