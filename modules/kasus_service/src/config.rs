//! Configuration for the kasus service module

use serde::{Deserialize, Serialize};

/// Kasus service configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Page size for request and case listings
    #[serde(default = "default_page_size")]
    pub page_size: u64,

    /// Largest decoded signature or photo accepted, in bytes
    #[serde(default = "default_max_signature_bytes")]
    pub max_signature_bytes: usize,

    /// How many fresh request numbers to try before giving up on a collision
    #[serde(default = "default_request_number_attempts")]
    pub request_number_attempts: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            max_signature_bytes: default_max_signature_bytes(),
            request_number_attempts: default_request_number_attempts(),
        }
    }
}

fn default_page_size() -> u64 {
    10
}

fn default_max_signature_bytes() -> usize {
    2 * 1024 * 1024 // 2MB
}

fn default_request_number_attempts() -> u32 {
    5
}

impl Config {
    /// Reject values that would make listings or uploads unusable
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.page_size == 0 {
            anyhow::bail!("page_size must be greater than zero");
        }
        if self.max_signature_bytes == 0 {
            anyhow::bail!("max_signature_bytes must be greater than zero");
        }
        if self.request_number_attempts == 0 {
            anyhow::bail!("request_number_attempts must be at least 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert_eq!(config.page_size, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let parsed: Result<Config, _> = serde_json::from_str(r#"{"page_size": 5, "colour": "red"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let config = Config {
            page_size: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
