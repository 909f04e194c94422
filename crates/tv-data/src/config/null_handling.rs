//! Missing-value markers recognised while parsing uploaded files

use serde::{Serialize, Deserialize};
use tv_core::EngineConfig;

/// Null value configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NullConfig {
    /// Patterns to treat as missing
    pub patterns: Vec<String>,

    /// Whether to trim whitespace before checking
    pub trim_whitespace: bool,

    /// Case sensitive matching
    pub case_sensitive: bool,
}

impl Default for NullConfig {
    fn default() -> Self {
        Self::from_patterns(EngineConfig::default().null_patterns)
    }
}

impl NullConfig {
    /// Case-insensitive, whitespace-trimming matcher over the given patterns
    pub fn from_patterns(patterns: Vec<String>) -> Self {
        Self {
            patterns,
            trim_whitespace: true,
            case_sensitive: false,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::from_patterns(config.null_patterns.clone())
    }

    /// Check if a raw text value should be treated as missing
    pub fn is_null(&self, value: &str) -> bool {
        let test_value = if self.trim_whitespace {
            value.trim()
        } else {
            value
        };

        self.patterns.iter().any(|pattern| {
            if self.case_sensitive {
                test_value == pattern
            } else {
                test_value.eq_ignore_ascii_case(pattern)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_markers() {
        let nulls = NullConfig::default();
        assert!(nulls.is_null(""));
        assert!(nulls.is_null("  n/a "));
        assert!(nulls.is_null("NULL"));
        assert!(nulls.is_null("nan"));
        assert!(!nulls.is_null("0"));
        assert!(!nulls.is_null("east"));
    }

    #[test]
    fn test_case_sensitive_matching() {
        let nulls = NullConfig {
            case_sensitive: true,
            ..NullConfig::from_patterns(vec!["NA".to_string()])
        };
        assert!(nulls.is_null("NA"));
        assert!(!nulls.is_null("na"));
    }
}
