use crate::error::{ContextError, Result};
use serde::{Deserialize, Serialize};

/// Configuration for context extraction and rendering
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Highlight search matches and lines of interest with terminal colors
    pub color: bool,

    /// Emit per-phase diagnostic traces through the `log` facade
    pub verbose: bool,

    /// Prefix rendered lines with 1-based line numbers
    pub line_number: bool,

    /// Expand enclosing-scope headers for every line of interest
    pub parent_context: bool,

    /// Expand the largest child scopes of a line of interest, under a budget
    pub child_context: bool,

    /// Anchor the last physical line and the ancestry of scope end lines
    pub last_line: bool,

    /// Number of leading file lines always included as orientation
    pub margin: usize,

    /// Visually distinguish lines of interest from supporting context
    pub mark_lois: bool,

    /// Maximum number of lines a collapsed-scope header may span
    pub header_max: usize,

    /// Show the header of a scope that starts on the first file line
    pub show_top_of_file_parent_scope: bool,

    /// Radius of extra lines included around every line of interest
    pub loi_pad: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            color: false,
            verbose: false,
            line_number: false,
            parent_context: true,
            child_context: true,
            last_line: true,
            margin: 3,
            mark_lois: true,
            header_max: 10,
            show_top_of_file_parent_scope: false,
            loi_pad: 1,
        }
    }
}

impl ContextConfig {
    /// Create config for interactive terminal output (colors + line numbers)
    #[must_use]
    pub fn for_terminal() -> Self {
        Self {
            color: true,
            line_number: true,
            ..Default::default()
        }
    }

    /// Create config that shows only the lines of interest themselves,
    /// with no structural expansion around them
    #[must_use]
    pub fn bare() -> Self {
        Self {
            parent_context: false,
            child_context: false,
            last_line: false,
            margin: 0,
            mark_lois: false,
            loi_pad: 0,
            ..Default::default()
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.header_max == 0 {
            return Err(ContextError::invalid_config("header_max must be > 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = ContextConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_preset_configs_valid() {
        assert!(ContextConfig::for_terminal().validate().is_ok());
        assert!(ContextConfig::bare().validate().is_ok());
    }

    #[test]
    fn test_zero_header_max_rejected() {
        let config = ContextConfig {
            header_max: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_serde_round_trip() {
        let config = ContextConfig::for_terminal();
        let json = serde_json::to_string(&config).unwrap();
        let back: ContextConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.color, config.color);
        assert_eq!(back.margin, config.margin);
        assert_eq!(back.header_max, config.header_max);
    }
}
