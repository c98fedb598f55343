//! Configuration enum types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// How a captured snapshot becomes artwork.
///
/// # Examples
/// ```toml
/// [pipeline]
/// mode = "two-step"
/// ```
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum PipelineMode {
    /// Send the snapshot straight to art generation
    #[default]
    Direct,
    /// Recognize text first, let the user edit it, then synthesize
    TwoStep,
}

impl PipelineMode {
    pub fn label(&self) -> &'static str {
        match self {
            PipelineMode::Direct => "direct",
            PipelineMode::TwoStep => "two-step",
        }
    }
}

impl std::str::FromStr for PipelineMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "direct" | "one-step" => Ok(PipelineMode::Direct),
            "two-step" | "twostep" | "edit" => Ok(PipelineMode::TwoStep),
            other => Err(format!(
                "unknown mode '{}', expected 'direct' or 'two-step'",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mode_aliases() {
        assert_eq!("Direct".parse::<PipelineMode>(), Ok(PipelineMode::Direct));
        assert_eq!("two-step".parse::<PipelineMode>(), Ok(PipelineMode::TwoStep));
        assert!("sideways".parse::<PipelineMode>().is_err());
    }
}
