//! Development modes and their configuration bundles

use serde::{Deserialize, Serialize};

/// The active development style
///
/// Exactly one mode is active at any time. Switching mode never resets
/// agent state or task history.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Mode {
    #[serde(rename = "vibecoding")]
    Vibecoding,
    #[serde(rename = "spec-centric")]
    SpecCentric,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vibecoding => "vibecoding",
            Self::SpecCentric => "spec-centric",
        }
    }
}

impl Default for Mode {
    fn default() -> Self {
        Self::Vibecoding
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Upper bound for the `context_awareness` score
pub const MAX_CONTEXT_AWARENESS: u8 = 100;

/// Options governing the vibecoding mode
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VibecodingConfig {
    pub auto_suggestions: bool,
    /// Delay before surfacing suggestions, ms
    pub suggestions_delay: u64,
    pub proactive_refactoring: bool,
    /// 0-100
    pub context_awareness: u8,
    pub flow_preservation: bool,
    pub minimum_interruption: bool,
}

impl Default for VibecodingConfig {
    fn default() -> Self {
        Self {
            auto_suggestions: true,
            suggestions_delay: 500,
            proactive_refactoring: true,
            context_awareness: 80,
            flow_preservation: true,
            minimum_interruption: true,
        }
    }
}

/// Options governing the spec-centric mode
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SpecCentricConfig {
    pub requirement_validation: bool,
    pub test_driven_development: bool,
    pub architecture_compliance: bool,
    pub formal_verification: bool,
    pub documentation_generation: bool,
    pub specification_tracking: bool,
}

impl Default for SpecCentricConfig {
    fn default() -> Self {
        Self {
            requirement_validation: true,
            test_driven_development: true,
            architecture_compliance: true,
            formal_verification: false,
            documentation_generation: true,
            specification_tracking: true,
        }
    }
}

/// Both configuration bundles
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ModeConfig {
    pub vibecoding: VibecodingConfig,
    pub spec_centric: SpecCentricConfig,
}

/// Partial update for [`VibecodingConfig`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VibecodingConfigUpdate {
    pub auto_suggestions: Option<bool>,
    pub suggestions_delay: Option<u64>,
    pub proactive_refactoring: Option<bool>,
    pub context_awareness: Option<u8>,
    pub flow_preservation: Option<bool>,
    pub minimum_interruption: Option<bool>,
}

impl VibecodingConfigUpdate {
    /// Merge the provided fields into `config`
    pub fn apply_to(&self, config: &mut VibecodingConfig) {
        if let Some(v) = self.auto_suggestions {
            config.auto_suggestions = v;
        }
        if let Some(v) = self.suggestions_delay {
            config.suggestions_delay = v;
        }
        if let Some(v) = self.proactive_refactoring {
            config.proactive_refactoring = v;
        }
        if let Some(v) = self.context_awareness {
            config.context_awareness = v;
        }
        if let Some(v) = self.flow_preservation {
            config.flow_preservation = v;
        }
        if let Some(v) = self.minimum_interruption {
            config.minimum_interruption = v;
        }
    }
}

/// Partial update for [`SpecCentricConfig`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpecCentricConfigUpdate {
    pub requirement_validation: Option<bool>,
    pub test_driven_development: Option<bool>,
    pub architecture_compliance: Option<bool>,
    pub formal_verification: Option<bool>,
    pub documentation_generation: Option<bool>,
    pub specification_tracking: Option<bool>,
}

impl SpecCentricConfigUpdate {
    /// Merge the provided fields into `config`
    pub fn apply_to(&self, config: &mut SpecCentricConfig) {
        if let Some(v) = self.requirement_validation {
            config.requirement_validation = v;
        }
        if let Some(v) = self.test_driven_development {
            config.test_driven_development = v;
        }
        if let Some(v) = self.architecture_compliance {
            config.architecture_compliance = v;
        }
        if let Some(v) = self.formal_verification {
            config.formal_verification = v;
        }
        if let Some(v) = self.documentation_generation {
            config.documentation_generation = v;
        }
        if let Some(v) = self.specification_tracking {
            config.specification_tracking = v;
        }
    }
}

/// Partial update covering either or both bundles
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModeConfigUpdate {
    pub vibecoding: Option<VibecodingConfigUpdate>,
    pub spec_centric: Option<SpecCentricConfigUpdate>,
}

/// Change notification emitted by the mode controller
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ModeEvent {
    ModeChanged { mode: Mode },
    ConfigChanged { config: ModeConfig },
}
