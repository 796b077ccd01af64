//! User preference and interaction types

use super::{Mode, SpecCentricConfig, SpecCentricConfigUpdate, VibecodingConfig, VibecodingConfigUpdate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Learned and declared user preferences
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    pub preferred_mode: Mode,
    pub vibecoding_prefs: VibecodingConfig,
    pub spec_centric_prefs: SpecCentricConfig,
    /// Tie-breaking hints, never hard constraints
    pub agent_priorities: HashMap<String, u32>,
    pub custom_prompts: Vec<String>,
    pub learning_enabled: bool,
}

impl Default for UserPreferences {
    fn default() -> Self {
        let agent_priorities = [
            ("context", 10),
            ("analysis", 8),
            ("generation", 7),
            ("validation", 6),
            ("communication", 5),
        ]
        .into_iter()
        .map(|(id, weight)| (id.to_string(), weight))
        .collect();

        Self {
            preferred_mode: Mode::Vibecoding,
            vibecoding_prefs: VibecodingConfig::default(),
            spec_centric_prefs: SpecCentricConfig::default(),
            agent_priorities,
            custom_prompts: Vec::new(),
            learning_enabled: true,
        }
    }
}

/// Partial update for [`UserPreferences`]
///
/// `agent_priorities` merges per key; `custom_prompts` replaces the list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserPreferencesUpdate {
    pub preferred_mode: Option<Mode>,
    pub vibecoding_prefs: Option<VibecodingConfigUpdate>,
    pub spec_centric_prefs: Option<SpecCentricConfigUpdate>,
    pub agent_priorities: Option<HashMap<String, u32>>,
    pub custom_prompts: Option<Vec<String>>,
    pub learning_enabled: Option<bool>,
}

impl UserPreferencesUpdate {
    /// Merge the provided fields into `prefs`
    pub fn apply_to(&self, prefs: &mut UserPreferences) {
        if let Some(mode) = self.preferred_mode {
            prefs.preferred_mode = mode;
        }
        if let Some(update) = &self.vibecoding_prefs {
            update.apply_to(&mut prefs.vibecoding_prefs);
        }
        if let Some(update) = &self.spec_centric_prefs {
            update.apply_to(&mut prefs.spec_centric_prefs);
        }
        if let Some(priorities) = &self.agent_priorities {
            for (id, weight) in priorities {
                prefs.agent_priorities.insert(id.clone(), *weight);
            }
        }
        if let Some(prompts) = &self.custom_prompts {
            prefs.custom_prompts = prompts.clone();
        }
        if let Some(enabled) = self.learning_enabled {
            prefs.learning_enabled = enabled;
        }
    }
}

/// A single recorded user interaction, consumed by preference learning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInteraction {
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub action: String,
    pub context: String,
    pub mode: Mode,
    pub success: bool,
    pub duration_ms: u64,
}

impl UserInteraction {
    pub fn new(
        action: impl Into<String>,
        context: impl Into<String>,
        mode: Mode,
        success: bool,
        duration_ms: u64,
    ) -> Self {
        Self {
            timestamp: chrono::Utc::now(),
            action: action.into(),
            context: context.into(),
            mode,
            success,
            duration_ms,
        }
    }
}
