//! User preference storage and interaction learning

use crate::types::{Mode, UserInteraction, UserPreferences, UserPreferencesUpdate};
use std::collections::VecDeque;
use tracing::debug;

/// Retained interactions for preference derivation
const INTERACTION_BUFFER_CAPACITY: usize = 500;

/// Minimum buffered interactions before learning adjusts anything
const LEARNING_MIN_SAMPLES: usize = 20;

/// Holds learned and declared user preferences
pub struct PreferenceStore {
    preferences: UserPreferences,
    interactions: VecDeque<UserInteraction>,
}

impl PreferenceStore {
    pub fn new() -> Self {
        Self {
            preferences: UserPreferences::default(),
            interactions: VecDeque::new(),
        }
    }

    /// Record an interaction for later preference derivation
    ///
    /// No-op while learning is disabled.
    pub fn record(&mut self, interaction: UserInteraction) {
        if !self.preferences.learning_enabled {
            return;
        }

        self.interactions.push_back(interaction);
        while self.interactions.len() > INTERACTION_BUFFER_CAPACITY {
            self.interactions.pop_front();
        }
        self.derive_preferred_mode();
    }

    /// Snapshot of the current preferences
    pub fn get(&self) -> UserPreferences {
        self.preferences.clone()
    }

    /// Merge a partial update; never fails for well-typed input
    pub fn update(&mut self, update: UserPreferencesUpdate) {
        update.apply_to(&mut self.preferences);
    }

    /// Number of buffered interactions
    pub fn interaction_count(&self) -> usize {
        self.interactions.len()
    }

    /// Flip `preferred_mode` to the mode with strictly more successful
    /// interactions, once enough samples exist. Ties keep the current
    /// preference.
    fn derive_preferred_mode(&mut self) {
        if self.interactions.len() < LEARNING_MIN_SAMPLES {
            return;
        }

        let mut vibecoding = 0usize;
        let mut spec_centric = 0usize;
        for interaction in &self.interactions {
            if interaction.success {
                match interaction.mode {
                    Mode::Vibecoding => vibecoding += 1,
                    Mode::SpecCentric => spec_centric += 1,
                }
            }
        }

        let derived = if vibecoding > spec_centric {
            Mode::Vibecoding
        } else if spec_centric > vibecoding {
            Mode::SpecCentric
        } else {
            return;
        };

        if derived != self.preferences.preferred_mode {
            debug!("Learned preferred mode: {}", derived);
            self.preferences.preferred_mode = derived;
        }
    }
}

impl Default for PreferenceStore {
    fn default() -> Self {
        Self::new()
    }
}
