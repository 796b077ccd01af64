//! Operating mode and per-mode configuration

use crate::error::{ConfigError, Error, Result};
use crate::types::{Mode, ModeConfig, ModeConfigUpdate, ModeEvent, MAX_CONTEXT_AWARENESS};
use tokio::sync::broadcast;
use tracing::info;

const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Owns the current operating mode and both configuration bundles
///
/// Switching mode never resets agent state or task history; in-flight tasks
/// bound to the previous mode run to completion under it.
pub struct ModeController {
    current: Mode,
    config: ModeConfig,
    events: broadcast::Sender<ModeEvent>,
}

impl ModeController {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            current: Mode::default(),
            config: ModeConfig::default(),
            events,
        }
    }

    /// Subscribe to mode-change and config-change events
    pub fn subscribe(&self) -> broadcast::Receiver<ModeEvent> {
        self.events.subscribe()
    }

    pub fn mode(&self) -> Mode {
        self.current
    }

    /// Switch the active mode
    ///
    /// Never fails for a valid mode value.
    pub fn set_mode(&mut self, mode: Mode) {
        info!("Switching mode to {}", mode);
        self.current = mode;
        let _ = self.events.send(ModeEvent::ModeChanged { mode });
    }

    /// Read-only view of both configuration bundles
    pub fn config(&self) -> ModeConfig {
        self.config.clone()
    }

    /// Merge a partial update into the configuration bundles
    ///
    /// Rejects out-of-range values and leaves the prior config unchanged on
    /// rejection.
    pub fn update_config(&mut self, update: ModeConfigUpdate) -> Result<()> {
        Self::validate(&update)?;

        if let Some(vibecoding) = &update.vibecoding {
            vibecoding.apply_to(&mut self.config.vibecoding);
        }
        if let Some(spec_centric) = &update.spec_centric {
            spec_centric.apply_to(&mut self.config.spec_centric);
        }

        let _ = self.events.send(ModeEvent::ConfigChanged {
            config: self.config.clone(),
        });
        Ok(())
    }

    fn validate(update: &ModeConfigUpdate) -> Result<()> {
        if let Some(vibecoding) = &update.vibecoding {
            if let Some(score) = vibecoding.context_awareness {
                if score > MAX_CONTEXT_AWARENESS {
                    return Err(Error::Config(ConfigError::ValueOutOfRange {
                        field: "contextAwareness",
                        value: i64::from(score),
                        min: 0,
                        max: i64::from(MAX_CONTEXT_AWARENESS),
                    }));
                }
            }
        }
        Ok(())
    }
}

impl Default for ModeController {
    fn default() -> Self {
        Self::new()
    }
}
