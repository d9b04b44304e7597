//! Event bus for headlight transition side effects.
//!
//! The flock never plays audio or touches render state itself. It publishes
//! what should happen and the host drains the bus once per frame.

use crossbeam_channel::{bounded, Receiver, Sender};
use serde::{Deserialize, Serialize};

/// Which transition sound to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundCue {
    /// Headlight switched on
    HeadlightOn,
    /// Headlight switched off
    HeadlightOff,
}

/// Visibility of the objects tied to the headlight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadlightVisuals {
    /// Night-vision post volume
    pub night_vision: bool,
    /// Global scene lights
    pub global_lights: bool,
    /// Red headlamp mesh (lit while the headlight is off)
    pub headlamp_red: bool,
}

impl HeadlightVisuals {
    /// Visual state for a headlight value.
    #[must_use]
    pub const fn for_headlight(on: bool) -> Self {
        Self {
            night_vision: on,
            global_lights: on,
            headlamp_red: !on,
        }
    }
}

/// Event types that can be sent through the event bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FlockEvent {
    /// Headlight changed value this tick
    HeadlightChanged {
        /// New value
        on: bool,
    },
    /// Apply these visibilities
    VisualsApplied(HeadlightVisuals),
    /// Play a one-shot transition sound
    TransitionSound {
        /// Which clip
        cue: SoundCue,
        /// Volume (0.0 - 1.0)
        volume: f32,
        /// Randomized pitch
        pitch: f32,
    },
    /// A glitch pulse started
    GlitchBurst,
}

/// Event bus for broadcasting flock events to the host.
#[derive(Debug)]
pub struct EventBus {
    sender: Sender<FlockEvent>,
    receiver: Receiver<FlockEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

impl EventBus {
    /// Creates a new event bus with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self { sender, receiver }
    }

    /// Publishes an event to the bus.
    pub fn publish(&self, event: FlockEvent) {
        // Non-blocking send - if full, event is dropped
        let _ = self.sender.try_send(event);
    }

    /// Drains all pending events.
    pub fn drain(&self) -> Vec<FlockEvent> {
        self.receiver.try_iter().collect()
    }

    /// Returns the number of pending events.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }
}
