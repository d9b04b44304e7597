//! Headlight toggle with edge detection.
//!
//! The value can change from player input (gated by `can_toggle`) or from
//! level scripting (never gated). Side effects are keyed to the value
//! differing from the one settled at the end of the previous tick, so
//! repeated writes of the same value fire nothing.

use crate::config::FlockConfig;
use crate::events::{FlockEvent, HeadlightVisuals, SoundCue};
use crate::rng::FlockRng;

/// Process-wide headlight flag.
#[derive(Debug, Clone)]
pub struct Headlight {
    on: bool,
    can_toggle: bool,
    settled: bool,
}

impl Headlight {
    /// Creates a headlight whose initial value counts as already settled.
    #[must_use]
    pub fn new(on: bool) -> Self {
        Self {
            on,
            can_toggle: true,
            settled: on,
        }
    }

    /// Current value.
    #[must_use]
    pub fn is_on(&self) -> bool {
        self.on
    }

    /// Whether player input may toggle the headlight.
    #[must_use]
    pub fn can_toggle(&self) -> bool {
        self.can_toggle
    }

    /// Gates player input. Scripted calls ignore this gate.
    pub fn set_can_toggle(&mut self, can_toggle: bool) {
        self.can_toggle = can_toggle;
    }

    /// Player pressed the toggle key.
    pub fn press(&mut self) {
        if self.can_toggle {
            self.on = !self.on;
        }
    }

    /// Scripted set.
    pub fn set(&mut self, on: bool) {
        self.on = on;
    }

    /// Scripted flip.
    pub fn toggle(&mut self) {
        self.on = !self.on;
    }

    /// Returns the new value if it differs from the last settled one, and
    /// settles it.
    pub fn take_transition(&mut self) -> Option<bool> {
        if self.on == self.settled {
            return None;
        }
        self.settled = self.on;
        Some(self.on)
    }

    /// Status label for the HUD.
    #[must_use]
    pub fn status_text<'a>(&self, config: &'a FlockConfig) -> &'a str {
        if self.on {
            &config.on_text
        } else {
            &config.off_text
        }
    }
}

/// Side effects for a transition to `on`, in publish order.
pub fn transition_events(on: bool, config: &FlockConfig, rng: &mut FlockRng) -> [FlockEvent; 4] {
    let (lo, hi) = config.headlight_pitch_range;
    let cue = if on {
        SoundCue::HeadlightOn
    } else {
        SoundCue::HeadlightOff
    };

    [
        FlockEvent::HeadlightChanged { on },
        FlockEvent::VisualsApplied(HeadlightVisuals::for_headlight(on)),
        FlockEvent::TransitionSound {
            cue,
            volume: config.headlight_volume,
            pitch: rng.range(lo, hi),
        },
        FlockEvent::GlitchBurst,
    ]
}
