//! # Mothlight Flock
//!
//! Moth flock systems for Mothlight.
//!
//! This crate provides the flock core and the level pieces that drive it:
//! - Moth registry and per-moth motion state machine (seek, orbit, forced follow)
//! - Recall line behind the player with per-pole pickup
//! - Forced-target overrides and roam-box containment
//! - Headlight toggle with edge-triggered side effects and glitch pulse
//! - Event bus for host-side audio and visuals
//! - World-query trait with an in-memory world
//! - Level collaborators (priority radius, roam-box listener, lock zone,
//!   transmitter, follower HUD and goal checker)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod config;
pub mod controller;
pub mod events;
pub mod forced;
pub mod glitch;
pub mod headlight;
pub mod hud;
pub mod lamps;
pub mod lock_zone;
pub mod moth;
pub mod motion;
pub mod priority_radius;
pub mod query;
pub mod registry;
pub mod rng;
pub mod roam_box;
pub mod roam_box_listener;
pub mod transmitter;
pub mod world;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::*;
    pub use crate::controller::*;
    pub use crate::events::*;
    pub use crate::forced::*;
    pub use crate::glitch::*;
    pub use crate::headlight::*;
    pub use crate::hud::*;
    pub use crate::lamps::*;
    pub use crate::lock_zone::*;
    pub use crate::moth::*;
    pub use crate::motion::*;
    pub use crate::priority_radius::*;
    pub use crate::query::*;
    pub use crate::registry::*;
    pub use crate::rng::*;
    pub use crate::roam_box::*;
    pub use crate::roam_box_listener::*;
    pub use crate::transmitter::*;
    pub use crate::world::*;
}

pub use prelude::*;
