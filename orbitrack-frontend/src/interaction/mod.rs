//! Selection state machine, pointer/search resolution and camera transitions.
//!
//! All mutable selection state lives in a [`SelectionContext`] owned by the
//! caller and handed to [`InteractionController`] on every call.

mod camera;
mod controller;

pub use camera::{CameraTransition, FOCUS_DURATION, HOME_POSITION, RETURN_DURATION};
pub use controller::{InfoPanel, InteractionController, SearchOutcome, SelectionContext, SelectionState};
