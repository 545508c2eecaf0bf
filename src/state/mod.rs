//! Host input state.
//!
//! - [`keyboard`] - key events and routing into the focused component

pub mod keyboard;
