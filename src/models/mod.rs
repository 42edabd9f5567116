//! Data models for the promotion authoring client.
//!
//! `draft` holds the flat, form-shaped data the wizard accumulates; `payload` and
//! `promotion` match the backend's nested wire shapes.

mod draft;
mod payload;
mod promotion;

pub use draft::*;
pub use payload::*;
pub use promotion::*;
