//! Widgets
//!
//! - [`BubbleWidget`]: wrapped speech bubble
//! - [`CharacterWidget`]: one character unit with its optional session label

mod bubble;
mod character;

pub use bubble::BubbleWidget;
pub use character::{animation_style, CharacterWidget};
