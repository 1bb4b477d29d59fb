//! Block document editor engine for Notewell notes.
//!
//! The engine owns an ordered sequence of typed blocks and keeps it
//! consistent with live editable surfaces supplied by the host. Rendering,
//! persistence, and upload transport stay outside; the host wires them up
//! through [`editor::Editor`], the [`surface::TextSurface`] trait, and the
//! `on_change` callback.

pub mod attachments;
pub mod blocks;
pub mod document;
pub mod drag;
pub mod editor;
pub mod notices;
pub mod slash;
pub mod surface;

pub use blocks::{Block, BlockProperties, BlockType};
pub use document::{Document, FocusTarget};
pub use editor::{Editor, Key, KeyEvent};
pub use surface::TextSurface;
