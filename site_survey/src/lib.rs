//! Core library for the site survey drafting editor.
//!
//! The crate is headless: [`editor::Editor`] consumes abstract input events
//! and reports changes through observers, so any toolkit can host it.

pub mod config;
pub mod drawing;
pub mod dtm;
pub mod editor;
pub mod geometry;
pub mod history;
pub mod io;
pub mod layers;
pub mod naming;
pub mod snap;
pub mod styles;
pub mod surveying;
pub mod tool;
pub mod topology;

pub use editor::{Editor, Notification};
