//! A transparent click-through desktop overlay with an animated character.
//!
//! [`shell::ShellPlugin`] owns the window and its mouse passthrough;
//! [`view::ViewPlugin`] owns the character, its input and its drawing.

pub mod config;
pub mod controls;
pub mod draw;
pub mod mate;
pub mod menu;
pub mod paint;
pub mod pointer;
pub mod shell;
pub mod state;
pub mod tasks;
pub mod variant;
pub mod view;
