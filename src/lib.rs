//! Admission score and rank explorer for Shanghai gaokao data.
//!
//! The data layer (`data`, `nav`, `state`) is plain Rust with no UI types;
//! `ui` and `app` draw it with egui.

pub mod app;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod nav;
pub mod state;
pub mod ui;
