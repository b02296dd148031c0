// src/lib.rs
//! Interactive 3D wellbore viewer library.
//!
//! Loads a well from a data directory through `wellpath`, renders the pipe
//! with simulation data scrolling along it, and drives playback and reloads
//! from an egui overlay.

pub mod app;
pub mod camera;
pub mod config;
pub mod data;
pub mod events;
pub mod loader;
pub mod reload;
pub mod renderer;
pub mod ui;
