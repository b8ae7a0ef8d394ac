//! Sector raycaster: a first-person view of 2-D polygon maps, hand-built
//! or loaded from Doom-format WAD files.

pub mod config;
pub mod engine;
pub mod platform;
pub mod renderer;
pub mod wad;
pub mod world;

pub use config::Config;
