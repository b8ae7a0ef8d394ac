//! Tunables for the viewer and the frame driver.

use crate::world::camera::DEFAULT_FOV_SCALE;

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Canvas size in pixels.
    pub width: usize,
    pub height: usize,
    /// Window pixels per canvas pixel.
    pub scale: usize,

    /// World units per frame along `dir`.
    pub move_speed: f32,
    /// World units per frame along `perp(dir)`.
    pub strafe_speed: f32,
    /// Radians per pixel of horizontal mouse motion.
    pub mouse_sensitivity: f32,
    /// Radians per frame while an arrow key is held.
    pub turn_speed: f32,
    pub fov_scale: f32,

    /// Side of the square minimap, in pixels.
    pub minimap_size: i32,
    /// Minimap pixels per world unit.
    pub minimap_zoom: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            width: 320,
            height: 240,
            scale: 3,
            move_speed: 0.08,
            strafe_speed: 0.06,
            mouse_sensitivity: 0.005,
            turn_speed: 0.04,
            fov_scale: DEFAULT_FOV_SCALE,
            minimap_size: 100,
            minimap_zoom: 5.0,
        }
    }
}
