pub mod game;
pub mod intersect;
pub mod minimap;
pub mod raycast;

pub use game::{Flow, Game, GameError};
pub use intersect::{Intersection, line_ray_intersect};
pub use minimap::draw_minimap;
pub use raycast::{ColumnHit, cast_column, draw_column, projected_height, render_columns};
