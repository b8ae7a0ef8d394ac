//! Sector / wall arena.
//!
//! Walls live in one contiguous array; every sector owns the slice
//! `walls[wall_start .. wall_start + wall_count]`.  Wall `i` of a sector is
//! the directed edge from `wall[i].pos` to `wall[(i + 1) % count].pos`.
//!
//! **Winding:** every ring is clockwise in a y-up world, so the sector
//! interior is on the *right* of each directed edge.  For an interior point
//! `o` that means `perp_dot(o - p1, p2 - p1) > 0`, which is the raycaster's
//! front-face test.  Both the hand-authored room and the WAD loader go
//! through [`MapBuilder`], which enforces it.

use glam::{Vec2, vec2};
use thiserror::Error;

use crate::{
    renderer::{
        COLOR_BLUE, COLOR_GREEN, COLOR_RED, COLOR_YELLOW, ColorIndex,
    },
    world::{
        geometry::{EPSILON, VecExt, signed_area},
        texture::{NO_TEXTURE, TextureId},
    },
};

pub type SectorId = u16;

pub const MAX_SECTORS: usize = 512;
pub const MAX_WALLS: usize = MAX_SECTORS * 8;

/// Distances tried when stepping off a wall into the spawn sector.
const SPAWN_INSETS: [f32; 2] = [0.25, 0.01];

/// One vertex of a sector ring plus the surface of the edge leaving it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Wall {
    pub pos: Vec2,
    /// Sector on the other side, `None` for a solid wall.
    pub next_sector: Option<SectorId>,
    /// Palette colour (minimap).
    pub color: ColorIndex,
    /// Texture sampled by the raycaster.
    pub texture: TextureId,
}

impl Wall {
    pub const fn solid(x: f32, y: f32, color: ColorIndex) -> Self {
        Self {
            pos: vec2(x, y),
            next_sector: None,
            color,
            texture: NO_TEXTURE,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sector {
    pub floor_h: f32,
    pub ceil_h: f32,
    pub wall_start: usize,
    pub wall_count: usize,
}

/// Directed edge of a sector ring, as handed out by [`Map::edges`].
#[derive(Clone, Copy, Debug)]
pub struct WallEdge<'a> {
    /// Index into the global wall array.
    pub index: usize,
    pub p1: Vec2,
    pub p2: Vec2,
    pub wall: &'a Wall,
}

#[derive(Error, Debug, PartialEq)]
pub enum MapError {
    #[error("more than {max} sectors")]
    SectorCapacity { max: usize },

    #[error("more than {max} walls")]
    WallCapacity { max: usize },

    #[error("sector {sector} has {count} walls, need at least 3")]
    TooFewWalls { sector: usize, count: usize },

    #[error("sector {sector} is not wound clockwise (signed area {area})")]
    Winding { sector: usize, area: f32 },

    #[error("sector {sector} has a non-finite vertex")]
    NonFinite { sector: usize },

    #[error("wall {wall} links to sector {target}, map has {count}")]
    BadPortal {
        wall: usize,
        target: SectorId,
        count: usize,
    },

    #[error("sector {sector} wall slice {start}+{len} overruns {total} walls")]
    BadSlice {
        sector: usize,
        start: usize,
        len: usize,
        total: usize,
    },

    #[error("map has no sectors")]
    Empty,
}

/// Runtime snapshot of one map (immutable after load, replaced wholesale
/// on reload).
#[derive(Clone, Debug, PartialEq)]
pub struct Map {
    name: String,
    sectors: Vec<Sector>,
    walls: Vec<Wall>,
}

impl Map {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sectors(&self) -> &[Sector] {
        &self.sectors
    }

    pub fn walls(&self) -> &[Wall] {
        &self.walls
    }

    pub fn sector(&self, id: SectorId) -> Option<&Sector> {
        self.sectors.get(id as usize)
    }

    /// Wall ring of sector `id` (empty for an unknown id).
    pub fn sector_walls(&self, id: SectorId) -> &[Wall] {
        match self.sector(id) {
            Some(s) => &self.walls[s.wall_start..s.wall_start + s.wall_count],
            None => &[],
        }
    }

    /// Directed edges of sector `id` in wall order.
    pub fn edges(&self, id: SectorId) -> impl Iterator<Item = WallEdge<'_>> + '_ {
        let (start, ring) = match self.sector(id) {
            Some(s) => (s.wall_start, self.sector_walls(id)),
            None => (0, &[][..]),
        };
        let n = ring.len();
        ring.iter().enumerate().map(move |(i, wall)| WallEdge {
            index: start + i,
            p1: wall.pos,
            p2: ring[(i + 1) % n].pos,
            wall,
        })
    }

    /// Even-odd point-in-polygon test against the ring of `id`.
    pub fn contains_point(&self, id: SectorId, p: Vec2) -> bool {
        let mut inside = false;
        for e in self.edges(id) {
            let (a, b) = (e.p1, e.p2);
            if (a.y > p.y) != (b.y > p.y) {
                let x = a.x + (p.y - a.y) / (b.y - a.y) * (b.x - a.x);
                if p.x < x {
                    inside = !inside;
                }
            }
        }
        inside
    }

    /// Unsigned area enclosed by the ring of `id`.
    pub fn sector_area(&self, id: SectorId) -> f32 {
        signed_area(self.sector_walls(id).iter().map(|w| w.pos)).abs()
    }

    /// Innermost sector whose ring contains `p`.
    ///
    /// Rings carry only their outer boundary, so a room's ring also covers
    /// every sector nested inside it; the smallest containing ring wins.
    /// Equal areas keep the lowest id.
    pub fn sector_at(&self, p: Vec2) -> Option<SectorId> {
        (0..self.sectors.len())
            .map(|i| i as SectorId)
            .filter(|&id| self.contains_point(id, p))
            .min_by(|&a, &b| self.sector_area(a).total_cmp(&self.sector_area(b)))
    }

    /// A point that [`sector_at`](Self::sector_at) places in sector 0.
    ///
    /// The vertex centroid when it qualifies, otherwise a point just inside
    /// the first wall whose midpoint leads there.
    pub fn spawn_point(&self) -> Vec2 {
        let ring = self.sector_walls(0);
        if ring.is_empty() {
            return Vec2::ZERO;
        }
        let centroid = ring.iter().map(|w| w.pos).sum::<Vec2>() / ring.len() as f32;
        let in_spawn = |p: Vec2| self.sector_at(p) == Some(0);
        if in_spawn(centroid) {
            return centroid;
        }
        self.edges(0)
            .filter_map(|e| {
                let d = e.p2 - e.p1;
                // interior is on the right of a clockwise edge
                let inward = vec2(d.y, -d.x).normalize_eps()?;
                Some(((e.p1 + e.p2) * 0.5, inward))
            })
            .flat_map(|(mid, inward)| SPAWN_INSETS.map(|inset| mid + inward * inset))
            .find(|&p| in_spawn(p))
            .unwrap_or(centroid)
    }

    /// Check every arena invariant.
    pub fn validate(&self) -> Result<(), MapError> {
        if self.sectors.is_empty() {
            return Err(MapError::Empty);
        }
        let mut expected_start = 0;
        for (i, s) in self.sectors.iter().enumerate() {
            let end = s.wall_start + s.wall_count;
            // slices are packed in sector order, so disjointness falls out
            if s.wall_start != expected_start || end > self.walls.len() {
                return Err(MapError::BadSlice {
                    sector: i,
                    start: s.wall_start,
                    len: s.wall_count,
                    total: self.walls.len(),
                });
            }
            check_ring(i, &self.walls[s.wall_start..end])?;
            expected_start = end;
        }
        for (i, w) in self.walls.iter().enumerate() {
            if let Some(target) = w.next_sector {
                if target as usize >= self.sectors.len() {
                    return Err(MapError::BadPortal {
                        wall: i,
                        target,
                        count: self.sectors.len(),
                    });
                }
            }
        }
        Ok(())
    }

    /// The 8-wall test room, player start at the origin.
    ///
    /// ```text
    ///    2---3
    ///    |   |
    /// 0--1   4--5
    /// |         |
    /// |    x    |
    /// |         |
    /// 7---------6
    /// ```
    pub fn sample_room() -> Map {
        const WALLS: [Wall; 8] = [
            Wall::solid(-4.0, 2.0, COLOR_RED),
            Wall::solid(-1.0, 2.0, COLOR_GREEN),
            Wall::solid(-1.0, 4.0, COLOR_BLUE),
            Wall::solid(1.0, 4.0, COLOR_GREEN),
            Wall::solid(1.0, 2.0, COLOR_RED),
            Wall::solid(4.0, 2.0, COLOR_YELLOW),
            Wall::solid(4.0, -3.0, COLOR_BLUE),
            Wall::solid(-4.0, -3.0, COLOR_YELLOW),
        ];
        Map {
            name: "SAMPLE".into(),
            sectors: vec![Sector {
                floor_h: 0.0,
                ceil_h: 0.0,
                wall_start: 0,
                wall_count: WALLS.len(),
            }],
            walls: WALLS.to_vec(),
        }
    }
}

fn check_ring(sector: usize, ring: &[Wall]) -> Result<(), MapError> {
    if ring.len() < 3 {
        return Err(MapError::TooFewWalls {
            sector,
            count: ring.len(),
        });
    }
    if ring.iter().any(|w| !w.pos.is_finite()) {
        return Err(MapError::NonFinite { sector });
    }
    let area = signed_area(ring.iter().map(|w| w.pos));
    if area >= -EPSILON {
        return Err(MapError::Winding { sector, area });
    }
    Ok(())
}

/*====================================================================*/
/*                              Builder                                */
/*====================================================================*/

/// Appends sector rings into a fresh arena with capacity checks.
#[derive(Debug)]
pub struct MapBuilder {
    name: String,
    max_sectors: usize,
    max_walls: usize,
    sectors: Vec<Sector>,
    walls: Vec<Wall>,
}

impl MapBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_capacity(name, MAX_SECTORS, MAX_WALLS)
    }

    pub fn with_capacity(name: impl Into<String>, max_sectors: usize, max_walls: usize) -> Self {
        Self {
            name: name.into(),
            max_sectors,
            max_walls,
            sectors: Vec::new(),
            walls: Vec::new(),
        }
    }

    /// Append one sector and its ring; returns the new sector's id.
    pub fn push_sector(
        &mut self,
        floor_h: f32,
        ceil_h: f32,
        ring: impl IntoIterator<Item = Wall>,
    ) -> Result<SectorId, MapError> {
        if self.sectors.len() >= self.max_sectors {
            return Err(MapError::SectorCapacity {
                max: self.max_sectors,
            });
        }
        let ring: Vec<Wall> = ring.into_iter().collect();
        if self.walls.len() + ring.len() > self.max_walls {
            return Err(MapError::WallCapacity {
                max: self.max_walls,
            });
        }
        let id = self.sectors.len();
        check_ring(id, &ring)?;

        self.sectors.push(Sector {
            floor_h,
            ceil_h,
            wall_start: self.walls.len(),
            wall_count: ring.len(),
        });
        self.walls.extend(ring);
        Ok(id as SectorId)
    }

    pub fn finish(self) -> Result<Map, MapError> {
        let map = Map {
            name: self.name,
            sectors: self.sectors,
            walls: self.walls,
        };
        map.validate()?;
        Ok(map)
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
#[cfg(test)]
mod tests {
    use super::*;

    fn square(x0: f32, y0: f32, side: f32) -> [Wall; 4] {
        // clockwise, y-up
        [
            Wall::solid(x0, y0 + side, 1),
            Wall::solid(x0 + side, y0 + side, 1),
            Wall::solid(x0 + side, y0, 1),
            Wall::solid(x0, y0, 1),
        ]
    }

    #[test]
    fn sample_room_is_valid() {
        let room = Map::sample_room();
        room.validate().unwrap();
        assert_eq!(room.sectors().len(), 1);
        assert_eq!(room.sector_walls(0).len(), 8);
    }

    #[test]
    fn builder_matches_sample_room() {
        let room = Map::sample_room();
        let mut b = MapBuilder::new("SAMPLE");
        b.push_sector(0.0, 0.0, room.sector_walls(0).iter().copied())
            .unwrap();
        assert_eq!(b.finish().unwrap(), room);
    }

    #[test]
    fn edges_close_the_ring() {
        let room = Map::sample_room();
        let edges: Vec<_> = room.edges(0).collect();
        assert_eq!(edges.len(), 8);
        for (i, e) in edges.iter().enumerate() {
            assert_eq!(e.p2, edges[(i + 1) % 8].p1);
        }
        assert_eq!(edges[7].p2, vec2(-4.0, 2.0));
    }

    #[test]
    fn interior_is_right_of_every_edge() {
        let room = Map::sample_room();
        let o = Vec2::ZERO;
        for e in room.edges(0) {
            assert!((o - e.p1).perp_dot(e.p2 - e.p1) > 0.0);
        }
    }

    #[test]
    fn counter_clockwise_ring_rejected() {
        let mut ring = square(0.0, 0.0, 1.0);
        ring.reverse();
        let mut b = MapBuilder::new("CCW");
        assert!(matches!(
            b.push_sector(0.0, 1.0, ring),
            Err(MapError::Winding { sector: 0, .. })
        ));
    }

    #[test]
    fn degenerate_ring_rejected() {
        let mut b = MapBuilder::new("TINY");
        let err = b
            .push_sector(0.0, 1.0, square(0.0, 0.0, 1.0).into_iter().take(2))
            .unwrap_err();
        assert_eq!(err, MapError::TooFewWalls { sector: 0, count: 2 });
    }

    #[test]
    fn capacity_overflow_fails() {
        let mut b = MapBuilder::with_capacity("FULL", 2, 6);
        b.push_sector(0.0, 1.0, square(0.0, 0.0, 1.0)).unwrap();
        assert_eq!(
            b.push_sector(0.0, 1.0, square(2.0, 0.0, 1.0)).unwrap_err(),
            MapError::WallCapacity { max: 6 }
        );

        let mut b = MapBuilder::with_capacity("FULL", 1, 100);
        b.push_sector(0.0, 1.0, square(0.0, 0.0, 1.0)).unwrap();
        assert_eq!(
            b.push_sector(0.0, 1.0, square(2.0, 0.0, 1.0)).unwrap_err(),
            MapError::SectorCapacity { max: 1 }
        );
    }

    #[test]
    fn dangling_portal_rejected() {
        let mut ring = square(0.0, 0.0, 1.0);
        ring[1].next_sector = Some(3);
        let mut b = MapBuilder::new("PORTAL");
        b.push_sector(0.0, 1.0, ring).unwrap();
        assert!(matches!(b.finish(), Err(MapError::BadPortal { target: 3, .. })));
    }

    #[test]
    fn empty_map_rejected() {
        assert_eq!(MapBuilder::new("NONE").finish().unwrap_err(), MapError::Empty);
    }

    #[test]
    fn sector_lookup() {
        let mut b = MapBuilder::new("TWO");
        b.push_sector(0.0, 1.0, square(0.0, 0.0, 2.0)).unwrap();
        b.push_sector(0.0, 1.0, square(2.0, 0.0, 2.0)).unwrap();
        let map = b.finish().unwrap();

        assert_eq!(map.sector_at(vec2(1.0, 1.0)), Some(0));
        assert_eq!(map.sector_at(vec2(3.0, 1.5)), Some(1));
        assert_eq!(map.sector_at(vec2(9.0, 9.0)), None);
        assert_eq!(map.spawn_point(), vec2(1.0, 1.0));
    }

    #[test]
    fn nested_sector_wins_over_enclosing_room() {
        let mut b = MapBuilder::new("NEST");
        b.push_sector(0.0, 1.0, square(0.0, 0.0, 4.0)).unwrap();
        b.push_sector(0.25, 1.0, square(1.5, 1.5, 1.0)).unwrap();
        let map = b.finish().unwrap();

        assert_eq!(map.sector_at(vec2(2.0, 2.0)), Some(1));
        assert_eq!(map.sector_at(vec2(0.5, 0.5)), Some(0));
        assert_eq!(map.sector_area(0), 16.0);

        // the centroid sits on the platform, so spawn steps in from the
        // first wall of the room
        let spawn = map.spawn_point();
        assert_eq!(spawn, vec2(2.0, 3.75));
        assert_eq!(map.sector_at(spawn), Some(0));
    }

    #[test]
    fn spawn_avoids_concave_notch() {
        // U shape, vertex centroid (1.5, 1.75) falls in the notch
        let ring = [
            (0.0, 0.0),
            (0.0, 3.0),
            (1.0, 3.0),
            (1.0, 1.0),
            (2.0, 1.0),
            (2.0, 3.0),
            (3.0, 3.0),
            (3.0, 0.0),
        ]
        .map(|(x, y)| Wall::solid(x, y, 1));
        let mut b = MapBuilder::new("U");
        b.push_sector(0.0, 1.0, ring).unwrap();
        let map = b.finish().unwrap();

        assert!(!map.contains_point(0, vec2(1.5, 1.75)));
        let spawn = map.spawn_point();
        assert_eq!(spawn, vec2(0.25, 1.5));
        assert!(map.contains_point(0, spawn));
    }

    #[test]
    fn concave_room_contains_alcove() {
        let room = Map::sample_room();
        assert!(room.contains_point(0, vec2(0.0, 3.0)));
        assert!(!room.contains_point(0, vec2(-2.0, 3.0)));
    }
}
