// ──────────────────────────────────────────────────────────────────────────
// wad/loader.rs
//
//  bytes ─▶ Wad (header + directory) ─▶ RawLevel (typed lumps) ─╮
//                                                                │
//  TextureBank (names → ids) ───────────────────────────────────┤
//                                                                ╰─▶ world::Map
//
// Conversion: every linedef side that faces a sector contributes one
// directed edge to that sector (front side: v1 → v2, back side: v2 → v1),
// so each sector's edges keep its interior on the right.  The edges are
// then chained vertex to vertex into closed rings.
// ──────────────────────────────────────────────────────────────────────────

use std::{collections::HashMap, path::Path};

use glam::{Vec2, vec2};
use log::{debug, info, warn};
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    renderer::{COLOR_GRAY, COLOR_RED, ColorIndex},
    wad::{
        level::{LevelError, RawLevel, RawSidedef},
        raw::{Wad, WadError},
    },
    world::{
        geometry::signed_area,
        map::{Map, MapBuilder, MapError, SectorId, Wall},
        texture::{NO_TEXTURE, TextureBank, TextureId},
    },
};

/// Map units per world unit; a 64-unit Doom grid cell becomes 1.0.
pub const WAD_UNITS_PER_WORLD_UNIT: f32 = 64.0;

/*──────────────────────────── Error type ───────────────────────────*/

#[derive(Error, Debug)]
pub enum LoadError {
    #[error(transparent)]
    Wad(#[from] WadError),

    #[error(transparent)]
    Level(#[from] LevelError),

    #[error(transparent)]
    Map(#[from] MapError),

    #[error("{what} {index} references missing {target_kind} {target}")]
    BadReference {
        what: &'static str,
        index: usize,
        target_kind: &'static str,
        target: i64,
    },

    #[error("sector {sector}: edges do not close into a ring")]
    OpenRing { sector: usize },
}

/*====================================================================*/
/*                       Public API                                   */
/*====================================================================*/

/// Load map `marker` (first map if `None`) from a file on disk.
pub fn load_map_file<P: AsRef<Path>>(
    path: P,
    marker: Option<&str>,
    bank: &TextureBank,
) -> Result<Map, LoadError> {
    let path = path.as_ref();
    info!("Loading map: {}", path.display());
    let wad = Wad::from_file(path)?;
    load_from_wad(&wad, marker, bank)
}

/// Load map `marker` from an in-memory WAD image.
pub fn load_map(bytes: Vec<u8>, marker: Option<&str>, bank: &TextureBank) -> Result<Map, LoadError> {
    let wad = Wad::from_bytes(bytes)?;
    load_from_wad(&wad, marker, bank)
}

pub fn load_from_wad(wad: &Wad, marker: Option<&str>, bank: &TextureBank) -> Result<Map, LoadError> {
    info!(
        "{} size: {} lumps: {}",
        String::from_utf8_lossy(wad.magic()),
        wad.file_size(),
        wad.lumps().len()
    );
    let raw = wad.parse_level(marker)?;
    info!(
        "{}: {} vertices, {} linedefs, {} sidedefs, {} sectors",
        raw.name,
        raw.vertices.len(),
        raw.linedefs.len(),
        raw.sidedefs.len(),
        raw.sectors.len()
    );
    build_map(&raw, bank)
}

/// Convert decoded lumps into sector rings.
pub fn build_map(raw: &RawLevel, bank: &TextureBank) -> Result<Map, LoadError> {
    let refs = resolve_references(raw)?;

    /*----- 1. directed edges per sector --------------------------------*/
    let mut per_sector: Vec<Vec<Edge>> = vec![Vec::new(); raw.sectors.len()];
    for (li, r) in refs.iter().enumerate() {
        let front = r.front.map(|(side, sec)| (&raw.sidedefs[side], sec));
        let back = r.back.map(|(side, sec)| (&raw.sidedefs[side], sec));

        if let (Some((_, f)), Some((_, b))) = (front, back) {
            if f == b {
                debug!("linedef {li}: both sides face sector {f}, ignored");
                continue;
            }
        }
        if let Some((side, sec)) = front {
            per_sector[sec].push(Edge::new(r.v1, r.v2, side, back.map(|(_, s)| s), bank));
        }
        if let Some((side, sec)) = back {
            per_sector[sec].push(Edge::new(r.v2, r.v1, side, front.map(|(_, s)| s), bank));
        }
    }

    /*----- 2. chain into rings and append -----------------------------*/
    let points: Vec<Vec2> = raw
        .vertices
        .iter()
        .map(|v| vec2(v.x as f32, v.y as f32) / WAD_UNITS_PER_WORLD_UNIT)
        .collect();

    let mut builder = MapBuilder::new(raw.name.clone());
    for (si, (sector, edges)) in raw.sectors.iter().zip(&per_sector).enumerate() {
        let ring = outer_ring(si, edges, &points)?;
        builder.push_sector(
            sector.floor_h as f32 / WAD_UNITS_PER_WORLD_UNIT,
            sector.ceil_h as f32 / WAD_UNITS_PER_WORLD_UNIT,
            ring.iter().map(|&e| edges[e].wall(&points)),
        )?;
    }
    Ok(builder.finish()?)
}

/*====================================================================*/
/*                     Reference validation                           */
/*====================================================================*/

/// Linedef with every index checked: vertices, and per side the sidedef
/// plus the sector it faces.
struct LineRefs {
    v1: usize,
    v2: usize,
    front: Option<(usize, usize)>,
    back: Option<(usize, usize)>,
}

fn resolve_references(raw: &RawLevel) -> Result<Vec<LineRefs>, LoadError> {
    let vertex = |li: usize, v: i16| -> Result<usize, LoadError> {
        let idx = v as u16 as usize;
        if idx < raw.vertices.len() {
            Ok(idx)
        } else {
            Err(LoadError::BadReference {
                what: "linedef",
                index: li,
                target_kind: "vertex",
                target: idx as i64,
            })
        }
    };
    let side = |li: usize, s: Option<usize>| -> Result<Option<(usize, usize)>, LoadError> {
        let Some(s) = s else { return Ok(None) };
        let sd = raw.sidedefs.get(s).ok_or(LoadError::BadReference {
            what: "linedef",
            index: li,
            target_kind: "sidedef",
            target: s as i64,
        })?;
        let sec = sd.sector as u16 as usize;
        if sec >= raw.sectors.len() {
            return Err(LoadError::BadReference {
                what: "sidedef",
                index: s,
                target_kind: "sector",
                target: sd.sector as i64,
            });
        }
        Ok(Some((s, sec)))
    };

    raw.linedefs
        .iter()
        .enumerate()
        .map(|(li, l)| {
            Ok(LineRefs {
                v1: vertex(li, l.v1)?,
                v2: vertex(li, l.v2)?,
                front: side(li, l.front_side())?,
                back: side(li, l.back_side())?,
            })
        })
        .collect()
}

/*====================================================================*/
/*                         Ring chaining                              */
/*====================================================================*/

/// One directed boundary edge of a sector.
#[derive(Clone, Copy, Debug)]
struct Edge {
    from: usize,
    to: usize,
    next_sector: Option<SectorId>,
    color: ColorIndex,
    texture: TextureId,
}

impl Edge {
    fn new(
        from: usize,
        to: usize,
        side: &RawSidedef,
        next_sector: Option<usize>,
        bank: &TextureBank,
    ) -> Self {
        let name = side.surface_name();
        Self {
            from,
            to,
            next_sector: next_sector.map(|s| s as SectorId),
            color: name.map_or(COLOR_GRAY, surface_color),
            texture: name.map_or(NO_TEXTURE, |n| bank.id_or_missing(n)),
        }
    }

    fn wall(&self, points: &[Vec2]) -> Wall {
        Wall {
            pos: points[self.from],
            next_sector: self.next_sector,
            color: self.color,
            texture: self.texture,
        }
    }
}

/// Stable palette colour (red, blue, green or yellow) for a texture name.
pub fn surface_color(name: &str) -> ColorIndex {
    // FNV-1a
    let hash = name
        .bytes()
        .map(|b| b.to_ascii_uppercase())
        .fold(0x811c_9dc5u32, |h, b| (h ^ b as u32).wrapping_mul(0x0100_0193));
    COLOR_RED + (hash % 4) as ColorIndex
}

/// Walk the edge graph into closed loops.
///
/// Edges are indexed by their start vertex.  Starting from the lowest
/// unused edge, repeatedly follow the first unused edge leaving the current
/// end vertex until the walk returns to the starting vertex.  When every
/// vertex has as many incoming as outgoing edges (a closed boundary) the
/// walk can only stop at its start.  A walk that dead-ends is returned in
/// `open` instead.
fn chain_loops(edges: &[Edge]) -> (Vec<Vec<usize>>, Vec<Vec<usize>>) {
    let mut outgoing: HashMap<usize, SmallVec<[usize; 2]>> = HashMap::new();
    for (i, e) in edges.iter().enumerate() {
        outgoing.entry(e.from).or_default().push(i);
    }

    let mut used = vec![false; edges.len()];
    let mut loops = Vec::new();
    let mut open = Vec::new();

    for start in 0..edges.len() {
        if used[start] {
            continue;
        }
        used[start] = true;
        let mut chain = vec![start];
        let mut at = edges[start].to;

        loop {
            if at == edges[start].from {
                loops.push(chain);
                break;
            }
            let next = outgoing
                .get(&at)
                .and_then(|out| out.iter().copied().find(|&e| !used[e]));
            match next {
                Some(e) => {
                    used[e] = true;
                    chain.push(e);
                    at = edges[e].to;
                }
                None => {
                    open.push(chain);
                    break;
                }
            }
        }
    }
    (loops, open)
}

/// The sector's outer boundary: the closed loop with the largest area.
fn outer_ring(sector: usize, edges: &[Edge], points: &[Vec2]) -> Result<Vec<usize>, LoadError> {
    let (mut loops, open) = chain_loops(edges);
    if !open.is_empty() {
        warn!(
            "sector {sector}: {} edge(s) do not close, ignored",
            open.iter().map(Vec::len).sum::<usize>()
        );
    }

    let area = |ring: &Vec<usize>| signed_area(ring.iter().map(|&e| points[edges[e].from])).abs();
    loops.sort_by(|a, b| area(b).total_cmp(&area(a)));

    let mut loops = loops.into_iter();
    let ring = loops
        .next()
        .filter(|r| r.len() >= 3)
        .ok_or(LoadError::OpenRing { sector })?;
    let extra = loops.len();
    if extra > 0 {
        warn!("sector {sector}: kept outer ring, dropped {extra} inner ring(s)");
    }
    Ok(ring)
}

/*====================================================================*/
/*                               Tests                                */
/*====================================================================*/
