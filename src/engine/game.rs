//! Frame driver: the only place world state changes.
//!
//! ```text
//! input ─▶ move / turn ─▶ clear ─▶ columns ─▶ minimap ─▶ text
//! ```

use glam::Vec2;
use log::{info, warn};
use thiserror::Error;

use crate::{
    config::Config,
    engine::{minimap::draw_minimap, raycast::render_columns},
    platform::{Input, InputCmd, ResourceError, Resources},
    renderer::{COLOR_BLACK, COLOR_WHITE, Canvas},
    wad::{LoadError, load_map},
    world::{
        camera::Player,
        map::{Map, SectorId},
        texture::TextureBank,
    },
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

#[derive(Error, Debug)]
pub enum GameError {
    #[error(transparent)]
    Resource(#[from] ResourceError),

    #[error(transparent)]
    Load(#[from] LoadError),
}

pub struct Game {
    config: Config,
    map: Map,
    player: Player,
    sector: SectorId,
    textures: TextureBank,
    depths: Vec<Option<f32>>,
    frame: u64,
}

impl Game {
    pub fn new(config: Config, map: Map, player: Player, textures: TextureBank) -> Self {
        let sector = map.sector_at(player.pos).unwrap_or(0);
        Self {
            depths: vec![None; config.width],
            config,
            map,
            player,
            sector,
            textures,
            frame: 0,
        }
    }

    /// The hand-authored room, player at the origin facing +Y.
    pub fn sample(config: Config) -> Self {
        let player = Player::new(Vec2::ZERO, Vec2::Y, config.fov_scale);
        Self::new(config, Map::sample_room(), player, TextureBank::default())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn map(&self) -> &Map {
        &self.map
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    /// Sector the player was last seen in.
    pub fn sector(&self) -> SectorId {
        self.sector
    }

    /// Per-column wall depth of the last frame.
    pub fn depths(&self) -> &[Option<f32>] {
        &self.depths
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn textures_mut(&mut self) -> &mut TextureBank {
        &mut self.textures
    }

    /// Swap in a fully built map; the player restarts at its spawn point.
    pub fn replace_map(&mut self, map: Map) {
        let pos = map.spawn_point();
        self.player = Player::new(pos, self.player.dir(), self.config.fov_scale);
        self.sector = map.sector_at(pos).unwrap_or(0);
        self.map = map;
    }

    /// Load `marker` from the WAD resource `name`.
    ///
    /// On failure nothing changes: the previous map, player and sector stay.
    pub fn load_map(
        &mut self,
        res: &impl Resources,
        name: &str,
        marker: Option<&str>,
    ) -> Result<(), GameError> {
        let bytes = res.load_bytes(name)?;
        let map = load_map(bytes, marker, &self.textures)?;
        info!(
            "{name}: map {} ({} sectors, {} walls)",
            map.name(),
            map.sectors().len(),
            map.walls().len()
        );
        self.replace_map(map);
        Ok(())
    }

    /// Load named bitmaps into the texture bank; failures keep the fallback.
    ///
    /// Walls pick their texture when a map is built, so call this before
    /// [`load_map`](Self::load_map).  [`DirResources`](crate::platform::DirResources)
    /// has no image decoder; a host that wants textured walls hands in
    /// decoded bitmaps through [`MemResources`](crate::platform::MemResources)
    /// or its own [`Resources`].
    pub fn load_textures<'a>(&mut self, res: &impl Resources, names: impl IntoIterator<Item = &'a str>) {
        for name in names {
            match res.load_bitmap(name) {
                Ok(bmp) => {
                    if let Err(e) = self.textures.insert(name, bmp) {
                        warn!("texture {name}: {e}");
                    }
                }
                Err(e) => warn!("texture {name}: {e}"),
            }
        }
    }

    /// Run one frame.  `frame_time` is the previous frame's duration in
    /// seconds, shown in the overlay.
    pub fn step(&mut self, input: &impl Input, canvas: &mut impl Canvas, frame_time: f32) -> Flow {
        let cmd = InputCmd::from_input(input);
        if cmd.quit {
            return Flow::Quit;
        }
        self.apply(&cmd);
        self.render(canvas, frame_time);
        self.frame += 1;
        Flow::Continue
    }

    fn apply(&mut self, cmd: &InputCmd) {
        let c = &self.config;
        // strafe is +right, `Player::step` takes +left
        self.player.step(cmd.forward * c.move_speed, -cmd.strafe * c.strafe_speed);
        self.player.turn(cmd.mouse_dx * c.mouse_sensitivity + cmd.turn * c.turn_speed);

        if let Some(s) = self.map.sector_at(self.player.pos) {
            self.sector = s;
        }
    }

    fn render(&mut self, canvas: &mut impl Canvas, frame_time: f32) {
        // plane is derived from dir here, every frame
        let view = self.player.view();

        canvas.reset_clip();
        canvas.clear(COLOR_BLACK);

        render_columns(
            canvas,
            &self.map,
            self.sector,
            &view,
            &self.textures,
            &mut self.depths,
        );
        draw_minimap(
            canvas,
            &self.map,
            &view,
            self.config.minimap_size,
            self.config.minimap_zoom,
        );

        let text = format!("{frame_time:03.6} {:05}", self.frame);
        canvas.draw_text(&text, 0, 0, COLOR_WHITE);
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
