//! Host services the engine consumes: input state and named resources.
//!
//! The window/event loop lives in the binaries; the library only sees
//! these traits.

use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
};

use thiserror::Error;

use crate::world::texture::IndexedBitmap;

/*──────────────────────────── Input ───────────────────────────────*/

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Escape,
    W,
    A,
    S,
    D,
    Up,
    Down,
    Left,
    Right,
}

pub trait Input {
    /// Held this frame.
    fn key_down(&self, key: Key) -> bool;

    /// Went down this frame (edge-triggered).
    fn key_pressed(&self, key: Key) -> bool;

    /// Horizontal mouse motion since the previous frame, in pixels.
    fn mouse_delta_x(&self) -> f32;
}

/// One frame of player intent, built from raw [`Input`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InputCmd {
    pub forward: f32, // –1 … +1
    pub strafe: f32,  // –1 … +1  (left / right)
    pub turn: f32,    // –1 … +1  (right / left)
    pub mouse_dx: f32,
    pub quit: bool,
}

impl InputCmd {
    pub fn from_input(input: &impl Input) -> Self {
        let mut cmd = Self {
            mouse_dx: input.mouse_delta_x(),
            quit: input.key_pressed(Key::Escape),
            ..Self::default()
        };

        if input.key_down(Key::W) || input.key_down(Key::Up) {
            cmd.forward += 1.0;
        }
        if input.key_down(Key::S) || input.key_down(Key::Down) {
            cmd.forward -= 1.0;
        }
        if input.key_down(Key::A) {
            cmd.strafe -= 1.0;
        }
        if input.key_down(Key::D) {
            cmd.strafe += 1.0;
        }
        if input.key_down(Key::Left) {
            cmd.turn += 1.0;
        }
        if input.key_down(Key::Right) {
            cmd.turn -= 1.0;
        }
        cmd
    }
}

/*──────────────────────────── Resources ───────────────────────────*/

#[derive(Error, Debug)]
pub enum ResourceError {
    #[error("resource `{0}` not found")]
    NotFound(String),

    #[error("cannot decode `{name}`: {reason}")]
    Decode { name: String, reason: String },

    #[error("reading `{name}`: {source}")]
    Io {
        name: String,
        #[source]
        source: io::Error,
    },
}

pub trait Resources {
    fn load_bytes(&self, name: &str) -> Result<Vec<u8>, ResourceError>;

    fn load_bitmap(&self, name: &str) -> Result<IndexedBitmap, ResourceError>;
}

/// Resources read from files under a root directory.
///
/// Image decoding is not built in: [`Resources::load_bitmap`] reports a
/// decode error, and callers fall back to the checkerboard.
#[derive(Clone, Debug)]
pub struct DirResources {
    root: PathBuf,
}

impl DirResources {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Resources for DirResources {
    fn load_bytes(&self, name: &str) -> Result<Vec<u8>, ResourceError> {
        fs::read(self.root.join(name)).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ResourceError::NotFound(name.to_owned()),
            _ => ResourceError::Io {
                name: name.to_owned(),
                source: e,
            },
        })
    }

    fn load_bitmap(&self, name: &str) -> Result<IndexedBitmap, ResourceError> {
        // surface NotFound before the decode error
        self.load_bytes(name)?;
        Err(ResourceError::Decode {
            name: name.to_owned(),
            reason: "no image decoder available".into(),
        })
    }
}

/// In-memory resources, for embedding and tests.
#[derive(Clone, Debug, Default)]
pub struct MemResources {
    bytes: HashMap<String, Vec<u8>>,
    bitmaps: HashMap<String, IndexedBitmap>,
}

impl MemResources {
    pub fn insert_bytes(&mut self, name: impl Into<String>, data: Vec<u8>) {
        self.bytes.insert(name.into(), data);
    }

    pub fn insert_bitmap(&mut self, name: impl Into<String>, bitmap: IndexedBitmap) {
        self.bitmaps.insert(name.into(), bitmap);
    }
}

impl Resources for MemResources {
    fn load_bytes(&self, name: &str) -> Result<Vec<u8>, ResourceError> {
        self.bytes
            .get(name)
            .cloned()
            .ok_or_else(|| ResourceError::NotFound(name.to_owned()))
    }

    fn load_bitmap(&self, name: &str) -> Result<IndexedBitmap, ResourceError> {
        self.bitmaps
            .get(name)
            .cloned()
            .ok_or_else(|| ResourceError::NotFound(name.to_owned()))
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[derive(Default)]
    struct Keys {
        down: HashSet<Key>,
        pressed: HashSet<Key>,
        dx: f32,
    }

    impl Input for Keys {
        fn key_down(&self, key: Key) -> bool {
            self.down.contains(&key)
        }
        fn key_pressed(&self, key: Key) -> bool {
            self.pressed.contains(&key)
        }
        fn mouse_delta_x(&self) -> f32 {
            self.dx
        }
    }

    #[test]
    fn opposite_keys_cancel() {
        let keys = Keys {
            down: [Key::W, Key::S, Key::A, Key::Left].into(),
            dx: 3.0,
            ..Keys::default()
        };
        let cmd = InputCmd::from_input(&keys);
        assert_eq!(cmd.forward, 0.0);
        assert_eq!(cmd.strafe, -1.0);
        assert_eq!(cmd.turn, 1.0);
        assert_eq!(cmd.mouse_dx, 3.0);
        assert!(!cmd.quit);
    }

    #[test]
    fn escape_is_edge_triggered() {
        let held = Keys {
            down: [Key::Escape].into(),
            ..Keys::default()
        };
        assert!(!InputCmd::from_input(&held).quit);
        let pressed = Keys {
            pressed: [Key::Escape].into(),
            ..Keys::default()
        };
        assert!(InputCmd::from_input(&pressed).quit);
    }

    #[test]
    fn dir_resources_read_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("doom1.wad"), b"PWAD").unwrap();
        let res = DirResources::new(dir.path());

        assert_eq!(res.load_bytes("doom1.wad").unwrap(), b"PWAD");
        assert!(matches!(
            res.load_bytes("nope.wad"),
            Err(ResourceError::NotFound(n)) if n == "nope.wad"
        ));
        assert!(matches!(
            res.load_bitmap("doom1.wad"),
            Err(ResourceError::Decode { .. })
        ));
    }

    #[test]
    fn mem_resources() {
        let mut res = MemResources::default();
        res.insert_bytes("a", vec![1, 2]);
        res.insert_bitmap("chess", IndexedBitmap::checker());
        assert_eq!(res.load_bytes("a").unwrap(), vec![1, 2]);
        assert_eq!(res.load_bitmap("chess").unwrap().w, 64);
        assert!(matches!(res.load_bytes("b"), Err(ResourceError::NotFound(_))));
    }
}
