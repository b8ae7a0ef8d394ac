//! # WAD container
//!
//! * Holds the whole file in RAM.
//! * Header and directory decoded field by field (little-endian).
//! * Zero-copy access to individual lumps.
//! * Decodes fixed-size lump records into typed vectors with **bincode 2**.
//!
//! Both `IWAD` and `PWAD` files are accepted.

use bincode::{Decode, config, decode_from_slice};
use byteorder::{LittleEndian as LE, ReadBytesExt};
use once_cell::sync::Lazy;
use regex::Regex;
use std::{
    io::{self, Read},
    path::Path,
};
use thiserror::Error;

/// `identifier[4] lump_count:i32 directory_offset:i32`
pub const HEADER_SIZE: usize = 12;

/// `file_offset:i32 file_length:i32 name[8]`
pub const DIR_ENTRY_SIZE: usize = 16;

/// One entry in the lump directory (16 bytes on disk).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LumpInfo {
    pub name: [u8; 8],
    pub offset: i32,
    pub size: i32,
}

/// Fixed-size record stored back to back inside a named lump.
pub trait LumpRecord: Decode<()> {
    /// Exact 8-byte directory name, without NUL padding.
    const LUMP: &'static str;
    /// On-disk size of one record in bytes.
    const SIZE: usize;
}

/// Entire WAD in memory (raw bytes + parsed directory).
#[derive(Debug)]
pub struct Wad {
    magic: [u8; 4],
    lumps: Vec<LumpInfo>,
    bytes: Vec<u8>,
}

/// Loader / decoding errors.
#[derive(Error, Debug)]
pub enum WadError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("malformed header: {0}")]
    MalformedHeader(&'static str),

    #[error("unknown identifier {0:?}, expected IWAD or PWAD")]
    BadMagic([u8; 4]),

    #[error("directory of {count} entries at {offset} runs past end of file ({file_size})")]
    TruncatedDirectory {
        offset: i32,
        count: i32,
        file_size: usize,
    },

    #[error("lump index {0} out of range")]
    BadIndex(usize),

    #[error("lump {name} (# {index}) slice {offset}+{size} past EOF ({file_size})")]
    BadOffset {
        index: usize,
        name: String,
        offset: i32,
        size: i32,
        file_size: usize,
    },

    #[error("lump {name} (# {index}) size {size} not multiple of element {elem_size}")]
    BadLumpSize {
        index: usize,
        name: String,
        size: usize,
        elem_size: usize,
    },

    #[error("lump {name} (# {index}) element {elem}: {source}")]
    BadElement {
        index: usize,
        name: String,
        elem: usize,
        source: bincode::error::DecodeError,
    },
}

impl Wad {
    // ------------------------------------------------------------------ //
    // Low-level helpers
    // ------------------------------------------------------------------ //

    /// Expose directory as a read-only slice
    pub fn lumps(&self) -> &[LumpInfo] {
        &self.lumps
    }

    /// `b"IWAD"` or `b"PWAD"`.
    pub fn magic(&self) -> &[u8; 4] {
        &self.magic
    }

    /// Total file size in bytes.
    pub fn file_size(&self) -> usize {
        self.bytes.len()
    }

    /// Return &str view of an 8-byte lump name (trimmed at first NUL).
    pub fn lump_name_str(name: &[u8; 8]) -> &str {
        let end = name.iter().position(|&b| b == 0).unwrap_or(name.len());
        std::str::from_utf8(&name[..end]).unwrap_or("?")
    }

    /// Name of lump `idx`, `"?"` when out of range.
    pub fn name_of(&self, idx: usize) -> &str {
        self.lumps
            .get(idx)
            .map(|l| Self::lump_name_str(&l.name))
            .unwrap_or("?")
    }

    /// Raw bytes of lump `idx` (slice into `self.bytes`).
    pub fn lump_bytes(&self, idx: usize) -> Result<&[u8], WadError> {
        let l = self.lumps.get(idx).ok_or(WadError::BadIndex(idx))?;
        let bad_offset = || WadError::BadOffset {
            index: idx,
            name: Self::lump_name_str(&l.name).into(),
            offset: l.offset,
            size: l.size,
            file_size: self.bytes.len(),
        };
        let start = usize::try_from(l.offset).map_err(|_| bad_offset())?;
        let size = usize::try_from(l.size).map_err(|_| bad_offset())?;
        let end = start.checked_add(size).ok_or_else(bad_offset)?;
        self.bytes.get(start..end).ok_or_else(bad_offset)
    }

    /// Return directory indices of every map marker (`E#M#`, `MAP##`).
    pub fn level_markers(&self) -> Vec<usize> {
        static RE: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"^(E[1-4]M[1-9]|MAP[0-3][0-9])$").expect("static marker pattern")
        });

        self.lumps
            .iter()
            .enumerate()
            .filter(|(_, l)| l.size == 0 && RE.is_match(Self::lump_name_str(&l.name)))
            .map(|(i, _)| i)
            .collect()
    }

    // ------------------------------------------------------------------ //
    // Generic decode helper
    // ------------------------------------------------------------------ //

    /// Decode lump `idx` as a packed array of `T`.
    pub fn lump_to_vec<T: LumpRecord>(&self, idx: usize) -> Result<Vec<T>, WadError> {
        let bytes = self.lump_bytes(idx)?;

        if bytes.len() % T::SIZE != 0 {
            return Err(WadError::BadLumpSize {
                index: idx,
                name: self.name_of(idx).into(),
                size: bytes.len(),
                elem_size: T::SIZE,
            });
        }

        let cfg = config::standard()
            .with_fixed_int_encoding()
            .with_little_endian();
        bytes
            .chunks_exact(T::SIZE)
            .enumerate()
            .map(|(elem, chunk)| {
                decode_from_slice::<T, _>(chunk, cfg)
                    .map(|(val, _)| val)
                    .map_err(|source| WadError::BadElement {
                        index: idx,
                        name: self.name_of(idx).into(),
                        elem,
                        source,
                    })
            })
            .collect()
    }

    // ------------------------------------------------------------------ //
    // Loading
    // ------------------------------------------------------------------ //

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, WadError> {
        Self::from_bytes(std::fs::read(path)?)
    }

    /// Parse header and directory of an in-memory file.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, WadError> {
        /*----------- 1. read and validate header ------------------------*/
        if bytes.len() < HEADER_SIZE {
            return Err(WadError::MalformedHeader("file shorter than header"));
        }
        let mut cur = &bytes[..HEADER_SIZE];
        let mut magic = [0u8; 4];
        cur.read_exact(&mut magic)?;
        if &magic != b"IWAD" && &magic != b"PWAD" {
            return Err(WadError::BadMagic(magic));
        }
        let num_lumps = cur.read_i32::<LE>()?;
        let dir_offset = cur.read_i32::<LE>()?;
        if num_lumps < 0 {
            return Err(WadError::MalformedHeader("negative lump count"));
        }

        /*----------- 2. directory bounds check --------------------------*/
        let truncated = || WadError::TruncatedDirectory {
            offset: dir_offset,
            count: num_lumps,
            file_size: bytes.len(),
        };
        let dir_start = usize::try_from(dir_offset).map_err(|_| truncated())?;
        let dir_end = (num_lumps as usize)
            .checked_mul(DIR_ENTRY_SIZE)
            .and_then(|len| len.checked_add(dir_start))
            .ok_or_else(truncated)?;
        if dir_end > bytes.len() {
            return Err(truncated());
        }

        /*----------- 3. parse directory entries -------------------------*/
        let mut lumps = Vec::with_capacity(num_lumps as usize);
        let mut cur = &bytes[dir_start..dir_end];
        for _ in 0..num_lumps {
            let offset = cur.read_i32::<LE>()?;
            let size = cur.read_i32::<LE>()?;
            let mut name = [0u8; 8];
            cur.read_exact(&mut name)?;
            lumps.push(LumpInfo { name, offset, size });
        }

        Ok(Self {
            magic,
            lumps,
            bytes,
        })
    }
}

// ==========================================================================
// Tests
// ==========================================================================
