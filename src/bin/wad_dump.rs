//! wad_dump - print the directory and map lumps of a WAD, then the sector
//! rings the loader builds from them.
//!
//! ```bash
//! cargo run --bin wad_dump -- doom1.wad --map E1M1
//! ```

use std::path::PathBuf;

use clap::Parser;

use sectorcast::{
    wad::{Wad, build_map},
    world::TextureBank,
};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Opts {
    /// WAD file to inspect
    #[arg(value_name = "FILE")]
    wad: PathBuf,

    /// Map marker to dump; first map if omitted
    #[arg(long)]
    map: Option<String>,

    /// Only list the directory
    #[arg(long)]
    dir_only: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let opts = Opts::parse();

    let wad = Wad::from_file(&opts.wad)?;
    println!(
        "{} {} bytes, {} lumps",
        String::from_utf8_lossy(wad.magic()),
        wad.file_size(),
        wad.lumps().len()
    );

    // ─────────── directory ───────────
    println!("\n#     name      offset      size");
    for (i, l) in wad.lumps().iter().enumerate() {
        println!(
            "{i:<5} {:<8} {:>8} {:>9}",
            Wad::lump_name_str(&l.name),
            l.offset,
            l.size
        );
    }
    let markers: Vec<&str> = wad.level_markers().into_iter().map(|i| wad.name_of(i)).collect();
    println!("maps: {}", markers.join(" "));
    if opts.dir_only {
        return Ok(());
    }

    // ─────────── raw lumps ───────────
    let raw = wad.parse_level(opts.map.as_deref())?;
    println!("\n== {} ==", raw.name);

    println!("\nVERTEXES ({})", raw.vertices.len());
    for (i, v) in raw.vertices.iter().enumerate() {
        println!("  {i:>5}: ({}, {})", v.x, v.y);
    }

    println!("\nLINEDEFS ({})", raw.linedefs.len());
    for (i, l) in raw.linedefs.iter().enumerate() {
        println!(
            "  {i:>5}: {} -> {}  front {:>5}  back {:>5}  {:?}",
            l.v1,
            l.v2,
            l.front,
            l.back,
            l.flags()
        );
    }

    println!("\nSIDEDEFS ({})", raw.sidedefs.len());
    for (i, s) in raw.sidedefs.iter().enumerate() {
        println!(
            "  {i:>5}: sector {:>4}  upper {:<8} lower {:<8} middle {:<8}",
            s.sector,
            Wad::lump_name_str(&s.upper_tex),
            Wad::lump_name_str(&s.lower_tex),
            Wad::lump_name_str(&s.middle_tex)
        );
    }

    println!("\nSECTORS ({})", raw.sectors.len());
    for (i, s) in raw.sectors.iter().enumerate() {
        println!(
            "  {i:>5}: floor {:>5} ceil {:>5}  {:<8} {:<8} light {}",
            s.floor_h,
            s.ceil_h,
            Wad::lump_name_str(&s.floor_tex),
            Wad::lump_name_str(&s.ceil_tex),
            s.light
        );
    }

    // ─────────── converted ───────────
    let map = build_map(&raw, &TextureBank::default())?;
    println!("\nRINGS ({} sectors, {} walls)", map.sectors().len(), map.walls().len());
    for (id, s) in map.sectors().iter().enumerate() {
        println!(
            "  sector {id}: floor {:.2} ceil {:.2}, {} walls",
            s.floor_h, s.ceil_h, s.wall_count
        );
        for e in map.edges(id as u16) {
            let next = e.wall.next_sector.map_or("-".to_owned(), |n| n.to_string());
            println!(
                "    {:>6}: ({:>8.3}, {:>8.3}) -> ({:>8.3}, {:>8.3})  next {next:>4}  color {}",
                e.index, e.p1.x, e.p1.y, e.p2.x, e.p2.y, e.wall.color
            );
        }
    }
    Ok(())
}
