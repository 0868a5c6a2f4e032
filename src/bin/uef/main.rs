//! uef - Tool for inspecting UEFormat files.

use std::env;
use std::path::Path;

use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

use ueformat::model::{Model, Skeleton};
use ueformat::prelude::*;

/// Install the log subscriber. `RUST_LOG` wins over the command line level.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(format!("ueformat={}", level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let args: Vec<String> = env::args().collect();

    // Parse global flags
    let mut level = "info";
    let mut filtered_args: Vec<&str> = Vec::new();
    for arg in &args[1..] {
        match arg.as_str() {
            "-v" | "--verbose" => level = "debug",
            "-vv" | "--trace" => level = "trace",
            "-q" | "--quiet" => level = "off",
            _ => filtered_args.push(arg),
        }
    }

    let json_mode = filtered_args.iter().any(|&s| s == "--json" || s == "-j");
    if json_mode {
        level = "off";
    }
    filtered_args.retain(|&s| s != "--json" && s != "-j");

    if filtered_args.is_empty() {
        print_help();
        return;
    }
    init_logging(level);

    match filtered_args[0] {
        // Info command - header and asset summary
        "info" | "i" => {
            let Some(path) = filtered_args.get(1) else {
                eprintln!("Error: missing file argument");
                eprintln!("Usage: uef info <file> [--json]");
                std::process::exit(1);
            };
            cmd_info(path, json_mode);
        }

        // Tree command - bone hierarchy or actor list
        "tree" | "t" => {
            let Some(path) = filtered_args.get(1) else {
                eprintln!("Error: missing file argument");
                eprintln!("Usage: uef tree <file>");
                std::process::exit(1);
            };
            cmd_tree(path);
        }

        "help" | "h" | "-h" | "--help" => print_help(),

        // Default: if file exists, show info; otherwise error
        other => {
            if Path::new(other).exists() {
                cmd_info(other, json_mode);
            } else {
                eprintln!("Unknown command: {}", other);
                eprintln!();
                print_help();
                std::process::exit(1);
            }
        }
    }
}

fn print_help() {
    println!("uef - UEFormat inspector");
    println!();
    println!("USAGE:");
    println!("    uef [OPTIONS] <COMMAND> [ARGS]");
    println!();
    println!("COMMANDS:");
    println!("    i, info  <file> [--json]    Show header and asset summary");
    println!("    t, tree  <file>             Show bone hierarchy (models) or actors (worlds)");
    println!("    h, help                     Show this help");
    println!();
    println!("OPTIONS:");
    println!("    -v, --verbose    Show debug output");
    println!("    -vv, --trace     Show trace output (every section)");
    println!("    -q, --quiet      Suppress log output");
    println!("    -j, --json       Print info as JSON");
    println!();
    println!("EXAMPLES:");
    println!("    uef info SK_Mannequin.uemodel");
    println!("    uef -vv info Walk.ueanim");
    println!("    uef tree SK_Mannequin.uemodel");
    println!();
    println!("NOTES:");
    println!("    - Passing a file directly is equivalent to 'info'");
    println!("    - RUST_LOG overrides the log level flags");
}

fn open_or_exit(path: &str) -> UeFile {
    tracing::info!("Opening {}", path);
    match open(path, &DecodeOptions::default()) {
        Ok(file) => file,
        Err(e) => {
            let sections = e.section_path();
            if sections.is_empty() {
                eprintln!("Failed to decode {}: {}", path, e);
            } else {
                eprintln!("Failed to decode {} (in {}): {}", path, sections.join(" > "), e.root());
            }
            std::process::exit(1);
        }
    }
}

fn cmd_info(path: &str, json_mode: bool) {
    let file = open_or_exit(path);
    if json_mode {
        match serde_json::to_string_pretty(&info_json(&file)) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Failed to serialize: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    let header = &file.header;
    println!("File:       {}", path);
    println!("Identifier: {}", header.identifier);
    println!("Version:    {} ({})", header.version.as_u8(), header.version);
    println!("Object:     {}", header.object_name);
    println!("Compressed: {}", header.compressed);
    println!();

    match &file.asset {
        Asset::Model(model) => print_model(model),
        Asset::Animation(anim) => {
            println!("Animation:");
            println!("  Frames:  {} @ {} fps ({:.2}s)", anim.num_frames, anim.frames_per_second, anim.duration());
            println!("  Tracks:  {}", anim.tracks.len());
            println!("  Curves:  {}", anim.curves.len());
            let keys: usize = anim.tracks.iter().map(|t| t.key_count()).sum();
            println!("  Keys:    {}", keys);
        }
        Asset::World(world) => {
            println!("World:");
            println!("  Meshes:  {}", world.meshes.len());
            println!("  Actors:  {}", world.actors.len());
            let unresolved = world.actors.iter().filter(|a| world.mesh_for(a).is_none()).count();
            if unresolved > 0 {
                println!("  Unresolved actors: {}", unresolved);
            }
        }
    }
}

fn print_model(model: &Model) {
    println!("LODs ({}):", model.lods.len());
    for (i, lod) in model.lods.iter().enumerate() {
        println!(
            "  [{}] {} - {} vertices, {} triangles, {} UV channels, {} materials",
            i,
            lod.name,
            lod.vertices.len(),
            lod.indices.len(),
            lod.uvs.len(),
            lod.materials.len()
        );
        if lod.is_skinned() {
            println!("      {} weights, {} morph targets", lod.weights.len(), lod.morph_targets.len());
        }
        if lod.excess_uv_channels() > 0 {
            println!("      {} UV channels exceed available slots", lod.excess_uv_channels());
        }
        let b = lod.bounds();
        if !b.is_empty() {
            println!("      bounds {:?} .. {:?}", b.min.to_array(), b.max.to_array());
        }
    }
    if let Some(skel) = &model.skeleton {
        println!("Skeleton:");
        println!("  Bones:         {}", skel.bones.len());
        println!("  Sockets:       {}", skel.sockets.len());
        println!("  Virtual bones: {}", skel.virtual_bones.len());
    }
    if !model.collisions.is_empty() {
        println!("Collisions: {}", model.collisions.len());
    }
}

fn info_json(file: &UeFile) -> Value {
    let header = &file.header;
    let asset = match &file.asset {
        Asset::Model(model) => json!({
            "lods": model.lods.iter().map(|lod| json!({
                "name": lod.name,
                "vertices": lod.vertices.len(),
                "triangles": lod.indices.len(),
                "uv_channels": lod.uvs.len(),
                "color_channels": lod.colors.len(),
                "materials": lod.materials.iter().map(|m| json!({
                    "name": m.name,
                    "first_index": m.first_index,
                    "num_faces": m.num_faces,
                })).collect::<Vec<_>>(),
                "weights": lod.weights.len(),
                "morph_targets": lod.morph_targets.len(),
            })).collect::<Vec<_>>(),
            "bones": model.skeleton.as_ref().map_or(0, |s| s.bones.len()),
            "sockets": model.skeleton.as_ref().map_or(0, |s| s.sockets.len()),
            "collisions": model.collisions.len(),
        }),
        Asset::Animation(anim) => json!({
            "num_frames": anim.num_frames,
            "frames_per_second": anim.frames_per_second,
            "tracks": anim.tracks.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(),
            "curves": anim.curves.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
        }),
        Asset::World(world) => json!({
            "meshes": world.meshes.iter().map(|m| json!({ "hash": m.hash, "size": m.size() })).collect::<Vec<_>>(),
            "actors": world.actors.iter().map(|a| json!({
                "name": a.name,
                "mesh_hash": a.mesh_hash,
                "location": a.location.to_array(),
                "rotation": a.rotation.to_array(),
                "scale": a.scale.to_array(),
            })).collect::<Vec<_>>(),
        }),
    };

    json!({
        "identifier": header.identifier,
        "version": header.version.as_u8(),
        "version_name": header.version.name(),
        "object_name": header.object_name,
        "compressed": header.compressed,
        "asset": asset,
    })
}

fn cmd_tree(path: &str) {
    let file = open_or_exit(path);
    match &file.asset {
        Asset::Model(model) => match &model.skeleton {
            Some(skel) => {
                for root in skel.roots() {
                    print_bone(skel, root, 0);
                }
            }
            None => println!("(no skeleton)"),
        },
        Asset::World(world) => {
            for actor in &world.actors {
                let mesh = world
                    .mesh_for(actor)
                    .map_or_else(|| "?".to_string(), |m| format!("{} bytes", m.size()));
                let location = actor.y_up_transform().w_axis.truncate();
                println!("{} -> {} ({}) at {:?}", actor.name, actor.mesh_hash, mesh, location.to_array());
            }
        }
        Asset::Animation(anim) => {
            for track in &anim.tracks {
                println!(
                    "{} ({} pos, {} rot, {} scale)",
                    track.name,
                    track.position_keys.len(),
                    track.rotation_keys.len(),
                    track.scale_keys.len()
                );
            }
        }
    }
}

fn print_bone(skel: &Skeleton, bone: usize, depth: usize) {
    let indent = "  ".repeat(depth);
    println!("{}{}", indent, skel.bones[bone].name);
    for child in skel.children(bone) {
        print_bone(skel, child, depth + 1);
    }
}
