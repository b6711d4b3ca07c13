// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Crowdplan CLI - convert a building extraction document into a scene.
//!
//! Reads a JSON extraction document (storeys, walls with openings and
//! connections, stairs), reduces it to walls, gates, barricades and stairs,
//! and writes the numbered scene as JSON.
//!
//! Usage:
//!   crowdplan <input.json> [options]

use anyhow::{bail, Context, Result};
use crowdplan_processing::geometry::Point2D;
use crowdplan_processing::{convert_building, BuildingInput, Scene, SceneOptions};
use std::env;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

mod config;

use config::Config;

/// Parsed command line
struct Args {
    input: PathBuf,
    output: PathBuf,
    unparsable: Option<PathBuf>,
    scene: SceneOptions,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,crowdplan_processing=debug".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::from_env();
    let args: Vec<String> = env::args().collect();
    let Some(args) = parse_args(&args, &mut config)? else {
        return Ok(());
    };

    if let Some(threads) = config.worker_threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Failed to initialize worker thread pool")?;
    }

    tracing::info!(
        input = %args.input.display(),
        close_wall_gap = config.conversion.close_wall_gap,
        opening_strategy = ?config.conversion.opening_strategy,
        "Starting conversion"
    );

    let document = fs::read_to_string(&args.input)
        .with_context(|| format!("Cannot read '{}'", args.input.display()))?;
    let building: BuildingInput = serde_json::from_str(&document)
        .with_context(|| format!("Invalid extraction document '{}'", args.input.display()))?;

    let conversion = convert_building(&building, &config.conversion)?;
    let scene = Scene::assemble(&conversion, &args.scene);

    fs::write(&args.output, scene.to_json()?)
        .with_context(|| format!("Cannot write '{}'", args.output.display()))?;
    tracing::info!(
        output = %args.output.display(),
        levels = scene.levels.len(),
        stairs = scene.stairs.len(),
        vertices = scene.vertex_count(),
        "Scene written"
    );

    for entry in &conversion.unparsable {
        tracing::warn!(
            object_id = entry.object_id.as_deref().unwrap_or("-"),
            name = entry.name.as_deref().unwrap_or("-"),
            reason = %entry.reason,
            "Unparsable object"
        );
    }
    if let Some(path) = &args.unparsable {
        fs::write(path, serde_json::to_string_pretty(&conversion.unparsable)?)
            .with_context(|| format!("Cannot write '{}'", path.display()))?;
    }

    Ok(())
}

/// Parse the command line, applying overrides onto `config`.
///
/// Returns `None` when only help was requested.
fn parse_args(args: &[String], config: &mut Config) -> Result<Option<Args>> {
    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage();
        return Ok(None);
    }
    if args[1].starts_with('-') {
        print_usage();
        bail!("Expected the input file before any option, got {}", args[1]);
    }

    let mut parsed = Args {
        input: PathBuf::from(&args[1]),
        output: PathBuf::from("scene.json"),
        unparsable: None,
        scene: SceneOptions::default(),
    };

    let mut rest = args[2..].iter();
    while let Some(flag) = rest.next() {
        let mut value = || {
            rest.next()
                .map(String::as_str)
                .with_context(|| format!("Missing value for {flag}"))
        };
        match flag.as_str() {
            "--output" => parsed.output = PathBuf::from(value()?),
            "--unparsable" => parsed.unparsable = Some(PathBuf::from(value()?)),
            "--close-wall-gap" => config.conversion.close_wall_gap = parse(flag, value()?)?,
            "--min-wall-height" => config.conversion.min_wall_height = parse(flag, value()?)?,
            "--wall-offset-tolerance" => {
                config.conversion.wall_offset_tolerance = parse(flag, value()?)?
            }
            "--opening-strategy" => {
                config.conversion.opening_strategy = value()?
                    .parse()
                    .map_err(anyhow::Error::msg)
                    .with_context(|| format!("Invalid value for {flag}"))?
            }
            "--origin" => {
                let (x, y) = parse_pair(flag, value()?)?;
                parsed.scene.origin = Point2D::new(x, y);
            }
            "--dimension" => parsed.scene.dimension = parse_pair(flag, value()?)?,
            "--threads" => config.worker_threads = Some(parse(flag, value()?)?),
            other => {
                print_usage();
                bail!("Unknown option: {other}");
            }
        }
    }

    Ok(Some(parsed))
}

fn parse<T>(flag: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .parse()
        .with_context(|| format!("Invalid value for {flag}: '{value}'"))
}

/// Parse `X,Y`.
fn parse_pair(flag: &str, value: &str) -> Result<(f64, f64)> {
    let Some((x, y)) = value.split_once(',') else {
        bail!("Expected X,Y for {flag}, got '{value}'");
    };
    Ok((parse(flag, x.trim())?, parse(flag, y.trim())?))
}

fn print_usage() {
    eprintln!("Usage: crowdplan <input.json> [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --output <path>                 Scene JSON to write (default: scene.json)");
    eprintln!("  --unparsable <path>             Also write skipped objects as JSON");
    eprintln!("  --close-wall-gap <m>            Gluing tolerance, 0 disables (env CROWDPLAN_CLOSE_WALL_GAP)");
    eprintln!("  --min-wall-height <m>           Minimum wall extent above a storey (env CROWDPLAN_MIN_WALL_HEIGHT)");
    eprintln!("  --wall-offset-tolerance <m>     Wall base tolerance (env CROWDPLAN_WALL_OFFSET_TOLERANCE)");
    eprintln!("  --opening-strategy <name>       containment | chaining (env CROWDPLAN_OPENING_STRATEGY)");
    eprintln!("  --origin <x,y>                  Subtracted from every scene coordinate");
    eprintln!("  --dimension <w,h>               Level size in the scene (default: 100,100)");
    eprintln!("  --threads <n>                   Worker threads (env CROWDPLAN_WORKER_THREADS)");
    eprintln!();
    eprintln!("Logging is controlled with RUST_LOG.");
}
