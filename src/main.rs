use anyhow::{bail, Context};
use clap::Parser;
use geomarker::location::CoordinateResolver;
use geomarker::{CacheKind, Config, MapModel, PlaceEntry, Zoom};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::PathBuf;
use std::time::Duration;

/// Geomarker: build a map model from places.
///
/// Reads a JSON array of places, geocodes addresses, validates
/// coordinates and prints markers plus viewport as JSON.
///
/// Input entries:
///   {"coordinates": [48.85, 2.35], "label": "Paris"}
///   {"address": "Brandenburger Tor, Berlin", "icon": "https://example.org/pin.png"}
///
/// Examples:
///   geomarker places.json
///   geomarker --zoom 5 --min-interval 1s places.json
///   cat places.json | geomarker --no-cache -
///   geomarker --center-lat 48.85 --center-lon 2.35 places.json
#[derive(Parser)]
#[command(name = "geomarker", version, about, long_about = None)]
struct Cli {
    /// JSON file with the places, or "-" for stdin.
    #[arg(index = 1, default_value = "-")]
    input: String,

    /// TOML configuration file.
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Nominatim-compatible search endpoint.
    #[arg(long)]
    endpoint: Option<String>,

    /// Minimum spacing between geocoder calls (e.g. "1s", "500ms").
    #[arg(long, value_parser = parse_duration)]
    min_interval: Option<Duration>,

    /// How long geocoded results stay cached (e.g. "24h").
    #[arg(long, value_parser = parse_duration)]
    cache_ttl: Option<Duration>,

    /// Disable the response cache.
    #[arg(long)]
    no_cache: bool,

    /// Map zoom level (non-negative integer).
    #[arg(long, short = 'z')]
    zoom: Option<Zoom>,

    /// Pin the viewport center latitude. Requires --center-lon.
    #[arg(long, allow_hyphen_values = true, requires = "center_lon")]
    center_lat: Option<f64>,

    /// Pin the viewport center longitude. Requires --center-lat.
    #[arg(long, allow_hyphen_values = true, requires = "center_lat")]
    center_lon: Option<f64>,

    /// Resolve on this many threads.
    #[arg(long, short = 'j', default_value_t = 1)]
    workers: usize,
}

fn parse_duration(s: &str) -> Result<Duration, String> {
    duration_str::parse(s).map_err(|e| e.to_string())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let cfg = effective_config(&cli)?;
    let entries = read_entries(&cli.input)?;
    if entries.is_empty() {
        bail!("No places in {}", cli.input);
    }

    let resolver = CoordinateResolver::from_config(&cfg.resolver);
    let model = if cli.workers > 1 {
        MapModel::build_concurrent(&entries, &resolver, &cfg.map, cli.workers)?
    } else {
        MapModel::build(&entries, &resolver, &cfg.map)?
    };

    for failure in &model.failures {
        eprintln!("  skipped {}: {}", failure.query, failure.error);
    }
    eprintln!(
        "  {} marker(s), center {}, zoom {}",
        model.markers.len(),
        model.viewport.center,
        model.viewport.zoom
    );

    println!("{}", serde_json::to_string_pretty(&model)?);
    Ok(())
}

/// File configuration with command-line overrides applied on top.
fn effective_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut cfg = Config::load(cli.config.as_deref())?;

    if let Some(endpoint) = &cli.endpoint {
        cfg.resolver.endpoint = endpoint.clone();
    }
    if let Some(interval) = cli.min_interval {
        cfg.resolver.min_interval = interval;
    }
    if let Some(ttl) = cli.cache_ttl {
        cfg.resolver.cache_ttl = ttl;
    }
    if cli.no_cache {
        cfg.resolver.cache = CacheKind::None;
    }
    if let Some(zoom) = cli.zoom {
        cfg.map.zoom = zoom.get();
    }
    if let (Some(lat), Some(lon)) = (cli.center_lat, cli.center_lon) {
        cfg.map.center = Some([lat, lon]);
        cfg.map.explicit_center()?;
    }

    log::debug!("Effective configuration: {:?}", cfg);
    Ok(cfg)
}

fn read_entries(input: &str) -> anyhow::Result<Vec<PlaceEntry>> {
    let reader: Box<dyn Read> = if input == "-" {
        Box::new(io::stdin().lock())
    } else {
        let file = File::open(input).with_context(|| format!("Cannot open {}", input))?;
        Box::new(file)
    };
    serde_json::from_reader(BufReader::new(reader))
        .with_context(|| format!("{} is not a JSON array of places", input))
}
