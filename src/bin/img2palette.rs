use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use img2palette::{ColorSpace, Model, PaletteOptions, Swatch, extract_swatches};
use serde_json::{Value, json};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Extract a dominant color palette from images by clustering their pixels.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// One or more input image paths
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Number of colors in the palette
    #[arg(short = 'n', long = "num_colors", visible_alias = "num-colors", default_value_t = 5)]
    num_colors: usize,

    /// Color space to cluster in
    #[arg(
        short = 'c',
        long = "color_space",
        visible_alias = "color-space",
        value_enum,
        default_value_t = ColorSpace::Rgb
    )]
    color_space: ColorSpace,

    /// Clustering model
    #[arg(short, long, value_enum, default_value_t = Model::Centroid)]
    model: Model,

    /// Shrink images so the longest side is at most this many pixels first
    #[arg(short, long)]
    downscale: Option<u32>,

    /// Ignore fully transparent pixels
    #[arg(long)]
    skip_transparent: bool,

    /// Print the palettes as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "img2palette=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let options = PaletteOptions {
        num_colors: args.num_colors,
        color_space: args.color_space,
        model: args.model,
        downscale: args.downscale,
        skip_transparent: args.skip_transparent,
    };

    let mut reports = Vec::new();
    for input in &args.inputs {
        let img = image::open(input).with_context(|| format!("reading {}", input.display()))?;
        let swatches = extract_swatches(&img, &options)
            .with_context(|| format!("extracting palette from {}", input.display()))?;

        if args.json {
            reports.push(json!({
                "image": input.display().to_string(),
                "palette": to_json(&swatches),
            }));
        } else {
            print_palette(input, &swatches, args.inputs.len() > 1);
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }

    Ok(())
}

fn total(swatches: &[Swatch]) -> usize {
    swatches.iter().map(|s| s.population).sum()
}

fn print_palette(input: &std::path::Path, swatches: &[Swatch], with_name: bool) {
    if with_name {
        println!("{}", input.display());
    }
    println!("Dominant Colors (RGB)");
    let total = total(swatches);
    for swatch in swatches {
        let c = swatch.color;
        println!(
            " - ({}, {}, {})  {}  {:5.1}%",
            c.red,
            c.green,
            c.blue,
            swatch.hex(),
            swatch.share(total) * 100.0
        );
    }
}

fn to_json(swatches: &[Swatch]) -> Value {
    let total = total(swatches);
    swatches
        .iter()
        .map(|s| {
            json!({
                "rgb": [s.color.red, s.color.green, s.color.blue],
                "hex": s.hex(),
                "population": s.population,
                "share": s.share(total),
            })
        })
        .collect()
}
