use std::fmt;
use std::path::Path;
use std::str::FromStr;

use image::DynamicImage;
use js_sys::{Array, Object, Reflect};
use palette::Srgb;
use wasm_bindgen::prelude::*;

pub mod assemble;
pub mod cluster;
pub mod color;
mod error;
pub mod rank;
pub mod sample;

pub use cluster::{Clusters, MAX_COLORS, Model};
pub use error::{PaletteError, Result};

/// One pixel as three 0–255 channels, either R,G,B or H,S,V.
pub type PixelSample = [u8; 3];

/// A palette color. Always sRGB, whatever space the clustering ran in.
pub type Color = Srgb<u8>;

/// Color space the pixels are clustered in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "native-bin", derive(clap::ValueEnum))]
pub enum ColorSpace {
    #[default]
    Rgb,
    Hsv,
}

impl fmt::Display for ColorSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ColorSpace::Rgb => "rgb",
            ColorSpace::Hsv => "hsv",
        })
    }
}

impl FromStr for ColorSpace {
    type Err = PaletteError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rgb" => Ok(ColorSpace::Rgb),
            "hsv" => Ok(ColorSpace::Hsv),
            _ => Err(PaletteError::UnknownColorSpace(s.to_string())),
        }
    }
}

/// Parameters of one palette extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteOptions {
    /// Number of colors to return.
    pub num_colors: usize,
    pub color_space: ColorSpace,
    pub model: Model,
    /// Shrink the image so its longest side is at most this many pixels before
    /// sampling. `None` samples every pixel.
    pub downscale: Option<u32>,
    /// Ignore pixels whose alpha is 0.
    pub skip_transparent: bool,
}

impl Default for PaletteOptions {
    fn default() -> Self {
        Self {
            num_colors: 5,
            color_space: ColorSpace::default(),
            model: Model::default(),
            downscale: None,
            skip_transparent: false,
        }
    }
}

/// A palette color with the number of samples its cluster claimed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Swatch {
    pub color: Color,
    pub population: usize,
}

impl Swatch {
    /// `#rrggbb`
    pub fn hex(&self) -> String {
        let c = self.color;
        format!("#{:02x}{:02x}{:02x}", c.red, c.green, c.blue)
    }

    /// Fraction of `total` samples covered by this swatch.
    pub fn share(&self, total: usize) -> f64 {
        if total == 0 {
            0.0
        } else {
            self.population as f64 / total as f64
        }
    }
}

/// Extract `num_colors` dominant colors from encoded image bytes, most common first.
///
/// ```no_run
/// use img2palette::{get_palette, ColorSpace, Model};
///
/// let bytes = std::fs::read("photo.jpg").unwrap();
/// let colors = get_palette(&bytes, 5, ColorSpace::Rgb, Model::Centroid).unwrap();
/// assert_eq!(colors.len(), 5);
/// ```
pub fn get_palette(
    input: &[u8],
    num_colors: usize,
    color_space: ColorSpace,
    model: Model,
) -> Result<Vec<Color>> {
    let img = image::load_from_memory(input)?;
    extract_palette(&img, &options(num_colors, color_space, model))
}

/// Same as [`get_palette`], reading the image from disk.
pub fn get_palette_from_path(
    path: impl AsRef<Path>,
    num_colors: usize,
    color_space: ColorSpace,
    model: Model,
) -> Result<Vec<Color>> {
    let img = image::open(path)?;
    extract_palette(&img, &options(num_colors, color_space, model))
}

fn options(num_colors: usize, color_space: ColorSpace, model: Model) -> PaletteOptions {
    PaletteOptions {
        num_colors,
        color_space,
        model,
        ..PaletteOptions::default()
    }
}

/// Extract the palette of an already decoded image.
pub fn extract_palette(img: &DynamicImage, options: &PaletteOptions) -> Result<Vec<Color>> {
    Ok(extract_swatches(img, options)?
        .into_iter()
        .map(|s| s.color)
        .collect())
}

/// Extract the palette together with each color's population.
///
/// Runs the whole pipeline: sample, cluster, rank, assemble. The result has
/// exactly `options.num_colors` entries.
pub fn extract_swatches(img: &DynamicImage, options: &PaletteOptions) -> Result<Vec<Swatch>> {
    let samples = sample::sample(img, options)?;
    let clusters = options.model.fit(&samples, options.num_colors)?;
    let ranked = rank::rank(&clusters.centers, &clusters.assignments);
    assemble::assemble(&ranked, options.color_space)
}

/// Browser entry point.
///
/// Returns `{ palette: string[], populations: number[] }` with `#rrggbb` colors,
/// most common first.
#[wasm_bindgen(js_name = palette)]
pub fn palette_js(
    input: Vec<u8>,
    n_colors: usize,
    color_space: &str,
    model: &str,
) -> std::result::Result<Object, JsValue> {
    let to_js = |e: PaletteError| JsValue::from_str(&e.to_string());

    let options = PaletteOptions {
        num_colors: n_colors,
        color_space: color_space.parse().map_err(to_js)?,
        model: model.parse().map_err(to_js)?,
        ..PaletteOptions::default()
    };
    let img = image::load_from_memory(&input).map_err(|e| to_js(e.into()))?;
    let swatches = extract_swatches(&img, &options).map_err(to_js)?;

    let hex_js = Array::new();
    let populations_js = Array::new();
    for swatch in &swatches {
        hex_js.push(&JsValue::from_str(&swatch.hex()));
        populations_js.push(&JsValue::from_f64(swatch.population as f64));
    }

    let result = Object::new();
    Reflect::set(&result, &JsValue::from_str("palette"), &hex_js)?;
    Reflect::set(&result, &JsValue::from_str("populations"), &populations_js)?;
    Ok(result)
}
