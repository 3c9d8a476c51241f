use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use img2palette::{
    Color, ColorSpace, Model, PaletteError, PaletteOptions, extract_palette, extract_swatches,
    get_palette, get_palette_from_path,
};
use pretty_assertions::assert_eq;

const MODELS: [Model; 2] = [Model::Centroid, Model::Mixture];
const SPACES: [ColorSpace; 2] = [ColorSpace::Rgb, ColorSpace::Hsv];

fn image_from(width: u32, height: u32, pixels: &[[u8; 3]]) -> DynamicImage {
    let raw = pixels.iter().flatten().copied().collect();
    DynamicImage::ImageRgb8(RgbImage::from_raw(width, height, raw).unwrap())
}

fn png(img: &DynamicImage) -> Vec<u8> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png).unwrap();
    buf
}

fn gradient() -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(16, 16, |x, y| {
        Rgb([(x * 16) as u8, (y * 16) as u8, ((x + y) * 8) as u8])
    }))
}

fn ninety_ten() -> DynamicImage {
    let mut pixels = vec![[200, 120, 40]; 90];
    pixels.extend([[10, 60, 230]; 10]);
    image_from(10, 10, &pixels)
}

#[test]
fn returns_exactly_num_colors() {
    let bytes = png(&gradient());
    for model in MODELS {
        for space in SPACES {
            for k in [1, 2, 5, 8] {
                let colors = get_palette(&bytes, k, space, model).unwrap();
                assert_eq!(colors.len(), k, "{model} / {space} / k={k}");
            }
        }
    }
}

#[test]
fn identical_calls_are_identical() {
    let bytes = png(&gradient());
    for model in MODELS {
        for space in SPACES {
            let first = get_palette(&bytes, 6, space, model).unwrap();
            let second = get_palette(&bytes, 6, space, model).unwrap();
            assert_eq!(first, second, "{model} / {space}");
        }
    }
}

#[test]
fn most_common_color_comes_first() {
    let bytes = png(&ninety_ten());
    for model in MODELS {
        let colors = get_palette(&bytes, 2, ColorSpace::Rgb, model).unwrap();
        assert_eq!(
            colors,
            vec![Color::new(200, 120, 40), Color::new(10, 60, 230)],
            "{model}"
        );
    }
}

#[test]
fn most_common_color_comes_first_in_hsv() {
    let bytes = png(&ninety_ten());
    for model in MODELS {
        let colors = get_palette(&bytes, 2, ColorSpace::Hsv, model).unwrap();
        // Each color takes a truncating trip through 8-bit HSV.
        assert_eq!(
            colors,
            vec![Color::new(200, 119, 39), Color::new(10, 62, 230)],
            "{model}"
        );
    }
}

#[test]
fn two_by_two_scenario() {
    let img = image_from(2, 2, &[[255, 0, 0], [255, 0, 0], [0, 255, 0], [0, 0, 255]]);
    let bytes = png(&img);
    for model in MODELS {
        let colors = get_palette(&bytes, 3, ColorSpace::Rgb, model).unwrap();
        assert_eq!(colors[0], Color::new(255, 0, 0), "{model}");

        let mut rest = colors[1..].to_vec();
        rest.sort_by_key(|c| (c.red, c.green, c.blue));
        assert_eq!(rest, vec![Color::new(0, 0, 255), Color::new(0, 255, 0)], "{model}");
    }
}

#[test]
fn all_black_image() {
    let bytes = png(&image_from(4, 4, &[[0, 0, 0]; 16]));
    for model in MODELS {
        for space in SPACES {
            let colors = get_palette(&bytes, 1, space, model).unwrap();
            assert_eq!(colors, vec![Color::new(0, 0, 0)], "{model} / {space}");
        }
    }
}

#[test]
fn hsv_palette_comes_back_as_rgb() {
    let mut pixels = vec![[255, 0, 0]; 3];
    pixels.push([0, 255, 0]);
    let bytes = png(&image_from(2, 2, &pixels));
    let colors = get_palette(&bytes, 2, ColorSpace::Hsv, Model::Centroid).unwrap();
    assert_eq!(colors, vec![Color::new(255, 0, 0), Color::new(0, 255, 0)]);
}

#[test]
fn rejects_zero_colors() {
    let bytes = png(&ninety_ten());
    for model in MODELS {
        let result = get_palette(&bytes, 0, ColorSpace::Rgb, model);
        assert!(
            matches!(result, Err(PaletteError::InvalidClusterCount { requested: 0, .. })),
            "{model}: {result:?}"
        );
    }
}

#[test]
fn rejects_more_colors_than_distinct_pixels() {
    let img = image_from(2, 2, &[[255, 0, 0], [255, 0, 0], [0, 255, 0], [0, 0, 255]]);
    let bytes = png(&img);
    for model in MODELS {
        let result = get_palette(&bytes, 4, ColorSpace::Rgb, model);
        assert!(
            matches!(
                result,
                Err(PaletteError::InvalidClusterCount {
                    requested: 4,
                    max: 3
                })
            ),
            "{model}: {result:?}"
        );
    }
}

#[test]
fn garbage_bytes_fail_to_decode() {
    let result = get_palette(b"definitely not an image", 3, ColorSpace::Rgb, Model::Centroid);
    assert!(matches!(result, Err(PaletteError::ImageDecode(_))));
}

#[test]
fn empty_image_is_an_error() {
    let img = DynamicImage::ImageRgb8(RgbImage::new(0, 0));
    let result = extract_palette(&img, &PaletteOptions::default());
    assert!(matches!(result, Err(PaletteError::EmptyImage)));
}

#[test]
fn reads_from_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ninety_ten.png");
    ninety_ten().save(&path).unwrap();

    let colors = get_palette_from_path(&path, 2, ColorSpace::Rgb, Model::Centroid).unwrap();
    assert_eq!(colors[0], Color::new(200, 120, 40));

    let missing = get_palette_from_path(
        dir.path().join("nope.png"),
        2,
        ColorSpace::Rgb,
        Model::Centroid,
    );
    assert!(matches!(missing, Err(PaletteError::ImageDecode(_))));
}

#[test]
fn swatch_populations_cover_every_pixel() {
    let options = PaletteOptions {
        num_colors: 4,
        ..PaletteOptions::default()
    };
    for model in MODELS {
        let options = PaletteOptions { model, ..options };
        let swatches = extract_swatches(&gradient(), &options).unwrap();
        assert_eq!(swatches.iter().map(|s| s.population).sum::<usize>(), 256);
        assert!(swatches.windows(2).all(|w| w[0].population >= w[1].population));
    }
}

#[test]
fn downscaled_palette_keeps_dominant_color() {
    // Left 14 columns one color, right 6 another; every 2-column block is uniform.
    let img = DynamicImage::ImageRgb8(RgbImage::from_fn(20, 20, |x, _| {
        if x < 14 { Rgb([200, 120, 40]) } else { Rgb([10, 60, 230]) }
    }));
    let options = PaletteOptions {
        num_colors: 2,
        downscale: Some(10),
        ..PaletteOptions::default()
    };
    let swatches = extract_swatches(&img, &options).unwrap();
    assert_eq!(swatches[0].color, Color::new(200, 120, 40));
    assert_eq!(swatches[0].population, 70);
    assert_eq!(swatches[1].population, 30);
}
