//! Turning ranked float centers into final RGB colors.

use crate::{Color, ColorSpace, PaletteError, Result, Swatch, color, rank::RankedCenter};

/// Truncate every center to integers and convert HSV centers back to RGB.
///
/// Order is preserved. Fails if a center is not a finite value, which only
/// happens when fitting went numerically wrong.
pub fn assemble(ranked: &[RankedCenter], color_space: ColorSpace) -> Result<Vec<Swatch>> {
    ranked
        .iter()
        .map(|r| {
            if r.center.iter().any(|c| !c.is_finite()) {
                return Err(PaletteError::Extraction(format!(
                    "cluster {} has a non-finite center {:?}",
                    r.index, r.center
                )));
            }
            // `as` truncates toward zero and saturates at the u8 bounds.
            let triple = r.center.map(|c| c as u8);
            let [red, green, blue] = match color_space {
                ColorSpace::Rgb => triple,
                ColorSpace::Hsv => color::hsv_to_rgb(triple),
            };
            Ok(Swatch {
                color: Color::new(red, green, blue),
                population: r.population,
            })
        })
        .collect()
}
