// SVG rasterization through usvg/resvg onto a tiny-skia pixmap

use image::{Rgba, RgbaImage};
use std::borrow::Cow;
use thiserror::Error;
use tiny_skia::{Pixmap, Transform};

use crate::model::ColorMap;

#[derive(Debug, Error)]
pub enum RasterError {
    #[error("invalid SVG: {0}")]
    Parse(#[from] usvg::Error),
    #[error("SVG has an empty canvas")]
    EmptyCanvas,
    #[error("cannot allocate a {0}x{0} canvas")]
    Canvas(u32),
}

/// Applies colour maps in order as plain text substitutions.
pub fn recolor<'a>(svg: &'a str, maps: &[ColorMap]) -> Cow<'a, str> {
    if maps.iter().all(|m| !svg.contains(&m.from)) {
        return Cow::Borrowed(svg);
    }
    let mut out = svg.to_string();
    for map in maps {
        out = out.replace(&map.from, &map.to);
    }
    Cow::Owned(out)
}

/// Renders `svg` into a `size`×`size` straight-alpha bitmap.
///
/// The document's intrinsic size is scaled to fit the square while keeping
/// its aspect ratio; leftover space is split evenly on both sides.
pub fn rasterize(svg: &[u8], size: u32) -> Result<RgbaImage, RasterError> {
    let options = usvg::Options::default();
    let tree = usvg::Tree::from_data(svg, &options)?;

    let doc = tree.size();
    let (width, height) = (doc.width(), doc.height());
    if !(width > 0.0 && height > 0.0) {
        return Err(RasterError::EmptyCanvas);
    }

    let mut pixmap = Pixmap::new(size, size).ok_or(RasterError::Canvas(size))?;

    let side = size as f32;
    let scale = (side / width).min(side / height);
    let dx = (side - width * scale) / 2.0;
    let dy = (side - height * scale) / 2.0;
    let transform = Transform::from_row(scale, 0.0, 0.0, scale, dx, dy);

    resvg::render(&tree, transform, &mut pixmap.as_mut());

    Ok(to_rgba_image(&pixmap))
}

fn to_rgba_image(pixmap: &Pixmap) -> RgbaImage {
    let mut image = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in image.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    image
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="256" height="256" viewBox="0 0 256 256">
        <rect x="0" y="0" width="256" height="256" fill="#00FF00"/>
    </svg>"##;

    const WIDE: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="200" height="100">
        <rect x="0" y="0" width="200" height="100" fill="#ff0000"/>
    </svg>"##;

    #[test]
    fn test_rasterize_fills_square() {
        let img = rasterize(SQUARE.as_bytes(), 24).unwrap();
        assert_eq!(img.dimensions(), (24, 24));
        assert_eq!(img.get_pixel(0, 0), &Rgba([0, 255, 0, 255]));
        assert_eq!(img.get_pixel(23, 23), &Rgba([0, 255, 0, 255]));
    }

    #[test]
    fn test_rasterize_is_deterministic() {
        let a = rasterize(WIDE.as_bytes(), 48).unwrap();
        let b = rasterize(WIDE.as_bytes(), 48).unwrap();
        assert_eq!(a.as_raw(), b.as_raw());
    }

    #[test]
    fn test_non_square_content_is_centered() {
        let img = rasterize(WIDE.as_bytes(), 32).unwrap();
        assert_eq!(img.dimensions(), (32, 32));
        // 200x100 fits as 32x16, leaving 8 transparent rows above and below
        assert_eq!(img.get_pixel(16, 0)[3], 0);
        assert_eq!(img.get_pixel(16, 31)[3], 0);
        assert_eq!(img.get_pixel(16, 16), &Rgba([255, 0, 0, 255]));
        assert_eq!(img.get_pixel(0, 12)[3], 255);
    }

    #[test]
    fn test_malformed_svg_fails() {
        assert!(rasterize(b"<svg", 24).is_err());
        assert!(rasterize(b"not an svg at all", 24).is_err());
    }

    #[test]
    fn test_zero_size_fails() {
        assert!(matches!(
            rasterize(SQUARE.as_bytes(), 0),
            Err(RasterError::Canvas(0))
        ));
    }

    #[test]
    fn test_recolor_applies_maps_in_order() {
        let maps = vec![
            ColorMap {
                from: "#00FF00".to_string(),
                to: "#0000FF".to_string(),
            },
            ColorMap {
                from: "#0000FF".to_string(),
                to: "#112233".to_string(),
            },
        ];
        let out = recolor(SQUARE, &maps);
        assert!(out.contains("#112233"));
        assert!(!out.contains("#00FF00"));

        let img = rasterize(out.as_bytes(), 8).unwrap();
        assert_eq!(img.get_pixel(4, 4), &Rgba([0x11, 0x22, 0x33, 255]));
    }

    #[test]
    fn test_recolor_without_match_borrows() {
        let maps = vec![ColorMap {
            from: "#ABCDEF".to_string(),
            to: "#000000".to_string(),
        }];
        assert!(matches!(recolor(SQUARE, &maps), Cow::Borrowed(_)));
    }
}
