//! Background painting.
//!
//! [§ 14.2 The background](https://www.w3.org/TR/CSS2/colors.html#background)
//!
//! "The background of the content, padding, and border areas of a box is
//! specified by the 'background' property of the generating element."
//!
//! Colors fill the border box. Images are placed from `background-position`
//! inside the padding box, repeated per `background-repeat` and clipped to
//! the padding box.

use folio_common::ImageInfo;

use super::canvas::Canvas;
use crate::layout::box_model::Rect;
use crate::layout::context::ImageResolver;
use crate::style::values::{BackgroundPosition, BackgroundRepeat, LengthValue, PT_PER_INCH};

/// Offset of the first tile inside `area` along one axis.
///
/// [§ 14.2.1](https://www.w3.org/TR/CSS2/colors.html#propdef-background-position)
/// "With a value pair of '14% 84%', the point 14% across and 84% down the
/// image is to be placed at the point 14% across and 84% down the padding
/// box."
fn axis_offset(value: LengthValue, area: f32, tile: f32, font_size: f32) -> f32 {
    match value {
        LengthValue::Percent(p) => (area - tile) * p / 100.0,
        other => other.to_pt(font_size, None),
    }
}

/// Start positions of the tiles along one axis, covering `[start, end)`.
fn axis_tiles(origin: f32, tile: f32, start: f32, end: f32, repeat: bool) -> Vec<f32> {
    if tile <= 0.0 {
        return Vec::new();
    }
    if !repeat {
        return if origin < end && origin + tile > start {
            vec![origin]
        } else {
            Vec::new()
        };
    }
    let mut first = origin;
    if first > start {
        first -= ((first - start) / tile).ceil() * tile;
    } else {
        first += ((start - first) / tile).floor() * tile;
    }
    let mut out = Vec::new();
    let mut pos = first;
    while pos < end {
        out.push(pos);
        pos += tile;
    }
    out
}

/// Where the tiles of a background image land.
///
/// `tile` is the image size in points. Tiles may extend past `area`; the
/// caller clips.
#[must_use]
pub fn tile_rects(
    area: Rect,
    tile: (f32, f32),
    position: BackgroundPosition,
    repeat: BackgroundRepeat,
    font_size: f32,
) -> Vec<Rect> {
    let origin_x = area.x + axis_offset(position.x, area.width, tile.0, font_size);
    let origin_y = area.y + axis_offset(position.y, area.height, tile.1, font_size);
    let xs = axis_tiles(origin_x, tile.0, area.x, area.right(), repeat.repeats_x());
    let ys = axis_tiles(origin_y, tile.1, area.y, area.bottom(), repeat.repeats_y());
    ys.iter()
        .flat_map(|&y| {
            xs.iter().map(move |&x| Rect {
                x,
                y,
                width: tile.0,
                height: tile.1,
            })
        })
        .collect()
}

/// Size of an image in points.
#[must_use]
pub fn image_size_pt(image: &ImageInfo, dpi: f32) -> (f32, f32) {
    let (w, h) = image.dimensions_f32();
    (w * PT_PER_INCH / dpi, h * PT_PER_INCH / dpi)
}

/// Tile `image` over `area`.
///
/// An image the backend cannot tile directly is first converted through the
/// resolver; the temporary file is removed when this returns.
pub fn paint_background_image(
    canvas: &mut dyn Canvas,
    images: &dyn ImageResolver,
    image: &ImageInfo,
    area: Rect,
    tiles: &[Rect],
) {
    if tiles.is_empty() || area.width <= 0.0 || area.height <= 0.0 {
        return;
    }
    let converted = images.convert_for_tiling(image);
    let path = match converted.as_ref() {
        Some(temp) => temp.to_string_lossy().into_owned(),
        None => image.path().to_string(),
    };
    canvas.push_clip(area);
    for tile in tiles {
        canvas.image(&path, *tile);
    }
    canvas.pop_clip();
}

#[cfg(test)]
mod tests {
    use super::*;

    const AREA: Rect = Rect {
        x: 0.0,
        y: 0.0,
        width: 100.0,
        height: 50.0,
    };

    #[test]
    fn test_no_repeat_is_placed_by_percentage() {
        let position = BackgroundPosition {
            x: LengthValue::Percent(50.0),
            y: LengthValue::Percent(100.0),
        };
        let tiles = tile_rects(AREA, (20.0, 10.0), position, BackgroundRepeat::NoRepeat, 12.0);
        assert_eq!(
            tiles,
            vec![Rect {
                x: 40.0,
                y: 40.0,
                width: 20.0,
                height: 10.0
            }]
        );
    }

    #[test]
    fn test_repeat_x_covers_the_row() {
        let position = BackgroundPosition {
            x: LengthValue::Pt(15.0),
            y: LengthValue::Pt(5.0),
        };
        let tiles = tile_rects(AREA, (30.0, 10.0), position, BackgroundRepeat::RepeatX, 12.0);
        let xs: Vec<f32> = tiles.iter().map(|t| t.x).collect();
        assert_eq!(xs, vec![-15.0, 15.0, 45.0, 75.0]);
        assert!(tiles.iter().all(|t| t.y == 5.0));
    }

    #[test]
    fn test_repeat_fills_grid() {
        let tiles = tile_rects(
            AREA,
            (50.0, 25.0),
            BackgroundPosition::default(),
            BackgroundRepeat::Repeat,
            12.0,
        );
        assert_eq!(tiles.len(), 4);
    }

    #[test]
    fn test_image_size_uses_dpi() {
        let image = ImageInfo::broken();
        assert_eq!(image_size_pt(&image, 96.0), (12.0, 12.0));
    }
}
