// ============================================================================
// placeholder.rs — Generated placeholder icon (no source image)
// ============================================================================
//
// Flat background, a translucent disc in the middle and the initials on top,
// drawn with a built-in 5x7 bitmap font so no system fonts are needed.
// ============================================================================

use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut, Blend};
use imageproc::rect::Rect;

use crate::config::{Color, IconSpec, PlaceholderStyle};
use crate::error::IconResult;
use crate::renderer::IconRenderer;

const DISC_RADIUS: f32 = 0.4;
const TEXT_HEIGHT: f32 = 0.3;
const TEXT_LIFT: f32 = 0.05;
const GLYPH_W: u32 = 5;
const GLYPH_H: u32 = 7;

pub struct PlaceholderRenderer {
    style: PlaceholderStyle,
}

impl PlaceholderRenderer {
    pub fn new(style: PlaceholderStyle) -> Self {
        Self { style }
    }
}

impl IconRenderer for PlaceholderRenderer {
    fn render(&self, spec: &IconSpec) -> IconResult<RgbaImage> {
        // Every shape is alpha-blended over what is already drawn.
        let mut canvas = Blend(RgbaImage::from_pixel(spec.width, spec.height, Rgba(self.style.background.0)));
        draw_disc(&mut canvas, self.style.disc);
        draw_text(&mut canvas, &self.style.initials, self.style.glyph);
        Ok(canvas.0)
    }

    fn describe(&self) -> String {
        format!("placeholder \"{}\"", self.style.initials)
    }
}

fn short_side(img: &RgbaImage) -> f32 {
    img.width().min(img.height()) as f32
}

fn draw_disc(canvas: &mut Blend<RgbaImage>, color: Color) {
    let img = &canvas.0;
    let radius = (short_side(img) * DISC_RADIUS).round() as i32;
    let center = ((img.width() / 2) as i32, (img.height() / 2) as i32);
    draw_filled_circle_mut(canvas, center, radius, Rgba(color.0));
}

fn draw_text(canvas: &mut Blend<RgbaImage>, text: &str, color: Color) {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return;
    }
    let n = chars.len() as u32;
    // Advance is one glyph plus one dot of spacing; the last gap is dropped.
    let dots_wide = n * (GLYPH_W + 1) - 1;

    let (width, height) = canvas.0.dimensions();
    let side = short_side(&canvas.0);
    let by_height = (side * TEXT_HEIGHT / GLYPH_H as f32) as u32;
    let by_width = (width as f32 * 0.8 / dots_wide as f32) as u32;
    let scale = by_height.min(by_width).max(1);

    let text_w = (dots_wide * scale) as i64;
    let text_h = (GLYPH_H * scale) as i64;
    let x0 = (width as i64 - text_w) / 2;
    let y0 = (height as i64 - text_h) / 2 - (side * TEXT_LIFT) as i64;

    let paint = Rgba(color.0);
    for (i, ch) in chars.iter().enumerate() {
        let Some(rows) = glyph(*ch) else { continue };
        let gx = x0 + (i as i64) * ((GLYPH_W + 1) * scale) as i64;
        for (row, bits) in rows.iter().enumerate() {
            for col in 0..GLYPH_W {
                if (bits >> (GLYPH_W - 1 - col)) & 1 == 0 {
                    continue;
                }
                let px = gx + (col * scale) as i64;
                let py = y0 + (row as u32 * scale) as i64;
                // Off-canvas parts are clipped by imageproc.
                let dot = Rect::at(px as i32, py as i32).of_size(scale, scale);
                draw_filled_rect_mut(canvas, dot, paint);
            }
        }
    }
}

/// 5x7 rows, most significant of the low five bits is the leftmost column.
fn glyph(ch: char) -> Option<[u8; 7]> {
    let rows = match ch.to_ascii_uppercase() {
        'A' => [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'B' => [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E],
        'C' => [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E],
        'D' => [0x1E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x1E],
        'E' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F],
        'F' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10],
        'G' => [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0F],
        'H' => [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'I' => [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E],
        'J' => [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C],
        'K' => [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11],
        'L' => [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F],
        'M' => [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11],
        'N' => [0x11, 0x11, 0x19, 0x15, 0x13, 0x11, 0x11],
        'O' => [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'P' => [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10],
        'Q' => [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D],
        'R' => [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11],
        'S' => [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E],
        'T' => [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04],
        'U' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'V' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04],
        'W' => [0x11, 0x11, 0x11, 0x15, 0x15, 0x15, 0x0A],
        'X' => [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11],
        'Y' => [0x11, 0x11, 0x11, 0x0A, 0x04, 0x04, 0x04],
        'Z' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F],
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
        '3' => [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        _ => return None,
    };
    Some(rows)
}
