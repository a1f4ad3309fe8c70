//! Mask overlay compositing.
//!
//! Every function here is pure over its arguments: the base buffer is
//! copied, tinted and returned, and nothing is kept between calls.

use image::{Rgba, RgbaImage};
use log::debug;

use crate::error::{Error, Result};
use crate::mask::Mask;
use crate::mask_set::MaskSet;
use crate::prompt::{BoxPrompt, Label, PromptSet};

pub type CompositedImage = RgbaImage;

const KEEP: f64 = 0.4;
const TINT: f64 = 0.6;
const HIGHLIGHT: [f64; 3] = [255.0, 0.0, 0.0];

const CONTOUR: Rgba<u8> = Rgba([255, 255, 0, 255]);
const INCLUDE: Rgba<u8> = Rgba([0, 255, 0, 255]);
const EXCLUDE: Rgba<u8> = Rgba([255, 0, 0, 255]);
const RING: Rgba<u8> = Rgba([255, 255, 255, 255]);
const BOX: Rgba<u8> = Rgba([0, 0, 255, 255]);

const POINT_RADIUS: f64 = 6.0;
const RING_WIDTH: f64 = 1.0;
const BOX_LINE: i64 = 2;

#[derive(Debug, Clone, Copy)]
pub struct OverlayOptions {
    pub draw_contours: bool,
    pub draw_prompts: bool,
}

impl Default for OverlayOptions {
    fn default() -> Self {
        Self {
            draw_contours: false,
            draw_prompts: true,
        }
    }
}

fn blend(channel: u8, highlight: f64) -> u8 {
    (channel as f64 * KEEP + highlight * TINT)
        .round()
        .clamp(0.0, 255.0) as u8
}

/// Tint the masked pixels of an RGBA buffer red.
///
/// `base` must hold `width * height` RGBA pixels and `mask` one entry per
/// pixel. Alpha is never touched.
pub fn build_overlay(base: &[u8], mask: &Mask, width: u32, height: u32) -> Result<CompositedImage> {
    mask.check_dimensions(width, height)?;

    let expected = width as usize * height as usize * 4;
    if base.len() != expected {
        return Err(Error::DimensionMismatch {
            expected,
            actual: base.len(),
        });
    }

    let mut data = base.to_vec();
    for (pixel, &set) in data.chunks_exact_mut(4).zip(mask.as_slice()) {
        if !set {
            continue;
        }
        for (channel, highlight) in pixel.iter_mut().zip(HIGHLIGHT) {
            *channel = blend(*channel, highlight);
        }
    }

    RgbaImage::from_raw(width, height, data).ok_or(Error::DimensionMismatch {
        expected,
        actual: base.len(),
    })
}

/// [`build_overlay`] over an already decoded image.
pub fn composite(base: &RgbaImage, mask: &Mask) -> Result<CompositedImage> {
    build_overlay(base.as_raw(), mask, base.width(), base.height())
}

/// Paint the mask's edge pixels yellow.
pub fn draw_contours(image: &mut RgbaImage, mask: &Mask) -> Result<()> {
    let edges = mask.edge_pixels(image.width(), image.height())?;
    debug!("Drawing {} contour pixels", edges.len());
    for (x, y) in edges {
        image.put_pixel(x, y, CONTOUR);
    }
    Ok(())
}

fn put_clipped(image: &mut RgbaImage, x: i64, y: i64, color: Rgba<u8>) {
    if x >= 0 && y >= 0 && (x as u64) < image.width() as u64 && (y as u64) < image.height() as u64 {
        image.put_pixel(x as u32, y as u32, color);
    }
}

fn draw_point(image: &mut RgbaImage, cx: i64, cy: i64, fill: Rgba<u8>) {
    let reach = POINT_RADIUS.ceil() as i64;
    for dy in -reach..=reach {
        for dx in -reach..=reach {
            let distance = ((dx * dx + dy * dy) as f64).sqrt();
            if distance > POINT_RADIUS {
                continue;
            }
            let color = if distance > POINT_RADIUS - RING_WIDTH {
                RING
            } else {
                fill
            };
            put_clipped(image, cx + dx, cy + dy, color);
        }
    }
}

fn draw_box(image: &mut RgbaImage, bbox: &BoxPrompt) {
    let x1 = bbox.x1.round() as i64;
    let y1 = bbox.y1.round() as i64;
    let x2 = bbox.x2.round() as i64;
    let y2 = bbox.y2.round() as i64;

    for t in 0..BOX_LINE {
        for x in x1..=x2 {
            put_clipped(image, x, y1 + t, BOX);
            put_clipped(image, x, y2 - t, BOX);
        }
        for y in y1..=y2 {
            put_clipped(image, x1 + t, y, BOX);
            put_clipped(image, x2 - t, y, BOX);
        }
    }
}

/// Draw visible points and the box on top of an image.
pub fn draw_prompts(image: &mut RgbaImage, prompts: &PromptSet) {
    if let Some(bbox) = prompts.bbox() {
        draw_box(image, bbox);
    }
    for point in prompts.visible_points() {
        let fill = match point.label {
            Label::Include => INCLUDE,
            Label::Exclude => EXCLUDE,
        };
        draw_point(image, point.x, point.y, fill);
    }
}

/// Full frame for display: current mask overlay (if any) plus prompts.
pub fn render(
    base: &RgbaImage,
    masks: &MaskSet,
    prompts: &PromptSet,
    options: OverlayOptions,
) -> Result<CompositedImage> {
    let mut frame = match masks.current() {
        Some((mask, _)) => {
            let mut frame = composite(base, mask)?;
            if options.draw_contours {
                draw_contours(&mut frame, mask)?;
            }
            frame
        }
        None => base.clone(),
    };

    if options.draw_prompts {
        draw_prompts(&mut frame, prompts);
    }
    Ok(frame)
}
