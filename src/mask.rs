//! Flat row-major segmentation masks.
//!
//! Index `i` of a mask belongs to pixel `(i % width, i / width)`. A mask does
//! not carry its own dimensions: the image it is paired with does, and every
//! operation that needs them takes `width` and `height` and checks the length.

use log::debug;
use png::{BitDepth, ColorType, Decoder, Encoder, Transformations};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Mask(Vec<bool>);

impl Mask {
    pub fn new(pixels: Vec<bool>) -> Self {
        Self(pixels)
    }

    /// Build a mask from 0/1 (or 0/255) flags; any nonzero entry is set.
    pub fn from_flags<I: IntoIterator<Item = u8>>(flags: I) -> Self {
        Self(flags.into_iter().map(|flag| flag != 0).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.0
    }

    /// Number of set pixels.
    pub fn true_count(&self) -> usize {
        self.0.iter().filter(|&&set| set).count()
    }

    pub fn check_dimensions(&self, width: u32, height: u32) -> Result<()> {
        let expected = width as usize * height as usize;
        if self.0.len() != expected {
            return Err(Error::DimensionMismatch {
                expected,
                actual: self.0.len(),
            });
        }
        Ok(())
    }

    /// Set pixels with at least one unset 4-neighbour.
    ///
    /// Only interior pixels are scanned; the outermost rows and columns are
    /// never reported even when set.
    pub fn edge_pixels(&self, width: u32, height: u32) -> Result<Vec<(u32, u32)>> {
        self.check_dimensions(width, height)?;

        let mut edges = Vec::new();
        if width < 3 || height < 3 {
            return Ok(edges);
        }

        let w = width as usize;
        for y in 1..height as usize - 1 {
            for x in 1..w - 1 {
                let idx = y * w + x;
                if !self.0[idx] {
                    continue;
                }

                let top = self.0[idx - w];
                let bottom = self.0[idx + w];
                let left = self.0[idx - 1];
                let right = self.0[idx + 1];

                if !top || !bottom || !left || !right {
                    edges.push((x as u32, y as u32));
                }
            }
        }

        Ok(edges)
    }

    /// Decode a PNG mask; the first channel of each pixel decides membership.
    pub fn from_png(bytes: &[u8], width: u32, height: u32) -> Result<Self> {
        let mut decoder = Decoder::new(bytes);
        decoder.set_transformations(Transformations::EXPAND | Transformations::STRIP_16);
        let mut reader = decoder.read_info()?;
        let mut buf = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf)?;

        if (info.width, info.height) != (width, height) {
            return Err(Error::DimensionMismatch {
                expected: width as usize * height as usize,
                actual: info.width as usize * info.height as usize,
            });
        }

        if info.bit_depth != BitDepth::Eight {
            return Err(Error::UnsupportedPng(format!(
                "bit depth {:?}",
                info.bit_depth
            )));
        }

        let channels = info.color_type.samples();
        let bytes = &buf[..info.buffer_size()];
        let mask = Self::from_flags(bytes.chunks_exact(channels).map(|pixel| pixel[0]));
        debug!(
            "Decoded {}x{} PNG mask with {} set pixels",
            info.width,
            info.height,
            mask.true_count()
        );

        mask.check_dimensions(width, height)?;
        Ok(mask)
    }

    /// Encode as 8-bit greyscale, 255 for set pixels.
    pub fn to_png(&self, width: u32, height: u32) -> Result<Vec<u8>> {
        self.check_dimensions(width, height)?;

        let data: Vec<u8> = self.0.iter().map(|&set| if set { 255 } else { 0 }).collect();
        let mut out = Vec::new();
        {
            let mut encoder = Encoder::new(&mut out, width, height);
            encoder.set_color(ColorType::Grayscale);
            encoder.set_depth(BitDepth::Eight);
            let mut writer = encoder.write_header()?;
            writer.write_image_data(&data)?;
            writer.finish()?;
        }
        Ok(out)
    }
}

impl From<Vec<bool>> for Mask {
    fn from(pixels: Vec<bool>) -> Self {
        Self(pixels)
    }
}

impl FromIterator<bool> for Mask {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
