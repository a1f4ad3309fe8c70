//! Wire and file formats for segmentation results.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use serde_with::{
    base64::{Base64, Standard},
    formats::Unpadded,
    serde_as,
};

use crate::error::{Error, Result};
use crate::mask::Mask;
use crate::mask_set::MaskSet;
use crate::prompt::PromptSet;

pub fn png_data_url(png: &[u8]) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(png))
}

/// Body of `POST /run_segmentation`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SegmentationRequest {
    pub image_data: String,
    pub positive_points: Vec<[i64; 2]>,
    pub negative_points: Vec<[i64; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draw_path: Option<Vec<[f64; 2]>>,
    #[serde(rename = "box", default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<[f64; 4]>,
}

impl SegmentationRequest {
    pub fn new(image_png: &[u8], prompts: &PromptSet, draw_path: Option<&[(f64, f64)]>) -> Self {
        Self {
            image_data: png_data_url(image_png),
            positive_points: prompts.positive_points(),
            negative_points: prompts.negative_points(),
            draw_path: draw_path
                .filter(|path| !path.is_empty())
                .map(|path| path.iter().map(|&(x, y)| [x, y]).collect()),
            bbox: prompts.bbox().map(|bbox| bbox.to_array()),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SegmentationResponse {
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub score: Option<f32>,
    #[serde(default)]
    pub all_masks: Vec<Vec<bool>>,
    #[serde(default)]
    pub all_scores: Vec<f32>,
}

impl SegmentationResponse {
    /// Validate the masks against the image and order them by size.
    pub fn into_mask_set(self, width: u32, height: u32) -> Result<MaskSet> {
        if !self.success {
            return Err(Error::Service(
                self.error.unwrap_or_else(|| "Unknown error".to_string()),
            ));
        }

        let masks = self
            .all_masks
            .into_iter()
            .map(|pixels| {
                let mask = Mask::new(pixels);
                mask.check_dimensions(width, height)?;
                Ok(mask)
            })
            .collect::<Result<Vec<_>>>()?;

        MaskSet::load(masks, self.all_scores)
    }
}

#[serde_as]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Segment {
    pub score: f32,
    #[serde_as(as = "Base64<Standard, Unpadded>")]
    pub mask: Vec<u8>,
}

/// Masks for one image as stored by `infer` and read by `segment`.
///
/// Segments carry no size labels; S/M/L come from the loaded [`MaskSet`] order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MaskFile {
    pub width: u32,
    pub height: u32,
    pub segments: Vec<Segment>,
}

impl MaskFile {
    pub fn from_mask_set(masks: &MaskSet, width: u32, height: u32) -> Result<Self> {
        let segments = masks
            .iter()
            .map(|(mask, score)| {
                Ok(Segment {
                    score,
                    mask: mask.to_png(width, height)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            width,
            height,
            segments,
        })
    }

    pub fn into_mask_set(self) -> Result<MaskSet> {
        let (masks, scores): (Vec<Mask>, Vec<f32>) = self
            .segments
            .iter()
            .map(|segment| Ok((Mask::from_png(&segment.mask, self.width, self.height)?, segment.score)))
            .collect::<Result<Vec<_>>>()?
            .into_iter()
            .unzip();

        MaskSet::load(masks, scores)
    }
}
