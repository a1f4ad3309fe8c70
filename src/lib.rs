//! Mask overlay compositing and candidate-mask navigation for annotating
//! images with a remote segmentation model.

pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod mask;
pub mod mask_set;
pub mod overlay;
pub mod prompt;
pub mod segment;
pub mod tool;

pub use error::{Error, Result};
pub use mask::Mask;
pub use mask_set::{Direction, MaskSet};
pub use overlay::{build_overlay, CompositedImage, OverlayOptions};
pub use prompt::{BoxPrompt, Label, Point, PromptSet};
pub use segment::{MaskFile, Segment};
pub use tool::{PointerEvent, Tool, ToolOutcome, ToolState};
