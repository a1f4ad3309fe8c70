use anyhow::{anyhow, bail, Result};
use clap::Parser;
use log::{info, warn};
use segment_overlay::{
    config::Settings,
    logging::setup_logger,
    overlay::{render, OverlayOptions},
    MaskFile, MaskSet, PromptSet,
};
use serde_json::from_str;
use std::{
    collections::HashSet,
    fs::{create_dir, read_dir, read_to_string},
    path::PathBuf,
};

#[derive(Parser, Debug)]
struct Args {
    #[arg(short, long)]
    input: PathBuf,

    #[arg(short, long)]
    output: PathBuf,

    #[arg(short, long)]
    mask: PathBuf,

    /// Position in the size-ordered mask list, smallest first
    #[arg(long)]
    index: Option<usize>,

    /// Size label: S, M or L
    #[arg(long)]
    label: Option<String>,

    /// Outline the mask in yellow
    #[arg(long)]
    contours: bool,

    #[arg(long)]
    settings: Option<PathBuf>,
}

fn select(masks: MaskSet, index: &Option<usize>, label: &Option<String>) -> Result<MaskSet> {
    let position = match (index, label) {
        (Some(index), _) => *index,
        (None, Some(label)) => masks
            .index_of_label(label)
            .ok_or_else(|| anyhow!("Label \"{}\" was not found.", label))?,
        (None, None) => 0,
    };

    if position >= masks.len() {
        bail!(
            "Mask index {} is out of range for {} masks.",
            position,
            masks.len()
        );
    }
    Ok(masks.select(position))
}

fn perform_segmentation(
    image_filepath: PathBuf,
    overlay_filepath: PathBuf,
    mask_filepath: PathBuf,
    index: &Option<usize>,
    label: &Option<String>,
    options: OverlayOptions,
) -> Result<()> {
    let image = image::open(&image_filepath)?.to_rgba8();

    let content = read_to_string(&mask_filepath)?;
    let mask_file: MaskFile = from_str(&content)?;
    if image.dimensions() != (mask_file.width, mask_file.height) {
        bail!(
            "Mask file {} is {}x{} but image {} is {}x{}",
            mask_filepath.display(),
            mask_file.width,
            mask_file.height,
            image_filepath.display(),
            image.width(),
            image.height()
        );
    }

    let masks = mask_file.into_mask_set()?;
    let masks = if masks.is_empty() {
        warn!("No masks for {}, writing the image unchanged", image_filepath.display());
        masks
    } else {
        select(masks, index, label)?
    };

    if let Some(description) = masks.describe() {
        info!("{}: {}", image_filepath.display(), description);
    }

    let frame = render(&image, &masks, &PromptSet::default(), options)?;
    frame.save(&overlay_filepath)?;

    Ok(())
}

fn main() -> Result<()> {
    setup_logger("segment");
    let args = Args::parse();

    let settings = Settings::load(args.settings.as_deref());
    let options = OverlayOptions {
        draw_contours: args.contours || settings.draw_contours,
        draw_prompts: false,
    };

    match (
        args.input.is_dir(),
        args.mask.is_dir(),
        args.output.is_dir(),
        args.output.exists(),
    ) {
        (false, false, false, _) => {
            perform_segmentation(
                args.input.clone(),
                args.output.clone(),
                args.mask.clone(),
                &args.index,
                &args.label,
                options,
            )?;
        }
        (true, true, true, _) | (true, true, false, false) => {
            let input_dir = read_dir(&args.input)?;
            let mask_dir = read_dir(&args.mask)?;

            let mut mask_file_stems = HashSet::new();
            for entry in mask_dir {
                let path = entry?.path();
                if path.extension().map_or(true, |ext| ext != "json") {
                    continue;
                }
                if let Some(stem) = path.file_stem() {
                    mask_file_stems.insert(stem.to_owned());
                }
            }

            let mut image_filepaths = Vec::new();
            for entry in input_dir {
                let path = entry?.path();
                match path.file_stem() {
                    Some(stem) if mask_file_stems.contains(stem) => image_filepaths.push(path),
                    _ => bail!("Mask not found for image \"{}\"", path.display()),
                }
            }

            if !args.output.exists() {
                create_dir(&args.output)?;
            }

            for image_filepath in image_filepaths.drain(..) {
                let image_stem = image_filepath
                    .file_stem()
                    .and_then(|stem| stem.to_str())
                    .ok_or_else(|| anyhow!("Invalid file name {:?}", image_filepath))?
                    .to_string();

                let overlay_filepath = args.output.join(format!("{}.png", image_stem));
                let mask_filepath = args.mask.join(format!("{}.json", image_stem));

                perform_segmentation(
                    image_filepath,
                    overlay_filepath,
                    mask_filepath,
                    &args.index,
                    &args.label,
                    options,
                )?;
            }
        }
        _ => bail!("Invalid combination of input, output, and mask paths."),
    }

    Ok(())
}
