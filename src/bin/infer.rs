use std::{
    fs::{create_dir, read_dir},
    io::Cursor,
    path::PathBuf,
};

use anyhow::{anyhow, bail, Result};
use clap::Parser;
use image::ImageFormat;
use log::{error, info};
use segment_overlay::{
    client::SegmentationClient,
    config::Settings,
    logging::setup_logger,
    segment::SegmentationRequest,
    BoxPrompt, Label, MaskFile, Point, PromptSet,
};
use serde_json::to_string;
use tokio::{fs::File, io::AsyncWriteExt};

#[derive(Parser, Debug)]
struct Args {
    #[arg(short, long)]
    input: PathBuf,

    #[arg(short, long)]
    output: PathBuf,

    /// Segmentation service base URL; overrides the settings file
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Include point as `x,y`
    #[arg(short, long = "point", value_parser = parse_point)]
    points: Vec<(i64, i64)>,

    /// Exclude point as `x,y`
    #[arg(short, long = "negative", value_parser = parse_point)]
    negatives: Vec<(i64, i64)>,

    /// Box prompt as `x1,y1,x2,y2`
    #[arg(short, long = "box", value_parser = parse_box)]
    bbox: Option<BoxPrompt>,

    #[arg(long)]
    settings: Option<PathBuf>,
}

fn parse_point(value: &str) -> std::result::Result<(i64, i64), String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected x,y but got \"{}\"", value))?;
    let x = x.trim().parse().map_err(|e| format!("bad x: {}", e))?;
    let y = y.trim().parse().map_err(|e| format!("bad y: {}", e))?;
    Ok((x, y))
}

fn parse_box(value: &str) -> std::result::Result<BoxPrompt, String> {
    let coords = value
        .split(',')
        .map(|part| part.trim().parse::<f64>().map_err(|e| e.to_string()))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    match coords.as_slice() {
        [x1, y1, x2, y2] => Ok(BoxPrompt::from_corners((*x1, *y1), (*x2, *y2))),
        _ => Err(format!("expected x1,y1,x2,y2 but got \"{}\"", value)),
    }
}

fn prompts_from(args: &Args) -> PromptSet {
    let mut prompts = PromptSet::default();
    for &(x, y) in &args.points {
        prompts.add_point(Point::new(x, y, Label::Include));
    }
    for &(x, y) in &args.negatives {
        prompts.add_point(Point::new(x, y, Label::Exclude));
    }
    if let Some(bbox) = args.bbox {
        prompts.set_box(bbox);
    }
    prompts
}

async fn infer(
    client: &SegmentationClient,
    prompts: &PromptSet,
    image_filepath: PathBuf,
    mask_filepath: PathBuf,
) -> Result<()> {
    let image = image::open(&image_filepath)?.to_rgba8();
    let (width, height) = image.dimensions();

    let payload = {
        let mut buffer = Cursor::new(Vec::new());
        image.write_to(&mut buffer, ImageFormat::Png)?;
        buffer.into_inner()
    };

    let request = SegmentationRequest::new(&payload, prompts, None);
    let response = client.segment(&request).await?;
    let best_score = response.score;
    let masks = response.into_mask_set(width, height)?;
    match best_score {
        Some(score) => info!(
            "{}: {} masks, best score {:.3}",
            image_filepath.display(),
            masks.len(),
            score
        ),
        None => info!("{}: {} masks", image_filepath.display(), masks.len()),
    }

    {
        let mut file = File::create(mask_filepath).await?;
        let mask_file = to_string(&MaskFile::from_mask_set(&masks, width, height)?)?;
        file.write_all(mask_file.as_bytes()).await?;
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logger("infer");
    let args = Args::parse();

    let settings = Settings::load(args.settings.as_deref());
    let endpoint = args.endpoint.clone().unwrap_or(settings.endpoint);
    let client = SegmentationClient::new(endpoint);

    let prompts = prompts_from(&args);
    if prompts.is_empty() {
        bail!("At least one point or a box must be provided.");
    }

    match (
        args.input.is_dir(),
        args.output.is_dir(),
        args.output.exists(),
    ) {
        (false, false, _) => {
            infer(&client, &prompts, args.input, args.output).await?;
        }
        (true, false, false) | (true, true, true) => {
            if !args.output.exists() {
                create_dir(&args.output)?;
            }

            let image_dir = read_dir(&args.input)?;

            let mut jobs = Vec::new();
            for entry in image_dir {
                let image_filepath = entry?.path();
                let image_stem = image_filepath
                    .file_stem()
                    .and_then(|stem| stem.to_str())
                    .ok_or_else(|| anyhow!("Invalid file name {:?}", image_filepath))?
                    .to_string();
                let mask_filepath = args.output.join(format!("{}.json", image_stem));
                jobs.push((image_filepath, mask_filepath));
            }

            // One request at a time: the client rejects overlapping calls
            for (image_filepath, mask_filepath) in jobs {
                if let Err(e) = infer(&client, &prompts, image_filepath.clone(), mask_filepath).await {
                    error!("Failed to segment {}: {}", image_filepath.display(), e);
                    return Err(e);
                }
            }
        }
        _ => bail!("Invalid combination of input and output paths."),
    }

    Ok(())
}
