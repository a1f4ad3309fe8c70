use image::{Rgba, RgbaImage};
use segment_overlay::{
    overlay::{render, OverlayOptions},
    segment::{SegmentationRequest, SegmentationResponse},
    tool::ToolLimits,
    Direction, Label, MaskFile, MaskSet, PointerEvent, PromptSet, Tool, ToolOutcome, ToolState,
};

fn square_mask(width: u32, height: u32, x0: u32, y0: u32, side: u32) -> Vec<bool> {
    (0..width * height)
        .map(|i| {
            let (x, y) = (i % width, i / width);
            x >= x0 && x < x0 + side && y >= y0 && y < y0 + side
        })
        .collect()
}

#[test]
fn response_to_overlay() {
    let (width, height) = (16, 16);
    let base = RgbaImage::from_pixel(width, height, Rgba([100, 100, 100, 255]));

    let response = SegmentationResponse {
        success: true,
        error: None,
        score: Some(0.9),
        all_masks: vec![
            square_mask(width, height, 2, 2, 10),
            square_mask(width, height, 4, 4, 2),
            square_mask(width, height, 0, 0, 16),
        ],
        all_scores: vec![0.9, 0.5, 0.7],
    };
    let masks = response.into_mask_set(width, height).unwrap();
    let counts: Vec<usize> = masks.iter().map(|(mask, _)| mask.true_count()).collect();
    assert_eq!(counts, vec![4, 100, 256]);

    let options = OverlayOptions {
        draw_contours: false,
        draw_prompts: false,
    };
    let small = render(&base, &masks, &PromptSet::default(), options).unwrap();
    assert_eq!(small.get_pixel(4, 4).0, [193, 40, 40, 255]);
    assert_eq!(small.get_pixel(2, 2).0, [100, 100, 100, 255]);

    let masks = masks.cycle(Direction::Next);
    assert_eq!(masks.describe().as_deref(), Some("Mask M (0.900)"));
    let medium = render(&base, &masks, &PromptSet::default(), options).unwrap();
    assert_eq!(medium.get_pixel(2, 2).0, [193, 40, 40, 255]);

    // Failed requests leave the previous set usable
    let failed = SegmentationResponse {
        success: false,
        error: Some("boom".to_string()),
        score: None,
        all_masks: Vec::new(),
        all_scores: Vec::new(),
    };
    assert!(failed.into_mask_set(width, height).is_err());
    assert_eq!(masks.current_index(), 1);
}

#[test]
fn mask_file_survives_json() {
    let masks = MaskSet::load(
        vec![
            square_mask(8, 8, 0, 0, 4).into(),
            square_mask(8, 8, 0, 0, 2).into(),
        ],
        vec![0.3, 0.6],
    )
    .unwrap();

    let text = serde_json::to_string(&MaskFile::from_mask_set(&masks, 8, 8).unwrap()).unwrap();
    let file: MaskFile = serde_json::from_str(&text).unwrap();
    assert_eq!(file.width, 8);
    assert_eq!(file.into_mask_set().unwrap(), masks);
}

#[test]
fn tools_build_request() {
    let mut tools = ToolState::new(Tool::Point(Label::Include), ToolLimits::default());
    tools.handle(PointerEvent::Click(5.0, 6.0));
    tools.set_tool(Tool::Box);
    tools.handle(PointerEvent::Down(0.0, 0.0));
    assert_eq!(tools.handle(PointerEvent::Up(20.0, 30.0)), ToolOutcome::AutoSegment);

    let request = SegmentationRequest::new(b"\x89PNG", tools.prompts(), tools.drawing_path());
    assert_eq!(request.positive_points, vec![[5, 6]]);
    assert!(request.negative_points.is_empty());
    assert_eq!(request.bbox, Some([0.0, 0.0, 20.0, 30.0]));
    assert!(request.draw_path.is_none());
    assert!(request.image_data.starts_with("data:image/png;base64,"));

    tools.clear();
    assert!(tools.prompts().is_empty());
}
