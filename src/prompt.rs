//! Point and box prompts collected from the user for the segmentation model.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    Include = 1,
    Exclude = 0,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub x: i64,
    pub y: i64,
    pub label: Label,
    /// Synthesized from a freehand path; listed in aggregate, never drawn.
    pub hidden: bool,
}

impl Point {
    pub fn new(x: i64, y: i64, label: Label) -> Self {
        Self {
            x,
            y,
            label,
            hidden: false,
        }
    }

    pub fn hidden(x: i64, y: i64) -> Self {
        Self {
            x,
            y,
            label: Label::Include,
            hidden: true,
        }
    }
}

/// Rectangle prompt with `x1 <= x2` and `y1 <= y2`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxPrompt {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl BoxPrompt {
    pub fn from_corners(a: (f64, f64), b: (f64, f64)) -> Self {
        Self {
            x1: a.0.min(b.0),
            y1: a.1.min(b.1),
            x2: a.0.max(b.0),
            y2: a.1.max(b.1),
        }
    }

    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x1 && x <= self.x2 && y >= self.y1 && y <= self.y2
    }

    pub fn to_array(&self) -> [f64; 4] {
        [self.x1, self.y1, self.x2, self.y2]
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PromptSet {
    points: Vec<Point>,
    bbox: Option<BoxPrompt>,
}

impl PromptSet {
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn bbox(&self) -> Option<&BoxPrompt> {
        self.bbox.as_ref()
    }

    pub fn add_point(&mut self, point: Point) {
        self.points.push(point);
    }

    /// Replace the active box; boxes never accumulate.
    pub fn set_box(&mut self, bbox: BoxPrompt) {
        self.bbox = Some(bbox);
    }

    pub fn clear_box(&mut self) {
        self.bbox = None;
    }

    pub fn remove_point(&mut self, index: usize) -> Option<Point> {
        (index < self.points.len()).then(|| self.points.remove(index))
    }

    /// Drop every freehand-derived point at once.
    pub fn remove_hidden(&mut self) {
        self.points.retain(|point| !point.hidden);
    }

    /// Remove visible points within `radius` of `(x, y)`; returns how many went.
    pub fn erase_near(&mut self, x: f64, y: f64, radius: f64) -> usize {
        let before = self.points.len();
        self.points.retain(|point| {
            if point.hidden {
                return true;
            }
            let dx = point.x as f64 - x;
            let dy = point.y as f64 - y;
            (dx * dx + dy * dy).sqrt() > radius
        });
        before - self.points.len()
    }

    pub fn visible_points(&self) -> impl Iterator<Item = &Point> {
        self.points.iter().filter(|point| !point.hidden)
    }

    pub fn hidden_count(&self) -> usize {
        self.points.iter().filter(|point| point.hidden).count()
    }

    /// Nothing to segment with: no points and no box.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty() && self.bbox.is_none()
    }

    pub fn clear(&mut self) {
        self.points.clear();
        self.bbox = None;
    }

    pub fn positive_points(&self) -> Vec<[i64; 2]> {
        self.labelled(Label::Include)
    }

    pub fn negative_points(&self) -> Vec<[i64; 2]> {
        self.labelled(Label::Exclude)
    }

    fn labelled(&self, label: Label) -> Vec<[i64; 2]> {
        self.points
            .iter()
            .filter(|point| point.label == label)
            .map(|point| [point.x, point.y])
            .collect()
    }
}

/// Representative point of a freehand path.
///
/// Short paths (under three points) use the plain mean. Longer ones weight
/// each point by `1 + distance to the mean`.
pub fn weighted_average_point(path: &[(f64, f64)]) -> Option<(i64, i64)> {
    if path.is_empty() {
        return None;
    }

    let n = path.len() as f64;
    let (sum_x, sum_y) = path
        .iter()
        .fold((0.0, 0.0), |(sx, sy), &(x, y)| (sx + x, sy + y));
    let (center_x, center_y) = (sum_x / n, sum_y / n);

    if path.len() < 3 {
        return Some((center_x.round() as i64, center_y.round() as i64));
    }

    let mut total_weight = 0.0;
    let mut weighted_x = 0.0;
    let mut weighted_y = 0.0;
    for &(x, y) in path {
        let dx = x - center_x;
        let dy = y - center_y;
        let weight = (dx * dx + dy * dy).sqrt() + 1.0;

        total_weight += weight;
        weighted_x += x * weight;
        weighted_y += y * weight;
    }

    Some((
        (weighted_x / total_weight).round() as i64,
        (weighted_y / total_weight).round() as i64,
    ))
}
