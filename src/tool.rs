//! Canvas tools as one closed set of variants behind a single event handler.

use log::{debug, info};

use crate::config::Settings;
use crate::prompt::{weighted_average_point, BoxPrompt, Label, Point, PromptSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Box,
    Point(Label),
    Freehand,
    Eraser,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(f64, f64),
    Move(f64, f64),
    Up(f64, f64),
    Leave,
    Click(f64, f64),
}

/// What the caller should do after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolOutcome {
    Ignored,
    /// Prompts changed; redraw.
    Changed,
    /// Prompts changed and are complete enough to segment right away.
    AutoSegment,
}

#[derive(Debug, Clone, Copy)]
pub struct ToolLimits {
    pub min_box_side: f64,
    pub min_leave_path: usize,
    pub erase_radius: f64,
}

impl Default for ToolLimits {
    fn default() -> Self {
        Self {
            min_box_side: 10.0,
            min_leave_path: 5,
            erase_radius: 6.0,
        }
    }
}

impl From<&Settings> for ToolLimits {
    fn from(settings: &Settings) -> Self {
        Self {
            min_box_side: settings.min_box_side,
            min_leave_path: settings.min_leave_path,
            erase_radius: settings.erase_radius,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Drag {
    Idle,
    Box { start: (f64, f64) },
    Path(Vec<(f64, f64)>),
}

#[derive(Debug, Clone)]
pub struct ToolState {
    tool: Tool,
    drag: Drag,
    prompts: PromptSet,
    limits: ToolLimits,
}

impl ToolState {
    pub fn new(tool: Tool, limits: ToolLimits) -> Self {
        Self {
            tool,
            drag: Drag::Idle,
            prompts: PromptSet::default(),
            limits,
        }
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn prompts(&self) -> &PromptSet {
        &self.prompts
    }

    pub fn prompts_mut(&mut self) -> &mut PromptSet {
        &mut self.prompts
    }

    /// The freehand stroke being drawn, if any.
    pub fn drawing_path(&self) -> Option<&[(f64, f64)]> {
        match &self.drag {
            Drag::Path(path) => Some(path),
            _ => None,
        }
    }

    pub fn set_tool(&mut self, tool: Tool) {
        debug!("Switching tool {:?} -> {:?}", self.tool, tool);
        self.tool = tool;
        self.drag = Drag::Idle;
    }

    pub fn clear(&mut self) {
        self.prompts.clear();
        self.drag = Drag::Idle;
    }

    pub fn handle(&mut self, event: PointerEvent) -> ToolOutcome {
        match self.tool {
            Tool::Box => self.handle_box(event),
            Tool::Point(label) => self.handle_point(label, event),
            Tool::Freehand => self.handle_freehand(event),
            Tool::Eraser => self.handle_eraser(event),
        }
    }

    fn handle_box(&mut self, event: PointerEvent) -> ToolOutcome {
        match event {
            PointerEvent::Down(x, y) => {
                self.drag = Drag::Box { start: (x, y) };
                ToolOutcome::Ignored
            }
            PointerEvent::Up(x, y) => {
                let Drag::Box { start } = self.drag else {
                    return ToolOutcome::Ignored;
                };
                let bbox = BoxPrompt::from_corners(start, (x, y));
                self.drag = Drag::Idle;
                self.prompts.set_box(bbox);

                if bbox.width() > self.limits.min_box_side && bbox.height() > self.limits.min_box_side {
                    info!("Box {:?} selected, segmenting", bbox.to_array());
                    ToolOutcome::AutoSegment
                } else {
                    ToolOutcome::Changed
                }
            }
            _ => ToolOutcome::Ignored,
        }
    }

    fn handle_point(&mut self, label: Label, event: PointerEvent) -> ToolOutcome {
        match event {
            PointerEvent::Click(x, y) => {
                self.prompts
                    .add_point(Point::new(x.round() as i64, y.round() as i64, label));
                ToolOutcome::Changed
            }
            _ => ToolOutcome::Ignored,
        }
    }

    fn handle_freehand(&mut self, event: PointerEvent) -> ToolOutcome {
        match event {
            PointerEvent::Down(x, y) => {
                self.drag = Drag::Path(vec![(x, y)]);
                ToolOutcome::Ignored
            }
            PointerEvent::Move(x, y) => {
                if let Drag::Path(path) = &mut self.drag {
                    path.push((x, y));
                }
                ToolOutcome::Ignored
            }
            PointerEvent::Up(_, _) => {
                let Drag::Path(path) = std::mem::replace(&mut self.drag, Drag::Idle) else {
                    return ToolOutcome::Ignored;
                };
                match weighted_average_point(&path) {
                    Some((x, y)) => {
                        info!("Freehand path of {} points reduced to ({}, {})", path.len(), x, y);
                        self.prompts.add_point(Point::hidden(x, y));
                        ToolOutcome::AutoSegment
                    }
                    None => ToolOutcome::Ignored,
                }
            }
            PointerEvent::Leave => {
                let Drag::Path(path) = std::mem::replace(&mut self.drag, Drag::Idle) else {
                    return ToolOutcome::Ignored;
                };
                if path.len() <= self.limits.min_leave_path {
                    debug!("Discarding short freehand path of {} points", path.len());
                    return ToolOutcome::Ignored;
                }
                match weighted_average_point(&path) {
                    Some((x, y)) => {
                        self.prompts.add_point(Point::hidden(x, y));
                        ToolOutcome::Changed
                    }
                    None => ToolOutcome::Ignored,
                }
            }
            PointerEvent::Click(_, _) => ToolOutcome::Ignored,
        }
    }

    fn handle_eraser(&mut self, event: PointerEvent) -> ToolOutcome {
        let PointerEvent::Down(x, y) = event else {
            return ToolOutcome::Ignored;
        };

        let mut changed = self.prompts.erase_near(x, y, self.limits.erase_radius) > 0;
        if self.prompts.bbox().is_some_and(|bbox| bbox.contains(x, y)) {
            self.prompts.clear_box();
            changed = true;
        }

        if changed {
            ToolOutcome::Changed
        } else {
            ToolOutcome::Ignored
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(tool: Tool) -> ToolState {
        ToolState::new(tool, ToolLimits::default())
    }

    #[test]
    fn test_box_drag() {
        let mut tools = state(Tool::Box);
        assert_eq!(tools.handle(PointerEvent::Down(50.0, 40.0)), ToolOutcome::Ignored);
        assert_eq!(tools.handle(PointerEvent::Up(10.0, 5.0)), ToolOutcome::AutoSegment);
        assert_eq!(
            tools.prompts().bbox().map(|b| b.to_array()),
            Some([10.0, 5.0, 50.0, 40.0])
        );

        // A small box replaces the old one but does not trigger segmentation
        tools.handle(PointerEvent::Down(0.0, 0.0));
        assert_eq!(tools.handle(PointerEvent::Up(8.0, 30.0)), ToolOutcome::Changed);
        assert_eq!(tools.prompts().bbox().map(|b| b.x2), Some(8.0));
    }

    #[test]
    fn test_box_up_without_down() {
        let mut tools = state(Tool::Box);
        assert_eq!(tools.handle(PointerEvent::Up(10.0, 10.0)), ToolOutcome::Ignored);
        assert!(tools.prompts().is_empty());
    }

    #[test]
    fn test_point_clicks() {
        let mut tools = state(Tool::Point(Label::Include));
        assert_eq!(tools.handle(PointerEvent::Click(3.4, 7.6)), ToolOutcome::Changed);
        tools.set_tool(Tool::Point(Label::Exclude));
        tools.handle(PointerEvent::Click(1.0, 1.0));

        assert_eq!(tools.prompts().positive_points(), vec![[3, 8]]);
        assert_eq!(tools.prompts().negative_points(), vec![[1, 1]]);
    }

    #[test]
    fn test_freehand_up_adds_hidden_point() {
        let mut tools = state(Tool::Freehand);
        tools.handle(PointerEvent::Down(0.0, 0.0));
        tools.handle(PointerEvent::Move(10.0, 0.0));
        tools.handle(PointerEvent::Move(10.0, 10.0));
        tools.handle(PointerEvent::Move(0.0, 10.0));
        assert_eq!(tools.drawing_path().map(|p| p.len()), Some(4));

        assert_eq!(tools.handle(PointerEvent::Up(0.0, 10.0)), ToolOutcome::AutoSegment);
        assert_eq!(tools.prompts().points(), &[Point::hidden(5, 5)]);
        assert!(tools.drawing_path().is_none());
    }

    #[test]
    fn test_freehand_leave() {
        let mut tools = state(Tool::Freehand);
        tools.handle(PointerEvent::Down(0.0, 0.0));
        tools.handle(PointerEvent::Move(1.0, 1.0));
        assert_eq!(tools.handle(PointerEvent::Leave), ToolOutcome::Ignored);
        assert!(tools.prompts().is_empty());

        tools.handle(PointerEvent::Down(0.0, 0.0));
        for i in 1..6 {
            tools.handle(PointerEvent::Move(i as f64, 0.0));
        }
        assert_eq!(tools.handle(PointerEvent::Leave), ToolOutcome::Changed);
        assert_eq!(tools.prompts().hidden_count(), 1);
    }

    #[test]
    fn test_eraser() {
        let mut tools = state(Tool::Point(Label::Include));
        tools.handle(PointerEvent::Click(20.0, 20.0));
        tools.prompts_mut().add_point(Point::hidden(20, 20));
        tools
            .prompts_mut()
            .set_box(BoxPrompt::from_corners((0.0, 0.0), (10.0, 10.0)));

        tools.set_tool(Tool::Eraser);
        assert_eq!(tools.handle(PointerEvent::Down(50.0, 50.0)), ToolOutcome::Ignored);
        assert_eq!(tools.handle(PointerEvent::Down(22.0, 21.0)), ToolOutcome::Changed);
        assert_eq!(tools.prompts().points().len(), 1);
        assert!(tools.prompts().bbox().is_some());

        assert_eq!(tools.handle(PointerEvent::Down(5.0, 5.0)), ToolOutcome::Changed);
        assert!(tools.prompts().bbox().is_none());
    }

    #[test]
    fn test_switching_tool_drops_drag() {
        let mut tools = state(Tool::Freehand);
        tools.handle(PointerEvent::Down(0.0, 0.0));
        tools.set_tool(Tool::Freehand);
        assert_eq!(tools.handle(PointerEvent::Up(0.0, 0.0)), ToolOutcome::Ignored);
        assert!(tools.prompts().is_empty());
    }
}
