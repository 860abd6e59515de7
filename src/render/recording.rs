use std::sync::{Arc, Mutex, PoisonError};

use kurbo::Shape;

use crate::{
    assets::decode::PreparedImage,
    foundation::core::{Affine, BezPath, Point, Rect, Rgba8},
    render::context::{CanvasTarget, DrawContext, Paint, TextAlign, TextStyle},
};

/// A drawing call captured by [`RecordingContext`], resolved to device space.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Clear(Rgba8),
    FillPath {
        bounds: Rect,
        color: Rgba8,
        alpha: f64,
    },
    StrokePath {
        bounds: Rect,
        width: f64,
        color: Rgba8,
        alpha: f64,
    },
    Image {
        key: String,
        dest: Rect,
        alpha: f64,
    },
    Text {
        text: String,
        at: Point,
        size: f32,
        color: Rgba8,
        align: TextAlign,
        alpha: f64,
    },
    Present,
}

/// Shared, cloneable view of a recording.
#[derive(Clone, Debug, Default)]
pub struct RecordingLog(Arc<Mutex<Vec<DrawCommand>>>);

impl RecordingLog {
    fn push(&self, cmd: DrawCommand) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(cmd);
    }

    /// Copy of every command recorded so far.
    pub fn commands(&self) -> Vec<DrawCommand> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn len(&self) -> usize {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of presented frames.
    pub fn presents(&self) -> usize {
        self.count(|c| matches!(c, DrawCommand::Present))
    }

    /// Every text string drawn, in order.
    pub fn texts(&self) -> Vec<String> {
        self.commands()
            .into_iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&DrawCommand) -> bool) -> usize {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|c| pred(c))
            .count()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

#[derive(Clone, Copy, Debug)]
struct State {
    transform: Affine,
    alpha: f64,
}

impl Default for State {
    fn default() -> Self {
        Self {
            transform: Affine::IDENTITY,
            alpha: 1.0,
        }
    }
}

/// [`DrawContext`] that records calls instead of rasterizing.
#[derive(Debug)]
pub struct RecordingContext {
    width: u32,
    height: u32,
    log: RecordingLog,
    state: State,
    stack: Vec<State>,
}

impl RecordingContext {
    pub fn new(width: u32, height: u32, log: RecordingLog) -> Self {
        Self {
            width,
            height,
            log,
            state: State::default(),
            stack: Vec::new(),
        }
    }

    /// Current transform stack depth (0 when balanced).
    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

impl DrawContext for RecordingContext {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear(&mut self, color: Rgba8) {
        self.log.push(DrawCommand::Clear(color));
    }

    fn save(&mut self) {
        self.stack.push(self.state);
    }

    fn restore(&mut self) {
        if let Some(s) = self.stack.pop() {
            self.state = s;
        }
    }

    fn concat_transform(&mut self, affine: Affine) {
        self.state.transform *= affine;
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.state.alpha *= alpha.clamp(0.0, 1.0);
    }

    fn fill_path(&mut self, path: &BezPath, paint: &Paint) {
        self.log.push(DrawCommand::FillPath {
            bounds: (self.state.transform * path.clone()).bounding_box(),
            color: paint.base_color(),
            alpha: self.state.alpha,
        });
    }

    fn stroke_path(&mut self, path: &BezPath, width: f64, paint: &Paint) {
        self.log.push(DrawCommand::StrokePath {
            bounds: (self.state.transform * path.clone()).bounding_box(),
            width,
            color: paint.base_color(),
            alpha: self.state.alpha,
        });
    }

    fn draw_image(&mut self, key: &str, _image: &PreparedImage, dest: Rect) {
        self.log.push(DrawCommand::Image {
            key: key.to_string(),
            dest: self.state.transform.transform_rect_bbox(dest),
            alpha: self.state.alpha,
        });
    }

    fn draw_text(&mut self, text: &str, at: Point, style: &TextStyle) {
        self.log.push(DrawCommand::Text {
            text: text.to_string(),
            at: self.state.transform * at,
            size: style.size,
            color: style.color,
            align: style.align,
            alpha: self.state.alpha,
        });
    }

    fn present(&mut self) {
        self.stack.clear();
        self.state = State::default();
        self.log.push(DrawCommand::Present);
    }
}

/// [`CanvasTarget`] producing [`RecordingContext`]s that share one [`RecordingLog`].
#[derive(Clone, Debug)]
pub struct RecordingCanvas {
    width: u32,
    height: u32,
    available: bool,
    log: RecordingLog,
}

impl RecordingCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            available: true,
            log: RecordingLog::default(),
        }
    }

    /// Canvas that refuses to hand out a context.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new(0, 0)
        }
    }

    pub fn log(&self) -> RecordingLog {
        self.log.clone()
    }
}

impl CanvasTarget for RecordingCanvas {
    fn create_context(&mut self) -> Option<Box<dyn DrawContext>> {
        if !self.available {
            return None;
        }
        Some(Box::new(RecordingContext::new(
            self.width,
            self.height,
            self.log.clone(),
        )))
    }
}
