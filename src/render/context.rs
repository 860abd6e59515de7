use crate::{
    assets::decode::PreparedImage,
    foundation::core::{Affine, BezPath, Point, Rect, Rgba8, Vec2},
};

/// One color stop of a gradient. `offset` is in `[0,1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientStop {
    pub offset: f32,
    pub color: Rgba8,
}

impl GradientStop {
    pub const fn new(offset: f32, color: Rgba8) -> Self {
        Self { offset, color }
    }
}

/// How a path is filled or stroked.
#[derive(Clone, Debug, PartialEq)]
pub enum Paint {
    Solid(Rgba8),
    Linear {
        start: Point,
        end: Point,
        stops: Vec<GradientStop>,
    },
    Radial {
        center: Point,
        radius: f64,
        stops: Vec<GradientStop>,
    },
}

impl Paint {
    /// Two-stop vertical gradient spanning `rect`.
    pub fn vertical(rect: Rect, top: Rgba8, bottom: Rgba8) -> Self {
        Self::Linear {
            start: Point::new(rect.x0, rect.y0),
            end: Point::new(rect.x0, rect.y1),
            stops: vec![GradientStop::new(0.0, top), GradientStop::new(1.0, bottom)],
        }
    }

    /// Radial glow fading from `inner` to fully transparent.
    pub fn glow(center: Point, radius: f64, inner: Rgba8) -> Self {
        Self::Radial {
            center,
            radius,
            stops: vec![
                GradientStop::new(0.0, inner),
                GradientStop::new(1.0, inner.with_alpha(0.0)),
            ],
        }
    }

    /// Representative color (first stop for gradients).
    pub fn base_color(&self) -> Rgba8 {
        match self {
            Self::Solid(c) => *c,
            Self::Linear { stops, .. } | Self::Radial { stops, .. } => {
                stops.first().map(|s| s.color).unwrap_or(Rgba8::TRANSPARENT)
            }
        }
    }
}

impl From<Rgba8> for Paint {
    fn from(c: Rgba8) -> Self {
        Self::Solid(c)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextBaseline {
    Top,
    #[default]
    Middle,
    Bottom,
}

/// Drop shadow painted underneath text.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shadow {
    pub color: Rgba8,
    pub offset: Vec2,
    pub blur: f64,
}

/// Text appearance for [`DrawContext::draw_text`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle {
    pub size: f32,
    pub color: Rgba8,
    pub align: TextAlign,
    pub baseline: TextBaseline,
    pub shadow: Option<Shadow>,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            size: 16.0,
            color: Rgba8::WHITE,
            align: TextAlign::Center,
            baseline: TextBaseline::Middle,
            shadow: None,
        }
    }
}

impl TextStyle {
    pub fn sized(size: f32, color: Rgba8) -> Self {
        Self {
            size,
            color,
            ..Self::default()
        }
    }

    pub fn with_align(self, align: TextAlign) -> Self {
        Self { align, ..self }
    }

    pub fn with_shadow(self, color: Rgba8, offset: Vec2, blur: f64) -> Self {
        Self {
            shadow: Some(Shadow {
                color,
                offset,
                blur,
            }),
            ..self
        }
    }
}

/// Rendered frame pixels.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

/// Immediate-mode 2D drawing context an engine renders into.
///
/// Transform and global alpha form a stack manipulated with [`save`](Self::save) and
/// [`restore`](Self::restore). Geometry is given in the current user space.
pub trait DrawContext {
    /// Canvas size in device pixels.
    fn size(&self) -> (u32, u32);

    /// Fill the whole canvas, ignoring the current transform.
    fn clear(&mut self, color: Rgba8);

    fn save(&mut self);

    /// Pop the last [`save`](Self::save). Unbalanced calls are ignored.
    fn restore(&mut self);

    /// Post-multiply the current transform by `affine`.
    fn concat_transform(&mut self, affine: Affine);

    /// Multiply the current global alpha by `alpha` (clamped to `[0,1]`).
    fn set_global_alpha(&mut self, alpha: f64);

    fn fill_path(&mut self, path: &BezPath, paint: &Paint);

    fn stroke_path(&mut self, path: &BezPath, width: f64, paint: &Paint);

    /// Draw `image` scaled into `dest`. `key` identifies the image for backend-side caching.
    fn draw_image(&mut self, key: &str, image: &PreparedImage, dest: Rect);

    /// Draw a single line of text anchored at `at` per `style.align` and `style.baseline`.
    fn draw_text(&mut self, text: &str, at: Point, style: &TextStyle);

    /// Finish the frame and make it visible.
    fn present(&mut self);

    /// Pixels of the last presented frame, if the backend keeps them.
    fn snapshot_rgba8(&self) -> Option<FrameRGBA> {
        None
    }
}

/// Something that can hand out a drawing context, such as a window canvas.
pub trait CanvasTarget {
    /// `None` when no context can be obtained.
    fn create_context(&mut self) -> Option<Box<dyn DrawContext>>;
}
