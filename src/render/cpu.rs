use std::{collections::HashMap, sync::Arc};

use crate::{
    assets::decode::PreparedImage,
    foundation::{
        core::{Affine, BezPath, Point, Rect, Rgba8},
        error::{RaffleError, RaffleResult},
    },
    render::{
        context::{
            CanvasTarget, DrawContext, FrameRGBA, GradientStop, Paint, TextAlign, TextBaseline,
            TextStyle,
        },
        text::TextLayoutEngine,
    },
};

/// [`CanvasTarget`] rasterizing on the CPU with `vello_cpu`.
#[derive(Clone, Debug)]
pub struct CpuCanvas {
    width: u32,
    height: u32,
    font: Option<Arc<Vec<u8>>>,
}

impl CpuCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            font: None,
        }
    }

    /// Use `font_bytes` (TTF/OTF) for text. Without a font, text draws are skipped.
    pub fn with_font(mut self, font_bytes: Vec<u8>) -> Self {
        self.font = Some(Arc::new(font_bytes));
        self
    }
}

impl CanvasTarget for CpuCanvas {
    fn create_context(&mut self) -> Option<Box<dyn DrawContext>> {
        match CpuContext::new(self.width, self.height, self.font.as_deref().map(Vec::as_slice)) {
            Ok(ctx) => Some(Box::new(ctx)),
            Err(err) => {
                tracing::warn!(
                    %err,
                    width = self.width,
                    height = self.height,
                    "cpu canvas unavailable"
                );
                None
            }
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct State {
    transform: Affine,
    alpha: f64,
}

struct CpuText {
    engine: TextLayoutEngine,
    font: vello_cpu::peniko::FontData,
}

/// Premultiplied RGBA8 raster context.
pub struct CpuContext {
    width: u16,
    height: u16,
    ctx: vello_cpu::RenderContext,
    pixmap: vello_cpu::Pixmap,
    state: State,
    stack: Vec<State>,
    images: HashMap<String, vello_cpu::Image>,
    text: Option<CpuText>,
}

impl std::fmt::Debug for CpuContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuContext")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("depth", &self.stack.len())
            .field("images", &self.images.len())
            .field("text", &self.text.is_some())
            .finish_non_exhaustive()
    }
}

impl CpuContext {
    pub fn new(width: u32, height: u32, font_bytes: Option<&[u8]>) -> RaffleResult<Self> {
        let w: u16 = width
            .try_into()
            .map_err(|_| RaffleError::resource("canvas width exceeds u16"))?;
        let h: u16 = height
            .try_into()
            .map_err(|_| RaffleError::resource("canvas height exceeds u16"))?;
        if w == 0 || h == 0 {
            return Err(RaffleError::resource("canvas must be non-empty"));
        }

        let text = match font_bytes {
            Some(bytes) => match TextLayoutEngine::new(bytes) {
                Ok(engine) => Some(CpuText {
                    engine,
                    font: vello_cpu::peniko::FontData::new(
                        vello_cpu::peniko::Blob::from(bytes.to_vec()),
                        0,
                    ),
                }),
                Err(err) => {
                    tracing::warn!(%err, "font rejected, text will not be drawn");
                    None
                }
            },
            None => None,
        };

        Ok(Self {
            width: w,
            height: h,
            ctx: vello_cpu::RenderContext::new(w, h),
            pixmap: vello_cpu::Pixmap::new(w, h),
            state: State {
                transform: Affine::IDENTITY,
                alpha: 1.0,
            },
            stack: Vec::new(),
            images: HashMap::new(),
            text,
        })
    }

    fn with_alpha_layer(&mut self, draw: impl FnOnce(&mut vello_cpu::RenderContext)) {
        let alpha = self.state.alpha as f32;
        if alpha <= 0.0 {
            return;
        }
        if alpha < 1.0 {
            self.ctx.push_opacity_layer(alpha);
        }
        draw(&mut self.ctx);
        if alpha < 1.0 {
            self.ctx.pop_layer();
        }
    }

    fn apply_paint(&mut self, paint: &Paint) {
        self.ctx
            .set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        match paint {
            Paint::Solid(c) => self.ctx.set_paint(color_to_cpu(*c)),
            Paint::Linear { start, end, stops } => {
                let stops = stops_to_cpu(stops);
                self.ctx.set_paint(
                    vello_cpu::peniko::Gradient::new_linear(
                        point_to_cpu(*start),
                        point_to_cpu(*end),
                    )
                    .with_stops(stops.as_slice()),
                );
            }
            Paint::Radial {
                center,
                radius,
                stops,
            } => {
                let stops = stops_to_cpu(stops);
                self.ctx.set_paint(
                    vello_cpu::peniko::Gradient::new_radial(point_to_cpu(*center), *radius as f32)
                        .with_stops(stops.as_slice()),
                );
            }
        }
    }

    fn image_paint_for(
        &mut self,
        key: &str,
        image: &PreparedImage,
    ) -> RaffleResult<vello_cpu::Image> {
        if let Some(paint) = self.images.get(key) {
            return Ok(paint.clone());
        }
        let pixmap =
            image_premul_bytes_to_pixmap(image.rgba8_premul.as_slice(), image.width, image.height)?;
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };
        self.images.insert(key.to_string(), paint.clone());
        Ok(paint)
    }

    fn glyphs_at(
        &mut self,
        text: &str,
        at: Point,
        style: &TextStyle,
        color: Rgba8,
    ) -> RaffleResult<()> {
        let Some(cpu_text) = self.text.as_mut() else {
            return Ok(());
        };
        let layout = cpu_text.engine.layout(text, style.size)?;
        let font = cpu_text.font.clone();

        let w = f64::from(layout.width());
        let h = f64::from(layout.height());
        let x = match style.align {
            TextAlign::Left => at.x,
            TextAlign::Center => at.x - w / 2.0,
            TextAlign::Right => at.x - w,
        };
        let y = match style.baseline {
            TextBaseline::Top => at.y,
            TextBaseline::Middle => at.y - h / 2.0,
            TextBaseline::Bottom => at.y - h,
        };

        let transform = self.state.transform * Affine::translate((x, y));
        self.ctx.set_transform(affine_to_cpu(transform));
        self.ctx.set_paint(color_to_cpu(color));
        self.with_alpha_layer(|ctx| {
            for line in layout.lines() {
                for item in line.items() {
                    let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                        continue;
                    };
                    let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                        id: g.id,
                        x: g.x,
                        y: g.y,
                    });
                    ctx.glyph_run(&font)
                        .font_size(run.run().font_size())
                        .fill_glyphs(glyphs);
                }
            }
        });
        Ok(())
    }

    /// Number of images converted to backend paints.
    pub fn cached_images(&self) -> usize {
        self.images.len()
    }
}

impl DrawContext for CpuContext {
    fn size(&self) -> (u32, u32) {
        (u32::from(self.width), u32::from(self.height))
    }

    fn clear(&mut self, color: Rgba8) {
        self.ctx = vello_cpu::RenderContext::new(self.width, self.height);
        if color.a == 0 {
            return;
        }
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(color_to_cpu(color));
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(self.width),
            f64::from(self.height),
        ));
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
        self.ctx.set_transform(affine_to_cpu(self.state.transform));
        self.apply_paint(paint);
        let cpu_path = bezpath_to_cpu(path);
        self.with_alpha_layer(|ctx| ctx.fill_path(&cpu_path));
    }

    fn stroke_path(&mut self, path: &BezPath, width: f64, paint: &Paint) {
        self.ctx.set_transform(affine_to_cpu(self.state.transform));
        self.apply_paint(paint);
        self.ctx.set_stroke(vello_cpu::kurbo::Stroke::new(width));
        let cpu_path = bezpath_to_cpu(path);
        self.with_alpha_layer(|ctx| ctx.stroke_path(&cpu_path));
    }

    fn draw_image(&mut self, key: &str, image: &PreparedImage, dest: Rect) {
        if image.width == 0 || image.height == 0 {
            return;
        }
        let paint = match self.image_paint_for(key, image) {
            Ok(p) => p,
            Err(err) => {
                tracing::warn!(key, %err, "image skipped");
                return;
            }
        };
        let (w, h) = (f64::from(image.width), f64::from(image.height));
        let transform = self.state.transform
            * Affine::translate((dest.x0, dest.y0))
            * Affine::scale_non_uniform(dest.width() / w, dest.height() / h);
        self.ctx.set_transform(affine_to_cpu(transform));
        self.ctx
            .set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(paint);
        self.with_alpha_layer(|ctx| ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h)));
    }

    fn draw_text(&mut self, text: &str, at: Point, style: &TextStyle) {
        if text.is_empty() {
            return;
        }
        if let Some(shadow) = style.shadow {
            let softened = shadow.color.with_alpha(1.0 / (1.0 + shadow.blur.max(0.0) * 0.1));
            if let Err(err) = self.glyphs_at(text, at + shadow.offset, style, softened) {
                tracing::warn!(%err, "text shadow skipped");
            }
        }
        if let Err(err) = self.glyphs_at(text, at, style, style.color) {
            tracing::warn!(%err, "text skipped");
        }
    }

    fn present(&mut self) {
        self.ctx.flush();
        clear_pixmap(&mut self.pixmap);
        self.ctx.render_to_pixmap(&mut self.pixmap);
        self.ctx = vello_cpu::RenderContext::new(self.width, self.height);
        self.stack.clear();
        self.state = State {
            transform: Affine::IDENTITY,
            alpha: 1.0,
        };
    }

    fn snapshot_rgba8(&self) -> Option<FrameRGBA> {
        Some(FrameRGBA {
            width: u32::from(self.width),
            height: u32::from(self.height),
            data: self.pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }
}

fn clear_pixmap(pixmap: &mut vello_cpu::Pixmap) {
    pixmap.data_as_u8_slice_mut().fill(0);
}

fn color_to_cpu(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn stops_to_cpu(stops: &[GradientStop]) -> Vec<(f32, vello_cpu::peniko::Color)> {
    stops
        .iter()
        .map(|s| (s.offset.clamp(0.0, 1.0), color_to_cpu(s.color)))
        .collect()
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn image_premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> RaffleResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| RaffleError::render("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| RaffleError::render("image height exceeds u16"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(RaffleError::render("prepared image byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let pixels = rgba8_premul
        .chunks_exact(4)
        .map(|px| {
            may_have_opacities |= px[3] != 255;
            vello_cpu::peniko::color::PremulRgba8 {
                r: px[0],
                g: px[1],
                b: px[2],
                a: px[3],
            }
        })
        .collect();

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
