use std::{
    collections::HashMap,
    f64::consts::TAU,
    ops::{Deref, DerefMut},
    path::{Path, PathBuf},
    sync::Arc,
};

use kurbo::Shape;

use crate::{
    assets::{cache::ImageCache, decode::PreparedImage},
    foundation::{
        core::{Affine, BezPath, Point, Rect, Rgba8, Vec2},
        math::initials,
    },
    render::context::{DrawContext, FrameRGBA, Paint, TextStyle},
};

const CURVE_TOLERANCE: f64 = 0.1;

/// Drawing surface handed to strategies.
///
/// Wraps a backend [`DrawContext`] with shape helpers and the participant images retained for
/// the current configuration.
pub struct RenderSurface {
    ctx: Box<dyn DrawContext>,
    cache: Arc<ImageCache>,
    asset_root: PathBuf,
    images: HashMap<String, Arc<PreparedImage>>,
}

impl std::fmt::Debug for RenderSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderSurface")
            .field("size", &self.ctx.size())
            .field("asset_root", &self.asset_root)
            .field("images", &self.images.len())
            .finish_non_exhaustive()
    }
}

impl RenderSurface {
    pub fn new(ctx: Box<dyn DrawContext>, cache: Arc<ImageCache>, asset_root: PathBuf) -> Self {
        Self {
            ctx,
            cache,
            asset_root,
            images: HashMap::new(),
        }
    }

    pub fn width(&self) -> f64 {
        f64::from(self.ctx.size().0)
    }

    pub fn height(&self) -> f64 {
        f64::from(self.ctx.size().1)
    }

    pub fn center(&self) -> Point {
        Point::new(self.width() / 2.0, self.height() / 2.0)
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width(), self.height())
    }

    pub fn asset_root(&self) -> &Path {
        &self.asset_root
    }

    /// Pull `reference` from the shared cache into this surface. Returns whether it is available.
    pub fn retain_image(&mut self, reference: &str) -> bool {
        if self.images.contains_key(reference) {
            return true;
        }
        match self.cache.get(reference, &self.asset_root) {
            Some(img) => {
                self.images.insert(reference.to_string(), img);
                true
            }
            None => false,
        }
    }

    pub fn has_image(&self, reference: &str) -> bool {
        self.images.contains_key(reference)
    }

    /// Drop every retained image.
    pub fn release_images(&mut self) {
        self.images.clear();
    }

    /// Pixel bytes held by retained images.
    pub fn retained_bytes(&self) -> usize {
        self.images.values().map(|img| img.byte_len()).sum()
    }

    /// Raw backend access.
    pub fn context(&mut self) -> &mut dyn DrawContext {
        self.ctx.as_mut()
    }

    pub fn clear(&mut self, color: Rgba8) {
        self.ctx.clear(color);
    }

    pub fn fill_rect(&mut self, rect: Rect, paint: impl Into<Paint>) {
        self.ctx.fill_path(&rect.to_path(CURVE_TOLERANCE), &paint.into());
    }

    pub fn fill_rounded_rect(&mut self, rect: Rect, radius: f64, paint: impl Into<Paint>) {
        let path = rect.to_rounded_rect(radius.max(0.0)).to_path(CURVE_TOLERANCE);
        self.ctx.fill_path(&path, &paint.into());
    }

    pub fn stroke_rect(&mut self, rect: Rect, width: f64, paint: impl Into<Paint>) {
        self.ctx
            .stroke_path(&rect.to_path(CURVE_TOLERANCE), width, &paint.into());
    }

    pub fn stroke_rounded_rect(
        &mut self,
        rect: Rect,
        radius: f64,
        width: f64,
        paint: impl Into<Paint>,
    ) {
        let path = rect.to_rounded_rect(radius.max(0.0)).to_path(CURVE_TOLERANCE);
        self.ctx.stroke_path(&path, width, &paint.into());
    }

    pub fn fill_circle(&mut self, center: Point, radius: f64, paint: impl Into<Paint>) {
        if radius <= 0.0 {
            return;
        }
        let path = kurbo::Circle::new(center, radius).to_path(CURVE_TOLERANCE);
        self.ctx.fill_path(&path, &paint.into());
    }

    pub fn stroke_circle(
        &mut self,
        center: Point,
        radius: f64,
        width: f64,
        paint: impl Into<Paint>,
    ) {
        if radius <= 0.0 {
            return;
        }
        let path = kurbo::Circle::new(center, radius).to_path(CURVE_TOLERANCE);
        self.ctx.stroke_path(&path, width, &paint.into());
    }

    /// Pie slice between two angles (radians, clockwise in screen space).
    pub fn fill_wedge(
        &mut self,
        center: Point,
        radius: f64,
        start: f64,
        sweep: f64,
        paint: impl Into<Paint>,
    ) {
        let path =
            kurbo::CircleSegment::new(center, radius, 0.0, start, sweep).to_path(CURVE_TOLERANCE);
        self.ctx.fill_path(&path, &paint.into());
    }

    /// Closed polygon through `points`. Fewer than three points draw nothing.
    pub fn fill_polygon(&mut self, points: &[Point], paint: impl Into<Paint>) {
        if let Some(path) = polygon_path(points) {
            self.ctx.fill_path(&path, &paint.into());
        }
    }

    /// Regular star with `spikes` points, used for sparkles and coins.
    pub fn fill_star(
        &mut self,
        center: Point,
        outer: f64,
        inner: f64,
        spikes: usize,
        paint: impl Into<Paint>,
    ) {
        let n = spikes.max(2) * 2;
        let points: Vec<Point> = (0..n)
            .map(|i| {
                let r = if i % 2 == 0 { outer } else { inner };
                let a = -TAU / 4.0 + TAU * i as f64 / n as f64;
                center + Vec2::from_angle(a) * r
            })
            .collect();
        self.fill_polygon(&points, paint);
    }

    pub fn line(&mut self, from: Point, to: Point, width: f64, paint: impl Into<Paint>) {
        let mut path = BezPath::new();
        path.move_to(from);
        path.line_to(to);
        self.ctx.stroke_path(&path, width, &paint.into());
    }

    pub fn text(&mut self, text: &str, at: Point, style: &TextStyle) {
        self.ctx.draw_text(text, at, style);
    }

    /// Draw a retained image into `dest`. Returns `false` if `reference` is not retained.
    pub fn image(&mut self, reference: &str, dest: Rect) -> bool {
        let Some(img) = self.images.get(reference).cloned() else {
            return false;
        };
        self.ctx.draw_image(reference, &img, dest);
        true
    }

    /// Draw the participant image, or a tinted tile with the name's initials when the image is
    /// missing or still loading.
    pub fn image_or_placeholder(
        &mut self,
        reference: Option<&str>,
        name: &str,
        dest: Rect,
        tint: Rgba8,
    ) {
        if let Some(r) = reference
            && self.image(r, dest)
        {
            return;
        }
        let radius = dest.width().min(dest.height()) * 0.12;
        self.fill_rounded_rect(
            dest,
            radius,
            Paint::vertical(dest, tint.shade(0.25), tint.shade(-0.35)),
        );
        let size = (dest.height().min(dest.width()) * 0.38).max(1.0) as f32;
        self.text(
            &initials(name),
            dest.center(),
            &TextStyle::sized(size, Rgba8::WHITE),
        );
    }

    /// Begin a scope whose transform and alpha are restored when the guard drops.
    pub fn scoped(&mut self) -> SurfaceScope<'_> {
        self.ctx.save();
        SurfaceScope { surface: self }
    }

    pub fn present(&mut self) {
        self.ctx.present();
    }

    pub fn snapshot(&self) -> Option<FrameRGBA> {
        self.ctx.snapshot_rgba8()
    }
}

/// Guard returned by [`RenderSurface::scoped`].
///
/// Dereferences to the surface. Nesting is allowed; each guard restores exactly its own save.
pub struct SurfaceScope<'a> {
    surface: &'a mut RenderSurface,
}

impl SurfaceScope<'_> {
    pub fn translate(&mut self, offset: impl Into<Vec2>) -> &mut Self {
        self.surface.ctx.concat_transform(Affine::translate(offset.into()));
        self
    }

    pub fn rotate(&mut self, radians: f64) -> &mut Self {
        self.surface.ctx.concat_transform(Affine::rotate(radians));
        self
    }

    pub fn rotate_about(&mut self, radians: f64, center: Point) -> &mut Self {
        self.surface
            .ctx
            .concat_transform(Affine::rotate_about(radians, center));
        self
    }

    pub fn scale(&mut self, sx: f64, sy: f64) -> &mut Self {
        self.surface
            .ctx
            .concat_transform(Affine::scale_non_uniform(sx, sy));
        self
    }

    pub fn transform(&mut self, affine: Affine) -> &mut Self {
        self.surface.ctx.concat_transform(affine);
        self
    }

    pub fn alpha(&mut self, alpha: f64) -> &mut Self {
        self.surface.ctx.set_global_alpha(alpha);
        self
    }
}

impl Deref for SurfaceScope<'_> {
    type Target = RenderSurface;

    fn deref(&self) -> &RenderSurface {
        self.surface
    }
}

impl DerefMut for SurfaceScope<'_> {
    fn deref_mut(&mut self) -> &mut RenderSurface {
        self.surface
    }
}

impl Drop for SurfaceScope<'_> {
    fn drop(&mut self) {
        self.surface.ctx.restore();
    }
}

fn polygon_path(points: &[Point]) -> Option<BezPath> {
    if points.len() < 3 {
        return None;
    }
    let mut path = BezPath::new();
    path.move_to(points[0]);
    for p in &points[1..] {
        path.line_to(*p);
    }
    path.close_path();
    Some(path)
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
