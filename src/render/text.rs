use std::{collections::HashMap, sync::Arc};

use crate::foundation::error::{RaffleError, RaffleResult};

const MAX_CACHED_LAYOUTS: usize = 512;

/// Shaped single-line text.
pub type TextLayout = parley::Layout<()>;

/// Parley-backed shaper bound to one caller-provided font.
///
/// Layouts are cached by `(text, size)` since raffle labels repeat every frame.
pub struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<()>,
    family_name: String,
    layouts: HashMap<(String, u32), Arc<TextLayout>>,
}

impl std::fmt::Debug for TextLayoutEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextLayoutEngine")
            .field("family_name", &self.family_name)
            .field("cached_layouts", &self.layouts.len())
            .finish_non_exhaustive()
    }
}

impl TextLayoutEngine {
    /// Register `font_bytes` and use its first family for every layout.
    pub fn new(font_bytes: &[u8]) -> RaffleResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.to_vec()), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| RaffleError::resource("no font families registered from font bytes"))?;
        let family_name = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| RaffleError::resource("registered font family has no name"))?
            .to_string();

        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family_name,
            layouts: HashMap::new(),
        })
    }

    /// Shape `text` at `size_px`, reusing a cached layout when possible.
    pub fn layout(&mut self, text: &str, size_px: f32) -> RaffleResult<Arc<TextLayout>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(RaffleError::render("text size must be finite and > 0"));
        }
        let key = (text.to_string(), size_px.to_bits());
        if let Some(layout) = self.layouts.get(&key) {
            return Ok(Arc::clone(layout));
        }

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(self.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));

        let mut layout: TextLayout = builder.build(text);
        layout.break_all_lines(None);
        let layout = Arc::new(layout);

        if self.layouts.len() >= MAX_CACHED_LAYOUTS {
            self.layouts.clear();
        }
        self.layouts.insert(key, Arc::clone(&layout));
        Ok(layout)
    }
}
