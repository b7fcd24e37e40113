use ab_glyph::{point, Font, FontVec, Glyph, GlyphId, Point, PxScale, ScaleFont};
use image::{GrayImage, Luma, Pixel, Rgba, RgbaImage};

#[derive(Clone, Debug)]
pub struct GlyphData {
    pub glyphs: Vec<Glyph>,
    pub width: u32,
    pub height: u32,
}

impl GlyphData {
    /// Size of the drawn word, after rotation.
    pub fn extent(&self, rotate: bool) -> (u32, u32) {
        if rotate {
            (self.height, self.width)
        } else {
            (self.width, self.height)
        }
    }
}

//把文本转换为字体，方便画图
pub fn text_to_glyphs(text: &str, font: &FontVec, scale: PxScale) -> GlyphData {
    let scaled_font = font.as_scaled(scale);

    let mut glyphs: Vec<Glyph> = vec![];
    layout_paragraph(scaled_font, point(0.0, 0.0), text, &mut glyphs);

    let glyphs_height = scaled_font.height().ceil() as u32;
    let glyphs_width = match (glyphs.first(), glyphs.last()) {
        (Some(first), Some(last)) => {
            let min_x = first.position.x;
            let max_x = last.position.x + scaled_font.h_advance(last.id);
            (max_x - min_x).ceil() as u32
        }
        _ => 0,
    };

    GlyphData {
        glyphs,
        width: glyphs_width,
        height: glyphs_height,
    }
}

/// Calls `f` with canvas coordinates and coverage for every covered pixel of the word.
///
/// Rotated words turn 90 degrees counter-clockwise and read bottom to top.
fn for_each_pixel(
    glyph_data: &GlyphData,
    font: &FontVec,
    origin: Point,
    rotate: bool,
    mut f: impl FnMut(u32, u32, f32),
) {
    for glyph in &glyph_data.glyphs {
        let Some(outlined) = font.outline_glyph(glyph.clone()) else {
            continue;
        };
        let bounds = outlined.px_bounds();

        outlined.draw(|x, y, v| {
            if v <= 0.0 {
                return;
            }
            let local_x = bounds.min.x as i64 + x as i64;
            let local_y = bounds.min.y as i64 + y as i64;
            let (dx, dy) = if rotate {
                (local_y, glyph_data.width as i64 - 1 - local_x)
            } else {
                (local_x, local_y)
            };
            let (final_x, final_y) = (origin.x as i64 + dx, origin.y as i64 + dy);
            if final_x < 0 || final_y < 0 {
                return;
            }
            f(final_x as u32, final_y as u32, v)
        })
    }
}

pub fn draw_glyphs_to_gray_buffer(
    buffer: &mut GrayImage,
    glyph_data: &GlyphData,
    font: &FontVec,
    point: Point,
    rotate: bool,
) {
    let (width, height) = buffer.dimensions();
    for_each_pixel(glyph_data, font, point, rotate, |x, y, _| {
        if x < width && y < height {
            buffer.put_pixel(x, y, Luma([1]));
        }
    })
}

pub fn draw_glyphs_to_rgba_buffer(
    buffer: &mut RgbaImage,
    glyph_data: &GlyphData,
    font: &FontVec,
    point: Point,
    rotate: bool,
    pixel: Rgba<u8>,
) {
    let (width, height) = buffer.dimensions();
    for_each_pixel(glyph_data, font, point, rotate, |x, y, v| {
        if x >= width || y >= height {
            return;
        }
        let px = buffer.get_pixel_mut(x, y);
        px.apply2(&pixel, |old, new| {
            ((v * new as f32) + (1.0 - v) * old as f32) as u8
        });
        px.0[3] = 0xFF;
    })
}

pub fn layout_paragraph<F, SF>(font: SF, position: Point, text: &str, target: &mut Vec<Glyph>)
where
    F: Font,
    SF: ScaleFont<F>,
{
    let v_advance = font.height() + font.line_gap();
    let mut caret = position + point(0.0, font.ascent());
    let mut last_glyph: Option<GlyphId> = None;
    for c in text.chars() {
        if c.is_control() {
            if c == '\n' {
                //进行换行
                caret = point(position.x, caret.y + v_advance);
            }
            continue;
        }

        let mut glyph = font.scaled_glyph(c);
        if let Some(previous) = last_glyph.take() {
            caret.x += font.kern(previous, glyph.id);
        }
        glyph.position = caret;
        last_glyph = Some(glyph.id);
        caret.x += font.h_advance(glyph.id);

        target.push(glyph);
    }
}
