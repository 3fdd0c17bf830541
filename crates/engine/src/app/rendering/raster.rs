//! Clipped RGBA8 primitives over a raw frame buffer. Everything here writes
//! into `frame` laid out as `width * height` pixels of four bytes each and
//! silently drops anything outside the buffer.

pub type Color = [u8; 4];

pub const GLYPH_WIDTH: i32 = 3;
pub const GLYPH_HEIGHT: i32 = 5;

pub fn glyph_advance(scale: i32) -> i32 {
    (GLYPH_WIDTH + 1) * scale
}

pub fn text_width(text: &str, scale: i32) -> i32 {
    let count = text.chars().count() as i32;
    if count == 0 {
        return 0;
    }
    count * glyph_advance(scale) - scale
}

fn byte_offset(width: u32, height: u32, x: i32, y: i32) -> Option<usize> {
    if x < 0 || y < 0 || x >= width as i32 || y >= height as i32 {
        return None;
    }
    (y as usize)
        .checked_mul(width as usize)
        .and_then(|row| row.checked_add(x as usize))
        .and_then(|pixel| pixel.checked_mul(4))
}

pub fn read_pixel(frame: &[u8], width: u32, height: u32, x: i32, y: i32) -> Option<Color> {
    let offset = byte_offset(width, height, x, y)?;
    let bytes = frame.get(offset..offset + 4)?;
    Some([bytes[0], bytes[1], bytes[2], bytes[3]])
}

pub fn write_pixel(frame: &mut [u8], width: u32, height: u32, x: i32, y: i32, color: Color) {
    let Some(offset) = byte_offset(width, height, x, y) else {
        return;
    };
    if let Some(bytes) = frame.get_mut(offset..offset + 4) {
        bytes.copy_from_slice(&color);
    }
}

/// Source-over blend of `color` onto the pixel at (x, y).
pub fn blend_pixel(frame: &mut [u8], width: u32, height: u32, x: i32, y: i32, color: Color) {
    match color[3] {
        0 => {}
        255 => write_pixel(frame, width, height, x, y, color),
        alpha => {
            let Some(dst) = read_pixel(frame, width, height, x, y) else {
                return;
            };
            write_pixel(frame, width, height, x, y, blend(dst, color, alpha));
        }
    }
}

fn blend(dst: Color, src: Color, alpha: u8) -> Color {
    let a = alpha as u32;
    let inv = 255 - a;
    let channel = |d: u8, s: u8| ((s as u32 * a + d as u32 * inv + 127) / 255) as u8;
    let out_alpha = a + (dst[3] as u32 * inv + 127) / 255;
    [
        channel(dst[0], src[0]),
        channel(dst[1], src[1]),
        channel(dst[2], src[2]),
        out_alpha.min(255) as u8,
    ]
}

pub fn fill(frame: &mut [u8], color: Color) {
    for chunk in frame.chunks_exact_mut(4) {
        chunk.copy_from_slice(&color);
    }
}

#[allow(clippy::too_many_arguments)]
pub fn fill_rect(
    frame: &mut [u8],
    width: u32,
    height: u32,
    x: i32,
    y: i32,
    rect_width: i32,
    rect_height: i32,
    color: Color,
) {
    let start_x = x.max(0);
    let start_y = y.max(0);
    let end_x = x.saturating_add(rect_width).min(width as i32);
    let end_y = y.saturating_add(rect_height).min(height as i32);
    for py in start_y..end_y {
        for px in start_x..end_x {
            blend_pixel(frame, width, height, px, py, color);
        }
    }
}

#[allow(clippy::too_many_arguments)]
pub fn rect_outline(
    frame: &mut [u8],
    width: u32,
    height: u32,
    x: i32,
    y: i32,
    rect_width: i32,
    rect_height: i32,
    thickness: i32,
    color: Color,
) {
    if rect_width <= 0 || rect_height <= 0 || thickness <= 0 {
        return;
    }
    let t = thickness.min(rect_width).min(rect_height);
    fill_rect(frame, width, height, x, y, rect_width, t, color);
    fill_rect(frame, width, height, x, y + rect_height - t, rect_width, t, color);
    fill_rect(frame, width, height, x, y + t, t, rect_height - 2 * t, color);
    fill_rect(
        frame,
        width,
        height,
        x + rect_width - t,
        y + t,
        t,
        rect_height - 2 * t,
        color,
    );
}

pub fn fill_circle(
    frame: &mut [u8],
    width: u32,
    height: u32,
    cx: f32,
    cy: f32,
    radius: f32,
    color: Color,
) {
    if radius <= 0.0 {
        return;
    }
    let top = (cy - radius).floor() as i32;
    let bottom = (cy + radius).ceil() as i32;
    let left = (cx - radius).floor() as i32;
    let right = (cx + radius).ceil() as i32;
    let radius_sq = radius * radius;
    for y in top.max(0)..bottom.min(height as i32) {
        let dy = y as f32 + 0.5 - cy;
        for x in left.max(0)..right.min(width as i32) {
            let dx = x as f32 + 0.5 - cx;
            if dx * dx + dy * dy <= radius_sq {
                blend_pixel(frame, width, height, x, y, color);
            }
        }
    }
}

/// Liang-Barsky clip of a segment to the pixel rectangle
/// `[0, width - 1] x [0, height - 1]`. `None` when nothing is on screen.
pub fn clip_segment(
    from: (f64, f64),
    to: (f64, f64),
    width: u32,
    height: u32,
) -> Option<((f64, f64), (f64, f64))> {
    if width == 0 || height == 0 {
        return None;
    }
    let (max_x, max_y) = (f64::from(width - 1), f64::from(height - 1));
    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    let (mut t0, mut t1) = (0.0_f64, 1.0_f64);
    for (p, q) in [
        (-dx, from.0),
        (dx, max_x - from.0),
        (-dy, from.1),
        (dy, max_y - from.1),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let t = q / p;
        if p < 0.0 {
            t0 = t0.max(t);
        } else {
            t1 = t1.min(t);
        }
        if t0 > t1 {
            return None;
        }
    }
    Some((
        (from.0 + t0 * dx, from.1 + t0 * dy),
        (from.0 + t1 * dx, from.1 + t1 * dy),
    ))
}

/// Bresenham line. Endpoints may lie anywhere; only the on-screen part is
/// walked.
#[allow(clippy::too_many_arguments)]
pub fn line(
    frame: &mut [u8],
    width: u32,
    height: u32,
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
    color: Color,
) {
    let Some((from, to)) = clip_segment(
        (f64::from(x0), f64::from(y0)),
        (f64::from(x1), f64::from(y1)),
        width,
        height,
    ) else {
        return;
    };
    let (x0, y0) = (from.0.round() as i64, from.1.round() as i64);
    let (x1, y1) = (to.0.round() as i64, to.1.round() as i64);

    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let step_x = if x0 < x1 { 1 } else { -1 };
    let step_y = if y0 < y1 { 1 } else { -1 };
    let (mut x, mut y) = (x0, y0);
    let mut err = dx + dy;
    loop {
        blend_pixel(frame, width, height, x as i32, y as i32, color);
        if x == x1 && y == y1 {
            break;
        }
        let doubled = 2 * err;
        if doubled >= dy {
            err += dy;
            x += step_x;
        }
        if doubled <= dx {
            err += dx;
            y += step_y;
        }
    }
}

/// Fills a triangle, interpolating vertex colours barycentrically. Pixel
/// centres exactly on a shared edge are drawn by both neighbours.
pub fn fill_triangle(
    frame: &mut [u8],
    width: u32,
    height: u32,
    points: [(f32, f32); 3],
    colors: [Color; 3],
) {
    let [(ax, ay), (bx, by), (cx, cy)] = points;
    let area = (bx - ax) * (cy - ay) - (by - ay) * (cx - ax);
    if area.abs() < f32::EPSILON {
        return;
    }
    let min_x = ax.min(bx).min(cx).floor().max(0.0) as i32;
    let max_x = ax.max(bx).max(cx).ceil().min(width as f32) as i32;
    let min_y = ay.min(by).min(cy).floor().max(0.0) as i32;
    let max_y = ay.max(by).max(cy).ceil().min(height as f32) as i32;

    for y in min_y..max_y {
        let py = y as f32 + 0.5;
        for x in min_x..max_x {
            let px = x as f32 + 0.5;
            let w0 = ((bx - px) * (cy - py) - (by - py) * (cx - px)) / area;
            let w1 = ((cx - px) * (ay - py) - (cy - py) * (ax - px)) / area;
            let w2 = 1.0 - w0 - w1;
            if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                continue;
            }
            let mut color = [0u8; 4];
            for (channel, out) in color.iter_mut().enumerate() {
                let value = colors[0][channel] as f32 * w0
                    + colors[1][channel] as f32 * w1
                    + colors[2][channel] as f32 * w2;
                *out = value.round().clamp(0.0, 255.0) as u8;
            }
            blend_pixel(frame, width, height, x, y, color);
        }
    }
}

#[allow(clippy::too_many_arguments)]
pub fn draw_text(
    frame: &mut [u8],
    width: u32,
    height: u32,
    mut x: i32,
    y: i32,
    text: &str,
    scale: i32,
    color: Color,
) {
    if width == 0 || height == 0 || scale <= 0 {
        return;
    }
    for ch in text.chars() {
        if let Some(rows) = glyph_rows(ch) {
            draw_glyph(frame, width, height, x, y, rows, scale, color);
        }
        x += glyph_advance(scale);
    }
}

#[allow(clippy::too_many_arguments)]
fn draw_glyph(
    frame: &mut [u8],
    width: u32,
    height: u32,
    x: i32,
    y: i32,
    rows: [u8; GLYPH_HEIGHT as usize],
    scale: i32,
    color: Color,
) {
    for (row_index, bits) in rows.iter().enumerate() {
        for col in 0..GLYPH_WIDTH {
            if bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                continue;
            }
            fill_rect(
                frame,
                width,
                height,
                x + col * scale,
                y + row_index as i32 * scale,
                scale,
                scale,
                color,
            );
        }
    }
}

// 3x5 bitmap font; lowercase letters render as uppercase.
const FONT: &[(char, [u8; 5])] = &[
    ('0', [0b111, 0b101, 0b101, 0b101, 0b111]),
    ('1', [0b010, 0b110, 0b010, 0b010, 0b111]),
    ('2', [0b111, 0b001, 0b111, 0b100, 0b111]),
    ('3', [0b111, 0b001, 0b111, 0b001, 0b111]),
    ('4', [0b101, 0b101, 0b111, 0b001, 0b001]),
    ('5', [0b111, 0b100, 0b111, 0b001, 0b111]),
    ('6', [0b111, 0b100, 0b111, 0b101, 0b111]),
    ('7', [0b111, 0b001, 0b010, 0b010, 0b010]),
    ('8', [0b111, 0b101, 0b111, 0b101, 0b111]),
    ('9', [0b111, 0b101, 0b111, 0b001, 0b111]),
    ('A', [0b010, 0b101, 0b111, 0b101, 0b101]),
    ('B', [0b110, 0b101, 0b110, 0b101, 0b110]),
    ('C', [0b111, 0b100, 0b100, 0b100, 0b111]),
    ('D', [0b110, 0b101, 0b101, 0b101, 0b110]),
    ('E', [0b111, 0b100, 0b110, 0b100, 0b111]),
    ('F', [0b111, 0b100, 0b110, 0b100, 0b100]),
    ('G', [0b111, 0b100, 0b101, 0b101, 0b111]),
    ('H', [0b101, 0b101, 0b111, 0b101, 0b101]),
    ('I', [0b111, 0b010, 0b010, 0b010, 0b111]),
    ('J', [0b111, 0b001, 0b001, 0b101, 0b111]),
    ('K', [0b101, 0b101, 0b110, 0b101, 0b101]),
    ('L', [0b100, 0b100, 0b100, 0b100, 0b111]),
    ('M', [0b101, 0b111, 0b111, 0b101, 0b101]),
    ('N', [0b101, 0b111, 0b111, 0b111, 0b101]),
    ('O', [0b111, 0b101, 0b101, 0b101, 0b111]),
    ('P', [0b110, 0b101, 0b110, 0b100, 0b100]),
    ('Q', [0b111, 0b101, 0b101, 0b111, 0b001]),
    ('R', [0b110, 0b101, 0b110, 0b101, 0b101]),
    ('S', [0b111, 0b100, 0b111, 0b001, 0b111]),
    ('T', [0b111, 0b010, 0b010, 0b010, 0b010]),
    ('U', [0b101, 0b101, 0b101, 0b101, 0b111]),
    ('V', [0b101, 0b101, 0b101, 0b101, 0b010]),
    ('W', [0b101, 0b101, 0b111, 0b111, 0b101]),
    ('X', [0b101, 0b101, 0b010, 0b101, 0b101]),
    ('Y', [0b101, 0b101, 0b010, 0b010, 0b010]),
    ('Z', [0b111, 0b001, 0b010, 0b100, 0b111]),
    ('.', [0b000, 0b000, 0b000, 0b000, 0b010]),
    (',', [0b000, 0b000, 0b000, 0b010, 0b100]),
    (':', [0b000, 0b010, 0b000, 0b010, 0b000]),
    ('-', [0b000, 0b000, 0b111, 0b000, 0b000]),
    ('!', [0b010, 0b010, 0b010, 0b000, 0b010]),
    ('?', [0b111, 0b001, 0b011, 0b000, 0b010]),
    ('/', [0b001, 0b001, 0b010, 0b100, 0b100]),
    ('>', [0b100, 0b010, 0b001, 0b010, 0b100]),
    ('<', [0b001, 0b010, 0b100, 0b010, 0b001]),
];

fn glyph_rows(ch: char) -> Option<[u8; 5]> {
    let upper = ch.to_ascii_uppercase();
    FONT.iter()
        .find(|(glyph, _)| *glyph == upper)
        .map(|(_, rows)| *rows)
}
