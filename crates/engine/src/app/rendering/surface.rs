use super::raster::{self, Color};
use super::transform::{Vec2, View, Viewport};

/// Owned RGBA8 pixel buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Image {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn viewport(&self) -> Viewport {
        Viewport {
            width: self.width,
            height: self.height,
        }
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    pub fn get(&self, x: u32, y: u32) -> Option<Color> {
        raster::read_pixel(&self.pixels, self.width, self.height, x as i32, y as i32)
    }

    pub fn put(&mut self, x: u32, y: u32, color: Color) {
        raster::write_pixel(
            &mut self.pixels,
            self.width,
            self.height,
            x as i32,
            y as i32,
            color,
        );
    }

    /// Reads with coordinates clamped to the edge.
    pub fn sample_clamped(&self, x: i32, y: i32) -> Color {
        if self.width == 0 || self.height == 0 {
            return [0; 4];
        }
        let x = x.clamp(0, self.width as i32 - 1);
        let y = y.clamp(0, self.height as i32 - 1);
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.pixels[offset],
            self.pixels[offset + 1],
            self.pixels[offset + 2],
            self.pixels[offset + 3],
        ]
    }

    /// Bilinear sample at normalised coordinates in [0, 1].
    pub fn sample_uv(&self, u: f32, v: f32) -> [f32; 4] {
        let fx = u * self.width as f32 - 0.5;
        let fy = v * self.height as f32 - 0.5;
        let x0 = fx.floor();
        let y0 = fy.floor();
        let tx = fx - x0;
        let ty = fy - y0;
        let (x0, y0) = (x0 as i32, y0 as i32);
        let c00 = self.sample_clamped(x0, y0);
        let c10 = self.sample_clamped(x0 + 1, y0);
        let c01 = self.sample_clamped(x0, y0 + 1);
        let c11 = self.sample_clamped(x0 + 1, y0 + 1);
        let mut out = [0.0; 4];
        for (channel, value) in out.iter_mut().enumerate() {
            let top = c00[channel] as f32 * (1.0 - tx) + c10[channel] as f32 * tx;
            let bottom = c01[channel] as f32 * (1.0 - tx) + c11[channel] as f32 * tx;
            *value = top * (1.0 - ty) + bottom * ty;
        }
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Vec2,
    pub color: Color,
}

impl Vertex {
    pub const fn new(position: Vec2, color: Color) -> Self {
        Self { position, color }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveType {
    Points,
    Lines,
    LineStrip,
    Triangles,
    TriangleStrip,
    TriangleFan,
}

pub trait Drawable {
    fn draw(&self, target: &mut Surface);
}

/// Offscreen render target: an image plus the active camera. Every draw
/// goes through the current view; `display` marks the end of a
/// clear-draw cycle and bumps the generation counter.
#[derive(Debug)]
pub struct Surface {
    image: Image,
    view: View,
    generation: u64,
}

impl Surface {
    pub fn new(width: u32, height: u32) -> Self {
        let image = Image::new(width, height);
        let view = View::for_viewport(image.viewport());
        Self {
            image,
            view,
            generation: 0,
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width
    }

    pub fn height(&self) -> u32 {
        self.image.height
    }

    pub fn viewport(&self) -> Viewport {
        self.image.viewport()
    }

    pub fn image(&self) -> &Image {
        &self.image
    }

    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.image.pixels
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn clear(&mut self, color: Color) {
        raster::fill(&mut self.image.pixels, color);
    }

    pub fn display(&mut self) {
        self.generation += 1;
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn default_view(&self) -> View {
        View::for_viewport(self.viewport())
    }

    pub fn set_view(&mut self, view: View) {
        self.view = view;
    }

    pub fn draw(&mut self, drawable: &dyn Drawable) {
        drawable.draw(self);
    }

    pub fn map_to_pixel(&self, world: Vec2) -> Vec2 {
        self.view.world_to_screen(world, self.viewport())
    }

    pub fn view_scale(&self) -> f32 {
        self.view.scale(self.viewport())
    }

    pub fn fill_rect_px(&mut self, x: i32, y: i32, width: i32, height: i32, color: Color) {
        let (w, h) = (self.image.width, self.image.height);
        raster::fill_rect(&mut self.image.pixels, w, h, x, y, width, height, color);
    }

    /// Copies `image` 1:1 to the pixel position, ignoring the view.
    pub fn blit(&mut self, image: &Image, x: i32, y: i32) {
        let (w, h) = (self.image.width, self.image.height);
        for sy in 0..image.height {
            for sx in 0..image.width {
                let color = image.sample_clamped(sx as i32, sy as i32);
                raster::blend_pixel(
                    &mut self.image.pixels,
                    w,
                    h,
                    x + sx as i32,
                    y + sy as i32,
                    color,
                );
            }
        }
    }

    pub fn draw_vertices(&mut self, vertices: &[Vertex], primitive: PrimitiveType) {
        let (w, h) = (self.image.width, self.image.height);
        let mapped: Vec<(f32, f32, Color)> = vertices
            .iter()
            .map(|vertex| {
                let p = self.map_to_pixel(vertex.position);
                (p.x, p.y, vertex.color)
            })
            .collect();
        let frame = &mut self.image.pixels;

        match primitive {
            PrimitiveType::Points => {
                for (x, y, color) in &mapped {
                    raster::blend_pixel(frame, w, h, x.floor() as i32, y.floor() as i32, *color);
                }
            }
            PrimitiveType::Lines => {
                for pair in mapped.chunks_exact(2) {
                    segment(frame, w, h, &pair[0], &pair[1]);
                }
            }
            PrimitiveType::LineStrip => {
                for pair in mapped.windows(2) {
                    segment(frame, w, h, &pair[0], &pair[1]);
                }
            }
            PrimitiveType::Triangles => {
                for tri in mapped.chunks_exact(3) {
                    triangle(frame, w, h, &tri[0], &tri[1], &tri[2]);
                }
            }
            PrimitiveType::TriangleStrip => {
                for tri in mapped.windows(3) {
                    triangle(frame, w, h, &tri[0], &tri[1], &tri[2]);
                }
            }
            PrimitiveType::TriangleFan => {
                if let Some((first, rest)) = mapped.split_first() {
                    for pair in rest.windows(2) {
                        triangle(frame, w, h, first, &pair[0], &pair[1]);
                    }
                }
            }
        }
    }
}

fn segment(
    frame: &mut [u8],
    width: u32,
    height: u32,
    a: &(f32, f32, Color),
    b: &(f32, f32, Color),
) {
    // Clip in float space so far off-screen vertices keep their slope.
    let Some((from, to)) = raster::clip_segment(
        (f64::from(a.0.floor()), f64::from(a.1.floor())),
        (f64::from(b.0.floor()), f64::from(b.1.floor())),
        width,
        height,
    ) else {
        return;
    };
    raster::line(
        frame,
        width,
        height,
        from.0.round() as i32,
        from.1.round() as i32,
        to.0.round() as i32,
        to.1.round() as i32,
        a.2,
    );
}

fn triangle(
    frame: &mut [u8],
    width: u32,
    height: u32,
    a: &(f32, f32, Color),
    b: &(f32, f32, Color),
    c: &(f32, f32, Color),
) {
    raster::fill_triangle(
        frame,
        width,
        height,
        [(a.0, a.1), (b.0, b.1), (c.0, c.1)],
        [a.2, b.2, c.2],
    );
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectangleShape {
    pub position: Vec2,
    pub size: Vec2,
    pub fill: Color,
    pub outline: Option<(Color, f32)>,
}

impl RectangleShape {
    pub fn new(position: Vec2, size: Vec2, fill: Color) -> Self {
        Self {
            position,
            size,
            fill,
            outline: None,
        }
    }

    pub fn with_outline(mut self, color: Color, thickness: f32) -> Self {
        self.outline = Some((color, thickness));
        self
    }
}

impl Drawable for RectangleShape {
    fn draw(&self, target: &mut Surface) {
        let top_left = target.map_to_pixel(self.position);
        let bottom_right = target.map_to_pixel(self.position + self.size);
        let x = top_left.x.round() as i32;
        let y = top_left.y.round() as i32;
        let width = bottom_right.x.round() as i32 - x;
        let height = bottom_right.y.round() as i32 - y;
        target.fill_rect_px(x, y, width, height, self.fill);
        if let Some((color, thickness)) = self.outline {
            let thickness = (thickness * target.view_scale()).round().max(1.0) as i32;
            let (w, h) = (target.width(), target.height());
            raster::rect_outline(
                &mut target.image.pixels,
                w,
                h,
                x,
                y,
                width,
                height,
                thickness,
                color,
            );
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleShape {
    pub center: Vec2,
    pub radius: f32,
    pub fill: Color,
}

impl CircleShape {
    pub fn new(center: Vec2, radius: f32, fill: Color) -> Self {
        Self {
            center,
            radius,
            fill,
        }
    }
}

impl Drawable for CircleShape {
    fn draw(&self, target: &mut Surface) {
        let center = target.map_to_pixel(self.center);
        let radius = self.radius * target.view_scale();
        let (w, h) = (target.width(), target.height());
        raster::fill_circle(
            &mut target.image.pixels,
            w,
            h,
            center.x,
            center.y,
            radius,
            self.fill,
        );
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    pub position: Vec2,
    pub content: String,
    pub scale: i32,
    pub color: Color,
}

impl Text {
    pub fn new(position: Vec2, content: impl Into<String>, scale: i32, color: Color) -> Self {
        Self {
            position,
            content: content.into(),
            scale,
            color,
        }
    }

    pub fn width(&self) -> i32 {
        raster::text_width(&self.content, self.scale)
    }
}

impl Drawable for Text {
    fn draw(&self, target: &mut Surface) {
        let origin = target.map_to_pixel(self.position);
        let (w, h) = (target.width(), target.height());
        raster::draw_text(
            &mut target.image.pixels,
            w,
            h,
            origin.x.round() as i32,
            origin.y.round() as i32,
            &self.content,
            self.scale,
            self.color,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = [255, 0, 0, 255];

    #[test]
    fn rectangle_respects_view() {
        let mut surface = Surface::new(20, 20);
        surface.set_view(View {
            center: Vec2::new(20.0, 20.0),
            size: Vec2::new(20.0, 20.0),
        });
        surface.draw(&RectangleShape::new(
            Vec2::new(10.0, 10.0),
            Vec2::new(2.0, 2.0),
            RED,
        ));
        assert_eq!(surface.image().get(0, 0), Some(RED));
        assert_eq!(surface.image().get(2, 2), Some([0, 0, 0, 0]));
    }

    #[test]
    fn reset_to_default_view_restores_identity_mapping() {
        let mut surface = Surface::new(20, 20);
        surface.set_view(View::for_viewport(surface.viewport()).zoomed(2.0));
        surface.set_view(surface.default_view());
        assert_eq!(surface.map_to_pixel(Vec2::new(3.0, 4.0)), Vec2::new(3.0, 4.0));
    }

    #[test]
    fn triangle_strip_fills_quad() {
        let mut surface = Surface::new(8, 8);
        let quad = [
            Vertex::new(Vec2::new(0.0, 0.0), RED),
            Vertex::new(Vec2::new(8.0, 0.0), RED),
            Vertex::new(Vec2::new(0.0, 8.0), RED),
            Vertex::new(Vec2::new(8.0, 8.0), RED),
        ];
        surface.draw_vertices(&quad, PrimitiveType::TriangleStrip);
        assert!(surface.image().pixels().chunks_exact(4).all(|px| px == RED));
    }

    #[test]
    fn far_off_screen_lines_draw_only_their_visible_span() {
        let mut surface = Surface::new(16, 16);
        let row = [
            Vertex::new(Vec2::new(-3e9, 4.0), RED),
            Vertex::new(Vec2::new(3e9, 4.0), RED),
        ];
        surface.draw_vertices(&row, PrimitiveType::Lines);
        let column = [
            Vertex::new(Vec2::new(9.0, -3e9), RED),
            Vertex::new(Vec2::new(9.0, 3e9), RED),
            Vertex::new(Vec2::new(-3e9, -3e9), RED),
        ];
        surface.draw_vertices(&column, PrimitiveType::LineStrip);

        for i in 0..16 {
            assert_eq!(surface.image().get(i, 4), Some(RED));
            assert_eq!(surface.image().get(9, i), Some(RED));
        }
        assert_eq!(surface.image().get(2, 12), Some([0, 0, 0, 0]));
    }

    #[test]
    fn display_counts_generations() {
        let mut surface = Surface::new(2, 2);
        surface.display();
        surface.display();
        assert_eq!(surface.generation(), 2);
    }

    #[test]
    fn bilinear_sample_of_uniform_image_is_uniform() {
        let mut image = Image::new(4, 4);
        raster::fill(image.pixels_mut(), [10, 20, 30, 255]);
        let sample = image.sample_uv(0.37, 0.81);
        assert_eq!(sample.map(|c| c.round() as u8), [10, 20, 30, 255]);
    }
}
