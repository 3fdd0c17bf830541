mod compositor;
pub mod effects;
mod raster;
mod surface;
mod transform;

pub use compositor::FrameCompositor;
pub use raster::{text_width, Color};
pub use surface::{
    CircleShape, Drawable, Image, PrimitiveType, RectangleShape, Surface, Text, Vertex,
};
pub use transform::{Vec2, View, Viewport};

pub(crate) use raster::{draw_text, fill_circle, fill_rect, rect_outline};
