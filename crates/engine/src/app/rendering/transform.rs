use std::ops::{Add, Mul, Sub};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// 2D camera: the world-space rectangle centred on `center` with extent
/// `size` is stretched over the whole target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct View {
    pub center: Vec2,
    pub size: Vec2,
}

impl View {
    pub fn for_viewport(viewport: Viewport) -> Self {
        let size = Vec2::new(viewport.width as f32, viewport.height as f32);
        Self {
            center: size * 0.5,
            size,
        }
    }

    pub fn zoomed(self, factor: f32) -> Self {
        Self {
            center: self.center,
            size: self.size * factor,
        }
    }

    pub fn world_to_screen(&self, world: Vec2, viewport: Viewport) -> Vec2 {
        let scale_x = viewport.width as f32 / self.size.x;
        let scale_y = viewport.height as f32 / self.size.y;
        Vec2::new(
            (world.x - self.center.x) * scale_x + viewport.width as f32 * 0.5,
            (world.y - self.center.y) * scale_y + viewport.height as f32 * 0.5,
        )
    }

    pub fn screen_to_world(&self, screen: Vec2, viewport: Viewport) -> Vec2 {
        let scale_x = self.size.x / viewport.width as f32;
        let scale_y = self.size.y / viewport.height as f32;
        Vec2::new(
            (screen.x - viewport.width as f32 * 0.5) * scale_x + self.center.x,
            (screen.y - viewport.height as f32 * 0.5) * scale_y + self.center.y,
        )
    }

    /// Pixels per world unit along x; views never rotate so this is also
    /// the scale applied to radii.
    pub fn scale(&self, viewport: Viewport) -> f32 {
        viewport.width as f32 / self.size.x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Viewport = Viewport {
        width: 800,
        height: 600,
    };

    #[test]
    fn default_view_is_identity() {
        let view = View::for_viewport(VIEWPORT);
        let screen = view.world_to_screen(Vec2::new(12.0, 34.0), VIEWPORT);
        assert_eq!(screen, Vec2::new(12.0, 34.0));
    }

    #[test]
    fn recentred_view_shifts_screen_position() {
        let view = View {
            center: Vec2::new(500.0, 300.0),
            size: Vec2::new(800.0, 600.0),
        };
        let screen = view.world_to_screen(Vec2::new(500.0, 300.0), VIEWPORT);
        assert_eq!(screen, Vec2::new(400.0, 300.0));
    }

    #[test]
    fn zoomed_out_view_halves_scale() {
        let view = View::for_viewport(VIEWPORT).zoomed(2.0);
        assert_eq!(view.scale(VIEWPORT), 0.5);
        let world = view.screen_to_world(Vec2::new(400.0, 300.0), VIEWPORT);
        assert_eq!(world, Vec2::new(400.0, 300.0));
    }
}
