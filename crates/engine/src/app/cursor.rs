use super::events::GamepadAxis;
use super::input::DeviceState;
use super::rendering::{fill_circle, Color, Vec2};

const OUTLINE_COLOR: Color = [0, 0, 0, 200];

/// Software pointer drawn above everything else. Gamepad 0's left stick
/// steers it; otherwise it jumps to the OS pointer whenever that moves.
#[derive(Debug, Clone)]
pub struct Cursor {
    position: Vec2,
    speed: f32,
    default_speed: f32,
    visible: bool,
    radius: f32,
    color: Color,
    followed_pointer: Option<Vec2>,
}

impl Cursor {
    pub fn new(radius: f32, speed: f32, color: Color) -> Self {
        Self {
            position: Vec2::ZERO,
            speed,
            default_speed: speed,
            visible: true,
            radius,
            color,
            followed_pointer: None,
        }
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    /// Pixels per second at full stick deflection.
    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed.max(0.0);
    }

    pub fn reset_speed(&mut self) {
        self.speed = self.default_speed;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub(crate) fn update<D>(&mut self, dt: f32, devices: &D, deadzone: f32, bounds: (u32, u32))
    where
        D: DeviceState + ?Sized,
    {
        let stick = Vec2::new(
            devices.gamepad_axis(0, GamepadAxis::LeftX),
            devices.gamepad_axis(0, GamepadAxis::LeftY),
        );
        let pointer = devices.pointer_position();
        let target = if stick.length() > deadzone {
            self.position + stick * (self.speed * dt)
        } else {
            match pointer {
                Some(pointer) if self.followed_pointer != Some(pointer) => pointer,
                _ => self.position,
            }
        };
        self.followed_pointer = pointer;
        let max_x = bounds.0.saturating_sub(1) as f32;
        let max_y = bounds.1.saturating_sub(1) as f32;
        self.position = Vec2::new(target.x.clamp(0.0, max_x), target.y.clamp(0.0, max_y));
    }

    pub(crate) fn render(&self, frame: &mut [u8], width: u32, height: u32) {
        if !self.visible {
            return;
        }
        let Vec2 { x, y } = self.position;
        fill_circle(frame, width, height, x, y, self.radius + 1.0, OUTLINE_COLOR);
        fill_circle(frame, width, height, x, y, self.radius, self.color);
    }
}
