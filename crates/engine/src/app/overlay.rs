use tracing::debug;
use winit::event::MouseButton;

use super::events::EngineEvent;
use super::input::{hardware_to_logical, DeviceState, GamepadButton};
use super::rendering::{draw_text, fill_rect, rect_outline, text_width, Color, Vec2};

const TEXT_SCALE: i32 = 3;
const TITLE: &str = "Paused";
const DIM_COLOR: Color = [0, 0, 0, 175];
const PANEL_BG_COLOR: Color = [10, 12, 16, 210];
const PANEL_BORDER_COLOR: Color = [92, 106, 126, 255];
const BUTTON_COLOR: Color = [38, 44, 56, 255];
const BUTTON_HOVER_COLOR: Color = [64, 78, 100, 255];
const TEXT_COLOR: Color = [244, 248, 252, 255];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlaySelection {
    Resume,
    Restart,
    Menu,
    Quit,
}

impl OverlaySelection {
    pub const ALL: [OverlaySelection; 4] = [
        OverlaySelection::Resume,
        OverlaySelection::Restart,
        OverlaySelection::Menu,
        OverlaySelection::Quit,
    ];

    pub fn label(self) -> &'static str {
        match self {
            OverlaySelection::Resume => "Resume",
            OverlaySelection::Restart => "Restart",
            OverlaySelection::Menu => "Menu",
            OverlaySelection::Quit => "Quit",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ButtonRect {
    x: i32,
    y: i32,
    width: i32,
    height: i32,
}

impl ButtonRect {
    fn contains(&self, point: Vec2) -> bool {
        let (px, py) = (point.x.floor() as i32, point.y.floor() as i32);
        px >= self.x && py >= self.y && px < self.x + self.width && py < self.y + self.height
    }
}

/// Modal pause menu. Holds at most one unread selection.
#[derive(Debug, Clone)]
pub struct PauseOverlay {
    visible: bool,
    selection: Option<OverlaySelection>,
    width: u32,
    height: u32,
    hovered: Option<OverlaySelection>,
}

impl PauseOverlay {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            visible: false,
            selection: None,
            width,
            height,
            hovered: None,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Hiding drops any unread selection.
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        if !visible {
            self.selection = None;
            self.hovered = None;
        }
    }

    /// Read-and-clear: a selection is reported exactly once.
    pub fn fetch_selection(&mut self) -> Option<OverlaySelection> {
        self.selection.take()
    }

    /// `cursor` is the software cursor position in frame pixels.
    pub(crate) fn process_event<D>(&mut self, event: &EngineEvent, cursor: Vec2, devices: &D)
    where
        D: DeviceState + ?Sized,
    {
        if !self.visible {
            return;
        }
        self.hovered = self.button_at(cursor);
        let clicked = match *event {
            EngineEvent::PointerPressed {
                button: MouseButton::Left,
            } => true,
            EngineEvent::GamepadButtonPressed { gamepad, button } => {
                hardware_to_logical(button, gamepad, devices) == Some(GamepadButton::South)
            }
            _ => false,
        };
        if !clicked {
            return;
        }
        if let Some(selection) = self.hovered {
            debug!(selection = selection.label(), "overlay_selection");
            self.selection = Some(selection);
        }
    }

    pub(crate) fn render(&self, frame: &mut [u8], width: u32, height: u32) {
        if !self.visible || width == 0 || height == 0 {
            return;
        }
        fill_rect(
            frame,
            width,
            height,
            0,
            0,
            width as i32,
            height as i32,
            DIM_COLOR,
        );

        let (panel_x, panel_y, panel_width, panel_height) = self.panel();
        fill_rect(
            frame,
            width,
            height,
            panel_x,
            panel_y,
            panel_width,
            panel_height,
            PANEL_BG_COLOR,
        );
        rect_outline(
            frame,
            width,
            height,
            panel_x,
            panel_y,
            panel_width,
            panel_height,
            2,
            PANEL_BORDER_COLOR,
        );
        draw_text(
            frame,
            width,
            height,
            panel_x + (panel_width - text_width(TITLE, TEXT_SCALE)) / 2,
            panel_y + panel_height / 10 - TEXT_SCALE * 2,
            TITLE,
            TEXT_SCALE,
            TEXT_COLOR,
        );

        for selection in OverlaySelection::ALL {
            let rect = self.button_rect(selection);
            let color = if self.hovered == Some(selection) {
                BUTTON_HOVER_COLOR
            } else {
                BUTTON_COLOR
            };
            fill_rect(
                frame,
                width,
                height,
                rect.x,
                rect.y,
                rect.width,
                rect.height,
                color,
            );
            rect_outline(
                frame,
                width,
                height,
                rect.x,
                rect.y,
                rect.width,
                rect.height,
                1,
                PANEL_BORDER_COLOR,
            );
            let label = selection.label();
            draw_text(
                frame,
                width,
                height,
                rect.x + (rect.width - text_width(label, TEXT_SCALE)) / 2,
                rect.y + (rect.height - 5 * TEXT_SCALE) / 2,
                label,
                TEXT_SCALE,
                TEXT_COLOR,
            );
        }
    }

    fn panel(&self) -> (i32, i32, i32, i32) {
        let (width, height) = (self.width as f32, self.height as f32);
        (
            (width * 0.31) as i32,
            (height * 0.18) as i32,
            (width * 0.37) as i32,
            (height * 0.63) as i32,
        )
    }

    // Title takes the top fifth; each button gets a quarter of the rest.
    fn button_rect(&self, selection: OverlaySelection) -> ButtonRect {
        let (panel_x, panel_y, panel_width, panel_height) = self.panel();
        let index = OverlaySelection::ALL
            .iter()
            .position(|candidate| *candidate == selection)
            .unwrap_or(0) as i32;
        let title_height = panel_height / 5;
        let slot = (panel_height - title_height) / 4;
        let margin_x = panel_width / 10;
        ButtonRect {
            x: panel_x + margin_x,
            y: panel_y + title_height + index * slot + slot / 8,
            width: panel_width - margin_x * 2,
            height: slot * 3 / 4,
        }
    }

    fn button_at(&self, point: Vec2) -> Option<OverlaySelection> {
        OverlaySelection::ALL
            .into_iter()
            .find(|selection| self.button_rect(*selection).contains(point))
    }
}
