use engine::{
    text_width, Binding, DeviceState, EngineContext, EngineEvent, GamepadAxis, GamepadButton,
    KeyCode, MouseButton, RectangleShape, Scene, Text, Vec2,
};
use tracing::info;

const UP: u32 = 0;
const DOWN: u32 = 1;
const CONFIRM: u32 = 2;

const QUIT_ENTRY: &str = "Quit";
const TITLE: &str = "ARCADE";
const HINT: &str = "ESC PAUSE   M MENU   R RESTART";
const TITLE_SCALE: i32 = 8;
const ENTRY_SCALE: i32 = 4;
const ROW_HEIGHT: f32 = 44.0;

const BACKDROP_COLOR: [u8; 4] = [18, 22, 34, 255];
const HIGHLIGHT_COLOR: [u8; 4] = [58, 82, 140, 255];
const TEXT_COLOR: [u8; 4] = [236, 240, 248, 255];
const DIM_TEXT_COLOR: [u8; 4] = [140, 150, 170, 255];

/// Hub scene: lists every other registered scene and launches the chosen one.
#[derive(Debug, Default)]
pub(crate) struct MenuScene {
    entries: Vec<String>,
    selected: usize,
    held: [bool; 3],
}

impl MenuScene {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn activate(&self, ctx: &mut EngineContext) {
        let Some(entry) = self.entries.get(self.selected) else {
            return;
        };
        info!(entry = %entry, "menu_entry_chosen");
        if entry == QUIT_ENTRY {
            ctx.quit();
        } else {
            ctx.scenes.change_scene(entry.clone());
        }
    }

    fn move_selection(&mut self, step: isize) {
        if self.entries.is_empty() {
            return;
        }
        let count = self.entries.len() as isize;
        self.selected = (self.selected as isize + step).rem_euclid(count) as usize;
    }

    /// Rows are full-width bands stacked below the title.
    fn row_top(&self, index: usize, height: u32) -> f32 {
        height as f32 * 0.32 + index as f32 * ROW_HEIGHT
    }

    fn row_at(&self, point: Vec2, height: u32) -> Option<usize> {
        (0..self.entries.len()).find(|index| {
            let top = self.row_top(*index, height);
            point.y >= top && point.y < top + ROW_HEIGHT
        })
    }

    // True on the frame an action goes from released to pressed.
    fn rising(&mut self, ctx: &EngineContext, action: u32) -> bool {
        let now = ctx.pressed(action);
        let slot = &mut self.held[action as usize];
        let edge = now && !*slot;
        *slot = now;
        edge
    }
}

impl Scene for MenuScene {
    fn start(&mut self, ctx: &mut EngineContext) {
        let hub = ctx.scenes.hub_scene().to_string();
        self.entries = ctx
            .scenes
            .scene_names()
            .iter()
            .filter(|name| **name != hub)
            .cloned()
            .chain(std::iter::once(QUIT_ENTRY.to_string()))
            .collect();
        self.selected = self.selected.min(self.entries.len().saturating_sub(1));
        // Keys already held when the menu opens must not trigger it.
        self.held = [true; 3];

        ctx.input.bind(UP, Binding::Key(KeyCode::ArrowUp));
        ctx.input.bind(UP, Binding::Key(KeyCode::KeyW));
        ctx.input.bind(UP, Binding::axis(GamepadAxis::DPadY, -0.5));
        ctx.input.bind(UP, Binding::axis(GamepadAxis::LeftY, -0.5));
        ctx.input.bind(DOWN, Binding::Key(KeyCode::ArrowDown));
        ctx.input.bind(DOWN, Binding::Key(KeyCode::KeyS));
        ctx.input.bind(DOWN, Binding::axis(GamepadAxis::DPadY, 0.5));
        ctx.input.bind(DOWN, Binding::axis(GamepadAxis::LeftY, 0.5));
        ctx.input.bind(CONFIRM, Binding::Key(KeyCode::Enter));
        ctx.input.bind(CONFIRM, Binding::Key(KeyCode::Space));
        ctx.input.bind(CONFIRM, Binding::gamepad(GamepadButton::South));
    }

    fn update(&mut self, ctx: &mut EngineContext) {
        if self.rising(ctx, UP) {
            self.move_selection(-1);
        }
        if self.rising(ctx, DOWN) {
            self.move_selection(1);
        }
        if self.rising(ctx, CONFIRM) {
            self.activate(ctx);
        }
    }

    fn render(&mut self, ctx: &mut EngineContext) {
        let (width, height) = ctx.window_size();
        let (w, h) = (width as f32, height as f32);
        ctx.renderer.draw(&RectangleShape::new(
            Vec2::ZERO,
            Vec2::new(w, h),
            BACKDROP_COLOR,
        ));
        ctx.renderer.draw(&Text::new(
            Vec2::new((w - text_width(TITLE, TITLE_SCALE) as f32) / 2.0, h * 0.12),
            TITLE,
            TITLE_SCALE,
            TEXT_COLOR,
        ));

        for (index, entry) in self.entries.iter().enumerate() {
            let top = self.row_top(index, height);
            if index == self.selected {
                ctx.renderer.draw(&RectangleShape::new(
                    Vec2::new(w * 0.2, top),
                    Vec2::new(w * 0.6, ROW_HEIGHT - 4.0),
                    HIGHLIGHT_COLOR,
                ));
            }
            let label = entry.to_uppercase();
            ctx.renderer.draw(&Text::new(
                Vec2::new(
                    (w - text_width(&label, ENTRY_SCALE) as f32) / 2.0,
                    top + (ROW_HEIGHT - 4.0 - 5.0 * ENTRY_SCALE as f32) / 2.0,
                ),
                label,
                ENTRY_SCALE,
                TEXT_COLOR,
            ));
        }

        ctx.renderer.draw(&Text::new(
            Vec2::new((w - text_width(HINT, 2) as f32) / 2.0, h - 30.0),
            HINT,
            2,
            DIM_TEXT_COLOR,
        ));
    }

    fn on_event(&mut self, event: &EngineEvent, ctx: &mut EngineContext) {
        match *event {
            EngineEvent::PointerMoved { position } => {
                if let Some(row) = self.row_at(position, ctx.window_size().1) {
                    self.selected = row;
                }
            }
            EngineEvent::PointerPressed {
                button: MouseButton::Left,
            } => {
                // The cursor only catches up with the pointer in the next update.
                let point = ctx
                    .devices()
                    .pointer_position()
                    .unwrap_or_else(|| ctx.cursor.position());
                if let Some(row) = self.row_at(point, ctx.window_size().1) {
                    self.selected = row;
                    self.activate(ctx);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_wraps_in_both_directions() {
        let mut menu = MenuScene {
            entries: vec!["A".into(), "B".into(), QUIT_ENTRY.into()],
            ..MenuScene::default()
        };
        menu.move_selection(-1);
        assert_eq!(menu.selected, 2);
        menu.move_selection(1);
        assert_eq!(menu.selected, 0);
    }

    #[test]
    fn rows_are_hit_tested_by_height() {
        let menu = MenuScene {
            entries: vec!["A".into(), "B".into()],
            ..MenuScene::default()
        };
        let second = menu.row_top(1, 600) + 1.0;
        assert_eq!(menu.row_at(Vec2::new(10.0, second), 600), Some(1));
        assert_eq!(menu.row_at(Vec2::new(10.0, 5.0), 600), None);
    }
}
