use engine::{
    text_width, Binding, CircleShape, EngineContext, GamepadAxis, GamepadButton, KeyCode,
    RectangleShape, Scene, Text, Vec2,
};
use tracing::{debug, info};

const LEFT: u32 = 0;
const RIGHT: u32 = 1;
const LAUNCH: u32 = 2;

const PADDLE_SIZE: Vec2 = Vec2::new(110.0, 14.0);
const PADDLE_SPEED: f32 = 620.0;
const PADDLE_MARGIN: f32 = 36.0;
const BALL_RADIUS: f32 = 7.0;
const BALL_SPEED: f32 = 380.0;
const BRICK_ROWS: usize = 5;
const BRICK_COLUMNS: usize = 10;
const BRICK_GAP: f32 = 6.0;
const BRICK_HEIGHT: f32 = 22.0;
const BRICK_TOP: f32 = 70.0;
const STARTING_LIVES: u32 = 3;

const BACKDROP_COLOR: [u8; 4] = [10, 12, 20, 255];
const PADDLE_COLOR: [u8; 4] = [230, 232, 240, 255];
const BALL_COLOR: [u8; 4] = [255, 214, 92, 255];
const HUD_COLOR: [u8; 4] = [200, 206, 220, 255];
const ROW_COLORS: [[u8; 4]; BRICK_ROWS] = [
    [232, 72, 85, 255],
    [240, 140, 60, 255],
    [236, 208, 70, 255],
    [90, 200, 120, 255],
    [80, 150, 230, 255],
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Rect {
    pub(crate) position: Vec2,
    pub(crate) size: Vec2,
}

impl Rect {
    fn contains_circle(&self, center: Vec2, radius: f32) -> bool {
        let nearest = Vec2::new(
            center.x.clamp(self.position.x, self.position.x + self.size.x),
            center.y.clamp(self.position.y, self.position.y + self.size.y),
        );
        (center - nearest).length() <= radius
    }

    fn center(&self) -> Vec2 {
        self.position + self.size * 0.5
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Ball {
    pub(crate) position: Vec2,
    pub(crate) velocity: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BallOutcome {
    InPlay,
    Lost,
}

/// Moves the paddle's left edge and keeps it inside the playfield.
pub(crate) fn step_paddle(x: f32, direction: f32, dt: f32, field_width: f32) -> f32 {
    (x + direction * PADDLE_SPEED * dt).clamp(0.0, (field_width - PADDLE_SIZE.x).max(0.0))
}

/// Advances the ball, reflecting off the side and top walls.
pub(crate) fn step_ball(ball: &mut Ball, dt: f32, field: Vec2) -> BallOutcome {
    ball.position = ball.position + ball.velocity * dt;

    if ball.position.x < BALL_RADIUS {
        ball.position.x = BALL_RADIUS;
        ball.velocity.x = ball.velocity.x.abs();
    } else if ball.position.x > field.x - BALL_RADIUS {
        ball.position.x = field.x - BALL_RADIUS;
        ball.velocity.x = -ball.velocity.x.abs();
    }
    if ball.position.y < BALL_RADIUS {
        ball.position.y = BALL_RADIUS;
        ball.velocity.y = ball.velocity.y.abs();
    }

    if ball.position.y - BALL_RADIUS > field.y {
        BallOutcome::Lost
    } else {
        BallOutcome::InPlay
    }
}

/// Sends the ball back up when it lands on the paddle. The further from the
/// paddle's centre it hits, the steeper the outgoing angle.
pub(crate) fn bounce_off_paddle(ball: &mut Ball, paddle: Rect) -> bool {
    if ball.velocity.y <= 0.0 || !paddle.contains_circle(ball.position, BALL_RADIUS) {
        return false;
    }
    let offset = ((ball.position.x - paddle.center().x) / (paddle.size.x * 0.5)).clamp(-1.0, 1.0);
    let angle = offset * std::f32::consts::FRAC_PI_3;
    let speed = ball.velocity.length();
    ball.velocity = Vec2::new(speed * angle.sin(), -speed * angle.cos());
    ball.position.y = paddle.position.y - BALL_RADIUS;
    true
}

/// Removes the first brick the ball overlaps and reflects the ball. Returns
/// the removed brick's row.
pub(crate) fn hit_brick(ball: &mut Ball, bricks: &mut Vec<(Rect, usize)>) -> Option<usize> {
    let index = bricks
        .iter()
        .position(|(rect, _)| rect.contains_circle(ball.position, BALL_RADIUS))?;
    let (rect, row) = bricks.swap_remove(index);

    let center = rect.center();
    let dx = (ball.position.x - center.x) / rect.size.x;
    let dy = (ball.position.y - center.y) / rect.size.y;
    if dx.abs() > dy.abs() {
        ball.velocity.x = ball.velocity.x.abs() * dx.signum();
    } else {
        ball.velocity.y = ball.velocity.y.abs() * dy.signum();
    }
    Some(row)
}

pub(crate) fn layout_bricks(field_width: f32) -> Vec<(Rect, usize)> {
    let brick_width =
        (field_width - BRICK_GAP * (BRICK_COLUMNS as f32 + 1.0)) / BRICK_COLUMNS as f32;
    let mut bricks = Vec::with_capacity(BRICK_ROWS * BRICK_COLUMNS);
    for row in 0..BRICK_ROWS {
        for column in 0..BRICK_COLUMNS {
            bricks.push((
                Rect {
                    position: Vec2::new(
                        BRICK_GAP + column as f32 * (brick_width + BRICK_GAP),
                        BRICK_TOP + row as f32 * (BRICK_HEIGHT + BRICK_GAP),
                    ),
                    size: Vec2::new(brick_width, BRICK_HEIGHT),
                },
                row,
            ));
        }
    }
    bricks
}

fn row_points(row: usize) -> u32 {
    ((BRICK_ROWS - row) as u32) * 10
}

#[derive(Debug, Default)]
pub(crate) struct BreakoutScene {
    field: Vec2,
    paddle_x: f32,
    ball: Option<Ball>,
    bricks: Vec<(Rect, usize)>,
    score: u32,
    lives: u32,
    paused: bool,
}

impl BreakoutScene {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn paddle(&self) -> Rect {
        Rect {
            position: Vec2::new(self.paddle_x, self.field.y - PADDLE_MARGIN),
            size: PADDLE_SIZE,
        }
    }

    fn resting_ball(&self) -> Vec2 {
        let paddle = self.paddle();
        Vec2::new(paddle.center().x, paddle.position.y - BALL_RADIUS - 1.0)
    }

    fn reset(&mut self, field: Vec2) {
        self.field = field;
        self.paddle_x = (field.x - PADDLE_SIZE.x) * 0.5;
        self.ball = None;
        self.bricks = layout_bricks(field.x);
        self.score = 0;
        self.lives = STARTING_LIVES;
    }

    fn is_over(&self) -> bool {
        self.lives == 0 || self.bricks.is_empty()
    }
}

impl Scene for BreakoutScene {
    fn start(&mut self, ctx: &mut EngineContext) {
        let (width, height) = ctx.window_size();
        self.reset(Vec2::new(width as f32, height as f32));
        ctx.cursor.set_visible(false);

        ctx.input.bind(LEFT, Binding::Key(KeyCode::ArrowLeft));
        ctx.input.bind(LEFT, Binding::Key(KeyCode::KeyA));
        ctx.input.bind(LEFT, Binding::axis(GamepadAxis::LeftX, -0.3));
        ctx.input.bind(LEFT, Binding::axis(GamepadAxis::DPadX, -0.5));
        ctx.input.bind(RIGHT, Binding::Key(KeyCode::ArrowRight));
        ctx.input.bind(RIGHT, Binding::Key(KeyCode::KeyD));
        ctx.input.bind(RIGHT, Binding::axis(GamepadAxis::LeftX, 0.3));
        ctx.input.bind(RIGHT, Binding::axis(GamepadAxis::DPadX, 0.5));
        ctx.input.bind(LAUNCH, Binding::Key(KeyCode::Space));
        ctx.input.bind(LAUNCH, Binding::gamepad(GamepadButton::South));

        info!(bricks = self.bricks.len(), "breakout_started");
    }

    fn update(&mut self, ctx: &mut EngineContext) {
        if self.is_over() {
            return;
        }
        let dt = ctx.time().delta_time();
        let direction = match (ctx.pressed(LEFT), ctx.pressed(RIGHT)) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        };
        self.paddle_x = step_paddle(self.paddle_x, direction, dt, self.field.x);

        let Some(mut ball) = self.ball else {
            if ctx.pressed(LAUNCH) {
                self.ball = Some(Ball {
                    position: self.resting_ball(),
                    velocity: Vec2::new(BALL_SPEED * 0.5, -BALL_SPEED * 0.866),
                });
            }
            return;
        };

        if step_ball(&mut ball, dt, self.field) == BallOutcome::Lost {
            self.lives = self.lives.saturating_sub(1);
            self.ball = None;
            info!(lives = self.lives, "breakout_ball_lost");
            return;
        }
        bounce_off_paddle(&mut ball, self.paddle());
        if let Some(row) = hit_brick(&mut ball, &mut self.bricks) {
            self.score += row_points(row);
            debug!(row, score = self.score, "breakout_brick_hit");
            if self.bricks.is_empty() {
                info!(score = self.score, "breakout_cleared");
            }
        }
        self.ball = Some(ball);
    }

    fn render(&mut self, ctx: &mut EngineContext) {
        ctx.renderer
            .draw(&RectangleShape::new(Vec2::ZERO, self.field, BACKDROP_COLOR));
        for (rect, row) in &self.bricks {
            ctx.renderer.draw(
                &RectangleShape::new(rect.position, rect.size, ROW_COLORS[*row])
                    .with_outline(BACKDROP_COLOR, 1.0),
            );
        }
        let paddle = self.paddle();
        ctx.renderer
            .draw(&RectangleShape::new(paddle.position, paddle.size, PADDLE_COLOR));

        let ball = self
            .ball
            .map_or_else(|| self.resting_ball(), |ball| ball.position);
        ctx.renderer
            .draw(&CircleShape::new(ball, BALL_RADIUS, BALL_COLOR));

        let hud = format!("SCORE {}   LIVES {}", self.score, self.lives);
        ctx.renderer
            .draw(&Text::new(Vec2::new(12.0, 14.0), hud, 3, HUD_COLOR));

        let banner = if self.bricks.is_empty() {
            Some("CLEARED")
        } else if self.lives == 0 {
            Some("GAME OVER")
        } else if self.paused {
            Some("PAUSED")
        } else {
            None
        };
        if let Some(banner) = banner {
            let x = (self.field.x - text_width(banner, 6) as f32) / 2.0;
            ctx.renderer.draw(&Text::new(
                Vec2::new(x, self.field.y * 0.55),
                banner,
                6,
                HUD_COLOR,
            ));
        }
    }

    fn on_pause(&mut self, paused: bool) {
        self.paused = paused;
    }

    fn on_cleanup(&mut self, _ctx: &mut EngineContext) {
        info!(
            score = self.score,
            bricks_left = self.bricks.len(),
            "breakout_finished"
        );
    }
}
