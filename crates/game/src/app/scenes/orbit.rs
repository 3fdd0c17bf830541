use std::f32::consts::TAU;

use engine::{
    Binding, EngineContext, EngineEvent, GamepadButton, KeyCode, PrimitiveType, Scene, Text, Vec2,
    Vertex, View, Viewport,
};
use tracing::{debug, info};

const FASTER: u32 = 0;
const SLOWER: u32 = 1;

const MIN_ZOOM: f32 = 0.25;
const MAX_ZOOM: f32 = 4.0;
const ZOOM_STEP: f32 = 0.9;
const MIN_SPEED: f32 = 0.1;
const MAX_SPEED: f32 = 8.0;
const SPEED_RATE: f32 = 1.5;
const STAR_COUNT: usize = 160;
const RING_SEGMENTS: usize = 96;

const SPACE_COLOR: [u8; 4] = [4, 6, 14, 255];
const SUN_CORE: [u8; 4] = [255, 240, 180, 255];
const SUN_EDGE: [u8; 4] = [255, 140, 40, 255];
const RING_COLOR: [u8; 4] = [60, 70, 100, 255];
const STAR_COLOR: [u8; 4] = [180, 190, 220, 255];
const HUD_COLOR: [u8; 4] = [200, 206, 220, 255];

#[derive(Debug, Clone, Copy)]
struct Planet {
    distance: f32,
    radius: f32,
    period: f32,
    color: [u8; 4],
}

const PLANETS: [Planet; 4] = [
    Planet {
        distance: 70.0,
        radius: 6.0,
        period: 3.0,
        color: [190, 180, 170, 255],
    },
    Planet {
        distance: 120.0,
        radius: 10.0,
        period: 7.0,
        color: [80, 150, 240, 255],
    },
    Planet {
        distance: 180.0,
        radius: 8.0,
        period: 12.0,
        color: [220, 90, 60, 255],
    },
    Planet {
        distance: 260.0,
        radius: 16.0,
        period: 24.0,
        color: [220, 190, 130, 255],
    },
];

/// Position of a body on a circular orbit after `elapsed` simulated seconds.
fn orbit_position(center: Vec2, distance: f32, period: f32, elapsed: f32) -> Vec2 {
    let angle = TAU * (elapsed / period).fract();
    center + Vec2::new(angle.cos(), angle.sin()) * distance
}

/// Triangle fan disc: centre vertex, then a closed ring.
fn disc(
    center: Vec2,
    radius: f32,
    inner: [u8; 4],
    outer: [u8; 4],
    segments: usize,
) -> Vec<Vertex> {
    std::iter::once(Vertex::new(center, inner))
        .chain(ring(center, radius, outer, segments))
        .collect()
}

fn ring(center: Vec2, radius: f32, color: [u8; 4], segments: usize) -> Vec<Vertex> {
    (0..=segments)
        .map(|i| {
            let angle = TAU * i as f32 / segments as f32;
            Vertex::new(center + Vec2::new(angle.cos(), angle.sin()) * radius, color)
        })
        .collect()
}

/// Deterministic star field so restarts look the same.
fn star_field(width: f32, height: f32, count: usize) -> Vec<Vertex> {
    let mut seed: u32 = 0x9E37_79B9;
    let mut next = move || {
        seed ^= seed << 13;
        seed ^= seed >> 17;
        seed ^= seed << 5;
        seed as f32 / u32::MAX as f32
    };
    (0..count)
        .map(|_| {
            let x = next() * width;
            let y = next() * height;
            Vertex::new(Vec2::new(x, y), STAR_COLOR)
        })
        .collect()
}

fn apply_zoom(zoom: f32, wheel_delta: f32) -> f32 {
    (zoom * ZOOM_STEP.powf(wheel_delta)).clamp(MIN_ZOOM, MAX_ZOOM)
}

fn adjust_speed(speed: f32, direction: f32, dt: f32) -> f32 {
    (speed * SPEED_RATE.powf(direction * dt)).clamp(MIN_SPEED, MAX_SPEED)
}

#[derive(Debug)]
pub(crate) struct OrbitScene {
    elapsed: f32,
    speed: f32,
    zoom: f32,
    stars: Vec<Vertex>,
}

impl Default for OrbitScene {
    fn default() -> Self {
        Self {
            elapsed: 0.0,
            speed: 1.0,
            zoom: 1.0,
            stars: Vec::new(),
        }
    }
}

impl OrbitScene {
    pub(crate) fn new() -> Self {
        Self::default()
    }
}

impl Scene for OrbitScene {
    fn start(&mut self, ctx: &mut EngineContext) {
        let (width, height) = ctx.window_size();
        *self = Self {
            stars: star_field(width as f32, height as f32, STAR_COUNT),
            ..Self::default()
        };

        ctx.input.bind(FASTER, Binding::Key(KeyCode::ArrowUp));
        ctx.input.bind(FASTER, Binding::Key(KeyCode::Equal));
        ctx.input.bind(FASTER, Binding::gamepad(GamepadButton::R1));
        ctx.input.bind(SLOWER, Binding::Key(KeyCode::ArrowDown));
        ctx.input.bind(SLOWER, Binding::Key(KeyCode::Minus));
        ctx.input.bind(SLOWER, Binding::gamepad(GamepadButton::L1));
        info!(planets = PLANETS.len(), "orbit_started");
    }

    fn update(&mut self, ctx: &mut EngineContext) {
        let dt = ctx.time().delta_time();
        let direction = match (ctx.pressed(FASTER), ctx.pressed(SLOWER)) {
            (true, false) => 1.0,
            (false, true) => -1.0,
            _ => 0.0,
        };
        if direction != 0.0 {
            self.speed = adjust_speed(self.speed, direction, dt);
        }
        self.elapsed += dt * self.speed;
    }

    fn render(&mut self, ctx: &mut EngineContext) {
        let (width, height) = ctx.window_size();
        let center = Vec2::new(width as f32, height as f32) * 0.5;

        // Backdrop and HUD are drawn in window coordinates.
        ctx.renderer.reset_view();
        ctx.renderer.draw_vertices(
            &[
                Vertex::new(Vec2::ZERO, SPACE_COLOR),
                Vertex::new(Vec2::new(width as f32, 0.0), SPACE_COLOR),
                Vertex::new(Vec2::new(0.0, height as f32), SPACE_COLOR),
                Vertex::new(Vec2::new(width as f32, height as f32), SPACE_COLOR),
            ],
            PrimitiveType::TriangleStrip,
        );
        ctx.renderer
            .draw_vertices(&self.stars, PrimitiveType::Points);

        ctx.renderer
            .set_view(View::for_viewport(Viewport { width, height }).zoomed(self.zoom));
        for planet in &PLANETS {
            ctx.renderer.draw_vertices(
                &ring(center, planet.distance, RING_COLOR, RING_SEGMENTS),
                PrimitiveType::LineStrip,
            );
        }
        ctx.renderer.draw_vertices(
            &disc(center, 32.0, SUN_CORE, SUN_EDGE, 48),
            PrimitiveType::TriangleFan,
        );
        for planet in &PLANETS {
            let position = orbit_position(center, planet.distance, planet.period, self.elapsed);
            ctx.renderer.draw_vertices(
                &disc(position, planet.radius, planet.color, planet.color, 24),
                PrimitiveType::TriangleFan,
            );
        }

        ctx.renderer.reset_view();
        let hud = format!("SPEED X{:.1}   ZOOM X{:.2}", self.speed, 1.0 / self.zoom);
        ctx.renderer
            .draw(&Text::new(Vec2::new(12.0, 14.0), hud, 3, HUD_COLOR));
    }

    fn on_event(&mut self, event: &EngineEvent, _ctx: &mut EngineContext) {
        if let EngineEvent::PointerWheel { delta } = *event {
            self.zoom = apply_zoom(self.zoom, delta);
            debug!(zoom = self.zoom, "orbit_zoom_changed");
        }
    }

    fn on_pause(&mut self, paused: bool) {
        info!(paused, elapsed = self.elapsed, "orbit_paused");
    }
}
