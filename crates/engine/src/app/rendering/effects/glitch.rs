use std::time::Instant;

use super::{shade, PostEffect};
use crate::app::rendering::raster::Color;
use crate::app::rendering::surface::{Image, Surface};

const BAND_HEIGHT_PX: u32 = 6;
const STEPS_PER_SECOND: f32 = 12.0;
const GLITCHED_BAND_THRESHOLD: f32 = 0.82;
const MAX_SHIFT_PX: f32 = 28.0;
const CHANNEL_SPLIT_PX: i32 = 3;

/// Animated digital glitch: random horizontal bands jump sideways with the
/// red and blue channels pulled apart. The pattern changes at a fixed rate.
#[derive(Debug)]
pub struct Glitch {
    started: Instant,
}

impl Glitch {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }
}

impl Default for Glitch {
    fn default() -> Self {
        Self::new()
    }
}

impl PostEffect for Glitch {
    fn name(&self) -> &'static str {
        "glitch"
    }

    fn apply(&mut self, input: &Image, output: &mut Surface) {
        let step = (self.started.elapsed().as_secs_f32() * STEPS_PER_SECOND) as u32;
        shade(output, |x, y| glitch_pixel(input, x, y, step));
    }
}

fn glitch_pixel(input: &Image, x: u32, y: u32, step: u32) -> Color {
    let (x, y) = (x as i32, y as i32);
    let Some(shift) = band_shift(y as u32 / BAND_HEIGHT_PX, step) else {
        return input.sample_clamped(x, y);
    };
    let source_x = x + shift;
    let red = input.sample_clamped(source_x + CHANNEL_SPLIT_PX, y);
    let base = input.sample_clamped(source_x, y);
    let blue = input.sample_clamped(source_x - CHANNEL_SPLIT_PX, y);
    [red[0], base[1], blue[2], base[3]]
}

fn band_shift(band: u32, step: u32) -> Option<i32> {
    let roll = unit_hash(band, step);
    if roll < GLITCHED_BAND_THRESHOLD {
        return None;
    }
    let amount = unit_hash(band.wrapping_add(0x9e37), step) - 0.5;
    Some((amount * 2.0 * MAX_SHIFT_PX).round() as i32)
}

fn unit_hash(a: u32, b: u32) -> f32 {
    let mut h = a.wrapping_mul(0x85eb_ca6b) ^ b.wrapping_mul(0xc2b2_ae35);
    h ^= h >> 16;
    h = h.wrapping_mul(0x7feb_352d);
    h ^= h >> 15;
    h = h.wrapping_mul(0x846c_a68b);
    h ^= h >> 16;
    (h >> 8) as f32 / (1u32 << 24) as f32
}
