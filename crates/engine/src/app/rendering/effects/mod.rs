mod bloom;
mod glitch;
mod inverted;
mod monitor;

use serde::{Deserialize, Serialize};

use super::raster::Color;
use super::surface::{Image, Surface};

pub use bloom::Bloom;
pub use glitch::Glitch;
pub use inverted::Inverted;
pub use monitor::Monitor;

/// One full-screen stage of the post-processing chain. The compositor
/// hands each stage the previous stage's finished image and a freshly
/// cleared destination surface of the same size.
pub trait PostEffect {
    fn name(&self) -> &'static str;
    fn apply(&mut self, input: &Image, output: &mut Surface);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    Inverted,
    Monitor,
    Glitch,
    Bloom,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectSettings {
    pub width: u32,
    pub height: u32,
    pub bloom_intensity: f32,
}

pub fn build_effect(kind: EffectKind, settings: EffectSettings) -> Box<dyn PostEffect> {
    match kind {
        EffectKind::Inverted => Box::new(Inverted),
        EffectKind::Monitor => Box::new(Monitor::new()),
        EffectKind::Glitch => Box::new(Glitch::new()),
        EffectKind::Bloom => Box::new(Bloom::new(
            settings.width,
            settings.height,
            settings.bloom_intensity,
        )),
    }
}

/// Runs `shader` once per destination pixel, like a fragment shader over a
/// full-screen quad.
pub(crate) fn shade(output: &mut Surface, mut shader: impl FnMut(u32, u32) -> Color) {
    let width = output.width();
    for (index, pixel) in output.pixels_mut().chunks_exact_mut(4).enumerate() {
        let x = index as u32 % width;
        let y = index as u32 / width;
        pixel.copy_from_slice(&shader(x, y));
    }
}

pub(crate) fn to_color(rgba: [f32; 4]) -> Color {
    rgba.map(|channel| channel.round().clamp(0.0, 255.0) as u8)
}
