use std::f32::consts::TAU;
use std::time::Instant;

use super::{shade, to_color, PostEffect};
use crate::app::rendering::raster::Color;
use crate::app::rendering::surface::{Image, Surface};

const CURVATURE: f32 = 0.1;
const SCANLINE_DEPTH: f32 = 0.18;
const SCANLINE_PERIOD_PX: f32 = 3.0;
const SCANLINE_ROLL_PER_SECOND: f32 = 0.5;
const VIGNETTE_STRENGTH: f32 = 0.6;

/// CRT look: barrel curvature, rolling scan lines and a corner vignette.
#[derive(Debug)]
pub struct Monitor {
    started: Instant,
}

impl Monitor {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }
}

impl Default for Monitor {
    fn default() -> Self {
        Self::new()
    }
}

impl PostEffect for Monitor {
    fn name(&self) -> &'static str {
        "monitor"
    }

    fn apply(&mut self, input: &Image, output: &mut Surface) {
        let time = self.started.elapsed().as_secs_f32();
        let resolution = (output.width() as f32, output.height() as f32);
        shade(output, |x, y| monitor_pixel(input, x, y, resolution, time));
    }
}

fn monitor_pixel(input: &Image, x: u32, y: u32, resolution: (f32, f32), time: f32) -> Color {
    let u = (x as f32 + 0.5) / resolution.0;
    let v = (y as f32 + 0.5) / resolution.1;
    let (cu, cv) = (u - 0.5, v - 0.5);
    let dist = (cu * cu + cv * cv) * CURVATURE;
    let su = u + cu * (1.0 + dist) * dist;
    let sv = v + cv * (1.0 + dist) * dist;
    if !(0.0..=1.0).contains(&su) || !(0.0..=1.0).contains(&sv) {
        return [0, 0, 0, 255];
    }

    let sample = input.sample_uv(su, sv);
    let phase = (y as f32 / SCANLINE_PERIOD_PX + time * SCANLINE_ROLL_PER_SECOND) * TAU;
    let scanline = 1.0 - SCANLINE_DEPTH * (0.5 + 0.5 * phase.cos());
    let vignette = (1.0 - VIGNETTE_STRENGTH * (cu * cu + cv * cv)).clamp(0.0, 1.0);
    let gain = scanline * vignette;
    to_color([
        sample[0] * gain,
        sample[1] * gain,
        sample[2] * gain,
        sample[3],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::rendering::raster;

    fn uniform(width: u32, height: u32, color: Color) -> Image {
        let mut image = Image::new(width, height);
        raster::fill(image.pixels_mut(), color);
        image
    }

    #[test]
    fn corners_fall_outside_the_curved_screen() {
        let input = uniform(64, 64, [200, 200, 200, 255]);
        assert_eq!(
            monitor_pixel(&input, 0, 0, (64.0, 64.0), 0.0),
            [0, 0, 0, 255]
        );
    }

    #[test]
    fn never_brightens_the_source() {
        let input = uniform(64, 64, [200, 150, 100, 255]);
        for y in 0..64 {
            let [r, g, b, _] = monitor_pixel(&input, 32, y, (64.0, 64.0), 1.25);
            assert!(r <= 200 && g <= 150 && b <= 100);
        }
    }

    #[test]
    fn scan_lines_vary_brightness_between_rows() {
        let input = uniform(64, 64, [200, 200, 200, 255]);
        let rows: Vec<u8> = (30..34)
            .map(|y| monitor_pixel(&input, 32, y, (64.0, 64.0), 0.0)[0])
            .collect();
        assert!(rows.iter().any(|value| *value != rows[0]));
    }
}
