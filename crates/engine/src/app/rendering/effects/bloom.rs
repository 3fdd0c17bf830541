use super::{shade, to_color, PostEffect};
use crate::app::rendering::surface::{Image, Surface};

const GAUSSIAN_WEIGHTS: [f32; 5] = [0.227_027, 0.194_594_6, 0.121_621_6, 0.054_054, 0.016_216];

/// Four-pass bloom: downsample to half resolution, separable gaussian blur
/// (vertical then horizontal), then additive composite over the source frame.
#[derive(Debug)]
pub struct Bloom {
    // Half-size scratch targets, reused every frame.
    scratch: [Image; 2],
    intensity: f32,
}

impl Bloom {
    pub fn new(width: u32, height: u32, intensity: f32) -> Self {
        let half_width = (width / 2).max(1);
        let half_height = (height / 2).max(1);
        Self {
            scratch: [
                Image::new(half_width, half_height),
                Image::new(half_width, half_height),
            ],
            intensity,
        }
    }

    pub fn scratch_size(&self) -> (u32, u32) {
        (self.scratch[0].width(), self.scratch[0].height())
    }
}

impl PostEffect for Bloom {
    fn name(&self) -> &'static str {
        "bloom"
    }

    fn apply(&mut self, input: &Image, output: &mut Surface) {
        let [first, second] = &mut self.scratch;

        // 1. shrink before blurring
        downsample(input, first);
        // 2. spread brightness vertically
        blur(first, second, (0, 1));
        // 3. and horizontally
        blur(second, first, (1, 0));
        // 4. add the glow back over the full-resolution input
        let bloom: &Image = first;
        let (width, height) = (output.width() as f32, output.height() as f32);
        let intensity = self.intensity;
        shade(output, |x, y| {
            let base = input.sample_clamped(x as i32, y as i32);
            let glow = bloom.sample_uv((x as f32 + 0.5) / width, (y as f32 + 0.5) / height);
            to_color([
                base[0] as f32 + glow[0] * intensity,
                base[1] as f32 + glow[1] * intensity,
                base[2] as f32 + glow[2] * intensity,
                base[3] as f32,
            ])
        });
    }
}

/// Each destination texel lands on the centre of a 2x2 source block, so
/// the bilinear tap is a box average whatever the source size.
fn downsample(source: &Image, target: &mut Image) {
    let (width, height) = (target.width(), target.height());
    for y in 0..height {
        for x in 0..width {
            let u = (x as f32 + 0.5) / width as f32;
            let v = (y as f32 + 0.5) / height as f32;
            target.put(x, y, to_color(source.sample_uv(u, v)));
        }
    }
}

fn blur(source: &Image, target: &mut Image, direction: (i32, i32)) {
    for y in 0..target.height() {
        for x in 0..target.width() {
            let mut sum = [0.0f32; 4];
            for (offset, weight) in GAUSSIAN_WEIGHTS.iter().enumerate() {
                let offset = offset as i32;
                let taps: &[i32] = if offset == 0 {
                    &[0]
                } else {
                    &[offset, -offset]
                };
                for tap in taps {
                    let color = source.sample_clamped(
                        x as i32 + tap * direction.0,
                        y as i32 + tap * direction.1,
                    );
                    for (channel, total) in sum.iter_mut().enumerate() {
                        *total += color[channel] as f32 * weight;
                    }
                }
            }
            target.put(x, y, to_color(sum));
        }
    }
}
