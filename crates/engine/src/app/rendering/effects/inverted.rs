use super::{shade, PostEffect};
use crate::app::rendering::surface::{Image, Surface};

#[derive(Debug, Default)]
pub struct Inverted;

impl PostEffect for Inverted {
    fn name(&self) -> &'static str {
        "inverted"
    }

    fn apply(&mut self, input: &Image, output: &mut Surface) {
        shade(output, |x, y| {
            let [r, g, b, a] = input.sample_clamped(x as i32, y as i32);
            [255 - r, 255 - g, 255 - b, a]
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverts_colour_and_keeps_alpha() {
        let mut input = Image::new(2, 1);
        input.put(0, 0, [0, 100, 255, 200]);
        input.put(1, 0, [255, 255, 255, 255]);
        let mut output = Surface::new(2, 1);

        Inverted.apply(&input, &mut output);

        assert_eq!(output.image().get(0, 0), Some([255, 155, 0, 200]));
        assert_eq!(output.image().get(1, 0), Some([0, 0, 0, 255]));
    }
}
