use tracing::{info, warn};

use super::effects::{build_effect, EffectKind, EffectSettings, PostEffect};
use super::raster::Color;
use super::surface::{Drawable, Image, PrimitiveType, Surface, Vertex};
use super::transform::View;

/// Scene-facing draw target. Scenes draw into the primary offscreen surface
/// during a frame; `finish_drawing` runs the post-processing chain by
/// ping-ponging between the primary surface and a second one of equal size.
pub struct FrameCompositor {
    // [primary, effects]; effects is zero-sized when the chain is empty.
    surfaces: [Surface; 2],
    effects: Vec<Box<dyn PostEffect>>,
    clear_color: Color,
}

impl FrameCompositor {
    pub fn new(
        width: u32,
        height: u32,
        clear_color: Color,
        effect_kinds: &[EffectKind],
        effects_supported: bool,
        bloom_intensity: f32,
    ) -> Self {
        let settings = EffectSettings {
            width,
            height,
            bloom_intensity,
        };
        let effects: Vec<Box<dyn PostEffect>> = if effects_supported {
            effect_kinds
                .iter()
                .map(|kind| build_effect(*kind, settings))
                .collect()
        } else {
            if !effect_kinds.is_empty() {
                warn!(
                    requested = effect_kinds.len(),
                    "post_processing_unavailable_passthrough"
                );
            }
            Vec::new()
        };
        Self::with_effects(width, height, clear_color, effects)
    }

    pub fn with_effects(
        width: u32,
        height: u32,
        clear_color: Color,
        effects: Vec<Box<dyn PostEffect>>,
    ) -> Self {
        let secondary = if effects.is_empty() {
            Surface::new(0, 0)
        } else {
            Surface::new(width, height)
        };
        info!(
            width,
            height,
            effects = ?effects.iter().map(|effect| effect.name()).collect::<Vec<_>>(),
            "compositor_ready"
        );
        Self {
            surfaces: [Surface::new(width, height), secondary],
            effects,
            clear_color,
        }
    }

    pub fn effect_count(&self) -> usize {
        self.effects.len()
    }

    pub fn width(&self) -> u32 {
        self.surfaces[0].width()
    }

    pub fn height(&self) -> u32 {
        self.surfaces[0].height()
    }

    pub fn draw(&mut self, drawable: &dyn Drawable) {
        self.surfaces[0].draw(drawable);
    }

    pub fn draw_vertices(&mut self, vertices: &[Vertex], primitive: PrimitiveType) {
        self.surfaces[0].draw_vertices(vertices, primitive);
    }

    pub fn set_view(&mut self, view: View) {
        self.surfaces[0].set_view(view);
    }

    pub fn reset_view(&mut self) {
        let default_view = self.surfaces[0].default_view();
        self.set_view(default_view);
    }

    pub fn view(&self) -> View {
        self.surfaces[0].view()
    }

    pub(crate) fn begin_drawing(&mut self) {
        let color = self.clear_color;
        self.surfaces[0].clear(color);
    }

    pub(crate) fn finish_drawing(&mut self) -> &Image {
        self.surfaces[0].display();

        let mut current = 0;
        for effect in &mut self.effects {
            let (input, output) = split_read_write(&mut self.surfaces, current);
            output.clear([0, 0, 0, 0]);
            effect.apply(input.image(), output);
            output.display();
            current = 1 - current;
        }

        self.surfaces[current].image()
    }

    #[cfg(test)]
    fn total_generations(&self) -> u64 {
        self.surfaces.iter().map(Surface::generation).sum()
    }
}

fn split_read_write(surfaces: &mut [Surface; 2], read: usize) -> (&Surface, &mut Surface) {
    let (first, second) = surfaces.split_at_mut(1);
    if read == 0 {
        (&first[0], &mut second[0])
    } else {
        (&second[0], &mut first[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::rendering::effects::Inverted;
    use crate::app::rendering::surface::{CircleShape, RectangleShape};
    use crate::app::rendering::transform::Vec2;

    const BACKGROUND: Color = [10, 20, 30, 255];

    struct Recording {
        calls: std::rc::Rc<std::cell::RefCell<Vec<(&'static str, u64)>>>,
        label: &'static str,
    }

    impl PostEffect for Recording {
        fn name(&self) -> &'static str {
            self.label
        }

        fn apply(&mut self, input: &Image, output: &mut Surface) {
            assert!(output.image().pixels().iter().all(|byte| *byte == 0));
            self.calls
                .borrow_mut()
                .push((self.label, output.generation()));
            output.blit(input, 0, 0);
        }
    }

    fn draw_scene(compositor: &mut FrameCompositor) {
        compositor.draw(&RectangleShape::new(
            Vec2::new(2.0, 2.0),
            Vec2::new(6.0, 4.0),
            [200, 0, 0, 255],
        ));
        compositor.draw(&CircleShape::new(Vec2::new(10.0, 10.0), 3.0, [0, 200, 0, 128]));
    }

    #[test]
    fn empty_chain_is_pure_passthrough() {
        let mut compositor = FrameCompositor::with_effects(16, 16, BACKGROUND, Vec::new());
        let mut expected = Surface::new(16, 16);
        expected.clear(BACKGROUND);
        expected.draw(&RectangleShape::new(
            Vec2::new(2.0, 2.0),
            Vec2::new(6.0, 4.0),
            [200, 0, 0, 255],
        ));
        expected.draw(&CircleShape::new(Vec2::new(10.0, 10.0), 3.0, [0, 200, 0, 128]));

        compositor.begin_drawing();
        draw_scene(&mut compositor);
        let image = compositor.finish_drawing();

        assert_eq!(image, expected.image());
    }

    #[test]
    fn unsupported_host_degrades_to_passthrough() {
        let compositor = FrameCompositor::new(
            8,
            8,
            BACKGROUND,
            &[EffectKind::Bloom, EffectKind::Monitor],
            false,
            0.5,
        );
        assert_eq!(compositor.effect_count(), 0);
    }

    #[test]
    fn stages_run_in_order_with_one_cycle_each() {
        let calls = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let effects: Vec<Box<dyn PostEffect>> = ["first", "second", "third"]
            .into_iter()
            .map(|label| {
                Box::new(Recording {
                    calls: calls.clone(),
                    label,
                }) as Box<dyn PostEffect>
            })
            .collect();
        let mut compositor = FrameCompositor::with_effects(8, 8, BACKGROUND, effects);

        compositor.begin_drawing();
        let image = compositor.finish_drawing().clone();

        let labels: Vec<_> = calls.borrow().iter().map(|(label, _)| *label).collect();
        assert_eq!(labels, vec!["first", "second", "third"]);
        assert_eq!(compositor.total_generations(), 1 + 3);
        assert!(image.pixels().chunks_exact(4).all(|px| px == BACKGROUND));
    }

    #[test]
    fn odd_chain_ends_on_secondary_surface() {
        let mut compositor = FrameCompositor::with_effects(
            4,
            4,
            [0, 0, 0, 255],
            vec![Box::new(Inverted) as Box<dyn PostEffect>],
        );
        compositor.begin_drawing();
        let image = compositor.finish_drawing();
        assert_eq!(image.get(0, 0), Some([255, 255, 255, 255]));
    }

    #[test]
    fn double_inversion_restores_frame() {
        let mut compositor = FrameCompositor::with_effects(
            16,
            16,
            BACKGROUND,
            vec![
                Box::new(Inverted) as Box<dyn PostEffect>,
                Box::new(Inverted) as Box<dyn PostEffect>,
            ],
        );
        compositor.begin_drawing();
        draw_scene(&mut compositor);
        let image = compositor.finish_drawing().clone();

        let mut plain = FrameCompositor::with_effects(16, 16, BACKGROUND, Vec::new());
        plain.begin_drawing();
        draw_scene(&mut plain);
        assert_eq!(&image, plain.finish_drawing());
    }

    #[test]
    fn view_changes_affect_only_later_draws() {
        let mut compositor = FrameCompositor::with_effects(16, 16, [0, 0, 0, 255], Vec::new());
        compositor.begin_drawing();
        compositor.draw(&RectangleShape::new(
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 1.0),
            [255, 0, 0, 255],
        ));
        compositor.set_view(View {
            center: Vec2::new(0.0, 0.0),
            size: Vec2::new(16.0, 16.0),
        });
        compositor.draw(&RectangleShape::new(
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 1.0),
            [0, 0, 255, 255],
        ));
        compositor.reset_view();
        let image = compositor.finish_drawing();

        assert_eq!(image.get(0, 0), Some([255, 0, 0, 255]));
        assert_eq!(image.get(8, 8), Some([0, 0, 255, 255]));
    }
}
