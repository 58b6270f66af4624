/// One scrolling background layer. Two copies are drawn side by side, at
/// `offset` and `offset + tile_width`, so the strip never shows a gap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParallaxLayer {
    pub offset: f32,
    /// pixels / s, the layer moves left
    pub speed: f32,
    /// on-screen width of one copy (texture width * background scale)
    pub tile_width: f32,
}

impl ParallaxLayer {
    pub fn new(speed: f32, tile_width: f32) -> Self {
        ParallaxLayer {
            offset: 0.0,
            speed,
            tile_width,
        }
    }

    pub fn scroll(&mut self, delta: f32) {
        self.offset -= self.speed * delta;
        if self.offset <= -self.tile_width {
            self.offset = 0.0;
        }
    }

    /// x of both copies, left one first
    pub fn tile_positions(&self) -> [f32; 2] {
        [self.offset, self.offset + self.tile_width]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_wraps_to_zero_after_one_tile() {
        // texture 64px drawn at scale 2, 32 px/s : one tile every 4 seconds
        let texture_width = 64.0;
        let speed = 32.0;
        let mut layer = ParallaxLayer::new(speed, 2.0 * texture_width);
        let delta = 0.25;
        let steps = (2.0 * texture_width / speed / delta) as usize;

        for step in 1..steps {
            layer.scroll(delta);
            assert_eq!(layer.offset, -(step as f32) * speed * delta);
        }
        layer.scroll(delta);
        assert_eq!(layer.offset, 0.0);
    }

    #[test]
    fn copies_are_one_tile_apart() {
        let mut layer = ParallaxLayer::new(20.0, 544.0);
        layer.scroll(1.5);
        assert_eq!(layer.tile_positions(), [-30.0, 514.0]);
    }

    #[test]
    fn stopped_layer_stays_put() {
        let mut layer = ParallaxLayer::new(0.0, 544.0);
        for _ in 0..10 {
            layer.scroll(1.0 / 60.0);
        }
        assert_eq!(layer.offset, 0.0);
    }
}
