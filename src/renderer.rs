use crate::world::{Rgba, World};

#[inline]
fn pack_rgb(r: u8, g: u8, b: u8) -> u32 {
    // BGRA8 in little-endian memory
    (b as u32) | ((g as u32) << 8) | ((r as u32) << 16)
    // Alpha at 0
}

#[inline]
fn blend_channel(src: u8, dst: u8, a: u32) -> u8 {
    // (src * a + dst * (255 - a)) / 255, rounded
    let v = src as u32 * a + dst as u32 * (255 - a) + 127;
    (v / 255) as u8
}

/// Source-over blend of `src` onto a packed pixel.
#[inline]
fn blend_over(dst: u32, src: Rgba) -> u32 {
    match src.a {
        255 => pack_rgb(src.r, src.g, src.b),
        0 => dst,
        a => {
            let a = a as u32;
            let (dr, dg, db) = ((dst >> 16) as u8, (dst >> 8) as u8, dst as u8);
            pack_rgb(
                blend_channel(src.r, dr, a),
                blend_channel(src.g, dg, a),
                blend_channel(src.b, db, a),
            )
        }
    }
}

/// The drawing capability a frame needs.
pub trait Canvas {
    fn clear(&mut self, color: Rgba);
    fn fill_circle(&mut self, center: [i32; 2], radius: i32, color: Rgba);
}

/// Draws one frame of `world`. Sectors without a four-component color are
/// skipped.
pub fn draw_world<C: Canvas>(canvas: &mut C, world: &World, background: Rgba, radius: i32) {
    canvas.clear(background);

    for sector in world.sectors() {
        let Some(color) = sector.color() else {
            continue;
        };
        for center in sector.centers() {
            canvas.fill_circle(center, radius, color);
        }
    }
}

/// CPU framebuffer in softbuffer's 0RGB layout.
pub struct Framebuffer {
    pixels: Vec<u32>,
    width: usize,
    height: usize,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            pixels: vec![0; width * height],
            width,
            height,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    #[cfg(test)]
    fn pixel(&self, x: usize, y: usize) -> u32 {
        self.pixels[y * self.width + x]
    }
}

impl Canvas for Framebuffer {
    fn clear(&mut self, color: Rgba) {
        self.pixels.fill(pack_rgb(color.r, color.g, color.b));
    }

    fn fill_circle(&mut self, center: [i32; 2], radius: i32, color: Rgba) {
        if radius < 0 || self.width == 0 || self.height == 0 {
            return;
        }
        let [cx, cy] = center;
        let r2 = radius as i64 * radius as i64;

        // Clip the bounding box to the buffer
        let y0 = cy.saturating_sub(radius).max(0);
        let y1 = cy.saturating_add(radius).min(self.height as i32 - 1);
        let x0 = cx.saturating_sub(radius).max(0);
        let x1 = cx.saturating_add(radius).min(self.width as i32 - 1);
        if x0 > x1 || y0 > y1 {
            return; // off-screen
        }

        for y in y0..=y1 {
            let dy = y as i64 - cy as i64;
            let row = y as usize * self.width;
            for x in x0..=x1 {
                let dx = x as i64 - cx as i64;
                if dx * dx + dy * dy <= r2 {
                    let idx = row + x as usize;
                    self.pixels[idx] = blend_over(self.pixels[idx], color);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::Sector;

    #[derive(Default)]
    struct Recorder {
        clears: Vec<Rgba>,
        circles: Vec<([i32; 2], i32, Rgba)>,
    }

    impl Canvas for Recorder {
        fn clear(&mut self, color: Rgba) {
            self.clears.push(color);
        }

        fn fill_circle(&mut self, center: [i32; 2], radius: i32, color: Rgba) {
            self.circles.push((center, radius, color));
        }
    }

    const RED: Rgba = Rgba::new(255, 0, 0, 255);

    #[test]
    fn two_red_circles() {
        let world = World::new(vec![Sector::new(vec![1, 2, 3, 4], vec![255, 0, 0, 255])]);
        let mut rec = Recorder::default();
        draw_world(&mut rec, &world, Rgba::BLACK, 10);

        assert_eq!(rec.clears, vec![Rgba::BLACK]);
        assert_eq!(rec.circles, vec![([1, 2], 10, RED), ([3, 4], 10, RED)]);
    }

    #[test]
    fn bad_color_count_draws_nothing() {
        let world = World::new(vec![
            Sector::new(vec![5], vec![1, 2, 3]),
            Sector::new(vec![1, 1, 2, 2], vec![1, 2, 3, 4, 5]),
            Sector::new(vec![1, 1], vec![]),
        ]);
        let mut rec = Recorder::default();
        draw_world(&mut rec, &world, Rgba::BLACK, 10);

        assert_eq!(rec.clears.len(), 1);
        assert!(rec.circles.is_empty());
    }

    #[test]
    fn odd_points_draw_floor_half() {
        let world = World::new(vec![Sector::new(vec![1, 2, 3, 4, 5, 6, 7], vec![0, 0, 0, 255])]);
        let mut rec = Recorder::default();
        draw_world(&mut rec, &world, Rgba::BLACK, 10);

        assert_eq!(rec.circles.len(), 3);
        assert_eq!(rec.circles.len(), world.draw_count());
    }

    #[test]
    fn sectors_drawn_in_order() {
        let blue = Rgba::new(0, 0, 255, 255);
        let world = World::new(vec![
            Sector::new(vec![10, 10], vec![255, 0, 0, 255]),
            Sector::new(vec![10, 10], vec![0, 0, 255, 255]),
        ]);
        let mut rec = Recorder::default();
        draw_world(&mut rec, &world, Rgba::BLACK, 10);

        let colors: Vec<Rgba> = rec.circles.iter().map(|c| c.2).collect();
        assert_eq!(colors, vec![RED, blue]);

        // Later sectors paint over earlier ones
        let mut fb = Framebuffer::new(20, 20);
        draw_world(&mut fb, &world, Rgba::BLACK, 10);
        assert_eq!(fb.pixel(10, 10), pack_rgb(0, 0, 255));
    }

    #[test]
    fn circle_coverage() {
        let mut fb = Framebuffer::new(40, 40);
        fb.clear(Rgba::BLACK);
        fb.fill_circle([20, 20], 10, RED);

        let red = pack_rgb(255, 0, 0);
        assert_eq!(fb.pixel(20, 20), red);
        assert_eq!(fb.pixel(30, 20), red);
        assert_eq!(fb.pixel(20, 10), red);
        assert_eq!(fb.pixel(31, 20), 0);
        // corner of the bounding box lies outside the circle
        assert_eq!(fb.pixel(29, 29), 0);
    }

    #[test]
    fn circle_clipped_at_edges() {
        let mut fb = Framebuffer::new(16, 16);
        fb.clear(Rgba::BLACK);
        fb.fill_circle([0, 0], 10, RED);
        fb.fill_circle([-100, 5000], 10, RED);
        fb.fill_circle([i32::MAX, i32::MIN], 10, RED);

        assert_eq!(fb.pixel(0, 0), pack_rgb(255, 0, 0));
        assert_eq!(fb.pixel(15, 15), 0);
    }

    #[test]
    fn alpha_blends_over_background() {
        let mut fb = Framebuffer::new(4, 4);
        fb.clear(Rgba::BLACK);
        fb.fill_circle([1, 1], 0, Rgba::new(255, 255, 255, 128));
        assert_eq!(fb.pixel(1, 1), pack_rgb(128, 128, 128));

        fb.fill_circle([2, 2], 0, Rgba::new(255, 255, 255, 0));
        assert_eq!(fb.pixel(2, 2), 0);
    }
}
