//! The drawing context that every painting and post-processing stage receives explicitly.

use raqote::{
    AntialiasMode, BlendMode, DrawOptions, DrawTarget, Image, PathBuilder, SolidSource, Source,
    StrokeStyle,
};

use crate::color::Rgb;
use crate::math::{clamp, pi, Affine};

/// An owned copy of a canvas's pixels, for drawing a canvas back onto itself.
#[derive(Debug, Clone)]
pub struct Snapshot {
    width: i32,
    height: i32,
    data: Vec<u32>,
}

impl Snapshot {
    /// Wraps `data`, which must hold `width * height` premultiplied pixels.
    pub fn new(width: u32, height: u32, data: Vec<u32>) -> Snapshot {
        debug_assert_eq!(data.len(), (width * height) as usize);
        Snapshot {
            width: width as i32,
            height: height as i32,
            data,
        }
    }

    fn image(&self) -> Image<'_> {
        Image {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }

    pub fn data(&self) -> &[u32] {
        &self.data
    }
}

/// Color channels of one stored pixel, as `[a, r, g, b]`.
///
/// Pixels are stored premultiplied. Every render fills its background opaquely before anything
/// else, so by the time a stage reads pixels the stored channels equal the straight color.
#[inline]
pub fn unpack(px: u32) -> [u8; 4] {
    px.to_be_bytes()
}

#[inline]
pub fn pack([a, r, g, b]: [u8; 4]) -> u32 {
    u32::from_be_bytes([a, r, g, b])
}

/// Converts a computed channel value to a byte the way an 8-bit canvas stores it: rounded half to
/// even, then clamped.
#[inline]
pub fn to_channel(value: f64) -> u8 {
    clamp(value.round_ties_even(), 0.0, 255.0) as u8
}

fn solid(color: Rgb, alpha: f64) -> Source<'static> {
    let Rgb(r, g, b) = color;
    Source::Solid(SolidSource::from_unpremultiplied_argb(
        to_channel(clamp(alpha, 0.0, 1.0) * 255.0),
        r,
        g,
        b,
    ))
}

fn options(alpha: f64, blend_mode: BlendMode) -> DrawOptions {
    DrawOptions {
        blend_mode,
        alpha: clamp(alpha, 0.0, 1.0) as f32,
        antialias: AntialiasMode::Gray,
    }
}

/// A raster surface plus the current transform.
///
/// Shape coordinates pass through the current transform; pixel access does not.
pub struct Canvas {
    dt: DrawTarget,
    transform: Affine,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Canvas {
        Canvas {
            dt: DrawTarget::new(width as i32, height as i32),
            transform: Affine::IDENTITY,
        }
    }

    pub fn width(&self) -> u32 {
        self.dt.width() as u32
    }

    pub fn height(&self) -> u32 {
        self.dt.height() as u32
    }

    pub fn transform(&self) -> Affine {
        self.transform
    }

    pub fn set_transform(&mut self, transform: Affine) {
        self.transform = transform;
        self.dt.set_transform(&transform.to_raqote());
    }

    /// Runs `draw` with `transform` in effect, then restores the previous transform.
    pub fn with_transform<R>(&mut self, transform: Affine, draw: impl FnOnce(&mut Canvas) -> R) -> R {
        let saved = self.transform;
        self.set_transform(transform);
        let result = draw(self);
        self.set_transform(saved);
        result
    }

    pub fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Rgb, alpha: f64) {
        if width <= 0.0 || height <= 0.0 {
            return;
        }
        let mut pb = PathBuilder::new();
        pb.rect(x as f32, y as f32, width as f32, height as f32);
        self.dt.fill(
            &pb.finish(),
            &solid(color, alpha),
            &options(1.0, BlendMode::SrcOver),
        );
    }

    pub fn fill_circle(&mut self, x: f64, y: f64, radius: f64, color: Rgb, alpha: f64) {
        if radius <= 0.0 {
            return;
        }
        let mut pb = PathBuilder::new();
        pb.move_to((x + radius) as f32, y as f32);
        pb.arc(x as f32, y as f32, radius as f32, 0.0, pi(2.0) as f32);
        pb.close();
        self.dt.fill(
            &pb.finish(),
            &solid(color, alpha),
            &options(1.0, BlendMode::SrcOver),
        );
    }

    /// Fills the closed polygon through `points`.
    pub fn fill_polygon(&mut self, points: &[(f64, f64)], color: Rgb, alpha: f64) {
        let Some((&(x0, y0), rest)) = points.split_first() else {
            return;
        };
        let mut pb = PathBuilder::new();
        pb.move_to(x0 as f32, y0 as f32);
        for &(x, y) in rest {
            pb.line_to(x as f32, y as f32);
        }
        pb.close();
        self.dt.fill(
            &pb.finish(),
            &solid(color, alpha),
            &options(1.0, BlendMode::SrcOver),
        );
    }

    pub fn stroke_line(
        &mut self,
        (x0, y0): (f64, f64),
        (x1, y1): (f64, f64),
        width: f64,
        color: Rgb,
        alpha: f64,
    ) {
        let mut pb = PathBuilder::new();
        pb.move_to(x0 as f32, y0 as f32);
        pb.line_to(x1 as f32, y1 as f32);
        let style = StrokeStyle {
            width: width as f32,
            ..StrokeStyle::default()
        };
        self.dt.stroke(
            &pb.finish(),
            &solid(color, alpha),
            &style,
            &options(1.0, BlendMode::SrcOver),
        );
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            width: self.dt.width(),
            height: self.dt.height(),
            data: self.dt.get_data().to_vec(),
        }
    }

    /// Overwrites `snapshot` with the current pixels, reusing its allocation.
    pub fn snapshot_into(&self, snapshot: &mut Snapshot) {
        snapshot.width = self.dt.width();
        snapshot.height = self.dt.height();
        snapshot.data.clear();
        snapshot.data.extend_from_slice(self.dt.get_data());
    }

    /// Draws `snapshot` at the origin through the current transform.
    pub fn draw_snapshot(&mut self, snapshot: &Snapshot, alpha: f64, blend_mode: BlendMode) {
        self.dt.draw_image_with_size_at(
            snapshot.width as f32,
            snapshot.height as f32,
            0.0,
            0.0,
            &snapshot.image(),
            &options(alpha, blend_mode),
        );
    }

    /// Fills the whole canvas, ignoring the current transform, with `source`.
    pub fn cover(&mut self, source: &Source, blend_mode: BlendMode) {
        let saved = self.transform;
        self.set_transform(Affine::IDENTITY);
        let (w, h) = (self.dt.width() as f32, self.dt.height() as f32);
        self.dt.fill_rect(0.0, 0.0, w, h, source, &options(1.0, blend_mode));
        self.set_transform(saved);
    }

    pub fn pixels(&self) -> &[u32] {
        self.dt.get_data()
    }

    pub fn pixels_mut(&mut self) -> &mut [u32] {
        self.dt.get_data_mut()
    }

    /// Straight `(r, g, b)` of the pixel at `(x, y)`.
    pub fn rgb_at(&self, x: u32, y: u32) -> Rgb {
        let [_, r, g, b] = unpack(self.dt.get_data()[(y * self.width() + x) as usize]);
        Rgb(r, g, b)
    }

    /// Scales the whole canvas into the `width` x `height` rectangle at the origin of `dest`, with
    /// bilinear smoothing. Whatever `dest` had in that rectangle is cleared first.
    pub fn resample_into(&self, dest: &mut DrawTarget, width: u32, height: u32) {
        let (w, h) = (width as f32, height as f32);
        dest.set_transform(&raqote::Transform::identity());
        dest.fill_rect(
            0.0,
            0.0,
            w,
            h,
            &Source::Solid(SolidSource::from_unpremultiplied_argb(0, 0, 0, 0)),
            &options(1.0, BlendMode::Src),
        );
        let snapshot = self.snapshot();
        dest.draw_image_with_size_at(w, h, 0.0, 0.0, &snapshot.image(), &DrawOptions::new());
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_pack_round_trip() {
        let px = pack([255, 10, 20, 30]);
        assert_eq!(px, 0xFF0A141E);
        assert_eq!(unpack(px), [255, 10, 20, 30]);
    }

    #[test]
    fn test_to_channel() {
        assert_eq!(to_channel(-4.0), 0);
        assert_eq!(to_channel(300.0), 255);
        assert_eq!(to_channel(2.5), 2);
        assert_eq!(to_channel(3.5), 4);
        assert_eq!(to_channel(100.4), 100);
    }

    #[test]
    fn test_fill_rect_is_opaque() {
        let mut canvas = Canvas::new(8, 6);
        canvas.fill_rect(0.0, 0.0, 8.0, 6.0, Rgb(200, 100, 50), 1.0);
        assert!(canvas.pixels().iter().all(|&px| px == 0xFFC86432));
        assert_eq!(canvas.rgb_at(7, 5), Rgb(200, 100, 50));
    }

    #[test]
    fn test_transform_is_restored() {
        let mut canvas = Canvas::new(20, 20);
        let moved = Affine::IDENTITY.translate(10.0, 10.0);
        canvas.with_transform(moved, |canvas| {
            canvas.fill_rect(0.0, 0.0, 4.0, 4.0, Rgb(255, 0, 0), 1.0);
            assert_eq!(canvas.transform(), moved);
        });
        assert_eq!(canvas.transform(), Affine::IDENTITY);
        assert_eq!(canvas.rgb_at(11, 11), Rgb(255, 0, 0));
        assert_eq!(unpack(canvas.pixels()[0])[0], 0);
    }

    #[test]
    fn test_snapshot_draw_with_alpha() {
        let mut canvas = Canvas::new(4, 4);
        canvas.fill_rect(0.0, 0.0, 4.0, 4.0, Rgb(0, 0, 0), 1.0);
        let black = canvas.snapshot();
        canvas.fill_rect(0.0, 0.0, 4.0, 4.0, Rgb(255, 255, 255), 1.0);
        canvas.draw_snapshot(&black, 0.5, BlendMode::SrcOver);
        let Rgb(r, _, _) = canvas.rgb_at(1, 1);
        assert!((120..=136).contains(&r), "got {r}");
    }

    #[test]
    fn test_resample_into_scales() {
        let mut canvas = Canvas::new(4, 4);
        canvas.fill_rect(0.0, 0.0, 4.0, 4.0, Rgb(0, 128, 255), 1.0);
        let mut dest = DrawTarget::new(10, 10);
        canvas.resample_into(&mut dest, 8, 8);
        let [a, r, g, b] = unpack(dest.get_data()[3 * 10 + 3]);
        assert_eq!((a, r, b), (255, 0, 255));
        assert!((126..=130).contains(&g));
        assert_eq!(unpack(dest.get_data()[9 * 10 + 9])[0], 0);
    }
}
