use std::f64::consts::PI;

#[inline(always)]
pub fn pi(v: f64) -> f64 {
    PI * v
}

/// Remainder with the sign of `m`, written as `((n % m) + m) % m` so that results agree with the
/// same expression evaluated anywhere else.
pub fn modulo(n: f64, m: f64) -> f64 {
    ((n % m) + m) % m
}

/// Like [`f64::clamp`], but never panics: `min` wins over `max` if they cross, and NaN maps to
/// `min`.
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    f64::min(max, f64::max(min, value))
}

pub fn lerp(alpha: f64, a: f64, b: f64) -> f64 {
    a + alpha * (b - a)
}

/// A hue angle in degrees, always normalized into `[0, 360)`.
///
/// Hue is circular: differences and averages must go around the wheel the short way, so this type
/// deliberately has no `Sub` or `Add` impls. Use [`Hue::delta_to`], [`Hue::rotate`] and
/// [`Hue::circular_mean`] instead.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd)]
pub struct Hue(f64);

impl Hue {
    pub fn new(degrees: f64) -> Hue {
        Hue(wrap_hue(degrees))
    }

    pub fn degrees(self) -> f64 {
        self.0
    }

    /// Signed shortest rotation from `self` to `to`, in `[-180, 180)`.
    pub fn delta_to(self, to: Hue) -> f64 {
        shortest_hue_delta(self.0, to.0)
    }

    pub fn rotate(self, degrees: f64) -> Hue {
        Hue::new(self.0 + degrees)
    }

    /// Mean direction of `hues` via unit-vector averaging. An empty input, or one whose vectors
    /// cancel out exactly, averages to `0`.
    pub fn circular_mean<I: IntoIterator<Item = Hue>>(hues: I) -> Hue {
        let (mut sum_x, mut sum_y, mut count) = (0.0, 0.0, 0usize);
        for hue in hues {
            let radians = hue.0 * PI / 180.0;
            sum_x += radians.cos();
            sum_y += radians.sin();
            count += 1;
        }
        if count == 0 {
            return Hue(0.0);
        }
        let avg_x = sum_x / count as f64;
        let avg_y = sum_y / count as f64;
        if avg_x == 0.0 && avg_y == 0.0 {
            return Hue(0.0);
        }
        Hue::new(avg_y.atan2(avg_x) * 180.0 / PI)
    }
}

pub fn wrap_hue(degrees: f64) -> f64 {
    let wrapped = modulo(degrees, 360.0);
    // `-1e-17 % 360 + 360` rounds to exactly 360.0.
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

pub fn shortest_hue_delta(from: f64, to: f64) -> f64 {
    ((to - from + 540.0) % 360.0) - 180.0
}

/// A 2D affine transform in canvas convention: `(x, y) -> (a*x + c*y + e, b*x + d*y + f)`.
///
/// Composition follows the canvas API: `t.translate(..)` etc. return a transform that applies the
/// new operation *first*, then `t`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Affine {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Default for Affine {
    fn default() -> Self {
        Affine::IDENTITY
    }
}

impl Affine {
    pub const IDENTITY: Affine = Affine {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    fn multiply(self, o: Affine) -> Affine {
        Affine {
            a: self.a * o.a + self.c * o.b,
            b: self.b * o.a + self.d * o.b,
            c: self.a * o.c + self.c * o.d,
            d: self.b * o.c + self.d * o.d,
            e: self.a * o.e + self.c * o.f + self.e,
            f: self.b * o.e + self.d * o.f + self.f,
        }
    }

    pub fn translate(self, x: f64, y: f64) -> Affine {
        self.multiply(Affine {
            e: x,
            f: y,
            ..Affine::IDENTITY
        })
    }

    pub fn rotate(self, radians: f64) -> Affine {
        let (sin, cos) = radians.sin_cos();
        self.multiply(Affine {
            a: cos,
            b: sin,
            c: -sin,
            d: cos,
            e: 0.0,
            f: 0.0,
        })
    }

    pub fn scale(self, sx: f64, sy: f64) -> Affine {
        self.multiply(Affine {
            a: sx,
            d: sy,
            ..Affine::IDENTITY
        })
    }

    pub fn apply(&self, (x, y): (f64, f64)) -> (f64, f64) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    pub fn to_raqote(self) -> raqote::Transform {
        raqote::Transform::new(
            self.a as f32,
            self.b as f32,
            self.c as f32,
            self.d as f32,
            self.e as f32,
            self.f as f32,
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_modulo() {
        let a = 4.0;
        let b = 3.0;
        let z = a % b;

        assert_eq!(modulo(a, b), z);
        assert_eq!(modulo(a + 10.0 * b, b), z);
        assert_eq!(modulo(a - 10.0 * b, b), z);
    }

    #[test]
    fn test_clamp_never_panics() {
        assert_eq!(clamp(5.0, 0.0, 1.0), 1.0);
        assert_eq!(clamp(-5.0, 0.0, 1.0), 0.0);
        assert_eq!(clamp(f64::NAN, 2.0, 3.0), 2.0);
        assert_eq!(clamp(0.5, 1.0, 0.0), 0.0);
    }

    #[test]
    fn test_hue_wraps() {
        assert_eq!(Hue::new(360.0).degrees(), 0.0);
        assert_eq!(Hue::new(-10.0).degrees(), 350.0);
        assert_eq!(Hue::new(725.0).degrees(), 5.0);
        assert_eq!(Hue::new(-1e-17).degrees(), 0.0);
    }

    #[test]
    fn test_hue_delta_is_shortest() {
        assert_eq!(Hue::new(350.0).delta_to(Hue::new(10.0)), 20.0);
        assert_eq!(Hue::new(10.0).delta_to(Hue::new(350.0)), -20.0);
        assert_eq!(Hue::new(0.0).delta_to(Hue::new(180.0)), -180.0);
        assert_eq!(Hue::new(90.0).rotate(300.0).degrees(), 30.0);
    }

    #[test]
    fn test_circular_mean_across_zero() {
        let mean = Hue::circular_mean([Hue::new(350.0), Hue::new(10.0)]);
        assert!(mean.degrees() < 1e-9 || mean.degrees() > 360.0 - 1e-9);
        assert_eq!(Hue::circular_mean([]), Hue::new(0.0));
        let mean = Hue::circular_mean([Hue::new(80.0), Hue::new(100.0)]);
        assert!((mean.degrees() - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_affine_follows_canvas_order() {
        // translate, then rotate a quarter turn: local (1, 0) lands at (10, 21).
        let t = Affine::IDENTITY.translate(10.0, 20.0).rotate(pi(0.5));
        let (x, y) = t.apply((1.0, 0.0));
        assert!((x - 10.0).abs() < 1e-12 && (y - 21.0).abs() < 1e-12);

        let t = Affine::IDENTITY.scale(2.0, 3.0).translate(1.0, 1.0);
        assert_eq!(t.apply((0.0, 0.0)), (2.0, 3.0));
    }
}
