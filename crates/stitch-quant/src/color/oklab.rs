//! OKLab, the space every color comparison in this crate happens in.
//!
//! Matrices follow Björn Ottosson's 2021-01-25 revision
//! (<https://bottosson.github.io/posts/oklab/>). Exported hex colors depend
//! on these exact constants.

use super::linear_rgb::LinearRgb;

/// Lightness weight used by every perceptual comparison in this crate.
///
/// The lightness difference is multiplied by this factor before squaring, so
/// hue and chroma differences count for relatively less.
pub const LIGHTNESS_WEIGHT: f32 = 1.35;

/// Perceptual color: `l` lightness, `a` green (-) to red (+), `b` blue (-)
/// to yellow (+).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Oklab {
    pub l: f32,
    pub a: f32,
    pub b: f32,
}

impl Oklab {
    #[inline]
    pub fn new(l: f32, a: f32, b: f32) -> Self {
        Self { l, a, b }
    }

    /// Squared Euclidean distance with the lightness difference scaled by
    /// `wl` before squaring.
    ///
    /// # Example
    ///
    /// ```
    /// use stitch_quant::Oklab;
    ///
    /// let dark = Oklab::new(0.2, 0.0, 0.0);
    /// let light = Oklab::new(0.7, 0.0, 0.0);
    /// assert!((dark.distance_sq_weighted(light, 2.0) - 1.0).abs() < 1e-6);
    /// ```
    #[inline]
    pub fn distance_sq_weighted(self, other: Oklab, wl: f32) -> f32 {
        let dl = (self.l - other.l) * wl;
        let da = self.a - other.a;
        let db = self.b - other.b;
        dl * dl + da * da + db * db
    }

    /// [`distance_sq_weighted`](Self::distance_sq_weighted) with
    /// [`LIGHTNESS_WEIGHT`].
    #[inline]
    pub fn perceptual_distance_sq(self, other: Oklab) -> f32 {
        self.distance_sq_weighted(other, LIGHTNESS_WEIGHT)
    }

    /// Chroma (distance from the neutral axis).
    #[inline]
    pub fn chroma(self) -> f32 {
        (self.a * self.a + self.b * self.b).sqrt()
    }
}

impl From<LinearRgb> for Oklab {
    fn from(rgb: LinearRgb) -> Self {
        // cone response
        let lms = [
            0.4122214708 * rgb.r + 0.5363325363 * rgb.g + 0.0514459929 * rgb.b,
            0.2119034982 * rgb.r + 0.6806995451 * rgb.g + 0.1073969566 * rgb.b,
            0.0883024619 * rgb.r + 0.2817188376 * rgb.g + 0.6299787005 * rgb.b,
        ];
        let [lc, mc, sc] = lms.map(f32::cbrt);

        Self {
            l: 0.2104542553 * lc + 0.7936177850 * mc - 0.0040720468 * sc,
            a: 1.9779984951 * lc - 2.4285922050 * mc + 0.4505937099 * sc,
            b: 0.0259040371 * lc + 0.7827717662 * mc - 0.8086757660 * sc,
        }
    }
}

impl From<Oklab> for LinearRgb {
    /// Unclamped; out-of-gamut inputs give components outside `0..=1`.
    fn from(lab: Oklab) -> Self {
        let lms_c = [
            lab.l + 0.3963377774 * lab.a + 0.2158037573 * lab.b,
            lab.l - 0.1055613458 * lab.a - 0.0638541728 * lab.b,
            lab.l - 0.0894841775 * lab.a - 1.2914855480 * lab.b,
        ];
        let [l, m, s] = lms_c.map(|v| v * v * v);

        LinearRgb {
            r: 4.0767416621 * l - 3.3077115913 * m + 0.2309699292 * s,
            g: -1.2684380046 * l + 2.6097574011 * m - 0.3413193965 * s,
            b: -0.0041960863 * l - 0.7034186147 * m + 1.7076147010 * s,
        }
    }
}
