//! (u, v, p) → colour lookups: solid colours, a procedural checkerboard, Perlin
//! turbulence ("marble"), and a nearest-pixel image sampler.

use crate::math::{Color, Point3};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

pub trait Texture: Send + Sync {
    fn value(&self, u: f64, v: f64, point: Point3) -> Color;
}

// ─── Solid Colour ───────────────────────────────────────────────────────────

pub struct SolidColor {
    pub color: Color,
}

impl SolidColor {
    pub const fn new(color: Color) -> Self {
        Self { color }
    }
}

impl Texture for SolidColor {
    fn value(&self, _u: f64, _v: f64, _point: Point3) -> Color {
        self.color
    }
}

impl From<Color> for Arc<dyn Texture> {
    fn from(color: Color) -> Self {
        Arc::new(SolidColor::new(color))
    }
}

// ─── Checkerboard ───────────────────────────────────────────────────────────

/// Sign of `sin(scale·x)·sin(scale·y)·sin(scale·z)` selects between two child
/// textures — a 3D checker pattern that needs no UV parameterization at all.
pub struct Checker {
    pub even: Arc<dyn Texture>,
    pub odd: Arc<dyn Texture>,
    pub scale: f64,
}

impl Checker {
    pub fn new(even: Arc<dyn Texture>, odd: Arc<dyn Texture>, scale: f64) -> Self {
        Self { even, odd, scale }
    }

    pub fn from_colors(even: Color, odd: Color, scale: f64) -> Self {
        Self::new(Arc::new(SolidColor::new(even)), Arc::new(SolidColor::new(odd)), scale)
    }
}

impl Texture for Checker {
    fn value(&self, u: f64, v: f64, point: Point3) -> Color {
        let sines = (self.scale * point.x).sin()
            * (self.scale * point.y).sin()
            * (self.scale * point.z).sin();
        if sines < 0.0 {
            self.odd.value(u, v, point)
        } else {
            self.even.value(u, v, point)
        }
    }
}

// ─── Perlin noise ───────────────────────────────────────────────────────────

/// 256 random unit vectors plus three 256-entry permutation tables, built
/// once via Fisher–Yates shuffle and read-only thereafter.
pub struct Perlin {
    random_vec: [Point3; Self::POINT_COUNT],
    perm_x: [i32; Self::POINT_COUNT],
    perm_y: [i32; Self::POINT_COUNT],
    perm_z: [i32; Self::POINT_COUNT],
}

impl Perlin {
    const POINT_COUNT: usize = 256;

    pub fn new(rng: &mut SmallRng) -> Self {
        let mut random_vec = [Point3::zero(); Self::POINT_COUNT];
        for v in random_vec.iter_mut() {
            *v = Point3::random_in(rng, -1.0, 1.0).normalized();
        }
        Self {
            random_vec,
            perm_x: Self::generate_permutation(rng),
            perm_y: Self::generate_permutation(rng),
            perm_z: Self::generate_permutation(rng),
        }
    }

    fn generate_permutation(rng: &mut SmallRng) -> [i32; Self::POINT_COUNT] {
        let mut p = [0i32; Self::POINT_COUNT];
        for (i, slot) in p.iter_mut().enumerate() {
            *slot = i as i32;
        }
        for i in (1..Self::POINT_COUNT).rev() {
            let target = rng.gen_range(0..=i);
            p.swap(i, target);
        }
        p
    }

    pub fn noise(&self, point: Point3) -> f64 {
        let u = point.x - point.x.floor();
        let v = point.y - point.y.floor();
        let w = point.z - point.z.floor();

        let i = point.x.floor() as i32;
        let j = point.y.floor() as i32;
        let k = point.z.floor() as i32;

        let mut colors = [[[Point3::zero(); 2]; 2]; 2];
        for (di, plane) in colors.iter_mut().enumerate() {
            for (dj, row) in plane.iter_mut().enumerate() {
                for (dk, cell) in row.iter_mut().enumerate() {
                    let idx = self.perm_x[((i + di as i32) & 255) as usize]
                        ^ self.perm_y[((j + dj as i32) & 255) as usize]
                        ^ self.perm_z[((k + dk as i32) & 255) as usize];
                    *cell = self.random_vec[idx as usize];
                }
            }
        }

        Self::trilinear_interpolate(colors, u, v, w)
    }

    fn trilinear_interpolate(colors: [[[Point3; 2]; 2]; 2], u: f64, v: f64, w: f64) -> f64 {
        // Hermitian cubic smoothing.
        let uu = u * u * (3.0 - 2.0 * u);
        let vv = v * v * (3.0 - 2.0 * v);
        let ww = w * w * (3.0 - 2.0 * w);
        let mut accum = 0.0;

        for (i, plane) in colors.iter().enumerate() {
            for (j, row) in plane.iter().enumerate() {
                for (k, cell) in row.iter().enumerate() {
                    let weight = Point3::new(u - i as f64, v - j as f64, w - k as f64);
                    let fi = i as f64;
                    let fj = j as f64;
                    let fk = k as f64;
                    accum += (fi * uu + (1.0 - fi) * (1.0 - uu))
                        * (fj * vv + (1.0 - fj) * (1.0 - vv))
                        * (fk * ww + (1.0 - fk) * (1.0 - ww))
                        * cell.dot(weight);
                }
            }
        }
        accum
    }

    /// Turbulence: a sum of noise octaves at halving amplitude and doubling
    /// frequency, absolute-valued so it reads as a ridged, marble-like field.
    pub fn turbulence(&self, point: Point3, depth: u32) -> f64 {
        let mut accum = 0.0;
        let mut temp = point;
        let mut weight = 1.0;
        for _ in 0..depth {
            accum += weight * self.noise(temp);
            weight *= 0.5;
            temp *= 2.0;
        }
        accum.abs()
    }
}

impl Default for Perlin {
    /// Seeds from a fixed constant — use `Perlin::new` with an explicit RNG
    /// for determinism tied to the render seed.
    fn default() -> Self {
        Self::new(&mut SmallRng::seed_from_u64(0x9e3779b9))
    }
}

// ─── Noise (marble) texture ─────────────────────────────────────────────────

pub struct Noise {
    pub noise: Perlin,
    pub scale: f64,
    pub depth: u32,
}

impl Noise {
    pub fn new(rng: &mut SmallRng, scale: f64) -> Self {
        Self { noise: Perlin::new(rng), scale, depth: 7 }
    }
}

impl Texture for Noise {
    fn value(&self, _u: f64, _v: f64, point: Point3) -> Color {
        Color::ones()
            * 0.5
            * (1.0 + (self.scale * point.z + 10.0 * self.noise.turbulence(point, self.depth)).sin())
    }
}

// ─── Image texture ──────────────────────────────────────────────────────────

/// Wraps a decoded RGB8 pixel buffer. Decoding bytes into pixels is out of
/// scope here (spec §1) — the caller supplies `width`, `height`, and a
/// `width * height * 3` RGB8 buffer (row-major, top-down). A missing/empty
/// buffer degrades to a fixed cyan debug colour rather than failing a lookup.
pub struct Image {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

const DEBUG_CYAN: Color = Color::new(0.0, 1.0, 1.0);

impl Image {
    /// Returns `None` (logged by the caller) if `pixels` doesn't match
    /// `width * height * 3`.
    pub fn new(width: usize, height: usize, pixels: Vec<u8>) -> Option<Self> {
        if pixels.len() != width * height * 3 || width == 0 || height == 0 {
            return None;
        }
        Some(Self { width, height, pixels })
    }
}

impl Texture for Image {
    fn value(&self, u: f64, v: f64, _point: Point3) -> Color {
        let u = u.clamp(0.0, 1.0);
        let v = 1.0 - v.clamp(0.0, 1.0);

        let mut i = (u * self.width as f64) as usize;
        let mut j = (v * self.height as f64) as usize;
        if i >= self.width {
            i = self.width - 1;
        }
        if j >= self.height {
            j = self.height - 1;
        }

        let idx = (j * self.width + i) * 3;
        let scale = 1.0 / 255.0;
        Color::new(
            self.pixels[idx] as f64 * scale,
            self.pixels[idx + 1] as f64 * scale,
            self.pixels[idx + 2] as f64 * scale,
        )
    }
}

/// Returned in place of a real `Image` texture when the byte loader failed —
/// keeps the cyan-debug-color contract (§7) without an `Option` at every
/// material call site.
pub struct MissingImage;

impl Texture for MissingImage {
    fn value(&self, _u: f64, _v: f64, _point: Point3) -> Color {
        DEBUG_CYAN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checker_alternates_sign_of_the_sine_product() {
        let checker = Checker::from_colors(Color::ones(), Color::zero(), 1.0);
        let near_origin = checker.value(0.0, 0.0, Point3::new(0.1, 0.1, 0.1));
        assert_eq!(near_origin, Color::ones());
    }

    #[test]
    fn missing_image_is_debug_cyan() {
        let tex = MissingImage;
        assert_eq!(tex.value(0.3, 0.7, Point3::zero()), DEBUG_CYAN);
    }

    #[test]
    fn image_rejects_mismatched_buffer() {
        assert!(Image::new(2, 2, vec![0u8; 5]).is_none());
    }

    #[test]
    fn image_samples_expected_pixel() {
        // 2x1 image: left pixel red, right pixel green.
        let pixels = vec![255, 0, 0, 0, 255, 0];
        let img = Image::new(2, 1, pixels).unwrap();
        let left = img.value(0.1, 0.5, Point3::zero());
        let right = img.value(0.9, 0.5, Point3::zero());
        assert!(left.x > 0.9 && left.y < 0.1);
        assert!(right.y > 0.9 && right.x < 0.1);
    }
}
