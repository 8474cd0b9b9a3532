//! Noise sources producing binary cell values for seeding and resampling.
//!
//! Two strategies are available:
//! - `Uniform`: Bernoulli draw with probability `0.5 + offset`
//! - `Gradient`: Bernoulli draw whose probability follows a coherent Perlin
//!   field sampled at `(x / width * k, y / height * k)`, shifted by `offset`

use rand::prelude::*;

use crate::schema::{NoiseConfig, NoiseKind};

/// Classic 2D gradient noise with a seeded permutation table.
#[derive(Debug, Clone)]
pub struct PerlinNoise {
    perm: [u8; 512],
}

impl PerlinNoise {
    /// Build the permutation table from a random source.
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut table: Vec<u8> = (0..=255u8).collect();
        table.shuffle(rng);

        let mut perm = [0u8; 512];
        for (i, p) in perm.iter_mut().enumerate() {
            *p = table[i & 255];
        }
        Self { perm }
    }

    /// Deterministic field for a given seed.
    pub fn from_seed(seed: u64) -> Self {
        Self::new(&mut StdRng::seed_from_u64(seed))
    }

    /// Evaluate the field. Output lies in roughly [-1, 1] and is 0 on integer lattice points.
    pub fn get(&self, x: f64, y: f64) -> f64 {
        let x0 = x.floor();
        let y0 = y.floor();
        let xi = (x0 as i64 & 255) as usize;
        let yi = (y0 as i64 & 255) as usize;
        let xf = x - x0;
        let yf = y - y0;

        let u = fade(xf);
        let v = fade(yf);

        let p = &self.perm;
        let a = p[xi] as usize + yi;
        let b = p[xi + 1] as usize + yi;

        let n00 = grad(p[a], xf, yf);
        let n10 = grad(p[b], xf - 1.0, yf);
        let n01 = grad(p[a + 1], xf, yf - 1.0);
        let n11 = grad(p[b + 1], xf - 1.0, yf - 1.0);

        lerp(lerp(n00, n10, u), lerp(n01, n11, u), v)
    }
}

#[inline]
fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + t * (b - a)
}

#[inline]
fn grad(hash: u8, x: f64, y: f64) -> f64 {
    match hash & 7 {
        0 => x + y,
        1 => -x + y,
        2 => x - y,
        3 => -x - y,
        4 => x,
        5 => -x,
        6 => y,
        _ => -y,
    }
}

/// Active noise strategy with its parameters.
#[derive(Debug, Clone)]
pub enum NoiseVariant {
    Uniform,
    Gradient { field: PerlinNoise, frequency: f32 },
}

impl NoiseVariant {
    pub fn kind(&self) -> NoiseKind {
        match self {
            NoiseVariant::Uniform => NoiseKind::Uniform,
            NoiseVariant::Gradient { .. } => NoiseKind::Gradient,
        }
    }
}

/// Binary noise source with a live probability offset.
#[derive(Debug, Clone)]
pub struct NoiseSource {
    variant: NoiseVariant,
    offset: f32,
    frequency: f32,
    width: usize,
    height: usize,
    rng: StdRng,
}

impl NoiseSource {
    /// Create a source for a `width`×`height` grid.
    pub fn new(config: &NoiseConfig, width: usize, height: usize) -> Self {
        let seed = config.seed.unwrap_or_else(rand::random);
        let offset = if config.offset.is_finite() {
            config.offset
        } else {
            log::warn!("Non-finite noise offset {}, using 0", config.offset);
            0.0
        };
        let frequency = if config.frequency.is_finite() && config.frequency > 0.0 {
            config.frequency
        } else {
            log::warn!("Invalid noise frequency {}, using 1", config.frequency);
            1.0
        };
        let mut source = Self {
            variant: NoiseVariant::Uniform,
            offset,
            frequency,
            width,
            height,
            rng: StdRng::seed_from_u64(seed),
        };
        source.set_kind(config.variant);
        source
    }

    /// Draw a binary value for the cell at (x, y).
    pub fn sample(&mut self, x: usize, y: usize) -> u8 {
        let p = self.probability(x, y);
        u8::from(self.rng.gen_bool(f64::from(p)))
    }

    /// Probability of drawing a 1 at (x, y), clamped to [0, 1]. NaN maps to 0.5.
    pub fn probability(&self, x: usize, y: usize) -> f32 {
        let p = match &self.variant {
            NoiseVariant::Uniform => 0.5 + self.offset,
            NoiseVariant::Gradient { field, frequency } => {
                let k = f64::from(*frequency);
                let fx = x as f64 / self.width.max(1) as f64 * k;
                let fy = y as f64 / self.height.max(1) as f64 * k;
                let n = field.get(fx, fy) as f32 + self.offset;
                (n + 1.0) * 0.5
            }
        };
        if p.is_nan() {
            0.5
        } else {
            p.clamp(0.0, 1.0)
        }
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Set the probability offset. Non-finite values are ignored.
    pub fn set_offset(&mut self, offset: f32) {
        if !offset.is_finite() {
            log::warn!("Ignoring non-finite noise offset {}", offset);
            return;
        }
        self.offset = offset;
    }

    pub fn kind(&self) -> NoiseKind {
        self.variant.kind()
    }

    /// Switch strategy by name. Unknown names select `Uniform`.
    pub fn select_variant(&mut self, name: &str) -> NoiseKind {
        let kind = NoiseKind::from_name(name);
        self.set_kind(kind);
        kind
    }

    /// Switch strategy. A new gradient field is drawn each time `Gradient` is selected.
    pub fn set_kind(&mut self, kind: NoiseKind) {
        self.variant = match kind {
            NoiseKind::Uniform => NoiseVariant::Uniform,
            NoiseKind::Gradient => NoiseVariant::Gradient {
                field: PerlinNoise::new(&mut self.rng),
                frequency: self.frequency,
            },
        };
    }

    /// Track new grid dimensions for gradient coordinates.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
    }
}
