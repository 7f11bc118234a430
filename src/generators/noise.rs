use rand::RngExt;

/// Classic improved Perlin gradient noise in three dimensions.
///
/// The permutation table is a random shuffle of 0..=255 duplicated to
/// length 512 so indexing never wraps. It is generated once per instance
/// and never re-seeded afterwards — two instances produce different
/// fields, one instance is stable for its whole lifetime.
pub struct Perlin3 {
    perm: [u8; 512],
}

impl Perlin3 {
    pub fn new() -> Self {
        let mut rng = rand::rng();
        let mut p: [u8; 256] = std::array::from_fn(|i| i as u8);
        // Fisher-Yates
        for i in (1..256).rev() {
            let j = rng.random_range(0..=i);
            p.swap(i, j);
        }
        let mut perm = [0u8; 512];
        for i in 0..512 {
            perm[i] = p[i & 255];
        }
        Perlin3 { perm }
    }

    /// Single-octave noise, output in [-1, 1].
    pub fn noise(&self, x: f64, y: f64, z: f64) -> f64 {
        let xi = (x.floor() as i64 & 255) as usize;
        let yi = (y.floor() as i64 & 255) as usize;
        let zi = (z.floor() as i64 & 255) as usize;

        let xf = x - x.floor();
        let yf = y - y.floor();
        let zf = z - z.floor();

        let u = fade(xf);
        let v = fade(yf);
        let w = fade(zf);

        let p = &self.perm;
        let a = p[xi] as usize + yi;
        let aa = p[a] as usize + zi;
        let ab = p[a + 1] as usize + zi;
        let b = p[xi + 1] as usize + yi;
        let ba = p[b] as usize + zi;
        let bb = p[b + 1] as usize + zi;

        lerp(
            w,
            lerp(
                v,
                lerp(
                    u,
                    grad(p[aa], xf, yf, zf),
                    grad(p[ba], xf - 1.0, yf, zf),
                ),
                lerp(
                    u,
                    grad(p[ab], xf, yf - 1.0, zf),
                    grad(p[bb], xf - 1.0, yf - 1.0, zf),
                ),
            ),
            lerp(
                v,
                lerp(
                    u,
                    grad(p[aa + 1], xf, yf, zf - 1.0),
                    grad(p[ba + 1], xf - 1.0, yf, zf - 1.0),
                ),
                lerp(
                    u,
                    grad(p[ab + 1], xf, yf - 1.0, zf - 1.0),
                    grad(p[bb + 1], xf - 1.0, yf - 1.0, zf - 1.0),
                ),
            ),
        )
    }

    /// Multi-octave fractal noise. Each octave multiplies frequency by
    /// `lacunarity` and amplitude by `persistence`; the sum is normalized
    /// by total amplitude so output stays in [-1, 1].
    pub fn fractal(
        &self,
        x: f64,
        y: f64,
        z: f64,
        octaves: u32,
        persistence: f64,
        lacunarity: f64,
    ) -> f64 {
        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        let mut max_amplitude = 0.0;
        for _ in 0..octaves.max(1) {
            total += self.noise(x * frequency, y * frequency, z * frequency) * amplitude;
            max_amplitude += amplitude;
            amplitude *= persistence;
            frequency *= lacunarity;
        }
        total / max_amplitude
    }
}

/// Smootherstep fade curve 6t^5 - 15t^4 + 10t^3.
#[inline]
fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(t: f64, a: f64, b: f64) -> f64 {
    a + t * (b - a)
}

/// Hashed 16-way gradient selection, matching the canonical reference:
/// bits 0-1 pick and negate components, hashes 12 and 14 reuse x on the
/// diagonal.
#[inline]
fn grad(hash: u8, x: f64, y: f64, z: f64) -> f64 {
    let h = hash & 15;
    let u = if h < 8 { x } else { y };
    let v = if h < 4 {
        y
    } else if h == 12 || h == 14 {
        x
    } else {
        z
    };
    (if h & 1 == 0 { u } else { -u }) + (if h & 2 == 0 { v } else { -v })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noise_stays_in_range() {
        let perlin = Perlin3::new();
        for i in 0..2000 {
            let t = i as f64 * 0.173;
            let n = perlin.noise(t * 0.31, t * 0.17, t * 0.07);
            assert!((-1.0..=1.0).contains(&n), "noise out of range: {}", n);
        }
    }

    #[test]
    fn test_fractal_stays_in_range() {
        let perlin = Perlin3::new();
        for octaves in 1..=8 {
            for i in 0..500 {
                let t = i as f64 * 0.29;
                let n = perlin.fractal(t * 0.13, t * 0.41, t * 0.05, octaves, 0.5, 2.0);
                assert!(
                    (-1.0..=1.0).contains(&n),
                    "fractal noise out of range at {} octaves: {}",
                    octaves,
                    n
                );
            }
        }
    }

    #[test]
    fn test_noise_is_deterministic_per_instance() {
        let perlin = Perlin3::new();
        let a = perlin.noise(1.5, 2.5, 3.5);
        let b = perlin.noise(1.5, 2.5, 3.5);
        assert_eq!(a, b);
    }

    #[test]
    fn test_noise_is_zero_on_lattice_points() {
        // Gradient noise vanishes at integer coordinates.
        let perlin = Perlin3::new();
        assert_eq!(perlin.noise(3.0, 7.0, 11.0), 0.0);
    }

    #[test]
    fn test_fade_endpoints() {
        assert_eq!(fade(0.0), 0.0);
        assert_eq!(fade(1.0), 1.0);
    }
}
