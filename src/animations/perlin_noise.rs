use super::{Animation, AnimationCore, Params, Schema};
use crate::generators::{hsv_to_rgb, Perlin3};
use crate::render::Canvas;

struct Config {
    scale: f64,
    octaves: u32,
    persistence: f64,
    lacunarity: f64,
    brightness: f64,
    color_mode: String,
}

impl Config {
    fn from_params(params: &Params) -> Self {
        Config {
            scale: params.number("scale", 0.02),
            octaves: params.number("octaves", 4.0).max(1.0) as u32,
            persistence: params.number("persistence", 0.5),
            lacunarity: params.number("lacunarity", 2.0),
            brightness: params.number("brightness", 1.0),
            color_mode: params.text("color_mode", "rainbow").to_string(),
        }
    }
}

/// Fractal gradient-noise field sampled per pixel, drifting along a
/// third noise axis over time. The permutation table is seeded once at
/// construction and survives reset.
pub struct PerlinNoiseField {
    core: AnimationCore,
    cfg: Config,
    noise: Perlin3,
}

impl PerlinNoiseField {
    pub fn new(width: usize, height: usize, overrides: Params) -> Self {
        let core = AnimationCore::new(width, height, Self::default_params(), overrides);
        let cfg = Config::from_params(&core.params);
        PerlinNoiseField {
            core,
            cfg,
            noise: Perlin3::new(),
        }
    }

    fn default_params() -> Params {
        Params::base_defaults()
            .with("scale", 0.02)
            .with("octaves", 4.0)
            .with("persistence", 0.5)
            .with("lacunarity", 2.0)
            .with("brightness", 1.0)
            .with("color_mode", "rainbow")
    }
}

impl Animation for PerlinNoiseField {
    fn kind(&self) -> &'static str {
        "perlin_noise"
    }

    fn core(&self) -> &AnimationCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut AnimationCore {
        &mut self.core
    }

    fn refresh_config(&mut self) {
        self.cfg = Config::from_params(&self.core.params);
    }

    fn render(&mut self, canvas: &mut Canvas) {
        let cfg = &self.cfg;
        let noise = &self.noise;
        let time_offset = self.core.elapsed * 0.0005;
        let hue_drift = self.core.elapsed * 0.001 * 0.02;

        canvas.fill_pixels(|x, y| {
            let n = noise.fractal(
                x as f64 * cfg.scale,
                y as f64 * cfg.scale,
                time_offset,
                cfg.octaves,
                cfg.persistence,
                cfg.lacunarity,
            );
            let v = (n + 1.0) * 0.5;

            match cfg.color_mode.as_str() {
                "rainbow" => {
                    let hue = (v + hue_drift).rem_euclid(1.0);
                    let value = (v * cfg.brightness).clamp(0.0, 1.0);
                    (value, hsv_to_rgb(hue, 0.9, value))
                }
                "fire" => {
                    // Heat ramp: red saturates first, then green, then blue
                    let heat = v * cfg.brightness;
                    let r = (heat * 3.0 * 255.0).min(255.0) as u8;
                    let g = ((heat * 3.0 - 1.0).max(0.0) * 255.0).min(255.0) as u8;
                    let b = ((heat * 3.0 - 2.0).max(0.0) * 255.0).min(255.0) as u8;
                    (heat.clamp(0.0, 1.0), (r, g, b))
                }
                _ => {
                    let value = (v * cfg.brightness).clamp(0.0, 1.0);
                    let gray = (value * 255.0).round() as u8;
                    (value, (gray, gray, gray))
                }
            }
        });
    }

    fn schema(&self) -> Schema {
        Schema::base()
            .range("scale", "Noise scale", 0.005, 0.1, 0.005)
            .range("octaves", "Octaves", 1.0, 8.0, 1.0)
            .range("persistence", "Persistence", 0.1, 0.9, 0.05)
            .range("lacunarity", "Lacunarity", 1.5, 3.5, 0.1)
            .range("brightness", "Brightness", 0.2, 2.0, 0.05)
            .select("color_mode", "Color mode", &["rainbow", "fire", "monochrome"])
    }
}
