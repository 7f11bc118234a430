use super::{Animation, AnimationCore, Params, Schema};
use crate::generators::hsv_to_rgb;
use crate::render::Canvas;

struct Config {
    wave1_freq: f64,
    wave2_freq: f64,
    wave1_speed: f64,
    wave2_speed: f64,
    color_mode: String,
}

impl Config {
    fn from_params(params: &Params) -> Self {
        Config {
            wave1_freq: params.number("wave1_freq", 0.15),
            wave2_freq: params.number("wave2_freq", 0.25),
            wave1_speed: params.number("wave1_speed", 2.0),
            wave2_speed: params.number("wave2_speed", 3.0),
            color_mode: params.text("color_mode", "rainbow").to_string(),
        }
    }
}

/// Two radial traveling waves summed per pixel — full-surface field
/// synthesis, written in one pass per frame.
pub struct WaveInterference {
    core: AnimationCore,
    cfg: Config,
}

impl WaveInterference {
    pub fn new(width: usize, height: usize, overrides: Params) -> Self {
        let core = AnimationCore::new(width, height, Self::default_params(), overrides);
        let cfg = Config::from_params(&core.params);
        WaveInterference { core, cfg }
    }

    fn default_params() -> Params {
        Params::base_defaults()
            .with("wave1_freq", 0.15)
            .with("wave2_freq", 0.25)
            .with("wave1_speed", 2.0)
            .with("wave2_speed", 3.0)
            .with("color_mode", "rainbow")
    }
}

impl Animation for WaveInterference {
    fn kind(&self) -> &'static str {
        "wave_interference"
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
        let t = self.core.elapsed * 0.001;
        let (cx, cy) = self.core.center;
        let cfg = &self.cfg;
        let rainbow = cfg.color_mode != "monochrome";

        canvas.fill_pixels(|x, y| {
            let dx = x as f64 - cx;
            let dy = y as f64 - cy;
            let dist = (dx * dx + dy * dy).sqrt();

            let wave1 = (dist * cfg.wave1_freq - t * cfg.wave1_speed).sin();
            let wave2 = (dist * cfg.wave2_freq - t * cfg.wave2_speed).sin();
            let v = ((wave1 + wave2) * 0.5 + 1.0) * 0.5;

            if rainbow {
                let hue = (v + t * 0.05).rem_euclid(1.0);
                (v, hsv_to_rgb(hue, 0.8, 0.9))
            } else {
                let g = (v * 255.0).round() as u8;
                (v, (g, g, g))
            }
        });
    }

    fn schema(&self) -> Schema {
        Schema::base()
            .range("wave1_freq", "Wave 1 frequency", 0.01, 0.5, 0.01)
            .range("wave2_freq", "Wave 2 frequency", 0.01, 0.5, 0.01)
            .range("wave1_speed", "Wave 1 speed", 0.0, 10.0, 0.1)
            .range("wave2_speed", "Wave 2 speed", 0.0, 10.0, 0.1)
            .select("color_mode", "Color mode", &["rainbow", "monochrome"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{ColorMode, RenderMode};

    #[test]
    fn test_center_pixel_depends_only_on_time() {
        // At distance 0 both wave terms reduce to functions of elapsed
        // time alone, so the center pixel is predictable.
        let mut canvas = Canvas::new(40, 20, RenderMode::HalfBlock, ColorMode::TrueColor);
        let mut anim = WaveInterference::new(canvas.width, canvas.height, Params::new());
        anim.play();
        for _ in 0..20 {
            anim.update(16.0);
        }
        anim.render(&mut canvas);

        let t = anim.core().elapsed * 0.001;
        let wave1 = (-t * 2.0).sin();
        let wave2 = (-t * 3.0).sin();
        let expected = ((wave1 + wave2) * 0.5 + 1.0) * 0.5;

        let (cx, cy) = anim.core().center;
        let idx = cy as usize * canvas.width + cx as usize;
        assert!((canvas.pixels[idx] - expected).abs() < 1e-9);
    }

    #[test]
    fn test_monochrome_output_is_gray() {
        let mut canvas = Canvas::new(20, 10, RenderMode::Ascii, ColorMode::TrueColor);
        let mut anim = WaveInterference::new(
            canvas.width,
            canvas.height,
            Params::new().with("color_mode", "monochrome"),
        );
        anim.render(&mut canvas);
        assert!(canvas.colors.iter().all(|&(r, g, b)| r == g && g == b));
    }

    #[test]
    fn test_unknown_color_mode_still_renders() {
        let mut canvas = Canvas::new(20, 10, RenderMode::Ascii, ColorMode::TrueColor);
        let mut anim = WaveInterference::new(
            canvas.width,
            canvas.height,
            Params::new().with("color_mode", "plasma"),
        );
        anim.render(&mut canvas);
        assert!(canvas.pixels.iter().any(|&v| v > 0.0));
    }
}
