use super::{Animation, AnimationCore, Params, Schema};
use crate::generators::{escape_time, hsv_to_rgb, FractalKind};
use crate::render::Canvas;

struct Config {
    kind: FractalKind,
    max_iterations: u32,
    zoom_speed: f64,
    contrast: f64,
    color_mode: String,
    center_x: f64,
    center_y: f64,
}

impl Config {
    fn from_params(params: &Params) -> Self {
        Config {
            kind: FractalKind::from_name(params.text("fractal_type", "mandelbrot")),
            max_iterations: params.number("max_iterations", 100.0).max(1.0) as u32,
            zoom_speed: params.number("zoom_speed", 5.0),
            contrast: params.number("contrast", 1.0),
            color_mode: params.text("color_mode", "rainbow").to_string(),
            center_x: params.number("center_x", -0.5),
            center_y: params.number("center_y", 0.0),
        }
    }
}

/// Escape-time fractal with continuous exponential zoom and cycling
/// colors. `core.center` holds the complex-plane center here, not a
/// pixel position.
pub struct Fractal {
    core: AnimationCore,
    cfg: Config,
    zoom: f64,
    color_offset: f64,
}

impl Fractal {
    pub fn new(width: usize, height: usize, overrides: Params) -> Self {
        let mut core = AnimationCore::new(width, height, Self::default_params(), overrides);
        let cfg = Config::from_params(&core.params);
        core.center = (cfg.center_x, cfg.center_y);
        Fractal {
            core,
            cfg,
            zoom: 1.0,
            color_offset: 0.0,
        }
    }

    fn default_params() -> Params {
        Params::base_defaults()
            .with("fractal_type", "mandelbrot")
            .with("max_iterations", 100.0)
            .with("zoom_speed", 5.0)
            .with("contrast", 1.0)
            .with("color_mode", "rainbow")
            .with("center_x", -0.5)
            .with("center_y", 0.0)
    }

    fn colorize(&self, smooth: f64) -> (f64, (u8, u8, u8)) {
        let t = (smooth / self.cfg.max_iterations as f64) * self.cfg.contrast;
        match self.cfg.color_mode.as_str() {
            "rainbow" => {
                let hue = (t * 3.0 + self.color_offset).rem_euclid(1.0);
                let value = (1.0 - t * 0.3).clamp(0.5, 1.0);
                (value * 0.9, hsv_to_rgb(hue, 0.8, value))
            }
            "fire" => {
                let r = ((t * 2.0).min(1.0) * 255.0) as u8;
                let g = (t.powf(1.5).min(1.0) * 200.0) as u8;
                let b = (t.powi(3).min(1.0) * 90.0) as u8;
                (t.min(1.0), (r, g, b))
            }
            "ocean" => {
                let r = (t.powf(2.5).min(1.0) * 80.0) as u8;
                let g = (t.powf(1.3).min(1.0) * 200.0) as u8;
                let b = ((t * 2.5).min(1.0) * 255.0) as u8;
                (t.min(1.0), (r, g, b))
            }
            _ => {
                let v = t.min(1.0);
                let gray = (v * 255.0).round() as u8;
                (v, (gray, gray, gray))
            }
        }
    }
}

impl Animation for Fractal {
    fn kind(&self) -> &'static str {
        "fractal"
    }

    fn core(&self) -> &AnimationCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut AnimationCore {
        &mut self.core
    }

    fn refresh_config(&mut self) {
        self.cfg = Config::from_params(&self.core.params);
        self.core.center = (self.cfg.center_x, self.cfg.center_y);
    }

    fn step(&mut self, delta: f64) {
        // Multiplicative zoom: exponential zoom-in over time
        self.zoom *= 1.0 + self.cfg.zoom_speed * 0.01 * delta * 0.001;
        self.color_offset += delta * 0.001 * 0.2;
    }

    fn render(&mut self, canvas: &mut Canvas) {
        let w = self.core.width as f64;
        let h = self.core.height as f64;
        let scale = 4.0 / (self.zoom * w.min(h));
        let (center_x, center_y) = self.core.center;
        let cfg_kind = self.cfg.kind;
        let max_iterations = self.cfg.max_iterations;

        canvas.fill_pixels(|x, y| {
            let cr = (x as f64 - w / 2.0) * scale + center_x;
            let ci = (y as f64 - h / 2.0) * scale + center_y;
            match escape_time(cfg_kind, cr, ci, max_iterations) {
                // Inside the set: pure black
                None => (0.0, (0, 0, 0)),
                Some(smooth) => self.colorize(smooth),
            }
        });
    }

    fn on_reset(&mut self) {
        self.zoom = 1.0;
        self.color_offset = 0.0;
        self.core.center = (self.cfg.center_x, self.cfg.center_y);
    }

    fn schema(&self) -> Schema {
        Schema::base()
            .select("fractal_type", "Fractal", &["mandelbrot", "julia", "burning_ship"])
            .range("max_iterations", "Max iterations", 20.0, 300.0, 10.0)
            .range("zoom_speed", "Zoom speed", 0.0, 20.0, 0.5)
            .range("contrast", "Contrast", 0.2, 3.0, 0.1)
            .select("color_mode", "Color mode", &["rainbow", "fire", "ocean", "monochrome"])
            .range("center_x", "Center X", -2.0, 2.0, 0.01)
            .range("center_y", "Center Y", -2.0, 2.0, 0.01)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{ColorMode, RenderMode};

    #[test]
    fn test_set_interior_renders_black() {
        // Center the view on the origin: z <- z^2 stays at 0 forever,
        // so the middle pixel is inside the set at any iteration cap.
        let mut canvas = Canvas::new(20, 10, RenderMode::HalfBlock, ColorMode::TrueColor);
        let mut anim = Fractal::new(
            canvas.width,
            canvas.height,
            Params::new().with("center_x", 0.0).with("center_y", 0.0),
        );
        anim.render(&mut canvas);
        let idx = (canvas.height / 2) * canvas.width + canvas.width / 2;
        assert_eq!(canvas.pixels[idx], 0.0);
        assert_eq!(canvas.colors[idx], (0, 0, 0));
    }

    #[test]
    fn test_zoom_integrates_while_playing_and_resets() {
        let mut canvas = Canvas::new(20, 10, RenderMode::Ascii, ColorMode::TrueColor);
        let mut anim = Fractal::new(canvas.width, canvas.height, Params::new());
        assert_eq!(anim.zoom, 1.0);
        anim.update(16.0);
        assert_eq!(anim.zoom, 1.0, "zoom advanced while paused");
        anim.play();
        for _ in 0..100 {
            anim.update(16.0);
        }
        assert!(anim.zoom > 1.0);
        assert!(anim.color_offset > 0.0);
        anim.reset(&mut canvas);
        assert_eq!(anim.zoom, 1.0);
        assert_eq!(anim.color_offset, 0.0);
        assert_eq!(anim.core().center, (-0.5, 0.0));
    }

    #[test]
    fn test_center_params_repurpose_core_center() {
        let anim = Fractal::new(
            40,
            20,
            Params::new().with("center_x", -0.75).with("center_y", 0.1),
        );
        assert_eq!(anim.core().center, (-0.75, 0.1));
    }

    #[test]
    fn test_unknown_fractal_type_falls_back_to_mandelbrot() {
        let mut anim = Fractal::new(40, 20, Params::new());
        anim.update_params(Params::new().with("fractal_type", "menger_sponge"));
        assert_eq!(anim.cfg.kind, FractalKind::Mandelbrot);
    }

    #[test]
    fn test_boundary_region_produces_color() {
        let mut canvas = Canvas::new(40, 20, RenderMode::HalfBlock, ColorMode::TrueColor);
        let mut anim = Fractal::new(canvas.width, canvas.height, Params::new());
        anim.render(&mut canvas);
        assert!(canvas.pixels.iter().any(|&v| v > 0.0));
        assert!(canvas.pixels.iter().any(|&v| v == 0.0));
    }
}
