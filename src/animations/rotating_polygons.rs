use std::f64::consts::{PI, TAU};

use super::{Animation, AnimationCore, Params, Schema};
use crate::generators::hsv_to_rgb;
use crate::render::{Canvas, RenderMode};

struct Config {
    num_polygons: usize,
    sides: usize,
    min_radius: f64,
    max_radius: f64,
    rotation_speed: f64,
    color_shift: f64,
    line_width: f64,
}

impl Config {
    fn from_params(params: &Params) -> Self {
        Config {
            num_polygons: params.number("num_polygons", 6.0).max(1.0) as usize,
            sides: params.number("sides", 5.0).max(3.0) as usize,
            min_radius: params.number("min_radius", 20.0),
            max_radius: params.number("max_radius", 120.0),
            rotation_speed: params.number("rotation_speed", 1.0),
            color_shift: params.number("color_shift", 0.0),
            line_width: params.number("line_width", 2.0),
        }
    }
}

/// Concentric regular polygons, stroked, in continuous rotation.
pub struct RotatingPolygons {
    core: AnimationCore,
    cfg: Config,
    /// Accumulated rotation phase in radians. Integrated from elapsed
    /// time deltas so a mid-flight rotation_speed change never jumps
    /// the phase.
    rotation: f64,
    /// Elapsed-time cursor of the last phase sample.
    last_time: f64,
}

impl RotatingPolygons {
    pub fn new(width: usize, height: usize, overrides: Params) -> Self {
        let core = AnimationCore::new(width, height, Self::default_params(), overrides);
        let cfg = Config::from_params(&core.params);
        RotatingPolygons {
            core,
            cfg,
            rotation: 0.0,
            last_time: 0.0,
        }
    }

    fn default_params() -> Params {
        Params::base_defaults()
            .with("num_polygons", 6.0)
            .with("sides", 5.0)
            .with("min_radius", 20.0)
            .with("max_radius", 120.0)
            .with("rotation_speed", 1.0)
            .with("color_shift", 0.0)
            .with("line_width", 2.0)
    }
}

impl Animation for RotatingPolygons {
    fn kind(&self) -> &'static str {
        "rotating_polygons"
    }

    fn preferred_render(&self) -> RenderMode {
        RenderMode::Braille
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

    fn step(&mut self, _delta: f64) {
        let t = self.core.elapsed;
        self.rotation += self.cfg.rotation_speed * (t - self.last_time) * 0.001;
        self.last_time = t;
    }

    fn render(&mut self, canvas: &mut Canvas) {
        self.core.clear_frame(canvas);

        let (cx, cy) = self.core.center;
        let n = self.cfg.num_polygons;
        let sides = self.cfg.sides;
        let mut points = Vec::with_capacity(sides);

        for i in 0..n {
            let radius = if n == 1 {
                self.cfg.max_radius
            } else {
                let t = i as f64 / (n - 1) as f64;
                self.cfg.min_radius + (self.cfg.max_radius - self.cfg.min_radius) * t
            };
            let offset = i as f64 * PI / n as f64;

            points.clear();
            for k in 0..sides {
                let angle = self.rotation + offset + k as f64 * TAU / sides as f64;
                points.push((cx + radius * angle.cos(), cy + radius * angle.sin()));
            }

            let hue = (self.core.elapsed * 0.001 + i as f64 * 0.2 + self.cfg.color_shift)
                .rem_euclid(1.0);
            let (r, g, b) = hsv_to_rgb(hue, 0.8, 0.9);
            canvas.stroke_polygon(&points, 0.9, r, g, b, self.cfg.line_width);
        }
    }

    fn on_reset(&mut self) {
        self.rotation = 0.0;
        self.last_time = 0.0;
    }

    fn schema(&self) -> Schema {
        Schema::base()
            .range("num_polygons", "Polygons", 1.0, 12.0, 1.0)
            .range("sides", "Sides", 3.0, 12.0, 1.0)
            .range("min_radius", "Min radius", 5.0, 100.0, 1.0)
            .range("max_radius", "Max radius", 20.0, 400.0, 5.0)
            .range("rotation_speed", "Rotation speed", -5.0, 5.0, 0.1)
            .range("color_shift", "Color shift", 0.0, 1.0, 0.01)
            .range("line_width", "Line width", 1.0, 5.0, 1.0)
    }
}
