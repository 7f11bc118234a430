use std::collections::VecDeque;

use super::{Animation, AnimationCore, Params, Schema};
use crate::generators::hsv_to_rgb;
use crate::render::{Canvas, RenderMode};

/// Hard cap on retained trail points; oldest are discarded first.
const MAX_TRAIL: usize = 2000;

struct Config {
    outer_radius: f64,
    inner_radius: f64,
    pen_offset: f64,
    spiral_speed: f64,
}

impl Config {
    fn from_params(params: &Params) -> Self {
        Config {
            outer_radius: params.number("outer_radius", 80.0),
            inner_radius: params.number("inner_radius", 35.0),
            pen_offset: params.number("pen_offset", 50.0),
            spiral_speed: params.number("spiral_speed", 1.0),
        }
    }
}

struct TrailPoint {
    x: f64,
    y: f64,
    /// Curve-parameter time at which this point was sampled. Hue is
    /// derived from this, so the rainbow sits still along the curve.
    t: f64,
}

/// Hypotrochoid tracer. One point is sampled per render (not per
/// update), and the surface is never cleared to opaque black — its own
/// fade compositing always runs, whatever the trails flag says.
pub struct Spirograph {
    core: AnimationCore,
    cfg: Config,
    trail: VecDeque<TrailPoint>,
}

impl Spirograph {
    pub fn new(width: usize, height: usize, overrides: Params) -> Self {
        let core = AnimationCore::new(width, height, Self::default_params(), overrides);
        let cfg = Config::from_params(&core.params);
        Spirograph {
            core,
            cfg,
            trail: VecDeque::new(),
        }
    }

    fn default_params() -> Params {
        Params::base_defaults()
            .with("outer_radius", 80.0)
            .with("inner_radius", 35.0)
            .with("pen_offset", 50.0)
            .with("spiral_speed", 1.0)
    }

    /// Pen position at curve time `t`, in surface coordinates.
    fn sample(&self, t: f64) -> (f64, f64) {
        let big_r = self.cfg.outer_radius;
        let small_r = self.cfg.inner_radius;
        let d = self.cfg.pen_offset;
        let ratio = (big_r - small_r) / small_r;
        let (cx, cy) = self.core.center;
        let x = (big_r - small_r) * t.cos() + d * (ratio * t).cos() + cx;
        let y = (big_r - small_r) * t.sin() - d * (ratio * t).sin() + cy;
        (x, y)
    }
}

impl Animation for Spirograph {
    fn kind(&self) -> &'static str {
        "spirograph"
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

    fn render(&mut self, canvas: &mut Canvas) {
        // Persistent luminous curve: always fade, never hard-clear
        canvas.fill_rect(
            0,
            0,
            canvas.width,
            canvas.height,
            0,
            0,
            0,
            1.0 - self.core.base.trail_fade,
        );

        let t = self.core.elapsed * self.cfg.spiral_speed * 0.01;
        let (x, y) = self.sample(t);
        if x >= 0.0 && x < self.core.width as f64 && y >= 0.0 && y < self.core.height as f64 {
            self.trail.push_back(TrailPoint { x, y, t });
            while self.trail.len() > MAX_TRAIL {
                self.trail.pop_front();
            }
        }

        let mut iter = self.trail.iter();
        let Some(first) = iter.next() else {
            return;
        };
        let mut prev = first;
        for point in iter {
            let hue = (point.t * 0.02).rem_euclid(1.0);
            let (r, g, b) = hsv_to_rgb(hue, 0.85, 1.0);
            canvas.draw_line(prev.x, prev.y, point.x, point.y, 1.0, r, g, b, 1.0);
            prev = point;
        }
        if self.trail.len() == 1 {
            let hue = (first.t * 0.02).rem_euclid(1.0);
            let (r, g, b) = hsv_to_rgb(hue, 0.85, 1.0);
            canvas.set_colored(first.x as usize, first.y as usize, 1.0, r, g, b);
        }
    }

    fn on_reset(&mut self) {
        self.trail.clear();
    }

    fn schema(&self) -> Schema {
        Schema::base()
            .range("outer_radius", "Fixed radius", 20.0, 200.0, 1.0)
            .range("inner_radius", "Rolling radius", 5.0, 100.0, 1.0)
            .range("pen_offset", "Pen offset", 5.0, 150.0, 1.0)
            .range("spiral_speed", "Spiral speed", 0.1, 5.0, 0.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{ColorMode, RenderMode};

    fn canvas() -> Canvas {
        Canvas::new(80, 40, RenderMode::HalfBlock, ColorMode::TrueColor)
    }

    /// Radii small enough that the whole curve stays on an 160x80 px
    /// surface: max deviation from center is (R-r) + d = 32 < 40.
    fn in_bounds_params() -> Params {
        Params::new()
            .with("outer_radius", 30.0)
            .with("inner_radius", 13.0)
            .with("pen_offset", 15.0)
    }

    #[test]
    fn test_trail_capped_at_2000_renders() {
        let mut surface = canvas();
        let mut anim = Spirograph::new(surface.width, surface.height, in_bounds_params());
        anim.play();
        for _ in 0..2500 {
            anim.update(16.0);
            anim.render(&mut surface);
        }
        assert_eq!(anim.trail.len(), 2000);
    }

    #[test]
    fn test_one_point_sampled_per_render_not_per_update() {
        let mut surface = canvas();
        let mut anim = Spirograph::new(surface.width, surface.height, in_bounds_params());
        anim.play();
        for _ in 0..50 {
            anim.update(16.0);
        }
        anim.render(&mut surface);
        assert_eq!(anim.trail.len(), 1);
    }

    #[test]
    fn test_out_of_bounds_samples_are_skipped() {
        let mut surface = canvas();
        // Radii far larger than the surface: the pen spends most of its
        // orbit outside
        let mut anim = Spirograph::new(
            surface.width,
            surface.height,
            Params::new()
                .with("outer_radius", 5000.0)
                .with("inner_radius", 35.0)
                .with("pen_offset", 50.0),
        );
        anim.play();
        for _ in 0..20 {
            anim.update(16.0);
            anim.render(&mut surface);
        }
        assert!(anim.trail.is_empty());
    }

    #[test]
    fn test_reset_clears_trail() {
        let mut surface = canvas();
        let mut anim = Spirograph::new(surface.width, surface.height, in_bounds_params());
        anim.play();
        for _ in 0..40 {
            anim.update(16.0);
            anim.render(&mut surface);
        }
        assert!(!anim.trail.is_empty());
        anim.reset(&mut surface);
        assert!(anim.trail.is_empty());
    }

    #[test]
    fn test_curve_matches_hypotrochoid_equations() {
        let anim = Spirograph::new(200, 100, Params::new());
        let (cx, cy) = anim.core().center;
        let (x, y) = anim.sample(0.0);
        // At t=0: x = (R-r) + d, y = 0, relative to center
        assert!((x - (cx + 45.0 + 50.0)).abs() < 1e-9);
        assert!((y - cy).abs() < 1e-9);
    }
}
