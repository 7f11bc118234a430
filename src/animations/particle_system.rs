use std::collections::VecDeque;

use rand::RngExt;

use super::{Animation, AnimationCore, Params, Schema};
use crate::generators::hsv_to_rgb;
use crate::render::{Canvas, RenderMode};

struct Config {
    particle_count: usize,
    gravity: f64,
    air_damping: f64,
    bounce_damping: f64,
    trail_length: usize,
    color_mode: String,
}

impl Config {
    fn from_params(params: &Params) -> Self {
        Config {
            particle_count: params.number("particle_count", 100.0).max(1.0) as usize,
            gravity: params.number("gravity", 0.2),
            air_damping: params.number("air_damping", 0.99),
            bounce_damping: params.number("bounce_damping", 0.8),
            trail_length: params.number("trail_length", 10.0).max(1.0) as usize,
            color_mode: params.text("color_mode", "velocity").to_string(),
        }
    }
}

struct Particle {
    x: f64,
    y: f64,
    vx: f64,
    vy: f64,
    /// Recent positions, oldest first, capped at trail_length.
    trail: VecDeque<(f64, f64)>,
}

/// Point masses under gravity and drag, bouncing off the surface edges,
/// each dragging a fading trail.
pub struct ParticleSystem {
    core: AnimationCore,
    cfg: Config,
    particles: Vec<Particle>,
    rng: rand::rngs::ThreadRng,
}

impl ParticleSystem {
    pub fn new(width: usize, height: usize, overrides: Params) -> Self {
        let core = AnimationCore::new(width, height, Self::default_params(), overrides);
        let cfg = Config::from_params(&core.params);
        let mut system = ParticleSystem {
            core,
            cfg,
            particles: Vec::new(),
            rng: rand::rng(),
        };
        system.spawn_all();
        system
    }

    fn default_params() -> Params {
        Params::base_defaults()
            .with("particle_count", 100.0)
            .with("gravity", 0.2)
            .with("air_damping", 0.99)
            .with("bounce_damping", 0.8)
            .with("trail_length", 10.0)
            .with("color_mode", "velocity")
    }

    /// Respawn the whole batch at uniform-random positions with random
    /// velocities in [-5, 5] per axis.
    fn spawn_all(&mut self) {
        let w = self.core.width as f64;
        let h = self.core.height as f64;
        self.particles = (0..self.cfg.particle_count)
            .map(|_| Particle {
                x: self.rng.random_range(0.0..w),
                y: self.rng.random_range(0.0..h),
                vx: self.rng.random_range(-5.0..5.0),
                vy: self.rng.random_range(-5.0..5.0),
                trail: VecDeque::new(),
            })
            .collect();
    }
}

impl Animation for ParticleSystem {
    fn kind(&self) -> &'static str {
        "particle_system"
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

    /// Particles are respawned here, not in reset — the driver invokes
    /// this explicitly. Also where a changed particle_count takes
    /// effect.
    fn reinitialize(&mut self) {
        self.spawn_all();
    }

    fn step(&mut self, delta: f64) {
        let dt = delta * 0.01;
        let w = self.core.width as f64;
        let h = self.core.height as f64;
        let cfg = &self.cfg;

        for p in &mut self.particles {
            // Semi-implicit Euler: velocity first, then position
            p.vy += cfg.gravity;
            p.vx *= cfg.air_damping;
            p.vy *= cfg.air_damping;
            p.x += p.vx * dt;
            p.y += p.vy * dt;

            // Reflect off edges and clamp back into bounds
            if p.x < 0.0 {
                p.x = 0.0;
                p.vx = -p.vx * cfg.bounce_damping;
            } else if p.x > w {
                p.x = w;
                p.vx = -p.vx * cfg.bounce_damping;
            }
            if p.y < 0.0 {
                p.y = 0.0;
                p.vy = -p.vy * cfg.bounce_damping;
            } else if p.y > h {
                p.y = h;
                p.vy = -p.vy * cfg.bounce_damping;
            }

            p.trail.push_back((p.x, p.y));
            while p.trail.len() > cfg.trail_length {
                p.trail.pop_front();
            }
        }
    }

    fn render(&mut self, canvas: &mut Canvas) {
        self.core.clear_frame(canvas);

        let velocity_colored = self.cfg.color_mode != "white";
        let trail_length = self.cfg.trail_length as f64;

        for p in &self.particles {
            let (r, g, b) = if velocity_colored {
                let speed = (p.vx * p.vx + p.vy * p.vy).sqrt();
                hsv_to_rgb((speed / 20.0).rem_euclid(1.0), 1.0, 1.0)
            } else {
                (255, 255, 255)
            };
            if p.trail.is_empty() {
                // Not yet stepped — show the spawn position
                canvas.fill_circle(p.x, p.y, 1.0, 1.0, r, g, b, 1.0);
                continue;
            }
            for (i, &(x, y)) in p.trail.iter().enumerate() {
                // Oldest point is most transparent
                let alpha = i as f64 / trail_length;
                canvas.fill_circle(x, y, 1.0, alpha, r, g, b, alpha);
            }
        }
    }

    fn schema(&self) -> Schema {
        Schema::base()
            .range("particle_count", "Particles", 10.0, 500.0, 10.0)
            .range("gravity", "Gravity", 0.0, 1.0, 0.01)
            .range("air_damping", "Air damping", 0.90, 1.0, 0.001)
            .range("bounce_damping", "Bounce damping", 0.0, 1.0, 0.05)
            .range("trail_length", "Trail length", 2.0, 40.0, 1.0)
            .select("color_mode", "Color mode", &["velocity", "white"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make(width: usize, height: usize) -> ParticleSystem {
        ParticleSystem::new(width, height, Params::new())
    }

    #[test]
    fn test_spawn_positions_inside_surface() {
        let anim = make(120, 80);
        assert_eq!(anim.particles.len(), 100);
        for p in &anim.particles {
            assert!((0.0..120.0).contains(&p.x));
            assert!((0.0..80.0).contains(&p.y));
            assert!((-5.0..5.0).contains(&p.vx));
            assert!((-5.0..5.0).contains(&p.vy));
        }
    }

    #[test]
    fn test_positions_stay_clamped_under_many_steps() {
        let mut anim = ParticleSystem::new(
            60,
            40,
            Params::new().with("gravity", 1.0).with("bounce_damping", 1.0),
        );
        anim.play();
        for _ in 0..500 {
            anim.update(16.0);
        }
        for p in &anim.particles {
            assert!((0.0..=60.0).contains(&p.x), "x escaped: {}", p.x);
            assert!((0.0..=40.0).contains(&p.y), "y escaped: {}", p.y);
        }
    }

    #[test]
    fn test_trail_never_exceeds_cap() {
        let mut anim =
            ParticleSystem::new(60, 40, Params::new().with("trail_length", 5.0));
        anim.play();
        for _ in 0..50 {
            anim.update(16.0);
        }
        for p in &anim.particles {
            assert!(p.trail.len() <= 5);
        }
        // Oldest entries evicted first: trail is full after 50 steps
        assert!(anim.particles.iter().all(|p| p.trail.len() == 5));
    }

    #[test]
    fn test_reset_keeps_particles_but_reinitialize_respawns() {
        let mut canvas = crate::render::Canvas::new(
            30,
            20,
            crate::render::RenderMode::Ascii,
            crate::render::ColorMode::TrueColor,
        );
        let mut anim = make(30, 20);
        anim.play();
        for _ in 0..20 {
            anim.update(16.0);
        }
        let positions: Vec<(f64, f64)> = anim.particles.iter().map(|p| (p.x, p.y)).collect();
        anim.reset(&mut canvas);
        let after_reset: Vec<(f64, f64)> = anim.particles.iter().map(|p| (p.x, p.y)).collect();
        assert_eq!(positions, after_reset);

        anim.update_params(Params::new().with("particle_count", 50.0));
        anim.reinitialize();
        assert_eq!(anim.particles.len(), 50);
        assert!(anim.particles.iter().all(|p| p.trail.is_empty()));
    }

    #[test]
    fn test_damping_bleeds_energy() {
        let mut anim = ParticleSystem::new(
            200,
            200,
            Params::new()
                .with("gravity", 0.0)
                .with("air_damping", 0.9)
                .with("particle_count", 20.0),
        );
        let initial: f64 = anim.particles.iter().map(|p| p.vx.abs() + p.vy.abs()).sum();
        anim.play();
        for _ in 0..100 {
            anim.update(16.0);
        }
        let after: f64 = anim.particles.iter().map(|p| p.vx.abs() + p.vy.abs()).sum();
        assert!(after < initial * 0.01, "velocities failed to decay: {after} vs {initial}");
    }
}
