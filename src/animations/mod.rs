pub mod fractal;
pub mod params;
pub mod particle_system;
pub mod perlin_noise;
pub mod rotating_polygons;
pub mod spirograph;
pub mod wave_interference;

use anyhow::{bail, Result};

use crate::render::{Canvas, RenderMode};
pub use params::{Control, ControlEntry, ParamValue, Params, Schema};

/// Typed mirror of the shared parameter keys. Refreshed from the map at
/// construction and after every parameter merge — step/render code reads
/// this, never the untyped map.
#[derive(Debug, Clone, Copy)]
pub struct BaseConfig {
    pub speed: f64,
    pub trails: bool,
    pub trail_fade: f64,
}

impl BaseConfig {
    fn from_params(params: &Params) -> Self {
        BaseConfig {
            speed: params.number("speed", 1.0),
            trails: params.flag("trails", false),
            trail_fade: params.number("trail_fade", 0.95),
        }
    }
}

/// Per-instance state shared by every variant.
pub struct AnimationCore {
    /// Surface dimensions, fixed for the instance's lifetime.
    pub width: usize,
    pub height: usize,
    /// Surface midpoint by default. Fractal repurposes this as its
    /// complex-plane center rather than a pixel location.
    pub center: (f64, f64),
    /// Animation time in ms. Advances by `delta * speed` while playing,
    /// frozen while paused.
    pub elapsed: f64,
    pub frame_count: u64,
    pub playing: bool,
    pub params: Params,
    pub base: BaseConfig,
}

impl AnimationCore {
    /// Merge variant defaults with caller overrides (override wins
    /// per-key, shallow) and derive the typed base config once.
    pub fn new(width: usize, height: usize, defaults: Params, overrides: Params) -> Self {
        let mut params = defaults;
        params.merge(overrides);
        let base = BaseConfig::from_params(&params);
        AnimationCore {
            width,
            height,
            center: (width as f64 / 2.0, height as f64 / 2.0),
            elapsed: 0.0,
            frame_count: 0,
            playing: false,
            params,
            base,
        }
    }

    /// Default frame prologue: clear to black, or composite a translucent
    /// black rectangle (alpha = 1 - trail_fade) when trails are on.
    pub fn clear_frame(&self, canvas: &mut Canvas) {
        if self.base.trails {
            canvas.fill_rect(
                0,
                0,
                canvas.width,
                canvas.height,
                0,
                0,
                0,
                1.0 - self.base.trail_fade,
            );
        } else {
            canvas.clear();
        }
    }
}

/// Shared lifecycle for the six variants. Variants supply state
/// accessors plus the step/render/reset hooks; everything else is
/// implemented once here as default methods.
pub trait Animation {
    /// Registry key of this variant.
    fn kind(&self) -> &'static str;

    fn core(&self) -> &AnimationCore;
    fn core_mut(&mut self) -> &mut AnimationCore;

    /// Variant physics hook. Runs after the shared time advance, only
    /// while playing.
    fn step(&mut self, _delta: f64) {}

    /// Draw the frame into the canvas. Always runs fully, playing or
    /// paused, so the displayed frame reflects current parameters.
    fn render(&mut self, canvas: &mut Canvas);

    /// Variant-specific derived state reset (rotation phase, zoom,
    /// trail buffers). Runs after the shared reset.
    fn on_reset(&mut self) {}

    /// Re-read the variant's typed config from the parameter map.
    fn refresh_config(&mut self) {}

    /// Control schema for the host UI. Returned fresh each call but
    /// logically a constant.
    fn schema(&self) -> Schema {
        Schema::base()
    }

    /// Preferred render mode when no explicit -r flag is given. Field
    /// synthesis reads best as half-blocks; line art as braille.
    fn preferred_render(&self) -> RenderMode {
        RenderMode::HalfBlock
    }

    /// Explicit respawn hook (particle system). Deliberately not part
    /// of reset — the driver invokes it on its own.
    fn reinitialize(&mut self) {}

    fn play(&mut self) {
        self.core_mut().playing = true;
    }

    fn pause(&mut self) {
        self.core_mut().playing = false;
    }

    fn is_playing(&self) -> bool {
        self.core().playing
    }

    /// Advance animation time by `delta` (ms) scaled by the speed
    /// parameter. No-op while paused.
    fn update(&mut self, delta: f64) {
        if !self.core().playing {
            return;
        }
        let speed = self.core().base.speed;
        {
            let core = self.core_mut();
            core.elapsed += delta * speed;
            core.frame_count += 1;
        }
        self.step(delta);
    }

    /// Zero the counters, clear the surface to opaque black, and reset
    /// variant derived state. Play state is left alone.
    fn reset(&mut self, canvas: &mut Canvas) {
        {
            let core = self.core_mut();
            core.elapsed = 0.0;
            core.frame_count = 0;
        }
        canvas.clear();
        self.on_reset();
    }

    /// Shallow-merge a patch into the parameter map. Unknown keys are
    /// stored as-is; the schema is advisory, not enforced here.
    fn update_params(&mut self, patch: Params) {
        self.core_mut().params.merge(patch);
        let base = BaseConfig::from_params(&self.core().params);
        self.core_mut().base = base;
        self.refresh_config();
    }
}

/// All available animations with descriptions.
pub const ANIMATIONS: &[(&str, &str)] = &[
    ("rotating_polygons", "Concentric polygon rings in slow rotation"),
    ("wave_interference", "Radial interference of two traveling waves"),
    ("particle_system", "Bouncing particles with fading trails"),
    ("perlin_noise", "Drifting fractal noise field"),
    ("fractal", "Escape-time fractal zoom (mandelbrot, julia, burning ship)"),
    ("spirograph", "Hypotrochoid curve traced in rainbow"),
];

/// Create an animation by registry key, merging `overrides` onto the
/// variant's defaults. Unknown keys fail fast; no partial instance is
/// constructed.
pub fn create(kind: &str, width: usize, height: usize, overrides: Params) -> Result<Box<dyn Animation>> {
    Ok(match kind {
        "rotating_polygons" => Box::new(rotating_polygons::RotatingPolygons::new(width, height, overrides)),
        "wave_interference" => Box::new(wave_interference::WaveInterference::new(width, height, overrides)),
        "particle_system" => Box::new(particle_system::ParticleSystem::new(width, height, overrides)),
        "perlin_noise" => Box::new(perlin_noise::PerlinNoiseField::new(width, height, overrides)),
        "fractal" => Box::new(fractal::Fractal::new(width, height, overrides)),
        "spirograph" => Box::new(spirograph::Spirograph::new(width, height, overrides)),
        _ => bail!("unknown animation type: {kind}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{ColorMode, RenderMode};

    fn test_canvas() -> Canvas {
        Canvas::new(40, 20, RenderMode::HalfBlock, ColorMode::TrueColor)
    }

    fn make(kind: &str) -> Box<dyn Animation> {
        let canvas = test_canvas();
        create(kind, canvas.width, canvas.height, Params::new()).unwrap()
    }

    #[test]
    fn test_unknown_kind_is_an_error() {
        let err = create("lava_lamp", 80, 40, Params::new()).err().unwrap();
        assert!(err.to_string().contains("unknown animation type"));
    }

    #[test]
    fn test_every_schema_key_has_a_default_of_matching_type() {
        for &(kind, _) in ANIMATIONS {
            let anim = make(kind);
            for entry in anim.schema().entries() {
                let value = anim
                    .core()
                    .params
                    .get(entry.name)
                    .unwrap_or_else(|| panic!("{kind}: schema key {} missing default", entry.name));
                let compatible = matches!(
                    (&entry.control, value),
                    (Control::Range { .. }, ParamValue::Number(_))
                        | (Control::Select { .. }, ParamValue::Text(_))
                        | (Control::Checkbox { .. }, ParamValue::Bool(_))
                );
                assert!(compatible, "{kind}: schema key {} type mismatch", entry.name);
            }
        }
    }

    #[test]
    fn test_select_defaults_are_listed_options() {
        for &(kind, _) in ANIMATIONS {
            let anim = make(kind);
            for entry in anim.schema().entries() {
                if let Control::Select { ref options, .. } = entry.control {
                    let value = anim.core().params.text(entry.name, "");
                    assert!(
                        options.iter().any(|&o| o == value),
                        "{kind}: default {value:?} for {} not in options",
                        entry.name
                    );
                }
            }
        }
    }

    #[test]
    fn test_starts_paused_and_update_is_a_noop_while_paused() {
        for &(kind, _) in ANIMATIONS {
            let mut anim = make(kind);
            assert!(!anim.is_playing(), "{kind} should start paused");
            anim.update(16.0);
            assert_eq!(anim.core().elapsed, 0.0);
            assert_eq!(anim.core().frame_count, 0);
        }
    }

    #[test]
    fn test_update_scales_elapsed_by_speed() {
        let mut anim = make("wave_interference");
        anim.update_params(Params::new().with("speed", 2.0));
        anim.play();
        anim.update(16.0);
        anim.update(16.0);
        assert_eq!(anim.core().elapsed, 64.0);
        assert_eq!(anim.core().frame_count, 2);
    }

    #[test]
    fn test_play_pause_idempotent() {
        let mut anim = make("spirograph");
        anim.play();
        anim.play();
        assert!(anim.is_playing());
        anim.pause();
        anim.pause();
        assert!(!anim.is_playing());
    }

    #[test]
    fn test_update_params_is_shallow_and_keeps_unknown_keys() {
        let mut anim = make("fractal");
        anim.update_params(Params::new().with("contrast", 2.0).with("mystery", true));
        assert_eq!(anim.core().params.number("contrast", 0.0), 2.0);
        assert!(anim.core().params.flag("mystery", false));
        // Unrelated keys untouched
        assert_eq!(anim.core().params.number("max_iterations", 0.0), 100.0);
    }

    #[test]
    fn test_reset_zeroes_counters_and_blacks_canvas() {
        for &(kind, _) in ANIMATIONS {
            let mut canvas = test_canvas();
            let mut anim = make(kind);
            anim.play();
            for _ in 0..10 {
                anim.update(16.0);
                anim.render(&mut canvas);
            }
            anim.reset(&mut canvas);
            assert_eq!(anim.core().elapsed, 0.0, "{kind}");
            assert_eq!(anim.core().frame_count, 0, "{kind}");
            assert!(canvas.pixels.iter().all(|&v| v == 0.0), "{kind}");
        }
    }

    #[test]
    fn test_overrides_win_at_construction() {
        let anim = create("rotating_polygons", 80, 40, Params::new().with("sides", 9.0)).unwrap();
        assert_eq!(anim.core().params.number("sides", 0.0), 9.0);
        assert_eq!(anim.core().params.number("num_polygons", 0.0), 6.0);
    }
}
