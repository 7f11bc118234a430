/// The three escape-time iteration families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FractalKind {
    Mandelbrot,
    Julia,
    BurningShip,
}

/// Fixed Julia constant.
pub const JULIA_C: (f64, f64) = (-0.7, 0.27015);

impl FractalKind {
    /// Parse a `fractal_type` parameter value. Unknown names fall back
    /// to Mandelbrot rather than erroring.
    pub fn from_name(name: &str) -> Self {
        match name {
            "julia" => FractalKind::Julia,
            "burning_ship" => FractalKind::BurningShip,
            _ => FractalKind::Mandelbrot,
        }
    }
}

/// Iterate the chosen family at complex-plane point (cx, cy).
///
/// Returns `None` when the orbit never leaves |z|² <= 4 within
/// `max_iterations` (inside the set), otherwise a smoothed continuous
/// iteration count `iter + 1 - log2(log2(|z|²)/2)` to avoid banding.
pub fn escape_time(kind: FractalKind, cx: f64, cy: f64, max_iterations: u32) -> Option<f64> {
    let (mut zr, mut zi, cr, ci) = match kind {
        FractalKind::Mandelbrot | FractalKind::BurningShip => (0.0, 0.0, cx, cy),
        FractalKind::Julia => (cx, cy, JULIA_C.0, JULIA_C.1),
    };

    let mut iter = 0u32;
    let mut zr2 = zr * zr;
    let mut zi2 = zi * zi;
    while zr2 + zi2 <= 4.0 && iter < max_iterations {
        if kind == FractalKind::BurningShip {
            zr = zr.abs();
            zi = zi.abs();
        }
        let next_zr = zr2 - zi2 + cr;
        zi = 2.0 * zr * zi + ci;
        zr = next_zr;
        iter += 1;
        zr2 = zr * zr;
        zi2 = zi * zi;
    }

    if iter >= max_iterations {
        None
    } else {
        let log_zn = (zr2 + zi2).log2() / 2.0;
        Some(iter as f64 + 1.0 - log_zn.log2())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mandelbrot_origin_never_escapes() {
        for max_iter in [10, 100, 1000] {
            assert_eq!(escape_time(FractalKind::Mandelbrot, 0.0, 0.0, max_iter), None);
        }
    }

    #[test]
    fn test_escape_count_monotonic_in_max_iterations() {
        // A point just outside the set (escapes near iteration 30):
        // raising the iteration budget must never lower the count.
        let (cx, cy) = (0.26, 0.0);
        let mut last: Option<f64> = None;
        for max_iter in (5..300).step_by(5) {
            if let Some(count) = escape_time(FractalKind::Mandelbrot, cx, cy, max_iter) {
                if let Some(prev) = last {
                    assert!(count >= prev, "count regressed: {} -> {}", prev, count);
                }
                last = Some(count);
            }
        }
        assert!(last.is_some(), "test point never escaped");
    }

    #[test]
    fn test_far_points_escape_immediately() {
        let count = escape_time(FractalKind::Mandelbrot, 3.0, 3.0, 100).unwrap();
        assert!(count < 3.0);
    }

    #[test]
    fn test_julia_uses_pixel_as_z0() {
        // The orbit of z0 = 0 under the fixed constant takes ~96
        // iterations to leave the bailout circle; a distant z0 is gone
        // within one.
        let slow = escape_time(FractalKind::Julia, 0.0, 0.0, 200).unwrap();
        let fast = escape_time(FractalKind::Julia, 2.5, 2.5, 200).unwrap();
        assert!(slow > 90.0);
        assert!(fast < 2.0);
        assert_eq!(escape_time(FractalKind::Julia, 0.0, 0.0, 50), None);
    }

    #[test]
    fn test_burning_ship_differs_from_mandelbrot() {
        // The abs() fold changes orbits off the real axis.
        let a = escape_time(FractalKind::Mandelbrot, -0.4, -0.6, 200);
        let b = escape_time(FractalKind::BurningShip, -0.4, -0.6, 200);
        assert_ne!(a, b);
    }
}
