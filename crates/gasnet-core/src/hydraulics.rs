//! Steady-state gas hydraulics utilities.
//!
//! The flow model works in pressure-squared space: for a segment with drop
//! constant `k` and flow `f`, the Weymouth-style relation is
//! `P²(u) − P²(v) = k·f·|f|`. Everything here supports that relation: the
//! drop constant itself, its inverse, a compressibility correlation, the
//! Darcy friction factor, a piecewise-linear breakpoint table used to
//! linearize `f²`, and a couple of scalar helpers.

/// Standard atmospheric offset between gauge and absolute pressure (psi).
pub const ATMOSPHERIC_PSI: f64 = 14.696;

/// Seconds per day, for MMscfd → scf/s conversions.
const SECONDS_PER_DAY: f64 = 86_400.0;

/// Pseudo-critical pressure of pipeline-quality natural gas (psia).
const PSEUDO_CRITICAL_PRESSURE: f64 = 667.0;

/// Pseudo-critical temperature of pipeline-quality natural gas (°R).
const PSEUDO_CRITICAL_TEMPERATURE: f64 = 343.0;

/// Pressure drop constant `k = friction · length / (diameter⁵ · 1000)`.
///
/// Computed once per segment after loading; units chosen so that
/// `k · f²` lands in psia² for `f` in MMscfd.
pub fn pressure_drop_constant(friction_factor: f64, length_miles: f64, diameter_inches: f64) -> f64 {
    friction_factor * length_miles / (diameter_inches.powi(5) * 1000.0)
}

/// Signed pressure-squared drop `k·f·|f|` for flow `f`.
///
/// The sign follows the flow direction so reverse flow on a bidirectional
/// segment produces a negative drop (pressure rises from `u` to `v`).
pub fn weymouth_pressure_drop_sq(k: f64, flow: f64) -> f64 {
    k * flow * flow.abs()
}

/// Largest flow a segment can carry between the given squared pressures.
///
/// Inverse of [`weymouth_pressure_drop_sq`]; zero when the pressures cannot
/// drive any forward flow.
pub fn weymouth_max_flow(k: f64, psq_upstream: f64, psq_downstream: f64) -> f64 {
    if k <= 0.0 {
        return 0.0;
    }
    ((psq_upstream - psq_downstream).max(0.0) / k).sqrt()
}

/// Panhandle-A style drop constant for high-throughput trunk lines.
///
/// Simplified form with the diameter exponent of the Panhandle A equation
/// and a pipeline efficiency factor; interchangeable with the Weymouth
/// constant in the `k·f·|f|` relation.
pub fn panhandle_a_constant(length_miles: f64, diameter_inches: f64, efficiency: f64) -> f64 {
    let eff = efficiency.clamp(0.5, 1.0);
    length_miles / (eff * eff * diameter_inches.powf(4.854) * 1000.0)
}

/// Gas compressibility factor via the Papay correlation.
///
/// `z = 1 − 3.52·p_r·e^(−2.26·T_r) + 0.274·p_r²·e^(−1.878·T_r)` with reduced
/// properties against pipeline-gas pseudo-criticals. Clamped to [0.2, 1.2],
/// the range where the correlation is credible.
pub fn z_factor(pressure_psia: f64, temperature_rankine: f64) -> f64 {
    let pr = pressure_psia / PSEUDO_CRITICAL_PRESSURE;
    let tr = temperature_rankine / PSEUDO_CRITICAL_TEMPERATURE;
    let z = 1.0 - 3.52 * pr * (-2.26 * tr).exp() + 0.274 * pr * pr * (-1.878 * tr).exp();
    z.clamp(0.2, 1.2)
}

/// Darcy friction factor: laminar `64/Re` below Re = 2300, Swamee–Jain above.
///
/// `roughness_ratio` is absolute roughness over diameter. Clamped from below
/// to keep downstream divisions sane.
pub fn friction_factor(reynolds: f64, roughness_ratio: f64) -> f64 {
    if reynolds <= 0.0 {
        return 0.0;
    }
    if reynolds < 2300.0 {
        64.0 / reynolds
    } else {
        let a = roughness_ratio / 3.7;
        let b = 5.74 / reynolds.powf(0.9);
        let f = 0.25 / (a + b).log10().powi(2);
        f.max(1e-4)
    }
}

/// Convert absolute pressure to gauge.
pub fn psia_to_psig(psia: f64) -> f64 {
    psia - ATMOSPHERIC_PSI
}

/// Convert gauge pressure to absolute.
pub fn psig_to_psia(psig: f64) -> f64 {
    psig + ATMOSPHERIC_PSI
}

/// Convert MMscfd to standard cubic feet per second.
pub fn mmscfd_to_scf_per_sec(mmscfd: f64) -> f64 {
    mmscfd * 1.0e6 / SECONDS_PER_DAY
}

/// Real roots of `a·x² + b·x + c = 0`, ascending. `None` when no real root
/// exists (negative discriminant, or degenerate constant equation).
pub fn solve_quadratic(a: f64, b: f64, c: f64) -> Option<(f64, f64)> {
    if a.abs() < 1e-12 {
        if b.abs() < 1e-12 {
            return None;
        }
        let root = -c / b;
        return Some((root, root));
    }
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return None;
    }
    let sq = disc.sqrt();
    let r1 = (-b - sq) / (2.0 * a);
    let r2 = (-b + sq) / (2.0 * a);
    Some((r1.min(r2), r1.max(r2)))
}

/// One secant of a piecewise-linear table: `y ≈ slope·x + intercept` over
/// `[x0, x1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Secant {
    pub x0: f64,
    pub x1: f64,
    pub slope: f64,
    pub intercept: f64,
}

/// Monotone breakpoint table with linear interpolation.
///
/// Used to linearize `f ↦ f²` for the pressure model and for compressor fuel
/// curves. Breakpoints must be supplied with strictly increasing x.
#[derive(Debug, Clone, PartialEq)]
pub struct PiecewiseLinear {
    points: Vec<(f64, f64)>,
}

impl PiecewiseLinear {
    /// Build from breakpoints; x values must be strictly increasing.
    pub fn new(points: Vec<(f64, f64)>) -> Option<Self> {
        if points.len() < 2 {
            return None;
        }
        if points.windows(2).any(|w| w[1].0 <= w[0].0) {
            return None;
        }
        Some(Self { points })
    }

    /// Sample `f(x) = x²` on `[0, x_max]` with `segments` equal intervals.
    pub fn square_over(x_max: f64, segments: usize) -> Option<Self> {
        if x_max <= 0.0 || segments == 0 {
            return None;
        }
        let step = x_max / segments as f64;
        let points = (0..=segments)
            .map(|i| {
                let x = i as f64 * step;
                (x, x * x)
            })
            .collect();
        Self::new(points)
    }

    /// Interpolated value; clamps to the end values outside the table.
    pub fn eval(&self, x: f64) -> f64 {
        let first = self.points[0];
        let last = *self.points.last().expect("at least two breakpoints");
        if x <= first.0 {
            return first.1;
        }
        if x >= last.0 {
            return last.1;
        }
        for w in self.points.windows(2) {
            let (x0, y0) = w[0];
            let (x1, y1) = w[1];
            if x >= x0 && x <= x1 {
                let t = (x - x0) / (x1 - x0);
                return y0 + t * (y1 - y0);
            }
        }
        last.1
    }

    /// Secant (slope/intercept) of each interval, for constraint emission.
    pub fn secants(&self) -> Vec<Secant> {
        self.points
            .windows(2)
            .map(|w| {
                let (x0, y0) = w[0];
                let (x1, y1) = w[1];
                let slope = (y1 - y0) / (x1 - x0);
                Secant {
                    x0,
                    x1,
                    slope,
                    intercept: y0 - slope * x0,
                }
            })
            .collect()
    }

    /// Breakpoint count.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false by construction (two breakpoints minimum).
    pub fn is_empty(&self) -> bool {
        false
    }
}
