use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Analysis configuration
// ---------------------------------------------------------------------------

/// Which cycle represents an amplitude level on the skeleton curve when the
/// loading protocol repeats cycles at the same target displacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepresentativeRule {
    /// First cycle in time order, the virgin response at each level.
    /// The common envelope convention; later repetitions show degraded
    /// stiffness.
    #[default]
    FirstCycle,
    /// Cycle with the largest absolute peak force.
    MaxForce,
    /// Last cycle in time order.
    LastCycle,
}

/// All knobs of the pipeline, passed explicitly per invocation.
///
/// Tolerances are in displacement units. The optional ones default to a
/// fraction of the displacement range observed in the cleaned series, so no
/// absolute magnitude is baked in (test rigs differ by orders of magnitude);
/// see [`AnalysisConfig::resolve`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Moving-average window applied to displacement and force after
    /// cleaning. `<= 1` disables smoothing. The window is centered, so an
    /// even width behaves as the next odd width.
    pub smoothing_window: usize,

    /// Displacement reversals smaller than this are ignored as noise.
    /// `None` → 2 % of the displacement range.
    pub noise_tolerance: Option<f64>,

    /// A loop counts as closed when it returns within this distance of its
    /// starting displacement. `None` → 5 % of the displacement range.
    pub closure_tolerance: Option<f64>,

    /// Peaks whose displacement differs by less than this land in the same
    /// skeleton amplitude bucket. `None` → 5 % of the displacement range.
    pub amplitude_tolerance: Option<f64>,

    /// Representative-cycle rule for repeated amplitude levels.
    pub representative: RepresentativeRule,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            smoothing_window: 1,
            noise_tolerance: None,
            closure_tolerance: None,
            amplitude_tolerance: None,
            representative: RepresentativeRule::default(),
        }
    }
}

/// Tolerances resolved against one case's displacement range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerances {
    pub noise: f64,
    pub closure: f64,
    pub amplitude: f64,
}

impl AnalysisConfig {
    /// Resolve the optional tolerances for a case whose cleaned displacement
    /// series spans `displacement_range` (max − min, `>= 0`).
    pub fn resolve(&self, displacement_range: f64) -> Tolerances {
        let range = if displacement_range.is_finite() && displacement_range > 0.0 {
            displacement_range
        } else {
            0.0
        };
        Tolerances {
            noise: self.noise_tolerance.unwrap_or(0.02 * range),
            closure: self.closure_tolerance.unwrap_or(0.05 * range),
            amplitude: self.amplitude_tolerance.unwrap_or(0.05 * range),
        }
    }
}
