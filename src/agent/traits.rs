use ndarray::Array1;

/// Source of per-step signals for one intersection.
///
/// Implementations wrap the simulator's lane and phase generators; the
/// agent only sees the resulting vectors.
pub trait IntersectionEnv {
    /// Raw lane observation, e.g. vehicle counts per incoming lane.
    fn observation(&self) -> Array1<f32>;

    /// Current phase indicator, one index per controlled intersection.
    fn phase(&self) -> Vec<usize>;

    /// Scalar reward for the last step.
    fn reward(&self) -> f32;
}
