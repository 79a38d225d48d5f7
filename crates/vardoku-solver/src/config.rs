//! Solver settings.

/// Settings threaded explicitly into every solving call.
///
/// # Examples
///
/// ```
/// use vardoku_solver::SolverConfig;
///
/// let config = SolverConfig {
///     parallel: true,
///     ..SolverConfig::default()
/// };
/// assert_eq!(config.max_bifurcation_depth, 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Evaluate clues and bifurcation branches on the rayon thread pool.
    pub parallel: bool,
    /// How many nested hypotheses bifurcation may stack.
    pub max_bifurcation_depth: usize,
    /// Largest naked or hidden subset searched. Values above 8 are clamped.
    pub max_subset_size: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            parallel: false,
            max_bifurcation_depth: 1,
            max_subset_size: 4,
        }
    }
}
