use crate::error::{ConstructionError, Result};

/// Derivative-free Nelder-Mead simplex minimizer over two parameters.
///
/// Standard reflection/expansion/contraction/shrink moves on a three-vertex
/// simplex. Convergence requires both the vertex spread and the value spread
/// to fall below `tolerance`; exhausting `max_iters` first is an error rather
/// than a silently unconverged result.
#[derive(Debug, Clone, Copy)]
pub struct NelderMead {
    /// Edge length of the initial simplex around the start point.
    pub initial_step: f64,
    /// Convergence threshold on both vertex spread and value spread.
    pub tolerance: f64,
    /// Hard cap on iterations before giving up.
    pub max_iters: usize,
}

impl Default for NelderMead {
    fn default() -> Self {
        Self {
            initial_step: 0.1,
            tolerance: 1e-5,
            max_iters: 500,
        }
    }
}

impl NelderMead {
    /// Minimizes `f` starting from `start`, returning the best parameters.
    ///
    /// # Errors
    ///
    /// Returns `ConstructionError::SolverStalled` if the simplex has not
    /// converged after `max_iters` iterations.
    pub fn minimize<F>(&self, mut f: F, start: [f64; 2]) -> Result<[f64; 2]>
    where
        F: FnMut([f64; 2]) -> f64,
    {
        let h = self.initial_step;
        let mut simplex = [
            start,
            [start[0] + h, start[1]],
            [start[0], start[1] + h],
        ];
        let mut values = [f(simplex[0]), f(simplex[1]), f(simplex[2])];

        for _ in 0..self.max_iters {
            let mut order = [0usize, 1, 2];
            order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
            let (best, mid, worst) = (order[0], order[1], order[2]);

            let spread_x = (simplex[mid][0] - simplex[best][0])
                .abs()
                .max((simplex[worst][0] - simplex[best][0]).abs());
            let spread_y = (simplex[mid][1] - simplex[best][1])
                .abs()
                .max((simplex[worst][1] - simplex[best][1]).abs());
            let value_spread = (values[worst] - values[best]).abs();
            if spread_x.max(spread_y) <= self.tolerance && value_spread <= self.tolerance {
                return Ok(simplex[best]);
            }

            let centroid = [
                (simplex[best][0] + simplex[mid][0]) / 2.0,
                (simplex[best][1] + simplex[mid][1]) / 2.0,
            ];
            let reflected = [
                2.0 * centroid[0] - simplex[worst][0],
                2.0 * centroid[1] - simplex[worst][1],
            ];
            let f_reflected = f(reflected);

            if f_reflected < values[best] {
                let expanded = [
                    centroid[0] + 2.0 * (reflected[0] - centroid[0]),
                    centroid[1] + 2.0 * (reflected[1] - centroid[1]),
                ];
                let f_expanded = f(expanded);
                if f_expanded < f_reflected {
                    simplex[worst] = expanded;
                    values[worst] = f_expanded;
                } else {
                    simplex[worst] = reflected;
                    values[worst] = f_reflected;
                }
            } else if f_reflected < values[mid] {
                simplex[worst] = reflected;
                values[worst] = f_reflected;
            } else {
                let contracted = if f_reflected < values[worst] {
                    [
                        centroid[0] + 0.5 * (reflected[0] - centroid[0]),
                        centroid[1] + 0.5 * (reflected[1] - centroid[1]),
                    ]
                } else {
                    [
                        centroid[0] + 0.5 * (simplex[worst][0] - centroid[0]),
                        centroid[1] + 0.5 * (simplex[worst][1] - centroid[1]),
                    ]
                };
                let f_contracted = f(contracted);
                if f_contracted < values[worst].min(f_reflected) {
                    simplex[worst] = contracted;
                    values[worst] = f_contracted;
                } else {
                    // Shrink the two non-best vertices toward the best one.
                    for idx in [mid, worst] {
                        simplex[idx] = [
                            simplex[best][0] + 0.5 * (simplex[idx][0] - simplex[best][0]),
                            simplex[best][1] + 0.5 * (simplex[idx][1] - simplex[best][1]),
                        ];
                        values[idx] = f(simplex[idx]);
                    }
                }
            }
        }

        Err(ConstructionError::SolverStalled {
            max_iters: self.max_iters,
        }
        .into())
    }
}
