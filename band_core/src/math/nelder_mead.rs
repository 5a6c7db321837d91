/// Outcome of a simplex minimization
#[derive(Debug, Clone)]
pub struct Minimum {
    pub x: Vec<f64>,
    pub value: f64,
    pub iterations: usize,
    pub converged: bool,
}

/// Derivative-free Nelder-Mead simplex minimizer
#[derive(Debug, Clone)]
pub struct NelderMead {
    max_iterations: usize,
    tolerance: f64,
    initial_step: f64,
}

impl NelderMead {
    const REFLECT: f64 = 1.0;
    const EXPAND: f64 = 2.0;
    const CONTRACT: f64 = 0.5;
    const SHRINK: f64 = 0.5;

    pub fn new(max_iterations: usize, tolerance: f64) -> Self {
        Self {
            max_iterations,
            tolerance,
            initial_step: 0.25,
        }
    }

    /// Minimize `f` starting from `x0`.
    ///
    /// Non-finite objective values are treated as +inf. Converged when the
    /// spread of objective values over the simplex drops below
    /// `tolerance * (1 + |best|)`.
    pub fn minimize<F>(&self, mut f: F, x0: &[f64]) -> Minimum
    where
        F: FnMut(&[f64]) -> f64,
    {
        let n = x0.len();
        let mut eval = |x: &[f64]| {
            let v = f(x);
            if v.is_finite() {
                v
            } else {
                f64::INFINITY
            }
        };

        let mut simplex: Vec<(Vec<f64>, f64)> = Vec::with_capacity(n + 1);
        simplex.push((x0.to_vec(), eval(x0)));
        for i in 0..n {
            let mut x = x0.to_vec();
            x[i] += self.initial_step;
            let v = eval(&x);
            simplex.push((x, v));
        }

        let mut iterations = 0;
        let mut converged = false;

        while iterations < self.max_iterations {
            simplex.sort_by(|a, b| a.1.total_cmp(&b.1));

            let best = simplex[0].1;
            let worst = simplex[n].1;
            if best.is_finite() && (worst - best).abs() <= self.tolerance * (1.0 + best.abs()) {
                converged = true;
                break;
            }
            iterations += 1;

            let centroid: Vec<f64> = (0..n)
                .map(|j| simplex[..n].iter().map(|(x, _)| x[j]).sum::<f64>() / n as f64)
                .collect();
            let along = |coef: f64, from: &[f64]| -> Vec<f64> {
                centroid
                    .iter()
                    .zip(from)
                    .map(|(c, x)| c + coef * (x - c))
                    .collect()
            };

            let worst_x = simplex[n].0.clone();
            let reflected = along(-Self::REFLECT, &worst_x);
            let f_reflected = eval(&reflected);

            if f_reflected < best {
                let expanded = along(-Self::EXPAND, &worst_x);
                let f_expanded = eval(&expanded);
                simplex[n] = if f_expanded < f_reflected {
                    (expanded, f_expanded)
                } else {
                    (reflected, f_reflected)
                };
                continue;
            }

            if f_reflected < simplex[n - 1].1 {
                simplex[n] = (reflected, f_reflected);
                continue;
            }

            let (contracted, f_contracted, accept) = if f_reflected < worst {
                let x = along(Self::CONTRACT, &reflected);
                let v = eval(&x);
                let ok = v <= f_reflected;
                (x, v, ok)
            } else {
                let x = along(Self::CONTRACT, &worst_x);
                let v = eval(&x);
                let ok = v < worst;
                (x, v, ok)
            };

            if accept {
                simplex[n] = (contracted, f_contracted);
                continue;
            }

            let best_x = simplex[0].0.clone();
            for vertex in simplex.iter_mut().skip(1) {
                let x: Vec<f64> = best_x
                    .iter()
                    .zip(&vertex.0)
                    .map(|(b, x)| b + Self::SHRINK * (x - b))
                    .collect();
                let v = eval(&x);
                *vertex = (x, v);
            }
        }

        simplex.sort_by(|a, b| a.1.total_cmp(&b.1));
        let (x, value) = simplex.swap_remove(0);
        Minimum {
            x,
            value,
            iterations,
            converged,
        }
    }
}
