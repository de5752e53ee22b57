//! Grids concentrated around one or more critical points
//! (translates `concentrating1dmesher.hpp`).
//!
//! Node density follows a sinh stretching around each point. With a single
//! point the stretching is closed-form; with several points the node map
//! solves the ODE
//!
//! ```text
//! dy/dx = a / sqrt(Σ 1 / (β_i + (y - p_i)²)),   y(0) = start,
//! ```
//!
//! where `a` is chosen by a root search so that `y(1) = end`.

use super::Fdm1dMesher;
use ql_core::{errors::Result, Real, Size, QL_EPSILON};
use ql_math::{close, close_enough, AdaptiveRungeKutta, Brent, Interpolation1D, LinearInterpolation};
use std::ops::Deref;

/// Non-uniform mesher concentrating nodes around critical points.
///
/// Corresponds to `QuantLib::Concentrating1dMesher`.
#[derive(Debug, Clone, PartialEq)]
pub struct Concentrating1dMesher(Fdm1dMesher);

impl Concentrating1dMesher {
    /// Concentrate `size` nodes around `c_point = (point, density)`.
    ///
    /// A smaller density concentrates more strongly. With
    /// `require_c_point` the point itself becomes a node. Without a point the
    /// grid is uniform.
    ///
    /// # Errors
    /// `Precondition` if `end <= start`, the point lies outside
    /// `[start, end]`, the density is not positive, or the point is required
    /// but not given.
    pub fn new(
        start: Real,
        end: Real,
        size: Size,
        c_point: Option<(Real, Real)>,
        require_c_point: bool,
    ) -> Result<Self> {
        ql_core::ensure!(end > start, "end ({end}) must be larger than start ({start})");
        ql_core::ensure!(size >= 2, "a mesher needs at least two nodes, got {size}");
        ql_core::ensure!(
            !require_c_point || c_point.is_some(),
            "concentration point is required in grid but not given"
        );

        let dx = 1.0 / (size - 1) as Real;
        let mut locations = vec![0.0; size];

        match c_point {
            Some((c, density)) => {
                ql_core::ensure!(
                    (start..=end).contains(&c),
                    "concentration point ({c}) must lie in [{start}, {end}]"
                );
                let density = density * (end - start);
                ql_core::ensure!(density > 0.0, "density ({density}) must be positive");

                let c1 = ((start - c) / density).asinh();
                let c2 = ((end - c) / density).asinh();

                let transform = if require_c_point && size > 2 {
                    let mut u = vec![0.0];
                    let mut z = vec![0.0];
                    if !close(c, start) && !close(c, end) {
                        let z0 = -c1 / (c2 - c1);
                        let u0 = (z0 * (size - 1) as Real)
                            .round()
                            .clamp(1.0, (size - 2) as Real)
                            / (size - 1) as Real;
                        u.push(u0);
                        z.push(z0);
                    }
                    u.push(1.0);
                    z.push(1.0);
                    Some(LinearInterpolation::new(&u, &z)?)
                } else {
                    None
                };

                for (i, loc) in locations.iter_mut().enumerate().take(size - 1).skip(1) {
                    let l = match &transform {
                        Some(t) => t.operator(i as Real * dx),
                        None => i as Real * dx,
                    };
                    *loc = c + density * (c1 * (1.0 - l) + c2 * l).sinh();
                }
            }
            None => {
                for (i, loc) in locations.iter_mut().enumerate().take(size - 1).skip(1) {
                    *loc = start + i as Real * dx * (end - start);
                }
            }
        }

        locations[0] = start;
        locations[size - 1] = end;
        Ok(Self(Fdm1dMesher::from_locations(locations)?))
    }

    /// Concentrate `size` nodes around several `(point, density, required)`
    /// triples. The node map is integrated with tolerance `tol`, which is
    /// also the accuracy of the search for the scaling factor.
    ///
    /// # Errors
    /// `Precondition` if `end <= start` or no point is given; the root
    /// search errors `NotBracketed` / `MaxEvaluationsExceeded` if no grid
    /// reaching `end` is found.
    pub fn with_points(
        start: Real,
        end: Real,
        size: Size,
        c_points: &[(Real, Real, bool)],
        tol: Real,
    ) -> Result<Self> {
        ql_core::ensure!(end > start, "end ({end}) must be larger than start ({start})");
        ql_core::ensure!(size >= 2, "a mesher needs at least two nodes, got {size}");
        ql_core::ensure!(!c_points.is_empty(), "no concentration points given");

        let points: Vec<Real> = c_points.iter().map(|&(p, _, _)| p).collect();
        let betas: Vec<Real> = c_points
            .iter()
            .map(|&(_, density, _)| (density * (end - start)).powi(2))
            .collect();

        let n = points.len() as Real;
        let a_init: Real = points
            .iter()
            .zip(&betas)
            .map(|(&p, &beta)| ((end - p) / beta).asinh() - ((start - p) / beta).asinh())
            .sum::<Real>()
            / n;

        let node_map = NodeMap {
            points: &points,
            betas: &betas,
            rk: AdaptiveRungeKutta::new(tol, 1e-4, 0.0),
        };
        let a = Brent::new().try_solve(
            |a| Ok(node_map.solve(a, start, 0.0, 1.0)? - end),
            tol,
            a_init,
            0.1 * a_init,
        )?;

        let dx = 1.0 / (size - 1) as Real;
        let x: Vec<Real> = (0..size).map(|i| i as Real * dx).collect();
        let mut y = vec![start; size];
        for i in 1..size {
            y[i] = node_map.solve(a, y[i - 1], x[i - 1], x[i])?;
        }

        // remove the integration drift so that y(1) == end
        let dy = y[size - 1] - end;
        for (i, yi) in y.iter_mut().enumerate().skip(1) {
            *yi -= i as Real * dx * dy;
        }

        let ode_solution = LinearInterpolation::new(&x, &y)?;

        let mut w = vec![(0.0, 0.0)];
        for &(p, _, required) in c_points {
            if required && p > start && p < end {
                let j = y.partition_point(|&v| v < p).min(size - 1);
                let e = Brent::new().solve(
                    |u| ode_solution.operator(u) - p,
                    QL_EPSILON,
                    x[j],
                    0.5 / size as Real,
                )?;
                w.push((x[size - 2].min(x[j]), e));
            }
        }
        w.push((1.0, 1.0));
        w.sort_by(|l, r| l.0.total_cmp(&r.0));
        w.dedup_by(|next, kept| close_enough(next.0, kept.0, 1000));

        let u: Vec<Real> = w.iter().map(|p| p.0).collect();
        let z: Vec<Real> = w.iter().map(|p| p.1).collect();
        let transform = LinearInterpolation::new(&u, &z)?;

        let locations = x
            .iter()
            .map(|&xi| ode_solution.operator(transform.operator(xi)))
            .collect();
        Ok(Self(Fdm1dMesher::from_locations(locations)?))
    }
}

struct NodeMap<'a> {
    points: &'a [Real],
    betas: &'a [Real],
    rk: AdaptiveRungeKutta,
}

impl NodeMap<'_> {
    fn solve(&self, a: Real, y0: Real, x0: Real, x1: Real) -> Result<Real> {
        self.rk.integrate_scalar(
            |_, y| {
                let s: Real = self
                    .points
                    .iter()
                    .zip(self.betas)
                    .map(|(&p, &beta)| 1.0 / (beta + (y - p) * (y - p)))
                    .sum();
                a / s.sqrt()
            },
            y0,
            x0,
            x1,
        )
    }
}

impl Deref for Concentrating1dMesher {
    type Target = Fdm1dMesher;

    fn deref(&self) -> &Fdm1dMesher {
        &self.0
    }
}

impl From<Concentrating1dMesher> for Fdm1dMesher {
    fn from(m: Concentrating1dMesher) -> Self {
        m.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    fn distance_to_grid(m: &Fdm1dMesher, p: Real) -> Real {
        m.locations()
            .iter()
            .map(|&l| (l - p).abs())
            .fold(Real::INFINITY, Real::min)
    }

    #[test]
    fn required_point_is_on_the_grid() {
        let m = Concentrating1dMesher::new(-1.0, 2.0, 51, Some((0.3, 0.1)), true).unwrap();
        assert!(distance_to_grid(&m, 0.3) < 1e-8);
        assert_eq!(m.location(0), -1.0);
        assert_eq!(m.location(50), 2.0);
    }

    #[test]
    fn nodes_cluster_around_the_point() {
        let m = Concentrating1dMesher::new(0.0, 10.0, 101, Some((5.0, 0.05)), true).unwrap();
        let near = (0..100)
            .filter(|&i| (m.location(i) - 5.0).abs() < 1.0)
            .count();
        // a uniform grid would put about 20 nodes in that window
        assert!(near > 30, "only {near} nodes near the point");
    }

    #[test]
    fn no_point_means_uniform() {
        let m = Concentrating1dMesher::new(0.0, 1.0, 11, None, false).unwrap();
        for i in 0..10 {
            assert_abs_diff_eq!(m.dplus(i), 0.1, epsilon = 1e-12);
        }
    }

    #[test]
    fn rejects_inconsistent_input() {
        assert!(Concentrating1dMesher::new(1.0, 0.0, 11, None, false).is_err());
        assert!(Concentrating1dMesher::new(0.0, 1.0, 11, Some((2.0, 0.1)), false).is_err());
        assert!(Concentrating1dMesher::new(0.0, 1.0, 11, Some((0.5, 0.0)), false).is_err());
        assert!(Concentrating1dMesher::new(0.0, 1.0, 11, None, true).is_err());
    }

    #[test]
    fn multi_point_required_points_are_on_the_grid() {
        let m = Concentrating1dMesher::with_points(
            -2.0,
            3.0,
            101,
            &[(0.0, 0.1, true), (1.5, 0.05, true)],
            1e-8,
        )
        .unwrap();
        assert_eq!(m.size(), 101);
        assert_abs_diff_eq!(m.location(0), -2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(m.location(100), 3.0, epsilon = 1e-12);
        assert!(distance_to_grid(&m, 0.0) < 1e-8);
        assert!(distance_to_grid(&m, 1.5) < 1e-8);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn single_point_mesher_is_increasing(
            c in 0.05..0.95f64,
            density in 0.01..1.0f64,
            size in 5usize..120,
        ) {
            let m = Concentrating1dMesher::new(0.0, 1.0, size, Some((c, density)), true).unwrap();
            prop_assert!(m.locations().windows(2).all(|w| w[1] > w[0]));
            prop_assert!(distance_to_grid(&m, c) < 1e-8);
        }
    }
}
