//! Rollback driver (translates `ql/methods/finitedifferences/finitedifferencemodel.hpp`).

use crate::finite_differences::{schemes::FdmEvolver, step_conditions::FdmStepConditionComposite};
use ql_core::{errors::Result, Real, Size, Time, QL_EPSILON};
use tracing::trace;

/// Rolls a solution back in time with an evolver, landing exactly on every
/// stopping time in between and applying the step conditions there and at
/// the end of every step.
///
/// Corresponds to `QuantLib::FiniteDifferenceModel`.
#[derive(Debug)]
pub struct FiniteDifferenceModel<E: FdmEvolver> {
    evolver: E,
    stopping_times: Vec<Time>,
}

impl<E: FdmEvolver> FiniteDifferenceModel<E> {
    /// Model driving `evolver`; `stopping_times` are sorted and
    /// de-duplicated.
    pub fn new(evolver: E, stopping_times: impl IntoIterator<Item = Time>) -> Self {
        let mut stopping_times: Vec<Time> = stopping_times.into_iter().collect();
        stopping_times.sort_by(|a, b| a.total_cmp(b));
        stopping_times.dedup();
        Self {
            evolver,
            stopping_times,
        }
    }

    /// The evolver.
    pub fn evolver(&self) -> &E {
        &self.evolver
    }

    /// Sorted stopping times.
    pub fn stopping_times(&self) -> &[Time] {
        &self.stopping_times
    }

    /// Roll `a` from `from` back to `to` in `steps` equal steps.
    ///
    /// A step that would pass a stopping time is split there, and a grid
    /// time within `√ε` of a stopping time is moved onto it, so the
    /// conditions fire exactly once at every stopping time.
    ///
    /// # Errors
    /// `Precondition` if `from < to` or `steps == 0`; any scheme or
    /// condition error.
    pub fn rollback(
        &mut self,
        a: &mut [Real],
        from: Time,
        to: Time,
        steps: Size,
        mut condition: Option<&mut FdmStepConditionComposite>,
    ) -> Result<()> {
        ql_core::ensure!(from >= to, "trying to roll back from {from} to {to}");
        ql_core::ensure!(steps > 0, "at least one time step is required");

        let dt = (from - to) / steps as Real;
        self.evolver.set_step(dt);

        let mut apply = |a: &mut [Real], t: Time| -> Result<()> {
            match condition.as_deref_mut() {
                Some(c) => c.apply_to(a, t),
                None => Ok(()),
            }
        };

        if let Some(&last) = self.stopping_times.last() {
            if (last - from).abs() < QL_EPSILON {
                apply(a, from)?;
            }
        }

        let snap = QL_EPSILON.sqrt();
        let mut now = from;
        for i in 0..steps {
            // grid times are measured from `from` so rounding never accumulates
            let mut next = from - (i + 1) as Real * dt;
            if i + 1 == steps || (to - next).abs() < snap {
                next = to;
            } else if let Some(&s) = self
                .stopping_times
                .iter()
                .find(|&&s| (s - next).abs() < snap)
            {
                next = s;
            }

            for &s in self.stopping_times.iter().rev() {
                if next < s && s < now {
                    trace!(from = now, stopping_time = s, "sub-step to stopping time");
                    self.evolver.set_step(now - s);
                    self.evolver.step(a, now)?;
                    apply(a, s)?;
                    now = s;
                }
            }

            if now > next {
                self.evolver.set_step(now - next);
                self.evolver.step(a, now)?;
                apply(a, next)?;
            }
            now = next;
        }
        self.evolver.set_step(dt);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finite_differences::step_conditions::{FdmSnapshotCondition, FdmStepCondition};
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    /// Keeps the current time in `a[0]` and counts the steps in `a[1]`.
    #[derive(Debug, Default)]
    struct Clock {
        dt: Option<Time>,
    }

    impl FdmEvolver for Clock {
        fn set_step(&mut self, dt: Time) {
            self.dt = Some(dt);
        }

        fn step(&mut self, a: &mut [Real], t: Time) -> Result<()> {
            let dt = crate::finite_differences::schemes::require_step(self.dt)?;
            assert_abs_diff_eq!(a[0], t, epsilon = 1e-12);
            a[0] = t - dt;
            a[1] += 1.0;
            Ok(())
        }
    }

    fn snapshots(times: &[Time]) -> FdmStepConditionComposite {
        let conditions = times
            .iter()
            .map(|&t| FdmStepCondition::Snapshot(FdmSnapshotCondition::new(t)))
            .collect();
        FdmStepConditionComposite::new(times.to_vec(), conditions)
    }

    fn recorded(c: &FdmStepConditionComposite) -> Vec<Option<Real>> {
        c.conditions()
            .iter()
            .map(|c| match c {
                FdmStepCondition::Snapshot(s) => s.values().map(|v| v[0]),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn plain_rollback_takes_equal_steps() {
        let mut model = FiniteDifferenceModel::new(Clock::default(), vec![]);
        let mut a = vec![1.0, 0.0];
        model.rollback(&mut a, 1.0, 0.0, 8, None).unwrap();
        assert_abs_diff_eq!(a[0], 0.0, epsilon = 1e-12);
        assert_eq!(a[1], 8.0);
    }

    #[test]
    fn stopping_times_split_steps() {
        let times = [0.15, 0.5, 0.55];
        let mut conditions = snapshots(&times);
        let mut model = FiniteDifferenceModel::new(Clock::default(), times);
        let mut a = vec![1.0, 0.0];
        model
            .rollback(&mut a, 1.0, 0.0, 4, Some(&mut conditions))
            .unwrap();

        // 0.5 is a grid time; 0.15 and 0.55 each split one step
        assert_eq!(a[1], 6.0);
        for (s, v) in times.iter().zip(recorded(&conditions)) {
            assert_abs_diff_eq!(v.unwrap(), *s, epsilon = 1e-12);
        }
    }

    #[test]
    fn condition_at_the_start_is_applied_first() {
        let mut conditions = snapshots(&[1.0]);
        let mut model = FiniteDifferenceModel::new(Clock::default(), vec![1.0]);
        let mut a = vec![1.0, 0.0];
        model
            .rollback(&mut a, 1.0, 0.5, 3, Some(&mut conditions))
            .unwrap();
        assert_eq!(recorded(&conditions), vec![Some(1.0)]);
    }

    /// Leaves the solution untouched.
    #[derive(Debug, Default)]
    struct Frozen;

    impl FdmEvolver for Frozen {
        fn set_step(&mut self, _dt: Time) {}

        fn step(&mut self, _a: &mut [Real], _t: Time) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn dividends_on_grid_times_are_paid_once() {
        use crate::finite_differences::{
            meshers::{FdmMesherComposite, Uniform1dMesher},
            step_conditions::FdmDividendHandler,
        };
        use std::sync::Arc;

        let mesher = Arc::new(FdmMesherComposite::from_1d(
            Uniform1dMesher::new(50f64.ln(), 150f64.ln(), 101).unwrap(),
        ));
        let times = vec![0.3, 0.6];
        let handler =
            FdmDividendHandler::new(times.clone(), vec![2.0, 1.0], Arc::clone(&mesher), 0)
                .unwrap();
        let spots = handler.spots().to_vec();

        // 0.3 and 0.6 are grid times for all of these, but 1 - k·dt misses
        // them by rounding
        for steps in [10, 20, 50, 100] {
            let mut conditions = FdmStepConditionComposite::new(
                times.clone(),
                vec![FdmStepCondition::Dividend(handler.clone())],
            );
            let mut model = FiniteDifferenceModel::new(Frozen, times.clone());
            let mut a = spots.clone();
            model
                .rollback(&mut a, 1.0, 0.0, steps, Some(&mut conditions))
                .unwrap();

            for (v, s) in a.iter().zip(&spots) {
                if s - 5.0 > spots[0] {
                    assert_abs_diff_eq!(*v, s - 3.0, epsilon = 1e-9);
                }
            }
        }
    }

    #[test]
    fn invalid_requests_fail() {
        let mut model = FiniteDifferenceModel::new(Clock::default(), vec![]);
        let mut a = vec![0.0, 0.0];
        assert!(model.rollback(&mut a, 0.0, 1.0, 10, None).is_err());
        assert!(model.rollback(&mut a, 1.0, 0.0, 0, None).is_err());
    }

    proptest! {
        #[test]
        fn every_stopping_time_is_landed_on(
            steps in 1usize..60,
            raw in proptest::collection::vec(0.0..1.0f64, 1..6),
        ) {
            let mut conditions = snapshots(&raw);
            let mut model = FiniteDifferenceModel::new(Clock::default(), raw.clone());
            let mut a = vec![1.0, 0.0];
            model.rollback(&mut a, 1.0, 0.0, steps, Some(&mut conditions)).unwrap();

            prop_assert!(a[0].abs() < 1e-12);
            for (c, v) in conditions.conditions().iter().zip(recorded(&conditions)) {
                if let FdmStepCondition::Snapshot(s) = c {
                    prop_assert!(v.is_some(), "stopping time {} missed", s.time());
                    prop_assert!((v.unwrap() - s.time()).abs() < 1e-12);
                }
            }
        }
    }
}
