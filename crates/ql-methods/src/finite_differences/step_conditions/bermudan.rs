//! Early exercise on a fixed schedule
//! (translates `fdmbermudanstepcondition.hpp`).

use crate::finite_differences::{
    meshers::FdmMesherComposite, utilities::FdmInnerValueCalculator,
};
use ql_core::{Real, Time};
use std::sync::Arc;

const EXERCISE_TOLERANCE: Time = 1e-12;

/// Clamps the solution by the exercise value, but only at the exercise
/// times. The times must be registered as stopping times so the rollback
/// lands on them.
///
/// Corresponds to `QuantLib::FdmBermudanStepCondition`.
#[derive(Debug, Clone)]
pub struct FdmBermudanStepCondition {
    exercise_times: Vec<Time>,
    mesher: Arc<FdmMesherComposite>,
    calculator: Arc<dyn FdmInnerValueCalculator>,
}

impl FdmBermudanStepCondition {
    /// Exercise at `exercise_times` (any order) against `calculator`.
    pub fn new(
        mut exercise_times: Vec<Time>,
        mesher: Arc<FdmMesherComposite>,
        calculator: Arc<dyn FdmInnerValueCalculator>,
    ) -> Self {
        exercise_times.sort_by(|a, b| a.total_cmp(b));
        Self {
            exercise_times,
            mesher,
            calculator,
        }
    }

    /// Sorted exercise times.
    pub fn exercise_times(&self) -> &[Time] {
        &self.exercise_times
    }

    /// Clamp if `t` is an exercise time.
    pub fn apply_to(&self, a: &mut [Real], t: Time) {
        if !self
            .exercise_times
            .iter()
            .any(|&e| (e - t).abs() < EXERCISE_TOLERANCE)
        {
            return;
        }
        for iter in self.mesher.layout().iter() {
            a[iter.index] = a[iter.index].max(self.calculator.inner_value(&iter, t));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finite_differences::{meshers::Uniform1dMesher, utilities::FdmLogInnerValue};
    use ql_instruments::{OptionType, PlainVanillaPayoff};

    #[test]
    fn exercises_only_on_schedule() {
        let mesher = Arc::new(FdmMesherComposite::from_1d(
            Uniform1dMesher::new(4.0, 5.0, 11).unwrap(),
        ));
        let payoff = Arc::new(PlainVanillaPayoff::new(OptionType::Call, 60.0));
        let calc = Arc::new(FdmLogInnerValue::new(payoff, Arc::clone(&mesher), 0));
        let cond = FdmBermudanStepCondition::new(vec![0.75, 0.25, 0.5], mesher, calc);
        assert_eq!(cond.exercise_times(), &[0.25, 0.5, 0.75]);

        let mut a = vec![0.0; 11];
        cond.apply_to(&mut a, 0.3);
        assert!(a.iter().all(|&v| v == 0.0));

        cond.apply_to(&mut a, 0.5);
        assert_eq!(a[10], 5f64.exp() - 60.0);
        assert_eq!(a[0], 0.0);
    }
}
