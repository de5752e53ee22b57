//! Early exercise at every step (translates `fdmamericanstepcondition.hpp`).

use crate::finite_differences::{
    meshers::FdmMesherComposite, utilities::FdmInnerValueCalculator,
};
use ql_core::{Real, Time};
use std::sync::Arc;

/// Clamps the solution from below by the exercise value, at every call.
///
/// Applying it twice at the same time is the same as applying it once.
///
/// Corresponds to `QuantLib::FdmAmericanStepCondition`.
#[derive(Debug, Clone)]
pub struct FdmAmericanStepCondition {
    mesher: Arc<FdmMesherComposite>,
    calculator: Arc<dyn FdmInnerValueCalculator>,
}

impl FdmAmericanStepCondition {
    /// Exercise against `calculator` on the points of `mesher`.
    pub fn new(
        mesher: Arc<FdmMesherComposite>,
        calculator: Arc<dyn FdmInnerValueCalculator>,
    ) -> Self {
        Self { mesher, calculator }
    }

    /// `a[i] = max(a[i], inner_value(i, t))`.
    pub fn apply_to(&self, a: &mut [Real], t: Time) {
        for iter in self.mesher.layout().iter() {
            let inner = self.calculator.inner_value(&iter, t);
            if inner > a[iter.index] {
                a[iter.index] = inner;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finite_differences::{meshers::Uniform1dMesher, utilities::FdmLogInnerValue};
    use ql_instruments::{OptionType, PlainVanillaPayoff};
    use proptest::prelude::*;

    fn put_condition() -> (Arc<FdmMesherComposite>, FdmAmericanStepCondition) {
        let mesher = Arc::new(FdmMesherComposite::from_1d(
            Uniform1dMesher::new(80f64.ln(), 125f64.ln(), 21).unwrap(),
        ));
        let payoff = Arc::new(PlainVanillaPayoff::new(OptionType::Put, 100.0));
        let calc = Arc::new(FdmLogInnerValue::new(payoff, Arc::clone(&mesher), 0));
        (Arc::clone(&mesher), FdmAmericanStepCondition::new(mesher, calc))
    }

    #[test]
    fn clamps_to_the_exercise_value() {
        let (mesher, cond) = put_condition();
        let mut a = vec![0.0; 21];
        cond.apply_to(&mut a, 0.5);
        for (v, x) in a.iter().zip(mesher.locations(0)) {
            assert_eq!(*v, (100.0 - x.exp()).max(0.0));
        }
    }

    proptest! {
        #[test]
        fn applying_twice_is_applying_once(
            values in proptest::collection::vec(-5.0..30.0f64, 21),
            t in 0.0..2.0f64,
        ) {
            let (_, cond) = put_condition();
            let mut once = values.clone();
            cond.apply_to(&mut once, t);
            let mut twice = once.clone();
            cond.apply_to(&mut twice, t);
            prop_assert_eq!(&once, &twice);
            for (clamped, original) in once.iter().zip(&values) {
                prop_assert!(clamped >= original);
            }
        }
    }
}
