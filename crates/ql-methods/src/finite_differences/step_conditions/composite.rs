//! Ordered collection of step conditions
//! (translates `fdmstepconditioncomposite.hpp`).

use super::{
    FdmAmericanStepCondition, FdmBermudanStepCondition, FdmDividendHandler, FdmSnapshotCondition,
    FdmStepCondition,
};
use crate::finite_differences::{
    meshers::FdmMesherComposite, utilities::FdmInnerValueCalculator,
};
use ql_core::{errors::Result, Real, Time};
use ql_instruments::{Dividend, Exercise, ExerciseType};
use std::sync::Arc;

/// Step conditions applied in registration order, together with the times
/// the rollback has to land on.
///
/// Corresponds to `QuantLib::FdmStepConditionComposite`.
#[derive(Debug, Clone, Default)]
pub struct FdmStepConditionComposite {
    stopping_times: Vec<Time>,
    conditions: Vec<FdmStepCondition>,
}

impl FdmStepConditionComposite {
    /// Composite of `conditions`; `stopping_times` are sorted and
    /// de-duplicated.
    pub fn new(
        stopping_times: impl IntoIterator<Item = Time>,
        conditions: Vec<FdmStepCondition>,
    ) -> Self {
        let mut stopping_times: Vec<Time> = stopping_times.into_iter().collect();
        stopping_times.sort_by(|a, b| a.total_cmp(b));
        stopping_times.dedup();
        Self {
            stopping_times,
            conditions,
        }
    }

    /// Sorted, distinct stopping times.
    pub fn stopping_times(&self) -> &[Time] {
        &self.stopping_times
    }

    /// The children, in application order.
    pub fn conditions(&self) -> &[FdmStepCondition] {
        &self.conditions
    }

    /// Apply every child at time `t`.
    pub fn apply_to(&mut self, a: &mut [Real], t: Time) -> Result<()> {
        for condition in &mut self.conditions {
            condition.apply_to(a, t)?;
        }
        Ok(())
    }

    /// The first snapshot among the children, searched depth-first.
    pub fn snapshot(&self) -> Option<&FdmSnapshotCondition> {
        self.conditions.iter().find_map(|c| match c {
            FdmStepCondition::Snapshot(s) => Some(s),
            FdmStepCondition::Composite(inner) => inner.snapshot(),
            _ => None,
        })
    }

    /// `composite` followed by `snapshot`, whose time becomes a stopping
    /// time. The snapshot runs last so it records the exercised values.
    pub fn join_conditions(
        snapshot: Option<FdmSnapshotCondition>,
        composite: FdmStepConditionComposite,
    ) -> Self {
        let mut stopping_times = composite.stopping_times.clone();
        let mut conditions = vec![FdmStepCondition::Composite(composite)];
        if let Some(s) = snapshot {
            stopping_times.push(s.time());
            conditions.push(FdmStepCondition::Snapshot(s));
        }
        Self::new(stopping_times, conditions)
    }

    /// Conditions of a vanilla option: cash dividends, then early exercise.
    ///
    /// Dividend times and Bermudan exercise times become stopping times; a
    /// European exercise adds no condition.
    ///
    /// # Errors
    /// Propagates dividend handler construction errors.
    pub fn vanilla_composite(
        dividends: &[Dividend],
        exercise: &Exercise,
        mesher: Arc<FdmMesherComposite>,
        calculator: Arc<dyn FdmInnerValueCalculator>,
    ) -> Result<Self> {
        let mut stopping_times = Vec::new();
        let mut conditions = Vec::new();

        if !dividends.is_empty() {
            let handler = FdmDividendHandler::from_dividends(dividends, Arc::clone(&mesher), 0)?;
            stopping_times.extend_from_slice(handler.dividend_times());
            conditions.push(FdmStepCondition::Dividend(handler));
        }

        match exercise.exercise_type() {
            ExerciseType::American => conditions.push(FdmStepCondition::American(
                FdmAmericanStepCondition::new(mesher, calculator),
            )),
            ExerciseType::Bermudan => {
                let bermudan =
                    FdmBermudanStepCondition::new(exercise.times().to_vec(), mesher, calculator);
                stopping_times.extend_from_slice(bermudan.exercise_times());
                conditions.push(FdmStepCondition::Bermudan(bermudan));
            }
            ExerciseType::European => {}
        }

        Ok(Self::new(stopping_times, conditions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finite_differences::{meshers::Uniform1dMesher, utilities::FdmLogInnerValue};
    use ql_instruments::{OptionType, PlainVanillaPayoff};

    fn setup() -> (Arc<FdmMesherComposite>, Arc<dyn FdmInnerValueCalculator>) {
        let mesher = Arc::new(FdmMesherComposite::from_1d(
            Uniform1dMesher::new(4.0, 5.0, 11).unwrap(),
        ));
        let payoff = Arc::new(PlainVanillaPayoff::new(OptionType::Put, 100.0));
        let calc: Arc<dyn FdmInnerValueCalculator> =
            Arc::new(FdmLogInnerValue::new(payoff, Arc::clone(&mesher), 0));
        (mesher, calc)
    }

    #[test]
    fn stopping_times_are_sorted_and_distinct() {
        let c = FdmStepConditionComposite::new(vec![0.5, 0.25, 0.5, 0.75], vec![]);
        assert_eq!(c.stopping_times(), &[0.25, 0.5, 0.75]);
    }

    #[test]
    fn vanilla_composite_collects_dividends_and_exercise() {
        let (mesher, calc) = setup();
        let exercise = Exercise::bermudan(vec![0.5, 1.0]).unwrap();
        let divs = [Dividend::new(0.3, 1.0), Dividend::new(0.5, 1.0)];
        let c = FdmStepConditionComposite::vanilla_composite(&divs, &exercise, mesher, calc)
            .unwrap();

        assert_eq!(c.stopping_times(), &[0.3, 0.5, 1.0]);
        assert!(matches!(c.conditions()[0], FdmStepCondition::Dividend(_)));
        assert!(matches!(c.conditions()[1], FdmStepCondition::Bermudan(_)));
    }

    #[test]
    fn american_exercise_adds_no_stopping_times() {
        let (mesher, calc) = setup();
        let exercise = Exercise::american(0.0, 1.0).unwrap();
        let c = FdmStepConditionComposite::vanilla_composite(&[], &exercise, mesher, calc).unwrap();
        assert!(c.stopping_times().is_empty());
        assert_eq!(c.conditions().len(), 1);

        let european = Exercise::european(1.0);
        let (mesher, calc) = setup();
        let c = FdmStepConditionComposite::vanilla_composite(&[], &european, mesher, calc).unwrap();
        assert!(c.conditions().is_empty());
    }

    #[test]
    fn joined_snapshot_sees_exercised_values() {
        let (mesher, calc) = setup();
        let exercise = Exercise::american(0.0, 1.0).unwrap();
        let inner =
            FdmStepConditionComposite::vanilla_composite(&[], &exercise, mesher, calc).unwrap();
        let mut joined =
            FdmStepConditionComposite::join_conditions(Some(FdmSnapshotCondition::new(0.01)), inner);
        assert_eq!(joined.stopping_times(), &[0.01]);

        let mut a = vec![0.0; 11];
        joined.apply_to(&mut a, 0.01).unwrap();
        let snap = joined.snapshot().and_then(|s| s.values()).unwrap();
        assert_eq!(snap, a.as_slice());
        assert!(snap[0] > 0.0);
    }
}
