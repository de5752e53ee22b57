//! Tests modelled on QuantLib `test-suite/fdmlinearop.cpp`.
//!
//! These integration tests assemble the framework by hand, the way an
//! engine does: mesher, operator, step conditions, scheme and rollback.

use approx::assert_abs_diff_eq;
use ql_instruments::{Dividend, Exercise, OptionType, Payoff, PlainVanillaPayoff};
use ql_methods::{
    FdmBackwardSolver, FdmBlackScholesMesher, FdmBlackScholesOp, FdmBlackScholesSolver,
    FdmBoundaryConditionSet, FdmInnerValueCalculator, FdmLogInnerValue, FdmMesherComposite,
    FdmSchemeDesc, FdmSolverDesc, FdmStepConditionComposite, FiniteDifferenceModel,
    ImplicitEulerScheme,
};
use ql_processes::GeneralizedBlackScholesProcess;
use std::sync::Arc;

const MATURITY: f64 = 1.0;

fn process() -> GeneralizedBlackScholesProcess {
    GeneralizedBlackScholesProcess::flat(100.0, 0.05, 0.01, 0.25)
}

fn mesher(process: &GeneralizedBlackScholesProcess, size: usize) -> Arc<FdmMesherComposite> {
    let mesher = FdmBlackScholesMesher::with_defaults(size, process, MATURITY, 100.0).unwrap();
    Arc::new(FdmMesherComposite::from_1d(mesher))
}

#[test]
fn implicit_euler_discounts_a_constant() {
    let process = process();
    let mesher = mesher(&process, 80);
    let mut op = FdmBlackScholesOp::new(Arc::clone(&mesher), &process, 100.0, 0, None);
    let bc_set = FdmBoundaryConditionSet::new();

    let scheme = ImplicitEulerScheme::new(&mut op, &bc_set);
    let mut model = FiniteDifferenceModel::new(scheme, [0.3, 0.7]);
    let mut a = vec![1.0; 80];
    model.rollback(&mut a, MATURITY, 0.0, 200, None).unwrap();

    for v in a {
        assert_abs_diff_eq!(v, (-0.05f64).exp(), epsilon = 1e-5);
    }
}

#[test]
fn american_put_stays_above_its_exercise_value() {
    let process = process();
    let mesher = mesher(&process, 100);
    let payoff: Arc<dyn Payoff> = Arc::new(PlainVanillaPayoff::new(OptionType::Put, 100.0));
    let calculator: Arc<dyn FdmInnerValueCalculator> = Arc::new(FdmLogInnerValue::new(
        Arc::clone(&payoff),
        Arc::clone(&mesher),
        0,
    ));
    let mut condition = FdmStepConditionComposite::vanilla_composite(
        &[Dividend::new(0.5, 2.0)],
        &Exercise::american(0.0, MATURITY).unwrap(),
        Arc::clone(&mesher),
        Arc::clone(&calculator),
    )
    .unwrap();
    assert_eq!(condition.stopping_times(), &[0.5]);

    let mut op = FdmBlackScholesOp::new(Arc::clone(&mesher), &process, 100.0, 0, None);
    let bc_set = FdmBoundaryConditionSet::new();
    let mut a: Vec<f64> = mesher
        .layout()
        .iter()
        .map(|it| calculator.avg_inner_value(&it, MATURITY))
        .collect();
    FdmBackwardSolver::new(&mut op, &bc_set, &mut condition, FdmSchemeDesc::douglas())
        .rollback(&mut a, MATURITY, 0.0, 100, 0)
        .unwrap();

    for (i, x) in mesher.locations(0).iter().enumerate() {
        assert!(a[i] >= payoff.value(x.exp()) - 1e-12, "node {i}");
    }
}

#[test]
fn european_prices_satisfy_put_call_parity() {
    let process = process();
    let price = |option_type| {
        let mesher = mesher(&process, 200);
        let payoff: Arc<dyn Payoff> = Arc::new(PlainVanillaPayoff::new(option_type, 100.0));
        let calculator: Arc<dyn FdmInnerValueCalculator> =
            Arc::new(FdmLogInnerValue::new(payoff, Arc::clone(&mesher), 0));
        let condition = FdmStepConditionComposite::vanilla_composite(
            &[],
            &Exercise::european(MATURITY),
            Arc::clone(&mesher),
            Arc::clone(&calculator),
        )
        .unwrap();
        let desc = FdmSolverDesc {
            mesher,
            bc_set: FdmBoundaryConditionSet::new(),
            condition,
            calculator,
            maturity: MATURITY,
            time_steps: 100,
            damping_steps: 0,
        };
        FdmBlackScholesSolver::new(&process, 100.0, &desc, FdmSchemeDesc::douglas(), None)
            .unwrap()
            .value_at(100.0)
    };

    // call and put carry separate truncation errors on a 200-point grid
    let parity = 100.0 * (-0.01f64).exp() - 100.0 * (-0.05f64).exp();
    assert_abs_diff_eq!(
        price(OptionType::Call) - price(OptionType::Put),
        parity,
        epsilon = 5e-3
    );
}
