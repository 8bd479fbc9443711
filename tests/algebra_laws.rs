use power_algebra::{
    growth_profile, params::MERSENNE_61, AlgebraError, DimensionError, MultilinearOperator,
    ParameterSet, PowerEngine, Vector,
};
use proptest::prelude::*;

fn operator(params: &ParameterSet) -> MultilinearOperator {
    MultilinearOperator::from_params(params).unwrap()
}

fn truncated(op: &MultilinearOperator, values: [u64; 4]) -> Vector {
    op.vector(&values[..op.dim()]).unwrap()
}

#[test]
fn test_products_are_neither_commutative_nor_associative() {
    for params in [ParameterSet::toy_m3(), ParameterSet::m3(), ParameterSet::m4()] {
        let op = operator(&params);
        let a = truncated(&op, [1, 2, 3, 4]);
        let b = truncated(&op, [5, 6, 7, 8]);
        let c = truncated(&op, [9, 10, 11, 12]);
        assert_ne!(op.apply(&a, &b).unwrap(), op.apply(&b, &a).unwrap());
        let left = op.apply(&op.apply(&a, &b).unwrap(), &c).unwrap();
        let right = op.apply(&a, &op.apply(&b, &c).unwrap()).unwrap();
        assert_ne!(left, right, "{}", params.name());
    }
}

#[test]
fn test_toy_exchange_scenario() {
    let params = ParameterSet::toy_m3();
    let op = operator(&params);
    let engine = PowerEngine::new(&op);
    let g = *params.base();
    let g2 = engine.power(&g, 2).unwrap();
    let g3 = engine.power(&g, 3).unwrap();
    let g5 = engine.power(&g, 5).unwrap();
    assert_eq!(g5.coords(), &[5, 8, 8]);
    assert_eq!(op.apply(&g2, &g3).unwrap(), g5);
    assert_eq!(op.apply(&g3, &g2).unwrap(), g5);
}

#[test]
fn test_dimension_mismatch_is_reported() {
    let m3 = operator(&ParameterSet::m3());
    let m4 = operator(&ParameterSet::m4());
    let short = m3.vector(&[1, 2, 3]).unwrap();
    let long = m4.vector(&[1, 2, 3, 4]).unwrap();
    let expected = DimensionError::Mismatch {
        expected: 4,
        actual: 3,
    };
    assert_eq!(m4.apply(&short, &long), Err(AlgebraError::Dimension(expected.clone())));
    assert_eq!(m4.apply(&long, &short), Err(AlgebraError::Dimension(expected)));
    assert!(PowerEngine::new(&m4).power(&short, 3).is_err());
}

#[test]
fn test_growth_is_strictly_increasing() {
    for params in [ParameterSet::m3(), ParameterSet::m4()] {
        let op = operator(&params);
        let profile = growth_profile(&op, 4).unwrap();
        assert_eq!(profile.len(), 4);
        for pair in profile.windows(2) {
            assert!(pair[1].monomials > pair[0].monomials);
        }
        for stats in &profile {
            assert_eq!(stats.degree as u64, stats.exponent);
        }
    }
}

fn coords(dim: usize) -> impl Strategy<Value = Vec<u64>> {
    proptest::collection::vec(0..MERSENNE_61, dim)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_m3_power_associative(values in coords(3), m in 1u64..48, n in 1u64..48) {
        let op = operator(&ParameterSet::m3());
        let engine = PowerEngine::new(&op);
        let a = op.vector(&values).unwrap();
        prop_assert_eq!(engine.power(&a, 1).unwrap(), a);
        let am = engine.power(&a, m).unwrap();
        let an = engine.power(&a, n).unwrap();
        let mn = op.apply(&am, &an).unwrap();
        prop_assert_eq!(mn, engine.power(&a, m + n).unwrap());
        prop_assert_eq!(mn, op.apply(&an, &am).unwrap());
    }

    #[test]
    fn prop_m4_power_associative(values in coords(4), m in 1u64..48, n in 1u64..48) {
        let op = operator(&ParameterSet::m4());
        let engine = PowerEngine::new(&op);
        let a = op.vector(&values).unwrap();
        prop_assert_eq!(engine.power(&a, 1).unwrap(), a);
        let am = engine.power(&a, m).unwrap();
        let an = engine.power(&a, n).unwrap();
        let mn = op.apply(&am, &an).unwrap();
        prop_assert_eq!(mn, engine.power(&a, m + n).unwrap());
        prop_assert_eq!(mn, op.apply(&an, &am).unwrap());
    }

    #[test]
    fn prop_fast_power_matches_left_fold(values in coords(4), k in 1u64..96) {
        let op = operator(&ParameterSet::m4());
        let engine = PowerEngine::new(&op);
        let a = op.vector(&values).unwrap();
        prop_assert_eq!(engine.power(&a, k).unwrap(), engine.power_naive(&a, k).unwrap());
        prop_assert_eq!(engine.power_naive(&a, 1).unwrap(), a);
    }

    #[test]
    fn prop_large_exponents_split_additively(values in coords(3), m in 1u64..(1 << 40), n in 1u64..(1 << 40)) {
        let op = operator(&ParameterSet::m3());
        let engine = PowerEngine::new(&op);
        let a = op.vector(&values).unwrap();
        let joined = op
            .apply(&engine.power(&a, m).unwrap(), &engine.power(&a, n).unwrap())
            .unwrap();
        prop_assert_eq!(joined, engine.power(&a, m + n).unwrap());
    }
}
