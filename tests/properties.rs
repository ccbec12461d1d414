//! Property tests for the algebra of `Factor` operations

use jerome_factor::{Factor, Variable};

use ndarray::Array1;
use proptest::prelude::*;

fn x() -> Variable {
    Variable::binary("X")
}

fn y() -> Variable {
    Variable::discrete("Y", 3).unwrap()
}

fn z() -> Variable {
    Variable::binary("Z")
}

fn w() -> Variable {
    Variable::discrete("W", 4).unwrap()
}

/// A table of `len` entries in [0.01, 0.99] with two decimal places
fn table(len: usize) -> impl Strategy<Value = Array1<f64>> {
    prop::collection::vec(1u32..100, len)
        .prop_map(|v| v.into_iter().map(|e| e as f64 / 100.).collect::<Array1<f64>>())
}

/// Factors over (X, Y), (Y, Z) and (Z, X, W), each in either declaration order
fn factors() -> impl Strategy<Value = (Factor, Factor, Factor)> {
    (table(6), table(6), table(16), any::<bool>(), any::<bool>()).prop_map(|(ta, tb, tc, flip_a, flip_b)| {
        let a = if flip_a { vec![y(), x()] } else { vec![x(), y()] };
        let b = if flip_b { vec![z(), y()] } else { vec![y(), z()] };

        (
            Factor::from_parts(a, ta).unwrap(),
            Factor::from_parts(b, tb).unwrap(),
            Factor::from_parts(vec![z(), x(), w()], tc).unwrap()
        )
    })
}

fn sorted(scope: Vec<&str>) -> Vec<String> {
    let mut s: Vec<String> = scope.into_iter().map(String::from).collect();
    s.sort();
    s
}

proptest! {
    #[test]
    fn product_commutes((a, b, _) in factors()) {
        let ab = a.product(&b).unwrap();
        let ba = b.product(&a).unwrap();

        prop_assert_eq!(sorted(ab.scope()), vec!["X", "Y", "Z"]);
        prop_assert_eq!(sorted(ab.scope()), sorted(ba.scope()));
        prop_assert!(ab.validate().is_ok());
        prop_assert!(ba.validate().is_ok());

        for assn in ab.assignments() {
            prop_assert_eq!(ab.value(&assn).unwrap(), ba.value(&assn).unwrap());
        }
    }

    #[test]
    fn product_matches_pointwise((a, b, _) in factors()) {
        let ab = a.product(&b).unwrap();

        for assn in ab.assignments() {
            let expected = a.value(&assn).unwrap() * b.value(&assn).unwrap();
            prop_assert!((expected - ab.value(&assn).unwrap()).abs() < 1e-4);
        }
    }

    #[test]
    fn product_associates((a, b, c) in factors()) {
        let left = a.product(&b).unwrap().product(&c).unwrap();
        let right = a.product(&b.product(&c).unwrap()).unwrap();

        prop_assert_eq!(sorted(left.scope()), sorted(right.scope()));
        prop_assert_eq!(48, left.len());

        for assn in left.assignments() {
            let l = left.value(&assn).unwrap();
            let r = right.value(&assn).unwrap();
            prop_assert!((l - r).abs() < 1e-3, "{} != {}", l, r);
        }
    }

    #[test]
    fn sum_over_is_normalized((a, b, c) in factors(), pick in 0usize..4) {
        let mut joint = a.product(&b).unwrap().product(&c).unwrap();
        let var = ["X", "Y", "Z", "W"][pick];

        joint.sum_over_variable(var).unwrap();
        prop_assert_eq!(joint.scope(), vec![var]);
        prop_assert!((joint.table().sum() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn normalized_blocks_sum_to_one((_, _, c) in factors(), pick in 0usize..3) {
        let mut f = c.clone();
        f.sum_out_variable(["Z", "X", "W"][pick]).unwrap();

        let card = f.cardinality(f.main_variable().unwrap()).unwrap();
        for block in f.table().exact_chunks(card) {
            prop_assert!((block.sum() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn sum_out_order_is_irrelevant((a, b, c) in factors()) {
        let joint = a.product(&b).unwrap().product(&c).unwrap();

        let mut p = joint.clone();
        p.sum_out_variable_list(vec!["X", "Y", "W"]).unwrap();
        let mut q = joint.clone();
        q.sum_out_variable_list(vec!["W", "Y", "X"]).unwrap();

        prop_assert_eq!(p.scope(), vec!["Z"]);
        prop_assert_eq!(q.scope(), vec!["Z"]);
        for (l, r) in p.table().iter().zip(q.table().iter()) {
            prop_assert!((l - r).abs() < 1e-4);
        }
    }

    #[test]
    fn reduce_drops_one_axis((_, _, c) in factors(), pick in 0usize..3, value in 0usize..4) {
        let name = ["Z", "X", "W"][pick];
        let card = c.cardinality(name).unwrap();
        let value = (value % card).to_string();

        let mut f = c.clone();
        f.reduce_factor(name, &value).unwrap();

        prop_assert_eq!(c.scope().len() - 1, f.scope().len());
        prop_assert_eq!(c.len() / card, f.len());
        prop_assert!(!f.contains(name));
        prop_assert!(f.validate().is_ok());
    }

    #[test]
    fn log_round_trip((a, _, _) in factors()) {
        let mut f = a.clone();
        f.to_log();
        f.from_log();

        for (l, r) in a.table().iter().zip(f.table().iter()) {
            prop_assert!((l - r).abs() < 1e-4);
        }
    }
}
