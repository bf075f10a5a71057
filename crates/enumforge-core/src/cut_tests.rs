//! Tests for no-good cut derivation.

use proptest::prelude::*;

use super::cut::*;
use super::model::*;

fn free_model(n: usize) -> Model<usize> {
    let mut model = Model::new("free");
    for i in 0..n {
        model.add_variable(i, None).unwrap();
    }
    model
}

fn bits(mask: u32, n: usize) -> Vec<bool> {
    (0..n).map(|i| mask & (1 << i) != 0).collect()
}

#[test]
fn test_cut_terms_follow_assigned_values() {
    let model = free_model(3);
    let cut = NoGoodCut::derive(&model, &Assignment::new(vec![true, false, true])).unwrap();

    let terms = cut.expr().terms();
    assert_eq!(terms.len(), 3);
    assert_eq!(terms[0].1, -1.0);
    assert_eq!(terms[1].1, 1.0);
    assert_eq!(terms[2].1, -1.0);
    // One (1 - v) contribution per variable set to 1.
    assert_eq!(cut.expr().constant_term(), 2.0);
    assert_eq!(cut.rhs(), 1.0);
}

#[test]
fn test_cut_skips_fixed_variables() {
    let mut model = Model::new("fixed");
    let a = model.add_variable("a", Some(true)).unwrap();
    let b = model.add_variable("b", None).unwrap();
    let c = model.add_variable("c", Some(false)).unwrap();

    let cut = NoGoodCut::derive(&model, &Assignment::new(vec![true, true, false])).unwrap();

    assert_eq!(cut.len(), 1);
    assert!(!cut.contains(a));
    assert!(cut.contains(b));
    assert!(!cut.contains(c));
}

#[test]
fn test_degenerate_cut_when_all_fixed() {
    let mut model = Model::new("pinned");
    model.add_variable("a", Some(true)).unwrap();
    model.add_variable("b", Some(false)).unwrap();

    let result = NoGoodCut::derive(&model, &Assignment::new(vec![true, false]));
    assert_eq!(result, Err(DegenerateCut));
}

#[test]
fn test_degenerate_cut_on_empty_model() {
    let model: Model<u8> = Model::new("empty");
    assert_eq!(
        NoGoodCut::derive(&model, &Assignment::new(Vec::new())),
        Err(DegenerateCut)
    );
}

#[test]
fn test_append_grows_constraint_count_by_one() {
    let mut model = free_model(2);
    let vars: Vec<VarId> = model.free_variables().collect();
    model
        .add_constraint(LinearExpr::sum(vars), Comparison::Le, 2.0)
        .unwrap();
    let before: Vec<LinearConstraint> = model.constraints().to_vec();

    let cut = NoGoodCut::derive(&model, &Assignment::new(vec![false, true])).unwrap();
    let id = cut.append_to(&mut model).unwrap();

    assert_eq!(id, ConstraintId::Cut(0));
    assert_eq!(model.constraint_count(), 2);
    assert_eq!(model.constraints(), before.as_slice());
    assert_eq!(model.cuts()[0].comparison(), Comparison::Ge);
}

#[test]
fn test_appended_cut_makes_assignment_infeasible() {
    let mut model = free_model(2);
    let found = Assignment::new(vec![false, true]);
    assert!(model.is_satisfied_by(&found));

    NoGoodCut::derive(&model, &found)
        .unwrap()
        .append_to(&mut model)
        .unwrap();

    assert_eq!(
        model.first_violation(&found),
        Some(Violation::Constraint(ConstraintId::Cut(0)))
    );
}

proptest! {
    #[test]
    fn prop_cut_excludes_only_its_assignment(n in 1usize..8, a in any::<u32>(), b in any::<u32>()) {
        let model = free_model(n);
        let excluded = Assignment::new(bits(a, n));
        let other = Assignment::new(bits(b, n));
        let cut = NoGoodCut::derive(&model, &excluded).unwrap();

        prop_assert!(cut.is_violated_by(&excluded));
        if excluded != other {
            prop_assert!(!cut.is_violated_by(&other));
            prop_assert!(cut.expr().evaluate(other.values()) >= 1.0);
        }
    }

    #[test]
    fn prop_cut_never_mentions_fixed_variables(n in 1usize..8, fixed_mask in any::<u32>(), a in any::<u32>()) {
        let mut model = Model::new("mixed");
        let values = bits(a, n);
        for i in 0..n {
            let fixed = (fixed_mask & (1 << i) != 0).then_some(values[i]);
            model.add_variable(i, fixed).unwrap();
        }
        let assignment = Assignment::new(values);

        match NoGoodCut::derive(&model, &assignment) {
            Ok(cut) => {
                for (id, variable) in model.variables() {
                    prop_assert_eq!(cut.contains(id), !variable.is_fixed());
                }
            }
            Err(DegenerateCut) => {
                prop_assert_eq!(model.free_variable_count(), 0);
            }
        }
    }
}
