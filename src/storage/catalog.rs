//! Built-in exercise catalog used by `seed`
//!
//! A small set of authored definitions so a fresh deployment has working
//! content: three equalization systems, two suitability, two efficiency,
//! and one matching exercise, composed into one demo study.

use crate::exercises::equalization::{EqualizationExercise, DEFAULT_PAN_CAPACITY};
use crate::exercises::equations::{
    EquationSide, LinearEquation, SystemSolution, Term, Variable, VarSymbol, WeightStock,
};
use crate::exercises::flexibility::{CandidateSystem, FlexibilityExercise};
use crate::math::Fraction;
use crate::storage::exercises::{StudyDefinition, StudyExerciseRef};
use crate::types::{ExerciseId, ExerciseKind, Method, StudyId};
use std::collections::BTreeMap;

/// Everything `seed_defaults` installs
pub struct Catalog {
    pub equalization: Vec<EqualizationExercise>,
    pub flexibility: Vec<FlexibilityExercise>,
    pub study: StudyDefinition,
}

pub fn default_catalog() -> Catalog {
    let equalization = vec![barrels_and_crates(), sacks_and_melons(), kegs_and_jugs()];
    let flexibility = vec![
        suitability_intro(),
        suitability_explained(),
        efficiency_substitution(),
        efficiency_elimination(),
        matching_isolated_pair(),
    ];

    let mut slots: Vec<StudyExerciseRef> = equalization
        .iter()
        .map(|e| StudyExerciseRef {
            exercise_id: e.id,
            exercise_type: ExerciseKind::Equalization,
        })
        .collect();
    slots.extend(flexibility.iter().map(|e| StudyExerciseRef {
        exercise_id: e.id,
        exercise_type: e.kind,
    }));

    Catalog {
        equalization,
        flexibility,
        study: StudyDefinition {
            id: StudyId(1),
            name: "default".to_string(),
            exercises: slots,
        },
    }
}

// 1 barrel = 2 crates + 6 kg, 1 barrel = 1 crate + 11 kg (barrel 16, crate 5)
fn barrels_and_crates() -> EqualizationExercise {
    let mut hints = BTreeMap::new();
    hints.insert(
        "scale_and_system_relation".to_string(),
        "Both sides weigh exactly one barrel, so the scale stays level.".to_string(),
    );
    hints.insert(
        "simplification".to_string(),
        "Remove the same items from both pans; the scale keeps its balance.".to_string(),
    );
    EqualizationExercise {
        id: ExerciseId(1),
        isolated: Variable::new("barrel", 16),
        second: Variable::new("crate", 5),
        left: EquationSide::new(2, 6),
        right: EquationSide::new(1, 11),
        weights: vec![
            WeightStock::new(1, 4),
            WeightStock::new(5, 3),
            WeightStock::new(10, 2),
        ],
        pan_capacity: DEFAULT_PAN_CAPACITY,
        hints,
    }
}

// 1 sack = 2 melons + 6 kg, 1 sack = 3 melons + 2 kg (sack 14, melon 4)
fn sacks_and_melons() -> EqualizationExercise {
    EqualizationExercise {
        id: ExerciseId(2),
        isolated: Variable::new("sack", 14),
        second: Variable::new("melon", 4),
        left: EquationSide::new(2, 6),
        right: EquationSide::new(3, 2),
        weights: vec![
            WeightStock::new(1, 4),
            WeightStock::new(2, 3),
            WeightStock::new(5, 2),
        ],
        pan_capacity: DEFAULT_PAN_CAPACITY,
        hints: BTreeMap::new(),
    }
}

// 1 keg = 4 jugs + 6 kg, 1 keg = 2 jugs + 12 kg (keg 18, jug 3)
fn kegs_and_jugs() -> EqualizationExercise {
    EqualizationExercise {
        id: ExerciseId(3),
        isolated: Variable::new("keg", 18),
        second: Variable::new("jug", 3),
        left: EquationSide::new(4, 6),
        right: EquationSide::new(2, 12),
        weights: vec![
            WeightStock::new(1, 3),
            WeightStock::new(2, 2),
            WeightStock::new(5, 2),
            WeightStock::new(10, 1),
        ],
        pan_capacity: DEFAULT_PAN_CAPACITY,
        hints: BTreeMap::new(),
    }
}

// y = 2x + 1, y = 4x - 3 (solution x=2, y=5); both sides isolate y
fn suitability_intro() -> FlexibilityExercise {
    FlexibilityExercise {
        id: ExerciseId(1),
        kind: ExerciseKind::Suitability,
        first_equation: LinearEquation::new(
            vec![Term::with_var(1, VarSymbol::Y)],
            vec![Term::with_var(2, VarSymbol::X), Term::constant(1)],
        ),
        second_equation: LinearEquation::new(
            vec![Term::with_var(1, VarSymbol::Y)],
            vec![Term::with_var(4, VarSymbol::X), Term::constant(-3)],
        ),
        suitable_methods: vec![Method::Equalization, Method::Substitution],
        efficient_methods: vec![Method::Equalization],
        solution: SystemSolution {
            x: Fraction::from_integer(2),
            y: Fraction::from_integer(5),
        },
        self_explanation: false,
        candidate_systems: Vec::new(),
        target_method: None,
        matching_index: None,
    }
}

// x = y + 2, x = 3y - 4 (solution x=5, y=3); self-explanation variant
fn suitability_explained() -> FlexibilityExercise {
    FlexibilityExercise {
        id: ExerciseId(2),
        kind: ExerciseKind::Suitability,
        first_equation: LinearEquation::new(
            vec![Term::with_var(1, VarSymbol::X)],
            vec![Term::with_var(1, VarSymbol::Y), Term::constant(2)],
        ),
        second_equation: LinearEquation::new(
            vec![Term::with_var(1, VarSymbol::X)],
            vec![Term::with_var(3, VarSymbol::Y), Term::constant(-4)],
        ),
        suitable_methods: vec![Method::Equalization],
        efficient_methods: vec![Method::Equalization],
        solution: SystemSolution {
            x: Fraction::from_integer(5),
            y: Fraction::from_integer(3),
        },
        self_explanation: true,
        candidate_systems: Vec::new(),
        target_method: None,
        matching_index: None,
    }
}

// y = 5x - 9, 2x + 3y = 7 (solution x=2, y=1); substitution pays off
fn efficiency_substitution() -> FlexibilityExercise {
    FlexibilityExercise {
        id: ExerciseId(3),
        kind: ExerciseKind::Efficiency,
        first_equation: LinearEquation::new(
            vec![Term::with_var(1, VarSymbol::Y)],
            vec![Term::with_var(5, VarSymbol::X), Term::constant(-9)],
        ),
        second_equation: LinearEquation::new(
            vec![Term::with_var(2, VarSymbol::X), Term::with_var(3, VarSymbol::Y)],
            vec![Term::constant(7)],
        ),
        suitable_methods: vec![Method::Substitution, Method::Elimination],
        efficient_methods: vec![Method::Substitution],
        solution: SystemSolution {
            x: Fraction::from_integer(2),
            y: Fraction::from_integer(1),
        },
        self_explanation: false,
        candidate_systems: Vec::new(),
        target_method: None,
        matching_index: None,
    }
}

// 3x + 2y = 12, 3x - y = 3 (solution x=2, y=3); matching x coefficients
fn efficiency_elimination() -> FlexibilityExercise {
    FlexibilityExercise {
        id: ExerciseId(4),
        kind: ExerciseKind::Efficiency,
        first_equation: LinearEquation::new(
            vec![Term::with_var(3, VarSymbol::X), Term::with_var(2, VarSymbol::Y)],
            vec![Term::constant(12)],
        ),
        second_equation: LinearEquation::new(
            vec![Term::with_var(3, VarSymbol::X), Term::with_var(-1, VarSymbol::Y)],
            vec![Term::constant(3)],
        ),
        suitable_methods: vec![Method::Elimination],
        efficient_methods: vec![Method::Elimination],
        solution: SystemSolution {
            x: Fraction::from_integer(2),
            y: Fraction::from_integer(3),
        },
        self_explanation: false,
        candidate_systems: Vec::new(),
        target_method: None,
        matching_index: None,
    }
}

// Pick the system where equalization applies directly: y = x + 3, y = 2x - 1
// (solution x=4, y=7)
fn matching_isolated_pair() -> FlexibilityExercise {
    let correct_first = LinearEquation::new(
        vec![Term::with_var(1, VarSymbol::Y)],
        vec![Term::with_var(1, VarSymbol::X), Term::constant(3)],
    );
    let correct_second = LinearEquation::new(
        vec![Term::with_var(1, VarSymbol::Y)],
        vec![Term::with_var(2, VarSymbol::X), Term::constant(-1)],
    );
    FlexibilityExercise {
        id: ExerciseId(5),
        kind: ExerciseKind::Matching,
        first_equation: correct_first.clone(),
        second_equation: correct_second.clone(),
        suitable_methods: vec![Method::Equalization],
        efficient_methods: vec![Method::Equalization],
        solution: SystemSolution {
            x: Fraction::from_integer(4),
            y: Fraction::from_integer(7),
        },
        self_explanation: false,
        candidate_systems: vec![
            CandidateSystem {
                first: LinearEquation::new(
                    vec![Term::with_var(1, VarSymbol::Y)],
                    vec![Term::with_var(1, VarSymbol::X), Term::constant(3)],
                ),
                second: LinearEquation::new(
                    vec![Term::with_var(1, VarSymbol::X), Term::with_var(1, VarSymbol::Y)],
                    vec![Term::constant(5)],
                ),
            },
            CandidateSystem {
                first: correct_first,
                second: correct_second,
            },
            CandidateSystem {
                first: LinearEquation::new(
                    vec![Term::with_var(2, VarSymbol::X), Term::with_var(1, VarSymbol::Y)],
                    vec![Term::constant(4)],
                ),
                second: LinearEquation::new(
                    vec![Term::with_var(1, VarSymbol::X), Term::with_var(-1, VarSymbol::Y)],
                    vec![Term::constant(1)],
                ),
            },
        ],
        target_method: Some(Method::Equalization),
        matching_index: Some(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_catalog_definition_is_valid() {
        let catalog = default_catalog();
        for exercise in &catalog.equalization {
            exercise.validate().unwrap();
        }
        for exercise in &catalog.flexibility {
            exercise.validate().unwrap();
        }
    }

    #[test]
    fn test_study_references_every_exercise() {
        let catalog = default_catalog();
        assert_eq!(
            catalog.study.exercises.len(),
            catalog.equalization.len() + catalog.flexibility.len()
        );
        // Equalization content comes first in the demo study
        assert_eq!(
            catalog.study.exercises[0].exercise_type,
            ExerciseKind::Equalization
        );
    }

    #[test]
    fn test_catalog_ids_are_unique_per_family() {
        let catalog = default_catalog();
        let mut eq_ids: Vec<i64> = catalog.equalization.iter().map(|e| e.id.0).collect();
        eq_ids.dedup();
        assert_eq!(eq_ids.len(), catalog.equalization.len());

        let mut flex_ids: Vec<i64> = catalog.flexibility.iter().map(|e| e.id.0).collect();
        flex_ids.dedup();
        assert_eq!(flex_ids.len(), catalog.flexibility.len());
    }
}
