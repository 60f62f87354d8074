//! Session driver for the flexibility exercises
//!
//! One driver covers suitability, efficiency, and matching; the exercise
//! kind decides the entry phase and what happens after the system is
//! solved. The method chosen in the first phase selects the three-way
//! branch, and the branch's `TransformationOutcome` rides inside the
//! phase payloads through the rest of the sequence.
//!
//! Wrong answers are recoverable (the phase stays put, errors are
//! counted); calling an operation in the wrong phase is a broken
//! invariant and surfaces as a `GameLogic` error.

use super::phases::{EquationChoice, FlexibilityPhase};
use super::transformation::TransformationOutcome;
use crate::error::{AlgespaceError, Result};
use crate::exercises::FlexibilityExercise;
use crate::math::Fraction;
use crate::tracking::SessionRecorder;
use crate::types::{ExerciseKind, Method};
use tracing::{debug, info};

/// Where the sequence goes after the system-solution screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostSolution {
    /// Efficiency and matching end here
    Finished,
    /// Suitability, chosen method was suitable
    Comparison,
    /// Suitability, chosen method was not suitable: redo with a suitable one
    Resolve,
}

/// One running flexibility attempt
pub struct FlexibilitySession {
    exercise: FlexibilityExercise,
    recorder: SessionRecorder,
    phase: FlexibilityPhase,
}

impl FlexibilitySession {
    /// Start an attempt; the exercise definition is validated first
    pub fn new(exercise: FlexibilityExercise, mut recorder: SessionRecorder) -> Result<Self> {
        exercise.validate()?;
        let phase = match exercise.kind {
            ExerciseKind::Matching => FlexibilityPhase::SystemSelection,
            _ => FlexibilityPhase::MethodSelection,
        };
        recorder.begin_phase();
        Ok(Self {
            exercise,
            recorder,
            phase,
        })
    }

    pub fn phase(&self) -> &FlexibilityPhase {
        &self.phase
    }

    pub fn exercise(&self) -> &FlexibilityExercise {
        &self.exercise
    }

    pub fn is_done(&self) -> bool {
        self.phase.is_done()
    }

    pub fn recorder_mut(&mut self) -> &mut SessionRecorder {
        &mut self.recorder
    }

    /// Await outstanding tracking calls (exercise end, tests)
    pub async fn flush_tracking(&mut self) {
        self.recorder.flush().await;
    }

    /// Pick the solving method (suitability and efficiency entry)
    pub fn select_method(&mut self, method: Method) -> Result<()> {
        if !matches!(self.phase, FlexibilityPhase::MethodSelection) {
            return Err(self.wrong_phase("method selection"));
        }
        self.recorder
            .record_choice(self.phase.name(), &method.to_string());
        if self.exercise.kind == ExerciseKind::Efficiency {
            let label = if self.exercise.is_efficient(method) {
                "efficient"
            } else {
                "not_efficient"
            };
            self.recorder
                .log_action(self.phase.name(), &format!("selected {} ({})", method, label));
        } else {
            self.recorder
                .log_action(self.phase.name(), &format!("selected {}", method));
        }
        self.advance_to(self.after_selection(method), None);
        Ok(())
    }

    /// Pick a candidate system (matching entry)
    ///
    /// A wrong pick counts as an error and the selection stays open; the
    /// right pick continues the sequence with the exercise's target
    /// method as the selected method.
    pub fn select_system(&mut self, index: usize) -> Result<bool> {
        if !matches!(self.phase, FlexibilityPhase::SystemSelection) {
            return Err(self.wrong_phase("system selection"));
        }
        if index >= self.exercise.candidate_systems.len() {
            return Err(AlgespaceError::GameLogic(format!(
                "candidate index {} out of range ({} candidates)",
                index,
                self.exercise.candidate_systems.len()
            )));
        }
        let correct = self.exercise.matching_index.ok_or_else(|| {
            AlgespaceError::GameLogic("matching exercise without an answer index".into())
        })?;

        self.recorder
            .log_action(self.phase.name(), &format!("picked system {}", index));
        if index != correct {
            self.recorder.log_error();
            return Ok(false);
        }

        let method = self.exercise.target_method.ok_or_else(|| {
            AlgespaceError::GameLogic("matching exercise without a target method".into())
        })?;
        self.recorder
            .record_choice(self.phase.name(), &format!("system_{}", index));
        self.advance_to(self.after_selection(method), None);
        Ok(true)
    }

    /// Submit the self-explanation response and continue
    pub fn submit_self_explanation(&mut self, response: &str) -> Result<()> {
        let method = match &self.phase {
            FlexibilityPhase::SelfExplanation { method } => *method,
            _ => return Err(self.wrong_phase("self explanation")),
        };
        self.recorder.record_choice(self.phase.name(), response);
        self.advance_to(FlexibilityPhase::SystemTransformation { method }, None);
        Ok(())
    }

    /// Leave the transformation overview for the chosen method's branch
    pub fn confirm_transformation(&mut self) -> Result<()> {
        let method = match &self.phase {
            FlexibilityPhase::SystemTransformation { method } => *method,
            _ => return Err(self.wrong_phase("transformation")),
        };
        self.recorder.log_action(self.phase.name(), "continue");
        self.advance_to(FlexibilityPhase::method_branch(method), None);
        Ok(())
    }

    /// Submit the worked method application
    ///
    /// The outcome must be a valid transformation of the system; a wrong
    /// submission is a recoverable mistake.
    pub fn apply_method(&mut self, outcome: TransformationOutcome) -> Result<bool> {
        let method = self
            .phase
            .branch_method()
            .ok_or_else(|| self.wrong_phase("method application"))?;

        if !outcome.is_valid_for(&self.exercise) {
            self.recorder.log_error();
            self.recorder.log_action(
                self.phase.name(),
                &format!("transformation '{}' rejected", outcome.transformed),
            );
            return Ok(false);
        }
        self.recorder.log_action(
            self.phase.name(),
            &format!("transformation '{}' accepted", outcome.transformed),
        );
        self.advance_to(FlexibilityPhase::FirstSolution { method, outcome }, None);
        Ok(true)
    }

    /// Submit the first numeric solution (the variable the transformed
    /// equation is solved for)
    pub fn submit_first_solution(&mut self, value: Fraction) -> Result<bool> {
        let (method, outcome) = match &self.phase {
            FlexibilityPhase::FirstSolution { method, outcome } => (*method, outcome.clone()),
            _ => return Err(self.wrong_phase("first solution")),
        };
        let expected = self.exercise.solution.value_of(outcome.solved_variable());
        if value != expected {
            self.recorder.log_error();
            self.recorder.log_action(
                self.phase.name(),
                &format!("{} = {} rejected", outcome.solved_variable(), value),
            );
            return Ok(false);
        }
        self.recorder.log_action(
            self.phase.name(),
            &format!("{} = {} accepted", outcome.solved_variable(), value),
        );
        self.advance_to(FlexibilityPhase::EquationSelection { method, outcome }, None);
        Ok(true)
    }

    /// Pick the equation used to find the remaining variable
    ///
    /// Either equation works; the pick is logged, not judged.
    pub fn select_equation(&mut self, equation: EquationChoice) -> Result<()> {
        let (method, outcome) = match &self.phase {
            FlexibilityPhase::EquationSelection { method, outcome } => (*method, outcome.clone()),
            _ => return Err(self.wrong_phase("equation selection")),
        };
        self.recorder
            .log_action(self.phase.name(), &format!("picked {}", equation.as_str()));
        self.advance_to(
            FlexibilityPhase::SecondSolution {
                method,
                outcome,
                equation,
            },
            None,
        );
        Ok(())
    }

    /// Submit the remaining variable's value
    pub fn submit_second_solution(&mut self, value: Fraction) -> Result<bool> {
        let (method, outcome) = match &self.phase {
            FlexibilityPhase::SecondSolution {
                method, outcome, ..
            } => (*method, outcome.clone()),
            _ => return Err(self.wrong_phase("second solution")),
        };
        let expected = self.exercise.solution.value_of(outcome.isolated_first);
        if value != expected {
            self.recorder.log_error();
            self.recorder.log_action(
                self.phase.name(),
                &format!("{} = {} rejected", outcome.isolated_first, value),
            );
            return Ok(false);
        }
        self.recorder.log_action(
            self.phase.name(),
            &format!("{} = {} accepted", outcome.isolated_first, value),
        );
        self.advance_to(FlexibilityPhase::SystemSolution { method, outcome }, None);
        Ok(true)
    }

    /// Leave the system-solution screen
    ///
    /// Efficiency and matching complete here. Suitability branches on set
    /// membership: a suitable chosen method leads to the comparison, an
    /// unsuitable one forces the resolve path with the first suitable
    /// method as the comparison method.
    pub fn confirm_system_solution(&mut self) -> Result<PostSolution> {
        let method = match &self.phase {
            FlexibilityPhase::SystemSolution { method, .. } => *method,
            _ => return Err(self.wrong_phase("system solution")),
        };
        self.recorder.log_action(self.phase.name(), "continue");

        if self.exercise.kind != ExerciseKind::Suitability {
            self.complete(None);
            return Ok(PostSolution::Finished);
        }

        if self.exercise.is_suitable(method) {
            let alternative = self.comparison_alternative(method);
            self.advance_to(
                FlexibilityPhase::Comparison {
                    method,
                    alternative,
                },
                None,
            );
            Ok(PostSolution::Comparison)
        } else {
            let comparison_method = self
                .exercise
                .suitable_methods
                .first()
                .copied()
                .ok_or_else(|| {
                    AlgespaceError::GameLogic(
                        "suitability exercise without suitable methods".into(),
                    )
                })?;
            self.advance_to(
                FlexibilityPhase::SystemTransformationOnResolve { comparison_method },
                None,
            );
            Ok(PostSolution::Resolve)
        }
    }

    /// Close the comparison screen with the participant's verdict
    pub fn complete_comparison(&mut self, choice: &str) -> Result<()> {
        if !matches!(self.phase, FlexibilityPhase::Comparison { .. }) {
            return Err(self.wrong_phase("comparison"));
        }
        self.recorder
            .log_action(self.phase.name(), &format!("comparison verdict {}", choice));
        self.complete(Some(choice.to_string()));
        Ok(())
    }

    /// Leave the resolve transformation overview
    pub fn confirm_resolve_transformation(&mut self) -> Result<()> {
        let comparison_method = match &self.phase {
            FlexibilityPhase::SystemTransformationOnResolve { comparison_method } => {
                *comparison_method
            }
            _ => return Err(self.wrong_phase("resolve transformation")),
        };
        self.recorder.log_action(self.phase.name(), "continue");
        self.advance_to(
            FlexibilityPhase::MethodOnResolve { comparison_method },
            None,
        );
        Ok(())
    }

    /// Submit the redone method application on the resolve path
    pub fn apply_resolve_method(&mut self, outcome: TransformationOutcome) -> Result<bool> {
        let comparison_method = match &self.phase {
            FlexibilityPhase::MethodOnResolve { comparison_method } => *comparison_method,
            _ => return Err(self.wrong_phase("resolve method application")),
        };
        if !outcome.is_valid_for(&self.exercise) {
            self.recorder.log_error();
            self.recorder.log_action(
                self.phase.name(),
                &format!("transformation '{}' rejected", outcome.transformed),
            );
            return Ok(false);
        }
        self.recorder.log_action(
            self.phase.name(),
            &format!("transformation '{}' accepted", outcome.transformed),
        );
        self.advance_to(
            FlexibilityPhase::ResolveConclusion { comparison_method },
            None,
        );
        Ok(true)
    }

    /// Close the resolve conclusion with the participant's verdict
    pub fn complete_resolve(&mut self, choice: &str) -> Result<()> {
        if !matches!(self.phase, FlexibilityPhase::ResolveConclusion { .. }) {
            return Err(self.wrong_phase("resolve conclusion"));
        }
        self.recorder
            .log_action(self.phase.name(), &format!("resolve verdict {}", choice));
        self.complete(Some(choice.to_string()));
        Ok(())
    }

    /// Phase after a successful method/system selection
    fn after_selection(&self, method: Method) -> FlexibilityPhase {
        if self.exercise.self_explanation {
            FlexibilityPhase::SelfExplanation { method }
        } else {
            FlexibilityPhase::SystemTransformation { method }
        }
    }

    /// An alternative suitable method for the comparison screen
    fn comparison_alternative(&self, method: Method) -> Method {
        self.exercise
            .suitable_methods
            .iter()
            .copied()
            .find(|m| *m != method)
            .unwrap_or_else(|| {
                Method::ALL
                    .into_iter()
                    .find(|m| *m != method)
                    .unwrap_or(method)
            })
    }

    fn advance_to(&mut self, next: FlexibilityPhase, choice: Option<String>) {
        self.recorder.finish_phase(self.phase.name(), choice);
        debug!("phase {} -> {}", self.phase, next);
        self.phase = next;
        self.recorder.begin_phase();
    }

    /// Close the current phase and the whole attempt
    fn complete(&mut self, choice: Option<String>) {
        self.recorder.finish_phase(self.phase.name(), choice);
        self.recorder.finish();
        info!("flexibility exercise {} completed", self.exercise.id);
        self.phase = FlexibilityPhase::Done;
    }

    fn wrong_phase(&self, operation: &str) -> AlgespaceError {
        AlgespaceError::GameLogic(format!(
            "{} is not available in phase {}",
            operation, self.phase
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exercises::equations::{LinearEquation, Term, VarSymbol};
    use crate::exercises::flexibility::{suitability_exercise, CandidateSystem};

    // Fixture system: y = 2x + 1 and y = 4x - 3, solution (2, 5),
    // suitable = [equalization, substitution], efficient = [equalization]

    fn session(exercise: FlexibilityExercise) -> FlexibilitySession {
        FlexibilitySession::new(exercise, SessionRecorder::disabled()).unwrap()
    }

    fn equalized_outcome() -> TransformationOutcome {
        TransformationOutcome::new(
            LinearEquation::new(
                vec![Term::with_var(2, VarSymbol::X), Term::constant(1)],
                vec![Term::with_var(4, VarSymbol::X), Term::constant(-3)],
            ),
            VarSymbol::Y,
        )
    }

    fn solve_system(s: &mut FlexibilitySession) {
        s.confirm_transformation().unwrap();
        assert!(s.apply_method(equalized_outcome()).unwrap());
        assert!(s.submit_first_solution(Fraction::from_integer(2)).unwrap());
        s.select_equation(EquationChoice::First).unwrap();
        assert!(s.submit_second_solution(Fraction::from_integer(5)).unwrap());
    }

    #[test]
    fn test_suitable_method_enters_comparison() {
        let mut s = session(suitability_exercise());
        s.select_method(Method::Equalization).unwrap();
        solve_system(&mut s);

        let next = s.confirm_system_solution().unwrap();
        assert_eq!(next, PostSolution::Comparison);
        assert_eq!(
            s.phase(),
            &FlexibilityPhase::Comparison {
                method: Method::Equalization,
                alternative: Method::Substitution,
            }
        );

        s.complete_comparison("kept own method").unwrap();
        assert!(s.is_done());
    }

    #[test]
    fn test_unsuitable_method_forces_resolve() {
        let mut s = session(suitability_exercise());
        s.select_method(Method::Elimination).unwrap();
        solve_system(&mut s);

        let next = s.confirm_system_solution().unwrap();
        assert_eq!(next, PostSolution::Resolve);
        // Comparison method is the first declared suitable method
        assert_eq!(
            s.phase(),
            &FlexibilityPhase::SystemTransformationOnResolve {
                comparison_method: Method::Equalization,
            }
        );

        s.confirm_resolve_transformation().unwrap();
        assert!(s.apply_resolve_method(equalized_outcome()).unwrap());
        assert_eq!(
            s.phase(),
            &FlexibilityPhase::ResolveConclusion {
                comparison_method: Method::Equalization,
            }
        );
        s.complete_resolve("resolved with equalization").unwrap();
        assert!(s.is_done());
    }

    #[test]
    fn test_efficiency_ends_at_system_solution() {
        let mut ex = suitability_exercise();
        ex.kind = ExerciseKind::Efficiency;
        let mut s = session(ex);

        s.select_method(Method::Substitution).unwrap();
        solve_system(&mut s);
        assert_eq!(s.confirm_system_solution().unwrap(), PostSolution::Finished);
        assert!(s.is_done());
    }

    #[test]
    fn test_matching_wrong_pick_is_recoverable() {
        let mut ex = suitability_exercise();
        ex.kind = ExerciseKind::Matching;
        ex.target_method = Some(Method::Elimination);
        ex.candidate_systems = vec![
            CandidateSystem {
                first: ex.first_equation.clone(),
                second: ex.second_equation.clone(),
            },
            CandidateSystem {
                first: ex.second_equation.clone(),
                second: ex.first_equation.clone(),
            },
        ];
        ex.matching_index = Some(1);
        let mut s = session(ex);
        assert_eq!(s.phase(), &FlexibilityPhase::SystemSelection);

        assert!(!s.select_system(0).unwrap());
        assert_eq!(s.phase(), &FlexibilityPhase::SystemSelection);

        assert!(s.select_system(1).unwrap());
        // Continuation runs on the exercise's target method
        assert_eq!(
            s.phase(),
            &FlexibilityPhase::SystemTransformation {
                method: Method::Elimination,
            }
        );

        solve_system(&mut s);
        assert_eq!(s.confirm_system_solution().unwrap(), PostSolution::Finished);
    }

    #[test]
    fn test_self_explanation_phase_inserted() {
        let mut ex = suitability_exercise();
        ex.self_explanation = true;
        let mut s = session(ex);

        s.select_method(Method::Equalization).unwrap();
        assert_eq!(
            s.phase(),
            &FlexibilityPhase::SelfExplanation {
                method: Method::Equalization,
            }
        );
        s.submit_self_explanation("both sides are equal to y").unwrap();
        assert_eq!(
            s.phase(),
            &FlexibilityPhase::SystemTransformation {
                method: Method::Equalization,
            }
        );
    }

    #[test]
    fn test_wrong_answers_are_recoverable() {
        let mut s = session(suitability_exercise());
        s.select_method(Method::Equalization).unwrap();
        s.confirm_transformation().unwrap();

        // Bad transformation: 2x + 1 = 4x + 3 does not hold at (2, 5)
        let bad = TransformationOutcome::new(
            LinearEquation::new(
                vec![Term::with_var(2, VarSymbol::X), Term::constant(1)],
                vec![Term::with_var(4, VarSymbol::X), Term::constant(3)],
            ),
            VarSymbol::Y,
        );
        assert!(!s.apply_method(bad).unwrap());
        assert_eq!(s.phase(), &FlexibilityPhase::EqualizationMethod);

        assert!(s.apply_method(equalized_outcome()).unwrap());
        assert!(!s.submit_first_solution(Fraction::from_integer(3)).unwrap());
        assert!(s.submit_first_solution(Fraction::from_integer(2)).unwrap());

        s.select_equation(EquationChoice::Second).unwrap();
        assert!(!s.submit_second_solution(Fraction::from_integer(4)).unwrap());
        assert!(s.submit_second_solution(Fraction::from_integer(5)).unwrap());
    }

    #[test]
    fn test_out_of_phase_operations_are_logic_errors() {
        let mut s = session(suitability_exercise());

        assert!(matches!(
            s.apply_method(equalized_outcome()),
            Err(AlgespaceError::GameLogic(_))
        ));
        assert!(matches!(
            s.submit_first_solution(Fraction::from_integer(2)),
            Err(AlgespaceError::GameLogic(_))
        ));
        assert!(matches!(
            s.select_system(0),
            Err(AlgespaceError::GameLogic(_))
        ));
        assert!(matches!(
            s.complete_comparison("early"),
            Err(AlgespaceError::GameLogic(_))
        ));

        // Matching exercises have no free method selection
        let mut ex = suitability_exercise();
        ex.kind = ExerciseKind::Matching;
        ex.target_method = Some(Method::Equalization);
        ex.candidate_systems = vec![CandidateSystem {
            first: ex.first_equation.clone(),
            second: ex.second_equation.clone(),
        }];
        ex.matching_index = Some(0);
        let mut m = session(ex);
        assert!(matches!(
            m.select_method(Method::Equalization),
            Err(AlgespaceError::GameLogic(_))
        ));
    }

    #[test]
    fn test_equalization_kind_rejected_at_start() {
        let mut ex = suitability_exercise();
        ex.kind = ExerciseKind::Equalization;
        assert!(FlexibilitySession::new(ex, SessionRecorder::disabled()).is_err());
    }
}
