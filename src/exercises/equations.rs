//! Equation and variable building blocks shared by all exercise types

use crate::math::Fraction;
use serde::{Deserialize, Serialize};

/// A named quantity with a hidden true weight (e.g. a barrel or a crate)
///
/// The weight is part of the definition; the participant is supposed to
/// work it out, the scale "knows" it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    /// Display name shown on items
    pub name: String,

    /// True weight in the exercise's unit
    pub weight: i64,
}

impl Variable {
    pub fn new(name: impl Into<String>, weight: i64) -> Self {
        Self {
            name: name.into(),
            weight,
        }
    }
}

/// The right-hand side of one equalization equation
///
/// Each source equation has the form
/// `1·isolated = second_count·second + constant`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquationSide {
    /// Number of second-variable items on this side
    pub second_count: u32,

    /// Constant weight on this side
    pub constant: i64,
}

impl EquationSide {
    pub fn new(second_count: u32, constant: i64) -> Self {
        Self {
            second_count,
            constant,
        }
    }

    /// Total physical weight of this side given the second variable's weight
    pub fn total_weight(&self, second_weight: i64) -> i64 {
        self.second_count as i64 * second_weight + self.constant
    }
}

/// One denomination on the weights shelf with its available amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightStock {
    /// Face value of each piece
    pub denomination: i64,

    /// How many pieces the shelf holds
    pub amount: u32,
}

impl WeightStock {
    pub fn new(denomination: i64, amount: u32) -> Self {
        Self {
            denomination,
            amount,
        }
    }
}

/// Variable symbol in a flexibility system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VarSymbol {
    X,
    Y,
}

impl VarSymbol {
    /// The other variable of the system
    pub fn other(&self) -> VarSymbol {
        match self {
            VarSymbol::X => VarSymbol::Y,
            VarSymbol::Y => VarSymbol::X,
        }
    }
}

impl std::fmt::Display for VarSymbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VarSymbol::X => write!(f, "x"),
            VarSymbol::Y => write!(f, "y"),
        }
    }
}

/// One additive term of a linear equation: a coefficient and an optional
/// variable (`None` means a plain constant)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Term {
    pub coefficient: Fraction,
    pub variable: Option<VarSymbol>,
}

impl Term {
    pub fn constant(value: impl Into<Fraction>) -> Self {
        Self {
            coefficient: value.into(),
            variable: None,
        }
    }

    pub fn with_var(coefficient: impl Into<Fraction>, variable: VarSymbol) -> Self {
        Self {
            coefficient: coefficient.into(),
            variable: Some(variable),
        }
    }

    /// Value of this term under an assignment for x and y
    pub fn eval(&self, x: Fraction, y: Fraction) -> Fraction {
        match self.variable {
            None => self.coefficient,
            Some(VarSymbol::X) => self.coefficient * x,
            Some(VarSymbol::Y) => self.coefficient * y,
        }
    }
}

impl std::fmt::Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.variable {
            None => write!(f, "{}", self.coefficient),
            Some(v) => {
                if self.coefficient == Fraction::ONE {
                    write!(f, "{}", v)
                } else if self.coefficient == -Fraction::ONE {
                    write!(f, "-{}", v)
                } else {
                    write!(f, "{}{}", self.coefficient, v)
                }
            }
        }
    }
}

/// A linear equation over x and y, kept as the authored term lists so the
/// client can render it exactly as written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearEquation {
    pub lhs: Vec<Term>,
    pub rhs: Vec<Term>,
}

impl LinearEquation {
    pub fn new(lhs: Vec<Term>, rhs: Vec<Term>) -> Self {
        Self { lhs, rhs }
    }

    fn eval_side(terms: &[Term], x: Fraction, y: Fraction) -> Fraction {
        terms
            .iter()
            .fold(Fraction::ZERO, |acc, t| acc + t.eval(x, y))
    }

    /// Whether the assignment satisfies the equation exactly
    pub fn is_satisfied_by(&self, x: Fraction, y: Fraction) -> bool {
        Self::eval_side(&self.lhs, x, y) == Self::eval_side(&self.rhs, x, y)
    }

    /// Whether a side of the equation is just a single isolated variable
    /// (coefficient one), e.g. the `y` in `y = 2x + 1`
    pub fn isolated_variable(&self) -> Option<VarSymbol> {
        let single = |terms: &[Term]| match terms {
            [t] if t.coefficient == Fraction::ONE => t.variable,
            _ => None,
        };
        single(&self.lhs).or_else(|| single(&self.rhs))
    }
}

fn fmt_terms(f: &mut std::fmt::Formatter<'_>, terms: &[Term]) -> std::fmt::Result {
    if terms.is_empty() {
        return write!(f, "0");
    }
    for (i, term) in terms.iter().enumerate() {
        if i == 0 {
            write!(f, "{}", term)?;
        } else if term.coefficient.numerator() < 0 {
            // Render "a + -b" as "a - b"
            let positive = Term {
                coefficient: -term.coefficient,
                variable: term.variable,
            };
            write!(f, " - {}", positive)?;
        } else {
            write!(f, " + {}", term)?;
        }
    }
    Ok(())
}

impl std::fmt::Display for LinearEquation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fmt_terms(f, &self.lhs)?;
        write!(f, " = ")?;
        fmt_terms(f, &self.rhs)
    }
}

/// The unique solution of a flexibility system
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SystemSolution {
    pub x: Fraction,
    pub y: Fraction,
}

impl SystemSolution {
    /// Value of one variable of the solution
    pub fn value_of(&self, var: VarSymbol) -> Fraction {
        match var {
            VarSymbol::X => self.x,
            VarSymbol::Y => self.y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frac(n: i64, d: i64) -> Fraction {
        Fraction::new(n, d).unwrap()
    }

    #[test]
    fn test_equation_side_weight() {
        // 2 crates + 6 kg with crate = 5 kg
        let side = EquationSide::new(2, 6);
        assert_eq!(side.total_weight(5), 16);
    }

    #[test]
    fn test_equation_satisfaction() {
        // y = 2x + 1, satisfied by (x, y) = (3, 7)
        let eq = LinearEquation::new(
            vec![Term::with_var(1, VarSymbol::Y)],
            vec![Term::with_var(2, VarSymbol::X), Term::constant(1)],
        );
        assert!(eq.is_satisfied_by(frac(3, 1), frac(7, 1)));
        assert!(!eq.is_satisfied_by(frac(3, 1), frac(8, 1)));
        assert_eq!(eq.isolated_variable(), Some(VarSymbol::Y));
    }

    #[test]
    fn test_display() {
        let eq = LinearEquation::new(
            vec![Term::with_var(3, VarSymbol::X), Term::constant(-2)],
            vec![Term::with_var(1, VarSymbol::Y)],
        );
        assert_eq!(eq.to_string(), "3x - 2 = y");

        let half = Term::with_var(frac(1, 2), VarSymbol::X);
        assert_eq!(half.to_string(), "1/2x");
    }
}
