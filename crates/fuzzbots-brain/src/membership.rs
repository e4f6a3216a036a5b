//! Triangular membership functions and three-term linguistic variables.

use fuzzbots_core::VariableDegrees;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Triangular membership degree of `x` for breakpoints `(a, b, c)`.
///
/// Exactly 1.0 at `x == b`, even for shoulder sets where `a == b` or `b == c`. Zero at or beyond
/// either foot, linear in between. NaN input maps to zero.
///
/// A peak outside `[a, c]` is evaluated as given: the set becomes a single ramp that never
/// reaches 1 inside the feet.
#[must_use]
pub fn trimf(x: f32, a: f32, b: f32, c: f32) -> f32 {
    if x == b && a <= b && b <= c {
        return 1.0;
    }
    if x.is_nan() || x <= a || x >= c {
        return 0.0;
    }
    if x < b {
        (x - a) / (b - a)
    } else {
        (c - x) / (c - b)
    }
}

/// Triangular fuzzy set with breakpoints `(a, b, c)`, normally `a <= b <= c`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MembershipSet {
    a: f32,
    b: f32,
    c: f32,
}

impl MembershipSet {
    /// Breakpoints are kept as supplied. Feet with `a >= c` describe an empty set.
    #[must_use]
    pub const fn new(a: f32, b: f32, c: f32) -> Self {
        Self { a, b, c }
    }

    #[must_use]
    pub const fn breakpoints(&self) -> (f32, f32, f32) {
        (self.a, self.b, self.c)
    }

    #[must_use]
    pub fn degree(&self, x: f32) -> f32 {
        trimf(x, self.a, self.b, self.c)
    }
}

/// Named group of three membership sets evaluated together.
#[derive(Debug, Clone, PartialEq)]
pub struct LinguisticVariable {
    pub name: Cow<'static, str>,
    pub terms: [&'static str; 3],
    pub sets: [MembershipSet; 3],
}

impl LinguisticVariable {
    #[must_use]
    pub fn new(
        name: impl Into<Cow<'static, str>>,
        terms: [&'static str; 3],
        sets: [MembershipSet; 3],
    ) -> Self {
        Self {
            name: name.into(),
            terms,
            sets,
        }
    }

    /// Degrees of membership in each term, in term order.
    #[must_use]
    pub fn fuzzify(&self, x: f32) -> [f32; 3] {
        self.sets.map(|set| set.degree(x))
    }

    /// Package a set of degrees under this variable's name for diagnostics.
    #[must_use]
    pub fn describe(
        &self,
        name: impl Into<Cow<'static, str>>,
        degrees: [f32; 3],
    ) -> VariableDegrees {
        VariableDegrees {
            name: name.into(),
            terms: self.terms,
            degrees,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shoulder_sets_peak_at_the_shoulder() {
        assert_eq!(trimf(5.0, 0.0, 5.0, 5.0), 1.0);
        assert_eq!(trimf(0.0, 0.0, 0.0, 40.0), 1.0);
        assert_eq!(trimf(100.0, 100.0, 100.0, 100.0), 1.0);
    }

    #[test]
    fn zero_outside_the_feet() {
        assert_eq!(trimf(-1.0, 0.0, 5.0, 10.0), 0.0);
        assert_eq!(trimf(0.0, 0.0, 5.0, 10.0), 0.0);
        assert_eq!(trimf(10.0, 0.0, 5.0, 10.0), 0.0);
        assert_eq!(trimf(11.0, 0.0, 5.0, 10.0), 0.0);
        assert_eq!(trimf(f32::NAN, 0.0, 5.0, 10.0), 0.0);
    }

    #[test]
    fn linear_between_feet_and_peak() {
        assert!((trimf(2.5, 0.0, 5.0, 10.0) - 0.5).abs() < 1e-6);
        assert!((trimf(7.5, 0.0, 5.0, 10.0) - 0.5).abs() < 1e-6);
        assert!((trimf(25.0, 10.0, 40.0, 50.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn set_keeps_supplied_breakpoints() {
        let set = MembershipSet::new(10.0, 40.0, 30.0);
        assert_eq!(set.breakpoints(), (10.0, 40.0, 30.0));
        let inverted = MembershipSet::new(50.0, 40.0, 30.0);
        assert_eq!(inverted.degree(40.0), 0.0);
        assert_eq!(inverted.degree(35.0), 0.0);
        assert_eq!(inverted.degree(45.0), 0.0);
    }

    #[test]
    fn peak_beyond_upper_foot_yields_rising_ramp() {
        let set = MembershipSet::new(10.0, 40.0, 30.0);
        assert!((set.degree(20.0) - 1.0 / 3.0).abs() < 1e-6);
        assert!((set.degree(29.0) - 19.0 / 30.0).abs() < 1e-6);
        assert_eq!(set.degree(30.0), 0.0);
        assert_eq!(set.degree(10.0), 0.0);
        assert_eq!(set.degree(40.0), 0.0);
    }

    #[test]
    fn peak_below_lower_foot_yields_falling_ramp() {
        let set = MembershipSet::new(45.0, 40.0, 60.0);
        assert!((set.degree(50.0) - 0.5).abs() < 1e-6);
        assert_eq!(set.degree(45.0), 0.0);
        assert_eq!(set.degree(60.0), 0.0);
    }

    #[test]
    fn variable_fuzzifies_in_term_order() {
        let variable = LinguisticVariable::new(
            "distance",
            ["close", "medium", "far"],
            [
                MembershipSet::new(0.0, 0.0, 40.0),
                MembershipSet::new(10.0, 40.0, 50.0),
                MembershipSet::new(40.0, 100.0, 1000.0),
            ],
        );
        let degrees = variable.fuzzify(40.0);
        assert_eq!(degrees, [0.0, 1.0, 0.0]);
        let described = variable.describe("front", degrees);
        assert_eq!(described.terms, ["close", "medium", "far"]);
        assert_eq!(described.name, "front");
    }
}
