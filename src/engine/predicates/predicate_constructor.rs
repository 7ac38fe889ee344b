use super::Predicate;
use crate::engine::variables::IntegerVariable;

/// A trait for constructing bound [`Predicate`]s over a variable handle.
pub trait PredicateConstructor {
    /// The value type used for the bounds.
    type Value;

    /// A predicate constraining the variable from below.
    fn lower_bound_predicate(&self, bound: Self::Value) -> Predicate;

    /// A predicate constraining the variable from above.
    fn upper_bound_predicate(&self, bound: Self::Value) -> Predicate;
}

impl PredicateConstructor for IntegerVariable {
    type Value = i32;

    fn lower_bound_predicate(&self, bound: i32) -> Predicate {
        if self.is_positive() {
            Predicate::LowerBound {
                variable: *self,
                lower_bound: bound,
            }
        } else {
            // -x >= b is x <= -b on the positive handle.
            Predicate::UpperBound {
                variable: self.negated(),
                upper_bound: -bound,
            }
        }
    }

    fn upper_bound_predicate(&self, bound: i32) -> Predicate {
        if self.is_positive() {
            Predicate::UpperBound {
                variable: *self,
                upper_bound: bound,
            }
        } else {
            Predicate::LowerBound {
                variable: self.negated(),
                lower_bound: -bound,
            }
        }
    }
}

/// Syntactic sugar for constructing a bound [`Predicate`], e.g.
/// `predicate![x >= 2]` or `predicate![x <= 7]`.
#[macro_export]
macro_rules! predicate {
    ($($var:ident).+ >= $bound:expr) => {{
        #[allow(unused, reason = "could be imported twice")]
        use $crate::engine::predicates::PredicateConstructor;
        $($var).+.lower_bound_predicate($bound)
    }};
    ($($var:ident).+ <= $bound:expr) => {{
        #[allow(unused, reason = "could be imported twice")]
        use $crate::engine::predicates::PredicateConstructor;
        $($var).+.upper_bound_predicate($bound)
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negated_handles_are_normalised() {
        let x = IntegerVariable::from_index(4);
        let minus_x = x.negated();

        assert_eq!(minus_x.lower_bound_predicate(-3), x.upper_bound_predicate(3));
        assert_eq!(minus_x.upper_bound_predicate(5), x.lower_bound_predicate(-5));
    }
}
