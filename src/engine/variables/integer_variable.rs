/// An opaque handle to an integer variable owned by the discrete search
/// engine's domain store.
///
/// A handle carries an orientation: the handle for `x` and the handle for its
/// negation `-x` refer to the same underlying domain, and are paired by the
/// lowest bit of the code. Bound queries on a negated handle are the
/// reflected bound queries on the positive handle
/// (`lb(-x) = -ub(x)`, `ub(-x) = -lb(x)`).
///
/// Handles stay valid across backtracking since they are plain indices; any
/// value derived from them (bounds, cached LP solutions) is recomputed
/// instead of being kept alive by reference.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IntegerVariable {
    code: u32,
}

impl IntegerVariable {
    /// The positive-orientation handle for the variable with the given index.
    pub fn from_index(index: u32) -> IntegerVariable {
        IntegerVariable { code: index << 1 }
    }

    /// The index of the underlying variable, shared by both orientations.
    pub fn index(self) -> u32 {
        self.code >> 1
    }

    pub fn is_positive(self) -> bool {
        self.code & 1 == 0
    }

    /// The handle for the negation of this variable.
    pub fn negated(self) -> IntegerVariable {
        IntegerVariable {
            code: self.code ^ 1,
        }
    }

    /// The positive-orientation handle for the same underlying variable.
    pub fn positive(self) -> IntegerVariable {
        IntegerVariable {
            code: self.code & !1,
        }
    }
}

impl std::fmt::Display for IntegerVariable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_positive() {
            write!(f, "x{}", self.index())
        } else {
            write!(f, "-x{}", self.index())
        }
    }
}

impl std::fmt::Debug for IntegerVariable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negation_is_an_involution() {
        let x = IntegerVariable::from_index(7);
        assert!(x.is_positive());
        assert!(!x.negated().is_positive());
        assert_eq!(x.negated().negated(), x);
        assert_eq!(x.negated().index(), x.index());
    }

    #[test]
    fn positive_normalises_both_orientations() {
        let x = IntegerVariable::from_index(3);
        assert_eq!(x.positive(), x);
        assert_eq!(x.negated().positive(), x);
    }
}
