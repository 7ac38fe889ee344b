use fnv::FnvHashMap;
use itertools::izip;

use crate::engine::variables::IntegerVariable;
use crate::lp::ColIndex;
use crate::lp::LinearProgram;
use crate::lp_assert_simple;

/// Bidirectional mapping between the search engine's integer variables and
/// the LP columns mirroring them.
///
/// `integer_variables[i]` is mirrored by `mirror_columns[i]`; the ordinal `i`
/// is also the watch index handed to the watcher at registration, so that
/// incremental propagation can walk cached solution vectors by ordinal. The
/// lookup table answers which column a coefficient update must target.
///
/// Each positive-orientation variable maps to at most one column and no
/// column is shared between two variables.
#[derive(Debug, Default)]
pub(crate) struct VariableMirror {
    variable_to_ordinal: FnvHashMap<IntegerVariable, usize>,
    integer_variables: Vec<IntegerVariable>,
    mirror_columns: Vec<ColIndex>,
}

impl VariableMirror {
    /// Get the column mirroring `variable`, creating one on first use. The
    /// variable must be a positive-orientation handle; callers normalise
    /// negated handles (flipping the coefficient sign) before lookup.
    pub(crate) fn get_or_create(
        &mut self,
        variable: IntegerVariable,
        program: &mut LinearProgram,
    ) -> ColIndex {
        lp_assert_simple!(
            variable.is_positive(),
            "only positive-orientation variables are mirrored"
        );

        if let Some(&ordinal) = self.variable_to_ordinal.get(&variable) {
            return self.mirror_columns[ordinal];
        }

        let column = program.new_column(f64::NEG_INFINITY, f64::INFINITY);
        let _ = self
            .variable_to_ordinal
            .insert(variable, self.integer_variables.len());
        self.integer_variables.push(variable);
        self.mirror_columns.push(column);
        column
    }

    pub(crate) fn len(&self) -> usize {
        self.integer_variables.len()
    }

    pub(crate) fn variable(&self, ordinal: usize) -> IntegerVariable {
        self.integer_variables[ordinal]
    }

    pub(crate) fn variables(&self) -> &[IntegerVariable] {
        &self.integer_variables
    }

    pub(crate) fn columns(&self) -> &[ColIndex] {
        &self.mirror_columns
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (IntegerVariable, ColIndex)> + '_ {
        izip!(
            self.integer_variables.iter().copied(),
            self.mirror_columns.iter().copied()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mirroring_is_idempotent() {
        let mut mirror = VariableMirror::default();
        let mut program = LinearProgram::default();
        let x = IntegerVariable::from_index(0);

        let first = mirror.get_or_create(x, &mut program);
        let second = mirror.get_or_create(x, &mut program);

        assert_eq!(first, second);
        assert_eq!(mirror.len(), 1);
        assert_eq!(program.num_columns(), 1);
    }

    #[test]
    fn distinct_variables_get_distinct_columns() {
        let mut mirror = VariableMirror::default();
        let mut program = LinearProgram::default();
        let x = IntegerVariable::from_index(0);
        let y = IntegerVariable::from_index(1);

        let column_x = mirror.get_or_create(x, &mut program);
        let column_y = mirror.get_or_create(y, &mut program);

        assert_ne!(column_x, column_y);
        assert_eq!(mirror.variables(), &[x, y]);
    }

    #[test]
    #[should_panic]
    fn negated_handles_are_rejected() {
        let mut mirror = VariableMirror::default();
        let mut program = LinearProgram::default();
        let x = IntegerVariable::from_index(0);

        let _ = mirror.get_or_create(x.negated(), &mut program);
    }
}
