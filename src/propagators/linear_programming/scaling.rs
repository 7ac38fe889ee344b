use crate::containers::KeyedVec;
use crate::lp::ColIndex;
use crate::lp::LinearProgram;
use crate::lp::RowIndex;

/// Row/column equilibration of the LP matrix, applied once at registration
/// for numerical stability of the external solver.
///
/// Every row is divided by its largest absolute coefficient, then every
/// column is rescaled so its largest coefficient has magnitude near one. All
/// factors are powers of two, so applying and inverting a scale is exact in
/// floating point. A column value reported by the solver converts back to
/// the CP variable's scale via [`LpScaling::value_at_cp_scale`]; CP bounds
/// convert into the solver's scale via [`LpScaling::bound_at_lp_scale`].
#[derive(Debug, Default)]
pub(crate) struct LpScaling {
    /// `cp_value = lp_value * column_scale[column]`
    column_scale: KeyedVec<ColIndex, f64>,
}

impl LpScaling {
    /// Equilibrate `program` in place and record the column scales.
    pub(crate) fn equilibrate(program: &mut LinearProgram) -> LpScaling {
        let rows: Vec<RowIndex> = program.row_indices().collect();
        for row in rows {
            let magnitude = row_magnitude(program, row);
            if magnitude > 0.0 && magnitude.is_finite() {
                program.scale_row(row, reciprocal_power_of_two(magnitude));
            }
        }

        let mut column_scale = KeyedVec::default();
        column_scale.resize(program.num_columns(), 1.0);
        let columns: Vec<ColIndex> = program.column_indices().collect();
        for column in columns {
            let magnitude = column_magnitude(program, column);
            if magnitude > 0.0 && magnitude.is_finite() {
                let factor = reciprocal_power_of_two(magnitude);
                if factor != 1.0 {
                    program.scale_column(column, factor);
                    column_scale[column] = factor;
                }
            }
        }

        LpScaling { column_scale }
    }

    pub(crate) fn column_scale(&self, column: ColIndex) -> f64 {
        self.column_scale[column]
    }

    /// Convert a raw solver value of `column` back to the CP variable scale.
    pub(crate) fn value_at_cp_scale(&self, column: ColIndex, value: f64) -> f64 {
        value * self.column_scale[column]
    }

    /// Convert a CP-scale bound of `column` into the solver's scale.
    pub(crate) fn bound_at_lp_scale(&self, column: ColIndex, bound: f64) -> f64 {
        bound / self.column_scale[column]
    }
}

fn row_magnitude(program: &LinearProgram, row: RowIndex) -> f64 {
    program
        .row_coefficients(row)
        .iter()
        .map(|(_, coefficient)| coefficient.abs())
        .fold(0.0, f64::max)
}

fn column_magnitude(program: &LinearProgram, column: ColIndex) -> f64 {
    program
        .row_indices()
        .map(|row| program.coefficient(row, column).abs())
        .fold(0.0, f64::max)
}

/// The power of two closest to `1 / magnitude`.
fn reciprocal_power_of_two(magnitude: f64) -> f64 {
    (-magnitude.log2().round()).exp2()
}
