use crate::error::{GeoError, GeoResult};

/// Solve `matrix · x = rhs` by Gaussian elimination with partial pivoting.
///
/// A pivot smaller than `epsilon` times the largest matrix entry marks the
/// system singular.
pub(super) fn solve_linear_system<const N: usize>(
    mut matrix: [[f64; N]; N],
    mut rhs: [f64; N],
    epsilon: f64,
) -> GeoResult<[f64; N]> {
    let scale = matrix
        .iter()
        .flat_map(|row| row.iter())
        .fold(0.0f64, |acc, v| acc.max(v.abs()));
    if !scale.is_finite() || scale == 0.0 {
        return Err(GeoError::degenerate("linear system has no usable entries"));
    }
    let tolerance = epsilon * scale;

    for col in 0..N {
        let mut pivot_row = col;
        for row in (col + 1)..N {
            if matrix[row][col].abs() > matrix[pivot_row][col].abs() {
                pivot_row = row;
            }
        }
        if matrix[pivot_row][col].abs() <= tolerance {
            return Err(GeoError::degenerate(format!(
                "pivot {col} vanished; control points are collinear or duplicated"
            )));
        }
        matrix.swap(col, pivot_row);
        rhs.swap(col, pivot_row);

        for row in (col + 1)..N {
            let factor = matrix[row][col] / matrix[col][col];
            for k in col..N {
                matrix[row][k] -= factor * matrix[col][k];
            }
            rhs[row] -= factor * rhs[col];
        }
    }

    let mut solution = [0.0; N];
    for row in (0..N).rev() {
        let mut sum = rhs[row];
        for k in (row + 1)..N {
            sum -= matrix[row][k] * solution[k];
        }
        solution[row] = sum / matrix[row][row];
    }
    if solution.iter().any(|v| !v.is_finite()) {
        return Err(GeoError::degenerate("solution contains non-finite values"));
    }
    Ok(solution)
}
