//! Rectangular matrices of exact rationals.
//!
//! Entries are stored row-major in a flat vector, `data[i * cols + j]`.

use crate::error::AlgebraError;
use crate::rational::{format_rational, int};
use num_rational::BigRational;
use num_traits::{One, Zero};
use serde::Serialize;
use std::fmt;
use std::ops::{Index, IndexMut};

/// Column vectors (right-hand sides, solutions, witnesses).
pub type Vector = Vec<BigRational>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<BigRational>,
}

impl Matrix {
    /// Builds a matrix from rows. All rows must be non-empty and of equal length.
    pub fn from_rows(rows: Vec<Vec<BigRational>>) -> Result<Self, AlgebraError> {
        let row_count = rows.len();
        if row_count == 0 {
            return Err(AlgebraError::Shape("matrix has no rows".to_string()));
        }
        let cols = rows[0].len();
        if cols == 0 {
            return Err(AlgebraError::Shape("matrix has no columns".to_string()));
        }
        if let Some((idx, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != cols) {
            return Err(AlgebraError::Shape(format!(
                "row {} has {} entries, expected {}",
                idx + 1,
                row.len(),
                cols
            )));
        }
        Ok(Self {
            rows: row_count,
            cols,
            data: rows.into_iter().flatten().collect(),
        })
    }

    pub fn from_integers<R: AsRef<[i64]>>(rows: &[R]) -> Result<Self, AlgebraError> {
        Self::from_rows(
            rows.iter()
                .map(|row| row.as_ref().iter().map(|&v| int(v)).collect())
                .collect(),
        )
    }

    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![BigRational::zero(); rows * cols],
        }
    }

    pub fn identity(n: usize) -> Self {
        let mut matrix = Self::zeros(n, n);
        for i in 0..n {
            matrix[(i, i)] = BigRational::one();
        }
        matrix
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    pub fn row(&self, row: usize) -> &[BigRational] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    pub fn column(&self, col: usize) -> Vector {
        (0..self.rows).map(|i| self[(i, col)].clone()).collect()
    }

    pub fn to_rows(&self) -> Vec<Vec<BigRational>> {
        (0..self.rows).map(|i| self.row(i).to_vec()).collect()
    }

    /// Submatrix with `row` and `col` removed.
    ///
    /// # Panics
    ///
    /// If the matrix is smaller than 2×2 or `(row, col)` is out of range.
    pub fn minor(&self, row: usize, col: usize) -> Matrix {
        assert!(self.rows >= 2 && self.cols >= 2, "minor of a matrix smaller than 2x2");
        assert!(row < self.rows && col < self.cols, "matrix index out of range");
        let mut data = Vec::with_capacity((self.rows - 1) * (self.cols - 1));
        for i in (0..self.rows).filter(|&i| i != row) {
            for j in (0..self.cols).filter(|&j| j != col) {
                data.push(self[(i, j)].clone());
            }
        }
        Matrix {
            rows: self.rows - 1,
            cols: self.cols - 1,
            data,
        }
    }

    /// `[A | b]`.
    pub fn augment_column(&self, rhs: &[BigRational]) -> Result<Matrix, AlgebraError> {
        if rhs.len() != self.rows {
            return Err(AlgebraError::Shape(format!(
                "right-hand side has {} entries but the matrix has {} rows",
                rhs.len(),
                self.rows
            )));
        }
        let mut data = Vec::with_capacity(self.rows * (self.cols + 1));
        for (i, value) in rhs.iter().enumerate() {
            data.extend_from_slice(self.row(i));
            data.push(value.clone());
        }
        Ok(Matrix {
            rows: self.rows,
            cols: self.cols + 1,
            data,
        })
    }

    /// `[A | B]`.
    pub fn augment(&self, other: &Matrix) -> Result<Matrix, AlgebraError> {
        if other.rows != self.rows {
            return Err(AlgebraError::Shape(format!(
                "cannot augment a matrix with {} rows by one with {} rows",
                self.rows, other.rows
            )));
        }
        let mut data = Vec::with_capacity(self.rows * (self.cols + other.cols));
        for i in 0..self.rows {
            data.extend_from_slice(self.row(i));
            data.extend_from_slice(other.row(i));
        }
        Ok(Matrix {
            rows: self.rows,
            cols: self.cols + other.cols,
            data,
        })
    }

    /// Splits `[L | R]` before column `at`. Requires `0 < at < cols`.
    pub fn split_columns(&self, at: usize) -> Result<(Matrix, Matrix), AlgebraError> {
        if at == 0 || at >= self.cols {
            return Err(AlgebraError::Shape(format!(
                "cannot split {} columns at {}",
                self.cols, at
            )));
        }
        let mut left = Vec::with_capacity(self.rows * at);
        let mut right = Vec::with_capacity(self.rows * (self.cols - at));
        for i in 0..self.rows {
            let row = self.row(i);
            left.extend_from_slice(&row[..at]);
            right.extend_from_slice(&row[at..]);
        }
        Ok((
            Matrix {
                rows: self.rows,
                cols: at,
                data: left,
            },
            Matrix {
                rows: self.rows,
                cols: self.cols - at,
                data: right,
            },
        ))
    }

    pub fn transpose(&self) -> Matrix {
        let mut out = Matrix::zeros(self.cols, self.rows);
        for i in 0..self.rows {
            for j in 0..self.cols {
                out[(j, i)] = self[(i, j)].clone();
            }
        }
        out
    }

    pub fn product(&self, other: &Matrix) -> Result<Matrix, AlgebraError> {
        if self.cols != other.rows {
            return Err(AlgebraError::Shape(format!(
                "cannot multiply {}x{} by {}x{}",
                self.rows, self.cols, other.rows, other.cols
            )));
        }
        let mut out = Matrix::zeros(self.rows, other.cols);
        for i in 0..self.rows {
            for j in 0..other.cols {
                let mut sum = BigRational::zero();
                for k in 0..self.cols {
                    sum += &self[(i, k)] * &other[(k, j)];
                }
                out[(i, j)] = sum;
            }
        }
        Ok(out)
    }

    pub fn mul_vector(&self, v: &[BigRational]) -> Result<Vector, AlgebraError> {
        if v.len() != self.cols {
            return Err(AlgebraError::Shape(format!(
                "vector has {} entries but the matrix has {} columns",
                v.len(),
                self.cols
            )));
        }
        Ok((0..self.rows)
            .map(|i| {
                self.row(i)
                    .iter()
                    .zip(v)
                    .fold(BigRational::zero(), |acc, (a, b)| acc + a * b)
            })
            .collect())
    }

    /// Copy with column `col` replaced by `values`.
    pub fn with_column(&self, col: usize, values: &[BigRational]) -> Result<Matrix, AlgebraError> {
        if col >= self.cols || values.len() != self.rows {
            return Err(AlgebraError::Shape(format!(
                "cannot replace column {} of a {}x{} matrix with {} values",
                col + 1,
                self.rows,
                self.cols,
                values.len()
            )));
        }
        let mut out = self.clone();
        for (i, value) in values.iter().enumerate() {
            out[(i, col)] = value.clone();
        }
        Ok(out)
    }

    pub fn scale(&self, factor: &BigRational) -> Matrix {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|v| v * factor).collect(),
        }
    }

    pub fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for j in 0..self.cols {
            self.data.swap(a * self.cols + j, b * self.cols + j);
        }
    }

    pub fn scale_row(&mut self, row: usize, factor: &BigRational) {
        let cols = self.cols;
        for value in &mut self.data[row * cols..(row + 1) * cols] {
            *value = &*value * factor;
        }
    }

    /// `R_target <- R_target - factor * R_source`.
    pub fn subtract_scaled_row(&mut self, target: usize, source: usize, factor: &BigRational) {
        for j in 0..self.cols {
            let delta = &self[(source, j)] * factor;
            self[(target, j)] -= delta;
        }
    }

    pub fn is_upper_triangular(&self) -> bool {
        self.is_square()
            && (0..self.rows).all(|i| (0..i).all(|j| self[(i, j)].is_zero()))
    }

    pub fn is_lower_triangular(&self) -> bool {
        self.is_square()
            && (0..self.rows).all(|i| (i + 1..self.cols).all(|j| self[(i, j)].is_zero()))
    }

    pub fn is_identity(&self) -> bool {
        self.is_square()
            && (0..self.rows).all(|i| {
                (0..self.cols).all(|j| {
                    let v = &self[(i, j)];
                    if i == j {
                        v.is_one()
                    } else {
                        v.is_zero()
                    }
                })
            })
    }

    pub fn diagonal(&self) -> Vector {
        (0..self.rows.min(self.cols))
            .map(|i| self[(i, i)].clone())
            .collect()
    }

    /// Formatted cells, for display layers.
    pub fn to_strings(&self) -> Vec<Vec<String>> {
        (0..self.rows)
            .map(|i| self.row(i).iter().map(format_rational).collect())
            .collect()
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = BigRational;

    fn index(&self, (row, col): (usize, usize)) -> &BigRational {
        assert!(row < self.rows && col < self.cols, "matrix index out of range");
        &self.data[row * self.cols + col]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut BigRational {
        assert!(row < self.rows && col < self.cols, "matrix index out of range");
        &mut self.data[row * self.cols + col]
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cells = self.to_strings();
        let width = cells
            .iter()
            .flatten()
            .map(String::len)
            .max()
            .unwrap_or(1);
        for (i, row) in cells.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "[")?;
            for cell in row {
                write!(f, " {cell:>width$}")?;
            }
            write!(f, " ]")?;
        }
        Ok(())
    }
}
