//! Signed relation matrices.
//!
//! A [`RelationMatrix`] is the problem instance of correlation clustering:
//! a symmetric `N × N` matrix whose off-diagonal cells say whether two
//! items attract (`+1`), repel (`-1`) or ignore each other (`0`).
//!
//! Matrices are built once, either drawn at random with
//! [`RelationMatrix::from_generator`] or parsed from the line-oriented text
//! format with [`RelationMatrix::from_text`], and then shared read-only by
//! the optimization engine.

use crate::error::{ClusterError, Result};
use rand::Rng;
use std::path::Path;
use tracing::warn;

/// Relation between two items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Relation {
    /// The items should be placed in different groups (`-1`).
    Repulsive,
    /// No preference (`0`). Never penalized.
    #[default]
    Neutral,
    /// The items should be placed in the same group (`+1`).
    Attractive,
}

impl Relation {
    /// Returns the signed numeric value: `-1`, `0` or `1`.
    pub fn value(self) -> i8 {
        match self {
            Relation::Repulsive => -1,
            Relation::Neutral => 0,
            Relation::Attractive => 1,
        }
    }

    /// Converts a signed value back into a relation.
    ///
    /// Returns `None` for anything outside `{-1, 0, 1}`.
    pub fn from_value(value: i8) -> Option<Self> {
        match value {
            -1 => Some(Relation::Repulsive),
            0 => Some(Relation::Neutral),
            1 => Some(Relation::Attractive),
            _ => None,
        }
    }

    /// Whether placing two items with this relation together / apart
    /// counts as a violation.
    ///
    /// `together == true` means both items carry the same label.
    #[inline]
    pub fn is_violated(self, together: bool) -> bool {
        match self {
            Relation::Repulsive => together,
            Relation::Attractive => !together,
            Relation::Neutral => false,
        }
    }
}

/// Parameters for drawing a random relation matrix.
///
/// Each unordered pair is first neutral with probability `zero_ratio`;
/// otherwise a second, independent draw makes it attractive with
/// probability `positive_ratio` and repulsive with the remaining
/// probability.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RelationDensity {
    /// Probability that a non-neutral pair is attractive.
    pub positive_ratio: f64,
    /// Probability that a pair is neutral.
    pub zero_ratio: f64,
}

impl Default for RelationDensity {
    fn default() -> Self {
        Self {
            positive_ratio: 0.7,
            zero_ratio: 0.0,
        }
    }
}

impl RelationDensity {
    pub fn new(positive_ratio: f64, zero_ratio: f64) -> Self {
        Self {
            positive_ratio,
            zero_ratio,
        }
    }

    /// Validates that both ratios are probabilities.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.positive_ratio) {
            return Err(ClusterError::config(format!(
                "positive_ratio must be in [0, 1], got {}",
                self.positive_ratio
            )));
        }
        if !(0.0..=1.0).contains(&self.zero_ratio) {
            return Err(ClusterError::config(format!(
                "zero_ratio must be in [0, 1], got {}",
                self.zero_ratio
            )));
        }
        Ok(())
    }
}

/// Symmetric `N × N` matrix of [`Relation`]s with a neutral diagonal.
///
/// # Examples
///
/// ```
/// use u_corrclust::relation::{Relation, RelationMatrix};
///
/// let matrix = RelationMatrix::from_text("# 3\n0,1,-1\n1,0,0\n-1,0,0\n").unwrap();
/// assert_eq!(matrix.size(), 3);
/// assert_eq!(matrix.get(0, 1), Relation::Attractive);
/// assert_eq!(matrix.get(2, 0), Relation::Repulsive);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RelationMatrix {
    size: usize,
    cells: Vec<Relation>,
}

impl RelationMatrix {
    /// Creates an all-neutral matrix.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![Relation::Neutral; size * size],
        }
    }

    /// Draws a random matrix.
    ///
    /// Every unordered pair `i < j` is drawn independently according to
    /// `density`; the diagonal is neutral.
    pub fn from_generator<R: Rng>(
        size: usize,
        density: &RelationDensity,
        rng: &mut R,
    ) -> Result<Self> {
        density.validate()?;

        let mut matrix = Self::new(size);
        for i in 0..size {
            for j in (i + 1)..size {
                let relation = if rng.random::<f64>() < density.zero_ratio {
                    Relation::Neutral
                } else if rng.random::<f64>() <= density.positive_ratio {
                    Relation::Attractive
                } else {
                    Relation::Repulsive
                };
                matrix.set(i, j, relation);
            }
        }
        Ok(matrix)
    }

    /// Builds a matrix from rows of signed values.
    ///
    /// Rows must form a square, symmetric matrix over `{-1, 0, 1}`.
    /// A non-neutral diagonal is forced to neutral.
    pub fn from_rows(rows: &[Vec<i8>]) -> Result<Self> {
        let lines: Vec<usize> = (1..=rows.len()).collect();
        Self::build(rows, &lines)
    }

    /// Replaces every cell with the given rows.
    ///
    /// Validation is identical to [`from_rows`](Self::from_rows); on error
    /// the matrix is left unchanged.
    pub fn replace(&mut self, rows: &[Vec<i8>]) -> Result<()> {
        *self = Self::from_rows(rows)?;
        Ok(())
    }

    /// Parses the line-oriented text format.
    ///
    /// An optional first line `# <size>` declares the size; without it the
    /// size is the number of values on the first row. Every row holds
    /// `size` comma-separated integers. Blank lines are ignored.
    pub fn from_text(source: &str) -> Result<Self> {
        let mut lines = source
            .lines()
            .enumerate()
            .map(|(idx, line)| (idx + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty())
            .peekable();

        let mut declared = None;
        if let Some((line_no, line)) = lines.peek().copied() {
            if let Some(rest) = line.strip_prefix('#') {
                let token = rest
                    .split_whitespace()
                    .next()
                    .ok_or_else(|| ClusterError::malformed(line_no, "header is missing a size"))?;
                let size = token.parse::<usize>().map_err(|_| {
                    ClusterError::malformed(line_no, format!("invalid size token '{token}'"))
                })?;
                declared = Some(size);
                lines.next();
            }
        }

        let mut rows = Vec::new();
        let mut row_lines = Vec::new();
        for (line_no, line) in lines {
            let row = line
                .split(',')
                .map(|token| {
                    let token = token.trim();
                    token.parse::<i8>().map_err(|_| {
                        ClusterError::malformed(line_no, format!("invalid value '{token}'"))
                    })
                })
                .collect::<Result<Vec<i8>>>()?;
            rows.push(row);
            row_lines.push(line_no);
        }

        let size = match declared {
            Some(size) => size,
            None => rows.first().map_or(0, Vec::len),
        };
        if rows.len() != size {
            let line = row_lines.last().copied().unwrap_or(1);
            return Err(ClusterError::malformed(
                line,
                format!("expected {size} rows, got {}", rows.len()),
            ));
        }

        Self::build(&rows, &row_lines)
    }

    /// Reads and parses a matrix file. See [`from_text`](Self::from_text).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_text(&source)
    }

    /// Serializes to the text format accepted by [`from_text`](Self::from_text).
    pub fn to_text(&self) -> String {
        let mut out = format!("# {}\n", self.size);
        for i in 0..self.size {
            let row: Vec<String> = self.row(i).iter().map(|r| r.value().to_string()).collect();
            out.push_str(&row.join(","));
            out.push('\n');
        }
        out
    }

    /// Number of items.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Relation between items `i` and `j`.
    ///
    /// # Panics
    /// Panics if either index is out of range.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> Relation {
        self.cells[i * self.size + j]
    }

    /// Signed value of the relation between `i` and `j`.
    #[inline]
    pub fn value(&self, i: usize, j: usize) -> i8 {
        self.get(i, j).value()
    }

    /// All relations of item `i`, indexed by the other item.
    #[inline]
    pub fn row(&self, i: usize) -> &[Relation] {
        &self.cells[i * self.size..(i + 1) * self.size]
    }

    /// Sets the relation between `i` and `j` (both directions).
    ///
    /// Writes to the diagonal are ignored.
    pub fn set(&mut self, i: usize, j: usize, relation: Relation) {
        if i == j {
            return;
        }
        self.cells[i * self.size + j] = relation;
        self.cells[j * self.size + i] = relation;
    }

    fn build(rows: &[Vec<i8>], lines: &[usize]) -> Result<Self> {
        let size = rows.len();
        let mut matrix = Self::new(size);

        for (i, row) in rows.iter().enumerate() {
            let line = lines[i];
            if row.len() != size {
                return Err(ClusterError::malformed(
                    line,
                    format!("expected {size} values, got {}", row.len()),
                ));
            }
            for (j, &value) in row.iter().enumerate() {
                let relation = Relation::from_value(value).ok_or_else(|| {
                    ClusterError::malformed(line, format!("value {value} is not in {{-1, 0, 1}}"))
                })?;
                if i == j {
                    if relation != Relation::Neutral {
                        warn!(item = i, value, "non-neutral diagonal entry forced to 0");
                    }
                    continue;
                }
                if j < i && matrix.get(j, i) != relation {
                    return Err(ClusterError::malformed(
                        line,
                        format!("matrix is not symmetric at ({i}, {j})"),
                    ));
                }
                matrix.cells[i * size + j] = relation;
            }
        }

        Ok(matrix)
    }
}
