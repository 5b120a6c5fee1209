//! Completed, reshaped data cube.
//!
//! Rows are the cartesian product of the STUB axes, columns the cartesian
//! product of the HEADING axes. Both products run with the first axis as
//! the slowest-varying key. Cells are stored row-major; a code tuple maps
//! to its row or column by mixed-radix arithmetic over per-axis positions,
//! so no product is ever materialized for lookup.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::table::DataTable;

/// Separator between HEADING codes in a pivot column name.
pub const COLUMN_NAME_SEPARATOR: &str = "_";

/// One code on a cube axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisCode {
    pub code: String,
    /// Codelist position; `None` for observed codes that are not declared.
    pub sortorder: Option<u32>,
}

impl AxisCode {
    pub fn declared(code: impl Into<String>, sortorder: u32) -> Self {
        Self {
            code: code.into(),
            sortorder: Some(sortorder),
        }
    }

    pub fn observed(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            sortorder: None,
        }
    }

    /// Sortorder first (undeclared last), then code.
    fn canonical_cmp(&self, other: &Self) -> Ordering {
        match (self.sortorder, other.sortorder) {
            (Some(a), Some(b)) => a.cmp(&b).then_with(|| self.code.cmp(&other.code)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.code.cmp(&other.code),
        }
    }
}

/// The completion domain of one classification variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Axis {
    pub variable: String,
    codes: Vec<AxisCode>,
    positions: BTreeMap<String, usize>,
}

impl Axis {
    /// Build an axis; codes are deduplicated and put in canonical order.
    pub fn new(variable: impl Into<String>, mut codes: Vec<AxisCode>) -> Self {
        codes.sort_by(AxisCode::canonical_cmp);
        let mut positions = BTreeMap::new();
        let mut unique = Vec::with_capacity(codes.len());
        for code in codes {
            if positions.contains_key(&code.code) {
                continue;
            }
            positions.insert(code.code.clone(), unique.len());
            unique.push(code);
        }
        Self {
            variable: variable.into(),
            codes: unique,
            positions,
        }
    }

    pub fn codes(&self) -> &[AxisCode] {
        &self.codes
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn code(&self, index: usize) -> Option<&str> {
        self.codes.get(index).map(|code| code.code.as_str())
    }

    pub fn position(&self, code: &str) -> Option<usize> {
        self.positions.get(code).copied()
    }
}

/// Restartable lazy cartesian product over a list of axes.
///
/// Yields one code tuple per combination, last axis fastest. An empty axis
/// list yields a single empty tuple; any empty axis yields nothing.
#[derive(Debug, Clone)]
pub struct CartesianProduct<'a> {
    axes: &'a [Axis],
    current: Vec<usize>,
    done: bool,
}

impl<'a> CartesianProduct<'a> {
    pub fn new(axes: &'a [Axis]) -> Self {
        Self {
            axes,
            current: vec![0; axes.len()],
            done: axes.iter().any(Axis::is_empty),
        }
    }

    fn advance(&mut self) {
        for index in (0..self.axes.len()).rev() {
            let Some(slot) = self.current.get_mut(index) else {
                continue;
            };
            *slot += 1;
            if *slot < self.axes[index].len() {
                return;
            }
            *slot = 0;
        }
        self.done = true;
    }
}

impl<'a> Iterator for CartesianProduct<'a> {
    type Item = Vec<&'a str>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let key = self
            .axes
            .iter()
            .zip(&self.current)
            .filter_map(|(axis, &position)| axis.code(position))
            .collect();
        self.advance();
        Some(key)
    }
}

/// One cube cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CubeCell {
    Figure(String),
    Missing,
}

impl CubeCell {
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }
}

/// The completed table of figures for every code combination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataCube {
    pub stub: Vec<Axis>,
    pub heading: Vec<Axis>,
    pub figures_variable: String,
    cells: Vec<CubeCell>,
}

impl DataCube {
    /// A cube of the given shape with every cell missing.
    pub fn new_missing(
        stub: Vec<Axis>,
        heading: Vec<Axis>,
        figures_variable: impl Into<String>,
    ) -> Self {
        let rows = axis_product(&stub);
        let columns = axis_product(&heading);
        Self {
            stub,
            heading,
            figures_variable: figures_variable.into(),
            cells: vec![CubeCell::Missing; rows * columns],
        }
    }

    pub fn row_count(&self) -> usize {
        axis_product(&self.stub)
    }

    pub fn column_count(&self) -> usize {
        axis_product(&self.heading)
    }

    pub fn cells(&self) -> &[CubeCell] {
        &self.cells
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&CubeCell> {
        if column >= self.column_count() {
            return None;
        }
        self.cells.get(row * self.column_count() + column)
    }

    pub fn cell_mut(&mut self, row: usize, column: usize) -> Option<&mut CubeCell> {
        let width = self.column_count();
        if column >= width {
            return None;
        }
        self.cells.get_mut(row * width + column)
    }

    /// Rows in output order, each `column_count()` cells wide.
    pub fn rows(&self) -> impl Iterator<Item = &[CubeCell]> {
        self.cells.chunks(self.column_count().max(1))
    }

    /// Row keys (STUB code tuples) in output order.
    pub fn row_keys(&self) -> CartesianProduct<'_> {
        CartesianProduct::new(&self.stub)
    }

    /// Column keys (HEADING code tuples) in output order.
    pub fn column_keys(&self) -> CartesianProduct<'_> {
        CartesianProduct::new(&self.heading)
    }

    /// Pivot column names: HEADING codes joined by [`COLUMN_NAME_SEPARATOR`],
    /// or the figures variable when there is no HEADING.
    pub fn column_names(&self) -> Vec<String> {
        if self.heading.is_empty() {
            return vec![self.figures_variable.clone()];
        }
        self.column_keys()
            .map(|key| key.join(COLUMN_NAME_SEPARATOR))
            .collect()
    }

    pub fn row_index(&self, codes: &[&str]) -> Option<usize> {
        mixed_radix_index(&self.stub, codes)
    }

    pub fn column_index(&self, codes: &[&str]) -> Option<usize> {
        mixed_radix_index(&self.heading, codes)
    }

    pub fn missing_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_missing()).count()
    }

    /// Flatten back to a long table: one row per code combination with STUB
    /// codes, HEADING codes and the figure (empty when missing).
    pub fn to_data_table(&self) -> DataTable {
        let mut headers: Vec<String> = self
            .stub
            .iter()
            .chain(&self.heading)
            .map(|axis| axis.variable.clone())
            .collect();
        headers.push(self.figures_variable.clone());
        let mut table = DataTable::new(headers);
        let column_keys: Vec<Vec<&str>> = self.column_keys().collect();
        for (row_key, cells) in self.row_keys().zip(self.rows()) {
            for (column_key, cell) in column_keys.iter().zip(cells) {
                let mut row: Vec<String> = row_key
                    .iter()
                    .chain(column_key)
                    .map(|code| (*code).to_string())
                    .collect();
                row.push(match cell {
                    CubeCell::Figure(value) => value.clone(),
                    CubeCell::Missing => String::new(),
                });
                table.push_row(row);
            }
        }
        table
    }
}

fn axis_product(axes: &[Axis]) -> usize {
    axes.iter().map(Axis::len).product()
}

fn mixed_radix_index(axes: &[Axis], codes: &[&str]) -> Option<usize> {
    if axes.len() != codes.len() {
        return None;
    }
    axes.iter()
        .zip(codes)
        .try_fold(0usize, |index, (axis, code)| {
            axis.position(code).map(|position| index * axis.len() + position)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn axis(variable: &str, codes: &[&str]) -> Axis {
        Axis::new(
            variable,
            codes
                .iter()
                .enumerate()
                .map(|(i, code)| AxisCode::declared(*code, i as u32 + 1))
                .collect(),
        )
    }

    #[test]
    fn test_axis_orders_undeclared_last() {
        let axis = Axis::new(
            "Region",
            vec![
                AxisCode::observed("00"),
                AxisCode::declared("02", 1),
                AxisCode::declared("01", 2),
                AxisCode::observed("02"),
            ],
        );
        let codes: Vec<&str> = axis.codes().iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, vec!["02", "01", "00"]);
        assert_eq!(axis.position("00"), Some(2));
    }

    #[test]
    fn test_cartesian_product_last_axis_fastest() {
        let axes = vec![axis("A", &["a1", "a2"]), axis("B", &["b1", "b2", "b3"])];
        let keys: Vec<Vec<&str>> = CartesianProduct::new(&axes).collect();
        assert_eq!(keys.len(), 6);
        assert_eq!(keys[0], vec!["a1", "b1"]);
        assert_eq!(keys[1], vec!["a1", "b2"]);
        assert_eq!(keys[3], vec!["a2", "b1"]);

        let restarted = CartesianProduct::new(&axes).count();
        assert_eq!(restarted, 6);
    }

    #[test]
    fn test_cartesian_product_edge_cases() {
        let none: Vec<Axis> = Vec::new();
        let keys: Vec<Vec<&str>> = CartesianProduct::new(&none).collect();
        assert_eq!(keys, vec![Vec::<&str>::new()]);

        let empty = vec![axis("A", &["a1"]), Axis::new("B", Vec::new())];
        assert_eq!(CartesianProduct::new(&empty).count(), 0);
    }

    #[test]
    fn test_index_matches_product_position() {
        let cube = DataCube::new_missing(
            vec![axis("A", &["a1", "a2"]), axis("B", &["b1", "b2", "b3"])],
            vec![axis("Y", &["2019", "2020"])],
            "Value",
        );
        for (position, key) in cube.row_keys().enumerate() {
            assert_eq!(cube.row_index(&key), Some(position));
        }
        assert_eq!(cube.column_index(&["2020"]), Some(1));
        assert_eq!(cube.row_index(&["a1"]), None);
        assert_eq!(cube.column_names(), vec!["2019", "2020"]);
        assert_eq!(cube.missing_count(), 12);
    }

    #[test]
    fn test_to_data_table_flattens_every_cell() {
        let mut cube = DataCube::new_missing(
            vec![axis("Region", &["01", "02"])],
            vec![axis("Year", &["2019", "2020"])],
            "Population",
        );
        if let Some(cell) = cube.cell_mut(1, 0) {
            *cell = CubeCell::Figure("42".to_string());
        }
        let table = cube.to_data_table();
        assert_eq!(table.headers, vec!["Region", "Year", "Population"]);
        assert_eq!(table.rows.len(), 4);
        assert_eq!(table.rows[2], vec!["02", "2019", "42"]);
        assert_eq!(table.rows[3], vec!["02", "2020", ""]);
    }
}
