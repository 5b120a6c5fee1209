//! Data cube construction.
//!
//! Every data row is resolved to one code per classification variable.
//! Each axis is the completion domain of its variable: declared codes in
//! sortorder, followed by observed codes the codelist does not declare.
//! The cube starts with every cell missing and each observation is placed
//! at its mixed-radix index, so combinations absent from the data stay
//! missing and the result is always rectangular.

use std::collections::{BTreeMap, BTreeSet};

use px_model::{Axis, AxisCode, Codelist, CubeCell, DataCube, DataTable, PxError, Result};

use crate::context::{ColumnBinding, ConversionContext};

/// Codelists keyed by variable code.
pub type Codelists = BTreeMap<String, Codelist>;

/// Build the completed, pivoted cube for one table.
pub fn build_data_cube(
    ctx: &ConversionContext,
    codelists: &Codelists,
    data: &DataTable,
) -> Result<DataCube> {
    let bindings: Vec<&ColumnBinding> = ctx.stub.iter().chain(&ctx.heading).collect();
    let mut observed: Vec<BTreeSet<String>> = vec![BTreeSet::new(); bindings.len()];
    let mut resolved_rows: Vec<(Vec<String>, Option<String>)> =
        Vec::with_capacity(data.row_count());

    for row in 0..data.row_count() {
        if is_blank_row(data, row) {
            continue;
        }
        let mut key = Vec::with_capacity(bindings.len());
        for (binding, seen) in bindings.iter().zip(observed.iter_mut()) {
            let code = resolve_code(
                codelists.get(&binding.variable),
                binding,
                data.value(row, binding.column),
            )?;
            seen.insert(code.clone());
            key.push(code);
        }
        let figure = data.value(row, ctx.figures_column).trim();
        let figure = (!figure.is_empty()).then(|| figure.to_string());
        resolved_rows.push((key, figure));
    }

    let mut axes: Vec<Axis> = bindings
        .iter()
        .zip(observed)
        .map(|(binding, seen)| {
            completion_domain(codelists.get(&binding.variable), &binding.variable, seen)
        })
        .collect();
    let heading = axes.split_off(ctx.stub.len());
    let stub = axes;

    let mut cube = DataCube::new_missing(stub, heading, ctx.figures_variable.clone());
    let width = cube.column_count();
    let mut filled = vec![false; cube.row_count() * width];
    let stub_len = ctx.stub.len();

    for (key, figure) in resolved_rows {
        let codes: Vec<&str> = key.iter().map(String::as_str).collect();
        let (stub_codes, heading_codes) = codes.split_at(stub_len);
        let (Some(row), Some(column)) =
            (cube.row_index(stub_codes), cube.column_index(heading_codes))
        else {
            continue;
        };
        let position = row * width + column;
        if filled.get(position).copied().unwrap_or(true) {
            return Err(PxError::DuplicateObservation {
                key: describe_key(&bindings, &key),
            });
        }
        filled[position] = true;
        if let (Some(figure), Some(cell)) = (figure, cube.cell_mut(row, column)) {
            *cell = CubeCell::Figure(figure);
        }
    }

    tracing::info!(
        rows = cube.row_count(),
        columns = cube.column_count(),
        missing = cube.missing_count(),
        "Built data cube"
    );
    Ok(cube)
}

/// Declared codes in sortorder, then undeclared observed codes by code.
pub fn completion_domain(
    codelist: Option<&Codelist>,
    variable: &str,
    observed: BTreeSet<String>,
) -> Axis {
    let mut codes: Vec<AxisCode> = codelist
        .map(|codelist| {
            codelist
                .entries()
                .iter()
                .map(|entry| AxisCode::declared(entry.code.clone(), entry.sortorder))
                .collect()
        })
        .unwrap_or_default();
    for code in observed {
        if codelist.and_then(|codelist| codelist.get(&code)).is_none() {
            codes.push(AxisCode::observed(code));
        }
    }
    Axis::new(variable, codes)
}

fn resolve_code(
    codelist: Option<&Codelist>,
    binding: &ColumnBinding,
    value: &str,
) -> Result<String> {
    let value = value.trim();
    match codelist.filter(|codelist| !codelist.is_empty()) {
        Some(codelist) => codelist
            .resolve(value)
            .map(|entry| entry.code.clone())
            .ok_or_else(|| PxError::unresolvable_code(&binding.variable, value)),
        None => Ok(value.to_string()),
    }
}

fn is_blank_row(data: &DataTable, row: usize) -> bool {
    data.rows
        .get(row)
        .is_none_or(|cells| cells.iter().all(|cell| cell.trim().is_empty()))
}

fn describe_key(bindings: &[&ColumnBinding], key: &[String]) -> String {
    bindings
        .iter()
        .zip(key)
        .map(|(binding, code)| format!("{}={}", binding.variable, code))
        .collect::<Vec<_>>()
        .join(", ")
}
