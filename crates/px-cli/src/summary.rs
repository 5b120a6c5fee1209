use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use px_core::ConversionSummary;
use px_model::{Keyword, KeywordScope, ValueStyle};
use px_output::WriteReport;

pub fn print_conversion_summary(summary: &ConversionSummary, report: Option<&WriteReport>) {
    match report {
        Some(report) => println!(
            "Output: {} ({} bytes, {})",
            report.path.display(),
            report.bytes,
            report.encoding
        ),
        None => println!("Output: dry run, nothing written"),
    }

    let mut table = Table::new();
    table.set_header(vec![header_cell("Item"), header_cell("Value")]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);

    let languages = format!("{} ({} total)", summary.main_language, summary.languages);
    let time = summary
        .time_variable
        .clone()
        .unwrap_or_else(|| "-".to_string());
    let rows: Vec<(&str, Cell)> = vec![
        ("Main language", Cell::new(languages)),
        ("Metadata entries", Cell::new(summary.entries)),
        ("Stub variables", Cell::new(summary.stub_variables)),
        ("Heading variables", Cell::new(summary.heading_variables)),
        ("Figures variable", Cell::new(&summary.figures_variable)),
        ("Time variable", Cell::new(time)),
        ("Rows", Cell::new(summary.rows)),
        ("Columns", Cell::new(summary.columns)),
        ("Missing cells", count_cell(summary.missing, Color::Yellow)),
    ];
    for (label, value) in rows {
        table.add_row(vec![Cell::new(label), value]);
    }
    println!("{table}");
}

pub fn print_keyword_table() {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Keyword"),
        header_cell("Language"),
        header_cell("Scope"),
        header_cell("Style"),
    ]);
    apply_table_style(&mut table);
    for keyword in Keyword::ALL {
        let language = if keyword.is_language_dependent() {
            Cell::new("yes")
        } else {
            dim_cell("no")
        };
        table.add_row(vec![
            Cell::new(keyword.name()),
            language,
            Cell::new(scope_label(keyword.scope())),
            Cell::new(style_label(keyword.style())),
        ]);
    }
    println!("{table}");
}

fn scope_label(scope: KeywordScope) -> &'static str {
    match scope {
        KeywordScope::Table => "table",
        KeywordScope::Variable => "variable",
        KeywordScope::Cell => "cell",
        KeywordScope::Any => "any",
    }
}

fn style_label(style: ValueStyle) -> &'static str {
    match style {
        ValueStyle::Text => "text",
        ValueStyle::Boolean => "boolean",
        ValueStyle::Integer => "integer",
        ValueStyle::TimeList => "time list",
    }
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count == 0 {
        dim_cell(count)
    } else {
        Cell::new(count).fg(color)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
