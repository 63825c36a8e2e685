use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use recon_model::AnalysisResult;

pub fn print_summary(result: &AnalysisResult) {
    println!("{}", result.message);
    println!("{}", pipeline_table(result));
    println!("{}", outcome_table(result));
    match result.notification_delivered {
        Some(true) => println!("Notification: delivered"),
        Some(false) => println!("Notification: FAILED"),
        None => println!("Notification: not sent"),
    }
    if !result.errors.is_empty() {
        eprintln!("Errors:");
        for error in &result.errors {
            eprintln!("- {error}");
        }
    }
}

/// Row counts through the intra-file stages.
pub fn pipeline_table(result: &AnalysisResult) -> Table {
    let counts = &result.counts;
    let mut table = Table::new();
    table.set_header(vec![header_cell("Stage"), header_cell("Rows")]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    table.add_row(vec![Cell::new("Parsed"), Cell::new(counts.parsed_rows)]);
    table.add_row(vec![
        Cell::new("Duplicate groups"),
        Cell::new(counts.duplicate_groups),
    ]);
    table.add_row(vec![
        Cell::new("Collapsed"),
        count_cell(counts.collapsed_rows, Color::Yellow),
    ]);
    table.add_row(vec![
        Cell::new("Rejected"),
        count_cell(counts.rejected_rows, Color::Red),
    ]);
    table.add_row(vec![
        Cell::new("Lookup failures"),
        count_cell(counts.lookup_failures, Color::Red),
    ]);
    table
}

/// Final new/updated/unchanged split.
pub fn outcome_table(result: &AnalysisResult) -> Table {
    let summary = &result.counts.summary;
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("New"),
        header_cell("Updated"),
        header_cell("Unchanged"),
        header_cell("Total"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 0..4 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    table.add_row(vec![
        Cell::new(summary.new).fg(Color::Green),
        Cell::new(summary.updated).fg(Color::Blue),
        Cell::new(summary.unchanged),
        Cell::new(summary.total_processed).add_attribute(Attribute::Bold),
    ]);
    table
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(80);
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
