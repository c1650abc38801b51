//! Table and heading output for the info commands

use prettytable::{Cell, Row, Table, format};

/// Width of the rule printed under a heading
const HEADING_RULE: usize = 50;

/// A borderless table with bold column titles
pub fn create_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
    let titles = headers.iter().map(|h| Cell::new(h).style_spec("b")).collect();
    table.set_titles(Row::new(titles));
    table
}

/// Append one row of already formatted cells
pub fn add_table_row(table: &mut Table, cells: impl IntoIterator<Item = String>) {
    table.add_row(Row::new(cells.into_iter().map(|s| Cell::new(&s)).collect()));
}

/// Print `kind: path` followed by a rule
pub fn print_heading(kind: &str, path: &std::path::Path) {
    println!("{kind}: {}", path.display());
    println!("{}", "=".repeat(HEADING_RULE));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_and_titles() {
        let mut table = create_table(&["#", "Name"]);
        add_table_row(&mut table, ["0".to_string(), "root".to_string()]);
        add_table_row(&mut table, vec!["1".to_string(), "elbow".to_string()]);
        assert_eq!(table.len(), 2);

        let rendered = table.to_string();
        assert!(rendered.contains("Name"));
        assert!(rendered.contains("elbow"));
    }
}
