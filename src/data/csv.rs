/// CSV reading for feature tables such as the exported Iris dataset.
///
/// Supported format:
/// - UTF-8, comma-separated
/// - Optional header row (auto-detected: first row is a header if it contains
///   any non-numeric, non-empty cell other than a trailing label)
/// - Double-quoted fields with embedded commas are handled correctly
/// - A trailing non-numeric cell (e.g. `setosa`) is treated as a class label
///   and dropped; every other cell must parse as `f32`

use std::path::Path;

use crate::error::DataError;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Parses CSV text into numeric rows of equal width.
pub fn parse_csv(text: &str) -> Result<Vec<Vec<f32>>, DataError> {
    let mut lines = text.lines().peekable();

    if let Some(first) = lines.peek() {
        if is_header(first) {
            lines.next();
        }
    }

    let mut rows: Vec<Vec<f32>> = Vec::new();
    for (row_idx, line) in lines.enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let mut cells = parse_csv_row(line);
        if cells.last().is_some_and(|c| !is_numeric(c)) {
            cells.pop();
        }

        let row = parse_floats(&cells, row_idx + 1)?;
        if let Some(first) = rows.first() {
            if row.len() != first.len() {
                return Err(DataError::Width { row: row_idx + 1, expected: first.len(), actual: row.len() });
            }
        }
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(DataError::Empty);
    }
    Ok(rows)
}

/// Parses CSV text into one flat value stream. Rows may differ in width and
/// no label column is dropped.
pub fn parse_values(text: &str) -> Result<Vec<f32>, DataError> {
    let mut lines = text.lines().peekable();
    if lines.peek().is_some_and(|first| is_header(first)) {
        lines.next();
    }

    let mut values = Vec::new();
    for (row_idx, line) in lines.enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        values.extend(parse_floats(&parse_csv_row(line), row_idx + 1)?);
    }

    if values.is_empty() {
        return Err(DataError::Empty);
    }
    Ok(values)
}

/// Reads a CSV file and checks every row has `width` numeric columns.
pub fn load_rows<P: AsRef<Path>>(path: P, width: usize) -> Result<Vec<Vec<f32>>, DataError> {
    let text = std::fs::read_to_string(path)?;
    let rows = parse_csv(&text)?;
    if rows[0].len() != width {
        return Err(DataError::Width { row: 1, expected: width, actual: rows[0].len() });
    }
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn is_numeric(cell: &str) -> bool {
    cell.trim().parse::<f32>().is_ok()
}

/// Returns `true` if the row looks like a header. The last cell is ignored
/// since data rows may end in a textual label.
fn is_header(line: &str) -> bool {
    let cells = parse_csv_row(line);
    let n = cells.len().saturating_sub(1).max(1);
    cells.iter().take(n).any(|c| {
        let t = c.trim();
        !t.is_empty() && !is_numeric(t)
    })
}

/// Parses a single CSV row, handling double-quoted fields.
fn parse_csv_row(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                // Escaped quote inside quoted field.
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            c => current.push(c),
        }
    }
    fields.push(current);
    fields
}

/// Parses a slice of string cells as `f32`, returning an error with row info on failure.
fn parse_floats(cells: &[String], row_num: usize) -> Result<Vec<f32>, DataError> {
    cells.iter()
        .enumerate()
        .map(|(col, c)| {
            c.trim().parse::<f32>().map_err(|_| DataError::InvalidNumber {
                row: row_num,
                column: col + 1,
                token: c.clone(),
            })
        })
        .collect()
}
