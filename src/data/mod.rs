pub mod csv;

pub use csv::{load_rows, parse_csv, parse_values};
