use super::CellValue;

/// Default number of decimals shown for non-integer numbers.
pub const DEFAULT_DECIMALS: usize = 2;

/// Format a cell value for display.
pub fn format_value(value: &CellValue, decimals: usize) -> String {
    match value {
        CellValue::Number(n) => format_number(*n, decimals),
        CellValue::Text(s) => s.clone(),
        CellValue::Error(e) => e.code().to_string(),
    }
}

/// Format a number for display.
pub fn format_number(n: f64, decimals: usize) -> String {
    if n.is_nan() {
        "#NAN!".to_string()
    } else if n.is_infinite() {
        "#INF!".to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{:.0}", n)
    } else {
        format!("{:.*}", decimals, n)
    }
}
