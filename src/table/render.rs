use super::types::{CellValue, Table};

pub const DEFAULT_MAX_TOKENS: usize = 800;

/// Digits after the decimal point before trailing zeros are trimmed.
const FLOAT_PRECISION: usize = 6;

/// Fixed-width text layout of a table without an index column.
///
/// Each column is right-aligned to its widest cell (header included) and
/// columns are separated by a single space. An empty table is described by
/// its column list instead.
pub fn render_table(table: &Table) -> String {
    if table.is_empty() {
        return format!(
            "Empty DataFrame\nColumns: [{}]\nIndex: []",
            table.columns().join(", ")
        );
    }

    let formatted: Vec<Vec<String>> = (0..table.columns().len())
        .map(|col| format_column(table, col))
        .collect();
    let cells: Vec<Vec<String>> = (0..table.len())
        .map(|row| formatted.iter().map(|column| column[row].clone()).collect())
        .collect();

    let widths: Vec<usize> = table
        .columns()
        .iter()
        .enumerate()
        .map(|(i, name)| {
            cells
                .iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(name.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut lines = Vec::with_capacity(cells.len() + 1);
    lines.push(format_line(
        table.columns().iter().map(String::as_str),
        &widths,
    ));
    for row in &cells {
        lines.push(format_line(row.iter().map(String::as_str), &widths));
    }
    lines.join("\n")
}

fn format_line<'a>(values: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    values
        .zip(widths.iter())
        .map(|(value, &width)| format!("{value:>width$}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Cell text for one column. Float columns share one precision: fixed
/// notation with six decimals, trailing zeros trimmed while every value ends
/// in one, or scientific notation when tiny or very wide values are present.
fn format_column(table: &Table, col: usize) -> Vec<String> {
    let cells: Vec<&CellValue> = table.rows().iter().map(|row| &row[col]).collect();
    let is_float = cells.iter().any(|c| matches!(c, CellValue::Float(_)))
        && cells
            .iter()
            .all(|c| matches!(c, CellValue::Float(_) | CellValue::Missing));
    if !is_float {
        return cells.iter().map(|c| c.to_string()).collect();
    }

    let values: Vec<Option<f64>> = cells
        .iter()
        .map(|c| match c {
            CellValue::Float(v) => Some(*v),
            _ => None,
        })
        .collect();

    let fixed = format_floats(&values, |v| format!("{v:.prec$}", prec = FLOAT_PRECISION));
    let too_long = fixed.iter().map(String::len).max().unwrap_or(0) > FLOAT_PRECISION + 6;
    let threshold = 10f64.powi(-(FLOAT_PRECISION as i32));
    let present = || values.iter().flatten().map(|v| v.abs());
    let has_large = present().any(|v| v > 1e6);
    let has_small = present().any(|v| v > 0.0 && v < threshold);

    let strings = if has_small || (too_long && has_large) {
        format_floats(&values, format_scientific)
    } else {
        fixed
    };
    trim_trailing_zeros(strings)
}

fn format_floats(values: &[Option<f64>], format: impl Fn(f64) -> String) -> Vec<String> {
    values
        .iter()
        .map(|v| match v {
            Some(v) if v.is_finite() => format(*v),
            Some(v) => v.to_string(),
            None => CellValue::Missing.to_string(),
        })
        .collect()
}

/// `1.234560e+07` style, with a signed exponent of at least two digits.
fn format_scientific(value: f64) -> String {
    let raw = format!("{value:.prec$e}", prec = FLOAT_PRECISION);
    match raw.split_once('e') {
        Some((mantissa, exp)) => match exp.parse::<i32>() {
            Ok(exp) => {
                let sign = if exp < 0 { '-' } else { '+' };
                format!("{mantissa}e{sign}{:02}", exp.abs())
            }
            Err(_) => raw,
        },
        None => raw,
    }
}

fn is_plain_decimal(value: &str) -> bool {
    let body = value.strip_prefix(['+', '-']).unwrap_or(value);
    match body.split_once('.') {
        Some((int, frac)) => {
            !int.is_empty()
                && int.bytes().all(|b| b.is_ascii_digit())
                && frac.bytes().all(|b| b.is_ascii_digit())
        }
        None => false,
    }
}

fn trim_trailing_zeros(mut values: Vec<String>) -> Vec<String> {
    loop {
        let mut decimals = values.iter().filter(|v| is_plain_decimal(v)).peekable();
        if decimals.peek().is_none() || !decimals.all(|v| v.ends_with('0')) {
            break;
        }
        for v in values.iter_mut().filter(|v| is_plain_decimal(v)) {
            v.pop();
        }
    }
    for v in values.iter_mut() {
        if v.ends_with('.') && is_plain_decimal(v) {
            v.push('0');
        }
    }
    values
}

/// Keeps the first `max_tokens` whitespace-delimited tokens, joined by single spaces.
pub fn truncate_tokens(text: &str, max_tokens: usize) -> String {
    text.split_whitespace()
        .take(max_tokens)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::loader::parse_csv;

    #[test]
    fn test_render_aligns_columns() {
        let table = parse_csv(b"name,rate\nDeluxe,4500\nSuite,12000\n").expect("table");
        assert_eq!(
            render_table(&table),
            "  name  rate\nDeluxe  4500\n Suite 12000"
        );
    }

    #[test]
    fn test_render_float_column_shares_precision() {
        let table = parse_csv(b"name,rate\na,4500.5\nb,3000.25\nc,0.1234567\n").expect("table");
        assert_eq!(
            render_table(&table),
            "name        rate\n   a 4500.500000\n   b 3000.250000\n   c    0.123457"
        );
    }

    #[test]
    fn test_render_float_column_trims_common_zeros() {
        let table = parse_csv(b"name,rate\na,4500.5\nb,3000.25\nc,\n").expect("table");
        assert_eq!(
            render_table(&table),
            "name    rate\n   a 4500.50\n   b 3000.25\n   c     NaN"
        );

        let table = parse_csv(b"rate\n2.0\n3\n").expect("table");
        assert_eq!(render_table(&table), "rate\n 2.0\n 3.0");
    }

    #[test]
    fn test_render_tiny_floats_use_scientific_notation() {
        let table = parse_csv(b"x\n0.0000001\n1.5\n").expect("table");
        assert_eq!(render_table(&table), "           x\n1.000000e-07\n1.500000e+00");
    }

    #[test]
    fn test_render_empty_table() {
        let table = parse_csv(b"primary_name,rule\n").expect("table");
        assert_eq!(
            render_table(&table),
            "Empty DataFrame\nColumns: [primary_name, rule]\nIndex: []"
        );
    }

    #[test]
    fn test_truncate_keeps_prefix() {
        assert_eq!(truncate_tokens("a  b\tc\nd e", 3), "a b c");
    }

    #[test]
    fn test_truncate_short_input_is_normalised_not_cut() {
        assert_eq!(truncate_tokens("  one   two ", 800), "one two");
        assert_eq!(truncate_tokens("", 5), "");
    }

    #[test]
    fn test_truncate_token_count_is_min_of_input_and_limit() {
        let text = (0..1000).map(|i| i.to_string()).collect::<Vec<_>>().join(" ");
        for limit in [0, 1, 799, 800, 1000, 1200] {
            let out = truncate_tokens(&text, limit);
            let tokens: Vec<&str> = out.split_whitespace().collect();
            assert_eq!(tokens.len(), limit.min(1000));
            let expected: Vec<&str> = text.split_whitespace().take(tokens.len()).collect();
            assert_eq!(tokens, expected);
        }
    }
}
