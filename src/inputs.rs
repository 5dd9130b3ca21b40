//! Parsing of free-text identifier inputs.
//!
//! Host integrations expose TMDB ids and title prefixes as a single text
//! value per source. Values are delimiter-separated with optional double
//! quoting, so a title containing the delimiter survives intact.

/// Split a raw input value into a list of trimmed, non-empty cells.
///
/// The delimiter is `;` when the text contains `;` and no `,`, otherwise `,`.
/// Double quotes group cells containing the delimiter; the quotes themselves
/// are stripped. `None`, empty, and whitespace-only input yield an empty list.
pub fn parse_values(raw: Option<&str>) -> Vec<String> {
    let Some(text) = raw else {
        return Vec::new();
    };
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }

    let delimiter = if text.contains(';') && !text.contains(',') {
        ';'
    } else {
        ','
    };

    let mut values = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;

    for ch in text.chars() {
        if ch == '"' {
            in_quotes = !in_quotes;
        } else if ch == delimiter && !in_quotes {
            push_cell(&mut values, &mut cell);
        } else {
            cell.push(ch);
        }
    }
    push_cell(&mut values, &mut cell);

    values
}

fn push_cell(values: &mut Vec<String>, cell: &mut String) {
    let trimmed = cell.trim();
    if !trimmed.is_empty() {
        values.push(trimmed.to_string());
    }
    cell.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_and_empty_input() {
        assert!(parse_values(None).is_empty());
        assert!(parse_values(Some("")).is_empty());
        assert!(parse_values(Some("   ")).is_empty());
    }

    #[test]
    fn test_single_value() {
        assert_eq!(parse_values(Some("603")), vec!["603"]);
        assert_eq!(parse_values(Some("  The Matrix  ")), vec!["The Matrix"]);
    }

    #[test]
    fn test_comma_separated() {
        assert_eq!(
            parse_values(Some("603, 604,605")),
            vec!["603", "604", "605"]
        );
    }

    #[test]
    fn test_semicolon_when_no_comma() {
        assert_eq!(
            parse_values(Some("The Matrix; Dune")),
            vec!["The Matrix", "Dune"]
        );
    }

    #[test]
    fn test_comma_wins_over_semicolon() {
        // Mixed delimiters fall back to comma; the semicolon stays in the cell.
        assert_eq!(
            parse_values(Some("a;b, c")),
            vec!["a;b", "c"]
        );
    }

    #[test]
    fn test_quoted_cell_keeps_delimiter() {
        assert_eq!(
            parse_values(Some(r#""Crouching Tiger, Hidden Dragon", Dune"#)),
            vec!["Crouching Tiger, Hidden Dragon", "Dune"]
        );
    }

    #[test]
    fn test_empty_cells_dropped() {
        assert_eq!(parse_values(Some("603,,  ,604")), vec!["603", "604"]);
    }
}
