//! Line tokenizer for comma-delimited text.

const DELIMITER: char = ',';
const QUOTE: char = '"';

/// Split one line into trimmed fields.
///
/// Rules:
///
/// - `,` separates fields unless it appears inside a quoted span.
/// - A `"` opens or closes a quoted span wherever it appears in a field.
/// - Inside a quoted span, `""` is an escaped quote and yields one literal `"`.
/// - Every field is trimmed after assembly, including the last one.
/// - An unterminated span is closed by the end of the line; this never fails.
///
/// The result always has at least one field.
///
/// ```rust
/// use csv_user_ingest::ingestion::tokenize;
///
/// assert_eq!(tokenize(r#""Smith, John",40"#), vec!["Smith, John", "40"]);
/// ```
pub fn tokenize(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            QUOTE if in_quotes && chars.peek() == Some(&QUOTE) => {
                current.push(QUOTE);
                chars.next();
            }
            QUOTE => in_quotes = !in_quotes,
            DELIMITER if !in_quotes => {
                fields.push(current.trim().to_owned());
                current.clear();
            }
            other => current.push(other),
        }
    }
    fields.push(current.trim().to_owned());
    fields
}

#[cfg(test)]
mod tests {
    use super::tokenize;

    #[test]
    fn splits_on_commas_and_trims() {
        assert_eq!(tokenize(" Alice , 30 ,x "), vec!["Alice", "30", "x"]);
    }

    #[test]
    fn keeps_commas_inside_quotes() {
        assert_eq!(tokenize(r#""Smith, John",40"#), vec!["Smith, John", "40"]);
    }

    #[test]
    fn collapses_escaped_quotes() {
        assert_eq!(tokenize(r#""He said ""hi""",1"#), vec![r#"He said "hi""#, "1"]);
    }

    #[test]
    fn quote_may_open_mid_field() {
        assert_eq!(tokenize(r#"ab"c,d"e,f"#), vec!["abc,de", "f"]);
    }

    #[test]
    fn unterminated_quote_runs_to_end_of_line() {
        assert_eq!(tokenize(r#"a,"b,c"#), vec!["a", "b,c"]);
    }

    #[test]
    fn empty_fields_are_preserved() {
        assert_eq!(tokenize(",,"), vec!["", "", ""]);
        assert_eq!(tokenize(""), vec![""]);
    }

    #[test]
    fn whitespace_inside_quotes_is_trimmed_after_assembly() {
        assert_eq!(tokenize(r#"" padded ",x"#), vec!["padded", "x"]);
    }
}
