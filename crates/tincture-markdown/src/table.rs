//! Pipe tables.
//!
//! ```text
//! | Name | Qty |      header
//! |:-----|----:|      separator, one cell per column
//! | nut  |   2 |      body rows
//! Total: 2            optional footer
//! ```

use std::sync::LazyLock;

use regex::Regex;
use strum_macros::Display;

use crate::inline::InlineFormatter;

static SEPARATOR_CELL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^:?-+:?$").expect("separator pattern is valid"));

/// Horizontal alignment of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Alignment {
    /// `:-` or `-`
    Left,
    /// `:-:`
    Center,
    /// `-:`
    Right,
}

impl Alignment {
    fn from_separator(cell: &str) -> Option<Self> {
        if !SEPARATOR_CELL_RE.is_match(cell) {
            return None;
        }
        Some(match (cell.starts_with(':'), cell.ends_with(':')) {
            (true, true) => Self::Center,
            (false, true) => Self::Right,
            _ => Self::Left,
        })
    }
}

/// Split a `| a | b |` row into trimmed cells. `\|` stays in the cell.
#[must_use]
pub fn split_row(line: &str) -> Vec<String> {
    let line = line.trim();
    let line = line.strip_prefix('|').unwrap_or(line);
    let line = if line.ends_with('|') && !line.ends_with("\\|") {
        &line[..line.len() - 1]
    } else {
        line
    };

    let mut cells = Vec::new();
    let mut cell = String::new();
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'|') => {
                cell.push('|');
                let _ = chars.next();
            }
            '|' => cells.push(std::mem::take(&mut cell).trim().to_string()),
            _ => cell.push(c),
        }
    }
    cells.push(cell.trim().to_string());
    cells
}

/// Column alignments from the separator row, or `None` if it is not one.
#[must_use]
pub fn parse_separator(line: &str) -> Option<Vec<Alignment>> {
    split_row(line)
        .iter()
        .map(|cell| Alignment::from_separator(cell))
        .collect()
}

/// Render a table, or `None` if `rows` do not form one.
///
/// `rows` holds every `|` line; `footer` is a trailing non-table line to
/// render as `<tfoot>`.
#[must_use]
pub fn render_table(
    rows: &[String],
    footer: Option<&str>,
    inline: &InlineFormatter<'_>,
) -> Option<Vec<String>> {
    let [header, separator, body @ ..] = rows else {
        return None;
    };
    let header = split_row(header);
    let alignments = parse_separator(separator)?;
    if alignments.len() != header.len() {
        return None;
    }

    let mut out = vec!["<table>".to_string(), "<thead>".to_string()];
    out.push(render_row(&header, &alignments, "th", inline));
    out.push("</thead>".to_string());
    out.push("<tbody>".to_string());
    for row in body {
        out.push(render_row(&split_row(row), &alignments, "td", inline));
    }
    out.push("</tbody>".to_string());
    if let Some(footer) = footer {
        out.push("<tfoot>".to_string());
        out.push(format!(
            "<tr><td colspan=\"{}\">{}</td></tr>",
            alignments.len(),
            inline.format(footer.trim())
        ));
        out.push("</tfoot>".to_string());
    }
    out.push("</table>".to_string());
    Some(out)
}

/// One `<tr>`, padded with empty cells or truncated to the column count.
fn render_row(
    cells: &[String],
    alignments: &[Alignment],
    cell_tag: &str,
    inline: &InlineFormatter<'_>,
) -> String {
    let mut row = String::from("<tr>");
    for (i, alignment) in alignments.iter().enumerate() {
        let content = cells.get(i).map_or_else(String::new, |c| inline.format(c));
        row.push_str(&format!(
            "<{cell_tag} style=\"text-align: {alignment}\">{content}</{cell_tag}>"
        ));
    }
    row.push_str("</tr>");
    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use tincture_common::codec::PlaceholderCodec;

    fn lines(rows: &[&str]) -> Vec<String> {
        rows.iter().map(|r| (*r).to_string()).collect()
    }

    #[test]
    fn test_split_row() {
        assert_eq!(split_row("| a | b |"), vec!["a", "b"]);
        assert_eq!(split_row("|a|b"), vec!["a", "b"]);
        assert_eq!(split_row(r"| a \| b | c |"), vec!["a | b", "c"]);
    }

    #[test]
    fn test_separator_alignments() {
        assert_eq!(
            parse_separator("|:-|:-:|-:|---|"),
            Some(vec![
                Alignment::Left,
                Alignment::Center,
                Alignment::Right,
                Alignment::Left
            ])
        );
        assert_eq!(parse_separator("| a | - |"), None);
    }

    #[test]
    fn test_render_pads_and_truncates() {
        let codec = PlaceholderCodec;
        let inline = InlineFormatter::new(&codec);
        let out = render_table(
            &lines(&["| a | b |", "|---|--:|", "| 1 |", "| 1 | 2 | 3 |"]),
            None,
            &inline,
        )
        .unwrap();
        assert_eq!(
            out[5],
            "<tr><td style=\"text-align: left\">1</td><td style=\"text-align: right\"></td></tr>"
        );
        assert_eq!(
            out[6],
            "<tr><td style=\"text-align: left\">1</td><td style=\"text-align: right\">2</td></tr>"
        );
    }

    #[test]
    fn test_column_count_mismatch_is_not_a_table() {
        let codec = PlaceholderCodec;
        let inline = InlineFormatter::new(&codec);
        assert!(render_table(&lines(&["| a | b |", "|---|"]), None, &inline).is_none());
        assert!(render_table(&lines(&["| a |"]), None, &inline).is_none());
    }
}
