//! Markdown status report.
//!
//! One table row per processed issue, in run order:
//!
//! ```text
//! | issue | package | target tag | delay (days) | bot advice |
//! | ----- | ------- | ---------- | ------------ | ---------- |
//! | [#12](https://github.com/o/r/issues/12) | azure-mgmt-foo | package-2024-01 | 3 | MultiAPI<br>On time |
//! ```
//!
//! Cells escape `\` as `\\` and `|` as `\|`; advice entries are joined with
//! `<br>`.

mod error;
mod renderer;

pub use error::ReportError;
pub use renderer::{create_handlebars_registry, ReportRenderer};

use crate::process::IssueProcess;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

const ADVICE_SEPARATOR: &str = "<br>";

const TEMPLATE: &str = "| issue | package | target tag | delay (days) | bot advice |\n\
| ----- | ------- | ---------- | ------------ | ---------- |\n\
{{#each rows}}| [#{{number}}]({{url}}) | {{package}} | {{target_tag}} | {{delay}} | {{advice}} |\n{{/each}}";

static ISSUE_CELL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[#(\d+)\]\((.*)\)$").expect("valid issue cell regex"));

/// One issue as shown in the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub number: u64,
    pub url: String,
    /// Empty when the package could not be determined.
    pub package: String,
    pub target_tag: String,
    pub delay_time: i64,
    pub bot_advice: Vec<String>,
}

impl From<&IssueProcess> for ReportRow {
    fn from(process: &IssueProcess) -> Self {
        Self {
            number: process.number(),
            url: process.package().issue.html_url.clone(),
            package: process.package_name().unwrap_or_default().to_string(),
            target_tag: process.target_tag().to_string(),
            delay_time: process.delay_time(),
            bot_advice: process.bot_advice().to_vec(),
        }
    }
}

#[derive(Serialize)]
struct RowData {
    number: u64,
    url: String,
    package: String,
    target_tag: String,
    delay: i64,
    advice: String,
}

impl From<&ReportRow> for RowData {
    fn from(row: &ReportRow) -> Self {
        Self {
            number: row.number,
            url: escape_cell(&row.url),
            package: escape_cell(&row.package),
            target_tag: escape_cell(&row.target_tag),
            delay: row.delay_time,
            advice: row
                .bot_advice
                .iter()
                .map(|advice| escape_cell(advice))
                .collect::<Vec<_>>()
                .join(ADVICE_SEPARATOR),
        }
    }
}

#[derive(Serialize)]
struct ReportData {
    rows: Vec<RowData>,
}

/// Renders the report table.
///
/// # Errors
///
/// Returns [`ReportError`] if rendering fails.
pub fn render_report(rows: &[ReportRow]) -> Result<String, ReportError> {
    let data = ReportData {
        rows: rows.iter().map(RowData::from).collect(),
    };
    ReportRenderer::new().render(TEMPLATE, &data)
}

/// Reads the rows of a rendered report back. Lines outside the table body
/// are ignored.
///
/// # Errors
///
/// Returns [`ReportError::MalformedRow`] for a body row that does not have
/// five cells or whose issue or delay cell cannot be read.
pub fn parse_report(markdown: &str) -> Result<Vec<ReportRow>, ReportError> {
    let mut rows = Vec::new();
    for (index, line) in markdown.lines().enumerate() {
        let line_number = index + 1;
        let line = line.trim();
        if !line.starts_with("| [#") {
            continue;
        }

        let malformed = |reason: &str| ReportError::MalformedRow {
            line: line_number,
            reason: reason.to_string(),
        };
        let cells = split_cells(line);
        let [issue, package, target_tag, delay, advice] = cells.as_slice() else {
            return Err(malformed("expected five cells"));
        };

        let captures = ISSUE_CELL
            .captures(issue)
            .ok_or_else(|| malformed("issue cell is not a link"))?;
        let number = captures[1]
            .parse()
            .map_err(|_| malformed("issue number is not a number"))?;
        let delay_time = delay
            .parse()
            .map_err(|_| malformed("delay is not a number"))?;

        rows.push(ReportRow {
            number,
            url: captures[2].to_string(),
            package: package.clone(),
            target_tag: target_tag.clone(),
            delay_time,
            bot_advice: advice
                .split(ADVICE_SEPARATOR)
                .filter(|entry| !entry.is_empty())
                .map(String::from)
                .collect(),
        });
    }
    Ok(rows)
}

fn escape_cell(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('|', "\\|")
        .replace('\n', " ")
}

/// Splits a table line on unescaped pipes and unescapes each cell.
fn split_cells(line: &str) -> Vec<String> {
    let inner = line.strip_prefix('|').unwrap_or(line);
    let inner = inner.strip_suffix('|').unwrap_or(inner);

    let mut cells = Vec::new();
    let mut current = String::new();
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(escaped @ ('|' | '\\')) => current.push(escaped),
                Some(other) => {
                    current.push('\\');
                    current.push(other);
                }
                None => current.push('\\'),
            },
            '|' => cells.push(std::mem::take(&mut current).trim().to_string()),
            _ => current.push(c),
        }
    }
    cells.push(current.trim().to_string());
    cells
}
