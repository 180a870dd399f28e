//! Load reports and their rendering.

use std::ops::Range;

use crate::parser::ParseError;
use crate::repository::RepositoryError;

/// Why a line was skipped during a bulk load.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("line {}: {source}", .line + 1)]
    Rejected {
        line: usize,
        #[source]
        source: RepositoryError,
    },
}

impl LoadError {
    pub fn line(&self) -> usize {
        match self {
            LoadError::Parse(e) => e.line(),
            LoadError::Rejected { line, .. } => *line,
        }
    }

    fn field(&self) -> Option<usize> {
        match self {
            LoadError::Parse(e) => e.field(),
            // Repository rejections are about the id.
            LoadError::Rejected { .. } => Some(0),
        }
    }

    fn label(&self) -> String {
        match self {
            LoadError::Parse(ParseError::CorruptedLine { reason, .. }) => reason.to_string(),
            LoadError::Parse(ParseError::Invalid { source, .. }) => source.to_string(),
            LoadError::Rejected { source, .. } => source.to_string(),
        }
    }
}

/// Outcome of one bulk load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Number of devices stored.
    pub loaded: usize,
    /// Lines that were skipped, in line order.
    pub failures: Vec<LoadError>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Render every failure of `report` against the lines it was loaded from.
///
/// `filename` only labels the output.
pub fn format_load_errors(report: &LoadReport, lines: &[String], filename: &str) -> String {
    use ariadne::Color;
    use ariadne::Config;
    use ariadne::IndexType;
    use ariadne::Label;
    use ariadne::Report;
    use ariadne::ReportKind;
    use ariadne::Source;

    let source = lines.join("\n");
    let offsets = line_offsets(lines);

    let mut output = Vec::new();
    for failure in &report.failures {
        let line = failure.line();
        let Some(&start) = offsets.get(line) else {
            // Failure for a line we were not given; report it without a span.
            output.extend_from_slice(format!("Error: {failure}\n").as_bytes());
            continue;
        };
        let text = &lines[line];
        let span = failure
            .field()
            .and_then(|field| field_span(text, field))
            .map(|r| start + r.start..start + r.end)
            .unwrap_or(start..start + text.len());

        Report::build(ReportKind::Error, (filename, span.clone()))
            .with_config(Config::default().with_index_type(IndexType::Byte))
            .with_message(format!("skipped line {}", line + 1))
            .with_label(
                Label::new((filename, span))
                    .with_message(failure.label())
                    .with_color(Color::Red),
            )
            .finish()
            .write((filename, Source::from(source.as_str())), &mut output)
            .ok();
    }
    String::from_utf8_lossy(&output).to_string()
}

fn line_offsets(lines: &[String]) -> Vec<usize> {
    lines
        .iter()
        .scan(0, |offset, line| {
            let start = *offset;
            *offset += line.len() + 1;
            Some(start)
        })
        .collect()
}

/// Byte range of the `field`-th comma-separated field of `line`.
fn field_span(line: &str, field: usize) -> Option<Range<usize>> {
    let mut start = 0;
    for (index, value) in line.split(',').enumerate() {
        if index == field {
            return Some(start..start + value.len());
        }
        start += value.len() + 1;
    }
    None
}
