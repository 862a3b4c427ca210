use std::io;
use std::ops::Range;

use crate::error::PortError;

/// A user-facing error or warning, rendered at the CLI boundary.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    /// Byte range in the source being reported on, when there is one.
    pub span: Option<Range<usize>>,
    pub notes: Vec<String>,
    pub help: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl Diagnostic {
    pub fn error(message: String) -> Self {
        Self {
            severity: Severity::Error,
            message,
            span: None,
            notes: Vec::new(),
            help: None,
        }
    }

    pub fn warning(message: String) -> Self {
        Self {
            severity: Severity::Warning,
            message,
            span: None,
            notes: Vec::new(),
            help: None,
        }
    }

    pub fn with_span(mut self, span: Range<usize>) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_note(mut self, note: String) -> Self {
        self.notes.push(note);
        self
    }

    pub fn with_help(mut self, help: String) -> Self {
        self.help = Some(help);
        self
    }

    /// A JSON syntax error located at `line`/`column` (1-based) of `source`.
    pub fn json_syntax(err: &serde_json::Error, source: &str) -> Self {
        let offset = line_column_offset(source, err.line(), err.column());
        let end = (offset + 1).min(source.len()).max(offset);
        Diagnostic::error("invalid parameter file".to_string())
            .with_span(offset..end)
            .with_note(err.to_string())
    }

    /// Render the diagnostic to stderr using ariadne.
    pub fn render(&self, filename: &str, source: &str) -> io::Result<()> {
        self.write(filename, source, io::stderr())
    }

    /// Write the rendered report to `out`.
    pub fn write<W: io::Write>(&self, filename: &str, source: &str, out: W) -> io::Result<()> {
        use ariadne::{Color, Label, Report, ReportKind, Source};

        let kind = match self.severity {
            Severity::Error => ReportKind::Error,
            Severity::Warning => ReportKind::Warning,
        };

        let color = match self.severity {
            Severity::Error => Color::Red,
            Severity::Warning => Color::Yellow,
        };

        let span = self.span.clone().unwrap_or(0..0);
        let mut report = Report::build(kind, filename, span.start).with_message(&self.message);
        if self.span.is_some() {
            report = report.with_label(
                Label::new((filename, span))
                    .with_message(&self.message)
                    .with_color(color),
            );
        }

        for note in &self.notes {
            report = report.with_note(note);
        }

        if let Some(help) = &self.help {
            report = report.with_help(help);
        }

        report.finish().write((filename, Source::from(source)), out)
    }
}

impl From<&PortError> for Diagnostic {
    fn from(err: &PortError) -> Self {
        let diag = Diagnostic::error(err.to_string()).with_note(format!("kind: {}", err.kind()));
        match err {
            PortError::UnknownLanguage { .. } => diag.with_help(format!(
                "available languages: {}",
                crate::language::registry().keys().join(", ")
            )),
            PortError::UnknownMode { .. } => diag.with_help(
                "use one of: embedded (combined), split (attached), externalized (exported)"
                    .to_string(),
            ),
            PortError::UnknownMethod { .. } => {
                diag.with_help("use one of: predict, predict_proba".to_string())
            }
            PortError::UnsupportedMethod { .. } => diag.with_help(
                "class probabilities exist for tree, ensemble, neighbors, naive Bayes and \
                 network classifiers; use the predict method"
                    .to_string(),
            ),
            PortError::UnsupportedMode { .. } => diag.with_help(
                "this language has no data loader; use the embedded or split mode".to_string(),
            ),
            PortError::UnknownFamily { .. } => diag.with_help(format!(
                "'family' must be one of: {}",
                crate::model::Family::ALL
                    .iter()
                    .map(|f| f.tag())
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
            PortError::LiteralOverflow { .. } => diag.with_help(
                "try another language or a lower precision".to_string(),
            ),
            PortError::MissingTemplate { .. }
            | PortError::UnboundPlaceholder { .. }
            | PortError::NotFitted { .. }
            | PortError::MalformedValue { .. } => diag,
        }
    }
}

/// Byte offset of a 1-based line/column position, clamped to the source.
fn line_column_offset(source: &str, line: usize, column: usize) -> usize {
    let mut offset = 0;
    for (i, text) in source.split_inclusive('\n').enumerate() {
        if i + 1 == line {
            return (offset + column.saturating_sub(1)).min(source.len());
        }
        offset += text.len();
    }
    source.len()
}

/// Render a list of diagnostics.
pub fn render_diagnostics(diagnostics: &[Diagnostic], filename: &str, source: &str) -> io::Result<()> {
    for diag in diagnostics {
        diag.render(filename, source)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let d = Diagnostic::error("unknown language".to_string()).with_span(10..15);
        assert_eq!(d.severity, Severity::Error);
        assert_eq!(d.message, "unknown language");
        assert_eq!(d.span, Some(10..15));
        assert!(d.notes.is_empty());
        assert!(d.help.is_none());
    }

    #[test]
    fn test_chained_builders() {
        let d = Diagnostic::warning("hint".to_string())
            .with_note("note 1".to_string())
            .with_help("help text".to_string())
            .with_note("note 2".to_string());
        assert_eq!(d.severity, Severity::Warning);
        assert_eq!(d.notes.len(), 2);
        assert!(d.help.is_some());
        assert!(d.span.is_none());
    }

    #[test]
    fn test_from_port_error_adds_help() {
        let err = PortError::UnknownLanguage {
            key: "i_n_v_a_l_i_d".to_string(),
        };
        let d = Diagnostic::from(&err);
        assert!(d.message.contains("i_n_v_a_l_i_d"));
        assert_eq!(d.notes, vec!["kind: unknown-language".to_string()]);
        assert!(d.help.unwrap().contains("go"));
    }

    #[test]
    fn test_json_syntax_points_at_position() {
        let source = "{\n  \"family\": \"svm\",\n  oops\n}\n";
        let err = serde_json::from_str::<serde_json::Value>(source).unwrap_err();
        let d = Diagnostic::json_syntax(&err, source);
        let span = d.span.unwrap();
        assert_eq!(&source[..span.start].matches('\n').count(), &2);
    }

    #[test]
    fn test_line_column_offset() {
        let source = "ab\ncd\n";
        assert_eq!(line_column_offset(source, 1, 1), 0);
        assert_eq!(line_column_offset(source, 2, 2), 4);
        assert_eq!(line_column_offset(source, 9, 1), source.len());
    }

    #[test]
    fn test_render_writes_report() {
        let source = "{\"family\": \"svm\"}\n";
        let d = Diagnostic::error("malformed value".to_string())
            .with_span(1..9)
            .with_note("missing field `model`".to_string());
        let mut out = Vec::new();
        d.write("params.json", source, &mut out).unwrap();
        let text = String::from_utf8_lossy(&out);
        assert!(text.contains("malformed value"));
        assert!(text.contains("missing field `model`"));
        render_diagnostics(&[Diagnostic::warning("no span".to_string())], "params.json", source)
            .unwrap();
    }

    #[test]
    fn test_method_errors_get_help() {
        let d = Diagnostic::from(&PortError::UnknownMethod {
            method: "proba".to_string(),
        });
        assert!(d.help.unwrap().contains("predict_proba"));
        let d = Diagnostic::from(&PortError::UnsupportedMethod {
            family: "support vector machine".to_string(),
            method: "predict_proba".to_string(),
        });
        assert_eq!(d.notes, vec!["kind: unsupported-method".to_string()]);
    }
}
