//! Report formatting and printing utilities.
//!
//! This module provides functions to display diagnostics in cargo-style
//! format. Separate from core logic so the crate can be used as a library.

use std::io::{self, Write};

use anyhow::Result;
use colored::Colorize;
use unicode_width::UnicodeWidthStr;

use crate::core::context::AnalysisReport;
use crate::issues::{Category, Diagnostic, ParseError, Severity};

/// Success mark for consistent output formatting.
pub const SUCCESS_MARK: &str = "\u{2713}"; // check mark

/// Failure mark for consistent output formatting.
pub const FAILURE_MARK: &str = "\u{2718}"; // heavy ballot x

/// Print a report's diagnostics and parse errors in cargo-style format to stdout.
pub fn report(report: &AnalysisReport<'_>, verbose: bool) {
    report_to(report, verbose, &mut io::stdout().lock());
}

/// Print a report to a custom writer. Useful for testing or redirection.
pub fn report_to<W: Write>(report: &AnalysisReport<'_>, verbose: bool, writer: &mut W) {
    if report.diagnostics.is_empty() && report.parse_errors.is_empty() {
        print_success_to(report.files_analyzed, writer);
        return;
    }

    let max_line_width = calculate_max_line_width(report.diagnostics);

    for diagnostic in report.diagnostics {
        print_diagnostic(diagnostic, writer, max_line_width);
    }
    for parse_error in report.parse_errors {
        print_parse_error(parse_error, writer);
    }

    print_summary(report.diagnostics, report.parse_errors, writer);
    print_parse_warning(report.parse_errors.len(), verbose, writer);
}

/// Serialize a report's diagnostics to JSON on stdout.
pub fn report_json(report: &AnalysisReport<'_>) -> Result<()> {
    #[derive(serde::Serialize)]
    struct JsonReport<'a> {
        diagnostics: &'a [Diagnostic],
        parse_errors: Vec<JsonParseError<'a>>,
        files_analyzed: usize,
    }
    #[derive(serde::Serialize)]
    struct JsonParseError<'a> {
        file: &'a str,
        error: &'a str,
    }

    let payload = JsonReport {
        diagnostics: report.diagnostics,
        parse_errors: report
            .parse_errors
            .iter()
            .map(|e| JsonParseError {
                file: &e.file,
                error: &e.error,
            })
            .collect(),
        files_analyzed: report.files_analyzed,
    };
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

fn print_success_to<W: Write>(files_analyzed: usize, writer: &mut W) {
    let _ = writeln!(
        writer,
        "{} {}",
        SUCCESS_MARK.green(),
        format!(
            "Checked {} {} - no issues found",
            files_analyzed,
            if files_analyzed == 1 { "file" } else { "files" }
        )
        .green()
    );
}

fn print_parse_warning<W: Write>(count: usize, verbose: bool, writer: &mut W) {
    if count > 0 && !verbose {
        let _ = writeln!(
            writer,
            "{} {} file(s) could not be parsed (use {} for details)",
            "warning:".bold().yellow(),
            count,
            "-v".cyan()
        );
    }
}

fn print_diagnostic<W: Write>(diagnostic: &Diagnostic, writer: &mut W, max_line_width: usize) {
    let severity_str = match diagnostic.severity {
        Severity::High => "error".bold().red(),
        Severity::Medium => "warning".bold().yellow(),
        Severity::Low => "note".bold().cyan(),
    };

    let _ = writeln!(
        writer,
        "{}: {}  {}",
        severity_str,
        diagnostic.explanation,
        diagnostic.error_code.as_str().dimmed().cyan()
    );
    let _ = writeln!(
        writer,
        "  {} {}:{}:{}",
        "-->".blue(),
        diagnostic.file,
        diagnostic.line,
        diagnostic.column
    );

    if let Some(source_line) = read_source_line(&diagnostic.file, diagnostic.line) {
        let caret_char = match diagnostic.severity {
            Severity::High => "^".red(),
            Severity::Medium => "^".yellow(),
            Severity::Low => "^".cyan(),
        };
        let _ = writeln!(writer, "{:>width$} {}", "", "|".blue(), width = max_line_width);
        let _ = writeln!(
            writer,
            "{:>width$} {} {}",
            diagnostic.line.to_string().blue(),
            "|".blue(),
            source_line,
            width = max_line_width
        );
        let prefix = if diagnostic.column > 1 {
            source_line.chars().take(diagnostic.column - 1).collect::<String>()
        } else {
            String::new()
        };
        let caret_padding = UnicodeWidthStr::width(prefix.as_str());
        let _ = writeln!(
            writer,
            "{:>width$} {} {:>padding$}{}",
            "",
            "|".blue(),
            "",
            caret_char,
            width = max_line_width,
            padding = caret_padding
        );
    }

    let _ = writeln!(
        writer,
        "{:>width$} {} {} {} depends on {}",
        "",
        "=".blue(),
        "note:".bold(),
        diagnostic.hook_type,
        diagnostic.problematic_dependency,
        width = max_line_width
    );
    if matches!(diagnostic.category, Category::Critical | Category::Warning) {
        let _ = writeln!(
            writer,
            "{:>width$} {} {} {}",
            "",
            "=".blue(),
            "confidence:".bold(),
            format!("{:?}", diagnostic.confidence).to_lowercase(),
            width = max_line_width
        );
    }

    let _ = writeln!(writer);
}

fn print_parse_error<W: Write>(error: &ParseError, writer: &mut W) {
    let _ = writeln!(
        writer,
        "{}: {}  {}",
        "error".bold().red(),
        error.error,
        "parse-error".dimmed().cyan()
    );
    let _ = writeln!(writer, "  {} {}", "-->".blue(), error.file);
    let _ = writeln!(writer);
}

fn print_summary<W: Write>(diagnostics: &[Diagnostic], parse_errors: &[ParseError], writer: &mut W) {
    let critical = diagnostics
        .iter()
        .filter(|d| d.category == Category::Critical)
        .count();
    let other = diagnostics.len() - critical;
    let total = diagnostics.len() + parse_errors.len();

    if total > 0 {
        let _ = writeln!(
            writer,
            "{} {} problem(s) ({} {}, {} other, {} parse error(s))",
            FAILURE_MARK.red(),
            total,
            critical,
            if critical == 1 { "critical" } else { "critical" }.red(),
            other,
            parse_errors.len()
        );
    }
}

fn calculate_max_line_width(diagnostics: &[Diagnostic]) -> usize {
    diagnostics
        .iter()
        .map(|d| d.line)
        .max()
        .map(|n| n.to_string().len())
        .unwrap_or(1)
}

fn read_source_line(file: &str, line: usize) -> Option<String> {
    let content = std::fs::read_to_string(file).ok()?;
    content.lines().nth(line.checked_sub(1)?).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issues::{Confidence, ErrorCode};

    fn sample_report<'a>(diagnostics: &'a [Diagnostic], parse_errors: &'a [ParseError]) -> AnalysisReport<'a> {
        AnalysisReport {
            diagnostics,
            parse_errors,
            files_analyzed: 1,
        }
    }

    #[test]
    fn test_report_empty_prints_success() {
        let mut out = Vec::new();
        report_to(&sample_report(&[], &[]), false, &mut out);
        let s = String::from_utf8(out).unwrap();
        assert!(s.contains("no issues found"));
    }

    #[test]
    fn test_report_diagnostic_prints_location_and_code() {
        let diag = Diagnostic::new(
            ErrorCode::EffectDirectLoop,
            "src/Comp.tsx",
            10,
            5,
            "useEffect",
            "n",
            Severity::High,
            Confidence::High,
            "setN is called unconditionally inside useEffect depending on n.",
        );
        let diagnostics = vec![diag];
        let mut out = Vec::new();
        report_to(&sample_report(&diagnostics, &[]), false, &mut out);
        let s = String::from_utf8(out).unwrap();
        assert!(s.contains("src/Comp.tsx:10:5"));
        assert!(s.contains("RLD-200"));
        assert!(s.contains("1 problem"));
    }

    #[test]
    fn test_report_parse_error_counted_in_summary() {
        let parse_errors = vec![ParseError {
            file: "src/Broken.tsx".to_string(),
            error: "Unexpected token".to_string(),
        }];
        let mut out = Vec::new();
        report_to(&sample_report(&[], &parse_errors), true, &mut out);
        let s = String::from_utf8(out).unwrap();
        assert!(s.contains("src/Broken.tsx"));
        assert!(s.contains("1 problem"));
    }
}
