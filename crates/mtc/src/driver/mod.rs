//! Checking driver and pipeline orchestration
//!
//! Every file is parsed before any is checked. A syntax error in any file
//! blocks checking of all of them, and only the syntax errors are reported.

use crate::common::{CheckError, CheckResult, DiagnosticReporter};
use crate::config::CheckerConfig;
use crate::diagnostics::{Diagnostic, Formatter, Summary};
use crate::frontend::{self, ast::Module};
use crate::sema;

/// Exit status when no errors were found
pub const EXIT_OK: i32 = 0;
/// Exit status when type errors were reported
pub const EXIT_ERRORS: i32 = 1;
/// Exit status for syntax errors and unreadable input
pub const EXIT_FATAL: i32 = 2;

/// A source file handed to the checker
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Path as it should appear in the report
    pub path: String,
    pub text: String,
}

impl SourceFile {
    pub fn new(path: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }
}

/// Diagnostics for one checked file
#[derive(Debug, Clone)]
pub struct FileReport {
    pub path: String,
    pub diagnostics: Vec<Diagnostic>,
}

impl FileReport {
    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }
}

/// Rendered report text and the process exit status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub output: String,
    pub exit_code: i32,
}

/// Pipeline that parses, checks and reports a set of files
pub struct Pipeline {
    config: CheckerConfig,
    formatter: Formatter,
    reporter: Option<DiagnosticReporter>,
}

impl Pipeline {
    pub fn new(config: CheckerConfig) -> Self {
        let reporter = config.pretty.then(DiagnosticReporter::new);
        Self {
            formatter: Formatter::new(config.show_error_codes),
            config,
            reporter,
        }
    }

    /// Check every file and render the complete report
    pub fn run(&mut self, files: &[SourceFile]) -> RunOutcome {
        tracing::debug!(files = files.len(), "starting run");

        let mut modules = Vec::with_capacity(files.len());
        let mut fatal = Vec::new();
        for file in files {
            let file_id = self.register(file);
            match self.parse_file(file, file_id) {
                Ok(module) => modules.push((file, file_id, module)),
                Err(err) => fatal.push((file, err)),
            }
        }

        if !fatal.is_empty() {
            return self.fatal_outcome(&fatal);
        }

        let reports: Vec<FileReport> = modules
            .iter()
            .map(|(file, file_id, module)| self.check_module(file, *file_id, module))
            .collect();
        self.report_outcome(&reports, files.len())
    }

    /// Parse one file, honouring the dump options
    fn parse_file(&self, file: &SourceFile, file_id: Option<usize>) -> CheckResult<Module> {
        let _span = tracing::debug_span!("parse", path = %file.path).entered();

        let result = self.dump_tokens(&file.text).and_then(|()| frontend::parse(&file.text));
        let module = match result {
            Ok(module) => module,
            Err(err) => {
                tracing::debug!(%err, "parse failed");
                if let (Some(reporter), Some(file_id)) = (&self.reporter, file_id) {
                    reporter.report_error(file_id, &err);
                }
                return Err(err);
            }
        };

        if self.config.dump_ast {
            eprintln!("=== AST: {} ===", file.path);
            eprintln!("{:#?}", module);
            eprintln!("=== End AST ===\n");
        }
        Ok(module)
    }

    fn dump_tokens(&self, source: &str) -> CheckResult<()> {
        if self.config.dump_tokens {
            let dump = frontend::dump_tokens(source)?;
            eprintln!("=== Tokens ===");
            eprint!("{}", dump);
            eprintln!("=== End Tokens ===\n");
        }
        Ok(())
    }

    fn check_module(&self, file: &SourceFile, file_id: Option<usize>, module: &Module) -> FileReport {
        let _span = tracing::debug_span!("check", path = %file.path).entered();

        let diagnostics = sema::check(module);
        if let (Some(reporter), Some(file_id)) = (&self.reporter, file_id) {
            for diagnostic in &diagnostics {
                reporter.report_diagnostic(file_id, diagnostic);
            }
        }

        FileReport {
            path: file.path.clone(),
            diagnostics,
        }
    }

    fn register(&mut self, file: &SourceFile) -> Option<usize> {
        self.reporter
            .as_mut()
            .map(|reporter| reporter.add_file(file.path.clone(), file.text.clone()))
    }

    fn fatal_outcome(&self, fatal: &[(&SourceFile, CheckError)]) -> RunOutcome {
        let mut lines: Vec<String> = fatal
            .iter()
            .map(|(file, err)| self.formatter.format_fatal(&file.path, err))
            .collect();

        let summary = Summary {
            errors: fatal.len(),
            files_with_errors: fatal.len(),
            checked_files: fatal.len(),
            blocked: true,
        };
        self.push_summary(&mut lines, &summary);

        RunOutcome {
            output: join_lines(&lines),
            exit_code: EXIT_FATAL,
        }
    }

    fn report_outcome(&self, reports: &[FileReport], checked_files: usize) -> RunOutcome {
        let mut lines = Vec::new();
        let mut summary = Summary {
            checked_files,
            ..Summary::default()
        };

        for report in reports {
            lines.extend(self.formatter.format_file(&report.path, &report.diagnostics));
            let errors = report.error_count();
            summary.errors += errors;
            if errors > 0 {
                summary.files_with_errors += 1;
            }
        }
        self.push_summary(&mut lines, &summary);

        tracing::debug!(errors = summary.errors, files = checked_files, "run finished");
        RunOutcome {
            output: join_lines(&lines),
            exit_code: if summary.errors == 0 { EXIT_OK } else { EXIT_ERRORS },
        }
    }

    fn push_summary(&self, lines: &mut Vec<String>, summary: &Summary) {
        if !self.config.error_summary {
            return;
        }
        if let Some(line) = summary.render() {
            lines.push(line);
        }
    }
}

/// Check a set of files with the given options
pub fn check_files(files: &[SourceFile], config: &CheckerConfig) -> RunOutcome {
    Pipeline::new(config.clone()).run(files)
}

/// Parse and check a single source, without rendering
pub fn check_source(path: &str, source: &str) -> CheckResult<FileReport> {
    let module = frontend::parse(source)?;
    Ok(FileReport {
        path: path.to_string(),
        diagnostics: sema::check(&module),
    })
}

fn join_lines(lines: &[String]) -> String {
    let mut output = lines.join("\n");
    if !output.is_empty() {
        output.push('\n');
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn run(files: &[SourceFile]) -> RunOutcome {
        check_files(files, &CheckerConfig::default())
    }

    #[test]
    fn test_clean_file_prints_nothing() {
        let outcome = run(&[SourceFile::new("ok.py", "x: int = 1\ny = x\n")]);
        assert_eq!(outcome, RunOutcome { output: String::new(), exit_code: EXIT_OK });
    }

    #[test]
    fn test_notes_do_not_fail_the_run() {
        let outcome = run(&[SourceFile::new("r.py", "reveal_type(1)\n")]);
        assert_eq!(outcome.output, "r.py:1: note: Revealed type is \"int\"\n");
        assert_eq!(outcome.exit_code, EXIT_OK);
    }

    #[test]
    fn test_full_report() {
        let source = "\
x: int = 1
x = \"a\"

def add_one(x: int) -> int:
    return x + 1

add_one(\"s\")
reveal_type(add_one(2))
";
        let outcome = run(&[SourceFile::new("demo.py", source)]);
        assert_eq!(
            outcome.output,
            "\
demo.py:2: error: Incompatible types in assignment (expression has type \"str\", variable has type \"int\")  [assignment]
demo.py:7: error: Argument 1 to \"add_one\" has incompatible type \"str\"; expected \"int\"  [arg-type]
demo.py:8: note: Revealed type is \"int\"
Found 2 errors in 1 file (checked 1 source file)
"
        );
        assert_eq!(outcome.exit_code, EXIT_ERRORS);
    }

    #[test]
    fn test_files_are_isolated() {
        let files = [
            SourceFile::new("a.py", "x: int = 1\n"),
            SourceFile::new("b.py", "x = \"a\"\nreveal_type(x)\n"),
            SourceFile::new("c.py", "y: str = 1\n"),
        ];
        let outcome = run(&files);
        assert_eq!(
            outcome.output,
            "\
b.py:2: note: Revealed type is \"str\"
c.py:1: error: Incompatible types in assignment (expression has type \"int\", variable has type \"str\")  [assignment]
Found 1 error in 1 file (checked 3 source files)
"
        );
    }

    #[test]
    fn test_syntax_error_blocks_checking() {
        let files = [
            SourceFile::new("good.py", "x: int = \"a\"\n"),
            SourceFile::new("bad.py", "x = 1\nwhile x:\n    pass\n"),
        ];
        let outcome = run(&files);
        assert_eq!(
            outcome.output,
            "\
bad.py:2: error: unsupported syntax: 'while' statement
Found 1 error in 1 file (errors prevented further checking)
"
        );
        assert_eq!(outcome.exit_code, EXIT_FATAL);
    }

    #[test]
    fn test_indentation_error() {
        let outcome = run(&[SourceFile::new("i.py", "def f() -> None:\n        pass\n    pass\n")]);
        assert_eq!(
            outcome.output,
            "\
i.py:3: error: unindent does not match any outer indentation level
Found 1 error in 1 file (errors prevented further checking)
"
        );
    }

    #[test]
    fn test_output_options() {
        let config = CheckerConfig {
            show_error_codes: false,
            error_summary: false,
            ..CheckerConfig::default()
        };
        let outcome = Pipeline::new(config).run(&[SourceFile::new("t.py", "x: int = \"a\"\n")]);
        assert_eq!(
            outcome.output,
            "t.py:1: error: Incompatible types in assignment (expression has type \"str\", variable has type \"int\")\n"
        );
        assert_eq!(outcome.exit_code, EXIT_ERRORS);
    }

    #[test]
    fn test_repeated_runs_are_identical() {
        let files = [SourceFile::new("t.py", "a: str = 1\nreveal_type(a)\n")];
        assert_eq!(run(&files), run(&files));
    }

    #[test]
    fn test_check_source() {
        let report = check_source("t.py", "def f(x: int) -> None:\n    pass\n\nf()\n").unwrap();
        assert_eq!(report.error_count(), 1);
        assert_eq!(report.diagnostics[0].message, "Missing positional argument \"x\" in call to \"f\"");
        assert!(check_source("t.py", "x = (\n").is_err());
    }
}
