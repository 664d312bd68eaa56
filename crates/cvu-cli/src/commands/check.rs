//! `cvu check` — Parse and validate definition files.

use std::path::PathBuf;

use clap::Args;

use crate::output;

/// Arguments for the `check` command.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Definition files to check.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Fail on validation warnings too.
    #[arg(long)]
    pub strict: bool,
}

/// Executes the `check` command.
///
/// Prints a source-annotated diagnostic for every file that fails to
/// parse and every validation finding for the files that do.
///
/// # Errors
///
/// Returns an error if a file cannot be read, fails to parse, or has
/// validation errors (or warnings with `--strict`).
pub fn execute(args: CheckArgs) -> anyhow::Result<()> {
    let mut failed = 0_usize;
    for path in &args.files {
        tracing::info!(path = %path.display(), "checking definitions");
        let source = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("cannot read {}: {e}", path.display()))?;

        let definitions = match cvu_lang::parse_cvu(&source) {
            Ok(definitions) => definitions,
            Err(err) => {
                println!("{}:", path.display());
                println!("{}", err.render_diagnostic(&source));
                println!();
                failed += 1;
                continue;
            }
        };

        let report = cvu_lang::validate(&definitions);
        for issue in report.iter() {
            println!("{}: {issue}", path.display());
        }
        println!(
            "{}: {} definition(s), {}",
            path.display(),
            definitions.len(),
            output::summarize(&report)
        );
        if report.has_errors() || (args.strict && !report.warnings.is_empty()) {
            failed += 1;
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {} file(s) failed", args.files.len());
    }
    Ok(())
}
