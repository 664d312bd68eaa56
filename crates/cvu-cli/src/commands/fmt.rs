//! `cvu fmt` — Rewrite definition files in canonical form.

use std::path::PathBuf;

use clap::Args;
use cvu_common::config::CvuConfig;
use cvu_lang::CvuFormatter;

/// Arguments for the `fmt` command.
#[derive(Args, Debug)]
pub struct FmtArgs {
    /// Definition files to format.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Write the result back instead of printing it.
    #[arg(short, long, conflicts_with = "check")]
    pub write: bool,

    /// Only report files that are not in canonical form.
    #[arg(long)]
    pub check: bool,
}

/// Executes the `fmt` command.
///
/// # Errors
///
/// Returns an error if a file cannot be read, parsed or written, or with
/// `--check` if any file would change.
pub fn execute(args: FmtArgs, config: &CvuConfig) -> anyhow::Result<()> {
    let formatter = CvuFormatter::new(config.indent.clone());
    let mut unformatted = Vec::new();

    for path in &args.files {
        let source = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("cannot read {}: {e}", path.display()))?;
        let definitions = cvu_lang::parse_cvu(&source).map_err(|e| {
            anyhow::anyhow!("{}:\n{}", path.display(), e.render_diagnostic(&source))
        })?;
        let formatted = formatter.format(&definitions);

        if args.check {
            if formatted != source {
                println!("{}", path.display());
                unformatted.push(path);
            }
        } else if args.write {
            if formatted == source {
                tracing::debug!(path = %path.display(), "already formatted");
            } else {
                std::fs::write(path, &formatted)?;
                tracing::info!(path = %path.display(), "formatted");
            }
        } else {
            print!("{formatted}");
        }
    }

    if !unformatted.is_empty() {
        anyhow::bail!("{} file(s) are not formatted", unformatted.len());
    }
    Ok(())
}
