//! Export command implementation

use std::path::Path;

use anyhow::{Context, Result};
use tally_core::{Database, ExportFormat, TransactionExportOptions};

pub fn cmd_export(
    db: &Database,
    format: &str,
    output: Option<&Path>,
    from: Option<&str>,
    to: Option<&str>,
) -> Result<()> {
    let format: ExportFormat = format.parse()?;

    let opts = TransactionExportOptions {
        from: from.map(super::parse_date).transpose()?,
        to: to.map(super::parse_date).transpose()?,
    };
    if let (Some(from), Some(to)) = (opts.from, opts.to) {
        anyhow::ensure!(from <= to, "--from {} is after --to {}", from, to);
    }

    let content = db.export(format, &opts)?;

    match output {
        Some(path) => {
            std::fs::write(path, &content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("✅ Exported to {}", path.display());
        }
        None => print!("{}", content),
    }

    Ok(())
}
