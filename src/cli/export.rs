use std::path::{Path, PathBuf};

use crate::cli::{run_pipeline, RunArgs};
use crate::error::Result;
use crate::settings::shellexpand_path;

pub const WORKBOOK_NAME: &str = "costscan-results.xlsx";
pub const REPORT_NAME: &str = "costscan-report.pdf";

fn write_file(bytes: &[u8], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes)?;
    println!("Wrote {}", path.display());
    Ok(())
}

/// Run the analysis and write whichever outputs this build supports.
/// Both buffers are rendered before anything touches the disk.
pub fn run(file: &str, run: &RunArgs, output_dir: Option<String>) -> Result<()> {
    let (settings, report) = run_pipeline(file, run)?;
    let dir = PathBuf::from(shellexpand_path(
        output_dir.as_deref().unwrap_or(&settings.output_dir),
    ));

    let mut outputs: Vec<(PathBuf, Vec<u8>)> = Vec::new();
    #[cfg(feature = "xlsx")]
    outputs.push((dir.join(WORKBOOK_NAME), crate::spreadsheet::render_workbook(&report)?));
    #[cfg(feature = "pdf")]
    outputs.push((dir.join(REPORT_NAME), crate::pdf::render_summary(&report)?));

    if outputs.is_empty() {
        return Err(crate::error::CostscanError::Other(
            "this build has neither the `xlsx` nor the `pdf` feature".to_string(),
        ));
    }
    for (path, bytes) in &outputs {
        write_file(bytes, path)?;
    }
    tracing::info!(dir = %dir.display(), files = outputs.len(), "export complete");
    Ok(())
}
