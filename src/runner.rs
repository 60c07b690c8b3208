use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use crate::merge::Merger;
use crate::scanner::scan_report_files;
use crate::xml;

/// Run one merge: scan the input directory, fold every parseable report
/// into a fresh tree, then write the consolidated document.
///
/// Input parsing is best effort. A file that is not well-formed XML is
/// skipped and the run continues; only failing to write the output is fatal.
pub fn run_merge(directory: &Path, output: &Path) -> anyhow::Result<()> {
    let files = scan_report_files(directory)?;
    log::info!("Found {} files under {:?}", files.len(), directory);

    let mut merger = Merger::new();
    let mut merged = 0usize;
    for path in &files {
        match read_report(path) {
            Ok(document) => {
                merger.fold_report(&document);
                merged += 1;
            }
            Err(e) => {
                log::debug!("Skipping unparseable file {:?}: {:?}", path, e);
            }
        }
    }
    log::info!("Merged {} of {} input files", merged, files.len());

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(output)?;
    xml::write_document(&merger.to_document(), BufWriter::new(file))?;
    log::info!("Wrote merged report to {:?}", output);

    Ok(())
}

fn read_report(path: &Path) -> anyhow::Result<xml::Element> {
    let bytes = fs::read(path)?;
    xml::parse_document(&bytes[..])
}
