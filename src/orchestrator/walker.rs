//! Corpus walker: every regular file under a root, parsed into one corpus.

use crate::engine::SampleParser;
use crate::error::CollectionError;
use crate::model::{FileOrder, RunSamples, SampleCorpus};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Parse every regular file below `root` with `parser`.
///
/// Files are not filtered by name; `root` is expected to hold one log kind
/// only. The first unreadable or malformed file aborts the whole collection.
pub fn collect<P: SampleParser>(
    root: &Path,
    parser: &P,
    order: FileOrder,
) -> Result<SampleCorpus<P::Sample>, CollectionError> {
    let files = list_files(root, order)?;
    let mut corpus = SampleCorpus::default();

    for path in files {
        // The file handle is closed before parsing starts.
        let text = std::fs::read_to_string(&path).map_err(|source| CollectionError::Read {
            path: path.clone(),
            source,
        })?;
        let samples = parser
            .parse(&text)
            .map_err(|e| CollectionError::Parse {
                path: path.clone(),
                source: Box::new(e),
            })?;
        debug!(path = %path.display(), samples = samples.len(), "parsed file");
        corpus.runs.push(RunSamples {
            source: path,
            samples,
        });
    }

    if corpus.is_empty() {
        warn!(root = %root.display(), "no samples found");
    }
    info!(
        root = %root.display(),
        files = corpus.runs.len(),
        samples = corpus.sample_count(),
        "collected corpus"
    );
    Ok(corpus)
}

/// Regular files below `root`, arranged according to `order`.
pub fn list_files(root: &Path, order: FileOrder) -> Result<Vec<PathBuf>, CollectionError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|source| CollectionError::Walk {
            root: root.to_path_buf(),
            source,
        })?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }

    match order {
        FileOrder::Walk => {}
        FileOrder::Name => files.sort(),
        FileOrder::Modified => {
            let mut stamped = files
                .into_iter()
                .map(|path| Ok((modified(&path)?, path)))
                .collect::<Result<Vec<(SystemTime, PathBuf)>, CollectionError>>()?;
            stamped.sort();
            files = stamped.into_iter().map(|(_, path)| path).collect();
        }
    }
    Ok(files)
}

fn modified(path: &Path) -> Result<SystemTime, CollectionError> {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .map_err(|source| CollectionError::Read {
            path: path.to_path_buf(),
            source,
        })
}
