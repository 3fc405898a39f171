use std::path::Path;
use std::path::PathBuf;

use crate::TestDocument;

/// Marker whose presence identifies the root of a project checkout.
pub const PROJECT_ROOT_MARKER: &str = ".git";

/// Directory used when neither the document nor the caller names one.
pub const DEFAULT_OUTPUT_DIR: &str = ".";

fn current_dir() -> PathBuf {
	std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Walk up from `start` looking for a directory containing
/// [`PROJECT_ROOT_MARKER`]. Falls back to the current working directory when
/// no marker is found before the filesystem root.
pub fn find_project_root(start: &Path) -> PathBuf {
	let start = std::fs::canonicalize(start)
		.or_else(|_| std::path::absolute(start))
		.unwrap_or_else(|_| start.to_path_buf());

	start
		.ancestors()
		// The filesystem root itself is never treated as a project root.
		.filter(|dir| dir.parent().is_some())
		.find(|dir| dir.join(PROJECT_ROOT_MARKER).exists())
		.map_or_else(current_dir, Path::to_path_buf)
}

/// Where the output directory for a run came from.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum OutputDirSource {
	/// The document's `output_dir`, joined to the discovered project root.
	Document { project_root: PathBuf },
	/// The directory supplied by the caller (`--output-dir`).
	Caller,
	/// Neither was supplied.
	Default,
}

/// The directory generated files are written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOutputDir {
	pub path: PathBuf,
	pub source: OutputDirSource,
}

/// Resolve the output directory for `document`.
///
/// Candidates in order: the document's `output_dir` relative to the project
/// root found from `config_path` (the caller's directory is ignored in that
/// case), then `caller_dir`, then [`DEFAULT_OUTPUT_DIR`].
pub fn resolve_output_dir(
	document: &TestDocument,
	config_path: &Path,
	caller_dir: Option<&Path>,
) -> ResolvedOutputDir {
	let from_document = || {
		document.output_dir.as_ref().map(|dir| {
			let project_root = find_project_root(config_path);
			ResolvedOutputDir {
				path: project_root.join(dir),
				source: OutputDirSource::Document { project_root },
			}
		})
	};
	let from_caller = || {
		caller_dir.map(|dir| {
			ResolvedOutputDir {
				path: dir.to_path_buf(),
				source: OutputDirSource::Caller,
			}
		})
	};
	let candidates: [&dyn Fn() -> Option<ResolvedOutputDir>; 2] = [&from_document, &from_caller];

	let resolved = candidates
		.iter()
		.find_map(|candidate| candidate())
		.unwrap_or_else(|| {
			ResolvedOutputDir {
				path: PathBuf::from(DEFAULT_OUTPUT_DIR),
				source: OutputDirSource::Default,
			}
		});
	tracing::debug!(path = %resolved.path.display(), source = ?resolved.source, "resolved output directory");

	resolved
}
