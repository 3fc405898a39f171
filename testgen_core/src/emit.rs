use std::io::ErrorKind;
use std::path::Path;
use std::path::PathBuf;

use crate::TestDocument;
use crate::TestgenError;
use crate::TestgenResult;
use crate::Variant;
use crate::render;

/// Expand an output file name pattern.
///
/// `{name}` and `{variant_name}` are replaced; `{{` and `}}` produce literal
/// braces. Any other placeholder, or an unbalanced brace, is an error.
pub fn format_output_pattern(pattern: &str, name: &str, variant_name: &str) -> TestgenResult<String> {
	let error = |reason: String| {
		TestgenError::OutputPattern {
			pattern: pattern.to_string(),
			reason,
		}
	};

	let mut result = String::with_capacity(pattern.len() + name.len() + variant_name.len());
	let mut chars = pattern.chars().peekable();

	while let Some(ch) = chars.next() {
		match ch {
			'{' if chars.peek() == Some(&'{') => {
				chars.next();
				result.push('{');
			}
			'{' => {
				let mut key = String::new();
				loop {
					match chars.next() {
						Some('}') => break,
						Some(c) => key.push(c),
						None => return Err(error("unclosed `{` in placeholder".to_string())),
					}
				}

				match key.as_str() {
					"name" => result.push_str(name),
					"variant_name" => result.push_str(variant_name),
					other => return Err(error(format!("unknown placeholder `{{{other}}}`"))),
				}
			}
			'}' if chars.peek() == Some(&'}') => {
				chars.next();
				result.push('}');
			}
			'}' => return Err(error("single `}` encountered".to_string())),
			c => result.push(c),
		}
	}

	Ok(result)
}

/// The file name generated for `variant`.
pub fn output_file_name(document: &TestDocument, variant: &Variant) -> TestgenResult<String> {
	format_output_pattern(&document.output_pattern, &document.name, &variant.name)
}

/// A variant paired with the path its file is generated at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedOutput {
	pub variant: String,
	pub path: PathBuf,
}

/// Compute the output path of every variant, in declaration order.
pub fn plan_outputs(document: &TestDocument, output_dir: &Path) -> TestgenResult<Vec<PlannedOutput>> {
	document
		.variants
		.iter()
		.map(|variant| {
			Ok(PlannedOutput {
				variant: variant.name.clone(),
				path: output_dir.join(output_file_name(document, variant)?),
			})
		})
		.collect()
}

/// What happened to one generated file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStatus {
	/// The file did not exist before.
	Created,
	/// The file existed with different content.
	Updated,
	/// The file already held the rendered content and was not touched.
	Unchanged,
	/// Dry run: the file would have been written.
	Skipped,
}

/// The outcome of generating one variant.
#[derive(Debug)]
pub struct VariantOutcome {
	pub variant: String,
	/// `None` when the output path itself could not be computed.
	pub path: Option<PathBuf>,
	pub result: TestgenResult<WriteStatus>,
}

impl VariantOutcome {
	pub fn is_ok(&self) -> bool {
		self.result.is_ok()
	}
}

/// Per-variant outcomes of a generation run, in generation order.
///
/// Generation stops at the first failing variant, so a failed report ends
/// with exactly one failed outcome.
#[derive(Debug)]
pub struct GenerationReport {
	pub output_dir: PathBuf,
	pub outcomes: Vec<VariantOutcome>,
}

impl GenerationReport {
	/// Returns true if every variant was generated.
	pub fn is_ok(&self) -> bool {
		self.outcomes.iter().all(VariantOutcome::is_ok)
	}

	/// The outcome that stopped the run, if any.
	pub fn failure(&self) -> Option<&VariantOutcome> {
		self.outcomes.iter().find(|outcome| !outcome.is_ok())
	}

	/// Number of variants whose file was created or updated.
	pub fn written_count(&self) -> usize {
		self.outcomes
			.iter()
			.filter(|outcome| {
				matches!(
					outcome.result,
					Ok(WriteStatus::Created | WriteStatus::Updated)
				)
			})
			.count()
	}

	/// Convert the report into the written paths, or the first failure
	/// wrapped with its variant name.
	pub fn into_result(self) -> TestgenResult<Vec<PathBuf>> {
		let mut paths = Vec::with_capacity(self.outcomes.len());
		for outcome in self.outcomes {
			match outcome.result {
				Ok(_) => paths.extend(outcome.path),
				Err(source) => {
					return Err(TestgenError::VariantFailed {
						variant: outcome.variant,
						source: Box::new(source),
					});
				}
			}
		}
		Ok(paths)
	}
}

/// Options for [`generate_all_with_options`].
#[derive(Debug, Clone, Copy, Default)]
pub struct GenerateOptions {
	/// Render every variant but write nothing.
	pub dry_run: bool,
}

/// Render and write every variant of `document` into `output_dir`.
///
/// `template` is the document's resolved shader template. The output
/// directory is created when missing. A variant failure is recorded and
/// stops the run; files written for earlier variants stay on disk.
pub fn generate_all(
	document: &TestDocument,
	template: &str,
	output_dir: &Path,
) -> TestgenResult<GenerationReport> {
	generate_all_with_options(document, template, output_dir, GenerateOptions::default())
}

pub fn generate_all_with_options(
	document: &TestDocument,
	template: &str,
	output_dir: &Path,
	options: GenerateOptions,
) -> TestgenResult<GenerationReport> {
	tracing::info!(name = %document.name, output_dir = %output_dir.display(), "generating tests");

	if !options.dry_run {
		create_dir(output_dir)?;
	}

	let mut outcomes = Vec::with_capacity(document.variants.len());
	for variant in &document.variants {
		let outcome = generate_variant(document, variant, template, output_dir, options);

		match &outcome.result {
			Ok(status) => {
				tracing::info!(variant = %variant.name, status = ?status, "generated variant");
				outcomes.push(outcome);
			}
			Err(e) => {
				tracing::error!(variant = %variant.name, error = %e, "failed to generate variant");
				outcomes.push(outcome);
				break;
			}
		}
	}

	Ok(GenerationReport {
		output_dir: output_dir.to_path_buf(),
		outcomes,
	})
}

fn generate_variant(
	document: &TestDocument,
	variant: &Variant,
	template: &str,
	output_dir: &Path,
	options: GenerateOptions,
) -> VariantOutcome {
	let path = match output_file_name(document, variant) {
		Ok(file_name) => output_dir.join(file_name),
		Err(e) => {
			return VariantOutcome {
				variant: variant.name.clone(),
				path: None,
				result: Err(e),
			};
		}
	};

	let content = render(document, variant, template);
	let result = if options.dry_run {
		Ok(WriteStatus::Skipped)
	} else {
		write_if_changed(&path, &content)
	};

	VariantOutcome {
		variant: variant.name.clone(),
		path: Some(path),
		result,
	}
}

/// Create `dir` and its parents. Succeeds when it already exists.
fn create_dir(dir: &Path) -> TestgenResult<()> {
	std::fs::create_dir_all(dir).map_err(|source| {
		TestgenError::Write {
			path: dir.display().to_string(),
			source,
		}
	})
}

/// Write `content` to `path` unless the file already holds it.
fn write_if_changed(path: &Path, content: &str) -> TestgenResult<WriteStatus> {
	// Compared as bytes so an existing non-UTF-8 file counts as an update.
	let status = match std::fs::read(path) {
		Ok(existing) if existing == content.as_bytes() => return Ok(WriteStatus::Unchanged),
		Ok(_) => WriteStatus::Updated,
		Err(e) if e.kind() == ErrorKind::NotFound => WriteStatus::Created,
		Err(_) => WriteStatus::Updated,
	};

	if let Some(parent) = path.parent() {
		create_dir(parent)?;
	}

	std::fs::write(path, content).map_err(|source| {
		TestgenError::Write {
			path: path.display().to_string(),
			source,
		}
	})?;
	tracing::debug!(path = %path.display(), status = ?status, "wrote generated file");

	Ok(status)
}

/// State of a generated file on disk compared with what the document renders.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CheckStatus {
	UpToDate,
	Missing,
	/// The file exists with different content.
	Stale { current: String },
}

impl CheckStatus {
	pub fn label(&self) -> &'static str {
		match self {
			Self::UpToDate => "up_to_date",
			Self::Missing => "missing",
			Self::Stale { .. } => "stale",
		}
	}
}

/// The check result for one variant.
#[derive(Debug, Clone)]
pub struct CheckEntry {
	pub variant: String,
	pub path: PathBuf,
	/// What the current document renders for this variant.
	pub expected: String,
	pub status: CheckStatus,
}

/// Result of checking every variant against the files on disk.
#[derive(Debug, Clone)]
pub struct CheckReport {
	pub output_dir: PathBuf,
	pub entries: Vec<CheckEntry>,
}

impl CheckReport {
	/// Returns true if every generated file is up to date.
	pub fn is_ok(&self) -> bool {
		self.entries
			.iter()
			.all(|entry| entry.status == CheckStatus::UpToDate)
	}

	pub fn stale(&self) -> impl Iterator<Item = &CheckEntry> {
		self.entries
			.iter()
			.filter(|entry| matches!(entry.status, CheckStatus::Stale { .. }))
	}

	pub fn missing(&self) -> impl Iterator<Item = &CheckEntry> {
		self.entries
			.iter()
			.filter(|entry| entry.status == CheckStatus::Missing)
	}
}

/// Render every variant and compare it with the file already generated in
/// `output_dir`. Never writes.
pub fn check_all(
	document: &TestDocument,
	template: &str,
	output_dir: &Path,
) -> TestgenResult<CheckReport> {
	let mut entries = Vec::with_capacity(document.variants.len());

	for (variant, planned) in document
		.variants
		.iter()
		.zip(plan_outputs(document, output_dir)?)
	{
		let expected = render(document, variant, template);
		let status = match std::fs::read(&planned.path) {
			Ok(current) if current == expected.as_bytes() => CheckStatus::UpToDate,
			Ok(current) => {
				CheckStatus::Stale {
					current: String::from_utf8_lossy(&current).into_owned(),
				}
			}
			Err(e) if e.kind() == ErrorKind::NotFound => CheckStatus::Missing,
			Err(e) => return Err(e.into()),
		};

		entries.push(CheckEntry {
			variant: planned.variant,
			path: planned.path,
			expected,
			status,
		});
	}

	Ok(CheckReport {
		output_dir: output_dir.to_path_buf(),
		entries,
	})
}
