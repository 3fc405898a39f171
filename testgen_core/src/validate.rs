use std::path::Path;
use std::path::PathBuf;

use crate::TemplateSource;
use crate::TestDocument;
use crate::TestgenError;
use crate::looks_like_path;
use crate::template_candidates;

/// What template probing found during validation. None of these are errors.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TemplateLocation {
	/// The template resolves to a file.
	Found(TemplateSource),
	/// An override path was given but no file exists there.
	OverrideMissing(PathBuf),
	/// The template looks like a path but no file exists; it is either an
	/// external file that is missing or single-line inline code.
	Unresolved,
	/// The template spans several lines or is too long to be a path.
	Inline,
}

/// A document that loaded successfully, with where its template comes from.
#[derive(Debug)]
pub struct ValidatedDocument {
	pub document: TestDocument,
	pub template: TemplateLocation,
}

/// Result of validating a configuration document.
#[derive(Debug)]
pub struct ValidationReport {
	pub config_path: PathBuf,
	pub outcome: Result<ValidatedDocument, TestgenError>,
}

impl ValidationReport {
	pub fn is_ok(&self) -> bool {
		self.outcome.is_ok()
	}

	pub fn document(&self) -> Option<&TestDocument> {
		self.outcome.as_ref().ok().map(|validated| &validated.document)
	}

	pub fn error(&self) -> Option<&TestgenError> {
		self.outcome.as_ref().err()
	}
}

/// Work out where a template would be resolved from, without reading it.
pub fn locate_template(template: &str, config_path: &Path, override_path: Option<&Path>) -> TemplateLocation {
	if let Some(path) = override_path {
		return if path.is_file() {
			TemplateLocation::Found(TemplateSource::Override(path.to_path_buf()))
		} else {
			TemplateLocation::OverrideMissing(path.to_path_buf())
		};
	}

	if !looks_like_path(template) {
		return TemplateLocation::Inline;
	}

	template_candidates(template.trim(), config_path, None)
		.into_iter()
		.next()
		.map_or(TemplateLocation::Unresolved, TemplateLocation::Found)
}

/// Load the document at `config_path` and locate its shader template.
///
/// Load failures are captured in the report instead of being returned, and
/// nothing is written.
pub fn validate(config_path: &Path, override_path: Option<&Path>) -> ValidationReport {
	let outcome = TestDocument::load(config_path).map(|document| {
		let template = locate_template(&document.shader_template, config_path, override_path);
		ValidatedDocument { document, template }
	});

	if let Err(e) = &outcome {
		tracing::debug!(path = %config_path.display(), error = %e, "validation failed");
	}

	ValidationReport {
		config_path: config_path.to_path_buf(),
		outcome,
	}
}
