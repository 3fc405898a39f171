use std::fmt;
use std::path::Path;
use std::path::PathBuf;

use crate::TestDocument;
use crate::TestgenError;
use crate::TestgenResult;

/// Templates longer than this, or spanning lines, are never tried as paths
/// when validating.
pub const MAX_TEMPLATE_PATH_LEN: usize = 256;

/// Where a shader template was found, in resolution order.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TemplateSource {
	/// A path passed explicitly by the caller (`--shader`).
	Override(PathBuf),
	/// `shader_template` is an absolute path to an existing file.
	Absolute(PathBuf),
	/// `shader_template` is relative to the config document's directory.
	ConfigRelative(PathBuf),
	/// `shader_template` is relative to the current working directory.
	WorkingDirRelative(PathBuf),
	/// `shader_template` is the template source itself.
	Inline,
}

impl TemplateSource {
	/// The file the template was read from, unless it is inline.
	pub fn path(&self) -> Option<&Path> {
		match self {
			Self::Override(path)
			| Self::Absolute(path)
			| Self::ConfigRelative(path)
			| Self::WorkingDirRelative(path) => Some(path),
			Self::Inline => None,
		}
	}

	pub fn is_inline(&self) -> bool {
		matches!(self, Self::Inline)
	}
}

impl fmt::Display for TemplateSource {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Override(path) => write!(f, "override file {}", path.display()),
			Self::Absolute(path) | Self::ConfigRelative(path) | Self::WorkingDirRelative(path) => {
				write!(f, "file {}", path.display())
			}
			Self::Inline => f.write_str("inline code"),
		}
	}
}

/// A shader template together with where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTemplate {
	pub source: TemplateSource,
	pub text: String,
}

impl ResolvedTemplate {
	pub fn inline(text: impl Into<String>) -> Self {
		Self {
			source: TemplateSource::Inline,
			text: text.into(),
		}
	}
}

/// Build the ordered list of file candidates for a template reference.
///
/// `override_path` always comes first and is taken without probing. The
/// remaining candidates are only returned when they point at an existing
/// file. Inline text is not part of this list: it is the fallback when the
/// list is empty.
pub fn template_candidates(
	template: &str,
	config_path: &Path,
	override_path: Option<&Path>,
) -> Vec<TemplateSource> {
	let mut candidates = Vec::new();

	if let Some(path) = override_path {
		candidates.push(TemplateSource::Override(path.to_path_buf()));
	}

	let template_path = Path::new(template);
	if template_path.is_absolute() && template_path.is_file() {
		candidates.push(TemplateSource::Absolute(template_path.to_path_buf()));
	}

	let config_dir = config_path.parent().unwrap_or_else(|| Path::new(""));
	let relative = config_dir.join(template_path);
	if relative.is_file() {
		candidates.push(TemplateSource::ConfigRelative(relative));
	}

	if template_path.is_file() {
		candidates.push(TemplateSource::WorkingDirRelative(template_path.to_path_buf()));
	}

	candidates
}

/// Resolve the document's shader template.
///
/// Candidates are tried in order: the explicit override, an absolute path,
/// a path relative to the config file, a path relative to the working
/// directory, and finally the `shader_template` string itself as inline
/// source.
pub fn resolve_template(
	document: &TestDocument,
	config_path: &Path,
	override_path: Option<&Path>,
) -> TestgenResult<ResolvedTemplate> {
	let candidates = template_candidates(&document.shader_template, config_path, override_path);

	let Some(source) = candidates.into_iter().next() else {
		tracing::debug!("treating shader template as inline code");
		return Ok(ResolvedTemplate::inline(document.shader_template.clone()));
	};

	let Some(path) = source.path() else {
		return Ok(ResolvedTemplate::inline(document.shader_template.clone()));
	};

	let text = std::fs::read_to_string(path).map_err(|e| {
		TestgenError::TemplateResolution {
			path: path.display().to_string(),
			reason: e.to_string(),
		}
	})?;
	tracing::debug!(source = %source, "resolved shader template");

	Ok(ResolvedTemplate { source, text })
}

/// Whether a `shader_template` string is worth probing as a file path.
pub fn looks_like_path(template: &str) -> bool {
	let template = template.trim();
	!template.contains('\n') && template.len() < MAX_TEMPLATE_PATH_LEN
}
