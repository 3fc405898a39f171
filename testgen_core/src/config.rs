use std::fmt;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::OrderedMap;
use crate::TestgenError;
use crate::TestgenResult;

/// Output file name pattern used when a document does not declare one.
pub const DEFAULT_OUTPUT_PATTERN: &str = "{name}-{variant_name}.slang";

/// Base URL for issue references rendered after disabled directives.
pub const ISSUE_TRACKER_URL: &str = "https://github.com/shader-slang/slang/issues";

/// The kind of a test directive.
///
/// Parsing is permissive: any string that is not one of the known kinds
/// becomes [`DirectiveKind::Custom`], which renders the directive's flags
/// verbatim.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum DirectiveKind {
	#[default]
	Simple,
	CompareCompute,
	Interpret,
	CrossCompile,
	CompileFail,
	Custom,
}

impl DirectiveKind {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Simple => "SIMPLE",
			Self::CompareCompute => "COMPARE_COMPUTE",
			Self::Interpret => "INTERPRET",
			Self::CrossCompile => "CROSS_COMPILE",
			Self::CompileFail => "COMPILE_FAIL",
			Self::Custom => "CUSTOM",
		}
	}
}

impl From<&str> for DirectiveKind {
	fn from(value: &str) -> Self {
		match value {
			"SIMPLE" => Self::Simple,
			"COMPARE_COMPUTE" => Self::CompareCompute,
			"INTERPRET" => Self::Interpret,
			"CROSS_COMPILE" => Self::CrossCompile,
			"COMPILE_FAIL" => Self::CompileFail,
			_ => Self::Custom,
		}
	}
}

impl From<String> for DirectiveKind {
	fn from(value: String) -> Self {
		Self::from(value.as_str())
	}
}

impl fmt::Display for DirectiveKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Why a directive is disabled: either an issue number or free text.
///
/// Integers are issue numbers. Any other scalar is kept as text, so a
/// reason such as `12.5` never rejects the document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawDisabledReason")]
#[non_exhaustive]
#[allow(variant_size_differences)]
pub enum DisabledReason {
	Issue(i64),
	Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
#[allow(variant_size_differences)]
enum RawDisabledReason {
	Integer(i64),
	Float(f64),
	Bool(bool),
	Text(String),
}

impl From<RawDisabledReason> for DisabledReason {
	fn from(raw: RawDisabledReason) -> Self {
		match raw {
			RawDisabledReason::Integer(number) => Self::Issue(number),
			// Zero and `false` carry no reason, like an empty string.
			RawDisabledReason::Float(value) if value == 0.0 => Self::Text(String::new()),
			RawDisabledReason::Float(value) => Self::Text(format_float(value)),
			RawDisabledReason::Bool(value) => Self::Text(if value { "True".to_string() } else { String::new() }),
			RawDisabledReason::Text(text) => Self::Text(text),
		}
	}
}

impl DisabledReason {
	/// Returns `true` when the reason points at an issue. Text made only of
	/// ASCII digits counts, however long it is.
	pub fn is_issue(&self) -> bool {
		match self {
			Self::Issue(_) => true,
			Self::Text(text) => !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()),
		}
	}

	/// The issue number this reason refers to, when it fits an `i64`.
	pub fn issue_number(&self) -> Option<i64> {
		match self {
			Self::Issue(number) => Some(*number),
			Self::Text(text) if self.is_issue() => text.parse().ok(),
			Self::Text(_) => None,
		}
	}

	/// Returns `true` when there is nothing worth reporting.
	pub fn is_blank(&self) -> bool {
		match self {
			Self::Issue(number) => *number == 0,
			Self::Text(text) => text.is_empty(),
		}
	}
}

impl fmt::Display for DisabledReason {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Issue(number) => write!(f, "{number}"),
			Self::Text(text) => f.write_str(text),
		}
	}
}

fn default_enabled() -> bool {
	true
}

/// A single test directive, rendered as one `//TEST...` line.
///
/// ```yaml
/// - type: COMPARE_COMPUTE
///   flags: -vk -output-using-type
///   filecheck: BUF
///   enabled: false
///   disable_reason: 1234
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Directive {
	#[serde(rename = "type", alias = "kind", default)]
	pub kind: DirectiveKind,
	/// Free-form payload placed after the directive's kind marker.
	#[serde(default)]
	pub flags: String,
	/// Name of the filecheck pattern group this directive checks against.
	#[serde(rename = "filecheck", alias = "check_pattern_name", default)]
	pub check_pattern_name: Option<String>,
	#[serde(default = "default_enabled")]
	pub enabled: bool,
	#[serde(rename = "disable_reason", alias = "disabled_reason", default)]
	pub disabled_reason: Option<DisabledReason>,
}

impl Directive {
	pub fn new(kind: DirectiveKind, flags: impl Into<String>) -> Self {
		Self {
			kind,
			flags: flags.into(),
			check_pattern_name: None,
			enabled: true,
			disabled_reason: None,
		}
	}
}

/// A named resource (buffer, texture, sampler...) the shader body reads.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Input {
	pub name: String,
	#[serde(rename = "type", alias = "kind")]
	pub kind: String,
	#[serde(default)]
	pub parameters: String,
	/// Source text emitted verbatim after the input's metadata line.
	#[serde(default)]
	pub declaration: Option<String>,
}

impl Input {
	pub fn new(name: impl Into<String>, kind: impl Into<String>, parameters: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			kind: kind.into(),
			parameters: parameters.into(),
			declaration: None,
		}
	}
}

/// A scalar template variable value.
///
/// Values are substituted in their display form: `True`/`False` for
/// booleans, `None` for null, and [`format_float`] for floats.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
#[non_exhaustive]
#[allow(variant_size_differences)]
pub enum TemplateValue {
	Null,
	Bool(bool),
	Integer(i64),
	Float(f64),
	String(String),
}

impl fmt::Display for TemplateValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Null => f.write_str("None"),
			Self::Bool(true) => f.write_str("True"),
			Self::Bool(false) => f.write_str("False"),
			Self::Integer(value) => write!(f, "{value}"),
			Self::Float(value) => f.write_str(&format_float(*value)),
			Self::String(value) => f.write_str(value),
		}
	}
}

/// The shortest decimal form of `value` that round-trips.
///
/// Decimal exponents in `-4..16` use fixed notation with at least one
/// fractional digit (`1.0`, `0.0001`). Anything else uses scientific
/// notation with a signed, two-digit minimum exponent (`1e-05`, `1.5e+20`).
pub fn format_float(value: f64) -> String {
	if value.is_nan() {
		return "nan".to_string();
	}
	if value.is_infinite() {
		return if value > 0.0 { "inf" } else { "-inf" }.to_string();
	}

	// `{:e}` yields the shortest round-trip digits, e.g. `-1.25e-7`.
	let scientific = format!("{value:e}");
	let (mantissa, exponent) = scientific
		.split_once('e')
		.unwrap_or((scientific.as_str(), "0"));
	let exponent: i32 = exponent.parse().unwrap_or(0);
	let (sign, mantissa) = match mantissa.strip_prefix('-') {
		Some(rest) => ("-", rest),
		None => ("", mantissa),
	};
	let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();

	if !(-4..16).contains(&exponent) {
		let (lead, rest) = digits.split_at(1);
		let fraction = if rest.is_empty() {
			String::new()
		} else {
			format!(".{rest}")
		};
		let exponent_sign = if exponent < 0 { '-' } else { '+' };
		return format!(
			"{sign}{lead}{fraction}e{exponent_sign}{:02}",
			exponent.unsigned_abs()
		);
	}

	if exponent < 0 {
		let zeros = "0".repeat((-exponent - 1) as usize);
		return format!("{sign}0.{zeros}{digits}");
	}

	let integer_len = exponent as usize + 1;
	if digits.len() > integer_len {
		let (integer, fraction) = digits.split_at(integer_len);
		format!("{sign}{integer}.{fraction}")
	} else {
		let padding = "0".repeat(integer_len - digits.len());
		format!("{sign}{digits}{padding}.0")
	}
}

impl From<&str> for TemplateValue {
	fn from(value: &str) -> Self {
		Self::String(value.to_string())
	}
}

impl From<i64> for TemplateValue {
	fn from(value: i64) -> Self {
		Self::Integer(value)
	}
}

/// One named set of overrides producing exactly one generated file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Variant {
	/// Taken from the variant's key in the `variants` mapping.
	#[serde(skip)]
	pub name: String,
	#[serde(default)]
	pub description: String,
	/// Replaces the document's default directives when non-empty.
	#[serde(default)]
	pub directives: Vec<Directive>,
	/// Appended after the document's global inputs.
	#[serde(default)]
	pub inputs: Vec<Input>,
	#[serde(default)]
	pub template_vars: OrderedMap<TemplateValue>,
	/// Replaces the document's shader template for this variant.
	#[serde(default)]
	pub shader_code: Option<String>,
	#[serde(default)]
	pub additional_header: Option<String>,
	#[serde(default)]
	pub filecheck_patterns: OrderedMap<Vec<String>>,
}

impl Variant {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			..Self::default()
		}
	}

	/// The variant's own shader body, if it declares a non-empty one.
	pub fn shader_override(&self) -> Option<&str> {
		self.shader_code.as_deref().filter(|code| !code.is_empty())
	}
}

/// A configuration document describing one test family and its variants.
///
/// ```yaml
/// test_config:
///   name: texture-sample
///   shader_template: texture-sample.slang
///   default_directives:
///     - type: SIMPLE
///       flags: -target spirv
/// variants:
///   float:
///     template_vars:
///       TYPE: float
///   int:
///     template_vars:
///       TYPE: int
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TestDocument {
	pub name: String,
	pub description: String,
	/// A path to the shader template or the literal template source.
	pub shader_template: String,
	pub output_pattern: String,
	/// Output directory relative to the project root. Takes precedence over
	/// any directory supplied by the caller.
	pub output_dir: Option<PathBuf>,
	pub generation_comment: Option<String>,
	pub global_inputs: Vec<Input>,
	pub global_template_vars: OrderedMap<TemplateValue>,
	pub default_filecheck_patterns: OrderedMap<Vec<String>>,
	pub default_directives: Vec<Directive>,
	/// Variants in declaration order, which is also generation order.
	pub variants: Vec<Variant>,
}

#[derive(Debug, Deserialize)]
struct RawDocument {
	test_config: Option<RawTestConfig>,
	variants: Option<OrderedMap<Variant>>,
}

#[derive(Debug, Deserialize)]
struct RawTestConfig {
	name: Option<String>,
	description: Option<String>,
	shader_template: Option<String>,
	output_pattern: Option<String>,
	output_dir: Option<PathBuf>,
	generation_comment: Option<String>,
	global_inputs: Option<Vec<Input>>,
	global_template_vars: Option<OrderedMap<TemplateValue>>,
	default_filecheck_patterns: Option<OrderedMap<Vec<String>>>,
	default_directives: Option<Vec<Directive>>,
}

/// On-disk formats a configuration document can be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
	Yaml,
	Json,
	Toml,
}

impl DocumentFormat {
	/// Pick the format from a document's file extension. Files without an
	/// extension are read as YAML.
	pub fn from_path(path: &Path) -> TestgenResult<Self> {
		let extension = path
			.extension()
			.and_then(|e| e.to_str())
			.unwrap_or("")
			.to_ascii_lowercase();

		match extension.as_str() {
			"" | "yaml" | "yml" => Ok(Self::Yaml),
			"json" => Ok(Self::Json),
			"toml" => Ok(Self::Toml),
			other => Err(TestgenError::UnsupportedFormat(other.to_string())),
		}
	}
}

impl TestDocument {
	/// Read and parse the document at `path`.
	pub fn load(path: &Path) -> TestgenResult<TestDocument> {
		let format = DocumentFormat::from_path(path)?;
		let content = std::fs::read_to_string(path).map_err(|source| {
			TestgenError::ConfigRead {
				path: path.display().to_string(),
				source,
			}
		})?;

		let document = Self::parse(&content, format, &path.display().to_string())?;
		tracing::debug!(
			path = %path.display(),
			name = %document.name,
			variants = document.variants.len(),
			"loaded config document"
		);

		Ok(document)
	}

	/// Parse document `content` written in `format`. `path_display` is only
	/// used in error messages.
	pub fn parse(
		content: &str,
		format: DocumentFormat,
		path_display: &str,
	) -> TestgenResult<TestDocument> {
		let parse_error = |reason: String| {
			TestgenError::ConfigParse {
				path: path_display.to_string(),
				reason,
			}
		};

		let raw: RawDocument = match format {
			DocumentFormat::Yaml => {
				serde_yaml_ng::from_str(content).map_err(|e| parse_error(e.to_string()))?
			}
			DocumentFormat::Json => {
				serde_json::from_str(content).map_err(|e| parse_error(e.to_string()))?
			}
			DocumentFormat::Toml => toml::from_str(content).map_err(|e| parse_error(e.to_string()))?,
		};

		Self::from_raw(raw, path_display)
	}

	fn from_raw(raw: RawDocument, path_display: &str) -> TestgenResult<TestDocument> {
		let missing = |field: &str| {
			TestgenError::ConfigSchema {
				path: path_display.to_string(),
				field: field.to_string(),
			}
		};

		let config = raw.test_config.ok_or_else(|| missing("test_config"))?;
		let name = config.name.ok_or_else(|| missing("test_config.name"))?;
		let shader_template = config
			.shader_template
			.ok_or_else(|| missing("test_config.shader_template"))?;

		let variants = raw
			.variants
			.unwrap_or_default()
			.into_iter()
			.map(|(name, mut variant)| {
				variant.name = name;
				variant
			})
			.collect();

		Ok(TestDocument {
			name,
			description: config.description.unwrap_or_default(),
			shader_template,
			output_pattern: config
				.output_pattern
				.unwrap_or_else(|| DEFAULT_OUTPUT_PATTERN.to_string()),
			output_dir: config.output_dir,
			generation_comment: config.generation_comment,
			global_inputs: config.global_inputs.unwrap_or_default(),
			global_template_vars: config.global_template_vars.unwrap_or_default(),
			default_filecheck_patterns: config.default_filecheck_patterns.unwrap_or_default(),
			default_directives: config.default_directives.unwrap_or_default(),
			variants,
		})
	}

	/// Look up a variant by name.
	pub fn variant(&self, name: &str) -> Option<&Variant> {
		self.variants.iter().find(|variant| variant.name == name)
	}

	/// The generation banner comment, if the document sets a non-empty one.
	pub fn banner_comment(&self) -> Option<&str> {
		self.generation_comment
			.as_deref()
			.filter(|comment| !comment.is_empty())
	}
}
