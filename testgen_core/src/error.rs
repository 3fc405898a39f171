use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum TestgenError {
	#[error(transparent)]
	#[diagnostic(code(testgen::io_error))]
	Io(#[from] std::io::Error),

	#[error("failed to read config file `{path}`")]
	#[diagnostic(code(testgen::config_read))]
	ConfigRead {
		path: String,
		#[source]
		source: std::io::Error,
	},

	#[error("failed to parse config file `{path}`: {reason}")]
	#[diagnostic(
		code(testgen::config_parse),
		help("check that the document has a `test_config` mapping and a `variants` mapping")
	)]
	ConfigParse { path: String, reason: String },

	#[error("config file `{path}` is missing required field `{field}`")]
	#[diagnostic(
		code(testgen::config_schema),
		help("`test_config.name` and `test_config.shader_template` are required")
	)]
	ConfigSchema { path: String, field: String },

	#[error("unsupported config file format: `{0}`")]
	#[diagnostic(
		code(testgen::unsupported_format),
		help("supported formats: yaml, yml, json, toml")
	)]
	UnsupportedFormat(String),

	#[error("failed to resolve shader template `{path}`: {reason}")]
	#[diagnostic(code(testgen::template_resolution))]
	TemplateResolution { path: String, reason: String },

	#[error("invalid output pattern `{pattern}`: {reason}")]
	#[diagnostic(
		code(testgen::output_pattern),
		help("output patterns may only use the `{{name}}` and `{{variant_name}}` placeholders")
	)]
	OutputPattern { pattern: String, reason: String },

	#[error("failed to write `{path}`")]
	#[diagnostic(code(testgen::write))]
	Write {
		path: String,
		#[source]
		source: std::io::Error,
	},

	#[error("failed to generate variant `{variant}`")]
	#[diagnostic(
		code(testgen::variant_failed),
		help("generation stops at the first failing variant; earlier files were kept")
	)]
	VariantFailed {
		variant: String,
		#[source]
		source: Box<TestgenError>,
	},
}

pub type TestgenResult<T> = Result<T, TestgenError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
