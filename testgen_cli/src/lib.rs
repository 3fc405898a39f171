use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Generate shader test files from a configuration document.",
	long_about = "testgen expands one configuration document into a family of Slang test \
	              files.\n\nThe document declares a shader template plus named variants. Each \
	              variant overrides directives, inputs, template variables and filecheck \
	              patterns, and produces exactly one generated file.\n\nQuick start:\n  testgen \
	              validate tests.yaml   Check the document without writing\n  testgen generate \
	              tests.yaml   Write one file per variant\n  testgen check tests.yaml      Verify \
	              generated files are up to date\n  testgen list tests.yaml       Show variants \
	              and their output paths"
)]
pub struct TestgenCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Enable verbose output and debug-level logging.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Generate one test file per variant.
	///
	/// The document is validated first. Variants are generated in the order
	/// they are declared and generation stops at the first variant that
	/// fails; files written before the failure are kept.
	Generate {
		/// Path to the configuration document (YAML, JSON or TOML).
		config: PathBuf,

		/// Directory to write generated files into. Ignored when the
		/// document sets `output_dir`.
		#[arg(long, short)]
		output_dir: Option<PathBuf>,

		/// Shader template file to use instead of the document's
		/// `shader_template`.
		#[arg(long, short)]
		shader: Option<PathBuf>,

		/// Validate the document and exit without generating anything.
		#[arg(long, default_value_t = false)]
		validate_only: bool,

		/// Render every variant and print the paths that would be written,
		/// without touching the filesystem.
		#[arg(long, default_value_t = false)]
		dry_run: bool,

		/// Watch the document's directory and regenerate on changes.
		#[arg(long, default_value_t = false)]
		watch: bool,
	},
	/// Validate a configuration document without writing any files.
	///
	/// Loads the document, reports the test name and variant count, and
	/// reports where the shader template would be read from.
	Validate {
		/// Path to the configuration document.
		config: PathBuf,

		/// Shader template file to use instead of the document's
		/// `shader_template`.
		#[arg(long, short)]
		shader: Option<PathBuf>,
	},
	/// Check that generated files match what the document renders.
	///
	/// Exits with a non-zero status code when any file is missing or out of
	/// date. Use `--diff` to see what changed.
	Check {
		/// Path to the configuration document.
		config: PathBuf,

		/// Directory the files were generated into.
		#[arg(long, short)]
		output_dir: Option<PathBuf>,

		/// Shader template file to use instead of the document's
		/// `shader_template`.
		#[arg(long, short)]
		shader: Option<PathBuf>,

		/// Show a diff for each stale file between its current and expected
		/// content.
		#[arg(long, default_value_t = false)]
		diff: bool,

		/// Output format for check results.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
	/// List the variants of a document with their output paths.
	List {
		/// Path to the configuration document.
		config: PathBuf,

		/// Directory the files would be generated into.
		#[arg(long, short)]
		output_dir: Option<PathBuf>,

		/// Output format for the listing.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text output with colors and formatting.
	Text,
	/// JSON output for programmatic consumption.
	Json,
}
