use std::path::Path;
use std::path::PathBuf;
use std::process;
use std::sync::mpsc;
use std::time::Duration;

use clap::Parser;
use owo_colors::OwoColorize;
use similar::ChangeTag;
use similar::TextDiff;
use testgen_cli::Commands;
use testgen_cli::OutputFormat;
use testgen_cli::TestgenCli;
use testgen_core::CheckStatus;
use testgen_core::GenerateOptions;
use testgen_core::TemplateLocation;
use testgen_core::TemplateSource;
use testgen_core::TestDocument;
use testgen_core::WriteStatus;
use testgen_core::check_all;
use testgen_core::effective_directives;
use testgen_core::effective_inputs;
use testgen_core::generate_all_with_options;
use testgen_core::plan_outputs;
use testgen_core::project::OutputDirSource;
use testgen_core::project::resolve_output_dir;
use testgen_core::resolve_template;
use testgen_core::validate;
use tracing_subscriber::EnvFilter;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,yellow) => {
		if color_enabled() {
			format!("{}", $text.yellow())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,bold) => {
		if color_enabled() {
			format!("{}", $text.bold())
		} else {
			format!("{}", $text)
		}
	};
}

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Arguments shared by every generation run, including watch reruns.
struct GenerateRequest {
	config: PathBuf,
	output_dir: Option<PathBuf>,
	shader: Option<PathBuf>,
	dry_run: bool,
	verbose: bool,
}

fn main() {
	let args = TestgenCli::parse();
	let verbose = args.verbose;

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	// Install miette's fancy handler for rich error diagnostics.
	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	init_tracing(verbose, use_color);

	let result = match args.command {
		Some(Commands::Generate {
			config,
			output_dir,
			shader,
			validate_only,
			dry_run,
			watch,
		}) => {
			if validate_only {
				run_validate(&config, shader.as_deref())
			} else {
				let request = GenerateRequest {
					config,
					output_dir,
					shader,
					dry_run,
					verbose,
				};
				run_generate(&request, watch)
			}
		}
		Some(Commands::Validate { config, shader }) => run_validate(&config, shader.as_deref()),
		Some(Commands::Check {
			config,
			output_dir,
			shader,
			diff,
			format,
		}) => {
			run_check(
				&config,
				output_dir.as_deref(),
				shader.as_deref(),
				diff,
				format,
			)
		}
		Some(Commands::List {
			config,
			output_dir,
			format,
		}) => run_list(&config, output_dir.as_deref(), format),
		None => {
			eprintln!("No subcommand specified. Run `testgen --help` for usage.");
			process::exit(1);
		}
	};

	if let Err(e) = result {
		// Try to render through miette for rich diagnostics with help text
		// and error codes.
		match e.downcast::<testgen_core::TestgenError>() {
			Ok(testgen_err) => {
				let report: miette::Report = (*testgen_err).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("{} {e}", colored!("error:", red));
			}
		}
		process::exit(2);
	}
}

/// Log to stderr. `RUST_LOG` takes precedence over `--verbose`.
fn init_tracing(verbose: bool, use_color: bool) {
	let default_level = if verbose { "debug" } else { "warn" };
	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(use_color)
		.with_target(false)
		.init();
}

fn run_validate(config: &Path, shader: Option<&Path>) -> CliResult<()> {
	if print_validation(config, shader).is_none() {
		println!();
		println!("{}", colored!("✗ Configuration validation failed!", red));
		process::exit(1);
	}

	println!();
	println!("{}", colored!("✓ Validation successful!", green));
	Ok(())
}

/// Validate the document at `config`, printing each step. Returns the loaded
/// document when validation succeeds.
fn print_validation(config: &Path, shader: Option<&Path>) -> Option<TestDocument> {
	println!("Validating configuration: {}", config.display());
	let report = validate(config, shader);

	match report.outcome {
		Ok(validated) => {
			let check = colored!("✓", green);
			println!("  {check} Configuration loaded successfully");
			println!("  {check} Test name: {}", validated.document.name);
			println!("  {check} Variants: {}", validated.document.variants.len());
			print_template_location(&validated.template);
			Some(validated.document)
		}
		Err(e) => {
			// The diagnostic itself goes to stderr only.
			println!("  {} Validation failed", colored!("✗", red));
			let report: miette::Report = e.into();
			eprintln!("{report:?}");
			None
		}
	}
}

fn print_template_location(location: &TemplateLocation) {
	let check = colored!("✓", green);
	let info = colored!("ℹ", yellow);

	match location {
		TemplateLocation::Found(TemplateSource::Override(path)) => {
			println!("  {check} Shader file found: {}", path.display());
		}
		TemplateLocation::Found(source) => {
			match source.path() {
				Some(path) => println!("  {check} Shader template found: {}", path.display()),
				None => println!("  {info} Shader template is inline code"),
			}
		}
		TemplateLocation::OverrideMissing(path) => {
			println!(
				"  {} Shader file not found: {}",
				colored!("⚠", yellow),
				path.display()
			);
		}
		TemplateLocation::Unresolved => {
			println!("  {info} Shader template: external file or inline code");
		}
		_ => println!("  {info} Shader template is inline code"),
	}
}

fn run_generate(request: &GenerateRequest, watch: bool) -> CliResult<()> {
	// Run the initial generation.
	let succeeded = generate_once(request)?;

	if !watch || request.dry_run {
		if !succeeded {
			process::exit(1);
		}
		return Ok(());
	}

	// Watch mode
	println!("\nWatching for file changes... (press Ctrl+C to stop)");

	let (tx, rx) = mpsc::channel();

	let mut watcher =
		notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
			if let Ok(event) = res {
				if matches!(
					event.kind,
					notify::EventKind::Modify(_) | notify::EventKind::Create(_)
				) {
					let _ = tx.send(());
				}
			}
		})?;

	use notify::Watcher;
	for dir in watch_dirs(request) {
		watcher.watch(&dir, notify::RecursiveMode::NonRecursive)?;
	}

	loop {
		rx.recv()?;
		// Debounce: drain additional events within 200ms.
		while rx.recv_timeout(Duration::from_millis(200)).is_ok() {}

		println!("\nFile change detected, regenerating...");
		if let Err(e) = generate_once(request) {
			eprintln!("{} {e}", colored!("error:", red));
		}
	}
}

/// Directories whose changes trigger a rerun: the document's directory and
/// the directory of the shader override, if any.
fn watch_dirs(request: &GenerateRequest) -> Vec<PathBuf> {
	let parent_of = |path: &Path| {
		path.parent()
			.filter(|parent| !parent.as_os_str().is_empty())
			.map_or_else(|| PathBuf::from("."), Path::to_path_buf)
	};

	let mut dirs = vec![parent_of(&request.config)];
	if let Some(shader) = &request.shader {
		let dir = parent_of(shader);
		if !dirs.contains(&dir) {
			dirs.push(dir);
		}
	}
	dirs
}

/// Validate and generate once. Returns whether every variant was generated.
fn generate_once(request: &GenerateRequest) -> CliResult<bool> {
	let Some(document) = print_validation(&request.config, request.shader.as_deref()) else {
		println!();
		println!("{}", colored!("✗ Configuration validation failed!", red));
		return Ok(false);
	};
	println!();

	let template = resolve_template(&document, &request.config, request.shader.as_deref())?;
	let output_dir = resolve_output_dir(&document, &request.config, request.output_dir.as_deref());

	if request.verbose {
		let source = match &output_dir.source {
			OutputDirSource::Document { project_root } => {
				format!("from config, project root {}", project_root.display())
			}
			OutputDirSource::Caller => "from --output-dir".to_string(),
			_ => "default".to_string(),
		};
		println!("Shader template: {}", template.source);
		println!("Output directory: {} ({source})", output_dir.path.display());
	}

	println!("Generating tests for: {}", document.name);
	let report = generate_all_with_options(
		&document,
		&template.text,
		&output_dir.path,
		GenerateOptions {
			dry_run: request.dry_run,
		},
	)?;

	for outcome in &report.outcomes {
		let file_name = outcome.path.as_deref().map_or_else(
			|| outcome.variant.clone(),
			|path| make_relative(path, &report.output_dir),
		);

		match &outcome.result {
			Ok(WriteStatus::Skipped) => {
				println!("  {} Would generate: {file_name}", colored!("ℹ", yellow));
			}
			Ok(WriteStatus::Unchanged) if request.verbose => {
				println!("  {} Generated: {file_name} (unchanged)", colored!("✓", green));
			}
			Ok(_) => println!("  {} Generated: {file_name}", colored!("✓", green)),
			Err(e) => {
				println!(
					"  {} Failed to generate {file_name}: {e}",
					colored!("✗", red)
				);
			}
		}
	}

	if let Err(e) = report.into_result() {
		let report: miette::Report = e.into();
		eprintln!("{report:?}");
		return Ok(false);
	}

	println!();
	if request.dry_run {
		println!("{}", colored!("✓ Dry run complete, nothing was written.", green));
	} else {
		println!("{}", colored!("✓ Test generation complete!", green));
	}

	Ok(true)
}

fn run_check(
	config: &Path,
	output_dir: Option<&Path>,
	shader: Option<&Path>,
	show_diff: bool,
	format: OutputFormat,
) -> CliResult<()> {
	let document = TestDocument::load(config)?;
	let template = resolve_template(&document, config, shader)?;
	let output_dir = resolve_output_dir(&document, config, output_dir);
	let report = check_all(&document, &template.text, &output_dir.path)?;

	match format {
		OutputFormat::Json => {
			let entries: Vec<serde_json::Value> = report
				.entries
				.iter()
				.map(|entry| {
					serde_json::json!({
						"variant": entry.variant,
						"path": entry.path.display().to_string(),
						"status": entry.status.label(),
					})
				})
				.collect();
			let output = serde_json::json!({
				"ok": report.is_ok(),
				"files": entries,
			});
			println!("{output}");
		}
		OutputFormat::Text if report.is_ok() => {
			println!(
				"Check passed: all {} generated file(s) are up to date.",
				report.entries.len()
			);
		}
		OutputFormat::Text => {
			eprintln!("Check failed.");

			for entry in &report.entries {
				let rel = make_relative(&entry.path, &report.output_dir);
				match &entry.status {
					CheckStatus::Missing => {
						eprintln!("  {} {rel} (variant `{}`)", colored!("missing:", red), entry.variant);
					}
					CheckStatus::Stale { current } => {
						eprintln!(
							"  {} {rel} (variant `{}`)",
							colored!("stale:", yellow),
							entry.variant
						);
						if show_diff {
							print_diff(current, &entry.expected);
						}
					}
					_ => {}
				}
			}

			eprintln!();
			eprintln!(
				"{} missing, {} stale. Run `testgen generate {}` to update.",
				report.missing().count(),
				report.stale().count(),
				config.display()
			);
		}
	}

	if !report.is_ok() {
		process::exit(1);
	}

	Ok(())
}

fn run_list(config: &Path, output_dir: Option<&Path>, format: OutputFormat) -> CliResult<()> {
	let document = TestDocument::load(config)?;
	let output_dir = resolve_output_dir(&document, config, output_dir);
	let planned = plan_outputs(&document, &output_dir.path)?;

	match format {
		OutputFormat::Json => {
			let variants: Vec<serde_json::Value> = document
				.variants
				.iter()
				.zip(&planned)
				.map(|(variant, output)| {
					serde_json::json!({
						"name": variant.name,
						"description": variant.description,
						"directives": effective_directives(&document, variant).len(),
						"inputs": effective_inputs(&document, variant).len(),
						"path": output.path.display().to_string(),
					})
				})
				.collect();
			let output = serde_json::json!({
				"name": document.name,
				"variants": variants,
			});
			println!("{output}");
		}
		OutputFormat::Text => {
			if document.variants.is_empty() {
				println!("No variants found in {}.", config.display());
				return Ok(());
			}

			println!("{}", colored!(format!("{}:", document.name), bold));
			for (variant, output) in document.variants.iter().zip(&planned) {
				println!(
					"  {} {} ({} directive(s), {} input(s))",
					variant.name,
					output.path.display(),
					effective_directives(&document, variant).len(),
					effective_inputs(&document, variant).len(),
				);
			}
			println!("\n{} variant(s)", document.variants.len());
		}
	}

	Ok(())
}

/// Print a unified diff between two strings, colorized.
fn print_diff(current: &str, expected: &str) {
	let diff = TextDiff::from_lines(current, expected);
	for change in diff.iter_all_changes() {
		match change.tag() {
			ChangeTag::Delete => {
				eprint!("  {}", colored!(format!("-{change}"), red));
			}
			ChangeTag::Insert => {
				eprint!("  {}", colored!(format!("+{change}"), green));
			}
			ChangeTag::Equal => {
				eprint!("   {change}");
			}
		}
	}
}

/// Make a path relative to root for display purposes.
fn make_relative(path: &Path, root: &Path) -> String {
	path.strip_prefix(root)
		.unwrap_or(path)
		.display()
		.to_string()
}
