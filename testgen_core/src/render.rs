use crate::Directive;
use crate::DirectiveKind;
use crate::EffectiveVariant;
use crate::ISSUE_TRACKER_URL;
use crate::Input;
use crate::OrderedMap;
use crate::TemplateValue;
use crate::TestDocument;
use crate::Variant;

/// First line of the banner emitted when a document sets a
/// `generation_comment`.
pub const GENERATED_BANNER: &str = "// THIS IS A GENERATED FILE. DO NOT EDIT!";

/// Marker of an input metadata line. A shader body containing it already
/// declares its own inputs.
pub const INPUT_MARKER: &str = "//TEST_INPUT:";

/// Prefix inserted after `//` in the line of a disabled directive.
pub const DISABLED_PREFIX: &str = "DISABLE_";

/// Render the full text of the file generated for `variant`.
///
/// `template` is the document's resolved shader template. Rendering is
/// deterministic and performs no I/O.
pub fn render(document: &TestDocument, variant: &Variant, template: &str) -> String {
	render_effective(&EffectiveVariant::new(document, variant, template))
}

/// Render an already merged variant.
pub fn render_effective(effective: &EffectiveVariant<'_>) -> String {
	let header = render_header(effective);
	let body = substitute_template_vars(effective.shader_body, &effective.template_vars);
	let filecheck = render_filecheck_block(&effective.filecheck_patterns);

	let mut content = String::with_capacity(header.len() + body.len() + filecheck.len() + 2);
	content.push_str(&header);
	content.push_str(&body);

	if !filecheck.is_empty() {
		content.push_str("\n\n");
		content.push_str(&filecheck);
	}

	strip_trailing_whitespace(&content)
}

/// The metadata header: banner, description, directives, inputs and the
/// variant's additional header. Lines are joined with `\n`, so the header
/// ends with a newline and the shader body starts on the next line.
fn render_header(effective: &EffectiveVariant<'_>) -> String {
	let document = effective.document;
	let variant = effective.variant;
	let mut lines: Vec<String> = Vec::new();

	if let Some(comment) = document.banner_comment() {
		lines.push(GENERATED_BANNER.to_string());
		lines.push(format!("// {comment}"));
		lines.push("//".to_string());
	}

	lines.push(format!("// Test: {} - {}", document.name, variant.name));
	if !variant.description.is_empty() {
		lines.push(format!("// {}", variant.description));
	}
	lines.push("//".to_string());

	for directive in effective.directives {
		lines.push(directive_line(directive));
		if let Some(comment) = disabled_comment(directive) {
			lines.push(comment);
		}
	}
	lines.push(String::new());

	if !declares_inputs(effective.shader_body) {
		for input in &effective.inputs {
			lines.push(input_line(input));
			if let Some(declaration) = input.declaration.as_deref().filter(|d| !d.is_empty()) {
				lines.push(declaration.to_string());
			}
		}

		if !effective.inputs.is_empty() {
			lines.push(String::new());
		}
	}

	if let Some(additional) = variant
		.additional_header
		.as_deref()
		.filter(|header| !header.is_empty())
	{
		lines.push(additional.to_string());
		lines.push(String::new());
	}

	lines.join("\n")
}

/// Render one directive as its `//TEST...` metadata line.
pub fn directive_line(directive: &Directive) -> String {
	let prefix = if directive.enabled {
		""
	} else {
		DISABLED_PREFIX
	};
	let flags = &directive.flags;
	let annotation = |key: &str| {
		directive
			.check_pattern_name
			.as_deref()
			.filter(|name| !name.is_empty())
			.map(|name| format!("({key}={name})"))
			.unwrap_or_default()
	};

	match directive.kind {
		DirectiveKind::Simple => {
			format!("//{prefix}TEST:SIMPLE{}: {flags}", annotation("filecheck"))
		}
		DirectiveKind::CompareCompute => {
			format!(
				"//{prefix}TEST(compute):COMPARE_COMPUTE{}: {flags}",
				annotation("filecheck-buffer")
			)
		}
		DirectiveKind::Interpret => {
			format!("//{prefix}TEST:INTERPRET{}: {flags}", annotation("filecheck"))
		}
		DirectiveKind::CompileFail => format!("//{prefix}TEST:COMPILE_FAIL: {flags}"),
		DirectiveKind::CrossCompile => format!("//{prefix}TEST:CROSS_COMPILE: {flags}"),
		DirectiveKind::Custom => format!("//{prefix}{flags}"),
	}
}

/// The comment explaining why a directive is disabled, if it is disabled
/// and carries a reason.
pub fn disabled_comment(directive: &Directive) -> Option<String> {
	if directive.enabled {
		return None;
	}

	let reason = directive
		.disabled_reason
		.as_ref()
		.filter(|reason| !reason.is_blank())?;

	let comment = if reason.is_issue() {
		format!("// Test disabled, see {ISSUE_TRACKER_URL}/{reason}")
	} else {
		format!("// Test disabled: {reason}")
	};

	Some(comment)
}

/// Render one input as its `//TEST_INPUT:` metadata line.
pub fn input_line(input: &Input) -> String {
	format!(
		"{INPUT_MARKER} {}({}):name {}",
		input.kind, input.parameters, input.name
	)
}

/// Whether a shader body already carries its own input metadata.
pub fn declares_inputs(shader_body: &str) -> bool {
	shader_body.contains(INPUT_MARKER)
}

/// The placeholder token for a template variable: `{{KEY}}`.
pub fn placeholder(key: &str) -> String {
	format!("{{{{{key}}}}}")
}

/// Replace every `{{KEY}}` placeholder whose key is in `vars` with the
/// value's string form.
///
/// The text is scanned once. Substituted values are never scanned again, so
/// a value containing another placeholder is emitted as-is. Placeholders
/// with unknown keys are left untouched.
pub fn substitute_template_vars(text: &str, vars: &OrderedMap<TemplateValue>) -> String {
	if vars.is_empty() {
		return text.to_string();
	}

	let mut result = String::with_capacity(text.len());
	let mut rest = text;

	while let Some(start) = rest.find("{{") {
		result.push_str(&rest[..start]);
		let after_open = &rest[start + 2..];

		let replacement = after_open.find("}}").and_then(|end| {
			let key = &after_open[..end];
			vars.get(key).map(|value| (value, end))
		});

		if let Some((value, end)) = replacement {
			result.push_str(&value.to_string());
			rest = &after_open[end + 2..];
		} else {
			// Advance a single brace so `{{{KEY}}}` still matches `{{KEY}}`.
			result.push('{');
			rest = &rest[start + 1..];
		}
	}

	result.push_str(rest);
	result
}

/// Render the trailing filecheck block. Returns an empty string when there
/// is nothing to emit.
pub fn render_filecheck_block(patterns: &OrderedMap<Vec<String>>) -> String {
	if patterns.is_empty() {
		return String::new();
	}

	let mut lines = Vec::new();
	for (group, group_patterns) in patterns.iter() {
		for pattern in group_patterns {
			// A `:` means the pattern already names its own check directive.
			if pattern.contains(':') {
				lines.push(format!("// {pattern}"));
			} else {
				lines.push(format!("// {group}: {pattern}"));
			}
		}
		lines.push(String::new());
	}

	lines.join("\n")
}

/// Remove trailing whitespace from every line, keeping line breaks.
pub fn strip_trailing_whitespace(text: &str) -> String {
	text.split('\n')
		.map(str::trim_end)
		.collect::<Vec<_>>()
		.join("\n")
}
