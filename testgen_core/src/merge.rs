//! Per-variant merging of document defaults with variant overrides.
//!
//! Every function here is pure: the document and variant are only read, and
//! a fresh effective view is built on each call.

use crate::Directive;
use crate::Input;
use crate::OrderedMap;
use crate::TemplateValue;
use crate::TestDocument;
use crate::Variant;

/// The variant's directives when it declares any, otherwise the document's
/// default directives. The two lists are never combined.
pub fn effective_directives<'a>(document: &'a TestDocument, variant: &'a Variant) -> &'a [Directive] {
	if variant.directives.is_empty() {
		&document.default_directives
	} else {
		&variant.directives
	}
}

/// Global inputs followed by the variant's own inputs.
pub fn effective_inputs<'a>(document: &'a TestDocument, variant: &'a Variant) -> Vec<&'a Input> {
	document
		.global_inputs
		.iter()
		.chain(variant.inputs.iter())
		.collect()
}

/// Global template variables overlaid with the variant's, variant winning.
pub fn effective_template_vars(
	document: &TestDocument,
	variant: &Variant,
) -> OrderedMap<TemplateValue> {
	document.global_template_vars.overlay(&variant.template_vars)
}

/// Default filecheck groups overlaid with the variant's groups. A variant
/// group replaces the default group of the same name wholesale.
pub fn effective_filecheck_patterns(
	document: &TestDocument,
	variant: &Variant,
) -> OrderedMap<Vec<String>> {
	document
		.default_filecheck_patterns
		.overlay(&variant.filecheck_patterns)
}

/// The shader body a variant renders: its own `shader_code` when set,
/// otherwise the document's resolved template.
pub fn effective_shader_body<'a>(variant: &'a Variant, template: &'a str) -> &'a str {
	variant.shader_override().unwrap_or(template)
}

/// All effective values for one variant.
#[derive(Debug, Clone)]
pub struct EffectiveVariant<'a> {
	pub document: &'a TestDocument,
	pub variant: &'a Variant,
	pub directives: &'a [Directive],
	pub inputs: Vec<&'a Input>,
	pub template_vars: OrderedMap<TemplateValue>,
	pub filecheck_patterns: OrderedMap<Vec<String>>,
	/// Shader body before template substitution.
	pub shader_body: &'a str,
}

impl<'a> EffectiveVariant<'a> {
	pub fn new(document: &'a TestDocument, variant: &'a Variant, template: &'a str) -> Self {
		Self {
			document,
			variant,
			directives: effective_directives(document, variant),
			inputs: effective_inputs(document, variant),
			template_vars: effective_template_vars(document, variant),
			filecheck_patterns: effective_filecheck_patterns(document, variant),
			shader_body: effective_shader_body(variant, template),
		}
	}
}
