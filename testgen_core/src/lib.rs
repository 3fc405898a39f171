//! `testgen_core` is the core library for the `testgen` shader test
//! generator. It reads a configuration document describing one logical test
//! (a shader template plus a set of named variants) and emits one test file
//! per variant by merging shared defaults with per-variant overrides,
//! substituting template variables, and prepending test metadata.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Configuration document (YAML / JSON / TOML)
//!   → Loader (parses into a TestDocument, checks required fields)
//!   → Template resolution (override → absolute → config dir → cwd → inline)
//!   → Merge engine (effective directives, inputs, template vars, filecheck groups)
//!   → Renderer (header, substituted shader body, filecheck block)
//!   → Emitter (output paths, writes, fail-fast per-variant outcomes)
//! ```
//!
//! ## Modules
//!
//! - [`config`]: The document model and loader.
//! - [`merge`]: Effective per-variant values.
//! - [`project`]: Project root discovery and output directory resolution.
//!
//! ## Key Types
//!
//! - [`TestDocument`]: A parsed configuration document.
//! - [`Variant`]: One named set of overrides, producing one file.
//! - [`Directive`]: A `//TEST` metadata line.
//! - [`Input`]: A `//TEST_INPUT` metadata line.
//! - [`GenerationReport`]: Per-variant outcomes of a generation run.
//! - [`CheckReport`]: Generated files compared with what would be rendered.
//!
//! ## Document Shape
//!
//! ```yaml
//! test_config:
//!   name: buffer-load
//!   shader_template: buffer-load.slang
//!   default_directives:
//!     - type: COMPARE_COMPUTE
//!       flags: -vk -output-using-type
//!   global_inputs:
//!     - name: outputBuffer
//!       type: ubuffer
//!       parameters: data=[0 0 0 0],stride=4
//! variants:
//!   float:
//!     template_vars:
//!       TYPE: float
//!   uint:
//!     template_vars:
//!       TYPE: uint
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use testgen_core::TestDocument;
//! use testgen_core::generate_all;
//! use testgen_core::project::resolve_output_dir;
//! use testgen_core::resolve_template;
//!
//! let config_path = Path::new("tests/buffer-load.yaml");
//! let document = TestDocument::load(config_path).unwrap();
//! let template = resolve_template(&document, config_path, None).unwrap();
//! let output_dir = resolve_output_dir(&document, config_path, None);
//!
//! let report = generate_all(&document, &template.text, &output_dir.path).unwrap();
//! if !report.is_ok() {
//! 	eprintln!("generation stopped early");
//! }
//! ```

pub use config::*;
pub use emit::*;
pub use error::*;
pub use merge::*;
pub use ordered::*;
pub use render::*;
pub use template::*;
pub use validate::*;

pub mod config;
mod emit;
#[allow(unused_assignments)]
mod error;
pub mod merge;
mod ordered;
pub mod project;
mod render;
mod template;
mod validate;

#[cfg(test)]
mod __fixtures;
