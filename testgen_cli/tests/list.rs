mod common;

use serde_json::Value;
use testgen_core::AnyEmptyResult;

const TWO_VARIANTS: &str = r#"test_config:
  name: pair
  shader_template: body
  global_inputs:
    - name: buf
      type: ubuffer
  default_directives:
    - type: SIMPLE
      flags: -slang
variants:
  second:
    description: declared first
    inputs:
      - name: extra
        type: Texture2D
  first:
    directives:
      - type: INTERPRET
      - type: COMPILE_FAIL
"#;

#[test]
fn list_shows_variants_in_declaration_order() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let config = common::write_file(tmp.path(), "pair.yaml", TWO_VARIANTS);

	let output = common::testgen_cmd()
		.current_dir(tmp.path())
		.arg("list")
		.arg(&config)
		.arg("--output-dir")
		.arg("gen")
		.assert()
		.success()
		.get_output()
		.stdout
		.clone();
	let stdout = String::from_utf8(output)?;

	let second = stdout.find("second").unwrap_or(usize::MAX);
	let first = stdout.find("  first").unwrap_or(usize::MAX);
	assert!(second < first, "unexpected order:\n{stdout}");
	assert!(stdout.contains("(1 directive(s), 2 input(s))"));
	assert!(stdout.contains("(2 directive(s), 1 input(s))"));
	assert!(stdout.contains("2 variant(s)"));

	Ok(())
}

#[test]
fn list_json_includes_paths() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let config = common::write_file(tmp.path(), "pair.yaml", TWO_VARIANTS);

	let output = common::testgen_cmd()
		.current_dir(tmp.path())
		.arg("list")
		.arg(&config)
		.arg("--output-dir")
		.arg("gen")
		.arg("--format")
		.arg("json")
		.assert()
		.success()
		.get_output()
		.stdout
		.clone();

	let listing: Value = serde_json::from_slice(&output)?;
	assert_eq!(listing["name"], "pair");
	assert_eq!(listing["variants"][0]["name"], "second");
	assert_eq!(listing["variants"][0]["inputs"], 2);
	assert_eq!(listing["variants"][1]["directives"], 2);
	assert_eq!(
		listing["variants"][1]["path"],
		std::path::Path::new("gen")
			.join("pair-first.slang")
			.display()
			.to_string()
	);

	Ok(())
}
