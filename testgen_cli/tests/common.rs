use std::path::Path;
use std::path::PathBuf;

use assert_cmd::Command;
use insta_cmd::get_cargo_bin;

pub const MINIMAL_CONFIG: &str = r#"test_config:
  name: foo
  shader_template: "void main() {}"
  global_inputs:
    - name: buf
      type: ubuffer
      parameters: "data=[0],stride=4"
  default_directives:
    - type: SIMPLE
      flags: -slang
variants:
  bar: {}
"#;

pub const MINIMAL_OUTPUT: &str = "// Test: foo - bar\n//\n//TEST:SIMPLE: -slang\n\n//TEST_INPUT: \
                                  ubuffer(data=[0],stride=4):name buf\nvoid main() {}";

pub fn testgen_cmd() -> Command {
	let mut cmd = Command::new(get_cargo_bin("testgen"));
	cmd.env("NO_COLOR", "1");
	cmd.env_remove("RUST_LOG");
	cmd
}

/// Write `content` to `name` inside `dir` and return its path.
#[allow(dead_code)]
pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
	let path = dir.join(name);
	std::fs::write(&path, content).unwrap_or_else(|e| panic!("failed to write {name}: {e}"));
	path
}
