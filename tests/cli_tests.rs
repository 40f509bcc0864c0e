use std::process::Command;
use std::str;

fn fixture(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

fn run_cli(args: &[&str]) -> (bool, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_subword_cli"))
        .args(args)
        .output()
        .expect("Failed to execute subword_cli");
    let stdout = str::from_utf8(&output.stdout).expect("stdout is not valid UTF-8").to_string();
    let stderr = str::from_utf8(&output.stderr).expect("stderr is not valid UTF-8").to_string();
    (output.status.success(), stdout, stderr)
}

#[test]
fn test_cli_help_message() {
    let (ok, stdout, _) = run_cli(&["--help"]);
    assert!(ok);
    assert!(stdout.contains("--model-path"), "Help message should mention --model-path");
    assert!(stdout.contains("--suffix"), "Help message should mention --suffix");
}

#[test]
fn test_cli_plain_roundtrip() {
    let model = fixture("toy_tokenizer.json");
    let (ok, stdout, stderr) = run_cli(&["--model-path", &model, "--text", "abc"]);
    assert!(ok, "CLI failed: {}", stderr);
    assert!(stdout.contains("Loaded 4 pieces"), "Output: {}", stdout);
    assert!(stdout.contains("Encoded IDs: [0, 1, 2]"), "Output: {}", stdout);
    assert!(stdout.contains("Decoded text: 'abc'"), "Output: {}", stdout);
}

#[test]
fn test_cli_narrow_with_affixes_decodes_interior() {
    let model = fixture("toy_tokenizer.json");
    // 900 is not a piece of the toy model; only the interior is decoded.
    let (ok, stdout, stderr) =
        run_cli(&["--model-path", &model, "--text", "ab", "--prefix", "900", "--suffix", "3"]);
    assert!(ok, "CLI failed: {}", stderr);
    assert!(stdout.contains("Encoded IDs (u16): [900, 0, 1, 3]"), "Output: {}", stdout);
    assert!(stdout.contains("Decoded text: 'ab'"), "Output: {}", stdout);
}

#[test]
fn test_cli_affixes_around_empty_text() {
    let model = fixture("specials_tokenizer.json");
    let (ok, stdout, stderr) = run_cli(&["--model-path", &model, "--text", "", "--prefix", "1", "--suffix", "2"]);
    assert!(ok, "CLI failed: {}", stderr);
    assert!(stdout.contains("Encoded IDs (u16): [1, 2]"), "Output: {}", stdout);
    assert!(stdout.contains("Decoded text: ''"), "Output: {}", stdout);
}

#[test]
fn test_cli_rejects_missing_model() {
    let (ok, _, _) = run_cli(&["--model-path", "/nonexistent/tokenizer.json", "--text", "a"]);
    assert!(!ok);
}
