use marker_patch::utils::validation::Validate;
use marker_patch::{CliConfig, PatchEngine, Patcher, PatcherOptions};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn cli_config(dir: &TempDir, input_text: &str) -> CliConfig {
    let input = dir.path().join("ui.html.bak");
    fs::write(&input, input_text).unwrap();

    CliConfig {
        input,
        output: dir.path().join("ui.html"),
        start_marker: "<START>".to_string(),
        end_marker: "<END>".to_string(),
        replacement_file: None,
        replacement: Some("<NEW>".to_string()),
        trim_replacement: false,
        backup: false,
        dry_run: false,
        verbose: false,
    }
}

fn run_single(config: &CliConfig) -> marker_patch::PatchSummary {
    let job = config.to_job().unwrap();
    let patcher = Patcher::new(PatcherOptions {
        dry_run: config.dry_run,
    });
    PatchEngine::new(patcher, vec![job]).run().unwrap()
}

#[test]
fn test_cli_end_to_end_splice() {
    let dir = TempDir::new().unwrap();
    let config = cli_config(&dir, "AAA<START>old body<END>ZZZ");
    assert!(config.validate().is_ok());

    let summary = run_single(&config);

    // End marker survives; everything from start marker to just before it is replaced
    assert_eq!(
        fs::read_to_string(&config.output).unwrap(),
        "AAA<NEW><END>ZZZ"
    );
    assert!(summary.succeeded());
    assert_eq!(summary.outcomes.len(), 1);
    assert_eq!(summary.outcomes[0].mode, "splice");
    assert_eq!(summary.outcomes[0].bytes_read, 26);
    assert_eq!(summary.outcomes[0].bytes_written, 16);
}

#[test]
fn test_cli_replacement_file_with_trim() {
    let dir = TempDir::new().unwrap();
    let payload = dir.path().join("upload_image.js");
    fs::write(&payload, "\nasync function uploadImage(msg) { fixed }\n\n").unwrap();

    let mut config = cli_config(
        &dir,
        "head <START>async function uploadImage(msg) { broken }<END> tail",
    );
    config.replacement = None;
    config.replacement_file = Some(payload);
    config.trim_replacement = true;

    run_single(&config);

    assert_eq!(
        fs::read_to_string(&config.output).unwrap(),
        "head async function uploadImage(msg) { fixed }<END> tail"
    );
}

#[test]
fn test_multibyte_prefix_and_suffix_preserved() {
    let dir = TempDir::new().unwrap();
    let config = cli_config(&dir, "café №1 <START>старый блок<END> naïve – done");

    run_single(&config);

    assert_eq!(
        fs::read_to_string(&config.output).unwrap(),
        "café №1 <NEW><END> naïve – done"
    );
}

#[test]
fn test_reapplying_to_patched_output_is_not_idempotent() {
    let dir = TempDir::new().unwrap();
    // The payload re-declares the start marker mid-block, as the real
    // generated-UI replacement does.
    let mut config = cli_config(&dir, "head <START>old<END> tail");
    config.replacement = Some("helper() <START>body ".to_string());

    run_single(&config);
    let first = fs::read_to_string(&config.output).unwrap();
    assert_eq!(first, "head helper() <START>body <END> tail");

    // Second pass reads the patched output and splices at the first marker
    // occurrence again, so the text before it accumulates.
    let mut second_config = config.clone();
    second_config.input = config.output.clone();
    second_config.output = dir.path().join("ui.twice.html");
    run_single(&second_config);

    assert_eq!(
        fs::read_to_string(&second_config.output).unwrap(),
        "head helper() helper() <START>body <END> tail"
    );
}

#[test]
fn test_dry_run_reports_without_writing() {
    let dir = TempDir::new().unwrap();
    let mut config = cli_config(&dir, "AAA<START>old body<END>ZZZ");
    config.dry_run = true;

    let summary = run_single(&config);

    assert!(summary.outcomes[0].dry_run);
    assert_eq!(summary.outcomes[0].bytes_written, 16);
    assert!(!config.output.exists());
}

#[test]
fn test_output_name_drives_job_name() {
    let dir = TempDir::new().unwrap();
    let config = cli_config(&dir, "AAA<START>x<END>ZZZ");

    let summary = run_single(&config);
    assert_eq!(summary.outcomes[0].job, "ui.html");
}

#[test]
fn test_relative_output_path_accepted() {
    // A bare file name has no parent directory; the temp file must land in
    // the current directory for the rename to stay on one filesystem.
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("ui.html.bak");
    fs::write(&input, "AAA<START>old<END>ZZZ").unwrap();

    let previous = std::env::current_dir().unwrap();
    std::env::set_current_dir(dir.path()).unwrap();

    let config = CliConfig {
        input,
        output: PathBuf::from("ui.html"),
        start_marker: "<START>".to_string(),
        end_marker: "<END>".to_string(),
        replacement_file: None,
        replacement: Some("<NEW>".to_string()),
        trim_replacement: false,
        backup: false,
        dry_run: false,
        verbose: false,
    };
    let summary = run_single(&config);
    std::env::set_current_dir(previous).unwrap();

    assert!(summary.succeeded());
    assert_eq!(
        fs::read_to_string(dir.path().join("ui.html")).unwrap(),
        "AAA<NEW><END>ZZZ"
    );
}
