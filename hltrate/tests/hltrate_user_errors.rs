use crate::util::*;
mod util;

#[test]
fn menu_file_does_not_exist() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("hltrate")?;
    cmd.arg(FILE_EVENTS).arg("-m").arg("test/file/doesnt/exist.toml");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Menu file does not exist"));

    Ok(())
}

#[test]
fn menu_file_bad_extension() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("hltrate")?;
    cmd.arg(FILE_EVENTS).arg("-m").arg(FILE_EVENTS);
    cmd.assert().failure();

    match_on_out_no_case(&cmd.output()?.stderr, "Menu file has invalid extension", 1)?;

    Ok(())
}

#[test]
fn menu_is_required() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("hltrate")?;
    cmd.arg(FILE_EVENTS);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("--menu"));

    Ok(())
}

#[test]
fn stats_output_without_format() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("hltrate")?;
    cmd.arg(FILE_EVENTS)
        .arg("-m")
        .arg(FILE_MENU_TOML)
        .arg("-S")
        .arg("stdout");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("required arguments were not provided"));

    Ok(())
}

#[test]
fn bad_event_line_is_fatal() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("hltrate")?;
    cmd.arg(FILE_BAD_EVENTS).arg("-m").arg(FILE_MENU_TOML);
    cmd.assert().success();

    let output = cmd.output()?;
    match_on_out_no_case(&output.stderr, "fatal: Line 2", 1)?;
    match_on_out_no_case(&output.stdout, "FATAL ERROR - EARLY TERMINATION", 1)?;

    Ok(())
}

#[test]
fn bad_event_line_any_errors_exit_code() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("hltrate")?;
    cmd.arg(FILE_BAD_EVENTS)
        .arg("-m")
        .arg(FILE_MENU_TOML)
        .arg("-E")
        .arg("2");
    cmd.assert().code(2);

    Ok(())
}

#[test]
fn event_narrower_than_menu_is_fatal() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("hltrate")?;
    cmd.arg(FILE_SHORT_EVENTS).arg("-m").arg(FILE_MENU_TOML);
    cmd.assert().success();

    match_on_out_no_case(&cmd.output()?.stderr, "requires at least", 1)?;

    Ok(())
}

#[test]
fn seedless_accept_is_warned() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("hltrate")?;
    cmd.arg(FILE_SEEDLESS_EVENTS).arg("-m").arg(FILE_MENU_TOML);
    cmd.assert().success();

    let output = cmd.output()?;
    match_on_out_no_case(&output.stderr, RE_WARN_LINE, 1)?;
    match_on_out_no_case(&output.stderr, "\\[W02\\] HLT_IsoMu24_v", 1)?;
    match_on_out_no_case(&output.stdout, "W02: 1", 1)?;

    Ok(())
}

#[test]
fn seedless_accept_muted() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("hltrate")?;
    cmd.arg(FILE_SEEDLESS_EVENTS)
        .arg("-m")
        .arg(FILE_MENU_TOML)
        .arg("-q");
    cmd.assert().success();

    let output = cmd.output()?;
    assert_no_errors_or_warn(&output.stderr)?;
    // Still counted in the report
    match_on_out_no_case(&output.stdout, "W02: 1", 1)?;

    Ok(())
}

#[test]
fn seedless_accept_any_errors_exit_code() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("hltrate")?;
    cmd.arg(FILE_SEEDLESS_EVENTS)
        .arg("-m")
        .arg(FILE_MENU_TOML)
        .arg("-q")
        .arg("-E")
        .arg("3");
    cmd.assert().code(3);

    Ok(())
}

#[test]
fn unknown_correlate_path() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("hltrate")?;
    cmd.arg(FILE_EVENTS)
        .arg("-m")
        .arg(FILE_MENU_TOML)
        .arg("-c")
        .arg("HLT_DoesNotExist_v");
    cmd.assert().failure();

    match_on_out_no_case(&cmd.output()?.stderr, "HLT_DoesNotExist_v", 1)?;

    Ok(())
}
