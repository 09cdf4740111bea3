#![allow(dead_code)]
/// Re-export some common utilities for system tests
pub use assert_cmd::prelude::*; // Add methods on commands
pub use assert_fs::prelude::*;
pub use predicates::prelude::*; // Used for writing assertions
pub use assert_cmd::Command; // Run programs

/// Path to test files : tests/test-data/
/// Files
pub const FILE_MENU_TOML: &str = "../tests/test-data/menu.toml";
pub const FILE_MENU_JSON: &str = "../tests/test-data/menu.json";
pub const FILE_EVENTS: &str = "../tests/test-data/events.txt";
pub const FILE_SEEDLESS_EVENTS: &str = "../tests/test-data/seedless_events.txt";
pub const FILE_BAD_EVENTS: &str = "../tests/test-data/bad_events.txt";
pub const FILE_SHORT_EVENTS: &str = "../tests/test-data/short_events.txt";

/// Helper function to match the raw output of stderr or stdout, with a pattern a fixed amount of times, case insensitive
pub fn match_on_out_no_case(
    byte_output: &[u8],
    re_str: &str,
    match_count: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    // Build regex pattern
    let re = fancy_regex::Regex::new(&("(?i)".to_owned() + re_str)).unwrap();
    // Make the predicate function
    let pred_regex = predicate::function(|&x| re.find_iter(x).count() == match_count);
    // Convert the output to string as utf-8
    let str_res = std::str::from_utf8(byte_output).expect("invalid utf-8 sequence");
    // Evaluate the output with the predicate
    assert!(
        pred_regex.eval(&str_res),
        "regex: {re_str} - expected match count: {match_count}\noutput:\n{str_res}"
    );
    Ok(())
}

/// Start of a line logged at `WARN` level
pub const RE_WARN_LINE: &str = "(?m)^WARN";
/// Start of a line logged at `ERROR` level
pub const RE_ERROR_LINE: &str = "(?m)^ERROR";

/// Helper function takes in the output of stderr and asserts that there are no errors or warnings
pub fn assert_no_errors_or_warn(stderr_byte_output: &[u8]) -> Result<(), Box<dyn std::error::Error>> {
    match_on_out_no_case(stderr_byte_output, RE_ERROR_LINE, 0)?;
    match_on_out_no_case(stderr_byte_output, RE_WARN_LINE, 0)?;
    Ok(())
}

/// Parse the stats written to stdout with `-S stdout -D json`
pub fn menu_stats_from_json_stdout(
    stdout: &[u8],
) -> Result<hltrate::stats::menu_stats::MenuStats, Box<dyn std::error::Error>> {
    Ok(serde_json::from_slice(stdout)?)
}
