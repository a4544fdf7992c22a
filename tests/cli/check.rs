use anyhow::Result;
use pretty_assertions::assert_eq;
use serde_json::Value;

use crate::CliTest;

fn run_json(test: &CliTest) -> Result<Value> {
    let output = test.check_command().output()?;
    let stdout = String::from_utf8(output.stdout)?;
    Ok(serde_json::from_str(&stdout)?)
}

fn error_codes(report: &Value) -> Vec<String> {
    report["diagnostics"]
        .as_array()
        .expect("diagnostics array")
        .iter()
        .map(|d| d["error_code"].as_str().unwrap().to_string())
        .collect()
}

#[test]
fn test_direct_effect_loop_reported() -> Result<()> {
    let test = CliTest::with_file(
        "src/Counter.tsx",
        r#"
export function Counter() {
    const [n, setN] = useState(0);
    useEffect(() => {
        setN(n + 1);
    }, [n]);
    return null;
}
"#,
    )?;

    let report = run_json(&test)?;
    let codes = error_codes(&report);
    assert!(codes.contains(&"RLD-200".to_string()), "codes: {:?}", codes);
    assert_eq!(report["files_analyzed"], 1);

    let status = test.check_command().status()?;
    assert_eq!(status.code(), Some(1));
    Ok(())
}

#[test]
fn test_clean_component_reports_no_issues() -> Result<()> {
    let test = CliTest::with_file(
        "src/Counter.tsx",
        r#"
export function Counter() {
    const [n, setN] = useState(0);
    useEffect(() => {
        setN(prev => prev + 1);
    }, [n]);
    return null;
}
"#,
    )?;

    let report = run_json(&test)?;
    assert!(report["diagnostics"].as_array().unwrap().is_empty());

    let status = test.check_command().status()?;
    assert_eq!(status.code(), Some(0));
    Ok(())
}

#[test]
fn test_ignore_comment_suppresses_diagnostic() -> Result<()> {
    let test = CliTest::with_file(
        "src/Counter.tsx",
        r#"
export function Counter() {
    const [n, setN] = useState(0);
    useEffect(() => { // rld-ignore
        setN(n + 1);
    }, [n]);
    return null;
}
"#,
    )?;

    let report = run_json(&test)?;
    assert!(report["diagnostics"].as_array().unwrap().is_empty());
    Ok(())
}

#[test]
fn test_cross_file_loop_reported() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(
        "src/helpers.ts",
        r#"
export function bump(setN) {
    setN(1);
}
"#,
    )?;
    test.write_file(
        "src/Counter.tsx",
        r#"
import { bump } from "./helpers";

export function Counter() {
    const [n, setN] = useState(0);
    useEffect(() => {
        bump(setN);
    }, [n]);
    return null;
}
"#,
    )?;

    let report = run_json(&test)?;
    let codes = error_codes(&report);
    assert!(
        codes.iter().any(|c| c == "RLD-300" || c == "RLD-301"),
        "codes: {:?}",
        codes
    );
    assert_eq!(report["files_analyzed"], 2);
    Ok(())
}

#[test]
fn test_parse_error_isolated_to_one_file() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file("src/Broken.tsx", "function ( { {{{")?;
    test.write_file(
        "src/Good.tsx",
        r#"
export function Good() {
    return null;
}
"#,
    )?;

    let report = run_json(&test)?;
    assert_eq!(report["files_analyzed"], 1);
    let parse_errors = report["parse_errors"].as_array().unwrap();
    assert_eq!(parse_errors.len(), 1);
    assert!(parse_errors[0]["file"].as_str().unwrap().ends_with("Broken.tsx"));
    Ok(())
}

#[test]
fn test_min_severity_filters_low_findings() -> Result<()> {
    let test = CliTest::with_file(
        "src/Counter.tsx",
        r#"
export function Counter() {
    const [n, setN] = useState(0);
    useEffect(() => {
        if (cond) {
            setN(n + 1);
        }
    }, [n]);
    return null;
}
"#,
    )?;

    let mut cmd = test.command();
    cmd.arg("check")
        .arg(".")
        .arg("--json")
        .arg("--min-severity")
        .arg("high")
        .arg("--min-confidence")
        .arg("high");
    let output = cmd.output()?;
    let report: Value = serde_json::from_str(&String::from_utf8(output.stdout)?)?;
    assert!(report["diagnostics"].as_array().unwrap().is_empty());
    Ok(())
}

#[test]
fn test_safe_pattern_only_exits_success() -> Result<()> {
    let test = CliTest::with_file(
        "src/Counter.tsx",
        r#"
export function Counter() {
    const [x, setX] = useState(0);
    useEffect(() => {
        if (x !== 5) {
            setX(5);
        }
    }, [x]);
    return null;
}
"#,
    )?;

    let report = run_json(&test)?;
    let codes = error_codes(&report);
    assert!(codes.contains(&"RLD-000".to_string()), "codes: {:?}", codes);

    let status = test.check_command().status()?;
    assert_eq!(status.code(), Some(0));
    Ok(())
}

#[test]
fn test_nonexistent_path_is_config_error() -> Result<()> {
    let test = CliTest::new()?;
    let mut cmd = test.command();
    cmd.arg("check").arg("does-not-exist");
    let status = cmd.status()?;
    assert_eq!(status.code(), Some(2));
    Ok(())
}

#[test]
fn test_help() -> Result<()> {
    let test = CliTest::new()?;
    let output = test.command().arg("--help").output()?;
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("check"));
    assert!(stdout.contains("init"));
    Ok(())
}
