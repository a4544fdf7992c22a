use anyhow::Result;
use pretty_assertions::assert_eq;

use crate::CliTest;

#[test]
fn test_init_creates_config_file() -> Result<()> {
    let test = CliTest::new()?;

    let status = test.init_command().status()?;
    assert!(status.success());

    let content = test.read_file(".rldrc.json")?;
    assert!(content.contains("minSeverity"));
    Ok(())
}

#[test]
fn test_init_refuses_to_overwrite_existing_config() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(".rldrc.json", "{}")?;

    let status = test.init_command().status()?;
    assert_eq!(status.code(), Some(2));

    let content = test.read_file(".rldrc.json")?;
    assert_eq!(content, "{}");
    Ok(())
}
