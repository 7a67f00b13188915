use anyhow::Result;
use std::io::Write;
use std::process::{Command, Output, Stdio};
use tempfile::NamedTempFile;

fn tabula(args: &[&str]) -> Result<Output> {
    Ok(Command::new(env!("CARGO_BIN_EXE_tabula")).args(args).output()?)
}

/// Test that a query against the demo tables prints a bordered table
#[test]
fn test_cli_query_execution() -> Result<()> {
    let output = tabula(&[
        "--demo",
        "query",
        "SELECT category, SUM(value) AS total FROM data GROUP BY category",
    ])?;
    assert!(output.status.success(), "CLI query execution failed");

    let output_str = String::from_utf8(output.stdout)?;
    assert!(output_str.contains("| category | total |"), "Header not found in: {}", output_str);
    assert!(output_str.contains("| A        | 120   |"), "Row not found in: {}", output_str);
    assert!(output_str.contains("(3 rows)"), "Row count not found in: {}", output_str);
    Ok(())
}

/// Test the frame and JSON output formats
#[test]
fn test_cli_output_formats() -> Result<()> {
    let sql = "SELECT species, count FROM bird_sightings WHERE count > 30 ORDER BY count DESC";

    let frame = tabula(&["--demo", "--format", "frame", "query", sql])?;
    assert!(frame.status.success());
    let frame_str = String::from_utf8(frame.stdout)?;
    assert!(frame_str.starts_with("   species  count\n0  Mallard     42\n1  Pintail     31"), "{}", frame_str);

    let json = tabula(&["--demo", "-f", "json", "query", sql])?;
    assert!(json.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&json.stdout)?;
    assert_eq!(parsed[0]["species"], "Mallard");
    assert_eq!(parsed[1]["count"], 31);
    Ok(())
}

/// Test running a script file
#[test]
fn test_cli_script_execution() -> Result<()> {
    let mut script = NamedTempFile::new()?;
    writeln!(script, "CREATE TABLE migration_data (species STRING, distance_km INTEGER);")?;
    writeln!(script, "INSERT INTO migration_data VALUES ('Mallard', 1500), ('Pintail', 2500);")?;
    writeln!(script, "-- only the last result is printed")?;
    writeln!(
        script,
        "SELECT b.species, m.distance_km FROM bird_sightings b JOIN migration_data m ON b.species = m.species ORDER BY m.distance_km DESC;"
    )?;
    script.flush()?;

    let path = script.path().to_string_lossy().to_string();
    let output = tabula(&["--demo", "script", &path])?;
    assert!(output.status.success(), "Script failed: {}", String::from_utf8_lossy(&output.stderr));

    let output_str = String::from_utf8(output.stdout)?;
    assert!(output_str.contains("| Pintail | 2500        |"), "{}", output_str);
    assert!(output_str.contains("(2 rows)"), "{}", output_str);
    Ok(())
}

/// Test that errors exit with a non-zero status and a message on stderr
#[test]
fn test_cli_errors() -> Result<()> {
    let bad_sql = tabula(&["--demo", "query", "SELECT FROM data"])?;
    assert!(!bad_sql.status.success());
    assert!(!String::from_utf8(bad_sql.stderr)?.is_empty());

    let missing_table = tabula(&["query", "SELECT * FROM data"])?;
    assert!(!missing_table.status.success());
    assert!(String::from_utf8(missing_table.stderr)?.contains("data"));

    let missing_script = tabula(&["script", "/nonexistent/path/to/script.sql"])?;
    assert!(!missing_script.status.success());
    Ok(())
}

/// Test the CLI shell functionality with input redirection
#[test]
fn test_cli_shell_interaction() -> Result<()> {
    // The shell writes its history file to the working directory
    let work_dir = tempfile::tempdir()?;

    let mut child = Command::new(env!("CARGO_BIN_EXE_tabula"))
        .args(["--demo", "shell"])
        .current_dir(work_dir.path())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(b"tables\n")?;
        stdin.write_all(b"SELECT COUNT(*) AS n FROM bird_sightings\n")?;
        stdin.write_all(b"SELECT nope FROM bird_sightings\n")?;
        stdin.write_all(b"explain SELECT species FROM bird_sightings WHERE count > 10\n")?;
        stdin.write_all(b"exit\n")?;
    }

    let output = child.wait_with_output()?;
    assert!(output.status.success(), "Shell exited with failure");

    let stdout = String::from_utf8(output.stdout)?;
    let stderr = String::from_utf8(output.stderr)?;
    assert!(stdout.contains("Welcome to TabulaDB"), "{}", stdout);
    assert!(stdout.contains("bird_sightings"), "{}", stdout);
    assert!(stdout.contains("| 4   |"), "{}", stdout);
    assert!(stdout.contains("SeqScan: bird_sightings"), "{}", stdout);
    assert!(stdout.contains("Goodbye!"), "{}", stdout);
    // A failing statement reports and the shell keeps going
    assert!(stderr.contains("Error"), "{}", stderr);
    Ok(())
}
