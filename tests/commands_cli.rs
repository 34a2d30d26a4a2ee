use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::Parser;
use clap::error::ErrorKind;
use insta::assert_snapshot;
use pretty_assertions::assert_eq;

const RAW_HID: &str = "/dev/hidraw0|FEED|0000|0001|06|Kevin|Macropad;\
/dev/hidraw1|FEED|0000|FF60|61|Kevin|Macropad";

#[derive(Debug, Default)]
struct FakeTerminalClient;

impl macropad_oled::TerminalClient for FakeTerminalClient {
    fn stdout_is_terminal(&self) -> bool {
        false
    }

    fn stderr_is_terminal(&self) -> bool {
        false
    }
}

fn write_config(name: &str, contents: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock should be after unix epoch")
        .as_nanos();
    let path = std::env::temp_dir().join(format!(
        "macropad-oled-cli-{name}-{}-{nanos}.toml",
        std::process::id()
    ));
    std::fs::write(&path, contents).expect("config should be written");
    path
}

fn default_config() -> PathBuf {
    write_config("default", "[device]\nvendor_id = 0xFEED\nproduct_id = 0x0000\n")
}

async fn run_with_parsed_args(args: macropad_oled::Args) -> anyhow::Result<String> {
    let mut output = Vec::new();
    let options = args.run_options(macropad_oled::OutputFormat::Pretty);
    let (command, maybe_fake_args) = args.into_command_and_fake_args()?;
    let hardware_client = match maybe_fake_args {
        Some(fake_args) => macropad_oled::fake_hardware_client(fake_args),
        None => macropad_oled::real_hardware_client(),
    };
    macropad_oled::run_with_clients(
        command,
        &mut output,
        &FakeTerminalClient,
        hardware_client,
        options,
    )
    .await?;
    Ok(String::from_utf8(output)?)
}

async fn run_with_argv(argv: &[&str]) -> anyhow::Result<String> {
    let config = default_config();
    let mut full_argv: Vec<String> = argv.iter().map(ToString::to_string).collect();
    full_argv.push("--config".into());
    full_argv.push(config.display().to_string());
    let parsed_args = macropad_oled::Args::try_parse_from(full_argv)?;
    let result = run_with_parsed_args(parsed_args).await;
    std::fs::remove_file(config)?;
    result
}

fn fake_argv<'a>(command: &[&'a str]) -> Vec<&'a str> {
    let mut argv = vec!["macropad-oled", "--fake", "--fake-devices", RAW_HID];
    argv.extend_from_slice(command);
    argv
}

#[tokio::test]
async fn line_command_reports_frames() -> anyhow::Result<()> {
    let stdout = run_with_argv(&fake_argv(&["line", "0", "Hi"])).await?;
    assert_snapshot!(stdout.trim_end(), @"Wrote row 0: 64 bytes in 2 report(s)");
    Ok(())
}

#[tokio::test]
async fn line_command_follows_configured_report_size() -> anyhow::Result<()> {
    let config = write_config(
        "wide",
        "[device]\nvendor_id = 0xFEED\nproduct_id = 0x0000\nraw_epsize = 64\n",
    );
    let log = macropad_oled::WriteLog::default();
    let fake = macropad_oled::FakeArgs::builder()
        .devices(RAW_HID)?
        .write_log(log.clone())
        .build();
    let args = macropad_oled::Args::new(macropad_oled::Command::Control(
        macropad_oled::ControlAction::Line(macropad_oled::LineArgs::new(4, "wide")),
    ))
    .with_fake(fake)
    .with_config(&config);

    let stdout = run_with_parsed_args(args).await?;
    std::fs::remove_file(config)?;

    assert_snapshot!(stdout.trim_end(), @"Wrote row 4: 128 bytes in 2 report(s)");
    assert!(log.reports().iter().all(|report| report.len() == 64));
    Ok(())
}

#[tokio::test]
async fn line_command_prints_json() -> anyhow::Result<()> {
    let stdout = run_with_argv(&fake_argv(&["--output", "json", "line", "1", "Hi"])).await?;
    let value: serde_json::Value = serde_json::from_str(&stdout)?;
    assert_eq!(
        serde_json::json!({
            "action": "line",
            "row": 1,
            "text": "Hi",
            "bytes_written": 64,
            "frames_written": 2,
        }),
        value
    );
    Ok(())
}

#[tokio::test]
async fn pixels_command_applies_offset() -> anyhow::Result<()> {
    let stdout = run_with_argv(&fake_argv(&[
        "pixels", "on", "1,1", "2,2", "--offset", "10,0",
    ]))
    .await?;
    assert_snapshot!(stdout.trim_end(), @"Set 2 pixel(s) on: 32 bytes in 1 report(s)");
    Ok(())
}

#[tokio::test]
async fn pixels_command_rejects_coordinate_overflow() {
    let result = run_with_argv(&fake_argv(&["pixels", "off", "250,0", "--offset", "10,0"])).await;
    let error = result.expect_err("offset past 255 should fail");
    assert!(format!("{error:#}").contains("leaves the 0..=255 coordinate range"));
}

#[tokio::test]
async fn query_command_decodes_reply() -> anyhow::Result<()> {
    let stdout = run_with_argv(&fake_argv(&[
        "--fake-replies",
        "8000",
        "query",
        "brightness",
    ]))
    .await?;
    assert_snapshot!(stdout.trim_end(), @"OLED brightness: 128");
    Ok(())
}

#[tokio::test]
async fn query_state_prints_on_or_off() -> anyhow::Result<()> {
    let stdout = run_with_argv(&fake_argv(&["--fake-replies", "01", "query", "state"])).await?;
    assert_snapshot!(stdout.trim_end(), @"OLED power state: on");
    Ok(())
}

#[tokio::test]
async fn query_command_times_out_without_reply() {
    let result = run_with_argv(&fake_argv(&["query", "layer", "--timeout", "20ms"])).await;
    let error = result.expect_err("a missing reply should time out");
    assert!(format!("{error:#}").contains("timed out after 20ms"));
}

#[test]
fn brightness_command_rejects_out_of_range_input() {
    for level in ["256", "-1"] {
        let result = macropad_oled::Args::try_parse_from(fake_argv(&["brightness", level]));
        let error = result.expect_err("brightness outside 0..=255 should fail parsing");
        assert_eq!(ErrorKind::ValueValidation, error.kind());
    }
}

#[tokio::test]
async fn brightness_command_applies_value() -> anyhow::Result<()> {
    let stdout = run_with_argv(&fake_argv(&["brightness", "255"])).await?;
    assert_snapshot!(stdout.trim_end(), @"Applied brightness: 255");
    Ok(())
}

#[tokio::test]
async fn scroll_commands_pass_operands_through() -> anyhow::Result<()> {
    let speed = run_with_argv(&fake_argv(&["scroll", "speed", "9"])).await?;
    let area = run_with_argv(&fake_argv(&["scroll", "area", "0", "7"])).await?;
    let left = run_with_argv(&fake_argv(&["scroll", "left"])).await?;

    assert_snapshot!(speed.trim_end(), @"Applied scroll speed: 9");
    assert_snapshot!(area.trim_end(), @"Applied scroll area: 0..7");
    assert_snapshot!(left.trim_end(), @"Applied hardware scroll: left");
    Ok(())
}

#[tokio::test]
async fn scroll_text_command_runs_one_pass() -> anyhow::Result<()> {
    let stdout = run_with_argv(&fake_argv(&["scroll-text", "1", "Hi", "--delay", "0ms"])).await?;
    assert_snapshot!(
        stdout.trim_end(),
        @"Scrolled row 1: 22 step(s) over 1 pass(es), 44 report(s)"
    );
    Ok(())
}

#[tokio::test]
async fn clear_command_without_row_clears_everything() -> anyhow::Result<()> {
    let all = run_with_argv(&fake_argv(&["clear"])).await?;
    let one = run_with_argv(&fake_argv(&["clear", "--row", "3"])).await?;

    assert_snapshot!(all.trim_end(), @"Cleared all rows");
    assert_snapshot!(one.trim_end(), @"Cleared row 3");
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn power_command_applies_state() -> anyhow::Result<()> {
    let stdout = run_with_argv(&fake_argv(&["power", "off"])).await?;
    assert_snapshot!(stdout.trim_end(), @"Applied power state: off");
    Ok(())
}

#[tokio::test]
async fn raw_command_frames_bytes() -> anyhow::Result<()> {
    let stdout = run_with_argv(&fake_argv(&["raw", "0901"])).await?;
    assert_snapshot!(stdout.trim_end(), @"Sent raw report: 32 bytes");
    Ok(())
}

#[tokio::test]
async fn devices_command_marks_matching_interface() -> anyhow::Result<()> {
    let stdout = run_with_argv(&fake_argv(&["devices"])).await?;

    let marked: Vec<&str> = stdout.lines().filter(|line| line.contains('*')).collect();
    assert_eq!(1, marked.len());
    assert!(marked[0].contains("/dev/hidraw1"));
    assert!(stdout.contains("/dev/hidraw0"));
    Ok(())
}

#[tokio::test]
async fn info_command_prints_device_and_profile_json() -> anyhow::Result<()> {
    let stdout = run_with_argv(&fake_argv(&["--output", "json", "info"])).await?;

    let value: serde_json::Value = serde_json::from_str(&stdout)?;
    assert_eq!("/dev/hidraw1", value["device"]["path"]);
    assert_eq!("Macropad", value["device"]["product"]);
    assert_eq!(32, value["profile"]["report_size"]);
    assert_eq!(21, value["profile"]["columns"]);
    Ok(())
}

#[tokio::test]
async fn unmatched_device_fails_with_identity() {
    let result = run_with_argv(&[
        "macropad-oled",
        "--fake",
        "--fake-devices",
        "/dev/hidraw0|FEED|0000|0001|06",
        "line",
        "0",
        "Hi",
    ])
    .await;

    let error = result.expect_err("no raw HID interface should be found");
    assert!(format!("{error:#}").contains("FEED:0000"));
}

#[tokio::test]
async fn missing_explicit_config_is_an_error() {
    let args = macropad_oled::Args::try_parse_from(fake_argv(&[
        "--config",
        "/nonexistent/macropad.toml",
        "info",
    ]))
    .expect("arguments should parse");

    let result = run_with_parsed_args(args).await;

    let error = result.expect_err("a missing config file should fail");
    assert!(format!("{error:#}").contains("/nonexistent/macropad.toml"));
}
