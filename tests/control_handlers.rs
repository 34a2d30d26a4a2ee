use std::time::Duration;

use assert_matches::assert_matches;
use pretty_assertions::assert_eq;

const RAW_HID: &str = "/dev/hidraw1|FEED|0000|FF60|61|Kevin|Macropad";

async fn open_session(
    replies: Option<&str>,
) -> anyhow::Result<(macropad_oled::DeviceSession, macropad_oled::WriteLog)> {
    let log = macropad_oled::WriteLog::default();
    let builder = macropad_oled::FakeArgs::builder()
        .devices(RAW_HID)?
        .write_log(log.clone());
    let fake_args = match replies {
        Some(replies) => builder.replies(replies)?.build(),
        None => builder.build(),
    };
    let profile = macropad_oled::DeviceProfile::builder()
        .vendor_id(0xFEED)
        .product_id(0x0000)
        .report_size(32)
        .columns(21)
        .build()?;
    let session = macropad_oled::SessionHandler::new(
        macropad_oled::fake_hardware_client(fake_args),
        profile,
    )
    .connect_first()
    .await?;
    Ok((session, log))
}

fn padded(bytes: &[u8]) -> Vec<u8> {
    let mut report = bytes.to_vec();
    report.resize(32, 0x00);
    report
}

#[tokio::test]
async fn write_line_erases_then_writes_full_reports() -> anyhow::Result<()> {
    let (mut session, log) = open_session(None).await?;

    let receipt = macropad_oled::LineHandler::write_line(&mut session, 0, "Hi").await?;
    session.close().await?;

    assert_eq!(2, receipt.frames_written());
    assert_eq!(64, receipt.bytes_written());
    assert_eq!(
        vec![
            padded(&[0x00, 0x08, 0x00]),
            padded(&[0x00, 0x01, 0x00, b'H', b'i']),
        ],
        log.reports()
    );
    Ok(())
}

#[tokio::test]
async fn forty_pixels_split_into_three_batches() -> anyhow::Result<()> {
    let (mut session, log) = open_session(None).await?;
    let coordinates: Vec<macropad_oled::PixelCoordinate> = (0..40u8)
        .map(|index| macropad_oled::PixelCoordinate::new(index, index / 2))
        .collect();

    let receipt = macropad_oled::PixelHandler::set_pixels(
        &mut session,
        &coordinates,
        macropad_oled::PixelValue::On,
        macropad_oled::PixelOffset::default(),
    )
    .await?;

    assert_eq!(3, receipt.frames_written());
    let pairs_per_report: Vec<usize> = log
        .reports()
        .iter()
        .map(|report| {
            let terminator = report
                .iter()
                .skip(3)
                .position(|byte| *byte == 0xFF)
                .expect("every batch should be terminated");
            terminator / 2
        })
        .collect();
    assert_eq!(vec![14, 14, 12], pairs_per_report);
    assert!(log.reports().iter().all(|report| report[..3] == [0x00, 0x02, 0x01]));
    Ok(())
}

#[tokio::test]
async fn query_decodes_little_endian_reply() -> anyhow::Result<()> {
    let (mut session, log) = open_session(Some("0500")).await?;

    let reply = macropad_oled::QuerySession::new(&mut session)
        .query(macropad_oled::QueryKind::Brightness)
        .await?;

    assert_eq!(5, reply.value());
    assert_eq!(vec![padded(&[0x00, 0x05, 0x05])], log.reports());
    Ok(())
}

#[tokio::test]
async fn empty_reply_is_a_protocol_error() -> anyhow::Result<()> {
    let (mut session, _log) = open_session(Some("-")).await?;

    let result = macropad_oled::QuerySession::new(&mut session)
        .layer()
        .await;

    assert_matches!(
        result,
        Err(macropad_oled::ProtocolError::Query(error))
            if matches!(*error, macropad_oled::QueryError::EmptyReply)
    );
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn missing_reply_times_out() -> anyhow::Result<()> {
    let (mut session, _log) = open_session(None).await?;

    let result = macropad_oled::QuerySession::new(&mut session)
        .with_timeout(Duration::from_millis(250))
        .max_lines()
        .await;

    assert_matches!(
        result,
        Err(macropad_oled::ProtocolError::Interaction(error))
            if matches!(*error, macropad_oled::InteractionError::ReadTimeout { timeout_ms: 250 })
    );
    Ok(())
}

#[tokio::test]
async fn brightness_outside_byte_range_writes_nothing() -> anyhow::Result<()> {
    let (mut session, log) = open_session(None).await?;

    let rejected = macropad_oled::BrightnessHandler::set_level(&mut session, 256).await;
    macropad_oled::BrightnessHandler::set_level(&mut session, 255).await?;

    assert_matches!(rejected, Err(macropad_oled::ProtocolError::Brightness(_)));
    assert_eq!(vec![padded(&[0x00, 0x04, 0xFF])], log.reports());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn scroll_pass_writes_every_rotation() -> anyhow::Result<()> {
    let (mut session, log) = open_session(None).await?;
    let started = tokio::time::Instant::now();

    let report = macropad_oled::ScrollTextAnimator::scroll(
        &mut session,
        2,
        "Hi",
        macropad_oled::ScrollOptions::default(),
    )
    .await?;

    assert_eq!(22, report.steps_shown());
    assert_eq!(44, log.len());
    assert_eq!(Duration::from_millis(100 * 21), started.elapsed());
    let mut last_line = vec![0x00, 0x01, 0x02];
    last_line.extend_from_slice(format!(" Hi{}", " ".repeat(18)).as_bytes());
    assert_eq!(padded(&last_line), log.reports()[43]);
    Ok(())
}

#[test]
fn opposite_rotations_meet_on_the_same_frames() {
    let text = macropad_oled::ScrollText::new("twenty-one characters", 21);
    let left: Vec<String> = text.frames(macropad_oled::ScrollDirection::Left).collect();
    let right: Vec<String> = text.frames(macropad_oled::ScrollDirection::Right).collect();
    let steps = text.frame_count();

    assert_eq!(26, steps);
    assert_eq!(left[0], right[0]);
    for k in 1..steps {
        assert_eq!(left[steps - k], right[k], "left {} vs right {k}", steps - k);
    }
    let again: Vec<String> = text.frames(macropad_oled::ScrollDirection::Left).collect();
    assert_eq!(left, again);
}

#[tokio::test]
async fn picture_pixels_are_offset_by_origin() -> anyhow::Result<()> {
    let (mut session, log) = open_session(None).await?;
    let image: macropad_oled::PixelImage = "01\n10\n".parse()?;

    macropad_oled::PixelHandler::draw_picture(
        &mut session,
        &image,
        macropad_oled::PixelOffset::new(10, 20),
    )
    .await?;

    assert_eq!(
        vec![padded(&[0x00, 0x02, 0x01, 11, 20, 10, 21, 0xFF])],
        log.reports()
    );
    Ok(())
}

#[tokio::test]
async fn failed_write_surfaces_transport_error() -> anyhow::Result<()> {
    let log = macropad_oled::WriteLog::default();
    let fake_args = macropad_oled::FakeArgs::builder()
        .devices(RAW_HID)?
        .write_log(log.clone())
        .fail_write_at(1)
        .build();
    let profile = macropad_oled::DeviceProfile::builder()
        .vendor_id(0xFEED)
        .product_id(0x0000)
        .build()?;
    let mut session = macropad_oled::SessionHandler::new(
        macropad_oled::fake_hardware_client(fake_args),
        profile,
    )
    .connect_first()
    .await?;

    let result = macropad_oled::LineHandler::write_line(&mut session, 3, "Hi").await;

    assert_matches!(
        result,
        Err(macropad_oled::ProtocolError::Interaction(error))
            if matches!(*error, macropad_oled::InteractionError::WriteFailed { .. })
    );
    assert_eq!(vec![padded(&[0x00, 0x08, 0x03])], log.reports());
    Ok(())
}
