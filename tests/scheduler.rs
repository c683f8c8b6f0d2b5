use face_attention::{CancellationToken, FrameScheduler};
use std::time::Duration;

#[tokio::test(start_paused = true)]
async fn cancelled_before_start_runs_nothing() {
    let token = CancellationToken::new();
    token.cancel();

    let mut calls = 0;
    let frames = FrameScheduler::from_fps(60)
        .run(token, |_| {
            calls += 1;
            Ok(())
        })
        .await
        .unwrap();

    assert_eq!(frames, 0);
    assert_eq!(calls, 0);
}

#[tokio::test(start_paused = true)]
async fn cancel_stops_before_next_frame() {
    let token = CancellationToken::new();
    let stop = token.clone();

    let mut seen = Vec::new();
    let frames = FrameScheduler::from_fps(30)
        .run(token, |index| {
            seen.push(index);
            if index == 4 {
                stop.cancel();
            }
            Ok(())
        })
        .await
        .unwrap();

    assert_eq!(frames, 5);
    assert_eq!(seen, vec![0, 1, 2, 3, 4]);
}

#[tokio::test(start_paused = true)]
async fn external_cancel_stops_loop() {
    let token = CancellationToken::new();
    let stop = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(105)).await;
        stop.cancel();
    });

    let frames = FrameScheduler::new(Duration::from_millis(10))
        .run(token, |_| Ok(()))
        .await
        .unwrap();

    // ticks at 0, 10, .., 100
    assert_eq!(frames, 11);
}

#[tokio::test(start_paused = true)]
async fn frame_error_stops_loop() {
    let token = CancellationToken::new();
    let mut calls = 0;

    let result = FrameScheduler::from_fps(60)
        .run(token, |index| {
            calls += 1;
            if index == 2 {
                anyhow::bail!("camera gone");
            }
            Ok(())
        })
        .await;

    assert!(result.is_err());
    assert_eq!(calls, 3);
}

#[test]
fn period_from_fps() {
    assert_eq!(
        FrameScheduler::from_fps(50).period(),
        Duration::from_millis(20)
    );
    assert_eq!(FrameScheduler::from_fps(0).period(), Duration::from_secs(1));
}

#[test]
fn period_is_never_zero() {
    assert_eq!(FrameScheduler::new(Duration::ZERO).period(), Duration::from_nanos(1));
    assert_eq!(
        FrameScheduler::from_fps(2_000_000_000).period(),
        Duration::from_nanos(1)
    );
}

#[tokio::test(start_paused = true)]
async fn huge_fps_still_runs() {
    let token = CancellationToken::new();
    let stop = token.clone();

    let frames = FrameScheduler::from_fps(u32::MAX)
        .run(token, |index| {
            if index == 2 {
                stop.cancel();
            }
            Ok(())
        })
        .await
        .unwrap();

    assert_eq!(frames, 3);
}
