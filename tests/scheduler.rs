mod common;

use common::*;
use freqdrift::run;
use std::time::Duration;
use tokio::sync::mpsc;

/// A command channel preloaded with `lines`. With `hold_open` the sender stays
/// alive so a receive is always pending once the lines are drained.
fn commands(lines: &[&str], hold_open: bool) -> (mpsc::Receiver<String>, Option<mpsc::Sender<String>>) {
    let (tx, rx) = mpsc::channel(lines.len().max(1));
    for line in lines {
        tx.try_send(line.to_string()).unwrap();
    }
    (rx, hold_open.then_some(tx))
}

#[tokio::test(start_paused = true)]
async fn ticks_every_interval_until_shutdown() {
    let (monitor, events, _sink) = monitor(ScriptedCounter::with_frequencies((0..10).map(|i| i as f64)));
    let (commands, _) = commands(&[], false);
    let shutdown = tokio::time::sleep(Duration::from_secs(22));

    let reader = run(monitor, commands, shutdown).await.unwrap();

    // ticks at 0, 5, 10, 15 and 20 s
    assert_eq!(events.renders(), 5);
    assert_eq!(reader.transport().closed, 1);
}

#[tokio::test(start_paused = true)]
async fn operator_commands_apply_between_ticks() {
    let (monitor, events, _sink) = monitor(ScriptedCounter::with_frequencies([1000.0, 990.0]));
    let (commands, _tx) = commands(&["start 100", "", "bogus", "clear", "exit"], true);

    let reader = run(monitor, commands, std::future::pending()).await.unwrap();

    let log = events.snapshot();
    assert_eq!(log.len(), 3, "{log:?}");
    assert!(matches!(log[0], Event::Rendered { index: 0, .. }));
    match &log[1] {
        Event::Armed(target) => {
            assert!((target.frequency_hz - 900.0).abs() < 1e-6);
        }
        other => panic!("expected armed, got {other:?}"),
    }
    assert_eq!(log[2], Event::Cleared);
    assert_eq!(reader.transport().closed, 1);
}

#[tokio::test(start_paused = true)]
async fn closed_command_input_keeps_logging() {
    let (monitor, events, _sink) = monitor(ScriptedCounter::default());
    let (commands, _) = commands(&[], false);
    let shutdown = tokio::time::sleep(Duration::from_secs(61));

    run(monitor, commands, shutdown).await.unwrap();

    // 0, 5, ..., 60 s
    assert_eq!(events.renders(), 13);
}

#[tokio::test(start_paused = true)]
async fn shutdown_wins_over_a_pending_command_read() {
    let (monitor, events, _sink) = monitor(ScriptedCounter::with_frequencies([5.0, 6.0, 7.0]));
    // operator has typed nothing and the input is still open
    let (commands, tx) = commands(&[], true);
    let shutdown = tokio::time::sleep(Duration::from_secs(12));

    let started = tokio::time::Instant::now();
    let reader = run(monitor, commands, shutdown).await.unwrap();

    assert_eq!(started.elapsed(), Duration::from_secs(12));
    assert_eq!(events.renders(), 3);
    assert_eq!(reader.transport().closed, 1);
    // run dropped its end of the channel on the way out
    assert!(tx.unwrap().is_closed());
}
