//! The shipped four-message rotation driven through the service loop with
//! mock hardware.

use statusboard::app::classifier::{Channel, IndicatorCommand};
use statusboard::app::events::{AppEvent, RotationCause};
use statusboard::app::messages::standard_catalog;
use statusboard::app::rotation::{ManualAction, RotationController, RotationHandle, WaitOutcome};
use statusboard::app::router::Button;
use statusboard::app::service::{DisplayService, HardwareGuard};
use statusboard::config::DisplayConfig;
use statusboard::error::{Error, SensorError};

use crate::mock_hw::{
    DisplayCall, FixedClock, RecordingDisplay, RecordingIndicator, ScriptedDelay, ScriptedSensor,
    VecSink,
};

type Guarded = HardwareGuard<RecordingDisplay, RecordingIndicator>;
type Service<F> = DisplayService<Guarded, ScriptedDelay<F>, VecSink>;

struct Board {
    display: RecordingDisplay,
    indicator: RecordingIndicator,
}

fn service<F: FnMut(usize, &RotationHandle)>(temps: &[f32], hook: F) -> (Service<F>, Board) {
    let display = RecordingDisplay::default();
    let indicator = RecordingIndicator::default();
    let catalog = standard_catalog(
        FixedClock::monday_afternoon(),
        ScriptedSensor::with_temperatures(temps),
        indicator.clone(),
    )
    .unwrap();
    let config = DisplayConfig::default();
    let mut controller = RotationController::new(
        catalog,
        HardwareGuard::new(display.clone(), indicator.clone()),
        ScriptedDelay::new(hook),
        &config,
    )
    .unwrap();
    let handle = controller.handle();
    controller.delay_mut().handle = Some(handle);
    let svc = DisplayService::new(controller, VecSink::default(), config.tick_interval());
    (svc, Board { display, indicator })
}

#[test]
fn four_cycles_show_every_message_in_order() {
    // Shutdown on the first sleep of the fifth cycle.
    let (mut svc, board) = service(&[-3.0], |call, h| {
        if call == 40 {
            h.request_shutdown();
        }
    });
    assert_eq!(svc.run(), 5);

    assert_eq!(
        board.display.rendered_first_lines(),
        vec!["Happy", "Current Time:", "Temperature:", "Humidity:", "Happy"]
    );
    let calls = board.display.calls.lock().unwrap().clone();
    let DisplayCall::Render(temperature) = &calls[2] else {
        panic!("expected a render, got {:?}", calls[2]);
    };
    assert_eq!(temperature.second(), Some("-3.0C / 26.6F"));
    let DisplayCall::Render(greeting) = &calls[0] else {
        panic!("expected a render, got {:?}", calls[0]);
    };
    assert_eq!(greeting.second(), Some("Monday!"));
    assert_eq!(board.indicator.last(), Some(IndicatorCommand::only(Channel::Blue)));

    let timed = svc
        .sink()
        .events
        .iter()
        .filter(|e| {
            matches!(
                e,
                AppEvent::RotationChanged {
                    cause: RotationCause::Timer,
                    ..
                }
            )
        })
        .count();
    assert_eq!(timed, 4);
}

#[test]
fn sensor_failure_skips_one_message_and_rotation_continues() {
    // No readings queued: the temperature message fails.
    let (mut svc, board) = service(&[], |_, _| {});
    for _ in 0..4 {
        svc.run_cycle();
    }
    assert!(svc.sink().events.contains(&AppEvent::RenderFailed {
        index: 2,
        error: Error::Sensor(SensorError::Timeout),
    }));
    assert_eq!(
        board.display.rendered_first_lines(),
        vec!["Happy", "Current Time:", "Humidity:"]
    );
    // The indicator keeps whatever it showed before the failed read.
    assert_eq!(board.indicator.last(), None);
    assert_eq!(svc.controller().snapshot().index, 0);
}

#[test]
fn press_during_wait_selects_next_render() {
    // Button C (previous) lands during the sixth sleep of the first cycle.
    let (mut svc, board) = service(&[36.5], |call, h| {
        if call == 5 {
            h.apply(Button::C.action());
        }
    });
    let report = svc.run_cycle();
    assert!(report.outcome.is_interrupted());
    assert_eq!(
        svc.sink().events.last(),
        Some(&AppEvent::RotationChanged {
            cause: RotationCause::Button(ManualAction::Previous),
            index: 3,
            paused: false,
        })
    );
    svc.run_cycle();
    assert_eq!(
        board.display.rendered_first_lines(),
        vec!["Happy", "Humidity:"]
    );
}

#[test]
fn paused_rotation_holds_current_message() {
    let (mut svc, board) = service(&[20.0, 20.0], |call, h| {
        // Pause during the first wait, resume twenty-five sleeps later.
        if call == 0 || call == 25 {
            h.apply(Button::B.action());
        }
    });
    let first = svc.run_cycle();
    assert_eq!(
        first.outcome,
        WaitOutcome::Interrupted(ManualAction::TogglePause)
    );
    assert!(svc.controller().snapshot().paused);

    let second = svc.run_cycle();
    assert_eq!(
        second.outcome,
        WaitOutcome::Interrupted(ManualAction::TogglePause)
    );
    assert_eq!(second.advanced, None);
    assert!(!svc.controller().snapshot().paused);
    assert_eq!(board.display.rendered_first_lines(), vec!["Happy", "Happy"]);
}

#[test]
fn dropping_the_controller_blanks_the_hardware() {
    let (svc, board) = service(&[10.0], |_, _| {});
    drop(svc.into_controller());
    assert_eq!(board.display.last(), Some(DisplayCall::Clear));
    assert_eq!(board.indicator.last(), Some(IndicatorCommand::all_off()));
}

#[test]
fn tick_interval_feeds_started_event() {
    let (mut svc, _board) = service(&[], |call, h| {
        if call == 0 {
            h.request_shutdown();
        }
    });
    svc.run();
    assert_eq!(
        svc.sink().events.first(),
        Some(&AppEvent::Started {
            messages: 4,
            interval_ms: 5_000,
        })
    );
}
