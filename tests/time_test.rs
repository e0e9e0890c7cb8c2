use instant::Duration;
use lab_ngin::time::FrameClock;

#[test]
fn should_measure_frame_delta() {
    let mut clock = FrameClock::new();
    std::thread::sleep(Duration::from_millis(5));
    let dt = clock.tick();
    assert!(dt >= Duration::from_millis(5));
    assert!(clock.elapsed() >= dt);
}

#[test]
fn should_fire_fixed_tick_once_per_period() {
    let mut clock = FrameClock::default();
    let period = Duration::from_millis(5);
    assert!(!clock.tick_due(period));

    std::thread::sleep(Duration::from_millis(6));
    clock.tick();
    assert!(clock.tick_due(period));
    assert!(!clock.tick_due(period));
}
