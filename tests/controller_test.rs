use cgmath::InnerSpace;
use instant::Duration;
use lab_ngin::{
    PhysicalPosition, WindowEvent,
    camera::{Camera, Movement},
    controller::CameraController,
    math::Vec3,
};
use winit::{
    event::{ElementState, MouseScrollDelta},
    keyboard::KeyCode,
};

#[test]
fn should_map_movement_keys() {
    let mut controller = CameraController::new();
    let bindings = [
        (KeyCode::KeyW, Movement::Forward),
        (KeyCode::KeyS, Movement::Backward),
        (KeyCode::KeyA, Movement::Left),
        (KeyCode::KeyD, Movement::Right),
        (KeyCode::Space, Movement::Up),
        (KeyCode::ShiftLeft, Movement::Down),
    ];
    for (key, movement) in bindings {
        assert!(controller.process_keyboard(key, ElementState::Pressed));
        assert!(controller.is_held(movement));
        assert!(controller.process_keyboard(key, ElementState::Released));
        assert!(!controller.is_held(movement));
    }
    assert!(!controller.process_keyboard(KeyCode::KeyT, ElementState::Pressed));
}

#[test]
fn should_move_camera_while_key_held() {
    let mut controller = CameraController::new();
    let mut camera = Camera::default();
    controller.process_keyboard(KeyCode::KeyW, ElementState::Pressed);

    controller.update(&mut camera, Duration::from_millis(200));
    assert!((camera.position - Vec3::new(0.0, 0.0, 9.0)).magnitude() < 1e-4);

    controller.update(&mut camera, Duration::from_millis(200));
    assert!((camera.position - Vec3::new(0.0, 0.0, 8.0)).magnitude() < 1e-4);

    controller.process_keyboard(KeyCode::KeyW, ElementState::Released);
    controller.update(&mut camera, Duration::from_millis(200));
    assert!((camera.position - Vec3::new(0.0, 0.0, 8.0)).magnitude() < 1e-4);
}

#[test]
fn should_ignore_first_cursor_sample() {
    let mut controller = CameraController::new();
    let mut camera = Camera::default();

    controller.handle_cursor(PhysicalPosition::new(400.0, 300.0));
    controller.update(&mut camera, Duration::from_millis(16));
    assert_eq!(camera.yaw(), -90.0);
    assert_eq!(camera.pitch(), 0.0);

    // Moving the cursor up-right turns right and looks up.
    controller.handle_cursor(PhysicalPosition::new(450.0, 250.0));
    controller.update(&mut camera, Duration::from_millis(16));
    assert!((camera.yaw() - -85.0).abs() < 1e-4);
    assert!((camera.pitch() - 5.0).abs() < 1e-4);
}

#[test]
fn should_consume_look_delta_once() {
    let mut controller = CameraController::new();
    let mut camera = Camera::default();
    controller.handle_mouse(100.0, 0.0);
    controller.update(&mut camera, Duration::from_millis(16));
    controller.update(&mut camera, Duration::from_millis(16));
    assert!((camera.yaw() - -80.0).abs() < 1e-4);
}

#[test]
fn should_zoom_on_scroll() {
    let mut controller = CameraController::new();
    let mut camera = Camera::default();
    controller.handle_scroll(&MouseScrollDelta::LineDelta(0.0, 2.0));
    controller.update(&mut camera, Duration::from_millis(16));
    assert_eq!(camera.zoom(), 43.0);

    controller.handle_scroll(&MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, -60.0)));
    controller.update(&mut camera, Duration::from_millis(16));
    assert_eq!(camera.zoom(), 46.0);
}

#[test]
fn should_turn_with_held_arrow_keys() {
    let mut controller = CameraController::new();
    let mut camera = Camera::default();
    let start = camera.position;
    assert!(controller.process_keyboard(KeyCode::ArrowRight, ElementState::Pressed));
    assert!(controller.process_keyboard(KeyCode::ArrowUp, ElementState::Pressed));
    assert!(controller.is_turning(KeyCode::ArrowRight));
    assert!(!controller.is_held(Movement::Forward));

    // 100 units/s for half a second, scaled by the 0.1 sensitivity.
    controller.update(&mut camera, Duration::from_millis(500));
    assert!((camera.yaw() - -85.0).abs() < 1e-4);
    assert!((camera.pitch() - 5.0).abs() < 1e-4);
    assert_eq!(camera.position, start);

    controller.process_keyboard(KeyCode::ArrowRight, ElementState::Released);
    controller.process_keyboard(KeyCode::ArrowUp, ElementState::Released);
    controller.process_keyboard(KeyCode::ArrowLeft, ElementState::Pressed);
    controller.process_keyboard(KeyCode::ArrowDown, ElementState::Pressed);
    controller.update(&mut camera, Duration::from_millis(500));
    assert!((camera.yaw() - -90.0).abs() < 1e-4);
    assert!(camera.pitch().abs() < 1e-4);
}

#[test]
fn should_release_keys_on_focus_loss() {
    let mut controller = CameraController::new();
    controller.process_keyboard(KeyCode::KeyA, ElementState::Pressed);
    controller.process_keyboard(KeyCode::Space, ElementState::Pressed);
    controller.process_keyboard(KeyCode::ArrowLeft, ElementState::Pressed);

    assert!(!controller.handle_window_events(&WindowEvent::Focused(false)));
    assert!(!controller.is_turning(KeyCode::ArrowLeft));
    assert!(!controller.is_held(Movement::Left));
    assert!(!controller.is_held(Movement::Up));
}
