//! Basic integration tests for gltoolbox-rs.
//!
//! Everything runs against the recording backend, so no window or GPU is
//! needed.

use gltoolbox::*;
use winit::event::ElementState;
use winit::keyboard::KeyCode;

fn setup() -> (RecordingBackend, RenderState) {
    let mut backend = RecordingBackend::new();
    let options = GlOptions {
        lighting: true,
        num_lights: 2,
        ..GlOptions::default()
    };
    let state = init(
        &mut backend,
        &options,
        &LightConfig::default(),
        &ProjectionConfig::default(),
        800,
        600,
    )
    .expect("init failed");
    (backend, state)
}

/// A full frame: init, place the camera, draw a few lists.
#[test]
fn test_frame() {
    let (mut backend, state) = setup();
    assert!(state.is_lighting_enabled());
    assert_eq!(state.light_count(), 2);
    assert!(backend.is_enabled(Capability::Light(1)));

    let lights = backend
        .commands()
        .iter()
        .filter(|c| matches!(c, Command::Light { .. }))
        .count();
    assert_eq!(lights, 2);

    let aspect = 800.0 / 600.0;
    let expected = DMat4::perspective_rh_gl(60f64.to_radians(), aspect, 10.0, 10000.0);
    assert!(backend.projection().abs_diff_eq(expected, 1e-12));

    let sphere = compile_mesh(&mut backend, &mesh::sphere(10, 20).expect("sphere"));
    let axes = compile_mesh(&mut backend, &mesh::axes(100.0, true).expect("axes"));
    let materials = MaterialRegistry::new();

    let camera = CameraSpherical::new(500.0, 45.0, 45.0).expect("camera");
    RenderState::clear(&mut backend);
    camera.place(&mut backend);
    assert!(backend.model_view().abs_diff_eq(camera.view_matrix(), 1e-9));

    assert!(materials.apply("gold", &mut backend, Face::Front));
    draw_list(
        &mut backend,
        sphere,
        &DrawTransform::at(DVec3::new(0.0, 0.0, 50.0)).with_scale(DVec3::splat(20.0)),
    );
    state.without_lighting(&mut backend, |backend| {
        draw_list(backend, axes, &DrawTransform::default());
    });

    assert_eq!(backend.stack_depth(), 0);
    assert!(backend.is_enabled(Capability::Lighting));
    assert!(backend.model_view().abs_diff_eq(camera.view_matrix(), 1e-9));
}

/// Both cameras can be driven through the same controller.
#[test]
fn test_controller_drives_cameras() {
    let mut controller = CameraController::default();
    let mut cameras: Vec<Box<dyn Camera>> = vec![
        Box::new(CameraSpherical::new(100.0, 0.0, 90.0).expect("spherical")),
        Box::new(
            CameraXyz::new(DVec3::new(100.0, 0.0, 0.0), DVec3::ZERO, DVec3::Z).expect("xyz"),
        ),
    ];

    controller.handle_key(KeyCode::KeyM, ElementState::Pressed);
    for _ in 0..10 {
        for camera in &mut cameras {
            controller.apply(camera.as_mut());
        }
    }
    for camera in &cameras {
        assert!((camera.eye().length() - 110.0).abs() < 1e-9);
    }

    controller.release_all();
    controller.handle_key(KeyCode::PageUp, ElementState::Pressed);
    let mut camera = CameraXyz::new(DVec3::new(0.0, 100.0, 0.0), DVec3::ZERO, DVec3::Z)
        .expect("xyz")
        .with_limits(CenterLimits::symmetric(25.0));
    for _ in 0..5 {
        controller.apply(&mut camera);
    }
    // Two steps of 10 fit under the limit, the third would cross it
    assert_eq!(camera.center().z, 20.0);
}

/// The spherical round trip holds for the eye of a rotated camera.
#[test]
fn test_spherical_camera_round_trip() {
    let mut camera = CameraSpherical::new(250.0, 30.0, 60.0).expect("camera");
    camera.rotate_eye(Axis::Z, 400.0);
    camera.rotate_eye(Axis::Y, 10.0);

    let eye = camera.eye();
    let back = cartesian_to_spherical(eye);
    assert!((back.radius - 250.0).abs() < 1e-9);
    assert!((back.phi - 70.0).abs() < 1e-9);
    assert!((back.theta - 70.0).abs() < 1e-9);
    assert!(spherical_to_cartesian(back.radius, back.phi, back.theta).abs_diff_eq(eye, 1e-9));
}

/// A particle moved by `update` can drive where a list is drawn.
#[test]
fn test_particle_draw_loop() {
    let (mut backend, _) = setup();
    let list = compile_mesh(&mut backend, &mesh::cube().expect("cube"));

    let mut particle = Particle::new(DVec3::ZERO).with_name("box");
    particle.set_velocity_axis(Axis::X, 2.0, true);
    particle.add_property("frames", 0_i64);
    particle.bind("count", true, |p| {
        p.modify_property("frames", 1_i64, Some(PropertyOperator::Add))
            .expect("frames is an integer");
    });

    backend.take_commands();
    for _ in 0..3 {
        particle.update();
        draw_list(&mut backend, list, &DrawTransform::at(particle.position()));
    }

    assert_eq!(particle.position(), DVec3::new(6.0, 0.0, 0.0));
    assert_eq!(
        particle.property("frames").expect("frames"),
        &PropertyValue::Integer(3)
    );
    let last = backend
        .commands()
        .iter()
        .rev()
        .find_map(|c| match c {
            Command::Translate(v) => Some(*v),
            _ => None,
        });
    assert_eq!(last, Some(DVec3::new(6.0, 0.0, 0.0)));
}

/// Options survive a trip through a JSON file and initialize the same state.
#[test]
fn test_options_file() {
    let path = std::env::temp_dir().join("gltoolbox_basics_options.json");
    let options = GlOptions {
        textures: true,
        background_color: Vec4::new(0.1, 0.2, 0.3, 1.0),
        ..GlOptions::default()
    };
    options.save(&path).expect("save");
    let loaded = GlOptions::load(&path).expect("load");
    assert_eq!(loaded, options);

    let mut backend = RecordingBackend::new();
    RenderState::init(&mut backend, &loaded).expect("init");
    assert!(backend.is_enabled(Capability::Texture2D));
    assert_eq!(backend.commands()[0], Command::ClearColor(options.background_color));

    std::fs::remove_file(&path).ok();
}

/// Errors from both crates flow through one error type.
#[test]
fn test_errors() {
    let mut backend = RecordingBackend::new();
    let err = CameraSpherical::new(-1.0, 0.0, 0.0).expect_err("negative radius");
    assert!(matches!(err, ToolboxError::InvalidArgument(_)));

    let err: RenderError = mesh::sphere(1, 1).expect_err("too coarse");
    assert!(matches!(err, RenderError::Core(ToolboxError::InvalidArgument(_))));

    let err = load_texture(&mut backend, "/nonexistent/wood.png", true).expect_err("missing");
    assert!(matches!(err, RenderError::TextureLoadFailed(_)));
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Zooming out and back in through the controller restores the radius.
        #[test]
        fn zoom_out_then_in_restores_radius(radius in 1.0f64..1000.0, steps in 1usize..50) {
            let mut camera = CameraSpherical::new(radius, 45.0, 45.0).unwrap();
            let mut controller = CameraController::default();

            controller.handle_key(KeyCode::KeyM, ElementState::Pressed);
            for _ in 0..steps {
                controller.apply(&mut camera);
            }
            controller.handle_key(KeyCode::KeyM, ElementState::Released);
            controller.handle_key(KeyCode::KeyN, ElementState::Pressed);
            for _ in 0..steps {
                controller.apply(&mut camera);
            }
            prop_assert!((camera.radius() - radius).abs() < 1e-9 * radius);
        }

        /// Held keys never repeat, whatever the press/release order.
        #[test]
        fn held_keys_are_unique(events in prop::collection::vec((0usize..4, any::<bool>()), 0..40)) {
            let keys = [KeyCode::KeyW, KeyCode::KeyS, KeyCode::KeyN, KeyCode::KeyZ];
            let mut controller = CameraController::default();
            for (key, pressed) in events {
                let state = if pressed { ElementState::Pressed } else { ElementState::Released };
                controller.handle_key(keys[key], state);
            }
            let held = controller.held_keys();
            for (i, key) in held.iter().enumerate() {
                prop_assert!(!held[i + 1..].contains(key));
            }
        }
    }
}
