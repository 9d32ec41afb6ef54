//! Demo showing basic gltoolbox-rs usage.
//!
//! Runs a short headless animation against the recording backend: a lit
//! scene with a few primitives, an orbiting spherical camera driven by the
//! keyboard controller, and a particle spinning around the scene.
//!
//! Run with `RUST_LOG=debug cargo run --example demo` to see the calls.

use gltoolbox::*;
use winit::event::ElementState;
use winit::keyboard::KeyCode;

fn main() -> RenderResult<()> {
    let mut backend = RecordingBackend::new();
    let options = GlOptions {
        lighting: true,
        num_lights: 1,
        ..GlOptions::default()
    };
    let state = init(
        &mut backend,
        &options,
        &LightConfig::default(),
        &ProjectionConfig::default(),
        1280,
        720,
    )?;
    backend.light_position(0, Vec4::new(500.0, 500.0, 1000.0, 1.0));

    // Geometry
    let axes = compile_mesh(&mut backend, &mesh::axes(300.0, false)?);
    let shapes = [
        ("ruby", compile_mesh(&mut backend, &mesh::dodecahedron()?)),
        ("emerald", compile_mesh(&mut backend, &mesh::torus(0.5, 1.0, 20, 30)?)),
        ("gold", compile_mesh(&mut backend, &mesh::icosahedron()?)),
    ];
    let satellite = upload_mesh(&mut backend, &mesh::tetrahedron(1.0)?)?;
    let materials = MaterialRegistry::new();

    // Camera and controls
    let mut camera = CameraSpherical::new(800.0, 45.0, 60.0)?;
    camera.set_name("orbit");
    let mut controller = CameraController::default();
    controller.handle_key(KeyCode::KeyD, ElementState::Pressed);

    // A particle spinning around the scene
    let mut particle = Particle::new(DVec3::new(200.0, 0.0, 0.0)).with_name("satellite");
    particle.set_angular_velocity_axis(Axis::Z, 5.0, true);

    for frame in 0..72 {
        if frame == 36 {
            controller.handle_key(KeyCode::KeyD, ElementState::Released);
            controller.handle_key(KeyCode::KeyN, ElementState::Pressed);
        }
        controller.apply(&mut camera);
        particle.update();

        RenderState::clear(&mut backend);
        camera.place(&mut backend);
        state.without_lighting(&mut backend, |backend| {
            draw_list(backend, axes, &DrawTransform::default());
        });
        for (i, (material, list)) in shapes.iter().enumerate() {
            materials.apply(material, &mut backend, Face::FrontAndBack);
            let offset = (i as f64 - 1.0) * 150.0;
            draw_list(
                &mut backend,
                *list,
                &DrawTransform::at(DVec3::new(offset, 0.0, 0.0))
                    .with_scale(DVec3::splat(40.0))
                    .with_rotation(f64::from(frame) * 5.0, DVec3::Z),
            );
        }
        materials.apply("silver", &mut backend, Face::FrontAndBack);
        draw_buffer(
            &mut backend,
            &satellite,
            &DrawTransform::at(particle.position()).with_scale(DVec3::splat(10.0)),
        );
    }

    println!("{camera}");
    println!("{particle}");
    println!("{} backend calls recorded", backend.commands().len());
    Ok(())
}
