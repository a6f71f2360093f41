use std::path::Path;

use ggshape::{
    core::{
        prelude::*,
        render::{recording_handle, RecordingBinder, RecordingVertexBuffer},
    },
    util::setup_log,
};

const FRAMES: usize = 12;

fn load_config() -> Result<GeomConfig> {
    match std::env::args().nth(1) {
        Some(path) => {
            let text = std::fs::read_to_string(Path::new(&path))
                .with_context(|| format!("failed to read {path}"))?;
            GeomConfig::from_toml_str(&text)
        }
        None => Ok(GeomConfig::default()),
    }
}

/// Three triangular "circles" turning to follow a target that sweeps around the viewport.
fn run_pointing(config: &GeomConfig) -> Result<Vec<Shape>> {
    let owner = RecordingVertexBuffer::shared(config.max_vertex_buffer_floats);
    let tint = Colour::from_rgba_slice(&[0.9, 0.5, 0.2, 1.0])?;
    let mut pointers = [0.0, 0.5, -0.5]
        .into_iter()
        .map(|y| {
            Shape::circle_with_sides(NdCoords::new(0.0, y), 0.1, 3, config.viewport)?
                .with_vertex_buffer(recording_handle(&owner))
                .map(|shape| shape.with_tint(tint))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut binder = RecordingBinder::default();
    #[allow(clippy::cast_precision_loss)]
    for frame in 0..FRAMES {
        let theta = std::f32::consts::TAU * frame as f32 / FRAMES as f32;
        let target = NdCoords::new(0.8 * theta.cos(), 0.8 * theta.sin());
        for pointer in &mut pointers {
            pointer.point_to(target, 0.0)?;
            pointer.draw(&mut binder, config.camera)?;
        }
        debug!(
            "frame {frame}: target {target}, local angles [{}]",
            pointers
                .iter()
                .map(|p| format!("{:.3}", p.local_angle()))
                .join(", ")
        );
    }
    // The lead pointer once more, textured.
    pointers[0].draw_with_texture(&mut binder, TextureId(1), config.camera)?;
    info!(
        "pointing: {} binder calls, {} vertex uploads",
        binder.calls().len(),
        owner.borrow().upload_count()
    );
    Ok(pointers)
}

fn run_collisions(config: &GeomConfig, pointers: &mut [Shape]) -> Result<()> {
    let viewport = config.viewport;
    let mut wall = Shape::rect(NdCoords::new(-0.05, 0.9), 0.1, 1.8, viewport)?;
    let mut ball =
        Shape::circle_with_sides(NdCoords::new(0.3, 0.0), 0.15, config.circle_sides, viewport)?;
    let mut spinner = Shape::polygon(
        vec![
            NdCoords::new(0.6, 0.2),
            NdCoords::new(0.8, 0.1),
            NdCoords::new(0.7, -0.2),
            NdCoords::new(0.5, -0.1),
        ],
        viewport,
    )?;

    for (i, pointer) in pointers.iter_mut().enumerate() {
        info!(
            "pointer {i} at {}: wall {}, ball {}",
            pointer.center(),
            pointer.collides(&mut wall)?,
            pointer.collides(&mut ball)?
        );
    }
    for step in 0..8 {
        info!(
            "step {step}: ball {} spinner {}",
            ball.center(),
            if ball.collides(&mut spinner)? { "hit" } else { "clear" }
        );
        ball.shift(0.05, 0.0)?;
        spinner.rotate_local(0.2)?;
    }
    let corner = spinner.vertices()[0];
    check!(spinner.collides_point(corner)?);
    info!(
        "spinner: axis angle {:.3}, local angle {:.3}",
        spinner.axis_angle(),
        spinner.local_angle()
    );
    Ok(())
}

fn main() -> Result<()> {
    setup_log(None)?;
    let config = load_config()?;
    info!("config:\n{}", config.to_toml_string()?);
    let mut pointers = run_pointing(&config)?;
    run_collisions(&config, &mut pointers)?;
    Ok(())
}
