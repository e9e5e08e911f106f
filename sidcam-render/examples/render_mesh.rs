/// Example: render a mesh from a few camera positions on a circle
///
/// Usage: cargo run --example render_mesh -- [path/to/mesh.obj] [out_dir]
///
/// Each camera is given by its camera-to-world pose, so `set_c2w` is used and
/// the world-to-camera transform is recomputed from it.
use std::env;
use std::error::Error;
use std::path::PathBuf;

use nalgebra::{Matrix3, Vector3};
use sidcam_core::transform::compose;
use sidcam_core::{CameraModel, Mesh};
use sidcam_render::{RenderConfig, Visualiser};

/// Camera-to-world pose of a camera at `eye` looking at the origin, with
/// +y down in the image.
fn look_at_origin(eye: Vector3<f64>) -> nalgebra::Matrix4<f64> {
    let forward = (-eye).normalize();
    let right = Vector3::y().cross(&forward).normalize();
    let down = forward.cross(&right);
    let rotation = Matrix3::from_columns(&[right, down, forward]);
    compose(&rotation, &eye)
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args: Vec<String> = env::args().collect();
    let out_dir = PathBuf::from(args.get(2).map(String::as_str).unwrap_or("."));

    let config = RenderConfig::new(240, 320);
    let mut visualiser = Visualiser::new(config)?;
    match args.get(1) {
        Some(path) => visualiser.add_obj(path, 1.0)?,
        None => {
            eprintln!("No mesh provided, using default cube...");
            visualiser.add_mesh(Mesh::cube(2.0));
        }
    }

    let k = Matrix3::new(300.0, 0.0, 160.0, 0.0, 300.0, 120.0, 0.0, 0.0, 1.0);
    for (i, angle) in [0.0f64, 0.5, 1.0, 1.5].iter().enumerate() {
        let eye = Vector3::new(5.0 * angle.sin(), -1.0, -5.0 * angle.cos());

        let mut camera = CameraModel::new(format!("orbit{i}"));
        camera.set_c2w(look_at_origin(eye))?;
        camera.set_intrinsics(k)?;

        let image = visualiser.render_camera(&camera)?;
        let path = out_dir.join(format!("{}.png", camera.camera_id()));
        image.save_png(&path)?;
        println!("{} -> {} ({} pixels covered)", camera.camera_id(), path.display(), image.coverage());
    }

    Ok(())
}
