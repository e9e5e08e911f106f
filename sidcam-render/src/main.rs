/// sidcam-view - render a mesh from a camera's parameters
///
/// Without `--output` the image is drawn in the terminal. With
/// `--interactive` the object spins in front of the camera:
///   - WASD / Arrow Keys: Rotate the object
///   - E/R: Roll rotation
///   - Q/ESC: Quit
use std::error::Error;
use std::fs;
use std::io::{stdout, Write};
use std::path::{Path, PathBuf};

use clap::Parser;
use sidcam_core::{CameraModel, CameraParams, Mesh};
use sidcam_render::{RenderConfig, TerminalApp, Visualiser};

#[derive(Debug, Parser)]
#[command(author, version, about = "Render a mesh from camera parameters")]
struct Args {
    /// Mesh file (.obj or .stl). A 2-unit cube is used if omitted.
    #[arg(long)]
    mesh: Option<PathBuf>,

    /// Vertices are divided by this factor after loading.
    #[arg(long, default_value_t = 1.0)]
    verts_scale: f32,

    /// JSON file with camera parameters (id, w2c, c2w, intrinsics).
    #[arg(long)]
    camera: Option<PathBuf>,

    /// JSON render configuration. Defaults are used if omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the render to this PNG file instead of the terminal.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Run the interactive terminal viewer.
    #[arg(long)]
    interactive: bool,
}

fn load_camera(path: &Path) -> Result<CameraModel, Box<dyn Error>> {
    let data = fs::read_to_string(path)?;
    let params: CameraParams = serde_json::from_str(&data)?;
    Ok(CameraModel::from_params(&params)?)
}

fn main() {
    env_logger::init();
    if let Err(err) = try_main() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => RenderConfig::from_json_file(path)?,
        None => RenderConfig::default(),
    };
    let camera = args.camera.as_deref().map(load_camera).transpose()?;

    let mut visualiser = Visualiser::new(config.clone())?;
    match &args.mesh {
        Some(path) => visualiser.add_obj(path, args.verts_scale)?,
        None => visualiser.add_mesh(Mesh::cube(2.0).scaled_down(args.verts_scale)?),
    }

    if args.interactive {
        let mesh = visualiser.scene_objects()[0].clone();
        let mut app = TerminalApp::new(mesh, config, camera)?;
        app.run()?;
        return Ok(());
    }

    let camera = match camera {
        Some(camera) => camera,
        None => visualiser.default_camera("default")?,
    };
    let image = visualiser.render_camera(&camera)?;

    match &args.output {
        Some(path) => image.save_png(path)?,
        None => {
            let mut stdout = stdout();
            image.draw_ascii(&mut stdout)?;
            writeln!(stdout)?;
            stdout.flush()?;
        }
    }
    Ok(())
}
