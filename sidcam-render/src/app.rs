/// Interactive terminal viewer: spins the scene object in front of a camera
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal,
};
use nalgebra::{Matrix3, Vector3};
use sidcam_core::transform::translation;
use sidcam_core::{CameraModel, Mesh, RotationState};
use std::io::{stdout, Write};
use std::time::{Duration, Instant};

use crate::config::RenderConfig;
use crate::error::RenderResult;
use crate::visualiser::Visualiser;

/// Terminal cells are roughly twice as tall as they are wide.
const CELL_ASPECT: f64 = 0.5;

/// Main application struct for terminal rendering
pub struct TerminalApp {
    mesh: Mesh,
    rotation: RotationState,
    camera: CameraModel,
    visualiser: Visualiser,
    running: bool,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    /// Create a viewer sized to the current terminal. The camera's pose is
    /// kept; its intrinsics are replaced to fit the terminal grid.
    pub fn new(mesh: Mesh, config: RenderConfig, camera: Option<CameraModel>) -> RenderResult<Self> {
        let (width, height) = terminal::size()?;
        // top row is the status line
        let rows = u32::from(height.saturating_sub(1)).max(1);
        let cols = u32::from(width).max(1);

        let config = RenderConfig {
            image_height: rows,
            image_width: cols,
            ..config
        };
        let mut camera = match camera {
            Some(camera) => camera,
            None => {
                let mut camera = CameraModel::new("terminal");
                camera.set_w2c(translation(0.0, 0.0, 5.0))?;
                camera.derive_c2w()?;
                camera
            }
        };
        camera.set_intrinsics(terminal_intrinsics(cols, rows))?;

        Ok(Self {
            mesh,
            rotation: RotationState::new(0.3, 0.3, 0.0),
            camera,
            visualiser: Visualiser::new(config)?,
            running: true,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        })
    }

    pub fn run(&mut self) -> RenderResult<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> RenderResult<()> {
        let target_frame_time = Duration::from_millis(1000 / 30); // 30 FPS target

        while self.running {
            let frame_start = Instant::now();

            if event::poll(Duration::from_millis(0))? {
                self.handle_input()?;
            }

            self.update();
            self.render()?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    fn handle_input(&mut self) -> RenderResult<()> {
        if let Event::Key(KeyEvent { code, .. }) = event::read()? {
            match code {
                KeyCode::Char('q') | KeyCode::Esc => self.running = false,
                KeyCode::Char('w') | KeyCode::Up => self.rotation.rotate(0.1, 0.0, 0.0),
                KeyCode::Char('s') | KeyCode::Down => self.rotation.rotate(-0.1, 0.0, 0.0),
                KeyCode::Char('a') | KeyCode::Left => self.rotation.rotate(0.0, -0.1, 0.0),
                KeyCode::Char('d') | KeyCode::Right => self.rotation.rotate(0.0, 0.1, 0.0),
                KeyCode::Char('e') => self.rotation.rotate(0.0, 0.0, 0.1),
                KeyCode::Char('r') => self.rotation.rotate(0.0, 0.0, -0.1),
                _ => {}
            }
        }
        Ok(())
    }

    fn update(&mut self) {
        // Continuous slow rotation
        self.rotation.rotate(0.01, 0.015, 0.0);
    }

    fn render(&mut self) -> RenderResult<()> {
        self.visualiser.clear();
        self.visualiser.add_mesh(self.mesh.clone());
        self.visualiser
            .transform_obj(&self.rotation.matrix().cast::<f64>(), &Vector3::zeros())?;
        let image = self.visualiser.render_camera(&self.camera)?;

        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 1))?;
        image.draw_ascii(&mut stdout)?;

        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "sidcam | camera {} | FPS: {:.1} | WASD/Arrows=Rotate E/R=Roll Q=Quit",
                self.camera.camera_id(),
                self.fps
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}

/// Pinhole intrinsics for a terminal grid, compensating for tall cells.
pub fn terminal_intrinsics(cols: u32, rows: u32) -> Matrix3<f64> {
    let width = f64::from(cols);
    let height = f64::from(rows);
    let fx = width.min(height / CELL_ASPECT);
    let fy = fx * CELL_ASPECT;
    Matrix3::new(fx, 0.0, width / 2.0, 0.0, fy, height / 2.0, 0.0, 0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_intrinsics() {
        let k = terminal_intrinsics(160, 48);
        assert_eq!(k[(0, 0)], 96.0);
        assert_eq!(k[(1, 1)], 48.0);
        assert_eq!(k[(0, 2)], 80.0);
        assert_eq!(k[(1, 2)], 24.0);
        assert_eq!(k[(2, 2)], 1.0);
    }
}
