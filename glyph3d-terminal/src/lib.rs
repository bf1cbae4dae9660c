/// Terminal front end for the glyph viewer and the function bar chart
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        MouseButton, MouseEvent, MouseEventKind,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, ClearType},
};
use glyph3d_core::chart::format_value;
use glyph3d_core::{AppConfig, Axis, Chart, Scene, ShapeId};
use log::{debug, warn};
use std::io::{self, stdout, Write};
use std::time::Duration;

pub mod renderer;

pub use renderer::{AsciiRenderer, CELL_HEIGHT_PX, CELL_WIDTH_PX};

/// Pixels of simulated drag per arrow key press
const KEY_DRAG_PX: f64 = 10.0;
/// Wheel delta of one scroll notch
const WHEEL_NOTCH: f64 = 120.0;
/// Width change per `[` / `]` press
const WIDTH_STEP: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Viewer,
    Chart,
}

impl Mode {
    fn toggled(self) -> Self {
        match self {
            Mode::Viewer => Mode::Chart,
            Mode::Chart => Mode::Viewer,
        }
    }
}

/// Main application struct for the terminal front end
pub struct TerminalApp {
    scene: Scene,
    chart: Chart,
    mode: Mode,
    selected: ShapeId,
    renderer: AsciiRenderer,
    drag_origin: Option<(u16, u16)>,
    running: bool,
    dirty: bool,
}

impl TerminalApp {
    pub fn new(config: &AppConfig, mode: Mode) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        Ok(Self::with_size(config, mode, width, height))
    }

    /// Build the app for a terminal of `columns` x `rows` cells.
    pub fn with_size(config: &AppConfig, mode: Mode, columns: u16, rows: u16) -> Self {
        let renderer = AsciiRenderer::new(columns as usize, rows as usize);
        let mut scene = Scene::from_config(&config.viewer);
        let viewport = renderer.viewport();
        scene.set_viewport(viewport.width, viewport.height);

        Self {
            scene,
            chart: Chart::from_config(&config.chart),
            mode,
            selected: ShapeId(0),
            renderer,
            drag_origin: None,
            running: true,
            dirty: true,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn chart(&self) -> &Chart {
        &self.chart
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn selected(&self) -> ShapeId {
        self.selected
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            stdout(),
            terminal::EnterAlternateScreen,
            cursor::Hide,
            EnableMouseCapture
        )?;

        let result = self.main_loop();

        // Cleanup
        execute!(
            stdout(),
            DisableMouseCapture,
            terminal::LeaveAlternateScreen,
            cursor::Show
        )?;
        terminal::disable_raw_mode()?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let target_frame_time = Duration::from_millis(1000 / 30); // 30 FPS target

        while self.running {
            if event::poll(target_frame_time)? {
                let event = event::read()?;
                self.handle_event(event);
            }

            if self.dirty {
                self.render()?;
                self.dirty = false;
            }
        }

        Ok(())
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Resize(columns, rows) => self.resize(columns, rows),
            _ => {}
        }
    }

    fn resize(&mut self, columns: u16, rows: u16) {
        debug!("terminal resized to {columns}x{rows}");
        self.renderer.resize(columns as usize, rows as usize);
        let viewport = self.renderer.viewport();
        self.scene.set_viewport(viewport.width, viewport.height);
        self.dirty = true;
    }

    fn handle_key(&mut self, KeyEvent { code, .. }: KeyEvent) {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.running = false,
            KeyCode::Tab => {
                self.mode = self.mode.toggled();
                self.drag_origin = None;
            }
            _ => match self.mode {
                Mode::Viewer => self.handle_viewer_key(code),
                Mode::Chart => self.handle_chart_key(code),
            },
        }
        self.dirty = true;
    }

    fn handle_viewer_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('w') | KeyCode::Up => self.scene.camera_rotate(0.0, -KEY_DRAG_PX),
            KeyCode::Char('s') | KeyCode::Down => self.scene.camera_rotate(0.0, KEY_DRAG_PX),
            KeyCode::Char('a') | KeyCode::Left => self.scene.camera_rotate(-KEY_DRAG_PX, 0.0),
            KeyCode::Char('d') | KeyCode::Right => self.scene.camera_rotate(KEY_DRAG_PX, 0.0),
            KeyCode::Char('+') | KeyCode::Char('=') => self.scene.camera_zoom(-WHEEL_NOTCH),
            KeyCode::Char('-') => self.scene.camera_zoom(WHEEL_NOTCH),
            KeyCode::Char('r') => self.scene.camera_reset(),
            KeyCode::Char(digit @ '1'..='9') => {
                let index = digit as usize - '1' as usize;
                if index < self.scene.shapes().len() {
                    self.selected = ShapeId(index);
                }
            }
            KeyCode::Char('x') => {
                if let Err(err) = self.scene.shape_reset(self.selected) {
                    warn!("{err}");
                }
            }
            KeyCode::Char('[') => self.nudge_width(-WIDTH_STEP),
            KeyCode::Char(']') => self.nudge_width(WIDTH_STEP),
            _ => {}
        }
    }

    fn nudge_width(&mut self, delta: f64) {
        match self.scene.shape_mut(self.selected) {
            Ok(shape) => {
                let width = (shape.size().width + delta).max(1.0);
                shape.set_dimension(Axis::X, width);
            }
            Err(err) => warn!("{err}"),
        }
    }

    fn handle_chart_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('<') | KeyCode::Char(',') => {
                let step = self.chart.step() / 2.0;
                self.chart.set_step(step);
            }
            KeyCode::Char('>') | KeyCode::Char('.') => {
                let step = self.chart.step() * 2.0;
                self.chart.set_step(step);
            }
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        if self.mode != Mode::Viewer {
            return;
        }

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.drag_origin = Some((mouse.column, mouse.row));
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if let Some((column, row)) = self.drag_origin {
                    let dx = (mouse.column as f64 - column as f64) * CELL_WIDTH_PX;
                    let dy = (mouse.row as f64 - row as f64) * CELL_HEIGHT_PX;
                    self.scene.camera_rotate(dx, dy);
                    self.dirty = true;
                }
                self.drag_origin = Some((mouse.column, mouse.row));
            }
            MouseEventKind::Up(MouseButton::Left) => self.drag_origin = None,
            MouseEventKind::ScrollUp => {
                self.scene.camera_zoom(WHEEL_NOTCH);
                self.dirty = true;
            }
            MouseEventKind::ScrollDown => {
                self.scene.camera_zoom(-WHEEL_NOTCH);
                self.dirty = true;
            }
            _ => {}
        }
    }

    /// Redraw the character buffer for the current mode.
    pub fn compose(&mut self) {
        self.renderer.clear();
        match self.mode {
            Mode::Viewer => {
                self.renderer.draw_axes(&self.scene.render_axes());
                self.renderer
                    .draw_segments(&self.scene.render_frame(), Color::Cyan);
            }
            Mode::Chart => {
                let frame = self.chart.layout(self.renderer.chart_plot());
                self.renderer.render_chart(&frame);
            }
        }
    }

    fn status_line(&self) -> String {
        match self.mode {
            Mode::Viewer => {
                let camera = &self.scene.camera;
                let shape = self
                    .scene
                    .shape(self.selected)
                    .map(|s| format!("{} {:.0}x{:.0}x{:.0}", s.tag(), s.size().width, s.size().height, s.size().depth))
                    .unwrap_or_else(|_| "-".to_string());
                format!(
                    "Viewer | cam z {:.0} rot ({:.0}, {:.0}) | shape {} | drag/WASD rotate, wheel/+- zoom, r reset, 1-2 select, x reset shape, [] width, Tab chart, q quit",
                    camera.position.z, camera.rotation.x, camera.rotation.y, shape
                )
            }
            Mode::Chart => {
                let bounds = self.chart.bounds();
                let legend: Vec<_> = self.chart.functions().map(|f| f.name.clone()).collect();
                format!(
                    "Chart | step {} | y [{}, {}] | {} | </> step, Tab viewer, q quit",
                    format_value(self.chart.step()),
                    format_value(bounds.min),
                    format_value(bounds.max),
                    legend.join(", ")
                )
            }
        }
    }

    fn render(&mut self) -> io::Result<()> {
        self.compose();

        let mut stdout = stdout();
        queue!(stdout, terminal::Clear(ClearType::All))?;
        self.renderer.draw(&mut stdout)?;

        // Draw UI overlay
        let status: String = self.status_line().chars().take(self.renderer.width()).collect();
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(status),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}
