//! Terminal preview
//!
//! Renders the live and motion views side by side using Unicode half-block
//! characters, two image rows per terminal row.

use crate::capture::Frame;
use crate::preview::{PreviewError, PreviewFrames, PreviewSurface, QuitSignal};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use image::{GrayImage, Rgb};
use ratatui::{
    backend::CrosstermBackend,
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Widget},
    Terminal,
};
use std::io::{self, stdout, Stdout};
use std::time::Duration;

/// How long `poll_quit` waits for a key press
const POLL_TIMEOUT: Duration = Duration::from_millis(1);

/// Preview drawn into the terminal's alternate screen
pub struct TerminalPreview {
    terminal: Option<Terminal<CrosstermBackend<Stdout>>>,
}

impl TerminalPreview {
    /// Switch the terminal to raw mode and the alternate screen
    pub fn new() -> Result<Self, PreviewError> {
        enable_raw_mode()?;
        let mut stdout = stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(e.into());
        }
        let terminal = Terminal::new(CrosstermBackend::new(stdout))
            .map_err(|e| PreviewError::Terminal(e.to_string()))?;

        Ok(Self {
            terminal: Some(terminal),
        })
    }
}

impl PreviewSurface for TerminalPreview {
    fn show(&mut self, frames: &PreviewFrames) -> Result<(), PreviewError> {
        let Some(terminal) = self.terminal.as_mut() else {
            return Ok(());
        };

        terminal
            .draw(|f| {
                let area = f.area();
                let [views, help] =
                    Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(area);
                let [live_area, motion_area] =
                    Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
                        .areas(views);

                let live_block = Block::bordered().title(" Live ");
                let live_inner = live_block.inner(live_area);
                f.render_widget(live_block, live_area);
                f.render_widget(FrameWidget::Rgb(&frames.live.image), live_inner);

                let motion_block = Block::bordered().title(" Motion ");
                let motion_inner = motion_block.inner(motion_area);
                f.render_widget(motion_block, motion_area);
                f.render_widget(FrameWidget::Gray(&frames.motion), motion_inner);

                let Rgb([r, g, b]) = frames.live.status.color();
                let status = Labels {
                    status: frames.live.status.label(),
                    status_color: Color::Rgb(r, g, b),
                    timestamp: &frames.live.timestamp,
                };
                f.render_widget(status, live_inner);

                f.render_widget(HelpLine, help);
            })
            .map_err(|e| PreviewError::Terminal(e.to_string()))?;

        Ok(())
    }

    fn poll_quit(&mut self) -> Result<Option<QuitSignal>, PreviewError> {
        if !event::poll(POLL_TIMEOUT)? {
            return Ok(None);
        }

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                return Ok(None);
            }
            // Raw mode swallows SIGINT, so Ctrl+C arrives as a key
            if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                return Ok(Some(QuitSignal::Interrupt));
            }
            if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
                return Ok(Some(QuitSignal::Quit));
            }
        }

        Ok(None)
    }

    fn close(&mut self) {
        if let Some(mut terminal) = self.terminal.take() {
            if let Err(e) = restore(&mut terminal) {
                tracing::warn!("Failed to restore terminal: {}", e);
            }
        }
    }
}

impl Drop for TerminalPreview {
    fn drop(&mut self) {
        self.close();
    }
}

fn restore(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Status label top-left, timestamp bottom-right
struct Labels<'a> {
    status: &'a str,
    status_color: Color,
    timestamp: &'a str,
}

impl Widget for Labels<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let status_style = Style::default()
            .fg(self.status_color)
            .bg(Color::Black)
            .add_modifier(Modifier::BOLD);
        buf.set_string(area.x + 1, area.y, self.status, status_style);

        let width = self.timestamp.chars().count() as u16;
        let x = area.x + area.width.saturating_sub(width + 1);
        let y = area.y + area.height - 1;
        buf.set_string(x, y, self.timestamp, Style::default().fg(Color::White).bg(Color::Black));
    }
}

struct HelpLine;

impl Widget for HelpLine {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_string(
            area.x,
            area.y,
            "'q' quit | Ctrl+C interrupt",
            Style::default().add_modifier(Modifier::DIM),
        );
    }
}

/// An image rendered with half-block characters
enum FrameWidget<'a> {
    Rgb(&'a Frame),
    Gray(&'a GrayImage),
}

impl FrameWidget<'_> {
    fn dimensions(&self) -> (u32, u32) {
        match self {
            FrameWidget::Rgb(frame) => frame.dimensions(),
            FrameWidget::Gray(frame) => frame.dimensions(),
        }
    }

    fn sample(&self, x: u32, y: u32) -> Color {
        match self {
            FrameWidget::Rgb(frame) => {
                let x = x.min(frame.width() - 1);
                let y = y.min(frame.height() - 1);
                let Rgb([r, g, b]) = *frame.get_pixel(x, y);
                Color::Rgb(r, g, b)
            }
            FrameWidget::Gray(frame) => {
                let x = x.min(frame.width() - 1);
                let y = y.min(frame.height() - 1);
                let v = frame.get_pixel(x, y).0[0];
                Color::Rgb(v, v, v)
            }
        }
    }
}

impl Widget for FrameWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (width, height) = self.dimensions();
        if width == 0 || height == 0 || area.width == 0 || area.height == 0 {
            return;
        }

        // Fit while keeping aspect ratio; each cell holds two pixel rows
        let frame_aspect = width as f64 / height as f64;
        let term_width = area.width as f64;
        let term_height = (area.height * 2) as f64;

        let (display_width, display_height) = if term_width / term_height > frame_aspect {
            let w = term_height * frame_aspect;
            (w as u16, area.height)
        } else {
            let h = term_width / frame_aspect;
            (area.width, (h / 2.0) as u16)
        };
        if display_width == 0 || display_height == 0 {
            return;
        }

        let x_offset = area.x + (area.width.saturating_sub(display_width)) / 2;
        let y_offset = area.y + (area.height.saturating_sub(display_height)) / 2;

        let x_scale = width as f64 / display_width as f64;
        let y_scale = height as f64 / (display_height as f64 * 2.0);

        for ty in 0..display_height {
            for tx in 0..display_width {
                let src_x = (tx as f64 * x_scale) as u32;
                let src_y_top = (ty as f64 * 2.0 * y_scale) as u32;
                let src_y_bottom = ((ty as f64 * 2.0 + 1.0) * y_scale) as u32;

                if let Some(cell) = buf.cell_mut((x_offset + tx, y_offset + ty)) {
                    cell.set_char('▀');
                    cell.set_fg(self.sample(src_x, src_y_top));
                    cell.set_bg(self.sample(src_x, src_y_bottom));
                }
            }
        }
    }
}
