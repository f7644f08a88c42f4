use std::sync::mpsc::{Receiver, TryRecvError};

use image::RgbaImage;
use show_image::{create_window, event, ImageInfo, ImageView, WindowOptions, WindowProxy};

use crate::error::{Error, Result};

/// Where finished frames go.
pub trait Surface {
    /// Displays a width x height rgba8 frame, top row first.
    fn present(&mut self, width: u32, height: u32, rgba: &[u8]) -> Result<()>;

    /// Drains pending events without blocking. True if quitting was requested.
    fn poll_quit(&mut self) -> bool;
}

/// Helper, defining exit event to be a window close or an Escape key press.
fn is_exit_event(window_event: event::WindowEvent) -> bool {
    return match window_event {
        event::WindowEvent::CloseRequested(_) | event::WindowEvent::Destroyed(_) => true,
        event::WindowEvent::KeyboardInput(event) => {
            event.input.key_code == Some(event::VirtualKeyCode::Escape) && event.input.state.is_released()
        }
        _ => false,
    };
}

/// A window, showing every presented frame.
///
/// Must be created from inside the context started by `#[show_image::main]`.
pub struct WindowSurface {
    window: WindowProxy,
    event_channel: Receiver<event::WindowEvent>,
}

impl WindowSurface {
    pub fn new(title: &str, width: u32, height: u32) -> Result<Self> {
        let window_options = WindowOptions {
            size: Some([width, height]),
            ..Default::default()
        };
        let window = create_window(title, window_options).map_err(|e| Error::Window(e.to_string()))?;
        let event_channel = window.event_channel().map_err(|e| Error::Window(e.to_string()))?;
        log::info!("created window \"{}\" of {}x{}", title, width, height);
        return Ok(Self { window, event_channel });
    }
}

impl Surface for WindowSurface {
    fn present(&mut self, width: u32, height: u32, rgba: &[u8]) -> Result<()> {
        let image_data = ImageView::new(ImageInfo::rgba8(width, height), rgba);
        return self.window
            .set_image("frame", image_data)
            .map_err(|e| Error::Window(e.to_string()));
    }

    fn poll_quit(&mut self) -> bool {
        // Unloading everything that has piled up since the last frame.
        let mut quit = false;
        loop {
            match self.event_channel.try_recv() {
                Ok(window_event) => quit |= is_exit_event(window_event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    quit = true;
                    break;
                }
            }
        }
        return quit;
    }
}

/// Off-screen surface keeping the last presented frame.
#[derive(Debug, Default)]
pub struct HeadlessSurface {
    last_frame: Option<RgbaImage>,
    frames_presented: usize,
    quit_requested: bool,
}

impl HeadlessSurface {
    pub fn new() -> Self {
        return Self::default();
    }

    pub fn last_frame(&self) -> Option<&RgbaImage> {
        return self.last_frame.as_ref();
    }

    pub fn frames_presented(&self) -> usize {
        return self.frames_presented;
    }

    /// Makes the next poll report a quit request.
    pub fn request_quit(&mut self) {
        self.quit_requested = true;
    }
}

impl Surface for HeadlessSurface {
    fn present(&mut self, width: u32, height: u32, rgba: &[u8]) -> Result<()> {
        let frame = RgbaImage::from_raw(width, height, rgba.to_vec()).ok_or_else(|| {
            Error::Window(format!("{} bytes do not make a {}x{} rgba8 frame", rgba.len(), width, height))
        })?;
        self.last_frame = Some(frame);
        self.frames_presented += 1;
        return Ok(());
    }

    fn poll_quit(&mut self) -> bool {
        return std::mem::take(&mut self.quit_requested);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headless_keeps_last_frame() {
        let mut surface = HeadlessSurface::new();
        surface.present(1, 1, &[1, 2, 3, 4]).unwrap();
        surface.present(2, 1, &[5, 6, 7, 8, 9, 10, 11, 12]).unwrap();
        assert_eq!(surface.frames_presented(), 2);
        assert_eq!(surface.last_frame().unwrap().get_pixel(1, 0).0, [9, 10, 11, 12]);
        assert!(surface.present(2, 2, &[0; 4]).is_err());
    }

    #[test]
    fn headless_quit_is_reported_once() {
        let mut surface = HeadlessSurface::new();
        assert!(!surface.poll_quit());
        surface.request_quit();
        assert!(surface.poll_quit());
        assert!(!surface.poll_quit());
    }
}
