//! A live window showing one gauge, redrawn whenever a new value arrives.

use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use bon::Builder;
use pixels::{Pixels, SurfaceTexture};
use winit::dpi::LogicalSize;
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

use crate::error::GaugeError;
use crate::layout::Scene;
use crate::raster::{Canvas, Renderer};
use crate::Gauge;

#[derive(Debug, Clone, Builder)]
pub struct ViewerOptions {
    #[builder(default = "Gauge".to_string())]
    pub title: String,
    #[builder(default = 400)]
    pub window_width: usize,
    #[builder(default = 400)]
    pub window_height: usize,
    #[builder(default = 60.0)]
    pub max_framerate: f64,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Latest value wins: drain everything queued, apply each in order, and
/// report whether anything changed.
fn apply_pending(gauge: &mut Gauge, receiver: &Receiver<f64>) -> bool {
    let mut changed = false;
    while let Ok(raw) = receiver.try_recv() {
        let before = gauge.value();
        let clamped = gauge.set_value(raw);
        if clamped != raw {
            log::debug!("clamped {raw} to {clamped}");
        }
        changed |= clamped != before;
    }
    changed
}

/// Open a window and show `gauge` until it is closed. Values received on
/// `receiver` replace the current value and trigger a full re-layout.
pub fn run(
    mut gauge: Gauge,
    renderer: Renderer,
    options: ViewerOptions,
    receiver: Option<Receiver<f64>>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut scene: Scene = gauge.layout()?;

    let event_loop = EventLoop::new()?;
    let window = WindowBuilder::new()
        .with_title(&options.title)
        .with_inner_size(LogicalSize::new(
            options.window_width as f64,
            options.window_height as f64,
        ))
        .build(&event_loop)?;
    let window = std::sync::Arc::new(window);

    let size = window.inner_size();
    let mut fb_width = size.width as usize;
    let mut fb_height = size.height as usize;
    let surface_texture = SurfaceTexture::new(size.width, size.height, &window);
    let mut pixels = Pixels::new(size.width, size.height, surface_texture)?;

    let frame_duration = Duration::from_secs_f64(1.0 / options.max_framerate.max(1.0));
    let mut last_frame = Instant::now();
    let mut failure: Option<GaugeError> = None;

    log::info!("showing gauge {:?} at value {}", options.title, gauge.value());

    event_loop.run(|event, window_target| {
        window_target.set_control_flow(ControlFlow::Poll);
        match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => {
                    window_target.exit();
                }
                WindowEvent::Resized(new_size) => {
                    if new_size.width == 0 || new_size.height == 0 {
                        return;
                    }
                    fb_width = new_size.width as usize;
                    fb_height = new_size.height as usize;
                    if let Err(err) = pixels.resize_buffer(new_size.width, new_size.height) {
                        log::warn!("failed to resize frame buffer: {err}");
                    }
                    if let Err(err) = pixels.resize_surface(new_size.width, new_size.height) {
                        log::warn!("failed to resize surface: {err}");
                    }
                    window.request_redraw();
                }
                WindowEvent::RedrawRequested => {
                    if let Some(ref receiver) = receiver {
                        if apply_pending(&mut gauge, receiver) {
                            match gauge.layout() {
                                Ok(next) => scene = next,
                                Err(err) => {
                                    log::error!("{err}");
                                    failure = Some(err);
                                    window_target.exit();
                                    return;
                                }
                            }
                        }
                    }

                    let mut canvas = Canvas::new(pixels.frame_mut(), fb_width, fb_height);
                    renderer.render(&scene, &mut canvas);
                    if let Err(err) = pixels.render() {
                        log::error!("render failed: {err}");
                        window_target.exit();
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                if last_frame.elapsed() >= frame_duration {
                    window.request_redraw();
                    last_frame = Instant::now();
                }
            }
            _ => {}
        }
    })?;

    match failure {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}
