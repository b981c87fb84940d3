// main.rs — window, event loop and UI for the hotspot panorama viewer

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod camera;
mod config;
mod fonts;
mod hotspot;
mod i18n;
mod input;
mod mesh;
mod orientation;
mod panorama;
mod renderer;
mod tooltip;
mod zoom;

use clap::Parser as _;
use config::{Args, Variant, ViewerConfig};
use input::{InputEvent, PointerTracker};
use panorama::PanoramaViewer;
use renderer::Renderer;

use anyhow::Context as _;
use egui::{Color32, RichText};
use image::io::Reader as ImageReader;
use image::GenericImageView;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Sender};
use std::thread;
use std::time::Instant;
use winit::{
    dpi::LogicalSize,
    event::*,
    event_loop::{ControlFlow, EventLoop},
    window::{Fullscreen, Window, WindowBuilder},
};

const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "bmp"];

type LoadResult = anyhow::Result<image::RgbaImage>;

/// Transient UI flags and FPS bookkeeping.
struct UiState {
    show_fps: bool,
    vsync: bool,
    is_loading: bool,
    is_fullscreen: bool,
    fps: f32,
    frame_count: u32,
    fps_window_start: Instant,
}

/// Requests raised by the UI during one frame, applied after rendering.
#[derive(Default)]
struct UiActions {
    open: Option<PathBuf>,
    quit: bool,
    toggle_fullscreen: bool,
    vsync_changed: bool,
    lang_changed: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        log::error!("{e:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let args = Args::parse();
    let mut current_lang = i18n::resolve_lang(args.lang.as_deref());
    i18n::init(current_lang.clone());

    let config = ViewerConfig::load(&args)?;
    log::info!("starting {:?} viewer with {} hotspots", config.variant, config.hotspots.len());

    let event_loop = EventLoop::new();
    let window = WindowBuilder::new()
        .with_title(i18n::tr("app.title"))
        .with_inner_size(LogicalSize::new(1280, 720))
        .build(&event_loop)
        .context("creating window")?;

    let mut ui = UiState {
        show_fps: false,
        vsync: true,
        is_loading: true,
        is_fullscreen: false,
        fps: 0.0,
        frame_count: 0,
        fps_window_start: Instant::now(),
    };

    let mut renderer = Some(pollster::block_on(Renderer::new(&window, ui.vsync))?);
    let size = window.inner_size();
    let mut viewer = PanoramaViewer::new(
        &config,
        size.width as f32,
        size.height as f32,
        Instant::now(),
    );
    let mut pointer = PointerTracker::default();

    let (tx, rx) = channel::<LoadResult>();
    match config.initial_image() {
        Some(path) => start_load_image(path.to_owned(), tx.clone()),
        None => {
            log::warn!(
                "{}",
                i18n::tr_with("log.image_missing", &[("path", config.image.display().to_string())])
            );
            match pick_image() {
                Some(path) => start_load_image(path, tx.clone()),
                None => ui.is_loading = false,
            }
        }
    }

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Poll;

        // torn down; wait for the loop to exit
        let Some(r) = renderer.as_mut() else {
            *control_flow = ControlFlow::Exit;
            return;
        };

        if let Ok(result) = rx.try_recv() {
            ui.is_loading = false;
            match result {
                Ok(rgba) => r.load_panorama(rgba),
                Err(e) => log::error!("{e:#}"),
            }
        }

        match event {
            Event::WindowEvent { event, .. } => {
                let consumed = r.egui_state.on_event(&r.egui_ctx, &event).consumed;
                let now = Instant::now();

                match event {
                    WindowEvent::CloseRequested => {
                        teardown(&mut viewer, &mut renderer, control_flow);
                    }

                    WindowEvent::Resized(new_size) => {
                        r.resize(new_size);
                        viewer.handle(resize_event(new_size), now);
                    }

                    WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                        r.resize(*new_inner_size);
                        viewer.handle(resize_event(*new_inner_size), now);
                    }

                    WindowEvent::KeyboardInput { input, .. } if !consumed => {
                        if input.state != ElementState::Pressed {
                            return;
                        }
                        match input.virtual_keycode {
                            Some(VirtualKeyCode::O) => {
                                if let Some(path) = pick_image() {
                                    ui.is_loading = true;
                                    start_load_image(path, tx.clone());
                                }
                            }
                            Some(VirtualKeyCode::F11) => toggle_fullscreen(&window, &mut ui),
                            Some(VirtualKeyCode::Equals | VirtualKeyCode::Plus) => viewer.zoom_in(),
                            Some(VirtualKeyCode::Minus) => viewer.zoom_out(),
                            _ => {}
                        }
                    }

                    WindowEvent::MouseInput {
                        state,
                        button: MouseButton::Left,
                        ..
                    } => match state {
                        ElementState::Pressed if !consumed => {
                            if let Some(e) = pointer.pressed() {
                                viewer.handle(e, now);
                            }
                        }
                        ElementState::Pressed => {}
                        // releases always reach the controller so a drag never sticks
                        ElementState::Released => {
                            for e in pointer.released() {
                                if consumed && matches!(e, InputEvent::Click { .. }) {
                                    continue;
                                }
                                if let Some(label) = viewer.handle(e, now) {
                                    log::info!("{}", i18n::tr_with("log.hotspot", &[("label", label)]));
                                }
                            }
                        }
                    },

                    WindowEvent::CursorMoved { position, .. } => {
                        let e = pointer.moved(position.x as f32, position.y as f32);
                        viewer.handle(e, now);
                    }

                    WindowEvent::CursorLeft { .. } => {
                        if let Some((x, y)) = pointer.cursor() {
                            viewer.handle(InputEvent::PointerUp { x, y }, now);
                        }
                        pointer.left();
                    }

                    WindowEvent::MouseWheel { delta, .. } if !consumed => {
                        let delta_y = input::wheel_delta_y(delta);
                        viewer.handle(InputEvent::Wheel { delta_y }, now);
                    }

                    WindowEvent::DroppedFile(path) => {
                        ui.is_loading = true;
                        start_load_image(path, tx.clone());
                    }

                    _ => {}
                }
            }

            Event::RedrawRequested(_) => {
                let now = Instant::now();
                ui.frame_count += 1;
                let elapsed = now.duration_since(ui.fps_window_start).as_secs_f32();
                if elapsed >= 1.0 {
                    ui.fps = ui.frame_count as f32 / elapsed;
                    ui.frame_count = 0;
                    ui.fps_window_start = now;
                }

                let frame = viewer.frame(now);
                let mut actions = UiActions::default();
                let pixels_per_point = window.scale_factor() as f32;
                let has_panorama = r.has_panorama();
                let result = r.render_with_ui(&window, &frame, |ctx| {
                    draw_ui(
                        ctx,
                        &mut viewer,
                        &mut ui,
                        &mut actions,
                        &mut current_lang,
                        pixels_per_point,
                        has_panorama,
                        config.fov,
                    );
                });

                match result {
                    Ok(()) => {}
                    Err(wgpu::SurfaceError::Lost) => r.resize(r.size),
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("GPU out of memory");
                        teardown(&mut viewer, &mut renderer, control_flow);
                        return;
                    }
                    Err(e) => log::warn!("render error: {e:?}"),
                }

                if let Some(path) = actions.open {
                    ui.is_loading = true;
                    start_load_image(path, tx.clone());
                }
                if actions.toggle_fullscreen {
                    toggle_fullscreen(&window, &mut ui);
                }
                if actions.lang_changed {
                    window.set_title(&i18n::tr("app.title"));
                    if let Some(r) = renderer.as_ref() {
                        fonts::install_ui_font(&r.egui_ctx, &current_lang);
                    }
                }
                if actions.vsync_changed {
                    if let Some(r) = renderer.as_mut() {
                        r.set_vsync(ui.vsync);
                    }
                }
                if actions.quit {
                    teardown(&mut viewer, &mut renderer, control_flow);
                }
            }

            Event::MainEventsCleared => {
                window.request_redraw();
            }

            _ => {}
        }
    });
}

/// Detaches the viewer from input and releases GPU resources before exiting.
fn teardown(viewer: &mut PanoramaViewer, renderer: &mut Option<Renderer>, control_flow: &mut ControlFlow) {
    viewer.unmount();
    *renderer = None;
    *control_flow = ControlFlow::Exit;
}

fn resize_event(size: winit::dpi::PhysicalSize<u32>) -> InputEvent {
    InputEvent::Resize {
        width: size.width as f32,
        height: size.height as f32,
    }
}

fn toggle_fullscreen(window: &Window, ui: &mut UiState) {
    ui.is_fullscreen = !ui.is_fullscreen;
    window.set_fullscreen(ui.is_fullscreen.then_some(Fullscreen::Borderless(None)));
}

fn pick_image() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .add_filter(i18n::tr("file.filter.images"), &IMAGE_EXTENSIONS)
        .pick_file()
}

fn decode_image(path: &Path) -> LoadResult {
    let file = File::open(path).with_context(|| {
        i18n::tr_with("error.open_file", &[("path", path.display().to_string())])
    })?;
    let mut reader = ImageReader::new(BufReader::new(file)).with_guessed_format()?;
    reader.no_limits();
    let img = reader
        .decode()
        .with_context(|| i18n::tr_with("error.decode_image", &[("path", path.display().to_string())]))?;

    let (w, h) = img.dimensions();
    log::info!(
        "{}",
        i18n::tr_with("log.image_loaded_size", &[("w", w.to_string()), ("h", h.to_string())])
    );
    Ok(img.to_rgba8())
}

fn start_load_image(path: PathBuf, tx: Sender<LoadResult>) {
    thread::spawn(move || {
        log::info!(
            "{}",
            i18n::tr_with("log.loading_image_bg", &[("path", path.display().to_string())])
        );
        if tx.send(decode_image(&path)).is_err() {
            log::warn!("{}", i18n::tr("error.send_to_main_failed"));
        }
    });
}

fn variant_name(v: Variant) -> String {
    match v {
        Variant::Orbit => i18n::tr("variant.orbit"),
        Variant::Drag => i18n::tr("variant.drag"),
        Variant::DragPulse => i18n::tr("variant.drag_pulse"),
    }
}

/// 35 mm equivalent focal length for a vertical field of view (24 mm frame height).
fn equivalent_focal_mm(vertical_fov_deg: f32) -> f32 {
    12.0 / (vertical_fov_deg.clamp(0.01, 179.9).to_radians() * 0.5).tan()
}

#[allow(clippy::too_many_arguments)]
fn draw_ui(
    ctx: &egui::Context,
    viewer: &mut PanoramaViewer,
    ui_state: &mut UiState,
    actions: &mut UiActions,
    current_lang: &mut String,
    pixels_per_point: f32,
    has_panorama: bool,
    default_fov: f32,
) {
    egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
        egui::menu::bar(ui, |ui| {
            ui.menu_button(i18n::tr("menu.file"), |ui| {
                if ui.button(i18n::tr("menu.open_image")).clicked() {
                    ui.close_menu();
                    actions.open = pick_image();
                }
                if ui.button(i18n::tr("menu.exit")).clicked() {
                    actions.quit = true;
                }
            });

            ui.menu_button(i18n::tr("menu.view"), |ui| {
                if ui.button(i18n::tr("view.reset")).clicked() {
                    viewer.reset_view(default_fov);
                    ui.close_menu();
                }
                let fullscreen_label = if ui_state.is_fullscreen {
                    i18n::tr("view.fullscreen.exit")
                } else {
                    i18n::tr("view.fullscreen.enter")
                };
                if ui.button(fullscreen_label).clicked() {
                    actions.toggle_fullscreen = true;
                    ui.close_menu();
                }
                ui.separator();
                if ui.checkbox(&mut ui_state.show_fps, i18n::tr("view.show_fps")).clicked() {
                    ui.close_menu();
                }
                if ui.checkbox(&mut ui_state.vsync, i18n::tr("view.enable_vsync")).clicked() {
                    actions.vsync_changed = true;
                }
            });

            ui.menu_button(i18n::tr("menu.language"), |ui| {
                for (code, name) in i18n::LANGUAGES {
                    if ui.radio_value(current_lang, code.to_string(), name).clicked() {
                        i18n::init(current_lang.clone());
                        actions.lang_changed = true;
                        ui.close_menu();
                    }
                }
            });
        });
    });

    egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            if ui_state.is_loading {
                ui.label(RichText::new(i18n::tr("status.loading_image")).color(Color32::YELLOW));
                ui.label("|");
            } else if !has_panorama {
                ui.label(RichText::new(i18n::tr("status.no_image")).color(Color32::LIGHT_RED));
                ui.label("|");
            }
            let (lon, lat) = viewer.lon_lat();
            ui.label(variant_name(viewer.variant()));
            ui.label("|");
            ui.label(format!("FOV: {:.1}°", viewer.fov()));
            ui.label("|");
            ui.label(format!(
                "{} {:.1}mm",
                i18n::tr("status.equiv_focal_prefix"),
                equivalent_focal_mm(viewer.fov())
            ));
            ui.label("|");
            ui.label(format!("Lon: {lon:.1}°"));
            ui.label("|");
            ui.label(format!("Lat: {lat:.1}°"));
            if ui_state.show_fps {
                ui.label("|");
                ui.label(RichText::new(format!("FPS: {:.1}", ui_state.fps)).color(Color32::GREEN));
            }
        });
    });

    egui::Area::new("zoom_buttons")
        .anchor(egui::Align2::LEFT_BOTTOM, egui::vec2(20.0, -40.0))
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                let button = |text: &str| {
                    egui::Button::new(RichText::new(text).size(18.0).color(Color32::WHITE))
                        .fill(Color32::from_gray(0x33))
                };
                if ui
                    .add(button("🔍 +"))
                    .on_hover_text(i18n::tr("zoom.in"))
                    .clicked()
                {
                    viewer.zoom_in();
                }
                if ui
                    .add(button("🔍 −"))
                    .on_hover_text(i18n::tr("zoom.out"))
                    .clicked()
                {
                    viewer.zoom_out();
                }
            });
        });

    let tooltip_frame = egui::Frame::none()
        .fill(Color32::from_black_alpha(204))
        .rounding(4.0)
        .inner_margin(egui::Margin::symmetric(10.0, 6.0));

    if let Some(overlay) = viewer.overlay() {
        let (x, y) = overlay.position(pixels_per_point);
        egui::Area::new("hotspot_tooltip")
            .order(egui::Order::Tooltip)
            .interactable(false)
            .fixed_pos(egui::pos2(x, y))
            .show(ctx, |ui| {
                tooltip_frame.show(ui, |ui| {
                    ui.label(RichText::new(&overlay.label).color(Color32::WHITE));
                });
            });
    }

    for (i, sprite) in viewer.sprite_labels().into_iter().enumerate() {
        let pos = egui::pos2(
            sprite.screen.x / pixels_per_point,
            sprite.screen.y / pixels_per_point,
        );
        egui::Area::new(egui::Id::new(("hotspot_sprite", i)))
            .order(egui::Order::Background)
            .interactable(false)
            .pivot(egui::Align2::CENTER_BOTTOM)
            .fixed_pos(pos - egui::vec2(0.0, 8.0))
            .show(ctx, |ui| {
                tooltip_frame.show(ui, |ui| {
                    ui.label(RichText::new(&sprite.label).color(Color32::WHITE).size(16.0));
                });
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn focal_length_matches_common_lenses() {
        // ~46.8° vertical on a 24 mm frame is a 28 mm lens
        assert!((equivalent_focal_mm(46.8) - 27.8).abs() < 0.2);
        assert!((equivalent_focal_mm(90.0) - 12.0).abs() < 1e-3);
    }

    #[test]
    fn missing_image_reports_an_error() {
        assert!(decode_image(Path::new("/no/such/panorama.jpg")).is_err());
    }
}
