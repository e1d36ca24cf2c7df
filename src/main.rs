//! Kinetic Sculpture entry point
//!
//! Handles platform-specific initialization and runs the animation loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_viewer {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, MouseEvent, WheelEvent};

    use kinetic_sculpture::renderer::MeshRenderer;
    use kinetic_sculpture::{App, KeyCommand, Settings, SculptureError, quality_from_query};

    /// Viewer instance: the app plus browser-side input state
    struct Viewer {
        app: App,
        /// Last pointer position while dragging
        drag_from: Option<(f32, f32)>,
    }

    impl Viewer {
        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let document = match web_sys::window().and_then(|w| w.document()) {
                Some(d) => d,
                None => return,
            };

            if let Some(el) = document.get_element_by_id("hud-fps") {
                let class = if self.app.settings.show_fps {
                    "hud-item"
                } else {
                    "hud-item hidden"
                };
                let _ = el.set_attribute("class", class);
            }
            if let Some(el) = document.query_selector("#hud-fps .hud-value").ok().flatten() {
                el.set_text_content(Some(&self.app.fps().to_string()));
            }
        }
    }

    /// Size the drawing buffer to the canvas' CSS size times the pixel ratio
    fn fit_canvas(window: &web_sys::Window, canvas: &HtmlCanvasElement) -> (u32, u32) {
        let dpr = window.device_pixel_ratio();
        let width = ((canvas.client_width() as f64 * dpr) as u32).max(1);
        let height = ((canvas.client_height() as f64 * dpr) as u32).max(1);
        canvas.set_width(width);
        canvas.set_height(height);
        (width, height)
    }

    async fn create_renderer(
        canvas: &HtmlCanvasElement,
        width: u32,
        height: u32,
    ) -> Result<MeshRenderer, SculptureError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU,
            ..Default::default()
        });

        let surface = match instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone())) {
            Ok(surface) => surface,
            Err(e) => {
                log::error!("Failed to create surface: {}", e);
                return Err(SculptureError::UnsupportedSurface);
            }
        };

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        MeshRenderer::new(surface, &adapter, width, height).await
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Kinetic Sculpture starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        let (width, height) = fit_canvas(&window, &canvas);

        let mut settings = Settings::load();
        if let Some(quality) = window
            .location()
            .search()
            .ok()
            .and_then(|q| quality_from_query(&q))
        {
            log::info!("Quality override from URL: {}", quality.as_str());
            settings.quality = quality;
        }

        let mut app = match App::new(settings, width as f32 / height as f32) {
            Ok(app) => app,
            Err(e) => {
                log::error!("Failed to build scene: {}", e);
                return;
            }
        };

        match create_renderer(&canvas, width, height).await {
            Ok(renderer) => app.attach_renderer(renderer),
            Err(e) => {
                log::error!("WebGPU unavailable: {}", e);
                return;
            }
        }

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let viewer = Rc::new(RefCell::new(Viewer {
            app,
            drag_from: None,
        }));

        setup_input_handlers(&canvas, viewer.clone());
        setup_resize_handler(canvas, viewer.clone());

        request_animation_frame(viewer);

        log::info!("Kinetic Sculpture running!");
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, viewer: Rc<RefCell<Viewer>>) {
        // Mouse down - start orbit drag
        {
            let viewer = viewer.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                viewer.borrow_mut().drag_from =
                    Some((event.client_x() as f32, event.client_y() as f32));
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse move - orbit while dragging
        {
            let viewer = viewer.clone();
            let window = web_sys::window().unwrap();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut v = viewer.borrow_mut();
                let from = v.drag_from;
                if let Some((x0, y0)) = from {
                    let x = event.client_x() as f32;
                    let y = event.client_y() as f32;
                    v.app.camera.drag(x - x0, y - y0);
                    v.drag_from = Some((x, y));
                }
            });
            let _ = window
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse up anywhere ends the drag
        {
            let viewer = viewer.clone();
            let window = web_sys::window().unwrap();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                viewer.borrow_mut().drag_from = None;
            });
            let _ = window
                .add_event_listener_with_callback("mouseup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Wheel - zoom
        {
            let viewer = viewer.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: WheelEvent| {
                event.prevent_default();
                if event.delta_y() == 0.0 {
                    return;
                }
                let step = -(event.delta_y().signum()) as f32;
                viewer.borrow_mut().app.camera.zoom(step);
            });
            let _ = canvas
                .add_event_listener_with_callback("wheel", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard
        {
            let window = web_sys::window().unwrap();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let modified = event.ctrl_key() || event.meta_key() || event.alt_key();
                if let Some(command) = KeyCommand::from_key(&event.key(), modified) {
                    viewer.borrow_mut().app.handle_key(command);
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize_handler(canvas: HtmlCanvasElement, viewer: Rc<RefCell<Viewer>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            if let Some(window) = web_sys::window() {
                let (width, height) = fit_canvas(&window, &canvas);
                viewer.borrow_mut().app.resize(width, height);
            }
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(viewer: Rc<RefCell<Viewer>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |time: f64| {
            animation_loop(viewer, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn animation_loop(viewer: Rc<RefCell<Viewer>>, time: f64) {
        {
            let mut v = viewer.borrow_mut();
            v.app.frame(time);
            v.update_hud();
        }

        request_animation_frame(viewer);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_viewer::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Kinetic Sculpture (native) starting...");
    log::info!("Native mode has no window - run with `trunk serve` for the web version");

    if let Err(e) = trace_one_period() {
        log::error!("Trace failed: {}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Step the headless app through one cam revolution and print the motion
#[cfg(not(target_arch = "wasm32"))]
fn trace_one_period() -> kinetic_sculpture::Result<()> {
    use kinetic_sculpture::kinematics::ROTATION_PERIOD_SEC;
    use kinetic_sculpture::{App, Settings, angle_at_time};

    let mut app = App::new(Settings::load(), 16.0 / 9.0)?;
    let steps = 8;

    println!("\n   t (s)   cam (rad)   wheel 0 r   ball height");
    for i in 0..=steps {
        let t = ROTATION_PERIOD_SEC * i as f64 / steps as f64;
        app.update(t * 1000.0);

        let wheel = &app.sculpture().wheels()[0];
        let height = wheel.balls().first().map(|b| b.height(&app.graph));
        println!(
            "{:8.2}  {:10.4}  {:10.4}  {:>12}",
            t,
            angle_at_time(t),
            wheel.radius_at(t),
            height.map_or("-".to_string(), |h| format!("{h:.4}"))
        );
    }

    if app.skipped_frames() > 0 {
        log::warn!("{} frames skipped", app.skipped_frames());
    }
    println!("✓ Traced one {ROTATION_PERIOD_SEC} s revolution");
    Ok(())
}
