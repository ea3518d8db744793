//! Ridge Raider entry point
//!
//! Handles platform-specific initialization and runs the game loop. The
//! simulation itself is headless; this file owns the frame scheduling,
//! input sampling, HUD updates, and teardown.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::HtmlCanvasElement;

    use ridge_raider::Settings;
    use ridge_raider::consts::*;
    use ridge_raider::renderer::{RenderState, build_scene, surface_usable};
    use ridge_raider::sim::{GameEvent, GameState, SessionPhase, TickInput, tick};

    // JS binding for the celebratory burst fired on entering Victory
    #[wasm_bindgen(inline_js = "
        export function spawn_confetti() {
            if (typeof window.spawnConfetti === 'function') {
                window.spawnConfetti();
            }
        }
    ")]
    extern "C" {
        fn spawn_confetti();
    }

    /// Game instance holding all state
    struct Game {
        state: GameState,
        render_state: Option<RenderState>,
        accumulator: f32,
        last_time: f64,
        input: TickInput,
        settings: Settings,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
        /// Cleared at teardown so no orphaned callback keeps mutating state
        running: bool,
    }

    impl Game {
        fn new(seed: u64) -> Self {
            Self {
                state: GameState::new(seed),
                render_state: None,
                accumulator: 0.0,
                last_time: 0.0,
                input: TickInput::default(),
                settings: Settings::load(),
                frame_times: [0.0; 60],
                frame_index: 0,
                fps: 0,
                running: true,
            }
        }

        /// Run simulation ticks from the accumulated wall-clock time
        fn update(&mut self, dt: f32, time: f64) {
            let dt = dt.min(0.1);
            self.accumulator += dt;

            let mut substeps = 0;
            while self.accumulator >= NOMINAL_FRAME_SECS && substeps < MAX_SUBSTEPS {
                tick(&mut self.state, &self.input, 1.0);
                self.accumulator -= NOMINAL_FRAME_SECS;
                substeps += 1;
            }

            for event in self.state.drain_events() {
                match event {
                    GameEvent::LevelCleared => {
                        log::info!("level cleared!");
                        spawn_confetti();
                    }
                    GameEvent::ShipDestroyed => log::info!("ship destroyed"),
                    GameEvent::EnemyDestroyed { id } => log::debug!("enemy {} destroyed", id),
                }
            }

            // Track frame times for FPS
            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % 60;
            let oldest_time = self.frame_times[self.frame_index];
            if oldest_time > 0.0 {
                let elapsed = time - oldest_time;
                if elapsed > 0.0 {
                    self.fps = (60000.0 / elapsed).round() as u32;
                }
            }
        }

        /// Render the current frame
        fn render(&mut self) {
            if let Some(ref mut render_state) = self.render_state {
                let vertices = build_scene(
                    &self.state,
                    self.settings.effective_grid(),
                    self.settings.max_particles(),
                );
                match render_state.render(&vertices, self.state.camera.pos) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        render_state.resize(render_state.size.0, render_state.size.1);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
        }

        /// Update HUD elements in DOM from the frame's snapshot
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let snapshot = self.state.snapshot();

            let set = |selector: &str, value: String| {
                if let Some(el) = document.query_selector(selector).ok().flatten() {
                    el.set_text_content(Some(&value));
                }
            };
            set("#hud-score .hud-value", snapshot.score.to_string());
            set("#hud-fuel .hud-value", format!("{:.0}", snapshot.fuel));
            set("#hud-health .hud-value", format!("{:.0}", snapshot.health));
            set("#hud-level .hud-value", (snapshot.level + 1).to_string());
            set("#hud-enemies .hud-value", snapshot.enemies_left.to_string());
            if self.settings.show_fps {
                set("#hud-fps .hud-value", self.fps.to_string());
            }

            let show = |id: &str, visible: bool| {
                if let Some(el) = document.get_element_by_id(id) {
                    let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
                }
            };
            show("start-prompt", snapshot.phase == SessionPhase::Idle);
            show("pause-overlay", snapshot.phase == SessionPhase::Paused);
            show("game-over", snapshot.phase == SessionPhase::GameOver);
            show("victory", snapshot.phase == SessionPhase::Victory);

            if snapshot.phase == SessionPhase::GameOver || snapshot.phase == SessionPhase::Victory
            {
                set("#final-score", snapshot.score.to_string());
            }
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Ridge Raider starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        // Set canvas size
        let dpr = window.device_pixel_ratio();
        let width = (canvas.client_width() as f64 * dpr) as u32;
        let height = (canvas.client_height() as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        // Initialize game
        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed)));
        log::info!("Game initialized with seed: {}", seed);

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .expect("Failed to create surface");

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .expect("Failed to get adapter");

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let render_state = RenderState::new(surface, &adapter, width, height).await;
        game.borrow_mut().render_state = Some(render_state);

        setup_input_handlers(game.clone());
        setup_intent_buttons(game.clone());
        setup_resize(&canvas, game.clone());
        setup_auto_pause(game.clone());
        setup_teardown(game.clone());

        request_animation_frame(game);

        log::info!("Ridge Raider running!");
    }

    /// Map key events onto the logical action set; the sim only ever sees
    /// current-held state, sampled once per tick
    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let mut g = game.borrow_mut();
                match event.key().as_str() {
                    "ArrowLeft" | "a" | "A" => g.input.left = true,
                    "ArrowRight" | "d" | "D" => g.input.right = true,
                    "ArrowUp" | "w" | "W" => g.input.thrust = true,
                    " " => g.input.fire = true,
                    "Escape" => g.state.toggle_pause(),
                    "Enter" => match g.state.phase {
                        SessionPhase::Idle => g.state.start(),
                        SessionPhase::GameOver => g.state.restart(),
                        SessionPhase::Victory => g.state.advance_level(),
                        _ => {}
                    },
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let mut g = game.borrow_mut();
                match event.key().as_str() {
                    "ArrowLeft" | "a" | "A" => g.input.left = false,
                    "ArrowRight" | "d" | "D" => g.input.right = false,
                    "ArrowUp" | "w" | "W" => g.input.thrust = false,
                    " " => g.input.fire = false,
                    _ => {}
                }
            });
            let _ =
                window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Start / restart / advance intents from the hosting page
    fn setup_intent_buttons(game: Rc<RefCell<Game>>) {
        let document = web_sys::window().unwrap().document().unwrap();

        let wire = |id: &str, game: Rc<RefCell<Game>>, action: fn(&mut GameState)| {
            if let Some(btn) = document.get_element_by_id(id) {
                let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                    action(&mut game.borrow_mut().state);
                });
                let _ =
                    btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
                closure.forget();
            }
        };
        wire("start-btn", game.clone(), |s| s.start());
        wire("restart-btn", game.clone(), |s| s.restart());
        wire("next-level-btn", game, |s| s.advance_level());
    }

    /// Resizing reconfigures the surface only; simulation state is untouched
    fn setup_resize(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let canvas = canvas.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let window = web_sys::window().unwrap();
            let dpr = window.device_pixel_ratio();
            let width = (canvas.client_width() as f64 * dpr) as u32;
            let height = (canvas.client_height() as f64 * dpr) as u32;
            canvas.set_width(width);
            canvas.set_height(height);
            if let Some(ref mut render_state) = game.borrow_mut().render_state {
                render_state.resize(width, height);
            }
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Pause a live session when the page loses the player's attention
    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    let mut g = game.borrow_mut();
                    if g.state.phase == SessionPhase::Playing {
                        g.state.toggle_pause();
                        log::info!("Auto-paused (tab hidden)");
                    }
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur (click outside)
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                if g.state.phase == SessionPhase::Playing {
                    g.state.toggle_pause();
                    log::info!("Auto-paused (window blur)");
                }
            });
            let _ =
                window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Stop the frame loop when the page goes away
    fn setup_teardown(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            game.borrow_mut().running = false;
            log::info!("frame loop stopped");
        });
        let _ =
            window.add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();
            if !g.running {
                return;
            }

            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                NOMINAL_FRAME_SECS
            };
            g.last_time = time;

            // No usable surface (canvas gone or collapsed to zero size):
            // skip the whole frame step so the simulation does not advance
            // until a valid surface is back
            let surface_ready = g
                .render_state
                .as_ref()
                .is_some_and(|rs| surface_usable(rs.size));
            if surface_ready {
                g.update(dt, time);
                g.render();
                g.update_hud();
            }
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Native mode runs a short headless demo session and logs the outcome;
/// the rendered game ships as wasm.
#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use ridge_raider::sim::{GameState, SessionPhase, TickInput, tick};
    use std::time::{SystemTime, UNIX_EPOCH};

    env_logger::init();
    log::info!("Ridge Raider (native) starting headless demo...");

    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let mut state = GameState::new(seed);
    state.start();

    // Hover: pulse the throttle and fire now and then
    for frame in 0u32..1800 {
        let input = TickInput {
            left: false,
            right: frame % 240 < 40,
            thrust: frame % 30 < 12,
            fire: frame % 45 == 0,
        };
        tick(&mut state, &input, 1.0);
        if state.phase != SessionPhase::Playing {
            break;
        }
    }

    let snapshot = state.snapshot();
    log::info!(
        "demo finished: phase {:?}, score {}, fuel {:.0}, health {:.0}, enemies left {}",
        snapshot.phase,
        snapshot.score,
        snapshot.fuel,
        snapshot.health,
        snapshot.enemies_left,
    );
    println!(
        "{}",
        serde_json::to_string_pretty(&snapshot).expect("snapshot serializes")
    );
}
