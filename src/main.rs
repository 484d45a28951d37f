//! Gorefield entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, MouseEvent};

    use gorefield::audio::{AudioManager, SoundSink};
    use gorefield::platform::InputMapper;
    use gorefield::renderer::{CanvasSurface, draw_frame};
    use gorefield::sim::{FrameInput, GameEvent, GameState, tick};
    use gorefield::{Settings, Tuning, ui};

    /// Game instance holding all state
    struct Game {
        state: GameState,
        settings: Settings,
        surface: CanvasSurface,
        audio: AudioManager,
        input: InputMapper,
        pending: FrameInput,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
    }

    impl Game {
        fn update(&mut self, time: f64) {
            let mut input = self.pending.take();
            input.aim = self.input.aim();

            match tick(&mut self.state, &input, js_sys::Date::now()) {
                Ok(report) => {
                    if !report.failed_stages.is_empty() {
                        log::debug!("Frame {} skipped {:?}", report.frame, report.failed_stages);
                    }
                }
                Err(err) => log::warn!("Frame skipped: {}", err),
            }

            for event in self.state.drain_events() {
                match event {
                    GameEvent::Sound(effect) => self.audio.play(effect),
                    GameEvent::EnemyKilled { id, source } => {
                        log::trace!("Enemy {} killed by {:?}", id, source)
                    }
                    _ => {}
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

        fn render(&mut self) {
            draw_frame(&self.state, &self.settings, &mut self.surface);
            if self.settings.show_fps {
                ui::draw_fps(&mut self.surface, self.fps);
            }
        }

        fn resize(&mut self, width: f32, height: f32) {
            self.surface.set_size(width, height);
            self.state.resize(width, height);
        }
    }

    /// Optional JSON embedded by the host page in a `<script type="application/json">`
    fn embedded_json(document: &Document, id: &str) -> Option<String> {
        document
            .get_element_by_id(id)
            .and_then(|el| el.text_content())
            .filter(|text| !text.trim().is_empty())
    }

    fn load_config(document: &Document) -> (Settings, Tuning) {
        let settings = embedded_json(document, "gorefield-settings")
            .map(|json| Settings::from_json(&json))
            .transpose()
            .unwrap_or_else(|err| {
                log::warn!("Ignoring settings: {}", err);
                None
            })
            .unwrap_or_default();
        let tuning = embedded_json(document, "gorefield-tuning")
            .map(|json| Tuning::from_json(&json))
            .transpose()
            .unwrap_or_else(|err| {
                log::warn!("Ignoring tuning: {}", err);
                None
            })
            .unwrap_or_default();
        (settings, tuning)
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if let Err(err) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::warn_1(&format!("Logger init failed: {}", err).into());
        }

        log::info!("Gorefield starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()?;
        let width = window.inner_width()?.as_f64().unwrap_or(800.0) as u32;
        let height = window.inner_height()?.as_f64().unwrap_or(600.0) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or("no 2d context")?
            .dyn_into()?;

        let (settings, tuning) = load_config(&document);
        let seed = js_sys::Date::now() as u64;
        let mut state = GameState::with_tuning(seed, width as f32, height as f32, tuning);
        state.apply_settings(&settings);

        let mut audio = AudioManager::new();
        audio.apply_settings(&settings);

        let game = Rc::new(RefCell::new(Game {
            state,
            settings,
            surface: CanvasSurface::new(ctx, width as f32, height as f32),
            audio,
            input: InputMapper::new(),
            pending: FrameInput::default(),
            frame_times: [0.0; 60],
            frame_index: 0,
            fps: 0,
        }));

        log::info!("Game initialized with seed: {}", seed);

        setup_input_handlers(&canvas, game.clone())?;
        setup_resize(&canvas, game.clone())?;

        request_animation_frame(game);

        log::info!("Gorefield running!");
        Ok(())
    }

    /// Mouse position relative to the canvas
    fn canvas_point(canvas: &HtmlCanvasElement, event: &MouseEvent) -> (f32, f32) {
        let rect = canvas.get_bounding_client_rect();
        (
            (event.client_x() as f64 - rect.left()) as f32,
            (event.client_y() as f64 - rect.top()) as f32,
        )
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        // Mouse move - aim
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let (x, y) = canvas_point(&canvas_clone, &event);
                game.borrow_mut().input.pointer_move(x, y);
            });
            canvas.add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Click - fire, or select a weapon button
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let (x, y) = canvas_point(&canvas_clone, &event);
                let mut g = game.borrow_mut();
                // First gesture unlocks audio
                g.audio.resume();
                let buttons = ui::weapon_buttons(g.state.width, g.state.height);
                if let Some(command) = g.input.pointer_click(x, y, &buttons) {
                    g.pending.push(command);
                }
            });
            canvas.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Keyboard - weapon hotkeys
        {
            let game = game.clone();
            let window = web_sys::window().ok_or("no window")?;
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let mut g = game.borrow_mut();
                if let Some(command) = g.input.key(&event.key()) {
                    g.pending.push(command);
                }
            });
            window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        Ok(())
    }

    fn setup_resize(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no window")?;
        let canvas = canvas.clone();
        let win = window.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let width = win.inner_width().ok().and_then(|v| v.as_f64());
            let height = win.inner_height().ok().and_then(|v| v.as_f64());
            if let (Some(w), Some(h)) = (width, height) {
                canvas.set_width(w as u32);
                canvas.set_height(h as u32);
                game.borrow_mut().resize(w as f32, h as f32);
            }
        });
        window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();
            g.update(time);
            g.render();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

/// Headless run: simulate a few seconds of play and log what happened
#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use glam::Vec2;
    use gorefield::consts::{DEFAULT_HEIGHT, DEFAULT_WIDTH, WEAPON_SLOTS};
    use gorefield::sim::{Command, FrameInput, GameState, tick};

    env_logger::init();
    log::info!("Gorefield (native) starting headless demo...");
    log::info!("Run with `trunk serve` for the browser version");

    const FRAMES: u64 = 1800;
    const FRAME_MS: f64 = 1000.0 / 60.0;

    let mut state = GameState::new(0x60_4E, DEFAULT_WIDTH, DEFAULT_HEIGHT);
    let mut pending = FrameInput::default();

    for frame in 0..FRAMES {
        let now = frame as f64 * FRAME_MS;

        // Rotate through the arsenal every five seconds
        if frame % 300 == 0 {
            let slot = (frame / 300) as u8 % WEAPON_SLOTS + 1;
            pending.push(Command::SelectWeapon(slot));
        }
        // Shoot at the first enemy twice a second
        if frame % 30 == 0 {
            if let Some(target) = state.enemies.first().map(|e| e.center()) {
                pending.push(Command::Fire(target));
                pending.aim = Some(target);
            } else {
                pending.push(Command::Fire(Vec2::new(DEFAULT_WIDTH / 2.0, DEFAULT_HEIGHT)));
            }
        }

        let input = pending.take();
        match tick(&mut state, &input, now) {
            Ok(report) if report.kills > 0 => {
                log::info!("Frame {}: {} kill(s)", report.frame, report.kills);
            }
            Ok(_) => {}
            Err(err) => log::warn!("Frame {} skipped: {}", frame, err),
        }
        state.drain_events();
    }

    log::info!(
        "Done: {} kills, {} enemies, {} allies, {} decals, {} particles",
        state.arsenal.kills,
        state.enemies.len(),
        state.allies.len(),
        state.decals.len(),
        state.particles.len()
    );
}
