//! Host application state
//!
//! Turns macroquad input into commands and intents, ticks the runtime and
//! draws the active scene as flat rectangles. Everything here is
//! presentation; the simulation lives in the library.

use macroquad::prelude::{
    clear_background, draw_rectangle, draw_rectangle_lines, draw_text, is_key_down, is_key_pressed,
    is_key_released, is_mouse_button_down, is_mouse_button_pressed, is_mouse_button_released,
    mouse_position, screen_height, screen_width, Color, KeyCode, MouseButton,
};

use sidescroll::game::{BodyRef, Command, ControlIntent, GameRuntime, Mode, SessionKind, TickContext};
use sidescroll::view::CameraMode;
use sidescroll::world::{BodyKind, Rect, Vec2};

/// Width of the editor side panel (px)
const DASHBOARD_WIDTH: f32 = 260.0;

/// How long the scene name stays on screen after a transition (seconds)
const SCENE_BANNER_SECS: f32 = 2.0;

const BACKGROUND: Color = Color::new(0.08, 0.08, 0.10, 1.0);
const VIEW_BG: Color = Color::new(0.45, 0.65, 0.85, 1.0);
const PLATFORM: Color = Color::new(0.30, 0.55, 0.25, 1.0);
const OBSTACLE: Color = Color::new(0.50, 0.35, 0.20, 1.0);
const NOMINAL: Color = Color::new(1.0, 1.0, 1.0, 0.25);
const ZONE_OK: Color = Color::new(0.3, 0.5, 1.0, 0.9);
const ZONE_BAD: Color = Color::new(1.0, 0.25, 0.25, 0.9);
const BOUNDARY: Color = Color::new(1.0, 0.85, 0.2, 0.9);
const PLAYER: Color = Color::new(0.95, 0.95, 0.95, 1.0);
const ENEMY: Color = Color::new(0.85, 0.2, 0.3, 1.0);
const PANEL: Color = Color::new(0.12, 0.12, 0.15, 1.0);
const TEXT: Color = Color::new(0.9, 0.9, 0.9, 1.0);
const WARN: Color = Color::new(1.0, 0.6, 0.3, 1.0);

pub struct App {
    pub runtime: GameRuntime,
    pub ctx: TickContext,
    /// Scene name and remaining display time
    banner: Option<(String, f32)>,
}

impl App {
    pub fn new(mut runtime: GameRuntime, session: SessionKind) -> Self {
        runtime.start_session(session);
        let ctx = match session {
            SessionKind::Production => TickContext::play(),
            SessionKind::Editing => TickContext::edit(),
        };
        let banner = Some((scene_label(&runtime), SCENE_BANNER_SECS));
        Self { runtime, ctx, banner }
    }

    /// One host frame: input → tick → events → draw
    pub fn frame(&mut self, dt: f32) {
        self.runtime.events.clear_all();

        self.sync_surface();
        self.handle_keys();
        self.handle_pointer();
        self.runtime.advance_timers(dt);

        let intent = self.sample_intent();
        self.runtime.tick(&self.ctx, dt, intent);

        self.consume_events(dt);
        self.draw();
    }

    fn send(&mut self, command: Command) {
        // Rejections are logged by the runtime
        let _ = self.runtime.apply_command(self.ctx.mode, command);
    }

    fn sync_surface(&mut self) {
        let panel = if self.ctx.dashboard_visible { DASHBOARD_WIDTH } else { 0.0 };
        let size = Vec2::new((screen_width() - panel).max(1.0), screen_height());
        if size != self.runtime.viewport.surface_size() {
            self.send(Command::ResizeSurface { size });
        }
    }

    fn handle_keys(&mut self) {
        if is_key_pressed(KeyCode::Tab) {
            self.ctx.mode = self.ctx.mode.toggled();
            self.ctx.dashboard_visible = self.ctx.mode == Mode::Edit;
        }
        if is_key_pressed(KeyCode::F1) {
            self.ctx.dashboard_visible = !self.ctx.dashboard_visible;
        }
        if is_key_pressed(KeyCode::C) {
            self.send(Command::ToggleCameraMode);
        }
        if is_key_pressed(KeyCode::P) {
            let policy = self.runtime.viewport.policy().next();
            self.send(Command::SetPolicy { policy });
        }

        if self.runtime.camera.mode() != CameraMode::Free {
            return;
        }
        let shift = is_key_down(KeyCode::LeftShift) || is_key_down(KeyCode::RightShift);
        let step = self.runtime.camera_settings.nudge_step;
        let arrows = [
            (KeyCode::Left, Vec2::new(-1.0, 0.0)),
            (KeyCode::Right, Vec2::new(1.0, 0.0)),
            (KeyCode::Up, Vec2::new(0.0, -1.0)),
            (KeyCode::Down, Vec2::new(0.0, 1.0)),
        ];
        for (key, direction) in arrows {
            if is_key_pressed(key) {
                if shift {
                    self.send(Command::StartAutoScroll { direction });
                } else {
                    self.send(Command::Nudge { delta: direction * step });
                }
            }
            if is_key_released(key) {
                self.send(Command::StopAutoScroll);
            }
        }
    }

    fn handle_pointer(&mut self) {
        let (mx, my) = mouse_position();
        let pointer = Vec2::new(mx, my);
        let free = self.runtime.camera.mode() == CameraMode::Free;

        if is_mouse_button_pressed(MouseButton::Right) {
            self.send(Command::StartDrag { pointer });
        } else if is_mouse_button_down(MouseButton::Right) {
            self.send(Command::UpdateDrag { pointer });
        }
        if is_mouse_button_released(MouseButton::Right) {
            self.send(Command::EndDrag);
        }

        if self.ctx.mode == Mode::Edit {
            if is_mouse_button_pressed(MouseButton::Left) && mx < self.runtime.viewport.surface_size().x {
                let position = self.runtime.screen_to_world(pointer) - self.runtime.player.size * 0.5;
                self.send(Command::MoveBody { body: BodyRef::Player, position });
            }
            if free && !self.runtime.camera.is_dragging() {
                self.send(Command::EdgeScroll { pointer });
            }
        }
    }

    fn sample_intent(&self) -> ControlIntent {
        let left = is_key_down(KeyCode::Left) || is_key_down(KeyCode::A);
        let right = is_key_down(KeyCode::Right) || is_key_down(KeyCode::D);
        let move_x = match (left, right) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        };
        let jump = is_key_pressed(KeyCode::Space) || is_key_pressed(KeyCode::W);
        ControlIntent { move_x, jump }
    }

    fn consume_events(&mut self, dt: f32) {
        if let Some(changed) = self.runtime.events.scene_changed.iter().last() {
            let label = self
                .runtime
                .scenes
                .scene(&changed.to)
                .and_then(|s| s.settings.display_name.clone())
                .unwrap_or_else(|| changed.to.clone());
            self.banner = Some((label, SCENE_BANNER_SECS));
        }
        if let Some((_, remaining)) = self.banner.as_mut() {
            *remaining -= dt;
            if *remaining <= 0.0 {
                self.banner = None;
            }
        }
    }

    // ========================================================================
    // Drawing
    // ========================================================================

    fn draw(&self) {
        clear_background(BACKGROUND);
        let rt = &self.runtime;
        let editing = self.ctx.mode == Mode::Edit;

        let view_origin = rt.viewport.to_screen(Vec2::ZERO);
        let view_size = rt.viewport.design_size().mul_each(rt.viewport.scale());
        draw_rectangle(view_origin.x, view_origin.y, view_size.x, view_size.y, VIEW_BG);

        let scene = rt.scenes.active();
        for body in &scene.bodies {
            let color = match body.kind {
                BodyKind::Platform => PLATFORM,
                BodyKind::Obstacle => OBSTACLE,
            };
            self.fill(body.footprint(), color);
            if editing && body.scale.is_some() {
                self.outline(body.nominal_rect(), NOMINAL);
            }
        }

        if editing {
            for zone in &scene.zones {
                let live = zone.target.as_deref().is_some_and(|t| rt.scenes.contains(t));
                self.outline(zone.rect, if live { ZONE_OK } else { ZONE_BAD });
            }
            if let Some(boundary) = scene.boundary {
                self.outline(boundary.rect(), BOUNDARY);
            }
        }

        for enemy in &rt.enemies {
            self.fill(enemy.body.rect(), ENEMY);
        }
        self.fill(rt.player.rect(), PLAYER);

        self.draw_hud();
        if self.ctx.dashboard_visible {
            self.draw_dashboard();
        }
    }

    fn screen_rect(&self, rect: Rect) -> Rect {
        let top_left = self.runtime.world_to_screen(rect.position());
        let size = rect.size().mul_each(self.runtime.viewport.scale());
        Rect::from_pos_size(top_left, size)
    }

    fn fill(&self, rect: Rect, color: Color) {
        let r = self.screen_rect(rect);
        draw_rectangle(r.x, r.y, r.w, r.h, color);
    }

    fn outline(&self, rect: Rect, color: Color) {
        let r = self.screen_rect(rect);
        draw_rectangle_lines(r.x, r.y, r.w, r.h, 2.0, color);
    }

    fn draw_hud(&self) {
        if let Some((label, _)) = &self.banner {
            draw_text(label, 16.0, 32.0, 28.0, TEXT);
        }
        let status = format!(
            "{}  |  camera: {}  |  scale: {}  (Tab mode, C camera, P scale)",
            self.ctx.mode.label(),
            self.runtime.camera.mode().label(),
            self.runtime.viewport.policy().label(),
        );
        draw_text(&status, 16.0, screen_height() - 12.0, 18.0, TEXT);
    }

    fn draw_dashboard(&self) {
        let rt = &self.runtime;
        let x = screen_width() - DASHBOARD_WIDTH;
        draw_rectangle(x, 0.0, DASHBOARD_WIDTH, screen_height(), PANEL);

        let snapshot = rt.player_snapshot();
        let mut y = 28.0;
        let mut line = |text: &str, color: Color| {
            draw_text(text, x + 12.0, y, 18.0, color);
            y += 22.0;
        };

        line(&format!("Scene: {}", scene_label(rt)), TEXT);
        line(&format!("pos  {:.1}, {:.1}", snapshot.position.x, snapshot.position.y), TEXT);
        line(&format!("vel  {:.2}, {:.2}", snapshot.velocity.x, snapshot.velocity.y), TEXT);
        line(&format!("grounded: {}  {:?}", snapshot.grounded, snapshot.animation), TEXT);
        let cam = rt.camera.position();
        line(&format!("camera {:.0}, {:.0}", cam.x, cam.y), TEXT);

        let diagnostics = rt.scenes.diagnostics();
        if !diagnostics.is_empty() {
            line("", TEXT);
            line("Problems:", WARN);
            for diag in diagnostics {
                line(&diag.to_string(), WARN);
            }
        }
    }
}

fn scene_label(runtime: &GameRuntime) -> String {
    let scene = runtime.scenes.active();
    scene.settings.display_name.clone().unwrap_or_else(|| scene.id.clone())
}
