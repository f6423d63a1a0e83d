//! Game Runtime
//!
//! Owns everything the simulation mutates (controlled body, enemies, scene
//! graph, camera, viewport) and runs the per-tick pipeline:
//!
//! 1. Drain effects queued by external timers
//! 2. Mode gate: stop here in edit mode
//! 3. Intent → integrate → platforms → obstacles → boundary (per body)
//! 4. Transition check against the controlled body's centre
//! 5. Fall respawn, then remember the last standing position
//! 6. Camera update
//!
//! Outside the tick the host talks to the runtime only through
//! [`Command`]s and reads results from [`Events`].

use std::sync::mpsc::{self, Receiver, Sender};
use tracing::{debug, info};

use crate::config::{CameraSettings, EngineConfig};
use crate::view::{Camera, CameraMode, ScalePolicy, Viewport};
use crate::world::{Level, LevelError, SceneGraph, Transition, Vec2, ZoneCheck};
use super::body::{BodySnapshot, ControlIntent, DynamicBody, Enemy};
use super::command::{Command, CommandError};
use super::event::{
    BodyRef, Events, InvalidZoneEvent, LandedEvent, LargeDisplacementEvent, RespawnEvent,
    SceneChangedEvent,
};
use super::mode::{Mode, SessionKind, TickContext};
use super::physics::{
    apply_intent, remember_valid_position, respawn_if_fallen, step_body, PhysicsSettings,
    StepReport,
};

/// Work queued from outside the tick, applied at the next tick boundary
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Move the free camera by a world-space offset
    CameraNudge(Vec2),
    /// Apply a command with the mode of the tick that drains it
    Command(Command),
}

/// Handle for external timers to queue [`Effect`]s
#[derive(Debug, Clone)]
pub struct EffectSender(Sender<Effect>);

impl EffectSender {
    /// Queue an effect. Returns false once the runtime is gone.
    pub fn send(&self, effect: Effect) -> bool {
        self.0.send(effect).is_ok()
    }
}

/// Repeating camera nudge driven by the host's clock
#[derive(Debug, Clone)]
pub struct AutoScrollTask {
    sender: EffectSender,
    step: Vec2,
    interval: f32,
    elapsed: f32,
}

impl AutoScrollTask {
    pub fn new(sender: EffectSender, step: Vec2, interval: f32) -> Self {
        Self { sender, step, interval, elapsed: 0.0 }
    }

    /// Advance the timer, queueing one nudge per elapsed interval
    pub fn advance(&mut self, secs: f32) -> usize {
        if self.interval <= 0.0 || !secs.is_finite() || secs <= 0.0 {
            return 0;
        }
        self.elapsed += secs;
        let mut fired = 0;
        while self.elapsed >= self.interval {
            self.elapsed -= self.interval;
            if !self.sender.send(Effect::CameraNudge(self.step)) {
                break;
            }
            fired += 1;
        }
        fired
    }
}

/// The simulation core
pub struct GameRuntime {
    pub player: DynamicBody,
    pub enemies: Vec<Enemy>,
    pub scenes: SceneGraph,
    pub camera: Camera,
    pub viewport: Viewport,
    pub events: Events,
    pub physics: PhysicsSettings,
    pub camera_settings: CameraSettings,

    /// Mode seen by the previous tick, to detect play/edit switches
    mode: Mode,
    effect_tx: Sender<Effect>,
    effect_rx: Receiver<Effect>,
    auto_scroll: Option<AutoScrollTask>,
}

impl GameRuntime {
    pub fn new(scenes: SceneGraph, config: &EngineConfig) -> Self {
        let (effect_tx, effect_rx) = mpsc::channel();
        let spawn = scenes.active().spawn().unwrap_or(config.physics.default_respawn);
        let viewport = Viewport::new(
            config.viewport.design_size(),
            config.viewport.design_size(),
            config.viewport.policy,
        );

        let mut runtime = Self {
            player: DynamicBody::new(spawn, config.physics.player_size),
            enemies: Vec::new(),
            scenes,
            camera: Camera::new(config.camera.smoothing),
            viewport,
            events: Events::new(),
            physics: config.physics,
            camera_settings: config.camera,
            mode: Mode::default(),
            effect_tx,
            effect_rx,
            auto_scroll: None,
        };
        runtime.report_diagnostics();
        runtime.follow_player();
        runtime.camera.snap_to_target();
        runtime
    }

    /// Build a runtime for a level; physics stored in the level override the config
    pub fn from_level(level: Level, config: &EngineConfig) -> Result<Self, LevelError> {
        let mut config = *config;
        if let Some(physics) = level.physics {
            config.physics = physics;
        }
        Ok(Self::new(level.into_scene_graph()?, &config))
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn player_snapshot(&self) -> BodySnapshot {
        self.player.snapshot()
    }

    pub fn enemy(&self, id: u32) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == id)
    }

    pub fn enemy_mut(&mut self, id: u32) -> Option<&mut Enemy> {
        self.enemies.iter_mut().find(|e| e.id == id)
    }

    pub fn spawn_enemy(&mut self, enemy: Enemy) {
        self.enemies.push(enemy);
    }

    /// Clonable handle for external timers
    pub fn effect_sender(&self) -> EffectSender {
        EffectSender(self.effect_tx.clone())
    }

    pub fn is_auto_scrolling(&self) -> bool {
        self.auto_scroll.is_some()
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        self.camera.world_to_screen(world, &self.viewport)
    }

    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        self.camera.screen_to_world(screen, &self.viewport)
    }

    // ========================================================================
    // Session and timers
    // ========================================================================

    /// Pick the starting scene for a session.
    ///
    /// Production sessions always go to the start scene and put the body at
    /// its spawn. Editing sessions keep the current scene and body.
    pub fn start_session(&mut self, kind: SessionKind) {
        let from = self.scenes.active_id().to_string();
        let changed = self.scenes.start_session(kind);
        if kind == SessionKind::Production {
            self.cancel_interactions();
            let spawn = self.scenes.active().spawn().unwrap_or(self.physics.default_respawn);
            self.player.place(spawn);
            self.player.last_valid = None;
            self.scenes.latch_at(self.player.center());
            self.reset_camera();
            info!(scene = %self.scenes.active_id(), "production session started");
            self.events.scene_changed.send(SceneChangedEvent {
                from,
                to: self.scenes.active_id().to_string(),
                zone: None,
                spawn,
            });
        }
        if changed {
            self.report_diagnostics();
        }
    }

    /// Drive the auto-scroll timer. Called by the host between ticks; the
    /// nudges it produces are applied at the next tick boundary.
    pub fn advance_timers(&mut self, secs: f32) {
        if let Some(task) = self.auto_scroll.as_mut() {
            task.advance(secs);
        }
    }

    fn cancel_interactions(&mut self) {
        self.stop_auto_scroll();
        self.camera.end_drag();
    }

    /// Drop the auto-scroll task along with any nudges it already queued.
    /// Other pending effects keep their order.
    fn stop_auto_scroll(&mut self) {
        if self.auto_scroll.take().is_none() {
            return;
        }
        let pending: Vec<Effect> = self.effect_rx.try_iter().collect();
        let mut discarded = 0;
        for effect in pending {
            match effect {
                Effect::CameraNudge(_) => discarded += 1,
                other => {
                    // The receiver is owned by self, so this cannot fail
                    let _ = self.effect_tx.send(other);
                }
            }
        }
        debug!(discarded, "auto-scroll cancelled");
    }

    // ========================================================================
    // Tick
    // ========================================================================

    /// Run one tick of `dt` seconds
    pub fn tick(&mut self, ctx: &TickContext, dt: f32, intent: ControlIntent) {
        if ctx.mode != self.mode {
            self.on_mode_changed(ctx.mode);
        }
        self.viewport.set_dashboard_visible(ctx.dashboard_visible);
        self.drain_effects(ctx.mode);

        let frame_scale = self.physics.frame_scale(dt);
        if ctx.mode.is_simulating() {
            self.simulate(frame_scale, intent);
        }

        self.follow_player();
        self.camera.update(frame_scale);
    }

    fn on_mode_changed(&mut self, mode: Mode) {
        debug!(mode = mode.label(), "mode changed");
        self.mode = mode;
        if mode.is_simulating() {
            self.cancel_interactions();
        }
    }

    fn drain_effects(&mut self, mode: Mode) {
        while let Ok(effect) = self.effect_rx.try_recv() {
            match effect {
                Effect::CameraNudge(delta) => {
                    self.camera.nudge(delta);
                }
                Effect::Command(command) => {
                    // Rejections are logged by apply_command
                    let _ = self.apply_command(mode, command);
                }
            }
        }
    }

    fn simulate(&mut self, frame_scale: f32, intent: ControlIntent) {
        apply_intent(&mut self.player, intent, &self.physics);
        let was_grounded = self.player.grounded;
        let report = step_body(&mut self.player, self.scenes.active(), &self.physics, frame_scale);
        self.report_step(BodyRef::Player, was_grounded, &report, frame_scale);

        for i in 0..self.enemies.len() {
            if !self.enemies[i].is_simulated() {
                continue;
            }
            let enemy = &mut self.enemies[i];
            enemy.body.velocity.x = enemy.desired_vx;
            let was_grounded = enemy.body.grounded;
            let report = step_body(&mut enemy.body, self.scenes.active(), &self.physics, frame_scale);
            let id = enemy.id;
            self.report_step(BodyRef::Enemy(id), was_grounded, &report, frame_scale);
        }

        match self.scenes.check_zones(self.player.center()) {
            ZoneCheck::Fire(transition) => self.enter_scene(transition),
            ZoneCheck::Blocked { zone, first_report: true } => {
                self.events.invalid_zone.send(InvalidZoneEvent {
                    scene: self.scenes.active_id().to_string(),
                    zone,
                });
            }
            ZoneCheck::Blocked { .. } | ZoneCheck::Idle => {}
        }

        if let Some(position) = respawn_if_fallen(&mut self.player, &self.physics) {
            self.events.respawn.send(RespawnEvent { body: BodyRef::Player, position });
        }
        remember_valid_position(&mut self.player);

        for enemy in self.enemies.iter_mut().filter(|e| e.is_simulated()) {
            if let Some(position) = respawn_if_fallen(&mut enemy.body, &self.physics) {
                self.events.respawn.send(RespawnEvent { body: BodyRef::Enemy(enemy.id), position });
            }
            remember_valid_position(&mut enemy.body);
        }
    }

    fn report_step(&mut self, body: BodyRef, was_grounded: bool, report: &StepReport, frame_scale: f32) {
        if report.large_displacement {
            self.events.large_displacement.send(LargeDisplacementEvent {
                body,
                displacement: report.displacement,
                frame_scale,
            });
        }
        let position = match body {
            BodyRef::Player => Some(self.player.position),
            BodyRef::Enemy(id) => self.enemy(id).map(|e| e.body.position),
        };
        let grounded = match body {
            BodyRef::Player => self.player.grounded,
            BodyRef::Enemy(id) => self.enemy(id).map(|e| e.body.grounded).unwrap_or(false),
        };
        if let Some(position) = position {
            if grounded && !was_grounded {
                self.events.landed.send(LandedEvent { body, position });
            }
        }
    }

    fn enter_scene(&mut self, transition: Transition) {
        self.player.place(transition.spawn);
        if !self.scenes.apply_transition(&transition, self.player.center()) {
            return;
        }
        self.player.last_valid = Some(transition.spawn);
        self.reset_camera();
        self.events.scene_changed.send(SceneChangedEvent {
            from: transition.from,
            to: transition.to,
            zone: Some(transition.zone),
            spawn: transition.spawn,
        });
        self.report_diagnostics();
    }

    fn report_diagnostics(&mut self) {
        for diag in self.scenes.diagnostics() {
            self.events.diagnostics.send(diag.clone());
        }
    }

    /// Camera target that centres the design view on the controlled body
    fn follow_player(&mut self) {
        if self.camera.mode() == CameraMode::Tracking {
            let half_view = self.viewport.design_size() * 0.5;
            self.camera.set_target(self.player.center() - half_view);
        }
    }

    fn reset_camera(&mut self) {
        self.camera.reset();
        self.follow_player();
        self.camera.snap_to_target();
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Apply a command issued while in `mode`.
    ///
    /// Entity edits are refused in play mode: the integrator is their only
    /// writer while the simulation runs.
    pub fn apply_command(&mut self, mode: Mode, command: Command) -> Result<(), CommandError> {
        let name = command.name();
        let result = self.apply_command_inner(mode, command);
        if let Err(e) = &result {
            debug!(command = name, error = %e, "command rejected");
        }
        result
    }

    fn apply_command_inner(&mut self, mode: Mode, command: Command) -> Result<(), CommandError> {
        let name = command.name();
        if command.edits_entities() && mode.is_simulating() {
            return Err(CommandError::WrongMode { command: name, mode });
        }
        let finite = |v: Vec2| if v.is_finite() { Ok(v) } else { Err(CommandError::InvalidValue { command: name }) };
        let size = |v: Vec2| {
            if v.is_finite() && v.x >= 0.0 && v.y >= 0.0 {
                Ok(v)
            } else {
                Err(CommandError::InvalidValue { command: name })
            }
        };

        match command {
            Command::MoveBody { body, position } => {
                let position = finite(position)?;
                self.body_mut(body)?.place(position);
            }
            Command::SetBodyVelocity { body, velocity } => {
                let velocity = finite(velocity)?;
                self.body_mut(body)?.velocity = velocity;
            }
            Command::MoveZone { zone, position } => {
                let position = finite(position)?;
                let z = self.scenes.active_mut().zone_mut(&zone).ok_or(CommandError::UnknownZone(zone))?;
                z.rect.x = position.x;
                z.rect.y = position.y;
            }
            Command::ResizeZone { zone, size: new_size } => {
                let new_size = size(new_size)?;
                let z = self.scenes.active_mut().zone_mut(&zone).ok_or(CommandError::UnknownZone(zone))?;
                z.rect.w = new_size.x;
                z.rect.h = new_size.y;
            }
            Command::SetZoneTarget { zone, target, spawn } => {
                if let Some(spawn) = spawn {
                    finite(spawn)?;
                }
                let z = self.scenes.active_mut().zone_mut(&zone).ok_or(CommandError::UnknownZone(zone))?;
                z.target = target;
                z.target_spawn = spawn;
                self.scenes.refresh_diagnostics();
            }
            Command::MoveStaticBody { id, position } => {
                let position = finite(position)?;
                self.scenes.active_mut().body_mut(id).ok_or(CommandError::UnknownBody(id))?.set_position(position);
            }
            Command::ResizeStaticBody { id, size: new_size } => {
                let new_size = size(new_size)?;
                self.scenes.active_mut().body_mut(id).ok_or(CommandError::UnknownBody(id))?.set_size(new_size);
            }
            Command::SetSceneBoundary { boundary } => {
                if let Some(b) = boundary {
                    finite(Vec2::new(b.left, b.top))?;
                    finite(Vec2::new(b.right, b.bottom))?;
                }
                self.scenes.active_mut().boundary = boundary;
                self.scenes.refresh_diagnostics();
            }
            Command::SetSpawn { spawn } => {
                if let Some(spawn) = spawn {
                    finite(spawn)?;
                }
                self.scenes.active_mut().settings.spawn = spawn;
                self.scenes.refresh_diagnostics();
            }
            Command::ActivateScene { scene } => {
                let from = self.scenes.active_id().to_string();
                if !self.scenes.activate(&scene) {
                    return Err(CommandError::UnknownScene(scene));
                }
                let spawn = self.scenes.active().spawn().unwrap_or(self.physics.default_respawn);
                self.player.place(spawn);
                self.player.last_valid = None;
                self.scenes.latch_at(self.player.center());
                self.reset_camera();
                self.events.scene_changed.send(SceneChangedEvent { from, to: scene, zone: None, spawn });
                self.report_diagnostics();
            }

            Command::ToggleCameraMode => {
                self.stop_auto_scroll();
                let mode = self.camera.toggle_mode();
                debug!(camera_mode = mode.label(), "camera mode toggled");
            }
            Command::StartDrag { pointer } => {
                self.camera.start_drag(finite(pointer)?, &self.viewport);
            }
            Command::UpdateDrag { pointer } => {
                self.camera.update_drag(finite(pointer)?);
            }
            Command::EndDrag => {
                self.camera.end_drag();
                self.stop_auto_scroll();
            }
            Command::Nudge { delta } => {
                self.camera.nudge(finite(delta)?);
            }
            Command::EdgeScroll { pointer } => {
                let direction = Camera::edge_scroll_direction(
                    finite(pointer)?,
                    self.viewport.surface_size(),
                    self.camera_settings.edge_scroll_margin,
                );
                if direction != Vec2::ZERO {
                    self.camera.nudge(direction * self.camera_settings.edge_scroll_speed);
                }
            }
            Command::StartAutoScroll { direction } => {
                let direction = finite(direction)?;
                if self.camera.mode() == CameraMode::Free && !mode.is_simulating() {
                    self.stop_auto_scroll();
                    self.auto_scroll = Some(AutoScrollTask::new(
                        self.effect_sender(),
                        direction * self.camera_settings.edge_scroll_speed,
                        self.camera_settings.auto_scroll_interval_secs,
                    ));
                }
            }
            Command::StopAutoScroll => {
                self.stop_auto_scroll();
            }

            Command::ResizeSurface { size: surface } => {
                self.viewport.set_surface(finite(surface)?);
            }
            Command::SetPolicy { policy } => {
                self.set_policy(policy);
            }
        }
        Ok(())
    }

    fn set_policy(&mut self, policy: ScalePolicy) {
        self.viewport.set_policy(policy);
        debug!(policy = policy.label(), "viewport policy changed");
    }

    fn body_mut(&mut self, body: BodyRef) -> Result<&mut DynamicBody, CommandError> {
        match body {
            BodyRef::Player => Ok(&mut self.player),
            BodyRef::Enemy(id) => self.enemy_mut(id).map(|e| &mut e.body).ok_or(CommandError::UnknownEnemy(id)),
        }
    }
}
