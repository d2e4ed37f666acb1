//! Simulation engine: the owning driver of the per-frame loop.
//!
//! `Simulation` owns the [`World`], processes queued commands, runs every
//! system in a fixed order and produces [`FrameSnapshot`]s. Completely
//! headless, so it can be driven from tests with no presentation layer.

use std::collections::VecDeque;

use glam::Vec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use rampart_core::constants::MAX_FRAME_DELTA;
use rampart_core::enums::GamePhase;
use rampart_core::events::{FastEvent, Signal, SignalKind};
use rampart_core::types::SimTime;
use rampart_core::EntityId;

use crate::bus::{Outbox, SubscriptionId};
use crate::commands::SimCommand;
use crate::config::SimConfig;
use crate::error::SimResult;
use crate::spawner::{ArchetypeLibrary, Placement};
use crate::systems;
use crate::systems::behavior::BehaviorRegistry;
use crate::systems::collision::{CollisionMatrix, Contact};
use crate::systems::combat::CombatTally;
use crate::systems::session::SessionState;
use crate::systems::snapshot::FrameSnapshot;
use crate::systems::waves::WaveSchedule;
use crate::world::World;
use crate::world_setup;

/// The simulation engine. Owns the world and all session state.
pub struct Simulation {
    world: World,
    config: SimConfig,
    library: ArchetypeLibrary,
    behaviors: BehaviorRegistry,
    matrix: CollisionMatrix,
    rng: ChaCha8Rng,
    command_queue: VecDeque<SimCommand>,
    schedule: WaveSchedule,
    session: SessionState,
    despawn_buffer: Vec<EntityId>,
    contacts: Vec<Contact>,
    tally: CombatTally,
    /// Last driver clock reading, to detect a clock running backwards.
    driver_time: Option<f32>,
}

impl Simulation {
    /// Create an engine with the built-in archetype library.
    pub fn new(config: SimConfig) -> SimResult<Self> {
        Self::with_library(config, ArchetypeLibrary::builtin())
    }

    /// Create an engine with a custom archetype library.
    ///
    /// Fails if the config is invalid or any archetype names a component the
    /// store cannot build.
    pub fn with_library(config: SimConfig, library: ArchetypeLibrary) -> SimResult<Self> {
        config.validate()?;
        let world = World::new(&config)?;
        library.validate(world.registry.store())?;
        Ok(Self {
            world,
            library,
            behaviors: BehaviorRegistry::with_defaults(),
            matrix: CollisionMatrix::with_defaults(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            command_queue: VecDeque::new(),
            schedule: WaveSchedule::new(config.wave_spawn_interval),
            session: SessionState::default(),
            despawn_buffer: Vec::new(),
            contacts: Vec::new(),
            tally: CombatTally::default(),
            driver_time: None,
            config,
        })
    }

    /// Queue a command for processing at the next frame boundary.
    pub fn queue_command(&mut self, command: SimCommand) {
        self.command_queue.push_back(command);
    }

    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = SimCommand>) {
        self.command_queue.extend(commands);
    }

    /// Advance one frame and return the resulting snapshot.
    ///
    /// `delta` is clamped to `[0, MAX_FRAME_DELTA]`. `time` is the driver's
    /// clock; when it runs backwards the frame advances by zero.
    pub fn update(&mut self, delta: f32, time: f32) -> FrameSnapshot {
        let mut dt = if delta.is_finite() {
            delta.clamp(0.0, MAX_FRAME_DELTA)
        } else {
            0.0
        };
        if time.is_finite() {
            if self.driver_time.is_some_and(|last| time < last) {
                dt = 0.0;
            }
            self.driver_time = Some(time);
        }

        self.world.bus.signals.clear_journal();
        self.process_commands();

        if self.session.phase == GamePhase::Active {
            self.world.time.advance(dt);
            self.run_systems(dt);
        }

        systems::snapshot::build_snapshot(&self.world, &self.session)
    }

    /// Run all systems in order.
    fn run_systems(&mut self, dt: f32) {
        // 1. Wave spawning
        let released = systems::waves::run(
            &mut self.world,
            &self.library,
            &mut self.schedule,
            &mut self.rng,
            dt,
        );
        if released > 0 {
            debug!(
                released,
                pending = self.schedule.pending(),
                wave = self.schedule.wave(),
                "enemies released"
            );
        }
        // 2. Timers and lifetimes
        systems::timers::tick_behaviors(&mut self.world, dt);
        systems::timers::tick_lifetimes(&mut self.world, dt, &mut self.despawn_buffer);
        // 3. Movement integration
        systems::movement::run(&mut self.world, dt);
        // 4. Broad-phase rebuild
        systems::grid::run(&mut self.world);
        // 5. Behavior dispatch and turret weapon
        systems::behavior::run(&mut self.world, &self.behaviors);
        systems::weapon::run(&mut self.world, dt);
        // 6. Collision detection and resolution
        self.tally.clear();
        systems::collision::detect(&mut self.world, &mut self.contacts);
        for contact in &self.contacts {
            self.matrix
                .resolve(&mut self.world, contact, &mut self.tally);
        }
        // 7. Deferred projectile spawns
        self.apply_spawns();
        // 8. Cleanup
        systems::cleanup::run(&mut self.world, &mut self.despawn_buffer);
        // 9. Session aggregation
        systems::session::run(&mut self.world, &mut self.session, &self.tally);
        // 10. Render sync
        systems::render_sync::run(&mut self.world, dt);
    }

    fn apply_spawns(&mut self) {
        let requests = std::mem::take(&mut self.world.spawns);
        for request in &requests {
            if let Err(err) = self
                .library
                .spawn_projectile(&mut self.world.registry, request)
            {
                warn!(archetype = request.archetype, %err, "projectile spawn failed");
            }
        }
        self.world.spawns = requests;
        self.world.spawns.clear();
    }

    /// Process all queued commands.
    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            self.handle_command(command);
        }
    }

    fn handle_command(&mut self, command: SimCommand) {
        match command {
            SimCommand::StartWave => {
                if self.session.phase != GamePhase::Active {
                    if let Err(err) = self.begin_session() {
                        warn!(%err, "session setup failed");
                        return;
                    }
                }
                let (wave, enemies) = self.schedule.start_next();
                self.session.wave = wave;
                self.world.bus.signal(Signal::WaveStarted { wave, enemies });
            }
            SimCommand::Reset => self.reset(),
            SimCommand::Spawn { archetype, x, y } => {
                if !self.library.contains(&archetype) {
                    warn!(%archetype, "unknown archetype requested");
                    return;
                }
                if let Err(err) = self.spawn(&archetype, Vec2::new(x, y)) {
                    warn!(%archetype, %err, "sandbox spawn failed");
                }
            }
            SimCommand::SetUpgrade { key, level } => {
                self.world.upgrades.set(key, level);
            }
        }
    }

    fn begin_session(&mut self) -> SimResult<()> {
        self.clear_world();
        let panel_total =
            world_setup::setup_arena(&mut self.world.registry, &self.library, &self.config)?;
        self.session = SessionState::begin(panel_total);
        info!(
            seed = self.config.seed,
            panels = self.config.panels,
            "session started"
        );
        Ok(())
    }

    fn reset(&mut self) {
        self.clear_world();
        self.session = SessionState::default();
        self.world.bus.signal(Signal::SessionReset);
        info!("session reset");
    }

    /// Empty the registry and per-session state. The fast channel keeps its
    /// write cursor so readers never see it go backwards.
    fn clear_world(&mut self) {
        self.world.registry.clear();
        self.world.grid.clear();
        self.world.spawns.clear();
        self.world.time = SimTime::default();
        self.schedule.reset();
        self.tally.clear();
    }

    /// Spawn an archetype immediately, outside the command queue.
    pub fn spawn(&mut self, archetype: &str, position: Vec2) -> SimResult<EntityId> {
        self.library
            .spawn(&mut self.world.registry, archetype, Placement::at(position))
    }

    // --- Event access ---

    /// Replay fast-channel records written since `cursor`; returns the new cursor.
    pub fn read_fast_events(&self, cursor: u64, handler: impl FnMut(&FastEvent)) -> u64 {
        self.world.bus.fast.read_events(cursor, handler)
    }

    /// Cursor a new reader should start from to see only future records.
    pub fn fast_cursor(&self) -> u64 {
        self.world.bus.fast.cursor()
    }

    /// Signals delivered during the most recent `update`.
    pub fn signals(&self) -> &[Signal] {
        self.world.bus.signals.journal()
    }

    pub fn subscribe(
        &mut self,
        kind: SignalKind,
        handler: impl FnMut(&Signal, &mut Outbox<'_>) + 'static,
    ) -> SubscriptionId {
        self.world.bus.signals.subscribe(kind, handler)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.world.bus.signals.unsubscribe(id)
    }

    // --- Accessors ---

    pub fn phase(&self) -> GamePhase {
        self.session.phase
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn time(&self) -> SimTime {
        self.world.time
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Read-only access to the world.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable access to the world, for tests and tooling.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn library(&self) -> &ArchetypeLibrary {
        &self.library
    }

    /// Replace the routine for a behavior kind.
    pub fn behaviors_mut(&mut self) -> &mut BehaviorRegistry {
        &mut self.behaviors
    }

    pub fn matrix_mut(&mut self) -> &mut CollisionMatrix {
        &mut self.matrix
    }

    /// Build a snapshot without advancing.
    pub fn snapshot(&self) -> FrameSnapshot {
        systems::snapshot::build_snapshot(&self.world, &self.session)
    }
}
