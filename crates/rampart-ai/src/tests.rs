#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use glam::Vec2;

    use rampart_core::components::{BehaviorState, CombatStats, Health, Scratch};
    use rampart_core::constants::*;
    use rampart_core::enums::{AiState, BehaviorKind, Theme, TimerKey};
    use rampart_core::events::{EffectKind, SoundKey};
    use rampart_core::EntityId;

    use crate::context::{BehaviorContext, ProjectileRequest, Subject};
    use crate::profiles::get_profile;
    use crate::routines::routine_for;
    use crate::steering::{cruise_speed, pan_of, panel_target};

    const PANEL: EntityId = EntityId {
        index: 1,
        generation: 0,
    };
    const TURRET: EntityId = EntityId {
        index: 0,
        generation: 0,
    };

    #[derive(Default)]
    struct MockContext {
        elapsed: f32,
        delta: f32,
        positions: HashMap<EntityId, Vec2>,
        panels: Vec<EntityId>,
        player: Option<EntityId>,
        upgrades: HashMap<String, u32>,
        projectiles: Vec<ProjectileRequest>,
        effects: Vec<EffectKind>,
        sounds: Vec<SoundKey>,
    }

    impl MockContext {
        fn arena() -> Self {
            let mut ctx = MockContext {
                delta: 1.0 / 60.0,
                ..Default::default()
            };
            ctx.positions.insert(TURRET, Vec2::ZERO);
            ctx.positions.insert(PANEL, Vec2::new(100.0, 0.0));
            ctx.panels.push(PANEL);
            ctx.player = Some(TURRET);
            ctx
        }

        fn kill(&mut self, id: EntityId) {
            self.positions.remove(&id);
            self.panels.retain(|p| *p != id);
            if self.player == Some(id) {
                self.player = None;
            }
        }
    }

    impl BehaviorContext for MockContext {
        fn elapsed(&self) -> f32 {
            self.elapsed
        }
        fn delta(&self) -> f32 {
            self.delta
        }
        fn spawn_projectile(&mut self, request: ProjectileRequest) {
            self.projectiles.push(request);
        }
        fn spawn_effect(&mut self, effect: EffectKind, _theme: Theme, _at: Vec2, _angle: f32) {
            self.effects.push(effect);
        }
        fn play_sound(&mut self, sound: SoundKey, _pan: f32) {
            self.sounds.push(sound);
        }
        fn locate(&self, id: EntityId) -> Option<Vec2> {
            self.positions.get(&id).copied()
        }
        fn nearest_panel(&self, from: Vec2) -> Option<(EntityId, Vec2)> {
            self.panels
                .iter()
                .filter_map(|id| self.positions.get(id).map(|p| (*id, *p)))
                .min_by(|a, b| a.1.distance(from).total_cmp(&b.1.distance(from)))
        }
        fn player(&self) -> Option<(EntityId, Vec2)> {
            let id = self.player?;
            Some((id, *self.positions.get(&id)?))
        }
        fn upgrade_level(&self, key: &str) -> u32 {
            self.upgrades.get(key).copied().unwrap_or(0)
        }
    }

    fn make_subject(kind: BehaviorKind, position: Vec2, state: AiState) -> Subject {
        let mut behavior = BehaviorState {
            kind,
            ..Default::default()
        };
        behavior.enter(state, 0.0);
        Subject {
            id: EntityId::new(7, 0),
            position,
            max_speed: 80.0,
            state: behavior,
            combat: CombatStats {
                damage: 1.0,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Run `ticks` routine calls, counting the state timer down between them
    /// the way the simulation does.
    fn run(subject: &mut Subject, ctx: &mut MockContext, ticks: usize) {
        let routine = routine_for(subject.state.kind);
        for _ in 0..ticks {
            subject.state.timers.tick(ctx.delta);
            routine(subject, ctx);
            subject.position += subject.velocity * ctx.delta;
            ctx.elapsed += ctx.delta;
        }
    }

    // --- Spawn ---

    #[test]
    fn test_spawn_holds_until_timer_expires() {
        let mut ctx = MockContext::arena();
        let mut subject = make_subject(BehaviorKind::Drifter, Vec2::new(400.0, 0.0), AiState::Spawn);
        subject.state.enter(AiState::Spawn, 0.1);

        run(&mut subject, &mut ctx, 3);
        assert_eq!(subject.state.state, AiState::Spawn);
        assert_eq!(subject.velocity, Vec2::ZERO);

        run(&mut subject, &mut ctx, 5);
        assert_eq!(subject.state.state, AiState::Move);
    }

    #[test]
    fn test_every_kind_has_a_profile_and_routine() {
        let mut ctx = MockContext::arena();
        for kind in BehaviorKind::ALL {
            let profile = get_profile(kind);
            assert!(profile.spawn_secs > 0.0, "{kind:?} spawns instantly");
            let mut subject = make_subject(kind, Vec2::new(300.0, 50.0), AiState::Spawn);
            run(&mut subject, &mut ctx, 2);
            assert_ne!(subject.state.state, AiState::Spawn, "{kind:?} stuck in Spawn");
        }
    }

    // --- Drifter ---

    #[test]
    fn test_drifter_seeks_nearest_panel() {
        let mut ctx = MockContext::arena();
        let mut subject = make_subject(BehaviorKind::Drifter, Vec2::new(400.0, 0.0), AiState::Move);

        run(&mut subject, &mut ctx, 1);
        assert_eq!(subject.target, Some(PANEL));
        assert!(subject.velocity.x < 0.0, "heads toward the panel");
    }

    #[test]
    fn test_drifter_cycles_attack_and_cooldown() {
        let mut ctx = MockContext::arena();
        let mut subject = make_subject(BehaviorKind::Drifter, Vec2::new(130.0, 0.0), AiState::Move);

        run(&mut subject, &mut ctx, 1);
        assert_eq!(subject.state.state, AiState::Attack);

        let profile = get_profile(BehaviorKind::Drifter);
        run(&mut subject, &mut ctx, (profile.active_secs * 60.0) as usize + 2);
        assert_eq!(subject.state.state, AiState::Cooldown);

        // Expire the cooldown directly; backing off may leave it inside attack range.
        subject.state.timers.set(TimerKey::State, 0.0);
        run(&mut subject, &mut ctx, 1);
        assert_eq!(subject.state.state, AiState::Move);
    }

    #[test]
    fn test_dropped_target_is_cleared_then_reacquired() {
        let mut ctx = MockContext::arena();
        let other = EntityId::new(2, 0);
        ctx.positions.insert(other, Vec2::new(-300.0, 0.0));
        ctx.panels.push(other);

        let mut subject = make_subject(BehaviorKind::Drifter, Vec2::new(400.0, 0.0), AiState::Move);
        run(&mut subject, &mut ctx, 1);
        assert_eq!(subject.target, Some(PANEL));

        ctx.kill(PANEL);
        run(&mut subject, &mut ctx, 1);
        assert_eq!(subject.target, None, "dangling handle cleared");

        run(&mut subject, &mut ctx, 1);
        assert_eq!(subject.target, Some(other), "reacquired next tick");
    }

    #[test]
    fn test_panel_target_falls_back_to_player() {
        let mut ctx = MockContext::arena();
        ctx.kill(PANEL);
        let mut subject = make_subject(BehaviorKind::Drifter, Vec2::new(400.0, 0.0), AiState::Move);
        assert_eq!(panel_target(&mut subject, &ctx), Some(Vec2::ZERO));
        assert_eq!(subject.target, Some(TURRET));
    }

    // --- Orbiter ---

    #[test]
    fn test_orbiter_enters_orbit_and_fires() {
        let mut ctx = MockContext::arena();
        let mut subject = make_subject(
            BehaviorKind::Orbiter,
            Vec2::new(100.0 + ORBITER_RADIUS, 0.0),
            AiState::Move,
        );

        run(&mut subject, &mut ctx, 1);
        assert_eq!(subject.state.state, AiState::Attack);
        let orbit = subject.orbit.expect("orbit assigned");
        assert_eq!(orbit.anchor, Some(PANEL));
        assert!((orbit.radius - ORBITER_RADIUS).abs() < 1e-3);

        run(&mut subject, &mut ctx, (ORBITER_FIRE_INTERVAL * 60.0) as usize);
        assert!(!ctx.projectiles.is_empty());
        let shot = &ctx.projectiles[0];
        assert_eq!(shot.archetype, "spit");
        assert_eq!(shot.owner, subject.id);
        assert!(shot.velocity.x < 0.0, "aimed at the panel");
    }

    #[test]
    fn test_orbiter_drops_orbit_when_anchor_dies() {
        let mut ctx = MockContext::arena();
        let mut subject = make_subject(
            BehaviorKind::Orbiter,
            Vec2::new(100.0 + ORBITER_RADIUS, 0.0),
            AiState::Move,
        );
        run(&mut subject, &mut ctx, 1);
        assert!(subject.orbit.is_some());

        ctx.kill(PANEL);
        run(&mut subject, &mut ctx, 1);
        assert!(subject.orbit.is_none());
        assert_eq!(subject.target, None);
        assert_eq!(subject.state.state, AiState::Move);
    }

    // --- Charger ---

    #[test]
    fn test_charger_caches_target_and_dashes() {
        let mut ctx = MockContext::arena();
        let mut subject = make_subject(BehaviorKind::Charger, Vec2::new(0.0, 200.0), AiState::Move);

        run(&mut subject, &mut ctx, 1);
        assert_eq!(subject.state.state, AiState::Charge);
        assert!(ctx.effects.contains(&EffectKind::Telegraph));
        assert!(ctx.sounds.contains(&SoundKey::Charge));
        match subject.state.scratch {
            Scratch::Charge { target, .. } => assert_eq!(target, Some(TURRET)),
            other => panic!("unexpected scratch {other:?}"),
        }

        run(&mut subject, &mut ctx, (CHARGER_CHARGE_SECS * 60.0) as usize + 2);
        assert_eq!(subject.state.state, AiState::Dash);
        assert!(subject.velocity.y < -CHARGER_DASH_SPEED * 0.9, "dashing down at the turret");
    }

    #[test]
    fn test_charger_accumulates_charge() {
        let mut ctx = MockContext::arena();
        let mut subject = make_subject(BehaviorKind::Charger, Vec2::new(0.0, 200.0), AiState::Move);
        run(&mut subject, &mut ctx, 30);
        match subject.state.scratch {
            Scratch::Charge { charge, .. } => assert!(charge > 0.3 && charge < 0.6, "charge {charge}"),
            other => panic!("unexpected scratch {other:?}"),
        }
    }

    #[test]
    fn test_charger_abandons_when_target_lost() {
        let mut ctx = MockContext::arena();
        let mut subject = make_subject(BehaviorKind::Charger, Vec2::new(0.0, 200.0), AiState::Move);
        run(&mut subject, &mut ctx, 1);
        assert_eq!(subject.state.state, AiState::Charge);

        ctx.kill(TURRET);
        run(&mut subject, &mut ctx, 1);
        assert_eq!(subject.state.state, AiState::Cooldown);
        assert_eq!(subject.state.scratch, Scratch::Empty);
    }

    // --- Spinner ---

    #[test]
    fn test_spinner_spins_up_to_cap() {
        let mut ctx = MockContext::arena();
        let mut subject = make_subject(BehaviorKind::Spinner, Vec2::new(300.0, 0.0), AiState::Move);
        run(&mut subject, &mut ctx, 600);
        match subject.state.scratch {
            Scratch::Spin { spin, .. } => assert_eq!(spin, SPINNER_MAX_SPIN),
            other => panic!("unexpected scratch {other:?}"),
        }
        assert_eq!(subject.angular, SPINNER_MAX_SPIN);
    }

    #[test]
    fn test_spinner_closes_on_player() {
        let mut ctx = MockContext::arena();
        let start = Vec2::new(300.0, 0.0);
        let mut subject = make_subject(BehaviorKind::Spinner, start, AiState::Move);
        run(&mut subject, &mut ctx, 120);
        assert!(subject.position.length() < start.length());
    }

    // --- Warden ---

    fn make_warden() -> Subject {
        let mut subject = make_subject(BehaviorKind::Warden, Vec2::new(0.0, 250.0), AiState::Charge);
        subject.state.enter(AiState::Charge, WARDEN_CHARGE_SECS);
        subject.health = Some(Health {
            current: 40.0,
            max: 40.0,
            shield: 10.0,
            max_shield: 10.0,
            shield_active: false,
        });
        subject
    }

    #[test]
    fn test_warden_shield_follows_state() {
        let mut ctx = MockContext::arena();
        let mut subject = make_warden();

        run(&mut subject, &mut ctx, 1);
        assert!(subject.health.unwrap().shield_active, "shielded while charging");

        run(&mut subject, &mut ctx, (WARDEN_CHARGE_SECS * 60.0) as usize + 2);
        assert_eq!(subject.state.state, AiState::Ready);
        assert!(!subject.health.unwrap().shield_active, "exposed while telegraphing");
    }

    #[test]
    fn test_spent_shield_stays_down() {
        let mut ctx = MockContext::arena();
        let mut subject = make_warden();
        if let Some(h) = subject.health.as_mut() {
            h.shield = 0.0;
        }
        run(&mut subject, &mut ctx, 1);
        assert!(!subject.health.unwrap().shield_active);
    }

    #[test]
    fn test_warden_fires_full_volley_then_cools_down() {
        let mut ctx = MockContext::arena();
        let mut subject = make_warden();
        let cycle = WARDEN_CHARGE_SECS + WARDEN_READY_SECS + 1.0;
        run(&mut subject, &mut ctx, (cycle * 60.0) as usize);

        assert_eq!(ctx.projectiles.len(), WARDEN_VOLLEY as usize);
        assert_eq!(subject.state.state, AiState::Cooldown);
        assert!(ctx.sounds.contains(&SoundKey::Volley));

        // Fan is symmetric around the aim (straight down).
        let first = ctx.projectiles[0].velocity.normalize();
        let last = ctx.projectiles[WARDEN_VOLLEY as usize - 1].velocity.normalize();
        assert!((first.x + last.x).abs() < 1e-3);
        assert!(first.y < 0.0 && last.y < 0.0);
    }

    #[test]
    fn test_warden_fire_timer_spaces_shots() {
        let mut ctx = MockContext::arena();
        let mut subject = make_warden();
        subject.state.enter(AiState::Fire, 0.0);
        subject.state.scratch = Scratch::Volley {
            charge: 0.0,
            shots_left: 3,
        };
        run(&mut subject, &mut ctx, 1);
        run(&mut subject, &mut ctx, 1);
        assert_eq!(ctx.projectiles.len(), 1, "second shot waits for the fire timer");
        assert!(subject.state.timers.running(TimerKey::Fire));
    }

    // --- Helpers ---

    #[test]
    fn test_slow_field_reduces_cruise_speed() {
        let mut ctx = MockContext::arena();
        let subject = make_subject(BehaviorKind::Drifter, Vec2::ZERO, AiState::Move);
        let base = cruise_speed(&subject, &ctx);
        ctx.upgrades.insert(UPGRADE_SLOW_FIELD.to_string(), 2);
        let slowed = cruise_speed(&subject, &ctx);
        assert_eq!(base, 80.0);
        assert!(slowed < base);
    }

    #[test]
    fn test_pan_clamps_to_unit_range() {
        assert_eq!(pan_of(0.0), 0.0);
        assert_eq!(pan_of(ARENA_HALF_WIDTH * 3.0), 1.0);
        assert_eq!(pan_of(-ARENA_HALF_WIDTH * 3.0), -1.0);
    }
}
