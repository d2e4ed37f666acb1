//! Session aggregation: score, structure integrity and game over.
//!
//! Values are published on the reliable channel only when they change.

use serde::Serialize;
use tracing::info;

use rampart_core::constants::INTEGRITY_EPSILON;
use rampart_core::enums::GamePhase;
use rampart_core::events::Signal;

use super::combat::CombatTally;
use crate::world::World;
use crate::world_setup::panel_health;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SessionState {
    pub phase: GamePhase,
    pub score: u32,
    pub wave: u32,
    /// Remaining panel health as a percentage of the starting total.
    pub integrity: f32,
    /// Summed max health of the panels placed at session start.
    pub panel_max_total: f32,
    #[serde(skip)]
    published_score: u32,
    #[serde(skip)]
    published_integrity: f32,
}

impl SessionState {
    /// A fresh active session over panels totalling `panel_max_total` health.
    pub fn begin(panel_max_total: f32) -> Self {
        Self {
            phase: GamePhase::Active,
            integrity: 100.0,
            panel_max_total,
            published_integrity: 100.0,
            ..Default::default()
        }
    }
}

/// Fold this frame's combat tally into the session and publish changes.
pub fn run(world: &mut World, session: &mut SessionState, tally: &CombatTally) {
    if session.phase != GamePhase::Active {
        return;
    }
    session.score += tally.score;
    if session.score != session.published_score {
        session.published_score = session.score;
        world.bus.signal(Signal::ScoreChanged {
            score: session.score,
        });
    }

    session.integrity = if session.panel_max_total > 0.0 {
        (panel_health(&world.registry) / session.panel_max_total * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    };
    if (session.integrity - session.published_integrity).abs() > INTEGRITY_EPSILON {
        session.published_integrity = session.integrity;
        world.bus.signal(Signal::IntegrityChanged {
            percent: session.integrity,
        });
    }

    let structure_lost = session.panel_max_total > 0.0 && session.integrity <= INTEGRITY_EPSILON;
    if structure_lost || tally.player_down {
        session.phase = GamePhase::GameOver;
        info!(
            score = session.score,
            wave = session.wave,
            "game over"
        );
        world.bus.signal(Signal::GameOver {
            score: session.score,
            wave: session.wave,
        });
    }
}
