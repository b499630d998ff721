use billiards_shared::protocol::{
    PocketedMsg, ShotFiredMsg, TableStateMsg, WelcomeMsg, PROTOCOL_VERSION,
};
use billiards_shared::session::Session;
use billiards_shared::shot::AimRay;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;

use crate::autoplay::{heading_degrees, Autoplay, AutoplayAction};
use crate::config::ServerConfig;

/// Viewer id used for shots taken by autoplay
pub const AUTOPLAY_ID: u32 = 0;

/// A connected viewer.
#[derive(Debug, Clone, Default)]
pub struct Viewer {
    pub id: u32,
    pub shots: u32,
}

/// Messages produced by one tick of the game state.
#[derive(Debug, Default)]
pub struct TickOutcome {
    pub pocketed: Vec<PocketedMsg>,
    pub shots: Vec<ShotFiredMsg>,
}

/// Central game state owned by the game loop task.
pub struct GameState {
    pub session: Session,
    pub viewers: HashMap<u32, Viewer>,
    pub autoplay: Autoplay,
    pub rng: ChaCha8Rng,
    /// Seconds per tick
    dt: f64,
    next_viewer_id: u32,
}

impl GameState {
    pub fn new(config: &ServerConfig) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(config.rng_seed);
        let autoplay = Autoplay::new(config.autoplay.clone(), &mut rng);

        Self {
            session: Session::new(config.sim),
            viewers: HashMap::new(),
            autoplay,
            rng,
            dt: config.sim.physics.tick_duration().as_secs_f64(),
            next_viewer_id: AUTOPLAY_ID + 1,
        }
    }

    /// Register a new viewer and return its id
    pub fn add_viewer(&mut self) -> u32 {
        let id = self.next_viewer_id;
        self.next_viewer_id += 1;
        self.viewers.insert(id, Viewer { id, shots: 0 });
        id
    }

    pub fn remove_viewer(&mut self, id: u32) {
        self.viewers.remove(&id);
    }

    pub fn welcome(&self, self_id: u32) -> WelcomeMsg {
        WelcomeMsg {
            protocol_version: PROTOCOL_VERSION,
            server_version: env!("CARGO_PKG_VERSION").to_string(),
            self_id,
            config: *self.session.config(),
            table: self.table_state(),
        }
    }

    pub fn table_state(&self) -> TableStateMsg {
        TableStateMsg::from(&self.session)
    }

    /// Any viewer input counts as activity and holds off autoplay. A charge
    /// autoplay was building is dropped with it.
    pub fn activity(&mut self) {
        if self.autoplay.note_activity() {
            tracing::debug!("Viewer input cancelled autoplay charge");
            self.session.cancel_trigger();
        }
    }

    pub fn trigger_down(&mut self, id: u32) {
        if !self.viewers.contains_key(&id) {
            return;
        }
        self.activity();
        self.session.press_trigger();
    }

    /// Release on behalf of a viewer. Returns the shot if one was fired.
    pub fn trigger_up(&mut self, id: u32, aim: AimRay) -> Option<ShotFiredMsg> {
        if !self.viewers.contains_key(&id) {
            return None;
        }
        self.activity();
        let shot = self.session.release_trigger(aim)?;
        if let Some(viewer) = self.viewers.get_mut(&id) {
            viewer.shots += 1;
        }
        tracing::info!(
            "Viewer {} shot at strength {:.4}, heading {:.1} deg",
            id,
            shot.strength,
            heading_degrees(shot.velocity)
        );
        Some(ShotFiredMsg::new(id, &shot))
    }

    /// Run autoplay, then advance the table by one tick.
    pub fn tick(&mut self) -> TickOutcome {
        let mut outcome = TickOutcome::default();

        match self.autoplay.tick(self.dt, &self.session, &mut self.rng) {
            Some(AutoplayAction::PressTrigger) => self.session.press_trigger(),
            Some(AutoplayAction::ReleaseTrigger(aim)) => {
                if let Some(shot) = self.session.release_trigger(aim) {
                    tracing::info!(
                        "Autoplay shot at strength {:.4}, heading {:.1} deg",
                        shot.strength,
                        heading_degrees(shot.velocity)
                    );
                    outcome.shots.push(ShotFiredMsg::new(AUTOPLAY_ID, &shot));
                }
            }
            Some(AutoplayAction::CancelTrigger) => self.session.cancel_trigger(),
            None => {}
        }

        let report = self.session.tick();
        for ball in report.pocketed() {
            tracing::info!("Ball {} pocketed on tick {}", ball, report.tick);
            outcome.pocketed.push(PocketedMsg {
                ball: ball as u32,
                tick: report.tick,
            });
        }
        if report.came_to_rest {
            tracing::debug!("Table at rest on tick {}", report.tick);
        }

        outcome
    }

    pub fn viewer_count(&self) -> usize {
        self.viewers.len()
    }
}
