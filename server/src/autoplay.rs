//! Server-side idle shooter that keeps the table moving when nobody plays.
//!
//! Autoplay goes through the same trigger as a viewer: it presses, lets the
//! charge build for a few ticks, then releases with an aim ray through the
//! cue ball toward a randomly chosen object ball.

use billiards_shared::ball::CUE_BALL;
use billiards_shared::session::Session;
use billiards_shared::shot::AimRay;
use billiards_shared::vec3::{rotate_around_axis, sub, try_normalize, vec3, Vec3};
use rand::Rng;

use crate::config::AutoplayConfig;

/// Distance of the virtual camera behind the cue ball
const CAMERA_BACK: f64 = 1.0;
/// Height of the virtual camera above the cue ball
const CAMERA_UP: f64 = 0.75;

/// Shooting style, picked once per autoplay instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    /// Short charge, precise aim
    Soft,
    /// Mid-range charge, small aim error
    Steady,
    /// Any charge, wide aim error
    Wild,
}

impl Style {
    /// Fraction of the configured charge range this style draws from
    fn charge_span(&self) -> (f64, f64) {
        match self {
            Style::Soft => (0.0, 0.4),
            Style::Steady => (0.3, 0.8),
            Style::Wild => (0.0, 1.0),
        }
    }

    /// Maximum aim error in radians
    fn aim_error(&self) -> f64 {
        match self {
            Style::Soft => 0.02,
            Style::Steady => 0.08,
            Style::Wild => 0.4,
        }
    }

    pub fn random(rng: &mut impl Rng) -> Self {
        match rng.gen_range(0..3) {
            0 => Style::Soft,
            1 => Style::Steady,
            _ => Style::Wild,
        }
    }
}

/// What the game loop should do with the session this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AutoplayAction {
    PressTrigger,
    ReleaseTrigger(AimRay),
    /// Nothing left to aim at; drop the charge
    CancelTrigger,
}

#[derive(Debug)]
pub struct Autoplay {
    config: AutoplayConfig,
    pub style: Style,
    /// Seconds since the last viewer input
    idle: f64,
    /// Ticks left to charge before releasing
    charging: Option<u32>,
}

impl Autoplay {
    pub fn new(config: AutoplayConfig, rng: &mut impl Rng) -> Self {
        let style = Style::random(rng);
        if config.enabled {
            tracing::info!("Autoplay enabled with {:?} style", style);
        }
        Self {
            config,
            style,
            idle: 0.0,
            charging: None,
        }
    }

    /// A viewer did something. Restarts the idle clock and abandons any
    /// shot in progress. Returns true if a charge was abandoned.
    pub fn note_activity(&mut self) -> bool {
        self.idle = 0.0;
        self.charging.take().is_some()
    }

    pub fn is_charging(&self) -> bool {
        self.charging.is_some()
    }

    /// Advance by one tick of `dt` seconds.
    pub fn tick(&mut self, dt: f64, session: &Session, rng: &mut impl Rng) -> Option<AutoplayAction> {
        if !self.config.enabled {
            return None;
        }

        if let Some(ref mut left) = self.charging {
            *left = left.saturating_sub(1);
            if *left > 0 {
                return None;
            }
            self.charging = None;
            return match self.aim(session, rng) {
                Some(aim) => Some(AutoplayAction::ReleaseTrigger(aim)),
                None => Some(AutoplayAction::CancelTrigger),
            };
        }

        self.idle += dt;
        if self.idle < self.config.idle_secs || !session.at_rest() {
            return None;
        }
        self.idle = 0.0;

        // Pocketed balls stay pocketed, so a finished table stays still
        let cue_in_play = session.balls().get(CUE_BALL).is_some_and(|b| b.active);
        if !cue_in_play || session.simulation().active_count() <= 1 {
            return None;
        }

        self.charging = Some(self.charge_ticks(rng));
        Some(AutoplayAction::PressTrigger)
    }

    fn charge_ticks(&self, rng: &mut impl Rng) -> u32 {
        let (lo, hi) = self.style.charge_span();
        let span = (self.config.max_charge_ticks - self.config.min_charge_ticks) as f64;
        let t = lo + rng.gen::<f64>() * (hi - lo);
        self.config.min_charge_ticks + (span * t).round() as u32
    }

    /// Aim ray from a camera behind the cue ball, through its center, toward
    /// a random object ball. `None` if the cue ball or every target is gone.
    fn aim(&self, session: &Session, rng: &mut impl Rng) -> Option<AimRay> {
        let balls = session.balls();
        let cue = balls.get(CUE_BALL).filter(|b| b.active)?;

        let targets: Vec<Vec3> = balls
            .iter()
            .enumerate()
            .filter(|(i, b)| *i != CUE_BALL && b.active)
            .map(|(_, b)| b.position)
            .collect();
        if targets.is_empty() {
            return None;
        }
        let target = targets[rng.gen_range(0..targets.len())];

        let toward = try_normalize(vec3(
            target.x - cue.position.x,
            0.0,
            target.z - cue.position.z,
        ))?;
        let error = self.style.aim_error();
        let heading = rotate_around_axis(toward, vec3(0.0, 1.0, 0.0), rng.gen_range(-error..=error));

        let origin = vec3(
            cue.position.x - heading.x * CAMERA_BACK,
            cue.position.y + CAMERA_UP,
            cue.position.z - heading.z * CAMERA_BACK,
        );
        Some(AimRay::new(origin, sub(cue.position, origin)))
    }
}

/// Horizontal heading of a shot, for logging
pub fn heading_degrees(velocity: Vec3) -> f64 {
    velocity.z.atan2(velocity.x).to_degrees()
}
