use crate::ball::{Ball, CUE_BALL};
use crate::config::SimConfig;
use crate::shot::{release, step_charge, AimRay, ShotCharge};
use crate::simulation::{Simulation, TickReport};
use crate::vec3::Vec3;

/// A shot that left the cue.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotFired {
    pub velocity: Vec3,
    pub strength: f64,
}

/// One table plus the shot trigger driving it. Front-ends feed input and call
/// [`Session::tick`] at the configured rate.
#[derive(Debug, Clone)]
pub struct Session {
    sim: Simulation,
    charge: ShotCharge,
    config: SimConfig,
}

impl Session {
    pub fn new(config: SimConfig) -> Self {
        let sim = Simulation::new(config.table, config.physics);
        Self {
            sim,
            charge: ShotCharge::default(),
            config,
        }
    }

    pub fn with_balls(balls: Vec<Ball>, config: SimConfig) -> Self {
        let sim = Simulation::with_balls(balls, config.table, config.physics);
        Self {
            sim,
            charge: ShotCharge::default(),
            config,
        }
    }

    pub fn press_trigger(&mut self) {
        self.charge.trigger_held = true;
    }

    /// Let go of the trigger. The cue ball takes the charged velocity if the
    /// aim is on it.
    pub fn release_trigger(&mut self, aim: AimRay) -> Option<ShotFired> {
        let strength = self.charge.strength;
        let cue = self.sim.cue_ball()?.clone();
        let (charge, velocity) = release(self.charge, &aim, &cue);
        self.charge = charge;

        let velocity = velocity?;
        let ball = self.sim.ball_mut(CUE_BALL)?;
        ball.set_movement(velocity);
        tracing::debug!("shot fired at strength {:.5}", strength);

        Some(ShotFired {
            velocity: ball.velocity,
            strength,
        })
    }

    /// Charge from the state before motion, then advance the table.
    pub fn tick(&mut self) -> TickReport {
        self.charge = step_charge(self.charge, &self.config.shot, self.sim.all_at_rest());
        self.sim.step()
    }

    /// Let go of the trigger without shooting. Any charge is lost.
    pub fn cancel_trigger(&mut self) {
        self.charge = ShotCharge::default();
    }

    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    pub fn balls(&self) -> &[Ball] {
        self.sim.balls()
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn strength(&self) -> f64 {
        self.charge.strength
    }

    pub fn trigger_held(&self) -> bool {
        self.charge.trigger_held
    }

    pub fn at_rest(&self) -> bool {
        self.sim.all_at_rest()
    }

    pub fn tick_count(&self) -> u64 {
        self.sim.tick_count()
    }
}
