use crate::ball::{Ball, CUE_BALL};
use crate::collision::{check_pockets, check_rails, resolve_pair, Contact};
use crate::config::{PhysicsConfig, TableConfig};
use crate::table::rack;

/// Something that happened during one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickEvent {
    /// Ball reflected off a rail
    Cushion { ball: usize },
    /// Impulse exchanged between two balls (`a < b`)
    Contact { a: usize, b: usize, impulse: f64 },
    /// Ball dropped into a pocket and left play
    Pocketed { ball: usize },
}

/// Result of a single tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    pub events: Vec<TickEvent>,
    /// True on the tick the last moving ball stopped
    pub came_to_rest: bool,
}

impl TickReport {
    pub fn pocketed(&self) -> impl Iterator<Item = usize> + '_ {
        self.events.iter().filter_map(|e| match e {
            TickEvent::Pocketed { ball } => Some(*ball),
            _ => None,
        })
    }

    pub fn contact_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, TickEvent::Contact { .. }))
            .count()
    }
}

/// The balls on one table and the rules that move them.
#[derive(Debug, Clone)]
pub struct Simulation {
    balls: Vec<Ball>,
    table: TableConfig,
    physics: PhysicsConfig,
    tick: u64,
}

impl Simulation {
    /// A freshly racked table.
    pub fn new(table: TableConfig, physics: PhysicsConfig) -> Self {
        Self::with_balls(rack(&table), table, physics)
    }

    /// A table with a custom layout. Index 0 is the cue ball.
    pub fn with_balls(balls: Vec<Ball>, table: TableConfig, physics: PhysicsConfig) -> Self {
        Self {
            balls,
            table,
            physics,
            tick: 0,
        }
    }

    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }

    pub fn ball_mut(&mut self, index: usize) -> Option<&mut Ball> {
        self.balls.get_mut(index)
    }

    pub fn cue_ball(&self) -> Option<&Ball> {
        self.balls.get(CUE_BALL)
    }

    pub fn table(&self) -> &TableConfig {
        &self.table
    }

    pub fn physics(&self) -> &PhysicsConfig {
        &self.physics
    }

    /// Ticks stepped so far
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn active_count(&self) -> usize {
        self.balls.iter().filter(|b| b.active).count()
    }

    /// True when no ball still in play is moving.
    pub fn all_at_rest(&self) -> bool {
        let rest_speed = self.physics.rest_speed;
        self.balls
            .iter()
            .filter(|b| b.active)
            .all(|b| !b.is_moving(rest_speed))
    }

    /// Move every ball in play by its velocity and apply drag.
    pub fn integrate(&mut self) {
        let drag = self.physics.drag;
        for ball in self.balls.iter_mut().filter(|b| b.active) {
            ball.advance(drag);
        }
    }

    /// One collision pass in index order: for each ball in play, rails, then
    /// pockets, then every later ball in play.
    pub fn resolve_collisions(&mut self, events: &mut Vec<TickEvent>) {
        let restitution = self.physics.restitution;
        let count = self.balls.len();

        for i in 0..count {
            if !self.balls[i].active {
                continue;
            }

            if check_rails(&mut self.balls[i], &self.table).any() {
                events.push(TickEvent::Cushion { ball: i });
            }
            if check_pockets(&mut self.balls[i], &self.table) {
                events.push(TickEvent::Pocketed { ball: i });
            }

            // A ball that just dropped still settles contacts with later
            // balls this tick.
            for j in (i + 1)..count {
                if !self.balls[j].active {
                    continue;
                }
                let (head, tail) = self.balls.split_at_mut(j);
                match resolve_pair(&mut head[i], &mut tail[0], restitution) {
                    // Resting neighbours in the rack touch with zero impulse
                    Contact::Resolved { impulse } if impulse != 0.0 => {
                        events.push(TickEvent::Contact { a: i, b: j, impulse });
                    }
                    _ => {}
                }
            }
        }
    }

    /// Advance the table by one tick: motion first, then collisions.
    pub fn step(&mut self) -> TickReport {
        let was_moving = !self.all_at_rest();

        self.integrate();
        let mut events = Vec::new();
        self.resolve_collisions(&mut events);
        self.tick += 1;

        TickReport {
            tick: self.tick,
            events,
            came_to_rest: was_moving && self.all_at_rest(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ball::RED;
    use crate::table::BALL_COUNT;
    use crate::vec3::{is_finite, vec3, Vec3};

    fn ball_at(x: f64, z: f64, velocity: Vec3) -> Ball {
        let mut ball = Ball::new(0.05, RED, vec3(x, 0.55, z));
        ball.velocity = velocity;
        ball
    }

    fn sim_with(balls: Vec<Ball>) -> Simulation {
        Simulation::with_balls(balls, TableConfig::default(), PhysicsConfig::default())
    }

    #[test]
    fn fresh_rack_is_at_rest() {
        let sim = Simulation::new(TableConfig::default(), PhysicsConfig::default());
        assert_eq!(sim.balls().len(), BALL_COUNT);
        assert!(sim.all_at_rest());
        assert_eq!(sim.active_count(), BALL_COUNT);
    }

    #[test]
    fn stepping_a_still_rack_changes_nothing() {
        let mut sim = Simulation::new(TableConfig::default(), PhysicsConfig::default());
        let before: Vec<Ball> = sim.balls().to_vec();
        for _ in 0..10 {
            let report = sim.step();
            assert!(report.pocketed().next().is_none());
            assert!(!report.came_to_rest);
        }
        assert_eq!(sim.balls(), before.as_slice());
        assert_eq!(sim.tick_count(), 10);
    }

    #[test]
    fn inactive_ball_neither_moves_nor_collides() {
        let mut parked = ball_at(0.0, 0.0, vec3(0.01, 0.0, 0.0));
        parked.active = false;
        let cue = ball_at(-0.09, 0.0, vec3(0.02, 0.0, 0.0));
        let mut sim = sim_with(vec![cue, parked]);

        let report = sim.step();
        assert_eq!(report.contact_count(), 0);
        assert_eq!(sim.balls()[1].position, vec3(0.0, 0.55, 0.0));
        assert_eq!(sim.balls()[1].velocity, vec3(0.01, 0.0, 0.0));
        assert!(!sim.balls()[1].active);
    }

    #[test]
    fn inactive_balls_do_not_block_rest() {
        let mut parked = ball_at(0.5, 0.0, vec3(0.01, 0.0, 0.0));
        parked.active = false;
        let sim = sim_with(vec![ball_at(0.0, 0.0, Vec3::ZERO), parked]);
        assert!(sim.all_at_rest());
    }

    #[test]
    fn pocketed_ball_stays_pocketed() {
        // Rolling straight into the side pocket
        let ball = ball_at(0.0, 0.5, vec3(0.0, 0.0, 0.01));
        let mut sim = sim_with(vec![ball_at(-1.0, 0.0, Vec3::ZERO), ball]);

        let mut dropped_at = None;
        for _ in 0..50 {
            let report = sim.step();
            if report.pocketed().any(|b| b == 1) {
                assert!(dropped_at.is_none(), "ball reported pocketed twice");
                dropped_at = Some(report.tick);
            }
        }
        assert!(dropped_at.is_some());
        assert!(!sim.balls()[1].active);
        assert_eq!(sim.active_count(), 1);
    }

    #[test]
    fn ball_dropping_this_pass_still_hits_later_balls() {
        // Ball 0 sits over the near side pocket; ball 1 rolls into it
        let dropping = ball_at(0.0, 0.62, Vec3::ZERO);
        let striker = ball_at(0.08, 0.62, vec3(-0.01, 0.0, 0.0));
        let mut sim = sim_with(vec![dropping, striker]);

        let mut events = Vec::new();
        sim.resolve_collisions(&mut events);

        assert_eq!(events.len(), 2);
        assert_eq!(events[0], TickEvent::Pocketed { ball: 0 });
        assert!(matches!(events[1], TickEvent::Contact { a: 0, b: 1, .. }));
        assert!(!sim.balls()[0].active);
        assert!(sim.balls()[1].active);
        assert!(sim.balls()[1].velocity.x.abs() < 1e-12);
    }

    #[test]
    fn ball_already_out_of_play_is_skipped() {
        let far = ball_at(-1.0, 0.0, Vec3::ZERO);
        let dropping = ball_at(0.0, 0.62, Vec3::ZERO);
        let mut parked = ball_at(0.08, 0.62, vec3(-0.01, 0.0, 0.0));
        parked.active = false;
        let mut sim = sim_with(vec![far, dropping, parked]);

        let mut events = Vec::new();
        sim.resolve_collisions(&mut events);

        assert_eq!(events, vec![TickEvent::Pocketed { ball: 1 }]);
        assert_eq!(sim.balls()[2].velocity, vec3(-0.01, 0.0, 0.0));
        assert_eq!(sim.balls()[1].velocity, Vec3::ZERO);
    }

    #[test]
    fn head_on_collision_transfers_motion() {
        let cue = ball_at(0.0, 0.0, vec3(0.0, 0.0, 0.02));
        let target = ball_at(0.0, 0.11, Vec3::ZERO);
        let mut sim = sim_with(vec![cue, target]);

        let report = sim.step();
        assert_eq!(report.contact_count(), 1);
        assert!(sim.balls()[0].velocity.z.abs() < 1e-9);
        assert!(sim.balls()[1].velocity.z > 0.0);
    }

    #[test]
    fn rail_bounce_is_reported() {
        let ball = ball_at(1.33, 0.0, vec3(0.03, 0.0, 0.0));
        let mut sim = sim_with(vec![ball]);
        let report = sim.step();
        assert!(report.events.contains(&TickEvent::Cushion { ball: 0 }));
        assert!(sim.balls()[0].velocity.x < 0.0);
    }

    #[test]
    fn came_to_rest_fires_once() {
        let ball = ball_at(0.0, 0.0, vec3(0.001, 0.0, 0.0));
        let mut sim = sim_with(vec![ball]);
        let mut rest_reports = 0;
        for _ in 0..100 {
            if sim.step().came_to_rest {
                rest_reports += 1;
            }
        }
        assert_eq!(rest_reports, 1);
        assert!(sim.all_at_rest());
    }

    #[test]
    fn coincident_balls_stay_finite() {
        let a = ball_at(0.2, 0.1, vec3(0.01, 0.0, 0.0));
        let b = ball_at(0.2, 0.1, vec3(0.01, 0.0, 0.0));
        let mut sim = sim_with(vec![a, b]);
        for _ in 0..20 {
            sim.step();
        }
        for ball in sim.balls() {
            assert!(is_finite(ball.velocity) && is_finite(ball.position));
        }
    }

    #[test]
    fn break_shot_settles_without_nan() {
        let mut sim = Simulation::new(TableConfig::default(), PhysicsConfig::default());
        let start: Vec<Vec3> = sim.balls().iter().map(|b| b.position).collect();
        if let Some(cue) = sim.ball_mut(0) {
            cue.set_movement(vec3(-0.05, 0.0, 0.0));
        }

        let mut ticks = 0;
        let mut was_active: Vec<bool> = sim.balls().iter().map(|b| b.active).collect();
        while !sim.all_at_rest() {
            sim.step();
            for (i, ball) in sim.balls().iter().enumerate() {
                assert!(is_finite(ball.position) && is_finite(ball.velocity));
                assert!(was_active[i] || !ball.active, "ball {} came back into play", i);
                was_active[i] = ball.active;
            }
            ticks += 1;
            assert!(ticks < 5_000, "table never came to rest");
        }

        // The rack was broken up
        let moved = sim
            .balls()
            .iter()
            .zip(&start)
            .skip(1)
            .filter(|(b, p)| b.position != **p)
            .count();
        assert!(moved > 0);
        assert!(sim.tick_count() > 0);
    }
}
