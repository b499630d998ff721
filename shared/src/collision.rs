//! Collision tests for a single tick: rails, pockets, and ball pairs.
//!
//! Contacts are resolved with velocity changes only. Positions are never
//! corrected, so a ball may overlap a rail or another ball for a tick.

use crate::ball::Ball;
use crate::config::TableConfig;
use crate::vec3::{add, dot, length, planar_distance, scale, sub, Vec3};

/// Centers closer than this have no usable contact normal.
const MIN_CONTACT_DISTANCE: f64 = 1e-9;

/// Which velocity components a rail check flipped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RailHit {
    pub x: bool,
    pub z: bool,
}

impl RailHit {
    pub fn any(&self) -> bool {
        self.x || self.z
    }
}

/// Outcome of a pair check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Contact {
    /// Not touching
    Apart,
    /// Touching but already moving apart
    Separating,
    /// Centers coincide; no normal to push along
    Degenerate,
    /// Impulse applied with this magnitude
    Resolved { impulse: f64 },
}

/// Reflect the ball off any rail it is crossing. Both axes are checked.
pub fn check_rails(ball: &mut Ball, table: &TableConfig) -> RailHit {
    let hw = table.half_width();
    let hh = table.half_height();
    let mut hit = RailHit::default();

    if ball.position.x - ball.radius < -hw || ball.position.x + ball.radius > hw {
        ball.velocity.x = -ball.velocity.x;
        hit.x = true;
    }

    if ball.position.z - ball.radius < -hh || ball.position.z + ball.radius > hh {
        ball.velocity.z = -ball.velocity.z;
        hit.z = true;
    }

    hit
}

/// Deactivate the ball if it is over any pocket. Returns true if it dropped.
pub fn check_pockets(ball: &mut Ball, table: &TableConfig) -> bool {
    let capture = table.pocket_radius / 2.0 + ball.radius;
    let over_pocket = table
        .pockets()
        .iter()
        .any(|&(px, pz)| planar_distance(ball.position, Vec3::new(px, 0.0, pz)) < capture);

    if over_pocket {
        ball.active = false;
    }
    over_pocket
}

/// Elastic impulse between two overlapping balls along the line of centers.
///
/// Radius stands in for mass in the impulse denominator, so for uniform
/// balls this is an equal-mass exchange.
pub fn resolve_pair(a: &mut Ball, b: &mut Ball, restitution: f64) -> Contact {
    let delta = sub(a.position, b.position);
    let dist = length(delta);

    if dist >= a.radius + b.radius {
        return Contact::Apart;
    }
    if dist < MIN_CONTACT_DISTANCE {
        tracing::debug!("skipping contact between coincident balls at {:?}", a.position);
        return Contact::Degenerate;
    }

    // Points from b toward a
    let normal = scale(delta, 1.0 / dist);
    let relative = sub(a.velocity, b.velocity);
    let velocity_along_normal = dot(relative, normal);

    if velocity_along_normal > 0.0 {
        return Contact::Separating;
    }

    let impulse =
        (1.0 + restitution) * velocity_along_normal / (1.0 / a.radius + 1.0 / b.radius);
    let impulse_vector = scale(normal, impulse);

    a.velocity = sub(a.velocity, scale(impulse_vector, 1.0 / a.radius));
    b.velocity = add(b.velocity, scale(impulse_vector, 1.0 / b.radius));

    Contact::Resolved { impulse }
}
