use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ball::Ball;
use crate::config::SimConfig;
use crate::session::{Session, ShotFired};
use crate::shot::AimRay;
use crate::vec3::Vec3;

/// Protocol version - increment when making breaking changes.
pub const PROTOCOL_VERSION: u32 = 1;

// === Server -> Client ===

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../client/src/generated/")]
#[serde(tag = "type")]
pub enum ServerMsg {
    #[serde(rename = "welcome")]
    Welcome(WelcomeMsg),
    #[serde(rename = "table_state")]
    TableState(TableStateMsg),
    #[serde(rename = "pocketed")]
    Pocketed(PocketedMsg),
    #[serde(rename = "shot_fired")]
    ShotFired(ShotFiredMsg),
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../client/src/generated/")]
#[serde(rename_all = "camelCase")]
pub struct WelcomeMsg {
    pub protocol_version: u32,
    pub server_version: String,
    pub self_id: u32,
    pub config: SimConfig,
    /// Snapshot of the table at join time
    pub table: TableStateMsg,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../client/src/generated/")]
#[serde(rename_all = "camelCase")]
pub struct TableStateMsg {
    #[ts(type = "number")]
    pub tick: u64,
    pub strength: f64,
    pub trigger_held: bool,
    pub at_rest: bool,
    pub balls: Vec<BallWire>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../client/src/generated/")]
#[serde(rename_all = "camelCase")]
pub struct BallWire {
    pub index: u32,
    pub pos: [f64; 3],
    pub radius: f64,
    pub color: [f32; 3],
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../client/src/generated/")]
#[serde(rename_all = "camelCase")]
pub struct PocketedMsg {
    pub ball: u32,
    #[ts(type = "number")]
    pub tick: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../client/src/generated/")]
#[serde(rename_all = "camelCase")]
pub struct ShotFiredMsg {
    /// Viewer that took the shot, 0 for autoplay
    pub viewer_id: u32,
    pub velocity: [f64; 3],
    pub strength: f64,
}

// === Client -> Server ===

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../client/src/generated/")]
#[serde(tag = "type")]
pub enum ClientMsg {
    #[serde(rename = "trigger_down")]
    TriggerDown,
    #[serde(rename = "trigger_up")]
    TriggerUp {
        origin: [f64; 3],
        direction: [f64; 3],
    },
    #[serde(rename = "activity")]
    Activity,
}

// === Conversion helpers ===

/// Round to 4 decimal places (sub-millimeter on a 2.8 m table, halves JSON size)
#[inline]
pub fn round4(v: f64) -> f64 {
    (v * 10000.0).round() / 10000.0
}

fn round_vec(v: Vec3) -> [f64; 3] {
    [round4(v.x), round4(v.y), round4(v.z)]
}

impl BallWire {
    pub fn from_ball(index: usize, ball: &Ball) -> Self {
        Self {
            index: index as u32,
            pos: round_vec(ball.position),
            radius: ball.radius,
            color: ball.color,
            active: ball.active,
        }
    }
}

impl From<&Session> for TableStateMsg {
    fn from(session: &Session) -> Self {
        Self {
            tick: session.tick_count(),
            strength: session.strength(),
            trigger_held: session.trigger_held(),
            at_rest: session.at_rest(),
            balls: session
                .balls()
                .iter()
                .enumerate()
                .map(|(i, b)| BallWire::from_ball(i, b))
                .collect(),
        }
    }
}

impl ShotFiredMsg {
    pub fn new(viewer_id: u32, shot: &ShotFired) -> Self {
        Self {
            viewer_id,
            // Shot speeds are below 0.1 per tick; keep full precision
            velocity: shot.velocity.to_array(),
            strength: shot.strength,
        }
    }
}

/// Aim ray carried by a `trigger_up` message.
pub fn aim_from_wire(origin: [f64; 3], direction: [f64; 3]) -> AimRay {
    AimRay::new(Vec3::from_array(origin), Vec3::from_array(direction))
}
