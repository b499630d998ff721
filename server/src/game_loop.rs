use billiards_shared::protocol::{aim_from_wire, PocketedMsg, ShotFiredMsg, TableStateMsg, WelcomeMsg};
use tokio::sync::{broadcast, mpsc, oneshot};

use crate::config::ServerConfig;
use crate::state::GameState;

/// Commands from viewer connections to the game loop
pub enum GameCommand {
    ViewerJoin {
        response: oneshot::Sender<(u32, WelcomeMsg)>,
    },
    ViewerLeave {
        id: u32,
    },
    TriggerDown {
        id: u32,
    },
    TriggerUp {
        id: u32,
        origin: [f64; 3],
        direction: [f64; 3],
    },
    Activity,
}

/// Broadcasts from game loop to all viewers
#[derive(Debug, Clone)]
pub enum GameBroadcast {
    TableState(TableStateMsg),
    Pocketed(PocketedMsg),
    ShotFired(ShotFiredMsg),
}

/// Run the main game loop. Owns the table and everything attached to it.
pub async fn run_game_loop(
    mut cmd_rx: mpsc::Receiver<GameCommand>,
    broadcast_tx: broadcast::Sender<GameBroadcast>,
    server_config: ServerConfig,
) {
    let mut state = GameState::new(&server_config);

    let tick_duration = server_config.sim.physics.tick_duration();
    let broadcast_every_n = server_config.broadcast_every_n() as u64;
    let mut tick_count: u64 = 0;

    let mut tick_interval = tokio::time::interval(tick_duration);
    tick_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    tracing::info!(
        "Game loop running at {} Hz, broadcasting every {} ticks",
        server_config.sim.physics.tick_rate_hz,
        broadcast_every_n
    );

    loop {
        tokio::select! {
            _ = tick_interval.tick() => {
                let outcome = state.tick();

                for shot in outcome.shots {
                    let _ = broadcast_tx.send(GameBroadcast::ShotFired(shot));
                }
                for pocketed in outcome.pocketed {
                    let _ = broadcast_tx.send(GameBroadcast::Pocketed(pocketed));
                }

                // table_state at a lower rate
                tick_count += 1;
                if tick_count % broadcast_every_n == 0 {
                    let _ = broadcast_tx.send(GameBroadcast::TableState(state.table_state()));
                }
            }

            Some(cmd) = cmd_rx.recv() => {
                match cmd {
                    GameCommand::ViewerJoin { response } => {
                        let id = state.add_viewer();
                        let welcome = state.welcome(id);
                        if response.send((id, welcome)).is_err() {
                            // Connection went away before the welcome
                            state.remove_viewer(id);
                        }
                    }
                    GameCommand::ViewerLeave { id } => {
                        state.remove_viewer(id);
                        tracing::info!("Viewer {} left ({} remaining)", id, state.viewer_count());
                    }
                    GameCommand::TriggerDown { id } => {
                        state.trigger_down(id);
                    }
                    GameCommand::TriggerUp { id, origin, direction } => {
                        if let Some(shot) = state.trigger_up(id, aim_from_wire(origin, direction)) {
                            let _ = broadcast_tx.send(GameBroadcast::ShotFired(shot));
                        }
                    }
                    GameCommand::Activity => {
                        state.activity();
                    }
                }
            }

            else => break,
        }
    }

    tracing::info!("Game loop ended");
}
