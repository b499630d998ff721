//! Load test for the billiards table server.
//!
//! Spawns multiple viewer WebSocket clients that:
//! - Connect to the server and wait for `welcome`
//! - Count `table_state`, `pocketed` and `shot_fired` broadcasts
//! - Optionally (viewer 0 only) take a shot at the cue ball periodically
//!
//! Usage: cargo run --bin loadtest -- [OPTIONS]
//!
//! Options:
//!   --clients N         Number of viewers to spawn (default: 100)
//!   --duration S        Test duration in seconds (default: 30)
//!   --shot-interval S   Seconds between shots by viewer 0, 0 disables (default: 10)
//!   --broadcast-hz R    Expected table_state rate for the report (default: 30)
//!   --url URL           Server URL (default: ws://127.0.0.1:9001/ws)

use billiards_shared::ball::CUE_BALL;
use billiards_shared::protocol::{ClientMsg, ServerMsg};
use futures_util::{SinkExt, StreamExt};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_tungstenite::{connect_async, tungstenite::Message};

/// How long the shooter holds the trigger (about 0.05 strength at 60 Hz)
const CHARGE_TIME: Duration = Duration::from_millis(3300);

// === Metrics ===

#[derive(Default)]
struct Metrics {
    connected: AtomicU64,
    messages_received: AtomicU64,
    table_states_received: AtomicU64,
    pocketed_received: AtomicU64,
    shots_seen: AtomicU64,
    shots_sent: AtomicU64,
    errors: AtomicU64,
    latency_sum_ms: AtomicU64,
    latency_count: AtomicU64,
}

/// Shooter state for viewer 0
enum Trigger {
    Idle,
    Held { since: Instant },
}

// === Client task ===

async fn run_client(
    client_id: u32,
    url: String,
    shot_interval: Option<Duration>,
    duration: Duration,
    metrics: Arc<Metrics>,
) {
    let connect_start = Instant::now();

    let (mut ws, _) = match connect_async(&url).await {
        Ok(conn) => conn,
        Err(e) => {
            if client_id < 5 {
                eprintln!("Client {} failed to connect: {}", client_id, e);
            }
            metrics.errors.fetch_add(1, Ordering::Relaxed);
            return;
        }
    };

    metrics
        .latency_sum_ms
        .fetch_add(connect_start.elapsed().as_millis() as u64, Ordering::Relaxed);
    metrics.latency_count.fetch_add(1, Ordering::Relaxed);
    metrics.connected.fetch_add(1, Ordering::Relaxed);

    // Wait for welcome before doing anything else
    let welcome = tokio::time::timeout(Duration::from_secs(5), async {
        while let Some(msg) = ws.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    metrics.messages_received.fetch_add(1, Ordering::Relaxed);
                    if let Ok(ServerMsg::Welcome(w)) = serde_json::from_str::<ServerMsg>(&text) {
                        return Some(w);
                    }
                }
                Ok(Message::Close(_)) | Err(_) => return None,
                _ => {}
            }
        }
        None
    })
    .await;

    let mut cue_pos = match welcome {
        Ok(Some(w)) => w.table.balls.get(CUE_BALL).map(|b| b.pos),
        _ => {
            if client_id < 5 {
                eprintln!("Client {} never got a welcome", client_id);
            }
            metrics.errors.fetch_add(1, Ordering::Relaxed);
            metrics.connected.fetch_sub(1, Ordering::Relaxed);
            return;
        }
    };
    let mut at_rest = true;

    // Only viewer 0 shoots
    let shooter = client_id == 0 && shot_interval.is_some();
    let mut shot_timer =
        tokio::time::interval(shot_interval.unwrap_or(Duration::from_secs(3600)));
    shot_timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    shot_timer.tick().await;
    let mut trigger = Trigger::Idle;

    let mut poll = tokio::time::interval(Duration::from_millis(100));
    let test_end = Instant::now() + duration;

    while Instant::now() < test_end {
        let mut outgoing = None;

        tokio::select! {
            _ = shot_timer.tick(), if shooter => {
                if at_rest && matches!(trigger, Trigger::Idle) {
                    outgoing = Some(ClientMsg::TriggerDown);
                    trigger = Trigger::Held { since: Instant::now() };
                }
            }

            _ = poll.tick() => {
                if let Trigger::Held { since } = trigger {
                    if since.elapsed() >= CHARGE_TIME {
                        trigger = Trigger::Idle;
                        // Camera 1 m behind (+x) and 0.75 m above the cue ball, looking at it
                        outgoing = cue_pos.map(|p| ClientMsg::TriggerUp {
                            origin: [p[0] + 1.0, p[1] + 0.75, p[2]],
                            direction: [-1.0, -0.75, 0.0],
                        });
                    }
                }
            }

            msg = ws.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        metrics.messages_received.fetch_add(1, Ordering::Relaxed);
                        match serde_json::from_str::<ServerMsg>(&text) {
                            Ok(ServerMsg::TableState(state)) => {
                                metrics.table_states_received.fetch_add(1, Ordering::Relaxed);
                                at_rest = state.at_rest;
                                cue_pos = state
                                    .balls
                                    .get(CUE_BALL)
                                    .filter(|b| b.active)
                                    .map(|b| b.pos);
                            }
                            Ok(ServerMsg::Pocketed(_)) => {
                                metrics.pocketed_received.fetch_add(1, Ordering::Relaxed);
                            }
                            Ok(ServerMsg::ShotFired(_)) => {
                                metrics.shots_seen.fetch_add(1, Ordering::Relaxed);
                            }
                            Ok(ServerMsg::Welcome(_)) => {}
                            Err(_) => {
                                metrics.errors.fetch_add(1, Ordering::Relaxed);
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        if client_id < 5 {
                            eprintln!("Client {} error: {}", client_id, e);
                        }
                        metrics.errors.fetch_add(1, Ordering::Relaxed);
                        break;
                    }
                    Some(_) => {}
                }
            }
        }

        if let Some(msg) = outgoing {
            let sent = match serde_json::to_string(&msg) {
                Ok(json) => ws.send(Message::Text(json.into())).await.is_ok(),
                Err(_) => false,
            };
            if !sent {
                metrics.errors.fetch_add(1, Ordering::Relaxed);
                break;
            }
            if matches!(msg, ClientMsg::TriggerUp { .. }) {
                metrics.shots_sent.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    let _ = ws.close(None).await;
    metrics.connected.fetch_sub(1, Ordering::Relaxed);
}

// === Main ===

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().collect();

    let mut num_clients: u32 = 100;
    let mut duration_secs: u64 = 30;
    let mut shot_interval_secs: f64 = 10.0;
    let mut broadcast_hz: f64 = 30.0;
    let mut url = "ws://127.0.0.1:9001/ws".to_string();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--clients" => {
                i += 1;
                num_clients = args.get(i).and_then(|s| s.parse().ok()).unwrap_or(100);
            }
            "--duration" => {
                i += 1;
                duration_secs = args.get(i).and_then(|s| s.parse().ok()).unwrap_or(30);
            }
            "--shot-interval" => {
                i += 1;
                shot_interval_secs = args.get(i).and_then(|s| s.parse().ok()).unwrap_or(10.0);
            }
            "--broadcast-hz" => {
                i += 1;
                broadcast_hz = args.get(i).and_then(|s| s.parse().ok()).unwrap_or(30.0);
            }
            "--url" => {
                i += 1;
                url = args.get(i).cloned().unwrap_or(url);
            }
            _ => {}
        }
        i += 1;
    }

    let shot_interval = (shot_interval_secs > 0.0 && shot_interval_secs.is_finite())
        .then(|| Duration::from_secs_f64(shot_interval_secs));

    println!("=== Billiards Server Load Test ===");
    println!("Viewers: {}", num_clients);
    println!("Duration: {}s", duration_secs);
    match shot_interval {
        Some(d) => println!("Shot interval: {:?}", d),
        None => println!("Shot interval: off"),
    }
    println!("URL: {}", url);
    println!();

    let metrics = Arc::new(Metrics::default());
    let duration = Duration::from_secs(duration_secs);

    let mut handles = Vec::with_capacity(num_clients as usize);

    println!("Spawning {} viewers...", num_clients);
    let spawn_start = Instant::now();

    for client_id in 0..num_clients {
        let url = url.clone();
        let metrics = Arc::clone(&metrics);

        handles.push(tokio::spawn(async move {
            run_client(client_id, url, shot_interval, duration, metrics).await;
        }));

        // Stagger spawns slightly to avoid thundering herd
        if client_id % 50 == 49 {
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }

    println!("All viewers spawned in {:?}", spawn_start.elapsed());
    println!();

    // Print stats periodically
    let metrics_clone = Arc::clone(&metrics);
    let stats_handle = tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(5));
        let start = Instant::now();

        loop {
            interval.tick().await;
            let elapsed = start.elapsed().as_secs();
            if elapsed >= duration_secs + 5 {
                break;
            }

            println!(
                "[{:3}s] connected={}, msgs={}, table_states={}, pocketed={}, shots_seen={}, errors={}",
                elapsed,
                metrics_clone.connected.load(Ordering::Relaxed),
                metrics_clone.messages_received.load(Ordering::Relaxed),
                metrics_clone.table_states_received.load(Ordering::Relaxed),
                metrics_clone.pocketed_received.load(Ordering::Relaxed),
                metrics_clone.shots_seen.load(Ordering::Relaxed),
                metrics_clone.errors.load(Ordering::Relaxed),
            );
        }
    });

    for handle in handles {
        let _ = handle.await;
    }

    stats_handle.abort();

    // Final stats
    println!();
    println!("=== Final Results ===");
    let msgs = metrics.messages_received.load(Ordering::Relaxed);
    let table_states = metrics.table_states_received.load(Ordering::Relaxed);
    let latency_sum = metrics.latency_sum_ms.load(Ordering::Relaxed);
    let latency_count = metrics.latency_count.load(Ordering::Relaxed);

    println!("Total messages received: {}", msgs);
    println!("Total table_state messages: {}", table_states);
    println!(
        "Total pocketed messages: {}",
        metrics.pocketed_received.load(Ordering::Relaxed)
    );
    println!("Shots sent: {}", metrics.shots_sent.load(Ordering::Relaxed));
    println!(
        "Shots seen (all viewers): {}",
        metrics.shots_seen.load(Ordering::Relaxed)
    );
    println!("Total errors: {}", metrics.errors.load(Ordering::Relaxed));

    if latency_count > 0 {
        println!("Average connect latency: {}ms", latency_sum / latency_count);
    }

    let expected_per_client = duration_secs as f64 * broadcast_hz;
    let per_client = table_states as f64 / num_clients.max(1) as f64;

    println!();
    println!("Messages/sec (total): {:.0}", msgs as f64 / duration_secs.max(1) as f64);
    println!("Table states per viewer: {:.1}", per_client);
    println!("Expected table states per viewer: {:.1}", expected_per_client);
    if expected_per_client > 0.0 {
        println!("Delivery rate: {:.1}%", per_client / expected_per_client * 100.0);
    }
}
