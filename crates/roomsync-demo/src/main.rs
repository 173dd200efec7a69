//! Demo binary: a host and a client playing a tiny arena game over the
//! in-process transport, converging on the same state tree.
//!
//! Run with `cargo run -p roomsync-demo`.
//! Run with `cargo run -p roomsync-demo -- --ticks 40 --interval-ms 25`
//! to change the simulated pace.

use clap::Parser;
use serde_json::{Value, json};
use tracing::info;

use roomsync_log::init_logging;
use roomsync_runtime::{GameHooks, Runtime, RuntimeConfig};
use roomsync_transport::{MemoryHub, MemoryTransport};
use roomsync_wire::PlayerId;

#[derive(Parser, Debug)]
#[command(about = "Host/client state-sync demo over an in-process hub")]
struct Args {
    /// Number of simulation ticks to run.
    #[arg(long, default_value_t = 20)]
    ticks: u32,

    /// Milliseconds of simulated time per tick.
    #[arg(long, default_value_t = 50)]
    interval_ms: u64,
}

fn game_hooks() -> GameHooks {
    GameHooks::new(|ctx| {
        let mut players = serde_json::Map::new();
        for id in ctx.player_ids {
            players.insert(id.to_string(), json!({"x": 0, "y": 0, "score": 0}));
        }
        // Food positions are random but the shared setup seed makes every
        // peer scatter them identically.
        let food: Vec<Value> = (0..8)
            .map(|_| {
                json!({
                    "x": ctx.random.range_i64(0, 800),
                    "y": ctx.random.range_i64(0, 600),
                })
            })
            .collect();
        json!({"players": players, "food": food})
    })
    .on_player_join(|state, player| {
        let players = &mut state["players"];
        if players.get(player.as_str()).is_none() {
            players[player.as_str()] = json!({"x": 0, "y": 0, "score": 0});
        }
    })
    .on_player_leave(|state, player| {
        if let Some(players) = state["players"].as_object_mut() {
            players.remove(player.as_str());
        }
    })
}

fn register_actions(runtime: &mut Runtime<MemoryTransport>) {
    runtime.register_action("move", |state, ctx, input| {
        let record = &mut state["players"][ctx.target.as_str()];
        record["x"] = input["x"].clone();
        record["y"] = input["y"].clone();
    });
    runtime.register_action("eat", |state, ctx, input| {
        let index = input["index"].as_u64().unwrap_or(0) as usize;
        let Some(food) = state["food"].as_array_mut() else {
            return;
        };
        if index >= food.len() {
            return;
        }
        food.remove(index);
        let bonus = ctx.random.range_i64(1, 10);
        let score = &mut state["players"][ctx.caller.as_str()]["score"];
        *score = json!(score.as_i64().unwrap_or(0) + bonus);
    });
}

fn main() {
    init_logging("info");
    let args = Args::parse();

    let ids = vec![PlayerId::from("host"), PlayerId::from("client")];
    let hub = MemoryHub::new();
    let host_transport = hub.join("host").expect("fresh hub");
    let client_transport = hub.join("client").expect("fresh hub");

    let mut host = Runtime::new(RuntimeConfig::host(ids.clone()), game_hooks(), host_transport)
        .expect("host setup");
    let mut client = Runtime::new(RuntimeConfig::client(ids), game_hooks(), client_transport)
        .expect("client setup");
    register_actions(&mut host);
    register_actions(&mut client);

    let _sub = host.on_event("taunt", |sender, payload| {
        info!(sender = %sender, text = %payload["text"], "taunt received");
    });

    for tick in 0..args.ticks {
        if tick % 4 == 0 {
            host.submit_action("move", json!({"x": tick * 10, "y": tick * 5}), None)
                .expect("in-process send");
        }
        if tick % 5 == 0 {
            client
                .submit_action("eat", json!({"index": 0}), None)
                .expect("in-process send");
        }
        if tick == args.ticks / 2 {
            client
                .broadcast_event("taunt", json!({"text": "my snack now"}))
                .expect("in-process send");
        }
        host.tick(args.interval_ms);
        client.tick(args.interval_ms);
    }
    // One more round so the last broadcast lands.
    host.tick(args.interval_ms);
    client.tick(0);

    let converged = host.state() == client.state();
    info!(
        ticks = args.ticks,
        converged,
        host_score = %host.state()["players"]["client"]["score"],
        "simulation finished"
    );
    println!(
        "{}",
        serde_json::to_string_pretty(host.state()).expect("state is serializable")
    );
}
