use std::{collections::HashMap, sync::Arc};

use duskwold_common::object::MapId;
use duskwold_server::{config, map_actor, server_context::ServerContext, templates, tick};
use eyre::Result;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();

    let config = config::load("duskwold.toml")?;
    let mover_templates = templates::load_mover_templates(&config.server.mover_templates)?;
    tracing::info!(
        templates = mover_templates.len(),
        maps = config.maps.len(),
        "World data loaded"
    );

    let ctx = Arc::new(ServerContext::new(mover_templates));
    let (tick_sender, _tick_producer) = tick::spawn_producer();
    let (event_sender, mut event_receiver) = mpsc::channel(4096);

    let mut map_senders = HashMap::new();
    for map_config in config.maps {
        let map_id = MapId(map_config.id);
        let (message_sender, message_receiver) = mpsc::channel::<map_actor::Message>(256);
        tokio::spawn(map_actor::run(
            map_config,
            ctx.clone(),
            message_receiver,
            tick_sender.subscribe(),
            event_sender.clone(),
        ));
        map_senders.insert(map_id, message_sender);
    }

    // Stand-in for the networking layer: drain the outbound queue.
    tokio::spawn(async move {
        while let Some(events) = event_receiver.recv().await {
            tracing::debug!(count = events.len(), "Outbound events");
        }
    });

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");
    drop(map_senders);
    Ok(())
}
