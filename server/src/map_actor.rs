use std::sync::Arc;

use duskwold_common::{
    object::{MapId, ObjectId},
    world_event::WorldEvent,
};
use tokio::sync::{broadcast, mpsc};
use tracing::instrument;

use crate::{
    config::MapConfig,
    map_state::{MapState, WorldWriter, WriterTarget},
    monster_logic,
    mover::Mover,
    server_context::ServerContext,
    tick,
};

/// Control surface of one map: the session layer and the combat-resolution
/// layer talk to the simulation only through these.
#[derive(Debug)]
pub enum Message {
    MoverEntered { mover: Box<Mover> },
    MoverLeft { object_id: ObjectId },
    SetTarget { object_id: ObjectId, target: Option<ObjectId> },
    ApplyDamage { object_id: ObjectId, amount: i32 },
}

pub type EventSender = mpsc::Sender<Vec<(WriterTarget, WorldEvent)>>;

#[instrument(skip_all, fields(map_id = map_config.id))]
pub async fn run(
    map_config: MapConfig,
    ctx: Arc<ServerContext>,
    mut messages: mpsc::Receiver<Message>,
    mut ticks: tick::Receiver,
    events_out: EventSender,
) {
    let mut rng = fastrand::Rng::new();
    let mut state = MapState::new(MapId(map_config.id));
    monster_logic::populate_monsters(&map_config, &mut state, &ctx, &mut rng);
    let mut writer = WorldWriter::new();
    tracing::info!(monsters = state.movers.len(), "Map actor started");

    loop {
        tokio::select! {
            tick = ticks.recv() => match tick {
                Ok(tick) => {
                    for region in state.regions.values_mut() {
                        region.update();
                    }
                    monster_logic::on_tick(tick, &mut state, &ctx, &mut rng, &mut writer);
                    flush(&mut writer, &events_out);
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Tick receiver lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            message = messages.recv() => match message {
                Some(message) => {
                    handle_message(message, &mut state, &mut writer);
                    flush(&mut writer, &events_out);
                }
                None => break,
            },
        }
    }

    tracing::debug!("Map actor terminated");
}

pub fn handle_message(message: Message, state: &mut MapState, writer: &mut WorldWriter) {
    match message {
        Message::MoverEntered { mover } => {
            state.movers.insert(mover.id, *mover);
        }
        Message::MoverLeft { object_id } => {
            if state.movers.remove(&object_id).is_none() {
                tracing::warn!(object_id = object_id.0, "Unknown mover left the map");
            }
        }
        Message::SetTarget { object_id, target } => {
            if let Some(mover) = state.movers.get_mut(&object_id) {
                mover.target = target;
                mover.is_fighting = target.is_some();
            }
        }
        Message::ApplyDamage { object_id, amount } => {
            if let Some(mover) = state.movers.get_mut(&object_id) {
                mover.vitals.hp = (mover.vitals.hp - amount).max(0);
                writer.tell(
                    WriterTarget::All,
                    WorldEvent::MoverHealthChanged {
                        object_id,
                        health: mover.vitals.hp,
                        change: -amount,
                    },
                );
            }
        }
    }
}

fn flush(writer: &mut WorldWriter, events_out: &EventSender) {
    let events = writer.take_events();
    if events.is_empty() {
        return;
    }
    // Fire and forget: the networking layer owns the queue and a full queue
    // drops the batch rather than stalling the tick.
    if let Err(err) = events_out.try_send(events) {
        tracing::warn!("Dropping outbound events: {err}");
    }
}
