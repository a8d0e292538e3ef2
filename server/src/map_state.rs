use std::collections::HashMap;

use duskwold_common::{
    object::{MapId, ObjectId, RegionId},
    world_event::WorldEvent,
};

use crate::{mover::Mover, region::RespawnerRegion};

/// Everything one map actor owns. Nothing outside the actor touches it, so
/// tick processing needs no locks.
#[derive(Debug, Clone)]
pub struct MapState {
    pub map_id: MapId,
    pub regions: HashMap<RegionId, RespawnerRegion>,
    pub movers: HashMap<ObjectId, Mover>,
}

impl MapState {
    pub fn new(map_id: MapId) -> Self {
        Self { map_id, regions: HashMap::new(), movers: HashMap::new() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterTarget {
    All,
    Mover(ObjectId),
}

/// Buffers outbound events for one tick; the map actor drains it into the
/// networking queue afterwards.
#[derive(Debug, Clone, Default)]
pub struct WorldWriter {
    pub events: Vec<(WriterTarget, WorldEvent)>,
}

impl WorldWriter {
    pub fn new() -> Self {
        Self { events: vec![] }
    }

    pub fn tell(&mut self, target: WriterTarget, event: WorldEvent) {
        self.events.push((target, event));
    }

    pub fn take_events(&mut self) -> Vec<(WriterTarget, WorldEvent)> {
        std::mem::take(&mut self.events)
    }
}
