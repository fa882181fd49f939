use creature_core::{EntityId, EntityOracle, EntityView, SearchType, Vec3};

/// Entity state the world tracks beyond the AI snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct EntityRecord {
    pub view: EntityView,
    pub health: f32,
    /// Projectiles and dropped items live in the inanimate partition.
    pub inanimate: bool,
}

impl EntityRecord {
    pub fn creature(view: EntityView, health: f32) -> Self {
        Self {
            view,
            health,
            inanimate: false,
        }
    }

    pub fn inanimate(view: EntityView) -> Self {
        Self {
            view,
            health: 0.0,
            inanimate: true,
        }
    }

    fn in_partition(&self, search: SearchType) -> bool {
        match search {
            SearchType::Creatures => !self.inanimate,
            SearchType::Inanimate => self.inanimate,
            SearchType::All => true,
        }
    }
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    record: Option<EntityRecord>,
}

/// Generational arena of entities.
///
/// Removing an entity bumps its slot's generation, so handles held by tasks
/// resolve to `None` instead of to whatever reuses the slot.
#[derive(Debug, Default)]
pub struct EntityStore {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates an id and stores the record built for it.
    pub fn spawn(&mut self, build: impl FnOnce(EntityId) -> EntityRecord) -> EntityId {
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                self.slots.push(Slot::default());
                (self.slots.len() - 1) as u32
            }
        };
        let slot = &mut self.slots[index as usize];
        let id = EntityId::new(index, slot.generation);
        slot.record = Some(build(id));
        id
    }

    pub fn remove(&mut self, id: EntityId) -> Option<EntityRecord> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let record = slot.record.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        Some(record)
    }

    pub fn get(&self, id: EntityId) -> Option<&EntityRecord> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.record.as_ref())
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut EntityRecord> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.record.as_mut())
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.get(id).is_some()
    }

    /// Live records in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &EntityRecord> {
        self.slots.iter().filter_map(|slot| slot.record.as_ref())
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn within(
        &self,
        center: Vec3,
        range: f32,
        search: SearchType,
    ) -> impl Iterator<Item = &EntityView> {
        self.iter()
            .filter(move |record| record.in_partition(search))
            .map(|record| &record.view)
            .filter(move |view| view.position.distance(center) <= range)
    }
}

impl EntityOracle for EntityStore {
    fn entity(&self, id: EntityId) -> Option<&EntityView> {
        self.get(id).map(|record| &record.view)
    }

    fn nearest_entity(
        &self,
        center: Vec3,
        range: f32,
        search: SearchType,
        predicate: &mut dyn FnMut(&EntityView) -> bool,
    ) -> Option<EntityId> {
        let mut best: Option<(f32, EntityId)> = None;
        for view in self.within(center, range, search) {
            let distance = view.position.distance(center);
            if best.is_some_and(|(closest, _)| distance >= closest) {
                continue;
            }
            if predicate(view) {
                best = Some((distance, view.id));
            }
        }
        best.map(|(_, id)| id)
    }

    fn walk_entities(
        &self,
        center: Vec3,
        range: f32,
        search: SearchType,
        visitor: &mut dyn FnMut(&EntityView) -> bool,
    ) {
        for view in self.within(center, range, search) {
            if !visitor(view) {
                break;
            }
        }
    }
}
