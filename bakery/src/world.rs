//! Data structure for storing a world at runtime.

use std::collections::HashMap;
use std::iter::FusedIterator;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::slice;
use std::mem;

use glam::IVec3;

use tracing::{trace, instrument};

use crate::block_entity::BlockEntity;
use crate::recipe::RecipeRegistry;
use crate::util::JavaRandom;
use crate::item::ItemStack;
use crate::entity::Entity;
use crate::block;


// Following modules are order by order of importance, last modules depends on first ones.
pub mod loot;
pub mod place;
pub mod r#use;
pub mod r#break;


/// Height of the world, blocks can only be set with a Y coordinate in `0..WORLD_HEIGHT`.
pub const WORLD_HEIGHT: i32 = 128;


/// # Components
///
/// This data structure stores different kind of component:
/// - Blocks, an id and a metadata for each position, positions that are not set are
///   air. The metadata is the externally visible state of the block, such as the
///   stirring state of a crafting bowl.
/// - Entities, free-standing objects such as dropped items, referenced by unique id.
/// - Block Entities, attached to a block position, they can be ticked and own their
///   storage.
///
/// # Logic
///
/// Each call to [`World::tick`] advances the time, ticks every entity and then every
/// block entity. The recipe registry is given at construction and shared with the
/// block entities that craft.
///
/// # Events
///
/// This structure also allows listening for events within it through a queue of
/// [`Event`], events listening is disabled by default but can be enabled by swapping
/// a `Vec<Event>` into the world using the [`World::swap_events`]. Events are generated
/// either by world's ticking logic or by manual changes to the world.
///
/// # Naming convention
///
/// - Methods that don't alter the world and return values are prefixed by `get_`,
///   getters returning mutable reference are suffixed with `_mut`;
/// - Methods that alter the world by running a logic tick start with `tick_`;
/// - Methods that iterate over some world objects start with `iter_`;
/// - All other methods use a proper verb (`spawn_`, `place_`, `use_`, `break_`...).
#[derive(Clone)]
pub struct World {
    /// When enabled, this contains the list of events that happened in the world since
    /// it was last swapped.
    events: Option<Vec<Event>>,
    /// The world time, increasing on each tick.
    time: u64,
    /// The world's global random number generator.
    rand: JavaRandom,
    /// Recipes available to crafting block entities of this world.
    recipes: Arc<RecipeRegistry>,
    /// Block id and metadata of every non-air block.
    blocks: HashMap<IVec3, (u8, u16)>,
    /// Total entities count spawned since the world is running. Also used to give
    /// entities a unique id.
    entities_count: u32,
    /// The internal list of all loaded entities, they are referred to by their index in
    /// this list.
    entities: Vec<EntityComponent>,
    /// Entities' index mapping from their unique id.
    entities_id_map: HashMap<u32, usize>,
    /// Same as entities but for block entities.
    block_entities: Vec<BlockEntityComponent>,
    /// Mapping of block entities to their block position.
    block_entities_pos_map: HashMap<IVec3, usize>,
}

impl World {

    /// Create a new world with the given recipes and no events queue by default, so
    /// events are disabled.
    pub fn new(recipes: Arc<RecipeRegistry>) -> Self {
        Self::with_rand(recipes, JavaRandom::new_seeded())
    }

    /// Create a new world with the given recipes and random number generator, used to
    /// replay a world deterministically.
    pub fn with_rand(recipes: Arc<RecipeRegistry>, rand: JavaRandom) -> Self {
        Self {
            events: None,
            time: 0,
            rand,
            recipes,
            blocks: HashMap::new(),
            entities_count: 0,
            entities: Vec::new(),
            entities_id_map: HashMap::new(),
            block_entities: Vec::new(),
            block_entities_pos_map: HashMap::new(),
        }
    }

    /// This function can be used to swap in a new events queue and return the previous
    /// one if relevant. Giving *None* events queue disable events registration using
    /// the [`World::push_event`] method.
    pub fn swap_events(&mut self, events: Option<Vec<Event>>) -> Option<Vec<Event>> {
        mem::replace(&mut self.events, events)
    }

    /// Push an event in this world. This only actually push the event if events are
    /// enabled.
    #[inline]
    pub fn push_event(&mut self, event: Event) {
        if let Some(events) = &mut self.events {
            events.push(event);
        }
    }

    /// Get the world time, in ticks.
    pub fn get_time(&self) -> u64 {
        self.time
    }

    /// Get a mutable access to this world's random number generator.
    pub fn get_rand_mut(&mut self) -> &mut JavaRandom {
        &mut self.rand
    }

    /// Get the recipes registry shared by this world.
    pub fn get_recipes(&self) -> &Arc<RecipeRegistry> {
        &self.recipes
    }

    // =================== //
    //        BLOCKS       //
    // =================== //

    /// Set block and metadata at given position in the world, if the position is out of
    /// the world height, none is returned, else the previous block and metadata is
    /// returned. A block change event is pushed if the block has actually changed.
    pub fn set_block(&mut self, pos: IVec3, id: u8, metadata: u16) -> Option<(u8, u16)> {

        if pos.y < 0 || pos.y >= WORLD_HEIGHT {
            return None;
        }

        let prev = if id == block::AIR {
            self.blocks.remove(&pos)
        } else {
            self.blocks.insert(pos, (id, metadata))
        };

        let (prev_id, prev_metadata) = prev.unwrap_or((block::AIR, 0));

        if prev_id != id || prev_metadata != metadata {
            self.push_event(Event::Block {
                pos,
                inner: BlockEvent::Set {
                    id,
                    metadata,
                    prev_id,
                    prev_metadata,
                }
            });
        }

        Some((prev_id, prev_metadata))

    }

    /// Get block and metadata at given position in the world, if the position is out of
    /// the world height, none is returned.
    pub fn get_block(&self, pos: IVec3) -> Option<(u8, u16)> {
        if pos.y < 0 || pos.y >= WORLD_HEIGHT {
            None
        } else {
            Some(self.blocks.get(&pos).copied().unwrap_or((block::AIR, 0)))
        }
    }

    // =================== //
    //       ENTITIES      //
    // =================== //

    /// Internal function to ensure monomorphization and reduce bloat of the
    /// generic [`World::spawn_entity`].
    #[inline(never)]
    fn spawn_entity_inner(&mut self, entity: Box<Entity>) -> u32 {

        let entity_index = self.entities.len();

        // Get the next unique entity id.
        let id = self.entities_count;
        self.entities_count = self.entities_count.checked_add(1)
            .expect("entity count overflow");

        trace!("spawn entity #{id} ({entity:?})");

        self.entities.push(EntityComponent {
            inner: ComponentStorage::Ready(entity),
            id,
        });
        self.entities_id_map.insert(id, entity_index);

        self.push_event(Event::Entity { id, inner: EntityEvent::Spawn });
        id

    }

    /// Spawn an entity in this world, this function gives it a unique id.
    ///
    /// **This function is legal to call from ticking entities, but such entities will be
    /// ticked once in the same cycle as the currently ticking entity.**
    #[inline(always)]
    pub fn spawn_entity(&mut self, entity: impl Into<Box<Entity>>) -> u32 {
        self.spawn_entity_inner(entity.into())
    }

    /// Return true if an entity is present from its id.
    pub fn contains_entity(&self, id: u32) -> bool {
        self.entities_id_map.contains_key(&id)
    }

    /// Get a generic entity from its unique id. None can be returned if no entity is
    /// existing for this id or if the entity is the current entity being updated.
    pub fn get_entity(&self, id: u32) -> Option<&Entity> {
        let index = *self.entities_id_map.get(&id)?;
        self.entities[index].inner.as_deref()
    }

    /// Remove an entity with given id, returning true if the entity has been removed.
    /// The entity's storage is freed on return, but its footprint in the world will be
    /// cleaned only after ticking.
    pub fn remove_entity(&mut self, id: u32) -> bool {

        // NOTE: Each entity can be removed once because ID is removed with it.
        let Some(index) = self.entities_id_map.remove(&id) else { return false };
        let prev = self.entities[index].inner.replace(ComponentStorage::Removed);
        debug_assert!(!matches!(prev, ComponentStorage::Removed), "entity should not already be removed");

        trace!("remove entity #{id}");

        self.push_event(Event::Entity { id, inner: EntityEvent::Remove });
        true

    }

    /// Get the number of entities currently in the world.
    pub fn get_entity_count(&self) -> usize {
        self.entities_id_map.len()
    }

    // =================== //
    //   BLOCK ENTITIES    //
    // =================== //

    /// Inner function to set block entity at given position, used to elide generics.
    #[inline(never)]
    fn set_block_entity_inner(&mut self, pos: IVec3, block_entity: Box<BlockEntity>) {

        // This is the future index where we insert the block entity.
        let block_entity_index = self.block_entities.len();

        if let Some(prev_index) = self.block_entities_pos_map.insert(pos, block_entity_index) {
            // If a block entity was already present at this position, mark the previous
            // one as removed in order to clean it up later.
            self.remove_block_entity_inner(prev_index);
        }

        self.block_entities.push(BlockEntityComponent {
            inner: ComponentStorage::Ready(block_entity),
            pos,
        });

        self.push_event(Event::BlockEntity { pos, inner: BlockEntityEvent::Set });

    }

    /// Set the block entity at the given position. If a block entity was already at the
    /// position, it is removed silently.
    #[inline(always)]
    pub fn set_block_entity(&mut self, pos: IVec3, block_entity: impl Into<Box<BlockEntity>>) {
        self.set_block_entity_inner(pos, block_entity.into());
    }

    /// Return true if some block entity is present in the world.
    pub fn contains_block_entity(&self, pos: IVec3) -> bool {
        self.block_entities_pos_map.contains_key(&pos)
    }

    /// Get a block entity from its position.
    pub fn get_block_entity(&self, pos: IVec3) -> Option<&BlockEntity> {
        let index = *self.block_entities_pos_map.get(&pos)?;
        self.block_entities[index].inner.as_deref()
    }

    /// Get a block entity from its position through a mutable reference.
    pub fn get_block_entity_mut(&mut self, pos: IVec3) -> Option<&mut BlockEntity> {
        let index = *self.block_entities_pos_map.get(&pos)?;
        self.block_entities[index].inner.as_deref_mut()
    }

    /// Internal function to mark the block entity at index as removed.
    fn remove_block_entity_inner(&mut self, index: usize) {
        let block_entity_comp = &mut self.block_entities[index];
        let prev = block_entity_comp.inner.replace(ComponentStorage::Removed);
        debug_assert!(!matches!(prev, ComponentStorage::Removed), "block entity should not already be removed");
        let pos = block_entity_comp.pos;
        self.push_event(Event::BlockEntity { pos, inner: BlockEntityEvent::Remove });
    }

    /// Remove a block entity from a position. Returning true if successful, in this case
    /// the block entity storage is guaranteed to be freed, but the block entity footprint
    /// in this world will be definitely cleaned after ticking.
    pub fn remove_block_entity(&mut self, pos: IVec3) -> bool {
        let Some(index) = self.block_entities_pos_map.remove(&pos) else { return false };
        self.remove_block_entity_inner(index);
        true
    }

    /// Push a storage event for each slot that changed in the block entity's storage
    /// since the last call, and then forget these changes.
    pub fn flush_block_entity_changes(&mut self, pos: IVec3) {

        let Some(&index) = self.block_entities_pos_map.get(&pos) else { return };
        let Some(block_entity) = self.block_entities[index].inner.as_deref_mut() else { return };
        let Some(inv) = block_entity.inventory_mut() else { return };

        if let Some(events) = &mut self.events {
            for (index, stack) in inv.changes() {
                events.push(Event::BlockEntity {
                    pos,
                    inner: BlockEntityEvent::Storage { index: index as u8, stack },
                });
            }
        }

        inv.clear_changes();

    }

    // =================== //
    //      ITERATORS      //
    // =================== //

    /// Iterate over all entities in the world. The currently updated entity is not
    /// included in this iterator.
    #[inline]
    pub fn iter_entities(&self) -> EntitiesIter<'_> {
        EntitiesIter(self.entities.iter())
    }

    /// Iterate over all block entities in the world with their position. The currently
    /// updated block entity is not included in this iterator.
    #[inline]
    pub fn iter_block_entities(&self) -> BlockEntitiesIter<'_> {
        BlockEntitiesIter(self.block_entities.iter())
    }

    // =================== //
    //       TICKING       //
    // =================== //

    /// Tick the world, this ticks all entities and then all block entities.
    #[instrument(skip_all)]
    pub fn tick(&mut self) {
        self.time += 1;
        self.tick_entities();
        self.tick_block_entities();
    }

    /// Internal function to tick all entities.
    #[instrument(skip_all)]
    fn tick_entities(&mut self) {

        let mut indices_to_remove = Vec::new();

        // NOTE: Only update the entities that are present at the start of ticking.
        for entity_index in 0..self.entities.len() {

            let entity_comp = &mut self.entities[entity_index];
            let mut entity = match entity_comp.inner.replace(ComponentStorage::Updated) {
                ComponentStorage::Ready(data) => data,
                ComponentStorage::Removed => {
                    // The entity has been removed, we definitely remove it here.
                    entity_comp.inner = ComponentStorage::Removed;
                    indices_to_remove.push(entity_index);
                    continue;
                }
                ComponentStorage::Updated => panic!("entity was already being updated"),
            };

            let id = entity_comp.id;
            entity.tick(self, id);

            let entity_comp = &mut self.entities[entity_index];
            match entity_comp.inner {
                ComponentStorage::Ready(_) => panic!("entity should not be ready"),
                ComponentStorage::Removed => indices_to_remove.push(entity_index),
                ComponentStorage::Updated => entity_comp.inner = ComponentStorage::Ready(entity),
            }

        }

        // Indices to remove have been pushed from lower index to higher, so we drain in
        // reverse: the entity swapped in place of a removed one is never itself pending
        // removal.
        for index_to_remove in indices_to_remove.into_iter().rev() {

            self.entities.swap_remove(index_to_remove);

            if let Some(swapped_comp) = self.entities.get(index_to_remove) {
                // The swapped entity was at the end, so the new length. It may have been
                // removed while ticking, in which case it is no longer mapped.
                let previous_index = self.entities.len();
                if let Some(index) = self.entities_id_map.get_mut(&swapped_comp.id) {
                    debug_assert_eq!(*index, previous_index, "incoherent previous entity index");
                    *index = index_to_remove;
                }
            }

        }

    }

    /// Internal function to tick all block entities.
    #[instrument(skip_all)]
    fn tick_block_entities(&mut self) {

        let mut indices_to_remove = Vec::new();

        // The logic is essentially the same has for entity ticking.
        for block_entity_index in 0..self.block_entities.len() {

            let block_entity_comp = &mut self.block_entities[block_entity_index];
            let mut block_entity = match block_entity_comp.inner.replace(ComponentStorage::Updated) {
                ComponentStorage::Ready(data) => data,
                ComponentStorage::Removed => {
                    block_entity_comp.inner = ComponentStorage::Removed;
                    indices_to_remove.push(block_entity_index);
                    continue;
                }
                ComponentStorage::Updated => panic!("block entity was already being updated"),
            };

            // Tick the block entity at its position.
            let pos = block_entity_comp.pos;
            block_entity.tick(self, pos);

            // Re-insert the block entity in the world after update.
            let block_entity_comp = &mut self.block_entities[block_entity_index];
            match block_entity_comp.inner {
                ComponentStorage::Ready(_) => panic!("block entity should not be ready"),
                ComponentStorage::Removed => indices_to_remove.push(block_entity_index),
                ComponentStorage::Updated => {
                    block_entity_comp.inner = ComponentStorage::Ready(block_entity);
                    self.flush_block_entity_changes(pos);
                }
            }

        }

        for index_to_remove in indices_to_remove.into_iter().rev() {

            self.block_entities.swap_remove(index_to_remove);

            if let Some(swapped_comp) = self.block_entities.get(index_to_remove) {
                // A block entity may have been replaced at the same position, the map
                // then points to the replacing component and must not be touched.
                let previous_index = self.block_entities.len();
                if let Some(index) = self.block_entities_pos_map.get_mut(&swapped_comp.pos) {
                    if *index == previous_index {
                        *index = index_to_remove;
                    }
                }
            }

        }

    }

}


/// An event that happened in the world.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// An event with a block.
    Block {
        /// The position of the block.
        pos: IVec3,
        /// Inner block event.
        inner: BlockEvent,
    },
    /// An event with an entity given its id.
    Entity {
        /// The unique id of the entity.
        id: u32,
        /// Inner entity event.
        inner: EntityEvent,
    },
    /// An event with a block entity.
    BlockEntity {
        /// The block entity position.
        pos: IVec3,
        /// Inner block entity event.
        inner: BlockEntityEvent,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum BlockEvent {
    /// A block has been changed in the world.
    Set {
        /// The new block id.
        id: u8,
        /// The new block metadata.
        metadata: u16,
        /// Previous block id.
        prev_id: u8,
        /// Previous block metadata.
        prev_metadata: u16,
    },
    /// Play the block activation sound at given position and id/metadata.
    Sound {
        /// Current id of the block.
        id: u8,
        /// Current metadata of the block.
        metadata: u16,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum EntityEvent {
    /// The entity has been spawned.
    Spawn,
    /// The entity has been removed.
    Remove,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BlockEntityEvent {
    /// The block entity has been set at its position.
    Set,
    /// The block entity has been removed at its position.
    Remove,
    /// A block entity have seen some of its stored item stack changed.
    Storage {
        /// The slot index in the block entity's storage.
        index: u8,
        /// The next item stack at this index.
        stack: ItemStack,
    },
}


/// Internal type for storing a world entity.
#[derive(Debug, Clone)]
struct EntityComponent {
    /// The entity storage.
    inner: ComponentStorage<Box<Entity>>,
    /// Unique entity id is duplicated here to allow us to access it event when entity
    /// is updating.
    id: u32,
}

/// Internal type for storing a world block entity.
#[derive(Debug, Clone)]
struct BlockEntityComponent {
    /// The block entity storage.
    inner: ComponentStorage<Box<BlockEntity>>,
    /// Position of that block entity.
    pos: IVec3,
}

/// State of a component storage.
#[derive(Debug, Clone)]
enum ComponentStorage<T> {
    /// The component is present and ready to update.
    Ready(T),
    /// The component is temporally owned by the tick function in order to update it.
    Updated,
    /// The component has been marked for removal and will be removed on next tick, the
    /// component should already be removed from its world mapping.
    Removed,
}

impl<T> ComponentStorage<T> {

    /// If the inner storage data is ready and is [`Deref`], its target is returned.
    #[inline]
    fn as_deref(&self) -> Option<&T::Target>
    where
        T: Deref
    {
        match self {
            Self::Ready(data) => Some(data.deref()),
            _ => None
        }
    }

    /// If the inner storage data is ready and is [`DerefMut`], its target is returned.
    #[inline]
    fn as_deref_mut(&mut self) -> Option<&mut T::Target>
    where
        T: DerefMut,
    {
        match self {
            Self::Ready(data) => Some(data.deref_mut()),
            _ => None
        }
    }

    /// Replace that storage with another one, returning the previous one.
    #[inline]
    fn replace(&mut self, value: Self) -> Self {
        mem::replace(self, value)
    }

}


/// An iterator for all entities in a world.
pub struct EntitiesIter<'a>(slice::Iter<'a, EntityComponent>);

impl FusedIterator for EntitiesIter<'_> {}
impl<'a> Iterator for EntitiesIter<'a> {

    type Item = (u32, &'a Entity);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.0.by_ref().find_map(|comp| comp.inner.as_deref().map(|e| (comp.id, e)))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.0.size_hint().1)
    }

}

/// An iterator for all block entities in a world.
pub struct BlockEntitiesIter<'a>(slice::Iter<'a, BlockEntityComponent>);

impl FusedIterator for BlockEntitiesIter<'_> {}
impl<'a> Iterator for BlockEntitiesIter<'a> {

    type Item = (IVec3, &'a BlockEntity);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.0.by_ref().find_map(|comp| comp.inner.as_deref().map(|e| (comp.pos, e)))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.0.size_hint().1)
    }

}


#[cfg(test)]
mod tests {

    use glam::DVec3;

    use crate::block_entity::crafting_bowl::CraftingBowlBlockEntity;
    use crate::entity::{ItemEntity, ITEM_LIFETIME};
    use crate::item;

    use super::*;

    fn new_world() -> World {
        let mut world = World::with_rand(Arc::new(RecipeRegistry::bakery()), JavaRandom::new(0));
        world.swap_events(Some(Vec::new()));
        world
    }

    #[test]
    fn blocks() {

        let mut world = new_world();
        let pos = IVec3::new(3, 64, -7);

        assert_eq!(world.get_block(pos), Some((block::AIR, 0)));
        assert_eq!(world.get_block(IVec3::new(0, -1, 0)), None);
        assert_eq!(world.get_block(IVec3::new(0, WORLD_HEIGHT, 0)), None);
        assert_eq!(world.set_block(IVec3::new(0, WORLD_HEIGHT, 0), block::STONE, 0), None);

        assert_eq!(world.set_block(pos, block::STONE, 0), Some((block::AIR, 0)));
        assert_eq!(world.set_block(pos, block::STONE, 0), Some((block::STONE, 0)));
        assert_eq!(world.get_block(pos), Some((block::STONE, 0)));
        assert_eq!(world.set_block(pos, block::AIR, 0), Some((block::STONE, 0)));

        // The unchanged set must not push any event.
        let events = world.swap_events(None).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], Event::Block {
            pos,
            inner: BlockEvent::Set { id: block::STONE, metadata: 0, prev_id: block::AIR, prev_metadata: 0 },
        });

    }

    #[test]
    fn entities_expire() {

        let mut world = new_world();
        let a = world.spawn_entity(ItemEntity::new(DVec3::ZERO, ItemStack::new(item::FLOUR)));
        world.tick();
        let b = world.spawn_entity(ItemEntity::new(DVec3::ONE, ItemStack::new(item::SUGAR)));
        assert_ne!(a, b);
        assert_eq!(world.get_entity_count(), 2);

        for _ in 1..ITEM_LIFETIME {
            world.tick();
        }

        // The first entity has just expired, the second one is still there.
        assert!(!world.contains_entity(a));
        assert!(world.contains_entity(b));
        assert_eq!(world.iter_entities().map(|(id, _)| id).collect::<Vec<_>>(), [b]);

        world.tick();
        assert_eq!(world.get_entity_count(), 0);
        assert!(world.get_entity(b).is_none());

    }

    #[test]
    fn entity_removal_keeps_mapping() {

        let mut world = new_world();
        let ids = (0..4)
            .map(|i| world.spawn_entity(ItemEntity::new(DVec3::splat(i as f64), ItemStack::new(item::EGG))))
            .collect::<Vec<_>>();

        assert!(world.remove_entity(ids[1]));
        assert!(!world.remove_entity(ids[1]));
        world.tick();

        for &id in &[ids[0], ids[2], ids[3]] {
            let Some(Entity::Item(entity)) = world.get_entity(id) else { panic!("missing entity #{id}") };
            assert_eq!(entity.pos, DVec3::splat(id as f64));
        }

    }

    #[test]
    fn block_entity_replace() {

        let mut world = new_world();
        let pos = IVec3::new(0, 10, 0);
        let other = IVec3::new(1, 10, 0);

        world.set_block_entity(pos, BlockEntity::CraftingBowl(CraftingBowlBlockEntity::default()));
        world.set_block_entity(other, BlockEntity::CraftingBowl(CraftingBowlBlockEntity::default()));
        world.set_block_entity(pos, BlockEntity::CraftingBowl(CraftingBowlBlockEntity::default()));
        world.tick();

        assert!(world.contains_block_entity(pos));
        assert!(world.contains_block_entity(other));
        assert_eq!(world.iter_block_entities().count(), 2);

        assert!(world.remove_block_entity(pos));
        assert!(!world.remove_block_entity(pos));
        world.tick();
        assert_eq!(world.iter_block_entities().map(|(p, _)| p).collect::<Vec<_>>(), [other]);
        assert!(world.get_block_entity(other).is_some());

    }

}
