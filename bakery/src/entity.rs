//! Free-standing entities spawned in the world.

use glam::DVec3;

use crate::item::ItemStack;
use crate::world::World;


/// Ticks before a dropped item can be picked up.
pub const ITEM_PICKUP_DELAY: u32 = 10;
/// Ticks before a dropped item despawns (5 * 60 * 20).
pub const ITEM_LIFETIME: u32 = 6000;


/// All kinds of entities.
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    Item(ItemEntity),
}

/// An item stack lying in the world.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemEntity {
    /// Position of the entity in the world.
    pub pos: DVec3,
    /// The item stack represented by this entity.
    pub stack: ItemStack,
    /// Number of ticks this entity has existed.
    pub lifetime: u32,
    /// Remaining ticks before the item can be picked up.
    pub frozen_ticks: u32,
}

impl ItemEntity {

    pub fn new(pos: DVec3, stack: ItemStack) -> Self {
        Self {
            pos,
            stack,
            lifetime: 0,
            frozen_ticks: ITEM_PICKUP_DELAY,
        }
    }

    /// Return true if the item can be picked up.
    pub fn can_pickup(&self) -> bool {
        self.frozen_ticks == 0
    }

    /// Tick the item entity.
    pub fn tick(&mut self, world: &mut World, id: u32) {

        if self.frozen_ticks > 0 {
            self.frozen_ticks -= 1;
        }

        self.lifetime += 1;
        if self.lifetime >= ITEM_LIFETIME {
            world.remove_entity(id);
        }

    }

}

impl Entity {

    /// Tick the entity with its unique id in the world.
    pub fn tick(&mut self, world: &mut World, id: u32) {
        match self {
            Entity::Item(item) => item.tick(world, id),
        }
    }

}

impl From<ItemEntity> for Entity {
    fn from(value: ItemEntity) -> Self {
        Entity::Item(value)
    }
}

impl From<ItemEntity> for Box<Entity> {
    fn from(value: ItemEntity) -> Self {
        Box::new(Entity::Item(value))
    }
}
