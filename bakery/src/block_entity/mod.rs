//! This module contains definition and behaviors for block entities.

use glam::IVec3;

use crate::inventory::Inventory;
use crate::world::World;

pub mod crafting_bowl;


/// All kinds of block entities.
#[derive(Debug, Clone)]
pub enum BlockEntity {
    CraftingBowl(crafting_bowl::CraftingBowlBlockEntity),
}

impl BlockEntity {

    /// Tick the block entity at its position in the world.
    pub fn tick(&mut self, world: &mut World, pos: IVec3) {
        match self {
            BlockEntity::CraftingBowl(bowl) => bowl.tick(world, pos),
        }
    }

    /// Get the inventory storing the items of this block entity, if any.
    pub fn inventory_mut(&mut self) -> Option<&mut Inventory> {
        match self {
            BlockEntity::CraftingBowl(bowl) => Some(&mut bowl.inv),
        }
    }

}
