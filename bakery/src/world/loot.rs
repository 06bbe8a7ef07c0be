//! Looting functions to spawn items in a world.

use glam::{IVec3, DVec3};

use crate::entity::ItemEntity;
use crate::item::ItemStack;

use super::World;


/// Methods related to loot spawning in the world.
impl World {

    /// Spawn item entity in the world containing the given stack, at the exact given 
    /// position. This item entity will be impossible to pickup for 10 ticks. Returns
    /// the id of the spawned entity, if the stack is not empty.
    pub fn spawn_loot(&mut self, pos: DVec3, stack: ItemStack) -> Option<u32> {
        let stack = stack.to_non_empty()?;
        Some(self.spawn_entity(ItemEntity::new(pos, stack)))
    }

    /// Spawn item entity in the world containing the given stack, at a random position
    /// within the given block, each coordinate being offset by `0.15..0.85`.
    pub fn spawn_loot_in_block(&mut self, pos: IVec3, stack: ItemStack) -> Option<u32> {
        if stack.is_empty() {
            return None;
        }
        let offset = self.get_rand_mut().next_dvec3() * 0.7 + 0.15;
        self.spawn_loot(pos.as_dvec3() + offset, stack)
    }

}
