//! Breaking blocks in the world.

use glam::IVec3;

use tracing::debug;

use crate::block_entity::BlockEntity;
use crate::inventory::Container;
use crate::block;

use super::World;


impl World {

    /// Break the crafting bowl at the given position, removing its block entity and 
    /// spawning every stack it contained as item entities. This returns false if there
    /// is no crafting bowl at this position.
    pub fn break_crafting_bowl(&mut self, pos: IVec3) -> bool {

        if !matches!(self.get_block(pos), Some((block::CRAFTING_BOWL, _))) {
            return false;
        }

        // Copy the stacks out before removing, the storage is freed on removal.
        let stacks = match self.get_block_entity(pos) {
            Some(BlockEntity::CraftingBowl(bowl)) if !bowl.inv.is_empty() => bowl.inv.stacks().to_vec(),
            _ => Vec::new(),
        };

        self.set_block(pos, block::AIR, 0);
        self.remove_block_entity(pos);

        for stack in stacks {
            self.spawn_loot_in_block(pos, stack);
        }

        debug!("broke crafting bowl at {pos}");
        true

    }

}
