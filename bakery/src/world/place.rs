//! Placing blocks in the world.

use glam::IVec3;

use tracing::debug;

use crate::block_entity::crafting_bowl::CraftingBowlBlockEntity;
use crate::block_entity::BlockEntity;
use crate::block;

use super::World;


/// Methods related to block placement in the world.
impl World {

    /// Place a crafting bowl at the given position, with no stirring state and an empty
    /// block entity. This returns false if the position is not free.
    pub fn place_crafting_bowl(&mut self, pos: IVec3) -> bool {

        if self.get_block(pos) != Some((block::AIR, 0)) {
            return false;
        }

        self.set_block(pos, block::CRAFTING_BOWL, 0);
        self.set_block_entity(pos, BlockEntity::CraftingBowl(CraftingBowlBlockEntity::default()));
        debug!("placed crafting bowl at {pos}");
        true

    }

}
