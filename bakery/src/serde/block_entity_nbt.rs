//! NBT serialization and deserialization for [`BlockEntity`] type.

use glam::IVec3;

use crate::serde::nbt::{NbtParseError, NbtParseExpected, NbtCompound, NbtCompoundParse};
use crate::block_entity::crafting_bowl::CraftingBowlBlockEntity;
use crate::block_entity::BlockEntity;

use super::slot_nbt;


const CRAFTING_BOWL_ID: &str = "CraftingBowl";


/// Create a block entity and its position from a NBT compound.
pub fn from_nbt(comp: &NbtCompoundParse) -> Result<(IVec3, BlockEntity), NbtParseError> {

    let pos = IVec3 {
        x: comp.get_int("x")?,
        y: comp.get_int("y")?,
        z: comp.get_int("z")?,
    };

    let block_entity = match comp.get_string("id")? {
        CRAFTING_BOWL_ID => {
            let mut bowl = CraftingBowlBlockEntity::default();
            slot_nbt::from_nbt_to_container(comp.get_list("Items")?, &mut bowl)?;
            // Freshly loaded, nothing to synchronize.
            bowl.inv.clear_changes();
            BlockEntity::CraftingBowl(bowl)
        }
        _ => return Err(comp.make_invalid("id", NbtParseExpected::KnownId)),
    };

    Ok((pos, block_entity))

}

/// Encode a block entity and its position into a NBT compound.
pub fn to_nbt(comp: &mut NbtCompound, pos: IVec3, block_entity: &BlockEntity) {

    comp.insert("x", pos.x);
    comp.insert("y", pos.y);
    comp.insert("z", pos.z);

    match block_entity {
        BlockEntity::CraftingBowl(bowl) => {
            comp.insert("id", CRAFTING_BOWL_ID);
            comp.insert("Items", slot_nbt::to_nbt_from_container(&bowl.inv));
        }
    }

}
