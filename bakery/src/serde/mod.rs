//! Serialization and deserialization of block entities, as gzip compressed NBT files.

use std::io::{Read, Write};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use glam::IVec3;

use tracing::debug;

use crate::block_entity::BlockEntity;
use crate::world::World;

use self::nbt::{Nbt, NbtCompound, NbtError, NbtParseError};

pub mod nbt;
pub mod slot_nbt;
pub mod block_entity_nbt;


/// Write every block entity of the world to the given writer, the NBT root compound
/// has a single `BlockEntities` list and is gzip compressed.
pub fn write_block_entities(writer: impl Write, world: &World) -> Result<(), SerdeError> {

    let list = world.iter_block_entities()
        .map(|(pos, block_entity)| {
            let mut comp = NbtCompound::new();
            block_entity_nbt::to_nbt(&mut comp, pos, block_entity);
            Nbt::Compound(comp)
        })
        .collect::<Vec<_>>();

    debug!("writing {} block entities", list.len());

    let mut root = NbtCompound::new();
    root.insert("BlockEntities", list);

    let mut encoder = GzEncoder::new(writer, Compression::default());
    nbt::to_writer(&mut encoder, &Nbt::Compound(root))?;
    encoder.finish().map_err(NbtError::Io)?;
    Ok(())

}

/// Read block entities and their position from the given reader, as written by
/// [`write_block_entities`].
pub fn read_block_entities(reader: impl Read) -> Result<Vec<(IVec3, BlockEntity)>, SerdeError> {

    let root = nbt::from_reader(GzDecoder::new(reader))?;
    let root = root.parse().as_compound()?;

    let list = root.get_list("BlockEntities")?;
    let mut block_entities = Vec::with_capacity(list.len());
    for item in list.iter() {
        block_entities.push(block_entity_nbt::from_nbt(&item.as_compound()?)?);
    }

    debug!("read {} block entities", block_entities.len());
    Ok(block_entities)

}


/// Error type for reading and writing block entity files.
#[derive(thiserror::Error, Debug)]
pub enum SerdeError {
    #[error("nbt: {0}")]
    Nbt(#[from] NbtError),
    #[error("parse: {0}")]
    Parse(#[from] NbtParseError),
}


#[cfg(test)]
mod tests {

    use std::sync::Arc;

    use crate::block_entity::crafting_bowl::RESULT_SLOT;
    use crate::inventory::Container;
    use crate::recipe::RecipeRegistry;
    use crate::item::{self, ItemStack};

    use super::*;

    fn bowl_with(stacks: &[(usize, ItemStack)]) -> BlockEntity {
        let mut bowl = crate::block_entity::crafting_bowl::CraftingBowlBlockEntity::default();
        for &(index, stack) in stacks {
            bowl.inv.set_stack(index, stack);
        }
        BlockEntity::CraftingBowl(bowl)
    }

    #[test]
    fn world_block_entities() {

        let mut world = World::new(Arc::new(RecipeRegistry::bakery()));
        world.set_block_entity(IVec3::new(1, 2, 3), bowl_with(&[
            (0, ItemStack::new(item::FLOUR)),
            (2, ItemStack::new(item::WATER_BUCKET)),
            (RESULT_SLOT, ItemStack::new(item::DOUGH)),
        ]));
        world.set_block_entity(IVec3::new(-8, 0, 70000), bowl_with(&[
            (3, ItemStack::new(item::EGG).with_damage(2)),
        ]));

        let mut buf = Vec::new();
        write_block_entities(&mut buf, &world).unwrap();
        // Gzip magic.
        assert_eq!(&buf[..2], &[0x1F, 0x8B]);

        let mut read = read_block_entities(&buf[..]).unwrap();
        read.sort_by_key(|&(pos, _)| pos.x);
        assert_eq!(read.len(), 2);

        let (pos, BlockEntity::CraftingBowl(bowl)) = &read[0];
        assert_eq!(*pos, IVec3::new(-8, 0, 70000));
        assert_eq!(bowl.inv.stack(3), ItemStack::new(item::EGG).with_damage(2));
        assert_eq!(bowl.filled_slots(), 1);
        assert!(!bowl.inv.has_changes());

        let (pos, BlockEntity::CraftingBowl(bowl)) = &read[1];
        assert_eq!(*pos, IVec3::new(1, 2, 3));
        assert_eq!(bowl.inv.stacks(), &[
            ItemStack::new(item::FLOUR),
            ItemStack::EMPTY,
            ItemStack::new(item::WATER_BUCKET),
            ItemStack::EMPTY,
            ItemStack::new(item::DOUGH),
        ]);

    }

    fn bowl_nbt(id: &str, slots: &[(u8, ItemStack)]) -> Vec<u8> {

        let items = slots.iter()
            .map(|&(slot, stack)| Nbt::Compound(slot_nbt::to_nbt(slot, stack)))
            .collect::<Vec<_>>();

        let mut bowl = NbtCompound::new();
        bowl.insert("id", id);
        bowl.insert("x", 0i32);
        bowl.insert("y", 0i32);
        bowl.insert("z", 0i32);
        bowl.insert("Items", items);

        let mut root = NbtCompound::new();
        root.insert("BlockEntities", vec![Nbt::Compound(bowl)]);

        let mut buf = Vec::new();
        let mut encoder = GzEncoder::new(&mut buf, Compression::fast());
        nbt::to_writer(&mut encoder, &Nbt::Compound(root)).unwrap();
        encoder.finish().unwrap();
        buf

    }

    #[test]
    fn out_of_range_slot_ignored() {
        let buf = bowl_nbt("CraftingBowl", &[(9, ItemStack::new(item::SUGAR)), (1, ItemStack::new(item::JAR))]);
        let read = read_block_entities(&buf[..]).unwrap();
        let (_, BlockEntity::CraftingBowl(bowl)) = &read[0];
        assert_eq!(bowl.filled_slots(), 1);
        assert_eq!(bowl.inv.stack(1), ItemStack::new(item::JAR));
    }

    #[test]
    fn oversized_stack_truncated() {
        let buf = bowl_nbt("CraftingBowl", &[(RESULT_SLOT as u8, ItemStack::new(item::DOUGH).with_size(5))]);
        let read = read_block_entities(&buf[..]).unwrap();
        let (_, BlockEntity::CraftingBowl(bowl)) = &read[0];
        assert_eq!(bowl.inv.stack(RESULT_SLOT), ItemStack::new(item::DOUGH));
    }

    #[test]
    fn unknown_id() {
        let buf = bowl_nbt("Chest", &[]);
        match read_block_entities(&buf[..]) {
            Err(SerdeError::Parse(err)) => assert_eq!(err.path, "/BlockEntities/0/id"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn not_gzip() {
        let mut buf = Vec::new();
        nbt::to_writer(&mut buf, &Nbt::Compound(NbtCompound::new())).unwrap();
        assert!(matches!(read_block_entities(&buf[..]), Err(SerdeError::Nbt(NbtError::Io(_)))));
    }

    #[test]
    fn deeply_nested_file() {

        // A small corrupted file with millions of unclosed compounds.
        let mut buf = Vec::new();
        let mut encoder = GzEncoder::new(&mut buf, Compression::best());
        encoder.write_all(&[10u8, 0, 0].repeat(2_000_000)).unwrap();
        encoder.finish().unwrap();

        assert!(matches!(read_block_entities(&buf[..]), Err(SerdeError::Nbt(NbtError::TooDeep))));

    }

}
