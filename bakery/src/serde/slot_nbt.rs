//! NBT serialization and deserialization for the slots of a container, each slot is a 
//! compound with its `Slot` index and the item stack's `id`, `Count` and `Damage`.

use crate::serde::nbt::{NbtParseError, NbtCompound, NbtCompoundParse, NbtListParse, Nbt};
use crate::inventory::Container;
use crate::item::ItemStack;


/// Create a slot index and its item stack from a NBT compound.
pub fn from_nbt(comp: &NbtCompoundParse) -> Result<(u8, ItemStack), NbtParseError> {
    let slot = comp.get_byte("Slot")? as u8;
    let stack = ItemStack {
        id: comp.get_short("id")? as u16,
        size: comp.get_byte("Count")?.max(0) as u16,
        damage: comp.get_short("Damage")? as u16,
    };
    Ok((slot, stack))
}

/// Encode a slot index and its item stack into a NBT compound, the stack size is 
/// saturated to fit in a byte.
pub fn to_nbt(slot: u8, stack: ItemStack) -> NbtCompound {
    let mut comp = NbtCompound::new();
    comp.insert("Slot", slot);
    comp.insert("id", stack.id);
    comp.insert("Count", stack.size.min(i8::MAX as u16) as i8);
    comp.insert("Damage", stack.damage);
    comp
}

/// Load every slot compound of the list into the container, slots that are out of the
/// container are ignored.
pub fn from_nbt_to_container(list: NbtListParse, container: &mut impl Container) -> Result<(), NbtParseError> {
    for item in list.iter() {
        let (slot, stack) = from_nbt(&item.as_compound()?)?;
        if (slot as usize) < container.size() {
            container.set_stack(slot as usize, stack);
        }
    }
    Ok(())
}

/// Encode every non-empty slot of the container into a list of slot compounds.
pub fn to_nbt_from_container(container: &impl Container) -> Vec<Nbt> {
    (0..container.size().min(256))
        .filter_map(|index| {
            let stack = container.stack(index).to_non_empty()?;
            Some(Nbt::Compound(to_nbt(index as u8, stack)))
        })
        .collect()
}


#[cfg(test)]
mod tests {

    use crate::inventory::Inventory;
    use crate::item;

    use super::*;

    #[test]
    fn container() {

        let mut inv = Inventory::new(3);
        inv.set_stack(0, ItemStack::new(item::EGG).with_size(12).with_damage(1));
        inv.set_stack(2, ItemStack::new(item::FLOUR).with_size(300));

        let list = Nbt::List(to_nbt_from_container(&inv));
        let mut loaded = Inventory::new(2);
        from_nbt_to_container(list.parse().as_list().unwrap(), &mut loaded).unwrap();

        // Slot 2 does not fit.
        assert_eq!(loaded.stacks(), &[ItemStack::new(item::EGG).with_size(12).with_damage(1), ItemStack::EMPTY]);

        let (slot, stack) = from_nbt(&Nbt::Compound(to_nbt(2, inv.stack(2))).parse().as_compound().unwrap()).unwrap();
        assert_eq!(slot, 2);
        assert_eq!(stack.size, i8::MAX as u16);

    }

    #[test]
    fn wrong_count_type() {
        let mut comp = to_nbt(0, ItemStack::new(item::JAR));
        comp.insert("Count", 1i32);
        let nbt = Nbt::Compound(comp);
        let err = from_nbt(&nbt.parse().as_compound().unwrap()).unwrap_err();
        assert_eq!(err.path, "/Count");
    }

}
