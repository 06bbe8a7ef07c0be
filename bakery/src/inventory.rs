//! Containers of item stacks.

use crate::item::{self, ItemStack};


/// Capability set of anything storing item stacks in a fixed number of slots. Slot
/// indices out of `0..size()` are a programming error and panic.
pub trait Container {

    /// Return the number of slots of this container, constant for its lifetime.
    fn size(&self) -> usize;

    /// Get the stack at the given slot.
    fn stack(&self, index: usize) -> ItemStack;

    /// Set the stack at the given slot, marking the slot as changed.
    fn set_stack(&mut self, index: usize, stack: ItemStack);

    /// Return true if the given stack may be inserted at this slot by automation.
    fn can_insert(&self, index: usize, stack: ItemStack) -> bool {
        let _ = (index, stack);
        true
    }

    /// Return true if every slot is empty.
    fn is_empty(&self) -> bool {
        (0..self.size()).all(|index| self.stack(index).is_empty())
    }

}


/// A base generic inventory with the given number of slots.
#[derive(Debug, Clone)]
pub struct Inventory {
    /// Stacks in the inventory.
    stacks: Box<[ItemStack]>,
    /// Bit set of slot indices where item has changed.
    changes: u64,
}

impl Inventory {

    pub fn new(size: usize) -> Self {
        assert!(size <= 64);
        Self {
            stacks: vec![ItemStack::EMPTY; size].into_boxed_slice(),
            changes: 0,
        }
    }

    /// Get a slice of all stacks in this inventory.
    pub fn stacks(&self) -> &[ItemStack] {
        &self.stacks
    }

    /// Add the given item to the inventory if possible. This function returns the number
    /// of items from the stack that have been successfully added in the inventory.
    pub fn add_stack(&mut self, stack: ItemStack) -> u16 {

        // Do nothing if stack size is 0 or the item is air.
        if stack.is_empty() {
            return 0;
        }

        let item = item::from_id(stack.id);
        let mut remaining_size = stack.size;

        // Only accumulate if stack size is greater than 1.
        if item.max_stack_size > 1 {
            for (index, slot) in self.stacks.iter_mut().enumerate() {

                // If the slot is of the same item and has space left in the stack size.
                if !slot.is_empty() && slot.id == stack.id && slot.damage == stack.damage && slot.size < item.max_stack_size {

                    let available = item.max_stack_size - slot.size;
                    let to_add = available.min(remaining_size);

                    slot.size += to_add;
                    remaining_size -= to_add;
                    self.changes |= 1 << index;

                    if remaining_size == 0 {
                        return stack.size;
                    }

                }

            }
        }

        // Remaining items go in the empty slots, split by the max stack size.
        for (index, slot) in self.stacks.iter_mut().enumerate() {
            if slot.is_empty() {
                let to_add = item.max_stack_size.min(remaining_size);
                *slot = stack.with_size(to_add);
                remaining_size -= to_add;
                self.changes |= 1 << index;
                if remaining_size == 0 {
                    return stack.size;
                }
            }
        }

        stack.size - remaining_size

    }

    /// Clear changes registered in this inventory.
    pub fn clear_changes(&mut self) {
        self.changes = 0;
    }

    /// Return true if this inventory has been modified since the last call to 
    /// `clear_changes`, the owner should then be persisted.
    pub fn has_changes(&self) -> bool {
        self.changes != 0
    }

    /// Iterate over item changes that happened in this inventory, this also returns the
    /// new item at the changed position.
    pub fn changes(&self) -> impl Iterator<Item = (usize, ItemStack)> + '_ {
        (0..self.stacks.len()).filter_map(|i| {
            if self.changes & (1 << i) != 0 {
                Some((i, self.stacks[i]))
            } else {
                None
            }
        })
    }

}

impl Container for Inventory {

    fn size(&self) -> usize {
        self.stacks.len()
    }

    fn stack(&self, index: usize) -> ItemStack {
        self.stacks[index]
    }

    fn set_stack(&mut self, index: usize, stack: ItemStack) {
        self.stacks[index] = stack;
        self.changes |= 1 << index;
    }

}
