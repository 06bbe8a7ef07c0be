//! Crafting bowl block entity.
//! 
//! The bowl holds four ingredient slots and one result slot. While its block is 
//! stirring, every tick brings the stirring progress closer to [`STIRS_NEEDED`], and 
//! the tick where the progress reaches it crafts the recipe matching the ingredients.
//! Progress left unfinished when stirring stops is lost.

use std::ops::Range;

use glam::IVec3;

use tracing::{debug, trace};

use crate::block::crafting_bowl::{self, STIRS_NEEDED};
use crate::inventory::{Container, Inventory};
use crate::recipe::{BowlRecipe, RecipeRegistry};
use crate::item::{self, ItemStack};
use crate::world::World;
use crate::block;


/// Number of slots in the bowl.
pub const SLOTS: usize = 5;
/// Slots holding the ingredients.
pub const INGREDIENT_SLOTS: Range<usize> = 0..4;
/// Slot receiving the crafted result.
pub const RESULT_SLOT: usize = 4;
/// Maximum size of any stack held by the bowl, larger stacks are truncated.
pub const MAX_STACK_SIZE: u16 = 1;


#[derive(Debug, Clone)]
pub struct CraftingBowlBlockEntity {
    /// The inventory of the bowl, see [`INGREDIENT_SLOTS`] and [`RESULT_SLOT`].
    pub inv: Inventory,
}

impl Default for CraftingBowlBlockEntity {
    fn default() -> Self {
        Self {
            inv: Inventory::new(SLOTS),
        }
    }
}

/// Stirring state of a bowl, stored in the metadata of its block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StirState {
    /// Remaining ticks of active stirring.
    pub stirring: u8,
    /// Stirring progress, up to [`STIRS_NEEDED`].
    pub stirred: u8,
}

impl StirState {

    /// Read the stirring state from the bowl's block metadata.
    pub fn from_metadata(metadata: u16) -> Self {
        Self {
            stirring: crafting_bowl::get_stirring(metadata),
            stirred: crafting_bowl::get_stirred(metadata),
        }
    }

    /// Write this stirring state into the bowl's block metadata.
    pub fn write_metadata(self, metadata: &mut u16) {
        crafting_bowl::set_stirring(metadata, self.stirring);
        crafting_bowl::set_stirred(metadata, self.stirred);
    }

}

/// What happened on a single stirring tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StirOutcome {
    /// Not stirring and nothing to decay.
    Idle,
    /// Not stirring, the unfinished progress has been reset.
    Decayed,
    /// Stirring made progress without reaching the end.
    Progressed,
    /// Progress reached its end and the matching recipe has been crafted.
    Crafted,
    /// Progress reached its end but no recipe matches the ingredients.
    Unmatched,
    /// Stirring while the progress was already at its end, nothing is crafted until 
    /// the progress is reset from outside.
    Saturated,
}

impl CraftingBowlBlockEntity {

    /// Tick the crafting bowl block entity, its stirring state is read from and written 
    /// back to the block at its position, which must be a crafting bowl.
    pub fn tick(&mut self, world: &mut World, pos: IVec3) {

        let Some((block::CRAFTING_BOWL, mut metadata)) = world.get_block(pos) else { return };

        let prev_state = StirState::from_metadata(metadata);
        let mut state = prev_state;

        // The registry is shared, so the world can be borrowed to spawn remainders.
        let recipes = world.get_recipes().clone();
        let outcome = self.tick_stir(&mut state, &recipes, |stack| {
            world.spawn_loot_in_block(pos, stack);
        });

        match outcome {
            StirOutcome::Crafted => debug!("crafting bowl at {pos} crafted {}", item::name(self.inv.stack(RESULT_SLOT).id)),
            StirOutcome::Unmatched => debug!("crafting bowl at {pos} finished stirring without recipe"),
            StirOutcome::Decayed => trace!("crafting bowl at {pos} lost its progress"),
            _ => {}
        }

        if state != prev_state {
            state.write_metadata(&mut metadata);
            world.set_block(pos, block::CRAFTING_BOWL, metadata);
        }

    }

    /// Advance the given stirring state by one tick, crafting the first recipe of the
    /// registry that matches the ingredients when progress reaches [`STIRS_NEEDED`]. 
    /// Remainders of the consumed ingredients are given in consumption order to the
    /// spawn function.
    pub fn tick_stir(&mut self, 
        state: &mut StirState, 
        recipes: &RecipeRegistry, 
        mut spawn_remainder: impl FnMut(ItemStack),
    ) -> StirOutcome {

        if state.stirring == 0 {
            return if state.stirred > 0 && state.stirred < STIRS_NEEDED {
                state.stirred = 0;
                StirOutcome::Decayed
            } else {
                StirOutcome::Idle
            };
        }

        let outcome = if state.stirred < STIRS_NEEDED {
            state.stirred += 1;
            if state.stirred == STIRS_NEEDED {
                match recipes.find(&self.inv) {
                    Some((_, recipe)) => {
                        self.craft(recipe, &mut spawn_remainder);
                        StirOutcome::Crafted
                    }
                    None => StirOutcome::Unmatched,
                }
            } else {
                StirOutcome::Progressed
            }
        } else {
            StirOutcome::Saturated
        };

        state.stirring -= 1;
        outcome

    }

    /// Consume the ingredients of the recipe and set its result. Each ingredient takes 
    /// the first slot that satisfies it.
    fn craft(&mut self, recipe: &BowlRecipe, spawn_remainder: &mut impl FnMut(ItemStack)) {

        for ingredient in &recipe.ingredients {
            for index in 0..self.inv.size() {
                let stack = self.inv.stack(index);
                if ingredient.test(stack) {
                    self.inv.set_stack(index, ItemStack::EMPTY);
                    if let Some(remainder) = stack.remainder() {
                        spawn_remainder(remainder);
                    }
                    break;
                }
            }
        }

        self.set_stack(RESULT_SLOT, recipe.result);

    }

    /// Return the number of occupied ingredient slots.
    pub fn filled_slots(&self) -> usize {
        INGREDIENT_SLOTS
            .filter(|&index| !self.inv.stack(index).is_empty())
            .count()
    }

    /// Return true if the stack can be added to the ingredients, at least one 
    /// ingredient slot must be free.
    pub fn can_add_stack(&self, stack: ItemStack) -> bool {
        !stack.is_empty() && self.filled_slots() < INGREDIENT_SLOTS.len()
    }

    /// Add a single item of the given stack in the first free ingredient slot, returning
    /// true if successful. The inventory registers the change.
    pub fn add_stack(&mut self, stack: ItemStack) -> bool {

        if !self.can_add_stack(stack) {
            return false;
        }

        for index in INGREDIENT_SLOTS {
            if self.can_insert(index, stack) {
                self.inv.set_stack(index, stack.with_size(1));
                return true;
            }
        }

        false

    }

    /// Take the stack in the result slot, if any.
    pub fn take_result(&mut self) -> Option<ItemStack> {
        let stack = self.inv.stack(RESULT_SLOT).to_non_empty()?;
        self.inv.set_stack(RESULT_SLOT, ItemStack::EMPTY);
        Some(stack)
    }

}

/// The bowl as seen by hoppers and other automation: one item per ingredient slot, 
/// nothing can be inserted in the result slot.
impl Container for CraftingBowlBlockEntity {

    fn size(&self) -> usize {
        self.inv.size()
    }

    fn stack(&self, index: usize) -> ItemStack {
        self.inv.stack(index)
    }

    fn set_stack(&mut self, index: usize, stack: ItemStack) {
        self.inv.set_stack(index, stack.with_size(stack.size.min(MAX_STACK_SIZE)));
    }

    fn can_insert(&self, index: usize, stack: ItemStack) -> bool {
        INGREDIENT_SLOTS.contains(&index) && self.inv.stack(index).is_empty() && !stack.is_empty()
    }

}
