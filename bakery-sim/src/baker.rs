//! Scripted bakers, each one working at its own crafting bowl through the same 
//! interactions as a player: inserting held items, stirring with an empty hand and
//! taking the result.

use arcstr::ArcStr;

use glam::IVec3;

use tracing::{info, warn};

use bakery::block::crafting_bowl::{self, STIRS_NEEDED};
use bakery::block_entity::crafting_bowl::RESULT_SLOT;
use bakery::block_entity::BlockEntity;
use bakery::inventory::{Container, Inventory};
use bakery::recipe::Ingredient;
use bakery::item::{self, ItemStack};
use bakery::world::World;
use bakery::block;


/// Number of slots in a baker's own inventory.
const BAKER_INV_SIZE: usize = 9;


#[derive(Debug)]
pub struct Baker {
    /// Identifier used in logs.
    id: usize,
    /// Position of the crafting bowl this baker works at.
    bowl: IVec3,
    /// Recipes this baker cycles through.
    orders: Vec<ArcStr>,
    /// Index of the current order.
    order_index: usize,
    /// Ingredients of the current order still to insert, last one is inserted first.
    pending: Vec<ItemStack>,
    /// Inventory receiving the baked results.
    inv: Inventory,
}

impl Baker {

    pub fn new(id: usize, bowl: IVec3, orders: Vec<ArcStr>) -> Self {
        Self {
            id,
            bowl,
            orders,
            order_index: 0,
            pending: Vec::new(),
            inv: Inventory::new(BAKER_INV_SIZE),
        }
    }

    /// The position of the bowl this baker works at.
    pub fn bowl(&self) -> IVec3 {
        self.bowl
    }

    /// The inventory where this baker keeps baked results.
    pub fn inv(&self) -> &Inventory {
        &self.inv
    }

    /// Start the current order, its ingredients will be inserted on next actions.
    fn start_order(&mut self, world: &World) {

        let Some(id) = self.orders.get(self.order_index) else { return };
        let Some(recipe) = world.get_recipes().get(id) else {
            warn!("baker #{} has an unknown order {id}", self.id);
            return;
        };

        self.pending = recipe.ingredients.iter()
            .rev()
            .filter_map(sample_stack)
            .collect();

        info!("baker #{} starts {id}", self.id);

    }

    /// Move to the next order once the current one is finished.
    fn next_order(&mut self, world: &World) {
        if !self.orders.is_empty() {
            self.order_index = (self.order_index + 1) % self.orders.len();
        }
        self.start_order(world);
    }

    /// Break the bowl and place a new one, its content drops in the world. This is used
    /// when the bowl holds ingredients that will never craft anything.
    fn replace_bowl(&mut self, world: &mut World) {
        warn!("baker #{} replaces its jammed bowl at {}", self.id, self.bowl);
        world.break_crafting_bowl(self.bowl);
        world.place_crafting_bowl(self.bowl);
        self.start_order(world);
    }

    /// Make this baker do a single action on its bowl, this should be called once
    /// before each world tick.
    pub fn act(&mut self, world: &mut World) {

        let Some((block::CRAFTING_BOWL, metadata)) = world.get_block(self.bowl) else { return };
        let Some(BlockEntity::CraftingBowl(bowl)) = world.get_block_entity(self.bowl) else { return };

        let has_result = !bowl.inv.stack(RESULT_SLOT).is_empty();
        let filled = bowl.filled_slots();

        if has_result {

            let mut hand = ItemStack::EMPTY;
            if !world.use_crafting_bowl(self.bowl, &mut hand) {
                return;
            }

            let added = self.inv.add_stack(hand);
            if added < hand.size {
                // Inventory is full, the rest falls on the floor.
                world.spawn_loot_in_block(self.bowl + IVec3::Y, hand.with_size(hand.size - added));
            }

            info!("baker #{} baked {}x {}", self.id, hand.size, item::name(hand.id));
            self.next_order(world);

        } else if let Some(stack) = self.pending.pop() {

            let mut hand = stack;
            if !world.use_crafting_bowl(self.bowl, &mut hand) {
                self.replace_bowl(world);
            }

        } else if filled != 0 {

            if !crafting_bowl::is_stirring(metadata) && crafting_bowl::get_stirred(metadata) == STIRS_NEEDED {
                self.replace_bowl(world);
            } else {
                let mut hand = ItemStack::EMPTY;
                world.use_crafting_bowl(self.bowl, &mut hand);
            }

        } else {
            self.start_order(world);
        }

    }

    /// Return the total number of items baked and kept by this baker.
    pub fn baked_count(&self) -> u32 {
        (0..self.inv.size())
            .map(|index| self.inv.stack(index).size as u32)
            .sum()
    }

}

/// Return a stack that satisfies the given ingredient.
fn sample_stack(ingredient: &Ingredient) -> Option<ItemStack> {
    match *ingredient {
        Ingredient::Item(id) => Some(ItemStack::new(id)),
        Ingredient::Stack(id, damage) => Some(ItemStack::new(id).with_damage(damage)),
        Ingredient::AnyOf(ref ids) => ids.first().copied().map(ItemStack::new),
    }
}
