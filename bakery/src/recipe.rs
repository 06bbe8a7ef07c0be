//! Crafting bowl recipes and their registry.

use arcstr::{ArcStr, literal};
use indexmap::IndexMap;

use tracing::warn;

use crate::block_entity::crafting_bowl::INGREDIENT_SLOTS;
use crate::inventory::Container;
use crate::item::{self, ItemStack};


/// A predicate over an item stack, an empty stack never matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ingredient {
    /// Any stack of the given item, regardless of its damage value.
    Item(u16),
    /// A stack of the given item with the exact damage value.
    Stack(u16, u16),
    /// A stack of any of the given items.
    AnyOf(Vec<u16>),
}

impl Ingredient {

    /// Test if the given stack satisfies this ingredient.
    pub fn test(&self, stack: ItemStack) -> bool {
        if stack.is_empty() {
            return false;
        }
        match *self {
            Ingredient::Item(id) => stack.id == id,
            Ingredient::Stack(id, damage) => (stack.id, stack.damage) == (id, damage),
            Ingredient::AnyOf(ref ids) => ids.contains(&stack.id),
        }
    }

}


/// A crafting bowl recipe: every ingredient must be present in a distinct ingredient 
/// slot, with no other item, and the result replaces the result slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BowlRecipe {
    /// Ordered ingredients, consumed in this order.
    pub ingredients: Vec<Ingredient>,
    /// The stack produced by this recipe.
    pub result: ItemStack,
}

impl BowlRecipe {

    pub fn new(ingredients: impl Into<Vec<Ingredient>>, result: ItemStack) -> Self {
        Self { ingredients: ingredients.into(), result }
    }

    /// Check if this recipe can be crafted with the ingredient slots of the container.
    pub fn matches(&self, container: &impl Container) -> bool {

        let slots = INGREDIENT_SLOTS.end.min(container.size());

        let filled = (0..slots)
            .filter(|&index| !container.stack(index).is_empty())
            .count();

        if filled != self.ingredients.len() {
            return false;
        }

        // We use a single integer to mark slots that have been claimed.
        let mut matched = 0u8;

        'ing: for ingredient in &self.ingredients {
            for index in 0..slots {
                if matched & (1 << index) == 0 && ingredient.test(container.stack(index)) {
                    matched |= 1 << index;
                    continue 'ing;
                }
            }
            // If we land here, we did not found the required item.
            return false;
        }

        true

    }

}


/// Registry of crafting bowl recipes, keyed by identifier and ordered by registration.
/// It is built once when the world is created and then only read.
#[derive(Debug, Clone, Default)]
pub struct RecipeRegistry {
    recipes: IndexMap<ArcStr, BowlRecipe>,
}

impl RecipeRegistry {

    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the registry with the default bakery recipes.
    pub fn bakery() -> Self {

        use Ingredient::{Item, AnyOf};

        let mut reg = Self::new();

        reg.register(literal!("bakery:dough"), BowlRecipe::new(
            [Item(item::WATER_BUCKET), Item(item::FLOUR), Item(item::FLOUR)],
            ItemStack::new(item::DOUGH).with_size(3)));

        reg.register(literal!("bakery:sweet_dough"), BowlRecipe::new(
            [Item(item::DOUGH), Item(item::SUGAR), Item(item::EGG)],
            ItemStack::new(item::SWEET_DOUGH).with_size(2)));

        reg.register(literal!("bakery:cake_dough"), BowlRecipe::new(
            [Item(item::MILK_BUCKET), Item(item::SUGAR), Item(item::EGG), Item(item::FLOUR)],
            ItemStack::new(item::CAKE_DOUGH)));

        reg.register(literal!("bakery:crust"), BowlRecipe::new(
            [Item(item::FLOUR), AnyOf(vec![item::BUTTER, item::WATER_BUCKET, item::MILK_BUCKET])],
            ItemStack::new(item::CRUST).with_size(2)));

        reg.register(literal!("bakery:chocolate_dough"), BowlRecipe::new(
            [Item(item::SWEET_DOUGH), Item(item::CHOCOLATE)],
            ItemStack::new(item::CHOCOLATE_DOUGH)));

        reg.register(literal!("bakery:strawberry_jam"), BowlRecipe::new(
            [Item(item::JAR), Item(item::STRAWBERRY), Item(item::STRAWBERRY), Item(item::SUGAR)],
            ItemStack::new(item::STRAWBERRY_JAM)));

        reg

    }

    /// Register a recipe with the given identifier, a recipe previously registered with
    /// the same identifier is replaced and returned.
    pub fn register(&mut self, id: impl Into<ArcStr>, recipe: BowlRecipe) -> Option<BowlRecipe> {
        let id = id.into();
        let prev = self.recipes.insert(id.clone(), recipe);
        if prev.is_some() {
            warn!("recipe {id} registered twice, previous one replaced");
        }
        prev
    }

    /// Get a recipe from its identifier.
    pub fn get(&self, id: &str) -> Option<&BowlRecipe> {
        self.recipes.get(id)
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// Iterate over all recipes in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&ArcStr, &BowlRecipe)> + '_ {
        self.recipes.iter()
    }

    /// Find the first registered recipe that matches the given container.
    pub fn find(&self, container: &impl Container) -> Option<(&ArcStr, &BowlRecipe)> {
        self.recipes.iter().find(|(_, recipe)| recipe.matches(container))
    }

}


#[cfg(test)]
mod tests {

    use super::*;
    use crate::inventory::Inventory;
    use crate::item::*;

    fn inv(stacks: &[ItemStack]) -> Inventory {
        let mut inv = Inventory::new(5);
        for (index, &stack) in stacks.iter().enumerate() {
            inv.set_stack(index, stack);
        }
        inv
    }

    #[test]
    fn ingredient_test() {
        assert!(Ingredient::Item(FLOUR).test(ItemStack::new(FLOUR).with_damage(3)));
        assert!(!Ingredient::Stack(FLOUR, 1).test(ItemStack::new(FLOUR)));
        assert!(Ingredient::Stack(FLOUR, 1).test(ItemStack::new(FLOUR).with_damage(1)));
        assert!(Ingredient::AnyOf(vec![BUTTER, SUGAR]).test(ItemStack::new(SUGAR)));
        assert!(!Ingredient::Item(FLOUR).test(ItemStack::new(FLOUR).with_size(0)));
    }

    #[test]
    fn shapeless_any_order() {
        let reg = RecipeRegistry::bakery();
        let inv = inv(&[ItemStack::new(FLOUR), ItemStack::EMPTY, ItemStack::new(WATER_BUCKET), ItemStack::new(FLOUR)]);
        let (id, recipe) = reg.find(&inv).unwrap();
        assert_eq!(id.as_str(), "bakery:dough");
        assert_eq!(recipe.result, ItemStack::new(DOUGH).with_size(3));
    }

    #[test]
    fn extra_items_reject() {
        let reg = RecipeRegistry::bakery();
        let inv = inv(&[ItemStack::new(FLOUR), ItemStack::new(FLOUR), ItemStack::new(WATER_BUCKET), ItemStack::new(APPLE)]);
        assert!(reg.find(&inv).is_none());
    }

    #[test]
    fn exact_items() {
        let reg = RecipeRegistry::bakery();
        let inv = inv(&[ItemStack::new(FLOUR), ItemStack::new(WATER_BUCKET), ItemStack::new(FLOUR)]);
        assert_eq!(reg.find(&inv).map(|(id, _)| id.as_str()), Some("bakery:dough"));
        let inv = self::inv(&[ItemStack::new(FLOUR), ItemStack::new(WATER_BUCKET), ItemStack::new(SUGAR)]);
        assert!(reg.find(&inv).is_none());
    }

    #[test]
    fn result_slot_ignored() {
        let reg = RecipeRegistry::bakery();
        let inv = inv(&[ItemStack::new(FLOUR), ItemStack::new(BUTTER), ItemStack::EMPTY, ItemStack::EMPTY, ItemStack::new(APPLE)]);
        assert_eq!(reg.find(&inv).map(|(id, _)| id.as_str()), Some("bakery:crust"));
    }

    #[test]
    fn registration_order() {

        let mut reg = RecipeRegistry::new();
        assert!(reg.is_empty());

        reg.register("test:first", BowlRecipe::new([Ingredient::Item(APPLE)], ItemStack::new(SUGAR)));
        reg.register("test:second", BowlRecipe::new([Ingredient::AnyOf(vec![APPLE])], ItemStack::new(FLOUR)));

        let inv = inv(&[ItemStack::new(APPLE)]);
        assert_eq!(reg.find(&inv).map(|(id, _)| id.as_str()), Some("test:first"));

        let prev = reg.register("test:first", BowlRecipe::new([Ingredient::Item(EGG)], ItemStack::new(SUGAR)));
        assert!(prev.is_some());
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.find(&inv).map(|(id, _)| id.as_str()), Some("test:second"));
        assert_eq!(reg.iter().map(|(id, _)| id.as_str()).collect::<Vec<_>>(), ["test:first", "test:second"]);
        assert_eq!(reg.get("test:first").unwrap().ingredients, [Ingredient::Item(EGG)]);

    }

}
