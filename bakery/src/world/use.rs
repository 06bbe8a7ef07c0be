//! Block use in the world, the action of right clicking a block.

use glam::{IVec3, DVec3};

use tracing::debug;

use crate::block::crafting_bowl::{self, STIRS_NEEDED, MAX_STIRRING};
use crate::block_entity::BlockEntity;
use crate::item::{self, ItemStack};
use crate::block;

use super::{World, Event, BlockEvent};


/// Internal outcome of using a crafting bowl, computed while the block entity is 
/// borrowed and applied to the world afterward.
enum BowlUse {
    /// The result has been taken from the bowl, it has to be spawned if the hand was
    /// already holding something.
    TakeResult(Option<ItemStack>),
    /// One item of the held stack has been inserted, given its id.
    Insert(u16),
    /// Stirring has been started.
    Stir,
}

/// Methods related to block usage in the world.
impl World {

    /// Use a crafting bowl at the given position with the given held stack, the held
    /// stack may be modified. This returns true if the bowl has been used:
    /// 
    /// - If the result slot holds an item, it is taken into the hand if empty, or 
    ///   spawned on top of the bowl;
    /// - Else, if the hand holds an item, one is inserted if an ingredient slot is free;
    /// - Else, with an empty hand, stirring starts if the bowl has ingredients and is
    ///   not already stirring.
    /// 
    /// Taking the result or inserting an ingredient resets the stirring progress if it 
    /// reached its end, so that the bowl can craft again.
    pub fn use_crafting_bowl(&mut self, pos: IVec3, held: &mut ItemStack) -> bool {

        let Some((block::CRAFTING_BOWL, mut metadata)) = self.get_block(pos) else { return false };
        let Some(BlockEntity::CraftingBowl(bowl)) = self.get_block_entity_mut(pos) else { return false };

        let action = if let Some(result) = bowl.take_result() {
            if held.is_empty() {
                *held = result;
                BowlUse::TakeResult(None)
            } else {
                BowlUse::TakeResult(Some(result))
            }
        } else if !held.is_empty() {
            if !bowl.add_stack(*held) {
                return false;
            }
            let id = held.id;
            held.size -= 1;
            if held.size == 0 {
                *held = ItemStack::EMPTY;
            }
            BowlUse::Insert(id)
        } else if !crafting_bowl::is_stirring(metadata) && bowl.filled_slots() != 0 {
            BowlUse::Stir
        } else {
            return false;
        };

        match action {
            BowlUse::TakeResult(spawn) => {
                if let Some(stack) = spawn {
                    let above = (pos + IVec3::Y).as_dvec3() + DVec3::new(0.5, 0.0, 0.5);
                    self.spawn_loot(above, stack);
                }
                debug!("took result from crafting bowl at {pos}");
                if crafting_bowl::get_stirred(metadata) == STIRS_NEEDED {
                    crafting_bowl::set_stirred(&mut metadata, 0);
                }
            }
            BowlUse::Insert(id) => {
                debug!("inserted {} in crafting bowl at {pos}", item::name(id));
                if crafting_bowl::get_stirred(metadata) == STIRS_NEEDED {
                    crafting_bowl::set_stirred(&mut metadata, 0);
                }
            }
            BowlUse::Stir => {
                crafting_bowl::set_stirring(&mut metadata, MAX_STIRRING);
                self.push_event(Event::Block { 
                    pos, 
                    inner: BlockEvent::Sound { id: block::CRAFTING_BOWL, metadata },
                });
                debug!("started stirring crafting bowl at {pos}");
            }
        }

        self.set_block(pos, block::CRAFTING_BOWL, metadata);
        self.flush_block_entity_changes(pos);
        true

    }

}


#[cfg(test)]
mod tests {

    use std::sync::Arc;

    use crate::block_entity::crafting_bowl::{StirState, RESULT_SLOT};
    use crate::inventory::Container;
    use crate::recipe::RecipeRegistry;
    use crate::entity::Entity;
    use crate::util::JavaRandom;
    use crate::item::*;

    use super::*;

    const POS: IVec3 = IVec3::new(0, 64, 0);

    fn new_world() -> World {
        let mut world = World::with_rand(Arc::new(RecipeRegistry::bakery()), JavaRandom::new(0));
        assert!(world.place_crafting_bowl(POS));
        world.swap_events(Some(Vec::new()));
        world
    }

    fn state(world: &World) -> StirState {
        let (id, metadata) = world.get_block(POS).unwrap();
        assert_eq!(id, block::CRAFTING_BOWL);
        StirState::from_metadata(metadata)
    }

    fn set_state(world: &mut World, state: StirState) {
        let mut metadata = 0;
        state.write_metadata(&mut metadata);
        world.set_block(POS, block::CRAFTING_BOWL, metadata);
    }

    fn bowl(world: &mut World) -> &mut crate::block_entity::crafting_bowl::CraftingBowlBlockEntity {
        match world.get_block_entity_mut(POS) {
            Some(BlockEntity::CraftingBowl(bowl)) => bowl,
            None => panic!("no crafting bowl"),
        }
    }

    #[test]
    fn insert_one_by_one() {

        let mut world = new_world();
        let mut held = ItemStack::new(FLOUR).with_size(5);

        for i in 0..4 {
            assert!(world.use_crafting_bowl(POS, &mut held));
            assert_eq!(held.size, 4 - i);
        }

        assert!(!world.use_crafting_bowl(POS, &mut held));
        assert_eq!(held, ItemStack::new(FLOUR));
        assert_eq!(bowl(&mut world).filled_slots(), 4);

        let events = world.swap_events(None).unwrap();
        let storage = events.iter()
            .filter(|e| matches!(e, Event::BlockEntity { .. }))
            .count();
        assert_eq!(storage, 4);

    }

    #[test]
    fn insert_last_item_empties_hand() {
        let mut world = new_world();
        let mut held = ItemStack::new(EGG);
        assert!(world.use_crafting_bowl(POS, &mut held));
        assert_eq!(held, ItemStack::EMPTY);
    }

    #[test]
    fn stir_needs_ingredients() {

        let mut world = new_world();
        let mut held = ItemStack::EMPTY;
        assert!(!world.use_crafting_bowl(POS, &mut held));

        bowl(&mut world).inv.set_stack(2, ItemStack::new(SUGAR));
        world.swap_events(Some(Vec::new()));

        assert!(world.use_crafting_bowl(POS, &mut held));
        assert_eq!(state(&world), StirState { stirring: MAX_STIRRING, stirred: 0 });

        // Already stirring.
        assert!(!world.use_crafting_bowl(POS, &mut held));

        let events = world.swap_events(None).unwrap();
        assert!(events.iter().any(|e| matches!(e, Event::Block { inner: BlockEvent::Sound { .. }, .. })));

    }

    #[test]
    fn take_result_resets_progress() {

        let mut world = new_world();
        set_state(&mut world, StirState { stirring: 0, stirred: STIRS_NEEDED });
        bowl(&mut world).inv.set_stack(RESULT_SLOT, ItemStack::new(DOUGH));

        let mut held = ItemStack::EMPTY;
        assert!(world.use_crafting_bowl(POS, &mut held));
        assert_eq!(held, ItemStack::new(DOUGH));
        assert_eq!(state(&world), StirState::default());
        assert!(bowl(&mut world).inv.stack(RESULT_SLOT).is_empty());

    }

    #[test]
    fn take_result_with_full_hand() {

        let mut world = new_world();
        bowl(&mut world).inv.set_stack(RESULT_SLOT, ItemStack::new(CRUST));

        let mut held = ItemStack::new(APPLE);
        assert!(world.use_crafting_bowl(POS, &mut held));
        assert_eq!(held, ItemStack::new(APPLE));
        assert_eq!(bowl(&mut world).filled_slots(), 0);

        let (_, Entity::Item(entity)) = world.iter_entities().next().unwrap();
        assert_eq!(entity.stack, ItemStack::new(CRUST));
        assert_eq!(entity.pos, DVec3::new(0.5, 65.0, 0.5));

    }

    #[test]
    fn insert_resets_saturated_progress() {

        let mut world = new_world();
        set_state(&mut world, StirState { stirring: 3, stirred: STIRS_NEEDED });

        let mut held = ItemStack::new(SUGAR);
        assert!(world.use_crafting_bowl(POS, &mut held));
        assert_eq!(state(&world), StirState { stirring: 3, stirred: 0 });

    }

    #[test]
    fn not_a_bowl() {
        let mut world = new_world();
        let mut held = ItemStack::new(SUGAR);
        assert!(!world.use_crafting_bowl(POS + IVec3::X, &mut held));
        assert_eq!(held, ItemStack::new(SUGAR));
    }

    #[test]
    fn stir_to_completion() {

        let mut world = new_world();
        for id in [FLOUR, WATER_BUCKET, FLOUR] {
            let mut held = ItemStack::new(id);
            assert!(world.use_crafting_bowl(POS, &mut held));
        }

        // Keep stirring each time the bowl stops, before progress decays.
        let mut empty = ItemStack::EMPTY;
        for _ in 0..STIRS_NEEDED {
            world.use_crafting_bowl(POS, &mut empty);
            world.tick();
        }

        assert_eq!(state(&world).stirred, STIRS_NEEDED);
        assert_eq!(bowl(&mut world).inv.stack(RESULT_SLOT), ItemStack::new(DOUGH));
        assert_eq!(bowl(&mut world).filled_slots(), 0);
        assert_eq!(world.get_entity_count(), 1);

        // Stopping after completion keeps the progress until the result is taken.
        for _ in 0..20 {
            world.tick();
        }
        assert_eq!(state(&world), StirState { stirring: 0, stirred: STIRS_NEEDED });

        assert!(world.use_crafting_bowl(POS, &mut empty));
        assert_eq!(empty, ItemStack::new(DOUGH));
        assert_eq!(state(&world), StirState::default());

    }

    #[test]
    fn interrupted_stirring_decays() {

        let mut world = new_world();
        let mut held = ItemStack::new(FLOUR);
        world.use_crafting_bowl(POS, &mut held);

        let mut empty = ItemStack::EMPTY;
        assert!(world.use_crafting_bowl(POS, &mut empty));
        for _ in 0..MAX_STIRRING {
            world.tick();
        }
        assert_eq!(state(&world), StirState { stirring: 0, stirred: MAX_STIRRING });

        world.tick();
        assert_eq!(state(&world), StirState::default());

    }

}
