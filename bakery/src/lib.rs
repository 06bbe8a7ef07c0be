//! Crafting bowl content for a voxel sandbox world: blocks, items, recipes and the 
//! stirring block entity, with a minimal world to run them and NBT persistence.

pub mod util;
pub mod io;

pub mod block;
pub mod item;
pub mod inventory;
pub mod recipe;
pub mod entity;
pub mod block_entity;

pub mod world;
pub mod serde;
