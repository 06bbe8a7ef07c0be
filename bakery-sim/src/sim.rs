//! The simulation owning the world and its bakers, ticked at a fixed rate.

use std::io::{self, BufReader, BufWriter, Write};
use std::time::{Duration, Instant};
use std::path::Path;
use std::fs::File;
use std::sync::Arc;

use crossbeam_channel::{bounded, TryRecvError};

use glam::IVec3;

use tracing::{debug, info, trace, warn};

use bakery::world::{World, Event, BlockEvent, BlockEntityEvent, EntityEvent};
use bakery::serde::{self, SerdeError};
use bakery::recipe::RecipeRegistry;
use bakery::block;

use crate::baker::Baker;
use crate::config;


/// Target tick duration. Currently 20 TPS, so 50 ms/tick.
const TICK_DURATION: Duration = Duration::from_millis(50);
/// Number of bowls placed when none has been loaded.
const DEFAULT_BOWLS: i32 = 3;
/// Height of the floor where bowls are placed.
const FLOOR_Y: i32 = 63;


/// Run the whole simulation: load the saved bowls, tick until the configured number of 
/// ticks or Ctrl-C, and save the bowls back.
pub fn run() -> Result<(), SimError> {

    let (stop_tx, stop_rx) = bounded(1);
    ctrlc::set_handler(move || {
        // The channel may already be full if Ctrl-C is pressed many times.
        let _ = stop_tx.try_send(());
    })?;

    let path = config::save_path();
    let mut sim = Simulation::new(Arc::new(RecipeRegistry::bakery()));
    sim.load(path)?;

    let max_ticks = config::max_ticks();
    let fast = config::fast();
    info!("running {max_ticks} ticks (fast: {fast})");

    for _ in 0..max_ticks {

        match stop_rx.try_recv() {
            Ok(()) | Err(TryRecvError::Disconnected) => {
                info!("interrupted at tick {}", sim.world.get_time());
                break;
            }
            Err(TryRecvError::Empty) => {}
        }

        if fast {
            sim.tick();
        } else {
            sim.tick_padded();
        }

    }

    for baker in &sim.bakers {
        info!("bowl at {} produced {} items", baker.bowl(), baker.baked_count());
    }

    sim.save(path)

}


/// The simulation state.
pub struct Simulation {
    /// The world containing the bowls.
    world: World,
    /// One baker for each bowl.
    bakers: Vec<Baker>,
}

impl Simulation {

    pub fn new(recipes: Arc<RecipeRegistry>) -> Self {
        let mut world = World::new(recipes);
        world.swap_events(Some(Vec::new()));
        Self {
            world,
            bakers: Vec::new(),
        }
    }

    /// Load the bowls saved at the given path, if the file is missing then default 
    /// bowls are placed. A baker is assigned to each bowl.
    pub fn load(&mut self, path: &Path) -> Result<(), SimError> {

        let mut bowls = Vec::new();

        match File::open(path) {
            Ok(file) => {
                let block_entities = serde::read_block_entities(BufReader::new(file))?;
                info!("loaded {} bowls from {}", block_entities.len(), path.display());
                for (pos, block_entity) in block_entities {
                    self.world.set_block(pos - IVec3::Y, block::STONE, 0);
                    self.world.set_block(pos, block::CRAFTING_BOWL, 0);
                    self.world.set_block_entity(pos, block_entity);
                    bowls.push(pos);
                }
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!("no save at {}, placing {DEFAULT_BOWLS} new bowls", path.display());
                for i in 0..DEFAULT_BOWLS {
                    let pos = IVec3::new(i * 3, FLOOR_Y + 1, 0);
                    self.world.set_block(pos - IVec3::Y, block::STONE, 0);
                    if self.world.place_crafting_bowl(pos) {
                        bowls.push(pos);
                    }
                }
            }
            Err(e) => return Err(e.into()),
        }

        let orders = self.world.get_recipes().iter()
            .map(|(id, _)| id.clone())
            .collect::<Vec<_>>();

        for (i, pos) in bowls.into_iter().enumerate() {
            // Each baker starts at a different recipe.
            let mut baker_orders = orders.clone();
            if !baker_orders.is_empty() {
                let len = baker_orders.len();
                baker_orders.rotate_left(i % len);
            }
            self.bakers.push(Baker::new(i, pos, baker_orders));
        }

        // Initial placement is not worth logging as events.
        self.world.swap_events(Some(Vec::new()));
        Ok(())

    }

    /// Save all bowls to the given path.
    pub fn save(&self, path: &Path) -> Result<(), SimError> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde::write_block_entities(&mut writer, &self.world)?;
        writer.flush()?;
        info!("saved bowls to {}", path.display());
        Ok(())
    }

    /// Run a single tick and wait for it to approximately last for 50 ms (20 TPS), 
    /// there is no sleep if the tick was too long, in such case a warning is logged.
    pub fn tick_padded(&mut self) {

        let start = Instant::now();
        self.tick();
        let elapsed = start.elapsed();

        if let Some(missing) = TICK_DURATION.checked_sub(elapsed) {
            std::thread::sleep(missing);
        } else {
            warn!("tick too long {:?}, expected {:?}", elapsed, TICK_DURATION);
        }

    }

    /// Run a single tick: each baker acts on its bowl and then the world is ticked.
    pub fn tick(&mut self) {

        for baker in &mut self.bakers {
            baker.act(&mut self.world);
        }

        self.world.tick();

        let events = self.world.swap_events(Some(Vec::new())).unwrap_or_default();
        for event in events {
            match event {
                Event::Block { pos, inner: BlockEvent::Sound { .. } } =>
                    debug!("stirring sound at {pos}"),
                Event::Block { pos, inner: BlockEvent::Set { id, metadata, .. } } =>
                    trace!("block at {pos} set to {}/{metadata}", block::name(id)),
                Event::BlockEntity { pos, inner: BlockEntityEvent::Storage { index, stack } } =>
                    trace!("bowl at {pos} slot {index} now {stack:?}"),
                Event::BlockEntity { pos, inner } =>
                    trace!("block entity at {pos}: {inner:?}"),
                Event::Entity { id, inner: EntityEvent::Spawn } =>
                    trace!("entity #{id} spawned"),
                Event::Entity { id, inner: EntityEvent::Remove } =>
                    trace!("entity #{id} removed"),
            }
        }

    }

}


/// Errors that stop the simulation.
#[derive(thiserror::Error, Debug)]
pub enum SimError {
    #[error("io: {0}")]
    Io(#[from] io::Error),
    #[error("save: {0}")]
    Serde(#[from] SerdeError),
    #[error("signal handler: {0}")]
    Signal(#[from] ctrlc::Error),
}
