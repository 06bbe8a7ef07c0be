//! Block enumeration and functions to query their metadata state.

// Block specific functions for their metadata.
pub mod crafting_bowl;


/// Internal macro to easily define blocks registry.
macro_rules! blocks {
    (
        $($ident:ident / $id:literal : $name:literal),* $(,)?
    ) => {

        static NAMES: [&'static str; 256] = {
            let mut arr = [""; 256];
            $(arr[$id as usize] = $name;)*
            arr
        };

        $(pub const $ident: u8 = $id;)*

    };
}

blocks! {
    AIR/0:              "air",
    STONE/1:            "stone",
    GRASS/2:            "grass",
    DIRT/3:             "dirt",
    COBBLESTONE/4:      "cobblestone",
    WOOD/5:             "wood",
    CRAFTING_TABLE/58:  "crafting_table",
    CRAFTING_BOWL/200:  "crafting_bowl",
}

/// Find a block name from its id.
#[inline]
pub const fn name(id: u8) -> &'static str {
    NAMES[id as usize]
}
