//! Item enumeration and item stacks.

use crate::block;


/// Internal macro to easily define items registry.
macro_rules! items {
    (
        $($name:ident / $id:literal : $init:expr),* $(,)?
    ) => {

        static ITEMS: [Item; 256] = {
            let mut arr = [Item::new("undefined"); 256];
            $(arr[$id as usize] = $init;)*
            arr
        };

        $(pub const $name: u16 = $id + 256;)*

    };
}

items! {
    BUCKET/69:          Item::new("bucket").with_max_stack_size(16),
    WATER_BUCKET/70:    Item::new("water_bucket").with_max_stack_size(1).with_remainder(BUCKET),
    MILK_BUCKET/79:     Item::new("milk_bucket").with_max_stack_size(1).with_remainder(BUCKET),
    EGG/88:             Item::new("egg").with_max_stack_size(16),
    SUGAR/97:           Item::new("sugar"),
    APPLE/4:            Item::new("apple"),
    FLOUR/128:          Item::new("flour"),
    BUTTER/130:         Item::new("butter"),
    CHOCOLATE/131:      Item::new("chocolate"),
    STRAWBERRY/132:     Item::new("strawberry"),
    JAR/133:            Item::new("jar"),
    STRAWBERRY_JAM/134: Item::new("strawberry_jam").with_max_stack_size(16).with_remainder(JAR),
    DOUGH/135:          Item::new("dough"),
    SWEET_DOUGH/136:    Item::new("sweet_dough"),
    CAKE_DOUGH/137:     Item::new("cake_dough"),
    CRUST/138:          Item::new("crust"),
    CHOCOLATE_DOUGH/139: Item::new("chocolate_dough"),
}

/// Descriptor used for every item derived from a block.
static BLOCK_ITEM: Item = Item::new("block");


/// Get an item from its numeric id.
pub fn from_id(id: u16) -> &'static Item {
    if id < 256 {
        &BLOCK_ITEM
    } else {
        &ITEMS[((id - 256) & 0xFF) as usize]
    }
}

/// Get the name of an item or block from its numeric id, used for debug purpose.
pub fn name(id: u16) -> &'static str {
    if id < 256 {
        block::name(id as u8)
    } else {
        from_id(id).name
    }
}


/// This structure describe an item.
#[derive(Debug, Clone, Copy)]
pub struct Item {
    /// The name of the item, used for debug purpose.
    pub name: &'static str,
    /// Maximum stack size for this item.
    pub max_stack_size: u16,
    /// Item left behind when this item is consumed by a recipe, such as the bucket of 
    /// a water bucket.
    pub remainder: Option<u16>,
}

impl Item {

    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            max_stack_size: 64,
            remainder: None,
        }
    }

    const fn with_max_stack_size(mut self, max_stack_size: u16) -> Self {
        self.max_stack_size = max_stack_size;
        self
    }

    const fn with_remainder(mut self, remainder: u16) -> Self {
        self.remainder = Some(remainder);
        self
    }

}


/// An item stack defines the actual number of items and their damage value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ItemStack {
    /// The item id.
    pub id: u16,
    /// The stack size.
    pub size: u16,
    /// The damage value of the stack.
    pub damage: u16,
}

impl ItemStack {

    pub const EMPTY: Self = Self { id: block::AIR as u16, size: 0, damage: 0 };

    /// Create a new item stack of a single item with no damage.
    pub const fn new(id: u16) -> Self {
        Self { id, size: 1, damage: 0 }
    }

    pub fn with_size(mut self, size: u16) -> ItemStack {
        self.size = size;
        self
    }

    pub fn with_damage(mut self, damage: u16) -> ItemStack {
        self.damage = damage;
        self
    }

    /// Return true if this item stack is air, which is a special case where the item 
    /// stack represent an empty slot.
    pub fn is_empty(self) -> bool {
        self.id == block::AIR as u16 || self.size == 0
    }

    /// Simplify this item stack by converting it into `None` if the item is just a air
    /// block, which is equivalent to no item, regardless of the damage value or size.
    pub fn to_non_empty(self) -> Option<ItemStack> {
        if self.is_empty() {
            None
        } else {
            Some(self)
        }
    }

    /// Get the item left behind when one item of this stack is consumed by a recipe.
    pub fn remainder(self) -> Option<ItemStack> {
        if self.is_empty() {
            return None;
        }
        from_id(self.id).remainder.map(ItemStack::new)
    }

}
