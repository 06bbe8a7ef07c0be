//! Crafting bowl metadata functions.
//! 
//! The bowl stores its stirring state in its metadata rather than in the block 
//! entity: the low 4 bits are the remaining stirring ticks, the next 7 bits are the
//! stirring progress.

/// Progress required before the bowl crafts its recipe.
pub const STIRS_NEEDED: u8 = 100;
/// Stirring ticks given to the bowl when a player starts stirring.
pub const MAX_STIRRING: u8 = 10;

const STIRRING_MASK: u16 = 0b1111;
const STIRRED_SHIFT: u16 = 4;
const STIRRED_MASK: u16 = 0b111_1111 << STIRRED_SHIFT;


/// Get the remaining stirring ticks of the bowl.
#[inline]
pub fn get_stirring(metadata: u16) -> u8 {
    (metadata & STIRRING_MASK) as u8
}

/// Set the remaining stirring ticks of the bowl, clamped to 15.
#[inline]
pub fn set_stirring(metadata: &mut u16, stirring: u8) {
    *metadata &= !STIRRING_MASK;
    *metadata |= stirring.min(15) as u16;
}

/// Get the stirring progress of the bowl.
#[inline]
pub fn get_stirred(metadata: u16) -> u8 {
    ((metadata & STIRRED_MASK) >> STIRRED_SHIFT) as u8
}

/// Set the stirring progress of the bowl, clamped to [`STIRS_NEEDED`].
#[inline]
pub fn set_stirred(metadata: &mut u16, stirred: u8) {
    *metadata &= !STIRRED_MASK;
    *metadata |= (stirred.min(STIRS_NEEDED) as u16) << STIRRED_SHIFT;
}

/// Return true if the bowl is currently being stirred.
#[inline]
pub fn is_stirring(metadata: u16) -> bool {
    get_stirring(metadata) != 0
}
