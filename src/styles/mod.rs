//! The six visual strategies and the layout helpers they share.

pub(crate) mod card_flip;
pub(crate) mod case_opening;
pub(crate) mod common;
pub(crate) mod layout;
pub(crate) mod particle_explosion;
pub(crate) mod rarity;
pub(crate) mod slot_machine;
pub(crate) mod wheel;
pub(crate) mod zoom_fade;

#[cfg(test)]
#[path = "../../tests/unit/styles/support.rs"]
pub(crate) mod support;
