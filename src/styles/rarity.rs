use std::collections::BTreeMap;

use rand::{Rng, RngCore};

use crate::foundation::{
    core::Rgba8,
    error::{RaffleError, RaffleResult},
};

/// Cosmetic tier of a display item. Independent of winner selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

/// Relative weights, in the same order as [`Rarity::ALL`].
pub const RARITY_WEIGHTS: [f64; 5] = [79.92, 15.98, 3.2, 0.64, 0.26];

impl Rarity {
    pub const ALL: [Self; 5] = [
        Self::Common,
        Self::Uncommon,
        Self::Rare,
        Self::Epic,
        Self::Legendary,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Common => "common",
            Self::Uncommon => "uncommon",
            Self::Rare => "rare",
            Self::Epic => "epic",
            Self::Legendary => "legendary",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|r| r.name().eq_ignore_ascii_case(name.trim()))
    }
}

/// Pure rarity assignment, injectable so tests can pin tiers.
pub type RarityFn = fn(&mut dyn RngCore) -> Rarity;

/// Weighted draw from [`RARITY_WEIGHTS`].
pub fn assign_rarity(rng: &mut dyn RngCore) -> Rarity {
    let total: f64 = RARITY_WEIGHTS.iter().sum();
    let mut roll = rng.gen_range(0.0..total);
    for (rarity, weight) in Rarity::ALL.into_iter().zip(RARITY_WEIGHTS) {
        if roll < weight {
            return rarity;
        }
        roll -= weight;
    }
    Rarity::Common
}

/// Rarity to color table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RarityColors([Rgba8; 5]);

impl Default for RarityColors {
    fn default() -> Self {
        Self([
            Rgba8::rgb(0xb0, 0xc3, 0xd9),
            Rgba8::rgb(0x5e, 0x98, 0xd9),
            Rgba8::rgb(0x4b, 0x69, 0xff),
            Rgba8::rgb(0x88, 0x47, 0xff),
            Rgba8::rgb(0xeb, 0x4b, 0x4b),
        ])
    }
}

impl RarityColors {
    /// Defaults with `overrides` (keyed by rarity name) applied.
    pub fn with_overrides(overrides: &BTreeMap<String, Rgba8>) -> RaffleResult<Self> {
        let mut table = Self::default();
        for (name, color) in overrides {
            let rarity = Rarity::from_name(name)
                .ok_or_else(|| {
                    RaffleError::config(format!("unknown rarity '{name}' in rarityColors"))
                })?;
            table.0[rarity as usize] = *color;
        }
        Ok(table)
    }

    pub fn get(&self, rarity: Rarity) -> Rgba8 {
        self.0[rarity as usize]
    }
}
