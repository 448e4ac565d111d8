//! Upgrades bought with accumulated points

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::player::Player;

/// Bananas granted per purchase
pub const BANANAS_PER_PURCHASE: u32 = 3;
pub const SPEED_BOOST: f32 = 2.0;
/// Added to the (negative) jump power
pub const JUMP_BOOST: f32 = -3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShopItem {
    Banana,
    ExtraLife,
    SpeedBoost,
    JumpBoost,
    Shield,
}

impl ShopItem {
    pub const ALL: [ShopItem; 5] = [
        ShopItem::Banana,
        ShopItem::ExtraLife,
        ShopItem::SpeedBoost,
        ShopItem::JumpBoost,
        ShopItem::Shield,
    ];

    /// Cost in points
    pub fn price(self) -> u64 {
        match self {
            ShopItem::Banana => 50,
            ShopItem::ExtraLife => 100,
            ShopItem::SpeedBoost => 75,
            ShopItem::JumpBoost => 60,
            ShopItem::Shield => 80,
        }
    }

    /// Display name for menus and logs
    pub fn name(self) -> &'static str {
        match self {
            ShopItem::Banana => "Explosive Banana x3",
            ShopItem::ExtraLife => "Extra Life",
            ShopItem::SpeedBoost => "Speed Boost",
            ShopItem::JumpBoost => "Jump Boost",
            ShopItem::Shield => "Shield",
        }
    }
}

/// Why a purchase was refused
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShopError {
    #[error("not enough points: costs {price}, have {available}")]
    InsufficientPoints { price: u64, available: u64 },
}

/// Check if the player has enough points for `item`
pub fn can_buy(item: ShopItem, player: &Player) -> bool {
    player.total_points >= item.price()
}

/// Pay from `total_points` and apply the item. `score` is left alone.
pub fn buy(item: ShopItem, player: &mut Player) -> Result<(), ShopError> {
    let price = item.price();
    if !can_buy(item, player) {
        return Err(ShopError::InsufficientPoints {
            price,
            available: player.total_points,
        });
    }
    player.total_points -= price;

    match item {
        ShopItem::Banana => player.bananas += BANANAS_PER_PURCHASE,
        ShopItem::ExtraLife => player.lives += 1,
        ShopItem::SpeedBoost => player.speed += SPEED_BOOST,
        ShopItem::JumpBoost => player.jump_power += JUMP_BOOST,
        ShopItem::Shield => player.shield = true,
    }
    log::info!("Bought {} for {} points", item.name(), price);
    Ok(())
}
