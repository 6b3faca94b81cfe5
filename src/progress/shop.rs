use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Progress, ProgressError};

/// Cosmetic snake colors sold for coins
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Skin {
    #[default]
    Neon,
    Emerald,
    Sunset,
}

impl Skin {
    pub const ALL: [Skin; 3] = [Skin::Neon, Skin::Emerald, Skin::Sunset];

    pub fn price(&self) -> u32 {
        match self {
            Skin::Neon => 0,
            Skin::Emerald | Skin::Sunset => 100,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "neon" => Some(Skin::Neon),
            "emerald" => Some(Skin::Emerald),
            "sunset" => Some(Skin::Sunset),
            _ => None,
        }
    }
}

impl fmt::Display for Skin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Skin::Neon => "neon",
            Skin::Emerald => "emerald",
            Skin::Sunset => "sunset",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseOutcome {
    /// Coins were spent and the skin equipped
    Purchased { price: u32 },
    /// Already owned; just equipped
    Equipped,
}

impl Progress {
    pub fn owns_skin(&self, skin: Skin) -> bool {
        skin == Skin::Neon || self.owned_skins.contains(&skin)
    }

    /// Buy `skin` if needed, then equip it
    pub fn purchase_skin(&mut self, skin: Skin) -> Result<PurchaseOutcome, ProgressError> {
        if self.owns_skin(skin) {
            self.equipped_skin = skin;
            return Ok(PurchaseOutcome::Equipped);
        }

        let price = skin.price();
        if self.coins < price {
            return Err(ProgressError::InsufficientCoins {
                skin,
                price,
                balance: self.coins,
            });
        }

        self.coins -= price;
        self.owned_skins.insert(skin);
        self.equipped_skin = skin;
        Ok(PurchaseOutcome::Purchased { price })
    }

    pub fn equip_skin(&mut self, skin: Skin) -> Result<(), ProgressError> {
        if !self.owns_skin(skin) {
            return Err(ProgressError::SkinNotOwned(skin));
        }
        self.equipped_skin = skin;
        Ok(())
    }
}
