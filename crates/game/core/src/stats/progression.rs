/// Base attack bonus progression of a class.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum BabProgression {
    /// +1 per level
    Good,
    /// +3 per 4 levels
    #[default]
    Average,
    /// +1 per 2 levels
    Poor,
}

impl BabProgression {
    pub fn base_attack(self, levels: i32) -> i32 {
        match self {
            Self::Good => levels,
            Self::Average => levels * 3 / 4,
            Self::Poor => levels / 2,
        }
    }
}

/// Base saving throw progression of a class.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum SaveProgression {
    /// 2 + level / 2
    Good,
    /// level / 3
    #[default]
    Poor,
}

impl SaveProgression {
    pub fn base_save(self, levels: i32) -> i32 {
        match self {
            Self::Good => 2 + levels / 2,
            Self::Poor => levels / 3,
        }
    }
}
