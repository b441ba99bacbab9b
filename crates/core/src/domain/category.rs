use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::predicate::PredicateParseError;

/// One of the six preference dimensions a recommendation is constrained by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Pov,
    Genre,
    Setting,
    Platform,
    NumPlayers,
    Price,
}

impl Category {
    /// Schema order. The dialogue visits categories in exactly this order.
    pub const ALL: [Category; 6] = [
        Category::Pov,
        Category::Genre,
        Category::Setting,
        Category::Platform,
        Category::NumPlayers,
        Category::Price,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pov => "pov",
            Self::Genre => "genre",
            Self::Setting => "setting",
            Self::Platform => "platform",
            Self::NumPlayers => "num_players",
            Self::Price => "price",
        }
    }

    /// Closed value set accepted for this category.
    pub fn domain(&self) -> &'static [&'static str] {
        match self {
            Self::Pov => &["firstperson", "thirdperson", "birdview"],
            Self::Genre => {
                &["soulslike", "shooter", "roguelike", "mmo", "fighting", "jrpg", "moba"]
            }
            Self::Setting => {
                &["fantasy", "warzone", "horror", "post-apocalyptic", "futuristic", "historical"]
            }
            Self::Platform => &["xbox", "playstation", "pc", "switch", "mobile"],
            Self::NumPlayers => &["singleplayer", "multiplayer"],
            Self::Price => &["cheap", "expensive"],
        }
    }

    pub fn accepts(&self, value: &str) -> bool {
        self.domain().contains(&value)
    }

    /// Short hint on what a value means, used when describing the vocabulary to the
    /// text service.
    pub fn value_hint(&self, value: &str) -> Option<&'static str> {
        match (self, value) {
            (Self::Price, "cheap") => Some("less than $50 / not AAA"),
            (Self::Price, "expensive") => Some("$50-$70"),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = PredicateParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == value)
            .ok_or_else(|| PredicateParseError::UnknownCategory { name: value.to_string() })
    }
}
