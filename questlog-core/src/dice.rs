//! Dice for in-session rolls.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

/// An N-sided die, N >= 2
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Die {
    sides: u32,
}

impl Die {
    pub const D4: Die = Die { sides: 4 };
    pub const D6: Die = Die { sides: 6 };
    pub const D8: Die = Die { sides: 8 };
    pub const D10: Die = Die { sides: 10 };
    pub const D12: Die = Die { sides: 12 };
    pub const D20: Die = Die { sides: 20 };
    pub const D100: Die = Die { sides: 100 };

    /// The standard set offered as one-click rolls
    pub const STANDARD: [Die; 7] = [
        Die::D4,
        Die::D6,
        Die::D8,
        Die::D10,
        Die::D12,
        Die::D20,
        Die::D100,
    ];

    pub fn new(sides: u32) -> Option<Self> {
        (sides >= 2).then_some(Self { sides })
    }

    pub fn sides(&self) -> u32 {
        self.sides
    }
}

impl std::fmt::Display for Die {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "d{}", self.sides)
    }
}

impl std::str::FromStr for Die {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let sides = s
            .strip_prefix('d')
            .or_else(|| s.strip_prefix('D'))
            .and_then(|n| n.parse::<u32>().ok())
            .ok_or_else(|| format!("not a die: {}", s))?;
        Die::new(sides).ok_or_else(|| format!("a die needs at least 2 sides: {}", s))
    }
}

/// Source of die results
#[derive(Debug)]
pub struct DiceRoller {
    rng: StdRng,
}

impl DiceRoller {
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible rolls for a fixed seed
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Seeded when a seed is configured, random otherwise
    pub fn from_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }

    /// Roll once, uniformly in `1..=sides`
    pub fn roll(&mut self, die: Die) -> u32 {
        self.rng.gen_range(1..=die.sides)
    }
}
