use bitflags::bitflags;
use std::io::{Error, ErrorKind};

bitflags! {
    /// Gameplay modifiers, stored as the game client's bitmask. The numeric
    /// indices (bit positions) are the public API representation.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Modifiers: i32 {
        const ALL_STRUMS = 1 << 0;
        const ALL_HOPOS = 1 << 1;
        const ALL_TAPS = 1 << 2;
        const HOPOS_TO_TAPS = 1 << 3;
        const TAPS_TO_HOPOS = 1 << 4;
        const NOTE_SHUFFLE = 1 << 5;
        const NO_KICKS = 1 << 6;
        const UNPITCHED_ONLY = 1 << 7;
        const NO_DYNAMICS = 1 << 8;
        const NO_VOCAL_PERCUSSION = 1 << 9;
        const RANGE_COMPRESS = 1 << 10;
    }
}

impl Modifiers {
    /// Modifiers that keep a song at least as hard as charted. Leaderboards
    /// allow only these unless the caller widens the set.
    pub const fn default_allowed() -> Modifiers {
        Modifiers::ALL_STRUMS
            .union(Modifiers::TAPS_TO_HOPOS)
            .union(Modifiers::NOTE_SHUFFLE)
            .union(Modifiers::NO_DYNAMICS)
            .union(Modifiers::NO_VOCAL_PERCUSSION)
            .union(Modifiers::RANGE_COMPRESS)
    }

    pub fn from_index(index: i32) -> Option<Modifiers> {
        if (0..=10).contains(&index) {
            Modifiers::from_bits(1 << index)
        } else {
            None
        }
    }

    pub fn from_indices(indices: &[i32]) -> Result<Modifiers, Error> {
        let mut set = Modifiers::empty();
        for &index in indices {
            let modifier = Modifiers::from_index(index)
                .ok_or_else(|| Error::new(ErrorKind::InvalidData, "invalid modifier index"))?;
            set |= modifier;
        }
        Ok(set)
    }

    pub fn indices(&self) -> Vec<i32> {
        (0..=10).filter(|index| self.bits() >> index & 1 == 1).collect()
    }

    /// A score qualifies for a leaderboard only when every modifier it used
    /// lies inside the allowed set.
    pub fn is_subset_of(&self, allowed: Modifiers) -> bool {
        allowed.contains(*self)
    }
}

#[repr(i16)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Engine {
    #[default]
    Default = 0,
    Casual = 1,
    Precision = 2,
}

impl TryFrom<i16> for Engine {
    type Error = Error;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Engine::Default),
            1 => Ok(Engine::Casual),
            2 => Ok(Engine::Precision),
            _ => Err(Error::new(ErrorKind::InvalidData, "invalid engine")),
        }
    }
}

/// Stable game build scores are currently accepted from. Bumped on each
/// stable game release.
pub const GAME_VERSION: &str = "0.13.1";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_mapping_round_trips() {
        let set = Modifiers::from_indices(&[0, 4, 10]).unwrap();
        assert_eq!(set.indices(), vec![0, 4, 10]);
        assert!(Modifiers::from_indices(&[11]).is_err());
        assert!(Modifiers::from_indices(&[-1]).is_err());
    }

    #[test]
    fn subset_check_rejects_any_outside_modifier() {
        let allowed = Modifiers::default_allowed();
        assert!(Modifiers::empty().is_subset_of(allowed));
        assert!(Modifiers::ALL_STRUMS.is_subset_of(allowed));
        let used = Modifiers::ALL_STRUMS | Modifiers::NO_KICKS;
        assert!(!used.is_subset_of(allowed));
    }

    #[test]
    fn default_allowed_excludes_simplifiers() {
        let allowed = Modifiers::default_allowed();
        assert!(!allowed.contains(Modifiers::ALL_TAPS));
        assert!(!allowed.contains(Modifiers::HOPOS_TO_TAPS));
        assert!(!allowed.contains(Modifiers::NO_KICKS));
        assert!(!allowed.contains(Modifiers::UNPITCHED_ONLY));
    }
}
