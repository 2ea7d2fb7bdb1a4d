use std::io::{Error, ErrorKind};

/// Instruments are reserved in blocks of ten per family; `Band` is the
/// whole-ensemble aggregate.
#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instrument {
    FiveFretGuitar = 0,
    FiveFretBass = 1,
    FiveFretRhythm = 2,
    FiveFretCoopGuitar = 3,
    Keys = 4,
    SixFretGuitar = 10,
    SixFretBass = 11,
    SixFretRhythm = 12,
    SixFretCoopGuitar = 13,
    FourLaneDrums = 20,
    ProDrums = 21,
    FiveLaneDrums = 22,
    EliteDrums = 23,
    ProGuitar17Fret = 30,
    ProGuitar22Fret = 31,
    ProBass17Fret = 32,
    ProBass22Fret = 33,
    ProKeys = 34,
    Vocals = 40,
    Harmony = 41,
    Band = 255,
}

impl TryFrom<i16> for Instrument {
    type Error = Error;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Instrument::FiveFretGuitar),
            1 => Ok(Instrument::FiveFretBass),
            2 => Ok(Instrument::FiveFretRhythm),
            3 => Ok(Instrument::FiveFretCoopGuitar),
            4 => Ok(Instrument::Keys),
            10 => Ok(Instrument::SixFretGuitar),
            11 => Ok(Instrument::SixFretBass),
            12 => Ok(Instrument::SixFretRhythm),
            13 => Ok(Instrument::SixFretCoopGuitar),
            20 => Ok(Instrument::FourLaneDrums),
            21 => Ok(Instrument::ProDrums),
            22 => Ok(Instrument::FiveLaneDrums),
            23 => Ok(Instrument::EliteDrums),
            30 => Ok(Instrument::ProGuitar17Fret),
            31 => Ok(Instrument::ProGuitar22Fret),
            32 => Ok(Instrument::ProBass17Fret),
            33 => Ok(Instrument::ProBass22Fret),
            34 => Ok(Instrument::ProKeys),
            40 => Ok(Instrument::Vocals),
            41 => Ok(Instrument::Harmony),
            255 => Ok(Instrument::Band),
            _ => Err(Error::new(ErrorKind::InvalidData, "invalid instrument")),
        }
    }
}

#[repr(i16)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Beginner = 0,
    Easy = 1,
    Medium = 2,
    Hard = 3,
    #[default]
    Expert = 4,
    ExpertPlus = 5,
}

impl TryFrom<i16> for Difficulty {
    type Error = Error;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Difficulty::Beginner),
            1 => Ok(Difficulty::Easy),
            2 => Ok(Difficulty::Medium),
            3 => Ok(Difficulty::Hard),
            4 => Ok(Difficulty::Expert),
            5 => Ok(Difficulty::ExpertPlus),
            _ => Err(Error::new(ErrorKind::InvalidData, "invalid difficulty")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instrument_codes_round_trip() {
        for code in [0, 4, 10, 20, 23, 34, 41, 255] {
            let instrument = Instrument::try_from(code).unwrap();
            assert_eq!(instrument as i16, code);
        }
        assert!(Instrument::try_from(5).is_err());
        assert!(Instrument::try_from(50).is_err());
    }

    #[test]
    fn default_difficulty_is_expert() {
        assert_eq!(Difficulty::default(), Difficulty::Expert);
        assert!(Difficulty::try_from(6).is_err());
    }
}
