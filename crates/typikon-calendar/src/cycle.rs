//! Derived weekly cycles: tone of the week, eothinon gospel, fast week
//!
//! All three are pure functions of anchor offsets. The tone needs the
//! previous year's anchor for dates before Thomas Sunday, which is why it is
//! computed by [`ContextBuilder`](crate::ContextBuilder) rather than here.

use crate::season::GREAT_FAST_START;

/// Number of tones in the octoechos
pub const TONES: i64 = 8;

/// Number of resurrectional (eothinon) gospels
pub const EOTHINA: i64 = 11;

/// Offset of Thomas Sunday, where the tone cycle restarts at tone 1
pub const THOMAS_SUNDAY: i64 = 7;

/// Offset of the Sunday of All Saints, where the eothinon cycle starts
pub const ALL_SAINTS: i64 = 56;

/// Daily tones of Bright Week, indexed by offset 0..=6
///
/// Tone 7 is skipped: Saturday takes tone 8.
const BRIGHT_WEEK_TONES: [u8; 7] = [1, 2, 3, 4, 5, 6, 8];

/// Tone of a day inside Bright Week (offsets 0..=6)
#[inline]
#[must_use]
pub fn bright_week_tone(offset: i64) -> Option<u8> {
    usize::try_from(offset)
        .ok()
        .and_then(|index| BRIGHT_WEEK_TONES.get(index).copied())
}

/// Tone counted in whole weeks from a Thomas Sunday
///
/// `days_since_thomas_sunday` must be non-negative for the result to follow
/// the cycle; negative inputs wrap like the cycle would backwards.
#[must_use]
pub fn weekly_tone(days_since_thomas_sunday: i64) -> u8 {
    let week = days_since_thomas_sunday.div_euclid(7);
    // rem_euclid(8) + 1 is always 1..=8
    u8::try_from(week.rem_euclid(TONES) + 1).unwrap_or(1)
}

/// Eothinon gospel number (1..=11) for an anchor offset
///
/// The cycle begins with gospel 1 on the Sunday of All Saints and advances
/// weekly; offsets before that wrap with floor semantics.
#[must_use]
pub fn eothinon(offset: i64) -> u8 {
    let week = (offset - ALL_SAINTS).div_euclid(7);
    u8::try_from(week.rem_euclid(EOTHINA) + 1).unwrap_or(1)
}

/// Week of the Great Fast (1..=7), counted from Clean Monday
#[must_use]
pub fn lenten_week(offset: i64) -> Option<u8> {
    if (GREAT_FAST_START..0).contains(&offset) {
        u8::try_from((offset - GREAT_FAST_START) / 7 + 1).ok()
    } else {
        None
    }
}
