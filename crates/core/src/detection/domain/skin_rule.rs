/// Fixed RGB skin test, no colour-space calibration.
///
/// Red dominates, each channel clears a floor, and red leads green by more
/// than 15.
#[inline]
pub fn is_skin([r, g, b]: [u8; 3]) -> bool {
    r > 95 && g > 40 && b > 20 && r > g && r > b && r as i16 - g as i16 > 15
}
