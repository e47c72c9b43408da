//! Small arithmetic helpers for scan-time counters.
//!
//! Counters shown to operators clamp at `MAX` rather than wrapping, so a
//! pathological input can never make a stats line report a tiny number.

/// Saturating add for a `u64` counter.
#[inline(always)]
pub fn sat_add_u64(counter: &mut u64, delta: u64) {
    *counter = counter.saturating_add(delta);
}

/// Saturating increment for a `u64` counter.
#[inline(always)]
pub fn sat_inc_u64(counter: &mut u64) {
    sat_add_u64(counter, 1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sat_add_clamps_at_max() {
        let mut c = u64::MAX - 1;
        sat_add_u64(&mut c, 5);
        assert_eq!(c, u64::MAX);
        sat_inc_u64(&mut c);
        assert_eq!(c, u64::MAX);
    }
}
