//! Sequence locator — find where a scripted column slice sits in a strip

use crate::SymbolId;

/// Rightmost start index of `target` inside `strip`
///
/// Scans from the end so the scripted tail wins over a coincidental match
/// in the random filler. Returns `None` for an empty target or one longer
/// than the strip.
pub fn locate(strip: &[SymbolId], target: &[SymbolId]) -> Option<usize> {
    if target.is_empty() || target.len() > strip.len() {
        return None;
    }
    (0..=strip.len() - target.len())
        .rev()
        .find(|&i| &strip[i..i + target.len()] == target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locate_prefers_tail_over_filler() {
        // Filler deliberately repeats the scripted slice [4, 3, 1]
        let strip = [1, 4, 3, 1, 5, 6, 2, 8, 4, 3, 1, 7];
        assert_eq!(locate(&strip, &[4, 3, 1]), Some(8));
    }

    #[test]
    fn test_locate_at_boundaries() {
        let strip = [5, 6, 7];
        assert_eq!(locate(&strip, &[5, 6, 7]), Some(0));
        assert_eq!(locate(&strip, &[7]), Some(2));
        assert_eq!(locate(&strip, &[5]), Some(0));
    }

    #[test]
    fn test_locate_not_found() {
        let strip = [1, 2, 3, 4];
        assert_eq!(locate(&strip, &[3, 2]), None);
        assert_eq!(locate(&strip, &[]), None);
        assert_eq!(locate(&strip, &[1, 2, 3, 4, 5]), None);
        assert_eq!(locate(&[], &[1]), None);
    }

    #[test]
    fn test_locate_overlapping_runs() {
        let strip = [2, 2, 2, 2];
        assert_eq!(locate(&strip, &[2, 2]), Some(2));
    }
}
