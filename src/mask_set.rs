use log::{debug, info};

use crate::error::{Error, Result};
use crate::mask::Mask;

const SIZE_LABELS: [&str; 3] = ["S", "M", "L"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

impl Direction {
    fn step(self) -> isize {
        match self {
            Direction::Next => 1,
            Direction::Previous => -1,
        }
    }
}

/// Candidate masks from one segmentation response, smallest region first,
/// with a cursor selecting the one on display.
///
/// The default value is the cleared state: no masks, nothing to overlay.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaskSet {
    entries: Vec<(Mask, f32)>,
    current_index: usize,
}

impl MaskSet {
    /// Pair each mask with its score and order the pairs by set-pixel count.
    ///
    /// The sort is stable, so equally sized masks keep their response order.
    pub fn load(masks: Vec<Mask>, scores: Vec<f32>) -> Result<Self> {
        if masks.len() != scores.len() {
            return Err(Error::ScoreCountMismatch {
                masks: masks.len(),
                scores: scores.len(),
            });
        }

        let mut entries: Vec<(usize, Mask, f32)> = masks
            .into_iter()
            .zip(scores)
            .map(|(mask, score)| (mask.true_count(), mask, score))
            .collect();
        entries.sort_by_key(|(count, _, _)| *count);

        debug!(
            "Mask sizes: {:?}",
            entries.iter().map(|(count, _, _)| *count).collect::<Vec<_>>()
        );
        info!("Loaded {} candidate masks", entries.len());

        Ok(Self {
            entries: entries
                .into_iter()
                .map(|(_, mask, score)| (mask, score))
                .collect(),
            current_index: 0,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Mask, f32)> {
        self.entries.iter().map(|(mask, score)| (mask, *score))
    }

    /// Move the cursor one step, wrapping at both ends.
    pub fn cycle(mut self, direction: Direction) -> Self {
        let len = self.entries.len();
        if len <= 1 {
            return self;
        }

        let len = len as isize;
        let next = (self.current_index as isize + direction.step() + len) % len;
        self.current_index = next as usize;
        self
    }

    /// Point the cursor at `index`; out-of-range indices leave it unchanged.
    pub fn select(mut self, index: usize) -> Self {
        if index < self.entries.len() {
            self.current_index = index;
        }
        self
    }

    pub fn current(&self) -> Option<(&Mask, f32)> {
        self.entries
            .get(self.current_index)
            .map(|(mask, score)| (mask, *score))
    }

    /// "S", "M" or "L" for the current position.
    pub fn size_label(&self) -> Option<&'static str> {
        if self.entries.is_empty() {
            return None;
        }
        Some(SIZE_LABELS[self.current_index % SIZE_LABELS.len()])
    }

    /// Text for the on-screen mask label, e.g. `Mask S (0.912)`.
    pub fn describe(&self) -> Option<String> {
        let (_, score) = self.current()?;
        let label = self.size_label()?;
        Some(format!("Mask {} ({:.3})", label, score))
    }

    /// Index of the first mask with the given size label.
    pub fn index_of_label(&self, label: &str) -> Option<usize> {
        let position = SIZE_LABELS
            .iter()
            .position(|candidate| candidate.eq_ignore_ascii_case(label))?;
        (position < self.entries.len()).then_some(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask_with(count: usize, len: usize) -> Mask {
        (0..len).map(|i| i < count).collect()
    }

    fn sizes(set: &MaskSet) -> Vec<usize> {
        set.iter().map(|(mask, _)| mask.true_count()).collect()
    }

    #[test]
    fn test_load_sorts_by_size() {
        let masks = vec![mask_with(10, 64), mask_with(2, 64), mask_with(50, 64)];
        let set = MaskSet::load(masks, vec![0.9, 0.5, 0.7]).unwrap();

        assert_eq!(sizes(&set), vec![2, 10, 50]);
        let scores: Vec<f32> = set.iter().map(|(_, score)| score).collect();
        assert_eq!(scores, vec![0.5, 0.9, 0.7]);
        assert_eq!(set.current_index(), 0);
    }

    #[test]
    fn test_load_is_stable_and_idempotent() {
        let masks = vec![mask_with(3, 8), mask_with(1, 8), mask_with(3, 8)];
        let set = MaskSet::load(masks, vec![0.1, 0.2, 0.3]).unwrap();
        let scores: Vec<f32> = set.iter().map(|(_, score)| score).collect();
        assert_eq!(scores, vec![0.2, 0.1, 0.3]);

        let (masks, scores): (Vec<Mask>, Vec<f32>) =
            set.iter().map(|(mask, score)| (mask.clone(), score)).unzip();
        let again = MaskSet::load(masks, scores).unwrap();
        assert_eq!(again, set);
    }

    #[test]
    fn test_load_empty() {
        let set = MaskSet::load(Vec::new(), Vec::new()).unwrap();
        assert!(set.is_empty());
        assert!(set.current().is_none());
        assert!(set.size_label().is_none());
        assert!(set.describe().is_none());
        assert_eq!(set, MaskSet::default());
    }

    #[test]
    fn test_load_score_count_mismatch() {
        let result = MaskSet::load(vec![mask_with(1, 4)], vec![0.1, 0.2]);
        assert!(matches!(
            result,
            Err(Error::ScoreCountMismatch { masks: 1, scores: 2 })
        ));
    }

    #[test]
    fn test_cycle_wraps() {
        let masks = vec![mask_with(1, 4), mask_with(2, 4), mask_with(3, 4)];
        let set = MaskSet::load(masks, vec![0.1, 0.2, 0.3]).unwrap();

        let set = set.cycle(Direction::Previous);
        assert_eq!(set.current_index(), 2);
        let set = set.cycle(Direction::Next);
        assert_eq!(set.current_index(), 0);

        let mut cycled = set.clone();
        for _ in 0..cycled.len() {
            cycled = cycled.cycle(Direction::Next);
        }
        assert_eq!(cycled.current_index(), set.current_index());
    }

    #[test]
    fn test_cycle_single_and_empty_are_noops() {
        let single = MaskSet::load(vec![mask_with(1, 4)], vec![0.4]).unwrap();
        assert_eq!(single.clone().cycle(Direction::Next), single);

        let empty = MaskSet::default();
        assert_eq!(empty.clone().cycle(Direction::Previous), empty);
    }

    #[test]
    fn test_labels_and_describe() {
        let masks = vec![mask_with(1, 4), mask_with(2, 4)];
        let set = MaskSet::load(masks, vec![0.25, 0.9125]).unwrap();
        assert_eq!(set.describe().as_deref(), Some("Mask S (0.250)"));

        let set = set.cycle(Direction::Next);
        assert_eq!(set.size_label(), Some("M"));
        assert_eq!(set.current().map(|(_, score)| score), Some(0.9125));

        assert_eq!(set.index_of_label("m"), Some(1));
        assert_eq!(set.index_of_label("L"), None);
        assert_eq!(set.clone().select(7).current_index(), 1);
    }
}
