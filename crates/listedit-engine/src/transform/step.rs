use crate::model::{Node, Slice};

use super::TransformError;
use super::structure::content_between;

/// Which side a position sticks to when content is inserted exactly at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assoc {
    Before,
    After,
}

/// One atomic document change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Replace `from..to` with `slice`. With `structure` set, the step refuses
    /// to overwrite anything but node boundaries.
    Replace {
        from: usize,
        to: usize,
        slice: Slice,
        structure: bool,
    },
    /// Replace `from..to` with `slice`, keeping the content of
    /// `gap_from..gap_to` and inserting it into the slice at `insert`.
    ReplaceAround {
        from: usize,
        to: usize,
        gap_from: usize,
        gap_to: usize,
        slice: Slice,
        insert: usize,
        structure: bool,
    },
}

impl Step {
    pub fn apply(&self, doc: &Node) -> Result<Node, TransformError> {
        match self {
            Step::Replace {
                from,
                to,
                slice,
                structure,
            } => {
                if *structure && content_between(doc, *from, *to)? {
                    return Err(TransformError::StructureOverwrite);
                }
                Ok(doc.replace(*from, *to, slice)?)
            }
            Step::ReplaceAround {
                from,
                to,
                gap_from,
                gap_to,
                slice,
                insert,
                structure,
            } => {
                if *structure
                    && (content_between(doc, *from, *gap_from)?
                        || content_between(doc, *gap_to, *to)?)
                {
                    return Err(TransformError::StructureOverwrite);
                }
                let gap = doc.slice(*gap_from, *gap_to)?;
                if gap.open_start != 0 || gap.open_end != 0 {
                    return Err(TransformError::GapNotFlat);
                }
                let inserted = slice
                    .insert_at(*insert, gap.content)
                    .ok_or(TransformError::GapDoesNotFit)?;
                Ok(doc.replace(*from, *to, &inserted)?)
            }
        }
    }

    pub fn map(&self) -> StepMap {
        match self {
            Step::Replace {
                from, to, slice, ..
            } => StepMap::new(vec![MapRange::new(*from, to - from, slice.size())]),
            Step::ReplaceAround {
                from,
                to,
                gap_from,
                gap_to,
                slice,
                insert,
                ..
            } => StepMap::new(vec![
                MapRange::new(*from, gap_from - from, *insert),
                MapRange::new(*gap_to, to - gap_to, slice.size() - insert),
            ]),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MapRange {
    start: usize,
    old_size: usize,
    new_size: usize,
}

impl MapRange {
    fn new(start: usize, old_size: usize, new_size: usize) -> Self {
        Self {
            start,
            old_size,
            new_size,
        }
    }
}

/// How one step moved positions around.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StepMap {
    ranges: Vec<MapRange>,
}

impl StepMap {
    fn new(ranges: Vec<MapRange>) -> Self {
        Self { ranges }
    }

    pub fn map(&self, pos: usize, assoc: Assoc) -> usize {
        let mut diff: isize = 0;
        for range in &self.ranges {
            if range.start > pos {
                break;
            }
            let end = range.start + range.old_size;
            if pos <= end {
                let side = if range.old_size == 0 {
                    assoc
                } else if pos == range.start {
                    Assoc::Before
                } else if pos == end {
                    Assoc::After
                } else {
                    assoc
                };
                let base = range.start.saturating_add_signed(diff);
                return match side {
                    Assoc::Before => base,
                    Assoc::After => base + range.new_size,
                };
            }
            diff += range.new_size as isize - range.old_size as isize;
        }
        pos.saturating_add_signed(diff)
    }

    /// Ranges as `(start, end)` in the document after the step.
    pub(crate) fn touched(&self) -> Vec<(usize, usize)> {
        let mut diff: isize = 0;
        let mut out = Vec::new();
        for range in &self.ranges {
            let start = range.start.saturating_add_signed(diff);
            out.push((start, start + range.new_size));
            diff += range.new_size as isize - range.old_size as isize;
        }
        out
    }
}

/// The step maps of a transaction, in order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Mapping {
    maps: Vec<StepMap>,
}

impl Mapping {
    pub fn push(&mut self, map: StepMap) {
        self.maps.push(map);
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }

    pub fn maps(&self) -> &[StepMap] {
        &self.maps
    }

    pub fn map(&self, pos: usize, assoc: Assoc) -> usize {
        self.map_from(0, pos, assoc)
    }

    /// Maps through the maps starting at index `start` only.
    pub fn map_from(&self, start: usize, pos: usize, assoc: Assoc) -> usize {
        self.maps
            .iter()
            .skip(start)
            .fold(pos, |pos, map| map.map(pos, assoc))
    }
}
