//! Row height computation and splitting of wrapped rows into page-bound chunks.

use crate::config::TableGeometry;
use crate::types::Pt;
use std::ops::Range;

/// The wrapped lines of one cell. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrappedCell {
    pub lines: Vec<String>,
}

/// All cells of one body row after wrapping, kept intact while the row is
/// drawn so that chunks can refer back into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrappedRow {
    /// Position of the row in the caller's row list.
    pub index: usize,
    pub cells: Vec<WrappedCell>,
}

impl WrappedRow {
    pub fn line_counts(&self) -> impl Iterator<Item = usize> + '_ {
        self.cells.iter().map(|cell| cell.lines.len())
    }

    pub fn max_line_count(&self) -> usize {
        self.line_counts().max().unwrap_or(0)
    }
}

/// Per-column read position into a [`WrappedRow`].
#[derive(Debug, Clone)]
pub struct RowCursor {
    offsets: Vec<usize>,
    chunks_taken: usize,
}

impl RowCursor {
    pub fn new(row: &WrappedRow) -> Self {
        Self {
            offsets: vec![0; row.cells.len()],
            chunks_taken: 0,
        }
    }

    pub fn is_exhausted(&self, row: &WrappedRow) -> bool {
        self.offsets
            .iter()
            .zip(&row.cells)
            .all(|(offset, cell)| *offset >= cell.lines.len())
    }

    pub fn chunks_taken(&self) -> usize {
        self.chunks_taken
    }

    /// Takes up to `max_lines` lines from the front of every column.
    pub fn take_chunk(&mut self, row: &WrappedRow, max_lines: usize, metrics: &RowMetrics) -> RowChunk {
        let ranges: Vec<Range<usize>> = self
            .offsets
            .iter_mut()
            .zip(&row.cells)
            .map(|(offset, cell)| {
                let start = (*offset).min(cell.lines.len());
                let end = (start + max_lines).min(cell.lines.len());
                *offset = end;
                start..end
            })
            .collect();
        let height = metrics.row_height(ranges.iter().map(|r| r.len()));
        let sequence = self.chunks_taken;
        self.chunks_taken += 1;
        RowChunk {
            row_index: row.index,
            sequence,
            ranges,
            height,
            is_last: self.is_exhausted(row),
        }
    }
}

/// A vertically contiguous slice of one row that is drawn on a single page.
#[derive(Debug, Clone, PartialEq)]
pub struct RowChunk {
    pub row_index: usize,
    /// 0 for the first chunk of a row.
    pub sequence: usize,
    pub ranges: Vec<Range<usize>>,
    pub height: Pt,
    pub is_last: bool,
}

impl RowChunk {
    pub fn lines<'a>(&self, row: &'a WrappedRow, column: usize) -> &'a [String] {
        match (self.ranges.get(column), row.cells.get(column)) {
            (Some(range), Some(cell)) => &cell.lines[range.clone()],
            _ => &[],
        }
    }

    pub fn line_count(&self) -> usize {
        self.ranges.iter().map(|r| r.len()).max().unwrap_or(0)
    }
}

/// Outcome of asking how much of a row fits above the bottom margin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkFit {
    NoRoom,
    Lines(usize),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowMetrics {
    pub line_step: Pt,
    pub padding_top: Pt,
    pub padding_bottom: Pt,
    pub min_row_height: Pt,
    pub max_row_height: Option<Pt>,
}

impl RowMetrics {
    pub fn from_geometry(geometry: &TableGeometry) -> Self {
        Self {
            line_step: geometry.line_step,
            padding_top: geometry.padding_top,
            padding_bottom: geometry.padding_bottom,
            min_row_height: geometry.min_row_height,
            max_row_height: geometry.max_row_height,
        }
    }

    fn vertical_padding(&self) -> Pt {
        self.padding_top + self.padding_bottom
    }

    /// Height of a row whose tallest column holds the most lines.
    pub fn row_height(&self, line_counts: impl IntoIterator<Item = usize>) -> Pt {
        let lines = line_counts.into_iter().map(|n| n.max(1)).max().unwrap_or(1);
        let lines = lines.min(i32::MAX as usize) as i32;
        (self.vertical_padding() + self.line_step * lines).max(self.min_row_height)
    }

    /// The smallest chunk ever drawn: one line.
    pub fn min_chunk_height(&self) -> Pt {
        self.row_height([1])
    }

    /// How many lines per column fit into `available` vertical space.
    pub fn fit(&self, available: Pt) -> ChunkFit {
        if available < self.min_chunk_height() {
            return ChunkFit::NoRoom;
        }
        let mut lines = (available - self.vertical_padding()).div_floor(self.line_step).max(1);
        if let Some(max) = self.max_row_height {
            let cap = (max - self.vertical_padding()).div_floor(self.line_step).max(1);
            lines = lines.min(cap);
        }
        ChunkFit::Lines(lines as usize)
    }
}
