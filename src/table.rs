use crate::canvas::{Document, FontRole};
use crate::columns::{ColumnSpec, RowRecord, compute_column_widths};
use crate::config::{TableGeometry, TableStyle};
use crate::debug::DebugLogger;
use crate::error::{PageTableError, Result};
use crate::font::TextMeasure;
use crate::metrics::{DocumentMetrics, PageMetrics};
use crate::pager::{Band, HeaderBlock, META_CHUNK_KEY, Pager, TableGrid};
use crate::plan::{ChunkFit, RowChunk, RowCursor, RowMetrics, WrappedCell, WrappedRow};
use crate::types::{Color, Pt, Rect};
use crate::wrap::wrap_text;
use serde_json::json;
use std::time::Instant;
use tracing::{debug, trace};

#[derive(Debug, Clone)]
pub struct RenderedTable {
    pub document: Document,
    pub metrics: DocumentMetrics,
}

/// Lays rows out as a paginated table, continuing a row on the next page when
/// it does not fit.
pub struct TableRenderer<'a> {
    geometry: &'a TableGeometry,
    style: &'a TableStyle,
    columns: &'a [ColumnSpec],
    body_measure: &'a dyn TextMeasure,
    header_measure: &'a dyn TextMeasure,
    header_font: FontRole,
    debug: Option<&'a DebugLogger>,
}

impl<'a> TableRenderer<'a> {
    pub fn new(
        geometry: &'a TableGeometry,
        style: &'a TableStyle,
        columns: &'a [ColumnSpec],
        body_measure: &'a dyn TextMeasure,
    ) -> Self {
        Self {
            geometry,
            style,
            columns,
            body_measure,
            header_measure: body_measure,
            header_font: FontRole::Regular,
            debug: None,
        }
    }

    pub fn with_header_font(mut self, font: FontRole, measure: &'a dyn TextMeasure) -> Self {
        self.header_font = font;
        self.header_measure = measure;
        self
    }

    pub(crate) fn with_debug(mut self, debug: Option<&'a DebugLogger>) -> Self {
        self.debug = debug;
        self
    }

    pub fn grid(&self) -> Result<TableGrid> {
        self.geometry.validate()?;
        let widths = compute_column_widths(self.columns, self.geometry.usable_width())?;
        for (column, width) in self.columns.iter().zip(&widths) {
            if self.geometry.text_width(*width) <= Pt::ZERO {
                return Err(PageTableError::InvalidConfiguration(format!(
                    "column '{}' is narrower than its horizontal padding",
                    column.key
                )));
            }
        }
        Ok(TableGrid {
            left: self.geometry.margins.left,
            widths,
        })
    }

    pub fn wrap_row(&self, index: usize, record: &RowRecord, grid: &TableGrid) -> WrappedRow {
        let cells = grid
            .widths
            .iter()
            .enumerate()
            .map(|(column, width)| WrappedCell {
                lines: wrap_text(
                    record.value(column),
                    self.geometry.text_width(*width),
                    self.body_measure,
                ),
            })
            .collect();
        WrappedRow { index, cells }
    }

    pub fn header_block(&self, grid: &TableGrid) -> HeaderBlock {
        let lines: Vec<Vec<String>> = self
            .columns
            .iter()
            .zip(&grid.widths)
            .map(|(column, width)| {
                wrap_text(
                    Some(column.title.as_str()),
                    self.geometry.text_width(*width),
                    self.header_measure,
                )
            })
            .collect();
        let height = RowMetrics::from_geometry(self.geometry).row_height(lines.iter().map(Vec::len));
        HeaderBlock {
            lines,
            height,
            font: self.header_font,
            font_size: self.geometry.header_font_size,
        }
    }

    /// Zebra shading depends only on the row's position in the input.
    pub fn stripe_for(&self, row_index: usize) -> Option<Color> {
        (row_index % 2 == 1).then_some(self.style.stripe_fill)
    }

    pub fn render(&self, rows: &[RowRecord]) -> Result<RenderedTable> {
        let _span = tracing::info_span!("render_table", rows = rows.len()).entered();
        let started = Instant::now();
        let grid = self.grid()?;
        let header = self.header_block(&grid);
        let row_metrics = RowMetrics::from_geometry(self.geometry);
        if header.height + row_metrics.min_chunk_height() > self.geometry.body_height() {
            return Err(PageTableError::InvalidConfiguration(format!(
                "header ({}pt) leaves no room for a row on a {}pt page body",
                header.height.to_f32(),
                self.geometry.body_height().to_f32()
            )));
        }

        let mut pager = Pager::new(self.geometry, self.style, &grid, &header);
        pager.new_page();
        let mut metrics = DocumentMetrics {
            row_count: rows.len(),
            ..DocumentMetrics::default()
        };
        let mut pages = vec![PageMetrics {
            page_number: 1,
            ..PageMetrics::default()
        }];

        for (index, record) in rows.iter().enumerate() {
            let row = self.wrap_row(index, record, &grid);
            let mut cursor = RowCursor::new(&row);
            let fill = self.stripe_for(index);
            let first_page = pager.page_number();

            loop {
                let max_lines = match row_metrics.fit(pager.available_height()) {
                    ChunkFit::Lines(lines) => lines,
                    ChunkFit::NoRoom if !pager.has_body_content() => {
                        return Err(PageTableError::UnplaceableRow {
                            row_index: index,
                            details: format!(
                                "{}pt available, {}pt needed",
                                pager.available_height().to_f32(),
                                row_metrics.min_chunk_height().to_f32()
                            ),
                        });
                    }
                    ChunkFit::NoRoom => {
                        self.break_page(&mut pager, &mut pages, index, row_metrics.min_chunk_height());
                        continue;
                    }
                };

                let chunk = cursor.take_chunk(&row, max_lines, &row_metrics);
                self.draw_chunk(&mut pager, &row, &chunk, fill);
                if let Some(page) = pages.last_mut() {
                    page.chunk_count += 1;
                    if chunk.sequence == 0 {
                        page.rows_started += 1;
                    }
                }
                if chunk.is_last {
                    break;
                }
            }

            if cursor.chunks_taken() > 1 {
                metrics.split_rows += 1;
                debug!(row = index, chunks = cursor.chunks_taken(), "row split across chunks");
                if let Some(logger) = self.debug {
                    logger.log_event(
                        "layout.row_split",
                        json!({
                            "row": index,
                            "chunks": cursor.chunks_taken(),
                            "first_page": first_page,
                            "last_page": pager.page_number(),
                        }),
                    );
                    logger.increment("layout.row_split", 1);
                }
            }
        }

        if let Some(page) = pages.last_mut() {
            page.command_count = pager.current_command_count();
        }
        metrics.pages = pages;
        metrics.total_layout_ms = started.elapsed().as_secs_f64() * 1000.0;
        let document = pager.finish();
        debug!(
            pages = document.page_count(),
            split_rows = metrics.split_rows,
            "table laid out"
        );
        Ok(RenderedTable { document, metrics })
    }

    fn break_page(
        &self,
        pager: &mut Pager<'_>,
        pages: &mut Vec<PageMetrics>,
        row_index: usize,
        required: Pt,
    ) {
        let from_page = pager.page_number();
        let command_count = pager.current_command_count();
        if !pager.ensure_space(required) {
            return;
        }
        if let Some(page) = pages.last_mut() {
            page.command_count = command_count;
        }
        pages.push(PageMetrics {
            page_number: pager.page_number(),
            ..PageMetrics::default()
        });
        debug!(row = row_index, from_page, to_page = pager.page_number(), "page break");
        if let Some(logger) = self.debug {
            logger.log_event(
                "layout.page_break",
                json!({
                    "row": row_index,
                    "from_page": from_page,
                    "to_page": pager.page_number(),
                    "reason": "row_overflow",
                }),
            );
            logger.increment("layout.page_break", 1);
        }
    }

    fn draw_chunk(
        &self,
        pager: &mut Pager<'_>,
        row: &WrappedRow,
        chunk: &RowChunk,
        fill: Option<Color>,
    ) {
        trace!(
            row = chunk.row_index,
            sequence = chunk.sequence,
            lines = chunk.line_count(),
            "drawing chunk"
        );
        let top = pager.cursor_y();
        let columns = (0..row.cells.len()).map(|c| chunk.lines(row, c)).collect();
        let band = Band {
            top,
            height: chunk.height,
            fill,
            font: FontRole::Regular,
            font_size: self.geometry.font_size,
            columns,
        };
        let bounds = Rect {
            x: pager.grid().left,
            y: top - chunk.height,
            width: pager.grid().total_width(),
            height: chunk.height,
        };
        let label = format!(
            "{}:{}:{}",
            chunk.row_index,
            chunk.sequence,
            u8::from(fill.is_some())
        );
        pager.canvas_mut().record_bounds(META_CHUNK_KEY, label, bounds);
        pager.draw_body_band(&band);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Page;
    use crate::pager::META_HEADER_KEY;
    use crate::types::{Margins, Pt, Size};
    use crate::wrap::tests::char_count;

    #[derive(Debug, PartialEq)]
    struct ChunkMeta {
        row: usize,
        sequence: usize,
        striped: bool,
        y: i64,
        height: i64,
    }

    fn chunk_metas(page: &Page) -> Vec<ChunkMeta> {
        page.meta_values(META_CHUNK_KEY)
            .map(|value| {
                let (label, rect) = value.split_once(';').unwrap();
                let label: Vec<&str> = label.split(':').collect();
                let rect: Vec<i64> = rect.split(',').map(|v| v.parse().unwrap()).collect();
                ChunkMeta {
                    row: label[0].parse().unwrap(),
                    sequence: label[1].parse().unwrap(),
                    striped: label[2] == "1",
                    y: rect[1],
                    height: rect[3],
                }
            })
            .collect()
    }

    fn header_top(page: &Page) -> i64 {
        let value = page.meta_values(META_HEADER_KEY).next().unwrap();
        let rect: Vec<i64> = value
            .split_once(';')
            .unwrap()
            .1
            .split(',')
            .map(|v| v.parse().unwrap())
            .collect();
        rect[1]
    }

    // 500pt of usable width; body height 200pt minus the header.
    fn geometry() -> TableGeometry {
        TableGeometry {
            page_size: Size::new(540.0, 260.0),
            margins: Margins::symmetric(20.0, 30.0),
            font_size: Pt::from_i32(9),
            header_font_size: Pt::from_i32(9),
            line_step: Pt::from_i32(10),
            padding_top: Pt::from_i32(5),
            padding_bottom: Pt::from_i32(5),
            padding_x: Pt::from_i32(5),
            min_row_height: Pt::from_i32(20),
            max_row_height: None,
        }
    }

    fn columns() -> Vec<ColumnSpec> {
        vec![
            ColumnSpec::new("a", "A", 0.5),
            ColumnSpec::new("b", "B", 0.3),
            ColumnSpec::new("c", "C", 0.2),
        ]
    }

    fn render(geometry: &TableGeometry, rows: &[RowRecord]) -> RenderedTable {
        let style = TableStyle::default();
        let columns = columns();
        TableRenderer::new(geometry, &style, &columns, &char_count)
            .render(rows)
            .unwrap()
    }

    #[test]
    fn zero_rows_render_a_header_only_page() {
        let rendered = render(&geometry(), &[]);
        assert_eq!(rendered.document.page_count(), 1);
        let page = &rendered.document.pages[0];
        assert_eq!(page.meta_values(META_HEADER_KEY).count(), 1);
        assert!(chunk_metas(page).is_empty());
        assert_eq!(rendered.metrics.row_count, 0);
    }

    #[test]
    fn row_split_by_forced_break_yields_two_chunks() {
        let geometry = geometry();
        let style = TableStyle::default();
        let columns = columns();
        let renderer = TableRenderer::new(&geometry, &style, &columns, &char_count);
        let grid = renderer.grid().unwrap();
        assert_eq!(
            grid.widths,
            vec![Pt::from_i32(250), Pt::from_i32(150), Pt::from_i32(100)]
        );

        // Header 20pt leaves 180pt; eight 20pt rows leave exactly one line of room.
        let mut rows: Vec<RowRecord> = (0..8).map(|i| RowRecord::new([format!("r{i}")])).collect();
        let long = "a very long phrase that needs wrapping across two lines ".repeat(3);
        let target = RowRecord::new(["short", long.trim(), "x"]);
        rows.push(target.clone());
        let rendered = renderer.render(&rows).unwrap();

        let wrapped = renderer.wrap_row(8, &target, &grid);
        assert_eq!(wrapped.cells[0].lines, vec!["short"]);
        assert_eq!(wrapped.cells[1].lines.len(), 2);
        assert_eq!(wrapped.cells[2].lines, vec!["x"]);

        let pages = &rendered.document.pages;
        assert_eq!(pages.len(), 2);
        let first: Vec<ChunkMeta> = chunk_metas(&pages[0]).into_iter().filter(|m| m.row == 8).collect();
        let second = chunk_metas(&pages[1]);
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
        assert_eq!((first[0].sequence, second[0].sequence), (0, 1));

        let page_two: Vec<&str> = pages[1].strings().collect();
        assert!(page_two.contains(&wrapped.cells[1].lines[1].as_str()));
        assert!(!page_two.contains(&"short"));
        assert!(!page_two.contains(&"x"));
        assert_eq!(rendered.metrics.split_rows, 1);
    }

    #[test]
    fn stripes_follow_row_index_across_pages() {
        let geometry = geometry();
        let tall: String = (0..40).map(|i| format!("line{i}\n")).collect();
        let rows = vec![
            RowRecord::new(["zero"]),
            RowRecord::new([tall.as_str()]),
            RowRecord::new(["two"]),
            RowRecord::new(["three"]),
        ];
        let rendered = render(&geometry, &rows);
        assert!(rendered.document.page_count() >= 2);

        let all: Vec<ChunkMeta> = rendered.document.pages.iter().flat_map(chunk_metas).collect();
        let row_one: Vec<&ChunkMeta> = all.iter().filter(|m| m.row == 1).collect();
        assert!(row_one.len() >= 2);
        assert!(row_one.iter().all(|m| m.striped));
        for meta in &all {
            assert_eq!(meta.striped, meta.row % 2 == 1, "row {}", meta.row);
        }
        let sequences: Vec<usize> = row_one.iter().map(|m| m.sequence).collect();
        assert_eq!(sequences, (0..row_one.len()).collect::<Vec<_>>());
    }

    #[test]
    fn header_precedes_body_on_every_page() {
        let geometry = geometry();
        let rows: Vec<RowRecord> = (0..60).map(|i| RowRecord::new([format!("row {i}")])).collect();
        let rendered = render(&geometry, &rows);
        assert!(rendered.document.page_count() >= 6);
        let body_top = geometry.body_top().to_milli_i64();
        for page in &rendered.document.pages {
            assert_eq!(page.meta_values(META_HEADER_KEY).count(), 1);
            let header_bottom = header_top(page);
            let chunks = chunk_metas(page);
            assert!(!chunks.is_empty());
            assert_eq!(header_bottom + 20_000, body_top);
            assert_eq!(chunks[0].y + chunks[0].height, header_bottom);
            let header_pos = page
                .commands
                .iter()
                .position(|c| matches!(c, crate::canvas::Command::Meta { key, .. } if key == META_HEADER_KEY))
                .unwrap();
            let chunk_pos = page
                .commands
                .iter()
                .position(|c| matches!(c, crate::canvas::Command::Meta { key, .. } if key == META_CHUNK_KEY))
                .unwrap();
            assert!(header_pos < chunk_pos);
        }
        let total_rows: usize = rendered.metrics.pages.iter().map(|p| p.rows_started).sum();
        assert_eq!(total_rows, 60);
    }

    #[test]
    fn page_breaks_only_when_a_one_line_chunk_cannot_fit() {
        let geometry = geometry();
        // Nine 20pt rows fill the 180pt below the header exactly.
        let nine: Vec<RowRecord> = (0..9).map(|i| RowRecord::new([format!("r{i}")])).collect();
        let rendered = render(&geometry, &nine);
        assert_eq!(rendered.document.page_count(), 1);

        let ten: Vec<RowRecord> = (0..10).map(|i| RowRecord::new([format!("r{i}")])).collect();
        let rendered = render(&geometry, &ten);
        assert_eq!(rendered.document.page_count(), 2);
        let second = chunk_metas(&rendered.document.pages[1]);
        assert_eq!(second.iter().map(|m| m.row).collect::<Vec<_>>(), vec![9]);
        for (page, metrics) in rendered.document.pages.iter().zip(&rendered.metrics.pages) {
            assert_eq!(metrics.command_count, page.commands.len());
        }
    }

    #[test]
    fn chunks_never_cross_the_bottom_margin() {
        let geometry = geometry();
        let rows: Vec<RowRecord> = (0..25)
            .map(|i| RowRecord::new([format!("{i}"), "w ".repeat(i * 7), "z".repeat(i * 5)]))
            .collect();
        let rendered = render(&geometry, &rows);
        let bottom = geometry.margins.bottom.to_milli_i64();
        for page in &rendered.document.pages {
            for meta in chunk_metas(page) {
                assert!(meta.y >= bottom, "chunk of row {} below margin", meta.row);
                assert!(meta.height > 0);
            }
        }
    }

    #[test]
    fn layout_is_deterministic() {
        let geometry = geometry();
        let rows: Vec<RowRecord> = (0..30)
            .map(|i| RowRecord::new([format!("row {i}"), "lorem ipsum dolor ".repeat(i % 7)]))
            .collect();
        let first = render(&geometry, &rows);
        let second = render(&geometry, &rows);
        assert_eq!(first.document, second.document);
        assert_eq!(first.metrics.pages, second.metrics.pages);
    }

    #[test]
    fn narrow_column_is_rejected() {
        let geometry = TableGeometry {
            padding_x: Pt::from_i32(60),
            ..geometry()
        };
        let style = TableStyle::default();
        let columns = columns();
        let err = TableRenderer::new(&geometry, &style, &columns, &char_count)
            .render(&[])
            .unwrap_err();
        assert!(matches!(err, PageTableError::InvalidConfiguration(_)));
    }

    #[test]
    fn oversized_header_is_rejected() {
        let geometry = geometry();
        let style = TableStyle::default();
        let columns = vec![ColumnSpec::new("a", "word ".repeat(2000), 1.0)];
        let err = TableRenderer::new(&geometry, &style, &columns, &char_count)
            .render(&[])
            .unwrap_err();
        assert!(err.to_string().contains("header"));
    }
}
