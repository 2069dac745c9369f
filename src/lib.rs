mod canvas;
mod cells;
mod columns;
mod config;
mod debug;
mod error;
mod font;
mod metrics;
mod pager;
mod pdf;
mod plan;
#[cfg(feature = "remote-fonts")]
mod remote;
mod table;
mod types;
mod wrap;

pub use canvas::{Canvas, Command, Document, FontRole, Page};
pub use cells::{LabeledBlock, join_entries, merge_identical_blocks};
pub use columns::{ColumnSpec, RowRecord, compute_column_widths};
pub use config::{PageLabel, TableGeometry, TableStyle};
use debug::DebugLogger;
pub use error::{PageTableError, Result};
pub use font::{FontMeasurer, FontSource, LoadedFont, TextMeasure};
pub use metrics::{DocumentMetrics, PageMetrics};
pub use pager::{HeaderBlock, META_CHUNK_KEY, META_HEADER_KEY, Pager, TableGrid};
pub use pdf::{META_LABEL_KEY, stamp_page_numbers};
use pdf::{PdfFonts, PdfOptions, StandardBoldMeasurer};
pub use plan::{ChunkFit, RowChunk, RowCursor, RowMetrics, WrappedCell, WrappedRow};
#[cfg(feature = "remote-fonts")]
pub use remote::{fetch_font, fetch_font_blocking};
use serde_json::json;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
pub use table::{RenderedTable, TableRenderer};
use tracing::info;
pub use types::{Color, Margins, Pt, Rect, Size};
pub use wrap::{EMPTY_CELL_PLACEHOLDER, wrap_text};

/// A configured table engine: geometry, style and loaded fonts.
///
/// Building is the expensive step (font parsing); one `PageTable` can render
/// any number of tables, from any thread.
pub struct PageTable {
    geometry: TableGeometry,
    style: TableStyle,
    page_label: PageLabel,
    title: Option<String>,
    compress: bool,
    body_font: Arc<LoadedFont>,
    bold_font: Option<Arc<LoadedFont>>,
    debug: Option<DebugLogger>,
}

#[derive(Debug, Clone)]
pub struct PageTableBuilder {
    geometry: TableGeometry,
    style: TableStyle,
    page_label: PageLabel,
    title: Option<String>,
    compress: bool,
    body_font: Option<FontSource>,
    bold_font: Option<FontSource>,
    debug_path: Option<PathBuf>,
}

impl PageTable {
    pub fn builder() -> PageTableBuilder {
        PageTableBuilder::new()
    }

    pub fn geometry(&self) -> &TableGeometry {
        &self.geometry
    }

    pub fn style(&self) -> &TableStyle {
        &self.style
    }

    fn emit_debug_summary(&self, context: &str) {
        if let Some(logger) = &self.debug {
            logger.emit_summary(context);
            logger.flush();
        }
    }

    fn renderer<'a>(
        &'a self,
        columns: &'a [ColumnSpec],
        body: &'a FontMeasurer<'a>,
        header: &'a FontMeasurer<'a>,
    ) -> TableRenderer<'a> {
        let header_role = if self.bold_font.is_some() {
            FontRole::Bold
        } else {
            FontRole::Regular
        };
        TableRenderer::new(&self.geometry, &self.style, columns, body)
            .with_header_font(header_role, header)
            .with_debug(self.debug.as_ref())
    }

    fn header_measurer(&self) -> FontMeasurer<'_> {
        let font = self.bold_font.as_deref().unwrap_or(&*self.body_font);
        FontMeasurer::new(font, self.geometry.header_font_size)
    }

    /// Wraps every row exactly as layout would, without drawing anything.
    pub fn wrap_rows(&self, columns: &[ColumnSpec], rows: &[RowRecord]) -> Result<Vec<WrappedRow>> {
        let body = FontMeasurer::new(&self.body_font, self.geometry.font_size);
        let header = self.header_measurer();
        let renderer = self.renderer(columns, &body, &header);
        let grid = renderer.grid()?;
        Ok(rows
            .iter()
            .enumerate()
            .map(|(index, row)| renderer.wrap_row(index, row, &grid))
            .collect())
    }

    fn layout_table(&self, columns: &[ColumnSpec], rows: &[RowRecord]) -> Result<RenderedTable> {
        let body = FontMeasurer::new(&self.body_font, self.geometry.font_size);
        let header = self.header_measurer();
        let mut rendered = self.renderer(columns, &body, &header).render(rows)?;

        match self.bold_font.as_deref() {
            Some(bold) => stamp_page_numbers(
                &mut rendered.document,
                &self.page_label,
                &self.geometry,
                self.style.text_color,
                &FontMeasurer::new(bold, self.page_label.font_size),
            ),
            None => stamp_page_numbers(
                &mut rendered.document,
                &self.page_label,
                &self.geometry,
                self.style.text_color,
                &StandardBoldMeasurer {
                    size: self.page_label.font_size,
                },
            ),
        }
        Ok(rendered)
    }

    /// Lays the table out into per-page drawing commands, page labels included.
    pub fn layout(&self, columns: &[ColumnSpec], rows: &[RowRecord]) -> Result<Document> {
        let rendered = self.layout_table(columns, rows)?;
        self.emit_debug_summary("layout");
        Ok(rendered.document)
    }

    pub fn render(&self, columns: &[ColumnSpec], rows: &[RowRecord]) -> Result<Vec<u8>> {
        self.render_with_metrics(columns, rows).map(|(bytes, _)| bytes)
    }

    pub fn render_with_metrics(
        &self,
        columns: &[ColumnSpec],
        rows: &[RowRecord],
    ) -> Result<(Vec<u8>, DocumentMetrics)> {
        let RenderedTable {
            document,
            mut metrics,
        } = self.layout_table(columns, rows)?;
        let fonts = PdfFonts {
            regular: &self.body_font,
            bold: self.bold_font.as_deref(),
        };
        let options = PdfOptions {
            title: self.title.as_deref(),
            compress: self.compress,
        };
        let bytes = pdf::document_to_pdf(&document, fonts, &options)?;
        metrics.record_output(&bytes);

        if let Some(logger) = &self.debug {
            logger.log_event(
                "pdf.emit",
                json!({
                    "pages": document.page_count(),
                    "rows": metrics.row_count,
                    "bytes": bytes.len(),
                    "fingerprint": metrics.fingerprint,
                }),
            );
            logger.increment("pdf.emit", 1);
        }
        info!(
            pages = document.page_count(),
            rows = metrics.row_count,
            bytes = bytes.len(),
            "table rendered"
        );
        self.emit_debug_summary("render");
        Ok((bytes, metrics))
    }

    /// Renders fully in memory first, so a failed build writes nothing.
    pub fn render_to_writer<W: Write>(
        &self,
        columns: &[ColumnSpec],
        rows: &[RowRecord],
        writer: &mut W,
    ) -> Result<usize> {
        let bytes = self.render(columns, rows)?;
        writer.write_all(&bytes)?;
        writer.flush()?;
        Ok(bytes.len())
    }

    pub fn render_to_file(
        &self,
        columns: &[ColumnSpec],
        rows: &[RowRecord],
        path: impl AsRef<Path>,
    ) -> Result<usize> {
        let bytes = self.render(columns, rows)?;
        std::fs::write(path, &bytes)?;
        Ok(bytes.len())
    }
}

impl Default for PageTableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PageTableBuilder {
    pub fn new() -> Self {
        Self {
            geometry: TableGeometry::default(),
            style: TableStyle::default(),
            page_label: PageLabel::default(),
            title: None,
            compress: true,
            body_font: None,
            bold_font: None,
            debug_path: None,
        }
    }

    pub fn page_size(mut self, size: Size) -> Self {
        self.geometry.page_size = size;
        self
    }

    pub fn margins(mut self, margins: Margins) -> Self {
        self.geometry.margins = margins;
        self
    }

    pub fn font_size(mut self, size: f32) -> Self {
        self.geometry.font_size = Pt::from_f32(size);
        self
    }

    pub fn header_font_size(mut self, size: f32) -> Self {
        self.geometry.header_font_size = Pt::from_f32(size);
        self
    }

    pub fn line_step(mut self, step: f32) -> Self {
        self.geometry.line_step = Pt::from_f32(step);
        self
    }

    pub fn max_row_height(mut self, height: Option<f32>) -> Self {
        self.geometry.max_row_height = height.map(Pt::from_f32);
        self
    }

    /// Replaces the whole geometry, including anything set by the shortcuts above.
    pub fn geometry(mut self, geometry: TableGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    pub fn style(mut self, style: TableStyle) -> Self {
        self.style = style;
        self
    }

    pub fn page_label(mut self, label: PageLabel) -> Self {
        self.page_label = label;
        self
    }

    pub fn page_label_template(mut self, template: impl Into<String>) -> Self {
        self.page_label.template = template.into();
        self
    }

    pub fn document_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn body_font(mut self, source: FontSource) -> Self {
        self.body_font = Some(source);
        self
    }

    /// Font for the header row and page labels. Without one, headers use the
    /// body font and labels the standard Helvetica-Bold.
    pub fn bold_font(mut self, source: FontSource) -> Self {
        self.bold_font = Some(source);
        self
    }

    pub fn debug_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.debug_path = Some(path.into());
        self
    }

    pub fn compress_streams(mut self, enabled: bool) -> Self {
        self.compress = enabled;
        self
    }

    pub fn build(self) -> Result<PageTable> {
        self.geometry.validate()?;
        if self.page_label.font_size <= Pt::ZERO {
            return Err(PageTableError::InvalidConfiguration(
                "page label font size must be positive".to_string(),
            ));
        }
        let Some(body_source) = self.body_font else {
            return Err(PageTableError::InvalidConfiguration(
                "a body font is required".to_string(),
            ));
        };
        let body_font = Arc::new(LoadedFont::load(&body_source)?);
        let bold_font = match &self.bold_font {
            Some(source) => Some(Arc::new(LoadedFont::load(source)?)),
            None => None,
        };
        let debug = match self.debug_path {
            Some(path) => Some(DebugLogger::new(path)?),
            None => None,
        };
        info!(
            body_font = body_font.name(),
            bold_font = bold_font.as_ref().map(|f| f.name()),
            "page table configured"
        );
        Ok(PageTable {
            geometry: self.geometry,
            style: self.style,
            page_label: self.page_label,
            title: self.title,
            compress: self.compress,
            body_font,
            bold_font,
            debug,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::tests::asset_font_path;
    use lopdf::Document as LoDocument;
    use serde_json::Value;

    fn columns() -> Vec<ColumnSpec> {
        vec![
            ColumnSpec::new("code", "Код", 0.15),
            ColumnSpec::new("name", "Направление подготовки", 0.45),
            ColumnSpec::new("schedule", "Расписание", 0.4),
        ]
    }

    fn rows(count: usize) -> Vec<RowRecord> {
        (0..count)
            .map(|i| {
                let schedule = (0..(i % 9))
                    .map(|k| format!("Пн {:02}:00 ауд. {}", 8 + k, 100 + i))
                    .collect::<Vec<_>>();
                RowRecord::new([
                    format!("09.03.{i:02}"),
                    format!("Информатика и вычислительная техника, профиль {i}"),
                    join_entries(schedule),
                ])
            })
            .collect()
    }

    fn engine() -> PageTable {
        PageTable::builder()
            .body_font(FontSource::file(asset_font_path("DejaVuSans.ttf")))
            .bold_font(FontSource::file(asset_font_path("DejaVuSans-Bold.ttf")))
            .document_title("Приёмная комиссия")
            .build()
            .unwrap()
    }

    #[test]
    fn engine_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PageTable>();
    }

    #[test]
    fn body_font_is_required() {
        let err = PageTable::builder().build().err().unwrap();
        assert!(matches!(err, PageTableError::InvalidConfiguration(_)));
    }

    #[test]
    fn missing_font_file_fails_the_build() {
        let err = PageTable::builder()
            .body_font(FontSource::file("/nonexistent/font.ttf"))
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, PageTableError::FontUnavailable { .. }));
    }

    #[test]
    fn invalid_geometry_fails_the_build() {
        let err = PageTable::builder()
            .body_font(FontSource::file(asset_font_path("DejaVuSans.ttf")))
            .line_step(0.0)
            .build()
            .err()
            .unwrap();
        assert!(err.to_string().contains("line_step"));
    }

    #[test]
    fn multi_page_table_round_trips_through_lopdf() {
        let engine = engine();
        let rows = rows(120);
        let document = engine.layout(&columns(), &rows).unwrap();
        assert!(document.page_count() > 2);
        let (bytes, metrics) = engine.render_with_metrics(&columns(), &rows).unwrap();

        let pdf = LoDocument::load_mem(&bytes).unwrap();
        assert_eq!(pdf.get_pages().len(), document.page_count());
        assert_eq!(metrics.page_count(), document.page_count());
        assert_eq!(metrics.row_count, 120);
        assert_eq!(metrics.total_bytes, bytes.len());
        assert_eq!(metrics.fingerprint, metrics::fingerprint(&bytes));

        let pages = document.page_count();
        for (index, page) in document.pages.iter().enumerate() {
            let label = format!("Page {}/{}", index + 1, pages);
            assert_eq!(page.meta_values(META_LABEL_KEY).collect::<Vec<_>>(), vec![label.as_str()]);
            assert_eq!(page.meta_values(META_HEADER_KEY).count(), 1);
        }
        let started: usize = metrics.pages.iter().map(|p| p.rows_started).sum();
        assert_eq!(started, 120);
    }

    #[test]
    fn rendering_is_idempotent() {
        let engine = engine();
        let rows = rows(40);
        let first = engine.render(&columns(), &rows).unwrap();
        let second = engine.render(&columns(), &rows).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            engine.wrap_rows(&columns(), &rows).unwrap(),
            engine.wrap_rows(&columns(), &rows).unwrap()
        );
    }

    #[test]
    fn wrapped_lines_fit_their_columns() {
        let engine = engine();
        let font = LoadedFont::load(&FontSource::file(asset_font_path("DejaVuSans.ttf"))).unwrap();
        let widths = compute_column_widths(&columns(), engine.geometry().usable_width()).unwrap();
        for row in engine.wrap_rows(&columns(), &rows(30)).unwrap() {
            for (cell, width) in row.cells.iter().zip(&widths) {
                let limit = engine.geometry().text_width(*width);
                for line in &cell.lines {
                    let measured = font.measure_text_width(engine.geometry().font_size, line);
                    assert!(measured <= limit || line.chars().count() == 1, "{line:?}");
                }
            }
        }
    }

    #[test]
    fn empty_table_is_one_header_page() {
        let engine = engine();
        let document = engine.layout(&columns(), &[]).unwrap();
        assert_eq!(document.page_count(), 1);
        assert!(document.pages[0].meta_values(META_CHUNK_KEY).next().is_none());
        let bytes = engine.render(&columns(), &[]).unwrap();
        assert_eq!(LoDocument::load_mem(&bytes).unwrap().get_pages().len(), 1);
    }

    #[test]
    fn no_columns_is_invalid() {
        let err = engine().render(&[], &rows(3)).unwrap_err();
        assert!(matches!(err, PageTableError::InvalidConfiguration(_)));
    }

    #[test]
    fn standard_bold_font_is_used_without_a_bold_file() {
        let engine = PageTable::builder()
            .body_font(FontSource::file(asset_font_path("DejaVuSans.ttf")))
            .compress_streams(false)
            .build()
            .unwrap();
        let bytes = engine.render(&columns(), &rows(5)).unwrap();
        let needle = b"/Helvetica-Bold";
        assert!(bytes.windows(needle.len()).any(|w| w == needle));
    }

    #[test]
    fn file_output_matches_buffer() {
        let engine = engine();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.pdf");
        let rows = rows(25);
        let written = engine.render_to_file(&columns(), &rows, &path).unwrap();
        let on_disk = std::fs::read(&path).unwrap();
        assert_eq!(written, on_disk.len());
        assert_eq!(on_disk, engine.render(&columns(), &rows).unwrap());

        let mut buffer = Vec::new();
        engine.render_to_writer(&columns(), &rows, &mut buffer).unwrap();
        assert_eq!(buffer, on_disk);
    }

    #[test]
    fn failed_render_writes_nothing() {
        let engine = engine();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        assert!(engine.render_to_file(&[], &rows(2), &path).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn debug_log_records_layout_and_emit_events() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("debug.jsonl");
        let engine = PageTable::builder()
            .body_font(FontSource::file(asset_font_path("DejaVuSans.ttf")))
            .debug_log(&log_path)
            .build()
            .unwrap();
        engine.render(&columns(), &rows(120)).unwrap();

        let text = std::fs::read_to_string(&log_path).unwrap();
        let records: Vec<Value> = text
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        let kinds: Vec<&str> = records.iter().filter_map(|r| r["type"].as_str()).collect();
        assert!(kinds.contains(&"layout.page_break"));
        assert!(kinds.contains(&"pdf.emit"));
        assert_eq!(kinds.last(), Some(&"debug.summary"));
        let summary = records.last().unwrap();
        assert_eq!(summary["context"], "render");
        assert_eq!(summary["counts"]["pdf.emit"], 1);
    }
}
