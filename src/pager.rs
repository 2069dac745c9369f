use crate::canvas::{Canvas, Document, FontRole};
use crate::config::{TableGeometry, TableStyle};
use crate::types::{Color, Pt, Rect};

pub const META_HEADER_KEY: &str = "pagetable.header";
pub const META_CHUNK_KEY: &str = "pagetable.chunk";

#[derive(Debug, Clone, PartialEq)]
pub struct TableGrid {
    pub left: Pt,
    pub widths: Vec<Pt>,
}

impl TableGrid {
    pub fn column_x(&self, column: usize) -> Pt {
        self.left + self.widths.iter().take(column).sum::<Pt>()
    }

    pub fn total_width(&self) -> Pt {
        self.widths.iter().sum()
    }
}

/// The wrapped header titles, redrawn at the top of every page.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderBlock {
    pub lines: Vec<Vec<String>>,
    pub height: Pt,
    pub font: FontRole,
    pub font_size: Pt,
}

pub(crate) struct Band<'l> {
    pub top: Pt,
    pub height: Pt,
    pub fill: Option<Color>,
    pub font: FontRole,
    pub font_size: Pt,
    pub columns: Vec<&'l [String]>,
}

pub(crate) fn draw_band(
    canvas: &mut Canvas,
    geometry: &TableGeometry,
    style: &TableStyle,
    grid: &TableGrid,
    band: &Band<'_>,
) {
    let bottom = band.top - band.height;
    if let Some(fill) = band.fill {
        canvas.set_fill_color(fill);
        canvas.fill_rect(Rect {
            x: grid.left,
            y: bottom,
            width: grid.total_width(),
            height: band.height,
        });
    }

    canvas.set_stroke_color(style.border_color);
    canvas.set_line_width(style.border_width);
    for (column, width) in grid.widths.iter().enumerate() {
        canvas.stroke_rect(Rect {
            x: grid.column_x(column),
            y: bottom,
            width: *width,
            height: band.height,
        });
    }

    canvas.set_fill_color(style.text_color);
    canvas.set_font(band.font, band.font_size);
    // Centers the glyph box inside the line step.
    let first_baseline = band.top
        - geometry.padding_top
        - (band.font_size * 0.8 + (geometry.line_step - band.font_size) / 2);
    for (column, lines) in band.columns.iter().enumerate() {
        let x = grid.column_x(column) + geometry.padding_x;
        for (index, line) in lines.iter().enumerate() {
            if line.is_empty() {
                continue;
            }
            let y = first_baseline - geometry.line_step * (index as i32);
            canvas.draw_string(x, y, line.as_str());
        }
    }
}

/// Opening a page always redraws the header first.
pub struct Pager<'a> {
    canvas: Canvas,
    geometry: &'a TableGeometry,
    style: &'a TableStyle,
    grid: &'a TableGrid,
    header: &'a HeaderBlock,
    cursor_y: Pt,
    page_number: usize,
    body_on_page: bool,
}

impl<'a> Pager<'a> {
    pub fn new(
        geometry: &'a TableGeometry,
        style: &'a TableStyle,
        grid: &'a TableGrid,
        header: &'a HeaderBlock,
    ) -> Self {
        Self {
            canvas: Canvas::new(geometry.page_size),
            geometry,
            style,
            grid,
            header,
            cursor_y: geometry.body_top(),
            page_number: 0,
            body_on_page: false,
        }
    }

    pub fn new_page(&mut self) {
        if self.page_number > 0 {
            self.canvas.show_page();
        }
        self.page_number += 1;
        self.cursor_y = self.geometry.body_top();
        self.body_on_page = false;
        self.draw_header();
    }

    /// Opens a new page unless `required` fits above the bottom margin.
    pub fn ensure_space(&mut self, required: Pt) -> bool {
        if self.page_number > 0 && self.available_height() >= required {
            return false;
        }
        self.new_page();
        true
    }

    fn draw_header(&mut self) {
        let top = self.cursor_y;
        let columns: Vec<&[String]> = self.header.lines.iter().map(|l| l.as_slice()).collect();
        let band = Band {
            top,
            height: self.header.height,
            fill: Some(self.style.header_fill),
            font: self.header.font,
            font_size: self.header.font_size,
            columns,
        };
        draw_band(&mut self.canvas, self.geometry, self.style, self.grid, &band);
        let bounds = Rect {
            x: self.grid.left,
            y: top - self.header.height,
            width: self.grid.total_width(),
            height: self.header.height,
        };
        self.canvas
            .record_bounds(META_HEADER_KEY, self.page_number, bounds);
        self.cursor_y -= self.header.height;
    }

    pub(crate) fn draw_body_band(&mut self, band: &Band<'_>) {
        draw_band(&mut self.canvas, self.geometry, self.style, self.grid, band);
        self.cursor_y -= band.height;
        self.body_on_page = true;
    }

    pub fn cursor_y(&self) -> Pt {
        self.cursor_y
    }

    pub fn available_height(&self) -> Pt {
        self.cursor_y - self.geometry.margins.bottom
    }

    pub fn page_number(&self) -> usize {
        self.page_number
    }

    pub fn has_body_content(&self) -> bool {
        self.body_on_page
    }

    pub fn grid(&self) -> &TableGrid {
        self.grid
    }

    pub fn canvas_mut(&mut self) -> &mut Canvas {
        &mut self.canvas
    }

    pub fn current_command_count(&self) -> usize {
        self.canvas.current_command_count()
    }

    pub fn finish(self) -> Document {
        self.canvas.finish()
    }
}
