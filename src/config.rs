use crate::error::{PageTableError, Result};
use crate::types::{Color, Margins, Pt, Size};

/// Page geometry and text metrics shared by every page of a table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableGeometry {
    pub page_size: Size,
    pub margins: Margins,
    pub font_size: Pt,
    pub header_font_size: Pt,
    /// Vertical distance between consecutive text lines of a cell.
    pub line_step: Pt,
    pub padding_top: Pt,
    pub padding_bottom: Pt,
    /// Applied on both the left and right side of every cell.
    pub padding_x: Pt,
    pub min_row_height: Pt,
    /// Taller row contents continue in a further chunk even when the page has room.
    pub max_row_height: Option<Pt>,
}

impl Default for TableGeometry {
    fn default() -> Self {
        let line_step = Pt::from_i32(12);
        Self {
            page_size: Size::a4_landscape(),
            margins: Margins::symmetric(28.0, 36.0),
            font_size: Pt::from_i32(9),
            header_font_size: Pt::from_i32(9),
            line_step,
            padding_top: Pt::from_i32(4),
            padding_bottom: Pt::from_i32(4),
            padding_x: Pt::from_i32(4),
            min_row_height: line_step * 1.8,
            max_row_height: None,
        }
    }
}

impl TableGeometry {
    pub fn usable_width(&self) -> Pt {
        self.page_size.width - self.margins.left - self.margins.right
    }

    /// Cursor position at the top of a fresh page.
    pub fn body_top(&self) -> Pt {
        self.page_size.height - self.margins.top
    }

    pub fn body_height(&self) -> Pt {
        self.body_top() - self.margins.bottom
    }

    /// Width available to text inside a column of `column_width`.
    pub fn text_width(&self, column_width: Pt) -> Pt {
        column_width - self.padding_x * 2
    }

    pub(crate) fn validate(&self) -> Result<()> {
        let checks: [(bool, &str); 6] = [
            (self.page_size.width > Pt::ZERO && self.page_size.height > Pt::ZERO, "page_size must be positive"),
            (self.usable_width() > Pt::ZERO, "horizontal margins leave no usable width"),
            (self.body_height() > Pt::ZERO, "vertical margins leave no usable height"),
            (self.font_size > Pt::ZERO && self.header_font_size > Pt::ZERO, "font sizes must be positive"),
            (self.line_step > Pt::ZERO, "line_step must be positive"),
            (
                self.padding_top >= Pt::ZERO && self.padding_bottom >= Pt::ZERO && self.padding_x >= Pt::ZERO,
                "paddings must not be negative",
            ),
        ];
        for (ok, message) in checks {
            if !ok {
                return Err(PageTableError::InvalidConfiguration(message.to_string()));
            }
        }
        if let Some(max) = self.max_row_height {
            let one_line = self.padding_top + self.padding_bottom + self.line_step;
            if max < one_line.max(self.min_row_height) {
                return Err(PageTableError::InvalidConfiguration(
                    "max_row_height must hold at least one line".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Colors and stroke widths. Cosmetic only; layout never depends on them.
#[derive(Debug, Clone, PartialEq)]
pub struct TableStyle {
    pub header_fill: Color,
    pub stripe_fill: Color,
    pub border_color: Color,
    pub border_width: Pt,
    pub text_color: Color,
}

impl Default for TableStyle {
    fn default() -> Self {
        Self {
            header_fill: Color::gray(0.85),
            stripe_fill: Color::gray(0.95),
            border_color: Color::gray(0.35),
            border_width: Pt::from_f32(0.5),
            text_color: Color::BLACK,
        }
    }
}

/// The per-page label stamped at the bottom-right margin.
///
/// `{page}` and `{pages}` in the template are replaced with the 1-based page
/// number and the page count.
#[derive(Debug, Clone, PartialEq)]
pub struct PageLabel {
    pub template: String,
    pub font_size: Pt,
}

impl Default for PageLabel {
    fn default() -> Self {
        Self {
            template: "Page {page}/{pages}".to_string(),
            font_size: Pt::from_i32(8),
        }
    }
}

impl PageLabel {
    pub fn render(&self, page: usize, pages: usize) -> String {
        self.template
            .replace("{page}", &page.to_string())
            .replace("{pages}", &pages.to_string())
    }
}
