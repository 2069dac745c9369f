use crate::canvas::{Command, Document, FontRole, Page};
use crate::config::{PageLabel, TableGeometry};
use crate::error::Result;
use crate::font::{FontProgramKind, LoadedFont, TextMeasure};
use crate::types::{Color, Pt};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document as LoDocument, Object, ObjectId, Stream, StringFormat, dictionary};
use std::collections::{BTreeMap, HashMap};

pub const META_LABEL_KEY: &str = "pagetable.label";

const STANDARD_BOLD_FONT: &str = "Helvetica-Bold";
const FALLBACK_FONT_SIZE: i32 = 10;

/// Fonts available to the content streams.
///
/// Without an embedded bold program, bold text falls back to the standard
/// `Helvetica-Bold` font with WinAnsi encoding.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PdfFonts<'a> {
    pub regular: &'a LoadedFont,
    pub bold: Option<&'a LoadedFont>,
}

impl<'a> PdfFonts<'a> {
    fn embedded(&self, role: FontRole) -> Option<&'a LoadedFont> {
        match role {
            FontRole::Regular => Some(self.regular),
            FontRole::Bold => self.bold,
        }
    }
}

// Helvetica-Bold AFM advances for WinAnsi codes 0x20..=0x7E, in 1/1000 em.
const HELVETICA_BOLD_ASCII_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // '0'..'?'
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // 'P'..'_'
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // '`'..'o'
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, // 'p'..'~'
];
// Upper WinAnsi codes are measured at the lowercase average.
const HELVETICA_BOLD_DEFAULT_WIDTH: u16 = 556;

/// Measures text drawn in the standard `Helvetica-Bold` fallback font.
#[derive(Debug, Clone, Copy)]
pub(crate) struct StandardBoldMeasurer {
    pub size: Pt,
}

impl TextMeasure for StandardBoldMeasurer {
    fn measure(&self, text: &str) -> Pt {
        let units: i64 = encode_winansi(text)
            .into_iter()
            .map(|code| {
                let width = match code {
                    0x20..=0x7E => HELVETICA_BOLD_ASCII_WIDTHS[usize::from(code - 0x20)],
                    _ => HELVETICA_BOLD_DEFAULT_WIDTH,
                };
                i64::from(width)
            })
            .sum();
        self.size.mul_ratio(units.min(i64::from(i32::MAX)) as i32, 1000)
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PdfOptions<'a> {
    pub title: Option<&'a str>,
    pub compress: bool,
}

/// Appends the rendered page label to every page, right-aligned at the right
/// margin and vertically centered in the bottom margin.
pub fn stamp_page_numbers(
    document: &mut Document,
    label: &PageLabel,
    geometry: &TableGeometry,
    color: Color,
    measure: &dyn TextMeasure,
) {
    let total = document.page_count();
    let right = document.page_size.width - geometry.margins.right;
    let baseline = ((geometry.margins.bottom - label.font_size) / 2).max(Pt::ZERO);
    for (index, page) in document.pages.iter_mut().enumerate() {
        let text = label.render(index + 1, total);
        let x = (right - measure.measure(&text)).max(Pt::ZERO);
        page.commands.extend([
            Command::SaveState,
            Command::Meta {
                key: META_LABEL_KEY.to_string(),
                value: text.clone(),
            },
            Command::SetFillColor(color),
            Command::SetFont {
                role: FontRole::Bold,
                size: label.font_size,
            },
            Command::DrawString { x, y: baseline, text },
            Command::RestoreState,
        ]);
    }
}

/// Serializes a laid-out document into PDF bytes.
pub(crate) fn document_to_pdf(
    document: &Document,
    fonts: PdfFonts<'_>,
    options: &PdfOptions<'_>,
) -> Result<Vec<u8>> {
    let usage = collect_glyph_usage(document, fonts);
    let mut pdf = LoDocument::with_version("1.7");
    let pages_id = pdf.new_object_id();

    let mut font_resources = Dictionary::new();
    for role in [FontRole::Regular, FontRole::Bold] {
        let font_id = match fonts.embedded(role) {
            Some(font) => add_embedded_font(&mut pdf, font, usage.get(&role)),
            None => pdf.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => STANDARD_BOLD_FONT,
                "Encoding" => "WinAnsiEncoding",
            }),
        };
        font_resources.set(resource_name(role), font_id);
    }
    let resources_id = pdf.add_object(dictionary! { "Font" => font_resources });

    let mut kids: Vec<Object> = Vec::with_capacity(document.pages.len());
    for page in &document.pages {
        let content = Content {
            operations: page_operations(page, fonts),
        };
        let content_id = pdf.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = pdf.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    pdf.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                real(document.page_size.width),
                real(document.page_size.height),
            ],
        }),
    );
    let catalog_id = pdf.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    pdf.trailer.set("Root", catalog_id);

    let mut info = dictionary! { "Producer" => Object::string_literal("pagetable") };
    if let Some(title) = options.title {
        info.set("Title", text_string(title));
    }
    let info_id = pdf.add_object(info);
    pdf.trailer.set("Info", info_id);

    if options.compress {
        pdf.compress();
    }
    let mut out = Vec::new();
    pdf.save_to(&mut out)?;
    Ok(out)
}

fn resource_name(role: FontRole) -> &'static str {
    match role {
        FontRole::Regular => "F1",
        FontRole::Bold => "F2",
    }
}

fn real(value: Pt) -> Object {
    Object::Real(value.to_f32())
}

/// Glyph ids drawn per embedded font, each with the character it came from.
fn collect_glyph_usage(
    document: &Document,
    fonts: PdfFonts<'_>,
) -> HashMap<FontRole, BTreeMap<u16, char>> {
    let mut usage: HashMap<FontRole, BTreeMap<u16, char>> = HashMap::new();
    for page in &document.pages {
        let mut role = FontRole::Regular;
        let mut stack = Vec::new();
        for command in &page.commands {
            match command {
                Command::SaveState => stack.push(role),
                Command::RestoreState => role = stack.pop().unwrap_or(role),
                Command::SetFont { role: next, .. } => role = *next,
                Command::DrawString { text, .. } => {
                    let Some(font) = fonts.embedded(role) else {
                        continue;
                    };
                    let glyphs = usage.entry(role).or_default();
                    for ch in text.chars() {
                        let gid = font.glyph(ch).gid;
                        if gid != 0 {
                            glyphs.entry(gid).or_insert(ch);
                        }
                    }
                }
                _ => {}
            }
        }
    }
    usage
}

fn page_operations(page: &Page, fonts: PdfFonts<'_>) -> Vec<Operation> {
    let mut ops = Vec::with_capacity(page.commands.len());
    let mut font: Option<(FontRole, Pt)> = None;
    let mut stack = Vec::new();
    for command in &page.commands {
        match command {
            Command::SaveState => {
                stack.push(font);
                ops.push(Operation::new("q", vec![]));
            }
            Command::RestoreState => {
                font = stack.pop().unwrap_or(font);
                ops.push(Operation::new("Q", vec![]));
            }
            Command::Meta { .. } => {}
            Command::SetFillColor(color) => ops.push(Operation::new("rg", color_operands(*color))),
            Command::SetStrokeColor(color) => {
                ops.push(Operation::new("RG", color_operands(*color)))
            }
            Command::SetLineWidth(width) => ops.push(Operation::new("w", vec![real(*width)])),
            Command::SetFont { role, size } => font = Some((*role, *size)),
            Command::DrawRect {
                x,
                y,
                width,
                height,
            } => ops.push(Operation::new(
                "re",
                vec![real(*x), real(*y), real(*width), real(*height)],
            )),
            Command::Fill => ops.push(Operation::new("f", vec![])),
            Command::Stroke => ops.push(Operation::new("S", vec![])),
            Command::DrawString { x, y, text } => {
                let (role, size) = font.unwrap_or((FontRole::Regular, Pt::from_i32(FALLBACK_FONT_SIZE)));
                let encoded = match fonts.embedded(role) {
                    Some(embedded) => {
                        Object::String(embedded.encode_identity_h(text), StringFormat::Hexadecimal)
                    }
                    None => Object::String(encode_winansi(text), StringFormat::Literal),
                };
                ops.push(Operation::new("BT", vec![]));
                ops.push(Operation::new(
                    "Tf",
                    vec![Object::Name(resource_name(role).as_bytes().to_vec()), real(size)],
                ));
                ops.push(Operation::new("Td", vec![real(*x), real(*y)]));
                ops.push(Operation::new("Tj", vec![encoded]));
                ops.push(Operation::new("ET", vec![]));
            }
        }
    }
    ops
}

fn color_operands(color: Color) -> Vec<Object> {
    [color.r, color.g, color.b]
        .into_iter()
        .map(|c| Object::Real(clamp_unit(c)))
        .collect()
}

fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
}

/// Embeds `font` as a Type0 font over a CID-keyed descendant with Identity-H
/// encoding, a `/W` array for the used glyphs and a ToUnicode CMap.
fn add_embedded_font(pdf: &mut LoDocument, font: &LoadedFont, used: Option<&BTreeMap<u16, char>>) -> ObjectId {
    let empty = BTreeMap::new();
    let used = used.unwrap_or(&empty);
    let base_font = Object::Name(sanitize_font_name(font.name()).into_bytes());
    let metrics = font.metrics();

    let (file_key, file_dict) = match font.program_kind() {
        FontProgramKind::TrueType => (
            "FontFile2",
            dictionary! { "Length1" => font.data().len() as i64 },
        ),
        FontProgramKind::OpenTypeCff => ("FontFile3", dictionary! { "Subtype" => "OpenType" }),
    };
    let file_id = pdf.add_object(Stream::new(file_dict, font.data().to_vec()));

    let mut flags: i64 = 32;
    if metrics.is_fixed_pitch {
        flags |= 1;
    }
    let (x_min, y_min, x_max, y_max) = metrics.bbox;
    let mut descriptor = dictionary! {
        "Type" => "FontDescriptor",
        "FontName" => base_font.clone(),
        "Flags" => flags,
        "FontBBox" => vec![
            Object::Integer(i64::from(x_min)),
            Object::Integer(i64::from(y_min)),
            Object::Integer(i64::from(x_max)),
            Object::Integer(i64::from(y_max)),
        ],
        "ItalicAngle" => i64::from(metrics.italic_angle),
        "Ascent" => i64::from(metrics.ascent),
        "Descent" => i64::from(metrics.descent),
        "CapHeight" => i64::from(metrics.cap_height),
        "StemV" => 80_i64,
        "MissingWidth" => i64::from(font.missing_width()),
    };
    descriptor.set(file_key, file_id);
    let descriptor_id = pdf.add_object(descriptor);

    let mut widths: Vec<Object> = Vec::with_capacity(used.len() * 2);
    for (gid, ch) in used {
        widths.push(Object::Integer(i64::from(*gid)));
        widths.push(Object::Array(vec![Object::Integer(i64::from(font.glyph(*ch).advance))]));
    }
    let subtype = match font.program_kind() {
        FontProgramKind::TrueType => "CIDFontType2",
        FontProgramKind::OpenTypeCff => "CIDFontType0",
    };
    let mut cid_font = dictionary! {
        "Type" => "Font",
        "Subtype" => subtype,
        "BaseFont" => base_font.clone(),
        "CIDSystemInfo" => dictionary! {
            "Registry" => Object::string_literal("Adobe"),
            "Ordering" => Object::string_literal("Identity"),
            "Supplement" => 0_i64,
        },
        "FontDescriptor" => descriptor_id,
        "DW" => i64::from(font.missing_width()),
        "W" => widths,
    };
    if font.program_kind() == FontProgramKind::TrueType {
        cid_font.set("CIDToGIDMap", "Identity");
    }
    let cid_font_id = pdf.add_object(cid_font);

    let to_unicode_id = pdf.add_object(Stream::new(dictionary! {}, to_unicode_cmap(used).into_bytes()));
    pdf.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type0",
        "BaseFont" => base_font,
        "Encoding" => "Identity-H",
        "DescendantFonts" => vec![Object::Reference(cid_font_id)],
        "ToUnicode" => to_unicode_id,
    })
}

fn sanitize_font_name(name: &str) -> String {
    let mut out = String::new();
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() || ch == '-' {
            out.push(ch);
        } else if ch == ' ' {
            out.push('-');
        }
    }
    if out.is_empty() {
        "EmbeddedFont".to_string()
    } else {
        out
    }
}

fn to_unicode_cmap(glyphs: &BTreeMap<u16, char>) -> String {
    let entries: Vec<(u16, char)> = glyphs.iter().map(|(g, c)| (*g, *c)).collect();

    let mut out = String::new();
    out.push_str("/CIDInit /ProcSet findresource begin\n");
    out.push_str("12 dict begin\n");
    out.push_str("begincmap\n");
    out.push_str("/CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n");
    out.push_str("/CMapName /Adobe-Identity-UCS def\n");
    out.push_str("/CMapType 2 def\n");
    out.push_str("1 begincodespacerange\n<0000> <FFFF>\nendcodespacerange\n");

    // bfchar sections hold at most 100 entries each.
    for block in entries.chunks(100) {
        out.push_str(&format!("{} beginbfchar\n", block.len()));
        for (gid, ch) in block {
            let mut units = [0u16; 2];
            let utf16: String = ch
                .encode_utf16(&mut units)
                .iter()
                .map(|unit| format!("{unit:04X}"))
                .collect();
            out.push_str(&format!("<{gid:04X}> <{utf16}>\n"));
        }
        out.push_str("endbfchar\n");
    }

    out.push_str("endcmap\n");
    out.push_str("CMapName currentdict /CMap defineresource pop\n");
    out.push_str("end\nend\n");
    out
}

/// Encodes text for the standard fonts; unmapped characters become `?`.
fn encode_winansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| match ch {
            ' '..='~' => ch as u8,
            '\u{A0}'..='\u{FF}' => ch as u32 as u8,
            '€' => 0x80,
            '‚' => 0x82,
            '„' => 0x84,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '™' => 0x99,
            _ => b'?',
        })
        .collect()
}

/// PDF text string: literal for ASCII, UTF-16BE with BOM otherwise.
fn text_string(text: &str) -> Object {
    if text.is_ascii() {
        return Object::string_literal(text);
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Canvas;
    use crate::font::tests::{asset_font_path, regular_font};
    use crate::font::FontSource;
    use crate::types::{Rect, Size};

    fn sample_document(pages: usize) -> Document {
        let mut canvas = Canvas::new(Size::a4());
        for page in 0..pages {
            if page > 0 {
                canvas.show_page();
            }
            canvas.set_fill_color(Color::gray(0.9));
            canvas.fill_rect(Rect {
                x: Pt::from_i32(30),
                y: Pt::from_i32(700),
                width: Pt::from_i32(200),
                height: Pt::from_i32(20),
            });
            canvas.set_fill_color(Color::BLACK);
            canvas.set_font(FontRole::Regular, Pt::from_i32(9));
            canvas.draw_string(Pt::from_i32(34), Pt::from_i32(706), format!("Строка {page}"));
        }
        canvas.finish()
    }

    fn operators(pdf: &LoDocument, page_id: ObjectId) -> Vec<Operation> {
        let content = pdf.get_page_content(page_id).unwrap();
        Content::decode(&content).unwrap().operations
    }

    #[test]
    fn labels_are_right_aligned_on_every_page() {
        let mut document = sample_document(3);
        let geometry = TableGeometry::default();
        let label = PageLabel::default();
        let measure = StandardBoldMeasurer {
            size: label.font_size,
        };
        stamp_page_numbers(&mut document, &label, &geometry, Color::BLACK, &measure);

        let right = document.page_size.width - geometry.margins.right;
        for (index, page) in document.pages.iter().enumerate() {
            let expected = format!("Page {}/3", index + 1);
            assert_eq!(page.meta_values(META_LABEL_KEY).collect::<Vec<_>>(), vec![expected.as_str()]);
            let drawn = page.commands.iter().rev().find_map(|c| match c {
                Command::DrawString { x, text, .. } => Some((*x, text.clone())),
                _ => None,
            });
            let (x, text) = drawn.unwrap();
            assert_eq!(text, expected);
            assert_eq!(x + measure.measure(&text), right);
        }
    }

    #[test]
    fn emits_one_pdf_page_per_document_page() {
        let font = regular_font();
        let mut document = sample_document(2);
        let label = PageLabel::default();
        stamp_page_numbers(
            &mut document,
            &label,
            &TableGeometry::default(),
            Color::BLACK,
            &StandardBoldMeasurer { size: label.font_size },
        );
        let fonts = PdfFonts {
            regular: &font,
            bold: None,
        };
        let options = PdfOptions {
            title: Some("Расписание"),
            compress: false,
        };
        let bytes = document_to_pdf(&document, fonts, &options).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.7"));

        let pdf = LoDocument::load_mem(&bytes).unwrap();
        let pages = pdf.get_pages();
        assert_eq!(pages.len(), 2);

        let first = *pages.get(&1).unwrap();
        let ops = operators(&pdf, first);
        let label_bytes: Vec<Vec<u8>> = ops
            .iter()
            .filter(|op| op.operator == "Tj")
            .filter_map(|op| match op.operands.first() {
                Some(Object::String(bytes, StringFormat::Literal)) => Some(bytes.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(label_bytes, vec![b"Page 1/2".to_vec()]);
        let body = ops
            .iter()
            .find(|op| op.operator == "Tj")
            .and_then(|op| match op.operands.first() {
                Some(Object::String(bytes, _)) => Some(bytes.clone()),
                _ => None,
            });
        assert_eq!(body, Some(font.encode_identity_h("Строка 0")));

        let info_id = pdf.trailer.get(b"Info").unwrap().as_reference().unwrap();
        let info = pdf.get_object(info_id).unwrap().as_dict().unwrap();
        let title = match info.get(b"Title").unwrap() {
            Object::String(bytes, _) => bytes.clone(),
            other => panic!("unexpected title {other:?}"),
        };
        assert_eq!(&title[..2], &[0xFE, 0xFF]);
        assert_eq!(title.len(), 2 + 2 * "Расписание".chars().count());
    }

    #[test]
    fn embedded_fonts_carry_widths_and_to_unicode() {
        let regular = regular_font();
        let bold = LoadedFont::load(&FontSource::file(asset_font_path("DejaVuSans-Bold.ttf"))).unwrap();
        let mut document = sample_document(1);
        let label = PageLabel::default();
        stamp_page_numbers(
            &mut document,
            &label,
            &TableGeometry::default(),
            Color::BLACK,
            &crate::font::FontMeasurer::new(&bold, label.font_size),
        );
        let fonts = PdfFonts {
            regular: &regular,
            bold: Some(&bold),
        };
        let bytes = document_to_pdf(&document, fonts, &PdfOptions::default()).unwrap();
        let pdf = LoDocument::load_mem(&bytes).unwrap();

        let type0: Vec<&Dictionary> = pdf
            .objects
            .values()
            .filter_map(|obj| obj.as_dict().ok())
            .filter(|dict| dict.get(b"Subtype").and_then(Object::as_name).ok() == Some(b"Type0".as_slice()))
            .collect();
        assert_eq!(type0.len(), 2);
        for dict in type0 {
            assert!(dict.get(b"ToUnicode").is_ok());
            assert_eq!(dict.get(b"Encoding").and_then(Object::as_name).unwrap(), b"Identity-H");
        }
        let cid_fonts = pdf
            .objects
            .values()
            .filter_map(|obj| obj.as_dict().ok())
            .filter(|dict| {
                dict.get(b"Subtype").and_then(Object::as_name).ok() == Some(b"CIDFontType2".as_slice())
            })
            .count();
        assert_eq!(cid_fonts, 2);
    }

    #[test]
    fn output_is_deterministic_and_compressible() {
        let font = regular_font();
        let document = sample_document(4);
        let fonts = PdfFonts {
            regular: &font,
            bold: None,
        };
        let options = PdfOptions {
            title: None,
            compress: true,
        };
        let first = document_to_pdf(&document, fonts, &options).unwrap();
        let second = document_to_pdf(&document, fonts, &options).unwrap();
        assert_eq!(first, second);
        let plain = document_to_pdf(&document, fonts, &PdfOptions::default()).unwrap();
        assert!(first.len() < plain.len());
        assert_eq!(LoDocument::load_mem(&first).unwrap().get_pages().len(), 4);
    }

    #[test]
    fn to_unicode_uses_surrogate_pairs_above_bmp() {
        let mut glyphs = BTreeMap::new();
        glyphs.insert(3, 'A');
        glyphs.insert(0x1F, '😀');
        let cmap = to_unicode_cmap(&glyphs);
        assert!(cmap.contains("2 beginbfchar"));
        assert!(cmap.contains("<0003> <0041>"));
        assert!(cmap.contains("<001F> <D83DDE00>"));
    }

    #[test]
    fn standard_bold_widths_follow_helvetica_bold_metrics() {
        let measure = StandardBoldMeasurer {
            size: Pt::from_i32(10),
        };
        assert_eq!(measure.measure("Page 1/2"), Pt::from_milli_i64(40_580));
        assert_eq!(measure.measure("W"), Pt::from_milli_i64(9_440));
        assert_eq!(measure.measure("Ж"), measure.measure("?"));
        assert_eq!(measure.measure(""), Pt::ZERO);
    }

    #[test]
    fn stamped_label_restores_graphics_state() {
        let mut document = sample_document(2);
        let before: Vec<usize> = document.pages.iter().map(|p| p.commands.len()).collect();
        let label = PageLabel::default();
        stamp_page_numbers(
            &mut document,
            &label,
            &TableGeometry::default(),
            Color::BLACK,
            &StandardBoldMeasurer { size: label.font_size },
        );
        for (page, start) in document.pages.iter().zip(before) {
            let stamped = &page.commands[start..];
            assert_eq!(stamped.first(), Some(&Command::SaveState));
            assert_eq!(stamped.last(), Some(&Command::RestoreState));
        }
    }

    #[test]
    fn winansi_maps_latin1_and_replaces_the_rest() {
        assert_eq!(encode_winansi("Page 1/2"), b"Page 1/2".to_vec());
        assert_eq!(encode_winansi("é–Ж"), vec![0xE9, 0x96, b'?']);
    }

    #[test]
    fn font_names_are_pdf_safe() {
        assert_eq!(sanitize_font_name("DejaVu Sans (Bold)"), "DejaVu-Sans-Bold");
        assert_eq!(sanitize_font_name("()"), "EmbeddedFont");
    }
}
