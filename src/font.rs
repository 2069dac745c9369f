use crate::error::{PageTableError, Result};
use crate::types::Pt;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use ttf_parser::GlyphId;

/// Rendered width of a string in one font at one size.
pub trait TextMeasure {
    fn measure(&self, text: &str) -> Pt;
}

impl<F> TextMeasure for F
where
    F: Fn(&str) -> Pt,
{
    fn measure(&self, text: &str) -> Pt {
        self(text)
    }
}

/// Where the bytes of a font program come from.
#[derive(Debug, Clone)]
pub enum FontSource {
    File(PathBuf),
    Bytes { name: String, data: Vec<u8> },
}

impl FontSource {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        FontSource::File(path.into())
    }

    pub fn bytes(name: impl Into<String>, data: Vec<u8>) -> Self {
        FontSource::Bytes {
            name: name.into(),
            data,
        }
    }

    pub(crate) fn describe(&self) -> String {
        match self {
            FontSource::File(path) => path.display().to_string(),
            FontSource::Bytes { name, .. } => name.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FontProgramKind {
    TrueType,
    OpenTypeCff,
}

/// Glyph id plus horizontal advance in 1/1000 em.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct GlyphInfo {
    pub(crate) gid: u16,
    pub(crate) advance: u16,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct FontMetrics {
    pub(crate) ascent: i16,
    pub(crate) descent: i16,
    pub(crate) cap_height: i16,
    pub(crate) italic_angle: i16,
    pub(crate) bbox: (i16, i16, i16, i16),
    pub(crate) is_fixed_pitch: bool,
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
struct TextWidthKey {
    size_milli: i64,
    text: String,
}

#[derive(Debug)]
struct TextWidthCache {
    map: HashMap<TextWidthKey, Pt>,
    order: VecDeque<TextWidthKey>,
    max_entries: usize,
}

impl TextWidthCache {
    fn new(max_entries: usize) -> Self {
        Self {
            map: HashMap::new(),
            order: VecDeque::new(),
            max_entries,
        }
    }

    fn get(&self, key: &TextWidthKey) -> Option<Pt> {
        self.map.get(key).copied()
    }

    fn insert(&mut self, key: TextWidthKey, value: Pt) {
        if self.map.contains_key(&key) {
            return;
        }
        self.map.insert(key.clone(), value);
        self.order.push_back(key);
        while self.map.len() > self.max_entries {
            if let Some(old) = self.order.pop_front() {
                self.map.remove(&old);
            } else {
                break;
            }
        }
    }
}

/// A parsed TrueType/OpenType font held for the lifetime of a document build.
///
/// Widths are taken from `hmtx` advances without kerning, which is exactly how
/// the emitted PDF positions glyphs, so measured and drawn widths agree.
pub struct LoadedFont {
    name: String,
    data: Vec<u8>,
    program_kind: FontProgramKind,
    metrics: FontMetrics,
    glyphs: HashMap<char, GlyphInfo>,
    notdef: GlyphInfo,
    width_cache: Mutex<TextWidthCache>,
}

impl fmt::Debug for LoadedFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedFont")
            .field("name", &self.name)
            .field("bytes", &self.data.len())
            .field("program_kind", &self.program_kind)
            .field("glyphs", &self.glyphs.len())
            .finish()
    }
}

impl LoadedFont {
    pub fn load(source: &FontSource) -> Result<Self> {
        match source {
            FontSource::File(path) => {
                let data = fs::read(path)
                    .map_err(|err| PageTableError::font(source.describe(), err.to_string()))?;
                Self::from_bytes(data, path)
            }
            FontSource::Bytes { name, data } => Self::from_bytes(data.clone(), Path::new(name)),
        }
    }

    fn from_bytes(data: Vec<u8>, origin: &Path) -> Result<Self> {
        let source = origin.display().to_string();
        let face = ttf_parser::Face::parse(&data, 0)
            .map_err(|err| PageTableError::font(&source, format!("invalid font data: {err}")))?;

        let scale = 1000.0 / face.units_per_em().max(1) as f32;
        let glyphs = build_glyph_table(&face, scale);
        if glyphs.is_empty() {
            return Err(PageTableError::font(&source, "font has no unicode cmap"));
        }
        let notdef = GlyphInfo {
            gid: 0,
            advance: scaled_advance(face.glyph_hor_advance(GlyphId(0)).unwrap_or(0), scale),
        };

        let ascent = scale_i16(face.ascender(), scale);
        let bbox = face.global_bounding_box();
        let metrics = FontMetrics {
            ascent,
            descent: scale_i16(face.descender(), scale),
            cap_height: face
                .capital_height()
                .map(|value| scale_i16(value, scale))
                .unwrap_or(ascent),
            italic_angle: face
                .italic_angle()
                .map(|value| value.round() as i16)
                .unwrap_or(0),
            bbox: (
                scale_i16(bbox.x_min, scale),
                scale_i16(bbox.y_min, scale),
                scale_i16(bbox.x_max, scale),
                scale_i16(bbox.y_max, scale),
            ),
            is_fixed_pitch: face.is_monospaced(),
        };
        let program_kind = if face.tables().cff.is_some() {
            FontProgramKind::OpenTypeCff
        } else {
            FontProgramKind::TrueType
        };
        let name = font_name(&face, origin);
        drop(face);

        tracing::debug!(font = %name, glyphs = glyphs.len(), "font loaded");
        Ok(Self {
            name,
            data,
            program_kind,
            metrics,
            glyphs,
            notdef,
            width_cache: Mutex::new(TextWidthCache::new(20_000)),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has_glyph(&self, ch: char) -> bool {
        self.glyphs.contains_key(&ch)
    }

    pub fn measure_text_width(&self, font_size: Pt, text: &str) -> Pt {
        let key = TextWidthKey {
            size_milli: font_size.to_milli_i64(),
            text: text.to_string(),
        };
        if let Ok(cache) = self.width_cache.lock() {
            if let Some(value) = cache.get(&key) {
                return value;
            }
        }
        let total: i64 = text.chars().map(|ch| self.glyph(ch).advance as i64).sum();
        let value = if total <= 0 {
            Pt::ZERO
        } else {
            font_size.mul_ratio(total.min(i32::MAX as i64) as i32, 1000)
        };
        if let Ok(mut cache) = self.width_cache.lock() {
            cache.insert(key, value);
        }
        value
    }

    pub(crate) fn glyph(&self, ch: char) -> GlyphInfo {
        self.glyphs.get(&ch).copied().unwrap_or(self.notdef)
    }

    /// Two-byte big-endian glyph ids, as consumed by an Identity-H font.
    pub(crate) fn encode_identity_h(&self, text: &str) -> Vec<u8> {
        let mut out = Vec::with_capacity(text.len() * 2);
        for ch in text.chars() {
            out.extend_from_slice(&self.glyph(ch).gid.to_be_bytes());
        }
        out
    }

    pub(crate) fn data(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn program_kind(&self) -> FontProgramKind {
        self.program_kind
    }

    pub(crate) fn metrics(&self) -> &FontMetrics {
        &self.metrics
    }

    /// Advance of `.notdef`, used for characters the font does not cover.
    pub(crate) fn missing_width(&self) -> u16 {
        self.notdef.advance
    }
}

/// Measures text in a [`LoadedFont`] at a fixed size.
#[derive(Debug, Clone, Copy)]
pub struct FontMeasurer<'a> {
    font: &'a LoadedFont,
    size: Pt,
}

impl<'a> FontMeasurer<'a> {
    pub fn new(font: &'a LoadedFont, size: Pt) -> Self {
        Self { font, size }
    }
}

impl TextMeasure for FontMeasurer<'_> {
    fn measure(&self, text: &str) -> Pt {
        self.font.measure_text_width(self.size, text)
    }
}

fn build_glyph_table(face: &ttf_parser::Face<'_>, scale: f32) -> HashMap<char, GlyphInfo> {
    let mut glyphs = HashMap::new();
    let Some(cmap) = face.tables().cmap else {
        return glyphs;
    };
    for subtable in cmap.subtables.into_iter().filter(|s| s.is_unicode()) {
        subtable.codepoints(|codepoint| {
            let Some(ch) = char::from_u32(codepoint) else {
                return;
            };
            let Some(gid) = subtable.glyph_index(codepoint) else {
                return;
            };
            let advance = scaled_advance(face.glyph_hor_advance(gid).unwrap_or(0), scale);
            glyphs.entry(ch).or_insert(GlyphInfo { gid: gid.0, advance });
        });
    }
    glyphs
}

fn scaled_advance(units: u16, scale: f32) -> u16 {
    let scaled = (units as f32 * scale).round() as i32;
    scaled.clamp(0, u16::MAX as i32) as u16
}

fn scale_i16(value: i16, scale: f32) -> i16 {
    let scaled = (value as f32 * scale).round() as i32;
    scaled.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}

fn font_name(face: &ttf_parser::Face<'_>, origin: &Path) -> String {
    use ttf_parser::name::name_id;

    let mut family = None;
    let mut post = None;
    for entry in face.names() {
        let Some(name) = entry.to_string() else {
            continue;
        };
        match entry.name_id {
            name_id::POST_SCRIPT_NAME if post.is_none() => post = Some(name),
            name_id::FAMILY if family.is_none() => family = Some(name),
            _ => {}
        }
    }
    let stem = origin
        .file_stem()
        .and_then(|v| v.to_str())
        .map(|v| v.to_string());
    post.or(family)
        .or(stem)
        .unwrap_or_else(|| "EmbeddedFont".to_string())
}
