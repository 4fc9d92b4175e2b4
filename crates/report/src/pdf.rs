//! Minimal PDF 1.4 writer.
//!
//! Enough for a single-page report: the three base-14 Helvetica faces with
//! WinAnsi encoding, text placement, and RGB images embedded as Flate
//! compressed XObjects. Page content streams are left uncompressed.

use std::fmt::Write as _;
use std::io::Write as _;

use crate::error::ReportResult;

/// Object number in the document body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectId(usize);

impl ObjectId {
    fn reference(self) -> String {
        format!("{} 0 R", self.0)
    }
}

/// Base-14 fonts registered on every page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
    Italic,
}

impl Font {
    const ALL: [Font; 3] = [Font::Regular, Font::Bold, Font::Italic];

    fn resource_name(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
            Font::Italic => "F3",
        }
    }

    fn base_font(self) -> &'static str {
        match self {
            Font::Regular => "Helvetica",
            Font::Bold => "Helvetica-Bold",
            Font::Italic => "Helvetica-Oblique",
        }
    }
}

/// Drawing operators for one page.
#[derive(Debug, Default)]
pub struct PageContent {
    ops: String,
    images: Vec<(String, ObjectId)>,
}

impl PageContent {
    /// Draw `text` with its baseline starting at `(x, y)` points from the
    /// bottom-left corner.
    pub fn text(&mut self, font: Font, size: f32, x: f32, y: f32, text: &str) {
        let _ = writeln!(
            self.ops,
            "BT /{} {:.1} Tf {:.2} {:.2} Td ({}) Tj ET",
            font.resource_name(),
            size,
            x,
            y,
            escape_text(text)
        );
    }

    /// Place an image XObject scaled into the given box.
    pub fn image(&mut self, image: ObjectId, x: f32, y: f32, width: f32, height: f32) {
        let name = format!("Im{}", self.images.len() + 1);
        let _ = writeln!(
            self.ops,
            "q {width:.2} 0 0 {height:.2} {x:.2} {y:.2} cm /{name} Do Q"
        );
        self.images.push((name, image));
    }
}

/// PDF document under construction. Objects are numbered in insertion order.
#[derive(Debug)]
pub struct PdfDocument {
    objects: Vec<Vec<u8>>,
    fonts: Vec<(Font, ObjectId)>,
    pages: Vec<ObjectId>,
    pages_root: ObjectId,
    info: Option<ObjectId>,
}

impl Default for PdfDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfDocument {
    pub fn new() -> Self {
        let mut doc = Self {
            objects: Vec::new(),
            fonts: Vec::new(),
            pages: Vec::new(),
            pages_root: ObjectId(0),
            info: None,
        };
        doc.pages_root = doc.add(Vec::new());
        for font in Font::ALL {
            let body = format!(
                "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                font.base_font()
            );
            let id = doc.add(body.into_bytes());
            doc.fonts.push((font, id));
        }
        doc
    }

    fn add(&mut self, body: Vec<u8>) -> ObjectId {
        self.objects.push(body);
        ObjectId(self.objects.len())
    }

    fn add_stream(&mut self, dict_entries: &str, data: &[u8]) -> ObjectId {
        let mut body = format!("<< {dict_entries} /Length {} >>\nstream\n", data.len()).into_bytes();
        body.extend_from_slice(data);
        body.extend_from_slice(b"\nendstream");
        self.add(body)
    }

    /// Embed 8-bit interleaved RGB pixels.
    pub fn add_rgb_image(&mut self, width: u32, height: u32, rgb: &[u8]) -> ReportResult<ObjectId> {
        let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(rgb)?;
        let compressed = encoder.finish()?;
        let dict = format!(
            "/Type /XObject /Subtype /Image /Width {width} /Height {height} \
             /ColorSpace /DeviceRGB /BitsPerComponent 8 /Filter /FlateDecode"
        );
        Ok(self.add_stream(&dict, &compressed))
    }

    /// Document information dictionary (title, producer, creation date).
    pub fn set_info(&mut self, title: &str, creation_date: &str) {
        let body = format!(
            "<< /Title ({}) /Producer (rain-nowcast) /CreationDate (D:{}) >>",
            escape_text(title),
            creation_date
        );
        self.info = Some(self.add(body.into_bytes()));
    }

    /// Append a page of `width × height` points.
    pub fn add_page(&mut self, width: f32, height: f32, content: PageContent) {
        let contents = self.add_stream("", content.ops.as_bytes());

        let mut resources = String::from("<< /Font <<");
        for (font, id) in &self.fonts {
            let _ = write!(resources, " /{} {}", font.resource_name(), id.reference());
        }
        resources.push_str(" >>");
        if !content.images.is_empty() {
            resources.push_str(" /XObject <<");
            for (name, id) in &content.images {
                let _ = write!(resources, " /{} {}", name, id.reference());
            }
            resources.push_str(" >>");
        }
        resources.push_str(" >>");

        let page = format!(
            "<< /Type /Page /Parent {} /MediaBox [0 0 {:.0} {:.0}] /Resources {} /Contents {} >>",
            self.pages_root.reference(),
            width,
            height,
            resources,
            contents.reference()
        );
        let id = self.add(page.into_bytes());
        self.pages.push(id);
    }

    /// Serialize: header, body, cross-reference table, trailer.
    pub fn finish(mut self) -> Vec<u8> {
        let kids: Vec<String> = self.pages.iter().map(|p| p.reference()).collect();
        self.objects[self.pages_root.0 - 1] = format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            self.pages.len()
        )
        .into_bytes();
        let catalog = self.add(format!("<< /Type /Catalog /Pages {} >>", self.pages_root.reference()).into_bytes());

        let mut out = Vec::new();
        out.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");

        let mut offsets = Vec::with_capacity(self.objects.len());
        for (i, body) in self.objects.iter().enumerate() {
            offsets.push(out.len());
            out.extend_from_slice(format!("{} 0 obj\n", i + 1).as_bytes());
            out.extend_from_slice(body);
            out.extend_from_slice(b"\nendobj\n");
        }

        let xref_offset = out.len();
        let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", self.objects.len() + 1);
        for offset in offsets {
            let _ = writeln!(xref, "{offset:010} 00000 n ");
        }
        out.extend_from_slice(xref.as_bytes());

        let mut trailer = format!(
            "trailer\n<< /Size {} /Root {}",
            self.objects.len() + 1,
            catalog.reference()
        );
        if let Some(info) = self.info {
            let _ = write!(trailer, " /Info {}", info.reference());
        }
        let _ = write!(trailer, " >>\nstartxref\n{xref_offset}\n%%EOF\n");
        out.extend_from_slice(trailer.as_bytes());
        out
    }
}

/// Escape a string literal for a content stream. Characters outside Latin-1
/// become `?`; Latin-1 characters above ASCII are written as octal escapes.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '(' | ')' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            ' '..='~' => out.push(c),
            '\u{a0}'..='\u{ff}' => {
                let _ = write!(out, "\\{:03o}", c as u32);
            }
            _ => out.push('?'),
        }
    }
    out
}
