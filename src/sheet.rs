//! # Label Sheet Output
//!
//! Collects rendered labels as pages of one PDF document. Every page is
//! exactly the physical label size and shows one label image scaled to
//! cover the whole page.
//!
//! ## PDF Structure
//!
//! ```text
//! Catalog -> Pages -> Page (MediaBox 0 0 144 144)
//!                       |- Contents: q 144 0 0 144 0 0 cm /Im0 Do Q
//!                       '- Resources: XObject /Im0 (RGB, 8 bpc, FlateDecode)
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::ZlibEncoder;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};

use crate::error::LabelError;
use crate::render::LabelCanvas;

/// Anything that accepts finished labels, one page each.
pub trait PageSink {
    fn add_page(&mut self, label: &LabelCanvas) -> Result<(), LabelError>;
}

/// Keep labels in memory (previews and tests).
impl PageSink for Vec<LabelCanvas> {
    fn add_page(&mut self, label: &LabelCanvas) -> Result<(), LabelError> {
        self.push(label.clone());
        Ok(())
    }
}

/// Name of the label image inside each page's resources.
const IMAGE_NAME: &str = "Im0";

/// A multi-page PDF of labels, built in memory and written on [`save`].
///
/// [`save`]: SheetWriter::save
pub struct SheetWriter {
    document: Document,
    pages_id: ObjectId,
    page_ids: Vec<ObjectId>,
    page_size_pt: f32,
}

impl SheetWriter {
    /// Start an empty document whose pages are `page_size_pt` points square.
    pub fn new(page_size_pt: f32) -> Self {
        let mut document = Document::with_version("1.7");
        let pages_id = document.new_object_id();

        let pages_dict = dictionary! {
            "Type" => "Pages",
            "Kids" => vec![],
            "Count" => 0,
        };
        document
            .objects
            .insert(pages_id, Object::Dictionary(pages_dict));

        let catalog_id = document.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        document.trailer.set("Root", catalog_id);

        Self {
            document,
            pages_id,
            page_ids: Vec::new(),
            page_size_pt,
        }
    }

    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Write the document to `path`, replacing any existing file.
    pub fn save(self, path: &Path) -> Result<(), LabelError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)?;
        writer.flush()?;
        tracing::info!(path = %path.display(), "Saved label sheet");
        Ok(())
    }

    /// Serialize the document into `writer`.
    pub fn write_to<W: Write>(mut self, writer: &mut W) -> Result<(), LabelError> {
        if let Some(Object::Dictionary(pages_dict)) = self.document.objects.get_mut(&self.pages_id)
        {
            let kids: Vec<Object> = self.page_ids.iter().map(|id| Object::from(*id)).collect();
            pages_dict.set("Kids", kids);
            pages_dict.set("Count", self.page_ids.len() as i64);
        }

        self.document
            .save_to(writer)
            .map_err(|e| LabelError::Pdf(format!("Failed to write PDF: {}", e)))?;
        Ok(())
    }

    fn image_stream(label: &LabelCanvas) -> Result<Stream, LabelError> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(label.as_raw())?;
        let compressed = encoder.finish()?;

        Ok(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => label.width() as i64,
                "Height" => label.height() as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "FlateDecode",
            },
            compressed,
        ))
    }
}

impl PageSink for SheetWriter {
    fn add_page(&mut self, label: &LabelCanvas) -> Result<(), LabelError> {
        let size = self.page_size_pt;

        let image_id = self.document.add_object(Self::image_stream(label)?);

        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        size.into(),
                        0.into(),
                        0.into(),
                        size.into(),
                        0.into(),
                        0.into(),
                    ],
                ),
                Operation::new("Do", vec![IMAGE_NAME.into()]),
                Operation::new("Q", vec![]),
            ],
        };
        let encoded = content
            .encode()
            .map_err(|e| LabelError::Pdf(format!("Failed to encode page content: {}", e)))?;
        let content_id = self
            .document
            .add_object(Stream::new(Dictionary::new(), encoded));

        let page_id = self.document.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![0.into(), 0.into(), size.into(), size.into()],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "XObject" => dictionary! {
                    IMAGE_NAME => image_id,
                },
            },
        });
        self.page_ids.push(page_id);

        tracing::debug!(page = self.page_ids.len(), "Added label page");
        Ok(())
    }
}

/// Forwards every page to an inner sink and also saves it as a numbered
/// PNG in `dir`.
pub struct PngPreview<'a, P: PageSink + ?Sized> {
    inner: &'a mut P,
    dir: PathBuf,
    written: usize,
}

impl<'a, P: PageSink + ?Sized> PngPreview<'a, P> {
    /// Wrap `inner`, creating `dir` if needed.
    pub fn new(inner: &'a mut P, dir: &Path) -> Result<Self, LabelError> {
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            inner,
            dir: dir.to_path_buf(),
            written: 0,
        })
    }
}

impl<P: PageSink + ?Sized> PageSink for PngPreview<'_, P> {
    fn add_page(&mut self, label: &LabelCanvas) -> Result<(), LabelError> {
        self.written += 1;
        let path = self.dir.join(format!("label-{:03}.png", self.written));
        label
            .save(&path)
            .map_err(|e| LabelError::Image(format!("Failed to save PNG: {}", e)))?;
        self.inner.add_page(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use pretty_assertions::assert_eq;

    fn label(shade: u8) -> LabelCanvas {
        RgbImage::from_pixel(24, 24, Rgb([shade, shade, shade]))
    }

    fn render(writer: SheetWriter) -> Vec<u8> {
        let mut bytes = Vec::new();
        writer.write_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_pages_counted() {
        let mut writer = SheetWriter::new(144.0);
        writer.add_page(&label(0)).unwrap();
        writer.add_page(&label(255)).unwrap();
        assert_eq!(writer.page_count(), 2);

        let bytes = render(writer);
        assert!(bytes.starts_with(b"%PDF-1.7"));

        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 2);
    }

    #[test]
    fn test_page_media_box() {
        let mut writer = SheetWriter::new(144.0);
        writer.add_page(&label(128)).unwrap();
        let doc = Document::load_mem(&render(writer)).unwrap();

        let (_, page_id) = doc.get_pages().into_iter().next().unwrap();
        let page = doc.get_dictionary(page_id).unwrap();
        let media_box = page.get(b"MediaBox").unwrap().as_array().unwrap();
        let values: Vec<f32> = media_box.iter().map(|o| o.as_float().unwrap()).collect();
        assert_eq!(values, vec![0.0, 0.0, 144.0, 144.0]);
    }

    #[test]
    fn test_empty_sheet_is_valid() {
        let writer = SheetWriter::new(144.0);
        let doc = Document::load_mem(&render(writer)).unwrap();
        assert_eq!(doc.get_pages().len(), 0);
    }

    #[test]
    fn test_save_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.pdf");

        let mut writer = SheetWriter::new(144.0);
        writer.add_page(&label(0)).unwrap();
        writer.save(&path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_png_preview_forwards() {
        let dir = tempfile::tempdir().unwrap();
        let mut pages: Vec<LabelCanvas> = Vec::new();
        {
            let mut preview = PngPreview::new(&mut pages, dir.path()).unwrap();
            preview.add_page(&label(0)).unwrap();
            preview.add_page(&label(50)).unwrap();
        }
        assert_eq!(pages.len(), 2);
        assert!(dir.path().join("label-001.png").exists());
        assert!(dir.path().join("label-002.png").exists());
    }

    #[test]
    fn test_vec_sink_keeps_labels() {
        let mut sink: Vec<LabelCanvas> = Vec::new();
        sink.add_page(&label(10)).unwrap();
        sink.add_page(&label(20)).unwrap();
        assert_eq!(sink.len(), 2);
        assert_eq!(sink[1].get_pixel(0, 0).0, [20, 20, 20]);
    }
}
