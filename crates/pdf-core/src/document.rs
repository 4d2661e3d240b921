//! PDF Document wrapper

use crate::image::ImageXObject;
use crate::{PdfError, Result};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

/// Page size used when no MediaBox can be found (US Letter, in points)
pub const DEFAULT_PAGE_SIZE: (f64, f64) = (612.0, 792.0);

/// Maximum depth followed up the Pages tree when resolving inherited attributes
const MAX_INHERITANCE_DEPTH: usize = 10;

/// Physical geometry of a page, in points (1/72 inch)
///
/// `x0`/`y0` is the lower-left corner of the MediaBox. Overlay coordinates
/// are relative to that corner, with y growing upward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub x0: f64,
    pub y0: f64,
    pub width: f64,
    pub height: f64,
}

impl PageGeometry {
    /// Geometry of a page whose MediaBox starts at the origin
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            x0: 0.0,
            y0: 0.0,
            width,
            height,
        }
    }

    /// Build from a `[llx lly urx ury]` rectangle, normalizing swapped corners
    pub fn from_rect(rect: [f64; 4]) -> Self {
        let [a, b, c, d] = rect;
        Self {
            x0: a.min(c),
            y0: b.min(d),
            width: (c - a).abs(),
            height: (d - b).abs(),
        }
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE.0, DEFAULT_PAGE_SIZE.1)
    }
}

/// Content to be drawn on top of a single page
///
/// `content` is a content stream fragment in the page's default user space.
/// Any image it paints via `Do` must be listed in `images` under the same
/// resource name.
#[derive(Debug, Clone)]
pub struct PageOverlay {
    pub geometry: PageGeometry,
    pub content: Vec<u8>,
    pub images: Vec<(String, ImageXObject)>,
}

impl PageOverlay {
    /// Create an overlay made of vector operators only
    pub fn new(geometry: PageGeometry, content: Vec<u8>) -> Self {
        Self {
            geometry,
            content,
            images: Vec::new(),
        }
    }

    /// Attach an image XObject referenced by the overlay content
    pub fn with_image(mut self, name: impl Into<String>, image: ImageXObject) -> Self {
        self.images.push((name.into(), image));
        self
    }
}

/// PDF Document wrapper providing high-level operations
pub struct PdfDocument {
    /// The underlying lopdf document
    inner: Document,
}

impl PdfDocument {
    /// Open a PDF document from bytes
    ///
    /// # Arguments
    /// * `data` - PDF file bytes
    pub fn open_from_bytes(data: &[u8]) -> Result<Self> {
        let inner = Document::load_mem(data).map_err(|e| PdfError::OpenError(e.to_string()))?;
        Ok(Self { inner })
    }

    /// Create a document holding one empty page of the given geometry
    pub fn blank(geometry: PageGeometry) -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let contents_id = doc.add_object(Stream::new(Dictionary::new(), Vec::new()));
        let mut page_dict = Dictionary::new();
        page_dict.set("Type", Object::Name(b"Page".to_vec()));
        page_dict.set("Parent", Object::Reference(pages_id));
        page_dict.set(
            "MediaBox",
            Object::Array(vec![
                Object::Real(geometry.x0 as f32),
                Object::Real(geometry.y0 as f32),
                Object::Real((geometry.x0 + geometry.width) as f32),
                Object::Real((geometry.y0 + geometry.height) as f32),
            ]),
        );
        page_dict.set("Resources", Object::Dictionary(Dictionary::new()));
        page_dict.set("Contents", Object::Reference(contents_id));
        let page_id = doc.add_object(Object::Dictionary(page_dict));

        let mut pages_dict = Dictionary::new();
        pages_dict.set("Type", Object::Name(b"Pages".to_vec()));
        pages_dict.set("Kids", Object::Array(vec![Object::Reference(page_id)]));
        pages_dict.set("Count", Object::Integer(1));
        doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

        let mut catalog = Dictionary::new();
        catalog.set("Type", Object::Name(b"Catalog".to_vec()));
        catalog.set("Pages", Object::Reference(pages_id));
        let catalog_id = doc.add_object(Object::Dictionary(catalog));
        doc.trailer.set("Root", Object::Reference(catalog_id));

        Self { inner: doc }
    }

    /// Render an overlay on its own blank page
    pub fn from_overlay(overlay: &PageOverlay) -> Result<Self> {
        let mut doc = Self::blank(overlay.geometry);
        doc.stamp_page(1, overlay)?;
        Ok(doc)
    }

    /// Get the number of pages in the document
    pub fn page_count(&self) -> usize {
        self.inner.get_pages().len()
    }

    /// Get the physical geometry of a page
    ///
    /// # Arguments
    /// * `page` - Page number (1-indexed)
    pub fn page_geometry(&self, page: usize) -> Result<PageGeometry> {
        let page_id = self.page_id(page)?;
        match self.inherited_attribute(page_id, b"MediaBox")? {
            Some(media_box) => Ok(PageGeometry::from_rect(self.rect_from_object(media_box)?)),
            None => Ok(PageGeometry::default()),
        }
    }

    /// Draw an overlay on top of a page's existing content
    ///
    /// The original content streams are kept byte-for-byte. The page's
    /// `Contents` becomes `[q, original..., Q + overlay]`, so state left
    /// behind by the original content cannot move the overlay.
    ///
    /// # Arguments
    /// * `page` - Page number (1-indexed)
    /// * `overlay` - Content to draw
    pub fn stamp_page(&mut self, page: usize, overlay: &PageOverlay) -> Result<()> {
        let page_id = self.page_id(page)?;

        if !overlay.images.is_empty() {
            self.add_images_to_page_resources(page_id, &overlay.images)?;
        }

        let existing = self.content_references(page_id)?;

        let open_id = self
            .inner
            .add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
        let mut tail = b"\nQ\n".to_vec();
        tail.extend_from_slice(&overlay.content);
        let close_id = self.inner.add_object(Stream::new(Dictionary::new(), tail));

        let mut contents = Vec::with_capacity(existing.len() + 2);
        contents.push(Object::Reference(open_id));
        contents.extend(existing);
        contents.push(Object::Reference(close_id));

        let page_dict = self
            .inner
            .get_object_mut(page_id)?
            .as_dict_mut()
            .map_err(|_| PdfError::ParseError("Page object is not a dictionary".to_string()))?;
        page_dict.set("Contents", Object::Array(contents));

        Ok(())
    }

    /// Flate-compress every stream that is not compressed yet
    pub fn compress(&mut self) {
        self.inner.compress();
    }

    /// Save the document to bytes
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.inner
            .save_to(&mut buffer)
            .map_err(|e| PdfError::SaveError(e.to_string()))?;
        Ok(buffer)
    }

    /// Get a reference to the underlying lopdf document
    pub fn inner(&self) -> &Document {
        &self.inner
    }

    /// Resolve a 1-indexed page number to its object ID
    fn page_id(&self, page: usize) -> Result<ObjectId> {
        let pages = self.inner.get_pages();
        pages
            .get(&(page as u32))
            .copied()
            .ok_or(PdfError::InvalidPage(page, pages.len()))
    }

    /// Look up a page attribute, following the Parent chain for inherited values
    ///
    /// References are resolved, so the returned object is never a `Reference`.
    fn inherited_attribute(&self, page_id: ObjectId, key: &[u8]) -> Result<Option<&Object>> {
        let mut current_id = page_id;

        for _ in 0..MAX_INHERITANCE_DEPTH {
            let dict = self
                .inner
                .get_object(current_id)?
                .as_dict()
                .map_err(|_| PdfError::ParseError("Object is not a dictionary".to_string()))?;

            if let Ok(value) = dict.get(key) {
                return match value {
                    Object::Reference(ref_id) => Ok(Some(self.inner.get_object(*ref_id)?)),
                    other => Ok(Some(other)),
                };
            }

            match dict.get(b"Parent") {
                Ok(Object::Reference(parent_id)) => current_id = *parent_id,
                _ => break,
            }
        }

        Ok(None)
    }

    /// Read a 4-number rectangle array
    fn rect_from_object(&self, object: &Object) -> Result<[f64; 4]> {
        let array = object
            .as_array()
            .map_err(|_| PdfError::ParseError("MediaBox is not an array".to_string()))?;
        if array.len() != 4 {
            return Err(PdfError::ParseError("Invalid MediaBox format".to_string()));
        }

        let mut rect = [0.0; 4];
        for (slot, value) in rect.iter_mut().zip(array) {
            *slot = self
                .number(value)
                .ok_or_else(|| PdfError::ParseError("Invalid MediaBox value".to_string()))?;
        }
        Ok(rect)
    }

    fn number(&self, object: &Object) -> Option<f64> {
        match object {
            Object::Integer(i) => Some(*i as f64),
            Object::Real(r) => Some(f64::from(*r)),
            Object::Reference(id) => self.inner.get_object(*id).ok().and_then(|o| self.number(o)),
            _ => None,
        }
    }

    /// Collect a page's content streams as references, in drawing order
    ///
    /// Direct (inline) streams are moved into indirect objects so they can
    /// sit in a Contents array.
    fn content_references(&mut self, page_id: ObjectId) -> Result<Vec<Object>> {
        let contents = {
            let page_dict = self
                .inner
                .get_object(page_id)?
                .as_dict()
                .map_err(|_| PdfError::ParseError("Page object is not a dictionary".to_string()))?;
            match page_dict.get(b"Contents") {
                Ok(contents) => contents.clone(),
                Err(_) => return Ok(Vec::new()),
            }
        };

        let mut references = Vec::new();
        match contents {
            Object::Reference(ref_id) => match self.inner.get_object(ref_id)? {
                // Contents may point at an indirect array of streams
                Object::Array(items) => references.extend(items.iter().cloned()),
                _ => references.push(Object::Reference(ref_id)),
            },
            Object::Array(items) => {
                for item in items {
                    match item {
                        Object::Stream(stream) => {
                            references.push(Object::Reference(self.inner.add_object(stream)))
                        }
                        other => references.push(other),
                    }
                }
            }
            Object::Stream(stream) => {
                references.push(Object::Reference(self.inner.add_object(stream)));
            }
            _ => {}
        }

        Ok(references)
    }

    /// Add image XObjects to a page's Resources dictionary
    ///
    /// Inherited resources are copied onto the page first so that the page
    /// keeps seeing everything its original content uses.
    fn add_images_to_page_resources(
        &mut self,
        page_id: ObjectId,
        images: &[(String, ImageXObject)],
    ) -> Result<()> {
        let mut resources_dict = match self.inherited_attribute(page_id, b"Resources")? {
            Some(resources) => resources
                .as_dict()
                .cloned()
                .unwrap_or_else(|_| Dictionary::new()),
            None => Dictionary::new(),
        };

        let mut xobject_dict = match resources_dict.get(b"XObject") {
            Ok(Object::Dictionary(dict)) => dict.clone(),
            Ok(Object::Reference(ref_id)) => self
                .inner
                .get_object(*ref_id)
                .and_then(Object::as_dict)
                .cloned()
                .unwrap_or_else(|_| Dictionary::new()),
            _ => Dictionary::new(),
        };

        for (name, image) in images {
            if xobject_dict.has(name.as_bytes()) {
                return Err(PdfError::ImageError(format!(
                    "XObject resource name {name} is already in use"
                )));
            }
            let image_id = self.inner.add_object(image.to_pdf_stream());
            xobject_dict.set(name.as_bytes(), Object::Reference(image_id));
        }

        resources_dict.set("XObject", Object::Dictionary(xobject_dict));

        let page_dict = self
            .inner
            .get_object_mut(page_id)?
            .as_dict_mut()
            .map_err(|_| PdfError::ParseError("Page object is not a dictionary".to_string()))?;
        page_dict.set("Resources", Object::Dictionary(resources_dict));

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_from_rect_normalizes() {
        let geometry = PageGeometry::from_rect([612.0, 792.0, 0.0, 0.0]);
        assert_eq!(geometry, PageGeometry::new(612.0, 792.0));
    }

    #[test]
    fn test_geometry_from_rect_offset_origin() {
        let geometry = PageGeometry::from_rect([10.0, 20.0, 110.0, 220.0]);
        assert_eq!(geometry.x0, 10.0);
        assert_eq!(geometry.y0, 20.0);
        assert_eq!(geometry.width, 100.0);
        assert_eq!(geometry.height, 200.0);
    }

    #[test]
    fn test_blank_document_geometry() {
        let doc = PdfDocument::blank(PageGeometry::new(200.0, 300.0));
        assert_eq!(doc.page_count(), 1);
        assert_eq!(doc.page_geometry(1).unwrap(), PageGeometry::new(200.0, 300.0));
    }

    #[test]
    fn test_page_geometry_invalid_page() {
        let doc = PdfDocument::blank(PageGeometry::default());
        assert!(matches!(
            doc.page_geometry(2),
            Err(PdfError::InvalidPage(2, 1))
        ));
        assert!(matches!(
            doc.page_geometry(0),
            Err(PdfError::InvalidPage(0, 1))
        ));
    }

    #[test]
    fn test_from_overlay_draws_content() {
        let overlay = PageOverlay::new(PageGeometry::new(100.0, 100.0), b"0 g 1 1 5 5 re f\n".to_vec());
        let doc = PdfDocument::from_overlay(&overlay).unwrap();

        let page_id = doc.page_id(1).unwrap();
        let content = doc.inner().get_page_content(page_id).unwrap();
        let content = String::from_utf8(content).unwrap();
        assert!(content.starts_with("q\n"));
        assert!(content.contains("0 g 1 1 5 5 re f"));
    }
}
