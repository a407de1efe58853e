//! Page copying and page tree assembly.
//!
//! [`OutputDocument`] is the document a merge builds. Pages from a source
//! document are first copied in (together with everything they reference)
//! and then appended to the output page tree, one by one and in order:
//!
//! ```no_run
//! # use pdfjoiner::merge::pages::OutputDocument;
//! # fn example(source: lopdf::Document) -> pdfjoiner::Result<()> {
//! let mut output = OutputDocument::new();
//! for page in output.copy_pages(source)? {
//!     output.append_page(page)?;
//! }
//! # Ok(())
//! # }
//! ```

use lopdf::{Dictionary, Document, Object, ObjectId, dictionary};
use std::collections::HashSet;

use crate::error::{JoinerError, Result};

/// PDF version of the merged document.
pub const OUTPUT_PDF_VERSION: &str = "1.7";

/// Page attributes a page may inherit from its ancestors in the page tree.
pub const INHERITABLE_PAGE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

// Guards against Parent cycles in malformed page trees.
const MAX_PAGE_TREE_DEPTH: usize = 64;

/// A page copied into an [`OutputDocument`] but not necessarily appended yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageRef(ObjectId);

impl PageRef {
    /// Object id of the page dictionary in the output document.
    pub fn object_id(&self) -> ObjectId {
        self.0
    }
}

/// The document being assembled by a merge.
#[derive(Debug)]
pub struct OutputDocument {
    document: Document,
    pages_id: ObjectId,
}

impl OutputDocument {
    /// Create an empty document: a catalog and a page tree with no pages.
    pub fn new() -> Self {
        let mut document = Document::with_version(OUTPUT_PDF_VERSION);
        let pages_id = document.new_object_id();

        document.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => Vec::<Object>::new(),
                "Count" => 0,
            }),
        );

        let catalog_id = document.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        document.trailer.set("Root", catalog_id);

        Self { document, pages_id }
    }

    /// Id of the root page tree node.
    pub fn pages_id(&self) -> ObjectId {
        self.pages_id
    }

    /// Number of pages appended so far.
    pub fn page_count(&self) -> usize {
        self.document
            .get_dictionary(self.pages_id)
            .and_then(|pages| pages.get(b"Kids"))
            .and_then(Object::as_array)
            .map_or(0, Vec::len)
    }

    /// Borrow the document under construction.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Finish assembly and take the document.
    pub fn into_document(self) -> Document {
        self.document
    }

    /// Copy every page of `source`, in the source's page order.
    ///
    /// Objects of `source` are renumbered past the ids already in use, so
    /// nothing copied collides with earlier content. Each page is detached
    /// from its old page tree: inherited attributes are written onto the page
    /// itself and the Parent link is dropped. Only objects reachable from the
    /// copied pages are brought over; the source catalog, outlines and page
    /// tree nodes stay behind. Pages are taken from [`page_ids`], so a page
    /// reached twice through a malformed page tree is copied once.
    ///
    /// The returned pages are not part of the page tree until passed to
    /// [`append_page`](Self::append_page).
    ///
    /// # Errors
    ///
    /// Returns [`JoinerError::MergeFailed`] if a page object is not a dictionary.
    pub fn copy_pages(&mut self, mut source: Document) -> Result<Vec<PageRef>> {
        source.renumber_objects_with(self.document.max_id + 1);

        let page_ids = page_ids(&source);
        let mut copied = Vec::with_capacity(page_ids.len());

        for page_id in page_ids {
            let page = Object::Dictionary(detach_page(&source, page_id)?);
            copy_references(&mut self.document, &source, &page);
            self.document.objects.insert(page_id, page);
            copied.push(PageRef(page_id));
        }

        self.document.max_id = self.document.max_id.max(source.max_id);

        Ok(copied)
    }

    /// Append a copied page to the end of the page tree.
    ///
    /// # Errors
    ///
    /// Returns [`JoinerError::MergeFailed`] if the page was not copied into
    /// this document or the page tree is malformed.
    pub fn append_page(&mut self, page: PageRef) -> Result<()> {
        let pages_id = self.pages_id;

        self.document
            .get_dictionary_mut(page.0)
            .map_err(|e| JoinerError::merge_failed(format!("Unknown page {:?}: {e}", page.0)))?
            .set("Parent", pages_id);

        let pages = self
            .document
            .get_dictionary_mut(pages_id)
            .map_err(|e| JoinerError::merge_failed(format!("Page tree root missing: {e}")))?;

        pages
            .get_mut(b"Kids")
            .and_then(Object::as_array_mut)
            .map_err(|e| JoinerError::merge_failed(format!("Page tree has no Kids: {e}")))?
            .push(Object::Reference(page.0));

        let count = pages.get(b"Count").and_then(Object::as_i64).unwrap_or(0);
        pages.set("Count", count + 1);

        Ok(())
    }
}

impl Default for OutputDocument {
    fn default() -> Self {
        Self::new()
    }
}

/// Page object ids of `document` in page order, each listed once.
///
/// A page tree whose Kids point back at an ancestor makes the same page
/// show up again; only its first position counts.
pub fn page_ids(document: &Document) -> Vec<ObjectId> {
    let mut seen = HashSet::new();
    document
        .page_iter()
        .filter(|page_id| seen.insert(*page_id))
        .collect()
}

/// Clone a page dictionary with inherited attributes made explicit.
fn detach_page(source: &Document, page_id: ObjectId) -> Result<Dictionary> {
    let mut page = source
        .get_dictionary(page_id)
        .map_err(|e| {
            JoinerError::merge_failed(format!("Page {page_id:?} is not a dictionary: {e}"))
        })?
        .clone();

    for key in INHERITABLE_PAGE_KEYS {
        if !page.has(key)
            && let Some(value) = inherited_attribute(source, &page, key)
        {
            page.set(key, value);
        }
    }

    page.remove(b"Parent");
    Ok(page)
}

/// Walk the Parent chain looking for an attribute.
fn inherited_attribute(source: &Document, page: &Dictionary, key: &[u8]) -> Option<Object> {
    let mut parent_id = page.get(b"Parent").and_then(Object::as_reference).ok()?;

    for _ in 0..MAX_PAGE_TREE_DEPTH {
        let node = source.get_dictionary(parent_id).ok()?;
        if let Ok(value) = node.get(key) {
            return Some(value.clone());
        }
        parent_id = node.get(b"Parent").and_then(Object::as_reference).ok()?;
    }

    None
}

/// Copy every object reachable from `root` that `target` does not have yet.
///
/// Page tree nodes and catalogs are never followed, which keeps the old page
/// tree (and through it every other page of the source) out of the output.
fn copy_references(target: &mut Document, source: &Document, root: &Object) {
    let mut pending = Vec::new();
    collect_references(root, &mut pending);

    while let Some(id) = pending.pop() {
        if target.objects.contains_key(&id) {
            continue;
        }
        let Some(object) = source.objects.get(&id) else {
            continue;
        };
        if is_structural(object) {
            continue;
        }

        target.objects.insert(id, object.clone());
        collect_references(object, &mut pending);
    }
}

fn collect_references(object: &Object, pending: &mut Vec<ObjectId>) {
    match object {
        Object::Reference(id) => pending.push(*id),
        Object::Array(items) => {
            for item in items {
                collect_references(item, pending);
            }
        }
        Object::Dictionary(dict) => collect_dictionary_references(dict, pending),
        Object::Stream(stream) => collect_dictionary_references(&stream.dict, pending),
        _ => {}
    }
}

fn collect_dictionary_references(dict: &Dictionary, pending: &mut Vec<ObjectId>) {
    for (_, value) in dict.iter() {
        collect_references(value, pending);
    }
}

fn is_structural(object: &Object) -> bool {
    let Object::Dictionary(dict) = object else {
        return false;
    };
    matches!(
        dict.get(b"Type").and_then(Object::as_name),
        Ok(b"Pages") | Ok(b"Catalog")
    )
}
