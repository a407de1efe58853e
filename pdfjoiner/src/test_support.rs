//! Small in-memory PDFs for unit tests.
//!
//! Each page draws the text `<label>-<n>` and has a MediaBox width of
//! `100 + n`, so page order survives any renumbering. Fonts live on the page
//! tree root and are only reachable through inheritance.

use lopdf::{Document, Object, ObjectId, Stream, dictionary};

use crate::selection::{CandidateFile, PDF_MIME_TYPE};

pub(crate) fn sample_document(label: &str, pages: usize) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages);
    for n in 1..=pages {
        let content = format!("BT /F1 12 Tf 20 20 Td ({label}-{n}) Tj ET");
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), (100 + n as i64).into(), 792.into()],
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
            "Resources" => resources_id,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    doc
}

/// A document whose page tree root lists itself among its Kids.
pub(crate) fn looped_document(label: &str, pages: usize) -> Document {
    let mut doc = sample_document(label, pages);
    let root = doc
        .catalog()
        .and_then(|catalog| catalog.get(b"Pages"))
        .and_then(Object::as_reference)
        .unwrap();
    doc.get_dictionary_mut(root)
        .and_then(|pages| pages.get_mut(b"Kids"))
        .and_then(Object::as_array_mut)
        .unwrap()
        .push(Object::Reference(root));
    doc
}

pub(crate) fn sample_pdf(label: &str, pages: usize) -> Vec<u8> {
    let mut doc = sample_document(label, pages);
    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

pub(crate) fn sample_file(label: &str, pages: usize) -> CandidateFile {
    CandidateFile::from_bytes(
        format!("{label}.pdf"),
        PDF_MIME_TYPE,
        sample_pdf(label, pages),
    )
}

pub(crate) fn page_label(doc: &Document, page_id: ObjectId) -> String {
    let content = doc.get_page_content(page_id).unwrap();
    let text = String::from_utf8_lossy(&content);
    let start = text.find('(').unwrap() + 1;
    let end = text[start..].find(')').unwrap() + start;
    text[start..end].to_string()
}

pub(crate) fn page_labels(doc: &Document) -> Vec<String> {
    doc.get_pages()
        .values()
        .map(|page_id| page_label(doc, *page_id))
        .collect()
}
