//! Shared helpers for integration tests.
//!
//! PDFs are built in memory with lopdf. Every page draws the text
//! `<label>-<n>` so tests can check page order after a merge.

#![allow(dead_code)]

use lopdf::{Document, Object, ObjectId, Stream, dictionary};
use pdfjoiner::selection::{CandidateFile, PDF_MIME_TYPE};
use std::path::{Path, PathBuf};

fn content_stream(doc: &mut Document, label: &str, n: usize) -> ObjectId {
    let content = format!("BT /F1 18 Tf 72 720 Td ({label}-{n}) Tj ET");
    doc.add_object(Stream::new(dictionary! {}, content.into_bytes()))
}

fn font(doc: &mut Document) -> ObjectId {
    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    })
}

fn finish(mut doc: Document, pages_id: ObjectId) -> Vec<u8> {
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("serialize test PDF");
    bytes
}

/// A flat PDF with `pages` letter-sized pages.
pub fn build_pdf(label: &str, pages: usize) -> Vec<u8> {
    let mut doc = Document::with_version("1.4");
    let pages_id = doc.new_object_id();
    let font_id = font(&mut doc);

    let mut kids: Vec<Object> = Vec::new();
    for n in 1..=pages {
        let contents = content_stream(&mut doc, label, n);
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
            "Contents" => contents,
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );

    finish(doc, pages_id)
}

/// A PDF whose pages sit under an intermediate page tree node that carries
/// the Resources, MediaBox and Rotate of its pages.
pub fn build_nested_pdf(label: &str, pages: usize) -> Vec<u8> {
    let mut doc = Document::with_version("1.6");
    let root_id = doc.new_object_id();
    let branch_id = doc.new_object_id();
    let font_id = font(&mut doc);

    let mut kids: Vec<Object> = Vec::new();
    for n in 1..=pages {
        let contents = content_stream(&mut doc, label, n);
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => branch_id,
            "Contents" => contents,
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        branch_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Parent" => root_id,
            "Kids" => kids,
            "Count" => pages as i64,
            "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
            "Rotate" => 90,
        }),
    );
    doc.objects.insert(
        root_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![branch_id.into()],
            "Count" => pages as i64,
            "MediaBox" => vec![0.into(), 0.into(), 420.into(), 595.into()],
        }),
    );

    finish(doc, root_id)
}

/// A PDF where the first page links to the last one.
pub fn build_linked_pdf(label: &str, pages: usize) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = font(&mut doc);

    let page_ids: Vec<ObjectId> = (0..pages).map(|_| doc.new_object_id()).collect();
    for (i, page_id) in page_ids.iter().enumerate() {
        let contents = content_stream(&mut doc, label, i + 1);
        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
            "Contents" => contents,
        };
        if i == 0
            && let Some(last) = page_ids.last()
        {
            let link = doc.add_object(dictionary! {
                "Type" => "Annot",
                "Subtype" => "Link",
                "Rect" => vec![0.into(), 0.into(), 100.into(), 20.into()],
                "Dest" => vec![(*last).into(), "Fit".into()],
            });
            page.set("Annots", vec![Object::Reference(link)]);
        }
        doc.objects.insert(*page_id, Object::Dictionary(page));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => page_ids.iter().map(|id| Object::Reference(*id)).collect::<Vec<_>>(),
            "Count" => pages as i64,
        }),
    );

    finish(doc, pages_id)
}

/// An in-memory candidate typed as PDF.
pub fn pdf_file(label: &str, pages: usize) -> CandidateFile {
    CandidateFile::from_bytes(
        format!("{label}.pdf"),
        PDF_MIME_TYPE,
        build_pdf(label, pages),
    )
}

/// Write a PDF into `dir` and return its path.
pub fn write_pdf(dir: &Path, label: &str, pages: usize) -> PathBuf {
    let path = dir.join(format!("{label}.pdf"));
    std::fs::write(&path, build_pdf(label, pages)).expect("write test PDF");
    path
}

/// The `<label>-<n>` text of every page, in page order.
pub fn page_labels(bytes: &[u8]) -> Vec<String> {
    let doc = Document::load_mem(bytes).expect("merged output parses");
    doc.get_pages()
        .values()
        .map(|page_id| {
            let content = doc.get_page_content(*page_id).expect("page content");
            let text = String::from_utf8_lossy(&content).into_owned();
            let start = text.find('(').expect("text operator") + 1;
            let end = start + text[start..].find(')').expect("closing paren");
            text[start..end].to_string()
        })
        .collect()
}

/// File names in `dir`, sorted.
pub fn dir_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("read dir")
        .map(|entry| {
            entry
                .expect("dir entry")
                .file_name()
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    names.sort();
    names
}
