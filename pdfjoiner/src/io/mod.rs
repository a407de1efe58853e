//! Reading PDFs in and serializing them out.

pub mod reader;
pub mod writer;

pub use reader::{LoadedPdf, PdfInfo, PdfReader, load_document};
pub use writer::{PdfWriter, WriteOptions, WriteStatistics};
