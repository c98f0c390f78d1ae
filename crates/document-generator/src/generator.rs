//! Random document generator.

use crate::document::{Document, DocumentType};
use crate::fields::{digit, random_id, random_timestamp};
use crate::text::{ContentOptions, TextGenerator};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use serde_json::{Map, Value};
use tracing::debug;

/// Extensions file records are drawn with.
pub const FILE_EXTENSIONS: [&str; 9] = [
    "pdf", "doc", "docx", "xls", "xlsx", "db", "ppt", "txt", "html",
];

/// Error type for generator operations.
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    /// Content was requested without a text generator to produce it
    #[error("Text generator needed to populate the content field")]
    MissingContentGenerator,

    #[error("Unsupported document type: {0}")]
    UnsupportedType(String),

    #[error("Invalid content options: {0}")]
    InvalidContentOptions(String),
}

/// Produces independent random records of a given [`DocumentType`].
///
/// Unseeded by default; [`with_seed`](Self::with_seed) makes output reproducible.
pub struct DocumentGenerator {
    rng: StdRng,
    content: ContentOptions,
}

impl Default for DocumentGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentGenerator {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
            content: ContentOptions::default(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            content: ContentOptions::default(),
        }
    }

    /// Paragraph bounds used for the `content` attribute.
    pub fn with_content_options(mut self, content: ContentOptions) -> Self {
        self.content = content;
        self
    }

    /// Generate `count` records.
    ///
    /// With `with_content`, every record gets a `content` paragraph from
    /// `text`, which must then be provided. `extra` fields are written last
    /// and override generated ones.
    pub fn generate(
        &mut self,
        doc_type: DocumentType,
        count: usize,
        with_content: bool,
        text: Option<&mut dyn TextGenerator>,
        extra: Option<&Map<String, Value>>,
    ) -> Result<Vec<Document>, GeneratorError> {
        let mut text = match (with_content, text) {
            (true, None) => return Err(GeneratorError::MissingContentGenerator),
            (true, Some(text)) => Some(text),
            (false, _) => None,
        };
        if text.is_some() && self.content.max_sentences.is_empty() {
            return Err(GeneratorError::InvalidContentOptions(format!(
                "empty sentence range {:?}",
                self.content.max_sentences
            )));
        }

        debug!("Generating {doc_type} data - {count}");
        let mut output = Vec::with_capacity(count);
        for _ in 0..count {
            let mut doc = match doc_type {
                DocumentType::File => self.file_record(with_content),
            };
            if let Some(text) = text.as_mut() {
                let max = self.rng.random_range(self.content.max_sentences.clone());
                doc.insert("content", text.paragraph(self.content.min_sentences, max));
            }
            if let Some(extra) = extra {
                doc.merge(extra);
            }
            output.push(doc);
        }
        Ok(output)
    }

    fn file_record(&mut self, with_content: bool) -> Document {
        let rng = &mut self.rng;
        let ext = *FILE_EXTENSIONS.choose(rng).unwrap_or(&"txt");
        let file_name = format!("Automation_{}.{ext}", random_id(rng));
        let folder = format!("E:\\Data_{}", random_id(rng));
        let url = format!("{folder}\\{file_name}");

        let mut doc = Document::new();
        doc.insert(
            "contentid",
            format!(
                "ecd{}cc4518334ba7{}506ab0{}2eccf6ee{}!c97{}fc777165{}f6b585fee0{}1324e3c1{}",
                digit(rng, 9),
                digit(rng, 9),
                digit(rng, 10),
                random_id(rng),
                digit(rng, 10),
                digit(rng, 10),
                digit(rng, 9),
                random_id(rng),
            ),
        );
        doc.insert("Size", random_id(rng));
        doc.insert("FileName", file_name);
        doc.insert("FolderName", folder);
        doc.insert("Url", url);
        doc.insert("ModifiedTime", random_timestamp(rng));
        doc.insert("CommcellNumber", rng.random_range(1_000_000..=9_223_372u64));
        doc.insert("FileChangeTime", random_timestamp(rng));
        doc.insert("ClientId", rng.random_range(0..=2000u64));
        doc.insert("SizeOnDisk", random_id(rng));
        doc.insert("IsFile", 1);
        doc.insert("DocumentType", 1);
        doc.insert("BackupStartTime", random_timestamp(rng));
        doc.insert("ApplicationId", rng.random_range(0..=50_000u64));
        doc.insert("DateAdded", random_timestamp(rng));
        doc.insert("AppType", 33);
        doc.insert("IsVisible", true);
        doc.insert("IsProtected", false);
        doc.insert("IsEncrypted", false);
        doc.insert(
            "ParentGUID",
            format!("14160e45fa06eb5e15bdabaffd6605c4{}", random_id(rng)),
        );
        doc.insert("CAState", 0);
        doc.insert("AchiveFileId", rng.random_range(0..=50_000u64));
        doc.insert("ArchiveFileOffset", random_id(rng));
        doc.insert(
            "ApplicationGUID",
            format!("CCF26F17-ADA8-4C4B-92DF-0AB26A69BD26{}", digit(rng, 20)),
        );
        doc.insert(
            "FileNameModifiedTimeSizeHash",
            format!("2ec9c75002006adf5d18cc5052fc0da8{}", random_id(rng)),
        );
        doc.insert(
            "BackupSetGUID",
            format!("BBDF4C37-5217-4846-9439-9FBE1B0A016C{}", digit(rng, 20)),
        );
        doc.insert(
            "CVObjectGUID",
            format!(
                "ecd5cc{}ba78506ab062eccf6ee",
                rng.random_range(1_111_111..=9_999_999u64)
            ),
        );
        doc.insert("ClientName", format!("dikube{}", digit(rng, 50)));
        doc.insert(
            "FileNameModifiedTimeHash",
            format!("feb897244992a1b14f57d2fca594a823{}", random_id(rng)),
        );
        doc.insert(
            "ClientGUID",
            format!("ACB56956-E5A9-4B81-B92E-FDF12D53C3B9{}", digit(rng, 50)),
        );
        doc.insert(
            "CVTurboGUID",
            format!("c979fc7771656f6b585fee021324e3c1{}", random_id(rng)),
        );
        doc.insert("FileExtension", ext);
        doc.insert("ItemState", 1);
        doc.insert(
            "ContentIndexingStatus",
            if with_content { "1" } else { "0" },
        );
        doc.insert("JobId", rng.random_range(0..=1000u64));
        doc
    }
}
