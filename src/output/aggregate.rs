//! Folding extraction results into an output bundle

use crate::config::{OutputType, SiteSpec};
use crate::output::markdown::MarkdownConverter;
use crate::output::naming::{sanitize, url_file_stem, NameAllocator};
use crate::output::types::{ExtractionResult, OutputBundle, OutputDocument, Section};
use std::collections::HashMap;
use std::sync::Arc;

/// How the aggregator lays out the bundle
#[derive(Debug, Clone)]
pub struct BundleOptions {
    pub mode: OutputType,

    /// File name of the single-mode document
    pub single_file_name: String,
}

/// A successful page after Markdown conversion
struct ConvertedPage {
    url: String,
    site: Arc<SiteSpec>,
    allowed_path: Option<String>,
    title: Option<String>,
    markdown: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum GroupKey {
    /// Pages of one site under one allowed path
    Path { base_url: String, path: String },
    /// A page on its own
    Page(String),
}

/// Builds the output bundle from every result of a run
///
/// Failed results are logged and left out; cancellations are left out
/// quietly. Sections are ordered by URL so the output does not depend on
/// completion order. Pages whose Markdown conversion fails are left out too.
pub fn build_bundle(
    results: Vec<ExtractionResult>,
    options: &BundleOptions,
    converter: &dyn MarkdownConverter,
) -> OutputBundle {
    let pages = convert_pages(results, converter);

    let documents = match options.mode {
        OutputType::Single => vec![OutputDocument {
            file_name: options.single_file_name.clone(),
            sections: pages.into_iter().map(into_section).collect(),
        }],
        OutputType::Separate => separate_documents(pages),
    };

    let documents: Vec<_> = documents
        .into_iter()
        .filter(|doc| !doc.sections.is_empty())
        .collect();

    OutputBundle {
        mode: options.mode,
        documents,
    }
}

fn convert_pages(
    results: Vec<ExtractionResult>,
    converter: &dyn MarkdownConverter,
) -> Vec<ConvertedPage> {
    let mut pages = Vec::new();

    for result in results {
        match result {
            ExtractionResult::Ok {
                url,
                site,
                allowed_path,
                title,
                content,
            } => match converter.convert(&content) {
                Ok(markdown) => pages.push(ConvertedPage {
                    url,
                    site,
                    allowed_path,
                    title,
                    markdown,
                }),
                Err(e) => tracing::warn!("Omitting {}: {}", url, e),
            },
            ExtractionResult::Err { url, kind, detail } => {
                if kind.is_cancellation() {
                    tracing::debug!("Dropping cancelled URL {}", url);
                } else {
                    tracing::warn!("Omitting {} ({} error): {}", url, kind, detail);
                }
            }
        }
    }

    pages.sort_by(|a, b| a.url.cmp(&b.url));
    pages
}

fn into_section(page: ConvertedPage) -> Section {
    Section {
        url: page.url,
        markdown: page.markdown,
    }
}

fn group_key(page: &ConvertedPage) -> GroupKey {
    match &page.allowed_path {
        Some(path) => GroupKey::Path {
            base_url: page.site.base_url.clone(),
            path: path.clone(),
        },
        None => GroupKey::Page(page.url.clone()),
    }
}

/// Groups pages and names one document per group
///
/// Groups keep the order of their first (lowest) URL, which also decides who
/// gets the unsuffixed name when two groups sanitize to the same stem.
fn separate_documents(pages: Vec<ConvertedPage>) -> Vec<OutputDocument> {
    let mut groups: Vec<Vec<ConvertedPage>> = Vec::new();
    let mut index: HashMap<GroupKey, usize> = HashMap::new();

    for page in pages {
        let key = group_key(&page);
        match index.get(&key) {
            Some(&i) => groups[i].push(page),
            None => {
                index.insert(key, groups.len());
                groups.push(vec![page]);
            }
        }
    }

    let mut names = NameAllocator::new();
    let mut documents = Vec::with_capacity(groups.len());

    for group in groups {
        let Some(first) = group.first() else {
            continue;
        };

        let Some(stem) = file_stem(first) else {
            tracing::error!("Cannot derive a file name for {}, skipping its group", first.url);
            continue;
        };

        documents.push(OutputDocument {
            file_name: names.allocate(&stem),
            sections: group.into_iter().map(into_section).collect(),
        });
    }

    documents
}

/// File stem from the page title, falling back to the page URL
fn file_stem(page: &ConvertedPage) -> Option<String> {
    let stem = match page.title.as_deref().map(str::trim) {
        Some(title) if !title.is_empty() => sanitize(title),
        _ => url_file_stem(&page.url)?,
    };

    Some(match page.site.file_name_prefix.as_deref() {
        Some(prefix) if !prefix.trim().is_empty() => sanitize(&format!("{}_{}", prefix, stem)),
        _ => stem,
    })
}
