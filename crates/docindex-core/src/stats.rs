use crate::{Category, SearchIndex};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// Record counts for one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageStats {
    /// Page title.
    pub page: String,
    /// Page location without an anchor.
    pub location: String,
    /// Records on the page.
    pub records: usize,
}

/// Summary of an index's contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    /// JavaScript variable the index is assigned to.
    pub variable: String,
    /// Total records.
    pub records: usize,
    /// Records per category. Every category is present.
    pub categories: BTreeMap<Category, usize>,
    /// Pages in the order they first appear.
    pub pages: Vec<PageStats>,
    /// Distinct anchored locations.
    pub anchors: usize,
    /// Bytes of record text.
    pub text_bytes: usize,
}

impl IndexStats {
    /// Count records, pages and anchors.
    pub fn from_index(index: &SearchIndex) -> Self {
        let mut categories: BTreeMap<Category, usize> =
            Category::ALL.into_iter().map(|c| (c, 0)).collect();
        let mut pages: Vec<PageStats> = Vec::new();
        let mut anchors = HashSet::new();
        let mut text_bytes = 0;

        for record in index {
            *categories.entry(record.category).or_default() += 1;
            text_bytes += record.text.len();

            if record.anchor().is_some() {
                anchors.insert(record.location.as_str());
            }

            let location = record.page_path();
            match pages
                .iter_mut()
                .find(|p| p.page == record.page && p.location == location)
            {
                Some(page) => page.records += 1,
                None => pages.push(PageStats {
                    page: record.page.clone(),
                    location: location.to_string(),
                    records: 1,
                }),
            }
        }

        Self {
            variable: index.variable().to_string(),
            records: index.len(),
            categories,
            pages,
            anchors: anchors.len(),
            text_bytes,
        }
    }

    /// Records of one category.
    pub fn count(&self, category: Category) -> usize {
        self.categories.get(&category).copied().unwrap_or(0)
    }
}
