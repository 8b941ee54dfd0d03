use include_dir::{include_dir, Dir};
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

static VOCAB_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/vocab");

/// A single prompt: what is shown, what is read, and an optional gloss.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct VocabItem {
    pub word: String,
    pub reading: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl VocabItem {
    pub fn new(word: &str, reading: &str) -> Self {
        Self {
            word: word.to_string(),
            reading: reading.to_string(),
            hint: None,
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub icon: String,
    #[serde(default)]
    pub description: String,
    pub words: Vec<VocabItem>,
}

impl Category {
    pub fn to_ref(&self) -> CategoryRef {
        CategoryRef {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }
}

/// What a finished session remembers about its category.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct CategoryRef {
    pub id: String,
    pub name: String,
}

/// Ordered, read-only list of categories.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    categories: Vec<Category>,
}

impl Catalog {
    /// The catalog compiled into the binary, one category per file, ordered by file name.
    pub fn embedded() -> Result<Self, CatalogError> {
        let mut files: Vec<_> = VOCAB_DIR.files().collect();
        if files.is_empty() {
            return Err(CatalogError::MissingFile("src/vocab/*.json".to_string()));
        }
        files.sort_by(|a, b| a.path().cmp(b.path()));

        let mut categories = Vec::with_capacity(files.len());
        for file in files {
            let name = file.path().display().to_string();
            let text = file
                .contents_utf8()
                .ok_or_else(|| CatalogError::NotUtf8(name.clone()))?;
            let category = serde_json::from_str::<Category>(text)
                .map_err(|source| CatalogError::Parse { file: name, source })?;
            categories.push(category);
        }

        Ok(Self { categories })
    }

    /// Parse a JSON array of categories.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let categories = serde_json::from_str(json).map_err(|source| CatalogError::Parse {
            file: "<inline>".to_string(),
            source,
        })?;
        Ok(Self { categories })
    }

    pub fn from_categories(categories: Vec<Category>) -> Self {
        Self { categories }
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn get(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn require(&self, id: &str) -> Result<&Category, CatalogError> {
        self.get(id)
            .ok_or_else(|| CatalogError::UnknownCategory(id.to_string()))
    }

    /// Every word of every category, in catalog order.
    pub fn all_words(&self) -> Vec<VocabItem> {
        self.categories
            .iter()
            .flat_map(|c| c.words.iter().cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}
