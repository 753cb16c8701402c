/// Dataset layer — loading SWiG-style annotation files, paging them into
/// batches, dataset statistics and merging captions back in.

use rustc_hash::FxHashMap;
use serde_json::{Map, Value};
use std::path::Path;
use thiserror::Error;

use crate::schema::annotation::{Annotation, Batch};
use crate::schema::rolemap::RoleMaps;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("file not found: {0}")]
    NotFound(String),
    #[error("batch {number} out of range (dataset has {total} batches)")]
    BatchOutOfRange { number: usize, total: usize },
    #[error("batch size must be at least 1")]
    ZeroBatchSize,
    #[error("expected a JSON object at the top level")]
    NotAnObject,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Generated captions, image key → one sentence per frame.
pub type Captions = Vec<(String, Vec<String>)>;

/// All annotations of a dataset split, in file order.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    annotations: Batch,
}

impl Dataset {
    /// Load a dataset from a JSON file.
    pub fn load(path: &Path) -> Result<Dataset, DatasetError> {
        if !path.is_file() {
            return Err(DatasetError::NotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Parse a dataset from a JSON string.
    pub fn from_json(input: &str) -> Result<Dataset, DatasetError> {
        Ok(Dataset {
            annotations: serde_json::from_str(input)?,
        })
    }

    pub fn from_batch(annotations: Batch) -> Self {
        Self { annotations }
    }

    pub fn annotations(&self) -> &Batch {
        &self.annotations
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    pub fn total_batches(&self, batch_size: usize) -> Result<usize, DatasetError> {
        if batch_size == 0 {
            return Err(DatasetError::ZeroBatchSize);
        }
        Ok(self.len().div_ceil(batch_size))
    }

    /// The `number`-th batch (1-based) of `batch_size` consecutive items;
    /// the last batch may be short.
    pub fn batch(&self, number: usize, batch_size: usize) -> Result<Batch, DatasetError> {
        let total = self.total_batches(batch_size)?;
        if number == 0 || number > total {
            return Err(DatasetError::BatchOutOfRange { number, total });
        }
        let start = batch_size * (number - 1);
        Ok(self
            .annotations
            .iter()
            .skip(start)
            .take(batch_size)
            .map(|(key, annotation)| (key, annotation.clone()))
            .collect())
    }

    /// Up to `limit` items whose frames use exactly `count` distinct roles.
    pub fn select_by_role_count(&self, count: usize, limit: usize) -> Batch {
        self.select(|annotation| annotation.role_names().len() == count, 0, limit)
    }

    /// Up to `limit` items using `role`, skipping the first `offset` matches.
    pub fn select_by_role(&self, role: &str, offset: usize, limit: usize) -> Batch {
        self.select(|annotation| annotation.role_names().contains(&role), offset, limit)
    }

    fn select(&self, matches: impl Fn(&Annotation) -> bool, offset: usize, limit: usize) -> Batch {
        self.annotations
            .iter()
            .filter(|(_, annotation)| matches(annotation))
            .skip(offset)
            .take(limit)
            .map(|(key, annotation)| (key, annotation.clone()))
            .collect()
    }

    /// Verb frequencies, most frequent first.
    pub fn verb_counts(&self) -> Vec<(String, usize)> {
        count_in_order(self.annotations.iter().map(|(_, a)| a.verb.as_str()))
    }

    /// Frequencies of roles with neither a fixed preposition nor an object
    /// class, most frequent first. These are the roles whose phrasing relies
    /// entirely on corpus statistics.
    pub fn unmapped_role_counts(&self, maps: &RoleMaps) -> Vec<(String, usize)> {
        count_in_order(
            self.annotations
                .iter()
                .flat_map(|(_, a)| a.role_names())
                .filter(|role| {
                    !maps.role_prepositions.contains_key(*role) && !maps.object_roles.contains(*role)
                }),
        )
    }
}

/// Count items, sorted by descending count; ties keep first-seen order.
fn count_in_order<'s>(items: impl Iterator<Item = &'s str>) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut index: FxHashMap<&'s str, usize> = FxHashMap::default();
    for item in items {
        match index.get(item) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(item, counts.len());
                counts.push((item.to_string(), 1));
            }
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// Captions as a JSON object, keys in generation order.
pub fn captions_to_json(captions: &[(String, Vec<String>)]) -> Value {
    let map: Map<String, Value> = captions
        .iter()
        .map(|(key, sentences)| (key.clone(), Value::from(sentences.clone())))
        .collect();
    Value::Object(map)
}

/// Write captions to a pretty-printed JSON file.
pub fn save_captions(path: &Path, captions: &[(String, Vec<String>)]) -> Result<(), DatasetError> {
    let serialized = serde_json::to_string_pretty(&captions_to_json(captions))?;
    std::fs::write(path, serialized)?;
    Ok(())
}

/// Outcome of merging captions into a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombineSummary {
    pub updated: usize,
    pub total: usize,
}

/// Attach a `captions` field to every dataset item that has generated
/// captions. Items without captions are left out of the result; all other
/// fields of the kept items are preserved as-is.
pub fn combine_captions(
    dataset: Value,
    captions: &Value,
) -> Result<(Value, CombineSummary), DatasetError> {
    let Value::Object(items) = dataset else {
        return Err(DatasetError::NotAnObject);
    };
    let captions = captions.as_object().ok_or(DatasetError::NotAnObject)?;

    let total = items.len();
    let mut combined = Map::new();
    for (key, mut item) in items {
        let (Some(generated), Some(fields)) = (captions.get(&key), item.as_object_mut()) else {
            continue;
        };
        fields.insert("captions".to_string(), generated.clone());
        combined.insert(key, item);
    }

    let summary = CombineSummary {
        updated: combined.len(),
        total,
    };
    Ok((Value::Object(combined), summary))
}

/// Read two JSON files, combine them and write the result.
pub fn combine_files(
    dataset_path: &Path,
    captions_path: &Path,
    output_path: &Path,
) -> Result<CombineSummary, DatasetError> {
    for path in [dataset_path, captions_path] {
        if !path.is_file() {
            return Err(DatasetError::NotFound(path.display().to_string()));
        }
    }
    let dataset: Value = serde_json::from_str(&std::fs::read_to_string(dataset_path)?)?;
    let captions: Value = serde_json::from_str(&std::fs::read_to_string(captions_path)?)?;
    let (combined, summary) = combine_captions(dataset, &captions)?;

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(output_path, serde_json::to_string(&combined)?)?;
    Ok(summary)
}
