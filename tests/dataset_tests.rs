/// Dataset integration tests — paging, selection, statistics and merging
/// captions back into the annotation file.

use serde_json::Value;
use std::path::Path;
use swig_captions::dataset::{
    combine_captions, combine_files, save_captions, CombineSummary, Dataset, DatasetError,
};
use swig_captions::schema::rolemap::RoleMaps;

fn dataset() -> Dataset {
    Dataset::load(Path::new("tests/fixtures/dataset.json")).unwrap()
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

fn scratch_dir(name: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("swig_captions_{name}_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn fixture_loads_in_file_order() {
    let ds = dataset();
    assert_eq!(ds.len(), 5);
    let keys: Vec<&str> = ds.annotations().keys().collect();
    assert_eq!(
        keys,
        vec!["jumping_1.jpg", "selling_2.jpg", "riding_3.jpg", "cutting_4.jpg", "kicking_5.jpg"]
    );
}

#[test]
fn batches_cover_the_dataset_exactly_once() {
    let ds = dataset();
    let total = ds.total_batches(2).unwrap();
    assert_eq!(total, 3);
    let mut seen = Vec::new();
    for number in 1..=total {
        let batch = ds.batch(number, 2).unwrap();
        seen.extend(batch.keys().map(str::to_string));
    }
    let all: Vec<String> = ds.annotations().keys().map(str::to_string).collect();
    assert_eq!(seen, all);
    assert!(matches!(
        ds.batch(total + 1, 2),
        Err(DatasetError::BatchOutOfRange { .. })
    ));
}

#[test]
fn selection_by_role_count_and_role() {
    let ds = dataset();
    let selection = ds.select_by_role_count(3, 10);
    let three: Vec<&str> = selection.keys().collect();
    assert_eq!(three, vec!["jumping_1.jpg", "riding_3.jpg", "kicking_5.jpg"]);

    let selection = ds.select_by_role("item", 1, 10);
    let with_item: Vec<&str> = selection.keys().collect();
    assert_eq!(with_item, vec!["cutting_4.jpg", "kicking_5.jpg"]);
}

#[test]
fn statistics() {
    let ds = dataset();
    let verbs = ds.verb_counts();
    assert_eq!(verbs.len(), 5);
    assert!(verbs.iter().all(|(_, count)| *count == 1));
    assert_eq!(verbs[0].0, "jumping");

    let maps = RoleMaps::load_from_ron(Path::new("tests/fixtures/rolemaps.ron")).unwrap();
    let unmapped = ds.unmapped_role_counts(&maps);
    assert_eq!(unmapped[0], ("place".to_string(), 5));
    let roles: Vec<&str> = unmapped.iter().map(|(r, _)| r.as_str()).collect();
    assert!(roles.contains(&"item"));
    assert!(!roles.contains(&"tool"));
    assert!(!roles.contains(&"vehicle"));
}

#[test]
fn combine_fixture_captions() {
    let dataset = read_json(Path::new("tests/fixtures/dataset.json"));
    let captions = read_json(Path::new("tests/fixtures/captions.json"));
    let (combined, summary) = combine_captions(dataset, &captions).unwrap();

    assert_eq!(summary, CombineSummary { updated: 2, total: 5 });
    let keys: Vec<&String> = combined.as_object().unwrap().keys().collect();
    assert_eq!(keys, vec!["jumping_1.jpg", "riding_3.jpg"]);
    assert_eq!(combined["jumping_1.jpg"]["width"], 683);
    assert_eq!(combined["riding_3.jpg"]["captions"].as_array().unwrap().len(), 1);
}

#[test]
fn save_then_combine_files() {
    let dir = scratch_dir("combine");
    let captions_path = dir.join("captions.json");
    let output_path = dir.join("out").join("combined.json");

    save_captions(
        &captions_path,
        &[(
            "kicking_5.jpg".to_string(),
            vec!["a man is kicking a ball in the field".to_string()],
        )],
    )
    .unwrap();
    let summary = combine_files(
        Path::new("tests/fixtures/dataset.json"),
        &captions_path,
        &output_path,
    )
    .unwrap();

    assert_eq!(summary.updated, 1);
    let written = read_json(&output_path);
    assert_eq!(
        written["kicking_5.jpg"]["captions"][0],
        "a man is kicking a ball in the field"
    );
    assert_eq!(written["kicking_5.jpg"]["verb"], "kicking");

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn combine_files_reports_missing_input() {
    let dir = scratch_dir("missing");
    let result = combine_files(
        Path::new("tests/fixtures/dataset.json"),
        &dir.join("nope.json"),
        &dir.join("out.json"),
    );
    assert!(matches!(result, Err(DatasetError::NotFound(_))));
    std::fs::remove_dir_all(&dir).ok();
}
