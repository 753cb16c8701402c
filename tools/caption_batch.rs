/// Caption Batch — generates captions for one batch or the whole dataset.
///
/// Usage: caption_batch --dataset <file.json> --lexicon <lexicon.ron>... --corpus <tagged.txt>
///                      [--rolemaps <file.ron>] [--batch-size <n>] [--batch <k> | --all]
///                      [--seed <n>] [--output <captions.json>] [--verbose]
///
/// `--lexicon` may be repeated; later files override earlier entries.
use std::path::Path;
use std::process;
use swig_captions::core::corpus::TaggedCorpus;
use swig_captions::core::lexicon::Lexicon;
use swig_captions::core::pipeline::{CaptionGenerator, DEFAULT_SEED};
use swig_captions::dataset::{save_captions, Captions, Dataset};
use swig_captions::schema::rolemap::RoleMaps;
use tracing::{info, Level};

const USAGE: &str = "Usage: caption_batch --dataset <file.json> --lexicon <lexicon.ron>... \
--corpus <tagged.txt> [--rolemaps <file.ron>] [--batch-size <n>] [--batch <k> | --all] \
[--seed <n>] [--output <captions.json>] [--verbose]";

const DEFAULT_BATCH_SIZE: usize = 1000;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let mut dataset_path = None;
    let mut lexicon_paths: Vec<String> = Vec::new();
    let mut corpus_path = None;
    let mut rolemaps_path = None;
    let mut batch_size = DEFAULT_BATCH_SIZE;
    let mut batch_number = 1usize;
    let mut all = false;
    let mut seed = DEFAULT_SEED;
    let mut output = None;
    let mut verbose = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--dataset" if i + 1 < args.len() => {
                i += 1;
                dataset_path = Some(args[i].clone());
            }
            "--lexicon" if i + 1 < args.len() => {
                i += 1;
                lexicon_paths.push(args[i].clone());
            }
            "--corpus" if i + 1 < args.len() => {
                i += 1;
                corpus_path = Some(args[i].clone());
            }
            "--rolemaps" if i + 1 < args.len() => {
                i += 1;
                rolemaps_path = Some(args[i].clone());
            }
            "--batch-size" if i + 1 < args.len() => {
                i += 1;
                batch_size = parse_number(&args[i], "--batch-size");
            }
            "--batch" if i + 1 < args.len() => {
                i += 1;
                batch_number = parse_number(&args[i], "--batch");
            }
            "--seed" if i + 1 < args.len() => {
                i += 1;
                seed = parse_number(&args[i], "--seed");
            }
            "--output" if i + 1 < args.len() => {
                i += 1;
                output = Some(args[i].clone());
            }
            "--all" => all = true,
            "--verbose" | "-v" => verbose = true,
            "--help" | "-h" => {
                println!("{USAGE}");
                process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                eprintln!("{USAGE}");
                process::exit(1);
            }
        }
        i += 1;
    }

    tracing_subscriber::fmt()
        .with_max_level(if verbose { Level::DEBUG } else { Level::INFO })
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let dataset_path = required(dataset_path, "--dataset");
    if lexicon_paths.is_empty() {
        eprintln!("Error: --lexicon is required");
        eprintln!("{USAGE}");
        process::exit(1);
    }
    let corpus_path = required(corpus_path, "--corpus");

    let dataset = Dataset::load(Path::new(&dataset_path)).unwrap_or_else(|e| {
        eprintln!("Error loading dataset: {}", e);
        process::exit(1);
    });
    let mut lexicon = Lexicon::default();
    for path in &lexicon_paths {
        let part = Lexicon::load_from_ron(Path::new(path)).unwrap_or_else(|e| {
            eprintln!("Error loading lexicon {}: {}", path, e);
            process::exit(1);
        });
        lexicon.merge(part);
    }
    let corpus = TaggedCorpus::load(Path::new(&corpus_path)).unwrap_or_else(|e| {
        eprintln!("Error loading corpus: {}", e);
        process::exit(1);
    });
    let role_maps = match rolemaps_path {
        Some(path) => RoleMaps::load_from_ron(Path::new(&path)).unwrap_or_else(|e| {
            eprintln!("Error loading role maps: {}", e);
            process::exit(1);
        }),
        None => RoleMaps::default(),
    };

    let total = dataset.total_batches(batch_size).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        process::exit(1);
    });
    let numbers: Vec<usize> = if all {
        (1..=total).collect()
    } else {
        vec![batch_number]
    };
    info!(
        images = dataset.len(),
        batches = total,
        selected = numbers.len(),
        seed,
        "captioning"
    );

    let mut captions: Captions = Vec::new();
    for number in numbers {
        let batch = dataset.batch(number, batch_size).unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            process::exit(1);
        });
        // Tables are per batch, so every batch gets a fresh generator.
        let mut generator = CaptionGenerator::builder()
            .seed(seed)
            .with_role_maps(role_maps.clone())
            .build(&batch, &lexicon, &corpus)
            .unwrap_or_else(|e| {
                eprintln!("Error preparing batch {}: {}", number, e);
                process::exit(1);
            });
        let generated = generator.generate_all().unwrap_or_else(|e| {
            eprintln!("Error captioning batch {}: {}", number, e);
            process::exit(1);
        });
        info!(batch = number, images = generated.len(), "batch done");
        captions.extend(generated);
    }

    match output {
        Some(path) => {
            if let Err(e) = save_captions(Path::new(&path), &captions) {
                eprintln!("Error writing {}: {}", path, e);
                process::exit(1);
            }
            println!("Wrote captions for {} images to {}", captions.len(), path);
        }
        None => {
            for (image, sentences) in &captions {
                println!("{image}");
                for sentence in sentences {
                    println!("  {sentence}");
                }
            }
        }
    }
}

fn required(value: Option<String>, flag: &str) -> String {
    value.unwrap_or_else(|| {
        eprintln!("Error: {} is required", flag);
        eprintln!("{USAGE}");
        process::exit(1);
    })
}

fn parse_number<T: std::str::FromStr>(value: &str, flag: &str) -> T {
    value.parse().unwrap_or_else(|_| {
        eprintln!("Error: {} expects a number, got '{}'", flag, value);
        process::exit(1);
    })
}
