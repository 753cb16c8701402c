/// Dataset Stats — verb and role frequencies, plus debug selections.
///
/// Usage: dataset_stats --dataset <file.json> [--rolemaps <file.ron>] [--top <n>]
///                      [--roles <count> | --role <name> [--offset <n>]] [--limit <n>]
///
/// Without a selection flag, prints the most frequent verbs and the most
/// frequent roles that have neither a fixed preposition nor an object class.
use std::path::Path;
use std::process;
use swig_captions::dataset::Dataset;
use swig_captions::schema::annotation::Batch;
use swig_captions::schema::rolemap::RoleMaps;

const USAGE: &str = "Usage: dataset_stats --dataset <file.json> [--rolemaps <file.ron>] \
[--top <n>] [--roles <count> | --role <name> [--offset <n>]] [--limit <n>]";

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let mut dataset_path = None;
    let mut rolemaps_path = None;
    let mut top = 20usize;
    let mut role_count: Option<usize> = None;
    let mut role: Option<String> = None;
    let mut offset = 0usize;
    let mut limit = 10usize;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--dataset" if i + 1 < args.len() => {
                i += 1;
                dataset_path = Some(args[i].clone());
            }
            "--rolemaps" if i + 1 < args.len() => {
                i += 1;
                rolemaps_path = Some(args[i].clone());
            }
            "--top" if i + 1 < args.len() => {
                i += 1;
                top = parse_number(&args[i], "--top");
            }
            "--roles" if i + 1 < args.len() => {
                i += 1;
                role_count = Some(parse_number(&args[i], "--roles"));
            }
            "--role" if i + 1 < args.len() => {
                i += 1;
                role = Some(args[i].clone());
            }
            "--offset" if i + 1 < args.len() => {
                i += 1;
                offset = parse_number(&args[i], "--offset");
            }
            "--limit" if i + 1 < args.len() => {
                i += 1;
                limit = parse_number(&args[i], "--limit");
            }
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

    let dataset_path = dataset_path.unwrap_or_else(|| {
        eprintln!("Error: --dataset is required");
        eprintln!("{USAGE}");
        process::exit(1);
    });
    let dataset = Dataset::load(Path::new(&dataset_path)).unwrap_or_else(|e| {
        eprintln!("Error loading dataset: {}", e);
        process::exit(1);
    });

    if let Some(count) = role_count {
        print_selection(&format!("images with {count} roles"), &dataset.select_by_role_count(count, limit));
        return;
    }
    if let Some(role) = role {
        print_selection(
            &format!("images using '{role}'"),
            &dataset.select_by_role(&role, offset, limit),
        );
        return;
    }

    let role_maps = match rolemaps_path {
        Some(path) => RoleMaps::load_from_ron(Path::new(&path)).unwrap_or_else(|e| {
            eprintln!("Error loading role maps: {}", e);
            process::exit(1);
        }),
        None => RoleMaps::default(),
    };

    println!("{} images", dataset.len());

    let verbs = dataset.verb_counts();
    println!("\n{} verbs found", verbs.len());
    for (verb, count) in verbs.iter().take(top) {
        println!("  {:>6}  {}", count, verb);
    }

    let roles = dataset.unmapped_role_counts(&role_maps);
    println!("\n{} unmapped roles found", roles.len());
    for (role, count) in roles.iter().take(top) {
        println!("  {:>6}  {}", count, role);
    }
}

fn print_selection(title: &str, batch: &Batch) {
    println!("{} ({} shown)", title, batch.len());
    for (key, annotation) in batch.iter() {
        println!("  {}  [{}] {}", key, annotation.verb, annotation.role_names().join(", "));
    }
}

fn parse_number(value: &str, flag: &str) -> usize {
    value.parse().unwrap_or_else(|_| {
        eprintln!("Error: {} expects a number, got '{}'", flag, value);
        process::exit(1);
    })
}
