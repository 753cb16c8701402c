/// Combine Captions — merges generated captions back into a dataset file.
///
/// Usage: combine_captions --dataset <file.json> --captions <captions.json> --output <file.json>
use std::path::Path;
use std::process;
use swig_captions::dataset::combine_files;

const USAGE: &str =
    "Usage: combine_captions --dataset <file.json> --captions <captions.json> --output <file.json>";

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let mut dataset = None;
    let mut captions = None;
    let mut output = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--dataset" if i + 1 < args.len() => {
                i += 1;
                dataset = Some(args[i].clone());
            }
            "--captions" if i + 1 < args.len() => {
                i += 1;
                captions = Some(args[i].clone());
            }
            "--output" if i + 1 < args.len() => {
                i += 1;
                output = Some(args[i].clone());
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

    let (Some(dataset), Some(captions), Some(output)) = (dataset, captions, output) else {
        eprintln!("Error: --dataset, --captions and --output are required");
        eprintln!("{USAGE}");
        process::exit(1);
    };

    match combine_files(Path::new(&dataset), Path::new(&captions), Path::new(&output)) {
        Ok(summary) => {
            println!("Updated {} of {} items", summary.updated, summary.total);
            println!("Wrote {}", output);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
