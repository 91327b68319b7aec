use charset_detector_rs::{Detector, FeedbackBus};
use clap::Parser;
use env_logger::Env;
use serde::Serialize;
use std::path::PathBuf;
use std::{fs, process};

/////////////////////////////////////////////////////////////////////////////////////
// Detector CLI application
/////////////////////////////////////////////////////////////////////////////////////

#[derive(Parser, Debug)]
#[command(name = "Charset detector. Discover the originating encoding of unknown text files.")]
#[command(author, version, about, long_about = None)]
struct CLIDetectorArgs {
    /// File(s) to be analysed
    #[arg(required = true, action = clap::ArgAction::Append)]
    pub files: Vec<PathBuf>,

    /// Print feedback events to stdout and enable debug logs on stderr.
    #[arg(short = 'v', long = "verbose", default_value_t = false)]
    pub verbose: bool,

    /// Only output the charset detected to STDOUT. Disabling JSON output.
    #[arg(short, long, default_value_t = false)]
    pub minimal: bool,

    /// Append feedback events to this file (one event per line).
    #[arg(short = 'l', long = "feedback-log")]
    pub feedback_log: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct CLIDetectorResult {
    /// Path to analysed file
    pub path: PathBuf,
    /// Guessed encoding
    pub encoding: String,
    /// Confidence of the guess, 0.0 to 1.0
    pub confidence: f64,
    /// True when no probe produced positive evidence
    pub used_fallback: bool,
    /// True when a byte-order mark decided the answer
    pub detected_by_bom: bool,
}

fn run(args: &CLIDetectorArgs) -> Result<i32, String> {
    let bus = FeedbackBus::new();
    if args.verbose {
        bus.enable_console(true);
    }
    if let Some(path) = &args.feedback_log {
        bus.set_file_sink(path)?;
    }
    let detector = Detector::new(bus);

    // go through the files
    let mut results: Vec<CLIDetectorResult> = vec![];
    for path in &args.files {
        let full_path = fs::canonicalize(path).map_err(|err| err.to_string())?;
        let detection = detector.from_path(&full_path)?;
        results.push(CLIDetectorResult {
            path: full_path,
            encoding: detection.encoding.to_string(),
            confidence: detection.confidence,
            used_fallback: detection.used_fallback,
            detected_by_bom: detection.detected_by_bom,
        });
    }

    // print out results
    if args.minimal {
        for result in &results {
            println!("{}", result.encoding);
        }
    } else {
        println!(
            "{}",
            if results.len() > 1 {
                serde_json::to_string_pretty(&results).unwrap()
            } else {
                serde_json::to_string_pretty(&results[0]).unwrap()
            }
        );
    }

    detector.feedback().close();
    Ok(0)
}

pub fn main() {
    let args = CLIDetectorArgs::parse();

    // verbose mode
    if args.verbose {
        env_logger::Builder::from_env(Env::default().default_filter_or("debug")).init();
    }

    // run detection
    match run(&args) {
        Err(e) => panic!("{e}"),
        Ok(exit_code) => process::exit(exit_code),
    }
}
