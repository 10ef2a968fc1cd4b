/// Transcript Inspector
///
/// CLI tool for checking how an uploaded session file would be normalized.
///
/// Usage:
///   # Parse a session and print summary, metadata and title
///   cargo run --features dev-tools --bin inspect_transcript -- parse session.jsonl [hint] [title]
///
///   # Show detection scores only
///   cargo run --features dev-tools --bin inspect_transcript -- detect session.jsonl
///
///   # Parse an apply_patch payload
///   cargo run --features dev-tools --bin inspect_transcript -- patch change.patch
///
///   # List every tool call with its structured action
///   cargo run --features dev-tools --bin inspect_transcript -- tools session.jsonl [hint]
use guidemode_transcript::config::load_config;
use guidemode_transcript::detection::FormatDetector;
use guidemode_transcript::logging::init_logging;
use guidemode_transcript::{ingest_upload, parse_patch, parse_transcript};
use serde_json::json;
use std::path::PathBuf;

fn main() {
    if let Err(e) = init_logging(None) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 3 {
        print_usage();
        std::process::exit(1);
    }

    let command = &args[1];
    let path = PathBuf::from(&args[2]);

    let raw = match std::fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(e) => {
            eprintln!("Error: Failed to read {}: {}", path.display(), e);
            std::process::exit(1);
        }
    };

    let result = match command.as_str() {
        "parse" => parse(&raw, args.get(3).map(String::as_str), args.get(4).map(String::as_str)),
        "detect" => detect(&raw),
        "patch" => Ok(json!(parse_patch(&raw))),
        "tools" => tools(&raw, args.get(3).map(String::as_str)),
        _ => {
            eprintln!("Error: Unknown command '{}'", command);
            print_usage();
            std::process::exit(1);
        }
    };

    match result.and_then(|value| serde_json::to_string_pretty(&value).map_err(|e| e.to_string())) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn parse(raw: &str, hint: Option<&str>, title: Option<&str>) -> Result<serde_json::Value, String> {
    let config = load_config()?;
    let ingested = ingest_upload(raw, hint, title, &config)?;
    let transcript = &ingested.transcript;

    Ok(json!({
        "title": ingested.title,
        "provider": transcript.provider,
        "sessionId": transcript.session_id,
        "cwd": transcript.cwd,
        "summary": transcript.metadata,
        "metadata": ingested.metadata,
    }))
}

fn detect(raw: &str) -> Result<serde_json::Value, String> {
    let config = load_config()?;
    let detector = FormatDetector::from_config(&config);
    let detection = detector.detect(raw);

    Ok(json!({
        "provider": detection.provider,
        "confidence": detection.confidence,
        "recognized": detection.is_recognized(),
        "scores": format!("{:?}", detector.score(raw)),
    }))
}

fn tools(raw: &str, hint: Option<&str>) -> Result<serde_json::Value, String> {
    let transcript = parse_transcript(raw, hint)?;
    let actions: Vec<serde_json::Value> = transcript
        .messages
        .iter()
        .filter_map(|line| line.message.as_ref())
        .flat_map(|message| message.blocks())
        .filter_map(|block| block.tool_action())
        .map(|action| json!(action))
        .collect();

    Ok(json!({
        "provider": transcript.provider,
        "count": actions.len(),
        "actions": actions,
    }))
}

fn print_usage() {
    eprintln!("Usage: inspect_transcript <command> <file> [args]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  parse <file> [hint] [title]  Normalize a session and print metadata");
    eprintln!("  detect <file>                Show format detection result");
    eprintln!("  patch <file>                 Parse an apply_patch payload");
    eprintln!("  tools <file> [hint]          List tool calls as structured actions");
}
