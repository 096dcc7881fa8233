//! Analyze the event structure of a session document.

use std::collections::BTreeMap;
use std::path::PathBuf;

use dashcam_session_model::{document, Envelope, EnvelopeKind, IncrementalSource};

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    let raw = super::read_document(&path)?;
    let envelopes = document::parse_document(&raw)
        .map_err(|e| anyhow::anyhow!("Failed to parse session document: {e}"))?;

    println!("Session document: {}", path.display());
    println!("  Size: {} bytes", raw.len());
    println!("  Envelopes: {}", envelopes.len());
    println!();

    print_type_summary(&envelopes);
    print_interaction_breakdown(&envelopes);
    print_canvas_statistics(&envelopes);

    Ok(())
}

fn print_type_summary(envelopes: &[Envelope]) {
    let mut counts: BTreeMap<u8, usize> = BTreeMap::new();
    for envelope in envelopes {
        *counts.entry(envelope.kind.into()).or_default() += 1;
    }

    println!("Envelope types:");
    for (raw, count) in counts {
        let name = EnvelopeKind::from_u8(raw).map(|k| k.name()).unwrap_or("?");
        println!("  Type {raw} ({name}): {count}");
    }
    println!();
}

fn print_interaction_breakdown(envelopes: &[Envelope]) {
    println!("Incremental interactions:");

    for source in [
        IncrementalSource::MouseMove,
        IncrementalSource::MouseInteraction,
        IncrementalSource::Scroll,
    ] {
        let matching: Vec<&Envelope> = envelopes
            .iter()
            .filter(|e| e.incremental_source() == Some(source))
            .collect();
        println!("  {}: {}", source.name(), matching.len());

        if let Some(example) = matching.first() {
            let node_id = example
                .data
                .get("id")
                .and_then(|v| v.as_u64())
                .or_else(|| {
                    example.data["positions"]
                        .get(0)
                        .and_then(|p| p.get("id"))
                        .and_then(|v| v.as_u64())
                });
            match node_id {
                Some(id) => println!(
                    "    example: timestamp={} node={}",
                    example.timestamp, id
                ),
                None => println!("    example: timestamp={}", example.timestamp),
            }
        }
    }
    println!();
}

fn print_canvas_statistics(envelopes: &[Envelope]) {
    let payloads: Vec<_> = envelopes
        .iter()
        .filter_map(|e| e.as_canvas_snapshot())
        .collect();

    println!("Canvas snapshots:");
    println!("  Envelopes: {}", payloads.len());

    let entries: usize = payloads.iter().map(|p| p.snapshots.len()).sum();
    let total_kb: u64 = payloads
        .iter()
        .flat_map(|p| p.snapshots.iter())
        .map(|s| s.size_kb)
        .sum();
    println!("  Surface entries: {entries} ({total_kb}KB encoded)");

    if let Some(example) = payloads.iter().flat_map(|p| p.snapshots.iter()).next() {
        println!(
            "  Example: id={} index={} {}x{} ({}KB)",
            example.id, example.index, example.width, example.height, example.size_kb
        );
    }
}
