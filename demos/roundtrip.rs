//! Encoding a value tree, reading it back and inspecting the bytes.
//!
//! Run with: cargo run --example roundtrip

use polyvalue::{from_slice, to_vec, value, Complex32, Deserializer, TraceLog, Vector};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let capture = value!({
        "device": 4u16,
        "rate_hz": 48_000u32,
        "iq": [Complex32::new(0.5, -0.5), Complex32::new(0.0, 1.0)],
        "window": { "taps": [1i16, 2, 1], "norm": 0.25f64 }
    });

    println!("Value: {}", capture);

    let bytes = to_vec(&capture)?;
    println!("Encoded: {} bytes", bytes.len());
    for chunk in bytes.chunks(16) {
        let hex: Vec<String> = chunk.iter().map(|b| format!("{:02x}", b)).collect();
        println!("  {}", hex.join(" "));
    }

    // Decode with a trace to see each frame as it is read.
    let mut log = TraceLog::new();
    let back = Deserializer::from_slice(&bytes)
        .with_trace(&mut log)
        .deserialize()?;
    println!("\nFrames read:");
    for event in &log.events {
        println!("  {:?}", event);
    }

    assert_eq!(back, capture);
    assert_eq!(from_slice(&bytes)?, capture);

    // Typed access to a decoded vector.
    if let Some(iq) = back.get("iq") {
        let iq = Vector::<Complex32>::try_from(&iq)?;
        println!("\nFirst IQ sample: {}", iq.get(0).unwrap_or_default());
    }

    // Export through serde.
    println!("As JSON: {}", serde_json::to_string(&back)?);

    Ok(())
}
