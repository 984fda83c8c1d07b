//! Shared map handles and how mutation shows through clones.
//!
//! Run with: cargo run --example shared_maps

use polyvalue::{equals, to_vec, value, Value};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let settings = value!({ "gain": 1.0f32 });
    let session = Value::map();
    session.insert("settings", settings.clone())?;

    // Clones alias: the session sees this change.
    settings.insert("gain", Value::from(2.0f32))?;
    println!("Session after shared update: {}", session);

    // deep_clone detaches the map structure.
    let snapshot = session.deep_clone();
    settings.insert("offset", Value::from(-3i32))?;
    println!("Session:  {}", session);
    println!("Snapshot: {}", snapshot);

    let gain = session.get("settings").and_then(|s| s.get("gain"));
    if let Some(gain) = gain {
        println!("gain == 2.0f32: {}", equals(&gain, &2.0f32)?);
        println!("gain == 2.0f64: {}", equals(&gain, &2.0f64)?);
    }

    println!(
        "Encoded sizes: session {} bytes, snapshot {} bytes",
        to_vec(&session)?.len(),
        to_vec(&snapshot)?.len()
    );

    Ok(())
}
