//! Basic example of synchronous fan-out dispatch.
//!
//! This example demonstrates the simplest usage pattern of the fanout package:
//! registering several callbacks against an event name and invoking them all with one
//! trigger, collecting their results in registration order.

use fanout::Track;

fn main() {
    println!("=== Fanout Basic Example ===");

    let track = Track::<u32, String, String>::new();

    track.register("tick", |count| Ok(format!("observer A saw tick #{count}")));
    track.register("tick", |count| Ok(format!("observer B saw tick #{count}")));

    // Names are normalized by default, so "Tick" reaches the same callbacks.
    for count in 1..=3 {
        println!("Invoking tick #{count}...");

        let results = track.invoke("Tick", &count).expect("no callback fails here");
        for line in results {
            println!("  {line}");
        }
    }

    println!("Example completed successfully!");
}
