//! One-shot registration retired by a wait signal.
//!
//! This example registers a temporary callback that participates in fan-out only until
//! an external party fires the associated signal, at which point a dedicated waiter
//! thread removes it exactly once.

use std::thread;

use fanout::Track;

fn main() {
    println!("=== Fanout Wait Example ===");

    let track = Track::<u32, String, String>::new();

    track.register("sample", |value| Ok(format!("permanent observer saw {value}")));
    let signal = track.register_once("sample", |value| Ok(format!("temporary observer saw {value}")));

    println!("Both observers registered:");
    for line in track.invoke("sample", &1).expect("no callback fails here") {
        println!("  {line}");
    }

    println!("Firing the signal to retire the temporary observer...");
    signal.fire();

    // The waiter thread removes the one-shot entry as soon as it observes the fire.
    while track.callback_count("sample") > 1 {
        thread::yield_now();
    }

    println!("After the fire:");
    for line in track.invoke("sample", &2).expect("no callback fails here") {
        println!("  {line}");
    }

    println!("Example completed successfully!");
}
