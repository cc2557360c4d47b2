//! Cooperative fan-out with aggregated asynchronous completion.
//!
//! This example registers asynchronous callbacks on a [`LocalTrack`] and awaits the
//! single aggregate result that `invoke` produces: all callbacks complete or the first
//! failure fails the whole aggregate, with results in registration order either way.

use fanout::LocalTrack;
use futures::FutureExt;
use futures::executor::LocalPool;

fn main() {
    println!("=== Fanout Async Example ===");

    let mut pool = LocalPool::new();
    let track = LocalTrack::<String, String, String>::new(pool.spawner());

    track.register("greet", |name| {
        let name = name.clone();
        async move { Ok(format!("hello, {name}")) }.boxed_local()
    });
    track.register("greet", |name| {
        let name = name.clone();
        async move { Ok(format!("goodbye, {name}")) }.boxed_local()
    });

    println!("Invoking greet and awaiting the aggregate...");
    let aggregate = track.invoke("greet", &"world".to_string());

    let results = pool.run_until(aggregate).expect("no callback fails here");
    for line in results {
        println!("  {line}");
    }

    println!("Example completed successfully!");
}
