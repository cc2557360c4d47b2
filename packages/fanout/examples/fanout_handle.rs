//! Declarative single-handler binding with an outbound dispatch sink.
//!
//! This example builds an event table for a small protocol handler type, derives a
//! second table that overrides one binding, and shows handlers emitting notifications
//! outward through a [`Dispatcher`].

use std::rc::Rc;

use fanout::{Dispatcher, EventTable, Handle};

struct Session {
    uppercase: bool,
    dispatcher: Dispatcher<String>,
}

fn receive(session: &mut Session, data: &String) {
    let data = if session.uppercase {
        data.to_uppercase()
    } else {
        data.clone()
    };

    session.dispatcher.dispatch("received", &[data]);
}

fn close(session: &mut Session, _data: &String) {
    session.dispatcher.dispatch("closed", &[]);
}

fn close_loudly(session: &mut Session, _data: &String) {
    session.dispatcher.dispatch("closed", &["(with fanfare)".to_string()]);
}

fn main() {
    println!("=== Fanout Handle Example ===");

    let base_table = Rc::new(EventTable::builder().on("receive", receive).on("close", close).build());

    // A derived table inherits "receive" and overrides "close".
    let loud_table = Rc::new(
        EventTable::builder()
            .inherit(&base_table)
            .on("close", close_loudly)
            .build(),
    );

    let session = Session {
        uppercase: true,
        dispatcher: Dispatcher::with_sink(|name, values: &[String]| {
            println!("  -> {name}: {values:?}");
        }),
    };

    let mut handle = Handle::new(session, loud_table);

    println!("Invoking receive...");
    handle.invoke("receive", &"hello there".to_string());

    println!("Invoking close...");
    handle.invoke("close", &String::new());

    println!("Example completed successfully!");
}
