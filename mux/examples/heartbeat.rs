//! Polling a multiplexer between heartbeats.
//!
//! This example shows:
//! - `try_next()` driving an event drain without blocking the loop
//! - `Polled::Empty` as "nothing yet, go do other work"
//! - `Polled::Closed` as the repeatable shutdown signal for poll loops

use std::thread;
use std::time::Duration;

use conflux::{Multiplexer, Polled, stream};
use crossbeam::channel::tick;

fn main() {
    let (backups, backup_events) = stream::<String>();

    let producer = thread::spawn(move || {
        for n in 1..=5 {
            thread::sleep(Duration::from_millis(25));
            backups.send(format!("backup #{n} complete"));
        }
        backups.close();
    });

    let mut mux = Multiplexer::new(vec![backup_events]).expect("one stream subscribed");
    let heartbeat = tick(Duration::from_millis(10));

    loop {
        heartbeat.recv().expect("ticker never closes");
        println!("tick");

        // Drain whatever arrived since the last beat; the poll never blocks,
        // so the loop stays responsive to the ticker.
        loop {
            match mux.try_next() {
                Polled::Ready(source, event) => println!("  {source}: {event}"),
                Polled::Empty => break,
                Polled::Closed => {
                    println!("all backups done");
                    producer.join().expect("producer thread panicked");
                    return;
                }
            }
        }
    }
}
