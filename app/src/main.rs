use std::sync::Arc;
use std::thread;
use std::time::Duration;

use conflux::{
    Consumer, CounterStore, LogMessage, Multiplexer, SourceId, StreamLogger, stream,
};
use log::{Level, LevelFilter, info};

// Scripted notification feeds standing in for real delivery services.
const SMS: [&str; 3] = [
    "meeting moved to 10:00",
    "package out for delivery",
    "2fa code 114423",
];
const EMAIL: [&str; 2] = ["quarterly report attached", "welcome to the beta"];

fn main() {
    install_logger();

    // One stream per notification service, closed when its script runs out.
    let (sms, sms_events) = stream::<String>();
    let (email, email_events) = stream::<String>();

    let producers = [
        thread::spawn(move || {
            for message in SMS {
                sms.send(message.to_string());
                thread::sleep(Duration::from_millis(20));
            }
            sms.close();
        }),
        thread::spawn(move || {
            for message in EMAIL {
                email.send(message.to_string());
                thread::sleep(Duration::from_millis(35));
            }
            email.close();
        }),
    ];

    let store = Arc::new(CounterStore::new());
    let sms_counts = Arc::clone(&store);
    let email_counts = Arc::clone(&store);

    let mux = Multiplexer::new(vec![sms_events, email_events]).expect("two streams subscribed");
    let delivered = Consumer::new(mux, |source, message: String| {
        info!("unrouted {source}: {message}");
    })
    .on(SourceId::new(0), move |message| {
        info!("sms: {message}");
        sms_counts.increment("sms");
    })
    .on(SourceId::new(1), move |message| {
        info!("email: {message}");
        email_counts.increment("email");
    })
    .run();

    for handle in producers {
        handle.join().expect("producer thread panicked");
    }

    info!("drained {delivered} notifications");
    for (key, count) in store.snapshot() {
        println!("{key}: {count}");
    }

    // Give the printer thread a beat to flush the tail of the log stream.
    thread::sleep(Duration::from_millis(50));
}

/// Routes the `log` facade onto a stream drained by a detached printer
/// thread, so the process's own logging is just one more event source.
fn install_logger() {
    let (logger, log_events) = StreamLogger::with_stream(Level::Debug);
    log::set_boxed_logger(Box::new(logger)).expect("no logger installed yet");
    log::set_max_level(LevelFilter::Debug);

    // The global logger is never dropped, so its stream never closes; this
    // thread parks on next() until the process exits.
    thread::spawn(move || {
        let mut mux = Multiplexer::new(vec![log_events]).expect("one stream subscribed");
        while let Some((_, LogMessage { level, message })) = mux.next() {
            println!("[{level:<5}] {message}");
        }
    });
}
