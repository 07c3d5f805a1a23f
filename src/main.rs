use anyhow::{anyhow, Context};
use grovepi::{
    config::Config,
    driver::{
        dexter::grovepi::{bus, worker, GrovePi},
        ThreadDelay,
    },
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .pretty()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = Config::from_env().context("invalid configuration")?;
    if config.watch.is_empty() {
        warn!("GROVEPI_WATCH is empty, nothing to poll");
    }

    let bus = bus::open(config.bus).context("failed to open i2c bus")?;
    let grovepi = GrovePi::new(bus, ThreadDelay).with_timing(config.timing);
    let (handle, join) = worker::spawn_thread(grovepi);

    let (stop_tx, stop_rx) = flume::bounded(1);
    ctrlc::set_handler(move || {
        info!("received ctrl+c, exiting");
        let _ = stop_tx.try_send(());
    })?;

    loop {
        for request in &config.watch {
            match handle.request(*request) {
                Ok(reading) => info!(?request, "{reading}"),
                Err(e) => warn!(?request, "{e}"),
            }
        }

        // idle until the next poll, or stop early on ctrl+c
        match stop_rx.recv_timeout(config.poll_interval) {
            Err(flume::RecvTimeoutError::Timeout) => {}
            _ => break,
        }
    }

    drop(handle);
    join.join().map_err(|_| anyhow!("grovepi worker panicked"))?;

    info!("exit");

    Ok(())
}
