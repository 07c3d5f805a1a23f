//! Single owner for the bus.
//!
//! Two callers interleaving writes and reads would break the block framing
//! and the sync byte convention, so the driver lives on one thread and every
//! other thread talks to it through a [`Handle`]. Each request runs its whole
//! write, wait, read sequence before the next one starts.

use std::{thread::JoinHandle, time::Duration};

use embedded_hal::blocking::delay::DelayUs;
use tracing::{debug, trace, warn};

use super::{
    bus::Bus,
    request::{Reading, Request},
    GrovePi, Unavailable,
};

type Reply = Result<Reading, Unavailable>;

struct Job {
    request: Request,
    reply_tx: flume::Sender<Reply>,
}

#[derive(Clone)]
pub struct Handle {
    job_tx: flume::Sender<Job>,
}

impl Handle {
    fn submit(&self, request: Request) -> Result<flume::Receiver<Reply>, Unavailable> {
        let (reply_tx, reply_rx) = flume::bounded(1);

        self.job_tx
            .send(Job { request, reply_tx })
            .map_err(|_| {
                warn!(?request, "grovepi worker has stopped");
                Unavailable
            })?;

        Ok(reply_rx)
    }

    /// Runs `request` on the worker and waits for its result.
    pub fn request(&self, request: Request) -> Reply {
        let reply_rx = self.submit(request)?;
        reply_rx.recv().unwrap_or_else(|_| {
            warn!(?request, "grovepi worker dropped the request");
            Err(Unavailable)
        })
    }

    /// Like [`Handle::request`], but gives up after `timeout`. The request
    /// still runs to completion on the worker.
    pub fn request_timeout(&self, request: Request, timeout: Duration) -> Reply {
        let reply_rx = self.submit(request)?;
        match reply_rx.recv_timeout(timeout) {
            Ok(reply) => reply,
            Err(flume::RecvTimeoutError::Timeout) => {
                warn!(?request, "no reply from grovepi worker within {timeout:?}");
                Err(Unavailable)
            }
            Err(flume::RecvTimeoutError::Disconnected) => {
                warn!(?request, "grovepi worker dropped the request");
                Err(Unavailable)
            }
        }
    }
}

/// Moves `grovepi` onto its own thread. The thread exits once every
/// [`Handle`] is dropped and hands the driver back through the join handle.
pub fn spawn_thread<B, D>(mut grovepi: GrovePi<B, D>) -> (Handle, JoinHandle<GrovePi<B, D>>)
where
    B: Bus + Send + 'static,
    D: DelayUs<u32> + Send + 'static,
{
    let (job_tx, job_rx) = flume::bounded::<Job>(256);

    let join = std::thread::spawn(move || {
        debug!("grovepi worker started");

        for job in job_rx.iter() {
            trace!("executing request {:?}", job.request);

            let reply = grovepi.execute(job.request);

            // the caller may have timed out already
            let _ = job.reply_tx.send(reply);
        }

        debug!("grovepi worker stopped");
        grovepi
    });

    (Handle { job_tx }, join)
}
