//! Single-thread confinement for the graphics and audio context.
//!
//! [`run`] turns the calling thread into the dispatch thread. The context `C`
//! is created on that thread by [`Dispatcher::install`] and never leaves it:
//! the only way to reach it is a closure passed to [`Dispatcher::submit`],
//! which the dispatch thread executes in FIFO order while the submitter
//! blocks for the result. `C` therefore does not need to be `Send`.

use std::thread;

use crossbeam_channel::{bounded, Sender};

use crate::{PlayerError, Result};

/// Queue capacity used by the player. At most one item is outstanding per
/// frame, so this is effectively unbounded.
pub const DEFAULT_QUEUE_CAPACITY: usize = 100_000;

type Job<C> = Box<dyn FnOnce(&mut Option<C>) + Send>;

/// Submission handle for the dispatch thread.
pub struct Dispatcher<C> {
    jobs: Sender<Job<C>>,
}

impl<C> Clone for Dispatcher<C> {
    fn clone(&self) -> Self {
        Self {
            jobs: self.jobs.clone(),
        }
    }
}

impl<C> std::fmt::Debug for Dispatcher<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("pending", &self.jobs.len())
            .finish()
    }
}

impl<C: 'static> Dispatcher<C> {
    /// Builds the context on the dispatch thread, replacing any previous one.
    pub fn install<F>(&self, init: F) -> Result<()>
    where
        F: FnOnce() -> Result<C> + Send + 'static,
    {
        self.call(move |slot| {
            *slot = Some(init()?);
            Ok(())
        })
    }

    /// Runs `work` against the context on the dispatch thread and waits for
    /// its result.
    pub fn submit<T, F>(&self, work: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut C) -> Result<T> + Send + 'static,
    {
        self.call(move |slot| match slot.as_mut() {
            Some(context) => work(context),
            None => Err(PlayerError::NoContext),
        })
    }

    fn call<T, F>(&self, work: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Option<C>) -> Result<T> + Send + 'static,
    {
        let (reply_tx, reply_rx) = bounded(1);
        let job: Job<C> = Box::new(move |slot| {
            let _ = reply_tx.send(work(slot));
        });
        self.jobs
            .send(job)
            .map_err(|_| PlayerError::DispatchClosed)?;
        reply_rx.recv().map_err(|_| PlayerError::DispatchClosed)?
    }
}

/// Runs `driver` on a helper thread while the calling thread drains the
/// queue. Returns once every [`Dispatcher`] handle is gone, yielding the
/// driver's result. The context is dropped on the calling thread.
pub fn run<C, R, F>(capacity: usize, driver: F) -> Result<R>
where
    C: 'static,
    R: Send + 'static,
    F: FnOnce(Dispatcher<C>) -> Result<R> + Send + 'static,
{
    let (jobs_tx, jobs_rx) = bounded::<Job<C>>(capacity.max(1));
    let dispatcher = Dispatcher { jobs: jobs_tx };

    let handle = thread::Builder::new()
        .name("driver".to_string())
        .spawn(move || driver(dispatcher))?;

    let mut context: Option<C> = None;
    let mut processed: u64 = 0;
    for job in jobs_rx.iter() {
        job(&mut context);
        processed += 1;
    }
    tracing::debug!(processed, "dispatch queue drained");
    drop(context);

    handle
        .join()
        .map_err(|_| PlayerError::msg("driver thread panicked"))?
}
