use crate::data::BestModel;
use crate::engines::generation::{ChannelProgressCallback, Genotype, LogProgressCallback, ProgressMessage, Tee};
use crate::engines::search::ModelSearch;
use crate::error::{AcmeError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Runs a model search on a background thread
pub struct SearchRunner {
    handle: Option<JoinHandle<Result<BestModel>>>,
    progress_rx: Receiver<ProgressMessage<Genotype>>,
    cancel_flag: Arc<AtomicBool>,
}

impl SearchRunner {
    pub fn start(search: ModelSearch) -> Result<Self> {
        let (progress_tx, progress_rx) = channel();
        let cancel_flag = Arc::new(AtomicBool::new(false));
        let cancel_flag_clone = Arc::clone(&cancel_flag);

        let handle = thread::Builder::new()
            .name("model-search".to_string())
            .spawn(move || {
                let mut callback = Tee(LogProgressCallback, ChannelProgressCallback::new(progress_tx));
                search.solve_with(&mut callback, Some(cancel_flag_clone))
            })?;

        Ok(Self {
            handle: Some(handle),
            progress_rx,
            cancel_flag,
        })
    }

    /// Poll for progress updates (non-blocking)
    pub fn poll_progress(&self) -> Vec<ProgressMessage<Genotype>> {
        self.progress_rx.try_iter().collect()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }

    /// Stop the search at its next iteration
    pub fn cancel(&self) {
        self.cancel_flag.store(true, Ordering::Relaxed);
    }

    /// Block until the search thread completes
    pub fn wait(mut self) -> Result<BestModel> {
        let handle = self
            .handle
            .take()
            .ok_or_else(|| AcmeError::Search("Search already collected".to_string()))?;
        match handle.join() {
            Ok(result) => result,
            Err(_) => Err(AcmeError::Search("Search thread panicked".to_string())),
        }
    }
}
