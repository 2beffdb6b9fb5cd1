//! Asynchronous delivery pipeline
//!
//! A bounded FIFO of records drained by one dedicated worker thread. The
//! worker also listens on a control channel carrying `Flush` and `Close`
//! directives; the caller that sends a directive blocks until the worker
//! acknowledges it, so both are synchronous from the caller's side.

use super::{
    error::{LoggerError, Result},
    log_record::LogRecord,
    sink::{destroy_all, fan_out, flush_all, SinkList},
};
use crossbeam_channel::{bounded, select, Receiver, Sender};
use parking_lot::Mutex;
use std::thread;

/// Queue capacity used when `enable_async` is given zero.
pub const DEFAULT_ASYNC_CAPACITY: usize = 1000;

enum Control {
    Flush(Sender<()>),
    Close(Sender<()>),
}

pub(crate) struct AsyncPipeline {
    records: Sender<LogRecord>,
    control: Sender<Control>,
    /// Held while a directive is in flight; only one at a time.
    in_flight: Mutex<()>,
    worker: Mutex<Option<thread::JoinHandle<()>>>,
    capacity: usize,
}

impl AsyncPipeline {
    pub(crate) fn spawn(capacity: usize, sinks: SinkList) -> Result<Self> {
        let capacity = if capacity == 0 {
            DEFAULT_ASYNC_CAPACITY
        } else {
            capacity
        };

        let (records, record_rx) = bounded(capacity);
        let (control, control_rx) = bounded(1);

        let worker = Worker {
            records: record_rx,
            control: control_rx,
            sinks,
        };
        let handle = thread::Builder::new()
            .name("logger-async".to_string())
            .spawn(move || worker.run())
            .map_err(|e| LoggerError::spawn("logger-async", e))?;

        Ok(Self {
            records,
            control,
            in_flight: Mutex::new(()),
            worker: Mutex::new(Some(handle)),
            capacity,
        })
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    /// Queue a record, blocking while the queue is full.
    pub(crate) fn submit(&self, record: LogRecord) -> Result<()> {
        self.records
            .send(record)
            .map_err(|_| LoggerError::LoggerStopped)
    }

    /// Block until every record queued before this call has been delivered
    /// and the sinks were flushed.
    pub(crate) fn flush(&self) {
        let _guard = self.in_flight.lock();
        let (ack, done) = bounded(1);
        if self.control.send(Control::Flush(ack)).is_ok() {
            let _ = done.recv();
        }
    }

    /// Drain the queue, destroy every sink and stop the worker for good.
    pub(crate) fn close(&self) {
        let _guard = self.in_flight.lock();
        let (ack, done) = bounded(1);
        if self.control.send(Control::Close(ack)).is_ok() {
            let _ = done.recv();
        }

        if let Some(handle) = self.worker.lock().take() {
            if let Err(e) = handle.join() {
                eprintln!("[LOGGER ERROR] Async worker thread panicked during shutdown: {:?}", e);
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn is_running(&self) -> bool {
        self.worker
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

struct Worker {
    records: Receiver<LogRecord>,
    control: Receiver<Control>,
    sinks: SinkList,
}

impl Worker {
    fn run(self) {
        loop {
            select! {
                recv(self.records) -> msg => match msg {
                    Ok(record) => self.deliver(&record),
                    Err(_) => break,
                },
                recv(self.control) -> msg => match msg {
                    Ok(Control::Flush(ack)) => {
                        self.drain();
                        flush_all(&self.sinks.read());
                        let _ = ack.send(());
                    }
                    Ok(Control::Close(ack)) => {
                        self.drain();
                        destroy_all(&mut self.sinks.write());
                        let _ = ack.send(());
                        break;
                    }
                    Err(_) => {
                        // Pipeline dropped without an explicit close.
                        self.drain();
                        flush_all(&self.sinks.read());
                        break;
                    }
                },
            }
        }
    }

    fn deliver(&self, record: &LogRecord) {
        fan_out(&self.sinks.read(), record);
    }

    /// Deliver everything already sitting in the queue.
    fn drain(&self) {
        while let Ok(record) = self.records.try_recv() {
            self.deliver(&record);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::log_level::LogLevel;
    use crate::core::sink::NamedSink;
    use crate::sinks::MemorySink;
    use parking_lot::RwLock;
    use std::sync::Arc;

    fn pipeline_with_memory(capacity: usize) -> (AsyncPipeline, MemorySink, SinkList) {
        let memory = MemorySink::new();
        let sinks: SinkList = Arc::new(RwLock::new(vec![NamedSink {
            name: "memory".to_string(),
            sink: Box::new(memory.clone()),
        }]));
        let pipeline = AsyncPipeline::spawn(capacity, Arc::clone(&sinks)).unwrap();
        (pipeline, memory, sinks)
    }

    #[test]
    fn test_zero_capacity_uses_default() {
        let (pipeline, _, _) = pipeline_with_memory(0);
        assert_eq!(pipeline.capacity(), DEFAULT_ASYNC_CAPACITY);
        pipeline.close();
    }

    #[test]
    fn test_flush_delivers_everything_queued_before() {
        let (pipeline, memory, _) = pipeline_with_memory(8);

        for i in 0..100 {
            pipeline
                .submit(LogRecord::new(LogLevel::Info, &format!("record {}", i)))
                .unwrap();
        }
        pipeline.flush();

        let expected: Vec<String> = (0..100).map(|i| format!("record {}", i)).collect();
        assert_eq!(memory.texts(), expected);
        pipeline.close();
    }

    #[test]
    fn test_close_destroys_sinks_and_stops_worker() {
        let (pipeline, memory, sinks) = pipeline_with_memory(4);

        pipeline
            .submit(LogRecord::new(LogLevel::Warn, "last words"))
            .unwrap();
        pipeline.close();

        assert_eq!(memory.texts(), vec!["last words".to_string()]);
        assert!(memory.is_closed());
        assert!(sinks.read().is_empty());
        assert!(!pipeline.is_running());

        let err = pipeline
            .submit(LogRecord::new(LogLevel::Info, "too late"))
            .unwrap_err();
        assert!(matches!(err, LoggerError::LoggerStopped));

        // Directives after close return immediately.
        pipeline.flush();
        pipeline.close();
    }
}
