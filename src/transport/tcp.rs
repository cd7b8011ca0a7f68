use crate::transport::{
    effective_hwm, parse_endpoint, PublishTransport, SubscribeTransport, TransportError,
};
use crossbeam_queue::ArrayQueue;
use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const ACCEPT_POLL: Duration = Duration::from_millis(100);
const RETRY_INTERVAL: Duration = Duration::from_millis(100);
const READ_POLL: Duration = Duration::from_millis(100);
const QUEUE_POLL: Duration = Duration::from_millis(1);
const RECV_POLL: Duration = Duration::from_millis(100);

/// Lock-free bounded record buffer; its capacity is the high-water-mark.
#[derive(Debug, Clone)]
pub struct RecordQueue {
    queue: Arc<ArrayQueue<Vec<u8>>>,
    capacity: usize,
}

impl RecordQueue {
    /// Creates a queue holding at most `capacity` records.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "record queue capacity must be > 0");
        Self {
            queue: Arc::new(ArrayQueue::new(capacity)),
            capacity,
        }
    }

    /// Offers a record; the record comes back when the high-water-mark is
    /// reached, so the caller decides between dropping and retrying.
    pub fn offer(&self, record: Vec<u8>) -> Result<(), Vec<u8>> {
        self.queue.push(record)
    }

    /// Takes the oldest queued record.
    pub fn take(&self) -> Option<Vec<u8>> {
        self.queue.pop()
    }

    /// Records currently queued.
    pub fn depth(&self) -> usize {
        self.queue.len()
    }

    /// Configured high-water-mark.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether the queue holds no records.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[derive(Debug)]
struct SubscriberSlot {
    queue: RecordQueue,
    alive: Arc<AtomicBool>,
}

/// Publishing end of the TCP pub/sub transport.
///
/// Accepts subscribers on a background thread. Every subscriber gets its own
/// bounded [`RecordQueue`] drained by a dedicated writer thread; `publish`
/// fans records out without ever blocking, dropping for any subscriber whose
/// queue is at the high-water-mark.
#[derive(Debug)]
pub struct TcpPublisher {
    local_addr: SocketAddr,
    slots: Arc<Mutex<Vec<SubscriberSlot>>>,
    writers: Arc<Mutex<Vec<JoinHandle<()>>>>,
    shutdown: Arc<AtomicBool>,
    accept_handle: Option<JoinHandle<()>>,
    dropped_records: u64,
}

impl TcpPublisher {
    /// Binds the publish endpoint and starts accepting subscribers.
    pub fn bind(endpoint: &str, hwm: i64) -> Result<Self, TransportError> {
        let addr = parse_endpoint(endpoint)?;
        let listener = TcpListener::bind(addr).map_err(|source| TransportError::Bind {
            endpoint: endpoint.to_string(),
            source,
        })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| TransportError::Bind {
                endpoint: endpoint.to_string(),
                source,
            })?;
        listener
            .set_nonblocking(true)
            .map_err(|source| TransportError::Bind {
                endpoint: endpoint.to_string(),
                source,
            })?;

        let slots: Arc<Mutex<Vec<SubscriberSlot>>> = Arc::new(Mutex::new(Vec::new()));
        let writers: Arc<Mutex<Vec<JoinHandle<()>>>> = Arc::new(Mutex::new(Vec::new()));
        let shutdown = Arc::new(AtomicBool::new(false));
        let accept_handle = {
            let slots = slots.clone();
            let writers = writers.clone();
            let shutdown = shutdown.clone();
            let capacity = effective_hwm(hwm);
            thread::spawn(move || accept_loop(listener, capacity, slots, writers, shutdown))
        };

        Ok(Self {
            local_addr,
            slots,
            writers,
            shutdown,
            accept_handle: Some(accept_handle),
            dropped_records: 0,
        })
    }

    /// Address the publisher actually bound (port 0 resolves here).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Currently connected subscribers.
    pub fn subscriber_count(&self) -> usize {
        lock(&self.slots)
            .iter()
            .filter(|slot| slot.alive.load(Ordering::Relaxed))
            .count()
    }

    /// Records dropped at subscriber high-water-marks since bind.
    pub fn dropped_records(&self) -> u64 {
        self.dropped_records
    }

    /// Stops accepting, flushes queued records, and joins all threads.
    pub fn close(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.accept_handle.take() {
            let _ = handle.join();
        }
        let handles: Vec<_> = lock(&self.writers).drain(..).collect();
        for handle in handles {
            let _ = handle.join();
        }
    }
}

impl PublishTransport for TcpPublisher {
    fn publish(&mut self, record: &[u8]) -> Result<(), TransportError> {
        if self.shutdown.load(Ordering::Relaxed) {
            return Err(TransportError::Closed);
        }
        let mut slots = lock(&self.slots);
        slots.retain(|slot| slot.alive.load(Ordering::Relaxed));
        for slot in slots.iter() {
            if slot.queue.offer(record.to_vec()).is_err() {
                self.dropped_records += 1;
            }
        }
        Ok(())
    }
}

impl Drop for TcpPublisher {
    fn drop(&mut self) {
        self.close();
    }
}

fn accept_loop(
    listener: TcpListener,
    capacity: usize,
    slots: Arc<Mutex<Vec<SubscriberSlot>>>,
    writers: Arc<Mutex<Vec<JoinHandle<()>>>>,
    shutdown: Arc<AtomicBool>,
) {
    while !shutdown.load(Ordering::Relaxed) {
        match listener.accept() {
            Ok((stream, _peer)) => {
                let _ = stream.set_nonblocking(false);
                let _ = stream.set_nodelay(true);
                let queue = RecordQueue::new(capacity);
                let alive = Arc::new(AtomicBool::new(true));
                lock(&slots).push(SubscriberSlot {
                    queue: queue.clone(),
                    alive: alive.clone(),
                });
                let writer_shutdown = shutdown.clone();
                let handle =
                    thread::spawn(move || writer_loop(stream, queue, alive, writer_shutdown));
                lock(&writers).push(handle);
            }
            Err(ref err) if err.kind() == io::ErrorKind::WouldBlock => {
                thread::sleep(ACCEPT_POLL);
            }
            Err(_) => thread::sleep(ACCEPT_POLL),
        }
    }
}

fn writer_loop(
    mut stream: TcpStream,
    queue: RecordQueue,
    alive: Arc<AtomicBool>,
    shutdown: Arc<AtomicBool>,
) {
    loop {
        if let Some(record) = queue.take() {
            if stream.write_all(&record).is_err() {
                break;
            }
        } else if shutdown.load(Ordering::Relaxed) {
            // queue drained, safe to stop
            break;
        } else {
            thread::sleep(QUEUE_POLL);
        }
    }
    alive.store(false, Ordering::Relaxed);
}

/// Subscribing end of the TCP pub/sub transport.
///
/// `connect` returns immediately; a background reader keeps retrying the
/// publisher until it is up (and reconnects after it goes away), delivering
/// whole records into a bounded queue. When the queue is at the
/// high-water-mark the reader waits instead of dropping — back-pressure
/// propagates to the publisher through TCP, where the publisher's own
/// high-water-mark policy applies.
#[derive(Debug)]
pub struct TcpSubscriber {
    queue: RecordQueue,
    shutdown: Arc<AtomicBool>,
    reader: Option<JoinHandle<()>>,
    recv_poll: Duration,
}

impl TcpSubscriber {
    /// Starts a subscriber for `record_len`-byte records.
    pub fn connect(endpoint: &str, record_len: usize, hwm: i64) -> Result<Self, TransportError> {
        assert!(record_len > 0, "record length must be > 0");
        let addr = parse_endpoint(endpoint)?;
        let queue = RecordQueue::new(effective_hwm(hwm));
        let shutdown = Arc::new(AtomicBool::new(false));
        let reader = {
            let queue = queue.clone();
            let shutdown = shutdown.clone();
            thread::spawn(move || reader_loop(addr, record_len, queue, shutdown))
        };
        Ok(Self {
            queue,
            shutdown,
            reader: Some(reader),
            recv_poll: RECV_POLL,
        })
    }

    /// Records waiting to be consumed.
    pub fn queued_records(&self) -> usize {
        self.queue.depth()
    }

    /// Stops the reader thread and releases the connection.
    pub fn close(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.reader.take() {
            let _ = handle.join();
        }
    }
}

impl SubscribeTransport for TcpSubscriber {
    fn subscribe(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        let deadline = Instant::now() + self.recv_poll;
        loop {
            if let Some(record) = self.queue.take() {
                return Ok(Some(record));
            }
            if self.shutdown.load(Ordering::Relaxed) {
                return Err(TransportError::Closed);
            }
            if Instant::now() >= deadline {
                return Ok(None);
            }
            thread::sleep(QUEUE_POLL);
        }
    }
}

impl Drop for TcpSubscriber {
    fn drop(&mut self) {
        self.close();
    }
}

fn reader_loop(addr: SocketAddr, record_len: usize, queue: RecordQueue, shutdown: Arc<AtomicBool>) {
    while !shutdown.load(Ordering::Relaxed) {
        let stream = match TcpStream::connect_timeout(&addr, RETRY_INTERVAL) {
            Ok(stream) => stream,
            Err(_) => {
                thread::sleep(RETRY_INTERVAL);
                continue;
            }
        };
        let _ = stream.set_read_timeout(Some(READ_POLL));
        drain_stream(stream, record_len, &queue, &shutdown);
    }
}

fn drain_stream(
    mut stream: TcpStream,
    record_len: usize,
    queue: &RecordQueue,
    shutdown: &AtomicBool,
) {
    let mut buf = vec![0u8; record_len];
    loop {
        if shutdown.load(Ordering::Relaxed) {
            return;
        }
        match read_record(&mut stream, &mut buf, shutdown) {
            Ok(ReadProgress::Record) => {
                let mut pending = buf.clone();
                loop {
                    match queue.offer(pending) {
                        Ok(()) => break,
                        Err(back) => {
                            if shutdown.load(Ordering::Relaxed) {
                                return;
                            }
                            pending = back;
                            thread::sleep(QUEUE_POLL);
                        }
                    }
                }
            }
            Ok(ReadProgress::Idle) => continue,
            Ok(ReadProgress::Eof) | Err(_) => return,
        }
    }
}

enum ReadProgress {
    Record,
    Idle,
    Eof,
}

/// Reads exactly one record, tolerating read timeouts. A timeout with no
/// bytes consumed reports `Idle`; a timeout mid-record keeps waiting so
/// record alignment is never lost.
fn read_record(
    stream: &mut TcpStream,
    buf: &mut [u8],
    shutdown: &AtomicBool,
) -> io::Result<ReadProgress> {
    let mut filled = 0;
    while filled < buf.len() {
        match stream.read(&mut buf[filled..]) {
            Ok(0) => return Ok(ReadProgress::Eof),
            Ok(n) => filled += n,
            Err(ref err)
                if err.kind() == io::ErrorKind::WouldBlock
                    || err.kind() == io::ErrorKind::TimedOut =>
            {
                if filled == 0 {
                    return Ok(ReadProgress::Idle);
                }
                if shutdown.load(Ordering::Relaxed) {
                    return Ok(ReadProgress::Eof);
                }
            }
            Err(ref err) if err.kind() == io::ErrorKind::Interrupted => {}
            Err(err) => return Err(err),
        }
    }
    Ok(ReadProgress::Record)
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
