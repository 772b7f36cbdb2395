//! Select end-to-end suite.
//!
//! Exercises the multiplexer, the background readers and the wrapped streams
//! together against scripted blocking sources: stalled sources, delayed
//! sources, mid-stream errors and arbitrary read chunking.

use ioselect::test_utils::init_test_logging;
use ioselect::{ReadPhase, Select, SelectBuilder, SelectReader};
use ioselect::{assert_with_log, test_complete, test_phase};
use proptest::prelude::*;
use std::collections::VecDeque;
use std::io::{self, Cursor, Read};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

// ============================================================================
// Test Infrastructure
// ============================================================================

fn init_test(name: &str) {
    init_test_logging();
    test_phase!(name);
}

/// Blocks forever in `read`.
struct Stalled;

impl Read for Stalled {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        loop {
            thread::park();
        }
    }
}

/// Sleeps before its first read, then serves `data`.
struct Delayed {
    delay: Option<Duration>,
    data: Cursor<Vec<u8>>,
}

impl Delayed {
    fn new(delay: Duration, data: &[u8]) -> Self {
        Self {
            delay: Some(delay),
            data: Cursor::new(data.to_vec()),
        }
    }
}

impl Read for Delayed {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if let Some(delay) = self.delay.take() {
            thread::sleep(delay);
        }
        self.data.read(buf)
    }
}

/// What a single `read` call on a [`Scripted`] source does.
#[derive(Debug, Clone)]
enum Step {
    Data(Vec<u8>),
    Fail(io::ErrorKind),
}

/// Replays a fixed script of reads, then reports end-of-stream. Counts calls.
struct Scripted {
    steps: VecDeque<Step>,
    pending: Vec<u8>,
    calls: Arc<AtomicUsize>,
}

impl Scripted {
    fn new(steps: Vec<Step>) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let source = Self {
            steps: steps.into(),
            pending: Vec::new(),
            calls: Arc::clone(&calls),
        };
        (source, calls)
    }
}

impl Read for Scripted {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.pending.is_empty() {
            match self.steps.pop_front() {
                Some(Step::Data(data)) => self.pending = data,
                Some(Step::Fail(kind)) => return Err(io::Error::new(kind, "scripted failure")),
                None => return Ok(0),
            }
        }
        let n = self.pending.len().min(buf.len());
        buf[..n].copy_from_slice(&self.pending[..n]);
        self.pending.drain(..n);
        Ok(n)
    }
}

/// What a caller observes from one `read`.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Observed {
    Bytes(Vec<u8>),
    Eof,
    Error(io::ErrorKind),
}

/// Reads until end-of-stream, cycling through `sizes` for destination
/// capacities, and records every result.
fn observe<R: Read>(reader: &mut R, sizes: &[usize]) -> Vec<Observed> {
    let mut seen = Vec::new();
    let mut sizes = sizes.iter().copied().cycle();
    loop {
        let mut dst = vec![0_u8; sizes.next().unwrap_or(64).max(1)];
        match reader.read(&mut dst) {
            Ok(0) => {
                seen.push(Observed::Eof);
                return seen;
            }
            Ok(n) => seen.push(Observed::Bytes(dst[..n].to_vec())),
            Err(err) => seen.push(Observed::Error(err.kind())),
        }
    }
}

/// Merges adjacent byte observations so results compare independently of
/// chunking.
fn coalesce(seen: Vec<Observed>) -> Vec<Observed> {
    let mut out: Vec<Observed> = Vec::new();
    for item in seen {
        match (out.last_mut(), item) {
            (Some(Observed::Bytes(prev)), Observed::Bytes(more)) => prev.extend(more),
            (_, item) => out.push(item),
        }
    }
    out
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn stalled_source_does_not_hide_ready_one() {
    init_test("stalled_source_does_not_hide_ready_one");
    let sources: Vec<Box<dyn Read + Send>> = vec![
        Box::new(Stalled),
        Box::new(Cursor::new(b"hello\n".to_vec())),
    ];
    let (select, readers) = Select::new(sources).expect("start select");
    assert_with_log!(readers.len() == 2, "readers", 2, readers.len());

    let ready = select.select();
    assert_with_log!(ready.index == 1, "ready index", 1, ready.index);

    let (_, mut reader) = ready.into_parts();
    let seen = observe(&mut reader, &[64]);
    let expected = vec![Observed::Bytes(b"hello\n".to_vec()), Observed::Eof];
    assert_with_log!(seen == expected, "bytes then eof", expected, seen);

    let phase = readers[0].phase();
    assert_with_log!(phase == ReadPhase::Pending, "stalled stays pending", ReadPhase::Pending, phase);
    let again = select.try_select();
    assert_with_log!(again.is_none(), "stalled never reported", "None", again);
    test_complete!("stalled_source_does_not_hide_ready_one");
}

#[test]
fn one_byte_reads_follow_draining_boundary() {
    init_test("one_byte_reads_follow_draining_boundary");
    let (select, _readers) = Select::new(vec![Cursor::new(b"ab".to_vec())]).expect("start select");
    let mut reader = select.select().reader;
    let mut dst = [0_u8; 1];

    let first = reader.read(&mut dst).expect("first");
    assert_with_log!((first, dst[0]) == (1, b'a'), "first", (1, b'a'), (first, dst[0]));
    let second = reader.read(&mut dst).expect("second");
    assert_with_log!((second, dst[0]) == (1, b'b'), "second", (1, b'b'), (second, dst[0]));
    let phase = reader.phase();
    assert_with_log!(phase == ReadPhase::PassThrough, "drained", ReadPhase::PassThrough, phase);
    let third = reader.read(&mut dst).expect("third");
    assert_with_log!(third == 0, "end of stream", 0, third);
    test_complete!("one_byte_reads_follow_draining_boundary");
}

#[test]
fn timeout_then_later_wait_returns_delayed_source() {
    init_test("timeout_then_later_wait_returns_delayed_source");
    let start = Instant::now();
    let (select, _readers) =
        Select::new(vec![Delayed::new(Duration::from_millis(50), b"late")]).expect("start select");

    let early = select.select_timeout(Duration::from_millis(10));
    let early_elapsed = start.elapsed();
    assert_with_log!(early.is_none(), "early timeout", "None", early);
    let waited = early_elapsed >= Duration::from_millis(10);
    assert_with_log!(waited, "waited for the timeout", ">= 10ms", early_elapsed);
    assert_with_log!(select.remaining() == 1, "still owed", 1, select.remaining());

    let ready = select
        .select_timeout(Duration::from_secs(5))
        .expect("delayed source reported");
    let total = start.elapsed();
    assert_with_log!(ready.index == 0, "index", 0, ready.index);
    let in_time = total >= Duration::from_millis(50) && total < Duration::from_secs(2);
    assert_with_log!(in_time, "reported after its read", "50ms..2s", total);

    let mut text = String::new();
    (&ready.reader).read_to_string(&mut text).expect("read");
    assert_with_log!(text == "late", "bytes", "late", text);
    test_complete!("timeout_then_later_wait_returns_delayed_source");
}

#[test]
fn expired_timeout_is_followed_by_blocking_select() {
    init_test("expired_timeout_is_followed_by_blocking_select");
    let (select, _readers) =
        Select::new(vec![Delayed::new(Duration::from_millis(30), b"x")]).expect("start select");
    let none = select.select_timeout(Duration::from_millis(1));
    assert_with_log!(none.is_none(), "timeout", "None", none);
    let ready = select.select();
    assert_with_log!(ready.index == 0, "not lost", 0, ready.index);
    assert_with_log!(select.remaining() == 0, "remaining", 0, select.remaining());
    test_complete!("expired_timeout_is_followed_by_blocking_select");
}

#[test]
fn sources_reported_in_completion_order() {
    init_test("sources_reported_in_completion_order");
    let sources = vec![
        Delayed::new(Duration::from_millis(150), b"slow"),
        Delayed::new(Duration::from_millis(0), b"fast"),
        Delayed::new(Duration::from_millis(75), b"mid"),
    ];
    let (select, _readers) = Select::new(sources).expect("start select");
    let order: Vec<usize> = (0..3).map(|_| select.select().index).collect();
    assert_with_log!(order == [1, 2, 0], "order", [1, 2, 0], order);
    test_complete!("sources_reported_in_completion_order");
}

#[test]
fn select_deadline_in_the_past_only_takes_queued() {
    init_test("select_deadline_in_the_past_only_takes_queued");
    let (select, _readers) = Select::new(vec![Cursor::new(b"now".to_vec())]).expect("start select");
    let first = select.select();
    assert_with_log!(first.index == 0, "index", 0, first.index);
    let past = Instant::now().checked_sub(Duration::from_millis(1)).unwrap_or_else(Instant::now);
    let got = select.select_deadline(past);
    assert_with_log!(got.is_none(), "nothing left", "None", got);
    test_complete!("select_deadline_in_the_past_only_takes_queued");
}

// ============================================================================
// Read transparency
// ============================================================================

#[test]
fn read_before_select_blocks_then_succeeds() {
    init_test("read_before_select_blocks_then_succeeds");
    let (select, readers) =
        Select::new(vec![Delayed::new(Duration::from_millis(20), b"early bird")]).expect("start select");

    let reader: SelectReader<Delayed> = readers[0].clone();
    let mut text = String::new();
    (&reader).read_to_string(&mut text).expect("read before select");
    assert_with_log!(text == "early bird", "bytes", "early bird", text);

    let ready = select.select();
    assert_with_log!(ready.index == 0, "still reported", 0, ready.index);
    test_complete!("read_before_select_blocks_then_succeeds");
}

#[test]
fn source_read_once_in_background() {
    init_test("source_read_once_in_background");
    let (source, calls) = Scripted::new(vec![Step::Data(b"abc".to_vec()), Step::Data(b"def".to_vec())]);
    let (select, _readers) = Select::new(vec![source]).expect("start select");
    let reader = select.select().reader;

    let count = calls.load(Ordering::SeqCst);
    assert_with_log!(count == 1, "one background read", 1, count);

    let mut dst = [0_u8; 1];
    for _ in 0..3 {
        (&reader).read_exact(&mut dst).expect("drain");
    }
    let count = calls.load(Ordering::SeqCst);
    assert_with_log!(count == 1, "draining is source-free", 1, count);

    let mut rest = Vec::new();
    (&reader).read_to_end(&mut rest).expect("rest");
    assert_with_log!(rest == b"def", "rest", "def", rest);
    test_complete!("source_read_once_in_background");
}

#[test]
fn errors_keep_their_position() {
    init_test("errors_keep_their_position");
    let script = vec![
        Step::Fail(io::ErrorKind::ConnectionReset),
        Step::Data(b"abc".to_vec()),
        Step::Fail(io::ErrorKind::BrokenPipe),
        Step::Data(b"def".to_vec()),
    ];
    let (direct, _) = Scripted::new(script.clone());
    let expected = observe(&mut { direct }, &[2]);

    let (source, _) = Scripted::new(script);
    let (select, _readers) = Select::new(vec![source]).expect("start select");
    let mut reader = select.select().reader;
    let seen = observe(&mut reader, &[2]);

    assert_with_log!(seen == expected, "same observations", expected, seen);
    let errors = seen.iter().filter(|o| matches!(o, Observed::Error(_))).count();
    assert_with_log!(errors == 2, "each error once", 2, errors);
    test_complete!("errors_keep_their_position");
}

#[test]
fn small_buffer_size_splits_prefetch() {
    init_test("small_buffer_size_splits_prefetch");
    let (select, _readers) = SelectBuilder::new()
        .buffer_size(3)
        .thread_name("tiny")
        .build(vec![Cursor::new(b"abcdefgh".to_vec())])
        .expect("start select");
    let mut reader = select.select().reader;
    let mut dst = [0_u8; 16];
    let n = reader.read(&mut dst).expect("prefetched");
    assert_with_log!(&dst[..n] == b"abc", "prefetch capped", "abc", &dst[..n]);
    let mut rest = Vec::new();
    reader.read_to_end(&mut rest).expect("rest");
    assert_with_log!(rest == b"defgh", "rest", "defgh", rest);
    test_complete!("small_buffer_size_splits_prefetch");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn wrapped_reads_match_direct_reads(
        data in proptest::collection::vec(any::<u8>(), 0..3000),
        sizes in proptest::collection::vec(1_usize..300, 1..8),
        fail_first in any::<bool>(),
    ) {
        init_test_logging();
        let mut script = Vec::new();
        if fail_first {
            script.push(Step::Fail(io::ErrorKind::Interrupted));
        }
        script.push(Step::Data(data));

        let (direct, _) = Scripted::new(script.clone());
        let expected = coalesce(observe(&mut { direct }, &sizes));

        let (source, _) = Scripted::new(script);
        let (select, _readers) = Select::new(vec![source]).expect("start select");
        let mut reader = select.select().reader;
        let seen = coalesce(observe(&mut reader, &sizes));

        prop_assert_eq!(seen, expected);
    }
}
