//! In-process end-to-end runs of the probe core: generator output encoded to
//! wire records, optionally damaged in flight, then decoded, audited, and fed
//! to the comparator — the same path the binaries drive over TCP.

use seqcheck::{
    decode_record, encode_record, CheckOutcome, MonotonicClock, SeqVector, SequenceComparator,
    SequenceGenerator, DEFAULT_UPDATE_INTERVAL,
};

struct ManualClock {
    now_ns: u128,
}

impl ManualClock {
    fn new() -> Self {
        Self { now_ns: 0 }
    }

    fn advance_us(&mut self, us: u64) {
        self.now_ns += u128::from(us) * 1_000;
    }
}

impl MonotonicClock for ManualClock {
    fn now_ns(&mut self) -> u128 {
        self.now_ns
    }
}

fn generate_records(count: usize, vlen: usize) -> Vec<Vec<u8>> {
    let mut clock = ManualClock::new();
    let mut generator = SequenceGenerator::new(vlen, DEFAULT_UPDATE_INTERVAL, &mut clock);
    let mut records = Vec::with_capacity(count);
    let mut remaining = count;
    while remaining > 0 {
        let slots = remaining.min(100);
        clock.advance_us(10);
        let batch = generator.next_batch(slots, &mut clock);
        records.extend(batch.vectors.iter().map(encode_record));
        remaining -= slots;
    }
    records
}

struct VerifyRun {
    outcomes: Vec<CheckOutcome>,
    corruption_events: usize,
    comparator: SequenceComparator,
}

fn verify_records(records: &[Vec<u8>], vlen: usize, max_err: u64) -> VerifyRun {
    let mut clock = ManualClock::new();
    let mut comparator = SequenceComparator::new(max_err, &mut clock);
    let mut outcomes = Vec::with_capacity(records.len());
    let mut corruption_events = 0;
    for record in records {
        clock.advance_us(10);
        let vector = decode_record(record, vlen).expect("records are well-formed");
        if !vector.audit().is_clean() {
            corruption_events += 1;
        }
        let outcome = comparator.check(vector.reference(), &mut clock);
        let halted = matches!(outcome, CheckOutcome::Halted { .. });
        outcomes.push(outcome);
        if halted {
            break;
        }
    }
    VerifyRun {
        outcomes,
        corruption_events,
        comparator,
    }
}

#[test]
fn lossless_delivery_ends_with_zero_drops() {
    let records = generate_records(1_000, 1);
    let run = verify_records(&records, 1, 10);

    assert_eq!(run.outcomes[0], CheckOutcome::Started { actual: 0 });
    assert!(run.outcomes[1..]
        .iter()
        .all(|outcome| *outcome == CheckOutcome::Advanced));
    assert_eq!(run.comparator.expected(), 1_000);
    assert_eq!(run.comparator.dropped_count(), 0);
    assert_eq!(run.corruption_events, 0);
}

#[test]
fn removing_one_record_costs_exactly_one_drop_event() {
    let mut records = generate_records(1_000, 1);
    records.remove(500);
    let run = verify_records(&records, 1, 10);

    let drops: Vec<&CheckOutcome> = run
        .outcomes
        .iter()
        .filter(|outcome| matches!(outcome, CheckOutcome::Dropped { .. }))
        .collect();
    assert_eq!(drops.len(), 1);
    assert_eq!(
        *drops[0],
        CheckOutcome::Dropped {
            gap: 1,
            expected: 500,
            actual: 501
        }
    );
    assert_eq!(run.comparator.dropped_count(), 1);
    assert_eq!(run.comparator.expected(), 1_000);
}

#[test]
fn corrupted_vector_is_reported_but_still_tracked() {
    let mut records = generate_records(10, 4);
    // damage one element of vector 5 without touching its reference
    let mut elements = decode_record(&records[5], 4)
        .expect("well-formed record")
        .elements()
        .to_vec();
    elements[2] ^= 0xFF;
    records[5] = encode_record(&SeqVector::from_elements(elements));

    let run = verify_records(&records, 4, 10);
    assert_eq!(run.corruption_events, 1);
    assert_eq!(run.comparator.dropped_count(), 0, "corruption is not a drop");
    assert_eq!(run.comparator.expected(), 10);
}

#[test]
fn repeated_gaps_halt_the_run_mid_stream() {
    let mut records = generate_records(100, 1);
    // four separate single-item gaps against a budget of three
    for index in [80, 60, 40, 20] {
        records.remove(index);
    }
    let run = verify_records(&records, 1, 3);

    assert_eq!(
        *run.outcomes.last().expect("at least one outcome"),
        CheckOutcome::Halted { dropped_count: 4 }
    );
    // the fourth gap sits at value 80; nothing after it is examined
    assert!(run.outcomes.len() < records.len());
}
