use std::time::Duration;

use tokio_util::sync::CancellationToken;
use vehicle_api::VehicleRecord;

use super::error::EmitError;
use super::source::DataSource;
use super::transport::Transport;

/// Counters reported when the loop stops.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EmitStats {
    /// Records pulled from the source.
    pub attempted: u64,
    pub sent: u64,
    /// Records refused by the encoder.
    pub skipped: u64,
    /// Datagrams the socket refused to send.
    pub failed: u64,
}

/// Fire-and-forget emission loop: source → encode → one datagram → pause.
pub struct Emitter<S, T> {
    source: S,
    transport: T,
    interval: Duration,
    limit: Option<u64>,
    buf: Vec<u8>,
}

impl<S: DataSource, T: Transport> Emitter<S, T> {
    pub fn new(source: S, transport: T, interval: Duration) -> Self {
        Self {
            source,
            transport,
            interval,
            limit: None,
            buf: Vec::with_capacity(64),
        }
    }

    /// Stop after `limit` records have been pulled from the source.
    pub fn with_limit(mut self, limit: Option<u64>) -> Self {
        self.limit = limit;
        self
    }

    /// Encodes and sends one record. Nothing is retried.
    pub async fn emit(&mut self, record: &VehicleRecord) -> Result<(), EmitError> {
        vehicle_api::encode_into(record, &mut self.buf)?;
        self.transport.send(&self.buf).await?;
        Ok(())
    }

    /// Runs until `token` is cancelled, the limit is reached or the source runs dry.
    ///
    /// Per-iteration failures are logged and counted; they never stop the loop.
    pub async fn run(&mut self, token: CancellationToken) -> EmitStats {
        let mut stats = EmitStats::default();

        while !token.is_cancelled() {
            let Some(record) = self.source.next_record() else {
                tracing::info!("data source exhausted");
                break;
            };
            stats.attempted += 1;

            match self.emit(&record).await {
                Ok(()) => {
                    stats.sent += 1;
                    println!("Sent vehicle data: {record}");
                }
                Err(EmitError::Encoding(e)) => {
                    stats.skipped += 1;
                    tracing::warn!(iteration = stats.attempted, record = %record, error = %e, "record skipped");
                }
                Err(EmitError::Transmission(e)) => {
                    stats.failed += 1;
                    tracing::error!(iteration = stats.attempted, record = %record, error = %e, "send error");
                }
            }

            if self.limit.is_some_and(|n| stats.attempted >= n) {
                break;
            }

            tokio::select! {
                _ = token.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        stats
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    use tokio::time::Instant;

    use super::*;

    struct Fixture(VecDeque<VehicleRecord>);

    impl Fixture {
        fn new(records: impl IntoIterator<Item = VehicleRecord>) -> Self {
            Self(records.into_iter().collect())
        }

        fn repeat(record: VehicleRecord, n: usize) -> Self {
            Self::new(std::iter::repeat_n(record, n))
        }
    }

    impl DataSource for Fixture {
        fn next_record(&mut self) -> Option<VehicleRecord> {
            self.0.pop_front()
        }
    }

    /// Records every send attempt; fails the attempts listed in `fail_on` (1-based).
    #[derive(Default)]
    struct Scripted {
        fail_on: Vec<usize>,
        calls: usize,
        delivered: Vec<(usize, Vec<u8>)>,
        sent_at: Vec<Instant>,
    }

    impl Transport for Scripted {
        async fn send(&mut self, payload: &[u8]) -> std::io::Result<usize> {
            self.calls += 1;
            self.sent_at.push(Instant::now());
            if self.fail_on.contains(&self.calls) {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    "destination unreachable",
                ));
            }
            self.delivered.push((self.calls, payload.to_vec()));
            Ok(payload.len())
        }
    }

    fn sample(i: u32) -> VehicleRecord {
        VehicleRecord::new(i, 100 - i, f64::from(i) * 1.5, i % 2 == 0)
    }

    #[tokio::test(start_paused = true)]
    async fn send_failure_does_not_stop_the_loop() {
        let transport = Scripted {
            fail_on: vec![3],
            ..Default::default()
        };
        let mut emitter = Emitter::new(Fixture::new((1..=5).map(sample)), transport, Duration::from_secs(1));

        let stats = emitter.run(CancellationToken::new()).await;

        assert_eq!(
            stats,
            EmitStats {
                attempted: 5,
                sent: 4,
                skipped: 0,
                failed: 1
            }
        );
        let delivered: Vec<usize> = emitter.transport.delivered.iter().map(|(i, _)| *i).collect();
        assert_eq!(delivered, vec![1, 2, 4, 5]);
        for (i, bytes) in &emitter.transport.delivered {
            assert_eq!(vehicle_api::decode(bytes).unwrap(), sample(*i as u32));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn encoding_failure_skips_only_that_record() {
        let records = vec![sample(1), VehicleRecord::new(101, 0, 10.0, false), sample(3)];
        let mut emitter = Emitter::new(Fixture::new(records), Scripted::default(), Duration::from_secs(1));

        let stats = emitter.run(CancellationToken::new()).await;

        assert_eq!(stats.attempted, 3);
        assert_eq!(stats.sent, 2);
        assert_eq!(stats.skipped, 1);
        assert_eq!(emitter.transport.calls, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn sends_are_spaced_by_the_interval() {
        let interval = Duration::from_millis(1500);
        let mut emitter = Emitter::new(Fixture::repeat(sample(10), 6), Scripted::default(), interval);

        emitter.run(CancellationToken::new()).await;

        let times = &emitter.transport.sent_at;
        assert_eq!(times.len(), 6);
        for pair in times.windows(2) {
            assert!(pair[1] - pair[0] >= interval);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn limit_stops_without_trailing_pause() {
        let start = Instant::now();
        let mut emitter = Emitter::new(Fixture::repeat(sample(4), 100), Scripted::default(), Duration::from_secs(1))
            .with_limit(Some(3));

        let stats = emitter.run(CancellationToken::new()).await;

        assert_eq!(stats.sent, 3);
        let elapsed = Instant::now() - start;
        assert!(elapsed >= Duration::from_secs(2) && elapsed < Duration::from_secs(3), "{elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_interrupts_the_pause() {
        let token = CancellationToken::new();
        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(2500)).await;
            canceller.cancel();
        });

        let mut emitter = Emitter::new(Fixture::repeat(sample(4), 100), Scripted::default(), Duration::from_secs(1));
        let stats = emitter.run(token).await;

        // sends at t=0, 1, 2; cancelled while sleeping towards t=3
        assert_eq!(stats.sent, 3);
    }

    #[tokio::test]
    async fn cancelled_token_sends_nothing() {
        let token = CancellationToken::new();
        token.cancel();
        let mut emitter = Emitter::new(Fixture::repeat(sample(4), 10), Scripted::default(), Duration::from_secs(1));

        let stats = emitter.run(token).await;

        assert_eq!(stats, EmitStats::default());
        assert_eq!(emitter.transport.calls, 0);
    }

    #[tokio::test]
    async fn emit_writes_one_encoded_datagram() {
        let mut emitter = Emitter::new(Fixture(VecDeque::new()), Scripted::default(), Duration::from_secs(1));
        let record = VehicleRecord::new(42, 7, 55.5, false);

        emitter.emit(&record).await.unwrap();

        assert_eq!(emitter.transport.delivered.len(), 1);
        assert_eq!(emitter.transport.delivered[0].1, vehicle_api::encode(&record).unwrap());
    }

    #[derive(Clone, Default)]
    struct LogBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for LogBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn send_failure_log_names_the_dropped_record() {
        let logs = LogBuf::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let transport = Scripted {
            fail_on: vec![2],
            ..Default::default()
        };
        let mut emitter = Emitter::new(Fixture::new((1..=3).map(sample)), transport, Duration::from_secs(1));
        let stats = emitter.run(CancellationToken::new()).await;
        assert_eq!(stats.failed, 1);

        let out = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        let line = out.lines().find(|l| l.contains("send error")).unwrap();
        assert!(line.contains(&format!("record={}", sample(2))), "{line}");
    }
}
