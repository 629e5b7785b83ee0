// Std.
use std::net::SocketAddr;
use std::thread;
use std::time::Duration;

// Custom.
use crate::config_manager::ConfigManager;
use crate::transport::{ReportTransport, TcpTransport};
use shared::misc::error::SendReportError;
use shared::misc::report::GameReport;
use shared::network::messaging::*;
use shared::network::net_params::*;

/// How many times to try connecting and how long to wait between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: RETRY_CONNECT_COUNT,
            interval: Duration::from_millis(RETRY_CONNECT_INTERVAL_MS),
        }
    }
}

/// Delivers reports to the collector, one connection per report.
pub struct ReporterService<T: ReportTransport> {
    transport: T,
    server_host: String,
    server_port: u16,
    retry_policy: RetryPolicy,
}

impl ReporterService<TcpTransport> {
    /// Creates a service that uses TCP and the specified configuration.
    pub fn new(config: &ConfigManager) -> Self {
        Self::with_transport(
            TcpTransport::new(config.connect_timeout(), config.io_timeout()),
            &config.server_host,
            config.server_port,
            config.retry_policy(),
        )
    }
}

impl<T: ReportTransport> ReporterService<T> {
    pub fn with_transport(
        transport: T,
        server_host: &str,
        server_port: u16,
        retry_policy: RetryPolicy,
    ) -> Self {
        Self {
            transport,
            server_host: String::from(server_host),
            server_port,
            retry_policy,
        }
    }

    /// Returns "host:port" of the collector.
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    /// Checks the report, connects to the collector (retrying if it's not ready yet),
    /// sends the report and waits for the answer.
    ///
    /// Only connection attempts are retried, once connected any error is final.
    ///
    /// ## Return
    /// Answer of the collector, `AnswerCode::WrongProtocol` is a valid answer and not an error.
    pub fn send_report(&mut self, report: GameReport) -> Result<AnswerCode, SendReportError> {
        // Check fields limit.
        if let Some(field) = report.check_fields_limit() {
            return Err(SendReportError::FieldTooLong { field });
        }

        let addrs = self
            .transport
            .resolve(&self.server_host, self.server_port)
            .map_err(|source| SendReportError::AddressResolution {
                address: self.server_address(),
                source,
            })?;

        let mut stream = self.connect_with_retry(&addrs)?;

        self.transport.tune(&stream);

        let result = Self::exchange(&mut stream, &report);

        // Finish connection.
        self.transport.close(stream);

        result
    }

    fn connect_with_retry(&mut self, addrs: &[SocketAddr]) -> Result<T::Stream, SendReportError> {
        let max_attempts = self.retry_policy.max_attempts.max(1);
        let mut attempt: usize = 1;

        loop {
            match self.transport.connect(addrs) {
                Ok(stream) => return Ok(stream),
                Err(source) if attempt >= max_attempts => {
                    return Err(SendReportError::CouldNotConnect {
                        address: self.server_address(),
                        attempts: attempt,
                        source,
                    });
                }
                Err(_) => {
                    // The collector might still be starting, try again later.
                    thread::sleep(self.retry_policy.interval);
                    attempt += 1;
                }
            }
        }
    }

    fn exchange(stream: &mut T::Stream, report: &GameReport) -> Result<AnswerCode, SendReportError> {
        write_report(stream, REPORTER_PROTOCOL, report)?;

        Ok(read_answer(stream)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::misc::error::WireError;
    use shared::misc::report::ReportField;
    use std::io::{Cursor, Read, Write};
    use std::net::{IpAddr, Ipv4Addr};
    use std::time::Instant;

    const ECONNREFUSED: i32 = 111;

    struct MockStream {
        written: Vec<u8>,
        reply: Cursor<Vec<u8>>,
        write_limit: Option<usize>,
    }

    impl Write for MockStream {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            let count = self.write_limit.map_or(buf.len(), |limit| buf.len().min(limit));
            self.written.extend_from_slice(&buf[..count]);
            Ok(count)
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Read for MockStream {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            self.reply.read(buf)
        }
    }

    #[derive(Default)]
    struct MockTransport {
        resolve_fails: bool,
        failing_connects: usize,
        reply: Vec<u8>,
        write_limit: Option<usize>,
        resolve_calls: usize,
        connect_times: Vec<Instant>,
        tuned: usize,
        closed: Vec<Vec<u8>>,
    }

    impl ReportTransport for MockTransport {
        type Stream = MockStream;

        fn resolve(&mut self, _host: &str, port: u16) -> std::io::Result<Vec<SocketAddr>> {
            self.resolve_calls += 1;
            if self.resolve_fails {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "unknown host",
                ));
            }
            Ok(vec![SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port)])
        }

        fn connect(&mut self, _addrs: &[SocketAddr]) -> std::io::Result<MockStream> {
            self.connect_times.push(Instant::now());
            if self.connect_times.len() <= self.failing_connects {
                return Err(std::io::Error::from_raw_os_error(ECONNREFUSED));
            }
            Ok(MockStream {
                written: Vec::new(),
                reply: Cursor::new(self.reply.clone()),
                write_limit: self.write_limit,
            })
        }

        fn tune(&mut self, _stream: &MockStream) {
            self.tuned += 1;
        }

        fn close(&mut self, stream: MockStream) {
            self.closed.push(stream.written);
        }
    }

    fn sample_report() -> GameReport {
        GameReport {
            report_name: String::from("Crash on load"),
            report_text: String::from("Game crashed when loading level 2"),
            sender_name: String::from("Alex"),
            sender_email: String::from("a@example.com"),
            game_name: String::from("TestGame"),
            game_version: String::from("v1.0.0"),
        }
    }

    fn service(transport: MockTransport) -> ReporterService<MockTransport> {
        ReporterService::with_transport(
            transport,
            "localhost",
            DEFAULT_SERVER_PORT,
            RetryPolicy {
                max_attempts: 5,
                interval: Duration::from_millis(20),
            },
        )
    }

    #[test]
    fn default_retry_policy() {
        let policy = RetryPolicy::default();

        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.interval, Duration::from_secs(1));
    }

    #[test]
    fn ok_answer_after_full_frame() {
        let mut service = service(MockTransport {
            reply: vec![0, 0],
            ..Default::default()
        });

        let result = service.send_report(sample_report());

        assert_eq!(result.unwrap(), AnswerCode::Ok);

        let mut expected = Vec::new();
        write_report(&mut expected, REPORTER_PROTOCOL, &sample_report()).unwrap();
        assert_eq!(service.transport.closed, vec![expected]);
        assert_eq!(service.transport.tuned, 1);
        assert_eq!(service.transport.connect_times.len(), 1);
    }

    #[test]
    fn wrong_protocol_is_an_answer() {
        let mut service = service(MockTransport {
            reply: vec![1, 0],
            ..Default::default()
        });

        let result = service.send_report(sample_report());

        assert_eq!(result.unwrap(), AnswerCode::WrongProtocol);
    }

    #[test]
    fn unknown_answer_is_passed_through() {
        let mut service = service(MockTransport {
            reply: vec![42, 0],
            ..Default::default()
        });

        let result = service.send_report(sample_report());

        assert_eq!(result.unwrap(), AnswerCode::Unknown(42));
    }

    #[test]
    fn oversized_report_never_touches_network() {
        let mut service = service(MockTransport {
            reply: vec![0, 0],
            ..Default::default()
        });
        let mut report = sample_report();
        report.report_text = "x".repeat(5121);

        let result = service.send_report(report);

        assert!(matches!(
            result,
            Err(SendReportError::FieldTooLong {
                field: ReportField::ReportText
            })
        ));
        assert_eq!(service.transport.resolve_calls, 0);
        assert!(service.transport.connect_times.is_empty());
        assert!(service.transport.closed.is_empty());
    }

    #[test]
    fn resolution_failure_is_not_retried() {
        let mut service = service(MockTransport {
            resolve_fails: true,
            ..Default::default()
        });

        let result = service.send_report(sample_report());

        match result {
            Err(SendReportError::AddressResolution { address, .. }) => {
                assert_eq!(address, format!("localhost:{}", DEFAULT_SERVER_PORT));
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(service.transport.resolve_calls, 1);
        assert!(service.transport.connect_times.is_empty());
    }

    #[test]
    fn connects_after_collector_starts() {
        let mut service = service(MockTransport {
            failing_connects: 3,
            reply: vec![0, 0],
            ..Default::default()
        });

        let result = service.send_report(sample_report());

        assert_eq!(result.unwrap(), AnswerCode::Ok);
        assert_eq!(service.transport.resolve_calls, 1);

        let times = &service.transport.connect_times;
        assert_eq!(times.len(), 4);
        for pair in times.windows(2) {
            assert!(pair[1].duration_since(pair[0]) >= Duration::from_millis(20));
        }
    }

    #[test]
    fn gives_up_after_max_attempts() {
        let mut service = service(MockTransport {
            failing_connects: usize::MAX,
            ..Default::default()
        });

        let result = service.send_report(sample_report());

        let error = result.unwrap_err();
        assert_eq!(error.os_error_code(), Some(ECONNREFUSED));
        assert!(matches!(
            error,
            SendReportError::CouldNotConnect { attempts: 5, .. }
        ));
        assert_eq!(service.transport.connect_times.len(), 5);
        assert!(service.transport.closed.is_empty());
    }

    #[test]
    fn zero_attempts_still_tries_once() {
        let mut service = ReporterService::with_transport(
            MockTransport {
                failing_connects: usize::MAX,
                ..Default::default()
            },
            "localhost",
            DEFAULT_SERVER_PORT,
            RetryPolicy {
                max_attempts: 0,
                interval: Duration::from_millis(1),
            },
        );

        let result = service.send_report(sample_report());

        assert!(matches!(
            result,
            Err(SendReportError::CouldNotConnect { attempts: 1, .. })
        ));
        assert_eq!(service.transport.connect_times.len(), 1);
    }

    #[test]
    fn short_write_is_not_retried() {
        let mut service = service(MockTransport {
            write_limit: Some(1),
            reply: vec![0, 0],
            ..Default::default()
        });

        let result = service.send_report(sample_report());

        assert!(matches!(
            result,
            Err(SendReportError::Transport(WireError::ShortWrite {
                sent: 1,
                expected: 2
            }))
        ));
        assert_eq!(service.transport.connect_times.len(), 1);
        assert_eq!(service.transport.closed.len(), 1);
    }

    #[test]
    fn short_read_is_not_retried() {
        let mut service = service(MockTransport {
            reply: vec![0],
            ..Default::default()
        });

        let result = service.send_report(sample_report());

        assert!(matches!(
            result,
            Err(SendReportError::Transport(WireError::ShortRead {
                received: 1,
                expected: 2
            }))
        ));
        assert_eq!(service.transport.connect_times.len(), 1);
        assert_eq!(service.transport.closed.len(), 1);
    }
}
