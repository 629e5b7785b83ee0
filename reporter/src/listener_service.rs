// Std.
use std::io::prelude::*;
use std::net::*;
use std::time::Duration;

// External.
use chrono::{DateTime, Local};

// Custom.
use shared::misc::error::AppError;
use shared::misc::log_manager::*;
use shared::misc::report::GameReport;
use shared::network::messaging::*;
use shared::network::net_params::*;

/// Report with the information that the reporter adds on its side.
#[derive(Debug)]
pub struct ReceivedReport {
    pub game_report: GameReport,
    pub sender_addr: SocketAddr,
    pub received_at: DateTime<Local>,
    pub reporter_os_info: os_info::Info,
}

#[derive(Debug)]
pub enum ListenResult {
    Report(ReceivedReport),
    /// The connector uses a different protocol version (the received one),
    /// it was answered with `AnswerCode::WrongProtocol`.
    WrongProtocol(u16),
}

pub struct ListenerService {
    listener_socket: TcpListener,
    expected_protocol: u16,
    io_timeout: Option<Duration>,
}

impl ListenerService {
    /// Binds a listener socket, use port 0 to let the OS pick a port.
    pub fn bind<A: ToSocketAddrs>(addr: A) -> Result<Self, AppError> {
        let listener_socket = TcpListener::bind(addr)
            .map_err(|e| AppError::new(&e.to_string(), file!(), line!()))?;

        Ok(Self {
            listener_socket,
            expected_protocol: REPORTER_PROTOCOL,
            io_timeout: Some(Duration::from_millis(MAX_WAIT_TIME_IN_READ_WRITE_MS)),
        })
    }

    /// Changes the protocol version that connectors must use.
    pub fn with_expected_protocol(mut self, protocol_version: u16) -> Self {
        self.expected_protocol = protocol_version;
        self
    }

    /// Changes read/write timeout of accepted connections, `None` to block forever.
    pub fn with_io_timeout(mut self, io_timeout: Option<Duration>) -> Self {
        self.io_timeout = io_timeout;
        self
    }

    pub fn local_addr(&self) -> Result<SocketAddr, AppError> {
        self.listener_socket
            .local_addr()
            .map_err(|e| AppError::new(&e.to_string(), file!(), line!()))
    }

    /// Waits for a connector to connect, reads its report and answers.
    pub fn listen_for_report(&self, logger: &LogManager) -> Result<ListenResult, AppError> {
        // Wait for connection.
        let (mut socket, addr) = self
            .listener_socket
            .accept()
            .map_err(|e| AppError::new(&e.to_string(), file!(), line!()))?;

        logger.log(
            LogCategory::Info,
            &format!("accepted connection from {}", addr),
        );

        if let Err(e) = socket.set_nodelay(true) {
            logger.log(
                LogCategory::Warning,
                &format!("failed to disable Nagle algorithm: {}", e),
            );
        }

        // A silent connector should not block us forever.
        if let Err(e) = socket
            .set_read_timeout(self.io_timeout)
            .and_then(|_| socket.set_write_timeout(self.io_timeout))
        {
            return Err(AppError::new(&e.to_string(), file!(), line!()));
        }

        let result = self.receive_report(&mut socket, addr, logger);

        // Wait for the connector to finish so that it gets our answer.
        Self::wait_for_fin(&mut socket);

        result
    }

    fn receive_report(
        &self,
        socket: &mut TcpStream,
        addr: SocketAddr,
        logger: &LogManager,
    ) -> Result<ListenResult, AppError> {
        // Read reporter protocol.
        let report_protocol =
            read_u16(socket).map_err(|e| AppError::new(&e.to_string(), file!(), line!()))?;

        // Check versions before reading fields, the layout of other versions may differ.
        if report_protocol != self.expected_protocol {
            logger.log(
                LogCategory::Warning,
                &format!(
                    "connector {} uses protocol version {} while expected {}",
                    addr, report_protocol, self.expected_protocol
                ),
            );

            write_answer(socket, AnswerCode::WrongProtocol)
                .map_err(|e| AppError::new(&e.to_string(), file!(), line!()))?;

            return Ok(ListenResult::WrongProtocol(report_protocol));
        }

        // Read report.
        let game_report =
            read_report(socket).map_err(|e| AppError::new(&e.to_string(), file!(), line!()))?;

        write_answer(socket, AnswerCode::Ok)
            .map_err(|e| AppError::new(&e.to_string(), file!(), line!()))?;

        Ok(ListenResult::Report(ReceivedReport {
            game_report,
            sender_addr: addr,
            received_at: Local::now(),
            reporter_os_info: os_info::get(),
        }))
    }

    /// Discards everything the connector still sends until it closes its side
    /// (or the read times out).
    fn wait_for_fin(socket: &mut TcpStream) {
        let mut buf = [0u8; 64];
        loop {
            match socket.read(&mut buf) {
                Ok(0) | Err(_) => return,
                Ok(_) => continue,
            }
        }
    }
}
