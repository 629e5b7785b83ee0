// Std.
use std::net::{Ipv4Addr, SocketAddrV4};
use std::process::ExitCode;

// Custom.
use reporter::listener_service::*;
use shared::misc::log_manager::*;
use shared::network::net_params::DEFAULT_SERVER_PORT;

const LOG_DIR: &str = "reporter_logs";
const LOG_FILE_NAME: &str = "reporter.log";

fn main() -> ExitCode {
    let port = match std::env::args().nth(1) {
        None => DEFAULT_SERVER_PORT,
        Some(arg) => match arg.parse::<u16>() {
            Ok(port) => port,
            Err(_) => {
                eprintln!("usage: reporter [port]");
                return ExitCode::from(2);
            }
        },
    };

    // Prepare logging.
    let mut logger = match LogManager::new(LOG_DIR, LOG_FILE_NAME) {
        Ok(logger) => logger,
        Err(app_error) => {
            eprintln!("{}", app_error);
            return ExitCode::FAILURE;
        }
    };
    logger.set_print_to_stdout(true);
    logger.log(LogCategory::Info, "Starting.");

    let listener = match ListenerService::bind(SocketAddrV4::new(Ipv4Addr::LOCALHOST, port)) {
        Ok(listener) => listener,
        Err(app_error) => {
            logger.log(LogCategory::Error, &app_error.to_string());
            return ExitCode::FAILURE;
        }
    };

    logger.log(
        LogCategory::Info,
        &format!("Listening for reports on port {}...", port),
    );

    loop {
        match listener.listen_for_report(&logger) {
            Ok(ListenResult::Report(received)) => {
                logger.log(
                    LogCategory::Info,
                    &format!(
                        "Received a report from {} at {} (reporter OS: {}): {:?}",
                        received.sender_addr,
                        received.received_at.format("%Y-%m-%d %H:%M:%S"),
                        received.reporter_os_info,
                        received.game_report
                    ),
                );
            }
            Ok(ListenResult::WrongProtocol(version)) => {
                logger.log(
                    LogCategory::Warning,
                    &format!("Rejected a report with protocol version {}.", version),
                );
            }
            Err(app_error) => {
                logger.log(LogCategory::Error, &app_error.to_string());
            }
        }
    }
}
