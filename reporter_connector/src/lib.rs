//! Sends game reports to the reporter (collector) process over TCP.
//!
//! ```no_run
//! use reporter_connector::*;
//!
//! let report = GameReport {
//!     report_name: String::from("Crash on load"),
//!     report_text: String::from("Game crashed when loading level 2"),
//!     game_name: String::from("TestGame"),
//!     game_version: String::from("v1.0.0"),
//!     ..Default::default()
//! };
//!
//! match submit(report, &ConfigManager::default()) {
//!     Ok(AnswerCode::Ok) => println!("All good."),
//!     Ok(AnswerCode::WrongProtocol) => println!("Wrong protocol version"),
//!     Ok(AnswerCode::Unknown(code)) => println!("Unknown answer {}", code),
//!     Err(e) => println!("{}", e),
//! }
//! ```

pub mod config_manager;
pub mod reporter_service;
pub mod transport;

pub use config_manager::ConfigManager;
pub use reporter_service::{ReporterService, RetryPolicy};
pub use shared::misc::error::{SendReportError, WireError};
pub use shared::misc::report::{GameReport, ReportField};
pub use shared::network::messaging::AnswerCode;

/// Sends the report to the collector described by `config`.
///
/// Blocks until the collector answers or all connection attempts fail, run it on a
/// separate thread if the caller can't wait.
pub fn submit(report: GameReport, config: &ConfigManager) -> Result<AnswerCode, SendReportError> {
    ReporterService::new(config).send_report(report)
}
