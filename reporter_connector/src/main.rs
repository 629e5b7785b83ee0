// Std.
use std::path::Path;
use std::process::ExitCode;

// Custom.
use reporter_connector::config_manager::CONFIG_FILE_NAME;
use reporter_connector::*;
use shared::misc::log_manager::*;

const LOG_DIR: &str = "reporter_connector_logs";
const LOG_FILE_NAME: &str = "reporter_connector.log";

const USAGE: &str = "usage: reporter_connector <report name> <report text> <game name> \
<game version> [sender name] [sender e-mail]";

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 4 || args.len() > 6 {
        eprintln!("{}", USAGE);
        return ExitCode::from(2);
    }

    // Prepare logging.
    let logger = match LogManager::new(LOG_DIR, LOG_FILE_NAME) {
        Ok(logger) => logger,
        Err(app_error) => {
            eprintln!("{}", app_error);
            return ExitCode::FAILURE;
        }
    };

    let config = match ConfigManager::load(Path::new(CONFIG_FILE_NAME)) {
        Ok(config) => config,
        Err(app_error) => {
            logger.log(LogCategory::Error, &app_error.to_string());
            eprintln!("{}", app_error);
            return ExitCode::FAILURE;
        }
    };

    let mut args = args.into_iter();
    let mut next_arg = || args.next().unwrap_or_default();
    let report = GameReport {
        report_name: next_arg(),
        report_text: next_arg(),
        game_name: next_arg(),
        game_version: next_arg(),
        sender_name: next_arg(),
        sender_email: next_arg(),
    };

    logger.log(
        LogCategory::Info,
        &format!(
            "sending report \"{}\" to {}:{}",
            report.report_name, config.server_host, config.server_port
        ),
    );

    match submit(report, &config) {
        Ok(AnswerCode::Ok) => {
            logger.log(LogCategory::Info, "the report was accepted");
            println!("All good.");
            ExitCode::SUCCESS
        }
        Ok(AnswerCode::WrongProtocol) => {
            logger.log(
                LogCategory::Warning,
                "the reporter uses a different protocol version",
            );
            println!("Wrong protocol version");
            ExitCode::FAILURE
        }
        Ok(AnswerCode::Unknown(code)) => {
            logger.log(
                LogCategory::Warning,
                &format!("received unknown answer code {}", code),
            );
            println!("Unknown answer code {}", code);
            ExitCode::FAILURE
        }
        Err(SendReportError::FieldTooLong { field }) => {
            logger.log(
                LogCategory::Warning,
                &format!("field \"{}\" has wrong size", field),
            );
            println!("Field with ID {} has wrong size.", field.id());
            ExitCode::FAILURE
        }
        Err(e) => {
            logger.log(LogCategory::Error, &e.to_string());
            println!("{}", e);
            ExitCode::FAILURE
        }
    }
}
