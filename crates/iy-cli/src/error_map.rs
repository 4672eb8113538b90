use iy_core::IdleError;
use std::fmt::Display;

fn map_error(code: &'static str, error: impl Display) -> IdleError {
    IdleError::new(code, error.to_string())
}

pub(crate) fn emit_error(error: IdleError) -> i32 {
    println!("RESULT:ERROR");
    println!("ERROR_CODE:{}", error.code);
    println!("ERROR_MSG_JSON:{}", crate::json_text(&error.message));
    1
}

pub(crate) fn map_cli_source_path(error: std::io::Error) -> IdleError {
    map_error("CLI_SOURCE_PATH", error)
}

pub(crate) fn map_cli_source_scan(error: std::path::StripPrefixError) -> IdleError {
    map_error("CLI_SOURCE_SCAN", error)
}

pub(crate) fn map_cli_source_read(error: std::io::Error) -> IdleError {
    map_error("CLI_SOURCE_READ", error)
}

pub(crate) fn map_cli_state_write(error: std::io::Error) -> IdleError {
    map_error("CLI_STATE_WRITE", error)
}

pub(crate) fn map_cli_state_encode(error: serde_json::Error) -> IdleError {
    map_error("CLI_STATE_WRITE", error)
}

pub(crate) fn map_cli_state_read(error: std::io::Error) -> IdleError {
    map_error("CLI_STATE_READ", error)
}

pub(crate) fn map_cli_state_invalid(error: serde_json::Error) -> IdleError {
    map_error("CLI_STATE_INVALID", error)
}

pub(crate) fn map_cli_config_read(error: std::io::Error) -> IdleError {
    map_error("CLI_CONFIG_READ", error)
}

pub(crate) fn map_cli_config_invalid(error: serde_json::Error) -> IdleError {
    map_error("CLI_CONFIG_INVALID", error)
}
