#![deny(clippy::implicit_return)]
#![allow(clippy::needless_return)]

mod application;
mod configuration;
mod domain;
mod infrastructure;

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;

use std::env;
use std::path;
use std::process;

use anyhow::Error;
use yansi::Paint;

use crate::application::cli;
use crate::domain::models::ClientError;

/// Errors from the service itself are expected outcomes, reported without
/// the crash report.
fn service_error_message(err: &Error) -> Option<String> {
    return err
        .downcast_ref::<ClientError>()
        .map(|client_err| return client_err.to_string());
}

fn handle_error(err: Error) {
    if let Some(message) = service_error_message(&err) {
        eprintln!("{}", Paint::red(message));
        process::exit(1);
    }

    eprintln!(
        "{}",
        Paint::red(format!(
            "Oh no! Chatwire has failed with the following app version and error.\n\nVersion: {}\nError: {}",
            env!("CARGO_PKG_VERSION"),
            err
        ))
    );

    let backtrace = err.backtrace();
    if backtrace.to_string() == "disabled backtrace" {
        let args = env::args().collect::<Vec<String>>().join(" ");
        eprintln!("\nRunning the following can help explain further what the issue is:");
        eprintln!("\nRUST_BACKTRACE=1 {args}");
        eprintln!("\nOr write a debug log with:");
        eprintln!("\nRUST_LOG=chatwire {args}");
    } else {
        eprintln!("\n{}", backtrace);
    }

    process::exit(1);
}

#[tokio::main]
async fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));

    let debug_log_dir = env::var("CHATWIRE_LOG_DIR").unwrap_or_else(|_| {
        return dirs::cache_dir()
            .unwrap_or_else(env::temp_dir)
            .join("chatwire")
            .to_string_lossy()
            .to_string();
    });

    let file_appender = tracing_appender::rolling::never(path::PathBuf::from(debug_log_dir), "debug.log");
    let (writer, _guard) = tracing_appender::non_blocking(file_appender);
    if env::var("RUST_LOG")
        .unwrap_or_else(|_| return "".to_string())
        .contains("chatwire")
    {
        tracing_subscriber::fmt()
            .json()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(writer)
            .init();
    }

    if let Err(err) = cli::parse().await {
        handle_error(err);
    }
}
