//! # SME Announcements Live Data Test
//!
//! Connects to the real NSE website via lib_common and prints the normalized
//! announcements. Exits non-zero when nothing could be fetched.

use lib_common::loggers::loggerlocal::LoggerLocal;
use lib_common::markets::nse::announcements::normalize_all;
use lib_common::markets::nse::ApiCallNse;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // // Statement: Console-only logger, every level, no log file
    let logger = Arc::new(LoggerLocal::new(
        "sme_live_test".to_string(),
        Some(lib_common::LoggerLocalOptions {
            use_tty: Some(lib_common::loggers::loggerlocal::ALL_LEVELS.to_vec()),
            use_file: None,
            log_dir: None,
        }),
    ));

    let api_call = ApiCallNse::new(Arc::clone(&logger));

    println!("[*] Requesting live SME announcements from NSE...");

    match api_call.fetch_sme_announcements().await {
        Ok(raw) => {
            let normalized = normalize_all(&raw);
            println!("\n[SUCCESS] {} announcements received:", normalized.len());
            println!("-----------------------------------------------");
            println!("{}", serde_json::to_string_pretty(&normalized)?);
            println!("-----------------------------------------------");
            Ok(())
        }
        Err(e) => {
            eprintln!("\n[ERROR] SME announcements retrieval failed:");
            eprintln!(">>> {}", e);
            std::process::exit(1);
        }
    }
}
