use owo_colors::OwoColorize;
use safe::SafeError;

#[tokio::main]
async fn main() {
    // Load .env file if it exists (optional - won't fail if missing)
    if let Err(e) = dotenvy::dotenv() {
        if let Some(warning) = env_file_warning(&e) {
            eprintln!("{}", warning.yellow());
        }
    }

    if let Err(err) = safe::cli::run_cli().await {
        let usage = err.downcast_ref::<SafeError>().is_some_and(SafeError::is_usage);
        if usage {
            eprintln!("{}", err.yellow());
        } else {
            eprintln!("{}", format!("!! {:#}", err).red());
        }
        std::process::exit(1);
    }
}

/// Only warn if the error is NOT "file not found"
fn env_file_warning(error: &dotenvy::Error) -> Option<String> {
    if error.not_found() {
        return None;
    }
    Some(format!("Warning: Error loading .env file: {}", error))
}
