/// Utility functions for terminal output with styled messages.
///
/// This module provides functions to print styled messages to the terminal,
/// including warnings, logs, success messages, errors, and other formatted
/// outputs.
use colored::*;

// Print a WARNING message with a prefix in bold yellow.
#[allow(dead_code)]
pub fn print_warning(message: &str) {
    println!("{}: {}", "[WARNING]".yellow().bold(), message);
}

// Print a simple LOG message with a prefix in bold white.
#[allow(dead_code)]
pub fn print_log(message: &str) {
    println!("{}: {}", "[LOG]".white().bold(), message);
}

// Print a SUCCESS message with a prefix in bold green.
pub fn print_success(message: &str) {
    println!("{}: {}", "[SUCCESS]".green().bold(), message);
}

// Print an ERROR message with a prefix in bold red, to stderr.
pub fn print_error(message: &str) {
    eprintln!("{}: {}", "[ERROR]".red().bold(), message);
}

// Print FlumeSim welcome message
pub fn print_welcome_message() {
    println!("{}", "-".repeat(72));
    println!(
        "{}",
        r#"
  ______ _                      _____ _
 |  ____| |                    / ____(_)
 | |__  | |_   _ _ __ ___   __| (___  _ _ __ ___
 |  __| | | | | | '_ ` _ \ / _ \___ \| | '_ ` _ \
 | |    | | |_| | | | | | |  __/___) | | | | | | |
 |_|    |_|\__,_|_| |_| |_|\___|____/|_|_| |_| |_|
"#
        .blue()
        .bold()
    );
}

/// Closing stanza: Reynolds number, the three timings, and throughput.
pub fn print_metrics(
    reynolds: f32,
    elapsed: f64,
    user_time: f64,
    system_time: f64,
    time_steps: u64,
    mlups: f64,
) {
    println!("{}", "-".repeat(72));
    println!("==done==");
    println!("Reynolds number:\t\t{:.12E}", reynolds);
    println!("Elapsed time:\t\t\t{:.6} (s)", elapsed);
    println!("Elapsed user CPU time:\t\t{:.6} (s)", user_time);
    println!("Elapsed system CPU time:\t{:.6} (s)", system_time);
    println!("{} time steps", time_steps);
    println!("{}: {:.2} MLUps\n", "Performance".white().bold(), mlups);
}
