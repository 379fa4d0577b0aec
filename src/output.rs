//! User-facing console lines (summaries, prompts, hints), separate from the
//! tracing log stream. Prefixes are colored only when the stream is a TTY.

use owo_colors::OwoColorize;
use std::fmt::Display;

#[derive(Clone, Copy)]
enum Stream {
    Out,
    Err,
}

fn emit(stream: Stream, label: &str, colored: impl Display, msg: &str) {
    let tty = match stream {
        Stream::Out => atty::is(atty::Stream::Stdout),
        Stream::Err => atty::is(atty::Stream::Stderr),
    };
    let line = if tty {
        format!("{colored} {msg}")
    } else {
        format!("{label} {msg}")
    };
    match stream {
        Stream::Out => println!("{line}"),
        Stream::Err => eprintln!("{line}"),
    }
}

pub fn print_info(msg: &str) {
    emit(Stream::Out, "info:", "info:".cyan().bold(), msg);
}

pub fn print_success(msg: &str) {
    emit(Stream::Out, "ok:", "ok:".green().bold(), msg);
}

pub fn print_warn(msg: &str) {
    emit(Stream::Err, "warn:", "warn:".yellow().bold(), msg);
}

pub fn print_error(msg: &str) {
    emit(Stream::Err, "error:", "error:".red().bold(), msg);
}

/// Unprefixed line for output users may script against ("src -> dest").
pub fn print_user(msg: &str) {
    println!("{msg}");
}
