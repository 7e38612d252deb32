use slog::Drain;
use std::fs::OpenOptions;
use std::io;
use std::path::Path;

/// Asynchronous terminal logger. Every record carries the `Instance` key.
pub fn create_root_logger_for_stdout(instance: impl Into<String>) -> slog::Logger {
    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::FullFormat::new(decorator).use_file_location().build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();

    slog::Logger::root(drain, slog::o!("Instance" => instance.into()))
}

/// Asynchronous plain-text logger writing to `path`, truncating whatever was there.
pub fn create_root_logger_for_file(path: impl AsRef<Path>, instance: impl Into<String>) -> io::Result<slog::Logger> {
    let file = OpenOptions::new().create(true).write(true).truncate(true).open(path)?;

    let decorator = slog_term::PlainDecorator::new(file);
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();

    Ok(slog::Logger::root(drain, slog::o!("Instance" => instance.into())))
}
