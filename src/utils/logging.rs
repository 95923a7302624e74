use chrono::Local;
use std::io::Write;

/// Console logger: one `[YYYY-MM-DD HH:MM:SS] message` line per event on stdout.
/// Level defaults to `info` and can be overridden with `RUST_LOG`.
pub fn init_logging() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .target(env_logger::Target::Stdout)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.args()
            )
        })
        .init();
}
