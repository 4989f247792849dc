use std::io::Write;

use env_logger::Env;

/// Installs the global logger. `RUST_LOG` wins over the verbosity flag.
pub fn init(verbose: u8) {
    let level = match verbose {
        0 => log::Level::Info,
        1 => log::Level::Debug,
        _ => log::Level::Trace,
    };
    env_logger::Builder::from_env(Env::default().filter_or("RUST_LOG", level.to_string()))
        .format(|buf, record| {
            let style = buf.default_level_style(record.level());
            writeln!(
                buf,
                "[{style}{}{style:#} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
