use log::info;
use std::env;
use std::process;

extern crate memtext;

fn main() {
    let cli_config = match memtext::memcache::cli::parser::parse(env::args().collect()) {
        Ok(config) => config,
        Err(err) => {
            eprint!("{}", err);
            process::exit(1);
        }
    };

    // Vary the output based on how many times the user used the
    // "verbose" flag (i.e. 'memtextd -v -v' or 'memtextd -vv' vs '-v').
    tracing_subscriber::fmt()
        .with_max_level(cli_config.log_level())
        .init();

    info!("memtextd version: {}", memtext::version::MEMTEXT_VERSION);
    info!("Listen address: {}", cli_config.listen_address);
    info!("Listen port: {}", cli_config.port);
    info!("Connection limit: {}", cli_config.connection_limit);
    info!("Max item size: {}", cli_config.item_size_limit);
    info!("Max key size: {}", cli_config.key_size_limit);
    info!("Idle timeout: {}s", cli_config.idle_timeout);
    info!("Number of threads: {}", cli_config.threads);
    info!("Runtime type: {}", cli_config.runtime_type.as_str());

    memtext::memcache_server::runtime_builder::start_memtext_server(cli_config);
}
