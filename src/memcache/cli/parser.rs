use byte_unit::Byte;
use clap::{command, Parser, ValueEnum};
use std::{fmt::Debug, net::IpAddr, ops::RangeInclusive};

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
pub enum RuntimeType {
    /// every connection handled on a single thread runtime
    CurrentThread,
    /// work stealing threadpool runtime
    MultiThread,
}

impl RuntimeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuntimeType::CurrentThread => "Work handled within current thread runtime",
            RuntimeType::MultiThread => "Work stealing threadpool runtime",
        }
    }
}

const DEFAULT_PORT: u16 = 1234;
const DEFAULT_ADDRESS: &str = "127.0.0.1";
const CONNECTION_LIMIT: u32 = 1024;
const MAX_ITEM_SIZE: &str = "1MiB";
const MAX_KEY_SIZE: usize = 250;
const IDLE_TIMEOUT_SECS: u64 = 0;

fn get_default_threads_number() -> usize {
    num_cpus::get_physical()
}

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
/// memcached text protocol compatible server implementation in Rust
pub struct MemtextdConfig {
    #[arg(short, long, value_name = "PORT", value_parser = port_in_range, default_value_t = DEFAULT_PORT)]
    /// TCP port to listen on
    pub port: u16,

    #[arg(short, long, value_name = "CONNECTION-LIMIT", default_value_t = CONNECTION_LIMIT)]
    /// max simultaneous connections
    pub connection_limit: u32,

    #[arg(short, long, value_name = "MAX-ITEM-SIZE", value_parser = parse_memory, default_value = MAX_ITEM_SIZE)]
    /// adjusts max item size
    pub item_size_limit: u64,

    #[arg(short, long, value_name = "MAX-KEY-SIZE", default_value_t = MAX_KEY_SIZE)]
    /// adjusts max key length in bytes
    pub key_size_limit: usize,

    #[arg(long, value_name = "IDLE-TIMEOUT", default_value_t = IDLE_TIMEOUT_SECS)]
    /// idle read timeout in seconds, 0 disables the timeout
    pub idle_timeout: u64,

    #[arg(short, long, value_name = "THREADS", default_value_t = get_default_threads_number())]
    /// number of threads to use (defaults to number of cores)
    pub threads: usize,

    #[arg(short, long, action = clap::ArgAction::Count, default_value_t = 1)]
    /// sets the level of verbosity
    pub verbose: u8,

    #[arg(short, long, value_name = "listen", default_value_t = String::from(DEFAULT_ADDRESS).parse::<IpAddr>().unwrap())]
    /// interface to listen on
    pub listen_address: IpAddr,

    #[arg(short, long, value_name = "RUNTIME-TYPE", default_value_t = RuntimeType::MultiThread, value_enum)]
    /// runtime type to use
    pub runtime_type: RuntimeType,
}

const PORT_RANGE: RangeInclusive<usize> = 1..=65535;

fn port_in_range(s: &str) -> Result<u16, String> {
    let port: usize = s
        .parse()
        .map_err(|_| format!("`{s}` isn't a port number"))?;
    if PORT_RANGE.contains(&port) {
        Ok(port as u16)
    } else {
        Err(format!(
            "port not in range {}-{}",
            PORT_RANGE.start(),
            PORT_RANGE.end()
        ))
    }
}

fn parse_memory(s: &str) -> Result<u64, String> {
    match Byte::parse_str(s, true) {
        Ok(bytes) => Ok(bytes.as_u64()),
        Err(byte_error) => Err(format!("{}", byte_error)),
    }
}

impl MemtextdConfig {
    fn from_args(args: Vec<String>) -> Result<MemtextdConfig, String> {
        let memtext_args = MemtextdConfig::parse_from(args.iter());
        Ok(memtext_args)
    }

    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::ERROR,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}

pub fn parse(args: Vec<String>) -> Result<MemtextdConfig, String> {
    MemtextdConfig::from_args(args)
}
