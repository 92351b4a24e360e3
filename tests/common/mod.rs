use rand::Rng;
use std::net::TcpStream;
use std::time::{Duration, Instant};

mod multi_thread_server;
mod params_builder;
mod random_port;

pub use multi_thread_server::spawn_server;
pub use params_builder::MemtextdServerParamsBuilder;

#[allow(dead_code)]
pub fn create_value_with_size(size: usize) -> String {
    let mut rng = rand::thread_rng();
    let mut value = String::with_capacity(size);
    for _ in 0..size {
        let random_char = rng.gen_range(b'a'..=b'z') as char;
        value.push(random_char);
    }
    value
}

/// The server is spawned on its own thread; poll until the listener
/// accepts before handing the port to a client.
pub fn wait_for_server(port: u16) {
    let deadline = Instant::now() + Duration::from_secs(5);
    let addr = format!("127.0.0.1:{}", port);
    loop {
        match TcpStream::connect(&addr) {
            Ok(_stream) => return,
            Err(err) => {
                if Instant::now() > deadline {
                    panic!("server did not come up on {}: {}", addr, err);
                }
                std::thread::sleep(Duration::from_millis(20));
            }
        }
    }
}
