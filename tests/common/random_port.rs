use lazy_static::lazy_static;

use std::sync::Mutex;

const STARTING_PORT: u16 = 10000;

pub struct PseudoRandomMemtextdPort {
    port: u16,
}

impl PseudoRandomMemtextdPort {
    pub fn new() -> PseudoRandomMemtextdPort {
        // every test binary is its own process, spread them out so
        // parallel `cargo test` runs do not fight over ports
        let offset = (std::process::id() % 20000) as u16;
        PseudoRandomMemtextdPort {
            port: STARTING_PORT + offset,
        }
    }

    pub fn get_next_port(&mut self) -> u16 {
        self.port += 10;
        self.port
    }
}

lazy_static! {
    pub static ref pseudo_random_port: Mutex<PseudoRandomMemtextdPort> =
        Mutex::new(PseudoRandomMemtextdPort::new());
}
