use std::process;

use memtext::{
    memcache,
    memcache_server::{
        runtime_builder::start_memtext_server_with_ctxt, server_context::ServerContext,
    },
};
use tokio_util::sync::CancellationToken;

use crate::common::{random_port::pseudo_random_port, wait_for_server, MemtextdServerParamsBuilder};

pub struct MemtextdTestServer {
    thread_join_handle: Option<std::thread::JoinHandle<()>>,
    cancellation_token: CancellationToken,
    port: u16,
}

impl MemtextdTestServer {
    fn new(
        thread_join_handle: std::thread::JoinHandle<()>,
        cancellation_token: CancellationToken,
        port: u16,
    ) -> MemtextdTestServer {
        MemtextdTestServer {
            thread_join_handle: Some(thread_join_handle),
            cancellation_token,
            port,
        }
    }

    fn kill(&mut self) {
        self.cancellation_token.cancel();
        if let Some(thread_join_handle) = self.thread_join_handle.take() {
            thread_join_handle.join().unwrap();
        }
    }

    pub fn get_connection_string(&self) -> String {
        format!(
            "memcache://127.0.0.1:{}?timeout=5&tcp_nodelay=true&protocol=ascii",
            self.port
        )
    }

    #[allow(dead_code)]
    pub fn get_port(&self) -> u16 {
        self.port
    }
}

impl Drop for MemtextdTestServer {
    fn drop(&mut self) {
        self.kill();
    }
}

fn spawn_server_args(args: Vec<String>) -> MemtextdTestServer {
    let config = match memcache::cli::parser::parse(args) {
        Ok(config) => config,
        Err(err) => {
            eprint!("{}", err);
            process::exit(1);
        }
    };
    let ctxt = ServerContext::get_default_server_context();
    let cancellation_token = ctxt.cancellation_token();
    let port = config.port;
    let handle = std::thread::spawn(move || start_memtext_server_with_ctxt(config, ctxt));
    let server = MemtextdTestServer::new(handle, cancellation_token, port);
    wait_for_server(port);
    server
}

pub fn spawn_server(mut params: MemtextdServerParamsBuilder) -> MemtextdTestServer {
    let port = pseudo_random_port.lock().unwrap().get_next_port();
    params.with_port(port);
    let args = params.build();
    spawn_server_args(args)
}
