use crate::memcache::cli::parser::{MemtextdConfig, RuntimeType};
use crate::memcache_server;
use crate::memcache_server::server_context::ServerContext;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::runtime::Builder;
use tokio_util::sync::CancellationToken;

fn get_worker_thread_name() -> String {
    static ATOMIC_ID: AtomicUsize = AtomicUsize::new(0);
    let id = ATOMIC_ID.fetch_add(1, Ordering::SeqCst);
    format!("memtextd-wrk-{}", id)
}

fn create_multi_thread_runtime(worker_threads: usize) -> tokio::runtime::Runtime {
    Builder::new_multi_thread()
        .thread_name_fn(get_worker_thread_name)
        .worker_threads(worker_threads)
        .enable_all()
        .build()
        .unwrap()
}

fn create_current_thread_runtime() -> tokio::runtime::Runtime {
    Builder::new_current_thread()
        .thread_name_fn(get_worker_thread_name)
        .enable_all()
        .build()
        .unwrap()
}

fn register_ctrlc_handler(
    runtime: &tokio::runtime::Runtime,
    cancellation_token: CancellationToken,
) {
    runtime.handle().spawn(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to listen for ctrl-c signal");
        info!("Ctrl-C received, shutting down...");
        cancellation_token.cancel();
    });
}

pub fn start_memtext_server(config: MemtextdConfig) {
    let ctxt = ServerContext::get_default_server_context();
    start_memtext_server_with_ctxt(config, ctxt)
}

pub fn start_memtext_server_with_ctxt(config: MemtextdConfig, ctxt: ServerContext) {
    let cancellation_token = ctxt.cancellation_token();
    let system_timer = ctxt.system_timer();
    let store = ctxt.store();
    let sweeper = ctxt.expiry_sweeper();

    let addr = SocketAddr::new(config.listen_address, config.port);
    let memc_config = memcache_server::memc_tcp::MemcacheServerConfig::new(
        config.idle_timeout,
        config.connection_limit,
        config.item_size_limit as usize,
        config.key_size_limit,
    );
    let runtime = match config.runtime_type {
        RuntimeType::CurrentThread => create_current_thread_runtime(),
        RuntimeType::MultiThread => create_multi_thread_runtime(config.threads),
    };
    let mut tcp_server = memcache_server::memc_tcp::MemcacheTcpServer::new(
        memc_config,
        store,
        cancellation_token.clone(),
    );

    register_ctrlc_handler(&runtime, cancellation_token);
    runtime.spawn(async move { sweeper.run().await });
    runtime.spawn(async move {
        if let Err(err) = tcp_server.run(addr).await {
            error!("Server error: {}", err);
        }
    });
    runtime.block_on(system_timer.run())
}
