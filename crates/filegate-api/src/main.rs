use filegate_core::Config;

// Use mimalloc as the global allocator for lower fragmentation under many small
// JSON allocations, especially on musl-based container images.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::from_env()?;

    // Telemetry, RPC transport, services and routes
    let (state, router) = filegate_api::setup::initialize_app(config.clone()).await?;

    filegate_api::setup::server::start_server(&config, router, state.rpc.registry().clone())
        .await?;

    Ok(())
}
