//! Shows the dispatcher's tracing output for one request.
//!
//! To see logs, run with `RUST_LOG` set to a level (info, debug, trace):
//! `RUST_LOG=trace cargo run --example tracing_demo --features tracing`

#[cfg(feature = "tracing")]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    use modscript::{
        ConfigScope, DirConfig, Dispatcher, HandlerTable, LogLevel, Phase,
        RequestContext, Status,
    };
    use tracing::info;
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = ConfigScope::new(DirConfig::server()).with_section(
        DirConfig::builder()
            .with_directory("/var/www/app")
            .with_handler(Phase::Authen, "auth")
            .with_handler(Phase::Handler, "app::index")
            .with_handler_module("metrics")
            .with_option("realm", "demo")
            .build()?,
    )?;

    let handlers = HandlerTable::new()
        .with("auth", "authenhandler", |req| {
            let realm = req.option("realm").unwrap_or("none").to_string();
            req.set_note("realm", realm);
            req.add_handler(Phase::Log, "app::access_log", None)?;
            Ok(Status::OK)
        })
        .with("app", "index", |req| {
            req.log_error(LogLevel::Info, "rendering index");
            Ok(Status::OK)
        })
        .with("app", "access_log", |_req| Ok(Status::OK));

    let dispatcher = Dispatcher::new(config, handlers);

    // - INFO: request milestones
    // - DEBUG: phase outcomes and handler log lines
    // - TRACE: per-entry resolution and invocation
    let mut req = RequestContext::new("/app/").in_directory("/var/www/app");
    let status = dispatcher.run_request(&mut req)?;

    info!("Done. Status: {}", status);
    println!("{}", req);

    Ok(())
}

#[cfg(not(feature = "tracing"))]
fn main() {
    println!("This example requires the 'tracing' feature.");
    println!("Run with: cargo run --example tracing_demo --features tracing");
}
