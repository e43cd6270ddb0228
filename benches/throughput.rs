//! Throughput benchmarks for modscript.
//!
//! Measures per-request chain copying and dispatch.
//!
//! # Usage
//!
//! ```bash
//! cargo bench --bench throughput
//! ```

use criterion::{
    black_box, criterion_group, criterion_main, Criterion, Throughput,
};
use modscript::{
    ConfigScope, DirConfig, Dispatcher, HandlerList, HandlerTable, Phase,
    RequestContext, Status,
};

fn config() -> ConfigScope {
    ConfigScope::new(
        DirConfig::builder()
            .with_handler(Phase::PostReadRequest, "setup")
            .build()
            .expect("server config"),
    )
    .with_section(
        DirConfig::builder()
            .with_directory("/var/www")
            .with_handler(Phase::Authen, "auth")
            .with_handler(Phase::Handler, "app::first app::second app::third")
            .with_handler_module("metrics")
            .build()
            .expect("section config"),
    )
    .expect("config scope")
}

fn handlers() -> HandlerTable {
    HandlerTable::new()
        .with("setup", "postreadrequesthandler", |_req| Ok(Status::OK))
        .with("auth", "authenhandler", |req| {
            req.add_handler(Phase::Log, "app::log", None)?;
            Ok(Status::OK)
        })
        .with("app", "first", |_req| Ok(Status::DECLINED))
        .with("app", "second", |_req| Ok(Status::OK))
        .with("app", "third", |_req| Ok(Status::OK))
        .with("app", "log", |_req| Ok(Status::OK))
}

fn bench_chain_copy(c: &mut Criterion) {
    let mut template = HandlerList::new("first", Some("/var/www"), false);
    for i in 0..7 {
        template.append(&format!("handler{}", i), Some("/var/www"), i % 2 == 0);
    }

    let mut group = c.benchmark_group("hlist");
    group.throughput(Throughput::Elements(1));

    group.bench_function("copy_8", |b| b.iter(|| black_box(template.copy())));

    group.finish();
}

fn bench_request_throughput(c: &mut Criterion) {
    let dispatcher = Dispatcher::new(config(), handlers());

    let mut group = c.benchmark_group("throughput");
    group.throughput(Throughput::Elements(1));

    group.bench_function("full_request", |b| {
        b.iter(|| {
            let mut req = RequestContext::new("/index").in_directory("/var/www");
            black_box(dispatcher.run_request(&mut req))
        })
    });

    group.finish();
}

criterion_group!(benches, bench_chain_copy, bench_request_throughput);

criterion_main!(benches);
