//! When steps for package cache scenarios.

use super::world::{PackageCacheWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::when;
use tokio::task::JoinSet;

#[when("a reader requests the packages")]
fn single_reader(world: &mut PackageCacheWorld) -> Result<(), eyre::Report> {
    let snapshot = run_async(world.cache.get_packages()).wrap_err("read packages")?;
    world.reads.push(snapshot);
    Ok(())
}

#[when("{count:usize} readers request the packages concurrently")]
fn concurrent_readers(world: &mut PackageCacheWorld, count: usize) -> Result<(), eyre::Report> {
    let mut readers = JoinSet::new();
    for _ in 0..count {
        let cache = world.cache.clone();
        readers.spawn(async move { cache.get_packages().await });
    }
    let reads = run_async(async move {
        let mut reads = Vec::with_capacity(count);
        while let Some(joined) = readers.join_next().await {
            reads.push(joined??);
        }
        Ok::<_, eyre::Report>(reads)
    })?;
    world.reads.extend(reads);
    Ok(())
}
