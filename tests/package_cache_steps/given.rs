//! Given steps for package cache scenarios.

use super::world::{PackageCacheWorld, packages, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use std::time::Duration;

#[given(r#"the package registry lists "{list}""#)]
fn registry_lists(world: &mut PackageCacheWorld, list: String) {
    world.source.replace(packages(&list));
}

#[given(r#"the package registry now lists "{list}""#)]
fn registry_now_lists(world: &mut PackageCacheWorld, list: String) {
    world.source.replace(packages(&list));
}

#[given("the package cache has been loaded")]
fn cache_loaded(world: &mut PackageCacheWorld) -> Result<(), eyre::Report> {
    run_async(world.cache.get_packages()).wrap_err("initial package load")?;
    Ok(())
}

#[given("the primary copy has expired")]
fn primary_expired(world: &mut PackageCacheWorld) {
    let ttl = world.cache.engine().policy().primary_ttl();
    world.clock.advance(ttl + Duration::from_secs(1));
}

#[given("registry loads are held")]
fn loads_held(world: &mut PackageCacheWorld) {
    world.gate = Some(world.source.hold_loads());
}
