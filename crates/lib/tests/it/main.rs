/*! Integration tests for Cotext.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * The module structure mirrors the main library structure:
 * - crdt: Tests for positions, replicas, merging, and convergence properties
 * - cache: Tests for the document cache and snapshot bootstrap
 * - store: Tests for the in-memory storage collaborators
 * - session: Tests for the registry, broadcast, and presence behavior
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("cotext=info".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

mod helpers;
mod session;
mod store;
