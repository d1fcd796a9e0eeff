//! Common test utilities for workflow integration tests.

#![allow(dead_code)]

use std::time::Duration;
use workflow_tests::{wait_for_services, WorkflowTestContext};

pub const SERVICE_TIMEOUT: Duration = Duration::from_secs(60);

/// A context logged in as the seeded user, once every service is healthy.
pub async fn setup() -> WorkflowTestContext {
    wait_for_services(SERVICE_TIMEOUT)
        .await
        .expect("Services not healthy - start the platform first");

    let mut ctx = WorkflowTestContext::new().expect("Failed to create workflow test context");
    ctx.authenticate()
        .await
        .expect("Seeded user could not log in");
    ctx
}
