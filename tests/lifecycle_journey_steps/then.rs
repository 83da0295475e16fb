//! Then steps for lifecycle journey BDD scenarios.

use super::world::JourneyWorld;
use internflow::internship::domain::LifecycleStage;
use rstest_bdd_macros::then;
use rust_decimal::Decimal;

#[expect(clippy::float_arithmetic, reason = "tolerance comparison of percentages")]
fn close(actual: f64, expected: f64) -> bool {
    (actual - expected).abs() < 1e-9
}

#[then(r#"the lifecycle stage is "{stage}""#)]
fn lifecycle_stage_is(world: &mut JourneyWorld, stage: String) -> Result<(), eyre::Report> {
    let actual = world.lifecycle().stage;
    if actual.map(LifecycleStage::as_str) != Some(stage.as_str()) {
        return Err(eyre::eyre!("expected stage {stage}, found {actual:?}"));
    }
    Ok(())
}

#[then("no lifecycle stage is shown")]
fn no_lifecycle_stage(world: &mut JourneyWorld) -> Result<(), eyre::Report> {
    let view = world.lifecycle();
    if let Some(stage) = view.stage {
        return Err(eyre::eyre!("expected no stage, found {stage}"));
    }
    Ok(())
}

#[then("progress is {expected:u32}")]
fn progress_is(world: &mut JourneyWorld, expected: u32) -> Result<(), eyre::Report> {
    let actual = world.lifecycle().progress;
    if !close(actual, f64::from(expected)) {
        return Err(eyre::eyre!("expected progress {expected}, found {actual}"));
    }
    Ok(())
}

#[then("{count:usize} tasks are assigned")]
fn tasks_assigned(world: &mut JourneyWorld, count: usize) -> Result<(), eyre::Report> {
    let actual = world.journey().dashboard.current().tasks().len();
    if actual != count {
        return Err(eyre::eyre!("expected {count} tasks, found {actual}"));
    }
    Ok(())
}

#[then(r#"the certificate price shown is "{price}""#)]
fn certificate_price_shown(world: &mut JourneyWorld, price: String) -> Result<(), eyre::Report> {
    let expected: Decimal = price.parse()?;
    let actual = world.lifecycle().certificate_price;
    if actual != Some(expected) {
        return Err(eyre::eyre!("expected price {expected}, found {actual:?}"));
    }
    Ok(())
}

#[then(r#"the rejection reason shown is "{reason}""#)]
fn rejection_reason_shown(world: &mut JourneyWorld, reason: String) -> Result<(), eyre::Report> {
    let actual = world
        .journey()
        .dashboard
        .current()
        .payment_status
        .and_then(|payment| payment.rejected_reason);
    if actual.as_deref() != Some(reason.as_str()) {
        return Err(eyre::eyre!("expected reason {reason}, found {actual:?}"));
    }
    Ok(())
}

#[then(r#"the next payment action is "{action}""#)]
fn next_payment_action(world: &mut JourneyWorld, action: String) -> Result<(), eyre::Report> {
    let actual = serde_json::to_value(world.lifecycle().payment_action)?;
    if actual.as_str() != Some(action.as_str()) {
        return Err(eyre::eyre!("expected action {action}, found {actual}"));
    }
    Ok(())
}

#[then(r#"the "{resource}" resource is reported as failed"#)]
fn resource_reported_failed(world: &JourneyWorld, resource: String) -> Result<(), eyre::Report> {
    let outcome = world
        .last_refresh
        .as_ref()
        .ok_or_else(|| eyre::eyre!("the dashboard was never refreshed"))?;
    let reported = outcome
        .failures
        .iter()
        .any(|failure| failure.resource.as_str() == resource);
    if !reported {
        return Err(eyre::eyre!(
            "expected {resource} to fail, failures were {:?}",
            outcome.failures
        ));
    }
    Ok(())
}
