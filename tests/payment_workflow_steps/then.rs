//! Then steps for payment workflow BDD scenarios.

use super::world::PaymentWorld;
use internflow::internship::domain::PaymentState;
use rstest_bdd_macros::then;

#[then(r#"the payment "{id}" is pending"#)]
fn payment_is_pending(world: &mut PaymentWorld, id: String) -> Result<(), eyre::Report> {
    let snapshot = world.session().aggregator.current();
    let payment = snapshot
        .payment_status
        .as_ref()
        .ok_or_else(|| eyre::eyre!("payment status was never loaded"))?;
    let actual_id = payment.payment_id.as_ref().map(|payment_id| payment_id.as_str());
    if payment.status != PaymentState::Pending || actual_id != Some(id.as_str()) {
        return Err(eyre::eyre!(
            "expected pending payment {id}, found {} {actual_id:?}",
            payment.status
        ));
    }
    Ok(())
}

#[then(r#"the next payment action is "{action}""#)]
fn next_payment_action(world: &mut PaymentWorld, action: String) -> Result<(), eyre::Report> {
    let view = world.lifecycle();
    let actual = serde_json::to_value(view.payment_action)?;
    if actual.as_str() != Some(action.as_str()) {
        return Err(eyre::eyre!("expected action {action}, found {actual}"));
    }
    Ok(())
}

#[then(r#"every initiation returned payment "{id}""#)]
fn every_initiation_returned(world: &PaymentWorld, id: String) -> Result<(), eyre::Report> {
    if world.initiated.is_empty() {
        return Err(eyre::eyre!("no payment was initiated"));
    }
    if let Some(other) = world.initiated.iter().find(|payment_id| payment_id.as_str() != id) {
        return Err(eyre::eyre!("expected payment {id}, got {other}"));
    }
    Ok(())
}

#[then("the backend holds {count:usize} payments")]
fn backend_holds_payments(world: &mut PaymentWorld, count: usize) -> Result<(), eyre::Report> {
    let actual = world.session().backend.payment_count()?;
    if actual != count {
        return Err(eyre::eyre!("expected {count} payments, found {actual}"));
    }
    Ok(())
}

#[then(r#"the backend received {count:usize} "{call}" requests"#)]
fn backend_received(
    world: &mut PaymentWorld,
    count: usize,
    call: String,
) -> Result<(), eyre::Report> {
    let calls = world.session().backend.calls()?;
    let actual = calls.iter().filter(|name| **name == call.as_str()).count();
    if actual != count {
        return Err(eyre::eyre!("expected {count} {call} requests, found {actual}"));
    }
    Ok(())
}

#[then(r#"the last operation failed with "{message}""#)]
fn last_operation_failed(world: &PaymentWorld, message: String) -> Result<(), eyre::Report> {
    match world.last_error.as_deref() {
        Some(actual) if actual == message => Ok(()),
        Some(actual) => Err(eyre::eyre!("expected failure '{message}', got '{actual}'")),
        None => Err(eyre::eyre!("expected failure '{message}', but nothing failed")),
    }
}

#[then(r#"the submitted repository is "{url}""#)]
fn submitted_repository(world: &mut PaymentWorld, url: String) -> Result<(), eyre::Report> {
    let snapshot = world.session().aggregator.current();
    if snapshot.submission.url() != Some(url.as_str()) {
        return Err(eyre::eyre!(
            "expected repository {url}, found {:?}",
            snapshot.submission
        ));
    }
    Ok(())
}
