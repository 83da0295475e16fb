//! When steps for lifecycle journey BDD scenarios.

use super::world::{JourneyWorld, run_async};
use eyre::WrapErr;
use internflow::internship::domain::{PaymentId, StudentId};
use rstest_bdd_macros::when;

fn pending_payment_id(world: &mut JourneyWorld) -> Result<PaymentId, eyre::Report> {
    world
        .journey()
        .dashboard
        .current()
        .payment_status
        .and_then(|payment| payment.payment_id)
        .ok_or_else(|| eyre::eyre!("no payment is loaded"))
}

#[when(r#"the administrator force-starts the batch for student "{student}""#)]
fn force_start(world: &mut JourneyWorld, student: String) -> Result<(), eyre::Report> {
    let student_id = StudentId::new(student)?;
    run_async(world.journey().admin.force_start_batch(&student_id))
        .wrap_err("force-start batch")?;
    Ok(())
}

#[when(r#"the student submits repository "{url}""#)]
fn submit_repository(world: &mut JourneyWorld, url: String) -> Result<(), eyre::Report> {
    run_async(world.journey().submissions.submit_github(&url)).wrap_err("submit repository")?;
    Ok(())
}

#[when("the administrator approves every task")]
fn approve_every_task(world: &mut JourneyWorld) -> Result<(), eyre::Report> {
    let journey = world.journey();
    let task_ids: Vec<_> = journey
        .dashboard
        .current()
        .tasks()
        .iter()
        .map(|assigned| assigned.id.clone())
        .collect();
    for task_id in &task_ids {
        run_async(journey.admin.override_task(task_id, true))
            .wrap_err_with(|| format!("approve task {task_id}"))?;
    }
    Ok(())
}

#[when("the student initiates the certificate payment")]
fn initiate_payment(world: &mut JourneyWorld) -> Result<(), eyre::Report> {
    run_async(world.journey().payments.initiate_for_certificate())
        .wrap_err("initiate certificate payment")?;
    Ok(())
}

#[when(r#"the student submits reference "{reference}" for the pending payment"#)]
fn submit_reference(world: &mut JourneyWorld, reference: String) -> Result<(), eyre::Report> {
    let payment_id = pending_payment_id(world)?;
    run_async(
        world
            .journey()
            .payments
            .submit_transaction_reference(&payment_id, &reference),
    )
    .wrap_err("submit transaction reference")?;
    Ok(())
}

#[when("the administrator approves the pending payment")]
fn approve_payment(world: &mut JourneyWorld) -> Result<(), eyre::Report> {
    let payment_id = pending_payment_id(world)?;
    run_async(world.journey().admin.approve_payment(&payment_id)).wrap_err("approve payment")?;
    Ok(())
}

#[when(r#"the administrator rejects the pending payment because "{reason}""#)]
fn reject_payment(world: &mut JourneyWorld, reason: String) -> Result<(), eyre::Report> {
    let payment_id = pending_payment_id(world)?;
    run_async(world.journey().admin.reject_payment(&payment_id, &reason))
        .wrap_err("reject payment")?;
    Ok(())
}

#[when("the dashboard refreshes")]
fn dashboard_refreshes(world: &mut JourneyWorld) {
    let outcome = run_async(world.journey().dashboard.refresh_with_failures());
    world.last_refresh = Some(outcome);
}
