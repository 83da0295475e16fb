//! Given steps for payment workflow BDD scenarios.

use super::world::PaymentWorld;
use crate::test_helpers::{assigned_tasks, enrolment, january_batch, utc};
use internflow::internship::{
    domain::{PaymentId, PaymentState, PaymentStatus},
    ports::BackendError,
};
use rstest_bdd_macros::given;
use rust_decimal::Decimal;

fn seeded_payment(state: PaymentState, id: &str) -> Result<PaymentStatus, eyre::Report> {
    let payment_id = PaymentId::new(id)?;
    Ok(PaymentStatus {
        status: state,
        upi_url: Some(format!(
            "upi://pay?pa=certificates@upi&am=499&tn=CERT-{payment_id}"
        )),
        payment_id: Some(payment_id),
        amount: Some(Decimal::new(499, 0)),
        transaction_reference: None,
        rejected_reason: None,
    })
}

#[given("an enrolled student with {approved:usize} of {total:usize} tasks approved")]
fn enrolled_student(world: &mut PaymentWorld, approved: usize, total: usize) {
    world.seed.internship = Some(enrolment(january_batch()));
    world.seed.tasks = assigned_tasks(total, approved);
}

#[given(r#"the payment deadline is "{deadline}""#)]
fn payment_deadline(world: &mut PaymentWorld, deadline: String) -> Result<(), eyre::Report> {
    let instant = utc(&deadline)?;
    let internship = world
        .seed
        .internship
        .as_mut()
        .ok_or_else(|| eyre::eyre!("enrol the student before setting a deadline"))?;
    internship.batch.payment_deadline = Some(instant);
    Ok(())
}

#[given(r#"a pending payment "{id}""#)]
fn pending_payment(world: &mut PaymentWorld, id: String) -> Result<(), eyre::Report> {
    world.seed.payment = Some(seeded_payment(PaymentState::Pending, &id)?);
    Ok(())
}

#[given(r#"a rejected payment "{id}""#)]
fn rejected_payment(world: &mut PaymentWorld, id: String) -> Result<(), eyre::Report> {
    let mut payment = seeded_payment(PaymentState::Failed, &id)?;
    payment.rejected_reason = Some("Reference not found".to_owned());
    world.seed.payment = Some(payment);
    Ok(())
}

#[given(r#"today is "{instant}""#)]
fn today_is(world: &mut PaymentWorld, instant: String) -> Result<(), eyre::Report> {
    world.clock.set(utc(&instant)?);
    Ok(())
}

#[given(r#"the backend will reject the next request with "{message}""#)]
fn backend_rejects_next(world: &mut PaymentWorld, message: String) -> Result<(), eyre::Report> {
    world
        .session()
        .backend
        .fail_next_mutation(BackendError::rejected(502, message))?;
    Ok(())
}
