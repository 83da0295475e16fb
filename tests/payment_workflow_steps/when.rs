//! When steps for payment workflow BDD scenarios.

use super::world::{PaymentWorld, run_async};
use internflow::internship::{
    domain::PaymentId,
    services::{PaymentInitiated, PaymentWorkflowError},
};
use rstest_bdd_macros::when;
use rust_decimal::Decimal;

fn record_initiation(
    world: &mut PaymentWorld,
    result: Result<PaymentInitiated, PaymentWorkflowError>,
) {
    match result {
        Ok(initiated) => world.initiated.push(initiated.receipt.payment_id),
        Err(error) => world.record_failure(error.user_message()),
    }
}

#[when("the student initiates the certificate payment")]
fn initiate_for_certificate(world: &mut PaymentWorld) {
    let result = run_async(world.session().payments.initiate_for_certificate());
    record_initiation(world, result);
}

#[when(r#"the student initiates a payment of "{amount}""#)]
fn initiate_amount(world: &mut PaymentWorld, amount: String) -> Result<(), eyre::Report> {
    let value: Decimal = amount.parse()?;
    let result = run_async(world.session().payments.initiate(value));
    record_initiation(world, result);
    Ok(())
}

#[when(r#"the student submits reference "{reference}" for payment "{id}""#)]
fn submit_reference(
    world: &mut PaymentWorld,
    reference: String,
    id: String,
) -> Result<(), eyre::Report> {
    let payment_id = PaymentId::new(id)?;
    let result = run_async(
        world
            .session()
            .payments
            .submit_transaction_reference(&payment_id, &reference),
    );
    if let Err(error) = result {
        world.record_failure(error.user_message());
    }
    Ok(())
}

#[when(r#"the student submits repository "{url}""#)]
fn submit_repository(world: &mut PaymentWorld, url: String) {
    let result = run_async(world.session().submissions.submit_github(&url));
    if let Err(error) = result {
        world.record_failure(error.user_message());
    }
}
