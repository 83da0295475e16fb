//! Given steps for lifecycle journey BDD scenarios.

use super::world::JourneyWorld;
use crate::test_helpers::{assigned_tasks, definition, enrolment, february_batch, january_batch, utc};
use internflow::internship::{domain::StudentId, ports::BackendResource};
use rstest_bdd_macros::given;

fn resource_named(name: &str) -> Result<BackendResource, eyre::Report> {
    BackendResource::ALL
        .into_iter()
        .find(|resource| resource.as_str() == name)
        .ok_or_else(|| eyre::eyre!("unknown resource {name}"))
}

#[given(r#"student "{student}" is enrolled in a batch that has not started"#)]
fn enrolled_in_future_batch(world: &mut JourneyWorld, student: String) -> Result<(), eyre::Report> {
    world.seed.student_id = Some(StudentId::new(student)?);
    world.seed.internship = Some(enrolment(february_batch()));
    Ok(())
}

#[given(r#"student "{student}" is enrolled with {approved:usize} of {total:usize} tasks approved"#)]
fn enrolled_with_tasks(
    world: &mut JourneyWorld,
    student: String,
    approved: usize,
    total: usize,
) -> Result<(), eyre::Report> {
    world.seed.student_id = Some(StudentId::new(student)?);
    world.seed.internship = Some(enrolment(january_batch()));
    world.seed.tasks = assigned_tasks(total, approved);
    Ok(())
}

#[given("a student with no enrolment")]
fn student_without_enrolment(world: &mut JourneyWorld) {
    world.seed.internship = None;
}

#[given("the task catalogue holds {count:usize} tasks")]
fn task_catalogue(world: &mut JourneyWorld, count: usize) {
    world.seed.catalogue = (1..=count).map(definition).collect();
}

#[given(r#"today is "{instant}""#)]
fn today_is(world: &mut JourneyWorld, instant: String) -> Result<(), eyre::Report> {
    world.clock.set(utc(&instant)?);
    Ok(())
}

#[given(r#"the "{resource}" endpoint is failing"#)]
fn endpoint_failing(world: &mut JourneyWorld, resource: String) -> Result<(), eyre::Report> {
    world.seed.failing.insert(resource_named(&resource)?);
    Ok(())
}
