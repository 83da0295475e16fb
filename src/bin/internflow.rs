//! `internflow` -- command-line front end for the internship lifecycle.
//!
//! Usage:
//!
//! ```text
//! internflow status
//! internflow submit-github https://github.com/owner/repo
//! internflow pay [--amount 499]
//! internflow submit-reference <payment-id> <reference>
//! internflow admin start-batch <student-id>
//! internflow admin override-task <student-task-id> <approve|reject>
//! internflow admin approve-payment <payment-id>
//! internflow admin reject-payment <payment-id> <reason>
//! ```
//!
//! Connection settings come from the environment (see
//! [`internflow::config`]); a `.env` file in the working directory is loaded
//! first when present.

use clap::{Parser, Subcommand, ValueEnum};
use internflow::config::{BackendConfig, ConfigError};
use internflow::internship::{
    adapters::http::HttpBackend,
    domain::{
        InternshipDomainError, LifecycleView, PaymentId, Snapshot, StudentId, StudentTaskId,
        SubmissionProjection, UpiDisplay,
    },
    ports::{AdminBackend, BackendError, StaticSession, StudentBackend},
    services::{
        AdminOverrideError, AdminOverrideService, FailureKind, FetchFailure, PaymentWorkflowError,
        PaymentWorkflowService, SnapshotAggregator, SubmissionError, TaskSubmissionService,
        backend_message,
    },
};
use internflow::telemetry;
use mockable::{Clock, DefaultClock};
use rust_decimal::Decimal;
use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;
use thiserror::Error;

/// Internship lifecycle client.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Shows the derived lifecycle state and every loaded resource.
    Status,
    /// Submits the solution repository (one-shot).
    SubmitGithub {
        /// `https://github.com/<owner>/<repo>` URL.
        url: String,
    },
    /// Initiates the certificate payment.
    Pay {
        /// Amount to pay; defaults to the certificate price of the domain.
        #[arg(long)]
        amount: Option<Decimal>,
    },
    /// Submits the bank transaction reference for the pending payment.
    SubmitReference {
        /// Id of the pending payment.
        payment_id: String,
        /// Transaction reference from the bank.
        reference: String,
    },
    /// Privileged overrides.
    Admin {
        #[command(subcommand)]
        command: AdminCommand,
    },
}

#[derive(Debug, Subcommand)]
enum AdminCommand {
    /// Starts a student's batch today and assigns tasks.
    StartBatch {
        /// Student id.
        student_id: String,
    },
    /// Overrides a task decision.
    OverrideTask {
        /// Student task id.
        student_task_id: String,
        /// New decision.
        decision: Decision,
    },
    /// Approves a pending payment.
    ApprovePayment {
        /// Payment id.
        payment_id: String,
    },
    /// Rejects a pending payment.
    RejectPayment {
        /// Payment id.
        payment_id: String,
        /// Reason shown to the student.
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Decision {
    Approve,
    Reject,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Domain(#[from] InternshipDomainError),
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Payment(#[from] PaymentWorkflowError),
    #[error(transparent)]
    Submission(#[from] SubmissionError),
    #[error(transparent)]
    Admin(#[from] AdminOverrideError),
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

impl CliError {
    fn kind(&self) -> FailureKind {
        match self {
            Self::Backend(error) => FailureKind::of_backend(error),
            Self::Payment(error) => error.kind(),
            Self::Submission(error) => error.kind(),
            Self::Admin(error) => error.kind(),
            Self::Config(_) | Self::Domain(_) | Self::Output(_) => FailureKind::InvalidInput,
        }
    }

    fn user_message(&self) -> String {
        match self {
            Self::Backend(error) => backend_message(error),
            Self::Payment(error) => error.user_message(),
            Self::Submission(error) => error.user_message(),
            Self::Admin(error) => error.user_message(),
            other => other.to_string(),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    telemetry::init();
    let cli = Cli::parse();

    let mut stdout = io::stdout().lock();
    match run(cli.command, &mut stdout).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::debug!(error = %error, "command failed");
            let mut stderr = io::stderr().lock();
            if writeln!(stderr, "{}: {}", error.kind(), error.user_message()).is_err() {
                return ExitCode::from(2);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command, out: &mut impl Write) -> Result<(), CliError> {
    let config = BackendConfig::from_env()?;
    let backend = Arc::new(HttpBackend::new(&config, Arc::new(session_for(&config)))?);
    execute(command, backend, Arc::new(DefaultClock), out).await
}

/// Signs requests with the configured token, or anonymously without one.
fn session_for(config: &BackendConfig) -> StaticSession {
    config
        .token
        .clone()
        .map_or_else(StaticSession::anonymous, StaticSession::new)
}

async fn execute<B, C>(
    command: Command,
    backend: Arc<B>,
    clock: Arc<C>,
    out: &mut impl Write,
) -> Result<(), CliError>
where
    B: StudentBackend + AdminBackend,
    C: Clock + Send + Sync,
{
    match command {
        Command::Status => status(backend, clock.as_ref(), out).await,
        Command::SubmitGithub { url } => {
            let aggregator = loaded_aggregator(backend).await;
            let service = TaskSubmissionService::new(aggregator, clock);
            let snapshot = service.submit_github(&url).await?;
            writeln!(out, "Repository submitted.")?;
            write_submission(out, &snapshot)?;
            Ok(())
        }
        Command::Pay { amount } => {
            let aggregator = loaded_aggregator(backend).await;
            let service = PaymentWorkflowService::new(aggregator, clock);
            let initiated = match amount {
                Some(value) => service.initiate(value).await?,
                None => service.initiate_for_certificate().await?,
            };
            writeln!(
                out,
                "Payment {} pending for {}.",
                initiated.receipt.payment_id, initiated.receipt.amount
            )?;
            write_upi(out, &initiated.snapshot.upi_display)?;
            Ok(())
        }
        Command::SubmitReference {
            payment_id: raw_id,
            reference,
        } => {
            let payment_id = PaymentId::new(raw_id)?;
            let aggregator = loaded_aggregator(backend).await;
            let service = PaymentWorkflowService::new(aggregator, clock);
            service
                .submit_transaction_reference(&payment_id, &reference)
                .await?;
            writeln!(
                out,
                "Reference submitted for payment {payment_id}; awaiting approval."
            )?;
            Ok(())
        }
        Command::Admin { command } => admin(backend, command, out).await,
    }
}

async fn loaded_aggregator<B: StudentBackend>(backend: Arc<B>) -> Arc<SnapshotAggregator<B>> {
    let aggregator = Arc::new(SnapshotAggregator::new(backend));
    aggregator.refresh().await;
    aggregator
}

async fn status<B: StudentBackend>(
    backend: Arc<B>,
    clock: &impl Clock,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let aggregator = SnapshotAggregator::new(backend);
    let outcome = aggregator.refresh_with_failures().await;
    let view = LifecycleView::derive(&outcome.snapshot, clock.utc());
    write_status(out, &outcome.snapshot, &view, &outcome.failures)?;
    Ok(())
}

async fn admin<A: AdminBackend>(
    backend: Arc<A>,
    command: AdminCommand,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let service = AdminOverrideService::new(backend);
    match command {
        AdminCommand::StartBatch { student_id: raw_id } => {
            let student_id = StudentId::new(raw_id)?;
            service.force_start_batch(&student_id).await?;
            writeln!(out, "Batch started for student {student_id}.")?;
        }
        AdminCommand::OverrideTask {
            student_task_id,
            decision,
        } => {
            let task_id = StudentTaskId::new(student_task_id)?;
            let approved = decision == Decision::Approve;
            service.override_task(&task_id, approved).await?;
            let verdict = if approved { "approved" } else { "rejected" };
            writeln!(out, "Task {task_id} {verdict}.")?;
        }
        AdminCommand::ApprovePayment { payment_id: raw_id } => {
            let payment_id = PaymentId::new(raw_id)?;
            service.approve_payment(&payment_id).await?;
            writeln!(out, "Payment {payment_id} approved.")?;
        }
        AdminCommand::RejectPayment {
            payment_id: raw_id,
            reason,
        } => {
            let payment_id = PaymentId::new(raw_id)?;
            service.reject_payment(&payment_id, &reason).await?;
            writeln!(out, "Payment {payment_id} rejected.")?;
        }
    }
    Ok(())
}

fn write_status(
    out: &mut impl Write,
    snapshot: &Snapshot,
    view: &LifecycleView,
    failures: &[FetchFailure],
) -> io::Result<()> {
    match view.stage {
        Some(stage) => writeln!(out, "Stage:        {stage}")?,
        None => writeln!(out, "Stage:        not enrolled")?,
    }
    writeln!(out, "Progress:     {:.0}%", view.progress)?;
    if let Some(internship) = &snapshot.internship {
        writeln!(
            out,
            "Internship:   {} ({} days, batch {})",
            internship.domain, internship.duration, internship.batch.status
        )?;
        writeln!(
            out,
            "Batch:        {} to {}{}",
            internship.batch.start_date.date_naive(),
            internship.batch.end_date.date_naive(),
            if view.batch_ended { " (ended)" } else { "" }
        )?;
        if let Some(deadline) = internship.batch.payment_deadline {
            let passed = if view.payment_deadline_passed {
                " (passed)"
            } else {
                ""
            };
            writeln!(out, "Pay by:       {}{passed}", deadline.date_naive())?;
        }
    }
    if let Some(summary) = &snapshot.task_status {
        writeln!(
            out,
            "Tasks:        {}/{} approved",
            summary.approved_tasks, summary.total_tasks
        )?;
    }
    for task in snapshot.tasks() {
        writeln!(out, "  - [{}] {}", task.status, task.task.title)?;
    }
    write_submission(out, snapshot)?;
    if let Some(payment) = &snapshot.payment_status {
        writeln!(out, "Payment:      {}", payment.status)?;
        if let Some(reason) = &payment.rejected_reason {
            writeln!(out, "  rejected: {reason}")?;
        }
    }
    write_upi(out, &snapshot.upi_display)?;
    if let Some(price) = view.certificate_price {
        writeln!(out, "Certificate:  {price}")?;
    }
    if view.certificate_unlocked {
        writeln!(out, "Certificate unlocked.")?;
    }
    writeln!(out, "Next step:    {:?}", view.payment_action)?;
    if let Some(inconsistency) = &view.inconsistency {
        writeln!(out, "Warning:      {inconsistency}")?;
    }
    for failure in failures {
        writeln!(
            out,
            "Unavailable:  {} ({})",
            failure.resource,
            backend_message(&failure.error)
        )?;
    }
    Ok(())
}

fn write_submission(out: &mut impl Write, snapshot: &Snapshot) -> io::Result<()> {
    match &snapshot.submission {
        SubmissionProjection::Unknown => Ok(()),
        SubmissionProjection::NotSubmitted => writeln!(out, "Repository:   not submitted"),
        SubmissionProjection::Submitted(url) => writeln!(out, "Repository:   {url}"),
    }
}

fn write_upi(out: &mut impl Write, upi: &UpiDisplay) -> io::Result<()> {
    match upi {
        UpiDisplay::Hidden => Ok(()),
        UpiDisplay::Generating => writeln!(out, "UPI:          QR code is being generated"),
        UpiDisplay::Ready(url) => writeln!(out, "UPI:          {url}"),
    }
}
