//! Per-agent task fan-out

use std::future::Future;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::error::{AgentError, Result};
use crate::notify::PushSubscriber;
use crate::transport::Transport;
use crate::types::agent::AgentIdentity;
use crate::types::options::TransitionOptions;
use crate::types::outcome::{GroupReport, Operation, OperationOutcome};

use super::{BulkGroup, add_member};

/// Run one job per agent concurrently and gather one outcome per job
///
/// Outcomes arrive in completion order through a channel sized to the job
/// count, so no worker ever waits on the collector. A job whose task dies
/// without reporting is logged and shows up as a count mismatch.
pub async fn collect_outcomes<I, F>(jobs: I) -> Vec<OperationOutcome>
where
    I: IntoIterator<Item = (String, F)>,
    F: Future<Output = Result<()>> + Send + 'static,
{
    let jobs: Vec<(String, F)> = jobs.into_iter().collect();
    let expected = jobs.len();
    if expected == 0 {
        return Vec::new();
    }

    let (tx, mut rx) = mpsc::channel(expected);
    let mut tasks = JoinSet::new();
    for (agent, job) in jobs {
        let tx = tx.clone();
        tasks.spawn(async move {
            let result = job.await;
            if let Err(e) = &result {
                log::error!("[{}] {}", agent, e);
            }
            if let Err(e) = tx.try_send(OperationOutcome::new(agent, result)) {
                log::error!("agent outcome lost: {}", e);
            }
        });
    }
    drop(tx);

    while let Some(joined) = tasks.join_next().await {
        if let Err(e) = joined {
            log::error!("agent task did not finish: {}", e);
        }
    }

    let mut outcomes = Vec::with_capacity(expected);
    while let Ok(outcome) = rx.try_recv() {
        outcomes.push(outcome);
    }
    if outcomes.len() != expected {
        log::error!(
            "internal error: {} agent task(s) launched but {} outcome(s) collected",
            expected,
            outcomes.len()
        );
    }
    outcomes
}

impl<T: Transport, S: PushSubscriber> BulkGroup<T, S> {
    /// Add many agents concurrently
    ///
    /// One task per identity; membership changes are serialized. Returns one
    /// outcome per identity in completion order. Failed identities are not
    /// added.
    pub async fn add_bulk(
        &self,
        identities: Vec<AgentIdentity>,
        transport: T,
        subscriber: S,
    ) -> Vec<OperationOutcome>
    where
        T: Clone,
        S: Clone,
    {
        if identities.is_empty() {
            log::warn!("no agents to add to the agent group");
            return Vec::new();
        }
        let jobs = identities.into_iter().map(|identity| {
            let sessions = Arc::clone(&self.sessions);
            let cancel = self.cancel.clone();
            let options = self.options.clone();
            let transport = transport.clone();
            let subscriber = subscriber.clone();
            let agent = identity.login_name.clone();
            let job = async move {
                add_member(&sessions, &cancel, options, identity, transport, subscriber)
                    .await
                    .map(|_| ())
            };
            (agent, job)
        });

        let outcomes = collect_outcomes(jobs).await;
        log::info!("add {}", GroupReport::from_outcomes(&outcomes));
        outcomes
    }

    /// Log every member in
    pub async fn login(&self, options: TransitionOptions) -> Vec<OperationOutcome> {
        self.run(Operation::Login, options).await
    }

    /// Log every member out
    pub async fn logout(&self, options: TransitionOptions) -> Vec<OperationOutcome> {
        self.run(Operation::Logout, options).await
    }

    /// Switch every member to READY
    pub async fn ready(&self, options: TransitionOptions) -> Vec<OperationOutcome> {
        self.run(Operation::Ready, options).await
    }

    /// Switch every member to NOT_READY
    pub async fn not_ready(&self, options: TransitionOptions) -> Vec<OperationOutcome> {
        self.run(Operation::NotReady, options).await
    }

    /// Run `operation` on every member, one task per member
    ///
    /// Returns one outcome per member present when the call began, in
    /// completion order. An empty group yields no outcomes.
    pub async fn run(
        &self,
        operation: Operation,
        options: TransitionOptions,
    ) -> Vec<OperationOutcome> {
        let sessions = self.sessions();
        if sessions.is_empty() {
            log::warn!("agent group is empty, nothing to {}", operation);
            return Vec::new();
        }
        let jobs = sessions.into_iter().map(|session| {
            let cancel = self.cancel.clone();
            let agent = session.name().to_string();
            let job = async move {
                if cancel.is_cancelled() {
                    return Err(AgentError::cancelled(session.name()));
                }
                session.run(operation, options).await
            };
            (agent, job)
        });

        let outcomes = collect_outcomes(jobs).await;
        log::info!("{} {}", operation, GroupReport::from_outcomes(&outcomes));
        outcomes
    }

    /// Run an operation given by its state name
    ///
    /// An unrecognized name yields an unknown-command outcome for every
    /// member without touching any agent.
    pub async fn run_named(&self, name: &str, options: TransitionOptions) -> Vec<OperationOutcome> {
        if let Some(operation) = Operation::from_name(name) {
            return self.run(operation, options).await;
        }
        let sessions = self.sessions();
        if sessions.is_empty() {
            log::warn!("agent group is empty, nothing to {}", name);
        }
        sessions
            .iter()
            .map(|session| {
                let error = AgentError::unknown_command(name, session.name());
                log::error!("[{}] {}", session.name(), error);
                OperationOutcome::new(session.name(), Err(error))
            })
            .collect()
    }
}
