//! Shared fakes for integration tests
//!
//! `FakePlatform` answers the REST calls the engine makes and, like the real
//! platform, confirms accepted state changes over the push channel.

#![allow(dead_code)]

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use kodegen_finesse_agent::{
    AgentError, AgentIdentity, AgentSession, ApiRequest, ApiResponse, MemoryPushSource, Method,
    PresenceState, PushStream, PushSubscriber, Result, SessionOptions, StateChangeRequest,
    SubscriptionKey, Transport,
};
use parking_lot::Mutex;

pub type FakeSession = AgentSession<Arc<FakePlatform>, MemoryPushSource>;

/// Initialise logging once per test binary
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Short timeouts so failing paths finish quickly
pub fn fast_options() -> SessionOptions {
    SessionOptions::builder()
        .confirmation_timeout(Duration::from_millis(300))
        .delivery_timeout(Duration::from_millis(100))
        .subscribe_settle(Duration::ZERO)
        .build()
}

/// How the platform reacts to a state change for one agent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Behavior {
    /// Accept and confirm the requested state
    Confirm,
    /// Accept and confirm a different state
    ConfirmAs(PresenceState),
    /// Accept, then push an API error
    Reject(String),
    /// Accept, then push a user body without a resource URI
    Anonymous,
    /// Accept and push nothing
    Silent,
    /// Answer every request with this status
    Status(u16),
    /// Fail every request before a response
    Unreachable,
}

#[derive(Debug, Clone)]
struct Agent {
    id: String,
    state: PresenceState,
    behavior: Behavior,
    bodies: Vec<StateChangeRequest>,
}

/// Scripted stand-in for the contact-center platform
#[derive(Debug, Default)]
pub struct FakePlatform {
    push: MemoryPushSource,
    agents: Mutex<HashMap<String, Agent>>,
    requests: Mutex<Vec<ApiRequest>>,
    latency: Mutex<Duration>,
}

impl FakePlatform {
    pub fn new(push: MemoryPushSource) -> Arc<Self> {
        Arc::new(Self {
            push,
            ..Self::default()
        })
    }

    /// Register an agent; the login id is derived from the name
    pub fn add_agent(&self, name: &str, state: PresenceState) -> String {
        let id = format!("{}", 1_000_000 + self.agents.lock().len());
        self.agents.lock().insert(
            name.to_string(),
            Agent {
                id: id.clone(),
                state,
                behavior: Behavior::Confirm,
                bodies: Vec::new(),
            },
        );
        id
    }

    pub fn set_behavior(&self, name: &str, behavior: Behavior) {
        if let Some(agent) = self.agents.lock().get_mut(name) {
            agent.behavior = behavior;
        }
    }

    pub fn set_state(&self, name: &str, state: PresenceState) {
        if let Some(agent) = self.agents.lock().get_mut(name) {
            agent.state = state;
        }
    }

    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock() = latency;
    }

    pub fn id_of(&self, name: &str) -> String {
        self.agents.lock().get(name).map(|a| a.id.clone()).unwrap_or_default()
    }

    pub fn state_of(&self, name: &str) -> PresenceState {
        self.agents.lock().get(name).map_or(PresenceState::Unknown, |a| a.state)
    }

    /// State-change bodies received for `name`, oldest first
    pub fn bodies(&self, name: &str) -> Vec<StateChangeRequest> {
        self.agents.lock().get(name).map(|a| a.bodies.clone()).unwrap_or_default()
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().clone()
    }

    pub fn count(&self, method: Method) -> usize {
        self.requests.lock().iter().filter(|r| r.method == method).count()
    }

    /// Push an arbitrary update to `name`'s stream
    pub fn push_update(&self, name: &str, content: String) -> usize {
        self.push.publish_item(&self.id_of(name), content)
    }

    fn handle(&self, request: &ApiRequest) -> Result<ApiResponse> {
        self.requests.lock().push(request.clone());
        let key = request.path.trim_start_matches("/User/").to_string();
        let mut agents = self.agents.lock();
        let Some((name, agent)) = agents
            .iter_mut()
            .find(|(name, agent)| **name == key || agent.id == key)
        else {
            return Ok(ApiResponse::new(404, "<ApiErrors/>"));
        };
        match &agent.behavior {
            Behavior::Unreachable => {
                return Err(AgentError::request_failed("connection refused"));
            }
            Behavior::Status(status) => return Ok(ApiResponse::new(*status, "")),
            _ => {}
        }

        match request.method {
            Method::Get => Ok(ApiResponse::new(200, user_xml(name, &agent.id, agent.state))),
            Method::Put => {
                let body = request.body.as_deref().unwrap_or_default();
                let Ok(change) = StateChangeRequest::from_xml(body) else {
                    return Ok(ApiResponse::new(400, "bad body"));
                };
                let requested = match change.target() {
                    // the platform parks a fresh login in NOT_READY
                    PresenceState::Login => PresenceState::NotReady,
                    other => other,
                };
                agent.bodies.push(change);
                let push = match &agent.behavior {
                    Behavior::Confirm => {
                        agent.state = requested;
                        Some(user_update(name, &agent.id, requested))
                    }
                    Behavior::ConfirmAs(state) => {
                        agent.state = *state;
                        Some(user_update(name, &agent.id, *state))
                    }
                    Behavior::Reject(message) => Some(error_update(message)),
                    Behavior::Anonymous => Some(format!(
                        "<Update><data><user><state>{requested}</state></user></data></Update>"
                    )),
                    _ => None,
                };
                if let Some(content) = push {
                    self.push.publish_item(&agent.id, content);
                }
                Ok(ApiResponse::new(202, ""))
            }
        }
    }
}

impl Transport for FakePlatform {
    fn execute(&self, request: ApiRequest) -> impl Future<Output = Result<ApiResponse>> + Send {
        let latency = *self.latency.lock();
        let result = self.handle(&request);
        async move {
            if !latency.is_zero() {
                tokio::time::sleep(latency).await;
            }
            result
        }
    }
}

/// Subscriber whose streams can never be opened
#[derive(Debug, Clone, Default)]
pub struct BrokenPush;

impl PushSubscriber for BrokenPush {
    fn subscribe(&self, key: SubscriptionKey) -> impl Future<Output = Result<PushStream>> + Send {
        async move {
            Err(AgentError::subscription(format!(
                "authentication failed for [{}]",
                key.login_name
            )))
        }
    }
}

pub fn user_xml(name: &str, id: &str, state: PresenceState) -> String {
    format!(
        "<User><uri>/finesse/api/User/{id}</uri><loginId>{id}</loginId>\
         <loginName>{name}</loginName><state>{state}</state>\
         <teamName>Blue</teamName></User>"
    )
}

pub fn user_update(name: &str, id: &str, state: PresenceState) -> String {
    format!(
        "<Update><data><user><uri>/finesse/api/User/{id}</uri><loginId>{id}</loginId>\
         <loginName>{name}</loginName><state>{state}</state></user></data>\
         <event>PUT</event><source>/finesse/api/User/{id}</source></Update>"
    )
}

pub fn error_update(message: &str) -> String {
    format!(
        "<Update><data><apiErrors><apiError><errorType>Invalid State</errorType>\
         <errorMessage>{message}</errorMessage></apiError></apiErrors></data></Update>"
    )
}

pub fn identity(name: &str) -> AgentIdentity {
    AgentIdentity::new(name, "secret", format!("line-{name}"))
}

/// A ready-to-use session: registered, id resolved, notifications running
pub async fn started_session(
    platform: &Arc<FakePlatform>,
    push: &MemoryPushSource,
    name: &str,
    state: PresenceState,
) -> FakeSession {
    platform.add_agent(name, state);
    let session = AgentSession::new(
        identity(name),
        Arc::clone(platform),
        push.clone(),
        fast_options(),
    )
    .unwrap();
    session.resolve_id().await.unwrap();
    session.start_notifications().await.unwrap();
    session
}
