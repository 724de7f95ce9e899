//! Recording doubles for the session collaborators

use crate::api::AdminApi;
use crate::error::ApiError;
use crate::navigation::Navigator;
use crate::types::{Admin, TokenGrant};
use async_trait::async_trait;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::future::poll_fn;
use std::task::Poll;

/// A call received by [`FakeAdminApi`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    VerifyPhone(String),
    Refresh,
    CurrentAdmin(String),
    Logout(Option<String>),
}

/// Scripted backend.
///
/// Responses are consumed in order; an empty script answers verification,
/// refresh and lookup with a 401 and logout with success.
#[derive(Default)]
pub struct FakeAdminApi {
    verify: RefCell<VecDeque<Result<TokenGrant, ApiError>>>,
    refresh: RefCell<VecDeque<Result<TokenGrant, ApiError>>>,
    current_admin: RefCell<VecDeque<Result<Admin, ApiError>>>,
    logout: RefCell<VecDeque<Result<(), ApiError>>>,
    calls: RefCell<Vec<ApiCall>>,
    panic_on_lookup: Cell<bool>,
}

impl FakeAdminApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_verify(&self, response: Result<TokenGrant, ApiError>) -> &Self {
        self.verify.borrow_mut().push_back(response);
        self
    }

    pub fn push_refresh(&self, response: Result<TokenGrant, ApiError>) -> &Self {
        self.refresh.borrow_mut().push_back(response);
        self
    }

    pub fn push_current_admin(&self, response: Result<Admin, ApiError>) -> &Self {
        self.current_admin.borrow_mut().push_back(response);
        self
    }

    pub fn push_logout(&self, response: Result<(), ApiError>) -> &Self {
        self.logout.borrow_mut().push_back(response);
        self
    }

    /// Make the admin lookup panic, simulating a broken collaborator
    pub fn panic_on_lookup(&self) {
        self.panic_on_lookup.set(true);
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.borrow().clone()
    }

    pub fn count(&self, matches: impl Fn(&ApiCall) -> bool) -> usize {
        self.calls.borrow().iter().filter(|call| matches(call)).count()
    }

    fn record(&self, call: ApiCall) {
        self.calls.borrow_mut().push(call);
    }
}

fn rejected() -> ApiError {
    ApiError::with_status(401, "Token expired")
}

/// Suspend once so concurrent callers interleave like real network calls
async fn yield_once() {
    let mut yielded = false;
    poll_fn(|cx| {
        if yielded {
            Poll::Ready(())
        } else {
            yielded = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    })
    .await;
}

#[async_trait(?Send)]
impl AdminApi for FakeAdminApi {
    async fn verify_phone(&self, phone: &str) -> Result<TokenGrant, ApiError> {
        self.record(ApiCall::VerifyPhone(phone.to_string()));
        yield_once().await;
        self.verify
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::with_status(404, "Unknown phone number")))
    }

    async fn refresh_token(&self) -> Result<TokenGrant, ApiError> {
        self.record(ApiCall::Refresh);
        yield_once().await;
        self.refresh
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(rejected()))
    }

    async fn current_admin(&self, token: &str) -> Result<Admin, ApiError> {
        self.record(ApiCall::CurrentAdmin(token.to_string()));
        yield_once().await;
        if self.panic_on_lookup.get() {
            panic!("admin lookup exploded");
        }
        self.current_admin
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(rejected()))
    }

    async fn logout(&self, token: Option<&str>) -> Result<(), ApiError> {
        self.record(ApiCall::Logout(token.map(str::to_string)));
        yield_once().await;
        self.logout.borrow_mut().pop_front().unwrap_or(Ok(()))
    }
}

/// Records every navigation
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    visited: RefCell<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visited(&self) -> Vec<String> {
        self.visited.borrow().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str) {
        self.visited.borrow_mut().push(path.to_string());
    }
}

/// Grant as returned by the backend
pub fn grant(token: &str, admin_id: i64, name: &str) -> TokenGrant {
    TokenGrant {
        access_token: token.to_string(),
        admin_id,
        admin_name: name.to_string(),
    }
}
