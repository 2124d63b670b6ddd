// Code generated by messenger-gen. DO NOT EDIT.
// Fingerprint: sha256:0e8251a5f4ff156a28c472fe7c9cae9387585c0089cc418286adaf84ecf275ce

//! Message router for `interfaces`.

#![allow(unused_imports)]

use std::sync::Arc;

use crate::handlers;
use crate::support;
use crate::support::{Context, Error};

use crate::interfaces::{ApiSendable, AuditCreateAccountRequestNext, AuditPingNext, AuditReceiver, AuthCreateAccountRequestNext, AuthReceiver, RepoReceiver};

/// Routes every declared message through its receiver chain.
///
/// Calls run on the caller's thread with the caller's context. The first
/// intermediate receiver to fail ends the chain and its error is returned as is.
pub struct Messenger {
    auth: Arc<dyn AuthReceiver>,
    audit: Arc<dyn AuditReceiver>,
    repo: Arc<dyn RepoReceiver>,
}

impl Messenger {
    /// Wraps one concrete handler per receiver, in declaration order.
    pub fn new(auth: handlers::Auth, audit: handlers::Audit, repo: handlers::Repo) -> Self {
        Self::from_receivers(Arc::new(auth), Arc::new(audit), Arc::new(repo))
    }

    /// Builds the router from trait objects, such as test doubles.
    pub fn from_receivers(auth: Arc<dyn AuthReceiver>, audit: Arc<dyn AuditReceiver>, repo: Arc<dyn RepoReceiver>) -> Self {
        Self { auth, audit, repo }
    }

    fn create_account_request_from_api_at_0(&self, ctx: &Context, msg: &support::CreateAccountRequestProto) -> Result<support::AccountProto, Error> {
        let mut next = CreateAccountRequestFromApiAt1 {
            messenger: self,
            result: None,
        };
        self.auth.handle_create_account_request(ctx, msg, &mut next)?;
        match next.result {
            Some(result) => result,
            None => self.create_account_request_from_api_at_1(ctx, msg),
        }
    }

    fn create_account_request_from_api_at_1(&self, ctx: &Context, msg: &support::CreateAccountRequestProto) -> Result<support::AccountProto, Error> {
        let mut next = CreateAccountRequestFromApiAt2 {
            messenger: self,
            result: None,
        };
        self.audit.handle_create_account_request(ctx, msg, &mut next)?;
        match next.result {
            Some(result) => result,
            None => self.create_account_request_from_api_at_2(ctx, msg),
        }
    }

    fn create_account_request_from_api_at_2(&self, ctx: &Context, msg: &support::CreateAccountRequestProto) -> Result<support::AccountProto, Error> {
        self.repo.handle_create_account_request(ctx, msg)
    }

    fn ping_from_api_at_0(&self, ctx: &Context, msg: &support::PingProto) -> Result<(), Error> {
        let mut next = PingFromApiAt1 {
            messenger: self,
            result: None,
        };
        self.audit.handle_ping(ctx, msg, &mut next)?;
        match next.result {
            Some(result) => result,
            None => self.ping_from_api_at_1(ctx, msg),
        }
    }

    fn ping_from_api_at_1(&self, ctx: &Context, msg: &support::PingProto) -> Result<(), Error> {
        self.repo.handle_ping(ctx, msg)
    }
}

impl ApiSendable for Messenger {
    fn send_create_account_request_from_api(&self, ctx: &Context, msg: &support::CreateAccountRequestProto) -> Result<support::AccountProto, Error> {
        self.create_account_request_from_api_at_0(ctx, msg)
    }

    fn send_ping_from_api(&self, ctx: &Context, msg: &support::PingProto) -> Result<(), Error> {
        self.ping_from_api_at_0(ctx, msg)
    }
}

/// Resumes `CreateAccountRequest` from `api` at receiver 1.
struct CreateAccountRequestFromApiAt1<'a> {
    messenger: &'a Messenger,
    result: Option<Result<support::AccountProto, Error>>,
}

impl AuthCreateAccountRequestNext for CreateAccountRequestFromApiAt1<'_> {
    fn send_create_account_request_from_auth(&mut self, ctx: &Context, msg: &support::CreateAccountRequestProto) -> Result<&support::AccountProto, &Error> {
        let messenger = self.messenger;
        self.result
            .get_or_insert_with(|| messenger.create_account_request_from_api_at_1(ctx, msg))
            .as_ref()
    }
}

/// Resumes `CreateAccountRequest` from `api` at receiver 2.
struct CreateAccountRequestFromApiAt2<'a> {
    messenger: &'a Messenger,
    result: Option<Result<support::AccountProto, Error>>,
}

impl AuditCreateAccountRequestNext for CreateAccountRequestFromApiAt2<'_> {
    fn send_create_account_request_from_audit(&mut self, ctx: &Context, msg: &support::CreateAccountRequestProto) -> Result<&support::AccountProto, &Error> {
        let messenger = self.messenger;
        self.result
            .get_or_insert_with(|| messenger.create_account_request_from_api_at_2(ctx, msg))
            .as_ref()
    }
}

/// Resumes `Ping` from `api` at receiver 1.
struct PingFromApiAt1<'a> {
    messenger: &'a Messenger,
    result: Option<Result<(), Error>>,
}

impl AuditPingNext for PingFromApiAt1<'_> {
    fn send_ping_from_audit(&mut self, ctx: &Context, msg: &support::PingProto) -> Result<&(), &Error> {
        let messenger = self.messenger;
        self.result
            .get_or_insert_with(|| messenger.ping_from_api_at_1(ctx, msg))
            .as_ref()
    }
}
