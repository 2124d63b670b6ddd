// Code generated by interface-gen. DO NOT EDIT.
// Fingerprint: sha256:90d6999975de704f6eeb182c3fe856c2bc997eb791bf0f5688cb1e542c9f3b2c

//! Chain interfaces for `interfaces`.

#![allow(unused_imports)]

use crate::handlers;
use crate::support;
use crate::support::{Context, Error};

/// Messages originated by `api`. The router implements this trait.
pub trait ApiSendable: Send + Sync {
    /// Starts the `CreateAccountRequest` chain.
    fn send_create_account_request_from_api(&self, ctx: &Context, msg: &support::CreateAccountRequestProto) -> Result<support::AccountProto, Error>;

    /// Starts the `Ping` chain.
    fn send_ping_from_api(&self, ctx: &Context, msg: &support::PingProto) -> Result<(), Error>;
}

/// Messages received by `auth`.
pub trait AuthReceiver: Send + Sync {
    /// Intermediate receiver of `CreateAccountRequest`: `next` resumes the chain.
    fn handle_create_account_request(&self, ctx: &Context, msg: &support::CreateAccountRequestProto, next: &mut dyn AuthCreateAccountRequestNext) -> Result<(), Error>;
}

/// Resumes the `CreateAccountRequest` chain after `auth`.
pub trait AuthCreateAccountRequestNext {
    /// Runs the rest of the chain at most once and returns its result.
    fn send_create_account_request_from_auth(&mut self, ctx: &Context, msg: &support::CreateAccountRequestProto) -> Result<&support::AccountProto, &Error>;
}

/// Messages received by `audit`.
pub trait AuditReceiver: Send + Sync {
    /// Intermediate receiver of `CreateAccountRequest`: `next` resumes the chain.
    fn handle_create_account_request(&self, ctx: &Context, msg: &support::CreateAccountRequestProto, next: &mut dyn AuditCreateAccountRequestNext) -> Result<(), Error>;

    /// Intermediate receiver of `Ping`: `next` resumes the chain.
    fn handle_ping(&self, ctx: &Context, msg: &support::PingProto, next: &mut dyn AuditPingNext) -> Result<(), Error>;
}

/// Resumes the `CreateAccountRequest` chain after `audit`.
pub trait AuditCreateAccountRequestNext {
    /// Runs the rest of the chain at most once and returns its result.
    fn send_create_account_request_from_audit(&mut self, ctx: &Context, msg: &support::CreateAccountRequestProto) -> Result<&support::AccountProto, &Error>;
}

/// Resumes the `Ping` chain after `audit`.
pub trait AuditPingNext {
    /// Runs the rest of the chain at most once and returns its result.
    fn send_ping_from_audit(&mut self, ctx: &Context, msg: &support::PingProto) -> Result<&(), &Error>;
}

/// Messages received by `repo`.
pub trait RepoReceiver: Send + Sync {
    /// Terminal receiver of `CreateAccountRequest`: produces the response.
    fn handle_create_account_request(&self, ctx: &Context, msg: &support::CreateAccountRequestProto) -> Result<support::AccountProto, Error>;

    /// Terminal receiver of `Ping`: produces the response.
    fn handle_ping(&self, ctx: &Context, msg: &support::PingProto) -> Result<(), Error>;
}
