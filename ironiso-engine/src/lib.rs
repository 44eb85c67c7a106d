/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # IronIso Engine
//!
//! High-level ISO 8583 client for the IronIso protocol implementation.
//!
//! This crate provides:
//! - **Client**: Synchronous, deferred and fire-and-forget sends over one connection
//! - **Inbound dispatch**: Pending requests first, the listener chain otherwise
//! - **Listener trait**: Callback interface for unsolicited messages
//! - **Builder API**: Fluent configuration for client setup

pub mod builder;
pub mod client;
pub mod listener;

pub use builder::ClientBuilder;
pub use client::{IsoClient, PendingResponse};
pub use listener::{ListenerChain, MessageListener, NetworkEchoListener};
