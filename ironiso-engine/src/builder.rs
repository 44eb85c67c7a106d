/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Client builder for fluent configuration.
//!
//! This module provides a builder API for assembling an [`IsoClient`] from a
//! protocol schema, field packagers, correlation strategy and listeners.

use crate::client::IsoClient;
use crate::listener::{ListenerChain, MessageListener};
use ironiso_codec::{FieldPackager, FieldPackagerRegistry, MessagePackager};
use ironiso_core::ValidationError;
use ironiso_schema::ProtocolSchema;
use ironiso_session::{
    DefaultMessageBinder, MessageBinder, MessageKeyGenerator, ObserverRegistry,
    SchemaKeyGenerator, SessionConfig,
};
use ironiso_transport::FrameSink;
use std::sync::Arc;
use std::time::Duration;

/// Builder for configuring an ISO 8583 client.
pub struct ClientBuilder {
    /// Protocol schema shared by the packager and the key generator.
    schema: Arc<ProtocolSchema>,
    /// Field packagers available to the schema.
    packagers: FieldPackagerRegistry,
    /// Session settings.
    config: SessionConfig,
    /// Correlation key generator; schema-driven when unset.
    keys: Option<Arc<dyn MessageKeyGenerator>>,
    /// Response binder; the default binder when unset.
    binder: Option<Arc<dyn MessageBinder>>,
    /// Listeners for unsolicited messages.
    listeners: Vec<Arc<dyn MessageListener>>,
}

impl ClientBuilder {
    /// Creates a builder with the default packagers and session settings.
    #[must_use]
    pub fn new(schema: Arc<ProtocolSchema>) -> Self {
        Self {
            schema,
            packagers: FieldPackagerRegistry::with_defaults(),
            config: SessionConfig::default(),
            keys: None,
            binder: None,
            listeners: Vec::new(),
        }
    }

    /// Replaces the session configuration.
    #[must_use]
    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the client name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    /// Sets the default request timeout.
    #[must_use]
    pub const fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Sets the maximum inbound frame size.
    #[must_use]
    pub const fn max_frame_size(mut self, size: usize) -> Self {
        self.config.max_frame_size = size;
        self
    }

    /// Replaces the field packager registry.
    #[must_use]
    pub fn with_packagers(mut self, packagers: FieldPackagerRegistry) -> Self {
        self.packagers = packagers;
        self
    }

    /// Registers an additional field packager.
    #[must_use]
    pub fn add_packager(mut self, packager: Arc<dyn FieldPackager>) -> Self {
        self.packagers.register(packager);
        self
    }

    /// Sets the correlation key generator used by the default binder.
    #[must_use]
    pub fn with_key_generator(mut self, keys: Arc<dyn MessageKeyGenerator>) -> Self {
        self.keys = Some(keys);
        self
    }

    /// Sets the response binder. Overrides any key generator.
    #[must_use]
    pub fn with_binder(mut self, binder: Arc<dyn MessageBinder>) -> Self {
        self.binder = Some(binder);
        self
    }

    /// Adds a listener for unsolicited messages.
    #[must_use]
    pub fn add_listener(mut self, listener: Arc<dyn MessageListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    /// Returns the session configuration.
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Returns the protocol schema.
    #[must_use]
    pub fn schema(&self) -> &Arc<ProtocolSchema> {
        &self.schema
    }

    /// Builds a client writing to `sink`.
    ///
    /// # Errors
    /// Returns a `ValidationError` for an invalid schema, a codec with no
    /// registered packager, or invalid session settings.
    pub fn build<S: FrameSink>(self, sink: S) -> Result<IsoClient<S>, ValidationError> {
        self.config.validate()?;
        let packager = MessagePackager::new(Arc::clone(&self.schema), Arc::new(self.packagers))?;

        let binder = match (self.binder, self.keys) {
            (Some(binder), _) => binder,
            (None, Some(keys)) => Arc::new(DefaultMessageBinder::new(keys)),
            (None, None) => Arc::new(DefaultMessageBinder::new(Arc::new(
                SchemaKeyGenerator::new(Arc::clone(&self.schema)),
            ))),
        };

        let listeners = ListenerChain::new();
        for listener in self.listeners {
            listeners.add(listener);
        }

        Ok(IsoClient::new(
            self.config,
            Arc::new(packager),
            Arc::new(ObserverRegistry::new(binder)),
            Arc::new(listeners),
            sink,
        ))
    }
}

impl std::fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("config", &self.config)
            .field("packagers", &self.packagers.len())
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}
