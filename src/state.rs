//! Application state management
//!
//! This module defines the AppState structure that holds:
//! - Server configuration
//! - The shared auto-sync cache
//! - The sync orchestrator used by the subtitle endpoint

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::ServerConfig;
use crate::error::Result;
use crate::sync::{SyncCache, SyncOrchestrator};

/// Application state shared across all handlers
#[derive(Debug)]
pub struct AppState {
    /// Synchronized documents (cache key -> WebVTT text)
    pub cache: Arc<SyncCache>,

    /// Auto-sync pipeline and manual-offset fallback
    pub orchestrator: SyncOrchestrator,

    /// Server shutdown flag
    pub shutdown: AtomicBool,

    /// Server configuration
    pub config: ServerConfig,
}

impl AppState {
    /// Create a new AppState with the given configuration
    pub fn new(config: ServerConfig) -> Result<Self> {
        let cache = Arc::new(SyncCache::new(config.cache.ttl()));
        let orchestrator = SyncOrchestrator::from_config(config.sync.clone(), cache.clone())?;
        Ok(Self {
            cache,
            orchestrator,
            shutdown: AtomicBool::new(false),
            config,
        })
    }

    /// Create AppState with default configuration
    pub fn with_defaults() -> Result<Self> {
        Self::new(ServerConfig::default())
    }

    /// Drop expired cache entries, returning how many were removed
    pub fn sweep_cache(&self) -> usize {
        self.cache.clear_expired()
    }

    /// Signal shutdown
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    /// Check if shutdown is requested
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }
}
