//! Shared fakes and catalogue fixtures for workflow tests.
//!
//! No network anywhere: the catalogue is a scripted JSON document and the
//! device is a recording fake.

#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::json;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use beq_bridge::{
    BridgeConfig, CatalogFetcher, InMemoryStateStore, LoadRequest, ProfileBridge, ProfileLoader,
};

/// Catalogue fetcher returning a scripted document, with a failure switch
/// and a call counter.
pub struct FakeCatalogFetcher {
    document: Mutex<serde_json::Value>,
    pub fail: AtomicBool,
    pub calls: AtomicUsize,
}

impl FakeCatalogFetcher {
    pub fn new(document: serde_json::Value) -> Self {
        Self {
            document: Mutex::new(document),
            fail: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn set_document(&self, document: serde_json::Value) {
        *self.document.lock().unwrap() = document;
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogFetcher for FakeCatalogFetcher {
    async fn fetch_document(&self) -> Result<serde_json::Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(anyhow!("connection reset by peer"));
        }
        Ok(self.document.lock().unwrap().clone())
    }
}

/// Profile loader recording every request, with a failure switch.
pub struct RecordingLoader {
    pub loads: Mutex<Vec<LoadRequest>>,
    pub unloads: Mutex<Vec<LoadRequest>>,
    pub fail: AtomicBool,
}

impl RecordingLoader {
    pub fn new() -> Self {
        Self {
            loads: Mutex::new(Vec::new()),
            unloads: Mutex::new(Vec::new()),
            fail: AtomicBool::new(false),
        }
    }

    pub fn load_count(&self) -> usize {
        self.loads.lock().unwrap().len()
    }
}

#[async_trait]
impl ProfileLoader for RecordingLoader {
    async fn load_profile(&self, request: &LoadRequest) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(anyhow!("device rejected the request"));
        }
        self.loads.lock().unwrap().push(request.clone());
        Ok(())
    }

    async fn unload_profile(&self, request: &LoadRequest) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(anyhow!("device rejected the request"));
        }
        self.unloads.lock().unwrap().push(request.clone());
        Ok(())
    }
}

/// A fully wired bridge plus handles onto its collaborators.
pub struct TestBridge {
    pub bridge: ProfileBridge,
    pub store: Arc<InMemoryStateStore>,
    pub loader: Arc<RecordingLoader>,
    pub fetcher: Arc<FakeCatalogFetcher>,
}

pub fn bridge_with_catalog(document: serde_json::Value) -> TestBridge {
    bridge_with(BridgeConfig::default(), document)
}

pub fn bridge_with(config: BridgeConfig, document: serde_json::Value) -> TestBridge {
    let store = Arc::new(InMemoryStateStore::new());
    let loader = Arc::new(RecordingLoader::new());
    let fetcher = Arc::new(FakeCatalogFetcher::new(document));
    let bridge = ProfileBridge::new(config, store.clone(), loader.clone(), fetcher.clone());

    TestBridge {
        bridge,
        store,
        loader,
        fetcher,
    }
}

/// Two Matrix releases: one with two audio tracks, one with a single track.
pub fn matrix_catalog() -> serde_json::Value {
    json!([
        {
            "theMovieDB": "603",
            "title": "The Matrix",
            "year": 1999,
            "audioTypes": ["Atmos", "5.1"],
            "author": "aron7awol"
        },
        {
            "theMovieDB": "604",
            "title": "The Matrix Reloaded",
            "year": 2003,
            "audioTypes": ["DTS-HD MA"],
            "author": "mobe1969"
        }
    ])
}
