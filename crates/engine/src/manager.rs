// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pipeline lifecycle: configuration, start, the event-driven loop, stop.
//!
//! The manager is the only component that mutates global state (config,
//! status, worker handles). Every start builds a fresh dispatcher,
//! resource creator, instance manager, and node set so no stale state
//! survives a restart. The loop itself runs entirely inside the worker
//! thread's outermost `emit`: each node's handler executes the node and
//! enqueues the next hop, and the dispatcher drains the queue until the
//! stop flag starves it.

use crate::config::ManagerConfig;
use crate::error::{NodeError, PipelineError};
use crate::node::{node_start_event, Node, NodeContext};
use crate::observer::{Observer, ObserverHub};
use crate::registry::NodeRegistry;
use parking_lot::Mutex;
use relay_core::{
    Clock, EventDispatcher, FileStore, ResourceContext, ResourceCreator,
    ResourceInstanceManager, SystemClock,
};
use relay_store::LocalStore;
use relay_wire::{image_urls, Ack, NodeDescriptor, PipelineStatus, StatusReport, StreamMessage};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::JoinHandle;
use tracing::{debug, info, warn};

/// Owns one pipeline's configuration and lifecycle.
pub struct PipelineManager {
    config: ManagerConfig,
    store: Arc<dyn FileStore>,
    clock: Arc<dyn Clock>,
    registry: Mutex<NodeRegistry>,
    observers: Arc<ObserverHub>,
    state: Mutex<ManagerState>,
}

struct ManagerState {
    status: PipelineStatus,
    pipeline: Option<Vec<NodeDescriptor>>,
    run: Option<ActiveRun>,
    cleanup: Option<JoinHandle<()>>,
}

/// Live state of a running pipeline, torn down by the cleanup worker.
struct ActiveRun {
    stop: Arc<AtomicBool>,
    nodes: Arc<Mutex<Vec<Box<dyn Node>>>>,
    resources: Arc<ResourceInstanceManager>,
    worker: JoinHandle<()>,
    worker_exit: mpsc::Receiver<()>,
}

impl PipelineManager {
    /// Manager backed by a local directory store per the config.
    pub fn new(config: ManagerConfig) -> Self {
        let store: Arc<dyn FileStore> =
            Arc::new(LocalStore::new(config.store_dir.clone(), config.store_url.clone()));
        Self::with_store(config, store)
    }

    /// Manager with an injected file store (tests, alternative backends).
    pub fn with_store(config: ManagerConfig, store: Arc<dyn FileStore>) -> Self {
        let observers = Arc::new(ObserverHub::new(config.observer_capacity));
        Self {
            config,
            store,
            clock: Arc::new(SystemClock),
            registry: Mutex::new(NodeRegistry::builtin()),
            observers,
            state: Mutex::new(ManagerState {
                status: PipelineStatus::Idle,
                pipeline: None,
                run: None,
                cleanup: None,
            }),
        }
    }

    /// Register an additional node kind.
    pub fn register_kind<F>(&self, name: &str, class_name: &str, factory: F)
    where
        F: Fn(NodeContext, NodeDescriptor) -> Result<Box<dyn Node>, NodeError>
            + Send
            + Sync
            + 'static,
    {
        self.registry.lock().register(name, class_name, factory);
    }

    /// Resolve a name→directory plugin map onto the registry.
    pub fn load_plugins(&self, plugins: &[(String, PathBuf)]) -> Result<(), PipelineError> {
        crate::manifest::register_plugins(&mut self.registry.lock(), plugins)
    }

    pub fn subscribe(&self, observer: Box<dyn Observer>) -> String {
        self.observers.subscribe(observer)
    }

    pub fn unsubscribe(&self, id: &str) {
        self.observers.unsubscribe(id)
    }

    /// Store a new pipeline configuration. Rejected while running.
    pub fn set_config(&self, pipeline: Vec<NodeDescriptor>) -> Result<Ack, PipelineError> {
        let mut seen = HashSet::new();
        for descriptor in &pipeline {
            if !seen.insert(descriptor.id.clone()) {
                return Err(PipelineError::DuplicateNodeId(descriptor.id.clone()));
            }
        }

        let mut state = self.state.lock();
        if state.status == PipelineStatus::Running {
            return Err(PipelineError::InvalidState { op: "set_config", status: state.status });
        }
        info!(nodes = pipeline.len(), "pipeline configured");
        state.pipeline = Some(pipeline);
        state.status = PipelineStatus::Idle;
        Ok(Ack::new("Pipeline configured", state.status))
    }

    pub fn status(&self) -> StatusReport {
        let state = self.state.lock();
        StatusReport {
            status: state.status,
            has_config: state.pipeline.is_some(),
            config_length: state.pipeline.as_ref().map_or(0, Vec::len),
        }
    }

    /// Build, prepare, wire, and launch the configured pipeline.
    pub fn start(&self) -> Result<Ack, PipelineError> {
        let mut state = self.state.lock();
        if state.status == PipelineStatus::Running {
            return Err(PipelineError::InvalidState { op: "start", status: state.status });
        }
        let pipeline = state.pipeline.clone().ok_or(PipelineError::NoConfig)?;

        // Let the previous run's teardown finish before reusing filenames
        // and event names.
        if let Some(handle) = state.cleanup.take() {
            let _ = handle.join();
        }

        match self.launch(&pipeline) {
            Ok(run) => {
                state.run = Some(run);
                state.status = PipelineStatus::Running;
                Ok(Ack::new("Pipeline started", state.status))
            }
            Err(err) => {
                self.observers.publish(StreamMessage::PipelineError {
                    error: err.to_string(),
                    timestamp: self.timestamp(),
                });
                Err(err)
            }
        }
    }

    /// Raise the stop flag and hand teardown to a cleanup worker, so the
    /// control caller never blocks on device I/O. Idempotent.
    pub fn stop(&self) -> Result<Ack, PipelineError> {
        let mut state = self.state.lock();
        let Some(run) = state.run.take() else {
            return Ok(Ack::new("Pipeline is not running", state.status));
        };

        run.stop.store(true, Ordering::SeqCst);
        state.status = PipelineStatus::Stopped;
        info!("pipeline stopping");

        let observers = self.observers.clone();
        let clock = self.clock.clone();
        let join_timeout = self.config.join_timeout;
        let cleanup = std::thread::Builder::new()
            .name("relay-cleanup".to_string())
            .spawn(move || teardown(run, join_timeout, &observers, clock.as_ref()));
        match cleanup {
            Ok(handle) => state.cleanup = Some(handle),
            Err(err) => warn!(error = %err, "cleanup thread failed to spawn"),
        }

        Ok(Ack::new("Pipeline stopped", PipelineStatus::Stopped))
    }

    /// Block until the background teardown from the last `stop` finished.
    pub fn join_cleanup(&self) {
        let handle = self.state.lock().cleanup.take();
        if let Some(handle) = handle {
            let _ = handle.join();
        }
    }

    fn timestamp(&self) -> String {
        self.clock.now_utc().to_rfc3339()
    }

    /// Fresh context, nodes, wiring, and worker for one run.
    fn launch(&self, pipeline: &[NodeDescriptor]) -> Result<ActiveRun, PipelineError> {
        let events = Arc::new(EventDispatcher::new());
        let resources = Arc::new(ResourceInstanceManager::new());
        let creator = Arc::new(ResourceCreator::builtin(ResourceContext {
            events: events.clone(),
            clock: self.clock.clone(),
            store: self.store.clone(),
        }));
        let registry = self.registry.lock().clone();
        let stop = Arc::new(AtomicBool::new(false));
        let node_count = pipeline.len();

        // Construct and prepare in config order; any failure is fatal for
        // the whole start and unwinds the nodes prepared so far.
        let mut nodes: Vec<Box<dyn Node>> = Vec::with_capacity(node_count);
        for (index, descriptor) in pipeline.iter().enumerate() {
            let next_index = if index + 1 < node_count { Some(index + 1) } else { None };
            let ctx = NodeContext::new(
                events.clone(),
                creator.clone(),
                resources.clone(),
                self.store.clone(),
                self.clock.clone(),
                stop.clone(),
            )
            .with_next_index(next_index);

            let built = registry.build(ctx, descriptor.clone()).and_then(|mut node| {
                node.prepare()
                    .map_err(|source| PipelineError::Prepare {
                        id: descriptor.id.clone(),
                        source,
                    })
                    .map(|()| node)
            });
            match built {
                Ok(node) => nodes.push(node),
                Err(err) => {
                    for node in nodes.iter_mut() {
                        node.dispose();
                    }
                    resources.clear_all();
                    return Err(err);
                }
            }
        }

        let nodes = Arc::new(Mutex::new(nodes));
        for (index, descriptor) in pipeline.iter().enumerate() {
            events.on(
                &node_start_event(index),
                self.node_handler(
                    index,
                    node_count,
                    descriptor,
                    nodes.clone(),
                    stop.clone(),
                    resources.clone(),
                ),
            );
        }

        self.observers.publish(StreamMessage::PipelineStart {
            message: "Pipeline started".to_string(),
            node_count,
            timestamp: self.timestamp(),
        });

        let (exit_tx, worker_exit) = mpsc::channel();
        let worker = {
            let events = events.clone();
            let stop = stop.clone();
            std::thread::Builder::new().name("relay-pipeline".to_string()).spawn(move || {
                if !stop.load(Ordering::SeqCst) {
                    // The entire steady-state loop drains inside this emit.
                    events.emit(&node_start_event(0), relay_core::EventPayload::Empty);
                }
                debug!("pipeline worker exiting");
                let _ = exit_tx.send(());
            })?
        };

        Ok(ActiveRun { stop, nodes, resources, worker, worker_exit })
    }

    /// Handler for `node_start_{index}`: stop gate, execute with error
    /// containment, snapshot broadcast, stop recheck, chain.
    fn node_handler(
        &self,
        index: usize,
        node_count: usize,
        descriptor: &NodeDescriptor,
        nodes: Arc<Mutex<Vec<Box<dyn Node>>>>,
        stop: Arc<AtomicBool>,
        resources: Arc<ResourceInstanceManager>,
    ) -> impl Fn(&relay_core::EventPayload) -> Result<(), relay_core::HandlerError>
           + Send
           + Sync
           + 'static {
        let observers = self.observers.clone();
        let clock = self.clock.clone();
        let node_id = descriptor.id.clone();
        let node_name = descriptor.name.clone();

        move |_payload| {
            if stop.load(Ordering::SeqCst) {
                return Ok(());
            }
            if index >= node_count {
                warn!(index, node_count, "node index out of range, ignoring");
                return Ok(());
            }

            let timestamp = clock.now_utc().to_rfc3339();
            observers.publish(StreamMessage::NodeStart {
                node_index: index,
                node_id: node_id.clone(),
                node_name: node_name.clone(),
                timestamp,
            });

            let result = {
                let mut nodes = nodes.lock();
                nodes[index].execute()
            };

            match result {
                Ok(()) => {
                    let snapshot = match resources.serialize() {
                        Ok(records) => records,
                        Err(err) => {
                            warn!(error = %err, "resource snapshot failed");
                            Vec::new()
                        }
                    };
                    let urls = image_urls(&snapshot);
                    observers.publish(StreamMessage::NodeComplete {
                        node_index: index,
                        node_id: node_id.clone(),
                        node_name: node_name.clone(),
                        resources: snapshot,
                        image_urls: urls,
                        timestamp: clock.now_utc().to_rfc3339(),
                    });
                    if index + 1 == node_count {
                        observers.publish(StreamMessage::CycleComplete {
                            message: "Cycle complete".to_string(),
                            timestamp: clock.now_utc().to_rfc3339(),
                        });
                    }
                }
                // A failed tick never cancels the loop: report it and
                // chain anyway.
                Err(err) => {
                    warn!(node = %node_id, error = %err, "node execute failed");
                    observers.publish(StreamMessage::NodeError {
                        node_index: index,
                        node_id: node_id.clone(),
                        node_name: node_name.clone(),
                        error: err.to_string(),
                        timestamp: clock.now_utc().to_rfc3339(),
                    });
                }
            }

            if stop.load(Ordering::SeqCst) {
                return Ok(());
            }
            let mut nodes = nodes.lock();
            nodes[index].next();
            Ok(())
        }
    }
}

impl Drop for PipelineManager {
    fn drop(&mut self) {
        let _ = self.stop();
        self.join_cleanup();
    }
}

/// Join the worker within the bound, dispose every node in construction
/// order, tear down the instance map, and announce the stop.
fn teardown(
    run: ActiveRun,
    join_timeout: std::time::Duration,
    observers: &ObserverHub,
    clock: &dyn Clock,
) {
    match run.worker_exit.recv_timeout(join_timeout) {
        Ok(()) => {
            let _ = run.worker.join();
        }
        Err(_) => {
            warn!(timeout = ?join_timeout, "pipeline worker did not exit in time, abandoning");
        }
    }

    {
        let mut nodes = run.nodes.lock();
        for node in nodes.iter_mut() {
            node.dispose();
        }
    }
    run.resources.clear_all();

    observers.publish(StreamMessage::PipelineStop {
        message: "Pipeline stopped".to_string(),
        timestamp: clock.now_utc().to_rfc3339(),
    });
    info!("pipeline stopped");
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
