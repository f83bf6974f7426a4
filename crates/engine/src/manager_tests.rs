// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::observer::ChannelObserver;
use relay_core::test_support::TestStore;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::mpsc as std_mpsc;
use std::time::{Duration, Instant};

/// Minimal node: counts ticks, optionally sleeps, counts disposals.
struct TickNode {
    ctx: NodeContext,
    ticks: Arc<AtomicU64>,
    disposals: Arc<AtomicU64>,
    delay: Duration,
    fail_execute: bool,
}

impl Node for TickNode {
    fn context(&self) -> &NodeContext {
        &self.ctx
    }

    fn execute(&mut self) -> Result<(), NodeError> {
        if self.fail_execute {
            return Err(NodeError::Device("synthetic failure".to_string()));
        }
        self.ticks.fetch_add(1, AtomicOrdering::SeqCst);
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        Ok(())
    }

    fn dispose(&mut self) {
        self.disposals.fetch_add(1, AtomicOrdering::SeqCst);
    }
}

struct TickHandles {
    ticks: Arc<AtomicU64>,
    disposals: Arc<AtomicU64>,
}

fn manager() -> PipelineManager {
    let config = ManagerConfig {
        join_timeout: Duration::from_secs(2),
        ..ManagerConfig::default()
    };
    PipelineManager::with_store(config, TestStore::new())
}

fn register_tick(manager: &PipelineManager, kind: &str, delay: Duration, fail: bool) -> TickHandles {
    let ticks = Arc::new(AtomicU64::new(0));
    let disposals = Arc::new(AtomicU64::new(0));
    let handles = TickHandles { ticks: ticks.clone(), disposals: disposals.clone() };
    manager.register_kind(kind, "TickNode", move |ctx, _descriptor| {
        Ok(Box::new(TickNode {
            ctx,
            ticks: ticks.clone(),
            disposals: disposals.clone(),
            delay,
            fail_execute: fail,
        }) as Box<dyn Node>)
    });
    handles
}

fn wait_for(deadline: Duration, mut done: impl FnMut() -> bool) -> bool {
    let end = Instant::now() + deadline;
    while Instant::now() < end {
        if done() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    done()
}

#[test]
fn fresh_manager_is_idle_without_config() {
    let manager = manager();
    let report = manager.status();
    assert_eq!(report.status, PipelineStatus::Idle);
    assert!(!report.has_config);
    assert_eq!(report.config_length, 0);
}

#[test]
fn set_config_stores_pipeline() {
    let manager = manager();
    manager
        .set_config(vec![NodeDescriptor::new("a", "camera"), NodeDescriptor::new("b", "cast")])
        .unwrap();
    let report = manager.status();
    assert!(report.has_config);
    assert_eq!(report.config_length, 2);
}

#[test]
fn duplicate_node_ids_are_rejected() {
    let manager = manager();
    let err = manager
        .set_config(vec![NodeDescriptor::new("a", "camera"), NodeDescriptor::new("a", "cast")])
        .unwrap_err();
    assert!(matches!(err, PipelineError::DuplicateNodeId(id) if id == "a"));
}

#[test]
fn start_without_config_is_invalid() {
    let manager = manager();
    assert!(matches!(manager.start().unwrap_err(), PipelineError::NoConfig));
}

#[test]
fn unknown_kind_fails_start_and_stays_idle() {
    let manager = manager();
    manager.set_config(vec![NodeDescriptor::new("a", "ghost")]).unwrap();
    let err = manager.start().unwrap_err();
    assert!(matches!(err, PipelineError::UnknownNodeKind(_)));
    assert_eq!(manager.status().status, PipelineStatus::Idle);
}

#[test]
fn stop_before_start_is_an_idempotent_no_op() {
    let manager = manager();
    let ack = manager.stop().unwrap();
    assert_eq!(ack.status, PipelineStatus::Idle);
    let again = manager.stop().unwrap();
    assert_eq!(again.status, PipelineStatus::Idle);
}

#[test]
fn start_runs_the_loop_until_stop() {
    let manager = manager();
    let handles = register_tick(&manager, "tick", Duration::from_millis(1), false);
    manager.set_config(vec![NodeDescriptor::new("a", "tick")]).unwrap();

    let ack = manager.start().unwrap();
    assert_eq!(ack.status, PipelineStatus::Running);
    assert!(wait_for(Duration::from_secs(2), || {
        handles.ticks.load(AtomicOrdering::SeqCst) >= 3
    }));

    manager.stop().unwrap();
    manager.join_cleanup();
    assert_eq!(manager.status().status, PipelineStatus::Stopped);
    assert_eq!(handles.disposals.load(AtomicOrdering::SeqCst), 1);
}

#[test]
fn set_config_while_running_is_rejected() {
    let manager = manager();
    let _handles = register_tick(&manager, "tick", Duration::from_millis(1), false);
    manager.set_config(vec![NodeDescriptor::new("a", "tick")]).unwrap();
    manager.start().unwrap();

    let err = manager.set_config(vec![NodeDescriptor::new("b", "tick")]).unwrap_err();
    assert!(matches!(err, PipelineError::InvalidState { op: "set_config", .. }));

    manager.stop().unwrap();
    manager.join_cleanup();
}

#[test]
fn start_while_running_is_rejected() {
    let manager = manager();
    let _handles = register_tick(&manager, "tick", Duration::from_millis(1), false);
    manager.set_config(vec![NodeDescriptor::new("a", "tick")]).unwrap();
    manager.start().unwrap();

    let err = manager.start().unwrap_err();
    assert!(matches!(err, PipelineError::InvalidState { op: "start", .. }));

    manager.stop().unwrap();
    manager.join_cleanup();
}

#[test]
fn config_survives_stop_and_supports_restart() {
    let manager = manager();
    let handles = register_tick(&manager, "tick", Duration::from_millis(1), false);
    manager.set_config(vec![NodeDescriptor::new("a", "tick")]).unwrap();

    manager.start().unwrap();
    assert!(wait_for(Duration::from_secs(2), || {
        handles.ticks.load(AtomicOrdering::SeqCst) >= 1
    }));
    manager.stop().unwrap();
    manager.join_cleanup();

    manager.start().unwrap();
    manager.stop().unwrap();
    manager.join_cleanup();
    assert_eq!(handles.disposals.load(AtomicOrdering::SeqCst), 2);
}

#[test]
fn prepare_failure_aborts_start_and_unwinds() {
    struct FailPrepare {
        ctx: NodeContext,
    }
    impl Node for FailPrepare {
        fn context(&self) -> &NodeContext {
            &self.ctx
        }
        fn prepare(&mut self) -> Result<(), NodeError> {
            Err(NodeError::Device("no such camera".to_string()))
        }
        fn execute(&mut self) -> Result<(), NodeError> {
            Ok(())
        }
    }

    let manager = manager();
    let handles = register_tick(&manager, "tick", Duration::ZERO, false);
    manager.register_kind("broken", "FailPrepare", |ctx, _descriptor| {
        Ok(Box::new(FailPrepare { ctx }) as Box<dyn Node>)
    });
    manager
        .set_config(vec![NodeDescriptor::new("a", "tick"), NodeDescriptor::new("b", "broken")])
        .unwrap();

    let err = manager.start().unwrap_err();
    assert!(matches!(err, PipelineError::Prepare { id, .. } if id == "b"));
    assert_eq!(manager.status().status, PipelineStatus::Idle);
    // The node prepared before the failure was unwound.
    assert_eq!(handles.disposals.load(AtomicOrdering::SeqCst), 1);
}

#[test]
fn execute_failure_reports_node_error_and_keeps_looping() {
    let manager = manager();
    let failing = register_tick(&manager, "bad", Duration::ZERO, true);
    let counting = register_tick(&manager, "tick", Duration::from_millis(1), false);

    let (tx, rx) = std_mpsc::sync_channel(64);
    manager.subscribe(Box::new(ChannelObserver::new(tx)));

    manager
        .set_config(vec![NodeDescriptor::new("a", "bad"), NodeDescriptor::new("b", "tick")])
        .unwrap();
    manager.start().unwrap();

    // The failing head never stops the counting tail.
    assert!(wait_for(Duration::from_secs(2), || {
        counting.ticks.load(AtomicOrdering::SeqCst) >= 3
    }));
    assert_eq!(failing.ticks.load(AtomicOrdering::SeqCst), 0);

    manager.stop().unwrap();
    manager.join_cleanup();

    let mut saw_node_error = false;
    while let Ok(message) = rx.try_recv() {
        if matches!(message, StreamMessage::NodeError { ref node_id, .. } if node_id == "a") {
            saw_node_error = true;
        }
    }
    assert!(saw_node_error);
}

#[test]
fn observers_see_pipeline_start_and_stop() {
    let manager = manager();
    let _handles = register_tick(&manager, "tick", Duration::from_millis(1), false);
    let (tx, rx) = std_mpsc::sync_channel(64);
    manager.subscribe(Box::new(ChannelObserver::new(tx)));

    manager.set_config(vec![NodeDescriptor::new("a", "tick")]).unwrap();
    manager.start().unwrap();
    manager.stop().unwrap();
    manager.join_cleanup();

    let mut kinds = Vec::new();
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        match rx.try_recv() {
            Ok(message) => kinds.push(message.kind()),
            Err(_) => {
                if kinds.contains(&"pipeline_stop") {
                    break;
                }
                std::thread::sleep(Duration::from_millis(5));
            }
        }
    }
    assert!(kinds.contains(&"pipeline_start"));
    assert!(kinds.contains(&"pipeline_stop"));
}
