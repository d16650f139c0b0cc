/*
 *  Copyright 2025 Registry Regulations Team
 *
 *  Licensed under the Apache License, Version 2.0 (the "License");
 *  you may not use this file except in compliance with the License.
 *  You may obtain a copy of the License at
 *
 *      http://www.apache.org/licenses/LICENSE-2.0
 *
 *  Unless required by applicable law or agreed to in writing, software
 *  distributed under the License is distributed on an "AS IS" BASIS,
 *  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 *  See the License for the specific language governing permissions and
 *  limitations under the License.
 */

//! Asynchronous event dispatch.
//!
//! Each accepted (event, listener) pair runs on its own task, so a listener
//! stuck retrying one version never delays delivery of the next event.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, error, info, warn, Instrument};

use super::{EventListener, PortalEvent};

pub struct EventPublisher {
    listeners: Vec<Arc<dyn EventListener>>,
    /// Runtime listeners are spawned on; the caller's runtime when `None`.
    runtime: Option<Handle>,
    in_flight: Mutex<Vec<AbortHandle>>,
    /// Set only while holding `in_flight`, so a task is either registered
    /// before shutdown and aborted by it, or never spawned.
    shutdown: AtomicBool,
}

impl EventPublisher {
    /// Creates a publisher that spawns listeners on the caller's runtime.
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
            runtime: None,
            in_flight: Mutex::new(Vec::new()),
            shutdown: AtomicBool::new(false),
        }
    }

    /// Creates a publisher that spawns listeners on a dedicated runtime.
    pub fn with_runtime(handle: Handle) -> Self {
        Self {
            runtime: Some(handle),
            ..Self::new()
        }
    }

    pub fn with_listener(mut self, listener: Arc<dyn EventListener>) -> Self {
        self.subscribe(listener);
        self
    }

    pub fn subscribe(&mut self, listener: Arc<dyn EventListener>) {
        debug!("Subscribed event listener: {}", listener.name());
        self.listeners.push(listener);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Publishes `event` to every listener that accepts it.
    ///
    /// Returns immediately with the handles of the spawned listener tasks;
    /// dropping them does not cancel delivery.
    pub fn publish(&self, event: PortalEvent) -> Vec<JoinHandle<()>> {
        let runtime = match self.runtime.clone().or_else(|| Handle::try_current().ok()) {
            Some(runtime) => runtime,
            None => {
                error!(
                    "No async runtime available to deliver {}, event dropped",
                    event.as_str()
                );
                return Vec::new();
            }
        };

        let mut in_flight = self.in_flight.lock();
        if self.shutdown.load(Ordering::SeqCst) {
            warn!("Event publisher is shut down, dropping {}", event.as_str());
            return Vec::new();
        }

        let mut handles = Vec::new();
        for listener in self.listeners.iter().filter(|l| l.accepts(&event)) {
            let span = tracing::info_span!(
                "event",
                event = event.as_str(),
                listener = listener.name()
            );
            let listener = listener.clone();
            let event = event.clone();
            let handle =
                runtime.spawn(async move { listener.on_event(event).await }.instrument(span));
            handles.push(handle);
        }

        in_flight.retain(|task| !task.is_finished());
        in_flight.extend(handles.iter().map(|h| h.abort_handle()));
        drop(in_flight);

        info!(
            "Published {} to {} listener(s)",
            event.as_str(),
            handles.len()
        );
        handles
    }

    /// Number of listener tasks that have not finished yet.
    pub fn in_flight(&self) -> usize {
        let mut in_flight = self.in_flight.lock();
        in_flight.retain(|task| !task.is_finished());
        in_flight.len()
    }

    /// Stops accepting events and aborts listener tasks still running,
    /// including preload retry loops.
    pub fn shutdown(&self) {
        let tasks: Vec<AbortHandle> = {
            let mut in_flight = self.in_flight.lock();
            if self.shutdown.swap(true, Ordering::SeqCst) {
                return;
            }
            in_flight
                .drain(..)
                .filter(|task| !task.is_finished())
                .collect()
        };
        for task in &tasks {
            task.abort();
        }
        info!(
            "Event publisher shut down, aborted {} listener task(s)",
            tasks.len()
        );
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}
