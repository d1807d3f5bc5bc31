use crate::model::HitTarget;
use serde::Serialize;

/// Transition published when the entity under the pointer changes or the pointer moves over it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum HoverEvent {
    Enter { target: HitTarget, x: f64, y: f64 },
    Move { target: HitTarget, x: f64, y: f64 },
    Leave { target: HitTarget },
}

impl HoverEvent {
    pub fn target(&self) -> &HitTarget {
        match self {
            HoverEvent::Enter { target, .. }
            | HoverEvent::Move { target, .. }
            | HoverEvent::Leave { target } => target,
        }
    }
}

pub type HoverCallback = Box<dyn FnMut(&HoverEvent)>;

/// Derives hover transitions from consecutive hit-test results and fans them out to observers.
#[derive(Default)]
pub struct HoverTracker {
    current: Option<HitTarget>,
    observers: Vec<HoverCallback>,
}

impl std::fmt::Debug for HoverTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HoverTracker")
            .field("current", &self.current)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl HoverTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&HoverEvent) + 'static) {
        self.observers.push(Box::new(callback));
    }

    pub fn current(&self) -> Option<&HitTarget> {
        self.current.as_ref()
    }

    /// Feeds the latest hit-test result for pointer position `(x, y)`.
    ///
    /// Moving from one entity straight onto another yields `Leave` for the old one followed by
    /// `Enter` for the new one.
    pub fn update(&mut self, hit: Option<HitTarget>, x: f64, y: f64) -> Vec<HoverEvent> {
        let mut events = Vec::with_capacity(2);
        match (self.current.take(), hit) {
            (Some(prev), Some(next)) if prev == next => {
                events.push(HoverEvent::Move {
                    target: next.clone(),
                    x,
                    y,
                });
                self.current = Some(next);
            }
            (prev, next) => {
                if let Some(prev) = prev {
                    events.push(HoverEvent::Leave { target: prev });
                }
                if let Some(next) = next {
                    events.push(HoverEvent::Enter {
                        target: next.clone(),
                        x,
                        y,
                    });
                    self.current = Some(next);
                }
            }
        }
        self.publish(&events);
        events
    }

    /// Pointer left the surface.
    pub fn clear(&mut self) -> Vec<HoverEvent> {
        let events: Vec<HoverEvent> = self
            .current
            .take()
            .map(|target| HoverEvent::Leave { target })
            .into_iter()
            .collect();
        self.publish(&events);
        events
    }

    fn publish(&mut self, events: &[HoverEvent]) {
        for event in events {
            tracing::trace!(?event, "hover");
            for observer in &mut self.observers {
                observer(event);
            }
        }
    }
}
