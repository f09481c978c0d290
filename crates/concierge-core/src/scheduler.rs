use std::cell::RefCell;
use std::rc::Rc;

use tracing::trace;

pub type Task = Box<dyn FnOnce()>;

/// Runs a task once after a delay, on the same thread, without blocking the
/// caller. Scheduled tasks cannot be cancelled.
pub trait Scheduler {
    fn schedule(&self, delay_ms: u32, task: Task);
}

struct Pending {
    due_at: u64,
    order: u64,
    task: Task,
}

#[derive(Default)]
struct Queue {
    now_ms: u64,
    next_order: u64,
    pending: Vec<Pending>,
}

impl Queue {
    fn take_next_due(&mut self, limit: u64) -> Option<Pending> {
        let idx = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, p)| p.due_at <= limit)
            .min_by_key(|(_, p)| (p.due_at, p.order))
            .map(|(idx, _)| idx)?;
        Some(self.pending.remove(idx))
    }
}

/// Simulated clock. Time only moves when [`ManualScheduler::advance`] is
/// called; due tasks then run in (due time, scheduling order) order, including
/// tasks scheduled by other tasks during the same advance.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    queue: Rc<RefCell<Queue>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.queue.borrow().now_ms
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().pending.len()
    }

    /// Moves the clock forward and returns how many tasks ran.
    pub fn advance(&self, delta_ms: u64) -> usize {
        let target = self.now_ms().saturating_add(delta_ms);
        let mut ran = 0;

        loop {
            let next = {
                let mut queue = self.queue.borrow_mut();
                let next = queue.take_next_due(target);
                if let Some(task) = &next {
                    queue.now_ms = queue.now_ms.max(task.due_at);
                }
                next
            };
            let Some(next) = next else {
                break;
            };
            trace!(due_at = next.due_at, order = next.order, "running task");
            (next.task)();
            ran += 1;
        }

        self.queue.borrow_mut().now_ms = target;
        ran
    }

    /// Runs everything still queued, moving the clock to the last due time.
    pub fn run_until_idle(&self) -> usize {
        let last_due = self
            .queue
            .borrow()
            .pending
            .iter()
            .map(|p| p.due_at)
            .max();
        let mut ran = 0;
        if let Some(last_due) = last_due {
            let now = self.now_ms();
            ran += self.advance(last_due.saturating_sub(now));
        }
        if self.pending() > 0 {
            ran += self.run_until_idle();
        }
        ran
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay_ms: u32, task: Task) {
        let mut queue = self.queue.borrow_mut();
        let due_at = queue.now_ms.saturating_add(u64::from(delay_ms));
        let order = queue.next_order;
        queue.next_order += 1;
        trace!(due_at, order, "scheduled task");
        queue.pending.push(Pending {
            due_at,
            order,
            task,
        });
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::{ManualScheduler, Scheduler};

    #[test]
    fn runs_tasks_in_due_order() {
        let scheduler = ManualScheduler::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        for (delay, name) in [(300, "b"), (100, "a"), (300, "c")] {
            let log = log.clone();
            scheduler.schedule(delay, Box::new(move || log.borrow_mut().push(name)));
        }

        assert_eq!(scheduler.advance(99), 0);
        assert_eq!(scheduler.advance(1), 1);
        assert_eq!(scheduler.advance(500), 2);
        assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
        assert_eq!(scheduler.now_ms(), 600);
    }

    #[test]
    fn nested_tasks_run_within_the_same_advance() {
        let scheduler = ManualScheduler::new();
        let fired_at = Rc::new(RefCell::new(None));

        let inner_scheduler = scheduler.clone();
        let inner_fired = fired_at.clone();
        scheduler.schedule(
            5_000,
            Box::new(move || {
                let clock = inner_scheduler.clone();
                inner_scheduler.schedule(
                    300,
                    Box::new(move || {
                        *inner_fired.borrow_mut() = Some(clock.now_ms());
                    }),
                );
            }),
        );

        assert_eq!(scheduler.advance(5_299), 1);
        assert!(fired_at.borrow().is_none());
        assert_eq!(scheduler.advance(1), 1);
        assert_eq!(*fired_at.borrow(), Some(5_300));
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn run_until_idle_drains_chains() {
        let scheduler = ManualScheduler::new();
        let inner = scheduler.clone();
        scheduler.schedule(
            10,
            Box::new(move || inner.schedule(20, Box::new(|| {}))),
        );
        assert_eq!(scheduler.run_until_idle(), 2);
        assert_eq!(scheduler.now_ms(), 30);
    }
}
