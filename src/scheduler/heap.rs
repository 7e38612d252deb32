use std::collections::HashMap;
use std::fmt;
use tokio::time::Instant;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct TaskId(u64);

impl TaskId {
    pub(super) fn new(id: u64) -> Self {
        TaskId(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task-{}", self.0)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task-{}", self.0)
    }
}

#[derive(Copy, Clone)]
struct HeapSlot {
    deadline: Instant,
    task_id: TaskId,
}

impl HeapSlot {
    // Ties on the deadline go to the older task.
    fn sooner_than(&self, other: &HeapSlot) -> bool {
        (self.deadline, self.task_id) < (other.deadline, other.task_id)
    }
}

/// Array-backed binary min-heap of task deadlines.
///
/// Each task's slot index is tracked here rather than on the task, because the task table and
/// the heap are guarded by different locks. That also makes `remove` of an arbitrary task
/// O(log n) instead of a scan.
#[derive(Default)]
pub(super) struct TaskHeap {
    slots: Vec<HeapSlot>,
    positions: HashMap<TaskId, usize>,
}

impl TaskHeap {
    pub fn new() -> Self {
        TaskHeap::default()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn contains(&self, task_id: TaskId) -> bool {
        self.positions.contains_key(&task_id)
    }

    /// Schedule `task_id` at `deadline`, replacing its previous deadline if it already has a slot.
    pub fn push(&mut self, task_id: TaskId, deadline: Instant) {
        if self.contains(task_id) {
            self.remove(task_id);
        }

        let index = self.slots.len();
        self.slots.push(HeapSlot { deadline, task_id });
        self.positions.insert(task_id, index);
        self.sift_up(index);
    }

    pub fn peek(&self) -> Option<(TaskId, Instant)> {
        self.slots.first().map(|slot| (slot.task_id, slot.deadline))
    }

    pub fn pop(&mut self) -> Option<(TaskId, Instant)> {
        let (task_id, _) = self.peek()?;
        self.remove(task_id).map(|deadline| (task_id, deadline))
    }

    /// Pop every task whose deadline is at or before `now`, soonest first.
    pub fn pop_due(&mut self, now: Instant) -> Vec<TaskId> {
        let mut due = Vec::new();
        while let Some((_, deadline)) = self.peek() {
            if deadline > now {
                break;
            }
            if let Some((task_id, _)) = self.pop() {
                due.push(task_id);
            }
        }

        due
    }

    /// Take `task_id` out of the heap. Returns its deadline, or `None` if it had no slot.
    pub fn remove(&mut self, task_id: TaskId) -> Option<Instant> {
        let index = self.positions.remove(&task_id)?;
        let last = self.slots.len() - 1;

        if index != last {
            self.slots.swap(index, last);
            self.positions.insert(self.slots[index].task_id, index);
        }
        let removed = self.slots.pop()?;

        if index < self.slots.len() {
            // The slot moved into `index` may belong either above or below it.
            let index = self.sift_up(index);
            self.sift_down(index);
        }

        Some(removed.deadline)
    }

    fn sift_up(&mut self, mut index: usize) -> usize {
        while index > 0 {
            let parent = (index - 1) / 2;
            if !self.slots[index].sooner_than(&self.slots[parent]) {
                break;
            }
            self.swap(index, parent);
            index = parent;
        }

        index
    }

    fn sift_down(&mut self, mut index: usize) {
        loop {
            let left = 2 * index + 1;
            let right = left + 1;
            let mut soonest = index;

            if left < self.slots.len() && self.slots[left].sooner_than(&self.slots[soonest]) {
                soonest = left;
            }
            if right < self.slots.len() && self.slots[right].sooner_than(&self.slots[soonest]) {
                soonest = right;
            }
            if soonest == index {
                return;
            }

            self.swap(index, soonest);
            index = soonest;
        }
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.slots.swap(a, b);
        self.positions.insert(self.slots[a].task_id, a);
        self.positions.insert(self.slots[b].task_id, b);
    }

    #[cfg(test)]
    fn assert_invariants(&self) {
        for (index, slot) in self.slots.iter().enumerate() {
            assert_eq!(self.positions[&slot.task_id], index);
            if index > 0 {
                let parent = &self.slots[(index - 1) / 2];
                assert!(parent.deadline <= slot.deadline, "heap order violated at {}", index);
            }
        }
        assert_eq!(self.positions.len(), self.slots.len());
    }
}
