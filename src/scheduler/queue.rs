use std::{cmp::Ordering, collections::BinaryHeap, time::Duration};

use super::Job;

struct Entry {
  due: Duration,
  seq: u64,
  job: Job,
}

impl PartialEq for Entry {
  fn eq(&self, other: &Self) -> bool { self.due == other.due && self.seq == other.seq }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl Ord for Entry {
  fn cmp(&self, other: &Self) -> Ordering {
    // Min-heap: earlier due first, then FIFO by sequence
    other
      .due
      .cmp(&self.due)
      .then_with(|| other.seq.cmp(&self.seq))
  }
}

/// Pending jobs ordered by `(due, submission sequence)`.
#[derive(Default)]
pub(crate) struct JobQueue {
  entries: BinaryHeap<Entry>,
  next_seq: u64,
}

impl JobQueue {
  pub(crate) fn push(&mut self, due: Duration, job: Job) {
    let seq = self.next_seq;
    self.next_seq += 1;
    self.entries.push(Entry { due, seq, job });
  }

  /// Due time of the earliest job that has not been cancelled.
  pub(crate) fn peek_due(&mut self) -> Option<Duration> {
    self.purge();
    self.entries.peek().map(|e| e.due)
  }

  pub(crate) fn pop(&mut self) -> Option<(Duration, Job)> {
    self.purge();
    self.entries.pop().map(|e| (e.due, e.job))
  }

  /// Number of jobs that are still going to run.
  pub(crate) fn live_len(&self) -> usize { self.entries.iter().filter(|e| !e.job.is_cancelled()).count() }

  fn purge(&mut self) {
    while self.entries.peek().is_some_and(|e| e.job.is_cancelled()) {
      self.entries.pop();
    }
  }
}
