//! Small utilities to manage bounded history buffers for charts.

use std::collections::VecDeque;

/// Samples kept per series; wide enough for any reasonable terminal.
pub const HISTORY_CAP: usize = 120;

pub fn push_capped<T>(dq: &mut VecDeque<T>, v: T, cap: usize) {
    if dq.len() == cap {
        dq.pop_front();
    }
    dq.push_back(v);
}

/// Percent series (0..=100) for CPU and memory.
pub struct PercentHistory {
    pub cpu: VecDeque<u64>,
    pub mem: VecDeque<u64>,
    cap: usize,
}

impl PercentHistory {
    pub fn new(cap: usize) -> Self {
        Self {
            cpu: VecDeque::with_capacity(cap),
            mem: VecDeque::with_capacity(cap),
            cap,
        }
    }

    pub fn push(&mut self, cpu_pct: f64, mem_pct: f64) {
        push_capped(&mut self.cpu, to_bar(cpu_pct), self.cap);
        push_capped(&mut self.mem, to_bar(mem_pct), self.cap);
    }
}

fn to_bar(pct: f64) -> u64 {
    if pct.is_finite() {
        pct.clamp(0.0, 100.0).round() as u64
    } else {
        0
    }
}

/// Last `width` points of a series, for a chart that many columns wide.
pub fn tail(hist: &VecDeque<u64>, width: usize) -> Vec<u64> {
    let start = hist.len().saturating_sub(width);
    hist.iter().skip(start).copied().collect()
}
