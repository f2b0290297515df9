use crate::meta::UNBOUNDED;
use crate::op::capacity_hint;
use crate::pipe::Op;
use crate::sink::{BoxSink, Phase, Sink, drain_into};
use rustc_hash::{FxBuildHasher, FxHashMap, FxHashSet};
use std::cmp::Ordering;
use std::hash::Hash;
use std::mem;
use std::sync::Arc;

/* **************************************** 跳过 **************************************** */

pub(crate) struct Skip {
    n: u64,
}

impl Skip {
    pub(crate) fn new(n: u64) -> Self {
        Skip { n }
    }
}

struct SkipSink<'a, T> {
    down: BoxSink<'a, T>,
    n: u64,
    i: u64,
}

impl<T> Sink<T> for SkipSink<'_, T> {
    fn begin(&mut self, size: u64, known: bool) {
        let size = if !known && size == UNBOUNDED { size } else { size.saturating_sub(self.n) };
        self.down.begin(size, known);
    }

    fn accept(&mut self, v: T) {
        if self.i < self.n {
            self.i += 1;
            return;
        }
        self.down.accept(v);
    }

    fn rejecting(&self) -> bool {
        self.down.rejecting()
    }

    fn close(&mut self) {
        self.down.close();
    }
}

impl<T: 'static> Op<T, T> for Skip {
    const NAME: &'static str = "skip";

    fn wrap_sink<'a>(&self, down: BoxSink<'a, T>) -> BoxSink<'a, T> {
        Box::new(SkipSink { down, n: self.n, i: 0 })
    }
}

/* **************************************** 截取 **************************************** */

pub(crate) struct Limit {
    n: u64,
}

impl Limit {
    pub(crate) fn new(n: u64) -> Self {
        Limit { n }
    }
}

struct LimitSink<'a, T> {
    down: BoxSink<'a, T>,
    n: u64,
    i: u64,
}

impl<T> Sink<T> for LimitSink<'_, T> {
    fn begin(&mut self, size: u64, known: bool) {
        self.down.begin(size.min(self.n), known);
    }

    fn accept(&mut self, v: T) {
        if self.i < self.n {
            self.i += 1;
            self.down.accept(v);
        }
    }

    fn rejecting(&self) -> bool {
        self.i >= self.n || self.down.rejecting()
    }

    fn close(&mut self) {
        self.down.close();
    }
}

impl<T: 'static> Op<T, T> for Limit {
    const NAME: &'static str = "limit";

    fn wrap_sink<'a>(&self, down: BoxSink<'a, T>) -> BoxSink<'a, T> {
        Box::new(LimitSink { down, n: self.n, i: 0 })
    }
}

/* **************************************** 条件中止 **************************************** */

pub(crate) struct Cond<F> {
    cond: Arc<F>,
}

impl<F> Cond<F> {
    pub(crate) fn new(cond: F) -> Self {
        Cond { cond: Arc::new(cond) }
    }
}

struct CondSink<'a, T, F> {
    down: BoxSink<'a, T>,
    cond: Arc<F>,
    fired: bool,
}

impl<T, F: Fn(&T) -> bool> Sink<T> for CondSink<'_, T, F> {
    fn begin(&mut self, size: u64, _known: bool) {
        self.down.begin(size, false);
    }

    fn accept(&mut self, v: T) {
        if self.fired {
            return;
        }
        // 使条件成立的元素本身不会流入下游
        if (self.cond)(&v) {
            self.fired = true;
        } else {
            self.down.accept(v);
        }
    }

    fn rejecting(&self) -> bool {
        self.fired || self.down.rejecting()
    }

    fn close(&mut self) {
        self.down.close();
    }
}

impl<T: 'static, F: Fn(&T) -> bool + Send + Sync + 'static> Op<T, T> for Cond<F> {
    const NAME: &'static str = "cond";

    fn wrap_sink<'a>(&self, down: BoxSink<'a, T>) -> BoxSink<'a, T> {
        Box::new(CondSink { down, cond: self.cond.clone(), fired: false })
    }
}

/* **************************************** 去重 **************************************** */

pub(crate) struct Distinct;

struct DistinctSink<'a, T> {
    down: BoxSink<'a, T>,
    seen: FxHashSet<T>,
    phase: Phase,
}

impl<T: Hash + Eq> Sink<T> for DistinctSink<'_, T> {
    fn begin(&mut self, size: u64, known: bool) {
        self.phase.begin();
        self.seen = FxHashSet::with_capacity_and_hasher(capacity_hint(size, known), FxBuildHasher);
    }

    fn accept(&mut self, v: T) {
        self.phase.check_accept();
        self.seen.insert(v);
    }

    fn rejecting(&self) -> bool {
        self.down.rejecting()
    }

    fn close(&mut self) {
        if !self.phase.drain() {
            return;
        }
        let seen = mem::take(&mut self.seen);
        let size = seen.len();
        drain_into(&mut self.down, seen, size);
        self.phase.finish();
    }
}

impl<T: Hash + Eq + 'static> Op<T, T> for Distinct {
    const NAME: &'static str = "distinct";

    fn wrap_sink<'a>(&self, down: BoxSink<'a, T>) -> BoxSink<'a, T> {
        Box::new(DistinctSink { down, seen: FxHashSet::default(), phase: Phase::Idle })
    }
}

pub(crate) struct DistinctBy<F> {
    key: Arc<F>,
}

impl<F> DistinctBy<F> {
    pub(crate) fn new(key: F) -> Self {
        DistinctBy { key: Arc::new(key) }
    }
}

struct DistinctBySink<'a, T, K, F> {
    down: BoxSink<'a, T>,
    key: Arc<F>,
    seen: FxHashMap<K, T>,
    phase: Phase,
}

impl<T, K: Hash + Eq, F: Fn(&T) -> K> Sink<T> for DistinctBySink<'_, T, K, F> {
    fn begin(&mut self, size: u64, known: bool) {
        self.phase.begin();
        self.seen = FxHashMap::with_capacity_and_hasher(capacity_hint(size, known), FxBuildHasher);
    }

    fn accept(&mut self, v: T) {
        self.phase.check_accept();
        // 键冲突时保留最后一个元素
        self.seen.insert((self.key)(&v), v);
    }

    fn rejecting(&self) -> bool {
        self.down.rejecting()
    }

    fn close(&mut self) {
        if !self.phase.drain() {
            return;
        }
        let seen = mem::take(&mut self.seen);
        let size = seen.len();
        drain_into(&mut self.down, seen.into_values(), size);
        self.phase.finish();
    }
}

impl<T, K, F> Op<T, T> for DistinctBy<F>
where
    T: 'static,
    K: Hash + Eq + 'static,
    F: Fn(&T) -> K + Send + Sync + 'static,
{
    const NAME: &'static str = "distinct_by";

    fn wrap_sink<'a>(&self, down: BoxSink<'a, T>) -> BoxSink<'a, T> {
        Box::new(DistinctBySink { down, key: self.key.clone(), seen: FxHashMap::default(), phase: Phase::Idle })
    }
}

/* **************************************** 排序 **************************************** */

pub(crate) struct SortBy<F> {
    cmp: Arc<F>,
}

impl<F> SortBy<F> {
    pub(crate) fn new(cmp: F) -> Self {
        SortBy { cmp: Arc::new(cmp) }
    }
}

struct SortBySink<'a, T, F> {
    down: BoxSink<'a, T>,
    cmp: Arc<F>,
    buf: Vec<T>,
    phase: Phase,
}

impl<T, F: Fn(&T, &T) -> Ordering> Sink<T> for SortBySink<'_, T, F> {
    fn begin(&mut self, size: u64, known: bool) {
        self.phase.begin();
        self.buf = Vec::with_capacity(capacity_hint(size, known));
    }

    fn accept(&mut self, v: T) {
        self.phase.check_accept();
        self.buf.push(v);
    }

    fn rejecting(&self) -> bool {
        self.down.rejecting()
    }

    fn close(&mut self) {
        if !self.phase.drain() {
            return;
        }
        let mut buf = mem::take(&mut self.buf);
        buf.sort_by(|u, v| (self.cmp)(u, v));
        let size = buf.len();
        drain_into(&mut self.down, buf, size);
        self.phase.finish();
    }
}

impl<T: 'static, F: Fn(&T, &T) -> Ordering + Send + Sync + 'static> Op<T, T> for SortBy<F> {
    const NAME: &'static str = "sort_by";

    fn wrap_sink<'a>(&self, down: BoxSink<'a, T>) -> BoxSink<'a, T> {
        Box::new(SortBySink { down, cmp: self.cmp.clone(), buf: Vec::new(), phase: Phase::Idle })
    }
}
