use crate::Stream;
use crate::meta::UNBOUNDED;
use crate::pipe::{Op, terminate};
use crate::sink::{BoxSink, Sink};
use std::sync::Arc;

/* **************************************** 过滤 **************************************** */

pub(crate) struct Filter<F> {
    pred: Arc<F>,
}

impl<F> Filter<F> {
    pub(crate) fn new(pred: F) -> Self {
        Filter { pred: Arc::new(pred) }
    }
}

struct FilterSink<'a, T, F> {
    down: BoxSink<'a, T>,
    pred: Arc<F>,
}

impl<T, F: Fn(&T) -> bool> Sink<T> for FilterSink<'_, T, F> {
    fn begin(&mut self, size: u64, _known: bool) {
        // 过滤后数量只是上界
        self.down.begin(size, false);
    }

    fn accept(&mut self, v: T) {
        if (self.pred)(&v) {
            self.down.accept(v);
        }
    }

    fn rejecting(&self) -> bool {
        self.down.rejecting()
    }

    fn close(&mut self) {
        self.down.close();
    }
}

impl<T: 'static, F: Fn(&T) -> bool + Send + Sync + 'static> Op<T, T> for Filter<F> {
    const NAME: &'static str = "filter";

    fn wrap_sink<'a>(&self, down: BoxSink<'a, T>) -> BoxSink<'a, T> {
        Box::new(FilterSink { down, pred: self.pred.clone() })
    }
}

/* **************************************** 访问 **************************************** */

pub(crate) struct Peek<F> {
    act: Arc<F>,
}

impl<F> Peek<F> {
    pub(crate) fn new(act: F) -> Self {
        Peek { act: Arc::new(act) }
    }
}

struct PeekSink<'a, T, F> {
    down: BoxSink<'a, T>,
    act: Arc<F>,
}

impl<T, F: Fn(&T)> Sink<T> for PeekSink<'_, T, F> {
    fn begin(&mut self, size: u64, known: bool) {
        self.down.begin(size, known);
    }

    fn accept(&mut self, v: T) {
        (self.act)(&v);
        self.down.accept(v);
    }

    fn rejecting(&self) -> bool {
        self.down.rejecting()
    }

    fn close(&mut self) {
        self.down.close();
    }
}

impl<T: 'static, F: Fn(&T) + Send + Sync + 'static> Op<T, T> for Peek<F> {
    const NAME: &'static str = "peek";

    fn wrap_sink<'a>(&self, down: BoxSink<'a, T>) -> BoxSink<'a, T> {
        Box::new(PeekSink { down, act: self.act.clone() })
    }
}

/* **************************************** 转换 **************************************** */

pub(crate) struct Map<F> {
    mapper: Arc<F>,
}

impl<F> Map<F> {
    pub(crate) fn new(mapper: F) -> Self {
        Map { mapper: Arc::new(mapper) }
    }
}

struct MapSink<'a, U, F> {
    down: BoxSink<'a, U>,
    mapper: Arc<F>,
}

impl<T, U, F: Fn(T) -> U> Sink<T> for MapSink<'_, U, F> {
    fn begin(&mut self, size: u64, known: bool) {
        self.down.begin(size, known);
    }

    fn accept(&mut self, v: T) {
        self.down.accept((self.mapper)(v));
    }

    fn rejecting(&self) -> bool {
        self.down.rejecting()
    }

    fn close(&mut self) {
        self.down.close();
    }
}

impl<T: 'static, U: 'static, F: Fn(T) -> U + Send + Sync + 'static> Op<T, U> for Map<F> {
    const NAME: &'static str = "map";

    fn wrap_sink<'a>(&self, down: BoxSink<'a, U>) -> BoxSink<'a, T> {
        Box::new(MapSink { down, mapper: self.mapper.clone() })
    }
}

/* **************************************** 展开 **************************************** */

pub(crate) struct FlatMap<F> {
    mapper: Arc<F>,
}

impl<F> FlatMap<F> {
    pub(crate) fn new(mapper: F) -> Self {
        FlatMap { mapper: Arc::new(mapper) }
    }
}

struct FlatMapSink<'a, U, F> {
    down: BoxSink<'a, U>,
    mapper: Arc<F>,
}

impl<T, U: 'static, F: Fn(T) -> Stream<U>> Sink<T> for FlatMapSink<'_, U, F> {
    fn begin(&mut self, _size: u64, _known: bool) {
        self.down.begin(UNBOUNDED, false);
    }

    fn accept(&mut self, v: T) {
        if self.down.rejecting() {
            return;
        }
        let sub = (self.mapper)(v);
        if sub.meta().is_empty() {
            return;
        }
        // 子流单独执行一次，元素直接推送到下游，下游拒绝时子流随之停止并释放游标
        terminate(sub.stage(), Box::new(Forward { down: &mut self.down }));
    }

    fn rejecting(&self) -> bool {
        self.down.rejecting()
    }

    fn close(&mut self) {
        self.down.close();
    }
}

impl<T: 'static, U: 'static, F: Fn(T) -> Stream<U> + Send + Sync + 'static> Op<T, U> for FlatMap<F> {
    const NAME: &'static str = "flat_map";

    fn wrap_sink<'a>(&self, down: BoxSink<'a, U>) -> BoxSink<'a, T> {
        Box::new(FlatMapSink { down, mapper: self.mapper.clone() })
    }
}

/// 把子流的元素转发给外层下游，生命周期由外层负责。
struct Forward<'b, 'a, U> {
    down: &'b mut BoxSink<'a, U>,
}

impl<U> Sink<U> for Forward<'_, '_, U> {
    fn begin(&mut self, _size: u64, _known: bool) {}

    fn accept(&mut self, v: U) {
        self.down.accept(v);
    }

    fn rejecting(&self) -> bool {
        self.down.rejecting()
    }

    fn close(&mut self) {}
}
