use crate::err::StreamErr;
use crate::input::{Cursor, Source};
use crate::meta::Meta;
use crate::sink::BoxSink;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, trace};

pub(crate) type StageRef<T> = Arc<dyn Stage<T>>;

/// 流水线中的一个阶段。
///
/// 阶段构造后不可变，对流调用操作总是返回新的阶段，原来的流仍然可以复用。
pub(crate) trait Stage<T>: Send + Sync {
    fn meta(&self) -> Meta;

    /// 只有头阶段持有原始数据源。
    fn source(&self) -> Option<Arc<dyn Source<T>>> {
        None
    }

    /// 从当前阶段向上游逐级包装下游消费者，得到融合后的消费者，并与头阶段的数据源组合为驱动器。
    fn process<'a>(&self, down: BoxSink<'a, T>) -> Box<dyn Drive + 'a>;

    /// 按从头到尾的顺序收集阶段名称。
    fn describe(&self, names: &mut Vec<&'static str>);
}

/// 单个操作：把下游消费者包装为本阶段的消费者，元素类型只在这里发生变化。
pub(crate) trait Op<In, Out>: Send + Sync + 'static {
    const NAME: &'static str;

    fn wrap_sink<'a>(&self, down: BoxSink<'a, Out>) -> BoxSink<'a, In>;
}

/// 头阶段
pub(crate) struct Header<T> {
    meta: Meta,
    source: Arc<dyn Source<T>>,
}

impl<T> Header<T> {
    pub(crate) fn new(meta: Meta, source: Arc<dyn Source<T>>) -> Self {
        Header { meta, source }
    }
}

impl<T: 'static> Stage<T> for Header<T> {
    fn meta(&self) -> Meta {
        self.meta
    }

    fn source(&self) -> Option<Arc<dyn Source<T>>> {
        Some(self.source.clone())
    }

    fn process<'a>(&self, down: BoxSink<'a, T>) -> Box<dyn Drive + 'a> {
        Box::new(Driver::new(self.source.clone(), down))
    }

    fn describe(&self, names: &mut Vec<&'static str>) {
        names.push(if self.meta.is_empty() { "empty" } else { "source" });
    }
}

/// 连接上游阶段与一个操作的阶段
pub(crate) struct Linked<In, Out, O> {
    meta: Meta,
    upstream: StageRef<In>,
    op: O,
    _marker: PhantomData<fn(In) -> Out>,
}

impl<In, Out, O> Linked<In, Out, O> {
    pub(crate) fn new(meta: Meta, upstream: StageRef<In>, op: O) -> Self {
        Linked { meta, upstream, op, _marker: PhantomData }
    }
}

impl<In: 'static, Out: 'static, O: Op<In, Out>> Stage<Out> for Linked<In, Out, O> {
    fn meta(&self) -> Meta {
        self.meta
    }

    fn process<'a>(&self, down: BoxSink<'a, Out>) -> Box<dyn Drive + 'a> {
        self.upstream.process(self.op.wrap_sink(down))
    }

    fn describe(&self, names: &mut Vec<&'static str>) {
        self.upstream.describe(names);
        names.push(O::NAME);
    }
}

/// 驱动器：拉取数据源、推送到融合消费者，是拉取与推送交汇的唯一位置。
pub(crate) trait Drive {
    /// 获取数据源游标，向消费者声明数量。
    fn begin(&mut self);
    /// 拉取一个元素并推送，数据源耗尽或消费者拒绝时返回`false`。
    fn step(&mut self) -> bool;
    /// 关闭消费者链并释放游标，可以重复调用。
    fn close(&mut self);
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
enum DriveState {
    Ready,
    Running,
    Closed,
}

pub(crate) struct Driver<'a, S> {
    source: Arc<dyn Source<S>>,
    sink: BoxSink<'a, S>,
    cursor: Option<Box<dyn Cursor<S>>>,
    state: DriveState,
    pulled: u64,
}

impl<'a, S> Driver<'a, S> {
    fn new(source: Arc<dyn Source<S>>, sink: BoxSink<'a, S>) -> Self {
        Driver { source, sink, cursor: None, state: DriveState::Ready, pulled: 0 }
    }

    fn release(&mut self) {
        if let Some(mut cursor) = self.cursor.take() {
            cursor.close();
        }
    }
}

impl<S> Drive for Driver<'_, S> {
    fn begin(&mut self) {
        match self.state {
            DriveState::Ready => {}
            DriveState::Running => StreamErr::BeginTwice.raise(),
            DriveState::Closed => StreamErr::ReusedAfterClose { op: "begin" }.raise(),
        }
        let (size, known) = self.source.size();
        trace!(size, known, "pipeline begin");
        self.cursor = Some(self.source.cursor());
        self.state = DriveState::Running;
        self.sink.begin(size, known);
    }

    fn step(&mut self) -> bool {
        match self.state {
            DriveState::Ready => StreamErr::AcceptOutOfPhase { phase: "idle" }.raise(),
            DriveState::Running => {}
            DriveState::Closed => return false,
        }
        if self.sink.rejecting() {
            return false;
        }
        let Some(cursor) = self.cursor.as_mut() else {
            return false;
        };
        if !cursor.advance() {
            return false;
        }
        match cursor.take() {
            Ok(v) => {
                self.pulled += 1;
                self.sink.accept(v);
                true
            }
            Err(err) => err.raise(),
        }
    }

    fn close(&mut self) {
        match self.state {
            DriveState::Closed => return,
            DriveState::Ready => {}
            DriveState::Running => self.sink.close(),
        }
        self.state = DriveState::Closed;
        self.release();
        trace!(pulled = self.pulled, "pipeline closed");
    }
}

impl<S> Drop for Driver<'_, S> {
    fn drop(&mut self) {
        // 异常退出时只释放游标，不再执行消费者的排空逻辑
        if self.state == DriveState::Running {
            debug!(pulled = self.pulled, "release source cursor of an unfinished pipeline");
            self.release();
        }
    }
}

/// 完整执行一次流水线：构建融合消费者，拉取并推送直到耗尽或拒绝，然后关闭。
pub(crate) fn terminate<T>(stage: &dyn Stage<T>, sink: BoxSink<'_, T>) {
    let mut driver = stage.process(sink);
    driver.begin();
    while driver.step() {}
    driver.close();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::VecSource;
    use crate::sink::Sink;
    use crate::sink::tests::Recorder;

    fn header(values: Vec<i32>) -> Header<i32> {
        let source = VecSource::new(values);
        Header::new(Meta::sized(source.len()), Arc::new(source))
    }

    struct Doubling;

    struct DoublingSink<'a> {
        down: BoxSink<'a, i64>,
    }

    impl Sink<i32> for DoublingSink<'_> {
        fn begin(&mut self, size: u64, known: bool) {
            self.down.begin(size, known);
        }

        fn accept(&mut self, v: i32) {
            self.down.accept(v as i64 * 2);
        }

        fn rejecting(&self) -> bool {
            self.down.rejecting()
        }

        fn close(&mut self) {
            self.down.close();
        }
    }

    impl Op<i32, i64> for Doubling {
        const NAME: &'static str = "doubling";

        fn wrap_sink<'a>(&self, down: BoxSink<'a, i64>) -> BoxSink<'a, i32> {
            Box::new(DoublingSink { down })
        }
    }

    #[test]
    fn test_terminate_pushes_all() {
        let recorder = Recorder::default();
        terminate(&header(vec![1, 2, 3]), Box::new(recorder.clone()));
        assert_eq!(recorder.lines(), vec!["begin 3 true", "accept 1", "accept 2", "accept 3", "close"]);
    }

    #[test]
    fn test_terminate_stops_on_reject() {
        let recorder = Recorder { reject_after: Some(1), ..Recorder::default() };
        terminate(&header(vec![1, 2, 3]), Box::new(recorder.clone()));
        assert_eq!(recorder.lines(), vec!["begin 3 true", "accept 1", "close"]);
    }

    #[test]
    fn test_linked_changes_type() {
        let upstream: StageRef<i32> = Arc::new(header(vec![1, 2]));
        let linked = Linked::new(upstream.meta(), upstream, Doubling);
        let recorder = Recorder::default();
        terminate(&linked, Box::new(recorder.clone()));
        assert_eq!(recorder.lines(), vec!["begin 2 true", "accept 2", "accept 4", "close"]);
        let mut names = Vec::new();
        linked.describe(&mut names);
        assert_eq!(names, vec!["source", "doubling"]);
        assert!(linked.source().is_none());
    }

    #[test]
    fn test_driver_close_idempotent() {
        let recorder = Recorder::default();
        let stage = header(vec![7]);
        let mut driver = stage.process(Box::new(recorder.clone()));
        driver.begin();
        assert!(driver.step());
        assert!(!driver.step());
        driver.close();
        driver.close();
        assert!(!driver.step());
        assert_eq!(recorder.lines(), vec!["begin 1 true", "accept 7", "close"]);
    }

    #[test]
    #[should_panic(expected = "called more than once")]
    fn test_driver_begin_twice() {
        let stage = header(vec![7]);
        let mut driver = stage.process(Box::new(Recorder::default()));
        driver.begin();
        driver.begin();
    }

    #[test]
    #[should_panic(expected = "after the sink chain was closed")]
    fn test_driver_reuse_after_close() {
        let stage = header(vec![7]);
        let mut driver = stage.process(Box::new(Recorder::default()));
        driver.begin();
        driver.close();
        driver.begin();
    }
}
