use crate::StreamRes;
use crate::config::{Config, direct_reuse, drain_capacity};
use crate::err::StreamErr;
use crate::input::{Cursor, IterCursor, Slot};
use crate::pipe::{Drive, Stage, StageRef, terminate};
use crate::sink::Sink;
use crossbeam_channel::{Receiver, Sender, TryRecvError, bounded, select};
use std::cell::RefCell;
use std::rc::Rc;
use std::thread::JoinHandle;
use tracing::debug;

/// 流的标准库迭代器形式，丢弃时自动关闭底层游标。
pub struct StreamIter<T> {
    cursor: Box<dyn Cursor<T>>,
}

impl<T> StreamIter<T> {
    pub(crate) fn new(cursor: Box<dyn Cursor<T>>) -> Self {
        StreamIter { cursor }
    }

    /// 提前关闭，释放数据源以及可能存在的后台任务。
    pub fn close(&mut self) {
        self.cursor.close();
    }
}

impl<T> Iterator for StreamIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor.advance() { self.cursor.take().ok() } else { None }
    }
}

impl<T> Drop for StreamIter<T> {
    fn drop(&mut self) {
        self.cursor.close();
    }
}

/// 按流水线的形态选择游标的物化方式：
/// 1. 头阶段直接复用数据源的游标；
/// 2. 链中没有缓冲或展开操作时，每次拉取一个源元素并同步推送；
/// 3. 否则在后台线程完整执行推送，经有界队列交还给拉取方。
pub(crate) fn materialize<T: Send + 'static>(stage: &StageRef<T>, configs: &[Config]) -> StreamRes<Box<dyn Cursor<T>>> {
    let meta = stage.meta();
    if meta.is_empty() {
        return Ok(Box::new(IterCursor::new(std::iter::empty())));
    }
    if direct_reuse(configs)
        && let Some(source) = stage.source()
    {
        debug!("materialize cursor by direct reuse");
        return Ok(source.cursor());
    }
    if meta.sink_iterable() {
        debug!("materialize cursor by synchronous sink drain");
        return Ok(Box::new(SinkCursor::new(stage.as_ref())));
    }
    Ok(Box::new(ChannelCursor::spawn(stage.clone(), drain_capacity(configs))?))
}

/* **************************************** 同步排空 **************************************** */

struct SlotSink<T> {
    slot: Rc<RefCell<Option<T>>>,
}

impl<T> Sink<T> for SlotSink<T> {
    fn begin(&mut self, _size: u64, _known: bool) {}

    fn accept(&mut self, v: T) {
        *self.slot.borrow_mut() = Some(v);
    }

    fn close(&mut self) {}
}

pub(crate) struct SinkCursor<T> {
    driver: Box<dyn Drive>,
    pushed: Rc<RefCell<Option<T>>>,
    slot: Slot<T>,
    begun: bool,
}

impl<T: 'static> SinkCursor<T> {
    pub(crate) fn new(stage: &dyn Stage<T>) -> Self {
        let pushed = Rc::new(RefCell::new(None));
        let driver = stage.process(Box::new(SlotSink { slot: pushed.clone() }));
        SinkCursor { driver, pushed, slot: Slot::Before, begun: false }
    }
}

impl<T> Cursor<T> for SinkCursor<T> {
    fn advance(&mut self) -> bool {
        if self.slot.is_finished() {
            return false;
        }
        if !self.begun {
            self.begun = true;
            self.driver.begin();
        }
        // 被过滤掉的源元素不会到达终端，继续拉取直到有值或结束
        loop {
            let pushed = self.pushed.borrow_mut().take();
            if pushed.is_some() {
                return self.slot.fill(pushed);
            }
            if !self.driver.step() {
                self.driver.close();
                return self.slot.fill(None);
            }
        }
    }

    fn current(&self) -> StreamRes<&T> {
        self.slot.current()
    }

    fn take(&mut self) -> StreamRes<T> {
        self.slot.take()
    }

    fn close(&mut self) {
        self.driver.close();
        self.pushed.borrow_mut().take();
        self.slot.close();
    }
}

/* **************************************** 后台排空 **************************************** */

struct ChannelSink<T> {
    tx: Option<Sender<T>>,
    stop: Receiver<()>,
    cancelled: bool,
    sent: u64,
}

impl<T> Sink<T> for ChannelSink<T> {
    fn begin(&mut self, _size: u64, _known: bool) {}

    fn accept(&mut self, v: T) {
        if self.cancelled {
            return;
        }
        let Some(tx) = &self.tx else {
            return;
        };
        select! {
            send(tx, v) -> res => match res {
                Ok(()) => self.sent += 1,
                Err(_) => self.cancelled = true,
            },
            recv(self.stop) -> _ => self.cancelled = true,
        }
    }

    fn rejecting(&self) -> bool {
        self.cancelled || matches!(self.stop.try_recv(), Err(TryRecvError::Disconnected))
    }

    fn close(&mut self) {
        self.tx = None;
        debug!(sent = self.sent, cancelled = self.cancelled, "background drain finished");
    }
}

pub(crate) struct ChannelCursor<T> {
    rx: Option<Receiver<T>>,
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
    slot: Slot<T>,
}

impl<T: Send + 'static> ChannelCursor<T> {
    pub(crate) fn spawn(stage: StageRef<T>, capacity: usize) -> StreamRes<Self> {
        let (tx, rx) = bounded(capacity);
        let (stop_tx, stop_rx) = bounded(0);
        debug!(capacity, "materialize cursor by background drain");
        let handle = std::thread::Builder::new()
            .name("rstream-drain".to_owned())
            .spawn(move || {
                let sink = ChannelSink { tx: Some(tx), stop: stop_rx, cancelled: false, sent: 0 };
                terminate(stage.as_ref(), Box::new(sink));
            })
            .map_err(|err| StreamErr::SpawnDrainErr(err.to_string()))?;
        Ok(ChannelCursor { rx: Some(rx), stop: Some(stop_tx), handle: Some(handle), slot: Slot::Before })
    }
}

impl<T> ChannelCursor<T> {
    /// 回收后台线程，任务中的panic在拉取方重新抛出。关闭时同样会等待任务观察到取消后退出。
    fn join(&mut self) {
        if let Some(handle) = self.handle.take()
            && let Err(payload) = handle.join()
        {
            std::panic::resume_unwind(payload);
        }
    }
}

impl<T> Cursor<T> for ChannelCursor<T> {
    fn advance(&mut self) -> bool {
        if self.slot.is_finished() {
            return false;
        }
        let next = self.rx.as_ref().and_then(|rx| rx.recv().ok());
        if next.is_none() {
            self.rx = None;
            self.stop = None;
            self.join();
        }
        self.slot.fill(next)
    }

    fn current(&self) -> StreamRes<&T> {
        self.slot.current()
    }

    fn take(&mut self) -> StreamRes<T> {
        self.slot.take()
    }

    fn close(&mut self) {
        if self.stop.take().is_some() {
            debug!("cancel background drain");
        }
        // 丢弃接收端可以唤醒阻塞在满队列上的后台任务，任务在下一次拉取前观察到取消
        self.rx = None;
        self.slot.close();
        if std::thread::panicking() {
            self.handle = None;
        } else {
            self.join();
        }
    }
}

impl<T> Drop for ChannelCursor<T> {
    fn drop(&mut self) {
        self.close();
    }
}
