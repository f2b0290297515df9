use crate::sink::Sink;

/// 终端消费者：执行状态由调用方持有，`begin`和`act`共享该状态。
///
/// `begin`与`act`返回`true`时开始拒绝后续元素，例如已知数量时直接得到计数、找到首个元素后停止。
pub(crate) struct Terminal<'a, St, B, A> {
    state: &'a mut St,
    begin: B,
    act: A,
    rejecting: bool,
}

impl<'a, St, B, A> Terminal<'a, St, B, A> {
    pub(crate) fn new(state: &'a mut St, begin: B, act: A) -> Self {
        Terminal { state, begin, act, rejecting: false }
    }
}

/// 忽略数量声明
pub(crate) fn ignore_begin<St>(_: &mut St, _: u64, _: bool) -> bool {
    false
}

impl<T, St, B, A> Sink<T> for Terminal<'_, St, B, A>
where
    B: FnMut(&mut St, u64, bool) -> bool,
    A: FnMut(&mut St, T) -> bool,
{
    fn begin(&mut self, size: u64, known: bool) {
        self.rejecting = (self.begin)(self.state, size, known);
    }

    fn accept(&mut self, v: T) {
        if !self.rejecting {
            self.rejecting = (self.act)(self.state, v);
        }
    }

    fn rejecting(&self) -> bool {
        self.rejecting
    }

    fn close(&mut self) {}
}
