use crate::err::StreamErr;

/// 推送式消费者。
///
/// 一次执行中调用顺序固定：`begin`一次，若干次`accept`（每次之后查询`rejecting`），最后`close`一次。
/// 每个消费者只属于一次执行，不能跨执行复用。
pub(crate) trait Sink<T> {
    /// 在推送任何元素之前声明预计数量，`known`表示该数量是否精确。
    fn begin(&mut self, size: u64, known: bool);
    /// 推送一个元素。
    fn accept(&mut self, v: T);
    /// 是否不再接收元素，一旦返回`true`驱动方就停止拉取。
    fn rejecting(&self) -> bool {
        false
    }
    /// 结束本次执行。
    fn close(&mut self);
}

pub(crate) type BoxSink<'a, T> = Box<dyn Sink<T> + 'a>;

/// 需要缓冲的消费者所处的阶段：先累积，关闭时再排空到下游。
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) enum Phase {
    Idle,
    Accumulating,
    Draining,
    Closed,
}

impl Phase {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Accumulating => "accumulating",
            Phase::Draining => "draining",
            Phase::Closed => "closed",
        }
    }

    /// `begin`只能在空闲阶段调用一次。
    pub(crate) fn begin(&mut self) {
        if *self != Phase::Idle {
            StreamErr::BeginTwice.raise();
        }
        *self = Phase::Accumulating;
    }

    pub(crate) fn check_accept(&self) {
        if *self != Phase::Accumulating {
            StreamErr::AcceptOutOfPhase { phase: self.name() }.raise();
        }
    }

    /// 进入排空阶段，已经关闭过则返回`false`。
    pub(crate) fn drain(&mut self) -> bool {
        match self {
            Phase::Closed | Phase::Draining => false,
            _ => {
                *self = Phase::Draining;
                true
            }
        }
    }

    pub(crate) fn finish(&mut self) {
        *self = Phase::Closed;
    }
}

/// 把元素逐个排空到下游，下游开始拒绝时立即停止，最后关闭下游。
pub(crate) fn drain_into<T>(down: &mut BoxSink<'_, T>, items: impl IntoIterator<Item = T>, size: usize) {
    down.begin(size as u64, true);
    for v in items {
        if down.rejecting() {
            break;
        }
        down.accept(v);
    }
    down.close();
}
