use std::fmt::{Debug, Formatter};

/// 数量未知时的上界
pub(crate) const UNBOUNDED: u64 = u64::MAX;

/// 每个阶段的大小元数据。
///
/// `max_size`只是剩余元素数量的上界，仅用于优化：可以保守地放大，但绝不能在存在元素时声称为0。
#[derive(Clone, Copy, Eq, PartialEq)]
pub(crate) struct Meta {
    max_size: u64,
    distinct: bool,
    sink_iterable: bool,
}

impl Default for Meta {
    fn default() -> Self {
        Meta { max_size: UNBOUNDED, distinct: false, sink_iterable: true }
    }
}

impl Meta {
    pub(crate) fn sized(max_size: u64) -> Meta {
        Meta { max_size, ..Meta::default() }
    }

    /// 空阶段的元数据：上界为0，且天然去重。
    pub(crate) fn empty() -> Meta {
        Meta { max_size: 0, distinct: true, sink_iterable: true }
    }

    pub(crate) fn max_size(&self) -> u64 {
        self.max_size
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.max_size == 0
    }

    pub(crate) fn distinct(&self) -> bool {
        self.distinct
    }

    pub(crate) fn sink_iterable(&self) -> bool {
        self.sink_iterable
    }

    pub(crate) fn with_max_size(self, max_size: u64) -> Meta {
        Meta { max_size, ..self }
    }

    pub(crate) fn with_distinct(self, distinct: bool) -> Meta {
        Meta { distinct, ..self }
    }

    pub(crate) fn with_sink_iterable(self, sink_iterable: bool) -> Meta {
        Meta { sink_iterable, ..self }
    }

    /// 跳过n个元素后的上界，最小为0。
    pub(crate) fn decr_size(self, n: u64) -> Meta {
        if self.max_size == UNBOUNDED {
            return self;
        }
        self.with_max_size(self.max_size.saturating_sub(n))
    }

    pub(crate) fn limit_size(self, n: u64) -> Meta {
        self.with_max_size(self.max_size.min(n))
    }
}

impl Debug for Meta {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("Meta");
        if self.max_size == UNBOUNDED {
            s.field("max_size", &"unbounded");
        } else {
            s.field("max_size", &self.max_size);
        }
        s.field("distinct", &self.distinct).field("sink_iterable", &self.sink_iterable).finish()
    }
}
