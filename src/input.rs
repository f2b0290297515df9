use crate::StreamRes;
use crate::err::StreamErr;
use crate::meta::UNBOUNDED;
use std::mem;
use std::sync::Arc;

/// 拉取式游标。
///
/// 只有在`advance`成功之后、下一次`advance`之前才能读取当前值；耗尽是永久性的，
/// 需要重新从数据源获取新的游标才能再次遍历。`close`释放持有的资源，可以重复调用。
pub trait Cursor<T> {
    /// 移动到下一个元素，存在则返回`true`。
    fn advance(&mut self) -> bool;
    /// 读取当前值。
    fn current(&self) -> StreamRes<&T>;
    /// 取出当前值，取出后再次读取会返回错误。
    fn take(&mut self) -> StreamRes<T>;
    /// 释放资源。
    fn close(&mut self);
}

/// 元素数据源
pub trait Source<T>: Send + Sync {
    /// 获取一个新的游标。
    fn cursor(&self) -> Box<dyn Cursor<T>>;
    /// 元素数量，以及该数量是否精确。
    fn size(&self) -> (u64, bool);
}

/// 游标的当前值槽位
#[derive(Debug)]
pub(crate) enum Slot<T> {
    Before,
    Current(T),
    Taken,
    Exhausted,
    Closed,
}

impl<T> Slot<T> {
    pub(crate) fn is_finished(&self) -> bool {
        matches!(self, Slot::Exhausted | Slot::Closed)
    }

    /// 放入下一个值，`None`表示耗尽。
    pub(crate) fn fill(&mut self, next: Option<T>) -> bool {
        if self.is_finished() {
            return false;
        }
        match next {
            Some(v) => {
                *self = Slot::Current(v);
                true
            }
            None => {
                *self = Slot::Exhausted;
                false
            }
        }
    }

    pub(crate) fn current(&self) -> StreamRes<&T> {
        match self {
            Slot::Current(v) => Ok(v),
            other => Err(other.state_err()),
        }
    }

    pub(crate) fn take(&mut self) -> StreamRes<T> {
        match mem::replace(self, Slot::Taken) {
            Slot::Current(v) => Ok(v),
            other => {
                let err = other.state_err();
                *self = other;
                Err(err)
            }
        }
    }

    pub(crate) fn close(&mut self) {
        *self = Slot::Closed;
    }

    fn state_err(&self) -> StreamErr {
        match self {
            Slot::Before => StreamErr::NotAdvanced,
            Slot::Current(_) | Slot::Taken => StreamErr::Taken,
            Slot::Exhausted => StreamErr::Exhausted,
            Slot::Closed => StreamErr::Closed,
        }
    }
}

/// 基于标准库迭代器的游标
pub(crate) struct IterCursor<I: Iterator> {
    iter: Option<I>,
    slot: Slot<I::Item>,
}

impl<I: Iterator> IterCursor<I> {
    pub(crate) fn new(iter: I) -> Self {
        IterCursor { iter: Some(iter), slot: Slot::Before }
    }
}

impl<I: Iterator> Cursor<I::Item> for IterCursor<I> {
    fn advance(&mut self) -> bool {
        if self.slot.is_finished() {
            return false;
        }
        let next = self.iter.as_mut().and_then(Iterator::next);
        if next.is_none() {
            self.iter = None;
        }
        self.slot.fill(next)
    }

    fn current(&self) -> StreamRes<&I::Item> {
        self.slot.current()
    }

    fn take(&mut self) -> StreamRes<I::Item> {
        self.slot.take()
    }

    fn close(&mut self) {
        self.iter = None;
        self.slot.close();
    }
}

/// 空数据源
pub(crate) struct EmptySource;

impl<T: 'static> Source<T> for EmptySource {
    fn cursor(&self) -> Box<dyn Cursor<T>> {
        Box::new(IterCursor::new(std::iter::empty()))
    }

    fn size(&self) -> (u64, bool) {
        (0, true)
    }
}

/// 共享切片数据源，遍历时克隆元素。
pub(crate) struct VecSource<T> {
    data: Arc<[T]>,
}

impl<T> VecSource<T> {
    pub(crate) fn new(data: Vec<T>) -> Self {
        VecSource { data: data.into() }
    }

    pub(crate) fn len(&self) -> u64 {
        self.data.len() as u64
    }
}

impl<T: Clone + Send + Sync + 'static> Source<T> for VecSource<T> {
    fn cursor(&self) -> Box<dyn Cursor<T>> {
        let data = self.data.clone();
        Box::new(IterCursor::new((0..data.len()).map(move |idx| data[idx].clone())))
    }

    fn size(&self) -> (u64, bool) {
        (self.len(), true)
    }
}

/// 整数区间 `[from, to)`
pub trait RangeInt: Copy + Ord + Send + Sync + 'static {
    /// 区间内的元素数量，超出`u64`时饱和。
    fn span(from: Self, to: Self) -> u64;
}

macro_rules! impl_range_int {
    ($($t:ty),*) => {
        $(
            impl RangeInt for $t {
                fn span(from: Self, to: Self) -> u64 {
                    if to <= from { 0 } else { u64::try_from(to as i128 - from as i128).unwrap_or(u64::MAX) }
                }
            }
        )*
    };
}

impl_range_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

pub(crate) struct RangeSource<N> {
    from: N,
    to: N,
}

impl<N: RangeInt> RangeSource<N> {
    pub(crate) fn new(from: N, to: N) -> Self {
        // 逆序区间视为空区间
        RangeSource { from, to: to.max(from) }
    }

    pub(crate) fn len(&self) -> u64 {
        N::span(self.from, self.to)
    }
}

impl<N: RangeInt> Source<N> for RangeSource<N>
where
    std::ops::Range<N>: Iterator<Item = N>,
{
    fn cursor(&self) -> Box<dyn Cursor<N>> {
        Box::new(IterCursor::new(self.from..self.to))
    }

    fn size(&self) -> (u64, bool) {
        (self.len(), true)
    }
}

/// 由闭包反复生成迭代器的数据源，数量未知。
pub(crate) struct IterSource<F> {
    supplier: F,
}

impl<F> IterSource<F> {
    pub(crate) fn new(supplier: F) -> Self {
        IterSource { supplier }
    }
}

impl<T: 'static, F, I> Source<T> for IterSource<F>
where
    F: Fn() -> I + Send + Sync,
    I: IntoIterator<Item = T>,
    I::IntoIter: 'static,
{
    fn cursor(&self) -> Box<dyn Cursor<T>> {
        Box::new(IterCursor::new((self.supplier)().into_iter()))
    }

    fn size(&self) -> (u64, bool) {
        (UNBOUNDED, false)
    }
}

/// UTF-8字符数据源，字节长度仅是字符数量的上界。
pub(crate) struct CharsSource {
    text: Arc<str>,
}

impl CharsSource {
    pub(crate) fn new(text: impl Into<Arc<str>>) -> Self {
        CharsSource { text: text.into() }
    }

    pub(crate) fn byte_len(&self) -> u64 {
        self.text.len() as u64
    }
}

impl Source<char> for CharsSource {
    fn cursor(&self) -> Box<dyn Cursor<char>> {
        Box::new(CharsCursor { text: Some(self.text.clone()), pos: 0, slot: Slot::Before })
    }

    fn size(&self) -> (u64, bool) {
        (self.byte_len(), false)
    }
}

struct CharsCursor {
    text: Option<Arc<str>>,
    pos: usize,
    slot: Slot<char>,
}

impl Cursor<char> for CharsCursor {
    fn advance(&mut self) -> bool {
        let next = match &self.text {
            Some(text) => text[self.pos..].chars().next(),
            None => None,
        };
        if let Some(c) = next {
            self.pos += c.len_utf8();
        } else {
            self.text = None;
        }
        self.slot.fill(next)
    }

    fn current(&self) -> StreamRes<&char> {
        self.slot.current()
    }

    fn take(&mut self) -> StreamRes<char> {
        self.slot.take()
    }

    fn close(&mut self) {
        self.text = None;
        self.slot.close();
    }
}
