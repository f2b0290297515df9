use crate::StreamRes;
use crate::config::Config;
use crate::err::StreamErr;
use crate::input::{CharsSource, Cursor, EmptySource, IterSource, RangeInt, RangeSource, Source, VecSource};
use crate::iter::{StreamIter, materialize};
use crate::meta::{Meta, UNBOUNDED};
use crate::op::capacity_hint;
use crate::op::stateful::{Cond, Distinct, DistinctBy, Limit, Skip, SortBy};
use crate::op::stateless::{Filter, FlatMap, Map, Peek};
use crate::op::terminal::{Terminal, ignore_begin};
use crate::pipe::{Header, Linked, Op, Stage, StageRef, terminate};
use crate::sink::Sink;
use itertools::Itertools;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::hash::Hash;
use std::sync::Arc;

/// 惰性求值的数据流。
///
/// 中间操作只构建新的阶段，直到调用终端操作才真正拉取数据。流的值可以克隆并反复使用，
/// 每次终端操作都是一次独立的执行。
pub struct Stream<T> {
    stage: StageRef<T>,
}

impl<T> Clone for Stream<T> {
    fn clone(&self) -> Self {
        Stream { stage: self.stage.clone() }
    }
}

impl<T: 'static> Debug for Stream<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut names = Vec::new();
        self.stage.describe(&mut names);
        f.debug_struct("Stream").field("stages", &names.iter().join(" -> ")).field("meta", &self.meta()).finish()
    }
}

/* **************************************** 数据源 **************************************** */

impl<T: 'static> Stream<T> {
    fn header(meta: Meta, source: impl Source<T> + 'static) -> Stream<T> {
        Stream { stage: Arc::new(Header::new(meta, Arc::new(source))) }
    }

    /// 空流
    pub fn empty() -> Stream<T> {
        Stream::header(Meta::empty(), EmptySource)
    }

    /// 以给定的元素构建流，遍历时克隆元素。
    pub fn of(values: impl IntoIterator<Item = T>) -> Stream<T>
    where
        T: Clone + Send + Sync,
    {
        Stream::from_vec(values.into_iter().collect())
    }

    pub fn from_vec(values: Vec<T>) -> Stream<T>
    where
        T: Clone + Send + Sync,
    {
        let source = VecSource::new(values);
        Stream::header(Meta::sized(source.len()), source)
    }

    /// 每次执行时调用`supplier`获取新的迭代器，元素数量未知。
    pub fn iterable<F, I>(supplier: F) -> Stream<T>
    where
        F: Fn() -> I + Send + Sync + 'static,
        I: IntoIterator<Item = T>,
        I::IntoIter: 'static,
    {
        Stream::header(Meta::default(), IterSource::new(supplier))
    }

    /// 自定义数据源，精确的数量会作为上界。
    pub fn from_source(source: impl Source<T> + 'static) -> Stream<T> {
        let meta = match source.size() {
            (size, true) => Meta::sized(size),
            (_, false) => Meta::default(),
        };
        Stream::header(meta, source)
    }

    /// 哈希表的键，天然去重。
    pub fn map_keys<V, S>(map: &HashMap<T, V, S>) -> Stream<T>
    where
        T: Clone + Send + Sync,
    {
        let source = VecSource::new(map.keys().cloned().collect());
        Stream::header(Meta::sized(source.len()).with_distinct(true), source)
    }

    /// 哈希表的值
    pub fn map_values<K, S>(map: &HashMap<K, T, S>) -> Stream<T>
    where
        T: Clone + Send + Sync,
    {
        let source = VecSource::new(map.values().cloned().collect());
        Stream::header(Meta::sized(source.len()), source)
    }

    /// 依次连接多个流
    pub fn concat(streams: Vec<Stream<T>>) -> Stream<T> {
        let streams: Arc<[Stream<T>]> = streams.into();
        Stream::range(0, streams.len()).flat_map(move |idx| streams[idx].clone())
    }
}

impl<N: RangeInt> Stream<N>
where
    std::ops::Range<N>: Iterator<Item = N>,
{
    /// 半开区间 `[from, to)` 内的整数，逆序区间为空。
    pub fn range(from: N, to: N) -> Stream<N> {
        let source = RangeSource::new(from, to);
        Stream::header(Meta::sized(source.len()).with_distinct(true), source)
    }
}

impl Stream<char> {
    /// 字符串中的UTF-8字符
    pub fn chars(text: &str) -> Stream<char> {
        let source = CharsSource::new(text);
        // 字节长度只是字符数量的上界
        Stream::header(Meta::sized(source.byte_len()), source)
    }
}

impl Stream<u8> {
    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Stream<u8> {
        Stream::from_vec(bytes.into())
    }
}

/* **************************************** 中间操作 **************************************** */

impl<T: 'static> Stream<T> {
    pub(crate) fn meta(&self) -> Meta {
        self.stage.meta()
    }

    pub(crate) fn stage(&self) -> &dyn Stage<T> {
        self.stage.as_ref()
    }

    pub(crate) fn stage_ref(&self) -> StageRef<T> {
        self.stage.clone()
    }

    fn link<U: 'static, O: Op<T, U>>(&self, meta: Meta, op: O) -> Stream<U> {
        Stream { stage: Arc::new(Linked::new(meta, self.stage.clone(), op)) }
    }

    /// 跳过前n个元素。
    pub fn skip(&self, n: u64) -> Stream<T> {
        let meta = self.meta();
        if meta.is_empty() {
            return self.clone();
        }
        if meta.max_size() != UNBOUNDED && meta.max_size() <= n {
            return Stream::empty();
        }
        self.link(meta.decr_size(n), Skip::new(n))
    }

    /// 最多保留前n个元素。
    pub fn limit(&self, n: u64) -> Stream<T> {
        let meta = self.meta();
        if meta.max_size() <= n {
            return self.clone();
        }
        self.link(meta.limit_size(n), Limit::new(n))
    }

    /// 保留满足`pred`的元素。
    pub fn filter(&self, pred: impl Fn(&T) -> bool + Send + Sync + 'static) -> Stream<T> {
        let meta = self.meta();
        if meta.is_empty() {
            return self.clone();
        }
        self.link(meta, Filter::new(pred))
    }

    /// 对流经的每个元素执行`act`。
    pub fn peek(&self, act: impl Fn(&T) + Send + Sync + 'static) -> Stream<T> {
        let meta = self.meta();
        if meta.is_empty() {
            return self.clone();
        }
        self.link(meta, Peek::new(act))
    }

    /// 逐个检查元素直到`cond`首次成立，使条件成立的元素及其后的元素都不会流入下游。
    pub fn cond(&self, cond: impl Fn(&T) -> bool + Send + Sync + 'static) -> Stream<T> {
        let meta = self.meta();
        if meta.is_empty() {
            return self.clone();
        }
        self.link(meta, Cond::new(cond))
    }

    /// 按元素值去重，输出顺序不确定。
    pub fn distinct(&self) -> Stream<T>
    where
        T: Hash + Eq,
    {
        let meta = self.meta();
        if meta.distinct() || meta.is_empty() {
            return self.clone();
        }
        self.link(meta.with_distinct(true).with_sink_iterable(false), Distinct)
    }

    /// 按`key`去重，键相同时保留最后一个元素，输出顺序不确定。
    pub fn distinct_by<K: Hash + Eq + 'static>(&self, key: impl Fn(&T) -> K + Send + Sync + 'static) -> Stream<T> {
        let meta = self.meta();
        if meta.is_empty() {
            return self.clone();
        }
        self.link(meta.with_sink_iterable(false), DistinctBy::new(key))
    }

    /// 按比较函数排序。
    ///
    /// 比较结果相等的元素之间的相对顺序不作保证。
    pub fn sort_by(&self, cmp: impl Fn(&T, &T) -> Ordering + Send + Sync + 'static) -> Stream<T> {
        let meta = self.meta();
        if meta.is_empty() {
            return self.clone();
        }
        self.link(meta.with_sink_iterable(false), SortBy::new(cmp))
    }

    /// 按自然顺序排序。
    pub fn sorted(&self) -> Stream<T>
    where
        T: Ord,
    {
        self.sort_by(T::cmp)
    }

    /// 转换每个元素，元素类型可以改变。
    pub fn map<U: 'static>(&self, mapper: impl Fn(T) -> U + Send + Sync + 'static) -> Stream<U> {
        let meta = self.meta();
        if meta.is_empty() {
            return Stream::empty();
        }
        self.link(meta.with_distinct(false), Map::new(mapper))
    }

    /// 把每个元素展开为一个子流，并依次连接所有子流。
    pub fn flat_map<U: 'static>(&self, mapper: impl Fn(T) -> Stream<U> + Send + Sync + 'static) -> Stream<U> {
        let meta = self.meta();
        if meta.is_empty() {
            return Stream::empty();
        }
        let meta = meta.with_distinct(false).with_sink_iterable(false).with_max_size(UNBOUNDED);
        self.link(meta, FlatMap::new(mapper))
    }
}

/* **************************************** 终端操作 **************************************** */

impl<T: 'static> Stream<T> {
    fn run(&self, sink: impl Sink<T>) {
        terminate(self.stage(), Box::new(sink));
    }

    /// 元素数量。
    ///
    /// 如果上游声明了精确数量，则直接使用该数量而不拉取元素，此时`peek`等副作用不会执行。
    pub fn count(&self) -> u64 {
        if self.meta().is_empty() {
            return 0;
        }
        let mut count = 0u64;
        self.run(Terminal::new(
            &mut count,
            |st: &mut u64, size: u64, known: bool| {
                if known {
                    *st = size;
                }
                known
            },
            |st: &mut u64, _: T| {
                *st += 1;
                false
            },
        ));
        count
    }

    /// 收集到`Vec`中。
    pub fn collect_vec(&self) -> Vec<T> {
        self.collect(|size, known| Vec::with_capacity(capacity_hint(size, known)), |b, a| b.push(a), |b| b)
    }

    /// 通用收集：`supplier`根据声明的数量创建中间容器，`accumulator`逐个累积元素，`finisher`转换为最终结果。
    pub fn collect<C, R>(
        &self, supplier: impl FnOnce(u64, bool) -> C, mut accumulator: impl FnMut(&mut C, T),
        finisher: impl FnOnce(C) -> R,
    ) -> R {
        let mut supplier = Some(supplier);
        let mut container: Option<C> = None;
        if !self.meta().is_empty() {
            self.run(Terminal::new(
                &mut container,
                |st: &mut Option<C>, size: u64, known: bool| {
                    if let Some(supplier) = supplier.take() {
                        *st = Some(supplier(size, known));
                    }
                    false
                },
                |st: &mut Option<C>, v: T| {
                    if let Some(container) = st.as_mut() {
                        accumulator(container, v);
                    }
                    false
                },
            ));
        }
        // 空流不会调用`begin`，此时按空容器处理
        match container.or_else(|| supplier.map(|supplier| supplier(0, true))) {
            Some(container) => finisher(container),
            None => StreamErr::Interrupted.raise(),
        }
    }

    /// 以`identity`为初始值依次归约所有元素。
    pub fn reduce(&self, identity: T, mut accum: impl FnMut(T, T) -> T) -> T {
        if self.meta().is_empty() {
            return identity;
        }
        let mut acc = Some(identity);
        self.run(Terminal::new(&mut acc, ignore_begin, |st: &mut Option<T>, v: T| {
            if let Some(b) = st.take() {
                *st = Some(accum(b, v));
            }
            false
        }));
        acc.unwrap_or_else(|| StreamErr::Interrupted.raise())
    }

    /// 对每个元素执行`act`。
    pub fn for_each(&self, mut act: impl FnMut(T)) {
        if self.meta().is_empty() {
            return;
        }
        self.run(Terminal::new(&mut (), ignore_begin, |_: &mut (), v: T| {
            act(v);
            false
        }));
    }

    /// 逐个处理元素，直到`cond`返回`true`。
    pub fn for_cond(&self, mut cond: impl FnMut(T) -> bool) {
        if self.meta().is_empty() {
            return;
        }
        self.run(Terminal::new(&mut (), ignore_begin, |_: &mut (), v: T| cond(v)));
    }

    /// 按比较函数取最小值，多个最小值时保留最先出现的一个，空流返回`None`。
    pub fn min_by(&self, mut cmp: impl FnMut(&T, &T) -> Ordering) -> Option<T> {
        self.extremum(move |min, v| cmp(min, v) == Ordering::Greater)
    }

    /// 按比较函数取最大值，多个最大值时保留最先出现的一个，空流返回`None`。
    pub fn max_by(&self, mut cmp: impl FnMut(&T, &T) -> Ordering) -> Option<T> {
        self.extremum(move |max, v| cmp(max, v) == Ordering::Less)
    }

    fn extremum(&self, mut replace: impl FnMut(&T, &T) -> bool) -> Option<T> {
        if self.meta().is_empty() {
            return None;
        }
        let mut res = None;
        self.run(Terminal::new(&mut res, ignore_begin, |st: &mut Option<T>, v: T| {
            let replaced = match st {
                Some(cur) => replace(cur, &v),
                None => true,
            };
            if replaced {
                *st = Some(v);
            }
            false
        }));
        res
    }

    /// 第一个元素，找到后立即停止拉取。
    pub fn first(&self) -> Option<T> {
        if self.meta().is_empty() {
            return None;
        }
        let mut res = None;
        self.run(Terminal::new(&mut res, ignore_begin, |st: &mut Option<T>, v: T| {
            *st = Some(v);
            true
        }));
        res
    }

    /// 最后一个元素
    pub fn last(&self) -> Option<T> {
        if self.meta().is_empty() {
            return None;
        }
        let mut res = None;
        self.run(Terminal::new(&mut res, ignore_begin, |st: &mut Option<T>, v: T| {
            *st = Some(v);
            false
        }));
        res
    }

    /// 拉取式游标，使用默认配置。
    pub fn cursor(&self) -> StreamRes<Box<dyn Cursor<T>>>
    where
        T: Send,
    {
        self.cursor_with(&[])
    }

    pub fn cursor_with(&self, configs: &[Config]) -> StreamRes<Box<dyn Cursor<T>>>
    where
        T: Send,
    {
        materialize(&self.stage, configs)
    }

    /// 标准库迭代器形式，丢弃时自动关闭。
    pub fn iter(&self) -> StreamRes<StreamIter<T>>
    where
        T: Send,
    {
        self.iter_with(&[])
    }

    pub fn iter_with(&self, configs: &[Config]) -> StreamRes<StreamIter<T>>
    where
        T: Send,
    {
        Ok(StreamIter::new(self.cursor_with(configs)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

    fn counter() -> (Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let c = Arc::new(AtomicUsize::new(0));
        (c.clone(), c)
    }

    #[test]
    fn test_sources() {
        assert_eq!(Stream::of([1, 2, 3]).collect_vec(), vec![1, 2, 3]);
        assert_eq!(Stream::range(3u8, 6).collect_vec(), vec![3, 4, 5]);
        assert_eq!(Stream::range(-2i64, 1).collect_vec(), vec![-2, -1, 0]);
        assert_eq!(Stream::range(5, 1).count(), 0);
        assert_eq!(Stream::chars("中a文").collect_vec(), vec!['中', 'a', '文']);
        assert_eq!(Stream::bytes("ab").collect_vec(), vec![b'a', b'b']);
        assert_eq!(Stream::iterable(|| vec![1, 2]).collect_vec(), vec![1, 2]);
        assert!(Stream::<String>::empty().collect_vec().is_empty());

        let map: HashMap<_, _> = [("a", 1), ("b", 2)].into_iter().collect();
        let mut keys = Stream::map_keys(&map).collect_vec();
        keys.sort();
        assert_eq!(keys, vec!["a", "b"]);
        assert!(Stream::map_keys(&map).meta().distinct());
        let mut values = Stream::map_values(&map).collect_vec();
        values.sort();
        assert_eq!(values, vec![1, 2]);
    }

    #[test]
    fn test_source_is_reusable() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_in = calls.clone();
        let stream = Stream::iterable(move || {
            calls_in.fetch_add(1, AtomicOrdering::SeqCst);
            0..3
        });
        assert_eq!(stream.count(), 3);
        assert_eq!(stream.collect_vec(), vec![0, 1, 2]);
        assert_eq!(calls.load(AtomicOrdering::SeqCst), 2);
    }

    #[test]
    fn test_skip_limit() {
        let stream = Stream::range(0, 10);
        assert_eq!(stream.skip(7).collect_vec(), vec![7, 8, 9]);
        assert_eq!(stream.skip(0).collect_vec(), (0..10).collect::<Vec<_>>());
        assert!(stream.skip(10).meta().is_empty());
        assert_eq!(stream.limit(2).collect_vec(), vec![0, 1]);
        assert_eq!(stream.limit(0).count(), 0);
        assert_eq!(stream.limit(100).meta().max_size(), 10);
        assert_eq!(stream.skip(2).limit(3).meta().max_size(), 3);
        assert_eq!(Stream::iterable(|| 0..).skip(5).limit(2).collect_vec(), vec![5, 6]);
    }

    #[test]
    fn test_filter_map_peek() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_in = seen.clone();
        let res = Stream::range(0, 6)
            .filter(|v| v % 2 == 1)
            .peek(move |v| seen_in.lock().unwrap().push(*v))
            .map(|v| format!("<{v}>"))
            .collect_vec();
        assert_eq!(res, vec!["<1>", "<3>", "<5>"]);
        assert_eq!(*seen.lock().unwrap(), vec![1, 3, 5]);
    }

    #[test]
    fn test_cond() {
        assert_eq!(Stream::range(1, 5).cond(|v| *v == 3).collect_vec(), vec![1, 2]);
        assert_eq!(Stream::range(1, 5).cond(|v| *v == 1).count(), 0);
        assert_eq!(Stream::range(1, 5).cond(|v| *v == 10).count(), 4);
    }

    #[test]
    fn test_distinct() {
        let mut res = Stream::of([3, 1, 3, 2, 1]).distinct().collect_vec();
        res.sort();
        assert_eq!(res, vec![1, 2, 3]);

        let mut res = Stream::of(["a1", "b1", "a2"]).distinct_by(|s| s.as_bytes()[0]).collect_vec();
        res.sort();
        assert_eq!(res, vec!["a2", "b1"]);

        let range = Stream::range(0, 3);
        assert!(Arc::ptr_eq(&range.stage, &range.distinct().stage));
    }

    #[test]
    fn test_sort() {
        let stream = Stream::of([8, 4, 1, 3, 6, 9, 7, 5, 2, 0]);
        assert_eq!(stream.sorted().collect_vec(), (0..10).collect::<Vec<_>>());
        assert_eq!(stream.sort_by(|u, v| v.cmp(u)).first(), Some(9));
        assert_eq!(stream.sorted().limit(3).collect_vec(), vec![0, 1, 2]);
    }

    #[test]
    fn test_flat_map() {
        let res = Stream::range(0, 10).flat_map(|v| Stream::range(v * 10, v * 10 + 10)).sort_by(|u, v| v.cmp(u)).collect_vec();
        assert_eq!(res, (0..100).rev().collect::<Vec<_>>());

        let res = Stream::of([1, 0, 2]).flat_map(|v| Stream::of(vec!['x'; v])).collect_vec();
        assert_eq!(res, vec!['x', 'x', 'x']);
        assert_eq!(Stream::range(0, 1_000_000).flat_map(|v| Stream::of([v, v])).limit(3).collect_vec(), vec![0, 0, 1]);
    }

    #[test]
    fn test_concat() {
        let res = Stream::concat(vec![Stream::of([1, 2]), Stream::empty(), Stream::range(7, 9)]).collect_vec();
        assert_eq!(res, vec![1, 2, 7, 8]);
        assert_eq!(Stream::<i32>::concat(Vec::new()).count(), 0);
    }

    #[test]
    fn test_count_uses_known_size() {
        let (peeked, peeked_in) = counter();
        let stream = Stream::range(0, 5).peek(move |_| {
            peeked_in.fetch_add(1, AtomicOrdering::SeqCst);
        });
        assert_eq!(stream.count(), 5);
        assert_eq!(peeked.load(AtomicOrdering::SeqCst), 0);
        assert_eq!(stream.filter(|v| *v > 2).count(), 2);
        assert_eq!(peeked.load(AtomicOrdering::SeqCst), 5);
        assert_eq!(Stream::chars("中文").count(), 2);
    }

    #[test]
    fn test_empty_stream_never_invokes_operators() {
        let (called, called_in) = counter();
        let stream = Stream::<i32>::empty()
            .filter(move |_| {
                called_in.fetch_add(1, AtomicOrdering::SeqCst);
                true
            })
            .map(|v| v * 2)
            .sorted();
        assert_eq!(stream.count(), 0);
        assert_eq!(stream.first(), None);
        assert_eq!(stream.reduce(7, |a, b| a + b), 7);
        assert_eq!(stream.collect(|size, known| (size, known), |_, _| {}, |c| c), (0, true));
        assert_eq!(called.load(AtomicOrdering::SeqCst), 0);
    }

    #[test]
    fn test_terminals() {
        let stream = Stream::of([3, 1, 4, 1, 5]);
        assert_eq!(stream.reduce(0, |a, b| a + b), 14);
        assert_eq!(stream.first(), Some(3));
        assert_eq!(stream.last(), Some(5));
        assert_eq!(stream.min_by(i32::cmp), Some(1));
        assert_eq!(stream.max_by(i32::cmp), Some(5));
        assert_eq!(Stream::<i32>::empty().min_by(i32::cmp), None);
        assert_eq!(Stream::iterable(Vec::<i32>::new).max_by(i32::cmp), None);

        let mut sum = 0;
        stream.for_each(|v| sum += v);
        assert_eq!(sum, 14);

        let mut seen = Vec::new();
        stream.for_cond(|v| {
            seen.push(v);
            v == 4
        });
        assert_eq!(seen, vec![3, 1, 4]);

        let joined = stream.collect(|size, _| String::with_capacity(size as usize), |s, v| s.push_str(&v.to_string()), |s| s);
        assert_eq!(joined, "31415");
    }

    #[test]
    fn test_min_max_keep_first_on_tie() {
        let stream = Stream::of([(1, 'a'), (0, 'b'), (1, 'c'), (0, 'd')]);
        assert_eq!(stream.min_by(|u, v| u.0.cmp(&v.0)), Some((0, 'b')));
        assert_eq!(stream.max_by(|u, v| u.0.cmp(&v.0)), Some((1, 'a')));
    }

    #[test]
    fn test_first_stops_pulling() {
        let (pulled, pulled_in) = counter();
        let first = Stream::range(0, 100)
            .peek(move |_| {
                pulled_in.fetch_add(1, AtomicOrdering::SeqCst);
            })
            .filter(|v| *v >= 3)
            .first();
        assert_eq!(first, Some(3));
        assert_eq!(pulled.load(AtomicOrdering::SeqCst), 4);
    }

    #[test]
    fn test_iter() {
        let stream = Stream::range(0, 10).filter(|v| v % 3 == 0);
        assert_eq!(stream.iter().unwrap().collect::<Vec<_>>(), vec![0, 3, 6, 9]);

        let sorted = Stream::of([3, 2, 1]).sorted();
        let mut iter = sorted.iter_with(&[Config::DrainCapacity(1)]).unwrap();
        assert_eq!(iter.next(), Some(1));
        iter.close();
        assert_eq!(iter.next(), None);

        let mut cursor = Stream::of([5]).cursor().unwrap();
        assert!(cursor.advance());
        assert_eq!(cursor.current(), Ok(&5));
        assert!(!cursor.advance());
    }

    #[test]
    fn test_debug() {
        let stream = Stream::range(0, 4).filter(|v| *v > 0).map(|v| v + 1);
        let text = format!("{stream:?}");
        assert!(text.contains("source -> filter -> map"), "{text}");
        assert!(format!("{:?}", Stream::<u8>::empty()).contains("empty"));
    }

    proptest! {
        #[test]
        fn prop_skip_limit_is_slice(values in prop::collection::vec(any::<i32>(), 0..64), skip in 0u64..80, limit in 0u64..80) {
            let res = Stream::from_vec(values.clone()).skip(skip).limit(limit).collect_vec();
            let expected: Vec<_> = values.into_iter().skip(skip as usize).take(limit as usize).collect();
            prop_assert_eq!(res, expected);
        }

        #[test]
        fn prop_round_trip(values in prop::collection::vec(any::<u8>(), 0..64)) {
            prop_assert_eq!(crate::to_vec(&Stream::from_vec(values.clone()).peek(|_| {})), values);
        }

        #[test]
        fn prop_count_matches_collect(values in prop::collection::vec(0u8..16, 0..64)) {
            let stream = Stream::from_vec(values).filter(|v| v % 3 != 0).skip(2);
            prop_assert_eq!(stream.count(), stream.collect_vec().len() as u64);
        }

        #[test]
        fn prop_distinct_is_idempotent(values in prop::collection::vec(0u8..16, 0..64)) {
            let once = Stream::from_vec(values).distinct();
            let mut a = once.collect_vec();
            let mut b = once.distinct().collect_vec();
            a.sort();
            b.sort();
            prop_assert_eq!(a, b);
        }

        #[test]
        fn prop_sorted_matches_std(mut values in prop::collection::vec(any::<i64>(), 0..64)) {
            let res = Stream::from_vec(values.clone()).sorted().collect_vec();
            values.sort();
            prop_assert_eq!(res, values);
        }

        #[test]
        fn prop_iter_matches_collect(values in prop::collection::vec(any::<i16>(), 0..64)) {
            let stream = Stream::from_vec(values).map(i32::from).filter(|v| v % 2 == 0);
            prop_assert_eq!(stream.iter().unwrap().collect::<Vec<_>>(), stream.collect_vec());
        }
    }
}
