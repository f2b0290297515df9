use crate::Stream;
use crate::op::capacity_hint;
use rustc_hash::{FxBuildHasher, FxHashMap, FxHashSet};
use std::fmt::Display;
use std::hash::Hash;

/// 收集到`Vec`中，与[`Stream::collect_vec`]相同。
pub fn to_vec<T: 'static>(stream: &Stream<T>) -> Vec<T> {
    stream.collect_vec()
}

/// 收集到集合中
pub fn to_set<T: Hash + Eq + 'static>(stream: &Stream<T>) -> FxHashSet<T> {
    stream.collect(
        |size, known| FxHashSet::with_capacity_and_hasher(capacity_hint(size, known), FxBuildHasher),
        |b, a| {
            b.insert(a);
        },
        |b| b,
    )
}

/// 按`key`对元素分类：每个键对应的容器由`supplier`创建，元素经`mapper`转换后由`accumulator`累积，
/// 最后把整个映射交给`finisher`。
pub fn group<T, K, V, C, R>(
    stream: &Stream<T>, key: impl Fn(&T) -> K, supplier: impl Fn() -> C, mapper: impl Fn(T) -> V,
    mut accumulator: impl FnMut(&mut C, V), finisher: impl FnOnce(FxHashMap<K, C>) -> R,
) -> R
where
    T: 'static,
    K: Hash + Eq,
{
    stream.collect(
        |size, known| FxHashMap::with_capacity_and_hasher(capacity_hint(size, known), FxBuildHasher),
        |b, a| {
            let container = b.entry(key(&a)).or_insert_with(&supplier);
            accumulator(container, mapper(a));
        },
        finisher,
    )
}

/// 按`key`分组，同组元素保持流中的顺序。
pub fn to_map<T: 'static, K: Hash + Eq>(stream: &Stream<T>, key: impl Fn(&T) -> K) -> FxHashMap<K, Vec<T>> {
    group(stream, key, Vec::new, |v| v, |b, a| b.push(a), |m| m)
}

/// 统计每个元素出现的次数。
pub fn counting<T: Hash + Eq + Clone + 'static>(stream: &Stream<T>) -> FxHashMap<T, u64> {
    group(stream, T::clone, || 0u64, |_| 1u64, |b, a| *b += a, |m| m)
}

/// 拼接参数
#[derive(Debug, PartialEq, Default, Clone)]
pub struct JoinInfo {
    pub delimiter: String,
    pub prefix: String,
    pub postfix: String,
}

impl JoinInfo {
    pub fn new(delimiter: impl Into<String>) -> Self {
        JoinInfo { delimiter: delimiter.into(), ..JoinInfo::default() }
    }

    pub fn with_affix(self, prefix: impl Into<String>, postfix: impl Into<String>) -> Self {
        JoinInfo { prefix: prefix.into(), postfix: postfix.into(), ..self }
    }
}

/// 把元素的文本形式以分隔符连接，并加上前后缀。
pub fn joining<T: Display + 'static>(stream: &Stream<T>, join_info: &JoinInfo) -> String {
    let mut first = true;
    stream.collect(
        |size, known| {
            let mut buf = String::with_capacity(capacity_hint(size, known) + join_info.prefix.len());
            buf.push_str(&join_info.prefix);
            buf
        },
        |b, a| {
            if !first {
                b.push_str(&join_info.delimiter);
            }
            first = false;
            b.push_str(&a.to_string());
        },
        |mut b| {
            b.push_str(&join_info.postfix);
            b
        },
    )
}
