//! 常用比较函数，可直接传给[`Stream::sort_by`](crate::Stream::sort_by)、[`Stream::min_by`](crate::Stream::min_by)等操作。

use ordered_float::OrderedFloat;
use std::cmp::Ordering;
use unicase::UniCase;

/// 自然顺序
pub fn natural<T: Ord>(u: &T, v: &T) -> Ordering {
    u.cmp(v)
}

/// 反转比较函数的结果。
pub fn reverse<T>(cmp: impl Fn(&T, &T) -> Ordering) -> impl Fn(&T, &T) -> Ordering {
    move |u, v| cmp(v, u)
}

/// 浮点数的全序比较，NaN大于所有数值。
pub fn float<F: Copy>(u: &F, v: &F) -> Ordering
where
    OrderedFloat<F>: Ord,
{
    OrderedFloat(*u).cmp(&OrderedFloat(*v))
}

/// 忽略大小写的文本比较
pub fn nocase<S: AsRef<str>>(u: &S, v: &S) -> Ordering {
    UniCase::new(u.as_ref()).cmp(&UniCase::new(v.as_ref()))
}
