//! 惰性求值、可组合的数据流。
//!
//! 中间操作（`filter`、`map`、`skip`、`limit`、`distinct`、`sort_by`、`flat_map`等）只描述计算，
//! 直到终端操作（`count`、`collect`、`reduce`、`for_each`、`iter`等）才真正拉取数据。
//!
//! ```
//! use rstream::Stream;
//!
//! let res = Stream::range(0, 10).filter(|v| v % 2 == 0).map(|v| v * v).skip(1).collect_vec();
//! assert_eq!(res, vec![4, 16, 36, 64]);
//! ```
//!
//! 执行时整条流水线被融合为一个消费者链，由数据源逐个推送元素；排序、去重等操作在收到全部元素后
//! 才向下游输出。转换为拉取式迭代器时会根据流水线的形态选择代价最低的方式。

pub mod cmp;
mod config;
mod err;
mod input;
mod iter;
mod meta;
mod op;
mod output;
mod pipe;
mod sink;
mod stream;

pub use config::Config;
pub use err::StreamErr;
pub use input::{Cursor, RangeInt, Source};
pub use iter::StreamIter;
pub use output::{JoinInfo, counting, group, joining, to_map, to_set, to_vec};
pub use stream::Stream;

pub type StreamRes<T> = Result<T, StreamErr>;
