/// 默认的后台排空队列容量
pub(crate) const DEFAULT_DRAIN_CAPACITY: usize = 32;

/// 迭代器物化配置
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Config {
    /// 后台排空模式下交接队列的容量，最小为1，未指定时为32。
    DrainCapacity(usize),
    /// 禁止直接复用数据源的游标，总是构建sink链。
    NoDirectReuse,
}

#[inline]
pub(crate) fn drain_capacity(configs: &[Config]) -> usize {
    configs
        .iter()
        .rev()
        .find_map(|config| match config {
            Config::DrainCapacity(capacity) => Some(*capacity),
            _ => None,
        })
        .unwrap_or(DEFAULT_DRAIN_CAPACITY)
        .max(1)
}

#[inline]
pub(crate) fn direct_reuse(configs: &[Config]) -> bool {
    !configs.contains(&Config::NoDirectReuse)
}
