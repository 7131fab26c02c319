use thiserror::Error;

/// 分类器核心的错误类型。
///
/// 所有操作要么完整成功，要么失败且不修改模型状态。
#[derive(Error, Debug)]
pub enum Error {
    /// 还没有学习过任何样本就请求打分（先验项会除以零）
    #[error("模型尚未训练：至少需要学习一个样本才能打分")]
    UntrainedModel,

    /// 持久化文档缺少必需字段
    #[error("模型文档缺少必需字段：'{field}'")]
    MalformedModel { field: String },

    #[error("未知类别：{0}")]
    UnknownCategory(String),

    /// 计数之间的不变式被破坏（通常来自手工编辑过的文档）
    #[error("模型统计不一致：{0}")]
    InconsistentModel(String),
}

pub type Result<T> = std::result::Result<T, Error>;
