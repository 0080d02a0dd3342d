// ==========================================
// 供应商目录导入 - 引擎层
// ==========================================
// 职责: 列读取、关键词规则判定
// 红线: 引擎只读配置，不接触存储介质
// ==========================================

pub mod column_accessor;
pub mod rule_engine;

// 重导出核心引擎
pub use rule_engine::{KeywordRule, MatchStrategy, RuleEngine, RuleSet};
