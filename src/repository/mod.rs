// ==========================================
// 供应商目录导入 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 检查点与运行记录的持久化,屏蔽数据库细节
// 约束: 所有查询使用参数化
// ==========================================

pub mod checkpoint_repo;
pub mod error;

// 重导出核心仓储
pub use checkpoint_repo::{
    CheckpointRepository, InMemoryCheckpointRepository, SqliteCheckpointRepository,
};
pub use error::{RepositoryError, RepositoryResult};
