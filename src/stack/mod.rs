//! 外部协议栈接口
//!
//! `RadioStack` 描述本 crate 对无线接入网/核心网协议栈及流监视器的全部依赖：
//! 配置、安装、运行、读取最终流统计、销毁。`SyntheticStack` 是一个
//! 粗粒度的参考实现，基于 `sim` 事件引擎，用于命令行与端到端测试。

mod api;
pub mod synthetic;

pub use api::RadioStack;
pub use synthetic::SyntheticStack;
