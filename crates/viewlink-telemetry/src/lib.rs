//! `viewlink-telemetry` 为宿主进程提供一次性的 `tracing` 订阅器安装入口。
//!
//! # 教案背景（Why）
//! - 编解码与过滤器编辑只通过 `tracing` 宏输出事件（解码失败的 `warn!`、迁移步骤的 `debug!`），
//!   自身从不决定输出到哪里；
//! - 宿主在启动时调用一次 [`install`]，即可获得带级别过滤的格式化输出。
//!
//! # 合约说明（What）
//! - 过滤指令优先取 `RUST_LOG`，缺省为 `info`；[`install_with_filter`] 允许宿主给出自己的缺省值；
//! - 重复安装返回 [`Error::AlreadyInstalled`]；外部已设置全局订阅器时返回
//!   [`Error::SubscriberAlreadySet`]，本库不会覆盖宿主的选择。

use std::sync::OnceLock;

use thiserror::Error;
use tracing::dispatcher;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt};

/// 缺省过滤指令。
pub const DEFAULT_FILTER: &str = "info";

/// 安装状态的全局缓存，确保只安装一次。
static INSTALL_STATE: OnceLock<InstallState> = OnceLock::new();

#[derive(Debug)]
struct InstallState {
    filter: String,
}

/// 安装过程可能出现的错误。
#[derive(Debug, Error)]
pub enum Error {
    /// `install` 被重复调用。
    #[error("viewlink telemetry is already installed")]
    AlreadyInstalled,
    /// 外部提前设置了全局 `tracing` 订阅器。
    #[error("a global tracing subscriber is already set")]
    SubscriberAlreadySet,
    /// 缺省过滤指令无法解析。
    #[error("invalid log filter `{directives}`: {source}")]
    InvalidFilter {
        directives: String,
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },
    /// 设置全局订阅器失败的底层错误。
    #[error("failed to set the global tracing subscriber: {0}")]
    SetGlobalSubscriber(#[from] dispatcher::SetGlobalDefaultError),
}

/// 以 `RUST_LOG` 或 `info` 安装。
pub fn install() -> Result<(), Error> {
    install_with_filter(DEFAULT_FILTER)
}

/// 以 `RUST_LOG` 或给定的缺省指令安装。
///
/// # 教案式说明
/// - **意图 (Why)**：嵌入式宿主（如测试工具）希望默认更安静或更详细，而仍保留环境变量覆盖的能力；
/// - **契约 (What)**：成功后全局订阅器立即生效，[`installed_filter`] 返回实际采用的指令；
/// - **执行 (How)**：先做重复安装与外部订阅器检查，再组装 `registry + EnvFilter + fmt` 并注册为全局默认。
pub fn install_with_filter(default_directives: &str) -> Result<(), Error> {
    if INSTALL_STATE.get().is_some() {
        return Err(Error::AlreadyInstalled);
    }
    if dispatcher::has_been_set() {
        return Err(Error::SubscriberAlreadySet);
    }

    let filter = build_env_filter(default_directives)?;
    let directives = filter.to_string();
    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer());
    tracing::subscriber::set_global_default(subscriber)?;

    INSTALL_STATE
        .set(InstallState { filter: directives })
        .map_err(|_| Error::AlreadyInstalled)
}

/// 已安装时返回生效的过滤指令。
pub fn installed_filter() -> Option<&'static str> {
    INSTALL_STATE.get().map(|state| state.filter.as_str())
}

fn build_env_filter(default_directives: &str) -> Result<EnvFilter, Error> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(default_directives).map_err(|source| Error::InvalidFilter {
        directives: default_directives.to_owned(),
        source,
    })
}
