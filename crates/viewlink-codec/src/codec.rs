//! 顶层编解码入口。

use tracing::{debug, warn};
use viewlink_core::Essence;

use crate::{
    CURRENT_VERSION, CodecConfig, DecodeError, DecoderTable, IntermediateState, MigrationChain,
    ViewDefinition4, definition, lz, token,
};

/// 会话令牌编解码器。
///
/// # 教案式说明
/// - **意图 (Why)**：把版本分派、迁移与模式提升收拢到一个无状态对象里，宿主只需持有一个实例；
/// - **契约 (What)**：
///   - `encode` 是全函数，产出 `"{CURRENT_VERSION}/{payload}"`；
///   - `decode` 成功时返回全新的快照，失败时返回 [`DecodeError`] 并以 `warn!` 记录稳定错误码；
/// - **执行 (How)**：解码器表与迁移链在构造时确定，之后只读，可在多个读者之间共享；
/// - **风险 (Trade-offs)**：令牌长度检查发生在任何解压之前，过长的令牌甚至不会被拆分。
pub struct StateCodec {
    config: CodecConfig,
    decoders: DecoderTable,
    migrations: MigrationChain,
}

impl StateCodec {
    /// 默认资源上限、全部历史版本。
    pub fn new() -> Self {
        StateCodec::with_config(CodecConfig::default())
    }

    pub fn with_config(config: CodecConfig) -> Self {
        StateCodec {
            config,
            decoders: DecoderTable::standard(),
            migrations: MigrationChain::standard(),
        }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// 把快照写成当前版本令牌。
    ///
    /// # 教案式说明
    /// - **契约 (What)**：对任何可构造的 [`Essence`] 都成功，且 `decode(encode(s)) == s`；
    /// - **执行 (How)**：`serde_json` 只会在遇到非字符串映射键、非有限浮点或自定义序列化报错时失败。
    ///   定义树的映射键都是字符串，数值在 [`viewlink_core::NumberRange::new`] 与
    ///   [`viewlink_core::Split::new`] 处已限定为有限值，时刻限定在四位年份内，三种情形都不会出现。
    pub fn encode(&self, essence: &Essence) -> String {
        let definition = definition::lower(essence);
        let json = serde_json::to_string(&definition)
            .expect("视图定义只含字符串键与有限数值，序列化不会失败");
        format!("{CURRENT_VERSION}/{}", lz::compress_to_base64(&json))
    }

    /// 解码任意历史版本的令牌。
    pub fn decode(&self, token: &str) -> Result<Essence, DecodeError> {
        self.decode_inner(token).inspect_err(|err| {
            warn!(
                code = err.code(),
                error = %err,
                token_length = token.len(),
                "failed to decode view token"
            );
        })
    }

    /// 解码并迁移到当前版本，但不提升为强类型快照。
    pub fn decode_intermediate(&self, token: &str) -> Result<IntermediateState, DecodeError> {
        if token.len() > self.config.max_token_length {
            return Err(DecodeError::malformed(format!(
                "token exceeds {} bytes",
                self.config.max_token_length
            )));
        }
        let parts = token::split(token)?;
        let decoder = self.decoders.lookup(parts.version)?;
        debug!(version = decoder.version(), "dispatching view token");
        let state = decoder.decode(&parts, &self.config)?;
        self.migrations.run(state)
    }

    fn decode_inner(&self, token: &str) -> Result<Essence, DecodeError> {
        let state = self.decode_intermediate(token)?;
        let definition: ViewDefinition4 = serde_json::from_value(state.tree)?;
        definition::lift(definition)
    }
}

impl Default for StateCodec {
    fn default() -> Self {
        StateCodec::new()
    }
}
