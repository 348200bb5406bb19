//! 第 3、4 版：压缩后的 JSON 对象，令牌中的可视化头（若有）被忽略。

use serde_json::Value;

use super::{VersionDecoder, unpack};
use crate::{CodecConfig, DecodeError, IntermediateState, token::TokenParts};

#[derive(Clone, Copy, Debug)]
pub struct JsonDecoder {
    version: u32,
}

impl JsonDecoder {
    pub const fn new(version: u32) -> Self {
        JsonDecoder { version }
    }
}

impl VersionDecoder for JsonDecoder {
    fn version(&self) -> u32 {
        self.version
    }

    fn decode(
        &self,
        parts: &TokenParts<'_>,
        config: &CodecConfig,
    ) -> Result<IntermediateState, DecodeError> {
        let text = unpack(parts.payload, config)?;
        let tree: Value = serde_json::from_str(&text)?;
        if !tree.is_object() {
            return Err(DecodeError::malformed(format!(
                "version {} payload must be a JSON object",
                self.version
            )));
        }
        Ok(IntermediateState::new(self.version, tree))
    }
}
