#![no_main]

use libfuzzer_sys::fuzz_target;
use viewlink_codec::StateCodec;

// 任意文本作为令牌：只允许返回错误，不允许 panic；成功解码的会话必须能以当前版本重新编码并解回同值。
fuzz_target!(|token: &str| {
    let codec = StateCodec::new();
    if let Ok(essence) = codec.decode(token) {
        let reencoded = codec.encode(&essence);
        assert_eq!(codec.decode(&reencoded).as_ref(), Ok(&essence));
    }
});
