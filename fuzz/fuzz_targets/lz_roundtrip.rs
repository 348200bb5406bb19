#![no_main]

use libfuzzer_sys::fuzz_target;
use viewlink_codec::lz;

fuzz_target!(|text: String| {
    let packed = lz::compress_to_base64(&text);
    let unpacked = lz::decompress_from_base64(&packed, usize::MAX)
        .expect("compressor output must always decompress");
    assert_eq!(unpacked, text);

    // 原样把输入当作压缩文本：畸形输入只能报错。
    let _ = lz::decompress_from_base64(&text, 1 << 16);
});
