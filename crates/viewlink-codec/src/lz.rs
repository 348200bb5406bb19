//! # lz 模块说明
//!
//! ## 角色定位（Why）
//! - 所有历史令牌与当前令牌的载荷都经过同一种传输编码：基于字典的 LZ 压缩，
//!   按每字符 6 比特映射到 `A–Z a–z 0–9 + /` 字母表，并以 `=` 补齐到 4 的倍数；
//! - 编码端必须与历史生产者逐字节一致，已分享出去的当前版本令牌才能在重新编码后保持不变。
//!
//! ## 契约（What）
//! - 压缩与解压都以 UTF-16 码元为单位，与历史生产者对字符串的理解一致；
//! - 解压面对不可信输入：非法字符、截断、越界字典码、超长输出与非法代理对都返回 [`LzError`]，从不 panic。
//!
//! ## 执行（How）
//! - 字典初始保留 0/1/2 三个控制码：0 = 8 比特字面量，1 = 16 比特字面量，2 = 流结束；
//! - 码宽随字典增长而递增，`enlarge_in` 计数到零时码宽加一；
//! - 比特流按最低位优先写入，每凑满 6 比特输出一个字母。

use std::collections::{HashMap, HashSet};

use thiserror::Error;

const ALPHABET: &[u8; 65] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/=";
const BITS_PER_CHAR: u32 = 6;

/// 传输层错误，解码层统一折叠为 `MalformedPayload`。
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum LzError {
    #[error("character {ch:?} at offset {offset} is outside the transport alphabet")]
    InvalidCharacter { ch: char, offset: usize },
    #[error("compressed stream ended before its terminator")]
    Truncated,
    #[error("dictionary code {code} is not defined (dictionary size {size})")]
    InvalidCode { code: u32, size: usize },
    #[error("decompressed payload exceeds {limit} UTF-16 units")]
    TooLong { limit: usize },
    #[error("decompressed payload is not valid UTF-16")]
    InvalidUtf16,
}

/// 压缩并输出带 `=` 补齐的 6 比特字母表文本。
pub fn compress_to_base64(input: &str) -> String {
    let mut writer = BitWriter::default();
    let mut char_codes: HashMap<u16, u32> = HashMap::new();
    let mut pending_literals: HashSet<u16> = HashSet::new();
    let mut phrases: HashMap<(u32, u16), u32> = HashMap::new();
    let mut state = CompressState {
        enlarge_in: 2,
        num_bits: 2,
    };
    let mut dict_size: u32 = 3;
    let mut current: Option<Phrase> = None;

    for unit in input.encode_utf16() {
        if let std::collections::hash_map::Entry::Vacant(slot) = char_codes.entry(unit) {
            slot.insert(dict_size);
            dict_size += 1;
            pending_literals.insert(unit);
        }

        current = Some(match current {
            None => Phrase::literal(unit, &char_codes),
            Some(phrase) => match phrases.get(&(phrase.code, unit)) {
                Some(&code) => Phrase { code, single: None },
                None => {
                    state.emit(&phrase, &mut pending_literals, &mut writer);
                    phrases.insert((phrase.code, unit), dict_size);
                    dict_size += 1;
                    Phrase::literal(unit, &char_codes)
                }
            },
        });
    }

    if let Some(phrase) = current {
        state.emit(&phrase, &mut pending_literals, &mut writer);
    }
    writer.write_bits(state.num_bits, 2);
    writer.finish()
}

/// 解压 [`compress_to_base64`] 的输出；结果超过 `max_units` 个 UTF-16 码元即中止。
pub fn decompress_from_base64(input: &str, max_units: usize) -> Result<String, LzError> {
    if input.is_empty() {
        return Ok(String::new());
    }
    let values = input
        .char_indices()
        .map(|(offset, ch)| {
            u8::try_from(ch)
                .ok()
                .and_then(|byte| ALPHABET.iter().position(|candidate| *candidate == byte))
                .map(|position| position as u32)
                .ok_or(LzError::InvalidCharacter { ch, offset })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut reader = BitReader::new(&values);
    let mut dictionary: Vec<Vec<u16>> = vec![Vec::new(), Vec::new(), Vec::new()];
    let mut enlarge_in: u32 = 4;
    let mut num_bits: u32 = 3;

    let first = match reader.read(2)? {
        0 => reader.read(8)? as u16,
        1 => reader.read(16)? as u16,
        _ => return Ok(String::new()),
    };
    dictionary.push(vec![first]);
    let mut previous = vec![first];
    let mut output = vec![first];

    loop {
        if reader.exhausted() {
            return Err(LzError::Truncated);
        }
        let mut code = reader.read(num_bits)?;
        match code {
            0 | 1 => {
                let width = if code == 0 { 8 } else { 16 };
                let literal = reader.read(width)? as u16;
                dictionary.push(vec![literal]);
                code = (dictionary.len() - 1) as u32;
                enlarge_in -= 1;
            }
            2 => break,
            _ => {}
        }
        if enlarge_in == 0 {
            enlarge_in = 1 << num_bits;
            num_bits += 1;
        }

        let index = code as usize;
        let entry = if index < dictionary.len() {
            dictionary[index].clone()
        } else if index == dictionary.len() {
            let mut entry = previous.clone();
            entry.push(previous[0]);
            entry
        } else {
            return Err(LzError::InvalidCode {
                code,
                size: dictionary.len(),
            });
        };

        output.extend_from_slice(&entry);
        if output.len() > max_units {
            return Err(LzError::TooLong { limit: max_units });
        }

        let mut phrase = previous;
        phrase.push(entry[0]);
        dictionary.push(phrase);
        enlarge_in -= 1;
        previous = entry;

        if enlarge_in == 0 {
            enlarge_in = 1 << num_bits;
            num_bits += 1;
        }
        if num_bits > 31 {
            return Err(LzError::InvalidCode {
                code,
                size: dictionary.len(),
            });
        }
    }

    String::from_utf16(&output).map_err(|_| LzError::InvalidUtf16)
}

/// 压缩过程中的“当前短语”：字典码，以及它是否是单个码元。
#[derive(Clone, Copy)]
struct Phrase {
    code: u32,
    single: Option<u16>,
}

impl Phrase {
    fn literal(unit: u16, char_codes: &HashMap<u16, u32>) -> Self {
        Phrase {
            code: char_codes.get(&unit).copied().unwrap_or_default(),
            single: Some(unit),
        }
    }
}

struct CompressState {
    enlarge_in: u32,
    num_bits: u32,
}

impl CompressState {
    fn emit(&mut self, phrase: &Phrase, pending: &mut HashSet<u16>, writer: &mut BitWriter) {
        match phrase.single {
            Some(unit) if pending.remove(&unit) => {
                if unit < 256 {
                    writer.write_bits(self.num_bits, 0);
                    writer.write_bits(8, u32::from(unit));
                } else {
                    writer.write_bits(self.num_bits, 1);
                    writer.write_bits(16, u32::from(unit));
                }
                self.tick();
            }
            _ => writer.write_bits(self.num_bits, phrase.code),
        }
        self.tick();
    }

    fn tick(&mut self) {
        self.enlarge_in -= 1;
        if self.enlarge_in == 0 {
            self.enlarge_in = 1 << self.num_bits;
            self.num_bits += 1;
        }
    }
}

#[derive(Default)]
struct BitWriter {
    out: String,
    value: u32,
    position: u32,
}

impl BitWriter {
    fn push_bit(&mut self, bit: u32) {
        self.value = (self.value << 1) | bit;
        if self.position == BITS_PER_CHAR - 1 {
            self.position = 0;
            self.out.push(char::from(ALPHABET[self.value as usize]));
            self.value = 0;
        } else {
            self.position += 1;
        }
    }

    fn write_bits(&mut self, count: u32, mut value: u32) {
        for _ in 0..count {
            self.push_bit(value & 1);
            value >>= 1;
        }
    }

    fn finish(mut self) -> String {
        loop {
            self.value <<= 1;
            if self.position == BITS_PER_CHAR - 1 {
                self.out.push(char::from(ALPHABET[self.value as usize]));
                break;
            }
            self.position += 1;
        }
        while self.out.len() % 4 != 0 {
            self.out.push('=');
        }
        self.out
    }
}

struct BitReader<'a> {
    values: &'a [u32],
    value: u32,
    position: u32,
    index: usize,
}

impl<'a> BitReader<'a> {
    const RESET: u32 = 1 << (BITS_PER_CHAR - 1);

    fn new(values: &'a [u32]) -> Self {
        BitReader {
            values,
            value: values.first().copied().unwrap_or_default(),
            position: Self::RESET,
            index: 1,
        }
    }

    fn exhausted(&self) -> bool {
        self.index > self.values.len()
    }

    fn read(&mut self, count: u32) -> Result<u32, LzError> {
        if count > 31 {
            return Err(LzError::Truncated);
        }
        let mut bits = 0;
        for shift in 0..count {
            let bit = self.value & self.position;
            self.position >>= 1;
            if self.position == 0 {
                self.position = Self::RESET;
                self.value = self.values.get(self.index).copied().unwrap_or_default();
                self.index += 1;
            }
            if bit > 0 {
                bits |= 1 << shift;
            }
        }
        Ok(bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compresses_known_vectors() {
        assert_eq!(compress_to_base64(""), "Q===");
        assert_eq!(compress_to_base64("a"), "IZA=");
        assert_eq!(compress_to_base64("hello"), "BYUwNmD2Q===");
    }

    #[test]
    fn restores_repetitive_and_wide_text() {
        for text in ["abababababababab", "zażółć gęślą jaźń", "時間 🌍 ÿ", "{\"#\":0}"] {
            let packed = compress_to_base64(text);
            assert_eq!(decompress_from_base64(&packed, usize::MAX).unwrap(), text);
        }
    }

    #[test]
    fn rejects_characters_outside_alphabet() {
        let err = decompress_from_base64("IZA!", usize::MAX).unwrap_err();
        assert_eq!(err, LzError::InvalidCharacter { ch: '!', offset: 3 });
    }

    #[test]
    fn truncated_stream_is_an_error() {
        let packed = compress_to_base64("the quick brown fox jumps over the lazy dog");
        let cut = &packed[..packed.len() / 2];
        assert!(decompress_from_base64(cut, usize::MAX).is_err());
    }

    #[test]
    fn output_limit_is_enforced() {
        let packed = compress_to_base64(&"x".repeat(500));
        assert_eq!(
            decompress_from_base64(&packed, 100),
            Err(LzError::TooLong { limit: 100 })
        );
    }
}
