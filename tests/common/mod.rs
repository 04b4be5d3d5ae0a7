#![allow(dead_code)]

pub mod command;
pub mod file;

// Macro to compare two index files byte for byte, with a hexdump on failure
#[macro_export]
macro_rules! assert_index_eq {
    ($before:expr, $after:expr) => {
        if $before != $after {
            pretty_assertions::assert_eq!(
                $crate::common::to_hexdump($before),
                $crate::common::to_hexdump($after),
                "\n=== INDEX CONTENTS DIFFER ===\nbefore ({} bytes) vs after ({} bytes)",
                $before.len(),
                $after.len()
            );
        }
    };
}

pub fn to_hexdump(data: &[u8]) -> String {
    let mut result = String::new();
    for (i, chunk) in data.chunks(16).enumerate() {
        result.push_str(&format!("{:08x}: ", i * 16));
        for byte in chunk {
            result.push_str(&format!("{:02x} ", byte));
        }
        for _ in chunk.len()..16 {
            result.push_str("   ");
        }

        result.push_str(" |");
        for byte in chunk {
            if byte.is_ascii_graphic() {
                result.push(*byte as char);
            } else {
                result.push('.');
            }
        }
        result.push_str("|\n");
    }
    result
}
